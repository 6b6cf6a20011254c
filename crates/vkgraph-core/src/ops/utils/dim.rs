//! Mapping between framework axis indices and the runtime's physical axes

use crate::error::{GraphError, Result};
use crate::tensor::VTensor;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Maximum rank modelled by the 4-D physical layout
pub const MAX_PHYSICAL_RANK: usize = 4;

/// Canonical physical axis, identified by its position counted from the innermost dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum NchwDim {
    Width = 1,
    Height = 2,
    Channel = 3,
    Batch = 4,
}

impl NchwDim {
    /// Position counted from the end of the size list (Width = 1)
    pub fn offset_from_end(self) -> usize {
        self as usize
    }

    pub fn from_offset_from_end(offset: usize) -> Option<Self> {
        match offset {
            1 => Some(NchwDim::Width),
            2 => Some(NchwDim::Height),
            3 => Some(NchwDim::Channel),
            4 => Some(NchwDim::Batch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NchwDim::Width => "width",
            NchwDim::Height => "height",
            NchwDim::Channel => "channel",
            NchwDim::Batch => "batch",
        }
    }
}

impl std::fmt::Display for NchwDim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolve a signed axis index against a tensor rank.
///
/// Negative indices count from the end. Ranks above [`MAX_PHYSICAL_RANK`] and indices
/// outside `[-ndim, ndim)` have no physical axis.
pub fn normalize_dim(dim: i64, ndim: usize) -> Result<usize> {
    if ndim == 0 || ndim > MAX_PHYSICAL_RANK {
        return Err(GraphError::unsupported_dimension("normalize_dim", dim, ndim));
    }
    let rank = ndim as i64;
    if dim < -rank || dim >= rank {
        return Err(GraphError::unsupported_dimension("normalize_dim", dim, ndim));
    }
    let normalized = if dim < 0 { dim + rank } else { dim };
    Ok(normalized as usize)
}

/// Map a framework axis index of a tensor with `ndim` dimensions to its physical axis
pub fn normalize_to_nchw_dim_for_rank(ndim: usize, dim: i64) -> Result<NchwDim> {
    let normalized = normalize_dim(dim, ndim)?;
    NchwDim::from_offset_from_end(ndim - normalized)
        .ok_or_else(|| GraphError::unsupported_dimension("normalize_to_nchw_dim", dim, ndim))
}

/// Map a framework axis index on `tensor` to its physical axis
pub fn normalize_to_nchw_dim(tensor: &VTensor, dim: i64) -> Result<NchwDim> {
    normalize_to_nchw_dim_for_rank(tensor.dim(), dim)
}

/// Size of `tensor` along a physical axis; 1 when the tensor's rank does not reach it
pub fn dim_at(tensor: &VTensor, nchw_dim: NchwDim) -> usize {
    tensor.sizes().size_from_end(nchw_dim.offset_from_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::layout::GpuMemoryLayout;
    use crate::shape::Shape;

    fn tensor(sizes: &[usize]) -> VTensor {
        VTensor::new(
            Shape::from_slice(sizes),
            DType::Float32,
            GpuMemoryLayout::ChannelsPacked,
        )
    }

    #[test]
    fn test_rank4_axes() {
        assert_eq!(normalize_to_nchw_dim_for_rank(4, 0).unwrap(), NchwDim::Batch);
        assert_eq!(normalize_to_nchw_dim_for_rank(4, 1).unwrap(), NchwDim::Channel);
        assert_eq!(normalize_to_nchw_dim_for_rank(4, 2).unwrap(), NchwDim::Height);
        assert_eq!(normalize_to_nchw_dim_for_rank(4, 3).unwrap(), NchwDim::Width);
    }

    #[test]
    fn test_negative_axes() {
        assert_eq!(normalize_to_nchw_dim_for_rank(4, -1).unwrap(), NchwDim::Width);
        assert_eq!(normalize_to_nchw_dim_for_rank(4, -4).unwrap(), NchwDim::Batch);
        assert_eq!(normalize_to_nchw_dim_for_rank(3, -3).unwrap(), NchwDim::Channel);
    }

    #[test]
    fn test_lower_ranks_count_from_innermost() {
        // [C, H, W]
        assert_eq!(normalize_to_nchw_dim_for_rank(3, 0).unwrap(), NchwDim::Channel);
        // [H, W]
        assert_eq!(normalize_to_nchw_dim_for_rank(2, 0).unwrap(), NchwDim::Height);
        // [W]
        assert_eq!(normalize_to_nchw_dim_for_rank(1, 0).unwrap(), NchwDim::Width);
    }

    #[test]
    fn test_unsupported_dims() {
        assert!(matches!(
            normalize_to_nchw_dim_for_rank(4, 4),
            Err(GraphError::UnsupportedDimension { dim: 4, ndim: 4, .. })
        ));
        assert!(matches!(
            normalize_to_nchw_dim_for_rank(2, -3),
            Err(GraphError::UnsupportedDimension { .. })
        ));
        assert!(matches!(
            normalize_to_nchw_dim_for_rank(5, 0),
            Err(GraphError::UnsupportedDimension { ndim: 5, .. })
        ));
        assert!(matches!(
            normalize_to_nchw_dim_for_rank(0, 0),
            Err(GraphError::UnsupportedDimension { .. })
        ));
    }

    #[test]
    fn test_dim_at() {
        let t = tensor(&[2, 3, 5, 7]);
        assert_eq!(dim_at(&t, NchwDim::Width), 7);
        assert_eq!(dim_at(&t, NchwDim::Height), 5);
        assert_eq!(dim_at(&t, NchwDim::Channel), 3);
        assert_eq!(dim_at(&t, NchwDim::Batch), 2);

        let t = tensor(&[5, 7]);
        assert_eq!(dim_at(&t, NchwDim::Channel), 1);
        assert_eq!(dim_at(&t, NchwDim::Batch), 1);
        assert_eq!(normalize_to_nchw_dim(&t, -2).unwrap(), NchwDim::Height);
    }
}
