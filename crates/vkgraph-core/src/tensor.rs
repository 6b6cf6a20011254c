use crate::dtype::DType;
use crate::layout::{GpuMemoryLayout, IVec3};
use crate::shape::Shape;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A texture-backed tensor value owned by a [`ComputeGraph`](crate::graph::ComputeGraph).
///
/// Only metadata lives here. The backing image is allocated by the runtime when the graph
/// is prepared; nodes refer to tensors through their value reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct VTensor {
    sizes: Shape,
    dtype: DType,
    memory_layout: GpuMemoryLayout,
    image_extents: IVec3,
}

impl VTensor {
    pub fn new(sizes: Shape, dtype: DType, memory_layout: GpuMemoryLayout) -> Self {
        let image_extents = memory_layout.image_extents(&sizes);
        Self {
            sizes,
            dtype,
            memory_layout,
            image_extents,
        }
    }

    pub fn sizes(&self) -> &Shape {
        &self.sizes
    }

    pub fn dim(&self) -> usize {
        self.sizes.rank()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn memory_layout(&self) -> GpuMemoryLayout {
        self.memory_layout
    }

    /// Extents of the backing texture in texels
    pub fn image_extents(&self) -> IVec3 {
        self.image_extents
    }

    /// Same as [`image_extents`](Self::image_extents); the exclusive upper bound of every
    /// valid texel position.
    pub fn texture_limits(&self) -> IVec3 {
        self.image_extents
    }

    pub fn numel(&self) -> usize {
        self.sizes.numel()
    }
}

/// Check whether a tensor uses the given memory layout
pub fn check_memory_layout_is(tensor: &VTensor, layout: GpuMemoryLayout) -> bool {
    tensor.memory_layout() == layout
}
