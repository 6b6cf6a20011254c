//! # vkgraph - Compute Graph Construction for GPU Tensor Programs
//!
//! vkgraph builds the node list a GPU backend executes for a framework graph. Tensors live
//! in 3-D textures with four elements packed per texel; operators lower into copy and compute
//! nodes over those textures.
//!
//! ## Quick Start
//!
//! ### Splitting a tensor
//!
//! ```rust
//! use vkgraph::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let mut graph = ComputeGraph::new(GraphConfig::default());
//! let input = graph.add_tensor(&[1, 4, 2, 6], DType::Float32);
//! let left = graph.add_tensor(&[1, 4, 2, 2], DType::Float32);
//! let right = graph.add_tensor(&[1, 4, 2, 4], DType::Float32);
//! let outputs = graph.add_value_list(vec![left, right]);
//!
//! add_split_with_sizes_default_node(&mut graph, input, &[2, 4], -1, outputs)?;
//! assert_eq!(graph.node_count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ### Dispatching by operator name
//!
//! ```rust
//! use vkgraph::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let mut graph = ComputeGraph::default();
//! let input = graph.add_tensor(&[8, 3, 3], DType::Float16);
//! let outs: Vec<ValueRef> = (0..4)
//!     .map(|_| graph.add_tensor(&[2, 3, 3], DType::Float16))
//!     .collect();
//! let split_size = graph.add_scalar(2i64);
//! let dim = graph.add_scalar(0i64);
//! let outputs = graph.add_value_list(outs);
//!
//! operator_registry().invoke("aten.split.Tensor", &mut graph, &[input, split_size, dim, outputs])?;
//! assert_eq!(graph.node_count(), 4);
//! # Ok(())
//! # }
//! ```

pub use vkgraph_core as core;

pub use vkgraph_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    // Graph building
    pub use crate::core::{ComputeGraph, GraphConfig, Value, ValueRef};

    // Tensors and layouts
    pub use crate::core::{DType, GpuMemoryLayout, IVec3, Shape, VTensor};

    // Operators
    pub use crate::core::ops::split::{
        add_split_tensor_node, add_split_with_sizes_default_node,
    };
    pub use crate::core::{operator_registry, OperatorRegistry};

    // Errors
    pub use crate::core::{GraphError, Result};
}

// Version information
/// The version of vkgraph
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version string of vkgraph
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
        assert_eq!(version(), VERSION);
    }

    #[test]
    fn test_prelude_split() {
        use crate::prelude::*;

        let mut graph = ComputeGraph::default();
        let input = graph.add_tensor(&[4, 2], DType::Float32);
        let top = graph.add_tensor(&[1, 2], DType::Float32);
        let bottom = graph.add_tensor(&[3, 2], DType::Float32);
        let outputs = graph.add_value_list(vec![top, bottom]);

        add_split_with_sizes_default_node(&mut graph, input, &[1, 3], 0, outputs).unwrap();
        let second = graph.execute_nodes()[1].as_copy_offset().unwrap();
        assert_eq!(second.src_offset(), IVec3::new(0, 1, 0));
        assert_eq!(second.range(), IVec3::new(2, 3, 1));
    }
}
