#![allow(clippy::result_large_err)]

pub mod config;
pub mod dispatch_init;
pub mod dtype;
pub mod error;
pub mod graph;
pub mod layout;
pub mod ops;
pub mod shape;
pub mod tensor;

pub use config::GraphConfig;
pub use dispatch_init::{ensure_initialized, operator_registry};
pub use dtype::DType;
pub use error::{GraphError, Result};
pub use graph::{ComputeGraph, ExecuteNode, NodeOp, Value, ValueRef};
pub use layout::{GpuMemoryLayout, IVec3};
pub use ops::registry::{OpFunction, OperatorDescriptor, OperatorRegistry, OPERATOR_REGISTRY};
pub use ops::split::{
    add_split_tensor_node, add_split_with_sizes_default_node, register_split_ops, split_tensor,
    split_with_sizes_copy_default,
};
pub use ops::utils::dim::{normalize_to_nchw_dim, NchwDim};
pub use shape::Shape;
pub use tensor::VTensor;
