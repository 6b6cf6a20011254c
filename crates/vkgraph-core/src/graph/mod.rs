//! Compute Graph Module
//!
//! ## Module Organization
//!
//! - **core**: the [`ComputeGraph`] builder (value table, node list, argument lookups)
//! - **value**: graph values and scalar extraction
//! - **node**: execute nodes, memory access declarations and shader parameter blocks

mod core;
mod node;
mod value;

pub use self::core::*;
pub use node::{
    ArgGroup, CopyChannelOffsetParams, CopyOffsetParams, ExecuteNode, MemoryAccess, NodeOp,
};
pub use value::{ScalarValue, Value, ValueRef};
