//! Core Graph Types and Basic Operations
//!
//! This module contains the compute graph builder: the value table operators read their
//! arguments from, and the ordered list of execute nodes they append to.

use super::node::ExecuteNode;
use super::value::{ScalarValue, Value, ValueRef};
use crate::config::GraphConfig;
use crate::dtype::DType;
use crate::error::{GraphError, Result};
use crate::layout::GpuMemoryLayout;
use crate::shape::Shape;
use crate::tensor::VTensor;

/// Graph under construction
///
/// Mutation goes through `&mut self`; callers that share a graph between threads wrap it
/// in their own lock.
#[derive(Debug, Clone, Default)]
pub struct ComputeGraph {
    config: GraphConfig,
    values: Vec<Value>,
    execute_nodes: Vec<ExecuteNode>,
}

impl ComputeGraph {
    /// Create a new empty graph
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            values: Vec::new(),
            execute_nodes: Vec::new(),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn add_value(&mut self, value: Value) -> ValueRef {
        let idx = self.values.len();
        self.values.push(value);
        idx
    }

    /// Add a tensor using the configured default memory layout
    pub fn add_tensor(&mut self, sizes: &[usize], dtype: DType) -> ValueRef {
        let layout = self.config.default_memory_layout();
        self.add_tensor_with_layout(sizes, dtype, layout)
    }

    /// Add a tensor with an explicit memory layout.
    ///
    /// A configured layout override still wins.
    pub fn add_tensor_with_layout(
        &mut self,
        sizes: &[usize],
        dtype: DType,
        layout: GpuMemoryLayout,
    ) -> ValueRef {
        let layout = self.config.memory_layout_override.unwrap_or(layout);
        let tensor = VTensor::new(Shape::from_slice(sizes), dtype, layout);
        self.add_value(Value::Tensor(tensor))
    }

    pub fn add_scalar<T: Into<Value>>(&mut self, value: T) -> ValueRef {
        self.add_value(value.into())
    }

    pub fn add_int_list(&mut self, values: Vec<i64>) -> ValueRef {
        self.add_value(Value::IntList(values))
    }

    pub fn add_value_list(&mut self, refs: Vec<ValueRef>) -> ValueRef {
        self.add_value(Value::ValueList(refs))
    }

    pub fn add_none(&mut self) -> ValueRef {
        self.add_value(Value::None)
    }

    /// Number of values held by the graph
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    pub fn get_value(&self, idx: ValueRef) -> Result<&Value> {
        self.values
            .get(idx)
            .ok_or_else(|| GraphError::invalid_value_ref("get_value", idx, self.values.len()))
    }

    pub fn get_tensor(&self, idx: ValueRef) -> Result<&VTensor> {
        match self.get_value(idx)? {
            Value::Tensor(tensor) => Ok(tensor),
            other => Err(GraphError::value_type_mismatch(
                "get_tensor",
                idx,
                "tensor",
                other.type_name(),
            )),
        }
    }

    pub fn get_value_list(&self, idx: ValueRef) -> Result<&[ValueRef]> {
        match self.get_value(idx)? {
            Value::ValueList(refs) => Ok(refs),
            other => Err(GraphError::value_type_mismatch(
                "get_value_list",
                idx,
                "value_list",
                other.type_name(),
            )),
        }
    }

    pub fn get_int_list(&self, idx: ValueRef) -> Result<&[i64]> {
        match self.get_value(idx)? {
            Value::IntList(values) => Ok(values),
            other => Err(GraphError::value_type_mismatch(
                "get_int_list",
                idx,
                "int_list",
                other.type_name(),
            )),
        }
    }

    /// Read a scalar argument, e.g. `graph.extract_scalar::<i64>(dim_ref)`
    pub fn extract_scalar<T: ScalarValue>(&self, idx: ValueRef) -> Result<T> {
        let value = self.get_value(idx)?;
        log::trace!("extract_scalar: value {} is {}", idx, value.type_name());
        T::from_value(value).ok_or_else(|| {
            GraphError::value_type_mismatch("extract_scalar", idx, T::TYPE_NAME, value.type_name())
        })
    }

    /// Label for the next node created from `kernel_name`
    pub fn next_node_label(&self, kernel_name: &str) -> String {
        format!(
            "{}::{}#{}",
            self.config.node_label_prefix,
            kernel_name,
            self.execute_nodes.len()
        )
    }

    /// Append a single prepared node, assigning its label
    pub fn append_node(&mut self, mut node: ExecuteNode) {
        node.label = self.next_node_label(&node.kernel_name);
        if self.config.log_node_creation {
            log::debug!(
                "Appending node '{}' (kernel {}, workgroup {}, reads {:?}, writes {:?})",
                node.label,
                node.kernel_name,
                node.global_workgroup_size,
                node.reads(),
                node.writes(),
            );
        }
        self.execute_nodes.push(node);
    }

    /// Append prepared nodes in order.
    ///
    /// Operators prepare every node first and append them in one call, so a failed
    /// preparation never leaves a partial set of nodes behind.
    pub fn append_nodes(&mut self, nodes: Vec<ExecuteNode>) {
        self.execute_nodes.reserve(nodes.len());
        for node in nodes {
            self.append_node(node);
        }
    }

    pub fn execute_nodes(&self) -> &[ExecuteNode] {
        &self.execute_nodes
    }

    pub fn node_count(&self) -> usize {
        self.execute_nodes.len()
    }
}
