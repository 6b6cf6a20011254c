/// Operator Registry for vkgraph
///
/// Maps framework operator names (e.g. `aten.split.Tensor`) to the functions that lower
/// them into graph nodes. A registry can be built per context with [`OperatorRegistry::new`],
/// or the process-wide [`OPERATOR_REGISTRY`] can be used once `dispatch_init` has run.
use crate::error::{GraphError, Result};
use crate::graph::{ComputeGraph, ValueRef};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Signature shared by every operator: the graph and the operator's positional arguments
pub type OpFunction = fn(&mut ComputeGraph, &[ValueRef]) -> Result<()>;

/// Operator metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDescriptor {
    /// Framework operator name
    pub name: String,
    /// Category, e.g. "indexing", "copy"
    pub category: String,
    /// Expected number of positional arguments, if fixed
    pub num_args: Option<usize>,
}

impl OperatorDescriptor {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            num_args: None,
        }
    }

    pub fn with_num_args(mut self, num_args: usize) -> Self {
        self.num_args = Some(num_args);
        self
    }
}

struct RegisteredOperator {
    descriptor: OperatorDescriptor,
    function: OpFunction,
}

/// Name-keyed table of operators
pub struct OperatorRegistry {
    operators: Arc<RwLock<HashMap<String, RegisteredOperator>>>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            operators: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register an operator under its descriptor's name
    pub fn register_op(&self, descriptor: OperatorDescriptor, function: OpFunction) -> Result<()> {
        let mut ops = self.operators.write().unwrap_or_else(PoisonError::into_inner);

        if ops.contains_key(&descriptor.name) {
            return Err(GraphError::duplicate_operator(&descriptor.name));
        }

        log::debug!(
            "Registering operator '{}' ({})",
            descriptor.name,
            descriptor.category
        );
        ops.insert(
            descriptor.name.clone(),
            RegisteredOperator {
                descriptor,
                function,
            },
        );
        Ok(())
    }

    pub fn has_op(&self, name: &str) -> bool {
        let ops = self.operators.read().unwrap_or_else(PoisonError::into_inner);
        ops.contains_key(name)
    }

    /// Look up the function registered under `name`
    pub fn get_op(&self, name: &str) -> Result<OpFunction> {
        let ops = self.operators.read().unwrap_or_else(PoisonError::into_inner);
        ops.get(name)
            .map(|op| op.function)
            .ok_or_else(|| GraphError::unknown_operator(name))
    }

    pub fn get_descriptor(&self, name: &str) -> Option<OperatorDescriptor> {
        let ops = self.operators.read().unwrap_or_else(PoisonError::into_inner);
        ops.get(name).map(|op| op.descriptor.clone())
    }

    /// Lower the operator `name` into `graph`.
    ///
    /// The argument count is checked against the descriptor before the operator runs.
    pub fn invoke(&self, name: &str, graph: &mut ComputeGraph, args: &[ValueRef]) -> Result<()> {
        let (function, num_args) = {
            let ops = self.operators.read().unwrap_or_else(PoisonError::into_inner);
            let op = ops.get(name).ok_or_else(|| GraphError::unknown_operator(name))?;
            (op.function, op.descriptor.num_args)
        };

        if let Some(expected) = num_args {
            if args.len() != expected {
                return Err(GraphError::argument_count(name, expected, args.len()));
            }
        }

        function(graph, args)
    }

    /// Names of all registered operators, sorted
    pub fn list_ops(&self) -> Vec<String> {
        let ops = self.operators.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = ops.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Register an operator, propagating registration errors with `?`
#[macro_export]
macro_rules! register_operator {
    ($registry:expr, $name:expr, $category:expr, args: $num_args:expr, $func:expr) => {
        $registry.register_op(
            $crate::ops::registry::OperatorDescriptor::new($name, $category)
                .with_num_args($num_args),
            $func,
        )?
    };
    ($registry:expr, $name:expr, $category:expr, $func:expr) => {
        $registry.register_op($crate::ops::registry::OperatorDescriptor::new($name, $category), $func)?
    };
}

use lazy_static::lazy_static;

lazy_static! {
    /// Process-wide operator registry, populated by `dispatch_init`
    pub static ref OPERATOR_REGISTRY: OperatorRegistry = OperatorRegistry::new();
}
