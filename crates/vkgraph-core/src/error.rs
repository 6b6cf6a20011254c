use thiserror::Error;

/// Errors raised while adding operators to a [`ComputeGraph`](crate::graph::ComputeGraph)
///
/// Every variant records the operation that failed so callers assembling large graphs
/// can tell which operator rejected its arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unsupported dimension in operation '{operation}': dim {dim} for tensor with {ndim} dimensions")]
    UnsupportedDimension {
        operation: String,
        dim: i64,
        ndim: usize,
    },

    #[error("Count mismatch in operation '{operation}': expected {expected}, got {got}")]
    CountMismatch {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("Size mismatch in operation '{operation}' for output {index}: expected {expected}, got {got}")]
    SizeMismatch {
        operation: String,
        index: usize,
        expected: i64,
        got: i64,
    },

    #[error("Memory layout mismatch in operation '{operation}': expected {expected}, got {got}")]
    LayoutMismatch {
        operation: String,
        expected: String,
        got: String,
    },

    #[error("Value {value_ref} in operation '{operation}' is a {actual}, expected {expected}")]
    ValueTypeMismatch {
        operation: String,
        value_ref: usize,
        expected: String,
        actual: String,
    },

    #[error("Invalid value reference {value_ref} in operation '{operation}' (graph holds {num_values} values)")]
    InvalidValueRef {
        operation: String,
        value_ref: usize,
        num_values: usize,
    },

    #[error("Region out of bounds in operation '{operation}': {details}")]
    OutOfBounds { operation: String, details: String },

    #[error("Incompatible dtypes in operation '{operation}': {dtype1} and {dtype2}")]
    DtypeMismatch {
        operation: String,
        dtype1: String,
        dtype2: String,
    },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error("Operator '{operation}' expects {expected} arguments, got {got}")]
    ArgumentCount {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("Operator '{operation}' is not registered")]
    UnknownOperator { operation: String },

    #[error("Operator '{operation}' is already registered")]
    DuplicateOperator { operation: String },
}

impl GraphError {
    pub fn unsupported_dimension(operation: &str, dim: i64, ndim: usize) -> Self {
        Self::UnsupportedDimension {
            operation: operation.to_string(),
            dim,
            ndim,
        }
    }

    pub fn count_mismatch(operation: &str, expected: usize, got: usize) -> Self {
        Self::CountMismatch {
            operation: operation.to_string(),
            expected,
            got,
        }
    }

    pub fn size_mismatch(operation: &str, index: usize, expected: i64, got: i64) -> Self {
        Self::SizeMismatch {
            operation: operation.to_string(),
            index,
            expected,
            got,
        }
    }

    pub fn layout_mismatch(operation: &str, expected: &str, got: &str) -> Self {
        Self::LayoutMismatch {
            operation: operation.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    pub fn value_type_mismatch(
        operation: &str,
        value_ref: usize,
        expected: &str,
        actual: &str,
    ) -> Self {
        Self::ValueTypeMismatch {
            operation: operation.to_string(),
            value_ref,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn invalid_value_ref(operation: &str, value_ref: usize, num_values: usize) -> Self {
        Self::InvalidValueRef {
            operation: operation.to_string(),
            value_ref,
            num_values,
        }
    }

    pub fn out_of_bounds(operation: &str, details: String) -> Self {
        Self::OutOfBounds {
            operation: operation.to_string(),
            details,
        }
    }

    pub fn dtype_mismatch(operation: &str, dtype1: &str, dtype2: &str) -> Self {
        Self::DtypeMismatch {
            operation: operation.to_string(),
            dtype1: dtype1.to_string(),
            dtype2: dtype2.to_string(),
        }
    }

    pub fn invalid_argument(operation: &str, reason: String) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason,
        }
    }

    pub fn argument_count(operation: &str, expected: usize, got: usize) -> Self {
        Self::ArgumentCount {
            operation: operation.to_string(),
            expected,
            got,
        }
    }

    pub fn unknown_operator(operation: &str) -> Self {
        Self::UnknownOperator {
            operation: operation.to_string(),
        }
    }

    pub fn duplicate_operator(operation: &str) -> Self {
        Self::DuplicateOperator {
            operation: operation.to_string(),
        }
    }

    /// Get the operation name for this error
    pub fn operation(&self) -> &str {
        match self {
            Self::UnsupportedDimension { operation, .. } => operation,
            Self::CountMismatch { operation, .. } => operation,
            Self::SizeMismatch { operation, .. } => operation,
            Self::LayoutMismatch { operation, .. } => operation,
            Self::ValueTypeMismatch { operation, .. } => operation,
            Self::InvalidValueRef { operation, .. } => operation,
            Self::OutOfBounds { operation, .. } => operation,
            Self::DtypeMismatch { operation, .. } => operation,
            Self::InvalidArgument { operation, .. } => operation,
            Self::ArgumentCount { operation, .. } => operation,
            Self::UnknownOperator { operation } => operation,
            Self::DuplicateOperator { operation } => operation,
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_operation() {
        let err = GraphError::count_mismatch("aten.split.Tensor", 3, 2);
        assert_eq!(
            err.to_string(),
            "Count mismatch in operation 'aten.split.Tensor': expected 3, got 2"
        );
        assert_eq!(err.operation(), "aten.split.Tensor");
    }
}
