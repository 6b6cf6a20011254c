#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Element types a GPU tensor can hold.
///
/// Only types with a texel representation are listed; 64-bit types are narrowed by the
/// runtime before they reach the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DType {
    Float16,
    #[default]
    Float32,
    Int32,
    Int8,
    UInt8,
    Bool,
}

impl DType {
    pub fn name(&self) -> &'static str {
        match self {
            DType::Float16 => "float16",
            DType::Float32 => "float32",
            DType::Int32 => "int32",
            DType::Int8 => "int8",
            DType::UInt8 => "uint8",
            DType::Bool => "bool",
        }
    }

    /// Suffix appended to kernel names when picking a shader variant
    pub fn shader_suffix(&self) -> &'static str {
        match self {
            DType::Float16 => "half",
            DType::Float32 => "float",
            DType::Int32 => "int",
            DType::Int8 | DType::UInt8 | DType::Bool => "int8",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
