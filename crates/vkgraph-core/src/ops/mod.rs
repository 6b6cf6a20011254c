pub mod copy;
pub mod registry;
pub mod split;
pub mod utils;

pub use copy::*;
pub use registry::{OpFunction, OperatorDescriptor, OperatorRegistry, OPERATOR_REGISTRY};
pub use split::*;
