/// Operator Registry Initialization Module
///
/// Populates the process-wide [`OPERATOR_REGISTRY`] exactly once, before the first
/// lookup made through [`operator_registry`].
use crate::ops::registry::{OperatorRegistry, OPERATOR_REGISTRY};
use crate::ops::split::register_split_ops;

use lazy_static::lazy_static;

lazy_static! {
    /// Ensures the global registry is populated before first use
    pub static ref DISPATCH_INIT: () = {
        if let Err(e) = register_split_ops(&OPERATOR_REGISTRY) {
            log::error!("Failed to register split operators: {e}");
        }
    };
}

/// Run the one-time registration if it has not happened yet
pub fn ensure_initialized() {
    lazy_static::initialize(&DISPATCH_INIT);
}

/// The global registry, populated
pub fn operator_registry() -> &'static OperatorRegistry {
    ensure_initialized();
    &OPERATOR_REGISTRY
}
