//! Components shipped with the crate and exposed through
//! [`ComponentCatalog::builtin`](crate::discovery::ComponentCatalog::builtin).

mod heartbeat;
mod runtime;

pub use heartbeat::Heartbeat;
pub use runtime::RuntimeInfo;
