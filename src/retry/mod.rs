//! Retry module (ergonomic namespace)
//! - policy.rs: retry policies and per-call retry schedules
//! - executor.rs: throttled, abortable retry loop

pub mod executor;
pub mod policy;

pub use executor::*;
pub use policy::*;
