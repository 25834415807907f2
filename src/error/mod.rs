//! Error Handling Module
//!
//! This module provides the error taxonomy of the call pipeline:
//! - Core error type (`ModelError`) and its coarse `ErrorCategory`
//! - Retry classification (`is_retryable`) and cancellation detection (`is_abort`)
//!
//! # Example
//!
//! ```rust,ignore
//! use callflow::error::{ErrorCategory, ModelError};
//!
//! let error = ModelError::api_call("rate limited", Some(429), true);
//! assert_eq!(error.category(), ErrorCategory::ProviderCall);
//! assert!(error.is_retryable());
//! ```

pub mod types;

pub use types::*;
