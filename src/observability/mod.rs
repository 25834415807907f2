//! Observability
//!
//! Lifecycle events, the observers that consume them and the bus that
//! delivers them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use callflow::observability::{Environment, EventRecorder, FunctionLogging};
//!
//! // Process-wide observers and logging, installed once at startup
//! let recorder = EventRecorder::new();
//! Environment::builder()
//!     .observer(recorder.clone())
//!     .logging(FunctionLogging::BasicText)
//!     .build()
//!     .install();
//! ```

pub mod bus;
pub mod environment;
pub mod events;
pub mod logging;
pub mod observer;

pub use bus::EventBus;
pub use environment::{Environment, EnvironmentBuilder};
pub use events::{FunctionEvent, ModelCallResult};
pub use logging::{FunctionLogging, LoggingObserver};
pub use observer::{ChannelObserver, EventRecorder, FnObserver, FunctionObserver, observer_fn};
