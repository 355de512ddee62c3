//! # Stratus Core
//!
//! Shared data model for the Stratus deployment framework.
//!
//! This crate carries the pieces every other Stratus crate agrees on: the
//! engine error taxonomy, the declarative service description, the
//! resolved CLI options, cooperative cancellation, and the shared
//! per-invocation [`ServiceContext`].
//!
//! Nothing in here performs I/O at run time except the service-file
//! loader; the orchestration engine itself lives in `stratus-lifecycle`.

pub mod cancel;
pub mod context;
pub mod error;
pub mod options;
pub mod service;

pub use cancel::CancelToken;
pub use context::ServiceContext;
pub use error::{BoxError, EngineError, EngineResult};
pub use options::RunOptions;
pub use service::{ProviderConfig, ServiceDescription};
