//! Push structured log records onto a Redis list.
//!
//! A [`SinkProvider`] owns one Redis connection and hands out one
//! [`Emitter`] per category. Each logging call is normalized into a
//! [`LogRecord`], serialized as a single JSON document and appended with
//! `RPUSH`. Failures on that path are swallowed so logging never fails the
//! application. [`RedisLayer`] plugs the provider into `tracing`.

pub mod config;
pub mod connection;
pub mod descriptor;
pub mod emitter;
pub mod env;
pub mod error;
pub mod exception;
pub mod init;
pub mod layer;
pub mod level;
pub mod memory;
pub mod provider;
pub mod record;
pub mod state;

pub use config::SinkConfig;
pub use connection::{ConnectionFactory, RedisConnectionFactory, StoreConnection};
pub use emitter::{Emitter, EventId, Formatter, Scope};
pub use error::{SinkError, StoreError};
pub use exception::Exception;
pub use layer::RedisLayer;
pub use level::Level;
pub use memory::MemoryConnectionFactory;
pub use provider::{SinkProvider, SinkProviderBuilder};
pub use record::LogRecord;
pub use state::{CapturedState, LogState, ORIGINAL_FORMAT_KEY};
