//! Storage contracts for the relay core.
//!
//! The durable message table and the tenant registry live in whatever
//! document store a deployment uses; the delivery engine only ever sees
//! the [`QueueStore`] and [`ApplicationStore`] traits. In-memory
//! implementations are provided for tests and transient deployments.

pub mod applications;
pub mod backends;
pub mod error;
pub mod r#trait;

pub use applications::{ApplicationStore, MemoryApplicationStore};
pub use backends::MemoryQueueStore;
pub use error::{Result, StoreError};
pub use r#trait::QueueStore;
