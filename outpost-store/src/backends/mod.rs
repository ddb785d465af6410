//! Queue store backends.
//!
//! Production deployments point the [`crate::QueueStore`] trait at an
//! external document store; the in-memory backend here backs tests and
//! transient single-process deployments.

pub mod memory;

pub use memory::MemoryQueueStore;
