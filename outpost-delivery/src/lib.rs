//! The message delivery engine.
//!
//! Drains the durable queue on a fixed interval: each tick selects a
//! bounded batch of due messages, resolves the owning tenant's SMTP
//! credentials, dispatches each message independently, and writes the
//! resulting state transition back through the queue store.

pub mod config;
pub mod credentials;
pub mod dispatcher;
mod error;
pub mod scheduler;
pub mod worker;

pub use config::DeliveryConfig;
pub use credentials::{SmtpCredentials, resolve};
pub use dispatcher::{Dispatcher, SmtpDispatcher};
pub use error::DeliveryError;
pub use scheduler::Scheduler;
pub use worker::{DeliveryWorker, TickSummary};
