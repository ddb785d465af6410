//! Read-only tenant lookup.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use outpost_common::application::Application;

use crate::Result;

/// Lookup of one tenant application by id.
///
/// Delivery only ever reads tenant records; registration and mutation
/// belong to the intake boundary.
#[async_trait]
pub trait ApplicationStore: Send + Sync + std::fmt::Debug {
    /// Fetch an application, or `None` if the tenant is unknown.
    ///
    /// # Errors
    /// If the underlying store cannot be read.
    async fn application(&self, id: &str) -> Result<Option<Application>>;
}

/// In-memory application registry.
///
/// Suitable for tests and for deployments with a static tenant set.
#[derive(Debug, Clone, Default)]
pub struct MemoryApplicationStore {
    applications: Arc<RwLock<HashMap<String, Application>>>,
}

impl MemoryApplicationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a tenant record.
    pub fn insert(&self, application: Application) {
        self.applications
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(application.id.clone(), application);
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn application(&self, id: &str) -> Result<Option<Application>> {
        Ok(self.applications.read()?.get(id).cloned())
    }
}
