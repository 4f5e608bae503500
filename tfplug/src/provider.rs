use crate::context::Context;
use crate::resource::Resource;
use crate::schema::Schema;
use crate::types::{Config, Diagnostic};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Factory-style provider: configure once, then hand out resources on demand
#[async_trait]
pub trait Provider: Send + Sync {
    /// Schema of the provider block itself
    fn schema(&self) -> Schema;

    /// Called with the provider block; keep API clients built here
    async fn configure(&mut self, ctx: Context, config: Config) -> Vec<Diagnostic>;

    /// Schemas for every resource type, keyed by type name
    /// Computed once at registration time
    async fn resource_schemas(&self) -> HashMap<String, Schema>;

    /// Creates a resource instance; fails before configure() has succeeded
    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>>;
}
