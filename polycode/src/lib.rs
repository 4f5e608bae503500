//! Terraform provider for Polycode content
//!
//! Exposes the `polycode_content` resource, which manages exercise content
//! through the Polycode content API.

pub mod api;
pub mod resources;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tfplug::context::Context;
use tfplug::provider::Provider;
use tfplug::resource::Resource;
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Config, Diagnostic};

pub use resources::ContentResource;

pub const ENDPOINT_ENV: &str = "POLYCODE_ENDPOINT";
pub const API_TOKEN_ENV: &str = "POLYCODE_API_TOKEN";

pub struct PolycodeProvider {
    client: Option<api::Client>,
}

impl Default for PolycodeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PolycodeProvider {
    pub fn new() -> Self {
        Self { client: None }
    }

    /// Provider block value, falling back to the environment when unset
    fn setting(config: &Config, name: &str, env: &str) -> Option<String> {
        config
            .get_string(&AttributePath::new(name))
            .ok()
            .or_else(|| std::env::var(env).ok())
            .filter(|value| !value.is_empty())
    }
}

#[async_trait]
impl Provider for PolycodeProvider {
    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages Polycode exercise content")
            .attribute(
                AttributeBuilder::string("endpoint")
                    .description("Base URL of the Polycode API, defaults to POLYCODE_ENDPOINT")
                    .optional(),
            )
            .attribute(
                AttributeBuilder::string("api_token")
                    .description("Bearer token for the Polycode API, defaults to POLYCODE_API_TOKEN")
                    .optional()
                    .sensitive(),
            )
            .build()
    }

    async fn configure(&mut self, _ctx: Context, config: Config) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];

        let endpoint = Self::setting(&config, "endpoint", ENDPOINT_ENV);
        let api_token = Self::setting(&config, "api_token", API_TOKEN_ENV);

        match (endpoint, api_token) {
            (Some(endpoint), Some(api_token)) => match api::Client::new(&endpoint, &api_token) {
                Ok(client) => {
                    tracing::debug!("Configured Polycode client for {}", endpoint);
                    self.client = Some(client);
                }
                Err(e) => diagnostics.push(
                    Diagnostic::error("Failed to create API client", e.to_string())
                        .with_attribute(AttributePath::new("endpoint")),
                ),
            },
            (None, _) => diagnostics.push(
                Diagnostic::error(
                    "Missing endpoint",
                    format!(
                        "endpoint is required (set in provider config or {} env var)",
                        ENDPOINT_ENV
                    ),
                )
                .with_attribute(AttributePath::new("endpoint")),
            ),
            (_, None) => diagnostics.push(
                Diagnostic::error(
                    "Missing api_token",
                    format!(
                        "api_token is required (set in provider config or {} env var)",
                        API_TOKEN_ENV
                    ),
                )
                .with_attribute(AttributePath::new("api_token")),
            ),
        }

        diagnostics
    }

    async fn resource_schemas(&self) -> HashMap<String, Schema> {
        static SCHEMAS: OnceLock<HashMap<String, Schema>> = OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    resources::content::resource::TYPE_NAME.to_string(),
                    ContentResource::schema_static().clone(),
                );
                schemas
            })
            .clone()
    }

    async fn create_resource(&self, name: &str) -> tfplug::Result<Box<dyn Resource>> {
        let client = self
            .client
            .as_ref()
            .ok_or(tfplug::TfplugError::ProviderNotConfigured)?
            .clone();

        match name {
            resources::content::resource::TYPE_NAME => {
                Ok(Box::new(ContentResource::new(Arc::new(client))))
            }
            _ => Err(tfplug::TfplugError::ResourceNotFound(name.to_string())),
        }
    }
}
