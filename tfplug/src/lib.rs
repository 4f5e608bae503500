//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider-facing half of a Terraform plugin: dynamic values, schemas
//! with validation and defaults, diagnostics, and the async resource and
//! provider traits.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::Provider;
pub use resource::{Resource, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, Block, BlockBuilder, Schema, SchemaBuilder};
pub use types::{AttributePath, Config, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue, State};
