//! Resource trait and its request/response types
//!
//! Every operation answers with a response rather than a `Result`: failures
//! are reported as diagnostics next to the state Terraform should keep.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;

/// CRUD half of a managed resource
/// `type_name` must match the key used in `Provider::resource_schemas`
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &str;

    /// Build the schema once and hand out clones
    async fn schema(&self, ctx: Context) -> Schema;

    /// Plan-time check of the configuration, before any remote call
    async fn validate(
        &self,
        ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse;

    /// The returned state must carry every computed attribute
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// `new_state: None` tells Terraform the remote object is gone
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;
}

#[derive(Debug, Clone)]
pub struct ValidateResourceConfigRequest {
    pub config: DynamicValue,
}

#[derive(Debug, Default)]
pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct CreateResourceRequest {
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

#[derive(Debug)]
pub struct CreateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ReadResourceRequest {
    pub current_state: DynamicValue,
}

#[derive(Debug)]
pub struct ReadResourceResponse {
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct UpdateResourceRequest {
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

#[derive(Debug)]
pub struct UpdateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct DeleteResourceRequest {
    pub prior_state: DynamicValue,
}

#[derive(Debug, Default)]
pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

impl CreateResourceResponse {
    /// Failed create; `state` is handed back untouched
    pub fn failed(state: DynamicValue, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: state,
            diagnostics: vec![diagnostic],
        }
    }
}

impl ReadResourceResponse {
    pub fn found(state: DynamicValue) -> Self {
        Self {
            new_state: Some(state),
            diagnostics: vec![],
        }
    }

    pub fn removed() -> Self {
        Self {
            new_state: None,
            diagnostics: vec![],
        }
    }

    /// Failed refresh; the current state is kept
    pub fn failed(state: DynamicValue, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: Some(state),
            diagnostics: vec![diagnostic],
        }
    }
}

impl UpdateResourceResponse {
    /// Failed update; `state` should be the prior state
    pub fn failed(state: DynamicValue, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: state,
            diagnostics: vec![diagnostic],
        }
    }
}

impl DeleteResourceResponse {
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

/// Resources that can be adopted with `terraform import`
#[async_trait]
pub trait ResourceWithImportState: Resource {
    /// The imported state only needs what the following read requires
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse;
}

#[derive(Debug, Clone)]
pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

#[derive(Debug, Default)]
pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}
