//! Content resource implementation

use super::model::ContainerBlock;
use super::schema::content_schema;
use super::{deserialize_container, serialize_container};
use crate::api::content::{Content, ContentData};
use crate::api::{ApiError, ContentApi};
use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceWithImportState, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::Schema;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue, State};

pub const TYPE_NAME: &str = "polycode_content";

/// RFC 850 layout, as shown in `last_update`
const LAST_UPDATE_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S UTC";

pub struct ContentResource {
    api: Arc<dyn ContentApi>,
}

impl ContentResource {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self { api }
    }

    /// Built on first use and shared by every resource instance
    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(content_schema)
    }

    /// Builds the API content from a planned state, applying schema defaults
    /// first so unset optional attributes read as their default
    fn content_from_plan(&self, plan: &DynamicValue, id: String) -> Result<Content, Diagnostic> {
        let mut value = plan.value.clone();
        Self::schema_static().block.apply_defaults(&mut value);
        let plan = DynamicValue::new(value);

        let attribute = |name: &str| {
            plan.get_string(&AttributePath::new(name)).map_err(|e| {
                Diagnostic::error(format!("Missing {}", name), e.to_string())
                    .with_attribute(AttributePath::new(name))
            })
        };
        let reward = plan
            .get(&AttributePath::new("reward"))
            .ok()
            .and_then(Dynamic::as_i64)
            .ok_or_else(|| {
                Diagnostic::error("Missing reward", "The 'reward' attribute must be a whole number")
                    .with_attribute(AttributePath::new("reward"))
            })?;

        let root_path = AttributePath::new("container").index(0);
        let root_component = plan
            .get(&root_path)
            .map_err(|e| e.to_string())
            .and_then(|root| {
                ContainerBlock::from_dynamic(root, &root_path).map_err(|e| e.to_string())
            })
            .and_then(|block| serialize_container(&block).map_err(|e| e.to_string()))
            .map_err(|e| {
                Diagnostic::error(
                    "Unable to serialize child components",
                    format!("Error when serializing child components: {}", e),
                )
            })?;

        Ok(Content {
            id,
            name: attribute("name")?,
            description: attribute("description")?,
            content_type: attribute("type")?,
            reward,
            root_component,
            data: ContentData::default(),
        })
    }

    /// Fetches the content and renders it as state; `last_update` is kept as
    /// given since the API does not track it
    async fn read_state(&self, id: &str, last_update: Dynamic) -> Result<DynamicValue, ApiError> {
        tracing::debug!("Reading Content {}", id);
        let content = self.api.get_content(id).await?;
        Ok(content_state(&content, last_update))
    }
}

/// Renders remote content as resource state
pub fn content_state(content: &Content, last_update: Dynamic) -> State {
    let container = deserialize_container(&content.root_component, 0)
        .iter()
        .map(ContainerBlock::to_dynamic)
        .collect();

    DynamicValue::new(Dynamic::map([
        ("id", Dynamic::from(content.id.as_str())),
        ("name", Dynamic::from(content.name.as_str())),
        ("description", Dynamic::from(content.description.as_str())),
        ("type", Dynamic::from(content.content_type.as_str())),
        ("reward", Dynamic::from(content.reward)),
        ("last_update", last_update),
        ("container", Dynamic::List(container)),
    ]))
}

fn state_id(state: &DynamicValue) -> Option<String> {
    state
        .get_string(&AttributePath::new("id"))
        .ok()
        .filter(|id| !id.is_empty())
}

fn last_update(state: &DynamicValue) -> Dynamic {
    state
        .get(&AttributePath::new("last_update"))
        .cloned()
        .unwrap_or(Dynamic::Null)
}

fn cancelled(operation: &str) -> Diagnostic {
    Diagnostic::error(
        "Operation cancelled",
        format!("The {} request was cancelled before reaching the API", operation),
    )
}

fn read_error(e: ApiError) -> Diagnostic {
    Diagnostic::error(
        "Unable to get Content",
        format!("Error when getting Content: {}", e),
    )
}

fn missing_id() -> Diagnostic {
    Diagnostic::error("Missing content id", "The state does not hold a content id")
        .with_attribute(AttributePath::new("id"))
}

#[async_trait]
impl Resource for ContentResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(&self, _ctx: Context) -> Schema {
        Self::schema_static().clone()
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];
        Self::schema_static().block.validate(
            &request.config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        if ctx.is_cancelled() {
            return CreateResourceResponse::failed(request.planned_state, cancelled("create"));
        }

        let content = match self.content_from_plan(&request.planned_state, String::new()) {
            Ok(content) => content,
            Err(diag) => return CreateResourceResponse::failed(request.planned_state, diag),
        };

        let created = match self.api.create_content(&content).await {
            Ok(created) => created,
            Err(e) => {
                return CreateResourceResponse::failed(
                    request.planned_state,
                    Diagnostic::error(
                        "Unable to create content",
                        format!("Error when creating content: {}", e),
                    ),
                )
            }
        };

        tracing::info!("Created Content {}", created.id);

        match self.read_state(&created.id, Dynamic::Null).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            // The content exists remotely, keep its id in state
            Err(e) => {
                CreateResourceResponse::failed(content_state(&created, Dynamic::Null), read_error(e))
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(id) = state_id(&request.current_state) else {
            return ReadResourceResponse::removed();
        };

        if ctx.is_cancelled() {
            return ReadResourceResponse::failed(request.current_state, cancelled("read"));
        }

        match self
            .read_state(&id, last_update(&request.current_state))
            .await
        {
            Ok(state) => ReadResourceResponse::found(state),
            Err(e) if e.is_not_found() => {
                tracing::info!("Content {} no longer exists, removing it from state", id);
                ReadResourceResponse::removed()
            }
            Err(e) => ReadResourceResponse::failed(request.current_state, read_error(e)),
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let Some(id) = state_id(&request.prior_state) else {
            return UpdateResourceResponse::failed(request.prior_state, missing_id());
        };

        if ctx.is_cancelled() {
            return UpdateResourceResponse::failed(request.prior_state, cancelled("update"));
        }

        let content = match self.content_from_plan(&request.planned_state, id) {
            Ok(content) => content,
            Err(diag) => return UpdateResourceResponse::failed(request.prior_state, diag),
        };

        if let Err(e) = self.api.update_content(&content).await {
            return UpdateResourceResponse::failed(
                request.prior_state,
                Diagnostic::error(
                    "Unable to update content",
                    format!("Error when updating content: {}", e),
                ),
            );
        }

        tracing::info!("Updated Content {}", content.id);

        let stamp = Dynamic::from(chrono::Utc::now().format(LAST_UPDATE_FORMAT).to_string());
        match self.read_state(&content.id, stamp.clone()).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => {
                UpdateResourceResponse::failed(content_state(&content, stamp), read_error(e))
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let Some(id) = state_id(&request.prior_state) else {
            // Nothing was ever created remotely
            return DeleteResourceResponse::default();
        };

        if ctx.is_cancelled() {
            return DeleteResourceResponse::failed(cancelled("delete"));
        }

        match self.api.delete_content(&id).await {
            Ok(()) => tracing::info!("Deleted Content {}", id),
            Err(e) if e.is_not_found() => tracing::info!("Content {} was already deleted", id),
            Err(e) => {
                return DeleteResourceResponse::failed(Diagnostic::error(
                    "Unable to delete Content",
                    format!("Error when deleting Content: {}", e),
                ))
            }
        }

        DeleteResourceResponse::default()
    }
}

#[async_trait]
impl ResourceWithImportState for ContentResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::content::{Component, ComponentKind};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory content store assigning sequential ids like the API does
    #[derive(Default)]
    struct FakeApi {
        contents: Mutex<HashMap<String, Content>>,
        next_id: Mutex<usize>,
        unavailable: bool,
    }

    impl FakeApi {
        fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        fn assign_ids(&self, component: &mut Component) {
            if component.id.is_empty() {
                component.id = self.next_id();
            }
            match &mut component.kind {
                ComponentKind::Container { data, .. } => {
                    for child in &mut data.components {
                        self.assign_ids(child);
                    }
                }
                ComponentKind::Editor { data } => {
                    for validator in &mut data.validators {
                        if validator.id.is_empty() {
                            validator.id = self.next_id();
                        }
                    }
                }
                ComponentKind::Markdown { .. } => {}
            }
        }

        fn next_id(&self) -> String {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("id-{}", next)
        }

        fn stored(&self, id: &str) -> Option<Content> {
            self.contents.lock().unwrap().get(id).cloned()
        }

        fn check_available(&self) -> Result<(), ApiError> {
            if self.unavailable {
                return Err(ApiError::ServiceUnavailable);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ContentApi for FakeApi {
        async fn create_content(&self, content: &Content) -> Result<Content, ApiError> {
            self.check_available()?;
            let mut content = content.clone();
            content.id = self.next_id();
            self.assign_ids(&mut content.root_component);
            self.contents
                .lock()
                .unwrap()
                .insert(content.id.clone(), content.clone());
            Ok(content)
        }

        async fn get_content(&self, id: &str) -> Result<Content, ApiError> {
            self.check_available()?;
            self.stored(id)
                .ok_or_else(|| ApiError::NotFound(format!("/content/{}", id)))
        }

        async fn update_content(&self, content: &Content) -> Result<Content, ApiError> {
            self.check_available()?;
            if self.stored(&content.id).is_none() {
                return Err(ApiError::NotFound(format!("/content/{}", content.id)));
            }
            let mut content = content.clone();
            self.assign_ids(&mut content.root_component);
            self.contents
                .lock()
                .unwrap()
                .insert(content.id.clone(), content.clone());
            Ok(content)
        }

        async fn delete_content(&self, id: &str) -> Result<(), ApiError> {
            self.check_available()?;
            self.contents
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| ApiError::NotFound(format!("/content/{}", id)))
        }
    }

    fn plan(container: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(json!({
            "id": null,
            "name": "Sum two numbers",
            "description": "Read two numbers and print their sum",
            "type": "exercise",
            "reward": 10,
            "last_update": null,
            "container": [container]
        })))
    }

    fn exercise_plan() -> DynamicValue {
        plan(json!({
            "position": 0,
            "orientation": "horizontal",
            "markdown": [{ "position": 1, "content": "# Sum" }],
            "editor": [{
                "position": 2,
                "language_settings": [{ "language": "PYTHON", "version": "3.12" }],
                "hint": [],
                "validator": [{ "inputs": ["1 2"], "outputs": ["3"] }]
            }]
        }))
    }

    async fn create(resource: &ContentResource, planned_state: DynamicValue) -> CreateResourceResponse {
        resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    config: planned_state.clone(),
                    planned_state,
                },
            )
            .await
    }

    #[tokio::test]
    async fn create_stores_content_and_returns_remote_ids() {
        let api = Arc::new(FakeApi::default());
        let resource = ContentResource::new(api.clone());

        let response = create(&resource, exercise_plan()).await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        let id = state.get_string(&AttributePath::new("id")).unwrap();
        let stored = api.stored(&id).unwrap();
        assert_eq!(stored.reward, 10);
        assert_eq!(stored.root_component.children().len(), 2);

        let editor = AttributePath::new("container").index(0).attribute("editor").index(0);
        assert_eq!(state.get_number(&editor.clone().attribute("position")).unwrap(), 2.0);
        assert!(!state.get_string(&editor.clone().attribute("id")).unwrap().is_empty());
        let validator = editor.attribute("validator").index(0);
        assert!(!state.get_bool(&validator.attribute("is_hidden")).unwrap());
    }

    #[tokio::test]
    async fn create_with_duplicate_positions_makes_no_remote_call() {
        let api = Arc::new(FakeApi::default());
        let resource = ContentResource::new(api.clone());
        let planned = plan(json!({
            "position": 0,
            "orientation": "vertical",
            "markdown": [
                { "position": 1, "content": "a" },
                { "position": 1, "content": "b" }
            ]
        }));

        let response = create(&resource, planned.clone()).await;

        assert_eq!(response.diagnostics.len(), 1);
        let diag = &response.diagnostics[0];
        assert_eq!(diag.summary, "Unable to serialize child components");
        assert!(diag.detail.contains("position 2 is missing"));
        assert_eq!(response.new_state, planned);
        assert!(api.contents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_reports_api_failure() {
        let resource = ContentResource::new(Arc::new(FakeApi::unavailable()));

        let response = create(&resource, exercise_plan()).await;

        assert_eq!(response.diagnostics[0].summary, "Unable to create content");
        assert_eq!(response.new_state, exercise_plan());
    }

    #[tokio::test]
    async fn cancelled_create_is_rejected() {
        let api = Arc::new(FakeApi::default());
        let resource = ContentResource::new(api.clone());
        let ctx = Context::new();
        ctx.cancel();

        let response = resource
            .create(
                ctx,
                CreateResourceRequest {
                    planned_state: exercise_plan(),
                    config: exercise_plan(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Operation cancelled");
        assert!(api.contents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_of_deleted_content_removes_state() {
        let resource = ContentResource::new(Arc::new(FakeApi::default()));
        let mut state = exercise_plan();
        state.set_string(&AttributePath::new("id"), "gone").unwrap();

        let response = resource
            .read(Context::new(), ReadResourceRequest { current_state: state })
            .await;

        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn read_failure_keeps_prior_state() {
        let resource = ContentResource::new(Arc::new(FakeApi::unavailable()));
        let mut state = exercise_plan();
        state.set_string(&AttributePath::new("id"), "c1").unwrap();

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    current_state: state.clone(),
                },
            )
            .await;

        assert_eq!(response.new_state, Some(state));
        assert_eq!(response.diagnostics[0].summary, "Unable to get Content");
    }

    #[tokio::test]
    async fn update_replaces_content_and_stamps_last_update() {
        let api = Arc::new(FakeApi::default());
        let resource = ContentResource::new(api.clone());
        let prior_state = create(&resource, exercise_plan()).await.new_state;
        let id = prior_state.get_string(&AttributePath::new("id")).unwrap();

        let mut planned_state = exercise_plan();
        planned_state.set_string(&AttributePath::new("id"), id.clone()).unwrap();
        planned_state
            .set_string(&AttributePath::new("name"), "Multiply two numbers")
            .unwrap();

        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    prior_state,
                    config: planned_state.clone(),
                    planned_state,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(api.stored(&id).unwrap().name, "Multiply two numbers");
        let stamp = response
            .new_state
            .get_string(&AttributePath::new("last_update"))
            .unwrap();
        assert!(stamp.ends_with(" UTC"));
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, LAST_UPDATE_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn update_failure_keeps_prior_state() {
        let resource = ContentResource::new(Arc::new(FakeApi::default()));
        let mut prior_state = exercise_plan();
        prior_state.set_string(&AttributePath::new("id"), "missing").unwrap();

        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    prior_state: prior_state.clone(),
                    planned_state: prior_state.clone(),
                    config: prior_state.clone(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Unable to update content");
        assert_eq!(response.new_state, prior_state);
    }

    #[tokio::test]
    async fn delete_treats_missing_content_as_deleted() {
        let api = Arc::new(FakeApi::default());
        let resource = ContentResource::new(api.clone());
        let state = create(&resource, exercise_plan()).await.new_state;

        for _ in 0..2 {
            let response = resource
                .delete(
                    Context::new(),
                    DeleteResourceRequest {
                        prior_state: state.clone(),
                    },
                )
                .await;
            assert!(response.diagnostics.is_empty());
        }
        assert!(api.contents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_api_failure() {
        let resource = ContentResource::new(Arc::new(FakeApi::unavailable()));
        let mut state = exercise_plan();
        state.set_string(&AttributePath::new("id"), "c1").unwrap();

        let response = resource
            .delete(Context::new(), DeleteResourceRequest { prior_state: state })
            .await;

        assert_eq!(response.diagnostics[0].summary, "Unable to delete Content");
    }

    #[tokio::test]
    async fn import_then_read_fills_state() {
        let api = Arc::new(FakeApi::default());
        let resource = ContentResource::new(api.clone());
        let id = create(&resource, exercise_plan())
            .await
            .new_state
            .get_string(&AttributePath::new("id"))
            .unwrap();

        let imported = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: TYPE_NAME.to_string(),
                    id: id.clone(),
                },
            )
            .await;
        assert!(imported.diagnostics.is_empty());
        let state = imported.imported_resources[0].state.clone();

        let response = resource
            .read(Context::new(), ReadResourceRequest { current_state: state })
            .await;

        let new_state = response.new_state.unwrap();
        assert_eq!(
            new_state.get_string(&AttributePath::new("name")).unwrap(),
            "Sum two numbers"
        );
        let markdown = AttributePath::new("container")
            .index(0)
            .attribute("markdown")
            .index(0)
            .attribute("content");
        assert_eq!(new_state.get_string(&markdown).unwrap(), "# Sum");
    }

    #[tokio::test]
    async fn validate_reports_schema_violations() {
        let resource = ContentResource::new(Arc::new(FakeApi::default()));
        let mut config = exercise_plan();
        config.set_string(&AttributePath::new("type"), "lesson").unwrap();

        let response = resource
            .validate(Context::new(), ValidateResourceConfigRequest { config })
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("type"))
        );
    }
}
