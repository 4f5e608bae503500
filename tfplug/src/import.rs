//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID to a specific attribute in state
///
/// This is useful for resources whose remote identifier is all a read needs.
///
/// Example: ID "c9f3" -> state.id = "c9f3"
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.trim().is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Missing import ID",
                "An import ID is required to import this resource",
            )
            .with_attribute(attr_path),
        );
        return;
    }

    let mut state = DynamicValue::empty_object();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!(
                    "Could not set attribute '{}' to value '{}'",
                    attr_path, request.id
                ),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "test_resource".to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn passthrough_writes_id_into_state() {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("id"),
            &request("abc-123"),
            &mut response,
        );

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.imported_resources.len(), 1);
        let imported = &response.imported_resources[0];
        assert_eq!(imported.type_name, "test_resource");
        assert_eq!(
            imported.state.get_string(&AttributePath::new("id")).unwrap(),
            "abc-123"
        );
    }

    #[test]
    fn passthrough_rejects_blank_id() {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("id"),
            &request("  "),
            &mut response,
        );

        assert!(response.imported_resources.is_empty());
        assert_eq!(response.diagnostics[0].summary, "Missing import ID");
    }
}
