//! Configuration blocks to API component tree

use super::model::{ContainerBlock, EditorBlock};
use super::ContentError;
use crate::api::content::{
    Component, EditorData, EditorSettings, ItemIdentifier, Language, Validator, ValidatorInput,
    ValidatorOutput,
};

/// Builds the component tree rooted at `container`
///
/// Children of every container must use each position of `1..=N` exactly
/// once, N being the number of children declared at that level across the
/// markdown, editor and container lists. Nothing is returned for a partially
/// valid tree.
pub fn serialize_container(container: &ContainerBlock) -> Result<Component, ContentError> {
    let count = container.child_count();
    tracing::debug!(
        "Serializing container {} with {} child components",
        container.id, count
    );

    let mut slots: Vec<Option<Component>> = vec![None; count];

    for markdown in &container.markdown {
        let slot = slot_index(markdown.position, count)?;
        slots[slot] = Some(Component::markdown(
            markdown.id.clone(),
            markdown.content.clone(),
        ));
    }

    for editor in &container.editor {
        let slot = slot_index(editor.position, count)?;
        slots[slot] = Some(Component::editor(editor.id.clone(), editor_data(editor)));
    }

    for nested in &container.container {
        let slot = slot_index(nested.position, count)?;
        slots[slot] = Some(serialize_container(nested)?);
    }

    // A duplicated position overwrites a slot and leaves another one empty
    let components = slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.ok_or(ContentError::MissingPosition {
                position: idx + 1,
                count,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Component::container(
        container.id.clone(),
        container.orientation,
        components,
    ))
}

fn slot_index(position: i64, count: usize) -> Result<usize, ContentError> {
    if position < 1 {
        return Err(ContentError::PositionBelowOne { position });
    }
    let slot = usize::try_from(position - 1)
        .map_err(|_| ContentError::PositionOutOfRange { position, count })?;
    if slot >= count {
        return Err(ContentError::PositionOutOfRange { position, count });
    }
    Ok(slot)
}

fn editor_data(editor: &EditorBlock) -> EditorData {
    let languages = editor
        .language_settings
        .iter()
        .map(|setting| Language {
            default_code: setting.default_code.clone(),
            language: setting.language,
            version: setting.version.clone(),
        })
        .collect();

    let validators = editor
        .validator
        .iter()
        .map(|validator| Validator {
            id: validator.id.clone(),
            is_hidden: validator.is_hidden,
            input: ValidatorInput {
                stdin: validator.inputs.clone(),
            },
            output: ValidatorOutput {
                stdout: validator.outputs.clone(),
            },
        })
        .collect();

    let items = editor
        .hint
        .iter()
        .map(|id| ItemIdentifier { id: id.clone() })
        .collect();

    EditorData {
        editor_settings: EditorSettings { languages },
        validators,
        items,
    }
}
