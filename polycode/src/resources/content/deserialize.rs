//! API component tree to configuration blocks

use super::model::{ContainerBlock, EditorBlock, LanguageSettingBlock, MarkdownBlock, ValidatorBlock};
use crate::api::content::{Component, ComponentKind, EditorData};

/// Rebuilds the `container` block list for a container component
///
/// `position` is the slot the container occupies in its parent, 0 for the
/// root container. Children get `index + 1` as their position since the tree
/// only stores them in order. The result holds a single block, or none when
/// `component` is not a container.
pub fn deserialize_container(component: &Component, position: i64) -> Vec<ContainerBlock> {
    let ComponentKind::Container { orientation, data } = &component.kind else {
        tracing::warn!(
            "Component {} is a {}, not a container",
            component.id,
            component.component_type()
        );
        return Vec::new();
    };

    tracing::debug!(
        "Deserializing container {} with {} child components",
        component.id,
        data.components.len()
    );

    let mut block = ContainerBlock {
        id: component.id.clone(),
        position,
        orientation: *orientation,
        markdown: Vec::new(),
        editor: Vec::new(),
        container: Vec::new(),
    };

    for (child_position, child) in (1..).zip(&data.components) {
        match &child.kind {
            ComponentKind::Markdown { data } => block.markdown.push(MarkdownBlock {
                id: child.id.clone(),
                position: child_position,
                content: data.markdown.clone(),
            }),
            ComponentKind::Editor { data } => {
                block.editor.push(editor_block(&child.id, child_position, data))
            }
            // Each nested container replaces the list; only the last survives
            ComponentKind::Container { .. } => {
                block.container = deserialize_container(child, child_position)
            }
        }
    }

    vec![block]
}

fn editor_block(id: &str, position: i64, data: &EditorData) -> EditorBlock {
    EditorBlock {
        id: id.to_string(),
        position,
        language_settings: data
            .editor_settings
            .languages
            .iter()
            .map(|language| LanguageSettingBlock {
                default_code: language.default_code.clone(),
                language: language.language,
                version: language.version.clone(),
            })
            .collect(),
        hint: data.items.iter().map(|item| item.id.clone()).collect(),
        validator: data
            .validators
            .iter()
            .map(|validator| ValidatorBlock {
                id: validator.id.clone(),
                inputs: validator.input.stdin.clone(),
                outputs: validator.output.stdout.clone(),
                is_hidden: validator.is_hidden,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::content::{
        EditorSettings, ItemIdentifier, Language, LanguageKind, Orientation, Validator,
        ValidatorInput, ValidatorOutput,
    };
    use crate::resources::content::serialize_container;
    use serde_json::json;
    use tfplug::types::Dynamic;

    fn editor(id: &str) -> Component {
        Component::editor(
            id,
            EditorData {
                editor_settings: EditorSettings {
                    languages: vec![Language {
                        default_code: String::new(),
                        language: LanguageKind::Python,
                        version: "3.12".to_string(),
                    }],
                },
                validators: vec![Validator {
                    id: format!("{}-v", id),
                    is_hidden: true,
                    input: ValidatorInput {
                        stdin: vec!["1 2".to_string()],
                    },
                    output: ValidatorOutput {
                        stdout: vec!["3".to_string()],
                    },
                }],
                items: vec![ItemIdentifier {
                    id: format!("{}-hint", id),
                }],
            },
        )
    }

    #[test]
    fn single_markdown_container_matches_state_shape() {
        let tree = Component::container(
            "root",
            Orientation::Horizontal,
            vec![Component::markdown("m1", "Hello")],
        );

        let blocks = deserialize_container(&tree, 0);

        assert_eq!(blocks.len(), 1);
        let state = Dynamic::List(blocks.iter().map(ContainerBlock::to_dynamic).collect());
        assert_eq!(
            state,
            Dynamic::from(json!([{
                "id": "root",
                "orientation": "horizontal",
                "position": 0,
                "markdown": [{ "id": "m1", "content": "Hello", "position": 1 }],
                "editor": [],
                "container": []
            }]))
        );
        assert_eq!(serialize_container(&blocks[0]).unwrap(), tree);
    }

    #[test]
    fn positions_follow_tree_order() {
        let tree = Component::container(
            "root",
            Orientation::Vertical,
            vec![editor("a"), Component::markdown("b", "B"), editor("c")],
        );

        let block = deserialize_container(&tree, 0).remove(0);

        let editors: Vec<_> = block.editor.iter().map(|e| (e.id.as_str(), e.position)).collect();
        assert_eq!(editors, vec![("a", 1), ("c", 3)]);
        assert_eq!(block.markdown[0].position, 2);
    }

    #[test]
    fn editor_fields_map_to_blocks() {
        let tree = Component::container("root", Orientation::Vertical, vec![editor("e1")]);

        let block = deserialize_container(&tree, 0).remove(0);

        let editor = &block.editor[0];
        assert_eq!(editor.hint, vec!["e1-hint"]);
        assert_eq!(editor.language_settings[0].language, LanguageKind::Python);
        assert_eq!(editor.language_settings[0].version, "3.12");
        assert_eq!(
            editor.validator[0],
            ValidatorBlock {
                id: "e1-v".to_string(),
                inputs: vec!["1 2".to_string()],
                outputs: vec!["3".to_string()],
                is_hidden: true,
            }
        );
    }

    #[test]
    fn last_nested_container_replaces_earlier_ones() {
        let tree = Component::container(
            "root",
            Orientation::Vertical,
            vec![
                Component::container("left", Orientation::Vertical, vec![]),
                Component::markdown("m", "between"),
                Component::container(
                    "right",
                    Orientation::Horizontal,
                    vec![Component::markdown("inner", "deep")],
                ),
            ],
        );

        let block = deserialize_container(&tree, 0).remove(0);

        let nested: Vec<_> = block
            .container
            .iter()
            .map(|c| (c.id.as_str(), c.position))
            .collect();
        assert_eq!(nested, vec![("right", 3)]);
        assert_eq!(block.container[0].markdown[0].position, 1);
        assert_eq!(block.markdown[0].position, 2);
    }

    #[test]
    fn round_trip_preserves_tree() {
        let tree = Component::container(
            "root",
            Orientation::Horizontal,
            vec![
                editor("e1"),
                Component::container(
                    "c1",
                    Orientation::Vertical,
                    vec![
                        Component::markdown("m2", "inner"),
                        Component::container("c2", Orientation::Horizontal, vec![editor("e2")]),
                    ],
                ),
                Component::markdown("m1", "outer"),
            ],
        );

        let blocks = deserialize_container(&tree, 0);

        assert_eq!(serialize_container(&blocks[0]).unwrap(), tree);
    }

    #[test]
    fn leaf_root_yields_no_blocks() {
        let blocks = deserialize_container(&Component::markdown("m1", "text"), 0);
        assert!(blocks.is_empty());
    }
}
