//! Content model as exchanged with the Polycode content API
//!
//! A content's body is a tree of components. Only containers have children,
//! and a child's position is its index in the parent's `components` list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root aggregate of the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub reward: i64,
    pub root_component: Component,
    #[serde(default)]
    pub data: ContentData,
}

/// Free-form content data, unused by exercises
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentData {}

/// A node of the component tree; `id` stays empty until the API assigns one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(flatten)]
    pub kind: ComponentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentKind {
    Container {
        orientation: Orientation,
        data: ContainerData,
    },
    Markdown {
        data: MarkdownData,
    },
    Editor {
        data: EditorData,
    },
}

impl Component {
    pub fn container(id: impl Into<String>, orientation: Orientation, components: Vec<Component>) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Container {
                orientation,
                data: ContainerData { components },
            },
        }
    }

    pub fn markdown(id: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Markdown {
                data: MarkdownData {
                    markdown: markdown.into(),
                },
            },
        }
    }

    pub fn editor(id: impl Into<String>, data: EditorData) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Editor { data },
        }
    }

    pub fn component_type(&self) -> &'static str {
        match self.kind {
            ComponentKind::Container { .. } => "container",
            ComponentKind::Markdown { .. } => "markdown",
            ComponentKind::Editor { .. } => "editor",
        }
    }

    /// Children in render order; empty for leaf components
    pub fn children(&self) -> &[Component] {
        match &self.kind {
            ComponentKind::Container { data, .. } => &data.components,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerData {
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownData {
    pub markdown: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorData {
    pub editor_settings: EditorSettings,
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// Hints attached to the editor, by item id
    #[serde(default)]
    pub items: Vec<ItemIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(default)]
    pub default_code: String,
    pub language: LanguageKind,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LanguageKind {
    Python,
    Node,
    Java,
    Rust,
}

impl LanguageKind {
    pub const ALL: [LanguageKind; 4] = [
        LanguageKind::Python,
        LanguageKind::Node,
        LanguageKind::Java,
        LanguageKind::Rust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageKind::Python => "PYTHON",
            LanguageKind::Node => "NODE",
            LanguageKind::Java => "JAVA",
            LanguageKind::Rust => "RUST",
        }
    }
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown language '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub is_hidden: bool,
    pub input: ValidatorInput,
    pub output: ValidatorOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorInput {
    pub stdin: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorOutput {
    pub stdout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemIdentifier {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            other => Err(format!("unknown orientation '{}'", other)),
        }
    }
}
