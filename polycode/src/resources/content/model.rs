//! Typed form of the content blocks
//!
//! Each container level of the configuration decodes into a [`ContainerBlock`]
//! whose child lists are typed, so the transcoders never inspect raw
//! [`Dynamic`] maps. Decoding only checks shapes; range rules live in the
//! schema validators and positional rules in the serializer.

use super::ContentError;
use crate::api::content::{LanguageKind, Orientation};
use std::collections::HashMap;
use tfplug::types::{AttributePath, Dynamic};

/// One container level: its own attributes plus every declared child
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerBlock {
    pub id: String,
    pub position: i64,
    pub orientation: Orientation,
    pub markdown: Vec<MarkdownBlock>,
    pub editor: Vec<EditorBlock>,
    pub container: Vec<ContainerBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownBlock {
    pub id: String,
    pub position: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorBlock {
    pub id: String,
    pub position: i64,
    pub language_settings: Vec<LanguageSettingBlock>,
    pub hint: Vec<String>,
    pub validator: Vec<ValidatorBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSettingBlock {
    pub default_code: String,
    pub language: LanguageKind,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorBlock {
    pub id: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub is_hidden: bool,
}

impl ContainerBlock {
    /// Total number of declared children across the three lists
    pub fn child_count(&self) -> usize {
        self.markdown.len() + self.editor.len() + self.container.len()
    }

    pub fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self, ContentError> {
        let object = object(value, path)?;
        let orientation = required_string(object, "orientation", path)?;

        Ok(Self {
            id: optional_string(object, "id", path)?,
            position: required_integer(object, "position", path)?,
            orientation: orientation
                .parse()
                .map_err(|reason| invalid(&path.clone().attribute("orientation"), reason))?,
            markdown: blocks(object, "markdown", path, MarkdownBlock::from_dynamic)?,
            editor: blocks(object, "editor", path, EditorBlock::from_dynamic)?,
            container: blocks(object, "container", path, ContainerBlock::from_dynamic)?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::map([
            ("id", Dynamic::from(self.id.as_str())),
            ("position", Dynamic::from(self.position)),
            ("orientation", Dynamic::from(self.orientation.as_str())),
            ("markdown", list(&self.markdown, MarkdownBlock::to_dynamic)),
            ("editor", list(&self.editor, EditorBlock::to_dynamic)),
            ("container", list(&self.container, ContainerBlock::to_dynamic)),
        ])
    }
}

impl MarkdownBlock {
    pub fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self, ContentError> {
        let object = object(value, path)?;
        Ok(Self {
            id: optional_string(object, "id", path)?,
            position: required_integer(object, "position", path)?,
            content: required_string(object, "content", path)?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::map([
            ("id", Dynamic::from(self.id.as_str())),
            ("position", Dynamic::from(self.position)),
            ("content", Dynamic::from(self.content.as_str())),
        ])
    }
}

impl EditorBlock {
    pub fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self, ContentError> {
        let object = object(value, path)?;
        Ok(Self {
            id: optional_string(object, "id", path)?,
            position: required_integer(object, "position", path)?,
            language_settings: blocks(
                object,
                "language_settings",
                path,
                LanguageSettingBlock::from_dynamic,
            )?,
            hint: string_list(object, "hint", path)?,
            validator: blocks(object, "validator", path, ValidatorBlock::from_dynamic)?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::map([
            ("id", Dynamic::from(self.id.as_str())),
            ("position", Dynamic::from(self.position)),
            (
                "language_settings",
                list(&self.language_settings, LanguageSettingBlock::to_dynamic),
            ),
            ("hint", list(&self.hint, |h| Dynamic::from(h.as_str()))),
            ("validator", list(&self.validator, ValidatorBlock::to_dynamic)),
        ])
    }
}

impl LanguageSettingBlock {
    pub fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self, ContentError> {
        let object = object(value, path)?;
        let language = required_string(object, "language", path)?;
        Ok(Self {
            default_code: optional_string(object, "default_code", path)?,
            language: language
                .parse()
                .map_err(|reason| invalid(&path.clone().attribute("language"), reason))?,
            version: optional_string(object, "version", path)?,
        })
    }

    /// Empty optional strings are written back as null so an unset
    /// attribute does not show a diff against the API's empty value
    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::map([
            ("default_code", null_if_empty(&self.default_code)),
            ("language", Dynamic::from(self.language.as_str())),
            ("version", null_if_empty(&self.version)),
        ])
    }
}

impl ValidatorBlock {
    pub fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self, ContentError> {
        let object = object(value, path)?;
        let is_hidden = match object.get("is_hidden") {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => false,
            Some(Dynamic::Bool(b)) => *b,
            Some(other) => {
                return Err(type_error(&path.clone().attribute("is_hidden"), "bool", other))
            }
        };

        Ok(Self {
            id: optional_string(object, "id", path)?,
            inputs: string_list(object, "inputs", path)?,
            outputs: string_list(object, "outputs", path)?,
            is_hidden,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::map([
            ("id", Dynamic::from(self.id.as_str())),
            ("inputs", list(&self.inputs, |s| Dynamic::from(s.as_str()))),
            ("outputs", list(&self.outputs, |s| Dynamic::from(s.as_str()))),
            ("is_hidden", Dynamic::Bool(self.is_hidden)),
        ])
    }
}

fn invalid(path: &AttributePath, reason: impl Into<String>) -> ContentError {
    ContentError::InvalidAttribute {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn type_error(path: &AttributePath, expected: &str, actual: &Dynamic) -> ContentError {
    invalid(
        path,
        format!("expected {}, got {}", expected, actual.type_name()),
    )
}

fn object<'a>(
    value: &'a Dynamic,
    path: &AttributePath,
) -> Result<&'a HashMap<String, Dynamic>, ContentError> {
    value.as_map().ok_or_else(|| type_error(path, "object", value))
}

fn required_string(
    object: &HashMap<String, Dynamic>,
    name: &str,
    path: &AttributePath,
) -> Result<String, ContentError> {
    let path = path.clone().attribute(name);
    match object.get(name) {
        Some(Dynamic::String(s)) => Ok(s.clone()),
        None | Some(Dynamic::Null) => Err(invalid(&path, "attribute is required")),
        Some(other) => Err(type_error(&path, "string", other)),
    }
}

/// Absent, null and unknown (computed ids during planning) read as empty
fn optional_string(
    object: &HashMap<String, Dynamic>,
    name: &str,
    path: &AttributePath,
) -> Result<String, ContentError> {
    match object.get(name) {
        None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(String::new()),
        Some(Dynamic::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_error(&path.clone().attribute(name), "string", other)),
    }
}

fn required_integer(
    object: &HashMap<String, Dynamic>,
    name: &str,
    path: &AttributePath,
) -> Result<i64, ContentError> {
    let path = path.clone().attribute(name);
    match object.get(name) {
        Some(value @ Dynamic::Number(_)) => value
            .as_i64()
            .ok_or_else(|| invalid(&path, "expected a whole number")),
        None | Some(Dynamic::Null) => Err(invalid(&path, "attribute is required")),
        Some(other) => Err(type_error(&path, "number", other)),
    }
}

fn string_list(
    object: &HashMap<String, Dynamic>,
    name: &str,
    path: &AttributePath,
) -> Result<Vec<String>, ContentError> {
    let path = path.clone().attribute(name);
    items(object, name, &path)?
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_string()
                .cloned()
                .ok_or_else(|| type_error(&path.clone().index(idx), "string", item))
        })
        .collect()
}

/// Decodes every item of a nested block list, stopping at the first error
fn blocks<T>(
    object: &HashMap<String, Dynamic>,
    name: &str,
    path: &AttributePath,
    decode: fn(&Dynamic, &AttributePath) -> Result<T, ContentError>,
) -> Result<Vec<T>, ContentError> {
    let path = path.clone().attribute(name);
    items(object, name, &path)?
        .iter()
        .enumerate()
        .map(|(idx, item)| decode(item, &path.clone().index(idx)))
        .collect()
}

fn items<'a>(
    object: &'a HashMap<String, Dynamic>,
    name: &str,
    path: &AttributePath,
) -> Result<&'a [Dynamic], ContentError> {
    match object.get(name) {
        None | Some(Dynamic::Null) => Ok(&[]),
        Some(Dynamic::List(items)) => Ok(items.as_slice()),
        Some(other) => Err(type_error(path, "list", other)),
    }
}

fn list<T>(items: &[T], encode: impl Fn(&T) -> Dynamic) -> Dynamic {
    Dynamic::List(items.iter().map(encode).collect())
}

fn null_if_empty(value: &str) -> Dynamic {
    if value.is_empty() {
        Dynamic::Null
    } else {
        Dynamic::from(value)
    }
}
