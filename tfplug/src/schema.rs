//! Schema types and builders for tfplug
//!
//! A resource schema is a root [`Block`]: plain attributes plus nested blocks.
//! Nested blocks are how Terraform expresses repeated sub-objects, and a
//! block's own nested blocks may go as deep as the provider builds them.

use crate::types::{AttributePath, Diagnostic, Dynamic};
use crate::validator::Validator;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>), // Ordered, allows duplicates
}

impl AttributeType {
    /// Whether `value` has the shape of this type. Null and unknown always match.
    pub fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) | (_, Dynamic::Unknown) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            _ => false,
        }
    }

    pub fn name(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Number => "number".to_string(),
            AttributeType::Bool => "bool".to_string(),
            AttributeType::List(elem) => format!("list({})", elem.name()),
        }
    }
}

/// Schema is returned by resources; version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

/// Block represents a configuration block
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, type_name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.block_types.is_empty()
    }

    /// Validates a configuration object against this block, pushing one
    /// diagnostic per offending field. Unknown values are not validated.
    pub fn validate(&self, value: &Dynamic, path: &AttributePath, diags: &mut Vec<Diagnostic>) {
        let object = match value {
            Dynamic::Unknown | Dynamic::Null => return,
            Dynamic::Map(m) => m,
            other => {
                diags.push(
                    Diagnostic::error(
                        "Incorrect block value type",
                        format!("Expected an object, got {}", other.type_name()),
                    )
                    .with_attribute(path.clone()),
                );
                return;
            }
        };

        for attr in &self.attributes {
            let attr_path = path.clone().attribute(&attr.name);
            let attr_value = object.get(&attr.name).unwrap_or(&Dynamic::Null);
            attr.validate(attr_value, &attr_path, diags);
        }

        for nested in &self.block_types {
            let nested_path = path.clone().attribute(&nested.type_name);
            let nested_value = object.get(&nested.type_name).unwrap_or(&Dynamic::Null);
            nested.validate(nested_value, &nested_path, diags);
        }
    }

    /// Fills absent or null attributes that carry a default, recursing into
    /// nested blocks
    pub fn apply_defaults(&self, value: &mut Dynamic) {
        let Dynamic::Map(object) = value else {
            return;
        };

        for attr in &self.attributes {
            let Some(default) = &attr.default else {
                continue;
            };
            let missing = object.get(&attr.name).map_or(true, Dynamic::is_null);
            if missing {
                object.insert(attr.name.clone(), default.default_value());
            }
        }

        for nested in &self.block_types {
            match object.get_mut(&nested.type_name) {
                Some(Dynamic::List(items)) => {
                    for item in items.iter_mut() {
                        nested.block.apply_defaults(item);
                    }
                }
                Some(item @ Dynamic::Map(_)) => nested.block.apply_defaults(item),
                _ => {}
            }
        }
    }
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub default: Option<Arc<dyn Default>>,
}

impl Attribute {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diags: &mut Vec<Diagnostic>) {
        if value.is_unknown() {
            return;
        }

        if value.is_null() {
            if self.required {
                diags.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!(
                            "The argument \"{}\" is required, but no definition was found.",
                            self.name
                        ),
                    )
                    .with_attribute(path.clone()),
                );
            }
            return;
        }

        if self.computed && !self.optional && !self.required {
            diags.push(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!(
                        "Can't configure a value for \"{}\": its value will be decided automatically.",
                        self.name
                    ),
                )
                .with_attribute(path.clone()),
            );
            return;
        }

        if !self.r#type.accepts(value) {
            diags.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!(
                        "Inappropriate value for attribute \"{}\": {} required, got {}.",
                        self.name,
                        self.r#type.name(),
                        value.type_name()
                    ),
                )
                .with_attribute(path.clone()),
            );
            return;
        }

        for validator in &self.validators {
            validator.validate(value, path, diags);
        }
    }
}

// Manual Debug implementation since validators/defaults don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: usize,
    /// Zero means unbounded
    pub max_items: usize,
}

impl NestedBlock {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diags: &mut Vec<Diagnostic>) {
        match (self.nesting, value) {
            (_, Dynamic::Unknown) => {}
            (NestingMode::Single, Dynamic::Null) => {
                if self.min_items > 0 {
                    diags.push(self.count_error("Missing required block", 0, path));
                }
            }
            (NestingMode::Single, item @ Dynamic::Map(_)) => self.block.validate(item, path, diags),
            (NestingMode::List, Dynamic::Null) => {
                if self.min_items > 0 {
                    diags.push(self.count_error("Insufficient blocks", 0, path));
                }
            }
            (NestingMode::List, Dynamic::List(items)) => {
                if items.len() < self.min_items {
                    diags.push(self.count_error("Insufficient blocks", items.len(), path));
                } else if self.max_items > 0 && items.len() > self.max_items {
                    diags.push(self.count_error("Too many blocks", items.len(), path));
                }
                for (idx, item) in items.iter().enumerate() {
                    self.block.validate(item, &path.clone().index(idx), diags);
                }
            }
            (_, other) => diags.push(
                Diagnostic::error(
                    "Incorrect block value type",
                    format!(
                        "Block \"{}\" got an unexpected {} value",
                        self.type_name,
                        other.type_name()
                    ),
                )
                .with_attribute(path.clone()),
            ),
        }
    }

    fn count_error(&self, summary: &str, got: usize, path: &AttributePath) -> Diagnostic {
        let expected = match self.max_items {
            0 => format!("at least {}", self.min_items),
            max if max == self.min_items => format!("exactly {}", max),
            max => format!("between {} and {}", self.min_items, max),
        };
        Diagnostic::error(
            summary,
            format!(
                "Expected {} \"{}\" blocks, got {}.",
                expected, self.type_name, got
            ),
        )
        .with_attribute(path.clone())
    }
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
}

/// Default provides default values for optional attributes
/// Called when attribute is not set in configuration
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide default value
    fn default_value(&self) -> Dynamic;
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                default: None,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, element_type: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(element_type)))
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn default(mut self, default: impl Default + 'static) -> Self {
        self.attribute.default = Some(Arc::new(default));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// BlockBuilder assembles a block and its nested block types
#[derive(Default)]
pub struct BlockBuilder {
    block: Block,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: AttributeBuilder) -> Self {
        self.block.attributes.push(attr.build());
        self
    }

    /// Add a list of nested blocks with item count bounds (max 0 = unbounded)
    pub fn list_block(mut self, type_name: &str, block: Block, min: usize, max: usize) -> Self {
        self.block.block_types.push(NestedBlock {
            type_name: type_name.to_string(),
            block,
            nesting: NestingMode::List,
            min_items: min,
            max_items: max,
        });
        self
    }

    pub fn single_block(mut self, type_name: &str, block: Block, required: bool) -> Self {
        self.block.block_types.push(NestedBlock {
            type_name: type_name.to_string(),
            block,
            nesting: NestingMode::Single,
            min_items: usize::from(required),
            max_items: 1,
        });
        self
    }

    pub fn build(self) -> Block {
        self.block
    }
}

/// SchemaBuilder wraps a root block with a version
#[derive(Default)]
pub struct SchemaBuilder {
    version: i64,
    block: BlockBuilder,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment when schema changes require migration
    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block = self.block.description(desc);
        self
    }

    pub fn attribute(mut self, attr: AttributeBuilder) -> Self {
        self.block = self.block.attribute(attr);
        self
    }

    pub fn list_block(mut self, type_name: &str, block: Block, min: usize, max: usize) -> Self {
        self.block = self.block.list_block(type_name, block, min, max);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            block: self.block.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::StringLengthValidator;

    fn tag_block() -> Block {
        BlockBuilder::new()
            .attribute(AttributeBuilder::string("key").required())
            .attribute(AttributeBuilder::string("value").optional())
            .build()
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::string("name")
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn schema_builder_creates_schema_with_attributes_and_blocks() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(AttributeBuilder::string("id").computed())
            .attribute(AttributeBuilder::string("name").required())
            .list_block("tag", tag_block(), 0, 0)
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert_eq!(schema.block.description, "Test resource schema");
        assert_eq!(
            schema.block.nested_block("tag").unwrap().nesting,
            NestingMode::List
        );
        assert!(schema.block.attribute("name").unwrap().required);
    }

    #[test]
    fn validate_reports_missing_required_with_path() {
        let block = BlockBuilder::new()
            .list_block("tag", tag_block(), 1, 0)
            .build();
        let config = Dynamic::from(serde_json::json!({ "tag": [{ "value": "x" }] }));

        let mut diags = Vec::new();
        block.validate(&config, &AttributePath::root(), &mut diags);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Missing required argument");
        assert_eq!(diags[0].attribute.as_ref().unwrap().to_string(), "tag[0].key");
    }

    #[test]
    fn validate_enforces_block_counts() {
        let block = BlockBuilder::new()
            .list_block("tag", tag_block(), 1, 1)
            .build();

        let mut diags = Vec::new();
        block.validate(
            &Dynamic::from(serde_json::json!({ "tag": [] })),
            &AttributePath::root(),
            &mut diags,
        );
        assert_eq!(diags[0].summary, "Insufficient blocks");

        let mut diags = Vec::new();
        block.validate(
            &Dynamic::from(serde_json::json!({ "tag": [{"key": "a"}, {"key": "b"}] })),
            &AttributePath::root(),
            &mut diags,
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Too many blocks");
        assert!(diags[0].detail.contains("exactly 1"));
    }

    #[test]
    fn validate_runs_attribute_validators_and_type_checks() {
        let block = BlockBuilder::new()
            .attribute(
                AttributeBuilder::string("name")
                    .required()
                    .validator(StringLengthValidator::min(3)),
            )
            .attribute(AttributeBuilder::number("count").optional())
            .build();
        let config = Dynamic::from(serde_json::json!({ "name": "ab", "count": "two" }));

        let mut diags = Vec::new();
        block.validate(&config, &AttributePath::root(), &mut diags);

        assert_eq!(diags.len(), 2);
        assert!(diags.iter().any(|d| d.summary.contains("minimum length")));
        assert!(diags
            .iter()
            .any(|d| d.summary == "Incorrect attribute value type"));
    }

    #[test]
    fn validate_skips_unknown_values() {
        let block = BlockBuilder::new()
            .attribute(AttributeBuilder::string("name").required())
            .build();
        let config = Dynamic::map([("name", Dynamic::Unknown)]);

        let mut diags = Vec::new();
        block.validate(&config, &AttributePath::root(), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn computed_only_attribute_rejects_configuration() {
        let block = BlockBuilder::new()
            .attribute(AttributeBuilder::string("id").computed())
            .build();
        let config = Dynamic::map([("id", Dynamic::from("abc"))]);

        let mut diags = Vec::new();
        block.validate(&config, &AttributePath::root(), &mut diags);
        assert_eq!(diags[0].summary, "Value for unconfigurable attribute");
    }
}
