//! Block schema of the `polycode_content` resource
//!
//! Terraform schemas cannot recurse, so nested containers are unrolled up to
//! [`MAX_CONTAINER_DEPTH`] levels. The level past the limit is an empty block,
//! which is where the recursion stops.

use crate::api::content::LanguageKind;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{AttributeBuilder, AttributeType, Block, BlockBuilder, Schema, SchemaBuilder};
use tfplug::validator::{
    ListLengthValidator, NumberRangeValidator, StringLengthValidator, StringOneOfValidator,
};

/// Deepest container level that still exposes child slots
pub const MAX_CONTAINER_DEPTH: usize = 3;

pub const CONTENT_TYPES: [&str; 1] = ["exercise"];

pub fn content_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Exercise content made of markdown, code editors and layout containers")
        .attribute(
            AttributeBuilder::string("id")
                .description("The content id")
                .computed(),
        )
        .attribute(
            AttributeBuilder::string("name")
                .description("The content name")
                .required()
                .validator(StringLengthValidator::min(3)),
        )
        .attribute(
            AttributeBuilder::string("description")
                .description("The content description")
                .required()
                .validator(StringLengthValidator::min(3)),
        )
        .attribute(
            AttributeBuilder::string("type")
                .description("The content type, only exercise is supported")
                .required()
                .validator(StringOneOfValidator::new(CONTENT_TYPES)),
        )
        .attribute(
            AttributeBuilder::number("reward")
                .description("The content reward")
                .required()
                .validator(NumberRangeValidator::non_negative_integer()),
        )
        .attribute(
            AttributeBuilder::string("last_update")
                .description("Last update of the resource")
                .computed(),
        )
        .list_block("container", container_block(1), 1, 1)
        .build()
}

/// Builds the container block found at `depth`, root container being 1
pub fn container_block(depth: usize) -> Block {
    if depth > MAX_CONTAINER_DEPTH {
        return Block::default();
    }

    BlockBuilder::new()
        .description("Layout container rendering its children in position order")
        .attribute(id_attribute("The id of the component"))
        .attribute(position_attribute())
        .attribute(
            AttributeBuilder::string("orientation")
                .description("The orientation of the container")
                .required()
                .validator(StringOneOfValidator::new(["horizontal", "vertical"])),
        )
        .list_block("markdown", markdown_block(), 0, 0)
        .list_block("editor", editor_block(), 0, 0)
        .list_block("container", container_block(depth + 1), 0, 0)
        .build()
}

fn markdown_block() -> Block {
    BlockBuilder::new()
        .description("Markdown component")
        .attribute(id_attribute("The id of the component"))
        .attribute(position_attribute())
        .attribute(
            AttributeBuilder::string("content")
                .description("The content of the markdown")
                .required(),
        )
        .build()
}

fn editor_block() -> Block {
    BlockBuilder::new()
        .description("Code editor component")
        .attribute(id_attribute("The id of the component"))
        .attribute(position_attribute())
        .attribute(
            AttributeBuilder::list("hint", AttributeType::String)
                .description("List of hint ids for the editor")
                .optional(),
        )
        .list_block("language_settings", language_block(), 1, 0)
        .list_block("validator", validator_block(), 0, 0)
        .build()
}

fn language_block() -> Block {
    BlockBuilder::new()
        .description("Language available in the editor")
        .attribute(
            AttributeBuilder::string("default_code")
                .description("The default code of the language")
                .optional(),
        )
        .attribute(
            AttributeBuilder::string("language")
                .description("The language")
                .required()
                .validator(StringOneOfValidator::new(
                    LanguageKind::ALL.iter().map(LanguageKind::as_str),
                )),
        )
        .attribute(
            AttributeBuilder::string("version")
                .description("The version of the language")
                .optional(),
        )
        .build()
}

fn validator_block() -> Block {
    BlockBuilder::new()
        .description("Input/output check run against the submitted code")
        .attribute(id_attribute("The id of the validator"))
        .attribute(
            AttributeBuilder::list("inputs", AttributeType::String)
                .description("List of inputs for the validator")
                .required()
                .validator(ListLengthValidator::non_empty()),
        )
        .attribute(
            AttributeBuilder::list("outputs", AttributeType::String)
                .description("List of outputs for the validator")
                .required()
                .validator(ListLengthValidator::non_empty()),
        )
        .attribute(
            AttributeBuilder::bool("is_hidden")
                .description("Whether the validator is hidden")
                .optional()
                .computed()
                .default(StaticDefault::bool(false)),
        )
        .build()
}

fn id_attribute(description: &str) -> AttributeBuilder {
    AttributeBuilder::string("id").description(description).computed()
}

fn position_attribute() -> AttributeBuilder {
    AttributeBuilder::number("position")
        .description("The position where the component will be rendered")
        .required()
        .validator(NumberRangeValidator::non_negative_integer())
}
