//! The `polycode_content` resource
//!
//! Terraform can only describe a content body as nested blocks of bounded
//! depth where every child carries an explicit `position`. The API stores the
//! same body as a recursive component tree ordered by index. This module
//! converts between the two:
//!
//! - [`schema`] builds the bounded-depth block schema
//! - [`model`] is the typed form of that schema's values
//! - [`serialize`] turns configuration into a component tree
//! - [`deserialize`] turns a component tree back into state

pub mod deserialize;
pub mod model;
pub mod resource;
pub mod schema;
pub mod serialize;

pub use deserialize::deserialize_container;
pub use model::{ContainerBlock, EditorBlock, LanguageSettingBlock, MarkdownBlock, ValidatorBlock};
pub use resource::ContentResource;
pub use serialize::serialize_container;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    #[error("position {position} is greater than the number of child components {count}")]
    PositionOutOfRange { position: i64, count: usize },

    #[error("position {position} is invalid, positions start at 1")]
    PositionBelowOne { position: i64 },

    #[error("child component at position {position} is missing, this is probably due to duplicate position in the container, please check that your positions go from 1 to {count}")]
    MissingPosition { position: usize, count: usize },

    #[error("invalid value for {path}: {reason}")]
    InvalidAttribute { path: String, reason: String },
}
