//! Polycode content API
//!
//! [`ContentApi`] is the seam the content resource talks through; [`Client`]
//! implements it over HTTP.

pub mod client;
pub mod content;
pub mod error;

pub use client::{Client, RetryConfig};
pub use content::{
    Component, ComponentKind, Content, EditorData, ItemIdentifier, Language, LanguageKind,
    Orientation, Validator,
};
pub use error::ApiError;

use async_trait::async_trait;

#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Creates the content and returns it with every id populated
    async fn create_content(&self, content: &Content) -> Result<Content, ApiError>;

    async fn get_content(&self, id: &str) -> Result<Content, ApiError>;

    async fn update_content(&self, content: &Content) -> Result<Content, ApiError>;

    async fn delete_content(&self, id: &str) -> Result<(), ApiError>;
}
