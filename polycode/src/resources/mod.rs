//! Resource implementations

pub mod content;

pub use content::ContentResource;
