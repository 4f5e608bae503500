//! Default value providers for attributes
//!
//! Defaults are applied when an optional attribute is absent or null in the
//! configuration; an explicitly configured value always wins.

use crate::schema::Default;
use crate::types::Dynamic;

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn string(value: &str) -> Self {
        Self {
            value: Dynamic::String(value.to_string()),
        }
    }

    pub fn number(value: f64) -> Self {
        Self {
            value: Dynamic::Number(value),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            value: Dynamic::Bool(value),
        }
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self) -> Dynamic {
        self.value.clone()
    }
}
