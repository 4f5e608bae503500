use crate::types::{AttributePath, Diagnostic, Dynamic};

/// Validator performs validation on attribute values during planning
/// Null and unknown values never reach a validator
pub trait Validator: Send + Sync {
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

fn invalid(path: &AttributePath, summary: String, detail: String) -> Diagnostic {
    Diagnostic::error(summary, detail).with_attribute(path.clone())
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn min(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(s) = value.as_string() else {
            return;
        };
        let len = s.chars().count();
        if let Some(min) = self.min {
            if len < min {
                diagnostics.push(invalid(
                    path,
                    format!("{} must have minimum length of {}", path, min),
                    format!("Got length {}", len),
                ));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                diagnostics.push(invalid(
                    path,
                    format!("{} must have maximum length of {}", path, max),
                    format!("Got length {}", len),
                ));
            }
        }
    }
}

/// Accepts only whole numbers inside the optional bounds
pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
}

impl NumberRangeValidator {
    pub fn non_negative_integer() -> Self {
        Self {
            min: Some(0.0),
            max: None,
            integer: true,
        }
    }
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        format!("number between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(n) = value.as_number() else {
            return;
        };
        if self.integer && n.fract() != 0.0 {
            diagnostics.push(invalid(
                path,
                format!("{} must be a whole number", path),
                format!("Got {}", n),
            ));
            return;
        }
        if let Some(min) = self.min {
            if n < min {
                diagnostics.push(invalid(
                    path,
                    format!("{} must be at least {}", path, min),
                    format!("Got {}", n),
                ));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                diagnostics.push(invalid(
                    path,
                    format!("{} must be at most {}", path, max),
                    format!("Got {}", n),
                ));
            }
        }
    }
}

pub struct StringOneOfValidator {
    pub allowed: Vec<String>,
}

impl StringOneOfValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for StringOneOfValidator {
    fn description(&self) -> String {
        format!("one of {}", self.allowed.join(", "))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if !self.allowed.contains(s) {
                diagnostics.push(invalid(
                    path,
                    format!("{} must be {}", path, self.description()),
                    format!("Value '{}' is not allowed", s),
                ));
            }
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl ListLengthValidator {
    pub fn non_empty() -> Self {
        Self {
            min: Some(1),
            max: None,
        }
    }
}

impl Validator for ListLengthValidator {
    fn description(&self) -> String {
        format!("list length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(items) = value.as_list() else {
            return;
        };
        if let Some(min) = self.min {
            if items.len() < min {
                diagnostics.push(invalid(
                    path,
                    format!("{} must have at least {} items", path, min),
                    format!("Got {} items", items.len()),
                ));
            }
        }
        if let Some(max) = self.max {
            if items.len() > max {
                diagnostics.push(invalid(
                    path,
                    format!("{} must have at most {} items", path, max),
                    format!("Got {} items", items.len()),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(validator: &dyn Validator, value: Dynamic) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        validator.validate(&value, &AttributePath::new("field"), &mut diags);
        diags
    }

    #[test]
    fn string_length_validator_accepts_valid_length() {
        let diags = run(&StringLengthValidator::min(3), Dynamic::from("abc"));
        assert!(diags.is_empty());
    }

    #[test]
    fn string_length_validator_rejects_too_short() {
        let diags = run(&StringLengthValidator::min(3), Dynamic::from("ab"));

        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("minimum length"));
        assert_eq!(diags[0].attribute, Some(AttributePath::new("field")));
    }

    #[test]
    fn string_length_validator_rejects_too_long() {
        let validator = StringLengthValidator {
            min: None,
            max: Some(5),
        };
        let diags = run(&validator, Dynamic::from("hello world"));

        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("maximum length"));
    }

    #[test]
    fn number_range_validator_rejects_negative() {
        let diags = run(&NumberRangeValidator::non_negative_integer(), Dynamic::Number(-1.0));

        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("at least 0"));
    }

    #[test]
    fn number_range_validator_rejects_fraction() {
        let diags = run(&NumberRangeValidator::non_negative_integer(), Dynamic::Number(1.5));

        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("whole number"));
    }

    #[test]
    fn one_of_validator_lists_allowed_values() {
        let validator = StringOneOfValidator::new(["horizontal", "vertical"]);

        assert!(run(&validator, Dynamic::from("vertical")).is_empty());

        let diags = run(&validator, Dynamic::from("diagonal"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("horizontal, vertical"));
    }

    #[test]
    fn list_length_validator_rejects_empty_list() {
        let diags = run(&ListLengthValidator::non_empty(), Dynamic::List(vec![]));

        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("at least 1 items"));
    }

    #[test]
    fn validators_ignore_other_types() {
        assert!(run(&StringLengthValidator::min(3), Dynamic::Number(1.0)).is_empty());
        assert!(run(&ListLengthValidator::non_empty(), Dynamic::from("x")).is_empty());
    }
}
