use std::fmt;

use url::Url;

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors of a form, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages for one field, for inline display.
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Accumulates field checks.
///
/// ```ignore
/// let mut v = Validator::new();
/// v.required("name", &self.name).max_len("name", &self.name, 100);
/// v.finish()
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.add(field, "is required");
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.errors
                .add(field, format!("must be at most {} characters", max));
        }
        self
    }

    /// Checks `value` when non-empty; pair with `required` for mandatory fields.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self;
        }
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && domain.contains('.')
                    && !value.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.errors.add(field, "must be a valid email address");
        }
        self
    }

    /// Checks `value` when non-empty: an absolute http(s) URL whose host
    /// has at least two non-empty labels.
    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self;
        }
        let valid = match Url::parse(value) {
            Ok(url) => {
                matches!(url.scheme(), "http" | "https")
                    && url.host_str().is_some_and(|host| {
                        host.contains('.') && host.split('.').all(|label| !label.is_empty())
                    })
            }
            Err(_) => false,
        };
        if !valid {
            self.errors.add(field, "must be a valid http(s) URL");
        }
        self
    }

    /// Checks `value` when non-empty: digits with optional leading `+`,
    /// spaces, dashes and parentheses, 7 to 15 digits.
    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self;
        }
        let body = value.strip_prefix('+').unwrap_or(value);
        let allowed = body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
        let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
        if !allowed || !(7..=15).contains(&digits) {
            self.errors.add(field, "must be a valid phone number");
        }
        self
    }

    /// Record a custom failure.
    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.add(field, message);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
