//! Validation Errors - Field-level error reports
//!
//! A [`ValidationErrors`] report is a named *error bag*: a group of
//! per-field messages that a client routes back to the form it submitted.
//! Field order is preserved in insertion order.

use std::borrow::Cow;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Rule that a field violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// Value missing or empty
    Required,
    /// Value is not a syntactically valid email address
    Email,
    /// Value exceeds its length, size or numeric bound
    Max,
    /// Upload is not a recognised image
    Image,
    /// Value is not an integer
    Integer,
    /// Value is already used by another record
    Unique,
}

impl FieldRule {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::Max => "max",
            Self::Image => "image",
            Self::Integer => "integer",
            Self::Unique => "unique",
        }
    }
}

/// A single failed rule on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub rule: FieldRule,
    pub message: Cow<'static, str>,
}

impl FieldError {
    pub fn new(rule: FieldRule, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Named bag of field errors
///
/// ## Examples
/// ```rust
/// use kernel::error::validation::{FieldError, FieldRule, ValidationErrors};
///
/// let mut errors = ValidationErrors::new("updateProfileInformation");
/// errors.add("email", FieldError::new(FieldRule::Unique, "The email has already been taken."));
///
/// assert_eq!(errors.bag(), "updateProfileInformation");
/// assert!(errors.only_rule(FieldRule::Unique));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    bag: Cow<'static, str>,
    fields: Vec<(Cow<'static, str>, Vec<FieldError>)>,
}

impl ValidationErrors {
    pub fn new(bag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            bag: bag.into(),
            fields: Vec::new(),
        }
    }

    /// Record a failure for `field`
    pub fn add(&mut self, field: impl Into<Cow<'static, str>>, error: FieldError) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, errors)) => errors.push(error),
            None => self.fields.push((field, vec![error])),
        }
    }

    #[inline]
    pub fn bag(&self) -> &str {
        &self.bag
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one error
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Errors recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, errors)| errors.as_slice())
    }

    /// Whether `field` failed `rule`
    pub fn has(&self, field: &str, rule: FieldRule) -> bool {
        self.get(field)
            .is_some_and(|errors| errors.iter().any(|e| e.rule == rule))
    }

    /// Iterate fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.fields
            .iter()
            .map(|(name, errors)| (name.as_ref(), errors.as_slice()))
    }

    /// True when the report is non-empty and every failure is `rule`
    pub fn only_rule(&self, rule: FieldRule) -> bool {
        !self.is_empty()
            && self
                .fields
                .iter()
                .flat_map(|(_, errors)| errors.iter())
                .all(|e| e.rule == rule)
    }
}

/// Serialized as `{ "<field>": ["<message>", ...] }`
impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, errors) in &self.fields {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_ref()).collect();
            map.serialize_entry(field.as_ref(), &messages)?;
        }
        map.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let first = self
            .fields
            .first()
            .and_then(|(_, errors)| errors.first())
            .map(|e| e.message.as_ref())
            .unwrap_or("The given data was invalid.");
        let remaining = self
            .fields
            .iter()
            .map(|(_, errors)| errors.len())
            .sum::<usize>()
            .saturating_sub(1);

        match remaining {
            0 => f.write_str(first),
            1 => write!(f, "{} (and 1 more error)", first),
            n => write!(f, "{} (and {} more errors)", first, n),
        }
    }
}
