//! Record validation: the collaborator-facing extension point.
//!
//! A collection accepts any [`Validator`]. Most callers describe their record
//! shape with a [`Schema`]; anything a schema cannot express goes into a
//! closure.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::Record;

/// Checks a complete record before it is stored.
pub trait Validator: Send + Sync {
    fn validate(&self, record: &Record) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Record) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        self(record)
    }
}

/// Validator that accepts every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _record: &Record) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// The accepted shape of a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Any,
    String,
    NonEmptyString,
    /// String with a character-count range, optionally letters and spaces only.
    Text {
        min_len: usize,
        max_len: usize,
        letters_only: bool,
    },
    Integer,
    /// Integer `> 0`, e.g. a number of copies.
    PositiveInteger,
    NonNegativeInteger,
    Number,
    Bool,
    Array,
    Object,
    /// String equal to one of the listed values.
    OneOf(Vec<String>),
    /// ISO `YYYY-MM-DD` calendar date.
    Date,
}

impl FieldKind {
    /// Shorthand for [`FieldKind::OneOf`].
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Check `value` as the contents of `field`.
    pub fn check(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let wrong = |expected| ValidationError::WrongType {
            field: field.to_string(),
            expected,
        };

        match self {
            FieldKind::Any => Ok(()),
            FieldKind::String => value.as_str().map(|_| ()).ok_or_else(|| wrong("a string")),
            FieldKind::NonEmptyString => {
                let s = value.as_str().ok_or_else(|| wrong("a string"))?;
                if s.trim().is_empty() {
                    return Err(ValidationError::EmptyField(field.to_string()));
                }
                Ok(())
            }
            FieldKind::Text {
                min_len,
                max_len,
                letters_only,
            } => {
                let s = value.as_str().ok_or_else(|| wrong("a string"))?;
                let len = s.chars().count();
                if len < *min_len || len > *max_len {
                    return Err(ValidationError::LengthOutOfRange {
                        field: field.to_string(),
                        min: *min_len,
                        max: *max_len,
                        len,
                    });
                }
                if *letters_only && !s.chars().all(|c| c.is_alphabetic() || c == ' ') {
                    return Err(ValidationError::InvalidCharacters(field.to_string()));
                }
                Ok(())
            }
            FieldKind::Integer => integer(value).map(|_| ()).ok_or_else(|| wrong("an integer")),
            FieldKind::PositiveInteger => {
                let n = integer(value).ok_or_else(|| wrong("a positive integer"))?;
                if n <= 0 {
                    return Err(ValidationError::NotPositive {
                        field: field.to_string(),
                        value: n as i64,
                    });
                }
                Ok(())
            }
            FieldKind::NonNegativeInteger => {
                let n = integer(value).ok_or_else(|| wrong("a non-negative integer"))?;
                if n < 0 {
                    return Err(ValidationError::Negative {
                        field: field.to_string(),
                        value: n as i64,
                    });
                }
                Ok(())
            }
            FieldKind::Number => value.as_f64().map(|_| ()).ok_or_else(|| wrong("a number")),
            FieldKind::Bool => value.as_bool().map(|_| ()).ok_or_else(|| wrong("a boolean")),
            FieldKind::Array => {
                if value.is_array() {
                    Ok(())
                } else {
                    Err(wrong("an array"))
                }
            }
            FieldKind::Object => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(wrong("an object"))
                }
            }
            FieldKind::OneOf(allowed) => {
                let s = value.as_str().ok_or_else(|| wrong("a string"))?;
                if allowed.iter().any(|a| a == s) {
                    Ok(())
                } else {
                    Err(ValidationError::NotAllowed {
                        field: field.to_string(),
                        value: s.to_string(),
                        allowed: allowed.clone(),
                    })
                }
            }
            FieldKind::Date => {
                let s = value.as_str().ok_or_else(|| wrong("a date string"))?;
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(|_| ())
                    .map_err(|_| ValidationError::InvalidDate {
                        field: field.to_string(),
                        value: s.to_string(),
                    })
            }
        }
    }
}

/// Integer value of a JSON number, if it is one.
fn integer(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

/// A rule for one named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    /// Required fields must be present and non-null.
    pub required: bool,
}

/// Declarative record shape: a list of field rules.
///
/// Fields without a rule are accepted as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    /// Create an empty schema (accepts everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.rules.push(FieldRule {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    /// Add an optional field. Absent or `null` values pass.
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.rules.push(FieldRule {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    /// The rules in declaration order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Look up the rule for a field.
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

impl Validator for Schema {
    fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        for rule in &self.rules {
            match record.get(&rule.name) {
                None | Some(Value::Null) => {
                    if rule.required {
                        return Err(ValidationError::MissingField(rule.name.clone()));
                    }
                }
                Some(value) => rule.kind.check(&rule.name, value)?,
            }
        }
        Ok(())
    }
}
