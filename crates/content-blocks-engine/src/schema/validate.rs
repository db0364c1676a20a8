use std::fmt;

use serde_json::{Number, Value};

use super::{AttrKind, Field, RangePolicy, StringFormat};
use crate::markup::{sanitize_rich_text, sanitize_url};
use crate::schema::AttrValue;

/// The rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Type,
    Required,
    Min,
    Max,
    Pattern,
    AllowedValues,
    UnknownField,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Type => "type",
            Rule::Required => "required",
            Rule::Min => "min",
            Rule::Max => "max",
            Rule::Pattern => "pattern",
            Rule::AllowedValues => "allowed-values",
            Rule::UnknownField => "unknown-field",
        };
        f.write_str(name)
    }
}

/// A per-field validation failure. Returned as a value, never raised, so an
/// editing UI can show it next to the offending control.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} ({rule}): {message}")]
pub struct ValidationError {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

/// Constrain `x` to `[min, max]` by saturating at the nearer bound.
///
/// Idempotent: `clamp(clamp(x, lo, hi), lo, hi) == clamp(x, lo, hi)`.
pub fn clamp<T: PartialOrd>(x: T, min: T, max: T) -> T {
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

impl Field {
    /// Coerce one present (non-null) raw value to this field's kind and check
    /// its constraints.
    pub fn coerce(&self, raw: &Value) -> Result<AttrValue, ValidationError> {
        match self.kind {
            AttrKind::String => self.coerce_string(raw).map(AttrValue::String),
            AttrKind::Integer => self.coerce_integer(raw).map(AttrValue::Integer),
            AttrKind::Number => self.coerce_number(raw).map(AttrValue::Number),
            AttrKind::Boolean => self.coerce_bool(raw).map(AttrValue::Boolean),
            AttrKind::Enum => self.coerce_enum(raw).map(AttrValue::String),
            AttrKind::Structured => match raw {
                Value::Object(map) => Ok(AttrValue::Structured(map.clone())),
                other => Err(self.type_error("an object", other)),
            },
        }
    }

    fn coerce_string(&self, raw: &Value) -> Result<String, ValidationError> {
        let text = match raw {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => return Err(self.type_error("a string", other)),
        };

        let text = match self.format {
            StringFormat::Plain => text,
            // Sanitizing can expose whitespace at either end
            StringFormat::RichText => sanitize_rich_text(&text).trim().to_string(),
            StringFormat::Url if text.is_empty() => text,
            StringFormat::Url => sanitize_url(&text).ok_or_else(|| {
                ValidationError::new(&self.name, Rule::Pattern, format!("`{text}` is not an allowed URL"))
            })?,
        };

        if let Some(pattern) = &self.constraints.pattern
            && !pattern.is_match(&text)
        {
            return Err(ValidationError::new(
                &self.name,
                Rule::Pattern,
                format!("`{text}` does not match {}", pattern.as_str()),
            ));
        }

        Ok(text)
    }

    fn coerce_integer(&self, raw: &Value) -> Result<i64, ValidationError> {
        let parsed = match raw {
            Value::Number(n) => integer_from_number(n),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        };
        let value = parsed.ok_or_else(|| self.type_error("an integer", raw))?;

        let (min, max) = (self.constraints.min, self.constraints.max);
        if let Some(min) = min
            && (value as f64) < min
        {
            return match self.range {
                RangePolicy::Clamp => Ok(min.ceil() as i64),
                RangePolicy::Strict => Err(self.below_min(min)),
            };
        }
        if let Some(max) = max
            && (value as f64) > max
        {
            return match self.range {
                RangePolicy::Clamp => Ok(max.floor() as i64),
                RangePolicy::Strict => Err(self.above_max(max)),
            };
        }
        Ok(value)
    }

    fn coerce_number(&self, raw: &Value) -> Result<f64, ValidationError> {
        let parsed = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let value = parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.type_error("a finite number", raw))?;

        let lo = self.constraints.min.unwrap_or(f64::NEG_INFINITY);
        let hi = self.constraints.max.unwrap_or(f64::INFINITY);
        match self.range {
            RangePolicy::Clamp => Ok(clamp(value, lo, hi)),
            RangePolicy::Strict if value < lo => Err(self.below_min(lo)),
            RangePolicy::Strict if value > hi => Err(self.above_max(hi)),
            RangePolicy::Strict => Ok(value),
        }
    }

    fn coerce_bool(&self, raw: &Value) -> Result<bool, ValidationError> {
        let parsed = match raw {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| self.type_error("a boolean", raw))
    }

    fn coerce_enum(&self, raw: &Value) -> Result<String, ValidationError> {
        let Value::String(s) = raw else {
            return Err(self.type_error("a string", raw));
        };
        if self.constraints.allowed_values.iter().any(|v| v == s) {
            Ok(s.clone())
        } else {
            Err(ValidationError::new(
                &self.name,
                Rule::AllowedValues,
                format!(
                    "`{s}` is not one of {}",
                    self.constraints.allowed_values.join(", ")
                ),
            ))
        }
    }

    fn type_error(&self, expected: &str, found: &Value) -> ValidationError {
        ValidationError::new(
            &self.name,
            Rule::Type,
            format!("expected {expected}, found {found}"),
        )
    }

    fn below_min(&self, min: f64) -> ValidationError {
        ValidationError::new(&self.name, Rule::Min, format!("must be at least {min}"))
    }

    fn above_max(&self, max: f64) -> ValidationError {
        ValidationError::new(&self.name, Rule::Max, format!("must be at most {max}"))
    }
}

fn integer_from_number(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().and_then(integral))
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
        .then_some(f as i64)
}
