//! # Attribute Schema
//!
//! A component declares its attributes once, as an ordered list of typed
//! fields. The schema is the leaf of the whole model: instances, the fragment
//! codec and the renderer all read it, and nothing ever mutates a built one.
//!
//! ```rust
//! use content_blocks_engine::schema::{FieldSpec, SchemaBuilder};
//! use serde_json::json;
//!
//! let schema = SchemaBuilder::new()
//!     .field(FieldSpec::integer("value").default(0).range(0.0, 10.0).clamp())
//!     .field(FieldSpec::integer("step").default(1))
//!     .build()
//!     .unwrap();
//!
//! let raw = json!({ "value": 42 });
//! let set = schema.validate(raw.as_object().unwrap()).unwrap();
//! assert_eq!(set.integer("value"), 10);
//! assert_eq!(set.integer("step"), 1);
//! ```
//!
//! ## Where values live
//!
//! Each field also says where its value is persisted ([`AttrSource`]): in the
//! fragment's metadata JSON, in the reactive context JSON under a given key,
//! or as the inner markup of a child element with a given class.

mod validate;
mod value;

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use serde_json::{Map, Value};

pub use validate::{Rule, ValidationError, clamp};
pub use value::{AttrValue, AttributeSet};

/// Value kind of a field. Fixed once the schema is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    String,
    Number,
    Integer,
    Boolean,
    Enum,
    Structured,
}

/// What happens to a numeric value outside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePolicy {
    /// Report `Min` / `Max` violations.
    #[default]
    Strict,
    /// Saturate at the nearer bound.
    Clamp,
}

/// Extra processing for string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringFormat {
    #[default]
    Plain,
    /// Allow-list sanitized inline markup.
    RichText,
    /// Scheme-restricted, percent-encoded URL.
    Url,
}

/// Where a field's value is stored in a persisted fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttrSource {
    /// `data-cb-attributes` JSON, omitted when equal to the default.
    #[default]
    Metadata,
    /// `data-cb-context` JSON under the given key, always emitted.
    Context(String),
    /// Inner markup of the descendant carrying the given class.
    Markup(String),
}

#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Regex>,
    pub allowed_values: Vec<String>,
    pub required: bool,
}

/// Problems with a schema declaration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("field `{0}` needs a default or must be required")]
    MissingDefault(String),
    #[error("field `{0}` is declared twice")]
    DuplicateField(String),
    #[error("context key `{0}` is used by more than one field")]
    DuplicateContextKey(String),
    #[error("markup class `{0}` is used by more than one field")]
    DuplicateMarkupClass(String),
    #[error("enum field `{0}` has no allowed values")]
    EmptyEnum(String),
    #[error("field `{0}` has min greater than max")]
    InvertedRange(String),
    #[error("default for `{field}` is invalid: {error}")]
    InvalidDefault {
        field: String,
        error: ValidationError,
    },
    #[error("pattern for `{field}` does not compile: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

/// Declaration of one field, consumed by [`SchemaBuilder`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    kind: AttrKind,
    default: Option<Value>,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<String>,
    allowed_values: Vec<String>,
    required: bool,
    range: RangePolicy,
    format: StringFormat,
    source: AttrSource,
}

impl FieldSpec {
    fn new(name: &str, kind: AttrKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            min: None,
            max: None,
            pattern: None,
            allowed_values: Vec::new(),
            required: false,
            range: RangePolicy::default(),
            format: StringFormat::default(),
            source: AttrSource::default(),
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttrKind::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttrKind::Number)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, AttrKind::Integer)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, AttrKind::Boolean)
    }

    pub fn enumeration(name: &str, allowed: &[&str]) -> Self {
        let mut spec = Self::new(name, AttrKind::Enum);
        spec.allowed_values = allowed.iter().map(|v| v.to_string()).collect();
        spec
    }

    pub fn structured(name: &str) -> Self {
        Self::new(name, AttrKind::Structured)
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn clamp(mut self) -> Self {
        self.range = RangePolicy::Clamp;
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn rich_text(mut self) -> Self {
        self.format = StringFormat::RichText;
        self
    }

    pub fn url(mut self) -> Self {
        self.format = StringFormat::Url;
        self
    }

    pub fn context(mut self, key: &str) -> Self {
        self.source = AttrSource::Context(key.to_string());
        self
    }

    pub fn markup(mut self, class: &str) -> Self {
        self.source = AttrSource::Markup(class.to_string());
        self
    }
}

/// A built field.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: AttrKind,
    default: Option<AttrValue>,
    constraints: Constraints,
    range: RangePolicy,
    format: StringFormat,
    source: AttrSource,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttrKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&AttrValue> {
        self.default.as_ref()
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn range_policy(&self) -> RangePolicy {
        self.range
    }

    pub fn format(&self) -> StringFormat {
        self.format
    }

    pub fn source(&self) -> &AttrSource {
        &self.source
    }

    /// The value to use when input is absent: the default, unless the field
    /// is required.
    fn fallback(&self) -> Option<&AttrValue> {
        if self.constraints.required {
            None
        } else {
            self.default.as_ref()
        }
    }

    fn missing(&self) -> ValidationError {
        ValidationError::new(&self.name, Rule::Required, "missing required field")
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    specs: Vec<FieldSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Result<AttributeSchema, SchemaError> {
        let mut names = HashSet::new();
        let mut context_keys = HashSet::new();
        let mut markup_classes = HashSet::new();
        let mut fields = Vec::with_capacity(self.specs.len());

        for spec in self.specs {
            if !names.insert(spec.name.clone()) {
                return Err(SchemaError::DuplicateField(spec.name));
            }
            match &spec.source {
                AttrSource::Context(key) if !context_keys.insert(key.clone()) => {
                    return Err(SchemaError::DuplicateContextKey(key.clone()));
                }
                AttrSource::Markup(class) if !markup_classes.insert(class.clone()) => {
                    return Err(SchemaError::DuplicateMarkupClass(class.clone()));
                }
                _ => {}
            }
            if spec.default.is_none() && !spec.required {
                return Err(SchemaError::MissingDefault(spec.name));
            }
            if spec.kind == AttrKind::Enum && spec.allowed_values.is_empty() {
                return Err(SchemaError::EmptyEnum(spec.name));
            }
            if let (Some(min), Some(max)) = (spec.min, spec.max)
                && min > max
            {
                return Err(SchemaError::InvertedRange(spec.name));
            }
            let pattern = match &spec.pattern {
                Some(p) => Some(Regex::new(p).map_err(|source| SchemaError::InvalidPattern {
                    field: spec.name.clone(),
                    source,
                })?),
                None => None,
            };

            let mut field = Field {
                name: spec.name,
                kind: spec.kind,
                default: None,
                constraints: Constraints {
                    min: spec.min,
                    max: spec.max,
                    pattern,
                    allowed_values: spec.allowed_values,
                    required: spec.required,
                },
                range: spec.range,
                format: spec.format,
                source: spec.source,
            };

            if let Some(raw) = &spec.default {
                let value = field
                    .coerce(raw)
                    .map_err(|error| SchemaError::InvalidDefault {
                        field: field.name.clone(),
                        error,
                    })?;
                // A default the field would rewrite is not a fixed point
                if !is_fixed_point(raw, &value) {
                    return Err(SchemaError::InvalidDefault {
                        field: field.name.clone(),
                        error: ValidationError::new(
                            &field.name,
                            Rule::Pattern,
                            "default changes when validated",
                        ),
                    });
                }
                field.default = Some(value);
            }

            fields.push(field);
        }

        Ok(AttributeSchema { fields })
    }
}

/// Numbers compare by value, so `2` and `2.0` are the same default.
fn is_fixed_point(raw: &Value, value: &AttrValue) -> bool {
    match (raw, value) {
        (Value::Number(n), AttrValue::Integer(i)) => n.as_f64() == Some(*i as f64),
        (Value::Number(n), AttrValue::Number(x)) => n.as_f64() == Some(*x),
        _ => value.to_json() == *raw,
    }
}

/// An ordered, immutable set of field declarations.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    fields: Vec<Field>,
}

impl AttributeSchema {
    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field stored under a context key.
    pub fn context_field(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| matches!(&f.source, AttrSource::Context(k) if k == key))
    }

    /// Validate a complete raw input.
    ///
    /// Every field is coerced or defaulted. All problems are collected,
    /// including one [`Rule::UnknownField`] error per key the schema does not
    /// declare.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<AttributeSet, Vec<ValidationError>> {
        let mut errors: Vec<ValidationError> = raw
            .keys()
            .filter(|key| self.field(key).is_none())
            .map(|key| ValidationError::new(key, Rule::UnknownField, "not declared by the schema"))
            .collect();

        let mut values = BTreeMap::new();
        for field in &self.fields {
            match present(raw, &field.name) {
                Some(v) => match field.coerce(v) {
                    Ok(value) => {
                        values.insert(field.name.clone(), value);
                    }
                    Err(e) => errors.push(e),
                },
                None => match field.fallback() {
                    Some(default) => {
                        values.insert(field.name.clone(), default.clone());
                    }
                    None => errors.push(field.missing()),
                },
            }
        }

        if errors.is_empty() {
            Ok(AttributeSet::from_values(values))
        } else {
            Err(errors)
        }
    }

    /// Best-effort validation used when hydrating stored data.
    ///
    /// Unknown keys are ignored. An invalid value is replaced by its default
    /// and reported in the returned warnings. Only a required field without a
    /// usable value fails the whole set.
    pub fn validate_lenient(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<(AttributeSet, Vec<ValidationError>), Vec<ValidationError>> {
        for key in raw.keys().filter(|key| self.field(key).is_none()) {
            log::debug!("ignoring undeclared attribute `{key}`");
        }

        let mut warnings = Vec::new();
        let mut fatal = Vec::new();
        let mut values = BTreeMap::new();

        for field in &self.fields {
            let coerced = match present(raw, &field.name) {
                Some(v) => field.coerce(v).map_err(Some),
                None => Err(None),
            };
            match coerced {
                Ok(value) => {
                    values.insert(field.name.clone(), value);
                }
                Err(problem) => match field.fallback() {
                    Some(default) => {
                        warnings.extend(problem);
                        values.insert(field.name.clone(), default.clone());
                    }
                    None => fatal.push(problem.unwrap_or_else(|| field.missing())),
                },
            }
        }

        if fatal.is_empty() {
            Ok((AttributeSet::from_values(values), warnings))
        } else {
            Err(fatal)
        }
    }

    /// Validate only the given keys. `null` resets a field to its default.
    pub fn validate_partial(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<Vec<(String, AttrValue)>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut updates = Vec::new();

        for (key, v) in raw {
            let Some(field) = self.field(key) else {
                errors.push(ValidationError::new(key, Rule::UnknownField, "not declared by the schema"));
                continue;
            };
            let result = if v.is_null() {
                field.fallback().cloned().ok_or_else(|| field.missing())
            } else {
                field.coerce(v)
            };
            match result {
                Ok(value) => updates.push((key.clone(), value)),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(updates)
        } else {
            Err(errors)
        }
    }

    /// The all-defaults attribute set.
    pub fn defaults(&self) -> Result<AttributeSet, Vec<ValidationError>> {
        self.validate(&Map::new())
    }

    /// Render a set back to raw JSON in declaration order.
    pub fn to_raw(&self, set: &AttributeSet) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|f| set.get(&f.name).map(|v| (f.name.clone(), v.to_json())))
            .collect()
    }
}

fn present<'a>(raw: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    raw.get(name).filter(|v| !v.is_null())
}
