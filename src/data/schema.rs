//! Declarative field descriptors for upstream payloads
//!
//! Each record type lists the fields it reads as [`Field`] constants: a path
//! into the JSON, the expected kind, and whether the field is required,
//! optional (falls back to an empty default) or the primary data section
//! (absent or empty means "no data for this request"). A [`Schema`] checks a
//! payload against its list before any record is built.

use serde_json::{Map, Value};

use crate::endpoint::Request;
use crate::error::{EdhrecError, Result};

/// JSON kind a field must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Text,
    /// Any number, or a string that parses as one
    Number,
    /// A non-negative whole number, or a string that parses as one
    Count,
    Array,
    Object,
}

impl Kind {
    fn describe(&self) -> &'static str {
        match self {
            Kind::Text => "a string",
            Kind::Number => "a number",
            Kind::Count => "a non-negative integer",
            Kind::Array => "an array",
            Kind::Object => "an object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    Optional,
    Primary,
}

/// One field of a payload
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    pub path: &'static [&'static str],
    pub kind: Kind,
    pub presence: Presence,
}

impl Field {
    pub const fn required(path: &'static [&'static str], kind: Kind) -> Self {
        Self {
            path,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(path: &'static [&'static str], kind: Kind) -> Self {
        Self {
            path,
            kind,
            presence: Presence::Optional,
        }
    }

    pub const fn primary(path: &'static [&'static str], kind: Kind) -> Self {
        Self {
            path,
            kind,
            presence: Presence::Primary,
        }
    }

    /// Dotted path used in error messages
    pub fn name(&self) -> String {
        self.path.join(".")
    }

    /// Follows the path; `null` counts as absent
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.path
            .iter()
            .try_fold(value, |current, segment| current.get(*segment))
            .filter(|found| !found.is_null())
    }

    /// Looks the field up and checks its kind
    ///
    /// A missing required field is an error; a missing optional or primary
    /// field reads as `None`.
    fn read<'v>(&self, record: &'static str, value: &'v Value) -> Result<Option<&'v Value>> {
        let Some(found) = self.lookup(value) else {
            return match self.presence {
                Presence::Required => Err(EdhrecError::missing(record, self.name())),
                Presence::Optional | Presence::Primary => Ok(None),
            };
        };

        let matches = match self.kind {
            Kind::Text => found.is_string(),
            Kind::Number => coerce_number(found).is_some(),
            Kind::Count => coerce_count(found).is_some(),
            Kind::Array => found.is_array(),
            Kind::Object => found.is_object(),
        };
        if !matches {
            return Err(EdhrecError::wrong_type(record, self.name(), self.kind.describe()));
        }
        Ok(Some(found))
    }

    pub fn text(&self, record: &'static str, value: &Value) -> Result<Option<String>> {
        Ok(self
            .read(record, value)?
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Reads a required text field
    pub fn required_text(&self, record: &'static str, value: &Value) -> Result<String> {
        self.text(record, value)?
            .ok_or_else(|| EdhrecError::missing(record, self.name()))
    }

    pub fn number(&self, record: &'static str, value: &Value) -> Result<Option<f64>> {
        Ok(self.read(record, value)?.and_then(coerce_number))
    }

    pub fn count(&self, record: &'static str, value: &Value) -> Result<Option<u64>> {
        Ok(self.read(record, value)?.and_then(coerce_count))
    }

    pub fn required_count(&self, record: &'static str, value: &Value) -> Result<u64> {
        self.count(record, value)?
            .ok_or_else(|| EdhrecError::missing(record, self.name()))
    }

    /// Reads an array field; absent arrays are empty
    pub fn array<'v>(&self, record: &'static str, value: &'v Value) -> Result<&'v [Value]> {
        Ok(self
            .read(record, value)?
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    pub fn object<'v>(
        &self,
        record: &'static str,
        value: &'v Value,
    ) -> Result<Option<&'v Map<String, Value>>> {
        Ok(self.read(record, value)?.and_then(Value::as_object))
    }

    /// Reads an array of strings; absent arrays are empty
    pub fn text_list(&self, record: &'static str, value: &Value) -> Result<Vec<String>> {
        self.array(record, value)?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    EdhrecError::wrong_type(record, format!("{}[{}]", self.name(), i), "a string")
                })
            })
            .collect()
    }
}

/// The fields one record type reads from its payload
#[derive(Debug)]
pub(crate) struct Schema {
    pub record: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    /// Validates presence and kind of every field
    ///
    /// Primary sections are checked first so a payload with no data reports
    /// `NoData` rather than a missing detail field.
    pub fn check(&self, value: &Value, request: &Request<'_>) -> Result<()> {
        if !value.is_object() {
            return Err(EdhrecError::wrong_type(self.record, "<root>", "an object"));
        }

        for field in self.fields.iter().filter(|f| f.presence == Presence::Primary) {
            let section = field.read(self.record, value)?;
            let empty = match section {
                None => true,
                Some(Value::Array(items)) => items.is_empty(),
                Some(Value::Object(map)) => map.is_empty(),
                Some(_) => false,
            };
            if empty {
                log::debug!(
                    "{} payload has no `{}` section for {}",
                    self.record,
                    field.name(),
                    request.params
                );
                return Err(request.no_data());
            }
        }

        for field in self.fields.iter().filter(|f| f.presence != Presence::Primary) {
            field.read(self.record, value)?;
        }
        Ok(())
    }

    /// Validates each element of an array against this schema
    pub fn check_each(&self, items: &[Value], request: &Request<'_>) -> Result<()> {
        items.iter().try_for_each(|item| self.check(item, request))
    }
}

/// Explicit number coercion: JSON numbers and numeric strings
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Explicit count coercion: whole non-negative numbers and numeric strings
pub(crate) fn coerce_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    coerce_number(value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}
