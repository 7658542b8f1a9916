use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::errors::ArgumentError;

/// Declared type of a single capability parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    Text,
    Number,
    /// Closed set of accepted values, matched case-insensitively. The
    /// canonical (declared) spelling is what executors receive.
    Enum(&'static [&'static str]),
}

impl ParameterKind {
    fn expected(&self) -> String {
        match self {
            Self::Text => "a string".to_string(),
            Self::Number => "a number".to_string(),
            Self::Enum(values) => format!("one of: {}", values.join(", ")),
        }
    }
}

impl Serialize for ParameterKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Text => serializer.serialize_str("text"),
            Self::Number => serializer.serialize_str("number"),
            Self::Enum(values) => serializer.serialize_str(&format!("enum({})", values.join("|"))),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterSpec {
    pub fn required(name: &'static str, description: &'static str, kind: ParameterKind) -> Self {
        Self { name, description, kind, required: true, default: None }
    }

    pub fn optional(name: &'static str, description: &'static str, kind: ParameterKind) -> Self {
        Self { name, description, kind, required: false, default: None }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Ordered parameter declarations for one capability. Validation is the
/// correctness boundary between the model's untyped suggestion and the
/// executor: required parameters must be present and non-empty, values are
/// coerced to their declared kind, and unknown parameters are dropped so
/// they never reach a collaborator call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ArgumentSchema {
    pub parameters: Vec<ParameterSpec>,
}

impl ArgumentSchema {
    pub fn new(parameters: Vec<ParameterSpec>) -> Self {
        Self { parameters }
    }

    /// Validates and coerces a raw argument map into a typed one.
    /// Fails on the first offending parameter, in declaration order.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<Map<String, Value>, ArgumentError> {
        let mut typed = Map::new();

        for spec in &self.parameters {
            let supplied = raw.get(spec.name).filter(|value| !is_blank(value));

            match supplied {
                Some(value) => {
                    let coerced = coerce(value, spec)?;
                    typed.insert(spec.name.to_string(), coerced);
                }
                None if spec.required => {
                    return Err(ArgumentError::MissingParameter {
                        parameter: spec.name.to_string(),
                    });
                }
                None => {
                    if let Some(default) = &spec.default {
                        typed.insert(spec.name.to_string(), default.clone());
                    }
                }
            }
        }

        Ok(typed)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn coerce(value: &Value, spec: &ParameterSpec) -> Result<Value, ArgumentError> {
    let invalid = || ArgumentError::InvalidValue {
        parameter: spec.name.to_string(),
        expected: spec.kind.expected(),
    };

    match spec.kind {
        ParameterKind::Text => match value {
            Value::String(text) => Ok(Value::String(text.trim().to_string())),
            Value::Number(number) => Ok(Value::String(number.to_string())),
            Value::Bool(flag) => Ok(Value::String(flag.to_string())),
            _ => Err(invalid()),
        },
        ParameterKind::Number => match value {
            Value::Number(number) => Ok(Value::Number(number.clone())),
            Value::String(text) => parse_number(text.trim()).ok_or_else(invalid),
            _ => Err(invalid()),
        },
        ParameterKind::Enum(allowed) => {
            let Value::String(text) = value else {
                return Err(invalid());
            };
            let candidate = text.trim();
            allowed
                .iter()
                .find(|known| known.eq_ignore_ascii_case(candidate))
                .map(|known| Value::String((*known).to_string()))
                .ok_or_else(invalid)
        }
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::Number(Number::from(integer)));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}
