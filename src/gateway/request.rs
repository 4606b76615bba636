//! Incoming request assembly and per-action validation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

pub const ACTION_REQUIRED: &str = "Action is required";
pub const UNKNOWN_ACTION: &str = "Unknown action";

/// Query parameters and body fields merged into one mapping
pub type InputMap = Map<String, Value>;

/// Merge URL query parameters with a JSON request body.
///
/// A query key given more than once becomes an array of its values. Body
/// fields override query parameters of the same name. An empty body
/// contributes nothing.
pub fn merge_input<I>(query: I, body: &[u8]) -> Result<InputMap>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut input = InputMap::new();
    for (key, value) in query {
        let value = Value::String(value);
        match input.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                input.insert(key, value);
            }
        }
    }

    let text = std::str::from_utf8(body)
        .map_err(|_| AppError::validation("Malformed request body: not valid UTF-8"))?;
    if text.trim().is_empty() {
        return Ok(input);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => input.extend(fields),
        Ok(Value::Null) => {}
        Ok(_) => {
            return Err(AppError::validation(
                "Malformed request body: expected a JSON object",
            ))
        }
        Err(e) => {
            return Err(AppError::validation(format!(
                "Malformed request body: {}",
                e
            )))
        }
    }

    Ok(input)
}

/// Upstream operation selected by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pickup point lookup
    Offices,
    /// Tariff calculation
    Calculate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Offices => "offices",
            Action::Calculate => "calculate",
        }
    }

    /// Read the `action` field of a merged input.
    ///
    /// Absent, null, `false`, zero and empty values count as missing.
    pub fn from_input(input: &InputMap) -> Result<Self> {
        match input.get("action") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                Err(AppError::validation(ACTION_REQUIRED))
            }
            Some(Value::String(s)) if s.is_empty() => Err(AppError::validation(ACTION_REQUIRED)),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
                Err(AppError::validation(ACTION_REQUIRED))
            }
            Some(Value::String(s)) => s.parse(),
            Some(_) => Err(AppError::validation(UNKNOWN_ACTION)),
        }
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "offices" => Ok(Action::Offices),
            "calculate" => Ok(Action::Calculate),
            _ => Err(AppError::validation(UNKNOWN_ACTION)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for `GET deliverypoints`, sent as a query string
#[derive(Debug, Clone, PartialEq)]
pub struct OfficeQuery {
    params: InputMap,
}

impl OfficeQuery {
    /// Accept scalars and arrays of scalars; nested objects cannot be
    /// expressed in a query string.
    pub fn from_input(input: InputMap) -> Result<Self> {
        for (key, value) in &input {
            let valid = match value {
                Value::Object(_) => false,
                Value::Array(items) => items.iter().all(is_scalar),
                _ => true,
            };
            if !valid {
                return Err(AppError::validation(format!(
                    "Parameter '{}' cannot be nested for the offices action",
                    key
                )));
            }
        }

        Ok(Self { params: input })
    }

    pub fn params(&self) -> &InputMap {
        &self.params
    }

    /// Query pairs in input order; arrays become comma-joined values
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, value)| {
                let encoded = match value {
                    Value::Array(items) => items
                        .iter()
                        .map(scalar_to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                    other => scalar_to_string(other),
                };
                (key.clone(), encoded)
            })
            .collect()
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Body for `POST calculator/tarifflist`.
///
/// The required fields are checked for shape; every other field, `action`
/// included, is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffCalculation {
    pub from_location: Map<String, Value>,
    pub to_location: Map<String, Value>,
    pub packages: Vec<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TariffCalculation {
    pub fn from_input(input: InputMap) -> Result<Self> {
        serde_json::from_value(Value::Object(input)).map_err(|e| {
            AppError::validation(format!("Invalid parameters for the calculate action: {}", e))
        })
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A validated gateway request
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    Offices(OfficeQuery),
    Calculate(TariffCalculation),
}

impl GatewayRequest {
    /// Validate a merged input, rejecting it before any network call
    pub fn from_input(input: InputMap) -> Result<Self> {
        match Action::from_input(&input)? {
            Action::Offices => OfficeQuery::from_input(input).map(GatewayRequest::Offices),
            Action::Calculate => {
                TariffCalculation::from_input(input).map(GatewayRequest::Calculate)
            }
        }
    }

    pub fn action(&self) -> Action {
        match self {
            GatewayRequest::Offices(_) => Action::Offices,
            GatewayRequest::Calculate(_) => Action::Calculate,
        }
    }
}
