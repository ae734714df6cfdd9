//! Caller-supplied generation parameters.
//!
//! A [`GenerationRequest`] is an immutable map of parameter name to value.
//! Values are either a single string (free text, single-select answers) or
//! a list of strings (multi-select answers).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Name of the free-text parameter used by the coloring-plate flow.
pub const PROMPT_PARAM: &str = "prompt";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Render the value for inclusion in a prompt. List items are joined
    /// with `", "`; blank items are dropped.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Parameters describing the image the caller wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationRequest {
    params: BTreeMap<String, ParamValue>,
}

impl GenerationRequest {
    pub fn new(params: BTreeMap<String, ParamValue>) -> Self {
        Self { params }
    }

    /// Convenience constructor for the plain free-text case.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        let mut params = BTreeMap::new();
        params.insert(PROMPT_PARAM.to_string(), ParamValue::Text(prompt.into()));
        Self { params }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    /// The free-text prompt, if one was supplied and is not blank.
    pub fn prompt(&self) -> Option<String> {
        self.params
            .get(PROMPT_PARAM)
            .map(ParamValue::render)
            .filter(|s| !s.is_empty())
    }

    /// All non-blank parameters other than the free-text prompt, in key
    /// order.
    pub fn answers(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.params
            .iter()
            .filter(|(k, _)| k.as_str() != PROMPT_PARAM)
            .map(|(k, v)| (k.as_str(), v.render()))
            .filter(|(_, v)| !v.is_empty())
    }

    /// Reject requests that cannot be submitted: only an empty parameter
    /// set. Blank names and values are passed through.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.params.is_empty() {
            return Err(CoreError::Validation(
                "at least one generation parameter is required".into(),
            ));
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for GenerationRequest
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a `key=value` assignment. A value containing `|` becomes a list
/// (`colors=red|blue`).
pub fn parse_assignment(raw: &str) -> Result<(String, ParamValue), CoreError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CoreError::Validation(format!("expected key=value, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CoreError::Validation(format!("missing key in '{raw}'")));
    }
    let value = if value.contains('|') {
        ParamValue::List(value.split('|').map(|s| s.trim().to_string()).collect())
    } else {
        ParamValue::Text(value.trim().to_string())
    };
    Ok((key.to_string(), value))
}
