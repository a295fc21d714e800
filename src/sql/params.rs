//! Bound query parameters.
//!
//! Every caller-supplied value reaches the backend through this list, never
//! through the SQL text. Names are assigned sequentially (`p0`, `p1`, ...)
//! in the order the placeholders are emitted.

use serde::{Deserialize, Serialize};

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    /// A whole membership list bound to a single placeholder.
    TextList(Vec<String>),
}

/// A single named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundParam {
    pub name: String,
    pub value: ParamValue,
}

/// Ordered, named bind parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundParams {
    params: Vec<BoundParam>,
}

impl BoundParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return the placeholder name it was assigned.
    pub fn bind(&mut self, value: ParamValue) -> String {
        let name = format!("p{}", self.params.len());
        self.params.push(BoundParam {
            name: name.clone(),
            value,
        });
        name
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
