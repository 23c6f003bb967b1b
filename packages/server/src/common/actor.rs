use serde::{Deserialize, Serialize};
use std::fmt;

/// The acting user behind a mutating operation.
///
/// The engine never authenticates this identity; it only records it in
/// `created_by` / `updated_by` / `reviewed_by` audit columns and event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Identity used for writes made by the machine-learning pipeline.
    pub const ML: &'static str = "ML";

    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    pub fn ml() -> Self {
        Self(Self::ML.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Actor {
    fn from(user_id: &str) -> Self {
        Self::new(user_id)
    }
}
