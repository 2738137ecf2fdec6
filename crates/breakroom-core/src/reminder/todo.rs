use serde::{Deserialize, Serialize};

/// A named checklist item. The name is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    name: String,
    #[serde(default)]
    pub complete: bool,
}

impl Todo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            complete: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of this todo with `complete` set to `value`.
    pub fn set_complete(&self, value: bool) -> Self {
        Self {
            name: self.name.clone(),
            complete: value,
        }
    }
}
