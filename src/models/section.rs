use serde::{Deserialize, Serialize};

/// One monitored board category.
///
/// `key` is what the persisted state is indexed by, so renaming it makes the
/// section look new again on the next run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    pub label: String,
    pub selector: String,
}

impl Section {
    pub fn new(key: &str, label: &str, selector: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            selector: selector.to_string(),
        }
    }
}
