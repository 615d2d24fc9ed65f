use serde::{Deserialize, Serialize};

use crate::value::TypedValue;

/// Memory header: the memory's primary ID and an optional pointer to blocks
/// stored elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub primary_id: TypedValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_blocks: Option<TypedValue>,
}

impl Header {
    pub fn new(primary_id: TypedValue) -> Self {
        Self {
            primary_id,
            additional_blocks: None,
        }
    }

    pub fn with_additional_blocks(mut self, additional: TypedValue) -> Self {
        self.additional_blocks = Some(additional);
        self
    }

    /// Last path segment of the primary ID (`http://host/rest/M` -> `M`).
    pub fn memory_name(&self) -> &str {
        self.primary_id
            .value
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}
