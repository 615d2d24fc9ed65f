//! Links from a block to the block it follows, replaces or removes.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    #[default]
    Previous,
    Supersedes,
    Removes,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Previous => "previous",
            Relation::Supersedes => "supersedes",
            Relation::Removes => "removes",
        }
    }

    /// Parse a lowercase relation name. Unknown names mean `Previous`.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "supersedes" => Relation::Supersedes,
            "removes" => Relation::Removes,
            _ => Relation::Previous,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousBlockLink {
    pub block_id: String,
    #[serde(default)]
    pub relation: Relation,
}

impl PreviousBlockLink {
    pub fn new(block_id: impl Into<String>, relation: Relation) -> Self {
        Self {
            block_id: block_id.into(),
            relation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_relation_falls_back_to_previous() {
        assert_eq!(Relation::parse_lenient("removes"), Relation::Removes);
        assert_eq!(Relation::parse_lenient("Supersedes"), Relation::Previous);
        assert_eq!(Relation::parse_lenient(""), Relation::Previous);
    }

    #[test]
    fn relation_defaults_when_missing_from_json() {
        let link: PreviousBlockLink = serde_json::from_str(r#"{"blockId": "3"}"#).unwrap();
        assert_eq!(link, PreviousBlockLink::new("3", Relation::Previous));
    }
}
