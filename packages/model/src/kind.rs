//! Block kinds, resolved once from the block namespace.

use serde::{Deserialize, Serialize};

pub const IDENTIFICATION_NAMESPACE: &str = "urn:omm:block:indentifications";
pub const STRUCTURE_NAMESPACE: &str = "urn:omm:block:structure";
pub const SEMANTIC_NAMESPACE: &str = "urn:omm:block:semantic";
pub const OWNER_NAMESPACE: &str = "urn:omm:ownerBlock";

/// What a block's payload represents, keyed by namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Generic,
    Identification,
    Structure,
    Semantic,
    Owner,
}

impl BlockKind {
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(IDENTIFICATION_NAMESPACE) => BlockKind::Identification,
            Some(STRUCTURE_NAMESPACE) => BlockKind::Structure,
            Some(SEMANTIC_NAMESPACE) => BlockKind::Semantic,
            Some(OWNER_NAMESPACE) => BlockKind::Owner,
            _ => BlockKind::Generic,
        }
    }

    /// The namespace that selects this kind, if any.
    pub fn namespace(&self) -> Option<&'static str> {
        match self {
            BlockKind::Generic => None,
            BlockKind::Identification => Some(IDENTIFICATION_NAMESPACE),
            BlockKind::Structure => Some(STRUCTURE_NAMESPACE),
            BlockKind::Semantic => Some(SEMANTIC_NAMESPACE),
            BlockKind::Owner => Some(OWNER_NAMESPACE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_namespaces() {
        assert_eq!(
            BlockKind::from_namespace(Some("urn:omm:block:structure")),
            BlockKind::Structure
        );
        assert_eq!(
            BlockKind::from_namespace(Some("urn:omm:block:indentifications")),
            BlockKind::Identification
        );
        assert_eq!(
            BlockKind::from_namespace(Some("urn:example")),
            BlockKind::Generic
        );
        assert_eq!(BlockKind::from_namespace(None), BlockKind::Generic);
    }

    #[test]
    fn namespace_round_trips() {
        for kind in [
            BlockKind::Identification,
            BlockKind::Structure,
            BlockKind::Semantic,
            BlockKind::Owner,
        ] {
            assert_eq!(BlockKind::from_namespace(kind.namespace()), kind);
        }
    }
}
