//! Subject tags: classification values that may be chained one level at a
//! time (`Ontology("vehicle") -> Text("car") -> ...`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    Text,
    Ontology,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Text => "Text",
            SubjectKind::Ontology => "Ontology",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Text" => Ok(SubjectKind::Text),
            "Ontology" => Ok(SubjectKind::Ontology),
            other => Err(ModelError::InvalidValue {
                field: "subject kind",
                message: format!("unknown kind '{}'", other),
            }),
        }
    }
}

/// Longest subject chain a tag may carry, counting the tag itself.
pub const MAX_SUBJECT_DEPTH: usize = 64;

/// One subject tag with an optional nested child.
///
/// Children are owned, so a chain is always finite. [`SubjectTag::with_child`]
/// additionally refuses a child chain that repeats the parent's kind and value
/// or that would grow past [`MAX_SUBJECT_DEPTH`]. Deserialized tags go through
/// the same check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawSubjectTag")]
pub struct SubjectTag {
    kind: SubjectKind,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child: Option<Box<SubjectTag>>,
}

impl SubjectTag {
    pub fn new(kind: SubjectKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            child: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(SubjectKind::Text, value)
    }

    pub fn ontology(value: impl Into<String>) -> Self {
        Self::new(SubjectKind::Ontology, value)
    }

    /// Attach `child` below this tag, replacing any existing child.
    pub fn with_child(mut self, child: SubjectTag) -> Result<Self> {
        if child.contains(self.kind, &self.value) {
            return Err(ModelError::SubjectCycle { value: self.value });
        }
        let depth = child.depth() + 1;
        if depth > MAX_SUBJECT_DEPTH {
            return Err(ModelError::SubjectTooDeep { depth });
        }
        self.child = Some(Box::new(child));
        Ok(self)
    }

    /// Build a chain from its levels, top first.
    ///
    /// A level that cannot take the chain below it (a repeat of itself, or too
    /// deep) keeps its own tag and loses the rest, with a warning. Levels past
    /// [`MAX_SUBJECT_DEPTH`] are dropped. Returns `None` for no levels.
    pub fn from_levels(mut levels: Vec<(SubjectKind, String)>) -> Option<Self> {
        if levels.len() > MAX_SUBJECT_DEPTH {
            log::warn!(
                "Subject chain has {} levels, keeping the first {}",
                levels.len(),
                MAX_SUBJECT_DEPTH
            );
            levels.truncate(MAX_SUBJECT_DEPTH);
        }
        let mut levels = levels.into_iter().rev();
        let (kind, value) = levels.next()?;
        let mut chain = SubjectTag::new(kind, value);
        for (kind, value) in levels {
            let tag = SubjectTag::new(kind, value);
            chain = match tag.clone().with_child(chain) {
                Ok(chained) => chained,
                Err(e) => {
                    log::warn!("Dropping subject child: {}", e);
                    tag
                }
            };
        }
        Some(chain)
    }

    pub fn kind(&self) -> SubjectKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn child(&self) -> Option<&SubjectTag> {
        self.child.as_deref()
    }

    /// This tag followed by every nested child.
    pub fn chain(&self) -> impl Iterator<Item = &SubjectTag> {
        std::iter::successors(Some(self), |t| t.child())
    }

    /// Number of tags in the chain, including this one.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Whether any tag in the chain has this kind and value.
    pub fn contains(&self, kind: SubjectKind, value: &str) -> bool {
        self.chain().any(|t| t.kind == kind && t.value == value)
    }
}

#[derive(Deserialize)]
struct RawSubjectTag {
    kind: SubjectKind,
    value: String,
    #[serde(default)]
    child: Option<Box<RawSubjectTag>>,
}

impl From<RawSubjectTag> for SubjectTag {
    fn from(raw: RawSubjectTag) -> Self {
        let mut levels = Vec::new();
        let mut next = Some(Box::new(raw));
        while let Some(level) = next {
            let RawSubjectTag { kind, value, child } = *level;
            levels.push((kind, value));
            next = child;
        }
        SubjectTag::from_levels(levels).unwrap_or_else(|| SubjectTag::text(""))
    }
}

impl fmt::Display for SubjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .chain()
            .map(|t| format!("{}({})", t.kind, t.value))
            .collect();
        write!(f, "{}", parts.join(" -> "))
    }
}
