//! Blocks: one metadata record plus payload (or link) inside a memory.

use std::fmt;

use crate::entity::Entity;
use crate::error::{ModelError, Result};
use crate::format::{Format, ResourceType};
use crate::kind::{BlockKind, OWNER_NAMESPACE};
use crate::link::PreviousBlockLink;
use crate::payload::{PayloadCodec, PayloadCodecs};
use crate::subject::{SubjectKind, SubjectTag};
use crate::value::{MultiLangText, TypedValue};

/// What a block carries: its data inline, or a pointer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Inline data, optionally with the raw document fragment it came from.
    Payload {
        value: TypedValue,
        fragment: Option<String>,
    },
    /// External data, optionally with a content hash.
    Link {
        value: TypedValue,
        hash: Option<String>,
    },
}

/// A single block.
///
/// Required fields (id, title, creator, and a namespace or format) are
/// enforced by [`BlockBuilder::build`] and by every setter, so a `Block`
/// value is always valid.
///
/// Every metadata setter takes the acting [`Entity`] and records it as a
/// contributor: an earlier entry for the same actor is dropped and the new
/// one appended, so each actor appears once with its latest timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: String,
    primary_id: Option<TypedValue>,
    namespace: Option<String>,
    resource_type: Option<ResourceType>,
    title: MultiLangText,
    description: MultiLangText,
    creator: Entity,
    contributors: Vec<Entity>,
    format: Option<Format>,
    subjects: Vec<SubjectTag>,
    previous_link: Option<PreviousBlockLink>,
    content: Option<Content>,
}

impl Block {
    pub fn builder(id: impl Into<String>) -> BlockBuilder {
        BlockBuilder::new().id(id)
    }

    /// The block naming a memory's owner.
    pub fn owner_block(primary_id: TypedValue, owner: impl Into<String>) -> Block {
        let owner = owner.into();
        Block {
            id: "owner".to_string(),
            primary_id: Some(primary_id),
            namespace: Some(OWNER_NAMESPACE.to_string()),
            resource_type: None,
            title: MultiLangText::single("en", "owner block"),
            description: MultiLangText::new(),
            creator: Entity::now("name", owner.clone()),
            contributors: Vec::new(),
            format: Some(Format::new("text/plain")),
            subjects: Vec::new(),
            previous_link: None,
            content: Some(Content::Payload {
                value: TypedValue::new("none", owner),
                fragment: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn primary_id(&self) -> Option<&TypedValue> {
        self.primary_id.as_ref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn resource_type(&self) -> Option<&ResourceType> {
        self.resource_type.as_ref()
    }

    pub fn title(&self) -> &MultiLangText {
        &self.title
    }

    pub fn title_text(&self, locale: &str) -> Option<&str> {
        self.title.get(locale)
    }

    pub fn description(&self) -> &MultiLangText {
        &self.description
    }

    pub fn description_text(&self, locale: &str) -> Option<&str> {
        self.description.get(locale)
    }

    pub fn creator(&self) -> &Entity {
        &self.creator
    }

    pub fn contributors(&self) -> &[Entity] {
        &self.contributors
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    pub fn subjects(&self) -> &[SubjectTag] {
        &self.subjects
    }

    pub fn previous_link(&self) -> Option<&PreviousBlockLink> {
        self.previous_link.as_ref()
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn payload(&self) -> Option<&TypedValue> {
        match &self.content {
            Some(Content::Payload { value, .. }) => Some(value),
            _ => None,
        }
    }

    pub fn payload_fragment(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Payload { fragment, .. }) => fragment.as_deref(),
            _ => None,
        }
    }

    /// The payload type, which names its text encoding.
    pub fn payload_encoding(&self) -> Option<&str> {
        self.payload().map(|p| p.value_type.as_str())
    }

    pub fn link(&self) -> Option<&TypedValue> {
        match &self.content {
            Some(Content::Link { value, .. }) => Some(value),
            _ => None,
        }
    }

    pub fn link_hash(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Link { hash, .. }) => hash.as_deref(),
            _ => None,
        }
    }

    pub fn is_link_block(&self) -> bool {
        matches!(self.content, Some(Content::Link { .. }))
    }

    /// The payload as text, using the base64 and plain codecs.
    pub fn payload_as_string(&self) -> Option<String> {
        self.payload_as_string_with(&PayloadCodecs::default())
    }

    pub fn payload_as_string_with(&self, codecs: &PayloadCodecs) -> Option<String> {
        self.payload().map(|p| codecs.payload_as_string(p))
    }

    /// Whether any subject chain contains this kind and value.
    pub fn is_subject_present(&self, kind: SubjectKind, value: &str) -> bool {
        self.subjects.iter().any(|t| t.contains(kind, value))
    }

    pub fn kind(&self) -> BlockKind {
        BlockKind::from_namespace(self.namespace())
    }

    /// Add `entity` to the contributors, replacing an earlier entry for the
    /// same actor.
    pub fn record_contribution(&mut self, entity: &Entity) {
        self.contributors.retain(|c| !c.same_actor(entity));
        self.contributors.push(entity.clone());
    }

    // Bookkeeping used by stores and importers. These do not count as
    // contributions.

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn set_primary_id(&mut self, primary_id: Option<TypedValue>) {
        self.primary_id = primary_id;
    }

    pub fn set_creator(&mut self, creator: Entity) {
        self.creator = creator;
    }

    pub fn set_contributors(&mut self, contributors: Vec<Entity>) {
        self.contributors = contributors;
    }

    pub fn set_title(&mut self, title: MultiLangText, entity: &Entity) -> Result<()> {
        if title.is_empty() {
            return Err(ModelError::MissingField { field: "title" });
        }
        self.title = title;
        self.record_contribution(entity);
        Ok(())
    }

    pub fn set_title_text(
        &mut self,
        locale: impl Into<String>,
        text: impl Into<String>,
        entity: &Entity,
    ) {
        self.title.insert(locale, text);
        self.record_contribution(entity);
    }

    /// Remove one title translation. Returns `false` if the locale was not
    /// present or if it is the last remaining title.
    pub fn remove_title(&mut self, locale: &str, entity: &Entity) -> bool {
        if self.title.len() < 2 {
            return false;
        }
        let removed = self.title.remove(locale).is_some();
        if removed {
            self.record_contribution(entity);
        }
        removed
    }

    pub fn set_description(&mut self, description: MultiLangText, entity: &Entity) {
        self.description = description;
        self.record_contribution(entity);
    }

    pub fn set_description_text(
        &mut self,
        locale: impl Into<String>,
        text: impl Into<String>,
        entity: &Entity,
    ) {
        self.description.insert(locale, text);
        self.record_contribution(entity);
    }

    pub fn remove_description(&mut self, locale: &str, entity: &Entity) -> bool {
        let removed = self.description.remove(locale).is_some();
        if removed {
            self.record_contribution(entity);
        }
        removed
    }

    pub fn clear_description(&mut self, entity: &Entity) {
        self.description.clear();
        self.record_contribution(entity);
    }

    pub fn set_resource_type(&mut self, resource_type: ResourceType, entity: &Entity) {
        self.resource_type = Some(resource_type);
        self.record_contribution(entity);
    }

    pub fn remove_resource_type(&mut self, entity: &Entity) -> bool {
        let removed = self.resource_type.take().is_some();
        if removed {
            self.record_contribution(entity);
        }
        removed
    }

    pub fn set_format(&mut self, format: Format, entity: &Entity) {
        self.format = Some(format);
        self.record_contribution(entity);
    }

    /// Fails when the block has no namespace to fall back on.
    pub fn remove_format(&mut self, entity: &Entity) -> Result<()> {
        if self.namespace.is_none() {
            return Err(ModelError::MissingNamespaceAndFormat);
        }
        self.format = None;
        self.record_contribution(entity);
        Ok(())
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>, entity: &Entity) {
        self.namespace = Some(namespace.into());
        self.record_contribution(entity);
    }

    pub fn add_subject(&mut self, subject: SubjectTag, entity: &Entity) {
        self.subjects.push(subject);
        self.record_contribution(entity);
    }

    /// Replace `old` with `new`. Returns `false` if `old` is not present.
    pub fn change_subject(&mut self, old: &SubjectTag, new: SubjectTag, entity: &Entity) -> bool {
        match self.subjects.iter().position(|t| t == old) {
            Some(pos) => {
                self.subjects.remove(pos);
                self.subjects.push(new);
                self.record_contribution(entity);
                true
            }
            None => false,
        }
    }

    pub fn remove_subject(&mut self, subject: &SubjectTag, entity: &Entity) -> bool {
        match self.subjects.iter().position(|t| t == subject) {
            Some(pos) => {
                self.subjects.remove(pos);
                self.record_contribution(entity);
                true
            }
            None => false,
        }
    }

    pub fn clear_subjects(&mut self, entity: &Entity) {
        self.subjects.clear();
        self.record_contribution(entity);
    }

    pub fn set_previous_link(&mut self, link: Option<PreviousBlockLink>, entity: &Entity) {
        self.previous_link = link;
        self.record_contribution(entity);
    }

    /// Point the block at external data. Clears any payload.
    pub fn set_link(&mut self, value: TypedValue, hash: Option<String>, entity: &Entity) {
        self.content = Some(Content::Link { value, hash });
        self.record_contribution(entity);
    }

    pub fn remove_link(&mut self, entity: &Entity) {
        if self.is_link_block() {
            self.content = None;
        }
        self.record_contribution(entity);
    }

    /// Store data inline. Clears any link and any cached fragment.
    pub fn set_payload(&mut self, value: TypedValue, entity: &Entity) {
        self.content = Some(Content::Payload {
            value,
            fragment: None,
        });
        self.record_contribution(entity);
    }

    /// Store raw bytes, encoded with `codec`.
    pub fn set_payload_bytes(&mut self, bytes: &[u8], codec: &dyn PayloadCodec, entity: &Entity) {
        let value = TypedValue::new(codec.name(), codec.encode(bytes));
        self.set_payload(value, entity);
    }

    /// Store data inline together with the document fragment it was read from.
    pub fn set_payload_fragment(
        &mut self,
        value: TypedValue,
        fragment: impl Into<String>,
        entity: &Entity,
    ) {
        self.content = Some(Content::Payload {
            value,
            fragment: Some(fragment.into()),
        });
        self.record_contribution(entity);
    }

    pub fn remove_payload(&mut self, entity: &Entity) {
        if self.payload().is_some() {
            self.content = None;
        }
        self.record_contribution(entity);
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block {}", self.id)?;
        if let Some((_, title)) = self.title.iter().next() {
            write!(f, " '{}'", title)?;
        }
        if let Some(ns) = &self.namespace {
            write!(f, " [{}]", ns)?;
        }
        Ok(())
    }
}

/// Assembles a [`Block`], checking required fields on [`BlockBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct BlockBuilder {
    id: Option<String>,
    primary_id: Option<TypedValue>,
    namespace: Option<String>,
    resource_type: Option<ResourceType>,
    title: MultiLangText,
    description: MultiLangText,
    creator: Option<Entity>,
    contributors: Vec<Entity>,
    format: Option<Format>,
    subjects: Vec<SubjectTag>,
    previous_link: Option<PreviousBlockLink>,
    content: Option<Content>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn primary_id(mut self, primary_id: TypedValue) -> Self {
        self.primary_id = Some(primary_id);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    pub fn title(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.title.insert(locale, text);
        self
    }

    pub fn titles(mut self, titles: MultiLangText) -> Self {
        self.title = titles;
        self
    }

    pub fn description(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.description.insert(locale, text);
        self
    }

    pub fn descriptions(mut self, descriptions: MultiLangText) -> Self {
        self.description = descriptions;
        self
    }

    pub fn creator(mut self, creator: Entity) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Append a contributor, keeping one entry per actor.
    pub fn contributor(mut self, contributor: Entity) -> Self {
        self.contributors.retain(|c| !c.same_actor(&contributor));
        self.contributors.push(contributor);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn subject(mut self, subject: SubjectTag) -> Self {
        self.subjects.push(subject);
        self
    }

    pub fn previous_link(mut self, link: PreviousBlockLink) -> Self {
        self.previous_link = Some(link);
        self
    }

    /// Inline payload. Replaces any link set earlier.
    pub fn payload(mut self, value: TypedValue) -> Self {
        self.content = Some(Content::Payload {
            value,
            fragment: None,
        });
        self
    }

    /// External link. Replaces any payload set earlier.
    pub fn link(mut self, value: TypedValue, hash: Option<String>) -> Self {
        self.content = Some(Content::Link { value, hash });
        self
    }

    pub fn content(mut self, content: Option<Content>) -> Self {
        self.content = content;
        self
    }

    pub fn build(self) -> Result<Block> {
        let id = self.id.ok_or(ModelError::MissingField { field: "id" })?;
        if self.title.is_empty() {
            return Err(ModelError::MissingField { field: "title" });
        }
        let creator = self
            .creator
            .ok_or(ModelError::MissingField { field: "creator" })?;
        if self.namespace.is_none() && self.format.is_none() {
            return Err(ModelError::MissingNamespaceAndFormat);
        }

        Ok(Block {
            id,
            primary_id: self.primary_id,
            namespace: self.namespace,
            resource_type: self.resource_type,
            title: self.title,
            description: self.description,
            creator,
            contributors: self.contributors,
            format: self.format,
            subjects: self.subjects,
            previous_link: self.previous_link,
            content: self.content,
        })
    }
}
