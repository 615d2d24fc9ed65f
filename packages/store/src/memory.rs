//! The canonical in-process memory.

use std::collections::HashMap;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use objmem_model::{
    ActionResult, Block, BlockBuilder, Entity, Format, Header, MemoryDocument, MultiLangText,
    PayloadCodec, PreviousBlockLink, ResourceType, SubjectTag, TocEntry, TypedValue,
};

use crate::error::Result;
use crate::event::{DispatcherConfig, EventDispatcher, EventKind, MemoryEvent, MemoryListener};

/// Where a memory was loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    None,
    LocalFile(PathBuf),
    Remote(String),
}

/// An object memory held in process.
///
/// Blocks keep their insertion order. Mutations through [`Memory::add_block`],
/// [`Memory::remove_block`] and [`BlockMut`] fire an event to every
/// registered listener on the memory's worker pool.
pub struct Memory {
    header: Header,
    owner: Option<Block>,
    blocks: HashMap<String, Block>,
    order: Vec<String>,
    source: Source,
    listeners: Vec<Arc<dyn MemoryListener>>,
    dispatcher: EventDispatcher,
}

impl Memory {
    pub fn new(header: Header) -> Self {
        Self::with_config(header, &DispatcherConfig::default())
    }

    pub fn with_config(header: Header, config: &DispatcherConfig) -> Self {
        Self {
            header,
            owner: None,
            blocks: HashMap::new(),
            order: Vec::new(),
            source: Source::None,
            listeners: Vec::new(),
            dispatcher: EventDispatcher::new(config),
        }
    }

    pub fn with_primary_id(primary_id: TypedValue) -> Self {
        Self::new(Header::new(primary_id))
    }

    /// Build a memory from its document form. Blocks are taken unchanged;
    /// a repeated block ID keeps the first block.
    pub fn from_document(document: MemoryDocument) -> Self {
        let mut memory = Self::new(document.header);
        memory.owner = document.owner;
        for block in document.blocks {
            let id = block.id().to_string();
            if memory.insert(block) != ActionResult::Ok {
                log::warn!("Skipping block with duplicate ID '{}'", id);
            }
        }
        memory
    }

    pub fn to_document(&self) -> MemoryDocument {
        MemoryDocument {
            header: self.header.clone(),
            owner: self.owner.clone(),
            blocks: self.blocks().cloned().collect(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn owner(&self) -> Option<&Block> {
        self.owner.as_ref()
    }

    pub fn set_owner(&mut self, owner: Option<Block>) {
        self.owner = owner;
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = source;
    }

    /// Add a block, making `entity` its creator.
    pub fn add_block(&mut self, mut block: Block, entity: &Entity) -> ActionResult {
        if self.blocks.contains_key(block.id()) {
            return ActionResult::BlockWithSameIdExists;
        }
        block.set_creator(entity.clone());
        self.add_and_notify(block, entity)
    }

    /// Add a block as is, keeping its creator. Used when importing.
    pub fn add_block_unchanged(&mut self, block: Block, entity: &Entity) -> ActionResult {
        if self.blocks.contains_key(block.id()) {
            return ActionResult::BlockWithSameIdExists;
        }
        self.add_and_notify(block, entity)
    }

    fn add_and_notify(&mut self, block: Block, entity: &Entity) -> ActionResult {
        let snapshot = block.clone();
        let result = self.insert(block);
        if result.is_ok() {
            self.notify(snapshot, entity, EventKind::BlockAdded);
        }
        result
    }

    fn insert(&mut self, block: Block) -> ActionResult {
        if self.blocks.contains_key(block.id()) {
            return ActionResult::BlockWithSameIdExists;
        }
        self.order.push(block.id().to_string());
        self.blocks.insert(block.id().to_string(), block);
        ActionResult::Ok
    }

    pub fn remove_block(&mut self, id: &str, entity: &Entity) -> ActionResult {
        let Some(block) = self.blocks.remove(id) else {
            return ActionResult::BlockNotExistent;
        };
        self.order.retain(|o| o != id);
        self.notify(block, entity, EventKind::BlockRemoved);
        ActionResult::Ok
    }

    /// Allocate a free ID, point the block at this memory and add it with
    /// `entity` as creator. Returns the new block's ID.
    pub fn create_block(&mut self, builder: BlockBuilder, entity: &Entity) -> Result<String> {
        let id = self.free_block_id();
        let block = builder
            .id(id.clone())
            .primary_id(self.header.primary_id.clone())
            .creator(entity.clone())
            .build()?;
        self.add_block(block, entity);
        Ok(id)
    }

    /// The smallest positive integer not yet used as a block ID.
    pub fn free_block_id(&self) -> String {
        (1u64..)
            .map(|i| i.to_string())
            .find(|id| !self.blocks.contains_key(id))
            .unwrap_or_default()
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Mutable access to a block. Changes made through the guard are
    /// credited to `entity` and fire the matching event.
    pub fn block_mut(&mut self, id: &str, entity: &Entity) -> Option<BlockMut<'_>> {
        let block = self.blocks.get_mut(id)?;
        Some(BlockMut {
            block,
            entity: entity.clone(),
            header: &self.header,
            listeners: &self.listeners,
            dispatcher: &self.dispatcher,
        })
    }

    /// All blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.order.iter().filter_map(|id| self.blocks.get(id))
    }

    pub fn block_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn contains_block(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        self.blocks().map(TocEntry::from).collect()
    }

    /// Register a listener. Registering the same listener twice has no effect.
    pub fn add_listener(&mut self, listener: Arc<dyn MemoryListener>) {
        if !self.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn MemoryListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    /// Wait until every event fired so far has been delivered.
    pub fn drain(&self) {
        self.dispatcher.drain();
    }

    /// Deliver pending events and stop the worker pool. Later changes fire
    /// no events.
    pub fn close(&mut self) {
        self.dispatcher.close();
    }

    fn notify(&self, block: Block, entity: &Entity, kind: EventKind) {
        self.dispatcher.dispatch(
            &self.listeners,
            MemoryEvent {
                memory: self.header.clone(),
                block,
                entity: entity.clone(),
                kind,
            },
        );
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("header", &self.header)
            .field("blocks", &self.order)
            .field("source", &self.source)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A block borrowed mutably from a [`Memory`].
///
/// Reads go through `Deref`. Every setter records the acting entity as a
/// contributor and fires one event.
pub struct BlockMut<'a> {
    block: &'a mut Block,
    entity: Entity,
    header: &'a Header,
    listeners: &'a [Arc<dyn MemoryListener>],
    dispatcher: &'a EventDispatcher,
}

impl BlockMut<'_> {
    fn changed(&self, kind: EventKind) {
        self.dispatcher.dispatch(
            self.listeners,
            MemoryEvent {
                memory: self.header.clone(),
                block: self.block.clone(),
                entity: self.entity.clone(),
                kind,
            },
        );
    }

    pub fn set_title(&mut self, title: MultiLangText) -> Result<()> {
        self.block.set_title(title, &self.entity)?;
        self.changed(EventKind::TitleChanged);
        Ok(())
    }

    pub fn set_title_text(&mut self, locale: &str, text: &str) {
        self.block.set_title_text(locale, text, &self.entity);
        self.changed(EventKind::TitleChanged);
    }

    pub fn remove_title(&mut self, locale: &str) -> bool {
        let removed = self.block.remove_title(locale, &self.entity);
        if removed {
            self.changed(EventKind::TitleChanged);
        }
        removed
    }

    pub fn set_description(&mut self, description: MultiLangText) {
        self.block.set_description(description, &self.entity);
        self.changed(EventKind::DescriptionChanged);
    }

    pub fn set_description_text(&mut self, locale: &str, text: &str) {
        self.block.set_description_text(locale, text, &self.entity);
        self.changed(EventKind::DescriptionChanged);
    }

    pub fn remove_description(&mut self, locale: &str) -> bool {
        let removed = self.block.remove_description(locale, &self.entity);
        if removed {
            self.changed(EventKind::DescriptionChanged);
        }
        removed
    }

    pub fn clear_description(&mut self) {
        self.block.clear_description(&self.entity);
        self.changed(EventKind::DescriptionChanged);
    }

    pub fn set_resource_type(&mut self, resource_type: ResourceType) {
        self.block.set_resource_type(resource_type, &self.entity);
        self.changed(EventKind::TypeChanged);
    }

    pub fn remove_resource_type(&mut self) -> bool {
        let removed = self.block.remove_resource_type(&self.entity);
        if removed {
            self.changed(EventKind::TypeChanged);
        }
        removed
    }

    pub fn set_format(&mut self, format: Format) {
        self.block.set_format(format, &self.entity);
        self.changed(EventKind::FormatChanged);
    }

    pub fn remove_format(&mut self) -> Result<()> {
        self.block.remove_format(&self.entity)?;
        self.changed(EventKind::FormatChanged);
        Ok(())
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.block.set_namespace(namespace, &self.entity);
        self.changed(EventKind::NamespaceChanged);
    }

    pub fn add_subject(&mut self, subject: SubjectTag) {
        self.block.add_subject(subject, &self.entity);
        self.changed(EventKind::SubjectChanged);
    }

    pub fn change_subject(&mut self, old: &SubjectTag, new: SubjectTag) -> bool {
        let changed = self.block.change_subject(old, new, &self.entity);
        if changed {
            self.changed(EventKind::SubjectChanged);
        }
        changed
    }

    pub fn remove_subject(&mut self, subject: &SubjectTag) -> bool {
        let removed = self.block.remove_subject(subject, &self.entity);
        if removed {
            self.changed(EventKind::SubjectChanged);
        }
        removed
    }

    pub fn clear_subjects(&mut self) {
        self.block.clear_subjects(&self.entity);
        self.changed(EventKind::SubjectChanged);
    }

    pub fn set_previous_link(&mut self, link: Option<PreviousBlockLink>) {
        self.block.set_previous_link(link, &self.entity);
        self.changed(EventKind::LinkChanged);
    }

    pub fn set_link(&mut self, value: TypedValue, hash: Option<String>) {
        self.block.set_link(value, hash, &self.entity);
        self.changed(EventKind::LinkChanged);
    }

    pub fn remove_link(&mut self) {
        self.block.remove_link(&self.entity);
        self.changed(EventKind::LinkChanged);
    }

    pub fn set_payload(&mut self, value: TypedValue) {
        self.block.set_payload(value, &self.entity);
        self.changed(EventKind::PayloadChanged);
    }

    pub fn set_payload_bytes(&mut self, bytes: &[u8], codec: &dyn PayloadCodec) {
        self.block.set_payload_bytes(bytes, codec, &self.entity);
        self.changed(EventKind::PayloadChanged);
    }

    pub fn set_payload_fragment(&mut self, value: TypedValue, fragment: &str) {
        self.block.set_payload_fragment(value, fragment, &self.entity);
        self.changed(EventKind::PayloadChanged);
    }

    pub fn remove_payload(&mut self) {
        self.block.remove_payload(&self.entity);
        self.changed(EventKind::PayloadChanged);
    }
}

impl Deref for BlockMut<'_> {
    type Target = Block;

    fn deref(&self) -> &Block {
        self.block
    }
}
