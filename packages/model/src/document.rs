//! Canonical document form of blocks and memories.
//!
//! The document form is what gets written to `.json` files and what is POSTed
//! when a block is created remotely. Decoding is lenient: a field that cannot
//! be read is logged and skipped. The assembled block is still validated, so
//! a document that lacks a required field is rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::block::{Block, BlockBuilder, Content};
use crate::entity::Entity;
use crate::error::{ModelError, Result};
use crate::format::{Format, ResourceType};
use crate::header::Header;
use crate::link::PreviousBlockLink;
use crate::subject::SubjectTag;
use crate::value::{MultiLangText, TypedValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadDocument {
    #[serde(flatten)]
    pub value: TypedValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDocument {
    #[serde(flatten)]
    pub value: TypedValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Field-by-field view of a block document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_id: Option<TypedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub title: MultiLangText,
    #[serde(default, skip_serializing_if = "MultiLangText::is_empty")]
    pub description: MultiLangText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Entity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject: Vec<SubjectTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_block: Option<PreviousBlockLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkDocument>,
}

impl BlockDocument {
    /// Read a document, skipping fields (and list items) that do not parse.
    pub fn from_value_lenient(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| ModelError::InvalidValue {
            field: "block",
            message: "expected a JSON object".to_string(),
        })?;

        Ok(Self {
            id: field(obj, "id"),
            primary_id: field(obj, "primaryId"),
            namespace: field(obj, "namespace"),
            resource_type: field(obj, "type"),
            title: field(obj, "title").unwrap_or_default(),
            description: field(obj, "description").unwrap_or_default(),
            creator: field(obj, "creator"),
            contributors: list_field(obj, "contributors"),
            format: field(obj, "format"),
            subject: list_field(obj, "subject"),
            previous_block: field(obj, "previousBlock"),
            payload: field(obj, "payload"),
            link: field(obj, "link"),
        })
    }
}

impl From<&Block> for BlockDocument {
    fn from(block: &Block) -> Self {
        let (payload, link) = match block.content() {
            Some(Content::Payload { value, fragment }) => (
                Some(PayloadDocument {
                    value: value.clone(),
                    fragment: fragment.clone(),
                }),
                None,
            ),
            Some(Content::Link { value, hash }) => (
                None,
                Some(LinkDocument {
                    value: value.clone(),
                    hash: hash.clone(),
                }),
            ),
            None => (None, None),
        };

        Self {
            id: Some(block.id().to_string()),
            primary_id: block.primary_id().cloned(),
            namespace: block.namespace().map(str::to_string),
            resource_type: block.resource_type().cloned(),
            title: block.title().clone(),
            description: block.description().clone(),
            creator: Some(block.creator().clone()),
            contributors: block.contributors().to_vec(),
            format: block.format().cloned(),
            subject: block.subjects().to_vec(),
            previous_block: block.previous_link().cloned(),
            payload,
            link,
        }
    }
}

impl TryFrom<BlockDocument> for Block {
    type Error = ModelError;

    fn try_from(doc: BlockDocument) -> Result<Block> {
        let content = match (doc.payload, doc.link) {
            (Some(payload), link) => {
                if link.is_some() {
                    log::warn!("Block document has both payload and link, keeping the payload");
                }
                Some(Content::Payload {
                    value: payload.value,
                    fragment: payload.fragment,
                })
            }
            (None, Some(link)) => Some(Content::Link {
                value: link.value,
                hash: link.hash,
            }),
            (None, None) => None,
        };

        let mut builder = BlockBuilder::new()
            .titles(doc.title)
            .descriptions(doc.description)
            .content(content);
        if let Some(id) = doc.id {
            builder = builder.id(id);
        }
        if let Some(primary_id) = doc.primary_id {
            builder = builder.primary_id(primary_id);
        }
        if let Some(namespace) = doc.namespace {
            builder = builder.namespace(namespace);
        }
        if let Some(resource_type) = doc.resource_type {
            builder = builder.resource_type(resource_type);
        }
        if let Some(creator) = doc.creator {
            builder = builder.creator(creator);
        }
        for contributor in doc.contributors {
            builder = builder.contributor(contributor);
        }
        if let Some(format) = doc.format {
            builder = builder.format(format);
        }
        for tag in doc.subject {
            builder = builder.subject(tag);
        }
        if let Some(link) = doc.previous_block {
            builder = builder.previous_link(link);
        }
        builder.build()
    }
}

/// One table-of-contents line: a block without its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub title: MultiLangText,
}

impl From<&Block> for TocEntry {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id().to_string(),
            namespace: block.namespace().map(str::to_string),
            title: block.title().clone(),
        }
    }
}

/// A whole memory in document form.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDocument {
    pub header: Header,
    pub owner: Option<Block>,
    pub blocks: Vec<Block>,
}

impl MemoryDocument {
    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        self.blocks.iter().map(TocEntry::from).collect()
    }
}

/// Encodes blocks and memories to their document form and back.
pub trait DocumentCodec: Send + Sync {
    fn encode_block(&self, block: &Block) -> Result<Vec<u8>>;
    fn decode_block(&self, bytes: &[u8]) -> Result<Block>;
    fn encode_memory(&self, memory: &MemoryDocument) -> Result<Vec<u8>>;
    fn decode_memory(&self, bytes: &[u8]) -> Result<MemoryDocument>;
}

/// JSON document codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentCodec;

impl JsonDocumentCodec {
    pub fn block_to_value(&self, block: &Block) -> Result<Value> {
        Ok(serde_json::to_value(BlockDocument::from(block))?)
    }

    pub fn block_from_value(&self, value: &Value) -> Result<Block> {
        Block::try_from(BlockDocument::from_value_lenient(value)?)
    }

    pub fn memory_to_value(&self, memory: &MemoryDocument) -> Result<Value> {
        let mut obj = Map::new();
        obj.insert("header".to_string(), serde_json::to_value(&memory.header)?);
        if let Some(owner) = &memory.owner {
            obj.insert("owner".to_string(), self.block_to_value(owner)?);
        }
        obj.insert(
            "toc".to_string(),
            serde_json::to_value(memory.table_of_contents())?,
        );
        let blocks = memory
            .blocks
            .iter()
            .map(|b| self.block_to_value(b))
            .collect::<Result<Vec<_>>>()?;
        obj.insert("blocks".to_string(), Value::Array(blocks));
        Ok(Value::Object(obj))
    }

    /// The header is required. Blocks that fail validation are logged and
    /// left out.
    pub fn memory_from_value(&self, value: &Value) -> Result<MemoryDocument> {
        let header_value = value
            .get("header")
            .ok_or(ModelError::MissingField { field: "header" })?;
        let header: Header = serde_json::from_value(header_value.clone())?;

        let owner = match value.get("owner") {
            Some(v) if !v.is_null() => match self.block_from_value(v) {
                Ok(block) => Some(block),
                Err(e) => {
                    log::warn!("Skipping unreadable owner block: {}", e);
                    None
                }
            },
            _ => None,
        };

        let mut blocks = Vec::new();
        if let Some(items) = value.get("blocks").and_then(Value::as_array) {
            for (index, item) in items.iter().enumerate() {
                match self.block_from_value(item) {
                    Ok(block) => blocks.push(block),
                    Err(e) => log::warn!("Skipping block #{} in memory document: {}", index, e),
                }
            }
        }

        Ok(MemoryDocument {
            header,
            owner,
            blocks,
        })
    }
}

impl DocumentCodec for JsonDocumentCodec {
    fn encode_block(&self, block: &Block) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.block_to_value(block)?)?)
    }

    fn decode_block(&self, bytes: &[u8]) -> Result<Block> {
        let value: Value = serde_json::from_slice(bytes)?;
        self.block_from_value(&value)
    }

    fn encode_memory(&self, memory: &MemoryDocument) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.memory_to_value(memory)?)?)
    }

    fn decode_memory(&self, bytes: &[u8]) -> Result<MemoryDocument> {
        let value: Value = serde_json::from_slice(bytes)?;
        self.memory_from_value(&value)
    }
}

/// Read one field of a JSON object, logging and skipping it if malformed.
pub fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Could not read field '{}': {}", key, e);
            None
        }
    }
}

/// Read a JSON array field item by item, skipping malformed items.
pub fn list_field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(items) = obj.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Skipping malformed entry in '{}': {}", key, e);
                None
            }
        })
        .collect()
}
