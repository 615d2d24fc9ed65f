//! Handle for one block of a [`RemoteMemory`](crate::RemoteMemory).

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use objmem_model::document::{field, list_field, LinkDocument, PayloadDocument};
use objmem_model::{
    Block, BlockDocument, BlockKind, BlockView, Entity, Format, MultiLangText, PreviousBlockLink,
    ResourceType, SubjectTag, TypedValue,
};

use crate::error::{Error, Result};
use crate::remote::{degrade, RemoteInner};
use crate::types::{HttpRequest, HttpResponse};

/// A block living on the server.
///
/// In single access mode each getter reads its own `meta/...` sub-resource.
/// In the complete download modes getters read a shadow copy of the block
/// metadata that is refetched as the mode dictates. The payload is never
/// cached.
#[derive(Clone)]
pub struct RemoteBlock {
    inner: Arc<RemoteInner>,
    id: String,
}

impl RemoteBlock {
    pub(crate) fn new(inner: Arc<RemoteInner>, id: &str) -> Self {
        Self {
            inner,
            id: id.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> BlockKind {
        BlockKind::from_namespace(self.namespace().as_deref())
    }

    /// Read one field, from the shadow or from its own sub-resource.
    fn read<T, F>(&self, sub_resource: &str, from_shadow: F) -> Option<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&Block) -> Option<T>,
    {
        if self.inner.mode().keeps_shadow() {
            return self.shadow().and_then(|b| from_shadow(&b));
        }
        let value = degrade(
            sub_resource,
            self.inner.field_document(&self.id, &["meta", sub_resource]),
        )?;
        if value.is_null() {
            return None;
        }
        degrade(sub_resource, serde_json::from_value(value).map_err(Error::from))
    }

    /// Read a field of the whole `meta` document.
    fn read_meta<T, F>(&self, key: &str, from_shadow: F) -> Option<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&Block) -> Option<T>,
    {
        if self.inner.mode().keeps_shadow() {
            return self.shadow().and_then(|b| from_shadow(&b));
        }
        let meta = degrade("block metadata", self.inner.field_document(&self.id, &["meta"]))?;
        field(meta.as_object()?, key)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        let response = self.inner.send(request)?;
        self.invalidate();
        if !response.is_success() {
            return Err(Error::Status {
                status: response.status,
                url,
            });
        }
        Ok(response)
    }

    pub fn set_payload(&self, value: &TypedValue) -> Result<()> {
        let url = self.inner.block_url(&self.id, &["payload"])?;
        self.send(HttpRequest::post(url.as_str()).with_body(value)?)?;
        Ok(())
    }

    pub fn remove_payload(&self) -> Result<()> {
        let url = self.inner.block_url(&self.id, &["payload"])?;
        self.send(HttpRequest::delete(url.as_str()))?;
        Ok(())
    }

    pub fn add_subject(&self, subject: &SubjectTag) -> Result<()> {
        let url = self.inner.block_url(&self.id, &["meta", "subject"])?;
        self.send(HttpRequest::post(url.as_str()).with_body(subject)?)?;
        Ok(())
    }

    pub fn set_title(&self, _title: &MultiLangText, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_title",
        })
    }

    pub fn set_description(&self, _description: &MultiLangText, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_description",
        })
    }

    pub fn set_namespace(&self, _namespace: &str, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_namespace",
        })
    }

    pub fn set_resource_type(&self, _resource_type: &ResourceType, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_resource_type",
        })
    }

    pub fn set_format(&self, _format: &Format, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_format",
        })
    }

    pub fn set_link(&self, _link: &TypedValue, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_link",
        })
    }

    pub fn set_previous_link(&self, _link: &PreviousBlockLink, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "set_previous_link",
        })
    }

    pub fn remove_subject(&self, _subject: &SubjectTag, _entity: &Entity) -> Result<()> {
        Err(Error::Unsupported {
            operation: "remove_subject",
        })
    }

    pub fn link_hash(&self) -> Option<String> {
        if self.inner.mode().keeps_shadow() {
            return self.shadow().and_then(|b| b.link_hash().map(str::to_string));
        }
        self.link_document().and_then(|l| l.hash)
    }

    fn link_document(&self) -> Option<LinkDocument> {
        self.read("link", |_| None)
    }

    fn shadow(&self) -> Option<Block> {
        degrade("block metadata", self.inner.shadow(&self.id))
    }

    /// The shadow copy plus the current payload.
    pub fn to_local_block(&self) -> Result<Block> {
        if !self.inner.mode().keeps_shadow() {
            return Err(Error::NotAvailableInSingleAccess {
                operation: "to_local_block",
            });
        }
        let shadow = self.inner.shadow(&self.id)?;
        if shadow.is_link_block() {
            return Ok(shadow);
        }
        let Some(text) = self.payload_as_string() else {
            return Ok(shadow);
        };
        let mut document = BlockDocument::from(&shadow);
        document.payload = Some(PayloadDocument {
            value: TypedValue::new("none", text),
            fragment: None,
        });
        Ok(Block::try_from(document)?)
    }

    /// Drop this block's shadow and cached responses.
    pub fn invalidate(&self) {
        self.inner.invalidate_block(&self.id);
    }
}

impl fmt::Debug for RemoteBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBlock").field("id", &self.id).finish()
    }
}

impl BlockView for RemoteBlock {
    fn block_id(&self) -> String {
        self.id.clone()
    }

    fn primary_id(&self) -> Option<TypedValue> {
        self.read("primaryID", |b| b.primary_id().cloned())
    }

    fn namespace(&self) -> Option<String> {
        self.read("namespace", |b| b.namespace().map(str::to_string))
    }

    fn resource_type(&self) -> Option<ResourceType> {
        self.read("type", |b| b.resource_type().cloned())
    }

    fn title(&self) -> Option<MultiLangText> {
        self.read_meta("title", |b| Some(b.title().clone()))
    }

    fn description(&self) -> Option<MultiLangText> {
        self.read_meta("description", |b| {
            let d = b.description();
            (!d.is_empty()).then(|| d.clone())
        })
    }

    fn creator(&self) -> Option<Entity> {
        self.read_meta("creator", |b| Some(b.creator().clone()))
    }

    fn contributors(&self) -> Vec<Entity> {
        if self.inner.mode().keeps_shadow() {
            return self
                .shadow()
                .map(|b| b.contributors().to_vec())
                .unwrap_or_default();
        }
        degrade("block metadata", self.inner.field_document(&self.id, &["meta"]))
            .as_ref()
            .and_then(Value::as_object)
            .map(|meta| list_field(meta, "contributors"))
            .unwrap_or_default()
    }

    fn format(&self) -> Option<Format> {
        self.read("format", |b| b.format().cloned())
    }

    fn subjects(&self) -> Vec<SubjectTag> {
        if self.inner.mode().keeps_shadow() {
            return self
                .shadow()
                .map(|b| b.subjects().to_vec())
                .unwrap_or_default();
        }
        let value = degrade(
            "subjects",
            self.inner.field_document(&self.id, &["meta", "subject"]),
        );
        let Some(Value::Array(items)) = value else {
            return Vec::new();
        };
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(tag) => Some(tag),
                Err(e) => {
                    log::warn!("Skipping malformed subject of block {}: {}", self.id, e);
                    None
                }
            })
            .collect()
    }

    fn previous_link(&self) -> Option<PreviousBlockLink> {
        self.read("previousBlock", |b| b.previous_link().cloned())
    }

    fn payload(&self) -> Option<TypedValue> {
        self.payload_as_string()
            .map(|text| TypedValue::new("none", text))
    }

    fn payload_as_string(&self) -> Option<String> {
        let result = self
            .inner
            .block_url(&self.id, &["payload"])
            .and_then(|url| {
                let response = self.inner.send(HttpRequest::get(url.as_str()))?;
                if response.is_success() {
                    Ok(Some(response.body))
                } else {
                    log::debug!("No payload at {} (status {})", url, response.status);
                    Ok(None)
                }
            });
        degrade("payload", result).flatten()
    }

    fn link(&self) -> Option<TypedValue> {
        if self.inner.mode().keeps_shadow() {
            return self.shadow().and_then(|b| b.link().cloned());
        }
        self.link_document().map(|l| l.value)
    }
}
