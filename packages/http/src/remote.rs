//! Proxy for a memory served over HTTP.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use objmem_model::{
    ActionResult, Block, BlockDocument, BlockView, Header, JsonDocumentCodec, MemoryDocument,
    TocEntry,
};
use objmem_store::{Memory, Source};

use crate::cache::ResponseCache;
use crate::clock::{Clock, SystemClock};
use crate::config::{AccessMode, RemoteConfig};
use crate::error::{Error, Result};
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::negotiation::NegotiationData;
use crate::remote_block::RemoteBlock;
use crate::types::{HttpRequest, HttpResponse};

#[derive(Debug, Deserialize)]
struct BlockIdList {
    #[serde(rename = "IDs", default)]
    ids: Vec<String>,
}

pub(crate) struct BlockState {
    pub shadow: Option<(u64, Block)>,
    pub responses: ResponseCache,
}

impl BlockState {
    fn new(capacity: usize) -> Self {
        Self {
            shadow: None,
            responses: ResponseCache::new(capacity),
        }
    }
}

pub(crate) struct RemoteState {
    pub mode: AccessMode,
    negotiation: Option<NegotiationData>,
    block_ids: Option<(u64, Vec<String>)>,
    pub blocks: HashMap<String, BlockState>,
}

impl RemoteState {
    fn clear_blocks(&mut self) {
        self.blocks.clear();
        self.block_ids = None;
    }
}

/// Shared between a [`RemoteMemory`] and the [`RemoteBlock`] handles it
/// hands out, so invalidation reaches every handle.
pub(crate) struct RemoteInner {
    rest_url: Url,
    executor: Arc<dyn HttpExecutor>,
    config: RemoteConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<RemoteState>,
}

impl RemoteInner {
    pub fn state(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> AccessMode {
        self.state().mode
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = request.with_headers(&self.config.headers);
        self.executor.execute(&request)
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self.send(HttpRequest::get(url.as_str()))?;
        if !response.is_success() {
            return Err(Error::Status {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.json()?)
    }

    pub fn negotiation(&self) -> Result<NegotiationData> {
        if let Some(data) = &self.state().negotiation {
            return Ok(data.clone());
        }
        let data: NegotiationData = self.get_json(&self.rest_url)?;
        self.state().negotiation = Some(data.clone());
        Ok(data)
    }

    pub fn storage_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.negotiation()?.storage.link)?)
    }

    pub fn block_url(&self, id: &str, segments: &[&str]) -> Result<Url> {
        let storage = self.storage_url()?;
        let mut path = vec!["block", id];
        path.extend_from_slice(segments);
        join(&storage, &path)
    }

    fn is_fresh(&self, fetched: u64, now: u64) -> bool {
        now.saturating_sub(fetched) <= self.config.ttl_millis()
    }

    /// The full metadata of a block, rebuilt when missing or expired.
    pub fn shadow(&self, id: &str) -> Result<Block> {
        let now = self.now();
        {
            let state = self.state();
            let limited = state.mode == AccessMode::CompleteDownloadLimitedLifetime;
            if let Some((fetched, block)) = state.blocks.get(id).and_then(|b| b.shadow.as_ref()) {
                if !limited || self.is_fresh(*fetched, now) {
                    return Ok(block.clone());
                }
            }
        }

        log::debug!("Building shadow of block {}", id);
        let value: Value = self.get_json(&self.block_url(id, &["meta"])?)?;
        let mut document = BlockDocument::from_value_lenient(&value)?;
        if document.id.is_none() {
            document.id = Some(id.to_string());
        }
        let block = Block::try_from(document)?;

        let capacity = self.config.cache_capacity;
        self.state()
            .blocks
            .entry(id.to_string())
            .or_insert_with(|| BlockState::new(capacity))
            .shadow = Some((now, block.clone()));
        Ok(block)
    }

    /// One metadata sub-resource, through the block's response cache.
    pub fn field_document(&self, id: &str, segments: &[&str]) -> Result<Value> {
        let url = self.block_url(id, segments)?;
        let key = url.to_string();
        let now = self.now();
        let ttl = self.config.ttl_millis();
        let capacity = self.config.cache_capacity;

        let cached = self
            .state()
            .blocks
            .get_mut(id)
            .and_then(|b| b.responses.get(&key, now, ttl));
        if let Some(value) = cached {
            return Ok(value);
        }

        let value: Value = self.get_json(&url)?;
        self.state()
            .blocks
            .entry(id.to_string())
            .or_insert_with(|| BlockState::new(capacity))
            .responses
            .insert(key, now, value.clone());
        Ok(value)
    }

    pub fn invalidate_block(&self, id: &str) {
        self.state().blocks.remove(id);
    }

    fn block_ids(&self) -> Result<Vec<String>> {
        let now = self.now();
        {
            let state = self.state();
            if let Some((fetched, ids)) = &state.block_ids {
                let fresh = match state.mode {
                    AccessMode::SingleAccess => false,
                    AccessMode::CompleteDownloadLimitedLifetime => self.is_fresh(*fetched, now),
                    AccessMode::CompleteDownloadUnlimited => true,
                };
                if fresh {
                    return Ok(ids.clone());
                }
            }
        }

        let list: BlockIdList = self.get_json(&join(&self.storage_url()?, &["block_ids"])?)?;
        let mut state = self.state();
        if state.mode.keeps_shadow() {
            state.block_ids = Some((now, list.ids.clone()));
        }
        Ok(list.ids)
    }
}

fn join(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| Error::InvalidUrl {
            url: base.to_string(),
        })?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

pub(crate) fn degrade<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Could not read {}: {}", what, e);
            None
        }
    }
}

/// A memory reached through its REST endpoint.
///
/// Reads are synchronous and cached according to the [`AccessMode`].
/// Failed reads are logged and come back empty. Mutations always go to the
/// server and report an [`ActionResult`].
#[derive(Clone)]
pub struct RemoteMemory {
    inner: Arc<RemoteInner>,
}

impl RemoteMemory {
    pub fn new(
        rest_url: &str,
        executor: Arc<dyn HttpExecutor>,
        config: RemoteConfig,
    ) -> Result<Self> {
        Self::with_clock(rest_url, executor, config, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        rest_url: &str,
        executor: Arc<dyn HttpExecutor>,
        config: RemoteConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let rest_url = Url::parse(rest_url)?;
        if rest_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: rest_url.to_string(),
            });
        }
        let state = RemoteState {
            mode: config.access_mode,
            negotiation: None,
            block_ids: None,
            blocks: HashMap::new(),
        };
        Ok(Self {
            inner: Arc::new(RemoteInner {
                rest_url,
                executor,
                config,
                clock,
                state: Mutex::new(state),
            }),
        })
    }

    /// Connect with the reqwest executor.
    pub fn connect(rest_url: &str, config: RemoteConfig) -> Result<Self> {
        let executor = ReqwestExecutor::new(config.timeout)?;
        Self::new(rest_url, Arc::new(executor), config)
    }

    pub fn rest_url(&self) -> &str {
        self.inner.rest_url.as_str()
    }

    pub fn negotiation_data(&self) -> Option<NegotiationData> {
        degrade("negotiation data", self.inner.negotiation())
    }

    pub fn storage_url(&self) -> Option<String> {
        degrade("storage URL", self.inner.storage_url()).map(String::from)
    }

    pub fn header(&self) -> Option<Header> {
        let result = self
            .inner
            .storage_url()
            .and_then(|storage| join(&storage, &["header"]))
            .and_then(|url| self.inner.get_json(&url));
        degrade("memory header", result)
    }

    pub fn block_ids(&self) -> Vec<String> {
        degrade("block IDs", self.inner.block_ids()).unwrap_or_default()
    }

    pub fn blocks(&self) -> Vec<RemoteBlock> {
        self.block_ids()
            .into_iter()
            .map(|id| self.block(&id))
            .collect()
    }

    /// A handle for `id`. Nothing is fetched until a field is read.
    pub fn block(&self, id: &str) -> RemoteBlock {
        RemoteBlock::new(Arc::clone(&self.inner), id)
    }

    /// POST `block` to the server. On success the block takes the ID the
    /// server assigned.
    pub fn add_block(&self, block: &mut Block) -> ActionResult {
        let result = self.post_block(block);
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Could not add block {}: {}", block.id(), e);
                return ActionResult::UnknownError;
            }
        };

        match response.status {
            201 => {
                let id = response.text().trim();
                if !id.is_empty() {
                    block.set_id(id);
                }
                self.inner.state().block_ids = None;
                ActionResult::Ok
            }
            403 => ActionResult::Forbidden,
            status => {
                log::warn!("Adding block {} returned status {}", block.id(), status);
                ActionResult::UnknownError
            }
        }
    }

    fn post_block(&self, block: &Block) -> Result<HttpResponse> {
        let url = join(&self.inner.storage_url()?, &["block"])?;
        let body = JsonDocumentCodec.block_to_value(block)?;
        self.inner
            .send(HttpRequest::post(url.as_str()).with_json_body(body))
    }

    pub fn remove_block(&self, id: &str) -> ActionResult {
        let result = self
            .inner
            .storage_url()
            .and_then(|storage| join(&storage, &["block", id]))
            .and_then(|url| self.inner.send(HttpRequest::delete(url.as_str())));
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Could not remove block {}: {}", id, e);
                return ActionResult::UnknownError;
            }
        };

        if response.is_success() {
            let mut state = self.inner.state();
            state.blocks.remove(id);
            state.block_ids = None;
            ActionResult::Ok
        } else if response.is_forbidden() {
            ActionResult::Forbidden
        } else {
            log::warn!("Removing block {} returned status {}", id, response.status);
            ActionResult::UnknownError
        }
    }

    pub fn access_mode(&self) -> AccessMode {
        self.inner.mode()
    }

    /// Switch modes. Cached blocks and the block list are dropped.
    pub fn set_access_mode(&self, mode: AccessMode) {
        let mut state = self.inner.state();
        state.mode = mode;
        state.clear_blocks();
    }

    /// Drop every cached block, the block list and the negotiation data.
    pub fn invalidate_cache(&self) {
        let mut state = self.inner.state();
        state.clear_blocks();
        state.negotiation = None;
    }

    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        self.blocks()
            .iter()
            .map(|block| TocEntry {
                id: block.block_id(),
                namespace: block.namespace(),
                title: block.title().unwrap_or_default(),
            })
            .collect()
    }

    /// Download the whole memory into a local [`Memory`]. Blocks that cannot
    /// be read are skipped.
    pub fn export_memory(&self) -> Result<Memory> {
        if !self.access_mode().keeps_shadow() {
            return Err(Error::NotAvailableInSingleAccess {
                operation: "export_memory",
            });
        }
        let header = self.header().ok_or(Error::Unavailable { what: "header" })?;
        let blocks = self
            .inner
            .block_ids()?
            .iter()
            .filter_map(|id| degrade("block", self.block(id).to_local_block()))
            .collect();

        let mut memory = Memory::from_document(MemoryDocument {
            header,
            owner: None,
            blocks,
        });
        memory.set_source(Source::Remote(self.rest_url().to_string()));
        Ok(memory)
    }

    /// The exported memory in the binary format.
    pub fn to_binary(&self) -> Result<Bytes> {
        let memory = self.export_memory()?;
        Ok(objmem_binary::encode_memory(&memory.to_document())?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;
    use crate::executor::mock::MockExecutor;
    use crate::types::Method;
    use objmem_model::{Entity, Format, TypedValue};

    const REST: &str = "http://host/rest/M";
    const STORAGE: &str = "http://host/rest/M/st";

    fn negotiation() -> Value {
        json!({
            "VERSION": 1,
            "STORAGE": {
                "LINK": STORAGE,
                "CAPACITY": "1G",
                "FREE_SPACE": "512M",
                "DISTRIBUTED": false,
                "DELETE_DISABLED": false
            }
        })
    }

    fn meta(id: &str) -> Value {
        json!({
            "id": id,
            "namespace": "urn:x",
            "title": {"en": "T"},
            "creator": {"type": "email", "value": "a@b", "date": "2020-01-01T00:00:00+00:00"},
            "format": {"mimeType": "text/plain"}
        })
    }

    fn executor() -> MockExecutor {
        MockExecutor::new()
            .with_json(REST, negotiation())
            .with_json(format!("{}/block_ids", STORAGE), json!({"IDs": ["1", "2"]}))
            .with_json(format!("{}/block/1/meta", STORAGE), meta("1"))
            .with_json(format!("{}/block/2/meta", STORAGE), meta("2"))
            .with_json(format!("{}/block/1/meta/namespace", STORAGE), json!("urn:x"))
            .with_json(
                format!("{}/header", STORAGE),
                json!({"primaryId": {"type": "url", "value": REST}}),
            )
    }

    fn remote(executor: &MockExecutor, mode: AccessMode) -> (RemoteMemory, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = RemoteConfig::default()
            .with_access_mode(mode)
            .with_cache_ttl(Duration::from_secs(20));
        let memory =
            RemoteMemory::with_clock(REST, Arc::new(executor.clone()), config, clock.clone())
                .unwrap();
        (memory, clock)
    }

    fn new_block() -> Block {
        Block::builder("tmp")
            .title("en", "T")
            .creator(Entity::parse("email", "a@b", "2020-01-01T00:00:00+00:00").unwrap())
            .format(Format::new("text/plain"))
            .payload(TypedValue::new("none", "hello"))
            .build()
            .unwrap()
    }

    #[test]
    fn negotiation_is_cached_until_invalidated() {
        let executor = executor();
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);

        assert_eq!(memory.storage_url().as_deref(), Some(STORAGE));
        assert!(memory.negotiation_data().is_some());
        assert_eq!(executor.count(Method::GET, REST), 1);

        executor.clear_recorded();
        memory.storage_url();
        assert!(executor.recorded_requests().is_empty());

        memory.invalidate_cache();
        memory.negotiation_data();
        assert_eq!(executor.count(Method::GET, REST), 1);
    }

    #[test]
    fn block_ids_in_single_access_are_never_cached() {
        let executor = executor();
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);
        let url = format!("{}/block_ids", STORAGE);

        assert_eq!(memory.block_ids(), vec!["1", "2"]);
        memory.block_ids();
        assert_eq!(executor.count(Method::GET, &url), 2);
    }

    #[test]
    fn block_ids_follow_ttl_in_limited_mode() {
        let executor = executor();
        let (memory, clock) = remote(&executor, AccessMode::CompleteDownloadLimitedLifetime);
        let url = format!("{}/block_ids", STORAGE);

        memory.block_ids();
        clock.advance(Duration::from_secs(5));
        memory.block_ids();
        assert_eq!(executor.count(Method::GET, &url), 1);

        clock.advance(Duration::from_secs(30));
        memory.block_ids();
        assert_eq!(executor.count(Method::GET, &url), 2);
    }

    #[test]
    fn limited_lifetime_refetches_after_ttl() {
        let executor = executor();
        let (memory, clock) = remote(&executor, AccessMode::CompleteDownloadLimitedLifetime);
        let block = memory.block("1");
        let url = format!("{}/block/1/meta", STORAGE);

        assert_eq!(block.namespace().as_deref(), Some("urn:x"));
        clock.advance(Duration::from_secs(10));
        assert_eq!(block.title_text("en").as_deref(), Some("T"));
        assert_eq!(executor.count(Method::GET, &url), 1);

        clock.advance(Duration::from_secs(11));
        block.namespace();
        assert_eq!(executor.count(Method::GET, &url), 2);
    }

    #[test]
    fn unlimited_keeps_shadow_until_invalidated() {
        let executor = executor();
        let (memory, clock) = remote(&executor, AccessMode::CompleteDownloadUnlimited);
        let block = memory.block("1");
        let url = format!("{}/block/1/meta", STORAGE);

        block.namespace();
        clock.advance(Duration::from_secs(3600));
        block.format();
        assert_eq!(executor.count(Method::GET, &url), 1);

        memory.invalidate_cache();
        block.namespace();
        assert_eq!(executor.count(Method::GET, &url), 2);
    }

    #[test]
    fn switching_modes_drops_shadows() {
        let executor = executor();
        let (memory, _) = remote(&executor, AccessMode::CompleteDownloadUnlimited);
        let url = format!("{}/block/1/meta", STORAGE);

        memory.block("1").namespace();
        memory.set_access_mode(AccessMode::CompleteDownloadLimitedLifetime);
        assert_eq!(memory.access_mode(), AccessMode::CompleteDownloadLimitedLifetime);
        memory.block("1").namespace();
        assert_eq!(executor.count(Method::GET, &url), 2);
    }

    #[test]
    fn add_block_adopts_server_id() {
        let executor = executor().with_response(
            Method::POST,
            format!("{}/block", STORAGE),
            MockExecutor::text_response(201, "7"),
        );
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);
        let mut block = new_block();

        assert_eq!(memory.add_block(&mut block), ActionResult::Ok);
        assert_eq!(block.id(), "7");

        let posted = executor
            .recorded_requests()
            .into_iter()
            .find(|r| r.method == Method::POST)
            .unwrap();
        let body = posted.body.unwrap();
        assert_eq!(body["title"]["en"], "T");
        assert_eq!(body["payload"]["value"], "hello");
    }

    #[test]
    fn add_block_maps_status_codes() {
        let url = format!("{}/block", STORAGE);
        let executor = executor();
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);

        executor.set_response(Method::POST, &url, MockExecutor::text_response(403, ""));
        assert_eq!(memory.add_block(&mut new_block()), ActionResult::Forbidden);

        executor.set_response(Method::POST, &url, MockExecutor::text_response(500, ""));
        assert_eq!(memory.add_block(&mut new_block()), ActionResult::UnknownError);
    }

    #[test]
    fn transport_failure_degrades() {
        let executor = MockExecutor::new().fail_with("connection refused");
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);

        assert!(memory.negotiation_data().is_none());
        assert!(memory.block_ids().is_empty());
        assert_eq!(memory.add_block(&mut new_block()), ActionResult::UnknownError);
        assert_eq!(memory.remove_block("1"), ActionResult::UnknownError);
    }

    #[test]
    fn remove_block_maps_status_codes() {
        let executor = executor()
            .with_response(
                Method::DELETE,
                format!("{}/block/1", STORAGE),
                MockExecutor::text_response(200, ""),
            )
            .with_response(
                Method::DELETE,
                format!("{}/block/2", STORAGE),
                MockExecutor::text_response(403, ""),
            );
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);

        assert_eq!(memory.remove_block("1"), ActionResult::Ok);
        assert_eq!(memory.remove_block("2"), ActionResult::Forbidden);
        assert_eq!(memory.remove_block("3"), ActionResult::UnknownError);
    }

    #[test]
    fn export_requires_shadow_mode() {
        let executor = executor();
        let (memory, _) = remote(&executor, AccessMode::SingleAccess);
        assert!(matches!(
            memory.export_memory(),
            Err(Error::NotAvailableInSingleAccess { .. })
        ));

        memory.set_access_mode(AccessMode::CompleteDownloadUnlimited);
        let local = memory.export_memory().unwrap();
        assert_eq!(local.block_ids(), vec!["1", "2"]);
        assert_eq!(local.header().primary_id.value, REST);
        assert_eq!(local.source(), &Source::Remote(REST.to_string()));

        let bytes = memory.to_binary().unwrap();
        let decoded = objmem_binary::decode_memory(&bytes).unwrap();
        assert_eq!(decoded.blocks.len(), 2);
    }

    #[test]
    fn table_of_contents_lists_titles() {
        let executor = executor();
        let (memory, _) = remote(&executor, AccessMode::CompleteDownloadUnlimited);

        let toc = memory.table_of_contents();
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].id, "1");
        assert_eq!(toc[1].title.get("en"), Some("T"));
    }

    #[test]
    fn default_headers_are_sent() {
        let executor = executor();
        let config = RemoteConfig::default().with_header("Authorization", "Basic eA==");
        let memory = RemoteMemory::new(REST, Arc::new(executor.clone()), config).unwrap();

        memory.negotiation_data();
        let request = &executor.recorded_requests()[0];
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Basic eA==")
        );
    }

    #[test]
    fn rejects_unusable_urls() {
        let executor: Arc<dyn HttpExecutor> = Arc::new(MockExecutor::new());
        assert!(RemoteMemory::new("not a url", executor.clone(), RemoteConfig::default()).is_err());
        assert!(RemoteMemory::new("mailto:a@b", executor, RemoteConfig::default()).is_err());
    }
}
