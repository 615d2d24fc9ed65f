use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a remote proxy caches what it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Fetch each field on its own, through a small response cache.
    #[default]
    SingleAccess,
    /// Download whole blocks and refetch them once the TTL has passed.
    CompleteDownloadLimitedLifetime,
    /// Download whole blocks once and keep them until invalidated.
    CompleteDownloadUnlimited,
}

impl AccessMode {
    pub fn keeps_shadow(&self) -> bool {
        !matches!(self, AccessMode::SingleAccess)
    }
}

/// Settings for a [`RemoteMemory`](crate::RemoteMemory).
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub access_mode: AccessMode,
    pub cache_ttl: Duration,
    /// Distinct sub-resources kept per block in single access mode.
    pub cache_capacity: usize,
    pub timeout: Duration,
    /// Sent with every request, e.g. an `Authorization` header.
    pub headers: HashMap<String, String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::default(),
            cache_ttl: Duration::from_secs(20),
            cache_capacity: 8,
            timeout: Duration::from_secs(30),
            headers: HashMap::new(),
        }
    }
}

impl RemoteConfig {
    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub(crate) fn ttl_millis(&self) -> u64 {
        u64::try_from(self.cache_ttl.as_millis()).unwrap_or(u64::MAX)
    }
}
