use moka::future::Cache;

use crate::protocol::{Model, TransformationRequest};

/// Cache key: structural identity of the full request. Temperature enters via
/// its bit pattern so the key can derive `Hash`/`Eq`.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct RequestKey {
    instruction: String,
    source_text: String,
    model: Model,
    variant_count: usize,
    temperature_bits: u32,
}

impl RequestKey {
    fn from_request(request: &TransformationRequest) -> Self {
        Self {
            instruction: request.instruction().to_string(),
            source_text: request.source_text().to_string(),
            model: request.model(),
            variant_count: request.variant_count(),
            temperature_bits: request.temperature().to_bits(),
        }
    }
}

/// Memoizes successful completion outcomes for the life of the process.
///
/// No TTL and no capacity bound: entries are never evicted, so an identical
/// request at temperature > 0 can replay a sample from an earlier moment
/// instead of a fresh one. Failures are never stored.
#[derive(Clone)]
pub struct CompletionCache {
    cache: Cache<RequestKey, Vec<String>>,
}

impl Default for CompletionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    pub async fn get(&self, request: &TransformationRequest) -> Option<Vec<String>> {
        self.cache.get(&RequestKey::from_request(request)).await
    }

    pub async fn insert(&self, request: &TransformationRequest, choices: Vec<String>) {
        self.cache
            .insert(RequestKey::from_request(request), choices)
            .await;
    }
}
