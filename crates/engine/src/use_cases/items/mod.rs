//! Item generation use cases.
//!
//! Generates themed item pools through the chat API, validates every item
//! against its rarity, and caches pools by id. Lookups never fail: unknown
//! pools and empty buckets fall back to a hand-authored pool.

mod parser;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use necronomicore_domain::{ItemDefinition, ItemPool, ItemRarity, PoolId, RunConfig};

use crate::infrastructure::api_client::{ApiClient, ChatMessage, ChatOptions};
use crate::infrastructure::ports::RandomPort;
use crate::prompt_templates::item_pool_prompt;

pub use parser::{parse_item_array, validate_and_clamp};

/// Summary of a cached pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetadata {
    pub pool_id: PoolId,
    pub difficulty: i32,
    pub floor: i32,
    pub theme: String,
    pub total_items: usize,
}

pub struct ItemGenerationService {
    client: Weak<ApiClient>,
    random: Arc<dyn RandomPort>,
    options: ChatOptions,
    pools: Arc<DashMap<PoolId, ItemPool>>,
    fallback: ItemPool,
    next_pool: AtomicU64,
}

impl ItemGenerationService {
    pub fn new(
        client: Weak<ApiClient>,
        random: Arc<dyn RandomPort>,
        options: ChatOptions,
    ) -> Self {
        Self {
            client,
            random,
            options,
            pools: Arc::new(DashMap::new()),
            fallback: ItemPool::fallback(),
            next_pool: AtomicU64::new(0),
        }
    }

    pub fn build_prompt(config: &RunConfig) -> String {
        item_pool_prompt(config)
    }

    fn mint_pool_id(&self) -> PoolId {
        PoolId::numbered(self.next_pool.fetch_add(1, Ordering::Relaxed))
    }

    /// Queue a generation request for `config`.
    ///
    /// The pool id is reserved and the request queued before this returns.
    /// The future resolves once the request has been drained and parsed.
    pub fn generate_pool(
        &self,
        config: &RunConfig,
    ) -> impl Future<Output = Result<PoolId, ItemGenerationError>> + Send + 'static {
        let pool_id = self.mint_pool_id();
        let pools = Arc::clone(&self.pools);
        let config = config.clone();
        let pending = self.client.upgrade().map(|client| {
            let messages = [ChatMessage::user(item_pool_prompt(&config))];
            client.chat_completion(&messages, &self.options)
        });

        async move {
            let response = pending.ok_or(ItemGenerationError::ClientUnavailable)?.await;
            if !response.success {
                return Err(ItemGenerationError::Transport(
                    response.error_message().to_string(),
                ));
            }

            let items = parse_item_array(&response.body);
            if items.is_empty() {
                tracing::warn!(pool_id = %pool_id, "Item generation returned no usable items");
                return Err(ItemGenerationError::EmptyPayload);
            }

            let pool = ItemPool::from_items(pool_id.clone(), &config, items);
            tracing::info!(
                pool_id = %pool_id,
                items = pool.total_items(),
                floor = pool.floor,
                "Item pool generated"
            );
            pools.insert(pool_id.clone(), pool);
            Ok(pool_id)
        }
    }

    /// Generate without queuing. Any failure yields the fallback pool id.
    pub async fn generate_pool_immediately(&self, config: &RunConfig) -> PoolId {
        let Some(client) = self.client.upgrade() else {
            tracing::warn!("API client gone; using fallback pool");
            return PoolId::fallback();
        };

        let messages = [ChatMessage::user(item_pool_prompt(config))];
        let response = client
            .chat_completion_immediately(&messages, &self.options)
            .await;
        if !response.success {
            return PoolId::fallback();
        }

        let items = parse_item_array(&response.body);
        if items.is_empty() {
            return PoolId::fallback();
        }

        let pool_id = self.mint_pool_id();
        self.pools
            .insert(pool_id.clone(), ItemPool::from_items(pool_id.clone(), config, items));
        pool_id
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Uniform pick from the pool's `rarity` bucket.
    ///
    /// Unknown pools use the fallback pool. An empty bucket yields the
    /// fallback pool's first common item.
    pub fn get_random_item(&self, pool_id: &PoolId, rarity: ItemRarity) -> ItemDefinition {
        let picked = match self.pools.get(pool_id) {
            Some(pool) => self.pick(pool.bucket(rarity)),
            None => self.pick(self.fallback.bucket(rarity)),
        };
        picked.unwrap_or_else(|| self.fallback_item())
    }

    /// Pick a rarity tier uniformly, then an item from that tier.
    ///
    /// Every tier is equally likely however full it is, so an empty tier
    /// yields the fallback item just as [`Self::get_random_item`] does.
    pub fn get_random_item_any_rarity(&self, pool_id: &PoolId) -> ItemDefinition {
        let tiers = ItemRarity::all();
        let rarity = tiers[self.random.gen_index(tiers.len()).min(tiers.len() - 1)];
        self.get_random_item(pool_id, rarity)
    }

    /// Every item in the pool, bucket by bucket. Unknown ids give the fallback pool's items.
    pub fn all_items(&self, pool_id: &PoolId) -> Vec<ItemDefinition> {
        match self.pools.get(pool_id) {
            Some(pool) => pool.items().cloned().collect(),
            None => self.fallback.items().cloned().collect(),
        }
    }

    pub fn pool(&self, pool_id: &PoolId) -> Option<ItemPool> {
        self.pools.get(pool_id).map(|pool| pool.clone())
    }

    pub fn has_pool(&self, pool_id: &PoolId) -> bool {
        self.pools.contains_key(pool_id)
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn clear_pool(&self, pool_id: &PoolId) -> bool {
        self.pools.remove(pool_id).is_some()
    }

    pub fn clear_all_pools(&self) {
        self.pools.clear();
    }

    pub fn pool_metadata(&self, pool_id: &PoolId) -> Option<PoolMetadata> {
        self.pools.get(pool_id).map(|pool| PoolMetadata {
            pool_id: pool.id.clone(),
            difficulty: pool.difficulty,
            floor: pool.floor,
            theme: pool.theme.clone(),
            total_items: pool.total_items(),
        })
    }

    fn pick(&self, items: &[ItemDefinition]) -> Option<ItemDefinition> {
        if items.is_empty() {
            return None;
        }
        items.get(self.random.gen_index(items.len())).cloned()
    }

    fn fallback_item(&self) -> ItemDefinition {
        self.fallback
            .bucket(ItemRarity::Common)
            .first()
            .cloned()
            .unwrap_or_else(ItemPool::fallback_item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemGenerationError {
    #[error("Item generation request failed: {0}")]
    Transport(String),
    #[error("Item generation returned no usable items")]
    EmptyPayload,
    #[error("API client is no longer available")]
    ClientUnavailable,
}
