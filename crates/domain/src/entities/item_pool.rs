//! Item pool - Rarity-bucketed items generated for one run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ItemDefinition, ItemRarity, ItemType, PoolId, RunConfig};

/// Theme recorded on the hand-authored fallback pool.
pub const FALLBACK_POOL_THEME: &str = "emergency_pool";

/// A cached collection of generated items for one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPool {
    pub id: PoolId,
    pub difficulty: i32,
    pub floor: i32,
    pub theme: String,
    /// Run parameters that were not interpreted by the generator.
    pub params: BTreeMap<String, String>,
    buckets: [Vec<ItemDefinition>; ItemRarity::COUNT],
}

impl ItemPool {
    pub fn new(id: PoolId) -> Self {
        Self {
            id,
            difficulty: 0,
            floor: 0,
            theme: String::new(),
            params: BTreeMap::new(),
            buckets: Default::default(),
        }
    }

    /// Build a pool for a run, bucketing items by rarity in arrival order.
    pub fn from_items(
        id: PoolId,
        config: &RunConfig,
        items: impl IntoIterator<Item = ItemDefinition>,
    ) -> Self {
        let mut pool = Self::new(id);
        pool.difficulty = config.difficulty;
        pool.floor = config.floor;
        pool.theme = config.theme.clone();
        pool.params = config.params.clone();
        for item in items {
            pool.push(item);
        }
        pool
    }

    /// The pool used whenever generation fails or a pool id is unknown.
    ///
    /// Always holds at least one common item.
    pub fn fallback() -> Self {
        let mut pool = Self::new(PoolId::fallback());
        pool.theme = FALLBACK_POOL_THEME.to_string();
        pool.push(Self::fallback_item());
        pool
    }

    /// The common item every lookup can fall back to.
    pub fn fallback_item() -> ItemDefinition {
        ItemDefinition::new("Rusty Blade", ItemType::Weapon, ItemRarity::Common)
            .with_description("A worn weapon covered in fungal growth")
            .with_damage(10)
            .with_flavor_text("Even decay has its uses.")
    }

    pub fn push(&mut self, item: ItemDefinition) {
        self.buckets[item.rarity.index()].push(item);
    }

    pub fn bucket(&self, rarity: ItemRarity) -> &[ItemDefinition] {
        &self.buckets[rarity.index()]
    }

    /// All items, common first, in bucket order.
    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.buckets.iter().flatten()
    }

    pub fn total_items(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, rarity: ItemRarity) -> ItemDefinition {
        ItemDefinition::new(name, ItemType::Relic, rarity)
    }

    #[test]
    fn buckets_items_by_rarity_preserving_order() {
        let config = RunConfig::default().with_theme("drowned crypt");
        let pool = ItemPool::from_items(
            PoolId::numbered(0),
            &config,
            vec![
                item("a", ItemRarity::Rare),
                item("b", ItemRarity::Common),
                item("c", ItemRarity::Rare),
                item("d", ItemRarity::Cursed),
            ],
        );

        let rare: Vec<_> = pool.bucket(ItemRarity::Rare).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(rare, ["a", "c"]);
        assert_eq!(pool.bucket(ItemRarity::Epic).len(), 0);
        assert_eq!(pool.total_items(), 4);
        assert_eq!(pool.theme, "drowned crypt");

        let order: Vec<_> = pool.items().map(|i| i.name.as_str()).collect();
        assert_eq!(order, ["b", "a", "c", "d"]);
    }

    #[test]
    fn fallback_pool_has_a_common_item() {
        let pool = ItemPool::fallback();
        assert!(pool.id.is_fallback());
        assert_eq!(pool.theme, FALLBACK_POOL_THEME);
        let first = &pool.bucket(ItemRarity::Common)[0];
        assert_eq!(first.name, "Rusty Blade");
        assert_eq!(first.damage, 10);
        assert!(first.is_within_bounds());
    }
}
