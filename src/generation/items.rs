//! # Loot Tables
//!
//! Weighted reward collections attached to treasure and boss rooms, plus the
//! shop stock roll. The generator treats tables as opaque: it only decides
//! which tier a room gets and passes it through.

use crate::{GenerationConfig, Generator, UndercroftError, UndercroftResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One weighted entry of a loot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootEntry {
    pub item: &'static str,
    pub weight: u32,
}

const fn entry(item: &'static str, weight: u32) -> LootEntry {
    LootEntry { item, weight }
}

const TREASURE_ENTRIES: &[LootEntry] = &[
    entry("Silver Locket", 30),
    entry("Bundle of Keys", 25),
    entry("Blessed Candle", 20),
    entry("Whetstone Charm", 15),
    entry("Cracked Reliquary", 8),
    entry("Saint's Finger", 2),
];

const BOSS_ENTRIES: &[LootEntry] = &[
    entry("Heart Vessel", 35),
    entry("Gilded Chalice", 25),
    entry("Bone Crown", 20),
    entry("Warden's Lantern", 15),
    entry("Abyssal Eye", 5),
];

const SHOP_ENTRIES: &[LootEntry] = &[
    entry("Healing Draught", 40),
    entry("Bomb", 30),
    entry("Key", 25),
    entry("Map Fragment", 15),
    entry("Lucky Coin", 10),
    entry("Spare Heart", 5),
];

/// Reward tier of a loot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootTier {
    Treasure,
    Boss,
    Shop,
}

impl LootTier {
    /// The table backing this tier.
    pub fn table(self) -> LootTable {
        let entries = match self {
            LootTier::Treasure => TREASURE_ENTRIES,
            LootTier::Boss => BOSS_ENTRIES,
            LootTier::Shop => SHOP_ENTRIES,
        };
        LootTable { tier: self, entries }
    }
}

/// A weighted reward collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootTable {
    pub tier: LootTier,
    pub entries: &'static [LootEntry],
}

impl LootTable {
    /// Draws one item by weight. `None` only for an empty or zero-weight table.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use undercroft::LootTier;
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let table = LootTier::Boss.table();
    /// let item = table.roll(&mut rng).unwrap();
    /// assert!(table.contains(item));
    /// ```
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        let weights = WeightedIndex::new(self.entries.iter().map(|e| e.weight)).ok()?;
        Some(self.entries[weights.sample(rng)].item)
    }

    /// Whether the table can produce `item`.
    pub fn contains(&self, item: &str) -> bool {
        self.entries.iter().any(|e| e.item == item)
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|e| e.weight).sum()
    }
}

/// Rolls the stock a shop offers on first entry.
///
/// Items are distinct; a shop never lists the same item twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopStockGenerator {
    pub stock_size: usize,
}

impl ShopStockGenerator {
    /// Number of attempts per requested item before giving up on distinctness.
    const ATTEMPTS_PER_SLOT: usize = 4;

    pub fn new(stock_size: usize) -> Self {
        Self { stock_size }
    }
}

impl Default for ShopStockGenerator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Generator<Vec<String>> for ShopStockGenerator {
    fn generate(&self, _config: &GenerationConfig, rng: &mut StdRng) -> UndercroftResult<Vec<String>> {
        let table = LootTier::Shop.table();
        let mut stock: Vec<String> = Vec::with_capacity(self.stock_size);

        for _ in 0..self.stock_size * Self::ATTEMPTS_PER_SLOT {
            if stock.len() >= self.stock_size {
                break;
            }
            if let Some(item) = table.roll(rng) {
                if !stock.iter().any(|existing| existing == item) {
                    stock.push(item.to_string());
                }
            }
        }

        Ok(stock)
    }

    fn validate(&self, content: &Vec<String>, _config: &GenerationConfig) -> UndercroftResult<()> {
        let table = LootTier::Shop.table();
        if content.len() > self.stock_size {
            return Err(UndercroftError::GenerationFailed(format!(
                "shop stock has {} items, limit is {}",
                content.len(),
                self.stock_size
            )));
        }
        if let Some(stranger) = content.iter().find(|item| !table.contains(item)) {
            return Err(UndercroftError::GenerationFailed(format!(
                "shop stock lists unknown item {stranger}"
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ShopStockGenerator"
    }
}
