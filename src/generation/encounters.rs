//! # Encounter Generation
//!
//! The boss blueprint registry and the enemy rolls a hostile room performs
//! the first time the player walks in.

use crate::{GenerationConfig, Generator, Rect, UndercroftError, UndercroftResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Boss archetypes. [`BossKind::ALL`] is the registry the placer draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    CryptWarden,
    BroodMother,
    HollowKnight,
    CandleWitch,
}

/// Static description of a boss archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossBlueprint {
    pub name: &'static str,
    pub health: u32,
    pub glyph: char,
}

impl BossKind {
    /// Every registered boss, indexable and in a fixed order.
    pub const ALL: [BossKind; 4] = [
        BossKind::CryptWarden,
        BossKind::BroodMother,
        BossKind::HollowKnight,
        BossKind::CandleWitch,
    ];

    /// Looks a boss up by registry index.
    pub fn from_index(index: usize) -> Option<BossKind> {
        Self::ALL.get(index).copied()
    }

    /// Picks a boss uniformly from the registry.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> BossKind {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn blueprint(self) -> BossBlueprint {
        match self {
            BossKind::CryptWarden => BossBlueprint {
                name: "The Crypt Warden",
                health: 220,
                glyph: 'W',
            },
            BossKind::BroodMother => BossBlueprint {
                name: "The Brood Mother",
                health: 180,
                glyph: 'M',
            },
            BossKind::HollowKnight => BossBlueprint {
                name: "The Hollow Knight",
                health: 260,
                glyph: 'K',
            },
            BossKind::CandleWitch => BossBlueprint {
                name: "The Candle Witch",
                health: 160,
                glyph: 'C',
            },
        }
    }
}

/// Regular enemies that populate hostile rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Bat,
    Slime,
    Skeleton,
    Cultist,
}

impl EnemyKind {
    /// Ordered from weakest to strongest; deeper rooms unlock more of the list.
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Bat,
        EnemyKind::Slime,
        EnemyKind::Skeleton,
        EnemyKind::Cultist,
    ];

    pub fn glyph(self) -> char {
        match self {
            EnemyKind::Bat => 'b',
            EnemyKind::Slime => 's',
            EnemyKind::Skeleton => 'k',
            EnemyKind::Cultist => 'c',
        }
    }
}

/// An enemy placed on a room tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub x: i32,
    pub y: i32,
}

/// Rolls the enemies of one hostile room.
///
/// The roll only depends on the depth, the room footprint and the random
/// stream it is given, so rooms roll the same encounter from the same seed.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    /// BFS depth of the room; deeper rooms get more and tougher enemies
    pub depth: u32,
    /// Floor rectangle enemies may stand on
    pub floor: Rect,
    /// Tiles enemies must not occupy (obstacles)
    pub blocked: Vec<(i32, i32)>,
}

impl EncounterGenerator {
    const MAX_ATTEMPTS_PER_ENEMY: usize = 16;

    pub fn new(depth: u32, floor: Rect, blocked: Vec<(i32, i32)>) -> Self {
        Self {
            depth,
            floor,
            blocked,
        }
    }

    fn enemy_count(&self, rng: &mut StdRng) -> usize {
        1 + (self.depth.min(4) / 2) as usize + rng.gen_range(0..=1)
    }

    fn kind_pool(&self) -> &'static [EnemyKind] {
        let unlocked = (2 + self.depth as usize / 2).min(EnemyKind::ALL.len());
        &EnemyKind::ALL[..unlocked]
    }
}

impl Generator<Vec<EnemySpawn>> for EncounterGenerator {
    fn generate(
        &self,
        _config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> UndercroftResult<Vec<EnemySpawn>> {
        let mut spawns: Vec<EnemySpawn> = Vec::new();
        if self.floor.is_empty() {
            return Ok(spawns);
        }

        let count = self.enemy_count(rng);
        let pool = self.kind_pool();

        for _ in 0..count {
            let kind = pool[rng.gen_range(0..pool.len())];
            for _ in 0..Self::MAX_ATTEMPTS_PER_ENEMY {
                let x = rng.gen_range(self.floor.x..self.floor.right());
                let y = rng.gen_range(self.floor.y..self.floor.bottom());
                let taken = self.blocked.contains(&(x, y))
                    || spawns.iter().any(|spawn| spawn.x == x && spawn.y == y);
                if !taken {
                    spawns.push(EnemySpawn { kind, x, y });
                    break;
                }
            }
        }

        Ok(spawns)
    }

    fn validate(&self, content: &Vec<EnemySpawn>, _config: &GenerationConfig) -> UndercroftResult<()> {
        for spawn in content {
            if !self.floor.contains(spawn.x, spawn.y) || self.blocked.contains(&(spawn.x, spawn.y)) {
                return Err(UndercroftError::GenerationFailed(format!(
                    "{:?} spawned on unusable tile ({}, {})",
                    spawn.kind, spawn.x, spawn.y
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_boss_registry_is_indexable() {
        for (index, kind) in BossKind::ALL.iter().enumerate() {
            assert_eq!(BossKind::from_index(index), Some(*kind));
            assert!(kind.blueprint().health > 0);
        }
        assert_eq!(BossKind::from_index(BossKind::ALL.len()), None);
    }

    #[test]
    fn test_boss_pick_covers_registry() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(BossKind::pick(&mut rng));
        }
        assert_eq!(seen.len(), BossKind::ALL.len());
    }

    #[test]
    fn test_encounter_respects_floor_and_obstacles() {
        let floor = Rect::new(3, 2, 12, 8);
        let blocked = vec![(5, 5), (6, 6), (7, 7)];
        let generator = EncounterGenerator::new(3, floor, blocked);
        let config = GenerationConfig::for_testing(1);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let spawns = generator.generate(&config, &mut rng).unwrap();
            assert!(!spawns.is_empty());
            assert!(generator.validate(&spawns, &config).is_ok());
        }
    }

    #[test]
    fn test_encounter_grows_with_depth() {
        let floor = Rect::new(0, 0, 10, 10);
        let shallow = EncounterGenerator::new(0, floor, Vec::new());
        let deep = EncounterGenerator::new(8, floor, Vec::new());
        assert_eq!(shallow.kind_pool().len(), 2);
        assert_eq!(deep.kind_pool().len(), EnemyKind::ALL.len());
    }

    #[test]
    fn test_empty_floor_spawns_nothing() {
        let generator = EncounterGenerator::new(2, Rect::new(0, 0, 0, 0), Vec::new());
        let config = GenerationConfig::for_testing(1);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generator.generate(&config, &mut rng).unwrap().is_empty());
    }
}
