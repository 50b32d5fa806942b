#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reports enemy/player instances sharing live cells.

use std::collections::{BTreeMap, BTreeSet};

use life_defence_core::{CellCoord, CollisionPair, Command, InstanceId, InstanceView, Owner};

/// Collision detection system that queues resolution commands after evolution.
#[derive(Debug, Default)]
pub struct CollisionDetector {
    enemy_cells: BTreeMap<CellCoord, Vec<InstanceId>>,
    pairs: BTreeSet<CollisionPair>,
}

impl CollisionDetector {
    /// Creates a new collision detector with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every enemy/player pair whose cell sets intersect, in ascending order.
    pub fn detect(&mut self, instances: &InstanceView) -> Vec<CollisionPair> {
        self.enemy_cells.clear();
        self.pairs.clear();

        for enemy in instances.owned_by(Owner::Enemy) {
            for cell in &enemy.cells {
                self.enemy_cells.entry(*cell).or_default().push(enemy.id);
            }
        }
        if self.enemy_cells.is_empty() {
            return Vec::new();
        }

        for player in instances.owned_by(Owner::Player) {
            for cell in &player.cells {
                let Some(enemies) = self.enemy_cells.get(cell) else {
                    continue;
                };
                for enemy in enemies {
                    let _ = self.pairs.insert(CollisionPair {
                        enemy: *enemy,
                        player: player.id,
                    });
                }
            }
        }

        self.pairs.iter().copied().collect()
    }

    /// Emits a single `Command::ResolveCollisions` when any pair collides.
    pub fn handle(&mut self, instances: &InstanceView, out: &mut Vec<Command>) {
        let pairs = self.detect(instances);
        if pairs.is_empty() {
            return;
        }
        out.push(Command::ResolveCollisions { pairs });
    }
}
