#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reports enemy instances reaching the escape column.

use life_defence_core::{Command, InstanceId, InstanceView, Owner, ESCAPE_COLUMN};

/// Escape detection system that queues resolution commands after collisions.
#[derive(Debug, Default)]
pub struct EscapeDetector {
    scratch: Vec<InstanceId>,
}

impl EscapeDetector {
    /// Creates a new escape detector with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the enemy instances touching the escape column, in ascending order.
    ///
    /// The view must be captured after collision resolution so destroyed
    /// instances are already gone.
    pub fn detect(&mut self, instances: &InstanceView) -> Vec<InstanceId> {
        self.scratch.clear();
        self.scratch.extend(
            instances
                .owned_by(Owner::Enemy)
                .filter(|snapshot| snapshot.touches_column(ESCAPE_COLUMN))
                .map(|snapshot| snapshot.id),
        );
        self.scratch.clone()
    }

    /// Emits a single `Command::ResolveEscapes` when any enemy escaped.
    pub fn handle(&mut self, instances: &InstanceView, out: &mut Vec<Command>) {
        let enemies = self.detect(instances);
        if enemies.is_empty() {
            return;
        }
        out.push(Command::ResolveEscapes { enemies });
    }
}
