//! Index of live pattern instances and their explicitly tracked cells.

use std::collections::{BTreeMap, BTreeSet};

use life_defence_core::{CellCoord, InstanceId, InstanceSnapshot, Owner, PatternKind};

use crate::grid::Grid;

/// Placed or spawned occurrence of a pattern.
#[derive(Clone, Debug)]
pub(crate) struct PatternInstance {
    pub(crate) pattern: PatternKind,
    pub(crate) owner: Owner,
    pub(crate) cells: BTreeSet<CellCoord>,
}

/// Deterministically ordered collection of live instances.
#[derive(Clone, Debug, Default)]
pub(crate) struct InstanceIndex {
    instances: BTreeMap<InstanceId, PatternInstance>,
    next_id: u32,
}

impl InstanceIndex {
    pub(crate) fn insert(&mut self, instance: PatternInstance) -> InstanceId {
        let id = InstanceId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.instances.insert(id, instance);
        id
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&PatternInstance> {
        self.instances.get(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.instances.clear();
        self.next_id = 0;
    }

    /// Re-attributes every instance's cells after the grid evolved.
    ///
    /// A live cell of `next` belongs to an instance when its 3×3 neighbourhood
    /// held one of the instance's cells before the step. Cells with parents in
    /// several instances are shared by all of them. Instances left without
    /// cells are removed and returned.
    pub(crate) fn propagate(&mut self, next: &Grid) -> Vec<(InstanceId, Owner)> {
        let mut dissipated = Vec::new();
        for (id, instance) in &mut self.instances {
            let mut cells = BTreeSet::new();
            for cell in &instance.cells {
                for candidate in cell.neighbourhood() {
                    if next.is_alive(candidate) {
                        let _ = cells.insert(candidate);
                    }
                }
            }
            if cells.is_empty() {
                dissipated.push((*id, instance.owner));
            }
            instance.cells = cells;
        }
        for (id, _) in &dissipated {
            let _ = self.instances.remove(id);
        }
        dissipated
    }

    /// Removes the listed instances, returning the union of their cells.
    pub(crate) fn remove_all(&mut self, ids: &BTreeSet<InstanceId>) -> BTreeSet<CellCoord> {
        let mut cleared = BTreeSet::new();
        for id in ids {
            if let Some(instance) = self.instances.remove(id) {
                cleared.extend(instance.cells);
            }
        }
        cleared
    }

    /// Drops the provided cells from every remaining instance.
    ///
    /// Instances that lose all their cells are removed and returned.
    pub(crate) fn forget_cells(
        &mut self,
        cleared: &BTreeSet<CellCoord>,
    ) -> Vec<(InstanceId, Owner)> {
        let mut emptied = Vec::new();
        for (id, instance) in &mut self.instances {
            instance.cells.retain(|cell| !cleared.contains(cell));
            if instance.cells.is_empty() {
                emptied.push((*id, instance.owner));
            }
        }
        for (id, _) in &emptied {
            let _ = self.instances.remove(id);
        }
        emptied
    }

    pub(crate) fn snapshots(&self) -> Vec<InstanceSnapshot> {
        self.instances
            .iter()
            .map(|(id, instance)| InstanceSnapshot {
                id: *id,
                pattern: instance.pattern,
                owner: instance.owner,
                cells: instance.cells.iter().copied().collect(),
            })
            .collect()
    }
}
