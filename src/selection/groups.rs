// Control groups - ten fixed bookmark slots holding selection snapshots
use bevy::prelude::*;
use thiserror::Error;

use crate::constants::CONTROL_GROUP_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("control group index {0} is out of range (0-9)")]
pub struct InvalidGroupIndex(pub usize);

/// Validated slot index (0-9)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlGroupIndex(usize);

impl ControlGroupIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for ControlGroupIndex {
    type Error = InvalidGroupIndex;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index < CONTROL_GROUP_COUNT {
            Ok(Self(index))
        } else {
            Err(InvalidGroupIndex(index))
        }
    }
}

/// What saving an empty selection does to a slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmptyGroupSave {
    /// Saving is an explicit user action, so an empty selection clears the slot
    #[default]
    Overwrite,
    /// Leave the slot as it was
    Keep,
}

/// Saved selections. Each slot is a value copy taken at save time.
#[derive(Clone, Debug, Default)]
pub struct ControlGroups {
    slots: [Option<Vec<Entity>>; CONTROL_GROUP_COUNT],
}

impl ControlGroups {
    /// Store a snapshot. Returns false when the slot was left untouched.
    pub fn save(&mut self, index: ControlGroupIndex, units: &[Entity], policy: EmptyGroupSave) -> bool {
        if units.is_empty() && policy == EmptyGroupSave::Keep {
            return false;
        }
        self.slots[index.get()] = Some(units.to_vec());
        true
    }

    /// Snapshot members that still pass `keep`. Failing members are dropped
    /// from the slot as well. A never-saved slot yields an empty list.
    pub fn take_valid<F>(&mut self, index: ControlGroupIndex, keep: F) -> Vec<Entity>
    where
        F: Fn(Entity) -> bool,
    {
        let Some(slot) = self.slots[index.get()].as_mut() else {
            return Vec::new();
        };
        slot.retain(|&unit| keep(unit));
        slot.clone()
    }

    pub fn get(&self, index: ControlGroupIndex) -> Option<&[Entity]> {
        self.slots[index.get()].as_deref()
    }

    pub fn is_saved(&self, index: ControlGroupIndex) -> bool {
        self.slots[index.get()].is_some()
    }
}
