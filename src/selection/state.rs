// Selection state and shared types
use bevy::prelude::*;

use super::groups::{ControlGroupIndex, ControlGroups, EmptyGroupSave};

/// Drag gesture state. The selection frame exists only while dragging.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { anchor: Vec2, current: Vec2 },
}

/// How a finished drag combines with the existing selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragSelectMode {
    #[default]
    Replace,
    Extend,
}

/// One player's selection session: current selection, control groups, drag,
/// hover and the health bar hotkey. Never touched by the authority.
#[derive(Resource, Default)]
pub struct SelectionState {
    selected: Vec<Entity>,
    groups: ControlGroups,
    drag: DragState,
    hovered: Option<Entity>,
    health_bars_shown: bool,
}

impl SelectionState {
    // ========================================================================
    // DRAG STATE MACHINE
    // ========================================================================

    /// Idle -> Dragging. Returns false (no-op) if already dragging.
    pub fn start_drag(&mut self, at: Vec2) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.drag = DragState::Dragging { anchor: at, current: at };
        true
    }

    /// Move the free corner of the frame. Ignored while idle.
    pub fn update_drag(&mut self, at: Vec2) -> bool {
        match &mut self.drag {
            DragState::Dragging { current, .. } => {
                *current = at;
                true
            }
            DragState::Idle => false,
        }
    }

    /// Dragging -> Idle, handing back the final frame
    pub fn end_drag(&mut self) -> Option<Rect> {
        let frame = self.selection_frame();
        self.drag = DragState::Idle;
        frame
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Pointer position where the drag currently ends
    pub fn drag_pointer(&self) -> Option<Vec2> {
        match self.drag {
            DragState::Dragging { current, .. } => Some(current),
            DragState::Idle => None,
        }
    }

    pub fn selection_frame(&self) -> Option<Rect> {
        match self.drag {
            DragState::Dragging { anchor, current } => Some(Rect::from_corners(anchor, current)),
            DragState::Idle => None,
        }
    }

    // ========================================================================
    // SELECTION SET
    // ========================================================================

    /// Current members, as stored. Call `prune` first to drop stale entries.
    pub fn selected(&self) -> &[Entity] {
        &self.selected
    }

    /// Replace the selection with the units passing `is_selectable`.
    /// Duplicates are collapsed, first occurrence wins.
    pub fn replace<I, F>(&mut self, units: I, is_selectable: F)
    where
        I: IntoIterator<Item = Entity>,
        F: Fn(Entity) -> bool,
    {
        self.selected.clear();
        self.extend(units, is_selectable);
    }

    /// Add the units passing `is_selectable` that are not selected yet
    pub fn extend<I, F>(&mut self, units: I, is_selectable: F)
    where
        I: IntoIterator<Item = Entity>,
        F: Fn(Entity) -> bool,
    {
        for unit in units {
            if !self.selected.contains(&unit) && is_selectable(unit) {
                self.selected.push(unit);
            }
        }
    }

    /// Drop members that no longer pass `is_selectable`. Returns how many went.
    pub fn prune<F>(&mut self, is_selectable: F) -> usize
    where
        F: Fn(Entity) -> bool,
    {
        let before = self.selected.len();
        self.selected.retain(|&unit| is_selectable(unit));
        before - self.selected.len()
    }

    // ========================================================================
    // CONTROL GROUPS
    // ========================================================================

    pub fn save_group(&mut self, index: ControlGroupIndex, policy: EmptyGroupSave) -> bool {
        self.groups.save(index, &self.selected, policy)
    }

    /// Replace the selection with the re-validated snapshot of a slot
    pub fn load_group<F>(&mut self, index: ControlGroupIndex, is_selectable: F)
    where
        F: Fn(Entity) -> bool,
    {
        let snapshot = self.groups.take_valid(index, &is_selectable);
        self.replace(snapshot, is_selectable);
    }

    pub fn groups(&self) -> &ControlGroups {
        &self.groups
    }

    // ========================================================================
    // HOVER & OVERLAYS
    // ========================================================================

    /// Returns true if the hovered entity changed
    pub fn set_hover(&mut self, hovered: Option<Entity>) -> bool {
        if self.hovered == hovered {
            return false;
        }
        self.hovered = hovered;
        true
    }

    pub fn hovered(&self) -> Option<Entity> {
        self.hovered
    }

    pub fn set_health_bars_shown(&mut self, shown: bool) {
        self.health_bars_shown = shown;
    }

    pub fn health_bars_shown(&self) -> bool {
        self.health_bars_shown
    }
}
