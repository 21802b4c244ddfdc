// Player controller - the public command surface of one player's session
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::filter::SelectabilityFilter;
use super::groups::{ControlGroupIndex, EmptyGroupSave};
use super::state::{DragSelectMode, SelectionState};
use crate::bridge::OrderLink;
use crate::constants::BOX_SELECT_DRAG_THRESHOLD;
use crate::events::{HoverChanged, MinimapClicked, SelectionChanged};
use crate::orders::{attack_intents, move_intents, resolve_order, stop_intents};
use crate::spatial::{SpatialHit, SpatialQuery};
use crate::types::{Controllable, OrderIntent, PlayerId};

/// The local player this session belongs to
#[derive(Resource, Clone, Copy, Debug)]
pub struct PlayerSession {
    pub player: PlayerId,
}

/// Selection policies that are game design choices rather than invariants
#[derive(Resource, Clone, Copy, Debug)]
pub struct SelectionConfig {
    pub drag_mode: DragSelectMode,
    pub empty_group_save: EmptyGroupSave,
    /// Frames whose longest side is shorter than this (pixels) select by ray instead
    pub drag_threshold: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            drag_mode: DragSelectMode::Replace,
            empty_group_save: EmptyGroupSave::Overwrite,
            drag_threshold: BOX_SELECT_DRAG_THRESHOLD,
        }
    }
}

/// Operations a host (UI, scripting, input bindings) may call on a player
pub trait PlayerControls {
    fn issue_attack_order(&mut self, target: Entity);
    fn issue_move_order(&mut self, destination: Vec3);
    fn issue_stop_order(&mut self);
    /// Infer the most reasonable order for whatever is under a screen position
    fn issue_order_at_screen(&mut self, screen_pos: Vec2);
    /// Same, for a world position (minimap clicks)
    fn issue_order_at_world(&mut self, world_pos: Vec3);

    fn select_units(&mut self, units: &[Entity]);
    fn save_control_group(&mut self, index: usize);
    fn load_control_group(&mut self, index: usize);

    fn hovered_unit(&self) -> Option<Entity>;
    fn selected_units(&mut self) -> Vec<Entity>;
    fn selection_frame(&self) -> Option<Rect>;
    fn health_bars_shown(&self) -> bool;
}

#[derive(SystemParam)]
pub struct PlayerController<'w, 's> {
    session: Res<'w, PlayerSession>,
    config: Res<'w, SelectionConfig>,
    filter: Res<'w, SelectabilityFilter>,
    state: ResMut<'w, SelectionState>,
    link: ResMut<'w, OrderLink>,
    spatial: SpatialQuery<'w, 's>,
    units: Query<'w, 's, &'static Controllable>,
    selection_changed: EventWriter<'w, SelectionChanged>,
    hover_changed: EventWriter<'w, HoverChanged>,
    minimap_clicked: EventWriter<'w, MinimapClicked>,
}

impl PlayerController<'_, '_> {
    pub fn player(&self) -> PlayerId {
        self.session.player
    }

    fn lookup(&self, entity: Entity) -> Option<Controllable> {
        self.units.get(entity).ok().copied()
    }

    pub fn is_selectable(&self, entity: Entity) -> bool {
        self.filter.is_selectable(self.units.get(entity).ok(), self.session.player)
    }

    /// Drop stale members before anything reads the selection
    fn prune_selection(&mut self) -> Vec<Entity> {
        let Self { state, filter, units, session, .. } = self;
        let removed = state.prune(|unit| filter.is_selectable(units.get(unit).ok(), session.player));
        if removed > 0 {
            debug!("Pruned {} stale units from selection", removed);
        }
        state.selected().to_vec()
    }

    fn replace_selection(&mut self, candidates: Vec<Entity>, mode: DragSelectMode) {
        let Self { state, filter, units, session, .. } = self;
        let is_selectable = |unit: Entity| filter.is_selectable(units.get(unit).ok(), session.player);
        match mode {
            DragSelectMode::Replace => state.replace(candidates, is_selectable),
            DragSelectMode::Extend => {
                state.prune(is_selectable);
                state.extend(candidates, is_selectable);
            }
        }
        self.notify_selection();
    }

    fn notify_selection(&mut self) {
        let selection = self.state.selected().to_vec();
        self.selection_changed.write(SelectionChanged { selection });
    }

    fn submit_all(&mut self, intents: Vec<OrderIntent>) -> usize {
        let count = intents.len();
        for intent in intents {
            self.link.submit(intent);
        }
        count
    }

    // ========================================================================
    // DRAG SELECTION
    // ========================================================================

    pub fn start_drag(&mut self, screen_pos: Vec2) {
        self.state.start_drag(screen_pos);
    }

    pub fn update_drag(&mut self, screen_pos: Vec2) {
        self.state.update_drag(screen_pos);
    }

    /// Finish with the configured drag mode
    pub fn finish_drag(&mut self) {
        let mode = self.config.drag_mode;
        self.finish_drag_with(mode);
    }

    /// Dragging -> Idle: select what the frame covers. Tiny frames count as a
    /// click and take the closest selectable object under the pointer.
    pub fn finish_drag_with(&mut self, mode: DragSelectMode) {
        let pointer = self.state.drag_pointer();
        let Some(frame) = self.state.end_drag() else { return };

        let candidates: Vec<Entity> = if frame.width().max(frame.height()) < self.config.drag_threshold {
            let hits = pointer
                .map(|pos| self.spatial.at_screen_position(pos))
                .unwrap_or_default();
            hits.iter()
                .filter_map(SpatialHit::entity)
                .find(|&entity| self.is_selectable(entity))
                .into_iter()
                .collect()
        } else {
            self.spatial.in_frame(frame).iter().filter_map(SpatialHit::entity).collect()
        };

        self.replace_selection(candidates, mode);
        info!("Selected {} units", self.state.selected().len());
    }

    pub fn cancel_drag(&mut self) {
        self.state.end_drag();
    }

    // ========================================================================
    // HOVER
    // ========================================================================

    pub fn set_hover(&mut self, hovered: Option<Entity>) {
        if self.state.set_hover(hovered) {
            self.hover_changed.write(HoverChanged { hovered });
        }
    }

    /// Recompute the hover from a fresh ray at the pointer
    pub fn refresh_hover(&mut self, pointer: Option<Vec2>) {
        let hovered = pointer.and_then(|pos| {
            self.spatial
                .at_screen_position(pos)
                .iter()
                .filter_map(SpatialHit::entity)
                .find(|&entity| self.units.contains(entity))
        });
        self.set_hover(hovered);
    }

    pub fn show_health_bars(&mut self, shown: bool) {
        self.state.set_health_bars_shown(shown);
    }
}

impl PlayerControls for PlayerController<'_, '_> {
    fn issue_attack_order(&mut self, target: Entity) {
        let player = self.player();
        if !self.filter.is_attack_target(self.units.get(target).ok(), player) {
            debug!("Ignoring attack order on {:?}: not a valid target for {}", target, player);
            return;
        }
        let selection = self.prune_selection();
        let intents = attack_intents(&selection, target, |e| self.lookup(e));
        let count = self.submit_all(intents);
        info!("Attack command on {:?} for {} units", target, count);
    }

    fn issue_move_order(&mut self, destination: Vec3) {
        let selection = self.prune_selection();
        let intents = move_intents(&selection, destination, |e| self.lookup(e));
        let count = self.submit_all(intents);
        info!(
            "Move command to ({:.1}, {:.1}) for {} units",
            destination.x, destination.z, count
        );
    }

    fn issue_stop_order(&mut self) {
        let selection = self.prune_selection();
        let count = self.submit_all(stop_intents(&selection));
        info!("Stop command for {} units", count);
    }

    fn issue_order_at_screen(&mut self, screen_pos: Vec2) {
        let hits = self.spatial.at_screen_position(screen_pos);
        self.issue_order_for_hits(&hits);
    }

    fn issue_order_at_world(&mut self, world_pos: Vec3) {
        self.minimap_clicked.write(MinimapClicked { position: world_pos });
        let hits = self.spatial.at_world_position(world_pos);
        self.issue_order_for_hits(&hits);
    }

    fn select_units(&mut self, units: &[Entity]) {
        if self.state.is_dragging() {
            debug!("Ignoring direct selection while a selection frame is open");
            return;
        }
        self.replace_selection(units.to_vec(), DragSelectMode::Replace);
    }

    fn save_control_group(&mut self, index: usize) {
        let index = match ControlGroupIndex::try_from(index) {
            Ok(index) => index,
            Err(err) => {
                warn!("Cannot save control group: {}", err);
                return;
            }
        };
        self.prune_selection();
        let policy = self.config.empty_group_save;
        if self.state.save_group(index, policy) {
            info!("Saved {} units to control group {}", self.state.selected().len(), index.get());
        }
    }

    fn load_control_group(&mut self, index: usize) {
        let index = match ControlGroupIndex::try_from(index) {
            Ok(index) => index,
            Err(err) => {
                warn!("Cannot load control group: {}", err);
                return;
            }
        };
        {
            let Self { state, filter, units, session, .. } = self;
            state.load_group(index, |unit| filter.is_selectable(units.get(unit).ok(), session.player));
        }
        self.notify_selection();
        info!("Loaded control group {} ({} units)", index.get(), self.state.selected().len());
    }

    fn hovered_unit(&self) -> Option<Entity> {
        // Hover is derived every tick, but the entity may have died since
        self.state.hovered().filter(|&entity| self.units.contains(entity))
    }

    fn selected_units(&mut self) -> Vec<Entity> {
        self.prune_selection()
    }

    fn selection_frame(&self) -> Option<Rect> {
        self.state.selection_frame()
    }

    fn health_bars_shown(&self) -> bool {
        self.state.health_bars_shown()
    }
}

impl PlayerController<'_, '_> {
    fn issue_order_for_hits(&mut self, hits: &[SpatialHit]) {
        let selection = self.prune_selection();
        if selection.is_empty() {
            return;
        }
        let intents = resolve_order(hits, &selection, self.player(), &self.filter, |e| self.lookup(e));
        if let Some(first) = intents.first() {
            info!("{:?} command for {} units", first.order.kind(), intents.len());
        }
        self.submit_all(intents);
    }
}
