// Selection input handling systems
//
// The host's input layer delivers discrete `PlayerInput` events; these
// systems map them onto the player controller.
use bevy::prelude::*;
use std::collections::HashSet;

use super::controller::{PlayerController, PlayerControls};
use super::state::DragSelectMode;

/// One discrete input event, tagged with the host's tick counter
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum PlayerInput {
    PointerDown { button: MouseButton, position: Vec2, tick: u64 },
    PointerMoved { position: Vec2, tick: u64 },
    PointerUp { button: MouseButton, position: Vec2, tick: u64 },
    KeyDown { key: KeyCode, tick: u64 },
    KeyUp { key: KeyCode, tick: u64 },
}

impl PlayerInput {
    pub fn tick(&self) -> u64 {
        match *self {
            PlayerInput::PointerDown { tick, .. }
            | PlayerInput::PointerMoved { tick, .. }
            | PlayerInput::PointerUp { tick, .. }
            | PlayerInput::KeyDown { tick, .. }
            | PlayerInput::KeyUp { tick, .. } => tick,
        }
    }
}

/// Which buttons and keys drive which operation
#[derive(Resource, Clone, Debug)]
pub struct InputBindings {
    pub select_button: MouseButton,
    pub order_button: MouseButton,
    pub stop_key: KeyCode,
    pub health_bar_key: KeyCode,
    pub extend_modifiers: Vec<KeyCode>,
    pub save_group_modifiers: Vec<KeyCode>,
    /// Index in this array is the control group slot
    pub group_keys: [KeyCode; 10],
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            select_button: MouseButton::Left,
            order_button: MouseButton::Right,
            stop_key: KeyCode::KeyS,
            health_bar_key: KeyCode::AltLeft,
            extend_modifiers: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
            save_group_modifiers: vec![KeyCode::ControlLeft, KeyCode::ControlRight],
            group_keys: [
                KeyCode::Digit0,
                KeyCode::Digit1,
                KeyCode::Digit2,
                KeyCode::Digit3,
                KeyCode::Digit4,
                KeyCode::Digit5,
                KeyCode::Digit6,
                KeyCode::Digit7,
                KeyCode::Digit8,
                KeyCode::Digit9,
            ],
        }
    }
}

impl InputBindings {
    fn group_index(&self, key: KeyCode) -> Option<usize> {
        self.group_keys.iter().position(|&k| k == key)
    }
}

/// Last known pointer position and held keys
#[derive(Resource, Default, Debug)]
pub struct PointerState {
    pub position: Option<Vec2>,
    held_keys: HashSet<KeyCode>,
    last_tick: u64,
}

impl PointerState {
    pub fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| self.held_keys.contains(key))
    }
}

/// System: Apply input events to the selection state and order link
pub fn player_input_system(
    mut inputs: EventReader<PlayerInput>,
    bindings: Res<InputBindings>,
    mut pointer: ResMut<PointerState>,
    mut controller: PlayerController,
) {
    for input in inputs.read() {
        // Ticks are monotonic; anything older than what we applied is stale
        if input.tick() < pointer.last_tick {
            debug!("Dropping stale input from tick {}", input.tick());
            continue;
        }
        pointer.last_tick = input.tick();

        match *input {
            PlayerInput::PointerDown { button, position, .. } => {
                pointer.position = Some(position);
                if button == bindings.select_button {
                    controller.start_drag(position);
                }
            }
            PlayerInput::PointerMoved { position, .. } => {
                pointer.position = Some(position);
                controller.update_drag(position);
            }
            PlayerInput::PointerUp { button, position, .. } => {
                pointer.position = Some(position);
                if button == bindings.select_button {
                    controller.update_drag(position);
                    if pointer.any_held(&bindings.extend_modifiers) {
                        controller.finish_drag_with(DragSelectMode::Extend);
                    } else {
                        controller.finish_drag();
                    }
                } else if button == bindings.order_button {
                    controller.issue_order_at_screen(position);
                }
            }
            PlayerInput::KeyDown { key, .. } => {
                pointer.held_keys.insert(key);
                if key == bindings.health_bar_key {
                    controller.show_health_bars(true);
                } else if key == bindings.stop_key {
                    controller.issue_stop_order();
                } else if let Some(index) = bindings.group_index(key) {
                    if pointer.any_held(&bindings.save_group_modifiers) {
                        controller.save_control_group(index);
                    } else {
                        controller.load_control_group(index);
                    }
                }
            }
            PlayerInput::KeyUp { key, .. } => {
                pointer.held_keys.remove(&key);
                if key == bindings.health_bar_key {
                    controller.show_health_bars(false);
                }
            }
        }
    }
}

/// System: Re-derive the hovered unit from the current pointer position
pub fn hover_update_system(pointer: Res<PointerState>, mut controller: PlayerController) {
    controller.refresh_hover(pointer.position);
}
