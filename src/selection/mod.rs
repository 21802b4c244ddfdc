// Selection module - one player's selection, control groups and command surface
//
// Submodules:
// - state: SelectionState resource (selection set, drag state machine, hover)
// - groups: Control group slots 0-9
// - filter: Selectability filter and pluggable ownership policy
// - controller: PlayerController system param implementing PlayerControls
// - input: Input events and the systems mapping them onto the controller

pub mod controller;
pub mod filter;
pub mod groups;
pub mod input;
pub mod state;

// Re-export main types for external use
pub use controller::{PlayerController, PlayerControls, PlayerSession, SelectionConfig};
pub use filter::{DefaultOwnershipPolicy, OwnershipPolicy, SelectabilityFilter};
pub use groups::{ControlGroupIndex, EmptyGroupSave, InvalidGroupIndex};
pub use input::{hover_update_system, player_input_system, InputBindings, PlayerInput, PointerState};
pub use state::{DragSelectMode, DragState, SelectionState};
