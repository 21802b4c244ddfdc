// RTS player command core
//
// Turns pointer/key input into a player's selection and into orders that the
// simulation authority validates before they take effect.
//
// - spatial / viewport: rays and screen frames cast into the world
// - selection: selection set, control groups, hover, input mapping
// - orders: what a right-click (or minimap click) means for the selection
// - bridge: client submission, authority validation, confirmations

pub mod bridge;
pub mod constants;
pub mod events;
pub mod math_utils;
pub mod orders;
pub mod plugin;
pub mod selection;
pub mod spatial;
pub mod types;
pub mod viewport;

pub use plugin::{AuthorityPlugin, CommandSet, PlayerSessionPlugin};
pub use selection::{PlayerController, PlayerControls};
pub use types::*;
