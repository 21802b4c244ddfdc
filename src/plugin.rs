// Plugins wiring the selection/command core into a Bevy app
use bevy::prelude::*;

use crate::bridge::authority::{order_authority_system, ownership_transfer_system};
use crate::bridge::client::receive_authority_notices;
use crate::bridge::{OrderAuthority, OrderLink};
use crate::events::*;
use crate::selection::{
    hover_update_system, player_input_system, InputBindings, PlayerInput, PlayerSession,
    PointerState, SelectabilityFilter, SelectionConfig, SelectionState,
};
use crate::types::{GroundPlane, PlayerId};
use crate::viewport::Viewport;

/// Tick phases. Input is applied first, the authority validates what was
/// submitted, then confirmations are fed back.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSet {
    Input,
    Hover,
    Authority,
    Feedback,
}

fn configure_command_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            CommandSet::Input,
            CommandSet::Hover,
            CommandSet::Authority,
            CommandSet::Feedback,
        )
            .chain(),
    );
}

/// Simulation authority: validates and executes order requests
pub struct AuthorityPlugin;

impl Plugin for AuthorityPlugin {
    fn build(&self, app: &mut App) {
        configure_command_sets(app);
        app.init_resource::<OrderAuthority>()
            .add_event::<OrderIssued>()
            .add_event::<TransferOwnership>()
            .add_systems(
                Update,
                (ownership_transfer_system, order_authority_system)
                    .chain()
                    .in_set(CommandSet::Authority),
            );
    }
}

/// One local player's session: input, selection, hover and the order link.
///
/// If an `OrderAuthority` is already present (single-player build) the
/// plugin connects to it; otherwise the host must insert an `OrderLink`
/// for its own transport before the first update.
pub struct PlayerSessionPlugin {
    pub player: PlayerId,
    pub config: SelectionConfig,
    pub bindings: InputBindings,
}

impl PlayerSessionPlugin {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            config: SelectionConfig::default(),
            bindings: InputBindings::default(),
        }
    }

    pub fn with_config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_bindings(mut self, bindings: InputBindings) -> Self {
        self.bindings = bindings;
        self
    }
}

impl Plugin for PlayerSessionPlugin {
    fn build(&self, app: &mut App) {
        configure_command_sets(app);

        let connection = app
            .world_mut()
            .get_resource_mut::<OrderAuthority>()
            .map(|mut authority| authority.connect(self.player));
        match connection {
            Some(connection) => {
                app.insert_resource(OrderLink::new(connection));
            }
            None => warn!(
                "No local order authority; an OrderLink must be provided for {}",
                self.player
            ),
        }

        app.insert_resource(PlayerSession { player: self.player })
            .insert_resource(self.config)
            .insert_resource(self.bindings.clone())
            .init_resource::<SelectionState>()
            .init_resource::<SelectabilityFilter>()
            .init_resource::<PointerState>()
            .init_resource::<Viewport>()
            .init_resource::<GroundPlane>()
            .add_event::<PlayerInput>()
            .add_event::<SelectionChanged>()
            .add_event::<HoverChanged>()
            .add_event::<MinimapClicked>()
            .add_event::<OrderConfirmed>()
            .add_event::<OwnershipChanged>()
            .add_systems(Update, player_input_system.in_set(CommandSet::Input))
            .add_systems(Update, hover_update_system.in_set(CommandSet::Hover))
            .add_systems(Update, receive_authority_notices.in_set(CommandSet::Feedback));
    }
}
