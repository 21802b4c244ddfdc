// Notifications for presentation layers (selection rings, HUD, order feedback)
use bevy::prelude::*;

use crate::types::{Order, OrderKind, PlayerId};

/// Fired once per completed selection operation with the new selection
#[derive(Event, Clone, Debug, PartialEq)]
pub struct SelectionChanged {
    pub selection: Vec<Entity>,
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct HoverChanged {
    pub hovered: Option<Entity>,
}

/// A world-position order request (minimap click), before any order is inferred
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct MinimapClicked {
    pub position: Vec3,
}

/// Client side: the authority executed an order. The only signal that an
/// order actually took effect; a submission alone proves nothing.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct OrderConfirmed {
    pub unit: Entity,
    pub order: Order,
    pub sequence: u64,
}

impl OrderConfirmed {
    pub fn kind(&self) -> OrderKind {
        self.order.kind()
    }
}

/// Client side: a unit changed hands and this player is the old or new owner
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct OwnershipChanged {
    pub unit: Entity,
    pub owner: Option<PlayerId>,
}

/// Authority side: an order passed validation and was applied
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct OrderIssued {
    pub unit: Entity,
    pub order: Order,
    pub issued_by: PlayerId,
    pub sequence: u64,
}

/// Authority side request to hand a unit to another player (or to nobody)
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct TransferOwnership {
    pub unit: Entity,
    pub new_owner: Option<PlayerId>,
}
