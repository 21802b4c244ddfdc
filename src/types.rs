use bevy::prelude::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_UNIT_RADIUS, GROUND_HEIGHT};

/// Identity of a player session. Connections are stamped with one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

bitflags! {
    /// What a controllable entity can do or have done to it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UnitCapabilities: u8 {
        const SELECTABLE = 1 << 0;
        /// Selectable by players other than the owner (neutral buildings, critters)
        const NEUTRAL = 1 << 1;
        const ATTACKABLE = 1 << 2;
        const CAN_MOVE = 1 << 3;
        const CAN_ATTACK = 1 << 4;

        const UNIT = Self::SELECTABLE.bits()
            | Self::ATTACKABLE.bits()
            | Self::CAN_MOVE.bits()
            | Self::CAN_ATTACK.bits();
    }
}

/// Any world object that can be owned, selected or ordered.
/// The owner is authoritative state; clients only see a replicated copy.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
#[require(ActiveOrder)]
pub struct Controllable {
    pub owner: Option<PlayerId>,
    pub capabilities: UnitCapabilities,
}

impl Controllable {
    pub fn unit(owner: PlayerId) -> Self {
        Self {
            owner: Some(owner),
            capabilities: UnitCapabilities::UNIT,
        }
    }

    pub fn neutral(capabilities: UnitCapabilities) -> Self {
        Self {
            owner: None,
            capabilities: capabilities | UnitCapabilities::NEUTRAL,
        }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn can(&self, capability: UnitCapabilities) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Collision layers. Cosmetic geometry never shows up in spatial queries.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CollisionLayer {
    #[default]
    Gameplay,
    Cosmetic,
}

/// Bounding sphere used for ray and frame queries (centred on the Transform)
#[derive(Component, Clone, Copy, Debug)]
pub struct Collider {
    pub radius: f32,
    pub layer: CollisionLayer,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            radius: DEFAULT_UNIT_RADIUS,
            layer: CollisionLayer::Gameplay,
        }
    }
}

impl Collider {
    pub fn gameplay(radius: f32) -> Self {
        Self { radius, layer: CollisionLayer::Gameplay }
    }

    pub fn cosmetic(radius: f32) -> Self {
        Self { radius, layer: CollisionLayer::Cosmetic }
    }
}

/// Walkable ground plane (horizontal, at `height` on the Y axis)
#[derive(Resource, Clone, Copy, Debug)]
pub struct GroundPlane {
    pub height: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { height: GROUND_HEIGHT }
    }
}

// ============================================================================
// ORDERS
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Move,
    Attack,
    Stop,
}

/// An order and its target
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum Order {
    Move { destination: Vec3 },
    Attack { target: Entity },
    Stop,
}

impl Order {
    pub fn kind(&self) -> OrderKind {
        match self {
            Order::Move { .. } => OrderKind::Move,
            Order::Attack { .. } => OrderKind::Attack,
            Order::Stop => OrderKind::Stop,
        }
    }

    pub fn target_entity(&self) -> Option<Entity> {
        match self {
            Order::Attack { target } => Some(*target),
            _ => None,
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        match self {
            Order::Move { destination } => Some(*destination),
            _ => None,
        }
    }
}

/// Unconfirmed request for one unit. Built per selected unit at issue time
/// and handed straight to the order link.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct OrderIntent {
    pub unit: Entity,
    pub order: Order,
}

impl OrderIntent {
    pub fn new(unit: Entity, order: Order) -> Self {
        Self { unit, order }
    }
}

/// Authority-side behaviour state: the order the unit is currently executing.
/// Only the authority writes this.
#[derive(Component, Clone, Copy, PartialEq, Debug, Default)]
pub struct ActiveOrder {
    pub order: Option<Order>,
    pub sequence: u64,
    pub issued_by: Option<PlayerId>,
}
