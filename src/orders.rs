// Order resolver - turns a pointer target plus the current selection into intents
//
// One default rule: an attackable hostile under the pointer beats the ground
// point behind it. Nothing else is disambiguated.
use bevy::prelude::*;

use crate::selection::filter::SelectabilityFilter;
use crate::spatial::{HitTarget, SpatialHit};
use crate::types::{Controllable, Order, OrderIntent, PlayerId, UnitCapabilities};

/// Resolve the most reasonable order for the hits under the pointer.
/// `lookup` returns the replicated state of an entity, None if it is gone.
pub fn resolve_order<F>(
    hits: &[SpatialHit],
    selection: &[Entity],
    player: PlayerId,
    filter: &SelectabilityFilter,
    lookup: F,
) -> Vec<OrderIntent>
where
    F: Fn(Entity) -> Option<Controllable>,
{
    let attack_target = hits.iter().find_map(|hit| match hit.target {
        HitTarget::Entity(entity) if filter.is_attack_target(lookup(entity).as_ref(), player) => Some(entity),
        _ => None,
    });
    if let Some(target) = attack_target {
        return attack_intents(selection, target, &lookup);
    }

    match hits.iter().find(|hit| hit.is_ground()) {
        Some(ground) => move_intents(selection, ground.point, &lookup),
        None => Vec::new(),
    }
}

/// Attack intents for every selected unit able to attack (never itself)
pub fn attack_intents<F>(selection: &[Entity], target: Entity, lookup: F) -> Vec<OrderIntent>
where
    F: Fn(Entity) -> Option<Controllable>,
{
    selection
        .iter()
        .copied()
        .filter(|&unit| unit != target)
        .filter(|&unit| lookup(unit).is_some_and(|u| u.can(UnitCapabilities::CAN_ATTACK)))
        .map(|unit| OrderIntent::new(unit, Order::Attack { target }))
        .collect()
}

/// Move intents for every selected unit able to move
pub fn move_intents<F>(selection: &[Entity], destination: Vec3, lookup: F) -> Vec<OrderIntent>
where
    F: Fn(Entity) -> Option<Controllable>,
{
    selection
        .iter()
        .copied()
        .filter(|&unit| lookup(unit).is_some_and(|u| u.can(UnitCapabilities::CAN_MOVE)))
        .map(|unit| OrderIntent::new(unit, Order::Move { destination }))
        .collect()
}

/// Stop for every selected unit, no questions asked
pub fn stop_intents(selection: &[Entity]) -> Vec<OrderIntent> {
    selection
        .iter()
        .map(|&unit| OrderIntent::new(unit, Order::Stop))
        .collect()
}
