// Selectability filter - who may select what, and what counts as an attack target
use bevy::prelude::*;

use crate::types::{Controllable, PlayerId, UnitCapabilities};

/// Ownership rules supplied by the surrounding game. The filter checks the
/// capability flags; the policy only decides the ownership half.
pub trait OwnershipPolicy: Send + Sync + 'static {
    /// May `player` put this entity into their selection?
    fn may_select(&self, unit: &Controllable, player: PlayerId) -> bool;

    /// Is this entity hostile to `player`?
    fn is_hostile(&self, unit: &Controllable, player: PlayerId) -> bool;
}

/// Own units and neutral objects are selectable; anything not owned by the
/// player is hostile.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultOwnershipPolicy;

impl OwnershipPolicy for DefaultOwnershipPolicy {
    fn may_select(&self, unit: &Controllable, player: PlayerId) -> bool {
        unit.is_owned_by(player) || unit.can(UnitCapabilities::NEUTRAL)
    }

    fn is_hostile(&self, unit: &Controllable, player: PlayerId) -> bool {
        !unit.is_owned_by(player)
    }
}

#[derive(Resource)]
pub struct SelectabilityFilter {
    policy: Box<dyn OwnershipPolicy>,
}

impl Default for SelectabilityFilter {
    fn default() -> Self {
        Self::new(DefaultOwnershipPolicy)
    }
}

impl SelectabilityFilter {
    pub fn new(policy: impl OwnershipPolicy) -> Self {
        Self { policy: Box::new(policy) }
    }

    /// `None` means the entity is gone (or never was controllable)
    pub fn is_selectable(&self, unit: Option<&Controllable>, player: PlayerId) -> bool {
        unit.is_some_and(|unit| {
            unit.can(UnitCapabilities::SELECTABLE) && self.policy.may_select(unit, player)
        })
    }

    pub fn is_attack_target(&self, unit: Option<&Controllable>, player: PlayerId) -> bool {
        unit.is_some_and(|unit| {
            unit.can(UnitCapabilities::ATTACKABLE) && self.policy.is_hostile(unit, player)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: PlayerId = PlayerId(1);
    const THEM: PlayerId = PlayerId(2);

    #[test]
    fn test_own_unit_is_selectable() {
        let filter = SelectabilityFilter::default();
        assert!(filter.is_selectable(Some(&Controllable::unit(ME)), ME));
    }

    #[test]
    fn test_enemy_unit_is_not_selectable() {
        let filter = SelectabilityFilter::default();
        assert!(!filter.is_selectable(Some(&Controllable::unit(THEM)), ME));
    }

    #[test]
    fn test_neutral_object_is_selectable_by_anyone() {
        let filter = SelectabilityFilter::default();
        let critter = Controllable::neutral(UnitCapabilities::SELECTABLE);
        assert!(filter.is_selectable(Some(&critter), ME));
        assert!(filter.is_selectable(Some(&critter), THEM));
    }

    #[test]
    fn test_missing_selectable_flag_blocks_selection() {
        let filter = SelectabilityFilter::default();
        let scenery = Controllable {
            owner: Some(ME),
            capabilities: UnitCapabilities::ATTACKABLE,
        };
        assert!(!filter.is_selectable(Some(&scenery), ME));
    }

    #[test]
    fn test_vanished_entity_is_never_selectable_or_targetable() {
        let filter = SelectabilityFilter::default();
        assert!(!filter.is_selectable(None, ME));
        assert!(!filter.is_attack_target(None, ME));
    }

    #[test]
    fn test_attack_target_requires_hostile_and_attackable() {
        let filter = SelectabilityFilter::default();
        assert!(filter.is_attack_target(Some(&Controllable::unit(THEM)), ME));
        assert!(!filter.is_attack_target(Some(&Controllable::unit(ME)), ME));

        let rock = Controllable::neutral(UnitCapabilities::SELECTABLE);
        assert!(!filter.is_attack_target(Some(&rock), ME));
    }

    struct AlliedPolicy;

    impl OwnershipPolicy for AlliedPolicy {
        fn may_select(&self, unit: &Controllable, _player: PlayerId) -> bool {
            unit.owner.is_some()
        }

        fn is_hostile(&self, _unit: &Controllable, _player: PlayerId) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_policy_replaces_ownership_rules() {
        let filter = SelectabilityFilter::new(AlliedPolicy);
        assert!(filter.is_selectable(Some(&Controllable::unit(THEM)), ME));
        assert!(!filter.is_attack_target(Some(&Controllable::unit(THEM)), ME));
    }
}
