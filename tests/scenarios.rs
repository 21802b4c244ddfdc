// End-to-end scenarios: input -> selection -> order link -> authority -> feedback
mod common;

use bevy::prelude::*;

use common::{TestWorld, ENEMY, ME};
use rts_command::bridge::{OrderAuthority, OrderLink};
use rts_command::constants::PENDING_ORDER_TIMEOUT_TICKS;
use rts_command::events::{
    HoverChanged, MinimapClicked, OrderConfirmed, OrderIssued, OwnershipChanged, SelectionChanged,
    TransferOwnership,
};
use rts_command::selection::{OwnershipPolicy, PlayerInput, SelectabilityFilter};
use rts_command::{
    ActiveOrder, Controllable, Order, OrderIntent, OrderKind, PlayerControls, PlayerId, UnitCapabilities,
};

/// Everyone is on the same side: nothing is hostile
struct CeasefirePolicy;

impl OwnershipPolicy for CeasefirePolicy {
    fn may_select(&self, unit: &Controllable, player: PlayerId) -> bool {
        unit.is_owned_by(player)
    }

    fn is_hostile(&self, _unit: &Controllable, _player: PlayerId) -> bool {
        false
    }
}

fn two_friendlies(world: &mut TestWorld) -> (Entity, Entity) {
    let a = world.spawn(Controllable::unit(ME), Vec3::new(-10.0, 0.0, 0.0));
    let b = world.spawn(Controllable::unit(ME), Vec3::new(10.0, 0.0, 0.0));
    (a, b)
}

fn select(world: &mut TestWorld, units: &[Entity]) {
    world.with_controller(|c| c.select_units(units));
    world.drain::<SelectionChanged>();
}

fn selected(world: &mut TestWorld) -> Vec<Entity> {
    world.with_controller(|c| c.selected_units())
}

// ============================================================================
// ORDERS
// ============================================================================

#[test]
fn test_right_click_ground_moves_every_selected_unit() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    select(&mut world, &[a, b]);

    let target = Vec3::new(0.0, -1.0, 40.0);
    let screen = world.screen_of(target);
    world.click(MouseButton::Right, screen);
    world.update();

    let issued = world.drain::<OrderIssued>();
    assert_eq!(issued.len(), 2);
    for event in &issued {
        assert_eq!(event.issued_by, ME);
        let destination = event.order.destination().unwrap();
        assert!(destination.distance(target) < 0.1, "got {:?}", destination);
    }

    let confirmed = world.drain::<OrderConfirmed>();
    let mut units: Vec<Entity> = confirmed.iter().map(|c| c.unit).collect();
    units.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(units, expected);
    assert!(confirmed.iter().all(|c| c.kind() == OrderKind::Move));

    // Both confirmations arrived, nothing left in flight
    assert_eq!(world.world().resource::<OrderLink>().pending_count(), 0);
}

#[test]
fn test_right_click_on_enemy_attacks_instead_of_moving() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    let enemy = world.spawn(Controllable::unit(ENEMY), Vec3::new(0.0, 0.0, -20.0));
    select(&mut world, &[a, b]);

    let screen = world.screen_of(Vec3::new(0.0, 0.0, -20.0));
    world.click(MouseButton::Right, screen);
    world.update();

    let issued = world.drain::<OrderIssued>();
    assert_eq!(issued.len(), 2);
    assert!(issued.iter().all(|e| e.order == Order::Attack { target: enemy }));
}

#[test]
fn test_minimap_order_traces_down_onto_ground() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);
    select(&mut world, &[a]);

    world.with_controller(|c| c.issue_order_at_world(Vec3::new(30.0, 0.0, 50.0)));
    world.update();

    assert_eq!(
        world.drain::<MinimapClicked>(),
        vec![MinimapClicked { position: Vec3::new(30.0, 0.0, 50.0) }]
    );

    let issued = world.drain::<OrderIssued>();
    assert_eq!(issued.len(), 1);
    assert_eq!(
        issued[0].order,
        Order::Move { destination: Vec3::new(30.0, -1.0, 50.0) }
    );
}

#[test]
fn test_stop_is_sent_for_every_selected_unit() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    let depot = world.spawn(
        Controllable::neutral(UnitCapabilities::SELECTABLE),
        Vec3::new(0.0, 0.0, 20.0),
    );
    select(&mut world, &[a, b, depot]);
    assert_eq!(selected(&mut world).len(), 3);

    world.press(KeyCode::KeyS);
    world.update();

    // All three were submitted, only the owned two were executed
    let issued = world.drain::<OrderIssued>();
    assert_eq!(issued.len(), 2);
    assert!(issued.iter().all(|e| e.order == Order::Stop));
    assert!(world.world().resource::<OrderLink>().pending(a).is_none());

    // The rejected depot order is never confirmed and eventually expires
    for _ in 0..PENDING_ORDER_TIMEOUT_TICKS {
        world.update();
    }
    assert!(world.world().resource::<OrderLink>().pending(depot).is_none());
    assert_eq!(world.world().resource::<OrderLink>().pending_count(), 0);
}

#[test]
fn test_unconfirmed_orders_do_not_accumulate() {
    let mut world = TestWorld::new();
    let doomed: Vec<Entity> = (0..3)
        .map(|i| world.spawn(Controllable::unit(ME), Vec3::new(i as f32 * 5.0, 0.0, 10.0)))
        .collect();
    let foreign = world.spawn(Controllable::unit(ENEMY), Vec3::new(0.0, 0.0, -10.0));

    {
        let mut link = world.world().resource_mut::<OrderLink>();
        for &unit in doomed.iter().chain([foreign].iter()) {
            link.submit(OrderIntent::new(unit, Order::Stop));
        }
    }
    for &unit in &doomed {
        world.world().despawn(unit);
    }

    world.update();
    assert_eq!(world.world().resource::<OrderLink>().pending_count(), 1);

    for _ in 0..PENDING_ORDER_TIMEOUT_TICKS + 2 {
        world.update();
    }
    assert_eq!(world.world().resource::<OrderLink>().pending_count(), 0);
    assert!(world.drain::<OrderIssued>().is_empty());
}

#[test]
fn test_authority_applies_its_own_hostility_rules() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);
    let ally = world.spawn(Controllable::unit(ENEMY), Vec3::new(0.0, 0.0, -20.0));
    world.world().insert_resource(SelectabilityFilter::new(CeasefirePolicy));
    world.world().resource_mut::<OrderAuthority>().set_policy(CeasefirePolicy);
    select(&mut world, &[a]);

    // The client filter refuses the target
    world.with_controller(|c| c.issue_attack_order(ally));
    world.update();
    assert!(world.drain::<OrderIssued>().is_empty());

    // A request that skips the client filter is refused by the authority too
    world
        .world()
        .resource_mut::<OrderLink>()
        .submit(OrderIntent::new(a, Order::Attack { target: ally }));
    world.update();
    assert!(world.drain::<OrderIssued>().is_empty());
    assert_eq!(world.world().get::<ActiveOrder>(a).unwrap().order, None);
}

#[test]
fn test_latest_order_wins() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);
    select(&mut world, &[a]);

    world.with_controller(|c| {
        c.issue_move_order(Vec3::new(5.0, -1.0, 5.0));
        c.issue_stop_order();
    });
    world.update();

    let active = *world.world().get::<ActiveOrder>(a).unwrap();
    assert_eq!(active.order, Some(Order::Stop));
    assert_eq!(active.issued_by, Some(ME));
    assert_eq!(world.drain::<OrderIssued>().len(), 2);
}

#[test]
fn test_ownership_change_before_validation_rejects_order() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);
    select(&mut world, &[a]);

    world.with_controller(|c| c.issue_move_order(Vec3::new(0.0, -1.0, 30.0)));
    world.send(TransferOwnership { unit: a, new_owner: Some(ENEMY) });
    world.update();

    assert!(world.drain::<OrderIssued>().is_empty());
    assert!(world.drain::<OrderConfirmed>().is_empty());
    assert_eq!(world.world().get::<ActiveOrder>(a).unwrap().order, None);

    let changes = world.drain::<OwnershipChanged>();
    assert_eq!(changes, vec![OwnershipChanged { unit: a, owner: Some(ENEMY) }]);
    assert!(world.world().resource::<OrderLink>().pending(a).is_none());

    // The lost unit drops out of the selection
    assert!(selected(&mut world).is_empty());
}

// ============================================================================
// SELECTION
// ============================================================================

#[test]
fn test_drag_over_unselectable_unit_notifies_empty_selection() {
    let mut world = TestWorld::new();
    let inside = world.world_under(Vec2::new(100.0, 100.0), 100.0);
    world.spawn(Controllable::unit(ENEMY), inside);

    world.drag(Vec2::new(10.0, 10.0), Vec2::new(200.0, 200.0));
    world.update();

    let changes = world.drain::<SelectionChanged>();
    assert_eq!(changes, vec![SelectionChanged { selection: Vec::new() }]);
}

#[test]
fn test_drag_selects_own_units_inside_frame() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    let enemy = world.spawn(Controllable::unit(ENEMY), Vec3::new(0.0, 0.0, 5.0));

    let from = world.screen_of(Vec3::new(-10.0, 0.0, 0.0)) - Vec2::splat(20.0);
    let to = world.screen_of(Vec3::new(10.0, 0.0, 0.0)) + Vec2::splat(20.0);
    world.drag(from, to);
    world.update();

    let selection = selected(&mut world);
    assert_eq!(selection.len(), 2);
    assert!(selection.contains(&a) && selection.contains(&b));
    assert!(!selection.contains(&enemy));
}

#[test]
fn test_thin_drag_is_still_a_box_select() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);

    let row = world.screen_of(Vec3::new(-10.0, 0.0, 0.0)).y;
    let left = world.screen_of(Vec3::new(-10.0, 0.0, 0.0)).x - 20.0;
    let right = world.screen_of(Vec3::new(10.0, 0.0, 0.0)).x + 20.0;
    world.drag(Vec2::new(left, row - 0.05), Vec2::new(right, row + 0.05));
    world.update();

    assert_eq!(selected(&mut world).len(), 2);
    let selection = selected(&mut world);
    assert!(selection.contains(&a) && selection.contains(&b));
}

#[test]
fn test_click_selects_unit_under_pointer() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);

    let screen = world.screen_of(Vec3::new(-10.0, 0.0, 0.0));
    world.click(MouseButton::Left, screen);
    world.update();

    assert_eq!(selected(&mut world), vec![a]);
}

#[test]
fn test_shift_click_extends_selection() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    select(&mut world, &[a]);

    let tick = world.next_tick();
    world.input(PlayerInput::KeyDown { key: KeyCode::ShiftLeft, tick });
    let screen = world.screen_of(Vec3::new(10.0, 0.0, 0.0));
    world.click(MouseButton::Left, screen);
    world.update();

    assert_eq!(selected(&mut world), vec![a, b]);
}

#[test]
fn test_unselectable_units_never_enter_selection() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);
    let enemy = world.spawn(Controllable::unit(ENEMY), Vec3::new(0.0, 0.0, 5.0));
    let scenery = world.world().spawn(Transform::default()).id();

    world.with_controller(|c| c.select_units(&[enemy, a, scenery]));

    assert_eq!(selected(&mut world), vec![a]);
    let changes = world.drain::<SelectionChanged>();
    assert_eq!(changes, vec![SelectionChanged { selection: vec![a] }]);
}

#[test]
fn test_replacing_with_same_units_is_idempotent() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);

    world.with_controller(|c| {
        c.select_units(&[a, b, a]);
        c.select_units(&[a, b]);
    });

    assert_eq!(selected(&mut world), vec![a, b]);
    let changes = world.drain::<SelectionChanged>();
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.selection == vec![a, b]));
}

#[test]
fn test_direct_selection_ignored_while_dragging() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    select(&mut world, &[a]);

    world.with_controller(|c| {
        c.start_drag(Vec2::new(10.0, 10.0));
        c.select_units(&[b]);
        c.cancel_drag();
    });

    assert_eq!(selected(&mut world), vec![a]);
}

// ============================================================================
// CONTROL GROUPS
// ============================================================================

#[test]
fn test_control_group_drops_dead_units_on_load() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    select(&mut world, &[a, b]);

    let tick = world.next_tick();
    world.input(PlayerInput::KeyDown { key: KeyCode::ControlLeft, tick });
    world.input(PlayerInput::KeyDown { key: KeyCode::Digit3, tick });
    world.input(PlayerInput::KeyUp { key: KeyCode::Digit3, tick });
    world.input(PlayerInput::KeyUp { key: KeyCode::ControlLeft, tick });
    world.update();

    select(&mut world, &[]);
    world.world().despawn(b);

    world.press(KeyCode::Digit3);
    world.update();

    assert_eq!(selected(&mut world), vec![a]);
    let changes = world.drain::<SelectionChanged>();
    assert_eq!(changes.last(), Some(&SelectionChanged { selection: vec![a] }));
}

#[test]
fn test_loading_unsaved_group_clears_selection() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);
    select(&mut world, &[a]);

    world.with_controller(|c| c.load_control_group(7));

    assert!(selected(&mut world).is_empty());
    let changes = world.drain::<SelectionChanged>();
    assert_eq!(changes, vec![SelectionChanged { selection: Vec::new() }]);
}

#[test]
fn test_invalid_group_index_is_ignored() {
    let mut world = TestWorld::new();
    let (a, b) = two_friendlies(&mut world);
    select(&mut world, &[a, b]);

    world.with_controller(|c| {
        c.save_control_group(10);
        c.load_control_group(42);
    });

    assert_eq!(selected(&mut world), vec![a, b]);
    assert!(world.drain::<SelectionChanged>().is_empty());
}

// ============================================================================
// HOVER & OVERLAYS
// ============================================================================

#[test]
fn test_hover_follows_pointer() {
    let mut world = TestWorld::new();
    let (a, _) = two_friendlies(&mut world);

    let over_a = world.screen_of(Vec3::new(-10.0, 0.0, 0.0));
    let tick = world.next_tick();
    world.input(PlayerInput::PointerMoved { position: over_a, tick });
    world.update();

    assert_eq!(world.drain::<HoverChanged>(), vec![HoverChanged { hovered: Some(a) }]);
    assert_eq!(world.with_controller(|c| c.hovered_unit()), Some(a));

    // Standing still over the same unit is not a change
    world.update();
    assert!(world.drain::<HoverChanged>().is_empty());

    let open_ground = world.screen_of(Vec3::new(0.0, -1.0, 40.0));
    let tick = world.next_tick();
    world.input(PlayerInput::PointerMoved { position: open_ground, tick });
    world.update();

    assert_eq!(world.drain::<HoverChanged>(), vec![HoverChanged { hovered: None }]);
}

#[test]
fn test_health_bar_key_toggles_overlay() {
    let mut world = TestWorld::new();

    let tick = world.next_tick();
    world.input(PlayerInput::KeyDown { key: KeyCode::AltLeft, tick });
    world.update();
    assert!(world.with_controller(|c| c.health_bars_shown()));

    let tick = world.next_tick();
    world.input(PlayerInput::KeyUp { key: KeyCode::AltLeft, tick });
    world.update();
    assert!(!world.with_controller(|c| c.health_bars_shown()));
}

#[test]
fn test_stale_input_is_dropped() {
    let mut world = TestWorld::new();

    world.input(PlayerInput::KeyDown { key: KeyCode::AltLeft, tick: 5 });
    world.input(PlayerInput::KeyUp { key: KeyCode::AltLeft, tick: 3 });
    world.update();

    assert!(world.with_controller(|c| c.health_bars_shown()));
}
