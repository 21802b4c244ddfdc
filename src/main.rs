// Headless demo: two armies, one local player, a scripted input sequence.
// Runs the selection path and the command path end to end and logs what
// the presentation layer would see.
use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use rand::Rng;
use std::collections::VecDeque;

use rts_command::events::{OrderConfirmed, OrderIssued, SelectionChanged};
use rts_command::selection::PlayerInput;
use rts_command::viewport::Viewport;
use rts_command::{
    AuthorityPlugin, Collider, CommandSet, Controllable, PlayerId, PlayerSessionPlugin,
};

const LOCAL_PLAYER: PlayerId = PlayerId(1);
const ENEMY_PLAYER: PlayerId = PlayerId(2);
const UNITS_PER_TEAM: usize = 12;
const FORMATION_DEPTH: f32 = 20.0;
const UNIT_HEIGHT: f32 = 0.0;

/// Input frames still to be fed, one entry per tick
#[derive(Resource, Default)]
struct InputScript {
    frames: VecDeque<Vec<PlayerInput>>,
}

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_plugins(AuthorityPlugin)
        .add_plugins(PlayerSessionPlugin::new(LOCAL_PLAYER))
        .add_systems(Update, feed_scripted_input.before(CommandSet::Input))
        .add_systems(Update, log_presentation_events.after(CommandSet::Feedback));

    let viewport = *app.world().resource::<Viewport>();
    let mut rng = rand::thread_rng();

    // Player army on the left, enemies on the right
    let friendly: Vec<Vec3> = (0..UNITS_PER_TEAM)
        .map(|_| Vec3::new(rng.gen_range(-50.0..-20.0), UNIT_HEIGHT, rng.gen_range(-FORMATION_DEPTH..FORMATION_DEPTH)))
        .collect();
    let hostile: Vec<Vec3> = (0..UNITS_PER_TEAM)
        .map(|_| Vec3::new(rng.gen_range(20.0..50.0), UNIT_HEIGHT, rng.gen_range(-FORMATION_DEPTH..FORMATION_DEPTH)))
        .collect();

    for &position in &friendly {
        spawn_unit(app.world_mut(), Controllable::unit(LOCAL_PLAYER), position);
    }
    for &position in &hostile {
        spawn_unit(app.world_mut(), Controllable::unit(ENEMY_PLAYER), position);
    }

    let script = build_script(&viewport, &friendly, &hostile);
    app.insert_resource(script);

    app.run();
}

fn spawn_unit(world: &mut World, unit: Controllable, position: Vec3) -> Entity {
    world
        .spawn((unit, Collider::default(), Transform::from_translation(position)))
        .id()
}

/// Screen-space bounding box around a set of world positions, padded a little
fn screen_bounds(viewport: &Viewport, positions: &[Vec3]) -> Option<Rect> {
    let mut points = positions.iter().filter_map(|&p| viewport.world_to_viewport(p));
    let first = points.next()?;
    let rect = points.fold(Rect::from_corners(first, first), |rect, p| {
        rect.union_point(p)
    });
    Some(rect.inflate(10.0))
}

fn build_script(viewport: &Viewport, friendly: &[Vec3], hostile: &[Vec3]) -> InputScript {
    let mut script = InputScript::default();
    let mut tick = 0u64;
    let mut frame = |inputs: Vec<PlayerInput>| {
        script.frames.push_back(inputs);
    };

    // Box-select the whole friendly army
    if let Some(rect) = screen_bounds(viewport, friendly) {
        tick += 1;
        frame(vec![PlayerInput::PointerDown { button: MouseButton::Left, position: rect.min, tick }]);
        tick += 1;
        frame(vec![PlayerInput::PointerMoved { position: rect.max, tick }]);
        tick += 1;
        frame(vec![PlayerInput::PointerUp { button: MouseButton::Left, position: rect.max, tick }]);
    }

    // Ctrl+1 saves the group
    tick += 1;
    frame(vec![
        PlayerInput::KeyDown { key: KeyCode::ControlLeft, tick },
        PlayerInput::KeyDown { key: KeyCode::Digit1, tick },
        PlayerInput::KeyUp { key: KeyCode::Digit1, tick },
        PlayerInput::KeyUp { key: KeyCode::ControlLeft, tick },
    ]);

    // Right-click open ground in the middle of the field
    if let Some(ground) = viewport.world_to_viewport(Vec3::new(0.0, -1.0, 0.0)) {
        tick += 1;
        frame(vec![PlayerInput::PointerUp { button: MouseButton::Right, position: ground, tick }]);
    }

    // Right-click the first enemy
    if let Some(enemy) = hostile.first().and_then(|&p| viewport.world_to_viewport(p)) {
        tick += 1;
        frame(vec![PlayerInput::PointerUp { button: MouseButton::Right, position: enemy, tick }]);
    }

    // Stop everything, then reload group 1
    tick += 1;
    frame(vec![PlayerInput::KeyDown { key: KeyCode::KeyS, tick }, PlayerInput::KeyUp { key: KeyCode::KeyS, tick }]);
    tick += 1;
    frame(vec![PlayerInput::KeyDown { key: KeyCode::Digit1, tick }, PlayerInput::KeyUp { key: KeyCode::Digit1, tick }]);

    // A couple of empty ticks so the last confirmations arrive
    frame(Vec::new());
    frame(Vec::new());

    script
}

/// System: Feed one scripted input frame per tick, exit when done
fn feed_scripted_input(
    mut script: ResMut<InputScript>,
    mut inputs: EventWriter<PlayerInput>,
    mut exit: EventWriter<AppExit>,
) {
    match script.frames.pop_front() {
        Some(frame) => {
            for input in frame {
                inputs.write(input);
            }
        }
        None => {
            info!("Input script finished");
            exit.write(AppExit::Success);
        }
    }
}

/// System: Stand-in for a presentation layer
fn log_presentation_events(
    mut selection: EventReader<SelectionChanged>,
    mut confirmed: EventReader<OrderConfirmed>,
    mut issued: EventReader<OrderIssued>,
) {
    for event in selection.read() {
        info!("Selection changed: {} units", event.selection.len());
    }

    let confirmed: Vec<&OrderConfirmed> = confirmed.read().collect();
    if let Some(first) = confirmed.first() {
        info!("{} {:?} orders confirmed", confirmed.len(), first.kind());
    }

    let executed = issued.read().count();
    if executed > 0 {
        debug!("Authority executed {} orders this tick", executed);
    }
}
