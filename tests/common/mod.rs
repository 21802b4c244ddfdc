// Shared fixtures for the integration tests: a headless app with the
// authority and one local player wired together.
#![allow(dead_code)]

use bevy::ecs::event::Event;
use bevy::ecs::system::SystemState;
use bevy::prelude::*;

use rts_command::selection::PlayerInput;
use rts_command::viewport::Viewport;
use rts_command::{
    AuthorityPlugin, Collider, Controllable, PlayerController, PlayerId, PlayerSessionPlugin,
};

pub const ME: PlayerId = PlayerId(1);
pub const ENEMY: PlayerId = PlayerId(2);

pub struct TestWorld {
    pub app: App,
    tick: u64,
}

impl TestWorld {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(AuthorityPlugin)
            .add_plugins(PlayerSessionPlugin::new(ME));
        Self { app, tick: 0 }
    }

    pub fn world(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn viewport(&self) -> Viewport {
        *self.app.world().resource::<Viewport>()
    }

    pub fn spawn(&mut self, unit: Controllable, position: Vec3) -> Entity {
        self.world()
            .spawn((unit, Collider::default(), Transform::from_translation(position)))
            .id()
    }

    /// Screen position of a world point under the default camera
    pub fn screen_of(&self, position: Vec3) -> Vec2 {
        self.viewport()
            .world_to_viewport(position)
            .expect("point should be in front of the camera")
    }

    /// World point `distance` along the ray through a screen position
    pub fn world_under(&self, screen_pos: Vec2, distance: f32) -> Vec3 {
        self.viewport()
            .viewport_to_world(screen_pos)
            .expect("viewport should produce a ray")
            .get_point(distance)
    }

    pub fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn send<E: Event>(&mut self, event: E) {
        self.world().send_event(event);
    }

    pub fn input(&mut self, input: PlayerInput) {
        self.send(input);
    }

    pub fn click(&mut self, button: MouseButton, position: Vec2) {
        let tick = self.next_tick();
        self.input(PlayerInput::PointerDown { button, position, tick });
        self.input(PlayerInput::PointerUp { button, position, tick });
    }

    pub fn drag(&mut self, from: Vec2, to: Vec2) {
        let tick = self.next_tick();
        self.input(PlayerInput::PointerDown { button: MouseButton::Left, position: from, tick });
        self.input(PlayerInput::PointerMoved { position: to, tick });
        self.input(PlayerInput::PointerUp { button: MouseButton::Left, position: to, tick });
    }

    pub fn press(&mut self, key: KeyCode) {
        let tick = self.next_tick();
        self.input(PlayerInput::KeyDown { key, tick });
        self.input(PlayerInput::KeyUp { key, tick });
    }

    pub fn update(&mut self) {
        self.app.update();
    }

    /// Everything of type `E` written since the last drain
    pub fn drain<E: Event>(&mut self) -> Vec<E> {
        self.world().resource_mut::<Events<E>>().drain().collect()
    }

    /// Run a closure against the player's controller outside the schedule
    pub fn with_controller<R>(&mut self, f: impl FnOnce(&mut PlayerController) -> R) -> R {
        let mut state: SystemState<PlayerController> = SystemState::new(self.world());
        let result = {
            let mut controller = state.get_mut(self.world());
            f(&mut controller)
        };
        state.apply(self.world());
        result
    }
}
