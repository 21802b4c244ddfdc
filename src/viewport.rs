// Screen <-> world conversion supplied by the camera collaborator.
// The host keeps this resource in sync with its camera; this crate never moves it.
use bevy::prelude::*;

use crate::constants::*;

/// Pinhole projection for one screen. Screen coordinates use the top-left
/// origin with Y pointing down, like `Window::cursor_position`.
#[derive(Resource, Clone, Copy, Debug)]
pub struct Viewport {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub vertical_fov: f32,
    pub size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_DISTANCE),
            look_at: Vec3::ZERO,
            vertical_fov: DEFAULT_VERTICAL_FOV,
            size: Vec2::new(DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT),
        }
    }
}

impl Viewport {
    /// Orthonormal camera basis (forward, right, up). None for a degenerate camera.
    fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.look_at - self.eye).try_normalize()?;
        let right = forward.cross(Vec3::Y).try_normalize()?;
        let up = right.cross(forward);
        Some((forward, right, up))
    }

    fn half_extents(&self) -> Option<Vec2> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return None;
        }
        let tan_half = (self.vertical_fov * 0.5).tan();
        let aspect = self.size.x / self.size.y;
        Some(Vec2::new(tan_half * aspect, tan_half))
    }

    /// Ray from the eye through a screen position
    pub fn viewport_to_world(&self, screen_pos: Vec2) -> Option<Ray3d> {
        let (forward, right, up) = self.basis()?;
        let half = self.half_extents()?;

        let ndc_x = 2.0 * screen_pos.x / self.size.x - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_pos.y / self.size.y;

        let direction = forward + right * (ndc_x * half.x) + up * (ndc_y * half.y);
        let direction = Dir3::new(direction).ok()?;
        Some(Ray3d::new(self.eye, direction))
    }

    /// Screen position of a world point, None when it is behind the camera
    pub fn world_to_viewport(&self, world_pos: Vec3) -> Option<Vec2> {
        let (forward, right, up) = self.basis()?;
        let half = self.half_extents()?;

        let relative = world_pos - self.eye;
        let depth = relative.dot(forward);
        if depth <= 0.0 {
            return None;
        }

        let ndc_x = relative.dot(right) / (depth * half.x);
        let ndc_y = relative.dot(up) / (depth * half.y);

        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * self.size.x,
            (1.0 - ndc_y) * 0.5 * self.size.y,
        ))
    }

    /// Distance from the eye, used to order frame query results
    pub fn depth_of(&self, world_pos: Vec3) -> f32 {
        self.eye.distance(world_pos)
    }
}
