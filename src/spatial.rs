// Spatial query service - rays and screen frames cast into the world
//
// Pure queries: nothing here mutates the world. Cosmetic colliders are never
// returned and an empty Vec means "nothing there", not an error.
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::cmp::Ordering;

use crate::constants::*;
use crate::math_utils::{ray_ground_intersection, ray_sphere_intersection};
use crate::types::{Collider, CollisionLayer, GroundPlane};
use crate::viewport::Viewport;

/// What a ray or frame query touched
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HitTarget {
    Entity(Entity),
    Ground,
}

/// One query result. Results are always sorted closest first.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpatialHit {
    pub target: HitTarget,
    pub point: Vec3,
    pub distance: f32,
}

impl SpatialHit {
    pub fn entity(&self) -> Option<Entity> {
        match self.target {
            HitTarget::Entity(entity) => Some(entity),
            HitTarget::Ground => None,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.target == HitTarget::Ground
    }
}

/// Collider snapshot handed to the pure query functions
#[derive(Clone, Copy, Debug)]
pub struct ColliderSample {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub layer: CollisionLayer,
}

fn by_distance(a: &SpatialHit, b: &SpatialHit) -> Ordering {
    a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
}

/// Cast a ray against gameplay colliders and the ground plane
pub fn raycast<I>(ray: Ray3d, colliders: I, ground: Option<&GroundPlane>) -> Vec<SpatialHit>
where
    I: IntoIterator<Item = ColliderSample>,
{
    let direction: Vec3 = *ray.direction;

    let mut hits: Vec<SpatialHit> = colliders
        .into_iter()
        .filter(|sample| sample.layer == CollisionLayer::Gameplay)
        .filter_map(|sample| {
            let (distance, point) =
                ray_sphere_intersection(ray.origin, direction, sample.center, sample.radius)?;
            (distance <= RAY_MAX_DISTANCE).then_some(SpatialHit {
                target: HitTarget::Entity(sample.entity),
                point,
                distance,
            })
        })
        .collect();

    if let Some(ground) = ground {
        if let Some((distance, point)) = ray_ground_intersection(ray.origin, direction, ground.height) {
            if distance <= RAY_MAX_DISTANCE {
                hits.push(SpatialHit { target: HitTarget::Ground, point, distance });
            }
        }
    }

    hits.sort_by(by_distance);
    hits
}

/// Every gameplay collider whose centre projects into the screen rectangle,
/// closest to the camera first
pub fn frame_query<I>(frame: Rect, viewport: &Viewport, colliders: I) -> Vec<SpatialHit>
where
    I: IntoIterator<Item = ColliderSample>,
{
    let mut hits: Vec<SpatialHit> = colliders
        .into_iter()
        .filter(|sample| sample.layer == CollisionLayer::Gameplay)
        .filter_map(|sample| {
            let screen_pos = viewport.world_to_viewport(sample.center)?;
            frame.contains(screen_pos).then(|| SpatialHit {
                target: HitTarget::Entity(sample.entity),
                point: sample.center,
                distance: viewport.depth_of(sample.center),
            })
        })
        .collect();

    hits.sort_by(by_distance);
    hits
}

/// System parameter exposing the spatial queries over the live world
#[derive(SystemParam)]
pub struct SpatialQuery<'w, 's> {
    colliders: Query<'w, 's, (Entity, &'static Transform, &'static Collider)>,
    viewport: Res<'w, Viewport>,
    ground: Option<Res<'w, GroundPlane>>,
}

impl SpatialQuery<'_, '_> {
    fn samples(&self) -> impl Iterator<Item = ColliderSample> + '_ {
        self.colliders.iter().map(|(entity, transform, collider)| ColliderSample {
            entity,
            center: transform.translation,
            radius: collider.radius,
            layer: collider.layer,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Objects along an arbitrary ray
    pub fn along_ray(&self, ray: Ray3d) -> Vec<SpatialHit> {
        raycast(ray, self.samples(), self.ground.as_deref())
    }

    /// Objects under a screen position
    pub fn at_screen_position(&self, screen_pos: Vec2) -> Vec<SpatialHit> {
        let Some(ray) = self.viewport.viewport_to_world(screen_pos) else {
            return Vec::new();
        };
        self.along_ray(ray)
    }

    /// Objects at a world XZ position, traced straight down from high above
    pub fn at_world_position(&self, world_pos: Vec3) -> Vec<SpatialHit> {
        let origin = Vec3::new(world_pos.x, WORLD_TRACE_HEIGHT, world_pos.z);
        self.along_ray(Ray3d::new(origin, Dir3::NEG_Y))
    }

    /// Objects inside a screen-space selection frame
    pub fn in_frame(&self, frame: Rect) -> Vec<SpatialHit> {
        frame_query(frame, &self.viewport, self.samples())
    }
}
