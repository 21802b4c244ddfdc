use bevy::prelude::*;

use crate::constants::RAY_PARALLEL_EPSILON;

/// Ray-sphere intersection test
/// Returns Some((distance, hit_point)) if ray intersects sphere, None otherwise
pub fn ray_sphere_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    sphere_center: Vec3,
    sphere_radius: f32,
) -> Option<(f32, Vec3)> {
    let oc = ray_origin - sphere_center;
    let a = ray_direction.dot(ray_direction);
    let b = 2.0 * oc.dot(ray_direction);
    let c = oc.dot(oc) - sphere_radius * sphere_radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 || a == 0.0 {
        return None;
    }

    // Nearest intersection (entry point into sphere)
    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if t > 0.0 {
        return Some((t, ray_origin + ray_direction * t));
    }

    // Far intersection, in case the origin is inside the sphere
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);
    if t2 > 0.0 {
        return Some((t2, ray_origin + ray_direction * t2));
    }

    None
}

/// Ray vs horizontal plane at `plane_y`.
/// Returns Some((distance, hit_point)) when the plane is in front of the ray.
pub fn ray_ground_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    plane_y: f32,
) -> Option<(f32, Vec3)> {
    // origin.y + t * direction.y = plane_y
    if ray_direction.y.abs() < RAY_PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_y - ray_origin.y) / ray_direction.y;
    if t > 0.0 {
        Some((t, ray_origin + ray_direction * t))
    } else {
        // Behind the origin
        None
    }
}
