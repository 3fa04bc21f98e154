//! Geometry helpers for moving candidates around a pivot.
//!
//! The world is Y-up. Orbits happen in the horizontal plane, so every
//! rotation here is about the Y axis and vertical offsets are preserved.

use bevy::math::{Dir3, EulerRot, Quat, Vec3};
use bevy::transform::components::Transform;

/// Squared length below which a direction is treated as degenerate.
const DEGENERATE_LEN_SQ: f32 = 1.0e-8;

/// Yaw (rotation about Y, radians) of an orientation.
#[must_use]
pub fn yaw_of(rotation: Quat) -> f32 {
    let (yaw, _pitch, _roll) = rotation.to_euler(EulerRot::YXZ);
    yaw
}

/// Project a vector onto the horizontal plane.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unit direction from `pivot` to `position` in the horizontal plane.
///
/// Falls back to `fallback` (normalized and flattened) when the two points
/// coincide horizontally. If the fallback is degenerate too, +X is used.
#[must_use]
pub fn outward_direction(pivot: Vec3, position: Vec3, fallback: Vec3) -> Vec3 {
    let offset = flatten(position - pivot);
    if offset.length_squared() > DEGENERATE_LEN_SQ {
        return offset.normalize();
    }

    let fallback = flatten(fallback);
    if fallback.length_squared() > DEGENERATE_LEN_SQ {
        fallback.normalize()
    } else {
        Vec3::X
    }
}

/// Revolve a transform around `pivot` by `angle` radians about the Y axis.
///
/// With `face_pivot` the transform is turned to look at the pivot after the
/// move. Otherwise the orientation it had before the move is restored, so
/// only the translation changes.
pub fn orbit_around(transform: &mut Transform, pivot: Vec3, angle: f32, face_pivot: bool) {
    let facing = transform.rotation;
    transform.rotate_around(pivot, Quat::from_rotation_y(angle));

    if face_pivot {
        face_towards(transform, pivot);
    } else {
        transform.rotation = facing;
    }
}

/// Turn a transform to look at `target`, keeping it upright.
///
/// Leaves the rotation untouched when the target is directly above or below.
pub fn face_towards(transform: &mut Transform, target: Vec3) {
    let level_target = Vec3::new(target.x, transform.translation.y, target.z);
    if (level_target - transform.translation).length_squared() > DEGENERATE_LEN_SQ {
        transform.look_at(level_target, Dir3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1.0e-4;

    #[test]
    fn test_yaw_of_pure_yaw_rotation() {
        let yaw = yaw_of(Quat::from_rotation_y(0.75));
        assert!((yaw - 0.75).abs() < EPSILON, "got {yaw}");
    }

    #[test]
    fn test_outward_direction_ignores_height() {
        let dir = outward_direction(Vec3::ZERO, Vec3::new(3.0, 10.0, 4.0), Vec3::X);
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < EPSILON);
    }

    #[test]
    fn test_outward_direction_fallback_on_pivot() {
        let pivot = Vec3::new(5.0, 0.0, 5.0);
        let dir = outward_direction(pivot, Vec3::new(5.0, 2.0, 5.0), Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(dir, Vec3::Z);

        let dir = outward_direction(pivot, pivot, Vec3::ZERO);
        assert_eq!(dir, Vec3::X);
    }

    #[test]
    fn test_orbit_preserves_radius_and_height() {
        let pivot = Vec3::new(1.0, 0.0, 1.0);
        let mut transform = Transform::from_xyz(6.0, 2.5, 1.0);

        orbit_around(&mut transform, pivot, FRAC_PI_2, false);

        let radius = flatten(transform.translation - pivot).length();
        assert!((radius - 5.0).abs() < EPSILON);
        assert!((transform.translation.y - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_orbit_without_tracking_keeps_orientation() {
        let rotation = Quat::from_euler(EulerRot::YXZ, 0.3, 0.1, -0.2);
        let mut transform = Transform::from_xyz(4.0, 0.0, 0.0).with_rotation(rotation);

        orbit_around(&mut transform, Vec3::ZERO, PI / 3.0, false);

        assert_eq!(transform.rotation, rotation);
    }

    #[test]
    fn test_orbit_with_tracking_faces_pivot() {
        let mut transform = Transform::from_xyz(4.0, 1.0, 0.0);

        orbit_around(&mut transform, Vec3::ZERO, FRAC_PI_2, true);

        let to_pivot = flatten(-transform.translation).normalize();
        let forward = *transform.forward();
        assert!((forward - to_pivot).length() < EPSILON, "forward {forward:?}");
    }

    #[test]
    fn test_face_towards_directly_below_is_noop() {
        let rotation = Quat::from_rotation_y(1.0);
        let mut transform = Transform::from_xyz(0.0, 5.0, 0.0).with_rotation(rotation);
        face_towards(&mut transform, Vec3::ZERO);
        assert_eq!(transform.rotation, rotation);
    }
}
