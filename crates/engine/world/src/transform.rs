//! Position, orientation and scale, and how they compose through the
//! parent chain.

use glam::{EulerRot, Quat, Vec3};

/// Reference frame for relative transform operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformSpace {
    /// The object's own axes
    Local,
    /// The parent's axes (world axes for root objects)
    #[default]
    Parent,
    /// World axes
    World,
}

impl TransformSpace {
    /// Map a script space id (0 local, 1 parent, 2 world)
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Local),
            1 => Some(Self::Parent),
            2 => Some(Self::World),
            _ => None,
        }
    }
}

/// Translation, rotation, scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, orientation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            orientation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Compose `self` (parent) with `child` expressed in the parent's frame
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            orientation: (self.orientation * child.orientation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.orientation * (self.scale * point)
    }

    /// Approximate inverse. Exact unless scale is non-uniform under rotation.
    pub fn inverse(&self) -> Transform {
        let orientation = self.orientation.inverse();
        let scale = self.scale.recip();
        Transform {
            position: orientation * (-self.position) * scale,
            orientation,
            scale,
        }
    }

    /// Linear interpolation of position/scale, spherical of orientation
    pub fn lerp(&self, other: &Transform, t: f32) -> Transform {
        Transform {
            position: self.position.lerp(other.position, t),
            orientation: self.orientation.slerp(other.orientation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

/// Quaternion from XYZ euler angles in degrees
pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        euler.x.to_radians(),
        euler.y.to_radians(),
        euler.z.to_radians(),
    )
}

/// XYZ euler angles in degrees of a quaternion
pub fn euler_degrees(orientation: Quat) -> Vec3 {
    let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Apply `rotation` to `orientation` in the given space
///
/// `world` is the object's current world orientation.
pub fn rotate_in_space(orientation: Quat, rotation: Quat, space: TransformSpace, world: Quat) -> Quat {
    let rotated = match space {
        TransformSpace::Local => orientation * rotation,
        TransformSpace::Parent => rotation * orientation,
        TransformSpace::World => orientation * world.inverse() * rotation * world,
    };
    rotated.normalize()
}

/// Orientation that points -Z at `front` with +Z as the up hint
///
/// Returns `None` when `front` is zero or parallel to the up axis.
pub fn look_rotation(front: Vec3) -> Option<Quat> {
    let front = front.try_normalize()?;
    let right = front.cross(Vec3::Z).try_normalize()?;
    let up = right.cross(front);
    let basis = glam::Mat3::from_cols(right, up, -front);
    Some(Quat::from_mat3(&basis).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_compose_and_inverse() {
        let parent = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let child = Transform::from_position(Vec3::X);
        let world = parent.mul_transform(&child);
        assert!(approx(world.position, Vec3::new(1.0, 4.0, 3.0)));

        let back = parent.inverse().mul_transform(&world);
        assert!(approx(back.position, Vec3::X));
        assert!(approx(back.scale, Vec3::ONE));
    }

    #[test]
    fn test_euler_degrees_roundtrip() {
        let euler = Vec3::new(10.0, 20.0, 30.0);
        assert!(approx(euler_degrees(quat_from_euler_degrees(euler)), euler));
    }

    #[test]
    fn test_rotate_spaces_differ() {
        let start = Quat::from_rotation_x(0.5);
        let q = Quat::from_rotation_z(0.3);
        let local = rotate_in_space(start, q, TransformSpace::Local, start);
        let parent = rotate_in_space(start, q, TransformSpace::Parent, start);
        assert!(local.abs_diff_eq(start * q, 1e-5));
        assert!(parent.abs_diff_eq(q * start, 1e-5));
    }

    #[test]
    fn test_look_rotation_faces_target() {
        let rot = look_rotation(Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!(approx(rot * Vec3::NEG_Z, Vec3::Y));
        assert!(approx(rot * Vec3::Y, Vec3::Z));
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(look_rotation(Vec3::ZERO).is_none());
        assert!(look_rotation(Vec3::new(0.0, 0.0, 3.0)).is_none());
    }
}
