//! Transform queries and edits on game objects, the parent graph, skeleton
//! bones and camera rays.

use glam::{Quat, Vec2, Vec3};

use crate::engine::Engine;
use crate::object::{GameObject, ObjectId};
use crate::scene::SceneId;
use crate::transform::{look_rotation, rotate_in_space, Transform, TransformSpace};

/// Length of rays built by [`Engine::pick_ray`]
pub const PICK_RAY_LENGTH: f32 = 10000.0;

/// Origin and (scaled) direction of a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Engine {
    /// Frame the object's local transform is expressed in
    fn parent_frame(&self, object: &GameObject) -> Transform {
        let Some(parent) = object.parent.and_then(|p| self.objects.get(p)) else {
            return Transform::IDENTITY;
        };
        let parent_world = self.parent_frame(parent).mul_transform(&parent.transform);
        let bone = object
            .parent_bone
            .as_ref()
            .zip(parent.skeleton())
            .and_then(|(name, skeleton)| skeleton.bones.get(name));
        match bone {
            Some(bone) => parent_world.mul_transform(&bone.transform()),
            None => parent_world,
        }
    }

    pub fn world_transform(&self, id: ObjectId) -> Option<Transform> {
        let object = self.objects.get(id)?;
        Some(self.parent_frame(object).mul_transform(&object.transform))
    }

    /// Place an object so that its world transform becomes `world`
    pub fn set_world_transform(&mut self, id: ObjectId, world: Transform) {
        let Some(object) = self.objects.get(id) else {
            return;
        };
        let local = self.parent_frame(object).inverse().mul_transform(&world);
        if let Some(object) = self.objects.get_mut(id) {
            object.transform = local;
        }
    }

    pub fn set_world_position(&mut self, id: ObjectId, position: Vec3) {
        let Some(object) = self.objects.get(id) else {
            return;
        };
        let local = self.parent_frame(object).inverse().transform_point(position);
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.position = local;
        }
    }

    pub fn set_world_orientation(&mut self, id: ObjectId, orientation: Quat) {
        let Some(object) = self.objects.get(id) else {
            return;
        };
        let frame = self.parent_frame(object);
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.orientation = (frame.orientation.inverse() * orientation).normalize();
        }
    }

    /// Move by `delta` expressed in `space`
    pub fn translate(&mut self, id: ObjectId, delta: Vec3, space: TransformSpace) {
        let Some(object) = self.objects.get(id) else {
            return;
        };
        let offset = match space {
            TransformSpace::Local => object.transform.orientation * delta,
            TransformSpace::Parent => delta,
            TransformSpace::World => {
                let frame = self.parent_frame(object);
                (frame.orientation.inverse() * delta) / frame.scale
            }
        };
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.position += offset;
        }
    }

    /// Rotate by `rotation` expressed in `space`
    pub fn rotate(&mut self, id: ObjectId, rotation: Quat, space: TransformSpace) {
        let Some(world) = self.world_transform(id) else {
            return;
        };
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.orientation =
                rotate_in_space(object.transform.orientation, rotation, space, world.orientation);
        }
    }

    /// Rotate about one axis by `degrees`
    pub fn rotate_axis(&mut self, id: ObjectId, axis: Vec3, degrees: f32, space: TransformSpace) {
        self.rotate(id, Quat::from_axis_angle(axis, degrees.to_radians()), space);
    }

    /// Express a vector given in `space` in world axes
    fn to_world_axes(&self, id: ObjectId, v: Vec3, space: TransformSpace) -> Option<Vec3> {
        let object = self.objects.get(id)?;
        Some(match space {
            TransformSpace::Local => self.world_transform(id)?.orientation * v,
            TransformSpace::Parent => self.parent_frame(object).orientation * v,
            TransformSpace::World => v,
        })
    }

    pub fn set_linear_velocity(&mut self, id: ObjectId, velocity: Vec3, space: TransformSpace) {
        if let Some(world) = self.to_world_axes(id, velocity, space) {
            if let Some(object) = self.objects.get_mut(id) {
                object.linear_velocity = world;
            }
        }
    }

    pub fn set_angular_velocity(&mut self, id: ObjectId, velocity: Vec3, space: TransformSpace) {
        if let Some(world) = self.to_world_axes(id, velocity, space) {
            if let Some(object) = self.objects.get_mut(id) {
                object.angular_velocity = world;
            }
        }
    }

    /// Turn the object's -Z axis towards `target`, +Z up
    ///
    /// When the target sits on the object or straight above/below it the
    /// orientation is left unchanged.
    pub fn look_at(&mut self, id: ObjectId, target: Vec3) {
        let Some(world) = self.world_transform(id) else {
            return;
        };
        if let Some(orientation) = look_rotation(target - world.position) {
            self.set_world_orientation(id, orientation);
        }
    }

    // ------------------------------------------------------------------
    // Parent graph
    // ------------------------------------------------------------------

    /// Whether `ancestor` is `id` or one of its parents
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.objects.get(node).and_then(|o| o.parent);
        }
        false
    }

    /// Attach `child` under `parent`
    ///
    /// With `keep_world` the child's world transform is preserved, otherwise
    /// its local transform is. Fails on self-parenting and cycles.
    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId, keep_world: bool) -> bool {
        if !self.objects.contains(child) || !self.objects.contains(parent) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            return false;
        }
        let world = self.world_transform(child);
        self.detach(child);

        if let Some(object) = self.objects.get_mut(child) {
            object.parent = Some(parent);
            object.parent_bone = None;
        }
        if let Some(parent) = self.objects.get_mut(parent) {
            if !parent.children.contains(&child) {
                parent.children.push(child);
            }
        }
        if let (true, Some(world)) = (keep_world, world) {
            self.set_world_transform(child, world);
        }
        true
    }

    /// Detach `child` from its parent
    pub fn clear_parent(&mut self, child: ObjectId, keep_world: bool) {
        let world = self.world_transform(child);
        self.detach(child);
        if let Some(object) = self.objects.get_mut(child) {
            object.parent = None;
            object.parent_bone = None;
            if let (true, Some(world)) = (keep_world, world) {
                object.transform = world;
            }
        }
    }

    fn detach(&mut self, child: ObjectId) {
        let old_parent = self.objects.get(child).and_then(|o| o.parent);
        if let Some(parent) = old_parent.and_then(|p| self.objects.get_mut(p)) {
            parent.children.retain(|c| *c != child);
        }
    }

    // ------------------------------------------------------------------
    // Bones
    // ------------------------------------------------------------------

    /// Attach `object` to a bone of `skeleton`
    ///
    /// `local` is used as the offset from the bone unless `keep_world`, in
    /// which case the object stays where it is. Returns false for an unknown
    /// bone.
    pub fn attach_to_bone(
        &mut self,
        skeleton: ObjectId,
        bone: &str,
        object: ObjectId,
        local: Transform,
        keep_world: bool,
    ) -> bool {
        let has_bone = self
            .objects
            .get(skeleton)
            .and_then(GameObject::skeleton)
            .is_some_and(|s| s.bones.contains_key(bone));
        if !has_bone {
            return false;
        }
        let world = self.world_transform(object);
        if !self.set_parent(object, skeleton, false) {
            return false;
        }
        if let Some(child) = self.objects.get_mut(object) {
            child.parent_bone = Some(bone.to_string());
            child.transform = local;
        }
        if let (true, Some(world)) = (keep_world, world) {
            self.set_world_transform(object, world);
        }
        true
    }

    /// Pose a bone relative to its bind pose, blending with the current pose
    /// when `weight` < 1. Returns false for an unknown bone.
    pub fn apply_bone_channel(&mut self, skeleton: ObjectId, bone: &str, pose: Transform, weight: f32) -> bool {
        let Some(bone) = self
            .objects
            .get_mut(skeleton)
            .and_then(GameObject::skeleton_mut)
            .and_then(|s| s.bones.get_mut(bone))
        else {
            return false;
        };
        bone.pose = if weight < 1.0 {
            bone.pose.lerp(&pose, weight.max(0.0))
        } else {
            pose
        };
        true
    }

    // ------------------------------------------------------------------
    // Rays
    // ------------------------------------------------------------------

    /// Ray from the scene's main camera through window pixel (x, y)
    ///
    /// `-1` in either coordinate picks through the current mouse position.
    pub fn pick_ray(&self, scene: SceneId, x: f32, y: f32) -> Option<Ray> {
        let camera_id = self.scenes.get(scene)?.main_camera?;
        let camera = self.objects.get(camera_id)?.camera()?;
        let world = self.world_transform(camera_id)?;

        let pixel = if x == -1.0 || y == -1.0 {
            self.input()
                .map(|input| input.mouse().position)
                .unwrap_or(Vec2::ZERO)
        } else {
            Vec2::new(x, y)
        };
        let size = self.window_size();
        let (width, height) = (size.x.max(1.0), size.y.max(1.0));
        let ndc = Vec2::new(2.0 * pixel.x / width - 1.0, 1.0 - 2.0 * pixel.y / height);

        let half = (camera.fov.to_radians() * 0.5).tan();
        let view = Vec3::new(ndc.x * half * (width / height), ndc.y * half, -1.0);
        let direction = (world.orientation * view).normalize_or_zero() * PICK_RAY_LENGTH;
        Some(Ray {
            origin: world.position,
            direction,
        })
    }
}
