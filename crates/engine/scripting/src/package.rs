//! Package files: a KDL description of scenes and the resources they use
//!
//! ```kdl
//! scene "Level" layer=1 main=#true camera="Cam" {
//!     gravity 0 0 -9.81
//!     object "Root" type="empty"
//!     object "Cube" type="entity" mesh="CubeMesh" material="Stone" {
//!         position 0 0 1
//!         rotation 0 0 90
//!         scale 1 1 1
//!         parent "Root"
//!         state 1
//!         variable "hp" 10
//!         physics character=#true contacts=#true
//!     }
//!     object "Cam" type="camera" {
//!         camera fov=50 near=0.1 far=100
//!     }
//! }
//! mesh "CubeMesh" {
//!     submesh material="Stone" {
//!         vertex 0 0 0
//!         vertex 1 0 0
//!         vertex 0 1 0
//!         triangle 0 1 2
//!     }
//! }
//! group "Crate" { object "Box" type="entity" mesh="CubeMesh" }
//! animation "Walk" length=1.5
//! material "Stone" { param "fragment" "tint"; param "vertex" "time" 0.0 }
//! hud "Overlay" { element "Score" value="0" }
//! script "Init" "print('hello')"
//! ```

use std::path::Path;

use glam::{Vec2, Vec3};
use kdl::{KdlDocument, KdlNode};
use lumen_world::animation::AnimationClip;
use lumen_world::group::Group;
use lumen_world::hud::{Hud, HudElement};
use lumen_world::material::{Material, ShaderStage, ShaderValue};
use lumen_world::mesh::{Mesh, SubMesh, Triangle, Vertex, TRI_COLLIDER};
use lumen_world::object::{CameraData, CurveData, LightData};
use lumen_world::package::{ObjectDesc, PackageDesc, SceneDesc};
use lumen_world::transform::quat_from_euler_degrees;
use lumen_world::{ObjectType, Transform};
use tracing::warn;

use crate::kdl_reader::kdl_value_to_value;
use crate::{Error, Result, Value};

/// Turns a file into a package description
pub trait PackageLoader {
    fn load(&self, path: &Path) -> Result<PackageDesc>;
}

/// Loads KDL package files
#[derive(Debug, Clone, Copy, Default)]
pub struct KdlPackageLoader;

impl PackageLoader for KdlPackageLoader {
    fn load(&self, path: &Path) -> Result<PackageDesc> {
        let content = std::fs::read_to_string(path)?;
        parse_package(&path.to_string_lossy(), &content)
    }
}

/// Parse package text. `name` identifies the package once installed.
pub fn parse_package(name: &str, content: &str) -> Result<PackageDesc> {
    let doc: KdlDocument = content.parse()?;
    let mut package = PackageDesc {
        name: name.to_string(),
        ..PackageDesc::default()
    };
    let fail = |message: String| Error::Package {
        path: name.to_string(),
        message,
    };

    for node in doc.nodes() {
        match node.name().value() {
            "scene" => package.scenes.push(parse_scene(node).map_err(fail)?),
            "mesh" => package.meshes.push(parse_mesh(node).map_err(fail)?),
            "group" => {
                let group_name = required_name(node).map_err(fail)?;
                let objects = children(node)
                    .filter(|child| child.name().value() == "object")
                    .map(parse_object)
                    .collect::<std::result::Result<_, _>>()
                    .map_err(fail)?;
                package.groups.push(Group {
                    name: group_name,
                    objects,
                });
            }
            "animation" => {
                let clip_name = required_name(node).map_err(fail)?;
                let length = prop(node, "length").and_then(|v| v.as_f32().ok()).unwrap_or(0.0);
                package.animations.push(AnimationClip::new(clip_name, length));
            }
            "material" => package.materials.push(parse_material(node).map_err(fail)?),
            "hud" => package.huds.push(parse_hud(node).map_err(fail)?),
            "script" => {
                let script_name = required_name(node).map_err(fail)?;
                let source = args(node)
                    .get(1)
                    .and_then(|v| v.as_str().ok())
                    .map(str::to_string)
                    .ok_or_else(|| fail(format!("script {} has no source", script_name)))?;
                package.scripts.insert(script_name, source);
            }
            other => warn!("{}: ignoring unknown node {}", name, other),
        }
    }
    Ok(package)
}

type ParseResult<T> = std::result::Result<T, String>;

fn args(node: &KdlNode) -> Vec<Value> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| kdl_value_to_value(e.value()))
        .collect()
}

fn prop(node: &KdlNode, key: &str) -> Option<Value> {
    node.entries()
        .iter()
        .find(|e| e.name().is_some_and(|n| n.value() == key))
        .map(|e| kdl_value_to_value(e.value()))
}

fn prop_str(node: &KdlNode, key: &str) -> Option<String> {
    prop(node, key).and_then(|v| v.as_str().ok().map(str::to_string))
}

fn prop_bool(node: &KdlNode, key: &str) -> Option<bool> {
    prop(node, key).and_then(|v| v.as_bool().ok())
}

fn children(node: &KdlNode) -> impl Iterator<Item = &KdlNode> {
    node.children().into_iter().flat_map(|doc| doc.nodes().iter())
}

fn required_name(node: &KdlNode) -> ParseResult<String> {
    args(node)
        .first()
        .and_then(|v| v.as_str().ok())
        .map(str::to_string)
        .ok_or_else(|| format!("{} node needs a name", node.name().value()))
}

fn floats(node: &KdlNode) -> ParseResult<Vec<f32>> {
    args(node)
        .iter()
        .map(|v| v.as_f32().map_err(|e| format!("{}: {}", node.name().value(), e)))
        .collect()
}

fn vec3(node: &KdlNode) -> ParseResult<Vec3> {
    match floats(node)?.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        other => Err(format!(
            "{} expects 3 numbers, got {}",
            node.name().value(),
            other.len()
        )),
    }
}

/// `position`/`rotation`/`scale` children of a node
fn parse_transform(node: &KdlNode) -> ParseResult<Transform> {
    let mut transform = Transform::IDENTITY;
    for child in children(node) {
        match child.name().value() {
            "position" => transform.position = vec3(child)?,
            "rotation" => transform.orientation = quat_from_euler_degrees(vec3(child)?),
            "scale" => transform.scale = vec3(child)?,
            _ => {}
        }
    }
    Ok(transform)
}

fn parse_scene(node: &KdlNode) -> ParseResult<SceneDesc> {
    let mut scene = SceneDesc::new(required_name(node)?);
    if let Some(layer) = prop(node, "layer").and_then(|v| v.as_i64().ok()) {
        scene.layer = layer.max(0) as u32;
    }
    scene.main = prop_bool(node, "main").unwrap_or(false);
    scene.camera = prop_str(node, "camera");
    for child in children(node) {
        match child.name().value() {
            "object" => scene.objects.push(parse_object(child)?),
            "gravity" => scene.gravity = Some(vec3(child)?),
            other => warn!("scene {}: ignoring {}", scene.name, other),
        }
    }
    Ok(scene)
}

fn parse_object(node: &KdlNode) -> ParseResult<ObjectDesc> {
    let name = required_name(node)?;
    let type_name = prop_str(node, "type").unwrap_or_else(|| "empty".to_string());
    let object_type = ObjectType::from_name(&type_name)
        .ok_or_else(|| format!("object {} has unknown type {}", name, type_name))?;

    let mut desc = ObjectDesc::new(name, object_type);
    desc.mesh = prop_str(node, "mesh");
    desc.material = prop_str(node, "material");
    desc.transform = parse_transform(node)?;

    for child in children(node) {
        match child.name().value() {
            "position" | "rotation" | "scale" => {}
            "parent" => desc.parent = Some(required_name(child)?),
            "state" => {
                desc.state = args(child)
                    .first()
                    .and_then(|v| v.as_i64().ok())
                    .unwrap_or(0) as i32
            }
            "variable" => {
                let var_name = required_name(child)?;
                let value = args(child)
                    .get(1)
                    .and_then(Value::to_var_value)
                    .ok_or_else(|| format!("variable {} needs a value", var_name))?;
                desc.variables.push((var_name, value));
            }
            "physics" => {
                desc.character = prop_bool(child, "character").unwrap_or(false);
                desc.contacts = prop_bool(child, "contacts").unwrap_or(false);
            }
            "camera" => {
                let mut camera = CameraData::default();
                if let Some(fov) = prop(child, "fov").and_then(|v| v.as_f32().ok()) {
                    camera.fov = fov;
                }
                let near = prop(child, "near").and_then(|v| v.as_f32().ok());
                let far = prop(child, "far").and_then(|v| v.as_f32().ok());
                camera.set_clipping(
                    near.unwrap_or(camera.clip_start),
                    far.unwrap_or(camera.clip_end),
                );
                desc.camera = Some(camera);
            }
            "light" => {
                let mut light = LightData::default();
                if let Some(power) = prop(child, "power").and_then(|v| v.as_f32().ok()) {
                    light.power = power;
                }
                if let Ok(diffuse) = vec3(child) {
                    light.diffuse = diffuse;
                }
                desc.light = Some(light);
            }
            "curve" => {
                let points = children(child)
                    .filter(|p| p.name().value() == "point")
                    .map(vec3)
                    .collect::<ParseResult<Vec<_>>>()?;
                desc.curve = Some(CurveData {
                    points,
                    cyclic: prop_bool(child, "cyclic").unwrap_or(false),
                });
            }
            "bone" => desc.bones.push((required_name(child)?, parse_transform(child)?)),
            "particles" => desc.emitting = prop_bool(child, "emitting"),
            other => warn!("object {}: ignoring {}", desc.name, other),
        }
    }
    Ok(desc)
}

fn parse_mesh(node: &KdlNode) -> ParseResult<Mesh> {
    let mut mesh = Mesh::new(required_name(node)?);
    for child in children(node).filter(|c| c.name().value() == "submesh") {
        let mut sub = SubMesh::new();
        sub.material_name = prop_str(child, "material").unwrap_or_default();
        for item in children(child) {
            match item.name().value() {
                "vertex" => sub.vertices.push(Vertex::at(vec3(item)?)),
                "triangle" => {
                    let indices = args(item)
                        .iter()
                        .map(|v| v.as_i64().ok().and_then(|i| u32::try_from(i).ok()))
                        .collect::<Option<Vec<u32>>>()
                        .filter(|i| i.len() == 3)
                        .ok_or_else(|| format!("mesh {}: bad triangle", mesh.name))?;
                    if indices.iter().any(|i| *i as usize >= sub.vertices.len()) {
                        return Err(format!("mesh {}: triangle index out of range", mesh.name));
                    }
                    sub.triangles.push(Triangle {
                        indices: [indices[0], indices[1], indices[2]],
                        flags: TRI_COLLIDER,
                    });
                }
                _ => {}
            }
        }
        mesh.add_sub_mesh(sub);
    }
    Ok(mesh)
}

fn parse_material(node: &KdlNode) -> ParseResult<Material> {
    let mut material = Material::new(required_name(node)?);
    material.initialized = prop_bool(node, "initialized").unwrap_or(false);
    for param in children(node).filter(|c| c.name().value() == "param") {
        let values = args(param);
        let stage = values
            .first()
            .and_then(|v| v.as_str().ok())
            .and_then(ShaderStage::from_name)
            .ok_or_else(|| format!("material {}: param needs a stage", material.name))?;
        let param_name = values
            .get(1)
            .and_then(|v| v.as_str().ok())
            .ok_or_else(|| format!("material {}: param needs a name", material.name))?
            .to_string();
        if stage == ShaderStage::Fragment {
            material.declared_fragment.insert(param_name.clone());
        }
        let numbers: Vec<f32> = values[2..].iter().filter_map(|v| v.as_f32().ok()).collect();
        let value = match numbers.as_slice() {
            [] => None,
            [x] => Some(ShaderValue::Float(*x)),
            [x, y] => Some(ShaderValue::Vec2([*x, *y])),
            [x, y, z] => Some(ShaderValue::Vec3([*x, *y, *z])),
            [x, y, z, w, ..] => Some(ShaderValue::Vec4([*x, *y, *z, *w])),
        };
        if let Some(value) = value {
            material.set_param(stage, &param_name, value);
        }
    }
    Ok(material)
}

fn parse_hud(node: &KdlNode) -> ParseResult<Hud> {
    let mut hud = Hud::new(required_name(node)?);
    hud.visible = prop_bool(node, "visible").unwrap_or(false);
    for child in children(node).filter(|c| c.name().value() == "element") {
        let mut element = HudElement::new(required_name(child)?);
        element.value = prop_str(child, "value").unwrap_or_default();
        element.material_name = prop_str(child, "material").unwrap_or_default();
        element.visible = prop_bool(child, "visible").unwrap_or(true);
        let x = prop(child, "x").and_then(|v| v.as_f32().ok()).unwrap_or(0.0);
        let y = prop(child, "y").and_then(|v| v.as_f32().ok()).unwrap_or(0.0);
        element.position = Vec2::new(x, y);
        hud.add_element(element);
    }
    Ok(hud)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
        scene "Menu"
        scene "Level" layer=2 main=#true camera="Cam" {
            gravity 0 0 -5
            object "Root" type="empty" {
                position 0 0 1
            }
            object "Cube" type="entity" mesh="CubeMesh" material="Stone" {
                rotation 0 0 90
                parent "Root"
                state 3
                variable "hp" 10
                variable "tag" "crate"
                physics character=#true contacts=#true
            }
            object "Cam" type="camera" {
                camera fov=50 near=0 far=100
            }
            object "Path" type="curve" {
                curve cyclic=#true {
                    point 0 0 0
                    point 1 0 0
                }
            }
            object "Rig" type="skeleton" {
                bone "arm" {
                    position 0 1 0
                }
            }
        }
        mesh "CubeMesh" {
            submesh material="Stone" {
                vertex 0 0 0
                vertex 1 0 0
                vertex 0 1 0
                triangle 0 1 2
            }
        }
        group "Crate" {
            object "Box" type="entity" mesh="CubeMesh"
        }
        animation "Walk" length=1.5
        material "Stone" {
            param "fragment" "tint"
            param "vertex" "time" 0.5
        }
        hud "Overlay" {
            element "Score" value="0" x=10 y=20
        }
        script "Init" "x = 1"
    "#;

    #[test]
    fn test_parse_full_package() {
        let package = parse_package("level.kdl", LEVEL).unwrap();
        assert_eq!(package.scenes.len(), 2);

        let scene = package.main_scene().unwrap();
        assert_eq!(scene.name, "Level");
        assert_eq!(scene.layer, 2);
        assert_eq!(scene.gravity, Some(Vec3::new(0.0, 0.0, -5.0)));
        assert_eq!(scene.camera.as_deref(), Some("Cam"));
        assert_eq!(scene.objects.len(), 5);

        let cube = &scene.objects[1];
        assert_eq!(cube.object_type, ObjectType::Entity);
        assert_eq!(cube.parent.as_deref(), Some("Root"));
        assert_eq!(cube.state, 3);
        assert_eq!(cube.variables.len(), 2);
        assert!(cube.character && cube.contacts);

        let cam = scene.objects[2].camera.unwrap();
        assert_eq!(cam.fov, 50.0);
        assert!(cam.clip_start > 0.0);

        let path = scene.objects[3].curve.as_ref().unwrap();
        assert!(path.cyclic);
        assert_eq!(path.points.len(), 2);
        assert_eq!(scene.objects[4].bones[0].0, "arm");

        assert_eq!(package.meshes[0].sub_meshes[0].triangles.len(), 1);
        assert_eq!(package.groups[0].objects[0].name, "Box");
        assert_eq!(package.animations[0].length, 1.5);
        assert!(package.materials[0].declared_fragment.contains("tint"));
        assert_eq!(
            package.materials[0].param(ShaderStage::Vertex, "time"),
            Some(ShaderValue::Float(0.5))
        );
        assert_eq!(package.huds[0].elements["Score"].position, Vec2::new(10.0, 20.0));
        assert_eq!(package.scripts["Init"], "x = 1");
    }

    #[test]
    fn test_bad_packages() {
        assert!(matches!(
            parse_package("bad.kdl", r#"scene "S" { object "X" type="teapot" }"#),
            Err(Error::Package { .. })
        ));
        assert!(parse_package("bad.kdl", r#"mesh "M" { submesh { triangle 0 1 2 } }"#).is_err());
        assert!(parse_package("bad.kdl", "scene {").is_err());
    }

    #[test]
    fn test_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.kdl");
        std::fs::write(&path, LEVEL).unwrap();

        let package = KdlPackageLoader.load(&path).unwrap();
        assert_eq!(package.name, path.to_string_lossy());
        assert!(KdlPackageLoader.load(&dir.path().join("missing.kdl")).is_err());
    }
}
