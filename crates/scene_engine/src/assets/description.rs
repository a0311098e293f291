//! Serializable mesh descriptions
//!
//! Mesh files are RON documents holding either a static mesh or a skinned
//! mesh with its bone hierarchy and clips. The skeleton is written as a nested
//! node tree and flattened into the index-based [`Skeleton`] on load.

use serde::{Deserialize, Serialize};

use super::mesh::StaticMesh;
use super::AssetError;
use crate::animation::{AnimationClip, Bone, NodeChannel, SkeletalMesh, Skeleton, SkeletonNode};
use crate::foundation::bounds::Aabb;
use crate::foundation::math::Transform;

/// One node of a described skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Node name
    pub name: String,
    /// Bind-pose local transform
    #[serde(default)]
    pub transform: Transform,
    /// Child nodes in order
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

/// A bone and its offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDescription {
    /// Bone name, matching a node name
    pub name: String,
    /// Mesh space to bone space at bind time
    #[serde(default)]
    pub offset: Transform,
}

/// One described clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescription {
    /// Clip name
    pub name: String,
    /// Tick rate, zero for the configured default
    #[serde(default)]
    pub ticks_per_second: f32,
    /// Length in ticks
    pub duration: f32,
    /// Per-node channels
    #[serde(default)]
    pub channels: Vec<NodeChannel>,
}

/// Contents of a mesh file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshDescription {
    /// Rigid mesh
    Static {
        /// Local-space bounds
        bounds: Aabb,
    },
    /// Skinned mesh
    Skeletal {
        /// Local-space bounds at bind pose
        bounds: Aabb,
        /// Root of the node tree
        root: NodeDescription,
        /// Deforming bones in palette order
        bones: Vec<BoneDescription>,
        /// Clips in import order
        #[serde(default)]
        clips: Vec<ClipDescription>,
    },
}

impl MeshDescription {
    /// Build a static mesh, failing for skinned descriptions
    pub fn into_static(self, name: &str) -> Result<StaticMesh, AssetError> {
        match self {
            Self::Static { bounds } => Ok(StaticMesh::new(name, bounds)),
            Self::Skeletal { .. } => Err(AssetError::WrongKind {
                name: name.to_string(),
                expected: "static",
            }),
        }
    }

    /// Build a skinned mesh, failing for static descriptions.
    ///
    /// Clips declaring zero ticks per second get `default_ticks_per_second`.
    /// The global inverse is the inverse of the root's bind pose.
    pub fn into_skeletal(
        self,
        name: &str,
        default_ticks_per_second: f32,
    ) -> Result<SkeletalMesh, AssetError> {
        let Self::Skeletal {
            bounds,
            root,
            bones,
            clips,
        } = self
        else {
            return Err(AssetError::WrongKind {
                name: name.to_string(),
                expected: "skeletal",
            });
        };

        let global_inverse = root
            .transform
            .to_matrix()
            .try_inverse()
            .ok_or_else(|| AssetError::Invalid {
                name: name.to_string(),
                reason: "root transform is not invertible".to_string(),
            })?;

        let mut nodes = Vec::new();
        flatten(root, &mut nodes);

        let bones = bones
            .into_iter()
            .map(|b| Bone {
                name: b.name,
                offset: b.offset.to_matrix(),
            })
            .collect();

        let skeleton = Skeleton::new(nodes, 0, bones, global_inverse)?;

        let clips = clips
            .into_iter()
            .map(|c| {
                let tps = if c.ticks_per_second == 0.0 {
                    default_ticks_per_second
                } else {
                    c.ticks_per_second
                };
                AnimationClip::new(c.name, tps, c.duration, c.channels)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SkeletalMesh::new(name, bounds, skeleton, clips))
    }
}

/// Flatten a node tree in pre-order; returns the index of `node`
fn flatten(node: NodeDescription, nodes: &mut Vec<SkeletonNode>) -> usize {
    let index = nodes.len();
    nodes.push(SkeletonNode {
        name: node.name,
        bind_pose: node.transform.to_matrix(),
        children: Vec::with_capacity(node.children.len()),
    });

    for child in node.children {
        let child_index = flatten(child, nodes);
        nodes[index].children.push(child_index);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    const ARM: &str = r#"
        Skeletal(
            bounds: (min: (-1.0, 0.0, -1.0), max: (1.0, 3.0, 1.0)),
            root: (
                name: "armature",
                children: [
                    (
                        name: "upper",
                        transform: (
                            position: (0.0, 1.0, 0.0),
                            rotation: (0.0, 0.0, 0.0, 1.0),
                            scale: (1.0, 1.0, 1.0),
                        ),
                        children: [(name: "lower")],
                    ),
                ],
            ),
            bones: [(name: "upper"), (name: "lower")],
            clips: [
                (
                    name: "wave",
                    duration: 20.0,
                    channels: [
                        (
                            node_name: "lower",
                            position_keys: [(time: 0.0, value: (0.0, 2.0, 0.0))],
                            rotation_keys: [(time: 0.0, value: (0.0, 0.0, 0.0, 1.0))],
                            scale_keys: [(time: 0.0, value: (1.0, 1.0, 1.0))],
                        ),
                    ],
                ),
            ],
        )
    "#;

    #[test]
    fn test_skeletal_description_from_ron() {
        let description: MeshDescription = ron::from_str(ARM).unwrap();
        let mesh = description.into_skeletal("arm", 30.0).unwrap();

        assert_eq!(mesh.bone_count(), 2);
        assert_eq!(mesh.skeleton().nodes().len(), 3);
        assert_eq!(mesh.skeleton().root().name, "armature");
        assert_eq!(mesh.clips()[0].ticks_per_second(), 30.0);

        let mut out = Vec::new();
        mesh.bone_transform(0.0, &mut out).unwrap();
        assert_relative_eq!(out[1].translation(), Vec3::new(0.0, 3.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let description: MeshDescription = ron::from_str(ARM).unwrap();
        assert!(matches!(
            description.into_static("arm"),
            Err(AssetError::WrongKind { expected: "static", .. })
        ));

        let rock = MeshDescription::Static { bounds: Aabb::default() };
        assert!(matches!(
            rock.into_skeletal("rock", 25.0),
            Err(AssetError::WrongKind { expected: "skeletal", .. })
        ));
    }
}
