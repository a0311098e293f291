//! Bone hierarchy and bone-transform evaluation
//!
//! The hierarchy holds every node of the imported model (bones and helper
//! nodes) with its bind-pose local transform. Only nodes whose name appears in
//! the bone map produce a palette entry.

use std::collections::HashMap;

use super::clip::AnimationClip;
use super::AnimationError;
use crate::foundation::math::Mat4;

/// One node of the bone hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    /// Node name, matched against bone names and channel names
    pub name: String,
    /// Local transform used when no channel animates the node
    pub bind_pose: Mat4,
    /// Indices of child nodes
    pub children: Vec<usize>,
}

/// A deforming bone
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Mesh space to bone space at bind time
    pub offset: Mat4,
}

/// Immutable bone hierarchy with its bone map
#[derive(Debug, Clone)]
pub struct Skeleton {
    nodes: Vec<SkeletonNode>,
    root: usize,
    bones: Vec<Bone>,
    bone_map: HashMap<String, usize>,
    global_inverse: Mat4,
}

impl Skeleton {
    /// Build and validate a skeleton.
    ///
    /// Every child index must be in range and every node must be reachable
    /// from the root exactly once. Duplicate bone names keep the first index.
    pub fn new(
        nodes: Vec<SkeletonNode>,
        root: usize,
        bones: Vec<Bone>,
        global_inverse: Mat4,
    ) -> Result<Self, AnimationError> {
        if root >= nodes.len() {
            return Err(AnimationError::MissingRoot);
        }

        let mut visited = vec![false; nodes.len()];
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if visited[index] {
                return Err(AnimationError::InvalidHierarchy(format!(
                    "node '{}' is reachable more than once",
                    nodes[index].name
                )));
            }
            visited[index] = true;

            for &child in &nodes[index].children {
                if child >= nodes.len() {
                    return Err(AnimationError::InvalidHierarchy(format!(
                        "node '{}' references child {child} of {}",
                        nodes[index].name,
                        nodes.len()
                    )));
                }
                stack.push(child);
            }
        }

        let mut bone_map = HashMap::with_capacity(bones.len());
        for (index, bone) in bones.iter().enumerate() {
            if bone_map.contains_key(&bone.name) {
                log::warn!("Duplicate bone '{}' ignored", bone.name);
            } else {
                bone_map.insert(bone.name.clone(), index);
            }
        }

        Ok(Self {
            nodes,
            root,
            bones,
            bone_map,
            global_inverse,
        })
    }

    /// Number of bones, which is the palette length
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Palette index of a bone
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_map.get(name).copied()
    }

    /// Bones in palette order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// All hierarchy nodes
    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    /// Root node
    pub fn root(&self) -> &SkeletonNode {
        &self.nodes[self.root]
    }

    /// Inverse of the root's model transform
    pub fn global_inverse(&self) -> &Mat4 {
        &self.global_inverse
    }

    /// Fill `out` with one final matrix per bone.
    ///
    /// `out` is resized to the bone count first. Bones the hierarchy never
    /// reaches keep the identity matrix. With no clip every node uses its
    /// bind pose.
    pub fn evaluate(&self, clip: Option<&AnimationClip>, tick: f32, out: &mut Vec<Mat4>) {
        out.clear();
        out.resize(self.bones.len(), Mat4::identity());
        self.read_node_hierarchy(clip, tick, self.root, &Mat4::identity(), out);
    }

    fn read_node_hierarchy(
        &self,
        clip: Option<&AnimationClip>,
        tick: f32,
        index: usize,
        parent: &Mat4,
        out: &mut [Mat4],
    ) {
        let node = &self.nodes[index];

        let local = clip
            .and_then(|c| c.channel(&node.name))
            .map_or(node.bind_pose, |channel| channel.local_transform(tick));
        let global = parent * local;

        if let Some(&bone) = self.bone_map.get(&node.name) {
            out[bone] = self.global_inverse * global * self.bones[bone].offset;
        }

        for &child in &node.children {
            self.read_node_hierarchy(clip, tick, child, &global, out);
        }
    }
}
