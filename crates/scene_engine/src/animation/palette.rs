//! Bone palette output buffer

use crate::foundation::math::Mat4;

/// Final bone matrices for one skinned mesh, in bone-index order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonePalette {
    matrices: Vec<Mat4>,
}

impl BonePalette {
    /// Empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Whether the palette holds no bones
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Matrices in bone-index order
    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Buffer the evaluator writes into
    pub fn matrices_mut(&mut self) -> &mut Vec<Mat4> {
        &mut self.matrices
    }

    /// Column-major arrays ready for a uniform or storage buffer
    pub fn to_gpu(&self) -> Vec<[[f32; 4]; 4]> {
        self.matrices.iter().map(|m| (*m).into()).collect()
    }

    /// Raw bytes of [`BonePalette::to_gpu`]
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_gpu()).to_vec()
    }
}
