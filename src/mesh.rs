//! JSON-facing mesh animation input.
//!
//! A [`MeshAnimation`] carries everything the bake needs from a modelling tool: object-space rest
//! positions, the object's world matrix, optional face topology (for per-corner UVs) and the
//! deformation that moves the vertices over time.

use crate::foundation::core::{DEFAULT_FIRST_FRAME, FrameNumber, FrameRange, Mat4, Vec3};
use crate::foundation::error::{VatError, VatResult};
use crate::pose::{JointInfluence, PoseCache, PoseEvaluator, SkinnedPoseEvaluator, last_frame};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_world() -> Mat4 {
    Mat4::IDENTITY
}

fn default_first_frame() -> FrameNumber {
    DEFAULT_FIRST_FRAME
}

/// Mesh with the animation that deforms it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshAnimation {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Object-to-world transform, column-major.
    #[serde(default = "default_world")]
    pub world: Mat4,
    /// Object-space rest positions.
    pub positions: Vec<Vec3>,
    /// Faces as lists of vertex indices.
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
    /// What moves the vertices; required for baking.
    #[serde(default)]
    pub deform: Option<Deformation>,
}

/// Deformation source of a [`MeshAnimation`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Deformation {
    /// Object-space positions already evaluated per frame.
    Baked {
        /// Frame number of `frames[0]`.
        #[serde(default = "default_first_frame")]
        first_frame: FrameNumber,
        /// One position list per frame.
        frames: Vec<Vec<Vec3>>,
    },
    /// Linear blend skinning against per-frame joint palettes.
    Skinned {
        /// Joint influences per vertex.
        influences: Vec<JointInfluence>,
        /// Frame number of `joint_matrices[0]`.
        #[serde(default = "default_first_frame")]
        first_frame: FrameNumber,
        /// Skinning matrix palette per frame.
        joint_matrices: Vec<Vec<Mat4>>,
    },
}

impl Deformation {
    fn first_frame(&self) -> FrameNumber {
        match self {
            Self::Baked { first_frame, .. } | Self::Skinned { first_frame, .. } => *first_frame,
        }
    }

    fn frame_count(&self) -> usize {
        match self {
            Self::Baked { frames, .. } => frames.len(),
            Self::Skinned { joint_matrices, .. } => joint_matrices.len(),
        }
    }
}

impl MeshAnimation {
    /// Parse a mesh animation from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> VatResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| VatError::validation(format!("parse mesh animation JSON: {e}")))
    }

    /// Parse a mesh animation from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VatResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VatError::validation(format!("open mesh animation '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Frames the deformation can provide, if any.
    pub fn frame_range(&self) -> Option<FrameRange> {
        let deform = self.deform.as_ref()?;
        let start = deform.first_frame();
        Some(FrameRange {
            start,
            end: last_frame(start, deform.frame_count())?,
        })
    }

    /// World-space rest positions.
    pub fn rest_positions(&self) -> Vec<Vec3> {
        self.positions
            .iter()
            .map(|p| self.world.transform_point3(*p))
            .collect()
    }

    /// Check the mesh can be baked.
    pub fn validate(&self) -> VatResult<()> {
        if self.positions.is_empty() {
            return Err(VatError::validation("mesh has no vertices"));
        }
        if let Some(i) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(VatError::validation(format!(
                "vertex {i} has a non-finite position"
            )));
        }
        if !self.world.is_finite() {
            return Err(VatError::validation("world matrix is not finite"));
        }
        let n = self.positions.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(&v) = face.iter().find(|&&v| v as usize >= n) {
                return Err(VatError::validation(format!(
                    "face {face_idx} references vertex {v}, mesh has {n}"
                )));
            }
        }

        let Some(deform) = &self.deform else {
            return Err(VatError::validation(
                "mesh has no deformation; provide a skinned or baked animation",
            ));
        };
        if deform.first_frame().0 == 0 {
            return Err(VatError::validation("deformation frames are 1-based"));
        }
        if deform.frame_count() == 0 {
            return Err(VatError::validation("deformation has no frames"));
        }
        if last_frame(deform.first_frame(), deform.frame_count()).is_none() {
            return Err(VatError::validation(format!(
                "{} frames starting at frame {} overflow the frame counter",
                deform.frame_count(),
                deform.first_frame().0
            )));
        }

        match deform {
            Deformation::Baked { frames, .. } => {
                for (k, frame) in frames.iter().enumerate() {
                    if frame.len() != n {
                        return Err(VatError::validation(format!(
                            "baked frame {} has {} vertices, mesh has {n}",
                            deform.first_frame().0 + k as u64,
                            frame.len()
                        )));
                    }
                }
            }
            Deformation::Skinned {
                influences,
                joint_matrices,
                ..
            } => {
                if influences.len() != n {
                    return Err(VatError::validation(format!(
                        "{} joint influences for {n} vertices",
                        influences.len()
                    )));
                }
                let palette_len = joint_matrices.iter().map(Vec::len).min().unwrap_or(0);
                for (vertex, inf) in influences.iter().enumerate() {
                    if inf.joints.len() != inf.weights.len() {
                        return Err(VatError::validation(format!(
                            "vertex {vertex} has {} joints but {} weights",
                            inf.joints.len(),
                            inf.weights.len()
                        )));
                    }
                    if inf.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(VatError::validation(format!(
                            "vertex {vertex} has a negative or non-finite weight"
                        )));
                    }
                    if let Some(&j) = inf.joints.iter().find(|&&j| j as usize >= palette_len) {
                        return Err(VatError::validation(format!(
                            "vertex {vertex} references joint {j}, smallest palette has {palette_len}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the pose evaluator for this mesh's deformation.
    pub fn evaluator(&self) -> VatResult<Box<dyn PoseEvaluator>> {
        self.validate()?;
        match &self.deform {
            Some(Deformation::Baked {
                first_frame,
                frames,
            }) => {
                let world = self.world;
                let frames = frames
                    .iter()
                    .map(|f| f.iter().map(|p| world.transform_point3(*p)).collect())
                    .collect();
                Ok(Box::new(PoseCache::new(*first_frame, frames)?))
            }
            Some(Deformation::Skinned {
                influences,
                first_frame,
                joint_matrices,
            }) => Ok(Box::new(SkinnedPoseEvaluator::new(
                self.world,
                self.positions.clone(),
                influences.clone(),
                *first_frame,
                joint_matrices.clone(),
            )?)),
            None => Err(VatError::validation("mesh has no deformation")),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/mesh/model.rs"]
mod tests;
