//! Linear blend skinning on the CPU.

use crate::foundation::core::{FrameNumber, Mat4, Vec3};
use crate::foundation::error::{VatError, VatResult};
use crate::pose::PoseEvaluator;

/// Joints and weights driving one vertex.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JointInfluence {
    /// Joint indices into a frame's matrix palette.
    pub joints: Vec<u32>,
    /// Weight per joint; normalized at evaluation time.
    pub weights: Vec<f32>,
}

/// Evaluates poses by skinning object-space positions against per-frame joint palettes.
///
/// Each palette entry is a full skinning matrix (joint world transform times inverse bind). The
/// skinned position is then moved to world space with the object's `world` matrix.
#[derive(Clone, Debug)]
pub struct SkinnedPoseEvaluator {
    world: Mat4,
    positions: Vec<Vec3>,
    influences: Vec<JointInfluence>,
    first_frame: FrameNumber,
    palettes: Vec<Vec<Mat4>>,
}

impl SkinnedPoseEvaluator {
    /// Build an evaluator; `palettes[k]` is the joint palette of frame `first_frame + k`.
    pub fn new(
        world: Mat4,
        positions: Vec<Vec3>,
        influences: Vec<JointInfluence>,
        first_frame: FrameNumber,
        palettes: Vec<Vec<Mat4>>,
    ) -> VatResult<Self> {
        if influences.len() != positions.len() {
            return Err(VatError::validation(format!(
                "{} joint influences for {} vertices",
                influences.len(),
                positions.len()
            )));
        }
        if let Some((vertex, inf)) = influences
            .iter()
            .enumerate()
            .find(|(_, inf)| inf.joints.len() != inf.weights.len())
        {
            return Err(VatError::validation(format!(
                "vertex {vertex} has {} joints but {} weights",
                inf.joints.len(),
                inf.weights.len()
            )));
        }
        if first_frame.0 == 0 {
            return Err(VatError::validation("skinning frames are 1-based"));
        }
        Ok(Self {
            world,
            positions,
            influences,
            first_frame,
            palettes,
        })
    }

    fn palette(&self, frame: FrameNumber) -> VatResult<&[Mat4]> {
        frame
            .0
            .checked_sub(self.first_frame.0)
            .and_then(|k| usize::try_from(k).ok())
            .and_then(|k| self.palettes.get(k))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                VatError::evaluation(format!("no joint palette for frame {}", frame.0))
            })
    }
}

impl PoseEvaluator for SkinnedPoseEvaluator {
    fn evaluate(&mut self, frame: FrameNumber) -> VatResult<Vec<Vec3>> {
        let palette = self.palette(frame)?;
        self.positions
            .iter()
            .zip(&self.influences)
            .enumerate()
            .map(|(vertex, (&p, influence))| {
                let skinned = skin_vertex(p, influence, palette).map_err(|joint| {
                    VatError::evaluation(format!(
                        "vertex {vertex} references joint {joint}, frame {} palette has {}",
                        frame.0,
                        palette.len()
                    ))
                })?;
                Ok(self.world.transform_point3(skinned))
            })
            .collect()
    }
}

/// Blend `position` by its weighted joints. Unweighted vertices stay put.
///
/// Returns the offending joint index when it is outside `palette`.
pub fn skin_vertex(
    position: Vec3,
    influence: &JointInfluence,
    palette: &[Mat4],
) -> Result<Vec3, u32> {
    let total: f32 = influence.weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Ok(position);
    }

    let mut out = Vec3::ZERO;
    for (&joint, &weight) in influence.joints.iter().zip(&influence.weights) {
        if weight == 0.0 {
            continue;
        }
        let m = palette.get(joint as usize).ok_or(joint)?;
        out += m.transform_point3(position) * (weight / total);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/pose/skinning.rs"]
mod tests;
