//! Pose evaluation: where every vertex sits at a given frame.
//!
//! The sampler only needs one capability from the outside world, "give me the posed positions
//! of frame N". Evaluators take `&mut self` because real sources (a scene graph, an animation
//! player) mutate shared state to reach a frame; the sampler therefore never calls one from more
//! than one thread. [`PoseCache`] snapshots poses up front when frames should be encoded in
//! parallel.

pub mod skinning;

use crate::foundation::core::{DEFAULT_FIRST_FRAME, FrameNumber, FrameRange, Vec3};
use crate::foundation::error::{VatError, VatResult};

pub use skinning::{JointInfluence, SkinnedPoseEvaluator};

/// Source of posed vertex positions.
pub trait PoseEvaluator {
    /// World-space positions of every vertex at `frame`, in rest-pose vertex order.
    fn evaluate(&mut self, frame: FrameNumber) -> VatResult<Vec<Vec3>>;
}

impl<F> PoseEvaluator for F
where
    F: FnMut(FrameNumber) -> VatResult<Vec<Vec3>>,
{
    fn evaluate(&mut self, frame: FrameNumber) -> VatResult<Vec<Vec3>> {
        self(frame)
    }
}

/// Precomputed poses for a contiguous frame range.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseCache {
    first_frame: FrameNumber,
    frames: Vec<Vec<Vec3>>,
}

impl Default for PoseCache {
    fn default() -> Self {
        Self {
            first_frame: DEFAULT_FIRST_FRAME,
            frames: Vec::new(),
        }
    }
}

impl PoseCache {
    /// Cache `frames[k]` as the pose of frame `first_frame + k`.
    pub fn new(first_frame: FrameNumber, frames: Vec<Vec<Vec3>>) -> VatResult<Self> {
        if first_frame.0 == 0 {
            return Err(VatError::validation("pose cache frames are 1-based"));
        }
        if !frames.is_empty() && last_frame(first_frame, frames.len()).is_none() {
            return Err(VatError::validation(format!(
                "{} cached poses starting at frame {} overflow the frame counter",
                frames.len(),
                first_frame.0
            )));
        }
        Ok(Self {
            first_frame,
            frames,
        })
    }

    /// Evaluate every frame of `range` once, in ascending order, and keep the results.
    #[tracing::instrument(level = "debug", skip(evaluator))]
    pub fn snapshot(evaluator: &mut dyn PoseEvaluator, range: FrameRange) -> VatResult<Self> {
        range.validate()?;
        let frames = range
            .iter()
            .map(|frame| evaluator.evaluate(frame))
            .collect::<VatResult<Vec<_>>>()?;
        Self::new(range.start, frames)
    }

    /// Frames held by the cache, or `None` when empty.
    pub fn frame_range(&self) -> Option<FrameRange> {
        if self.frames.is_empty() {
            return None;
        }
        Some(FrameRange {
            start: self.first_frame,
            end: last_frame(self.first_frame, self.frames.len())?,
        })
    }

    /// Borrow the pose of `frame`.
    pub fn get(&self, frame: FrameNumber) -> Option<&[Vec3]> {
        let k = frame.0.checked_sub(self.first_frame.0)?;
        self.frames.get(usize::try_from(k).ok()?).map(Vec::as_slice)
    }
}

impl PoseEvaluator for PoseCache {
    fn evaluate(&mut self, frame: FrameNumber) -> VatResult<Vec<Vec3>> {
        match self.get(frame) {
            Some(pose) => Ok(pose.to_vec()),
            None => Err(VatError::evaluation(match self.frame_range() {
                Some(r) => format!(
                    "no cached pose for frame {} (cache holds {}..={})",
                    frame.0, r.start.0, r.end.0
                ),
                None => format!("no cached pose for frame {} (cache is empty)", frame.0),
            })),
        }
    }
}

/// Last frame of `count` consecutive frames starting at `first`, or `None` on overflow.
pub(crate) fn last_frame(first: FrameNumber, count: usize) -> Option<FrameNumber> {
    let span = (count as u64).checked_sub(1)?;
    first.0.checked_add(span).map(FrameNumber)
}

#[cfg(test)]
#[path = "../../tests/unit/pose/cache.rs"]
mod tests;
