//! Frame sampling: evaluate each frame's pose and encode every vertex into the texture.

use crate::codec::{DeltaEncoder, EncodeMode, QuantizedColor};
use crate::foundation::core::{FrameNumber, FrameRange, Vec3};
use crate::foundation::error::{TexelSite, VatError, VatResult};
use crate::layout::UvLayout;
use crate::pixels::PixelBuffer;
use crate::pose::PoseEvaluator;
use rayon::prelude::*;

/// Progress reporting contract for a sampling run.
///
/// `update` is called once per completed frame with the running count, in ascending frame order.
/// Returning an error from any method aborts the run.
pub trait ProgressSink {
    /// Called once before the first frame with the number of frames to sample.
    fn begin(&mut self, total: u64) -> VatResult<()>;
    /// Called after each completed frame.
    fn update(&mut self, done: u64) -> VatResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> VatResult<()>;
}

/// Progress sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn begin(&mut self, _total: u64) -> VatResult<()> {
        Ok(())
    }

    fn update(&mut self, _done: u64) -> VatResult<()> {
        Ok(())
    }

    fn end(&mut self) -> VatResult<()> {
        Ok(())
    }
}

/// Progress sink that emits `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress {
    total: u64,
}

impl ProgressSink for LogProgress {
    fn begin(&mut self, total: u64) -> VatResult<()> {
        self.total = total;
        tracing::info!(total, "sampling frames");
        Ok(())
    }

    fn update(&mut self, done: u64) -> VatResult<()> {
        tracing::info!(done, total = self.total, "frame done");
        Ok(())
    }

    fn end(&mut self) -> VatResult<()> {
        tracing::info!(total = self.total, "sampling finished");
        Ok(())
    }
}

/// Options controlling a sampling run.
#[derive(Clone, Debug, Default)]
pub struct SampleOpts {
    /// Integer-part overflow policy of the encoder.
    pub mode: EncodeMode,
    /// Encode frames on a rayon pool after snapshotting all poses.
    pub parallel: bool,
    /// Override the number of rayon worker threads (parallel mode only).
    pub threads: Option<usize>,
}

/// Sampling statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleStats {
    /// Frames sampled.
    pub frames: u64,
    /// Texels overwritten.
    pub texels_written: u64,
    /// Texels whose integer parts did not fit 2 bits (lenient mode).
    pub overflowed_texels: u64,
    /// Largest exponent level seen.
    pub max_exponent: u8,
}

/// Sample `frames` and write one texel per `(frame, vertex)` into `buffer`.
///
/// The first encoding failure (lowest frame, then lowest vertex) aborts the run; texels already
/// written stay in the buffer but the caller gets no stats. Parallel and sequential runs produce
/// identical buffers.
#[tracing::instrument(
    skip_all,
    fields(vertices = rest.len(), start = frames.start.0, end = frames.end.0, parallel = opts.parallel)
)]
pub fn sample_frames(
    rest: &[Vec3],
    frames: FrameRange,
    evaluator: &mut dyn PoseEvaluator,
    layout: &UvLayout,
    buffer: &mut PixelBuffer,
    progress: &mut dyn ProgressSink,
    opts: &SampleOpts,
) -> VatResult<SampleStats> {
    if rest.is_empty() {
        return Err(VatError::validation("rest pose has no vertices"));
    }
    if rest.len() != layout.vertex_count() {
        return Err(VatError::validation(format!(
            "layout covers {} vertices, rest pose has {}",
            layout.vertex_count(),
            rest.len()
        )));
    }
    if buffer.size() != layout.texture_size() {
        return Err(VatError::validation(format!(
            "pixel buffer is {}px, layout expects {}px",
            buffer.size(),
            layout.texture_size()
        )));
    }
    layout.check_frames(frames)?;

    let encoder = DeltaEncoder::new(opts.mode);
    let mut stats = SampleStats::default();
    progress.begin(frames.len_frames())?;

    if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        // A pose failure only surfaces after every earlier frame has been encoded and written.
        let mut poses = Vec::with_capacity(frames.len_frames() as usize);
        let mut pose_err = None;
        for frame in frames.iter() {
            match posed_positions(evaluator, frame, rest.len()) {
                Ok(posed) => poses.push((frame, posed)),
                Err(e) => {
                    pose_err = Some(e);
                    break;
                }
            }
        }

        let encoded: Vec<VatResult<Vec<QuantizedColor>>> = pool.install(|| {
            poses
                .par_iter()
                .map(|(frame, posed)| encode_frame(encoder, rest, posed, *frame))
                .collect()
        });

        for ((frame, _), colors) in poses.iter().zip(encoded) {
            write_frame(layout, buffer, *frame, &colors?, &mut stats)?;
            progress.update(stats.frames)?;
        }
        if let Some(e) = pose_err {
            return Err(e);
        }
    } else {
        for frame in frames.iter() {
            let posed = posed_positions(evaluator, frame, rest.len())?;
            let colors = encode_frame(encoder, rest, &posed, frame)?;
            write_frame(layout, buffer, frame, &colors, &mut stats)?;
            progress.update(stats.frames)?;
        }
    }

    progress.end()?;
    Ok(stats)
}

fn posed_positions(
    evaluator: &mut dyn PoseEvaluator,
    frame: FrameNumber,
    vertex_count: usize,
) -> VatResult<Vec<Vec3>> {
    let posed = evaluator.evaluate(frame)?;
    if posed.len() != vertex_count {
        return Err(VatError::validation(format!(
            "frame {} pose has {} vertices, rest pose has {vertex_count}",
            frame.0,
            posed.len()
        )));
    }
    Ok(posed)
}

fn encode_frame(
    encoder: DeltaEncoder,
    rest: &[Vec3],
    posed: &[Vec3],
    frame: FrameNumber,
) -> VatResult<Vec<QuantizedColor>> {
    rest.iter()
        .zip(posed)
        .enumerate()
        .map(|(vertex, (&r, &p))| {
            encoder
                .encode(r, p)
                .map_err(|e| e.at(TexelSite::new(frame, vertex)))
        })
        .collect()
}

fn write_frame(
    layout: &UvLayout,
    buffer: &mut PixelBuffer,
    frame: FrameNumber,
    colors: &[QuantizedColor],
    stats: &mut SampleStats,
) -> VatResult<()> {
    let mut overflowed = 0u64;
    for (vertex, color) in colors.iter().enumerate() {
        buffer.write(layout.address(frame, vertex), *color)?;
        if color.overflowed() {
            overflowed += 1;
        }
        stats.max_exponent = stats.max_exponent.max(color.exponent);
    }

    if overflowed > 0 {
        tracing::warn!(
            frame = frame.0,
            texels = overflowed,
            "integer parts overflowed their 2-bit fields"
        );
    }
    tracing::debug!(frame = frame.0, texels = colors.len(), "sampled frame");

    stats.frames += 1;
    stats.texels_written += colors.len() as u64;
    stats.overflowed_texels += overflowed;
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> VatResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(VatError::validation(
            "sample_frames 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| VatError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/sampler/frames.rs"]
mod tests;
