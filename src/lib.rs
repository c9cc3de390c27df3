//! vatex bakes skinned mesh animation into vertex animation textures.
//!
//! Every vertex gets a fixed texel column and row; every frame shifts that block to the right.
//! Each texel stores the vertex's displacement from its rest pose, packed into RGBA8 so a shader
//! can rebuild the posed mesh without CPU skinning:
//!
//! - Lay vertices out with [`assign_layout`]
//! - Encode displacements with [`DeltaEncoder`]
//! - Sample a frame range into a [`PixelBuffer`] with [`sample_frames`]
//! - Or run the whole pipeline from a [`MeshAnimation`] with [`bake`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// End-to-end bake pipeline and its configuration.
pub mod bake;
/// Displacement encoding.
pub mod codec;
/// PNG and layout manifest output.
pub mod export;
/// Vertex-to-texel layout.
pub mod layout;
/// Mesh animation input.
pub mod mesh;
/// Texture storage.
pub mod pixels;
/// Pose evaluation.
pub mod pose;
/// Frame sampling loop.
pub mod sampler;

pub use crate::foundation::core::{
    BACKGROUND_RGBA, DEFAULT_FIRST_FRAME, DEFAULT_LAST_FRAME, FrameNumber, FrameRange, Mat4,
    TEXTURE_SIZE, Vec3,
};
pub use crate::foundation::error::{TexelSite, VatError, VatResult};

pub use crate::bake::{BakeConfig, BakedAnimation, bake};
pub use crate::codec::{DeltaEncoder, EncodeMode, QuantizedColor, encode};
pub use crate::export::{LayoutManifest, write_layout_json, write_png};
pub use crate::layout::{TexelAddress, UvLayout, assign_layout, texel_address};
pub use crate::mesh::{Deformation, MeshAnimation};
pub use crate::pixels::PixelBuffer;
pub use crate::pose::{JointInfluence, PoseCache, PoseEvaluator, SkinnedPoseEvaluator};
pub use crate::sampler::{
    LogProgress, NoProgress, ProgressSink, SampleOpts, SampleStats, sample_frames,
};
