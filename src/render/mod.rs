//! Render boundary: camera, uniforms and frame submission.
//!
//! Nothing here talks to a GPU. A render target implements
//! [`RenderJobConsumer`] and receives flattened jobs with their uniforms,
//! opaque geometry first.

mod camera;
mod frame;

pub use camera::FlyCamera;
pub use frame::{
    partition_jobs, submit_frame, DrawRecord, DrawUniforms, FrameRecorder, FrameUniforms,
    RenderJobConsumer,
};
