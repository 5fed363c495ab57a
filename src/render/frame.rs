//! Frame submission to an opaque render target.

use lit_surface::{CameraUniform, Light, LightUniform, MaterialSlots, ModelUniform};

use crate::scene::{NodeId, RenderJob};
use crate::util::{Mat4, Vec3};

/// Per-frame state shared by every draw.
#[derive(Clone, Debug)]
pub struct FrameUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub camera_position: Vec3,
    pub lights: Vec<Light>,
}

impl FrameUniforms {
    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform::new(self.projection, self.view, self.camera_position)
    }

    pub fn light_uniforms(&self) -> Vec<LightUniform> {
        self.lights.iter().map(Light::uniform).collect()
    }
}

/// Per-draw uniforms derived from a job and the frame's view matrix.
#[derive(Clone, Copy, Debug)]
pub struct DrawUniforms {
    /// Model, modelview and normal matrices
    pub transform: ModelUniform,
    /// Material slots actually bound (override or mesh materials)
    pub materials: MaterialSlots,
    pub use_vertex_color: bool,
}

impl DrawUniforms {
    pub fn new(job: &RenderJob, view: Mat4) -> Self {
        let mesh = job.renderable.mesh();
        Self {
            transform: ModelUniform::new(job.world_matrix, view),
            materials: MaterialSlots::from_materials(job.renderable.materials().iter().map(|m| &**m)),
            use_vertex_color: mesh.use_vertex_color(),
        }
    }
}

/// Whatever turns render jobs into pixels.
///
/// The scene core calls `begin_frame`, then `draw` for every opaque job
/// followed by every translucent job, then `end_frame`.
pub trait RenderJobConsumer {
    fn begin_frame(&mut self, frame: &FrameUniforms);
    fn draw(&mut self, job: &RenderJob, uniforms: &DrawUniforms);
    fn end_frame(&mut self) {}
}

/// Split jobs into (opaque, translucent), keeping order within each.
pub fn partition_jobs(jobs: Vec<RenderJob>) -> (Vec<RenderJob>, Vec<RenderJob>) {
    jobs.into_iter().partition(|job| !job.renderable.is_translucent())
}

/// Draw one frame: opaque jobs first, then translucent ones.
///
/// Returns the number of draws issued.
#[tracing::instrument(skip_all, fields(jobs = jobs.len()))]
pub fn submit_frame<C: RenderJobConsumer + ?Sized>(
    consumer: &mut C,
    frame: &FrameUniforms,
    jobs: Vec<RenderJob>,
) -> usize {
    let (opaque, translucent) = partition_jobs(jobs);
    consumer.begin_frame(frame);
    let mut draws = 0;
    for job in opaque.iter().chain(&translucent) {
        let uniforms = DrawUniforms::new(job, frame.view);
        consumer.draw(job, &uniforms);
        draws += 1;
    }
    consumer.end_frame();
    tracing::trace!(opaque = opaque.len(), translucent = translucent.len(), "frame submitted");
    draws
}

/// Summary of one recorded draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub node: NodeId,
    pub translucent: bool,
    pub vertices: usize,
    pub triangles: usize,
    pub world_position: Vec3,
}

/// Consumer that records what would have been drawn.
///
/// Used headless by the CLI and by tests.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: usize,
    pub draws: Vec<DrawRecord>,
    pub last_frame: Option<FrameUniforms>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangles(&self) -> usize {
        self.draws.iter().map(|d| d.triangles).sum()
    }
}

impl RenderJobConsumer for FrameRecorder {
    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.draws.clear();
        self.last_frame = Some(frame.clone());
    }

    fn draw(&mut self, job: &RenderJob, _uniforms: &DrawUniforms) {
        let mesh = job.renderable.mesh();
        self.draws.push(DrawRecord {
            node: job.node,
            translucent: job.renderable.is_translucent(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            world_position: job.world_matrix.w_axis.truncate(),
        });
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}
