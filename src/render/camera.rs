//! Free-flying camera using dolly

use dolly::prelude::*;
use glam::{Mat4, Vec3};

/// Fly camera: a dolly rig (position + yaw/pitch) plus a separate roll.
///
/// Starts facing +Z, the direction terrain streams in.
pub struct FlyCamera {
    rig: CameraRig,
    /// Roll around the view axis in radians
    roll: f32,
    /// Vertical FOV in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3) -> Self {
        let rig = CameraRig::builder()
            .with(Position::new(mint::Point3 { x: position.x, y: position.y, z: position.z }))
            .with(YawPitch::new().yaw_degrees(180.0).pitch_degrees(0.0))
            .build();

        Self {
            rig,
            roll: 0.0,
            fov: 60.0,
            near: 0.125,
            far: 1024.0,
        }
    }

    fn sync(&mut self) {
        self.rig.update(0.0);
    }

    /// Move by a world-space offset.
    pub fn translate(&mut self, delta: Vec3) {
        let p = &mut self.rig.driver_mut::<Position>().position;
        p.x += delta.x;
        p.y += delta.y;
        p.z += delta.z;
        self.sync();
    }

    /// Move relative to the view: x right, y up, z forward.
    pub fn move_in_direction(&mut self, local: Vec3) {
        let t = &self.rig.final_transform;
        let right: Vec3 = t.right();
        let up: Vec3 = t.up();
        let forward: Vec3 = t.forward();
        self.translate(right * local.x + up * local.y + forward * local.z);
    }

    /// Jump to a world position keeping orientation.
    pub fn warp_to(&mut self, position: Vec3) {
        self.rig.driver_mut::<Position>().position =
            mint::Point3 { x: position.x, y: position.y, z: position.z };
        self.sync();
    }

    /// Turn left/right by `radians`.
    pub fn add_yaw(&mut self, radians: f32) {
        self.rig.driver_mut::<YawPitch>().rotate_yaw_pitch(radians.to_degrees(), 0.0);
        self.sync();
    }

    /// Look up/down by `radians`; clamped at straight up and down.
    pub fn add_pitch(&mut self, radians: f32) {
        self.rig.driver_mut::<YawPitch>().rotate_yaw_pitch(0.0, radians.to_degrees());
        self.sync();
    }

    pub fn add_roll(&mut self, radians: f32) {
        self.roll += radians;
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// (yaw, pitch) in degrees
    pub fn angles(&self) -> (f32, f32) {
        let yp = self.rig.driver::<YawPitch>();
        (yp.yaw_degrees, yp.pitch_degrees)
    }

    /// Get camera position
    pub fn position(&self) -> Vec3 {
        let p = self.rig.final_transform.position;
        Vec3::new(p.x, p.y, p.z)
    }

    pub fn forward(&self) -> Vec3 {
        self.rig.final_transform.forward()
    }

    /// View matrix with roll applied around the view axis.
    pub fn view_matrix(&self) -> Mat4 {
        let t = &self.rig.final_transform;
        let pos = Vec3::new(t.position.x, t.position.y, t.position.z);
        let fwd: Vec3 = t.forward();
        let up: Vec3 = t.up();
        Mat4::from_rotation_z(-self.roll) * Mat4::look_at_rh(pos, pos + fwd, up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl std::fmt::Debug for FlyCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (yaw, pitch) = self.angles();
        f.debug_struct("FlyCamera")
            .field("position", &self.position())
            .field("yaw", &yaw)
            .field("pitch", &pitch)
            .field("roll", &self.roll)
            .finish()
    }
}
