//! Local transforms of scene nodes.

use crate::util::{Mat4, Vec3};

/// Euler angles in radians: roll about Z, pitch about X, yaw about Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Rotation {
    pub const IDENTITY: Self = Self { roll: 0.0, pitch: 0.0, yaw: 0.0 };

    pub fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Roll-free rotation turning local +Z toward `direction`.
    ///
    /// Yaw stays within ±90°; pitch takes the rest. Zero directions give
    /// the identity.
    pub fn facing(direction: Vec3) -> Self {
        let d = direction.normalize_or_zero();
        if d == Vec3::ZERO {
            return Self::IDENTITY;
        }
        Self {
            roll: 0.0,
            pitch: (-d.y).atan2(d.z),
            yaw: d.x.clamp(-1.0, 1.0).asin(),
        }
    }

    /// `Rz(roll) * Rx(pitch) * Ry(yaw)`
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.roll)
            * Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
    }
}

/// Translation, rotation and per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Rotation,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Rotation::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local matrix `T * Rz(roll) * Rx(pitch) * Ry(yaw) * S`.
    pub fn local_matrix(&self) -> Mat4 {
        let mut result = Mat4::from_translation(self.translation);
        result = result * self.rotation.matrix();
        result = result * Mat4::from_scale(self.scale);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::vec3;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_translate_scale() {
        let t = Transform::from_translation(vec3(1.0, 2.0, 3.0)).with_scale(Vec3::splat(2.0));
        let m = t.local_matrix();
        assert_eq!(m.transform_point3(Vec3::ZERO), vec3(1.0, 2.0, 3.0));
        assert_eq!(m.transform_point3(Vec3::X), vec3(3.0, 2.0, 3.0));
    }

    #[test]
    fn test_rotation_axes() {
        let yaw = Transform::IDENTITY.with_rotation(Rotation::new(0.0, 0.0, FRAC_PI_2));
        assert!(approx(yaw.local_matrix().transform_point3(Vec3::Z), Vec3::X));

        let pitch = Transform::IDENTITY.with_rotation(Rotation::new(0.0, FRAC_PI_2, 0.0));
        assert!(approx(pitch.local_matrix().transform_point3(Vec3::Y), Vec3::Z));

        let roll = Transform::IDENTITY.with_rotation(Rotation::new(FRAC_PI_2, 0.0, 0.0));
        assert!(approx(roll.local_matrix().transform_point3(Vec3::X), Vec3::Y));
    }

    #[test]
    fn test_composition_order() {
        // Yaw is applied first, then pitch, then roll.
        let r = Rotation::new(FRAC_PI_2, FRAC_PI_2, FRAC_PI_2);
        let p = r.matrix().transform_point3(Vec3::Z);
        // Ry: Z -> X, Rx: X -> X, Rz: X -> Y
        assert!(approx(p, Vec3::Y));
    }

    #[test]
    fn test_facing() {
        for dir in [
            vec3(0.0, 0.0, 1.0),
            vec3(0.0, 0.0, -1.0),
            vec3(0.3, -0.4, -1.0),
            vec3(-2.0, 1.0, 0.5),
            vec3(0.0, -1.0, 0.0),
        ] {
            let r = Rotation::facing(dir);
            assert_eq!(r.roll, 0.0);
            let p = r.matrix().transform_vector3(Vec3::Z);
            assert!(approx(p, dir.normalize()), "{dir:?} -> {p:?}");
        }
        assert_eq!(Rotation::facing(Vec3::ZERO), Rotation::IDENTITY);
    }
}
