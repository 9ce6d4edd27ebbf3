//! Perspective camera and damped orbit controls.
//!
//! Y-up, right-handed, OpenGL-style clip space.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;
use crate::sun::Spherical;

const POLAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::ZERO,
            fov: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Orbit controls without a pointer: rotation requests accumulate and are
/// eased in over subsequent updates when damping is on.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pending_azimuth: f32,
    pending_polar: f32,
}

impl OrbitControls {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.pending_azimuth -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.pending_polar -= angle;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_azimuth.abs() < f32::EPSILON && self.pending_polar.abs() < f32::EPSILON
    }

    /// Moves the camera by the due share of pending rotation. Returns whether
    /// the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if self.is_settled() {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            return false;
        }

        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }
        let theta = offset.x.atan2(offset.z);
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        let theta = theta + self.pending_azimuth * share;
        let phi = (phi + self.pending_polar * share).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        camera.position = self.target + Spherical::new(radius, phi, theta).to_vec3();
        camera.target = self.target;

        if self.enable_damping {
            self.pending_azimuth *= 1.0 - self.damping_factor;
            self.pending_polar *= 1.0 - self.damping_factor;
        } else {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
        }
        true
    }
}
