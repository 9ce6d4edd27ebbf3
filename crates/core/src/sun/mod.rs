use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::SunConfig;

/// Spherical coordinates with `phi` measured from +Y and `theta` around +Y
/// starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    pub fn to_vec3(&self) -> Vec3 {
        let ring = self.phi.sin() * self.radius;
        Vec3::new(
            ring * self.theta.sin(),
            self.phi.cos() * self.radius,
            ring * self.theta.cos(),
        )
    }
}

/// The light source shared by the earth and atmosphere shaders.
#[derive(Debug, Clone)]
pub struct Sun {
    spherical: Spherical,
    direction: Vec3,
    marker_distance: f32,
}

impl Sun {
    pub fn new(config: &SunConfig) -> Self {
        let spherical = Spherical::new(1.0, config.phi, config.theta);
        Self {
            spherical,
            direction: spherical.to_vec3(),
            marker_distance: config.marker_distance,
        }
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Where the debug marker mesh sits for the current direction.
    pub fn marker_position(&self) -> Vec3 {
        self.direction * self.marker_distance
    }

    pub fn set_phi(&mut self, phi: f32) {
        self.spherical.phi = phi;
    }

    pub fn set_theta(&mut self, theta: f32) {
        self.spherical.theta = theta;
    }

    /// Recomputes the direction from the spherical angles.
    pub fn update(&mut self) -> Vec3 {
        self.direction = self.spherical.to_vec3();
        self.direction
    }

    /// Sweeps the sun once around the earth every eight seconds of audio.
    pub fn sweep_theta(elapsed: f32) -> f32 {
        (elapsed.rem_euclid(SWEEP_PERIOD) / SWEEP_PERIOD) * TAU - PI
    }
}

const SWEEP_PERIOD: f32 = 8.0;

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn equator_with_zero_theta_points_along_z() {
        let v = Spherical::new(1.0, PI * 0.5, 0.0).to_vec3();
        assert!(close(v, Vec3::Z));
    }

    #[test]
    fn pole_points_up() {
        let v = Spherical::new(2.0, 0.0, 1.3).to_vec3();
        assert!(close(v, Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn sweep_wraps_every_eight_seconds() {
        assert!((Sun::sweep_theta(8.0) + PI).abs() < 1e-5);
        assert!((Sun::sweep_theta(12.0) - 0.0).abs() < 1e-5);
        assert!((Sun::sweep_theta(10.0) - (-PI * 0.5)).abs() < 1e-5);
    }

    #[test]
    fn marker_follows_direction() {
        let mut sun = Sun::new(&SunConfig::default());
        sun.set_theta(0.0);
        sun.update();
        assert!(close(sun.marker_position(), Vec3::new(0.0, 0.0, 5.0)));
    }
}
