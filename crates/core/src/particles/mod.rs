use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleConfig;

/// CPU-side position buffer for the floating particles.
///
/// Positions are stored flat (`x, y, z` per particle) so the buffer can be
/// uploaded as-is whenever [`ParticleField::take_update`] reports a change.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<f32>,
    needs_update: bool,
}

impl ParticleField {
    pub fn from_config(config: &ParticleConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::random(config.count, config.spread, &mut rng)
    }

    /// Scatters `count` particles uniformly inside a cube of side `spread`.
    /// Counts above [`ParticleConfig::MAX_COUNT`] are capped.
    pub fn random<R: Rng>(count: usize, spread: f32, rng: &mut R) -> Self {
        let count = count.min(ParticleConfig::MAX_COUNT);
        let positions = (0..count * 3)
            .map(|_| (rng.gen::<f32>() - 0.5) * spread)
            .collect();
        Self {
            positions,
            needs_update: true,
        }
    }

    pub fn from_positions(positions: Vec<f32>) -> Self {
        Self {
            positions,
            needs_update: true,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        let i3 = index.checked_mul(3)?;
        self.positions
            .get(i3..i3.checked_add(3)?)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Rides every particle on a sine wave keyed by its x coordinate.
    pub fn animate(&mut self, elapsed: f32) {
        for particle in self.positions.chunks_exact_mut(3) {
            particle[1] = (elapsed + particle[0]).sin();
        }
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Clears the dirty flag, returning whether an upload was pending.
    pub fn take_update(&mut self) -> bool {
        std::mem::replace(&mut self.needs_update, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_fields_are_reproducible_and_bounded() {
        let config = ParticleConfig {
            count: 64,
            spread: 10.0,
            seed: Some(42),
        };
        let a = ParticleField::from_config(&config);
        let b = ParticleField::from_config(&config);
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.len(), 64);
        assert!(a.positions().iter().all(|v| (-5.0..5.0).contains(v)));
    }

    #[test]
    fn animate_writes_sine_of_x_into_y() {
        let mut field = ParticleField::from_positions(vec![0.0, 9.0, 1.0, 1.5, -3.0, 2.0]);
        field.take_update();
        field.animate(2.0);

        assert!(field.needs_update());
        let first = field.position(0).unwrap();
        let second = field.position(1).unwrap();
        assert!((first[1] - 2.0_f32.sin()).abs() < 1e-6);
        assert!((second[1] - 3.5_f32.sin()).abs() < 1e-6);
        assert_eq!(first[0], 0.0);
        assert_eq!(second[2], 2.0);
    }

    #[test]
    fn out_of_range_indices_are_none() {
        let field = ParticleField::from_positions(vec![1.0, 2.0, 3.0]);
        assert_eq!(field.position(0), Some([1.0, 2.0, 3.0]));
        assert_eq!(field.position(1), None);
        assert_eq!(field.position(usize::MAX), None);
        assert_eq!(field.position(usize::MAX / 3), None);
    }

    #[test]
    fn random_caps_huge_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = ParticleField::random(usize::MAX, 1.0, &mut rng);
        assert_eq!(field.len(), ParticleConfig::MAX_COUNT);
    }

    #[test]
    fn take_update_clears_the_flag() {
        let mut field = ParticleField::from_positions(vec![0.0; 3]);
        assert!(field.take_update());
        assert!(!field.take_update());
    }
}
