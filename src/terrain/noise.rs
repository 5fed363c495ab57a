//! Seeded fractal gradient noise.

use ::noise::{NoiseFn, Perlin, Seedable};

use crate::core::NoiseConfig;

/// Sum of Perlin octaves, seeded once at construction.
///
/// `sample(x, z) = sum(persistence^i * perlin(lacunarity^i * x, lacunarity^i * z))`
/// for `i` in `0..octaves`.
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
}

impl NoiseField {
    pub fn new(config: &NoiseConfig) -> Self {
        Self {
            perlin: Perlin::new(config.seed),
            octaves: config.octaves.max(1),
            persistence: config.persistence,
            lacunarity: config.lacunarity,
        }
    }

    /// Fractal noise at a point in noise space.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for _ in 0..self.octaves {
            total += self.perlin.get([x * frequency, z * frequency]) * amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }
        total
    }

    /// Upper bound of `|sample|` assuming each octave stays within [-1, 1].
    pub fn amplitude_sum(&self) -> f64 {
        (0..self.octaves).map(|i| self.persistence.powi(i as i32)).sum()
    }

    pub fn seed(&self) -> u32 {
        self.perlin.seed()
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed())
            .field("octaves", &self.octaves)
            .field("persistence", &self.persistence)
            .field("lacunarity", &self.lacunarity)
            .finish()
    }
}
