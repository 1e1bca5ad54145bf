//! Seeded starfield on a spherical shell.

/// Xorshift64 generator; deterministic so the sky is the same every run.
#[derive(Debug, Clone)]
pub(crate) struct Rng {
    state: u64,
}

impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub(crate) fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarfieldConfig {
    pub count: u32,
    /// Inner radius of the shell.
    pub radius: f32,
    /// Shell thickness beyond `radius`.
    pub depth: f32,
    pub seed: u64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 5000,
            radius: 100.0,
            depth: 50.0,
            seed: 0x5747_4152,
        }
    }
}

/// A star: world position and greyscale brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: [f32; 3],
    pub brightness: f32,
}

/// Directions are uniform on the sphere; radius is uniform through the shell.
pub fn starfield(config: &StarfieldConfig) -> Vec<Star> {
    let mut rng = Rng::new(config.seed);
    (0..config.count)
        .map(|_| {
            let z = rng.next_f32() * 2.0 - 1.0;
            let theta = rng.next_f32() * std::f32::consts::TAU;
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let r = config.radius + rng.next_f32() * config.depth;
            Star {
                position: [ring * theta.cos() * r, ring * theta.sin() * r, z * r],
                brightness: 0.4 + rng.next_f32() * 0.6,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_deterministic() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn rng_zero_seed_handled() {
        let mut rng = Rng::new(0);
        let v = rng.next_f32();
        assert!((0.0..1.0).contains(&v));
    }

    #[test]
    fn stars_lie_in_shell() {
        let config = StarfieldConfig::default();
        let stars = starfield(&config);
        assert_eq!(stars.len(), 5000);
        for s in &stars {
            let [x, y, z] = s.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!(r >= config.radius - 1e-2 && r <= config.radius + config.depth + 1e-2);
            assert!((0.4..=1.0).contains(&s.brightness));
        }
    }

    #[test]
    fn same_seed_same_sky() {
        let c = StarfieldConfig {
            count: 16,
            ..StarfieldConfig::default()
        };
        assert_eq!(starfield(&c), starfield(&c));
    }
}
