//! Ambient particles spawned around the pointer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::PointerState;

/// Alpha a new particle starts with.
pub const SPAWN_ALPHA: f64 = 0.8;

/// Minimum lifetime of a new particle, in frames.
pub const SPAWN_LIFE: f64 = 100.0;

/// Extra lifetime range above [`SPAWN_LIFE`].
pub const SPAWN_LIFE_RANGE: f64 = 50.0;

/// Full width of the spawn jitter box around the pointer.
pub const SPAWN_JITTER: f64 = 50.0;

/// Alpha lost per frame.
pub const ALPHA_DECAY: f64 = 0.01;

/// Upward drift per frame at intensity 1.
pub const RISE_SPEED: f64 = 0.5;

/// Tolerance below which alpha counts as spent.
pub const ALPHA_EPSILON: f64 = 1e-9;

/// Only particles brighter than this draw a trail.
pub const TRAIL_ALPHA_THRESHOLD: f64 = 0.3;

/// Number of trail samples below a particle.
pub const TRAIL_SAMPLES: u32 = 5;

/// A single ambient particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Opacity.
    pub alpha: f64,
    /// Frames left to live.
    pub life: f64,
}

impl Particle {
    /// Create a particle.
    #[must_use]
    pub fn new(x: f64, y: f64, alpha: f64, life: f64) -> Self {
        Self { x, y, alpha, life }
    }

    /// Age by one frame.
    pub fn age(&mut self, intensity: f64) {
        self.life -= 1.0;
        self.alpha -= ALPHA_DECAY;
        self.y -= RISE_SPEED * intensity;
    }

    /// Whether the particle should be retired.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.life <= 0.0 || self.alpha <= ALPHA_EPSILON
    }

    /// Whether the particle is bright enough to draw a trail.
    #[must_use]
    pub fn has_trail(&self) -> bool {
        self.alpha > TRAIL_ALPHA_THRESHOLD
    }

    /// Trail samples as `(y, radius, alpha)`, nearest first.
    pub fn trail(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        (0..TRAIL_SAMPLES).map(move |t| {
            let t = f64::from(t);
            let fraction = t / f64::from(TRAIL_SAMPLES);
            (
                self.y + t * 2.0,
                1.0 + t * 0.2,
                self.alpha * (1.0 - fraction) * 0.3,
            )
        })
    }
}

/// Outcome of one [`ParticleSystem::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Particles retired this frame.
    pub retired: usize,
    /// A particle was spawned this frame.
    pub spawned: bool,
}

/// Owns every live particle.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_particles: usize,
}

impl ParticleSystem {
    /// Create an empty system capped at `max_particles`.
    #[must_use]
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles.min(1024)),
            max_particles,
        }
    }

    /// Age, retire and maybe spawn: one frame of particle life.
    ///
    /// Spawn probability is `quality × 0.5`, gated on the cap.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pointer: PointerState,
        intensity: f64,
        quality: f64,
    ) -> StepReport {
        let retired = self.age(intensity);
        let spawned = self.try_spawn(rng, pointer, quality);
        StepReport { retired, spawned }
    }

    /// Age every particle and retire the spent ones. Returns the number retired.
    pub fn age(&mut self, intensity: f64) -> usize {
        let before = self.particles.len();
        for particle in &mut self.particles {
            particle.age(intensity);
        }
        self.particles.retain(|particle| !particle.is_spent());
        before - self.particles.len()
    }

    /// Spawn one particle near the pointer with probability `quality × 0.5`.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pointer: PointerState,
        quality: f64,
    ) -> bool {
        if self.particles.len() >= self.max_particles {
            return false;
        }
        let rate = quality * 0.5;
        if rng.gen::<f64>() >= rate {
            return false;
        }
        let particle = Particle::new(
            pointer.x + (rng.gen::<f64>() - 0.5) * SPAWN_JITTER,
            pointer.y + (rng.gen::<f64>() - 0.5) * SPAWN_JITTER,
            SPAWN_ALPHA,
            SPAWN_LIFE + rng.gen::<f64>() * SPAWN_LIFE_RANGE,
        );
        self.push(particle)
    }

    /// Add a particle if there is room.
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.max_particles {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Change the cap, dropping the oldest particles if over it.
    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.max_particles = max_particles;
        if self.particles.len() > max_particles {
            let excess = self.particles.len() - max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Live particles, oldest first.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particles are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// The cap.
    #[must_use]
    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Remove every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_alpha_runs_out_after_80_ticks() {
        let mut system = ParticleSystem::new(10);
        system.push(Particle::new(0.0, 0.0, 0.8, 100.0));
        for tick in 1..=79 {
            system.age(1.0);
            assert_eq!(system.len(), 1, "retired early at tick {tick}");
        }
        system.age(1.0);
        assert!(system.is_empty());
    }

    #[test]
    fn test_life_runs_out_after_100_ticks() {
        let mut system = ParticleSystem::new(10);
        system.push(Particle::new(0.0, 0.0, 2.0, 100.0));
        for _ in 0..99 {
            system.age(1.0);
        }
        assert_eq!(system.len(), 1);
        system.age(1.0);
        assert!(system.is_empty());
    }

    #[test]
    fn test_retirement_keeps_survivors_in_order() {
        let mut system = ParticleSystem::new(10);
        system.push(Particle::new(1.0, 0.0, 0.8, 1.0));
        system.push(Particle::new(2.0, 0.0, 0.8, 50.0));
        system.push(Particle::new(3.0, 0.0, 0.8, 1.0));
        system.push(Particle::new(4.0, 0.0, 0.8, 50.0));
        assert_eq!(system.age(1.0), 2);
        let xs: Vec<f64> = system.particles().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 4.0]);
    }

    #[test]
    fn test_particles_rise_with_intensity() {
        let mut system = ParticleSystem::new(1);
        system.push(Particle::new(0.0, 100.0, 0.8, 100.0));
        system.age(2.0);
        assert!((system.particles()[0].y - 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut system = ParticleSystem::new(3);
        for _ in 0..200 {
            system.try_spawn(&mut rng, PointerState::new(50.0, 50.0), 1.0);
        }
        assert_eq!(system.len(), 3);
    }

    #[test]
    fn test_spawn_jitter_and_initial_values() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut system = ParticleSystem::new(500);
        for _ in 0..500 {
            system.try_spawn(&mut rng, PointerState::new(300.0, 200.0), 1.0);
        }
        assert!(!system.is_empty());
        for p in system.particles() {
            assert!((p.x - 300.0).abs() <= 25.0);
            assert!((p.y - 200.0).abs() <= 25.0);
            assert!((p.alpha - SPAWN_ALPHA).abs() < f64::EPSILON);
            assert!((100.0..150.0).contains(&p.life));
        }
    }

    #[test]
    fn test_zero_quality_never_spawns() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut system = ParticleSystem::new(10);
        for _ in 0..100 {
            assert!(!system.try_spawn(&mut rng, PointerState::default(), 0.0));
        }
    }

    #[test]
    fn test_trail_samples() {
        let particle = Particle::new(0.0, 10.0, 0.5, 10.0);
        assert!(particle.has_trail());
        let trail: Vec<_> = particle.trail().collect();
        assert_eq!(trail.len(), 5);
        assert!((trail[0].2 - 0.15).abs() < 1e-12);
        assert!((trail[4].0 - 18.0).abs() < 1e-12);
        assert!((trail[4].1 - 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_shrinking_cap_drops_oldest() {
        let mut system = ParticleSystem::new(4);
        for x in 0..4 {
            system.push(Particle::new(f64::from(x), 0.0, 0.8, 100.0));
        }
        system.set_max_particles(2);
        let xs: Vec<f64> = system.particles().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0]);
    }
}
