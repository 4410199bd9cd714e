//! Secondary particles and the per-report buffer that holds them until merge

use crate::registry::ParticleDefinition;
use crate::types::{Direction, KinematicState, Position};
use glam::DVec3;

/// A particle created by a physics effect during a step
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryParticle {
    /// Particle code, as used by the identity registry
    pub code: i32,
    pub kinematics: KinematicState,
    pub direction: Direction,
    pub position: Position,
    /// Global creation time (ns)
    pub time: f64,
    /// Statistical weight; `None` until the owning report assigns one
    pub weight: Option<f64>,
}

impl SecondaryParticle {
    /// A secondary with no creation point yet; the report fills position and time
    pub fn new(code: i32, kinematics: KinematicState, direction: Direction) -> Self {
        Self {
            code,
            kinematics,
            direction,
            position: DVec3::ZERO,
            time: 0.0,
            weight: None,
        }
    }

    /// Build a secondary from the static properties of a registered particle
    pub fn from_definition(
        definition: &ParticleDefinition,
        kinetic_energy: f64,
        direction: Direction,
    ) -> Self {
        Self::new(
            definition.code,
            KinematicState::new(kinetic_energy, definition.mass, definition.charge),
            direction,
        )
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Kinetic plus rest energy carried away from the parent
    pub fn total_energy(&self) -> f64 {
        self.kinematics.total_energy()
    }
}

/// Append-only list of secondaries owned by one change report.
///
/// The backing allocation survives `clear`, so a report reused across steps
/// does not reallocate once it has seen its largest multiplicity.
#[derive(Debug, Default)]
pub struct SecondaryBuffer {
    particles: Vec<SecondaryParticle>,
}

impl SecondaryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, particle: SecondaryParticle) {
        self.particles.push(particle);
    }

    pub fn reserve(&mut self, additional: usize) {
        self.particles.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SecondaryParticle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Move every buffered particle, in order, to the end of `target`.
    ///
    /// Returns the number of particles moved. The buffer is empty afterwards.
    pub fn drain_into(&mut self, target: &mut Vec<SecondaryParticle>) -> usize {
        let moved = self.particles.len();
        target.append(&mut self.particles);
        moved
    }
}
