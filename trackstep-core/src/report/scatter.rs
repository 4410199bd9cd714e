use super::{ParticleChange, ProposedKinematics, ReportCore, ReportKind};
use crate::error::StepResult;
use crate::step::Step;
use crate::track::Track;
use crate::types::{Direction, Position};

/// Report for multiple scattering: lateral displacement and deflection.
///
/// Initialized from the step's current post point, so it composes on top of
/// any effect already merged this step. Its AlongStep merge overwrites the
/// post position and direction.
#[derive(Debug, Default)]
pub struct ScatterChange {
    core: ReportCore,
    position: Position,
    direction: Direction,
    global_time: f64,
    kinetic_energy: f64,
    mass: f64,
}

impl ScatterChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, track: &Track, step: &Step) {
        self.core.initialize(track);
        self.position = step.post.position;
        self.direction = step.post.direction;
        self.global_time = step.post.time.global_time;
        // Energy is not this report's to change; balance it against the track
        self.kinetic_energy = track.kinematics.kinetic_energy;
        self.mass = track.kinematics.mass;
    }

    pub fn propose_position(&mut self, position: Position) {
        self.core.assert_initialized();
        self.position = position;
    }

    pub fn proposed_position(&self) -> Position {
        self.position
    }

    /// `direction` must be unit length
    pub fn propose_momentum_direction(&mut self, direction: Direction) {
        self.core.assert_initialized();
        self.direction = direction;
    }

    pub fn proposed_momentum_direction(&self) -> Direction {
        self.direction
    }
}

impl ParticleChange for ScatterChange {
    fn kind(&self) -> ReportKind {
        ReportKind::Scatter
    }

    fn core(&self) -> &ReportCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ReportCore {
        &mut self.core
    }

    fn final_position(&self) -> Position {
        self.position
    }

    fn final_global_time(&self) -> f64 {
        self.global_time
    }

    fn proposed_kinematics(&self) -> ProposedKinematics {
        ProposedKinematics {
            kinetic_energy: self.kinetic_energy,
            mass: self.mass,
            mass_changed: false,
            direction: Some(self.direction),
            global_time: self.global_time,
        }
    }

    fn apply_along_step(&mut self, step: &mut Step) -> StepResult<()> {
        step.post.position = self.position;
        step.post.direction = self.direction;
        Ok(())
    }
}
