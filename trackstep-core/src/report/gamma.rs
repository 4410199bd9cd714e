use super::{ParticleChange, ProposedKinematics, ReportCore, ReportKind};
use crate::error::StepResult;
use crate::merge;
use crate::step::Step;
use crate::track::Track;
use crate::types::{Direction, Position};
use glam::DVec3;

/// Report for discrete electromagnetic interactions (photon and lepton
/// scattering, annihilation at rest): kinetic energy, direction and
/// polarization only.
#[derive(Debug, Default)]
pub struct GammaChange {
    core: ReportCore,
    kinetic_energy: f64,
    direction: Direction,
    polarization: DVec3,
    mass: f64,
    position: Position,
    global_time: f64,
}

impl GammaChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, track: &Track) {
        self.core.initialize(track);
        self.kinetic_energy = track.kinematics.kinetic_energy;
        self.direction = track.direction;
        self.polarization = track.kinematics.polarization;
        self.mass = track.kinematics.mass;
        self.position = track.position;
        self.global_time = track.time.global_time;
    }

    pub fn propose_kinetic_energy(&mut self, energy: f64) {
        self.core.assert_initialized();
        self.kinetic_energy = energy;
    }

    pub fn proposed_kinetic_energy(&self) -> f64 {
        self.kinetic_energy
    }

    /// `direction` must be unit length
    pub fn propose_momentum_direction(&mut self, direction: Direction) {
        self.core.assert_initialized();
        self.direction = direction;
    }

    pub fn proposed_momentum_direction(&self) -> Direction {
        self.direction
    }

    pub fn propose_polarization(&mut self, polarization: DVec3) {
        self.core.assert_initialized();
        self.polarization = polarization;
    }

    pub fn proposed_polarization(&self) -> DVec3 {
        self.polarization
    }

    fn replace(&self, step: &mut Step) {
        merge::replace_kinetic_energy(&mut step.post, self.kinetic_energy);
        step.post.direction = self.direction;
        step.post.kinematics.polarization = self.polarization;
    }
}

impl ParticleChange for GammaChange {
    fn kind(&self) -> ReportKind {
        ReportKind::Gamma
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

    fn apply_at_rest(&mut self, step: &mut Step) -> StepResult<()> {
        self.replace(step);
        Ok(())
    }

    fn apply_post_step(&mut self, step: &mut Step) -> StepResult<()> {
        self.replace(step);
        Ok(())
    }
}
