use super::{ParticleChange, ProposedKinematics, ReportCore, ReportKind};
use crate::error::StepResult;
use crate::merge;
use crate::step::Step;
use crate::track::Track;
use crate::types::{Direction, Position};
use glam::DVec3;

/// Report for continuous energy loss and the discrete processes that share
/// its model (ionization, bremsstrahlung).
///
/// AlongStep writes kinetic energy and charge absolutely; only one
/// energy-loss effect is expected per step. Direction and polarization are
/// carried only after [`LossChange::initialize_for_post_step`] or an
/// explicit proposal.
#[derive(Debug, Default)]
pub struct LossChange {
    core: ReportCore,
    kinetic_energy: f64,
    charge: f64,
    direction: Option<Direction>,
    polarization: Option<DVec3>,
    mass: f64,
    position: Position,
    global_time: f64,
}

impl LossChange {
    pub fn new() -> Self {
        Self::default()
    }

    fn initialize_common(&mut self, track: &Track) {
        self.core.initialize(track);
        self.kinetic_energy = track.kinematics.kinetic_energy;
        self.charge = track.kinematics.charge;
        self.mass = track.kinematics.mass;
        self.position = track.position;
        self.global_time = track.time.global_time;
    }

    pub fn initialize_for_along_step(&mut self, track: &Track) {
        self.initialize_common(track);
        self.direction = None;
        self.polarization = None;
    }

    pub fn initialize_for_post_step(&mut self, track: &Track) {
        self.initialize_common(track);
        self.direction = Some(track.direction);
        self.polarization = Some(track.kinematics.polarization);
    }

    pub fn propose_kinetic_energy(&mut self, energy: f64) {
        self.core.assert_initialized();
        self.kinetic_energy = energy;
    }

    pub fn proposed_kinetic_energy(&self) -> f64 {
        self.kinetic_energy
    }

    /// Effective charge after the step, for ions changing charge state
    pub fn propose_charge(&mut self, charge: f64) {
        self.core.assert_initialized();
        self.charge = charge;
    }

    pub fn proposed_charge(&self) -> f64 {
        self.charge
    }

    /// `direction` must be unit length
    pub fn propose_momentum_direction(&mut self, direction: Direction) {
        self.core.assert_initialized();
        self.direction = Some(direction);
    }

    pub fn proposed_momentum_direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn propose_polarization(&mut self, polarization: DVec3) {
        self.core.assert_initialized();
        self.polarization = Some(polarization);
    }

    pub fn proposed_polarization(&self) -> Option<DVec3> {
        self.polarization
    }

    fn replace_energy_and_charge(&self, step: &mut Step) {
        merge::replace_kinetic_energy(&mut step.post, self.kinetic_energy);
        step.post.kinematics.charge = self.charge;
    }
}

impl ParticleChange for LossChange {
    fn kind(&self) -> ReportKind {
        ReportKind::ContinuousLoss
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
            direction: self.direction,
            global_time: self.global_time,
        }
    }

    fn apply_along_step(&mut self, step: &mut Step) -> StepResult<()> {
        self.replace_energy_and_charge(step);
        Ok(())
    }

    fn apply_post_step(&mut self, step: &mut Step) -> StepResult<()> {
        self.replace_energy_and_charge(step);
        if let Some(direction) = self.direction {
            step.post.direction = direction;
        }
        if let Some(polarization) = self.polarization {
            step.post.kinematics.polarization = polarization;
        }
        Ok(())
    }
}
