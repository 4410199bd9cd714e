//! Change reports: the final state a physics effect proposes for one step.
//!
//! There are exactly six report shapes, one per physics-effect category.
//! Each exposes only the proposals its category may make; the merge phases
//! are reached through the sealed [`ParticleChange`] trait.

/// Proposal accessors shared by the report shapes built on [`FullState`].
///
/// The target type needs `core: ReportCore`, `proposed: FullState`,
/// `baseline: FullState`, `baseline_global_time: f64` and
/// `velocity: Option<f64>` fields. An optional second argument names a
/// `bool` field that direction, momentum and polarization proposals set.
macro_rules! full_state_proposals {
    ($report:ty $(, $momentum_flag:ident)?) => {
        impl $report {
            pub fn propose_position(&mut self, position: $crate::types::Position) {
                self.core.assert_initialized();
                self.proposed.position = position;
            }

            pub fn proposed_position(&self) -> $crate::types::Position {
                self.proposed.position
            }

            /// `direction` must be unit length
            pub fn propose_momentum_direction(&mut self, direction: $crate::types::Direction) {
                self.core.assert_initialized();
                self.proposed.direction = direction;
                $(self.$momentum_flag = true;)?
            }

            pub fn proposed_momentum_direction(&self) -> $crate::types::Direction {
                self.proposed.direction
            }

            /// Set direction and kinetic energy from a momentum vector (MeV/c),
            /// using the currently proposed mass
            pub fn propose_momentum(&mut self, momentum: glam::DVec3) {
                self.core.assert_initialized();
                let p = momentum.length();
                let m = self.proposed.mass;
                self.proposed.direction = momentum.normalize_or_zero();
                self.proposed.kinetic_energy = (p * p + m * m).sqrt() - m;
                $(self.$momentum_flag = true;)?
            }

            pub fn proposed_momentum(&self) -> glam::DVec3 {
                self.proposed.direction
                    * $crate::units::momentum(self.proposed.kinetic_energy, self.proposed.mass)
            }

            pub fn propose_kinetic_energy(&mut self, energy: f64) {
                self.core.assert_initialized();
                self.proposed.kinetic_energy = energy;
            }

            pub fn proposed_kinetic_energy(&self) -> f64 {
                self.proposed.kinetic_energy
            }

            /// Explicit velocity; otherwise it is derived from energy and mass
            pub fn propose_velocity(&mut self, velocity: f64) {
                self.core.assert_initialized();
                self.velocity = Some(velocity);
            }

            pub fn proposed_velocity(&self) -> Option<f64> {
                self.velocity
            }

            pub fn propose_global_time(&mut self, time: f64) {
                self.core.assert_initialized();
                self.proposed.local_time = self.baseline.local_time + (time - self.baseline_global_time);
            }

            pub fn proposed_global_time(&self) -> f64 {
                self.baseline_global_time + (self.proposed.local_time - self.baseline.local_time)
            }

            pub fn propose_local_time(&mut self, time: f64) {
                self.core.assert_initialized();
                self.proposed.local_time = time;
            }

            pub fn proposed_local_time(&self) -> f64 {
                self.proposed.local_time
            }

            pub fn propose_proper_time(&mut self, time: f64) {
                self.core.assert_initialized();
                self.proposed.proper_time = time;
            }

            pub fn proposed_proper_time(&self) -> f64 {
                self.proposed.proper_time
            }

            pub fn propose_mass(&mut self, mass: f64) {
                self.core.assert_initialized();
                self.proposed.mass = mass;
            }

            pub fn proposed_mass(&self) -> f64 {
                self.proposed.mass
            }

            pub fn propose_charge(&mut self, charge: f64) {
                self.core.assert_initialized();
                self.proposed.charge = charge;
            }

            pub fn proposed_charge(&self) -> f64 {
                self.proposed.charge
            }

            pub fn propose_magnetic_moment(&mut self, moment: f64) {
                self.core.assert_initialized();
                self.proposed.magnetic_moment = moment;
            }

            pub fn proposed_magnetic_moment(&self) -> f64 {
                self.proposed.magnetic_moment
            }

            pub fn propose_polarization(&mut self, polarization: glam::DVec3) {
                self.core.assert_initialized();
                self.proposed.polarization = polarization;
                $(self.$momentum_flag = true;)?
            }

            pub fn proposed_polarization(&self) -> glam::DVec3 {
                self.proposed.polarization
            }
        }
    };
}

pub(crate) use full_state_proposals;

mod decay;
mod gamma;
mod general;
mod loss;
mod scatter;
mod transport;

pub use decay::DecayChange;
pub use gamma::GammaChange;
pub use general::GeneralChange;
pub use loss::LossChange;
pub use scatter::ScatterChange;
pub use transport::TransportChange;

use crate::error::{ConfigurationError, StepResult};
use crate::secondary::{SecondaryBuffer, SecondaryParticle};
use crate::step::{SteppingControl, Step};
use crate::track::Track;
use crate::types::{Direction, Position, TrackStatus};
use glam::DVec3;
use std::fmt;

/// The six report shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    General,
    Gamma,
    ContinuousLoss,
    Decay,
    Scatter,
    Transport,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportKind::General => "General",
            ReportKind::Gamma => "Gamma",
            ReportKind::ContinuousLoss => "ContinuousLoss",
            ReportKind::Decay => "Decay",
            ReportKind::Scatter => "Scatter",
            ReportKind::Transport => "Transport",
        };
        f.write_str(s)
    }
}

/// When during a step an effect acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergePhase {
    AtRest,
    AlongStep,
    PostStep,
}

impl fmt::Display for MergePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MergePhase::AtRest => "AtRest",
            MergePhase::AlongStep => "AlongStep",
            MergePhase::PostStep => "PostStep",
        };
        f.write_str(s)
    }
}

pub(crate) fn unsupported(kind: ReportKind, phase: MergePhase) -> StepResult<()> {
    Err(ConfigurationError::UnsupportedPhase { kind, phase }.into())
}

/// The primary's proposed final state, as seen by the validator.
///
/// Fields a report cannot change carry the track's current values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProposedKinematics {
    pub kinetic_energy: f64,
    pub mass: f64,
    pub mass_changed: bool,
    /// Present only when the report exposes a direction
    pub direction: Option<Direction>,
    pub global_time: f64,
}

/// Proposals every report shape carries
#[derive(Debug)]
pub struct ReportCore {
    status: TrackStatus,
    local_energy_deposit: f64,
    non_ionizing_energy_deposit: f64,
    parent_weight: f64,
    secondary_weight_by_effect: bool,
    stepping_control: SteppingControl,
    first_step_in_volume: Option<bool>,
    last_step_in_volume: Option<bool>,
    secondaries: SecondaryBuffer,
    initialized: bool,
}

impl Default for ReportCore {
    fn default() -> Self {
        Self {
            status: TrackStatus::Alive,
            local_energy_deposit: 0.0,
            non_ionizing_energy_deposit: 0.0,
            parent_weight: 1.0,
            secondary_weight_by_effect: false,
            stepping_control: SteppingControl::NormalCondition,
            first_step_in_volume: None,
            last_step_in_volume: None,
            secondaries: SecondaryBuffer::new(),
            initialized: false,
        }
    }
}

impl ReportCore {
    /// Reset to the baseline of a fresh step cycle for `track`
    pub(crate) fn initialize(&mut self, track: &Track) {
        self.status = TrackStatus::Alive;
        self.local_energy_deposit = 0.0;
        self.non_ionizing_energy_deposit = 0.0;
        self.parent_weight = track.weight;
        self.stepping_control = SteppingControl::NormalCondition;
        self.first_step_in_volume = None;
        self.last_step_in_volume = None;
        self.secondaries.clear();
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn assert_initialized(&self) {
        debug_assert!(
            self.initialized,
            "change report proposal made before initialize"
        );
    }

    pub fn propose_track_status(&mut self, status: TrackStatus) {
        self.assert_initialized();
        self.status = status;
    }

    pub fn track_status(&self) -> TrackStatus {
        self.status
    }

    /// Energy deposited locally by this effect in this step (MeV)
    pub fn propose_local_energy_deposit(&mut self, energy: f64) {
        self.assert_initialized();
        self.local_energy_deposit = energy;
    }

    pub fn local_energy_deposit(&self) -> f64 {
        self.local_energy_deposit
    }

    /// Non-ionizing share of the local deposit
    pub fn propose_non_ionizing_energy_deposit(&mut self, energy: f64) {
        self.assert_initialized();
        self.non_ionizing_energy_deposit = energy;
    }

    pub fn non_ionizing_energy_deposit(&self) -> f64 {
        self.non_ionizing_energy_deposit
    }

    pub fn propose_parent_weight(&mut self, weight: f64) {
        self.assert_initialized();
        self.parent_weight = weight;
    }

    pub fn parent_weight(&self) -> f64 {
        self.parent_weight
    }

    /// When set, secondaries keep the weight the effect gave them instead
    /// of inheriting the parent's proposed weight
    pub fn set_secondary_weight_by_effect(&mut self, enabled: bool) {
        self.secondary_weight_by_effect = enabled;
    }

    pub fn propose_stepping_control(&mut self, control: SteppingControl) {
        self.assert_initialized();
        self.stepping_control = control;
    }

    pub fn stepping_control(&self) -> SteppingControl {
        self.stepping_control
    }

    pub fn propose_first_step_in_volume(&mut self, first: bool) {
        self.assert_initialized();
        self.first_step_in_volume = Some(first);
    }

    pub fn propose_last_step_in_volume(&mut self, last: bool) {
        self.assert_initialized();
        self.last_step_in_volume = Some(last);
    }

    /// Reserve room for secondaries this cycle is about to add
    pub fn reserve_secondaries(&mut self, additional: usize) {
        self.secondaries.reserve(additional);
    }

    pub fn number_of_secondaries(&self) -> usize {
        self.secondaries.len()
    }

    pub fn secondaries(&self) -> impl Iterator<Item = &SecondaryParticle> {
        self.secondaries.iter()
    }

    pub(crate) fn push_secondary(
        &mut self,
        mut particle: SecondaryParticle,
        position: Position,
        time: f64,
    ) {
        self.assert_initialized();
        particle.position = position;
        particle.time = time;
        if !self.secondary_weight_by_effect || particle.weight.is_none() {
            particle.weight = Some(self.parent_weight);
        }
        self.secondaries.push(particle);
    }

    /// Fold the common proposals into `step` and hand over the secondaries.
    ///
    /// Returns the number of secondaries moved.
    pub(crate) fn commit(&mut self, step: &mut Step, phase: MergePhase) -> usize {
        step.total_energy_deposit += self.local_energy_deposit;
        step.non_ionizing_energy_deposit += self.non_ionizing_energy_deposit;
        step.track_status = step.track_status.combine(self.status);

        match phase {
            MergePhase::AlongStep => {
                if step.pre.weight > 0.0 {
                    step.post.weight *= self.parent_weight / step.pre.weight;
                }
            }
            MergePhase::AtRest | MergePhase::PostStep => step.post.weight = self.parent_weight,
        }

        if self.stepping_control != SteppingControl::NormalCondition {
            step.control_flag = self.stepping_control;
        }
        if let Some(first) = self.first_step_in_volume {
            step.first_step_in_volume = first;
        }
        if let Some(last) = self.last_step_in_volume {
            step.last_step_in_volume = last;
        }

        let moved = self.secondaries.drain_into(step.secondaries_mut());
        self.initialized = false;
        moved
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::GeneralChange {}
    impl Sealed for super::GammaChange {}
    impl Sealed for super::LossChange {}
    impl Sealed for super::DecayChange {}
    impl Sealed for super::ScatterChange {}
    impl Sealed for super::TransportChange {}
}

/// Common interface of the six change reports.
///
/// The trait is sealed: the set of report shapes is closed.
pub trait ParticleChange: sealed::Sealed + fmt::Debug {
    fn kind(&self) -> ReportKind;

    fn core(&self) -> &ReportCore;

    fn core_mut(&mut self) -> &mut ReportCore;

    /// Position given to secondaries added without an explicit one
    fn final_position(&self) -> Position;

    /// Global time given to secondaries added without an explicit one
    fn final_global_time(&self) -> f64;

    fn proposed_kinematics(&self) -> ProposedKinematics;

    /// Write this report's fields into `step` for the AtRest phase
    fn apply_at_rest(&mut self, _step: &mut Step) -> StepResult<()> {
        unsupported(self.kind(), MergePhase::AtRest)
    }

    /// Write this report's fields into `step` for the AlongStep phase
    fn apply_along_step(&mut self, _step: &mut Step) -> StepResult<()> {
        unsupported(self.kind(), MergePhase::AlongStep)
    }

    /// Write this report's fields into `step` for the PostStep phase
    fn apply_post_step(&mut self, _step: &mut Step) -> StepResult<()> {
        unsupported(self.kind(), MergePhase::PostStep)
    }

    fn add_secondary(&mut self, particle: SecondaryParticle) {
        let position = self.final_position();
        let time = self.final_global_time();
        self.core_mut().push_secondary(particle, position, time);
    }

    fn add_secondary_at(&mut self, particle: SecondaryParticle, position: Position) {
        let time = self.final_global_time();
        self.core_mut().push_secondary(particle, position, time);
    }

    fn add_secondary_at_time(&mut self, particle: SecondaryParticle, position: Position, time: f64) {
        self.core_mut().push_secondary(particle, position, time);
    }

    fn propose_track_status(&mut self, status: TrackStatus) {
        self.core_mut().propose_track_status(status);
    }

    fn propose_local_energy_deposit(&mut self, energy: f64) {
        self.core_mut().propose_local_energy_deposit(energy);
    }

    fn merge_at_rest(&mut self, step: &mut Step) -> StepResult<()> {
        crate::merge::merge_at_rest(self, step)
    }

    fn merge_along_step(&mut self, step: &mut Step) -> StepResult<()> {
        crate::merge::merge_along_step(self, step)
    }

    fn merge_post_step(&mut self, step: &mut Step) -> StepResult<()> {
        crate::merge::merge_post_step(self, step)
    }
}

/// Every field of the primary that the General and Transport reports can propose
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct FullState {
    pub position: Position,
    pub direction: Direction,
    pub kinetic_energy: f64,
    pub local_time: f64,
    pub proper_time: f64,
    pub mass: f64,
    pub charge: f64,
    pub magnetic_moment: f64,
    pub polarization: DVec3,
}

impl FullState {
    pub fn from_track(track: &Track) -> Self {
        Self {
            position: track.position,
            direction: track.direction,
            kinetic_energy: track.kinematics.kinetic_energy,
            local_time: track.time.local_time,
            proper_time: track.time.proper_time,
            mass: track.kinematics.mass,
            charge: track.kinematics.charge,
            magnetic_moment: track.kinematics.magnetic_moment,
            polarization: track.kinematics.polarization,
        }
    }
}
