//! Step and step-point data model
//!
//! A `Step` is created once per tracking loop and reused for every step of
//! every track. Its points are only written by the merge functions and the
//! synchronizer.

use crate::error::{ConfigurationError, StepResult};
use crate::secondary::SecondaryParticle;
use crate::track::Track;
use crate::types::{
    CutsCoupleHandle, DetectorHandle, Direction, EffectId, GeometryHandle, KinematicState,
    MaterialHandle, Position, StepStatus, Timebase, TrackStatus,
};
use glam::DVec3;
use std::vec::Drain;

/// Flag an effect can raise to alter how the rest of the step is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteppingControl {
    #[default]
    NormalCondition,
    /// Skip sensitive-detector hit processing for this step
    AvoidHitInvocation,
    Debug,
}

/// Snapshot of a particle at one end of a step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepPoint {
    pub position: Position,
    pub time: Timebase,
    pub kinematics: KinematicState,
    pub direction: Direction,
    /// mm/ns
    pub velocity: f64,
    pub weight: f64,
    pub geometry: Option<GeometryHandle>,
    pub material: Option<MaterialHandle>,
    pub cuts_couple: Option<CutsCoupleHandle>,
    pub sensitive_detector: Option<DetectorHandle>,
    /// Distance to the nearest boundary known to be free of geometry
    pub safety: f64,
    pub defining_effect: Option<EffectId>,
    pub step_status: StepStatus,
}

impl StepPoint {
    /// Snapshot of the track as it is now, located in the track's current volume
    pub fn from_track(track: &Track) -> Self {
        let mut point = StepPoint::default();
        point.load_track(track);
        point
    }

    /// Overwrite every field from `track` in place
    pub fn load_track(&mut self, track: &Track) {
        self.position = track.position;
        self.time = track.time;
        self.kinematics = track.kinematics;
        self.direction = track.direction;
        self.velocity = track.velocity;
        self.weight = track.weight;
        self.geometry = track.volume.map(|v| v.geometry);
        self.material = track.volume.map(|v| v.material);
        self.cuts_couple = track.volume.map(|v| v.cuts_couple);
        self.sensitive_detector = track.volume.and_then(|v| v.sensitive_detector);
        self.safety = 0.0;
        self.defining_effect = None;
        self.step_status = StepStatus::Undefined;
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.kinematics.kinetic_energy
    }

    pub fn total_energy(&self) -> f64 {
        self.kinematics.total_energy()
    }

    /// Momentum vector in MeV/c
    pub fn momentum(&self) -> DVec3 {
        self.direction * self.kinematics.momentum()
    }

    /// Recompute velocity from the current kinetic energy and mass
    pub fn refresh_velocity(&mut self) {
        self.velocity = self.kinematics.velocity();
    }
}

/// One interval of a track's trajectory
#[derive(Debug, Default)]
pub struct Step {
    pub pre: StepPoint,
    pub post: StepPoint,
    pub step_length: f64,
    pub total_energy_deposit: f64,
    /// Non-ionizing part of `total_energy_deposit`
    pub non_ionizing_energy_deposit: f64,
    /// Status proposals merged so far this step
    pub track_status: TrackStatus,
    pub control_flag: SteppingControl,
    pub first_step_in_volume: bool,
    pub last_step_in_volume: bool,
    /// Intermediate points of a curved trajectory, if the transport recorded any
    pub auxiliary_points: Vec<Position>,
    secondaries: Vec<SecondaryParticle>,
    secondaries_before_step: usize,
}

impl Step {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secondary_capacity(capacity: usize) -> Self {
        Self {
            secondaries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Start the step sequence of a new track.
    ///
    /// Both points are loaded from the track, accumulators are cleared and
    /// any secondaries left from a previous track are dropped.
    pub fn initialize(&mut self, track: &Track) {
        self.pre.load_track(track);
        self.post.load_track(track);
        self.step_length = 0.0;
        self.total_energy_deposit = 0.0;
        self.non_ionizing_energy_deposit = 0.0;
        self.track_status = track.status;
        self.control_flag = SteppingControl::NormalCondition;
        self.first_step_in_volume = true;
        self.last_step_in_volume = false;
        self.auxiliary_points.clear();
        self.secondaries.clear();
        self.secondaries_before_step = 0;
    }

    /// Record what limited this step.
    ///
    /// The post-point status may only leave `Undefined` once per step.
    pub fn define_step_status(
        &mut self,
        status: StepStatus,
        effect: Option<EffectId>,
    ) -> StepResult<()> {
        if self.post.step_status != StepStatus::Undefined {
            return Err(ConfigurationError::StepStatusAlreadyDefined {
                current: self.post.step_status,
                requested: status,
            }
            .into());
        }
        self.post.step_status = status;
        self.post.defining_effect = effect;
        Ok(())
    }

    /// Every secondary produced since the track started, oldest first
    pub fn secondaries(&self) -> &[SecondaryParticle] {
        &self.secondaries
    }

    /// Secondaries produced during the current step only
    pub fn secondaries_in_current_step(&self) -> &[SecondaryParticle] {
        &self.secondaries[self.secondaries_before_step.min(self.secondaries.len())..]
    }

    pub(crate) fn secondaries_mut(&mut self) -> &mut Vec<SecondaryParticle> {
        &mut self.secondaries
    }

    pub(crate) fn mark_step_boundary(&mut self) {
        self.secondaries_before_step = self.secondaries.len();
    }

    /// Hand every collected secondary to the caller, leaving the list empty
    pub fn drain_secondaries(&mut self) -> Drain<'_, SecondaryParticle> {
        self.secondaries_before_step = 0;
        self.secondaries.drain(..)
    }

    pub fn delta_position(&self) -> DVec3 {
        self.post.position - self.pre.position
    }

    pub fn delta_time(&self) -> f64 {
        self.post.time.local_time - self.pre.time.local_time
    }

    /// Change of kinetic energy over the step (negative for losses)
    pub fn delta_energy(&self) -> f64 {
        self.post.kinetic_energy() - self.pre.kinetic_energy()
    }

    pub fn delta_momentum(&self) -> DVec3 {
        self.post.momentum() - self.pre.momentum()
    }
}
