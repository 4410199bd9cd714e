use super::{ParticleChange, ProposedKinematics, ReportCore, ReportKind};
use crate::error::{ConfigurationError, StepResult, TimeKind};
use crate::step::Step;
use crate::track::Track;
use crate::types::Position;
use glam::DVec3;

/// Report for decays: the decay time and the parent's polarization.
///
/// A cycle accepts time proposals in one clock only. Mixing a global and a
/// local proposal is rejected instead of letting the last one win.
#[derive(Debug, Default)]
pub struct DecayChange {
    core: ReportCore,
    time_kind: Option<TimeKind>,
    local_time: f64,
    baseline_local_time: f64,
    baseline_proper_time: f64,
    baseline_global_time: f64,
    polarization: DVec3,
    kinetic_energy: f64,
    mass: f64,
    position: Position,
}

impl DecayChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, track: &Track) {
        self.core.initialize(track);
        self.time_kind = None;
        self.local_time = track.time.local_time;
        self.baseline_local_time = track.time.local_time;
        self.baseline_proper_time = track.time.proper_time;
        self.baseline_global_time = track.time.global_time;
        self.polarization = track.kinematics.polarization;
        self.kinetic_energy = track.kinematics.kinetic_energy;
        self.mass = track.kinematics.mass;
        self.position = track.position;
    }

    fn claim_clock(&mut self, kind: TimeKind) -> StepResult<()> {
        match self.time_kind {
            Some(first) if first != kind => Err(ConfigurationError::ConflictingTimeProposal {
                first,
                second: kind,
            }
            .into()),
            _ => {
                self.time_kind = Some(kind);
                Ok(())
            }
        }
    }

    /// Propose the global decay time.
    ///
    /// Fails if a local time was already proposed this cycle.
    pub fn propose_global_time(&mut self, time: f64) -> StepResult<()> {
        self.core.assert_initialized();
        self.claim_clock(TimeKind::Global)?;
        self.local_time = self.baseline_local_time + (time - self.baseline_global_time);
        Ok(())
    }

    /// Propose the local decay time.
    ///
    /// Fails if a global time was already proposed this cycle.
    pub fn propose_local_time(&mut self, time: f64) -> StepResult<()> {
        self.core.assert_initialized();
        self.claim_clock(TimeKind::Local)?;
        self.local_time = time;
        Ok(())
    }

    pub fn proposed_global_time(&self) -> f64 {
        self.baseline_global_time + (self.local_time - self.baseline_local_time)
    }

    pub fn proposed_local_time(&self) -> f64 {
        self.local_time
    }

    pub fn propose_polarization(&mut self, polarization: DVec3) {
        self.core.assert_initialized();
        self.polarization = polarization;
    }

    pub fn proposed_polarization(&self) -> DVec3 {
        self.polarization
    }

    fn replace(&self, step: &mut Step) {
        let time = &mut step.post.time;
        time.local_time = self.local_time;
        time.global_time = self.proposed_global_time();
        // Decay times are sampled in the rest frame
        time.proper_time = self.baseline_proper_time + (self.local_time - self.baseline_local_time);
        step.post.kinematics.polarization = self.polarization;
    }
}

impl ParticleChange for DecayChange {
    fn kind(&self) -> ReportKind {
        ReportKind::Decay
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
        self.proposed_global_time()
    }

    fn proposed_kinematics(&self) -> ProposedKinematics {
        ProposedKinematics {
            kinetic_energy: self.kinetic_energy,
            mass: self.mass,
            mass_changed: false,
            direction: None,
            global_time: self.proposed_global_time(),
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
