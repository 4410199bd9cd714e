use super::{full_state_proposals, FullState, ParticleChange, ProposedKinematics, ReportCore, ReportKind};
use crate::error::StepResult;
use crate::merge;
use crate::step::Step;
use crate::track::Track;
use crate::types::Position;

/// Report able to change every property of the primary.
///
/// Supports all three phases. AlongStep merges are delta merges relative to
/// the state captured by [`GeneralChange::initialize`].
#[derive(Debug, Default)]
pub struct GeneralChange {
    core: ReportCore,
    proposed: FullState,
    baseline: FullState,
    baseline_global_time: f64,
    velocity: Option<f64>,
}

full_state_proposals!(GeneralChange);

impl GeneralChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle: capture the track as baseline and clear all proposals
    pub fn initialize(&mut self, track: &Track) {
        self.core.initialize(track);
        self.baseline = FullState::from_track(track);
        self.proposed = self.baseline;
        self.baseline_global_time = track.time.global_time;
        self.velocity = None;
    }
}

impl ParticleChange for GeneralChange {
    fn kind(&self) -> ReportKind {
        ReportKind::General
    }

    fn core(&self) -> &ReportCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ReportCore {
        &mut self.core
    }

    fn final_position(&self) -> Position {
        self.proposed.position
    }

    fn final_global_time(&self) -> f64 {
        self.proposed_global_time()
    }

    fn proposed_kinematics(&self) -> ProposedKinematics {
        ProposedKinematics {
            kinetic_energy: self.proposed.kinetic_energy,
            mass: self.proposed.mass,
            mass_changed: self.proposed.mass != self.baseline.mass,
            direction: Some(self.proposed.direction),
            global_time: self.proposed_global_time(),
        }
    }

    fn apply_at_rest(&mut self, step: &mut Step) -> StepResult<()> {
        merge::replace_full_state(
            &mut step.post,
            &self.proposed,
            self.proposed_global_time(),
            self.velocity,
            true,
        );
        Ok(())
    }

    fn apply_along_step(&mut self, step: &mut Step) -> StepResult<()> {
        merge::accumulate_full_state(
            &mut step.post,
            &self.proposed,
            &self.baseline,
            self.velocity,
            true,
        );
        Ok(())
    }

    fn apply_post_step(&mut self, step: &mut Step) -> StepResult<()> {
        merge::replace_full_state(
            &mut step.post,
            &self.proposed,
            self.proposed_global_time(),
            self.velocity,
            true,
        );
        Ok(())
    }
}
