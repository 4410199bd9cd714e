//! The per-worker tracking loop that drives the step protocol
//!
//! One `SteppingLoop` runs on one thread. It owns the reusable `Step`, the
//! physics effects (each owning its single change report) and the stack of
//! tracks still waiting to be processed.

use crate::config::SteppingConfig;
use crate::diagnostics::ValidationSummary;
use crate::error::StepResult;
use crate::report::ParticleChange;
use crate::step::Step;
use crate::synchronizer::{prepare_next_step, update_track};
use crate::track::Track;
use crate::types::{EffectId, StepStatus, TrackStatus};
use crate::validator::Validator;

/// A proposed limit on the length of the next step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepLimit {
    pub length: f64,
    /// Status recorded when this limit wins
    pub status: StepStatus,
}

/// A physics effect as seen by the tracking loop.
///
/// Each method that acts returns the effect's own change report, already
/// initialized and filled in, or `None` if the effect has nothing to propose.
pub trait PhysicsEffect {
    fn name(&self) -> &str;

    /// Continuous limit on the step, e.g. a geometry boundary or range cut
    fn along_step_limit(&mut self, _track: &Track) -> Option<StepLimit> {
        None
    }

    /// Distance to the next discrete interaction
    fn post_step_limit(&mut self, _track: &Track) -> Option<f64> {
        None
    }

    /// Time until the at-rest interaction of a stopped particle
    fn at_rest_lifetime(&mut self, _track: &Track) -> Option<f64> {
        None
    }

    /// Forced effects run their PostStep action on every step
    fn is_forced(&self) -> bool {
        false
    }

    fn along_step(&mut self, _track: &Track, _step: &Step) -> Option<&mut dyn ParticleChange> {
        None
    }

    fn post_step(&mut self, _track: &Track, _step: &Step) -> Option<&mut dyn ParticleChange> {
        None
    }

    fn at_rest(&mut self, _track: &Track, _step: &Step) -> Option<&mut dyn ParticleChange> {
        None
    }
}

/// Totals for one tracked event (a primary and all its descendants)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSummary {
    pub tracks: u32,
    pub steps: u64,
    pub total_energy_deposit: f64,
    pub secondaries: u64,
    /// Tracks that left the modeled region
    pub escaped: u32,
    /// Tracks killed for exceeding the step limit
    pub step_limited: u32,
}

pub struct SteppingLoop {
    config: SteppingConfig,
    effects: Vec<Box<dyn PhysicsEffect>>,
    step: Step,
    validator: Validator,
    stack: Vec<Track>,
    postponed: Vec<Track>,
    next_track_id: u32,
}

impl SteppingLoop {
    /// Build a loop; `effects` run AlongStep in the order given
    pub fn new(config: SteppingConfig, effects: Vec<Box<dyn PhysicsEffect>>) -> Self {
        Self {
            step: Step::with_secondary_capacity(config.secondary_reserve),
            validator: Validator::new(config.validation.clone()),
            config,
            effects,
            stack: Vec::new(),
            postponed: Vec::new(),
            next_track_id: 1,
        }
    }

    /// Track `primary` and every secondary it produces
    pub fn track_event(&mut self, mut primary: Track) -> StepResult<EventSummary> {
        let mut summary = EventSummary::default();
        self.next_track_id = 1;
        primary.track_id = self.allocate_track_id();
        self.stack.push(primary);

        while let Some(mut track) = self.stack.pop() {
            summary.tracks += 1;
            tracing::debug!(
                track_id = track.track_id,
                parent_id = track.parent_id,
                code = track.code,
                kinetic_energy = track.kinetic_energy(),
                "tracking"
            );
            if let Err(error) = self.track_one(&mut track, &mut summary) {
                tracing::error!(track_id = track.track_id, %error, "aborting event");
                self.stack.clear();
                return Err(error);
            }
            let stacked = self.stack_secondaries(&track, &mut summary);

            match track.status {
                TrackStatus::Suspend => {
                    // Resumed after the secondaries just stacked above it
                    track.status = TrackStatus::Alive;
                    let index = self.stack.len() - stacked;
                    self.stack.insert(index, track);
                }
                TrackStatus::PostponeToNextEvent => {
                    track.status = TrackStatus::Alive;
                    self.postponed.push(track);
                }
                _ => {}
            }
        }
        Ok(summary)
    }

    fn allocate_track_id(&mut self) -> u32 {
        let id = self.next_track_id;
        self.next_track_id += 1;
        id
    }

    fn track_one(&mut self, track: &mut Track, summary: &mut EventSummary) -> StepResult<()> {
        self.step.initialize(track);

        while track.is_alive() {
            if track.current_step_number >= self.config.max_steps_per_track {
                tracing::warn!(
                    track_id = track.track_id,
                    steps = track.current_step_number,
                    "step limit reached, killing track"
                );
                track.status = TrackStatus::StopAndKill;
                summary.step_limited += 1;
                break;
            }
            track.current_step_number += 1;
            track.volume = track.next_volume;

            if track.status == TrackStatus::StopButAlive {
                self.at_rest_step(track)?;
            } else {
                self.flight_step(track)?;
            }

            track.track_length += self.step.step_length;
            summary.steps += 1;
            summary.total_energy_deposit += self.step.total_energy_deposit;

            if track.next_volume.is_none() && !track.status.is_terminal() {
                track.status = TrackStatus::StopAndKill;
                summary.escaped += 1;
            }
            prepare_next_step(&mut self.step);
        }
        Ok(())
    }

    fn flight_step(&mut self, track: &mut Track) -> StepResult<()> {
        let mut length = f64::INFINITY;
        let mut status = StepStatus::Undefined;
        let mut defining = None;
        let mut discrete = None;

        for (index, effect) in self.effects.iter_mut().enumerate() {
            if let Some(limit) = effect.post_step_limit(track) {
                if limit < length {
                    length = limit;
                    status = StepStatus::PostStepDoIt;
                    defining = Some(index);
                    discrete = Some(index);
                }
            }
        }
        for (index, effect) in self.effects.iter_mut().enumerate() {
            if let Some(limit) = effect.along_step_limit(track) {
                if limit.length < length {
                    length = limit.length;
                    status = limit.status;
                    defining = Some(index);
                    discrete = None;
                }
            }
        }

        if !length.is_finite() {
            tracing::debug!(track_id = track.track_id, "no effect limits the step, killing track");
            track.status = TrackStatus::StopAndKill;
            self.step.step_length = 0.0;
            return Ok(());
        }

        let step = &mut self.step;
        step.step_length = length;
        step.define_step_status(status, defining.map(effect_id))?;
        tracing::trace!(
            track_id = track.track_id,
            length,
            %status,
            limited_by = defining.map(|i| self.effects[i].name()).unwrap_or("none"),
            "step defined"
        );

        for effect in self.effects.iter_mut() {
            if let Some(report) = effect.along_step(track, step) {
                self.validator.check_consistency(track, report)?;
                report.merge_along_step(step)?;
            }
        }
        update_track(track, step);

        for (index, effect) in self.effects.iter_mut().enumerate() {
            if discrete != Some(index) && !effect.is_forced() {
                continue;
            }
            if let Some(report) = effect.post_step(track, step) {
                self.validator.check_consistency(track, report)?;
                report.merge_post_step(step)?;
                update_track(track, step);
            }
        }
        Ok(())
    }

    fn at_rest_step(&mut self, track: &mut Track) -> StepResult<()> {
        let mut shortest = f64::INFINITY;
        let mut selected = None;
        for (index, effect) in self.effects.iter_mut().enumerate() {
            if let Some(lifetime) = effect.at_rest_lifetime(track) {
                if lifetime < shortest {
                    shortest = lifetime;
                    selected = Some(index);
                }
            }
        }

        let step = &mut self.step;
        step.step_length = 0.0;
        let Some(index) = selected else {
            track.status = TrackStatus::StopAndKill;
            return Ok(());
        };
        step.define_step_status(StepStatus::AtRestDoIt, Some(effect_id(index)))?;

        if let Some(report) = self.effects[index].at_rest(track, step) {
            self.validator.check_consistency(track, report)?;
            report.merge_at_rest(step)?;
            update_track(track, step);
        }
        if track.status == TrackStatus::StopButAlive {
            track.status = TrackStatus::StopAndKill;
        }
        Ok(())
    }

    /// Hand the step's secondaries to the stack; returns how many were stacked
    fn stack_secondaries(&mut self, parent: &Track, summary: &mut EventSummary) -> usize {
        let volume = parent.next_volume.or(parent.volume);
        let mut stacked = 0;
        for secondary in self.step.drain_secondaries() {
            summary.secondaries += 1;
            if parent.status == TrackStatus::KillTrackAndSecondaries {
                continue;
            }
            let id = self.next_track_id;
            self.next_track_id += 1;
            let mut child = Track::from_secondary(secondary, id, parent.track_id);
            child.volume = volume;
            child.next_volume = volume;
            self.stack.push(child);
            stacked += 1;
        }
        stacked
    }

    /// Tracks postponed to the next event, handed over once
    pub fn take_postponed(&mut self) -> Vec<Track> {
        std::mem::take(&mut self.postponed)
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn validation_summary(&self) -> &ValidationSummary {
        self.validator.summary()
    }

    /// Log the end-of-run validation summary and return it
    pub fn finish(&self) -> &ValidationSummary {
        let summary = self.validator.summary();
        if self.validator.is_enabled() {
            tracing::info!("validation summary: {}", summary);
        }
        summary
    }
}

fn effect_id(index: usize) -> EffectId {
    EffectId(index as u16)
}
