//! Debug-time consistency checks of change reports
//!
//! Negative energies, negative masses and non-unit directions can only come
//! from a broken physics effect and abort the run. Energy imbalance and
//! time reversal may be rounding in a complex final state; they are counted
//! and the run continues.

use crate::config::ValidationConfig;
use crate::diagnostics::{ValidationSummary, ValidationWarning, WarningKind};
use crate::error::{KinematicDefect, StepResult};
use crate::report::ParticleChange;
use crate::track::Track;
use crate::types::Direction;

/// Energy entering minus energy leaving, for `report` applied to `track` (MeV).
///
/// A primary killed while producing secondaries (a decay, an annihilation)
/// hands all of its energy to them. Otherwise its kinetic and rest energy
/// stay on the outgoing side.
pub fn energy_balance(track: &Track, report: &dyn ParticleChange) -> f64 {
    let proposed = report.proposed_kinematics();
    let core = report.core();

    let initial = track.kinematics.total_energy();
    let released = core.track_status().is_terminal() && core.number_of_secondaries() > 0;
    let primary = if released {
        0.0
    } else {
        proposed.kinetic_energy + proposed.mass
    };
    let secondaries: f64 = core.secondaries().map(|s| s.total_energy()).sum();

    initial - primary - secondaries - core.local_energy_deposit()
}

#[derive(Debug)]
pub struct Validator {
    config: ValidationConfig,
    summary: ValidationSummary,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            summary: ValidationSummary::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check `report` against the track it was initialized from.
    ///
    /// Does nothing when validation is disabled.
    pub fn check_consistency(&mut self, track: &Track, report: &dyn ParticleChange) -> StepResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        self.summary.checks += 1;

        let proposed = report.proposed_kinematics();
        if proposed.kinetic_energy < 0.0 {
            return Err(KinematicDefect::NegativeKineticEnergy(proposed.kinetic_energy).into());
        }
        if proposed.mass_changed && proposed.mass < 0.0 {
            return Err(KinematicDefect::NegativeMass(proposed.mass).into());
        }
        if let Some(direction) = proposed.direction {
            self.check_direction(direction)?;
        }
        for secondary in report.core().secondaries() {
            if secondary.kinematics.kinetic_energy < 0.0 {
                return Err(KinematicDefect::NegativeKineticEnergy(
                    secondary.kinematics.kinetic_energy,
                )
                .into());
            }
            self.check_direction(secondary.direction)?;
        }

        let imbalance = energy_balance(track, report);
        if imbalance.abs() > self.config.energy_tolerance {
            self.warn(track, report, WarningKind::EnergyBalance { imbalance });
        }
        if imbalance.abs() > self.summary.max_energy_imbalance {
            self.summary.max_energy_imbalance = imbalance.abs();
        }

        if proposed.global_time < track.time.global_time {
            self.warn(
                track,
                report,
                WarningKind::TimeReversal {
                    track_time: track.time.global_time,
                    proposed_time: proposed.global_time,
                },
            );
        }
        Ok(())
    }

    fn check_direction(&self, direction: Direction) -> StepResult<()> {
        let norm = direction.length();
        if (norm - 1.0).abs() > self.config.direction_tolerance {
            return Err(KinematicDefect::NonUnitDirection { direction, norm }.into());
        }
        Ok(())
    }

    fn warn(&mut self, track: &Track, report: &dyn ParticleChange, kind: WarningKind) {
        let warning = ValidationWarning {
            kind,
            report: report.kind(),
            track_id: track.track_id,
            step_number: track.current_step_number,
        };
        tracing::warn!("{}", warning);
        self.summary.warnings += 1;
        if self.summary.recorded.len() < self.config.max_recorded_warnings {
            self.summary.recorded.push(warning);
        }
    }

    pub fn summary(&self) -> &ValidationSummary {
        &self.summary
    }

    pub fn warning_count(&self) -> u64 {
        self.summary.warnings
    }

    pub fn reset(&mut self) {
        self.summary = ValidationSummary::default();
    }
}
