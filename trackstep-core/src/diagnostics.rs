//! Non-fatal validation findings and the end-of-run summary
//!
//! Warnings never stop a run. They are collected by the validator and
//! reported once tracking finishes.

use crate::report::ReportKind;
use std::fmt;

/// What kind of soft inconsistency was found
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WarningKind {
    /// Energy in does not match energy out; carries the imbalance (MeV)
    EnergyBalance { imbalance: f64 },
    /// The proposed global time is earlier than the track's current time
    TimeReversal { track_time: f64, proposed_time: f64 },
}

/// A soft inconsistency found in one report
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub report: ReportKind,
    pub track_id: u32,
    pub step_number: u32,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::EnergyBalance { imbalance } => write!(
                f,
                "energy imbalance of {:.3e} MeV in {} report (track {}, step {})",
                imbalance, self.report, self.track_id, self.step_number
            ),
            WarningKind::TimeReversal {
                track_time,
                proposed_time,
            } => write!(
                f,
                "time goes back from {} ns to {} ns in {} report (track {}, step {})",
                track_time, proposed_time, self.report, self.track_id, self.step_number
            ),
        }
    }
}

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub checks: u64,
    pub warnings: u64,
    pub max_energy_imbalance: f64,
    /// The first warnings of the run, up to the configured limit
    pub recorded: Vec<ValidationWarning>,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.warnings == 0
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reports checked, {} warnings, largest energy imbalance {:.3e} MeV",
            self.checks, self.warnings, self.max_energy_imbalance
        )?;
        for warning in &self.recorded {
            write!(f, "\n  {}", warning)?;
        }
        if self.warnings > self.recorded.len() as u64 {
            write!(
                f,
                "\n  ... {} more not recorded",
                self.warnings - self.recorded.len() as u64
            )?;
        }
        Ok(())
    }
}
