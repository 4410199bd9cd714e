//! Error types for the step final-state protocol
//!
//! Only protocol misuse and logic defects surface as errors. Ordinary
//! physics outcomes (a forbidden decay channel, a stopped particle) never do.

use glam::DVec3;
use std::fmt;
use thiserror::Error;

use crate::report::{MergePhase, ReportKind};
use crate::types::StepStatus;

/// Which clock a time proposal was expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    Global,
    Local,
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKind::Global => f.write_str("global"),
            TimeKind::Local => f.write_str("local"),
        }
    }
}

/// A physics effect used the protocol in a way it does not allow
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{kind} change report does not support the {phase} merge phase")]
    UnsupportedPhase { kind: ReportKind, phase: MergePhase },

    #[error("{first} time already proposed this cycle, refusing a {second} time proposal")]
    ConflictingTimeProposal { first: TimeKind, second: TimeKind },

    #[error("step status already defined as {current}, cannot redefine as {requested}")]
    StepStatusAlreadyDefined {
        current: StepStatus,
        requested: StepStatus,
    },
}

/// A proposed state that no correct physics effect can produce
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicDefect {
    #[error("negative kinetic energy proposed: {0} MeV")]
    NegativeKineticEnergy(f64),

    #[error("negative mass proposed: {0} MeV")]
    NegativeMass(f64),

    #[error("direction {direction} is not unit length (|d| = {norm})")]
    NonUnitDirection { direction: DVec3, norm: f64 },
}

/// Fatal errors raised by the protocol
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("kinematic defect: {0}")]
    Kinematic(#[from] KinematicDefect),
}

impl StepError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, StepError::Configuration(_))
    }
}

/// Result type for protocol operations
pub type StepResult<T> = Result<T, StepError>;
