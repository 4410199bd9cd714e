pub mod config;
pub mod diagnostics;
pub mod error;
pub mod merge;
pub mod registry;
pub mod report;
pub mod secondary;
pub mod step;
pub mod stepping;
pub mod synchronizer;
pub mod track;
pub mod types;
pub mod units;
pub mod validator;

pub use config::{SteppingConfig, ValidationConfig};
pub use diagnostics::{ValidationSummary, ValidationWarning, WarningKind};
pub use error::{ConfigurationError, KinematicDefect, StepError, StepResult, TimeKind};
pub use merge::{merge_along_step, merge_at_rest, merge_post_step};
pub use report::{
    DecayChange, GammaChange, GeneralChange, LossChange, MergePhase, ParticleChange,
    ProposedKinematics, ReportCore, ReportKind, ScatterChange, TransportChange,
};
pub use secondary::{SecondaryBuffer, SecondaryParticle};
pub use step::{Step, StepPoint, SteppingControl};
pub use stepping::{EventSummary, PhysicsEffect, StepLimit, SteppingLoop};
pub use synchronizer::{prepare_next_step, update_track};
pub use track::Track;
pub use types::{StepStatus, TrackStatus};
pub use validator::{energy_balance, Validator};
