use glam::DVec3;
use std::fmt;

/// A point in space (mm)
pub type Position = DVec3;

/// A momentum direction; unit length wherever it is used as one
pub type Direction = DVec3;

/// Opaque handle to a geometry context (touchable) supplied by the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u32);

/// Opaque handle to a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Opaque handle to a production-cuts/material couple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CutsCoupleHandle(pub u32);

/// Opaque handle to a sensitive detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectorHandle(pub u32);

/// Identifies the physics effect that defined a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u16);

/// Lifecycle status of a tracked particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    #[default]
    Alive,
    /// Kinetic energy is exhausted but at-rest effects still apply
    StopButAlive,
    StopAndKill,
    KillTrackAndSecondaries,
    Suspend,
    PostponeToNextEvent,
}

impl TrackStatus {
    /// No further step will be scheduled for this track
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TrackStatus::StopAndKill | TrackStatus::KillTrackAndSecondaries
        )
    }

    /// The track leaves the current stepping sequence (terminal, suspended or postponed)
    pub fn ends_stepping(self) -> bool {
        !matches!(self, TrackStatus::Alive | TrackStatus::StopButAlive)
    }

    fn severity(self) -> u8 {
        match self {
            TrackStatus::Alive => 0,
            TrackStatus::StopButAlive => 1,
            TrackStatus::Suspend => 2,
            TrackStatus::PostponeToNextEvent => 3,
            TrackStatus::StopAndKill => 4,
            TrackStatus::KillTrackAndSecondaries => 5,
        }
    }

    /// Combine an already-recorded status with a new proposal.
    ///
    /// The more severe status wins, so a kill proposed earlier in a step
    /// survives later effects proposing `Alive`.
    pub fn combine(self, proposed: TrackStatus) -> TrackStatus {
        if proposed.severity() > self.severity() {
            proposed
        } else {
            self
        }
    }
}

/// What limited the most recent step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    Undefined,
    WorldBoundary,
    GeomBoundary,
    AtRestDoIt,
    AlongStepDoIt,
    PostStepDoIt,
    UserLimit,
    ExclusivelyForced,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Undefined => "Undefined",
            StepStatus::WorldBoundary => "WorldBoundary",
            StepStatus::GeomBoundary => "GeomBoundary",
            StepStatus::AtRestDoIt => "AtRestDoIt",
            StepStatus::AlongStepDoIt => "AlongStepDoIt",
            StepStatus::PostStepDoIt => "PostStepDoIt",
            StepStatus::UserLimit => "UserLimit",
            StepStatus::ExclusivelyForced => "ExclusivelyForced",
        };
        f.write_str(s)
    }
}

/// The three clocks carried by a particle (ns).
///
/// `global_time = creation_time + local_time` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timebase {
    pub global_time: f64,
    pub local_time: f64,
    pub proper_time: f64,
}

impl Timebase {
    /// Timebase of a particle created at `global_time`
    pub fn created_at(global_time: f64) -> Self {
        Self {
            global_time,
            local_time: 0.0,
            proper_time: 0.0,
        }
    }

    /// Global time at which the particle was created
    pub fn creation_time(&self) -> f64 {
        self.global_time - self.local_time
    }

    /// Advance local and global time together by `dt`
    pub fn advance(&mut self, dt: f64) {
        self.global_time += dt;
        self.local_time += dt;
    }
}

/// Kinetic state of a particle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicState {
    pub kinetic_energy: f64,
    pub mass: f64,
    pub charge: f64,
    pub magnetic_moment: f64,
    pub polarization: DVec3,
}

impl KinematicState {
    pub fn new(kinetic_energy: f64, mass: f64, charge: f64) -> Self {
        Self {
            kinetic_energy,
            mass,
            charge,
            magnetic_moment: 0.0,
            polarization: DVec3::ZERO,
        }
    }

    /// Kinetic plus rest energy
    pub fn total_energy(&self) -> f64 {
        crate::units::total_energy(self.kinetic_energy, self.mass)
    }

    pub fn momentum(&self) -> f64 {
        crate::units::momentum(self.kinetic_energy, self.mass)
    }

    pub fn velocity(&self) -> f64 {
        crate::units::velocity(self.kinetic_energy, self.mass)
    }
}
