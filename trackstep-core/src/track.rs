use crate::registry::VolumeContext;
use crate::secondary::SecondaryParticle;
use crate::types::{Direction, KinematicState, Position, Timebase, TrackStatus};

/// The persistent state of one tracked particle
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: u32,
    /// Zero for primaries
    pub parent_id: u32,
    pub code: i32,
    pub position: Position,
    pub direction: Direction,
    pub time: Timebase,
    pub kinematics: KinematicState,
    /// Velocity in mm/ns, kept in sync by the synchronizer
    pub velocity: f64,
    pub weight: f64,
    pub status: TrackStatus,
    pub step_length: f64,
    pub track_length: f64,
    pub current_step_number: u32,
    /// Volume at the start of the current step
    pub volume: Option<VolumeContext>,
    /// Volume at the end of the current step
    pub next_volume: Option<VolumeContext>,
}

impl Track {
    pub fn new(
        code: i32,
        kinematics: KinematicState,
        position: Position,
        direction: Direction,
        global_time: f64,
    ) -> Self {
        Self {
            track_id: 0,
            parent_id: 0,
            code,
            position,
            direction,
            time: Timebase::created_at(global_time),
            velocity: kinematics.velocity(),
            kinematics,
            weight: 1.0,
            status: TrackStatus::Alive,
            step_length: 0.0,
            track_length: 0.0,
            current_step_number: 0,
            volume: None,
            next_volume: None,
        }
    }

    /// Turn a secondary handed off by a step into a new track
    pub fn from_secondary(secondary: SecondaryParticle, track_id: u32, parent_id: u32) -> Self {
        let mut track = Track::new(
            secondary.code,
            secondary.kinematics,
            secondary.position,
            secondary.direction,
            secondary.time,
        );
        track.track_id = track_id;
        track.parent_id = parent_id;
        track.weight = secondary.weight.unwrap_or(1.0);
        track
    }

    pub fn with_volume(mut self, volume: VolumeContext) -> Self {
        self.volume = Some(volume);
        self.next_volume = Some(volume);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.kinematics.kinetic_energy
    }

    pub fn global_time(&self) -> f64 {
        self.time.global_time
    }

    pub fn local_time(&self) -> f64 {
        self.time.local_time
    }

    /// Whether the tracking loop should schedule another step
    pub fn is_alive(&self) -> bool {
        !self.status.ends_stepping()
    }
}
