//! Interfaces to collaborators that live outside the step protocol.
//!
//! The identity registry, decay-channel selection and geometry navigation are
//! consumed read-only. Only their contracts are defined here.

use crate::types::{
    CutsCoupleHandle, DetectorHandle, Direction, GeometryHandle, MaterialHandle, Position,
};

/// Immutable static properties of a particle species
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDefinition {
    pub name: String,
    pub code: i32,
    /// Rest mass (MeV)
    pub mass: f64,
    /// Charge in units of e+
    pub charge: f64,
    pub spin: f64,
    pub stable: bool,
}

/// Lookup of particle species by name or numeric code
pub trait ParticleRegistry {
    fn find_by_name(&self, name: &str) -> Option<&ParticleDefinition>;
    fn find_by_code(&self, code: i32) -> Option<&ParticleDefinition>;
}

/// A decay mode of an unstable particle
#[derive(Debug, Clone, PartialEq)]
pub struct DecayChannel {
    pub branching_ratio: f64,
    /// Codes of the daughter particles
    pub daughters: Vec<i32>,
}

/// Weighted channel selection with kinematic gating.
///
/// Returns `None` when no channel is open at `parent_mass`. That outcome is
/// handled by the decaying effect itself and never reaches the merge.
pub trait DecaySelector {
    fn select(&self, parent_mass: f64) -> Option<&DecayChannel>;
}

/// Everything the navigator knows about the volume at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeContext {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub cuts_couple: CutsCoupleHandle,
    pub sensitive_detector: Option<DetectorHandle>,
}

/// Geometry navigation, used only by transport effects
pub trait Navigator {
    /// Volume containing `position`, or `None` outside the modeled region
    fn locate(&self, position: Position, direction: Direction) -> Option<VolumeContext>;

    /// Straight-line distance to the next volume boundary along `direction`
    fn distance_to_boundary(&self, position: Position, direction: Direction) -> f64;
}
