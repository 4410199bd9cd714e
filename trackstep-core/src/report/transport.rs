use super::{full_state_proposals, FullState, ParticleChange, ProposedKinematics, ReportCore, ReportKind};
use crate::error::StepResult;
use crate::merge;
use crate::registry::VolumeContext;
use crate::step::Step;
use crate::track::Track;
use crate::types::{CutsCoupleHandle, DetectorHandle, GeometryHandle, MaterialHandle, Position};

/// Report for transportation: the General report's kinematics plus the
/// geometry context the particle moves into.
///
/// Geometry proposals (touchable, material, cuts couple, sensitive detector)
/// reach the step only in the PostStep and AtRest phases. An AlongStep merge
/// re-asserts the volume the particle is still travelling through.
#[derive(Debug, Default)]
pub struct TransportChange {
    core: ReportCore,
    proposed: FullState,
    baseline: FullState,
    baseline_global_time: f64,
    velocity: Option<f64>,
    momentum_changed: bool,
    current: Option<VolumeContext>,
    touchable: Option<GeometryHandle>,
    material: Option<MaterialHandle>,
    cuts_couple: Option<CutsCoupleHandle>,
    sensitive_detector: Option<DetectorHandle>,
    auxiliary_points: Vec<Position>,
}

full_state_proposals!(TransportChange, momentum_changed);

impl TransportChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, track: &Track) {
        self.core.initialize(track);
        self.baseline = FullState::from_track(track);
        self.proposed = self.baseline;
        self.baseline_global_time = track.time.global_time;
        self.velocity = None;
        self.momentum_changed = false;
        self.current = track.volume;
        self.touchable = track.volume.map(|v| v.geometry);
        self.material = track.volume.map(|v| v.material);
        self.cuts_couple = track.volume.map(|v| v.cuts_couple);
        self.sensitive_detector = track.volume.and_then(|v| v.sensitive_detector);
        self.auxiliary_points.clear();
    }

    /// Direction and polarization are merged only while this is set.
    ///
    /// Proposing a direction, momentum or polarization sets it.
    pub fn set_momentum_changed(&mut self, changed: bool) {
        self.momentum_changed = changed;
    }

    pub fn momentum_changed(&self) -> bool {
        self.momentum_changed
    }

    /// Propose the whole context of the next volume; `None` leaves the world
    pub fn propose_volume(&mut self, volume: Option<VolumeContext>) {
        self.core.assert_initialized();
        self.touchable = volume.map(|v| v.geometry);
        self.material = volume.map(|v| v.material);
        self.cuts_couple = volume.map(|v| v.cuts_couple);
        self.sensitive_detector = volume.and_then(|v| v.sensitive_detector);
    }

    pub fn propose_touchable(&mut self, geometry: Option<GeometryHandle>) {
        self.core.assert_initialized();
        self.touchable = geometry;
    }

    pub fn proposed_touchable(&self) -> Option<GeometryHandle> {
        self.touchable
    }

    pub fn propose_material(&mut self, material: Option<MaterialHandle>) {
        self.core.assert_initialized();
        self.material = material;
    }

    pub fn proposed_material(&self) -> Option<MaterialHandle> {
        self.material
    }

    pub fn propose_cuts_couple(&mut self, couple: Option<CutsCoupleHandle>) {
        self.core.assert_initialized();
        self.cuts_couple = couple;
    }

    pub fn proposed_cuts_couple(&self) -> Option<CutsCoupleHandle> {
        self.cuts_couple
    }

    pub fn propose_sensitive_detector(&mut self, detector: Option<DetectorHandle>) {
        self.core.assert_initialized();
        self.sensitive_detector = detector;
    }

    pub fn proposed_sensitive_detector(&self) -> Option<DetectorHandle> {
        self.sensitive_detector
    }

    /// Record an intermediate point of a curved trajectory
    pub fn push_auxiliary_point(&mut self, point: Position) {
        self.core.assert_initialized();
        self.auxiliary_points.push(point);
    }

    pub fn auxiliary_points(&self) -> &[Position] {
        &self.auxiliary_points
    }

    fn replace(&self, step: &mut Step) {
        merge::replace_full_state(
            &mut step.post,
            &self.proposed,
            self.proposed_global_time(),
            self.velocity,
            self.momentum_changed,
        );
        step.post.geometry = self.touchable;
        step.post.material = self.material;
        step.post.cuts_couple = self.cuts_couple;
        step.post.sensitive_detector = self.sensitive_detector;
    }
}

impl ParticleChange for TransportChange {
    fn kind(&self) -> ReportKind {
        ReportKind::Transport
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
        self.replace(step);
        Ok(())
    }

    fn apply_along_step(&mut self, step: &mut Step) -> StepResult<()> {
        merge::accumulate_full_state(
            &mut step.post,
            &self.proposed,
            &self.baseline,
            self.velocity,
            self.momentum_changed,
        );

        // Still inside the pre-step volume until the PostStep merge
        step.post.geometry = self.current.map(|v| v.geometry);
        step.post.material = self.current.map(|v| v.material);
        step.post.cuts_couple = self.current.map(|v| v.cuts_couple);
        step.post.sensitive_detector = self.current.and_then(|v| v.sensitive_detector);

        step.auxiliary_points.clear();
        step.auxiliary_points.extend_from_slice(&self.auxiliary_points);
        Ok(())
    }

    fn apply_post_step(&mut self, step: &mut Step) -> StepResult<()> {
        self.replace(step);
        Ok(())
    }
}
