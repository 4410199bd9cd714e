//! Transportation across a volume boundary: the geometry context may only
//! change in the PostStep merge

use glam::DVec3;
use trackstep_core::tests::test_helpers::{
    approx_eq, approx_eq_vec, electron_track, left_volume, right_volume, step_for,
};
use trackstep_core::types::{DetectorHandle, GeometryHandle, MaterialHandle};
use trackstep_core::{update_track, ParticleChange, TransportChange};

#[test]
fn test_geometry_changes_only_at_post_step() {
    let mut track = electron_track(10.0);
    let mut step = step_for(&track);
    let mut report = TransportChange::new();

    report.initialize(&track);
    report.propose_position(DVec3::new(0.0, 0.0, 0.0));
    report.propose_volume(Some(right_volume()));
    report.merge_along_step(&mut step).unwrap();

    assert!(approx_eq_vec(step.post.position, DVec3::ZERO, 1e-12));
    assert_eq!(step.post.geometry, Some(GeometryHandle(1)), "still in the pre-step volume");
    assert_eq!(step.post.sensitive_detector, None);

    report.merge_post_step(&mut step).unwrap();
    assert_eq!(step.post.geometry, Some(GeometryHandle(2)));
    assert_eq!(step.post.material, Some(MaterialHandle(2)));
    assert_eq!(step.post.sensitive_detector, Some(DetectorHandle(7)));
    assert_eq!(step.pre.geometry, Some(GeometryHandle(1)));

    update_track(&mut track, &step);
    assert_eq!(track.volume, Some(left_volume()));
    assert_eq!(track.next_volume, Some(right_volume()));
}

#[test]
fn test_leaving_the_world_clears_next_volume() {
    let mut track = electron_track(10.0);
    let mut step = step_for(&track);
    let mut report = TransportChange::new();

    report.initialize(&track);
    report.propose_volume(None);
    report.merge_post_step(&mut step).unwrap();

    assert_eq!(step.post.geometry, None);
    update_track(&mut track, &step);
    assert_eq!(track.next_volume, None);
}

#[test]
fn test_individual_geometry_proposals() {
    let track = electron_track(10.0);
    let mut step = step_for(&track);
    let mut report = TransportChange::new();

    report.initialize(&track);
    assert_eq!(report.proposed_touchable(), Some(GeometryHandle(1)));
    report.propose_material(Some(MaterialHandle(9)));
    report.propose_sensitive_detector(Some(DetectorHandle(3)));
    report.merge_post_step(&mut step).unwrap();

    assert_eq!(step.post.geometry, Some(GeometryHandle(1)));
    assert_eq!(step.post.material, Some(MaterialHandle(9)));
    assert_eq!(step.post.sensitive_detector, Some(DetectorHandle(3)));
}

#[test]
fn test_direction_proposal_sets_momentum_changed() {
    let track = electron_track(10.0);
    let mut report = TransportChange::new();

    let mut step = step_for(&track);
    report.initialize(&track);
    assert!(!report.momentum_changed());
    report.propose_momentum_direction(DVec3::Y);
    assert!(report.momentum_changed());
    report.merge_along_step(&mut step).unwrap();
    assert!(approx_eq_vec(step.post.direction, DVec3::Y, 1e-12));

    // momentum writes direction and energy together
    let mut step = step_for(&track);
    report.initialize(&track);
    assert!(!report.momentum_changed(), "flag resets every cycle");
    report.propose_momentum(DVec3::new(0.0, 0.0, 5.0));
    report.merge_post_step(&mut step).unwrap();
    assert!(approx_eq_vec(step.post.direction, DVec3::Z, 1e-12));
    assert!(approx_eq(step.post.kinetic_energy(), report.proposed_kinetic_energy(), 1e-12));

    let mut step = step_for(&track);
    report.initialize(&track);
    report.propose_polarization(DVec3::Z);
    report.merge_post_step(&mut step).unwrap();
    assert_eq!(step.post.kinematics.polarization, DVec3::Z);
}

#[test]
fn test_cleared_momentum_flag_skips_direction() {
    let track = electron_track(10.0);
    let mut step = step_for(&track);
    let mut report = TransportChange::new();

    report.initialize(&track);
    report.propose_momentum_direction(DVec3::Y);
    report.set_momentum_changed(false);
    report.merge_along_step(&mut step).unwrap();
    assert_eq!(step.post.direction, DVec3::X);
}

#[test]
fn test_auxiliary_points_are_copied_each_along_step() {
    let track = electron_track(10.0);
    let mut step = step_for(&track);
    let mut report = TransportChange::new();

    report.initialize(&track);
    report.push_auxiliary_point(DVec3::new(-40.0, 0.1, 0.0));
    report.push_auxiliary_point(DVec3::new(-30.0, 0.3, 0.0));
    report.merge_along_step(&mut step).unwrap();
    assert_eq!(step.auxiliary_points.len(), 2);
    assert_eq!(step.auxiliary_points[1], DVec3::new(-30.0, 0.3, 0.0));

    report.initialize(&track);
    assert!(report.auxiliary_points().is_empty());
    report.merge_along_step(&mut step).unwrap();
    assert!(step.auxiliary_points.is_empty());
}
