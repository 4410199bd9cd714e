//! Consistency checks: fatal kinematic defects, soft warnings and the
//! energy balance of a proposed final state

use glam::DVec3;
use trackstep_core::registry::DecayChannel;
use trackstep_core::stepping::PhysicsEffect;
use trackstep_core::tests::test_helpers::{
    approx_eq, electron_track, make_track, photon, step_for, FixedRegistry, RestDecay,
    SingleChannel, MUON_MASS, MUON_PLUS, NU_MU, PION_MASS, PION_PLUS,
};
use trackstep_core::{
    energy_balance, DecayChange, GeneralChange, KinematicDefect, ParticleChange, StepError,
    TrackStatus, ValidationConfig, Validator, WarningKind,
};

fn enabled() -> Validator {
    Validator::new(ValidationConfig::debug())
}

#[test]
fn test_balanced_final_state_passes() {
    // 100 MeV in: 70 kept, a 25 MeV photon, 5 MeV deposited
    let track = electron_track(100.0);
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_kinetic_energy(70.0);
    report.add_secondary(photon(25.0, DVec3::Y));
    report.propose_local_energy_deposit(5.0);

    assert!(approx_eq(energy_balance(&track, &report), 0.0, 1e-9));

    let mut validator = enabled();
    validator.check_consistency(&track, &report).unwrap();
    assert_eq!(validator.warning_count(), 0);
    assert_eq!(validator.summary().checks, 1);
    assert!(validator.summary().is_clean());
}

#[test]
fn test_energy_imbalance_is_a_warning() {
    let track = electron_track(100.0);
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_kinetic_energy(70.0);
    report.add_secondary(photon(25.0, DVec3::Y));
    report.propose_local_energy_deposit(10.0);

    let mut validator = enabled();
    validator.check_consistency(&track, &report).unwrap();
    assert_eq!(validator.warning_count(), 1);

    let recorded = &validator.summary().recorded;
    assert_eq!(recorded.len(), 1);
    match recorded[0].kind {
        WarningKind::EnergyBalance { imbalance } => assert!(approx_eq(imbalance, -5.0, 1e-9)),
        other => panic!("unexpected warning {:?}", other),
    }
    assert!(approx_eq(validator.summary().max_energy_imbalance, 5.0, 1e-9));
    assert!(validator.summary().to_string().contains("1 warnings"));
}

#[test]
fn test_time_reversal_is_a_warning() {
    let mut track = electron_track(1.0);
    track.time.global_time = 10.0;
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_global_time(9.0);

    let mut validator = enabled();
    validator.check_consistency(&track, &report).unwrap();
    assert!(matches!(
        validator.summary().recorded[0].kind,
        WarningKind::TimeReversal { .. }
    ));
}

#[test]
fn test_non_unit_direction_is_fatal() {
    let track = electron_track(1.0);
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_momentum_direction(DVec3::new(1.0, 1.0, 0.0));

    let err = enabled().check_consistency(&track, &report).unwrap_err();
    assert!(matches!(
        err,
        StepError::Kinematic(KinematicDefect::NonUnitDirection { .. })
    ));
    assert!(!err.is_configuration());
}

#[test]
fn test_non_unit_secondary_direction_is_fatal() {
    let track = electron_track(10.0);
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_kinetic_energy(9.0);
    report.add_secondary(photon(1.0, DVec3::new(0.0, 2.0, 0.0)));

    let err = enabled().check_consistency(&track, &report).unwrap_err();
    assert!(matches!(
        err,
        StepError::Kinematic(KinematicDefect::NonUnitDirection { .. })
    ));
}

#[test]
fn test_negative_energy_and_mass_are_fatal() {
    let track = electron_track(1.0);
    let mut report = GeneralChange::new();

    report.initialize(&track);
    report.propose_kinetic_energy(-0.5);
    let err = enabled().check_consistency(&track, &report).unwrap_err();
    assert_eq!(err, StepError::from(KinematicDefect::NegativeKineticEnergy(-0.5)));

    report.initialize(&track);
    report.propose_mass(-1.0);
    let err = enabled().check_consistency(&track, &report).unwrap_err();
    assert_eq!(err, StepError::from(KinematicDefect::NegativeMass(-1.0)));
}

#[test]
fn test_disabled_validator_checks_nothing() {
    let track = electron_track(1.0);
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_momentum_direction(DVec3::new(3.0, 0.0, 0.0));
    report.propose_local_energy_deposit(50.0);

    let mut validator = Validator::new(ValidationConfig::default());
    assert!(!validator.is_enabled());
    validator.check_consistency(&track, &report).unwrap();
    assert_eq!(validator.summary().checks, 0);
    assert_eq!(validator.warning_count(), 0);
}

#[test]
fn test_tolerance_is_configurable() {
    let track = electron_track(10.0);
    let mut report = GeneralChange::new();
    report.initialize(&track);
    report.propose_kinetic_energy(9.99);

    let mut strict = enabled();
    strict.check_consistency(&track, &report).unwrap();
    assert_eq!(strict.warning_count(), 1);

    let mut loose = Validator::new(ValidationConfig::debug().with_energy_tolerance(0.1));
    loose.check_consistency(&track, &report).unwrap();
    assert_eq!(loose.warning_count(), 0);
}

#[test]
fn test_recorded_warnings_are_capped() {
    let track = electron_track(10.0);
    let mut report = GeneralChange::new();
    let mut config = ValidationConfig::debug();
    config.max_recorded_warnings = 2;
    let mut validator = Validator::new(config);

    for _ in 0..5 {
        report.initialize(&track);
        report.propose_kinetic_energy(5.0);
        validator.check_consistency(&track, &report).unwrap();
    }
    assert_eq!(validator.warning_count(), 5);
    assert_eq!(validator.summary().recorded.len(), 2);
    assert!(validator.summary().to_string().contains("3 more not recorded"));

    validator.reset();
    assert!(validator.summary().is_clean());
}

#[test]
fn test_decay_releases_parent_rest_energy() {
    let track = make_track(PION_PLUS, 0.0, PION_MASS, 1.0);
    let step = step_for(&track);
    let selector = SingleChannel {
        channel: DecayChannel {
            branching_ratio: 1.0,
            daughters: vec![MUON_PLUS, NU_MU],
        },
        threshold: MUON_MASS,
    };
    let mut decay = RestDecay::new(PION_PLUS, 26.03, FixedRegistry::standard(), selector);

    let report = decay.at_rest(&track, &step).unwrap();
    assert_eq!(report.core().number_of_secondaries(), 2);
    assert!(approx_eq(energy_balance(&track, report), 0.0, 1e-9));

    let mut validator = enabled();
    validator.check_consistency(&track, report).unwrap();
    assert_eq!(validator.warning_count(), 0);
}

#[test]
fn test_decay_in_flight_hands_all_energy_to_products() {
    // 100 MeV pion into two back-to-back photons sharing KE + m
    let track = make_track(PION_PLUS, 100.0, PION_MASS, 1.0);
    let share = (100.0 + PION_MASS) / 2.0;
    let mut report = DecayChange::new();
    report.initialize(&track);
    report.core_mut().propose_track_status(TrackStatus::StopAndKill);
    report.add_secondary(photon(share, DVec3::X));
    report.add_secondary(photon(share, DVec3::NEG_X));

    assert!(approx_eq(energy_balance(&track, &report), 0.0, 1e-9));

    let mut validator = enabled();
    validator.check_consistency(&track, &report).unwrap();
    assert_eq!(validator.warning_count(), 0);
}

#[test]
fn test_forbidden_rest_decay_keeps_parent_mass() {
    let track = make_track(PION_PLUS, 0.0, PION_MASS, 1.0);
    let step = step_for(&track);
    let selector = SingleChannel {
        channel: DecayChannel {
            branching_ratio: 1.0,
            daughters: vec![MUON_PLUS, NU_MU],
        },
        threshold: 2.0 * PION_MASS,
    };
    let mut decay = RestDecay::new(PION_PLUS, 26.03, FixedRegistry::standard(), selector);

    let report = decay.at_rest(&track, &step).unwrap();
    assert_eq!(report.core().number_of_secondaries(), 0);
    assert!(approx_eq(energy_balance(&track, report), 0.0, 1e-9));

    let mut validator = enabled();
    validator.check_consistency(&track, report).unwrap();
    assert_eq!(validator.warning_count(), 0);
}

#[test]
fn test_decay_report_has_no_direction_to_check() {
    let track = make_track(MUON_PLUS, 0.0, MUON_MASS, 1.0);
    let mut report = DecayChange::new();
    report.initialize(&track);
    assert_eq!(report.proposed_kinematics().direction, None);
    assert!(approx_eq(energy_balance(&track, &report), 0.0, 1e-12));
}
