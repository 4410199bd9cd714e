//! Folding change reports into a step
//!
//! AlongStep merges are delta merges: each report contributes
//! `proposed - baseline` on top of whatever the post point already holds,
//! so several continuous effects accumulate independently of their order.
//! AtRest and PostStep merges replace the post-point fields outright.
//! Every merge then adds the report's deposits to the step and moves its
//! secondaries into the step.

use crate::error::StepResult;
use crate::report::{FullState, MergePhase, ParticleChange};
use crate::step::{Step, StepPoint};

pub fn merge_at_rest<R: ParticleChange + ?Sized>(report: &mut R, step: &mut Step) -> StepResult<()> {
    report.apply_at_rest(step)?;
    finish(report, step, MergePhase::AtRest);
    Ok(())
}

pub fn merge_along_step<R: ParticleChange + ?Sized>(
    report: &mut R,
    step: &mut Step,
) -> StepResult<()> {
    report.apply_along_step(step)?;
    finish(report, step, MergePhase::AlongStep);
    Ok(())
}

pub fn merge_post_step<R: ParticleChange + ?Sized>(
    report: &mut R,
    step: &mut Step,
) -> StepResult<()> {
    report.apply_post_step(step)?;
    finish(report, step, MergePhase::PostStep);
    Ok(())
}

fn finish<R: ParticleChange + ?Sized>(report: &mut R, step: &mut Step, phase: MergePhase) {
    let kind = report.kind();
    let deposit = report.core().local_energy_deposit();
    let moved = report.core_mut().commit(step, phase);
    tracing::trace!(
        %kind,
        %phase,
        deposit,
        secondaries = moved,
        "merged change report"
    );
}

/// Delta merge of a full kinematic proposal.
///
/// Direction and polarization are skipped when `momentum_changed` is false.
/// A direction delta is renormalized, the other vector deltas are not.
pub(crate) fn accumulate_full_state(
    post: &mut StepPoint,
    proposed: &FullState,
    baseline: &FullState,
    velocity: Option<f64>,
    momentum_changed: bool,
) {
    post.position += proposed.position - baseline.position;

    let dt = proposed.local_time - baseline.local_time;
    post.time.advance(dt);
    post.time.proper_time += proposed.proper_time - baseline.proper_time;

    let kinematics = &mut post.kinematics;
    kinematics.kinetic_energy += proposed.kinetic_energy - baseline.kinetic_energy;
    kinematics.mass += proposed.mass - baseline.mass;
    kinematics.charge += proposed.charge - baseline.charge;
    kinematics.magnetic_moment += proposed.magnetic_moment - baseline.magnetic_moment;

    if momentum_changed {
        if proposed.direction != baseline.direction {
            let summed = post.direction + (proposed.direction - baseline.direction);
            post.direction = summed.try_normalize().unwrap_or(post.direction);
        }
        kinematics.polarization += proposed.polarization - baseline.polarization;
    }

    let energy_changed = proposed.kinetic_energy != baseline.kinetic_energy
        || proposed.mass != baseline.mass;
    write_velocity(post, velocity, energy_changed);
}

/// Absolute merge of a full kinematic proposal
pub(crate) fn replace_full_state(
    post: &mut StepPoint,
    proposed: &FullState,
    global_time: f64,
    velocity: Option<f64>,
    momentum_changed: bool,
) {
    let energy_changed = post.kinematics.kinetic_energy != proposed.kinetic_energy
        || post.kinematics.mass != proposed.mass;

    post.position = proposed.position;
    post.time.local_time = proposed.local_time;
    post.time.global_time = global_time;
    post.time.proper_time = proposed.proper_time;

    let kinematics = &mut post.kinematics;
    kinematics.kinetic_energy = proposed.kinetic_energy;
    kinematics.mass = proposed.mass;
    kinematics.charge = proposed.charge;
    kinematics.magnetic_moment = proposed.magnetic_moment;

    if momentum_changed {
        post.direction = proposed.direction;
        kinematics.polarization = proposed.polarization;
    }

    write_velocity(post, velocity, energy_changed);
}

/// Absolute write of kinetic energy, refreshing velocity only if it changed
pub(crate) fn replace_kinetic_energy(post: &mut StepPoint, kinetic_energy: f64) {
    if post.kinematics.kinetic_energy != kinetic_energy {
        post.kinematics.kinetic_energy = kinetic_energy;
        post.refresh_velocity();
    }
}

fn write_velocity(post: &mut StepPoint, velocity: Option<f64>, energy_changed: bool) {
    match velocity {
        Some(v) => post.velocity = v,
        None if energy_changed => post.refresh_velocity(),
        None => {}
    }
}
