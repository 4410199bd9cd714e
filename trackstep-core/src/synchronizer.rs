//! Copying a finished step back into the persistent track

use crate::registry::VolumeContext;
use crate::step::{SteppingControl, Step, StepPoint};
use crate::track::Track;
use crate::types::StepStatus;

/// Copy the step's post point into `track`.
///
/// Safe to call more than once per step; track length is the loop's job.
pub fn update_track(track: &mut Track, step: &Step) {
    let post = &step.post;
    track.position = post.position;
    track.time = post.time;
    track.kinematics = post.kinematics;
    track.direction = post.direction;
    track.velocity = post.velocity;
    track.weight = post.weight;
    track.step_length = step.step_length;
    track.next_volume = volume_of(post);
    track.status = step.track_status;
}

/// Turn the finished step into the start of the next one, in place.
///
/// The post point becomes the pre point, the post status returns to
/// `Undefined`, the secondary count so far is recorded and both deposit
/// accumulators are cleared.
pub fn prepare_next_step(step: &mut Step) {
    step.pre.clone_from(&step.post);
    step.post.step_status = StepStatus::Undefined;
    step.post.defining_effect = None;
    step.mark_step_boundary();
    step.total_energy_deposit = 0.0;
    step.non_ionizing_energy_deposit = 0.0;
    step.control_flag = SteppingControl::NormalCondition;
    step.first_step_in_volume = step.last_step_in_volume;
    step.last_step_in_volume = false;
    step.auxiliary_points.clear();
}

fn volume_of(point: &StepPoint) -> Option<VolumeContext> {
    Some(VolumeContext {
        geometry: point.geometry?,
        material: point.material?,
        cuts_couple: point.cuts_couple?,
        sensitive_detector: point.sensitive_detector,
    })
}
