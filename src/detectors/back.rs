// src/detectors/back.rs
use super::cycle::{Analysis, Step};
use super::{Detection, DetectorState};
use crate::geometry::angle_between;
use crate::overlay::{OverlayBuilder, Tone};
use crate::pose::{Frame, Joint};

const ARM_STRAIGHT: f64 = 160.0;

/// Dead hang to chin over the bar, judged by how far the shoulders rise
/// towards the hands.
pub(crate) fn pull_up(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let hanging = match *prev {
        DetectorState::PullUp { hanging } => hanging,
        _ => false,
    };

    let Some([shoulder, elbow, wrist]) = frame.visible_points(
        [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Keep your arms and the bar in frame");
    };

    let elbow_angle = angle_between(&shoulder, &elbow, &wrist);
    let reach = wrist.y - shoulder.y;

    let mut out = Analysis::default();
    let (step, next_hanging) = out.cycle(
        hanging,
        elbow_angle > ARM_STRAIGHT && reach < -0.2,
        reach > -0.05,
    );
    if step == Step::Completed {
        out.celebrate("Awesome pull-up!");
    }

    if hanging && step == Step::Hold && elbow_angle < ARM_STRAIGHT {
        out.info("Full extension at the bottom");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, elbow, wrist], tone)
        .joint(&elbow, tone)
        .angle(&elbow, "Elbow", elbow_angle)
        .build();

    Detection::from_analysis(out, DetectorState::PullUp { hanging: next_hanging }, overlay)
}

const TORSO_HINGE: f64 = 0.2;

pub(crate) fn bent_over_row(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let extended = match *prev {
        DetectorState::BentOverRow { extended } => extended,
        _ => false,
    };

    let Some([shoulder, elbow, wrist, hip]) = frame.visible_points(
        [
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::LeftHip,
        ],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Turn sideways so your arm and torso are visible");
    };

    let elbow_angle = angle_between(&shoulder, &elbow, &wrist);

    let mut out = Analysis::default();
    let (step, extended) = out.cycle(extended, elbow_angle > 150.0, elbow_angle < 90.0);
    if step == Step::Completed {
        out.celebrate("Strong row!");
    }

    // Hinged torso keeps shoulders and hips at a similar height.
    let upright = (shoulder.y - hip.y).abs() > TORSO_HINGE;
    if upright {
        out.warn("Hinge forward more at the hips");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, elbow, wrist], tone)
        .limb(&[hip, shoulder], if upright { Tone::Bad } else { Tone::Good })
        .angle(&elbow, "Elbow", elbow_angle)
        .build();

    Detection::from_analysis(out, DetectorState::BentOverRow { extended }, overlay)
}

pub(crate) fn deadlift(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let bent_over = match *prev {
        DetectorState::Deadlift { bent_over } => bent_over,
        _ => false,
    };

    let Some([shoulder, hip, knee, ankle]) = frame.visible_points(
        [
            Joint::LeftShoulder,
            Joint::LeftHip,
            Joint::LeftKnee,
            Joint::LeftAnkle,
        ],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Turn sideways so your whole body is visible");
    };

    let hip_angle = angle_between(&shoulder, &hip, &knee);
    let knee_angle = angle_between(&hip, &knee, &ankle);

    let mut out = Analysis::default();
    let (step, next_bent) = out.cycle(
        bent_over,
        hip_angle < 100.0 && knee_angle < 140.0,
        hip_angle > 160.0,
    );
    match step {
        Step::Engaged => out.encourage("Set your back!"),
        Step::Completed => out.celebrate("Perfect deadlift!"),
        Step::Hold => {}
    }

    let rounding = bent_over && hip_angle < 80.0;
    if rounding {
        out.warn("Don't round your back");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, hip, knee, ankle], tone)
        .joint(&hip, if rounding { Tone::Bad } else { tone })
        .angle(&hip, "Hip", hip_angle)
        .angle(&knee, "Knee", knee_angle)
        .build();

    Detection::from_analysis(out, DetectorState::Deadlift { bent_over: next_bent }, overlay)
}
