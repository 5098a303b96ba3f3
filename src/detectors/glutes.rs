// src/detectors/glutes.rs
use super::cycle::{Analysis, Step};
use super::{Detection, DetectorState};
use crate::geometry::angle_between;
use crate::overlay::OverlayBuilder;
use crate::pose::{Frame, Joint};

pub(crate) fn hip_thrust(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let hips_down = match *prev {
        DetectorState::HipThrust { hips_down } => hips_down,
        _ => false,
    };

    let Some([shoulder, hip, knee]) = frame.visible_points(
        [Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Turn sideways so your hips and knees are visible");
    };

    let hip_angle = angle_between(&shoulder, &hip, &knee);

    let mut out = Analysis::default();
    let (step, hips_down) = out.cycle(hips_down, hip_angle < 120.0, hip_angle > 160.0);
    if step == Step::Completed {
        out.celebrate("Great thrust!");
    }
    if hip_angle > 170.0 {
        out.info("Squeeze your glutes at the top!");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, hip, knee], tone)
        .joint(&hip, tone)
        .angle(&hip, "Hip", hip_angle)
        .build();

    Detection::from_analysis(out, DetectorState::HipThrust { hips_down }, overlay)
}

pub(crate) fn glute_bridge(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let on_ground = match *prev {
        DetectorState::GluteBridge { on_ground } => on_ground,
        _ => false,
    };

    let Some([shoulder, hip]) =
        frame.visible_points([Joint::LeftShoulder, Joint::LeftHip], min_visibility)
    else {
        return Detection::reposition(prev, "Turn sideways so your shoulders and hips are visible");
    };

    // Grows as the hips lift above the shoulders.
    let lift = shoulder.y - hip.y;

    let mut out = Analysis::default();
    let (step, on_ground) = out.cycle(on_ground, lift < 0.1, lift > 0.25);
    if step == Step::Completed {
        out.celebrate("Perfect bridge!");
    }
    if lift > 0.2 && lift < 0.25 {
        out.info("Lift your hips higher!");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, hip], tone)
        .joint(&hip, tone)
        .build();

    Detection::from_analysis(out, DetectorState::GluteBridge { on_ground }, overlay)
}
