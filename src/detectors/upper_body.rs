// src/detectors/upper_body.rs
use super::cycle::{Analysis, Step};
use super::{Detection, DetectorState};
use crate::geometry::angle_between;
use crate::overlay::{OverlayBuilder, Tone};
use crate::pose::{Frame, Joint};

const CURL_EXTENDED: f64 = 160.0;
const CURL_CONTRACTED: f64 = 50.0;
const ELBOW_DRIFT: f64 = 0.15;

/// Counts on the squeeze at the top, averaging both arms.
pub(crate) fn bicep_curl(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let (arm_down, elbow_warned) = match *prev {
        DetectorState::BicepCurl {
            arm_down,
            elbow_warned,
        } => (arm_down, elbow_warned),
        _ => (false, false),
    };

    let Some([ls, le, lw, rs, re, rw]) = frame.visible_points(
        [
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
        ],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Position yourself so both arms are fully visible");
    };

    let left = angle_between(&ls, &le, &lw);
    let right = angle_between(&rs, &re, &rw);
    let elbow = (left + right) / 2.0;

    let mut out = Analysis::default();
    let (step, arm_down) = out.cycle(arm_down, elbow > CURL_EXTENDED, elbow < CURL_CONTRACTED);
    match step {
        Step::Engaged => out.encourage("Curl up! Squeeze at the top"),
        Step::Completed => out.celebrate("Great curl!"),
        Step::Hold => {}
    }

    // Warn once per drift episode; re-armed when both elbows settle.
    let left_drift = (le.y - ls.y).abs() > ELBOW_DRIFT;
    let right_drift = (re.y - rs.y).abs() > ELBOW_DRIFT;
    let drifting = left_drift || right_drift;
    if drifting && !elbow_warned {
        out.warn("Keep elbows stable at sides");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[ls, le, lw], tone)
        .limb(&[rs, re, rw], tone)
        .joint(&le, if left_drift { Tone::Bad } else { tone })
        .joint(&re, if right_drift { Tone::Bad } else { tone })
        .angle(&le, "", left)
        .angle(&re, "", right)
        .build();

    Detection::from_analysis(
        out,
        DetectorState::BicepCurl {
            arm_down,
            elbow_warned: drifting,
        },
        overlay,
    )
}

const BODY_LINE: f64 = 160.0;

pub(crate) fn push_up(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let down = match *prev {
        DetectorState::PushUp { down } => down,
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
        return Detection::reposition(prev, "Turn sideways so your arm and hip are visible");
    };

    let elbow_angle = angle_between(&shoulder, &elbow, &wrist);

    let mut out = Analysis::default();
    let (step, down) = out.cycle(down, elbow_angle < 90.0, elbow_angle > 160.0);
    match step {
        Step::Engaged => out.encourage("Good depth!"),
        Step::Completed => out.celebrate("Perfect push-up!"),
        Step::Hold => {}
    }

    let sag = hip.y - shoulder.y;
    let mut misaligned = sag.abs() > 0.2;
    if sag > 0.2 {
        out.warn("Lift your hips, keep your body in a straight line");
    } else if sag < -0.2 {
        out.warn("Lower your hips slightly");
    }

    // Body line through the knee, only when the knee is in frame.
    let knee = frame
        .visible_points([Joint::LeftKnee], min_visibility)
        .map(|[knee]| knee);
    let body_angle = knee.map(|knee| angle_between(&shoulder, &hip, &knee));
    if !misaligned && body_angle.map_or(false, |angle| angle < BODY_LINE) {
        misaligned = true;
        out.warn("Keep your back straight!");
    }

    let tone = out.tone();
    let body: Vec<_> = [shoulder, hip].into_iter().chain(knee).collect();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, elbow, wrist], tone)
        .limb(&body, if misaligned { Tone::Bad } else { Tone::Good })
        .joint(&elbow, tone)
        .angle(&elbow, "Elbow", elbow_angle)
        .build();

    Detection::from_analysis(out, DetectorState::PushUp { down }, overlay)
}

pub(crate) fn bench_press(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let bar_down = match *prev {
        DetectorState::BenchPress { bar_down } => bar_down,
        _ => false,
    };

    let Some([shoulder, elbow, wrist]) = frame.visible_points(
        [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Keep your pressing arm in frame");
    };

    let elbow_angle = angle_between(&shoulder, &elbow, &wrist);

    let mut out = Analysis::default();
    let (step, bar_down) = out.cycle(bar_down, elbow_angle < 90.0, elbow_angle > 160.0);
    match step {
        Step::Engaged => out.encourage("Touch your chest"),
        Step::Completed => out.celebrate("Strong press!"),
        Step::Hold => {}
    }

    if !bar_down && step == Step::Hold && elbow_angle < 160.0 {
        out.info("Full extension at the top");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, elbow, wrist], tone)
        .joint(&elbow, tone)
        .angle(&elbow, "Elbow", elbow_angle)
        .build();

    Detection::from_analysis(out, DetectorState::BenchPress { bar_down }, overlay)
}

const HIP_LEVEL_TOLERANCE_PX: f64 = 30.0;
const WRIST_STACK_TOLERANCE: f64 = 0.08;

/// Standing press tracked on the right arm, with a hip-level check when
/// both hips are visible.
pub(crate) fn overhead_press(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let at_bottom = match *prev {
        DetectorState::OverheadPress { at_bottom } => at_bottom,
        _ => false,
    };

    let Some([shoulder, elbow, wrist, hip]) = frame.visible_points(
        [
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
        ],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Position yourself so your upper body is visible");
    };

    let elbow_angle = angle_between(&shoulder, &elbow, &wrist);
    let wrist_above_elbow = wrist.y < elbow.y;
    let elbow_above_shoulder = elbow.y < shoulder.y;

    let mut out = Analysis::default();
    let (step, at_bottom) = out.cycle(
        at_bottom,
        elbow_angle < 100.0 && elbow_above_shoulder,
        elbow_angle > 160.0 && wrist_above_elbow,
    );
    match step {
        Step::Engaged => out.encourage("Good! Now press up explosively"),
        Step::Completed => out.celebrate("Excellent press!"),
        Step::Hold => {}
    }

    if at_bottom && wrist_above_elbow && elbow_angle > 100.0 && elbow_angle < 160.0 {
        out.info("Lock out at the top");
    }

    let hips_level = frame
        .visible_points([Joint::LeftHip], min_visibility)
        .map_or(true, |[left_hip]| {
            (left_hip.y - hip.y).abs() * f64::from(frame.height) < HIP_LEVEL_TOLERANCE_PX
        });
    if !hips_level {
        out.warn("Keep your core engaged, hips should stay level");
    }

    let stacked = !wrist_above_elbow || (wrist.x - elbow.x).abs() <= WRIST_STACK_TOLERANCE;
    if !stacked {
        out.warn("Stack your wrists over your elbows");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, elbow, wrist], if stacked { tone } else { Tone::Bad })
        .limb(&[hip, shoulder], if hips_level { Tone::Good } else { Tone::Bad })
        .joint(&elbow, tone)
        .joint(&shoulder, if hips_level { Tone::Good } else { Tone::Bad })
        .angle(&elbow, "Elbow", elbow_angle)
        .build();

    Detection::from_analysis(out, DetectorState::OverheadPress { at_bottom }, overlay)
}

pub(crate) fn lateral_raise(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let arms_down = match *prev {
        DetectorState::LateralRaise { arms_down } => arms_down,
        _ => false,
    };

    let Some([shoulder, elbow, wrist]) = frame.visible_points(
        [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Keep your full arm in frame");
    };

    // Positive once the wrist rises above the shoulder.
    let arm_height = shoulder.y - wrist.y;
    let elbow_angle = angle_between(&shoulder, &elbow, &wrist);

    let mut out = Analysis::default();
    let (step, arms_down) = out.cycle(arms_down, arm_height < -0.15, arm_height > -0.05);
    if step == Step::Completed {
        out.celebrate("Perfect raise!");
    }

    if arm_height > 0.1 {
        out.warn("Don't raise above shoulder height");
    }
    if elbow_angle < 150.0 {
        out.info("Keep only a slight bend in the elbows");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, elbow, wrist], tone)
        .joint(&wrist, tone)
        .angle(&elbow, "Elbow", elbow_angle)
        .build();

    Detection::from_analysis(out, DetectorState::LateralRaise { arms_down }, overlay)
}
