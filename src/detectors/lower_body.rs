// src/detectors/lower_body.rs
use super::cycle::{Analysis, Step};
use super::{Detection, DetectorState};
use crate::geometry::angle_between;
use crate::overlay::{OverlayBuilder, Tone};
use crate::pose::{Frame, Joint};

const STANDING_KNEE: f64 = 160.0;
const SQUAT_DEPTH_KNEE: f64 = 90.0;
const KNEE_TRAVEL: f64 = 0.15;

pub(crate) fn squat(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let squat_down = match *prev {
        DetectorState::Squat { squat_down } => squat_down,
        _ => false,
    };

    let Some([hip, knee, ankle]) = frame.visible_points(
        [Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Step back so your whole leg is visible");
    };

    let knee_angle = angle_between(&hip, &knee, &ankle);

    let mut out = Analysis::default();
    let (step, next_down) = out.cycle(
        squat_down,
        knee_angle < SQUAT_DEPTH_KNEE,
        knee_angle > STANDING_KNEE,
    );
    match step {
        Step::Engaged => out.encourage("Good depth!"),
        Step::Completed => out.celebrate("Great squat!"),
        Step::Hold => {}
    }

    let knees_forward = squat_down && (knee.x - ankle.x).abs() > KNEE_TRAVEL;
    if knees_forward {
        out.warn("Keep your knees behind your toes");
    }
    if knee_angle > SQUAT_DEPTH_KNEE && knee_angle < 110.0 {
        out.info("Go deeper for full range");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[hip, knee, ankle], tone)
        .joint(&knee, if knees_forward { Tone::Bad } else { tone })
        .angle(&knee, "Knee", knee_angle)
        .build();

    Detection::from_analysis(out, DetectorState::Squat { squat_down: next_down }, overlay)
}

/// Either leg may lead; the deeper knee drives the cycle.
pub(crate) fn lunge(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let in_lunge = match *prev {
        DetectorState::Lunge { in_lunge } => in_lunge,
        _ => false,
    };

    let Some([lh, lk, la, rh, rk, ra]) = frame.visible_points(
        [
            Joint::LeftHip,
            Joint::LeftKnee,
            Joint::LeftAnkle,
            Joint::RightHip,
            Joint::RightKnee,
            Joint::RightAnkle,
        ],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Step back so both legs are visible");
    };

    let left = angle_between(&lh, &lk, &la);
    let right = angle_between(&rh, &rk, &ra);
    let deepest = left.min(right);

    let mut out = Analysis::default();
    let (step, in_lunge) = out.cycle(in_lunge, deepest < 100.0, deepest > STANDING_KNEE);
    match step {
        Step::Engaged => out.encourage("Nice depth!"),
        Step::Completed => out.celebrate("Perfect lunge!"),
        Step::Hold => {}
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[lh, lk, la], tone)
        .limb(&[rh, rk, ra], tone)
        .angle(&lk, "", left)
        .angle(&rk, "", right)
        .build();

    Detection::from_analysis(out, DetectorState::Lunge { in_lunge }, overlay)
}

const HEEL_RAISED: f64 = 0.04;
const HEEL_LOWERED: f64 = 0.015;
const HEEL_FULL_RAISE: f64 = 0.06;

/// Heel lift measured against the toes, so it needs a layout with feet.
pub(crate) fn calf_raise(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let raised = match *prev {
        DetectorState::CalfRaise { raised } => raised,
        _ => false,
    };

    let Some([ankle, heel, toe]) = frame.visible_points(
        [Joint::LeftAnkle, Joint::LeftHeel, Joint::LeftFootIndex],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Keep your feet in frame");
    };

    let lift = toe.y - heel.y;

    let mut out = Analysis::default();
    let (step, raised) = out.cycle(raised, lift > HEEL_RAISED, lift < HEEL_LOWERED);
    match step {
        Step::Engaged => out.encourage("Hold at the top!"),
        Step::Completed => out.celebrate("Good raise!"),
        Step::Hold => {}
    }

    if raised && step == Step::Hold && lift < HEEL_FULL_RAISE {
        out.info("Raise higher on your toes");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[ankle, heel, toe], tone)
        .joint(&heel, tone)
        .build();

    Detection::from_analysis(out, DetectorState::CalfRaise { raised }, overlay)
}
