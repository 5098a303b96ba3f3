// src/detectors/trunk.rs - Core exercises
use super::cycle::{Analysis, Step};
use super::{Detection, DetectorState, TwistSide};
use crate::geometry::distance;
use crate::overlay::{OverlayBuilder, Tone};
use crate::pose::{Frame, Joint};

const PLANK_ALIGNMENT: f64 = 0.15;
const HIP_OFFSET: f64 = 0.1;

/// Isometric hold. Never counts reps, only reports alignment.
pub(crate) fn plank(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
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

    let misalignment =
        (shoulder.y - hip.y).abs() + (hip.y - knee.y).abs() + (knee.y - ankle.y).abs();
    let good_form = misalignment < PLANK_ALIGNMENT;

    let mut out = Analysis::default();
    if good_form {
        out.info("Perfect form! Keep holding!");
    } else if hip.y > shoulder.y + HIP_OFFSET {
        out.warn("Lift your hips up");
    } else if hip.y < shoulder.y - HIP_OFFSET {
        out.warn("Lower your hips slightly");
    }

    let was_good = matches!(*prev, DetectorState::Plank { good_form: true });
    if was_good != good_form {
        out.mark_phase_change();
    }

    let tone = if good_form { Tone::Good } else { Tone::Bad };
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, hip, knee, ankle], tone)
        .joint(&hip, tone)
        .build();

    Detection::from_analysis(out, DetectorState::Plank { good_form }, overlay)
}

pub(crate) fn crunch(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let crunched_up = match *prev {
        DetectorState::Crunch { crunched_up } => crunched_up,
        _ => false,
    };

    let Some([shoulder, hip]) =
        frame.visible_points([Joint::LeftShoulder, Joint::LeftHip], min_visibility)
    else {
        return Detection::reposition(prev, "Turn sideways so your torso is visible");
    };

    let torso = distance(&shoulder, &hip);

    let mut out = Analysis::default();
    let (step, crunched_up) = out.cycle(crunched_up, torso < 0.25, torso > 0.35);
    match step {
        Step::Engaged => out.encourage("Squeeze your abs!"),
        Step::Completed => out.celebrate("Great crunch!"),
        Step::Hold => {}
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[shoulder, hip], tone)
        .joint(&shoulder, tone)
        .build();

    Detection::from_analysis(out, DetectorState::Crunch { crunched_up }, overlay)
}

const TWIST_REACHED: f64 = 0.15;
const TWIST_SHALLOW: f64 = 0.1;

/// One rep per change of side; the first side reached only arms the cycle.
pub(crate) fn russian_twist(frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
    let side = match *prev {
        DetectorState::RussianTwist { side } => side,
        _ => TwistSide::Centre,
    };

    let Some([left, right]) = frame.visible_points(
        [Joint::LeftShoulder, Joint::RightShoulder],
        min_visibility,
    ) else {
        return Detection::reposition(prev, "Keep both shoulders in frame");
    };

    let rotation = left.x - right.x;
    let reached = if rotation > TWIST_REACHED {
        Some(TwistSide::Left)
    } else if rotation < -TWIST_REACHED {
        Some(TwistSide::Right)
    } else {
        None
    };

    let mut out = Analysis::default();
    let next_side = match reached {
        Some(new_side) if new_side != side => {
            if side != TwistSide::Centre {
                out.count_rep();
                out.celebrate("Good twist!");
            } else {
                out.mark_phase_change();
            }
            new_side
        }
        _ => side,
    };

    if rotation.abs() < TWIST_SHALLOW {
        out.info("Twist further to each side");
    }

    let tone = out.tone();
    let overlay = OverlayBuilder::new(frame)
        .limb(&[left, right], tone)
        .joint(&left, tone)
        .joint(&right, tone)
        .build();

    Detection::from_analysis(out, DetectorState::RussianTwist { side: next_side }, overlay)
}
