// tests/common/mod.rs - Synthetic pose frames
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use form_coach::{Frame, Joint, Landmark, PoseLayout};

pub const VISIBLE: f64 = 0.9;

pub fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
}

pub struct FrameBuilder {
    frame: Frame,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::with_layout(PoseLayout::MediaPipe)
    }

    pub fn with_layout(layout: PoseLayout) -> Self {
        Self {
            frame: Frame::empty(layout, 640, 480),
        }
    }

    pub fn point(mut self, joint: Joint, x: f64, y: f64) -> Self {
        self.frame.set(joint, Landmark::new(x, y, VISIBLE));
        self
    }

    pub fn hidden(mut self, joint: Joint, x: f64, y: f64) -> Self {
        self.frame.set(joint, Landmark::new(x, y, 0.1));
        self
    }

    /// Places `a` straight above the vertex and `c` so that the angle at
    /// the vertex is `degrees`.
    pub fn angle(
        self,
        [a, b, c]: [Joint; 3],
        vertex: (f64, f64),
        reach: f64,
        degrees: f64,
    ) -> Self {
        let (x, y) = vertex;
        let theta = degrees.to_radians();
        self.point(a, x, y - reach)
            .point(b, x, y)
            .point(c, x + reach * theta.sin(), y - reach * theta.cos())
    }

    pub fn build(self) -> Frame {
        self.frame
    }
}

pub fn squat_frame(knee_angle: f64) -> Frame {
    FrameBuilder::new()
        .angle(
            [Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle],
            (0.5, 0.6),
            0.2,
            knee_angle,
        )
        .build()
}

/// Both arms at the same elbow angle, shoulders directly above elbows.
pub fn curl_frame(elbow_angle: f64) -> Frame {
    FrameBuilder::new()
        .angle(
            [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
            (0.4, 0.5),
            0.12,
            elbow_angle,
        )
        .angle(
            [Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist],
            (0.6, 0.5),
            0.12,
            elbow_angle,
        )
        .build()
}

/// Side-on push-up; `hip_drop` is how far the hip sits below the shoulder.
pub fn push_up_frame(elbow_angle: f64, hip_drop: f64) -> Frame {
    let (sx, sy) = (0.3, 0.4);
    FrameBuilder::new()
        .angle(
            [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist],
            (sx, sy + 0.15),
            0.15,
            elbow_angle,
        )
        .point(Joint::LeftHip, sx + 0.35, sy + hip_drop)
        .build()
}

pub fn plank_frame(hip_y: f64) -> Frame {
    FrameBuilder::new()
        .point(Joint::LeftShoulder, 0.2, 0.5)
        .point(Joint::LeftHip, 0.5, hip_y)
        .point(Joint::LeftKnee, 0.7, 0.5)
        .point(Joint::LeftAnkle, 0.9, 0.5)
        .build()
}

/// `rotation` is the horizontal offset of the left shoulder from the right.
pub fn twist_frame(rotation: f64) -> Frame {
    FrameBuilder::new()
        .point(Joint::LeftShoulder, 0.5 + rotation / 2.0, 0.4)
        .point(Joint::RightShoulder, 0.5 - rotation / 2.0, 0.4)
        .build()
}

pub fn bridge_frame(shoulder_y: f64, hip_y: f64) -> Frame {
    FrameBuilder::new()
        .point(Joint::LeftShoulder, 0.2, shoulder_y)
        .point(Joint::LeftHip, 0.5, hip_y)
        .build()
}
