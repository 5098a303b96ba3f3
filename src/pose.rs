// src/pose.rs - Landmark frames delivered by the external pose estimator
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.5;

/// One tracked body point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

fn full_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, z: 0.0, visibility }
    }

    /// Placeholder for a slot the estimator did not fill.
    pub fn missing() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            z: f64::NAN,
            visibility: 0.0,
        }
    }

    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility.is_finite()
    }
}

/// Landmark index convention of the pose model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLayout {
    /// 33-point BlazePose topology.
    #[default]
    MediaPipe,
    /// 17-point COCO keypoints.
    Coco,
}

impl PoseLayout {
    pub fn landmark_count(self) -> usize {
        match self {
            PoseLayout::MediaPipe => 33,
            PoseLayout::Coco => 17,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    pub const ALL: [Joint; 21] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    /// Slot of this joint in a frame of the given layout.
    pub fn index(self, layout: PoseLayout) -> Option<usize> {
        match layout {
            PoseLayout::MediaPipe => Some(match self {
                Joint::Nose => 0,
                Joint::LeftEye => 2,
                Joint::RightEye => 5,
                Joint::LeftEar => 7,
                Joint::RightEar => 8,
                Joint::LeftShoulder => 11,
                Joint::RightShoulder => 12,
                Joint::LeftElbow => 13,
                Joint::RightElbow => 14,
                Joint::LeftWrist => 15,
                Joint::RightWrist => 16,
                Joint::LeftHip => 23,
                Joint::RightHip => 24,
                Joint::LeftKnee => 25,
                Joint::RightKnee => 26,
                Joint::LeftAnkle => 27,
                Joint::RightAnkle => 28,
                Joint::LeftHeel => 29,
                Joint::RightHeel => 30,
                Joint::LeftFootIndex => 31,
                Joint::RightFootIndex => 32,
            }),
            PoseLayout::Coco => match self {
                Joint::Nose => Some(0),
                Joint::LeftEye => Some(1),
                Joint::RightEye => Some(2),
                Joint::LeftEar => Some(3),
                Joint::RightEar => Some(4),
                Joint::LeftShoulder => Some(5),
                Joint::RightShoulder => Some(6),
                Joint::LeftElbow => Some(7),
                Joint::RightElbow => Some(8),
                Joint::LeftWrist => Some(9),
                Joint::RightWrist => Some(10),
                Joint::LeftHip => Some(11),
                Joint::RightHip => Some(12),
                Joint::LeftKnee => Some(13),
                Joint::RightKnee => Some(14),
                Joint::LeftAnkle => Some(15),
                Joint::RightAnkle => Some(16),
                Joint::LeftHeel
                | Joint::RightHeel
                | Joint::LeftFootIndex
                | Joint::RightFootIndex => None,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Joint::Nose => "NOSE",
            Joint::LeftEye => "LEFT_EYE",
            Joint::RightEye => "RIGHT_EYE",
            Joint::LeftEar => "LEFT_EAR",
            Joint::RightEar => "RIGHT_EAR",
            Joint::LeftShoulder => "LEFT_SHOULDER",
            Joint::RightShoulder => "RIGHT_SHOULDER",
            Joint::LeftElbow => "LEFT_ELBOW",
            Joint::RightElbow => "RIGHT_ELBOW",
            Joint::LeftWrist => "LEFT_WRIST",
            Joint::RightWrist => "RIGHT_WRIST",
            Joint::LeftHip => "LEFT_HIP",
            Joint::RightHip => "RIGHT_HIP",
            Joint::LeftKnee => "LEFT_KNEE",
            Joint::RightKnee => "RIGHT_KNEE",
            Joint::LeftAnkle => "LEFT_ANKLE",
            Joint::RightAnkle => "RIGHT_ANKLE",
            Joint::LeftHeel => "LEFT_HEEL",
            Joint::RightHeel => "RIGHT_HEEL",
            Joint::LeftFootIndex => "LEFT_FOOT_INDEX",
            Joint::RightFootIndex => "RIGHT_FOOT_INDEX",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown joint name: {0}")]
pub struct UnknownJoint(pub String);

impl FromStr for Joint {
    type Err = UnknownJoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Joint::ALL
            .into_iter()
            .find(|joint| joint.name() == wanted)
            .ok_or_else(|| UnknownJoint(s.to_string()))
    }
}

/// All landmarks for one video tick plus the source frame size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub layout: PoseLayout,
    pub landmarks: Vec<Landmark>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(layout: PoseLayout, landmarks: Vec<Landmark>, width: u32, height: u32) -> Self {
        Self {
            layout,
            landmarks,
            width,
            height,
        }
    }

    pub fn mediapipe(landmarks: Vec<Landmark>, width: u32, height: u32) -> Self {
        Self::new(PoseLayout::MediaPipe, landmarks, width, height)
    }

    /// A frame of the layout's size with every slot missing.
    pub fn empty(layout: PoseLayout, width: u32, height: u32) -> Self {
        Self::new(layout, vec![Landmark::missing(); layout.landmark_count()], width, height)
    }

    pub fn set(&mut self, joint: Joint, landmark: Landmark) {
        if let Some(idx) = joint.index(self.layout) {
            if idx >= self.landmarks.len() {
                self.landmarks.resize(idx + 1, Landmark::missing());
            }
            self.landmarks[idx] = landmark;
        }
    }

    pub fn resolve(&self, joint: Joint) -> Option<&Landmark> {
        resolve(self, joint)
    }

    /// Points for every requested joint, or `None` as soon as one of them
    /// is absent or not confidently tracked.
    pub fn visible_points<const N: usize>(
        &self,
        joints: [Joint; N],
        threshold: f64,
    ) -> Option<[Point2<f64>; N]> {
        let mut points = [Point2::origin(); N];
        for (slot, joint) in points.iter_mut().zip(joints) {
            let landmark = self.resolve(joint).filter(|lm| is_visible(Some(lm), threshold))?;
            *slot = landmark.point();
        }
        Some(points)
    }

    /// Normalized position scaled to source pixels.
    pub fn to_pixels(&self, point: &Point2<f64>) -> Point2<f64> {
        Point2::new(point.x * self.width as f64, point.y * self.height as f64)
    }
}

/// Looks up a joint by name. Slots the layout lacks, slots beyond the end
/// of a short frame and entries with non-finite values are all absent.
pub fn resolve(frame: &Frame, joint: Joint) -> Option<&Landmark> {
    let idx = joint.index(frame.layout)?;
    frame.landmarks.get(idx).filter(|lm| lm.is_well_formed())
}

pub fn is_visible(landmark: Option<&Landmark>, threshold: f64) -> bool {
    landmark.map_or(false, |lm| lm.visibility > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_indices() {
        assert_eq!(Joint::RightElbow.index(PoseLayout::MediaPipe), Some(14));
        assert_eq!(Joint::RightElbow.index(PoseLayout::Coco), Some(8));
        assert_eq!(Joint::LeftHeel.index(PoseLayout::Coco), None);
    }

    #[test]
    fn test_resolve_short_and_malformed_frames() {
        let mut frame = Frame::mediapipe(vec![Landmark::new(0.5, 0.5, 0.9); 12], 640, 480);
        assert!(frame.resolve(Joint::LeftShoulder).is_some());
        assert!(frame.resolve(Joint::RightShoulder).is_none());

        frame.landmarks[11].x = f64::NAN;
        assert!(frame.resolve(Joint::LeftShoulder).is_none());
    }

    #[test]
    fn test_unknown_joint_error_names_the_input() {
        let err = "LEFT_TAIL".parse::<Joint>().unwrap_err();
        assert_eq!(err, UnknownJoint("LEFT_TAIL".to_string()));
        assert_eq!(err.to_string(), "unknown joint name: LEFT_TAIL");
    }

    #[test]
    fn test_visibility_threshold_is_strict() {
        let lm = Landmark::new(0.5, 0.5, 0.5);
        assert!(!is_visible(Some(&lm), 0.5));
        assert!(is_visible(Some(&lm), 0.49));
        assert!(!is_visible(None, 0.0));
    }

    #[test]
    fn test_joint_names_round_trip() {
        assert_eq!("right_elbow".parse::<Joint>(), Ok(Joint::RightElbow));
        assert_eq!(" LEFT_FOOT_INDEX ".parse::<Joint>(), Ok(Joint::LeftFootIndex));
        assert!("LEFT_TAIL".parse::<Joint>().is_err());
    }

    #[test]
    fn test_set_grows_frame_and_scales_pixels() {
        let mut frame = Frame::mediapipe(Vec::new(), 640, 480);
        frame.set(Joint::LeftKnee, Landmark::new(0.25, 0.5, 1.0));

        assert_eq!(frame.landmarks.len(), 26);
        let px = frame.to_pixels(&frame.resolve(Joint::LeftKnee).unwrap().point());
        assert_eq!((px.x, px.y), (160.0, 240.0));
    }

    #[test]
    fn test_visible_points_requires_all_joints() {
        let mut frame = Frame::empty(PoseLayout::MediaPipe, 640, 480);
        frame.set(Joint::LeftHip, Landmark::new(0.5, 0.4, 0.9));
        frame.set(Joint::LeftKnee, Landmark::new(0.5, 0.6, 0.2));

        assert!(frame.visible_points([Joint::LeftHip], 0.5).is_some());
        assert!(frame.visible_points([Joint::LeftHip, Joint::LeftKnee], 0.5).is_none());
    }
}
