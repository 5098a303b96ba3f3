// src/overlay.rs - Drawing instructions for the display layer
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::pose::Frame;

const JOINT_RADIUS: f64 = 8.0;

/// Form quality signalled by a cue's colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Good,
    Neutral,
    Bad,
}

impl Tone {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Tone::Good => [76, 175, 80],
            Tone::Neutral => [70, 130, 240],
            Tone::Bad => [244, 67, 54],
        }
    }

    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CueShape {
    /// Polyline through the given pixel positions.
    Line { points: Vec<Point2<f64>> },
    Circle { center: Point2<f64>, radius: f64 },
    Label { at: Point2<f64>, text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayCue {
    pub shape: CueShape,
    pub tone: Tone,
}

/// Collects cues for one frame, converting normalized landmark positions
/// to pixels.
pub(crate) struct OverlayBuilder<'a> {
    frame: &'a Frame,
    cues: Vec<OverlayCue>,
}

impl<'a> OverlayBuilder<'a> {
    pub(crate) fn new(frame: &'a Frame) -> Self {
        Self {
            frame,
            cues: Vec::new(),
        }
    }

    pub(crate) fn limb(mut self, points: &[Point2<f64>], tone: Tone) -> Self {
        let points = points.iter().map(|p| self.frame.to_pixels(p)).collect();
        self.cues.push(OverlayCue {
            shape: CueShape::Line { points },
            tone,
        });
        self
    }

    pub(crate) fn joint(mut self, point: &Point2<f64>, tone: Tone) -> Self {
        self.cues.push(OverlayCue {
            shape: CueShape::Circle {
                center: self.frame.to_pixels(point),
                radius: JOINT_RADIUS,
            },
            tone,
        });
        self
    }

    pub(crate) fn angle(mut self, point: &Point2<f64>, label: &str, degrees: f64) -> Self {
        let text = if label.is_empty() {
            format!("{}°", degrees.round())
        } else {
            format!("{}: {}°", label, degrees.round())
        };
        self.cues.push(OverlayCue {
            shape: CueShape::Label {
                at: self.frame.to_pixels(point),
                text,
            },
            tone: Tone::Neutral,
        });
        self
    }

    pub(crate) fn build(self) -> Vec<OverlayCue> {
        self.cues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::PoseLayout;

    #[test]
    fn test_cues_are_in_pixel_space() {
        let frame = Frame::empty(PoseLayout::MediaPipe, 640, 480);
        let cues = OverlayBuilder::new(&frame)
            .limb(&[Point2::new(0.5, 0.5), Point2::new(1.0, 1.0)], Tone::Good)
            .joint(&Point2::new(0.25, 0.5), Tone::Bad)
            .angle(&Point2::new(0.5, 0.5), "Knee", 89.6)
            .build();

        assert_eq!(
            cues[0].shape,
            CueShape::Line {
                points: vec![Point2::new(320.0, 240.0), Point2::new(640.0, 480.0)]
            }
        );
        assert!(matches!(cues[1].shape, CueShape::Circle { center, .. } if center == Point2::new(160.0, 240.0)));
        assert!(matches!(&cues[2].shape, CueShape::Label { text, .. } if text == "Knee: 90°"));
    }

    #[test]
    fn test_tone_colours() {
        assert_eq!(Tone::Good.hex(), "#4caf50");
        assert_eq!(Tone::Bad.rgb(), [244, 67, 54]);
    }
}
