// src/recording.rs - Recorded landmark streams in, per-frame reports out
use chrono::{DateTime, Local, Utc};
use csv::{ReaderBuilder, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{CoachError, Result};
use crate::pose::{Frame, Joint, Landmark, PoseLayout};
use crate::session::{FrameReport, SessionSnapshot};

/// One landmark of one frame. `landmark` is either the slot index or the
/// joint name.
#[derive(Debug, Deserialize)]
struct LandmarkRow {
    frame: u64,
    timestamp_ms: i64,
    landmark: String,
    x: f64,
    y: f64,
    #[serde(default)]
    z: Option<f64>,
    #[serde(default)]
    visibility: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RecordedFrame {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub frame: Frame,
}

/// Frames of a recording in capture order.
#[derive(Debug, Clone)]
pub struct Recording {
    pub layout: PoseLayout,
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn from_path(
        path: impl AsRef<Path>,
        layout: PoseLayout,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
        Self::collect(reader, layout, width, height)
    }

    pub fn from_reader<R: Read>(reader: R, layout: PoseLayout, width: u32, height: u32) -> Result<Self> {
        let reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        Self::collect(reader, layout, width, height)
    }

    fn collect<R: Read>(
        mut reader: csv::Reader<R>,
        layout: PoseLayout,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let mut frames: Vec<RecordedFrame> = Vec::new();

        for row in reader.deserialize::<LandmarkRow>() {
            let row = row?;

            let starts_frame = match frames.last() {
                Some(current) if row.frame < current.number => {
                    return Err(CoachError::OutOfOrder {
                        previous: current.number,
                        found: row.frame,
                    });
                }
                Some(current) => row.frame > current.number,
                None => true,
            };

            if starts_frame {
                let timestamp = DateTime::from_timestamp_millis(row.timestamp_ms).ok_or(
                    CoachError::BadTimestamp {
                        frame: row.frame,
                        timestamp_ms: row.timestamp_ms,
                    },
                )?;
                frames.push(RecordedFrame {
                    number: row.frame,
                    timestamp,
                    frame: Frame::empty(layout, width, height),
                });
            }

            let Some(current) = frames.last_mut() else {
                continue;
            };
            let Some(slot) = slot_for(&row.landmark, layout, row.frame)? else {
                tracing::debug!(landmark = %row.landmark, ?layout, "landmark not in layout, skipping");
                continue;
            };

            if let Some(landmark) = current.frame.landmarks.get_mut(slot) {
                *landmark = Landmark {
                    x: row.x,
                    y: row.y,
                    z: row.z.unwrap_or(0.0),
                    visibility: row.visibility.unwrap_or(1.0),
                };
            }
        }

        Ok(Self { layout, frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn slot_for(landmark: &str, layout: PoseLayout, frame: u64) -> Result<Option<usize>> {
    let unknown = || CoachError::UnknownLandmark {
        frame,
        name: landmark.to_string(),
    };
    if let Ok(idx) = landmark.parse::<u64>() {
        return match usize::try_from(idx) {
            Ok(idx) if idx < layout.landmark_count() => Ok(Some(idx)),
            _ => Err(unknown()),
        };
    }
    let joint: Joint = landmark.parse().map_err(|_| unknown())?;
    Ok(joint.index(layout))
}

#[derive(Debug, Serialize)]
struct ReportRecord {
    frame: u64,
    timestamp_ms: i64,
    rep_detected: bool,
    reps: u32,
    feedback: String,
}

/// Writes what a session reported for each frame of a replay.
pub struct ReportExporter {
    output_dir: PathBuf,
    session_name: String,
    records: Vec<ReportRecord>,
}

impl ReportExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            records: Vec::new(),
        }
    }

    pub fn add_frame(&mut self, number: u64, at: DateTime<Utc>, report: &FrameReport) {
        let feedback = report
            .accepted
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" | ");

        self.records.push(ReportRecord {
            frame: number,
            timestamp_ms: at.timestamp_millis(),
            rep_detected: report.rep_detected,
            reps: report.reps,
            feedback,
        });
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("frames.csv");
        self.create_dir()?;

        let mut writer = Writer::from_path(&csv_path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|source| CoachError::Export {
            path: csv_path.clone(),
            source,
        })?;

        Ok(csv_path)
    }

    pub fn export_summary(&self, snapshot: &SessionSnapshot) -> Result<PathBuf> {
        let summary_path = self.session_dir().join("summary.json");
        self.create_dir()?;

        let file = File::create(&summary_path).map_err(|source| CoachError::Export {
            path: summary_path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(file, snapshot)?;

        Ok(summary_path)
    }

    fn create_dir(&self) -> Result<()> {
        let dir = self.session_dir();
        std::fs::create_dir_all(&dir).map_err(|source| CoachError::Export { path: dir, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Feedback;

    const CSV: &str = "\
frame,timestamp_ms,landmark,x,y,z,visibility
0,1000,LEFT_HIP,0.5,0.4,,0.9
0,1000,25,0.5,0.6,0.1,0.8
1,1033,left_hip,0.5,0.41,,
1,1033,LEFT_HEEL,0.5,0.9,,0.9
";

    #[test]
    fn test_rows_group_into_frames() {
        let recording = Recording::from_reader(CSV.as_bytes(), PoseLayout::MediaPipe, 640, 480).unwrap();
        assert_eq!(recording.len(), 2);

        let first = &recording.frames[0];
        assert_eq!(first.number, 0);
        assert_eq!(first.timestamp.timestamp_millis(), 1000);
        assert_eq!(first.frame.landmarks.len(), 33);

        let knee = first.frame.resolve(Joint::LeftKnee).unwrap();
        assert_eq!((knee.y, knee.z, knee.visibility), (0.6, 0.1, 0.8));
        assert!(first.frame.resolve(Joint::RightKnee).is_none());

        let hip = recording.frames[1].frame.resolve(Joint::LeftHip).unwrap();
        assert_eq!(hip.visibility, 1.0);
    }

    #[test]
    fn test_coco_skips_joints_it_lacks() {
        let recording = Recording::from_reader(CSV.as_bytes(), PoseLayout::Coco, 640, 480).unwrap();
        let second = &recording.frames[1].frame;
        assert_eq!(second.landmarks.len(), 17);
        assert!(second.resolve(Joint::LeftHip).is_some());
    }

    #[test]
    fn test_decreasing_frame_numbers_are_rejected() {
        let csv = "frame,timestamp_ms,landmark,x,y\n2,0,NOSE,0.5,0.5\n1,0,NOSE,0.5,0.5\n";
        let err = Recording::from_reader(csv.as_bytes(), PoseLayout::MediaPipe, 640, 480).unwrap_err();
        assert!(matches!(err, CoachError::OutOfOrder { previous: 2, found: 1 }));
    }

    #[test]
    fn test_unknown_landmark_name() {
        let csv = "frame,timestamp_ms,landmark,x,y\n0,0,LEFT_TAIL,0.5,0.5\n";
        let err = Recording::from_reader(csv.as_bytes(), PoseLayout::MediaPipe, 640, 480).unwrap_err();
        assert!(matches!(err, CoachError::UnknownLandmark { frame: 0, .. }));
    }

    #[test]
    fn test_landmark_index_outside_layout() {
        for index in ["33", "18446744073709551615", "99999999999999999999"] {
            let csv = format!("frame,timestamp_ms,landmark,x,y\n0,0,{},0.5,0.5\n", index);
            let err = Recording::from_reader(csv.as_bytes(), PoseLayout::MediaPipe, 640, 480).unwrap_err();
            assert!(matches!(err, CoachError::UnknownLandmark { frame: 0, .. }), "{}", index);
        }

        let csv = "frame,timestamp_ms,landmark,x,y\n0,0,17,0.5,0.5\n";
        assert!(Recording::from_reader(csv.as_bytes(), PoseLayout::Coco, 640, 480).is_err());
        let csv = "frame,timestamp_ms,landmark,x,y\n0,0,16,0.5,0.5\n";
        let recording = Recording::from_reader(csv.as_bytes(), PoseLayout::Coco, 640, 480).unwrap();
        assert_eq!(recording.frames[0].frame.landmarks.len(), 17);
    }

    #[test]
    fn test_export_writes_frame_rows() {
        let dir = std::env::temp_dir().join(format!("form-coach-{}", uuid::Uuid::new_v4()));
        let mut exporter = ReportExporter::new(&dir, Some("replay".to_string()));
        let report = FrameReport {
            rep_detected: true,
            reps: 1,
            accepted: vec![Feedback::success("Great squat!")],
            overlay: Vec::new(),
        };
        exporter.add_frame(7, DateTime::from_timestamp_millis(1500).unwrap(), &report);

        let path = exporter.export_csv().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("frame,timestamp_ms,rep_detected,reps,feedback"));
        assert_eq!(lines.next(), Some("7,1500,true,1,Great squat!"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
