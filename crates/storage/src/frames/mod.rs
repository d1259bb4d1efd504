//! FrameFileSink - writes one file per frame into per-minute directories

mod encode;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use contracts::{ContractError, Frame, FrameFormat, FrameSink};
use tracing::{debug, instrument};

pub use encode::write_frame;

/// Minute bucket directory pattern (local time)
pub const BUCKET_FORMAT: &str = "%Y-%m-%d_%H%M";

/// Bucket name for a capture timestamp; falls back to the current local minute
pub fn minute_bucket(captured_at: Option<f64>) -> String {
    let when = captured_at
        .filter(|t| t.is_finite())
        .and_then(|t| {
            let secs = t.floor();
            let nanos = ((t - secs) * 1e9) as u32;
            DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
        })
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now);
    when.format(BUCKET_FORMAT).to_string()
}

/// Frame file name, `frame{id}.{ext}`
pub fn frame_file_name(id: u64, format: FrameFormat) -> String {
    format!("frame{}.{}", id, format.extension())
}

/// Sink that writes each frame to `<root>/<minute>/frame<id>.<ext>`
pub struct FrameFileSink {
    name: String,
    root: PathBuf,
    format: FrameFormat,
    created_dirs: HashSet<PathBuf>,
}

impl FrameFileSink {
    /// Create a sink; directories are created lazily on first write
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, format: FrameFormat) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            format,
            created_dirs: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    fn bucket_dir(&mut self, captured_at: Option<f64>) -> Result<PathBuf, ContractError> {
        let dir = self.root.join(minute_bucket(captured_at));
        if !self.created_dirs.contains(&dir) {
            // create_dir_all tolerates a concurrent worker creating the same bucket
            fs::create_dir_all(&dir).map_err(|e| ContractError::filesystem(&dir, e))?;
            debug!(sink = %self.name, dir = %dir.display(), "created bucket directory");
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }
}

impl FrameSink for FrameFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "frame_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.id, points = frame.len())
    )]
    fn write(&mut self, frame: &Frame) -> Result<PathBuf, ContractError> {
        let dir = self.bucket_dir(frame.captured_at)?;
        let path = dir.join(frame_file_name(frame.id, self.format));

        let file = File::create(&path).map_err(|e| ContractError::filesystem(&path, e))?;
        let mut out = BufWriter::new(file);
        write_frame(&mut out, frame, self.format)
            .and_then(|()| out.flush())
            .map_err(|e| ContractError::filesystem(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contracts::Point;
    use tempfile::tempdir;

    #[test]
    fn test_bucket_from_timestamp() {
        let t = Local.with_ymd_and_hms(2023, 4, 5, 6, 7, 30).unwrap();
        let bucket = minute_bucket(Some(t.timestamp() as f64 + 0.25));
        assert_eq!(bucket, "2023-04-05_0607");
    }

    #[test]
    fn test_bucket_falls_back_to_now() {
        let before = Local::now().format(BUCKET_FORMAT).to_string();
        let bucket = minute_bucket(None);
        let after = Local::now().format(BUCKET_FORMAT).to_string();
        assert!(bucket == before || bucket == after);
        assert_eq!(minute_bucket(Some(f64::NAN)).len(), before.len());
    }

    #[test]
    fn test_write_creates_bucket_and_file() {
        let dir = tempdir().unwrap();
        let mut sink = FrameFileSink::new("frames", dir.path(), FrameFormat::Csv);
        let t = Local.with_ymd_and_hms(2023, 4, 5, 6, 7, 0).unwrap().timestamp() as f64;

        let mut frame = Frame::new(42, Some(t));
        frame.points.push(Point {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            intensity: 4.0,
        });
        let path = sink.write(&frame).unwrap();

        assert_eq!(path, dir.path().join("2023-04-05_0607").join("frame42.csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1,2,3,4\n");

        // Second frame in the same minute reuses the directory
        let path = sink.write(&Frame::new(43, Some(t + 1.0))).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_write_into_unwritable_root() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        let mut sink = FrameFileSink::new("frames", &blocker, FrameFormat::Ply);
        let err = sink.write(&Frame::new(0, None)).unwrap_err();
        assert!(matches!(err, ContractError::Filesystem { .. }));
    }
}
