//! Offline unpacker: raw capture files → one frame file per packet

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use contracts::layout::{RECORD_SIZE, TIMESTAMP_PREFIX_SIZE};
use contracts::{parse_timestamp_prefix, ContractError, FrameFormat, FrameSink};
use decoder::{decode_frame, Calibration};
use metrics::counter;
use storage::FrameFileSink;
use tracing::{debug, info, instrument, warn};

use crate::report::{SkippedRecord, UnpackReport};
use crate::scan::{scan_inputs, InputFile};

/// Unpack run options
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Directory holding the `*.bin` captures
    pub input_dir: PathBuf,
    /// Output root; defaults to `input_dir`
    pub output_dir: Option<PathBuf>,
    pub format: FrameFormat,
    /// Worker threads (clamped to the file count)
    pub jobs: usize,
}

impl UnpackOptions {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            format: FrameFormat::Csv,
            jobs: 1,
        }
    }

    pub fn output_root(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.clone())
    }
}

/// Offline unpacker
pub struct Unpacker {
    calibration: Calibration,
    options: UnpackOptions,
}

impl Unpacker {
    pub fn new(calibration: Calibration, options: UnpackOptions) -> Self {
        Self {
            calibration,
            options,
        }
    }

    pub fn options(&self) -> &UnpackOptions {
        &self.options
    }

    /// Unpack every input file
    ///
    /// Per-record and per-file failures land in the report; only an unreadable input
    /// directory fails the run.
    #[instrument(
        name = "unpacker_run",
        skip(self),
        fields(input = %self.options.input_dir.display(), format = ?self.options.format)
    )]
    pub fn run(&self) -> Result<UnpackReport, ContractError> {
        let files = scan_inputs(&self.options.input_dir)?;
        let output_root = self.options.output_root();
        let jobs = self.options.jobs.clamp(1, files.len().max(1));
        info!(
            files = files.len(),
            jobs,
            output = %output_root.display(),
            "unpack started"
        );

        let next = AtomicUsize::new(0);
        let mut report = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..jobs)
                .map(|worker| {
                    let files = &files;
                    let next = &next;
                    let output_root = &output_root;
                    scope.spawn(move || {
                        let mut sink = FrameFileSink::new(
                            format!("unpack-{worker}"),
                            output_root.clone(),
                            self.options.format,
                        );
                        let mut local = UnpackReport::default();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(file) = files.get(index) else { break };
                            local.merge(self.unpack_file(file, &mut sink));
                        }
                        local
                    })
                })
                .collect();

            let mut total = UnpackReport::default();
            for worker in workers {
                let local = worker
                    .join()
                    .map_err(|_| ContractError::Other("unpack worker panicked".to_string()))?;
                total.merge(local);
            }
            Ok::<_, ContractError>(total)
        })?;
        report.sort();
        info!(
            files = report.files,
            records = report.records,
            frames = report.frames_written,
            skipped = report.skipped_count(),
            "unpack finished"
        );
        Ok(report)
    }

    /// Decode and write every record of one file
    #[instrument(
        name = "unpacker_file",
        skip(self, file, sink),
        fields(file = %file.path.display(), records = file.records)
    )]
    pub fn unpack_file(&self, file: &InputFile, sink: &mut dyn FrameSink) -> UnpackReport {
        let mut report = UnpackReport {
            files: 1,
            ..Default::default()
        };

        let handle = match File::open(&file.path) {
            Ok(handle) => handle,
            Err(e) => {
                let err = ContractError::filesystem(&file.path, e);
                warn!(error = %err, "skipping unreadable capture file");
                report
                    .skipped
                    .push(SkippedRecord::new(file.path.clone(), None, None, &err));
                return report;
            }
        };
        let mut reader = BufReader::new(handle);
        let mut buf = Vec::with_capacity(RECORD_SIZE);

        for k in 0..file.records {
            let frame_id = file.first_id + k;
            let offset = k * RECORD_SIZE as u64 + TIMESTAMP_PREFIX_SIZE as u64;

            buf.clear();
            if let Err(e) = reader.by_ref().take(RECORD_SIZE as u64).read_to_end(&mut buf) {
                let err = ContractError::filesystem(&file.path, e);
                warn!(error = %err, offset, "read failed, abandoning rest of file");
                report.skipped.push(SkippedRecord::new(
                    file.path.clone(),
                    Some(offset),
                    Some(frame_id),
                    &err,
                ));
                break;
            }
            report.records += 1;

            let split = TIMESTAMP_PREFIX_SIZE.min(buf.len());
            let (prefix, packet) = buf.split_at(split);
            let captured_at = parse_timestamp_prefix(prefix);

            let written = decode_frame(&self.calibration, frame_id, captured_at, packet)
                .and_then(|frame| sink.write(&frame).map(|path| (path, frame.len())));
            match written {
                Ok((path, points)) => {
                    report.frames_written += 1;
                    report.points_written += points as u64;
                    counter!("xt32_frames_written_total").increment(1);
                    debug!(frame_id, points, path = %path.display(), "frame written");
                }
                Err(err) => {
                    counter!("xt32_frames_skipped_total", "class" => err.class().as_str())
                        .increment(1);
                    warn!(frame_id, offset, error = %err, "record skipped");
                    report.skipped.push(SkippedRecord::new(
                        file.path.clone(),
                        Some(offset),
                        Some(frame_id),
                        &err,
                    ));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::layout::PACKET_SIZE;
    use contracts::ErrorClass;
    use decoder::mock::{record, PacketBuilder};
    use std::fs;
    use tempfile::tempdir;

    /// (timestamp, packet) pairs written back to back
    fn write_capture(path: &std::path::Path, records: &[(f64, Vec<u8>)]) {
        let mut out = Vec::new();
        for (timestamp, packet) in records {
            out.extend_from_slice(&record(*timestamp, packet));
        }
        fs::write(path, out).unwrap();
    }

    fn packet(distance: u16) -> Vec<u8> {
        PacketBuilder::new()
            .azimuth(0, 4500)
            .laser(0, 0, distance, 100)
            .build()
            .to_vec()
    }

    fn frame_files(root: &std::path::Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for bucket in fs::read_dir(root).unwrap() {
            let bucket = bucket.unwrap().path();
            if bucket.is_dir() {
                for f in fs::read_dir(&bucket).unwrap() {
                    out.push(f.unwrap().path());
                }
            }
        }
        out.sort();
        out
    }

    #[test]
    fn test_ids_run_across_files() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_capture(
            &input.path().join("a.bin"),
            &[(1.0, packet(100)), (2.0, packet(200))],
        );
        write_capture(&input.path().join("b.bin"), &[(3.0, packet(300))]);

        let mut options = UnpackOptions::new(input.path());
        options.output_dir = Some(output.path().to_path_buf());
        let report = Unpacker::new(Calibration::xt32(), options).run().unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.records, 3);
        assert_eq!(report.frames_written, 3);
        assert_eq!(report.points_written, 3);
        assert!(report.is_clean());

        let names: Vec<String> = frame_files(output.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["frame0.csv", "frame1.csv", "frame2.csv"]);
    }

    #[test]
    fn test_partial_trailing_record_is_reported() {
        let input = tempdir().unwrap();
        let path = input.path().join("cut.bin");
        let mut bytes = record(1.0, &packet(100)).to_vec();
        bytes.extend_from_slice(&record(2.0, &packet(100))[..17 + 500]);
        fs::write(&path, bytes).unwrap();

        let report = Unpacker::new(Calibration::xt32(), UnpackOptions::new(input.path()))
            .run()
            .unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.frames_written, 1);
        assert_eq!(report.skipped.len(), 1);
        let skip = &report.skipped[0];
        assert_eq!(skip.class, ErrorClass::Framing);
        assert_eq!(skip.frame_id, Some(1));
        assert_eq!(skip.offset, Some(17 + 1097));
        assert!(skip.reason.contains(&format!("expected {PACKET_SIZE}")));
    }

    #[test]
    fn test_bad_record_does_not_stop_file() {
        let input = tempdir().unwrap();
        let bad = PacketBuilder::new().return_mode(0x3b).build().to_vec();
        write_capture(
            &input.path().join("a.bin"),
            &[
                (1.0, packet(100)),
                (2.0, bad),
                (3.0, packet(0)),
            ],
        );

        let report = Unpacker::new(Calibration::xt32(), UnpackOptions::new(input.path()))
            .run()
            .unwrap();

        assert_eq!(report.frames_written, 2);
        assert_eq!(report.points_written, 1);
        assert_eq!(report.skipped[0].frame_id, Some(1));
        // Empty frames still produce a file; the skipped id leaves a gap
        let names: Vec<String> = frame_files(input.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["frame0.csv", "frame2.csv"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = tempdir().unwrap();
        for (i, name) in ["c.bin", "a.bin", "b.bin", "d.bin"].iter().enumerate() {
            let records: Vec<(f64, Vec<u8>)> = (0..3)
                .map(|k| ((i * 10 + k) as f64, packet(50 + k as u16)))
                .collect();
            write_capture(&input.path().join(name), &records);
        }

        let run = |jobs: usize| {
            let output = tempdir().unwrap();
            let mut options = UnpackOptions::new(input.path());
            options.output_dir = Some(output.path().to_path_buf());
            options.jobs = jobs;
            let report = Unpacker::new(Calibration::xt32(), options).run().unwrap();
            let contents: Vec<(String, String)> = frame_files(output.path())
                .iter()
                .map(|p| {
                    (
                        p.file_name().unwrap().to_string_lossy().into_owned(),
                        fs::read_to_string(p).unwrap(),
                    )
                })
                .collect();
            (report, contents)
        };

        let (seq_report, seq_files) = run(1);
        let (par_report, par_files) = run(3);
        assert_eq!(seq_report, par_report);
        assert_eq!(seq_files, par_files);
        assert_eq!(seq_files.len(), 12);
    }

    #[test]
    fn test_every_worker_report_is_merged() {
        let input = tempdir().unwrap();
        for i in 0..6 {
            let mut bytes = record(i as f64, &packet(100)).to_vec();
            bytes.extend_from_slice(&[0u8; 40]);
            fs::write(input.path().join(format!("{i}.bin")), bytes).unwrap();
        }

        let mut options = UnpackOptions::new(input.path());
        options.jobs = 4;
        let report = Unpacker::new(Calibration::xt32(), options).run().unwrap();

        assert_eq!(report.files, 6);
        assert_eq!(report.records, 12);
        assert_eq!(report.frames_written, 6);
        assert_eq!(report.skipped_count(), 6);
        let ids: Vec<Option<u64>> = report.skipped.iter().map(|s| s.frame_id).collect();
        assert_eq!(ids, (0..6).map(|i| Some(2 * i + 1)).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_input_dir_fails_run() {
        let dir = tempdir().unwrap();
        let err = Unpacker::new(
            Calibration::xt32(),
            UnpackOptions::new(dir.path().join("nope")),
        )
        .run()
        .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Filesystem);
    }
}
