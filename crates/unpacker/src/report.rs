//! Aggregate unpack report

use std::collections::BTreeMap;
use std::path::PathBuf;

use contracts::{ContractError, ErrorClass};
use serde::Serialize;

/// A record (or a whole file) that produced no frame file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub file: PathBuf,
    /// Byte offset of the packet window; `None` when the file itself failed
    pub offset: Option<u64>,
    pub frame_id: Option<u64>,
    pub class: ErrorClass,
    pub reason: String,
}

impl SkippedRecord {
    pub fn new(file: PathBuf, offset: Option<u64>, frame_id: Option<u64>, err: &ContractError) -> Self {
        Self {
            file,
            offset,
            frame_id,
            class: err.class(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of an unpack run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnpackReport {
    pub files: u64,
    pub records: u64,
    pub frames_written: u64,
    pub points_written: u64,
    pub skipped: Vec<SkippedRecord>,
}

impl UnpackReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Skips per error class
    pub fn skipped_by_class(&self) -> BTreeMap<ErrorClass, u64> {
        let mut counts = BTreeMap::new();
        for skip in &self.skipped {
            *counts.entry(skip.class).or_insert(0) += 1;
        }
        counts
    }

    /// Fold a worker's report into this one
    pub fn merge(&mut self, other: UnpackReport) {
        self.files += other.files;
        self.records += other.records;
        self.frames_written += other.frames_written;
        self.points_written += other.points_written;
        self.skipped.extend(other.skipped);
    }

    /// Order skips by file then offset, independent of worker scheduling
    pub fn sort(&mut self) {
        self.skipped
            .sort_by(|a, b| a.file.cmp(&b.file).then(a.offset.cmp(&b.offset)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_classify() {
        let mut total = UnpackReport::default();
        let mut worker = UnpackReport {
            files: 1,
            records: 3,
            frames_written: 2,
            points_written: 10,
            skipped: Vec::new(),
        };
        worker.skipped.push(SkippedRecord::new(
            PathBuf::from("b.bin"),
            Some(17),
            Some(3),
            &ContractError::framing(1080, 40),
        ));
        total.merge(worker);
        total.merge(UnpackReport {
            files: 1,
            records: 1,
            frames_written: 1,
            points_written: 4,
            skipped: vec![SkippedRecord::new(
                PathBuf::from("a.bin"),
                Some(17),
                Some(0),
                &ContractError::UnsupportedReturnMode(0x3b),
            )],
        });
        total.sort();

        assert_eq!(total.records, 4);
        assert_eq!(total.frames_written, 3);
        assert_eq!(total.skipped[0].file, PathBuf::from("a.bin"));
        assert_eq!(total.skipped_by_class().get(&ErrorClass::Framing), Some(&2));
        assert!(!total.is_clean());
    }

    #[test]
    fn test_report_serializes_class_names() {
        let report = UnpackReport {
            skipped: vec![SkippedRecord::new(
                PathBuf::from("x.bin"),
                None,
                None,
                &ContractError::Other("boom".into()),
            )],
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"][0]["class"], "other");
        assert_eq!(json["skipped"][0]["offset"], serde_json::Value::Null);
    }
}
