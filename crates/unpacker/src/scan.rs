//! Input discovery and frame id assignment

use std::fs;
use std::path::{Path, PathBuf};

use contracts::layout::{RECORD_SIZE, TIMESTAMP_PREFIX_SIZE};
use contracts::ContractError;
use tracing::debug;

/// Raw capture file extension
pub const RAW_EXTENSION: &str = "bin";

/// One raw capture file with its slice of the run-wide frame id space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub len: u64,
    /// Records in this file, a partial trailing record included
    pub records: u64,
    /// Frame id of the first record
    pub first_id: u64,
}

/// Number of records a file of `len` bytes holds
///
/// Record `k` has its packet window at `17 + k * 1097`; every window that starts
/// before EOF counts, even if it is cut short.
pub fn record_count(len: u64) -> u64 {
    let prefix = TIMESTAMP_PREFIX_SIZE as u64;
    if len <= prefix {
        return 0;
    }
    (len - prefix).div_ceil(RECORD_SIZE as u64)
}

/// List `*.bin` regular files of `dir` (non-recursive) in name order and assign ids
///
/// # Errors
/// `Filesystem` if the directory cannot be read.
pub fn scan_inputs(dir: &Path) -> Result<Vec<InputFile>, ContractError> {
    let entries = fs::read_dir(dir).map_err(|e| ContractError::filesystem(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ContractError::filesystem(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(RAW_EXTENSION) {
            continue;
        }
        let meta = fs::metadata(&path).map_err(|e| ContractError::filesystem(&path, e))?;
        if !meta.is_file() {
            continue;
        }
        found.push((path, meta.len()));
    }
    found.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    let mut next_id = 0u64;
    let files = found
        .into_iter()
        .map(|(path, len)| {
            let records = record_count(len);
            let file = InputFile {
                path,
                len,
                records,
                first_id: next_id,
            };
            next_id += records;
            file
        })
        .collect::<Vec<_>>();

    debug!(dir = %dir.display(), files = files.len(), records = next_id, "inputs scanned");
    Ok(files)
}
