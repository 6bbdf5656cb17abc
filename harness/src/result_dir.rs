//! Result directory persistence: write and verify a planner run on disk.
//!
//! # Directory layout (`ResultDirectoryV1`)
//!
//! ```text
//! <dir>/
//!   report.json   canonical JSON, PlannerReportV1 with artifact digests
//!   digest.txt    ASCII digest string ("sha256:..."), hash of report.json
//!   routes.json   canonical JSON, ranked route documents
//!   tree.json     canonical JSON, node-link search graph
//! ```
//!
//! The directory path is never part of any hash surface.
//!
//! # Fail-closed semantics
//!
//! - Missing file → error
//! - Extra file → error
//! - Non-canonical `report.json`, `routes.json`, or `tree.json` → error
//! - Artifact, graph, or route digest disagreeing with the report → error
//! - `digest.txt` disagreeing with `report.json` → error

use std::collections::BTreeSet;
use std::path::Path;

use retro_kernel::proof::canon::canonical_json_bytes;
use retro_kernel::proof::hash::{canonical_hash, ContentHash};
use retro_kernel::proof::hash_domain::HashDomain;

use crate::runner::{PlannerOutcome, PlannerReportV1, REPORT_SCHEMA_VERSION, ROUTES_FILE, TREE_FILE};

const REPORT_FILENAME: &str = "report.json";
const DIGEST_FILENAME: &str = "digest.txt";

/// Every file a result directory must contain, and nothing else.
const RESULT_FILENAMES: &[&str] = &[REPORT_FILENAME, DIGEST_FILENAME, ROUTES_FILE, TREE_FILE];

/// Error writing a result directory.
#[derive(Debug, thiserror::Error)]
pub enum ResultDirWriteError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
}

/// Error reading or verifying a result directory.
#[derive(Debug, thiserror::Error)]
pub enum ResultDirError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("missing file: {filename}")]
    MissingFile { filename: String },
    #[error("undeclared extra file: {name}")]
    ExtraFile { name: String },
    #[error("{filename} is not canonical JSON")]
    NonCanonical { filename: String },
    #[error("report parse error: {detail}")]
    ReportParse { detail: String },
    #[error("report version mismatch: {found}")]
    ReportVersionMismatch { found: String },
    #[error("{subject} digest mismatch: declared={declared}, recomputed={recomputed}")]
    ArtifactMismatch {
        subject: String,
        declared: String,
        recomputed: String,
    },
    #[error("digest mismatch: stored={stored}, recomputed={recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
}

/// Write `outcome` into `dir`, creating it if needed.
///
/// The report and its digest are written last, so a directory interrupted
/// mid-write fails verification instead of passing with stale artifacts.
///
/// # Errors
///
/// Returns [`ResultDirWriteError::Io`] on any filesystem failure.
pub fn write_result_dir(outcome: &PlannerOutcome, dir: &Path) -> Result<(), ResultDirWriteError> {
    std::fs::create_dir_all(dir).map_err(|e| ResultDirWriteError::Io {
        detail: format!("create {}: {e}", dir.display()),
    })?;
    write_atomic(dir.join(TREE_FILE), &outcome.tree_bytes)?;
    write_atomic(dir.join(ROUTES_FILE), &outcome.routes_bytes)?;
    write_atomic(dir.join(REPORT_FILENAME), &outcome.report_bytes)?;
    write_atomic(dir.join(DIGEST_FILENAME), outcome.digest.as_str().as_bytes())?;
    Ok(())
}

/// Read `report.json` after full verification.
///
/// # Errors
///
/// See [`verify_result_dir`].
pub fn read_result_dir(dir: &Path) -> Result<PlannerReportV1, ResultDirError> {
    verify_result_dir(dir)?;
    let bytes = read_required(dir, REPORT_FILENAME)?;
    parse_report(&bytes)
}

/// Check every fail-closed rule and return the result digest.
///
/// # Errors
///
/// Returns the first [`ResultDirError`] encountered.
pub fn verify_result_dir(dir: &Path) -> Result<ContentHash, ResultDirError> {
    let present = list_files(dir)?;
    for required in RESULT_FILENAMES {
        if !present.contains(*required) {
            return Err(ResultDirError::MissingFile {
                filename: (*required).to_string(),
            });
        }
    }
    if let Some(extra) = present
        .iter()
        .find(|name| !RESULT_FILENAMES.contains(&name.as_str()))
    {
        return Err(ResultDirError::ExtraFile {
            name: extra.clone(),
        });
    }

    let report_bytes = read_canonical(dir, REPORT_FILENAME)?;
    let report = parse_report(&report_bytes)?;
    if report.schema_version != REPORT_SCHEMA_VERSION {
        return Err(ResultDirError::ReportVersionMismatch {
            found: report.schema_version,
        });
    }

    let tree_bytes = read_canonical(dir, TREE_FILE)?;
    let routes_bytes = read_canonical(dir, ROUTES_FILE)?;
    for (name, bytes) in [(TREE_FILE, &tree_bytes), (ROUTES_FILE, &routes_bytes)] {
        let declared = report.artifacts.get(name).cloned().unwrap_or_default();
        check_digest(name, &declared, HashDomain::ResultArtifact, bytes)?;
    }
    check_digest("graph", &report.graph_digest, HashDomain::SearchGraph, &tree_bytes)?;
    check_route_digests(&report, &routes_bytes)?;

    let recomputed = canonical_hash(HashDomain::ResultDigest, &report_bytes);
    let stored = read_required(dir, DIGEST_FILENAME)?;
    let stored = String::from_utf8_lossy(&stored).trim().to_string();
    if stored != recomputed.as_str() {
        return Err(ResultDirError::DigestMismatch {
            stored,
            recomputed: recomputed.to_string(),
        });
    }
    Ok(recomputed)
}

fn check_route_digests(report: &PlannerReportV1, routes_bytes: &[u8]) -> Result<(), ResultDirError> {
    let routes: Vec<serde_json::Value> =
        serde_json::from_slice(routes_bytes).map_err(|e| ResultDirError::ReportParse {
            detail: format!("{ROUTES_FILE}: {e}"),
        })?;
    if routes.len() != report.routes.len() {
        return Err(ResultDirError::ArtifactMismatch {
            subject: "route count".into(),
            declared: report.routes.len().to_string(),
            recomputed: routes.len().to_string(),
        });
    }
    for (summary, route) in report.routes.iter().zip(&routes) {
        let bytes = canonical_json_bytes(route).map_err(|_| ResultDirError::NonCanonical {
            filename: ROUTES_FILE.into(),
        })?;
        check_digest(
            &format!("route {}", summary.rank),
            &summary.digest,
            HashDomain::RouteTree,
            &bytes,
        )?;
    }
    Ok(())
}

fn check_digest(
    subject: &str,
    declared: &str,
    domain: HashDomain,
    bytes: &[u8],
) -> Result<(), ResultDirError> {
    let recomputed = canonical_hash(domain, bytes);
    if declared == recomputed.as_str() {
        Ok(())
    } else {
        Err(ResultDirError::ArtifactMismatch {
            subject: subject.to_string(),
            declared: declared.to_string(),
            recomputed: recomputed.to_string(),
        })
    }
}

fn parse_report(bytes: &[u8]) -> Result<PlannerReportV1, ResultDirError> {
    serde_json::from_slice(bytes).map_err(|e| ResultDirError::ReportParse {
        detail: e.to_string(),
    })
}

/// Read a JSON file and require it to be byte-identical to its canonical form.
fn read_canonical(dir: &Path, filename: &str) -> Result<Vec<u8>, ResultDirError> {
    let bytes = read_required(dir, filename)?;
    let non_canonical = || ResultDirError::NonCanonical {
        filename: filename.to_string(),
    };
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|_| non_canonical())?;
    let canonical = canonical_json_bytes(&value).map_err(|_| non_canonical())?;
    if canonical == bytes {
        Ok(bytes)
    } else {
        Err(non_canonical())
    }
}

/// Write bytes via temp file + rename.
fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<(), ResultDirWriteError> {
    let path = path.as_ref();
    let dir = path.parent().ok_or_else(|| ResultDirWriteError::Io {
        detail: format!("{} has no parent directory", path.display()),
    })?;
    let temp_path = dir.join(format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    std::fs::write(&temp_path, content).map_err(|e| ResultDirWriteError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ResultDirWriteError::Io {
        detail: format!("rename {} to {}: {e}", temp_path.display(), path.display()),
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, ResultDirError> {
    std::fs::read(dir.join(filename)).map_err(|_| ResultDirError::MissingFile {
        filename: filename.to_string(),
    })
}

/// Regular files in `dir`, skipping `write_atomic` temp files.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, ResultDirError> {
    let io = |e: std::io::Error| ResultDirError::Io {
        detail: format!("{}: {e}", dir.display()),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let entry = entry.map_err(io)?;
        if !entry.file_type().map_err(io)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(".tmp_") {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}
