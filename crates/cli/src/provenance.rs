//! Provenance sidecars for CLI artifacts.
//!
//! Every file the CLI writes gets a `<stem>.provenance.json` neighbour naming
//! the code revision, the library version, the contact input and the
//! parameters of the run.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Run parameters recorded next to an artifact.
pub struct Payload {
    pub params: Value,
    pub tag: Option<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self { params, tag: None }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }
}

#[derive(Serialize)]
pub struct Callsite {
    pub file: &'static str,
    pub line: u32,
}

/// Serialized provenance block.
#[derive(Serialize)]
pub struct Provenance<'a> {
    pub code_rev: &'static str,
    pub cwc_version: &'static str,
    pub tag: Option<&'a str>,
    pub params: &'a Value,
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsite: Option<Callsite>,
}

impl<'a> Provenance<'a> {
    pub fn new(payload: &'a Payload, outputs: Vec<String>) -> Self {
        Self {
            code_rev: code_rev(),
            cwc_version: cwc::VERSION,
            tag: payload.tag.as_deref(),
            params: &payload.params,
            outputs,
            callsite: None,
        }
    }
}

/// Write the sidecar of `artifact` and return its path.
#[track_caller]
pub fn write_sidecar(artifact: &Path, payload: &Payload) -> Result<PathBuf> {
    let loc = Location::caller();
    let path = sidecar_path(artifact);
    let mut block = Provenance::new(payload, vec![artifact.display().to_string()]);
    block.callsite = Some(Callsite {
        file: loc.file(),
        line: loc.line(),
    });
    let text = serde_json::to_vec_pretty(&block)?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// `dir/sep.json` -> `dir/sep.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map_or_else(|| "artifact".into(), |s| s.to_string_lossy());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// Commit of the running code: `GIT_COMMIT` at build or run time, else
/// `git rev-parse HEAD`, else `"unknown"`. Looked up once per process.
pub fn code_rev() -> &'static str {
    static REV: OnceLock<String> = OnceLock::new();
    REV.get_or_init(|| {
        option_env!("GIT_COMMIT")
            .map(str::to_owned)
            .or_else(|| std::env::var("GIT_COMMIT").ok())
            .filter(|rev| !rev.is_empty())
            .or_else(git_head)
            .unwrap_or_else(|| "unknown".to_owned())
    })
}

fn git_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    Some(rev.trim().to_owned())
}
