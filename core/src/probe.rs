//! Invocation of the external media prober.
//!
//! Every query spawns one short-lived `ffprobe` process, waits for it to
//! exit and parses its JSON document into [`ProbeOutput`]. Callers depend on
//! the [`Prober`] trait so the reconciliation logic can run against scripted
//! documents in tests.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Program used when no explicit prober binary is configured.
pub const DEFAULT_PROBER: &str = "ffprobe";

const STREAM_QUERY: &[&str] = &[
    "-v",
    "error",
    "-select_streams",
    "v:0",
    "-show_entries",
    "stream=width,height,bit_rate,duration",
    "-of",
    "json",
];

const FORMAT_QUERY: &[&str] = &[
    "-v",
    "error",
    "-print_format",
    "json",
    "-select_streams",
    "v:0",
    "-show_format",
    "-show_streams",
];

/// Which document the prober is asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeQuery {
    /// Stream-level width, height, bit rate and duration of the first video stream.
    Stream,
    /// Container-level metadata, consulted when the stream query lacks duration or bit rate.
    Format,
}

impl ProbeQuery {
    fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Stream => STREAM_QUERY,
            Self::Format => FORMAT_QUERY,
        }
    }
}

/// Builds the full argument list for a query against `path`.
pub fn build_ffprobe_args(path: &Path, query: ProbeQuery) -> Vec<OsString> {
    let mut args: Vec<OsString> = query.flags().iter().map(OsString::from).collect();
    args.push(path.as_os_str().to_os_string());
    args
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("prober exited with {} for {}: {}", exit_label(*code), path.display(), stderr.trim())]
    Failed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
    #[error("prober output for {} is not valid JSON: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => String::from("a signal"),
    }
}

/// A numeric field as ffprobe reports it: usually a decimal string, occasionally
/// a bare number, and `"N/A"` when the container does not know the value.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProbeValue {
    Number(serde_json::Number),
    Text(String),
}

impl ProbeValue {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => number.as_f64()?,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }

    /// Whole seconds, truncating any fractional part.
    pub fn whole_seconds(&self) -> Option<u64> {
        self.as_f64().map(|seconds| seconds.trunc() as u64)
    }

    pub fn bits_per_second(&self) -> Option<u64> {
        match self {
            Self::Number(number) => number.as_u64().or_else(|| self.as_f64().map(|v| v as u64)),
            Self::Text(text) => text
                .trim()
                .parse::<u64>()
                .ok()
                .or_else(|| self.as_f64().map(|v| v as u64)),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProbeStream {
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub bit_rate: Option<ProbeValue>,
    #[serde(default)]
    pub duration: Option<ProbeValue>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProbeFormat {
    #[serde(default)]
    pub bit_rate: Option<ProbeValue>,
    #[serde(default)]
    pub duration: Option<ProbeValue>,
}

/// The parts of an ffprobe JSON document this crate reads. Unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: Option<ProbeFormat>,
}

pub fn parse_probe_output(path: &Path, stdout: &[u8]) -> Result<ProbeOutput, ProbeError> {
    serde_json::from_slice(stdout).map_err(|source| ProbeError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

pub trait Prober {
    fn probe(&self, path: &Path, query: ProbeQuery) -> Result<ProbeOutput, ProbeError>;
}

/// Runs the real `ffprobe` binary.
#[derive(Clone, Debug)]
pub struct FfprobeCommand {
    program: PathBuf,
}

impl Default for FfprobeCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROBER),
        }
    }
}

impl FfprobeCommand {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Prober for FfprobeCommand {
    fn probe(&self, path: &Path, query: ProbeQuery) -> Result<ProbeOutput, ProbeError> {
        // `output` drains both pipes and reaps the child before returning,
        // including when the exit status turns out to be non-zero.
        let output = Command::new(&self.program)
            .args(build_ffprobe_args(path, query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        parse_probe_output(path, &output.stdout)
    }
}
