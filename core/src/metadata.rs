//! Reconciles one or two prober documents into a fixed-shape record.

use crate::probe::{ProbeError, ProbeFormat, ProbeQuery, Prober};
use crate::resolution::{resolution_tier, ResolutionTier};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Technical metadata for one video file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Bits per second, 0 when neither query reported it.
    pub bit_rate: u64,
    /// Whole seconds, 0 when neither query reported it.
    pub duration_secs: u64,
    pub size_bytes: u64,
}

impl VideoMetadata {
    pub fn resolution_tier(&self) -> ResolutionTier {
        resolution_tier(i64::from(self.width))
    }

    fn needs_format_query(&self) -> bool {
        self.duration_secs == 0 || self.bit_rate == 0
    }
}

#[derive(Debug, Error)]
pub enum Unavailability {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("size lookup failed: {0}")]
    Size(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata unavailable for {}: {cause}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        cause: Unavailability,
    },
    #[error("no video stream in {}", path.display())]
    NoVideoStream { path: PathBuf },
    #[error("invalid width {width} in {}", path.display())]
    InvalidWidth { path: PathBuf, width: i64 },
}

impl MetadataError {
    fn unavailable(path: &Path, cause: impl Into<Unavailability>) -> Self {
        Self::Unavailable {
            path: path.to_path_buf(),
            cause: cause.into(),
        }
    }
}

/// Probes `path` and assembles its [`VideoMetadata`].
///
/// The stream query runs first. When it leaves duration or bit rate at zero
/// the format query runs as well and both fields are taken from its `format`
/// section, even if only one of them was missing. A failed format query
/// leaves both at zero instead of failing the record.
pub fn reconcile<P>(path: &Path, prober: &P) -> Result<VideoMetadata, MetadataError>
where
    P: Prober + ?Sized,
{
    let primary = prober
        .probe(path, ProbeQuery::Stream)
        .map_err(|error| MetadataError::unavailable(path, error))?;
    debug!(?primary, "stream query for {}", path.display());

    let stream = primary
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| MetadataError::NoVideoStream {
            path: path.to_path_buf(),
        })?;

    let width = match stream.width {
        Some(width) if width > 0 => u32::try_from(width).map_err(|_| MetadataError::InvalidWidth {
            path: path.to_path_buf(),
            width,
        })?,
        other => {
            return Err(MetadataError::InvalidWidth {
                path: path.to_path_buf(),
                width: other.unwrap_or(0),
            })
        }
    };

    let mut metadata = VideoMetadata {
        path: path.to_path_buf(),
        width,
        height: stream
            .height
            .and_then(|height| u32::try_from(height).ok())
            .unwrap_or(0),
        bit_rate: stream
            .bit_rate
            .and_then(|value| value.bits_per_second())
            .unwrap_or(0),
        duration_secs: stream
            .duration
            .and_then(|value| value.whole_seconds())
            .unwrap_or(0),
        size_bytes: 0,
    };

    if metadata.needs_format_query() {
        let format = match prober.probe(path, ProbeQuery::Format) {
            Ok(document) => {
                debug!(format = ?document.format, "format query for {}", path.display());
                document.format.unwrap_or_default()
            }
            Err(error) => {
                warn!("Supplemental probe failed for \"{}\": {error}", path.display());
                ProbeFormat::default()
            }
        };
        metadata.duration_secs = format
            .duration
            .and_then(|value| value.whole_seconds())
            .unwrap_or(0);
        metadata.bit_rate = format
            .bit_rate
            .and_then(|value| value.bits_per_second())
            .unwrap_or(0);
    }

    metadata.size_bytes = fs::metadata(path)
        .map_err(|error| MetadataError::unavailable(path, error))?
        .len();

    Ok(metadata)
}
