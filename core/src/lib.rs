//! Core video inventory engine for reencode.
//!
//! A scan walks a directory tree, probes each candidate video with
//! `ffprobe` (falling back to a container-level query when stream-level
//! duration or bit rate is missing), buckets the reconciled records by
//! resolution tier and orders each tier by descending bit rate. Files are
//! probed strictly one at a time.

pub mod metadata;
pub mod probe;
pub mod progress;
pub mod reporting;
pub mod resolution;
pub mod scanner;

pub use metadata::{reconcile, MetadataError, Unavailability, VideoMetadata};
pub use probe::{
    build_ffprobe_args, parse_probe_output, FfprobeCommand, ProbeError, ProbeFormat, ProbeOutput,
    ProbeQuery, ProbeStream, ProbeValue, Prober, DEFAULT_PROBER,
};
pub use progress::{probe_style, BarLogWriter};
pub use reporting::{bit_rate_kbps, format_duration, render_report, write_report};
pub use resolution::{resolution_tier, ResolutionTier, TIER_THRESHOLDS};
pub use scanner::{
    discover_videos, has_video_extension, scan, GroupedReport, ScanConfig, ScanError, TierGroup,
    DEFAULT_EXTENSIONS,
};
