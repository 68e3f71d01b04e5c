use crate::metadata::{reconcile, VideoMetadata};
use crate::probe::Prober;
use crate::resolution::{ResolutionTier, TIER_THRESHOLDS};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Extensions accepted when none are configured, matched case-sensitively.
pub const DEFAULT_EXTENSIONS: [&str; 3] = [".mp4", ".m4v", ".mkv"];

/// Parameters that control which files a scan considers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Suffixes including the leading dot, e.g. `.mkv`.
    pub extensions: Vec<String>,
}

impl ScanConfig {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect())
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory \"{}\" does not exist.", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Files of one tier, highest bit rate first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierGroup {
    pub tier: ResolutionTier,
    pub files: Vec<VideoMetadata>,
}

/// Result of a scan: the four fixed tiers in report order, followed by
/// `UNKNOWN` only when something landed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedReport {
    pub groups: Vec<TierGroup>,
}

impl GroupedReport {
    fn from_records(records: Vec<VideoMetadata>) -> Self {
        let mut buckets: BTreeMap<ResolutionTier, Vec<VideoMetadata>> = TIER_THRESHOLDS
            .iter()
            .map(|(tier, _)| (*tier, Vec::new()))
            .collect();
        for record in records {
            buckets
                .entry(record.resolution_tier())
                .or_default()
                .push(record);
        }

        let groups = buckets
            .into_iter()
            .map(|(tier, mut files)| {
                // Stable, so equal bit rates keep discovery order.
                files.sort_by(|left, right| right.bit_rate.cmp(&left.bit_rate));
                TierGroup { tier, files }
            })
            .collect();
        Self { groups }
    }

    /// Number of files across every tier.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn has_video_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|candidate| candidate.strip_prefix('.') == Some(ext))
        })
        .unwrap_or(false)
}

/// Recursively yields regular files under `root` whose suffix is in `extensions`.
pub fn discover_videos<'a>(
    root: &Path,
    extensions: &'a [String],
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => (entry.file_type().is_file()
                && has_video_extension(entry.path(), extensions))
            .then(|| entry.into_path()),
            Err(error) => {
                warn!("Skipping unreadable entry: {error}");
                None
            }
        })
}

/// Probes every candidate under `root` in turn and groups the results by tier.
///
/// Files that cannot be reconciled are logged once and left out; only a
/// missing root directory fails the scan.
pub fn scan<P>(
    root: &Path,
    config: &ScanConfig,
    prober: &P,
    progress_bar: &ProgressBar,
) -> Result<GroupedReport, ScanError>
where
    P: Prober + ?Sized,
{
    if !root.is_dir() {
        return Err(ScanError::DirectoryNotFound(root.to_path_buf()));
    }

    let candidates: Vec<PathBuf> = discover_videos(root, &config.extensions).collect();
    info!(
        "Found {} video files in \"{}\"",
        candidates.len(),
        root.display()
    );
    progress_bar.set_length(candidates.len() as u64);

    let mut records = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        info!("Processing: \"{}\"", candidate.display());
        progress_bar.set_message(format!("Probing: {}", candidate.display()));
        match reconcile(&candidate, prober) {
            Ok(metadata) => records.push(metadata),
            Err(error) => warn!("Skipping \"{}\": {error}", candidate.display()),
        }
        progress_bar.inc(1);
    }

    Ok(GroupedReport::from_records(records))
}

#[cfg(test)]
impl GroupedReport {
    fn group(&self, tier: ResolutionTier) -> Option<&TierGroup> {
        self.groups.iter().find(|group| group.tier == tier)
    }

    fn files(&self) -> impl Iterator<Item = &VideoMetadata> {
        self.groups.iter().flat_map(|group| group.files.iter())
    }
}
