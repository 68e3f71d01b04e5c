//! Width-based resolution tiers.
//!
//! Only the **width** of the first video stream matters. Thresholds are
//! exclusive lower bounds checked from the highest tier down, so a width of
//! exactly 1900 is 720p rather than 1080p.

use std::fmt::{Display, Formatter};

/// Resolution bucket for a video. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionTier {
    UltraHd,
    FullHd,
    Hd,
    Sd,
    /// Width was zero or negative.
    Unknown,
}

/// Tiers with their exclusive minimum widths, highest first.
pub const TIER_THRESHOLDS: [(ResolutionTier, i64); 4] = [
    (ResolutionTier::UltraHd, 3800),
    (ResolutionTier::FullHd, 1900),
    (ResolutionTier::Hd, 1200),
    (ResolutionTier::Sd, 0),
];

impl ResolutionTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::UltraHd => "4k",
            Self::FullHd => "1080p",
            Self::Hd => "720p",
            Self::Sd => "SD",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for ResolutionTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the first tier whose threshold `width` strictly exceeds.
pub fn resolution_tier(width: i64) -> ResolutionTier {
    TIER_THRESHOLDS
        .iter()
        .find(|(_, min_width)| width > *min_width)
        .map(|(tier, _)| *tier)
        .unwrap_or(ResolutionTier::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn common_widths() {
        assert_eq!(resolution_tier(3840), ResolutionTier::UltraHd);
        assert_eq!(resolution_tier(4096), ResolutionTier::UltraHd);
        assert_eq!(resolution_tier(1920), ResolutionTier::FullHd);
        assert_eq!(resolution_tier(1280), ResolutionTier::Hd);
        assert_eq!(resolution_tier(720), ResolutionTier::Sd);
        assert_eq!(resolution_tier(640), ResolutionTier::Sd);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(resolution_tier(3800), ResolutionTier::FullHd);
        assert_eq!(resolution_tier(3801), ResolutionTier::UltraHd);
        assert_eq!(resolution_tier(1900), ResolutionTier::Hd);
        assert_eq!(resolution_tier(1901), ResolutionTier::FullHd);
        assert_eq!(resolution_tier(1200), ResolutionTier::Sd);
        assert_eq!(resolution_tier(1), ResolutionTier::Sd);
    }

    #[test]
    fn non_positive_width_is_unknown() {
        assert_eq!(resolution_tier(0), ResolutionTier::Unknown);
        assert_eq!(resolution_tier(-1), ResolutionTier::Unknown);
    }

    #[test]
    fn labels_match_report_headings() {
        let labels: Vec<_> = TIER_THRESHOLDS
            .iter()
            .map(|(tier, _)| tier.to_string())
            .collect();
        assert_eq!(labels, ["4k", "1080p", "720p", "SD"]);
        assert_eq!(ResolutionTier::Unknown.label(), "UNKNOWN");
    }

    #[test]
    fn threshold_table_is_in_report_order() {
        assert!(TIER_THRESHOLDS.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert!(TIER_THRESHOLDS.windows(2).all(|pair| pair[0].1 > pair[1].1));
    }

    proptest! {
        #[test]
        fn tier_matches_width_interval(width in -10_000i64..20_000) {
            let expected = if width > 3800 {
                ResolutionTier::UltraHd
            } else if width > 1900 {
                ResolutionTier::FullHd
            } else if width > 1200 {
                ResolutionTier::Hd
            } else if width > 0 {
                ResolutionTier::Sd
            } else {
                ResolutionTier::Unknown
            };
            prop_assert_eq!(resolution_tier(width), expected);
        }
    }
}
