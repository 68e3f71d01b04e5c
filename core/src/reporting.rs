use crate::metadata::VideoMetadata;
use crate::scanner::GroupedReport;
use console::style;
use std::io::{self, Write};

const TITLE: &str = "Videos (sorted by bitrate)";
const PATH_HEADING: &str = "File Path";
const BIT_RATE_HEADING: &str = "Bit Rate (kbps)";
const DURATION_HEADING: &str = "Duration";

const SECONDS_PER_DAY: u64 = 86_400;

/// Integer kilobits per second, using 1024 bits per kilobit.
pub fn bit_rate_kbps(bit_rate: u64) -> u64 {
    bit_rate / 1024
}

/// Formats whole seconds as `H:MM:SS`, prefixed with a day count past 24 hours.
pub fn format_duration(total_secs: u64) -> String {
    let days = total_secs / SECONDS_PER_DAY;
    let rest = total_secs % SECONDS_PER_DAY;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

struct Row {
    path: String,
    kbps: String,
    duration: String,
}

impl Row {
    fn from_metadata(metadata: &VideoMetadata) -> Self {
        Self {
            path: metadata.path.display().to_string(),
            kbps: bit_rate_kbps(metadata.bit_rate).to_string(),
            duration: format_duration(metadata.duration_secs),
        }
    }
}

/// Renders a tier-labelled table with one row per file.
pub fn render_report(report: &GroupedReport) -> String {
    let sections: Vec<(String, Vec<Row>)> = report
        .groups
        .iter()
        .map(|group| {
            (
                group.tier.label().to_uppercase(),
                group.files.iter().map(Row::from_metadata).collect(),
            )
        })
        .collect();

    let path_width = sections
        .iter()
        .flat_map(|(label, rows)| {
            std::iter::once(label.chars().count())
                .chain(rows.iter().map(|row| row.path.chars().count()))
        })
        .fold(PATH_HEADING.len(), usize::max);
    let kbps_width = sections
        .iter()
        .flat_map(|(_, rows)| rows.iter().map(|row| row.kbps.len()))
        .fold(BIT_RATE_HEADING.len(), usize::max);
    let duration_width = sections
        .iter()
        .flat_map(|(_, rows)| rows.iter().map(|row| row.duration.len()))
        .fold(DURATION_HEADING.len(), usize::max);
    let total_width = path_width + kbps_width + duration_width + 4;

    let mut lines = vec![
        String::new(),
        style(format!("{TITLE:^total_width$}")).italic().to_string(),
        style(format!(
            "{PATH_HEADING:<path_width$}  {BIT_RATE_HEADING:>kbps_width$}  {DURATION_HEADING:>duration_width$}"
        ))
        .bold()
        .to_string(),
        "-".repeat(total_width),
    ];

    for (label, rows) in &sections {
        lines.push(
            style(format!("{label:<total_width$}"))
                .bold()
                .white()
                .on_green()
                .to_string(),
        );
        for row in rows {
            lines.push(format!(
                "{:<path_width$}  {}  {}",
                row.path,
                style(format!("{:>kbps_width$}", row.kbps)).cyan(),
                style(format!("{:>duration_width$}", row.duration)).magenta(),
            ));
        }
    }

    lines.join("\n")
}

pub fn write_report<W: Write + ?Sized>(report: &GroupedReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", render_report(report))
}
