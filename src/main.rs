mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use indicatif::ProgressBar;
use reencode_core::{probe_style, scan, write_report, BarLogWriter, FfprobeCommand, Prober};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(probe_style());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(BarLogWriter::new(progress_bar.clone(), io::stderr))
        .finish();

    let prober = FfprobeCommand::default();
    tracing::subscriber::with_default(subscriber, || {
        execute(&cli, &prober, &progress_bar, &mut io::stdout().lock())
    })
}

/// Runs one scan and maps the outcome to the process exit code, logging any failure once.
fn execute<P, W>(cli: &Cli, prober: &P, progress_bar: &ProgressBar, out: &mut W) -> ExitCode
where
    P: Prober + ?Sized,
    W: Write + ?Sized,
{
    match run(cli, prober, progress_bar, out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run<P, W>(cli: &Cli, prober: &P, progress_bar: &ProgressBar, out: &mut W) -> anyhow::Result<()>
where
    P: Prober + ?Sized,
    W: Write + ?Sized,
{
    let result = scan(&cli.directory, &cli.scan_config(), prober, progress_bar);
    progress_bar.finish_and_clear();
    let report = result?;

    if report.is_empty() {
        info!("No video files could be probed");
    } else {
        info!("Probed {} video files", report.len());
    }
    write_report(&report, out).context("failed to write report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reencode_core::ScanError;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn cli_for(directory: &std::path::Path) -> Cli {
        Cli::try_parse_from([
            std::ffi::OsStr::new("reencode"),
            std::ffi::OsStr::new("-d"),
            directory.as_os_str(),
        ])
        .unwrap()
    }

    fn execute_captured(cli: &Cli) -> (ExitCode, Vec<u8>, Vec<String>) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let prober = FfprobeCommand::with_program("/nonexistent/ffprobe-missing");
        let mut out = Vec::new();
        let code = tracing::subscriber::with_default(subscriber, || {
            execute(cli, &prober, &ProgressBar::hidden(), &mut out)
        });
        let lines = String::from_utf8(logs.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (code, out, lines)
    }

    #[test]
    fn missing_directory_logs_one_error_and_prints_nothing() {
        let dir = tempdir().unwrap();
        let cli = cli_for(&dir.path().join("absent"));

        let (code, out, lines) = execute_captured(&cli);

        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::FAILURE));
        assert!(out.is_empty());
        let errors: Vec<_> = lines.iter().filter(|line| line.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("does not exist"));
        assert!(lines.iter().all(|line| !line.contains("Found")));

        let prober = FfprobeCommand::default();
        let err = run(&cli, &prober, &ProgressBar::hidden(), &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn empty_directory_prints_the_report() {
        let dir = tempdir().unwrap();
        let cli = cli_for(dir.path());

        let (code, out, lines) = execute_captured(&cli);

        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Videos (sorted by bitrate)"));
        assert!(lines.iter().all(|line| !line.contains("ERROR")));
    }
}
