//! Command line surface and the batch driver behind it.

use std::{
    fmt,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{ArgAction, Parser};

use crate::{
    convert::{ConvertOptions, convert_file},
    errors::ConvertError,
    writer::OutputFormat,
};

#[derive(Parser, Debug)]
#[command(
    name = "qfx-convert",
    version,
    about = "Convert QFX/OFX files to CSV or JSON format.",
    disable_version_flag = true
)]
pub struct Cli {
    /// QFX/OFX file(s) to convert
    #[arg(value_name = "FILE", required = true)]
    pub input_files: Vec<PathBuf>,

    /// Output in CSV format (default)
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Output file path; defaults to the input name with the format's extension
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compact JSON output (no indentation). Only applies to JSON format
    #[arg(long)]
    pub compact: bool,

    /// Suppress informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub options: ConvertOptions,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

impl Cli {
    pub fn config(&self) -> RunConfig {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Csv
        };

        RunConfig {
            options: ConvertOptions {
                format,
                compact: self.compact,
            },
            output: self.output.clone(),
            quiet: self.quiet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    ConversionFailed,
    UsageError,
}

impl RunStatus {
    pub fn code(&self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::ConversionFailed => 1,
            RunStatus::UsageError => 2,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

fn check_usage(cli: &Cli) -> Result<(), ConvertError> {
    if cli.output.is_some() && cli.input_files.len() > 1 {
        return Err(ConvertError::Usage(
            "Cannot specify single output file (-o) with multiple input files".to_string(),
        ));
    }
    Ok(())
}

/// Converts every input file, reporting progress to `out` and failures to `err`.
///
/// One file failing does not stop the others; the status reflects the whole batch.
pub fn run<O: Write, E: Write>(cli: &Cli, out: &mut O, err: &mut E) -> RunStatus {
    if let Err(e) = check_usage(cli) {
        emit(err, format_args!("Error: {}", e));
        return RunStatus::UsageError;
    }

    let config = cli.config();
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for input in &cli.input_files {
        if input.is_dir() {
            emit(err, format_args!("Warning: Skipping directory: {}", input.display()));
            continue;
        }

        if !config.quiet {
            emit(out, format_args!("Processing {}...", input.display()));
        }

        match convert_file(input, config.output.as_deref(), &config.options) {
            Ok(conversion) => {
                succeeded += 1;
                if !config.quiet {
                    report_success(out, input, &conversion.output, conversion.records);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::debug!(input = %input.display(), error = ?e, "conversion failed");
                emit(err, format_args!("Error processing {}: {}", input.display(), e));
            }
        }
    }

    if !config.quiet && cli.input_files.len() > 1 {
        emit(
            out,
            format_args!("\nProcessed {} file(s) successfully, {} error(s)", succeeded, failed),
        );
    }

    if failed == 0 {
        RunStatus::Success
    } else {
        RunStatus::ConversionFailed
    }
}

fn report_success<O: Write>(out: &mut O, input: &Path, output: &Path, records: usize) {
    emit(out, format_args!("  Created: {} ({} transactions)", output.display(), records));
    if records == 0 {
        emit(out, format_args!("  No transactions found in {}", input.display()));
    }
}

/// Writes one message line. Write errors are logged, never counted as
/// conversion failures.
fn emit<W: Write>(writer: &mut W, message: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(writer, "{}", message) {
        tracing::debug!(error = %e, "could not write message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("qfx-convert").chain(args.iter().copied()))
    }

    #[test]
    fn test_default_format_is_csv() {
        let cli = parse(&["test.ofx"]).unwrap();
        assert_eq!(cli.config().options.format, OutputFormat::Csv);
    }

    #[rstest]
    #[case(&["--csv", "test.ofx"], OutputFormat::Csv)]
    #[case(&["--json", "test.ofx"], OutputFormat::Json)]
    fn test_format_flags(#[case] args: &[&str], #[case] expected: OutputFormat) {
        assert_eq!(parse(args).unwrap().config().options.format, expected);
    }

    #[test]
    fn test_csv_and_json_mutually_exclusive() {
        let err = parse(&["--csv", "--json", "test.ofx"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[rstest]
    #[case(&["-o", "output.csv", "test.ofx"])]
    #[case(&["--output", "output.csv", "test.ofx"])]
    fn test_output_flag(#[case] args: &[&str]) {
        let cli = parse(args).unwrap();
        assert_eq!(cli.config().output, Some(PathBuf::from("output.csv")));
    }

    #[rstest]
    #[case(&["-q", "test.ofx"])]
    #[case(&["--quiet", "test.ofx"])]
    fn test_quiet_flag(#[case] args: &[&str]) {
        assert!(parse(args).unwrap().config().quiet);
    }

    #[test]
    fn test_compact_flag() {
        let cli = parse(&["--json", "--compact", "test.ofx"]).unwrap();
        assert!(cli.config().options.compact);
    }

    #[test]
    fn test_multiple_input_files() {
        let cli = parse(&["file1.ofx", "file2.ofx", "file3.qfx"]).unwrap();
        assert_eq!(cli.input_files.len(), 3);
        assert_eq!(cli.input_files[2], PathBuf::from("file3.qfx"));
    }

    #[test]
    fn test_input_file_required() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[rstest]
    #[case("-v")]
    #[case("--version")]
    fn test_version_flag(#[case] flag: &str) {
        let err = parse(&[flag]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_help_flag() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_output_with_multiple_inputs_is_usage_error() {
        let cli = parse(&["-o", "output.csv", "file1.ofx", "file2.ofx"]).unwrap();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());

        assert_eq!(run(&cli, &mut out, &mut err), RunStatus::UsageError);
        assert!(out.is_empty());
        let err = String::from_utf8(err).unwrap();
        assert!(err.to_lowercase().contains("multiple input files"));
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nonexistent.ofx");
        let cli = parse(&[missing.to_str().unwrap()]).unwrap();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());

        assert_eq!(run(&cli, &mut out, &mut err), RunStatus::ConversionFailed);
        let err = String::from_utf8(err).unwrap();
        assert!(err.to_lowercase().contains("not found"));
        assert!(err.contains("nonexistent.ofx"));
    }

    #[test]
    fn test_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&[dir.path().to_str().unwrap()]).unwrap();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());

        assert_eq!(run(&cli, &mut out, &mut err), RunStatus::Success);
        assert!(String::from_utf8(err).unwrap().contains("Skipping directory"));
    }

    #[rstest]
    #[case(RunStatus::Success, 0)]
    #[case(RunStatus::ConversionFailed, 1)]
    #[case(RunStatus::UsageError, 2)]
    fn test_exit_codes(#[case] status: RunStatus, #[case] expected: u8) {
        assert_eq!(status.code(), expected);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unwritable_message_channels_do_not_change_status() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ofx");
        let cli = parse(&[missing.to_str().unwrap(), dir.path().to_str().unwrap()]).unwrap();

        let status = run(&cli, &mut BrokenPipe, &mut BrokenPipe);
        assert_eq!(status, RunStatus::ConversionFailed);
    }

    #[test]
    fn test_emit_appends_newline() {
        let mut out = Vec::<u8>::new();
        emit(&mut out, format_args!("Processing {}...", "a.qfx"));
        assert_eq!(String::from_utf8(out).unwrap(), "Processing a.qfx...\n");
    }
}
