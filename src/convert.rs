use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    builder::ParserBuilder,
    errors::ConvertError,
    normalize::normalize,
    writer::{self, OutputFormat, WriteOptions},
};

/// Settings shared by every file of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub format: OutputFormat,
    pub compact: bool,
}

impl ConvertOptions {
    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            compact: self.compact,
        }
    }
}

/// Outcome of one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub output: PathBuf,
    pub records: usize,
}

/// `statement.qfx` → `statement.csv` / `statement.json`.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Parses `input`, normalizes its transactions and writes them to `output`
/// (or next to the input when `output` is `None`).
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let bytes = fs::read(input).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConvertError::NotFound(input.to_path_buf()),
        _ => ConvertError::Read {
            path: input.to_path_buf(),
            source,
        },
    })?;

    let statement = ParserBuilder::new()
        .bytes(&bytes)
        .filename(input)
        .parse()?;
    let records = normalize(&statement);
    tracing::debug!(
        input = %input.display(),
        accounts = statement.accounts.len(),
        records = records.len(),
        "normalized statement"
    );

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, options.format));
    writer::write_records(&records, &output, options.format, options.write_options())?;

    Ok(Conversion {
        output,
        records: records.len(),
    })
}
