//! CSV and JSON serialization of normalized records.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use serde::Serialize;
use tempfile::{Builder, NamedTempFile};

use crate::{
    errors::ConvertError,
    normalize::{COLUMNS, NormalizedRecord},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// JSON only: no indentation or separator whitespace.
    pub compact: bool,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    transactions: &'a [NormalizedRecord],
}

pub fn write_csv<W: Write>(records: &[NormalizedRecord], writer: W) -> io::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.write_record(record.fields())?;
    }
    csv_writer.flush()
}

pub fn write_json<W: Write>(
    records: &[NormalizedRecord],
    mut writer: W,
    options: WriteOptions,
) -> io::Result<()> {
    let document = JsonDocument { transactions: records };
    if options.compact {
        serde_json::to_writer(&mut writer, &document)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, &document)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()
}

pub fn write<W: Write>(
    records: &[NormalizedRecord],
    writer: W,
    format: OutputFormat,
    options: WriteOptions,
) -> io::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(records, writer),
        OutputFormat::Json => write_json(records, writer, options),
    }
}

/// Creates the staging file next to `path`. It takes the permissions of the
/// file it replaces, or those of a freshly created file (0o666 less the umask).
fn temp_file_for(path: &Path, dir: &Path) -> io::Result<NamedTempFile> {
    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut builder = Builder::new();
    builder.prefix(".qfx-convert");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let file = builder.tempfile_in(dir)?;

    if let Some(permissions) = existing {
        file.as_file().set_permissions(permissions)?;
    }
    Ok(file)
}

/// Writes `records` to `path`, replacing it only once the full output is on disk.
pub fn write_records(
    records: &[NormalizedRecord],
    path: &Path,
    format: OutputFormat,
    options: WriteOptions,
) -> Result<(), ConvertError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = temp_file_for(path, dir).map_err(|e| ConvertError::write(path, e))?;
    write(records, io::BufWriter::new(file.as_file_mut()), format, options)
        .map_err(|e| ConvertError::write(path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ConvertError::write(path, e))?;
    file.persist(path)
        .map_err(|e| ConvertError::write(path, e.error))?;

    tracing::debug!(path = %path.display(), records = records.len(), ?format, "wrote output");
    Ok(())
}
