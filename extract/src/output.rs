use crate::error::ExtractError;
use clap::ValueEnum;
use common::{xml, Border};
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

impl OutputFormat {
    /// `.json` files are json, everything else is treated as xml.
    pub fn from_path(path: &Path) -> OutputFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Xml,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "XML",
            OutputFormat::Json => "JSON",
        }
    }
}

/// Creates the temporary file with the mode a plain `File::create` would get, umask included.
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Writes `border` to `path`, replacing whatever is there.
///
/// The document goes to a temporary file next to `path` and is renamed over it once fully
/// flushed, so a failed write never leaves a truncated file behind. An existing file keeps its
/// permissions.
pub fn write_border(border: &Border, path: &Path, format: OutputFormat) -> Result<(), ExtractError> {
    let io_err = |source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let tmp = temp_file_in(dir).map_err(io_err)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(io_err)?;
    }
    let mut writer = BufWriter::new(tmp);

    match format {
        OutputFormat::Xml => xml::write_document(border, &mut writer)?,
        OutputFormat::Json => serde_json::to_writer_pretty(&mut writer, border)?,
    }
    writeln!(writer).map_err(io_err)?;

    let tmp = writer
        .into_inner()
        .map_err(|e| io_err(e.into_error()))?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

pub fn read_border(path: &Path, format: OutputFormat) -> Result<Border, ExtractError> {
    let f = File::open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(f);

    let border = match format {
        OutputFormat::Xml => xml::parse_document(reader)?,
        OutputFormat::Json => serde_json::from_reader(reader)?,
    };
    Ok(border)
}
