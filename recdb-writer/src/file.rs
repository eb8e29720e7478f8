//! Atomic whole-file writes.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use recdb_core::Database;

use crate::error::WriterError;
use crate::options::WriterOptions;
use crate::writer::Writer;

/// Renders `db` and writes it to `path` atomically: the text is written to a
/// fresh temp file in the same directory, then the temp file is renamed over
/// `path`. The destination's existing mode bits, if any, are preserved; if
/// the rename fails the temp file is removed rather than left behind.
pub fn write_database_file(path: impl AsRef<Path>, db: &Database, options: WriterOptions) -> Result<(), WriterError> {
    let path = path.as_ref();
    let text = Writer::new(options).write_database(db);
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(".{}.recdb-tmp-{}", file_stem(path), std::process::id()));

    let write_result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(text.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&tmp_path, meta.permissions())?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        tracing::warn!(path = %path.display(), error = %e, "failed to write database file");
        return Err(WriterError::Io(path.display().to_string(), e));
    }
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote database file");
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "db".to_string())
}
