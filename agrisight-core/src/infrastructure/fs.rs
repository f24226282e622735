use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn staging_file(path: &Path) -> Result<NamedTempFile, InfrastructureError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    // Same directory as the target so the final rename never crosses filesystems.
    Ok(tempfile::Builder::new()
        .prefix(".agrisight-")
        .tempfile_in(parent)?)
}

/// Write content to a file atomically using a temporary file.
///
/// Missing parent directories are created. The target is either fully
/// written or left untouched.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let mut temp_file = staging_file(path)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Lets an external writer (e.g. a DuckDB `COPY`) fill a staging path, then
/// moves the result onto `path`.
pub fn atomic_write_with<P, F, T>(path: P, write: F) -> Result<T, InfrastructureError>
where
    P: AsRef<Path>,
    F: FnOnce(&Path) -> Result<T, InfrastructureError>,
{
    let path = path.as_ref();
    let temp_file = staging_file(path)?;
    let out = write(temp_file.path())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(out)
}
