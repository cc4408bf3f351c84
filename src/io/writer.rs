//! Serializer for compatibility tables.
//!
//! Output is deterministic for a given table and version, and it is read
//! back by [`super::prior_table`] without loss:
//!
//! ```text
//! -- Auto-generated file --
//! -- Follow the below syntax explicitly ...
//!
//! version = { 2, 0, 1021, 0 }
//! compatibility = {
//! [0x1f3c2d9a] = {
//! 	{ "ulong", "ulong*" },
//! },
//! }
//! ```

use crate::core::{CompatibilityTable, Version};
use crate::errors::{CompatError, Result};
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;

/// Comment block at the top of every generated table.
pub const HEADER: &str = "-- Auto-generated file --\n\
-- Follow the below syntax explicitly if manually editing, as we use a simplified Lua parser that expects this syntax.\n\n";

/// Render `table` and `version` in the table file syntax.
#[must_use]
pub fn serialize(table: &CompatibilityTable, version: &Version) -> String {
    let mut out = String::with_capacity(HEADER.len() + table.signature_count() * 48);
    out.push_str(HEADER);

    let [major, minor, build, revision] = version.parts();
    // writing into a String cannot fail
    let _ = writeln!(out, "version = {{ {major}, {minor}, {build}, {revision} }}");

    out.push_str("compatibility = {\n");
    for (id, signatures) in table.iter() {
        let _ = writeln!(out, "[{id}] = {{");
        for signature in signatures {
            let _ = writeln!(out, "\t{signature},");
        }
        out.push_str("},\n");
    }
    out.push_str("}\n");
    out
}

/// Write `contents` to `path` so that the target either keeps its previous
/// contents or holds the complete new text.
///
/// Data goes to a temporary file in the same directory which then replaces
/// the target by rename.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let write_error = |source| CompatError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    copy_permissions(path, temp.path()).map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "table written");
    Ok(())
}

/// Give the temporary file the permissions of the file it replaces, or the
/// usual defaults for a new file.
fn copy_permissions(target: &Path, temp: &Path) -> std::io::Result<()> {
    match fs::metadata(target) {
        Ok(meta) => fs::set_permissions(temp, meta.permissions()),
        Err(_) => default_permissions(temp),
    }
}

#[cfg(unix)]
fn default_permissions(temp: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(temp, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(_temp: &Path) -> std::io::Result<()> {
    Ok(())
}
