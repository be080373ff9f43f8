//! Small filesystem and text helpers shared across modules.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{DojoError, Result};

/// Maximum size of the record file or event log read into memory (32 MB).
pub const MAX_FILE_SIZE: u64 = 32 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size`.
pub fn read_to_string_limited(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| DojoError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(DojoError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({size} bytes, max {max_size} bytes)"),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| DojoError::storage(path, e))
}

/// Write `contents` to `path` via a sibling temp file and rename.
///
/// Readers never observe a partially written file. Parent directories are
/// created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| DojoError::storage(parent, e))?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DojoError::invalid_input(format!("not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = fs::File::create(&temp_path).map_err(|e| DojoError::storage(&temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| DojoError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| DojoError::storage(&temp_path, e))?;
    }

    // Atomic on POSIX
    fs::rename(&temp_path, path).map_err(|e| DojoError::storage(path, e))?;

    Ok(())
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
