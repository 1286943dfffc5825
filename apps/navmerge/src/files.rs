//! # File Loading
//!
//! Reading platform snapshots and stored menu items from disk, and writing
//! stored items back after renames were applied.
//!
//! Stored items are JSON or TOML, chosen by file extension. Writes keep the
//! format they were read in.

use navmerge_core::{MenuError, MenuPlatform, PlatformSnapshot, StoredItems};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for platform snapshots (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_SNAPSHOT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum file size for stored menu items (10 MB).
const MAX_STORED_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MenuError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MenuError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MenuError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` to an existing regular file.
///
/// Canonicalization resolves `..` and symlinks before anything is read.
fn validate_file_path(path: &Path) -> Result<PathBuf, MenuError> {
    let canonical = path.canonicalize().map_err(|e| {
        MenuError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MenuError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn read_limited(path: &Path, max_size: u64) -> Result<String, MenuError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, max_size)?;
    std::fs::read_to_string(&path)
        .map_err(|e| MenuError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

// =============================================================================
// PLATFORM SNAPSHOTS
// =============================================================================

/// Load a platform snapshot and build its adapter.
pub fn load_platform(path: &Path) -> Result<Box<dyn MenuPlatform>, MenuError> {
    let json = read_limited(path, MAX_SNAPSHOT_FILE_SIZE)?;
    PlatformSnapshot::from_json(&json)?.into_platform()
}

// =============================================================================
// STORED ITEMS
// =============================================================================

/// Encoding of a stored-items file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredFormat {
    Json,
    Toml,
}

impl StoredFormat {
    /// Format by extension: `.toml` is TOML, anything else JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Load stored items from `path`.
pub fn load_stored(path: &Path) -> Result<StoredItems, MenuError> {
    let text = read_limited(path, MAX_STORED_FILE_SIZE)?;
    match StoredFormat::from_path(path) {
        StoredFormat::Json => serde_json::from_str(&text)
            .map_err(|e| MenuError::SerializationError(format!("Invalid stored items: {}", e))),
        StoredFormat::Toml => toml::from_str(&text)
            .map_err(|e| MenuError::SerializationError(format!("Invalid stored items: {}", e))),
    }
}

/// Load stored items from `path`, or an empty map when it does not exist.
pub fn load_stored_or_empty(path: &Path) -> Result<StoredItems, MenuError> {
    if path.exists() {
        load_stored(path)
    } else {
        Ok(StoredItems::new())
    }
}

/// Write stored items to `path` in the format its extension names.
pub fn save_stored(path: &Path, stored: &StoredItems) -> Result<(), MenuError> {
    let text = match StoredFormat::from_path(path) {
        StoredFormat::Json => serde_json::to_string_pretty(stored)
            .map_err(|e| MenuError::SerializationError(e.to_string()))?,
        StoredFormat::Toml => {
            toml::to_string(stored).map_err(|e| MenuError::SerializationError(e.to_string()))?
        }
    };
    std::fs::write(path, text)
        .map_err(|e| MenuError::IoError(format!("Cannot write '{}': {}", path.display(), e)))
}

/// Path of a menu's stored items inside `dir`.
///
/// Menu names are restricted to ASCII alphanumerics, `-` and `_` so a
/// request can never address a file outside `dir`.
pub fn stored_path(dir: &Path, menu: &str) -> Result<PathBuf, MenuError> {
    let valid = !menu.is_empty()
        && menu
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(MenuError::InvalidRequest(format!(
            "Invalid menu name '{}'",
            menu
        )));
    }
    Ok(dir.join(format!("{menu}.json")))
}

// =============================================================================
// TESTS
// =============================================================================
