/*!
 * File and directory metadata preservation (timestamps, permissions).
 */

use std::path::Path;

use filetime::{set_file_times, FileTime};

use crate::error::{CopyError, Result};

/// Preserve permissions and access/modification timestamps from `source_path`
/// onto `dest_path`. Works for both files and directories.
pub fn preserve_metadata(source_path: &Path, dest_path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(source_path)
        .map_err(|e| CopyError::MetadataFailed(format!("failed to read source metadata: {e}")))?;

    std::fs::set_permissions(dest_path, metadata.permissions())
        .map_err(|e| CopyError::MetadataFailed(format!("failed to set permissions: {e}")))?;

    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    set_file_times(dest_path, accessed, modified)
        .map_err(|e| CopyError::MetadataFailed(format!("failed to set timestamps: {e}")))?;

    Ok(())
}
