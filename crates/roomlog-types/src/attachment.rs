//! Attachment descriptors.
//!
//! Attachments are produced by a collaborator (the "module") as loose files
//! and then renamed into the room's directory as `<module>_<n>.<ext>`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AttachmentError;

/// Extension used when the loose source file has none.
pub const DEFAULT_ATTACHMENT_EXTENSION: &str = "jpeg";

/// A file waiting to be placed into a room directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooseAttachment {
    /// Current location of the file.
    pub source: PathBuf,
    /// Tag of the producer; numbering namespace within a room.
    pub module: String,
}

impl LooseAttachment {
    pub fn new(source: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            module: module.into(),
        }
    }
}

/// A file that has been moved into its room directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedAttachment {
    /// Absolute path of the numbered file.
    pub path: PathBuf,
    /// Where the file came from, kept so the move can be undone.
    pub origin: PathBuf,
    pub sequence: u64,
}

/// Check that a module name can be embedded in a filename.
///
/// Rejects empty names and anything that could escape the room directory.
pub fn validate_module_name(module: &str) -> Result<(), AttachmentError> {
    let invalid = module.trim().is_empty()
        || module.contains(['/', '\\', '\0'])
        || module.contains("..");
    if invalid {
        return Err(AttachmentError::InvalidModule(module.to_string()));
    }
    Ok(())
}
