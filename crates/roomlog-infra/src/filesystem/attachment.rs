//! Directory-backed attachment store.
//!
//! Implements `AttachmentStore` from `roomlog-core`. Loose files are renamed
//! into their room's directory under sequential per-module names:
//!
//! ```text
//! {data_dir}/room_3/
//!   draw_1.jpeg
//!   draw_2.png
//!   chart_1.jpeg
//! ```
//!
//! The next number is one past the highest number already on disk for that
//! module in that room, whatever the extension. Numbers freed by deleting a
//! lower file are never reused.

use std::path::{Path, PathBuf};

use roomlog_core::attachment::AttachmentStore;
use roomlog_types::attachment::{
    validate_module_name, LooseAttachment, PlacedAttachment, DEFAULT_ATTACHMENT_EXTENSION,
};
use roomlog_types::error::AttachmentError;
use roomlog_types::ids::RoomId;
use tokio::sync::Mutex;

use super::room_dir;

/// Attachment store rooted at the data directory.
pub struct LocalAttachmentStore {
    data_dir: PathBuf,
    /// Serializes scan-then-rename so two placements never pick the same number.
    placement: Mutex<()>,
}

impl LocalAttachmentStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            placement: Mutex::new(()),
        }
    }

    /// Directory holding a room's attachments.
    pub fn room_dir(&self, room_id: RoomId) -> PathBuf {
        room_dir(&self.data_dir, room_id)
    }
}

/// Highest `n` among files named `<module>_<n>.<ext>` in `dir`, or 0.
///
/// A number too large for `u64` is an error rather than skipped, since
/// skipping it would hand out a number lower than one already on disk.
async fn highest_sequence(dir: &Path, module: &str) -> Result<u64, AttachmentError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AttachmentError::io(dir, e))?;

    let mut highest = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AttachmentError::io(dir, e))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(digits) = sequence_digits(&name, module) {
            let n: u64 = digits.parse().map_err(|_| exhausted(dir, module))?;
            highest = highest.max(n);
        }
    }
    Ok(highest)
}

/// The digits of `n` in `<module>_<n>.<ext>` (or `<module>_<n>`).
fn sequence_digits<'a>(file_name: &'a str, module: &str) -> Option<&'a str> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => file_name,
    };
    let digits = stem.strip_prefix(module)?.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

fn exhausted(dir: &Path, module: &str) -> AttachmentError {
    AttachmentError::SequenceExhausted {
        module: module.to_string(),
        dir: dir.to_path_buf(),
    }
}

fn extension_of(source: &Path) -> &str {
    source
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_ATTACHMENT_EXTENSION)
}

/// Rename `from` to `to`, copying across filesystems when a rename cannot.
///
/// Never overwrites `to`. On failure `from` is left in place and no partial
/// copy remains at `to`.
async fn move_file(from: &Path, to: &Path) -> Result<(), AttachmentError> {
    if tokio::fs::try_exists(to)
        .await
        .map_err(|e| AttachmentError::io(to, e))?
    {
        return Err(AttachmentError::io(
            to,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "destination exists"),
        ));
    }

    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "Rename crosses devices, copying");
            if let Err(e) = tokio::fs::copy(from, to).await {
                let _ = tokio::fs::remove_file(to).await;
                return Err(AttachmentError::io(to, e));
            }
            if let Err(e) = tokio::fs::remove_file(from).await {
                let _ = tokio::fs::remove_file(to).await;
                return Err(AttachmentError::io(from, e));
            }
            Ok(())
        }
        Err(e) => Err(AttachmentError::io(from, e)),
    }
}

impl AttachmentStore for LocalAttachmentStore {
    async fn place(
        &self,
        room_id: RoomId,
        attachment: &LooseAttachment,
    ) -> Result<PlacedAttachment, AttachmentError> {
        validate_module_name(&attachment.module)?;

        let source = &attachment.source;
        if !tokio::fs::try_exists(source)
            .await
            .map_err(|e| AttachmentError::io(source, e))?
        {
            return Err(AttachmentError::SourceMissing(source.clone()));
        }

        let dir = self.room_dir(room_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AttachmentError::io(&dir, e))?;

        let _guard = self.placement.lock().await;

        let sequence = highest_sequence(&dir, &attachment.module)
            .await?
            .checked_add(1)
            .ok_or_else(|| exhausted(&dir, &attachment.module))?;
        let file_name = format!("{}_{}.{}", attachment.module, sequence, extension_of(source));
        let dest = dir.join(file_name);

        move_file(source, &dest).await?;

        let path = tokio::fs::canonicalize(&dest)
            .await
            .map_err(|e| AttachmentError::io(&dest, e))?;
        tracing::debug!(room_id = %room_id, path = %path.display(), sequence, "Attachment moved");

        Ok(PlacedAttachment {
            path,
            origin: source.clone(),
            sequence,
        })
    }

    async fn restore(&self, placed: &PlacedAttachment) -> Result<(), AttachmentError> {
        if let Some(parent) = placed.origin.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AttachmentError::io(parent, e))?;
        }
        move_file(&placed.path, &placed.origin).await?;
        tracing::debug!(
            from = %placed.path.display(),
            to = %placed.origin.display(),
            "Attachment restored"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn loose_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, b"image bytes").await.unwrap();
        path
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_sequence_digits() {
        assert_eq!(sequence_digits("m_1.jpeg", "m"), Some("1"));
        assert_eq!(sequence_digits("m_12.png", "m"), Some("12"));
        assert_eq!(sequence_digits("m_7", "m"), Some("7"));
        assert_eq!(sequence_digits("m_.jpeg", "m"), None);
        assert_eq!(sequence_digits("m_x.jpeg", "m"), None);
        assert_eq!(sequence_digits("mm_1.jpeg", "m"), None);
        assert_eq!(sequence_digits("image_gen_2.jpeg", "image"), None);
        assert_eq!(sequence_digits("image_gen_2.jpeg", "image_gen"), Some("2"));
    }

    #[tokio::test]
    async fn test_sequential_names_never_reuse_freed_numbers() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());
        let room = RoomId(1);

        let mut placed = Vec::new();
        for i in 0..3 {
            let source = loose_file(loose.path(), &format!("out{i}.jpeg")).await;
            placed.push(store.place(room, &LooseAttachment::new(source, "m")).await.unwrap());
        }
        let names: Vec<String> = placed.iter().map(|p| file_name(&p.path)).collect();
        assert_eq!(names, vec!["m_1.jpeg", "m_2.jpeg", "m_3.jpeg"]);
        assert!(placed.iter().all(|p| p.path.is_absolute()));

        tokio::fs::remove_file(&placed[1].path).await.unwrap();
        let source = loose_file(loose.path(), "out3.jpeg").await;
        let fourth = store.place(room, &LooseAttachment::new(source, "m")).await.unwrap();
        assert_eq!(file_name(&fourth.path), "m_4.jpeg");
        assert_eq!(fourth.sequence, 4);
    }

    #[tokio::test]
    async fn test_modules_and_rooms_number_independently() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());

        let a = loose_file(loose.path(), "a.jpeg").await;
        let b = loose_file(loose.path(), "b.jpeg").await;
        let c = loose_file(loose.path(), "c.jpeg").await;

        let draw = store.place(RoomId(1), &LooseAttachment::new(a, "draw")).await.unwrap();
        let chart = store.place(RoomId(1), &LooseAttachment::new(b, "chart")).await.unwrap();
        let other_room = store.place(RoomId(2), &LooseAttachment::new(c, "draw")).await.unwrap();

        assert_eq!(file_name(&draw.path), "draw_1.jpeg");
        assert_eq!(file_name(&chart.path), "chart_1.jpeg");
        assert_eq!(file_name(&other_room.path), "draw_1.jpeg");
        assert!(other_room.path.parent().unwrap().ends_with("room_2"));
    }

    #[tokio::test]
    async fn test_extension_follows_source() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());

        let png = loose_file(loose.path(), "render.png").await;
        let bare = loose_file(loose.path(), "render").await;

        let first = store.place(RoomId(1), &LooseAttachment::new(png, "draw")).await.unwrap();
        let second = store.place(RoomId(1), &LooseAttachment::new(bare, "draw")).await.unwrap();
        assert_eq!(file_name(&first.path), "draw_1.png");
        assert_eq!(file_name(&second.path), "draw_2.jpeg");
    }

    #[tokio::test]
    async fn test_missing_source_fails_without_creating_files() {
        let data = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());

        let err = store
            .place(RoomId(1), &LooseAttachment::new(data.path().join("nope.jpeg"), "m"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::SourceMissing(_)));
        assert!(!store.room_dir(RoomId(1)).exists());
    }

    #[tokio::test]
    async fn test_invalid_module_rejected() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());
        let source = loose_file(loose.path(), "a.jpeg").await;

        let err = store
            .place(RoomId(1), &LooseAttachment::new(&source, "../escape"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::InvalidModule(_)));
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_restore_moves_file_back() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());
        let source = loose_file(loose.path(), "a.jpeg").await;

        let placed = store.place(RoomId(1), &LooseAttachment::new(&source, "m")).await.unwrap();
        assert!(!source.exists());
        assert!(placed.path.exists());

        store.restore(&placed).await.unwrap();
        assert!(source.exists());
        assert!(!placed.path.exists());
    }

    #[tokio::test]
    async fn test_numbers_beyond_u32_continue_from_max() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());
        let dir = store.room_dir(RoomId(1));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("m_5000000000.jpeg"), b"old").await.unwrap();

        let source = loose_file(loose.path(), "a.jpeg").await;
        let placed = store.place(RoomId(1), &LooseAttachment::new(source, "m")).await.unwrap();
        assert_eq!(file_name(&placed.path), "m_5000000001.jpeg");
        assert_eq!(placed.sequence, 5_000_000_001);
    }

    #[tokio::test]
    async fn test_exhausted_sequence_fails_and_keeps_source() {
        for existing in ["m_18446744073709551615.jpeg", "m_99999999999999999999999.jpeg"] {
            let data = TempDir::new().unwrap();
            let loose = TempDir::new().unwrap();
            let store = LocalAttachmentStore::new(data.path().to_path_buf());
            let dir = store.room_dir(RoomId(1));
            tokio::fs::create_dir_all(&dir).await.unwrap();
            tokio::fs::write(dir.join(existing), b"old").await.unwrap();

            let source = loose_file(loose.path(), "a.jpeg").await;
            let err = store
                .place(RoomId(1), &LooseAttachment::new(&source, "m"))
                .await
                .unwrap_err();
            assert!(matches!(err, AttachmentError::SequenceExhausted { .. }), "{existing}: {err}");
            assert!(source.exists());

            let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
            let mut names = Vec::new();
            while let Some(entry) = entries.next_entry().await.unwrap() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
            assert_eq!(names, vec![existing.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_move_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let from = loose_file(dir.path(), "from.jpeg").await;
        let to = dir.path().join("to.jpeg");
        tokio::fs::write(&to, b"already here").await.unwrap();

        let err = move_file(&from, &to).await.unwrap_err();
        assert!(
            matches!(&err, AttachmentError::Io { source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists)
        );
        assert_eq!(tokio::fs::read(&from).await.unwrap(), b"image bytes");
        assert_eq!(tokio::fs::read(&to).await.unwrap(), b"already here");
    }

    #[tokio::test]
    async fn test_unusable_room_dir_keeps_source() {
        let data = TempDir::new().unwrap();
        let loose = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(data.path().to_path_buf());
        // A plain file where the room directory should be.
        tokio::fs::write(store.room_dir(RoomId(1)), b"not a dir").await.unwrap();

        let source = loose_file(loose.path(), "a.jpeg").await;
        let err = store
            .place(RoomId(1), &LooseAttachment::new(&source, "m"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Io { .. }));
        assert_eq!(tokio::fs::read(&source).await.unwrap(), b"image bytes");
    }
}
