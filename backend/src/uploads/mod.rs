//! Files uploaded through the admin and student forms.
//!
//! Every stored file gets a name derived from the sanitized original name
//! plus a second-resolution timestamp (`photo_20260105143000.jpg`). The
//! name is reserved with an exclusive create, so two uploads of the same
//! file within one second end up as `_1`, `_2`, ... instead of overwriting
//! each other. Images are re-encoded (see [`image`]); everything else is
//! written as received.

pub mod image;
pub mod multipart;

use crate::config::Config;
use crate::error::AppError;
use chrono::Local;
use log::warn;
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::LazyLock;

pub use self::image::{create_thumbnail, save_image, ImageSpec};
pub use self::multipart::{UploadForm, UploadedFile};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
pub const NOTE_EXTENSIONS: &[&str] = &["pdf"];

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid regex pattern for filename sanitisation")
});

/// Lowercased extension without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str, allowed: &[&str]) -> bool {
    extension_of(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Reduces a client supplied name to a plain ASCII file name with no path
/// components.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let spaced = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&spaced, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Creates a new, uniquely named file in `dir` for `original_name` and
/// returns the chosen name with the open file.
pub fn reserve(dir: &Path, original_name: &str) -> Result<(String, File), AppError> {
    let safe = secure_filename(original_name);
    let (stem, ext) = match safe.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext.to_ascii_lowercase())),
        _ => (safe.clone(), String::new()),
    };
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    std::fs::create_dir_all(dir)?;

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{}_{}{}", stem, timestamp, ext)
        } else {
            format!("{}_{}_{}{}", stem, timestamp, attempt, ext)
        };
        match OpenOptions::new().write(true).create_new(true).open(dir.join(&name)) {
            Ok(file) => return Ok((name, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Persists a non-image upload unchanged. Returns the stored name and its
/// size in bytes.
pub fn save_file(bytes: &[u8], original_name: &str, dir: &Path) -> Result<(String, u64), AppError> {
    let (name, mut file) = reserve(dir, original_name)?;
    if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
        remove_best_effort(&dir.join(&name));
        return Err(e.into());
    }
    Ok((name, file.metadata()?.len()))
}

/// Deletes a stored file. Failures are logged and otherwise ignored; a file
/// that is already gone is not an error.
pub fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("could not remove {}: {}", path.display(), e);
        }
    }
}

/// Creates the upload root and its four sub-folders.
pub fn prepare_folders(config: &Config) -> std::io::Result<()> {
    for dir in [
        config.gallery_folder(),
        config.notes_folder(),
        config.avatars_folder(),
        config.thumbnails_folder(),
    ] {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Runs filesystem or image work on the blocking pool.
pub async fn offload<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_checked_case_insensitively() {
        assert!(allowed_file("Photo.JPG", IMAGE_EXTENSIONS));
        assert!(allowed_file("chapter1.pdf", NOTE_EXTENSIONS));
        assert!(!allowed_file("chapter1.pdf.exe", NOTE_EXTENSIONS));
        assert!(!allowed_file("README", IMAGE_EXTENSIONS));
        assert!(!allowed_file("trailing.", IMAGE_EXTENSIONS));
    }

    #[test]
    fn filenames_lose_paths_and_odd_characters() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\My Photo (1).png"), "My_Photo_1.png");
        assert_eq!(secure_filename("..."), "upload");
    }

    #[test]
    fn same_second_uploads_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = reserve(dir.path(), "notes.pdf").unwrap();
        let (second, _) = reserve(dir.path(), "notes.pdf").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("notes_") && first.ends_with(".pdf"));
        assert!(second.ends_with(".pdf"));
    }

    #[test]
    fn saved_files_report_their_size() {
        let dir = tempfile::tempdir().unwrap();
        let (name, size) = save_file(b"%PDF-1.4 test", "Chapter 1.pdf", dir.path()).unwrap();
        assert_eq!(size, 13);
        assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), b"%PDF-1.4 test");
    }

    #[test]
    fn removing_a_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        remove_best_effort(&dir.path().join("gone.png"));
    }
}
