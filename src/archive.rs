//! Zip packaging of a single database file
//!
//! Archives hold one entry named after the source file. Entry timestamps are
//! pinned so the same input always yields the same bytes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{VaultError, VaultResult};

/// Compress `src` into a new archive at `dest`, returning the archive size
pub fn zip_file(src: &Path, dest: &Path) -> VaultResult<u64> {
    let entry_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| VaultError::Archive(format!("{} has no file name", src.display())))?;

    let mut input = BufReader::new(
        File::open(src)
            .map_err(|e| VaultError::Io(format!("Failed to open {}: {}", src.display(), e)))?,
    );
    let output = File::create(dest)
        .map_err(|e| VaultError::Io(format!("Failed to create {}: {}", dest.display(), e)))?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(BufWriter::new(output));
    zip.start_file(entry_name.as_str(), options)?;
    io::copy(&mut input, &mut zip)?;

    let mut writer = zip.finish()?;
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| VaultError::Io(format!("Failed to flush archive: {}", e)))?;
    file.sync_all()?;

    Ok(file.metadata()?.len())
}

/// Check that `zip` opens and contains `entry`
pub fn verify_archive(zip: &Path, entry: &str) -> VaultResult<()> {
    let mut archive = open_archive(zip)?;
    let found = archive.by_name(entry).map_err(|e| match e {
        ZipError::FileNotFound => VaultError::entry_not_found(entry),
        e => VaultError::Archive(format!("{} entry {}: {}", zip.display(), entry, e)),
    })?;
    if found.is_dir() {
        return Err(VaultError::Archive(format!(
            "{} entry {} is a directory",
            zip.display(),
            entry
        )));
    }
    Ok(())
}

/// Extract `entry` from `zip` into `dest`, returning the bytes written
pub fn extract_entry(zip: &Path, entry: &str, dest: &Path) -> VaultResult<u64> {
    let mut archive = open_archive(zip)?;
    let mut source = archive.by_name(entry)?;

    let mut out = BufWriter::new(
        File::create(dest)
            .map_err(|e| VaultError::Io(format!("Failed to create {}: {}", dest.display(), e)))?,
    );
    let written = io::copy(&mut source, &mut out)
        .map_err(|e| VaultError::Archive(format!("Failed to extract {}: {}", entry, e)))?;
    out.flush()?;
    out.get_ref().sync_all()?;

    Ok(written)
}

fn open_archive(zip: &Path) -> VaultResult<ZipArchive<BufReader<File>>> {
    let file = File::open(zip)
        .map_err(|e| VaultError::Io(format!("Failed to open {}: {}", zip.display(), e)))?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_zip_then_extract() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("mixin.db");
        let content: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &content).unwrap();

        let zip = temp.path().join("mixin.db.zip");
        let size = zip_file(&src, &zip).unwrap();
        assert_eq!(size, fs::metadata(&zip).unwrap().len());

        verify_archive(&zip, "mixin.db").unwrap();

        let out = temp.path().join("mixin.db.restore");
        assert_eq!(extract_entry(&zip, "mixin.db", &out).unwrap(), 4096);
        assert_eq!(fs::read(&out).unwrap(), content);
    }

    #[test]
    fn test_same_input_same_bytes() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("mixin.db");
        fs::write(&src, b"checkpointed content").unwrap();

        let first = temp.path().join("a.zip");
        let second = temp.path().join("b.zip");
        zip_file(&src, &first).unwrap();
        zip_file(&src, &second).unwrap();

        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_entry() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("other.db");
        fs::write(&src, b"x").unwrap();
        let zip = temp.path().join("other.zip");
        zip_file(&src, &zip).unwrap();

        assert!(matches!(
            verify_archive(&zip, "mixin.db"),
            Err(VaultError::NotFound { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let zip = temp.path().join("mixin.db.zip");
        fs::write(&zip, b"definitely not a zip archive").unwrap();

        assert!(verify_archive(&zip, "mixin.db").is_err());
    }
}
