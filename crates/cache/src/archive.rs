//! Archive detection and staged extraction.

use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Whether `url` names a gzipped tarball.
///
/// Query strings and fragments are ignored, so
/// `https://host/archive/master.tar.gz?raw=true` counts.
#[must_use]
pub fn is_tar_gz(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.ends_with(".tar.gz") || path.ends_with(".tgz")
}

/// Sibling scratch path used while staging `dest`.
fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("entry");
    dest.with_file_name(format!(".{name}.tmp"))
}

fn remove_any(path: &Path) -> Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path).map_err(|e| Error::io(e, path, "remove_dir_all"))
    } else if path.exists() {
        std::fs::remove_file(path).map_err(|e| Error::io(e, path, "remove_file"))
    } else {
        Ok(())
    }
}

/// Swap `staged` into `dest`, replacing whatever was there.
fn swap_into_place(staged: &Path, dest: &Path) -> Result<()> {
    remove_any(dest)?;
    std::fs::rename(staged, dest).map_err(|e| Error::io(e, dest, "rename"))
}

/// Unpack a gzipped tarball into `dest`.
///
/// Entries are unpacked into a sibling temp directory first; `dest` is only
/// replaced once the whole archive has been read. On failure the temp
/// directory is removed and `dest` is left untouched.
pub fn unpack_tar_gz(url: &str, data: &[u8], dest: &Path) -> Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| Error::configuration(format!("No parent for {}", dest.display())))?;
    std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create_dir_all"))?;

    let staging = staging_path(dest);
    remove_any(&staging)?;
    std::fs::create_dir_all(&staging).map_err(|e| Error::io(e, &staging, "create_dir_all"))?;

    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
    if let Err(e) = archive.unpack(&staging) {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(Error::fetch(url, format!("failed to extract archive: {e}")));
    }

    swap_into_place(&staging, dest)
}

/// Write a single downloaded payload at `dest`.
pub fn store_file(data: &[u8], dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create_dir_all"))?;
    }

    let staging = staging_path(dest);
    remove_any(&staging)?;
    std::fs::write(&staging, data).map_err(|e| Error::io(e, &staging, "write"))?;

    swap_into_place(&staging, dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_is_tar_gz() {
        assert!(is_tar_gz("https://github.com/x/y/archive/master.tar.gz"));
        assert!(is_tar_gz("https://example.com/a.tgz"));
        assert!(is_tar_gz("https://example.com/a.tar.gz?raw=true"));
        assert!(!is_tar_gz("https://example.com/db.sql.gz?raw=true"));
        assert!(!is_tar_gz("https://example.com/a.zip"));
    }

    #[test]
    fn test_unpack_replaces_previous_content() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("ns");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("stale.txt"), "old").unwrap();

        let data = tarball(&[("repo/docker-compose.yml", "services: {}")]);
        unpack_tar_gz("https://x/a.tar.gz", &data, &dest).unwrap();

        assert!(dest.join("repo/docker-compose.yml").exists());
        assert!(!dest.join("stale.txt").exists());
        assert!(!tmp.path().join(".ns.tmp").exists());
    }

    #[test]
    fn test_unpack_garbage_keeps_existing_content() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("ns");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("keep.txt"), "good").unwrap();

        let err = unpack_tar_gz("https://x/a.tar.gz", b"not a tarball", &dest).unwrap_err();

        assert!(matches!(err, Error::Fetch { .. }));
        assert!(dest.join("keep.txt").exists());
        assert!(!tmp.path().join(".ns.tmp").exists());
    }

    #[test]
    fn test_store_file_overwrites() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("databases").join("2.38.sql.gz");

        store_file(b"first", &dest).unwrap();
        store_file(b"second", &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"second");
    }
}
