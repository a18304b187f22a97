//! gzip-compressed tar archives of the application bundle.

use crate::error::{FsContext, Result};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::HeaderMode;
use walkdir::WalkDir;

/// Create `dest` as a tar.gz of `src_dir`.
///
/// Entries are rooted at the directory's own name, the way
/// `tar czf dest StarCheat.app` lays them out. Symlinks are stored as links,
/// so framework `Versions/Current` aliases inside a bundle survive.
pub async fn create_tar_gz(src_dir: &Path, dest: &Path) -> Result<PathBuf> {
    let src_dir = src_dir.to_path_buf();
    let dest = dest.to_path_buf();

    let root = src_dir
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "bundle path has no name"))
        .fs_context("archiving", &src_dir)?;

    let file = tokio::fs::File::create(&dest)
        .await
        .fs_context("creating archive", &dest)?;
    let std_file = file.into_std().await;

    let archive_path = dest.clone();
    tokio::task::spawn_blocking(move || write_archive(std_file, &src_dir, &root))
        .await
        .map_err(io::Error::other)
        .fs_context("archiving into", &dest)?
        .fs_context("archiving into", &dest)?;

    log::info!("Created archive {}", archive_path.display());
    Ok(archive_path)
}

fn write_archive(file: File, src_dir: &Path, root: &Path) -> io::Result<()> {
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for entry in WalkDir::new(src_dir) {
        let entry = entry.map_err(io::Error::other)?;
        let path = entry.path();

        let rel_path = path.strip_prefix(src_dir).map_err(io::Error::other)?;
        let name = root.join(rel_path);
        let metadata = std::fs::symlink_metadata(path)?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata_in_mode(&metadata, HeaderMode::Deterministic);

        if entry.path_is_symlink() {
            let target = std::fs::read_link(path)?;
            tar.append_link(&mut header, &name, &target)?;
        } else if entry.file_type().is_dir() {
            tar.append_data(&mut header, &name, &mut io::empty())?;
        } else {
            let mut file = File::open(path)?;
            tar.append_data(&mut header, &name, &mut file)?;
        }
    }

    let enc = tar.into_inner()?;
    let mut finished = enc.finish()?;
    finished.flush()?;
    Ok(())
}

/// Extract a tar.gz archive into `dest_dir`
pub async fn unpack_tar_gz(archive: &Path, dest_dir: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    let source = archive.clone();
    let target = dest_dir.clone();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        std::fs::create_dir_all(&target)?;
        let file = File::open(&source)?;
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.unpack(&target)
    })
    .await
    .map_err(io::Error::other)
    .fs_context("unpacking", &archive)?
    .fs_context("unpacking", &archive)?;

    log::debug!("Unpacked {} into {}", archive.display(), dest_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| !e.path_is_symlink())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
                let contents = e.file_type().is_file().then(|| std::fs::read(e.path()).unwrap());
                (rel, contents)
            })
            .collect()
    }

    fn sample_bundle(parent: &Path) -> PathBuf {
        let bundle = parent.join("StarCheat.app");
        let macos = bundle.join("Contents/MacOS");
        let resources = bundle.join("Contents/Resources");
        std::fs::create_dir_all(&macos).unwrap();
        std::fs::create_dir_all(&resources).unwrap();
        std::fs::create_dir_all(bundle.join("Contents/Frameworks/empty")).unwrap();
        std::fs::write(macos.join("starcheat"), b"#!/bin/sh\necho starcheat\n").unwrap();
        std::fs::write(bundle.join("Contents/Info.plist"), b"<plist/>").unwrap();
        std::fs::write(resources.join("blob.bin"), (0u8..=255).cycle().take(70_000).collect::<Vec<_>>())
            .unwrap();
        bundle
    }

    #[tokio::test]
    async fn test_archive_round_trip_preserves_contents() {
        let work = tempfile::tempdir().unwrap();
        let bundle = sample_bundle(work.path());
        let archive = work.path().join("starcheat.tar.gz");

        let created = create_tar_gz(&bundle, &archive).await.unwrap();
        assert_eq!(created, archive);

        let out = tempfile::tempdir().unwrap();
        unpack_tar_gz(&archive, out.path()).await.unwrap();

        let restored = out.path().join("StarCheat.app");
        assert!(restored.is_dir());
        assert_eq!(snapshot(&bundle), snapshot(&restored));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_archive_keeps_symlinks_and_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let work = tempfile::tempdir().unwrap();
        let bundle = sample_bundle(work.path());
        let exe = bundle.join("Contents/MacOS/starcheat");
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::os::unix::fs::symlink("MacOS/starcheat", bundle.join("Contents/launcher")).unwrap();

        let archive = work.path().join("starcheat.tar.gz");
        create_tar_gz(&bundle, &archive).await.unwrap();

        let out = tempfile::tempdir().unwrap();
        unpack_tar_gz(&archive, out.path()).await.unwrap();

        let restored = out.path().join("StarCheat.app/Contents");
        let link = std::fs::read_link(restored.join("launcher")).unwrap();
        assert_eq!(link, PathBuf::from("MacOS/starcheat"));

        let mode = std::fs::metadata(restored.join("MacOS/starcheat"))
            .unwrap()
            .permissions()
            .mode();
        assert_ne!(mode & 0o111, 0, "executable bit lost");
    }

    #[tokio::test]
    async fn test_missing_source_reports_path() {
        let work = tempfile::tempdir().unwrap();
        let missing = work.path().join("StarCheat.app");
        let err = create_tar_gz(&missing, &work.path().join("out.tar.gz"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("StarCheat.app"));
    }
}
