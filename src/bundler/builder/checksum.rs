//! Artifact checksums.
//!
//! Disk images and installers are single files. App bundles are directories,
//! so their digest covers every entry's relative path together with its
//! content (or link target, for symlinks) in sorted order.

use crate::{
    bail,
    bundler::{Result, error::ErrorExt},
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 8192;

/// Hex-encoded SHA-256 of a file or directory tree.
pub(crate) async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading metadata for checksum", path)?;

    let mut hasher = Sha256::new();
    if metadata.is_file() {
        hash_file(&mut hasher, path).await?;
    } else if metadata.is_dir() {
        hash_tree(&mut hasher, path).await?;
    } else {
        bail!("{} is neither a file nor a directory", path.display())
    }

    Ok(format!("{:x}", hasher.finalize()))
}

async fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hashing", path)?;
        if n == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..n]);
    }
}

async fn hash_tree(hasher: &mut Sha256, root: &Path) -> Result<()> {
    let mut entries = walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    entries.retain(|e| !e.file_type().is_dir());

    for entry in entries {
        let rel_path = entry.path().strip_prefix(root)?;
        hasher.update(rel_path.to_string_lossy().as_bytes());

        if entry.file_type().is_symlink() {
            let target = tokio::fs::read_link(entry.path())
                .await
                .fs_context("reading symlink for hashing", entry.path())?;
            hasher.update(target.to_string_lossy().as_bytes());
        } else {
            hash_file(hasher, entry.path()).await?;
        }
    }

    Ok(())
}
