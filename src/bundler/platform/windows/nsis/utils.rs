//! NSIS script file helpers.

use crate::bundler::error::{ErrorExt, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Write file with UTF-8 BOM.
///
/// Older makensis releases read a script without BOM as ANSI.
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating NSI script file", path)?;

    file.write_all(&UTF8_BOM)
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prefixes_content_with_bom() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("installer.nsi");
        write_utf8_bom(&path, "Name \"Démo\"").await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &UTF8_BOM);
        assert_eq!(std::str::from_utf8(&bytes[3..]).unwrap(), "Name \"Démo\"");
    }
}
