// src/cache/write.rs

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use super::CacheDocument;

/// Write `doc` to `path`, replacing whatever was there.
///
/// Goes through a hidden temp file in the same directory and a rename, so readers
/// never see a half-written cache.
pub fn write_document<P: AsRef<Path>>(doc: &CacheDocument, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("{:?} has no file name", path))?
        .to_string_lossy();

    let tmp_path = dir.join(format!(".{}.tmp", file_name));
    let mut tmp = fs::File::create(&tmp_path)
        .with_context(|| format!("creating {:?}", tmp_path))?;

    // pretty-print with a trailing newline
    serde_json::to_writer_pretty(&mut tmp, doc).context("serializing cache document")?;
    tmp.write_all(b"\n")
        .with_context(|| format!("writing {:?}", tmp_path))?;
    tmp.sync_all()
        .with_context(|| format!("flushing {:?}", tmp_path))?;
    drop(tmp);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    debug!(path = %path.display(), "wrote cache file");
    Ok(())
}

/// Create `dir` if needed and write `doc` under every name in `file_names`.
///
/// Any failure here is fatal for the run.
pub fn write_cache<P: AsRef<Path>>(
    doc: &CacheDocument,
    dir: P,
    file_names: &[String],
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating cache directory {:?}", dir))?;

    let mut written = Vec::with_capacity(file_names.len());
    for name in file_names {
        let path = dir.join(name);
        write_document(doc, &path)?;
        info!(path = %path.display(), sheets = doc.data.len(), "cache file written");
        written.push(path);
    }
    Ok(written)
}
