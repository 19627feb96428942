use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).context(format!("Failed to read file {:?}", path))?;
        decode_text(&bytes).context(format!("Failed to decode file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let mut file =
            fs::File::create(path).context(format!("Failed to open {:?} for writing", path))?;
        file.write_all(contents.as_bytes())
            .context(format!("Failed to write file {:?}", path))?;
        file.flush()
            .context(format!("Failed to flush file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context(format!("Failed to read entry in {:?}", path))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let raw_type = entry
                .file_type()
                .context(format!("Failed to get file type of {:?}", path))?;

            let file_type = if raw_type.is_symlink() {
                if path.is_file() {
                    FileType::File
                } else {
                    FileType::Symlink
                }
            } else if raw_type.is_dir() {
                FileType::Directory
            } else if raw_type.is_file() {
                FileType::File
            } else {
                FileType::Symlink
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        Ok(result)
    }
}

/// Decodes file contents by byte order mark: UTF-16 (either byte order)
/// when one is present, UTF-8 otherwise. The mark itself is dropped.
fn decode_text(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return Ok(String::from_utf8(rest.to_vec())?);
    }

    let (rest, from_pair): (&[u8], fn([u8; 2]) -> u16) =
        if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
            (rest, u16::from_le_bytes)
        } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
            (rest, u16::from_be_bytes)
        } else {
            return Ok(String::from_utf8(bytes.to_vec())?);
        };

    if rest.len() % 2 != 0 {
        anyhow::bail!("UTF-16 content has an odd number of bytes");
    }
    let units: Vec<u16> = rest
        .chunks_exact(2)
        .map(|pair| from_pair([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16(&units)?)
}
