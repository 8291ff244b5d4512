use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Read-only bundle of named binary assets.
///
/// No format contract beyond raw bytes; the consumer identifies the format.
pub trait AssetBundle {
    /// Opens the named asset as a readable stream.
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>>;
}

/// Bundle rooted at a filesystem directory.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetBundle for DirBundle {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let path = self.root.join(name);
        let file = File::open(&path)
            .with_context(|| format!("failed to open asset {}", path.display()))?;
        Ok(Box::new(file))
    }
}

/// In-memory bundle, used by tests and embedded assets.
#[derive(Debug, Default)]
pub struct MemoryBundle {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.entries.push((name.into(), bytes));
    }
}

impl AssetBundle for MemoryBundle {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let bytes = self
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b.as_slice())
            .with_context(|| format!("no such asset {name:?}"))?;
        Ok(Box::new(bytes))
    }
}

/// Reads the full contents of a bundled asset.
///
/// A single `read` call is not guaranteed to fill a buffer, so the stream is
/// drained with `read_to_end`; the result is either the complete asset or an
/// error.
pub fn read_asset(bundle: &dyn AssetBundle, name: &str) -> Result<Vec<u8>> {
    let mut reader = bundle.open(name)?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read asset {name:?}"))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    /// Reader that yields at most one byte per `read` call.
    struct TrickleReader {
        bytes: Vec<u8>,
        cursor: usize,
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.cursor >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.cursor];
            self.cursor += 1;
            Ok(1)
        }
    }

    struct TrickleBundle {
        bytes: Vec<u8>,
    }

    impl AssetBundle for TrickleBundle {
        fn open(&self, _name: &str) -> Result<Box<dyn Read + '_>> {
            Ok(Box::new(TrickleReader {
                bytes: self.bytes.clone(),
                cursor: 0,
            }))
        }
    }

    #[test]
    fn read_is_total_even_for_partial_reads() {
        let payload: Vec<u8> = (0..=255).collect();
        let bundle = TrickleBundle {
            bytes: payload.clone(),
        };

        let loaded = read_asset(&bundle, "trickle.bin").unwrap();
        assert_eq!(loaded, payload);
    }

    #[test]
    fn memory_bundle_round_trip() {
        let mut bundle = MemoryBundle::new();
        bundle.insert("scene.glb", vec![1, 2, 3, 4]);

        assert_eq!(read_asset(&bundle, "scene.glb").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn missing_asset_is_an_error() {
        let bundle = MemoryBundle::new();
        let err = read_asset(&bundle, "nope.ktx").unwrap_err();
        assert!(err.to_string().contains("nope.ktx"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let bundle = DirBundle::new("/definitely/not/a/real/dir");
        assert!(read_asset(&bundle, "scene.glb").is_err());
    }

    #[test]
    fn empty_asset_is_empty_not_error() {
        let mut bundle = MemoryBundle::new();
        bundle.insert("empty.bin", Vec::new());
        assert!(read_asset(&bundle, "empty.bin").unwrap().is_empty());
    }
}
