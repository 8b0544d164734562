//! Rendered conversion outputs and their all-or-nothing commit to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConvertResult;

/// A generated reader program for one target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Language name (`"C"`, `"Fortran"`).
    pub language: &'static str,
    /// File extension, without the dot.
    pub extension: &'static str,
    pub text: String,
}

/// All outputs of one run, rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Base name shared by every output file.
    pub base: String,
    /// Packed records (`<base>.bin`).
    pub binary: Vec<u8>,
    /// Reader programs (`<base>.<ext>`), one per target.
    pub sources: Vec<GeneratedSource>,
    /// Column/type listing (`<base>.formats`).
    pub formats: String,
}

impl Artifacts {
    /// File name of the binary data file.
    pub fn binary_file_name(&self) -> String {
        format!("{}.bin", self.base)
    }

    /// `(file name, contents)` for every output, binary first and listing last.
    pub fn files(&self) -> Vec<(String, &[u8])> {
        let mut files = Vec::with_capacity(self.sources.len() + 2);
        files.push((self.binary_file_name(), self.binary.as_slice()));
        for src in &self.sources {
            files.push((format!("{}.{}", self.base, src.extension), src.text.as_bytes()));
        }
        files.push((format!("{}.formats", self.base), self.formats.as_bytes()));
        files
    }

    /// Write every output into `dir`.
    ///
    /// Each file is first written to a hidden `.<name>.tmp` sibling; only when all of them are
    /// complete are they renamed into place. On failure the temporaries (and any file already
    /// renamed by this call) are removed. Returns the final paths in [`Self::files`] order.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> ConvertResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();

        for (name, contents) in self.files() {
            let tmp = dir.join(format!(".{name}.tmp"));
            let target = dir.join(&name);
            if let Err(e) = fs::write(&tmp, contents) {
                remove_all(staged.iter().map(|(t, _)| t.as_path()).chain([tmp.as_path()]));
                return Err(e.into());
            }
            staged.push((tmp, target));
        }

        for (idx, (tmp, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, target) {
                let committed = staged[..idx].iter().map(|(_, t)| t.as_path());
                let pending = staged[idx..].iter().map(|(t, _)| t.as_path());
                remove_all(committed.chain(pending));
                return Err(e.into());
            }
        }

        Ok(staged.into_iter().map(|(_, target)| target).collect())
    }
}

fn remove_all<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for p in paths {
        let _ = fs::remove_file(p);
    }
}
