// ttys.rs

use std::collections::HashMap;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error::{Error, Result};

/// Maps terminal device numbers to the device files that name them.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    ttys: HashMap<u64, PathBuf>,
}

fn is_terminal_name(name: &str) -> bool {
    name.starts_with("tty") || name.starts_with("cons")
}

fn scan_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.to_path_buf();
    move |source| Error::DeviceScan { path, source }
}

impl DeviceDirectory {
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(scan_err(dir))? {
            let entry = entry.map_err(scan_err(dir))?;
            if let Some(name) = entry.file_name().to_str() {
                if is_terminal_name(name) {
                    names.push(name.to_string());
                }
            }
        }

        let mut ttys = HashMap::new();
        for name in names.into_iter().sorted() {
            let path = dir.join(&name);
            let meta = std::fs::metadata(&path).map_err(scan_err(&path))?;
            ttys.entry(meta.rdev()).or_insert(path);
        }
        tracing::debug!(
            dir = %dir.display(),
            count = ttys.len(),
            ttys = %ttys.values().map(|p| p.display()).join(" "),
            "scanned terminal devices"
        );
        Ok(Self { ttys })
    }

    pub fn from_entries<I: IntoIterator<Item = (u64, PathBuf)>>(entries: I) -> Self {
        Self { ttys: entries.into_iter().collect() }
    }

    pub fn resolve(&self, dev: u64) -> Option<&Path> {
        self.ttys.get(&dev).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.ttys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ttys.is_empty()
    }
}
