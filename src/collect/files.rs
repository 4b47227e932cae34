//! Watched-file collector.
//!
//! Walks the configured watch directories and records path, checksum, size
//! and mtime per file. Hidden files, VCS metadata and build output are
//! skipped. Large files are never read: anything over 10 MB is ignored
//! entirely and files over 1 MB are recorded without a content hash.

use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::Config;
use crate::fragment::Fragment;

use super::Collector;

const MAX_HASH_BYTES: u64 = 1024 * 1024;
const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "__pycache__",
    "venv",
    ".git",
    ".svn",
    ".hg",
    ".venv",
    ".idea",
];

pub struct FilesCollector;

impl Collector for FilesCollector {
    fn name(&self) -> &'static str {
        "files"
    }

    fn available(&self, _config: &Config) -> bool {
        true
    }

    fn collect(&self, config: &Config) -> Result<Fragment, String> {
        let mut entries: Vec<(String, Fragment)> = Vec::new();

        for watch_dir in &config.watch_dirs {
            if !watch_dir.exists() {
                continue;
            }

            let walker = WalkDir::new(watch_dir)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_ignored(e.file_name().to_string_lossy().as_ref()));

            for entry in walker {
                let Ok(entry) = entry else { continue };
                if !entry.file_type().is_file() {
                    continue;
                }

                let Ok(metadata) = entry.metadata() else { continue };
                let size = metadata.len();
                if size > MAX_FILE_BYTES {
                    continue;
                }

                let hash = if size <= MAX_HASH_BYTES {
                    hash_file(entry.path())
                } else {
                    "large_file".to_string()
                };

                let mtime = metadata
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or(0);

                let rel_path = entry
                    .path()
                    .strip_prefix(watch_dir)
                    .unwrap_or(entry.path())
                    .to_string_lossy()
                    .to_string();

                entries.push((
                    rel_path.clone(),
                    Fragment::mapping([
                        ("path", Fragment::from(rel_path)),
                        ("hash", Fragment::from(hash)),
                        ("size", Fragment::from(size as i64)),
                        ("mtime", Fragment::from(mtime)),
                    ]),
                ));
            }
        }

        // sorted by path for consistent ordering; cap applies across all
        // watch directories
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.truncate(config.max_files);

        Ok(Fragment::Sequence(
            entries.into_iter().map(|(_, fragment)| fragment).collect(),
        ))
    }
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || IGNORED_DIRS.contains(&name)
}

fn hash_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(content) => hex::encode(Sha256::digest(&content)),
        Err(_) => "unreadable".to_string(),
    }
}
