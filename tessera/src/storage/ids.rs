use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{StorageLayout, SUBMISSION_DIR_PREFIX};

/// Hands out unique, increasing submission ids.
///
/// Seeded once from the `img{N}` directories already on disk so numbering
/// continues across restarts. After that, ids come from an atomic counter
/// and never touch the filesystem.
#[derive(Debug, Default)]
pub struct SubmissionIds {
    next: AtomicU64,
}

impl SubmissionIds {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Continues after the highest `img{N}` directory under the tiles root.
    pub fn resume(layout: &StorageLayout) -> io::Result<Self> {
        let tiles_root = layout.tiles_root();
        let existing = common::file_utils::numbered_subdirs(&tiles_root, SUBMISSION_DIR_PREFIX)?;

        let first = match existing.into_iter().max() {
            Some(max) => max + 1,
            None => {
                tracing::info!(
                    "No previous submissions under {}, starting at 0",
                    tiles_root.display()
                );
                0
            }
        };

        Ok(Self::starting_at(first))
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
