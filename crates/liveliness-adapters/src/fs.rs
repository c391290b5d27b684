//! Filesystem camera: replays a directory of images as a frame stream.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use liveliness_core::domain::Frame;
use liveliness_core::ports::{CameraSource, FrameStream};
use tracing::{debug, warn};

/// Supported frame extensions.
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Camera adapter backed by a directory of still images.
///
/// Frames are served in file-name order, one per read.
pub struct FsCamera {
    dir: PathBuf,
}

impl FsCamera {
    /// Creates a camera over the images in `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory the frames are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Collects all frame files in the directory, sorted by file name.
    fn collect_frames(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to open frame directory: {}", self.dir.display()))?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                let supported = path.is_file() && is_supported_frame(path);
                if !supported && path.is_file() {
                    debug!("Skipping non-image file: {}", path.display());
                }
                supported
            })
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(files)
    }
}

impl CameraSource for FsCamera {
    type Stream = FsFrameStream;

    fn acquire(&mut self) -> Result<FsFrameStream> {
        let files = self.collect_frames()?;
        if files.is_empty() {
            anyhow::bail!("No image frames found in {}", self.dir.display());
        }
        debug!("Found {} frames in {}", files.len(), self.dir.display());

        Ok(FsFrameStream {
            files: files.into(),
            next_sequence: 0,
        })
    }

    fn release(&mut self, stream: FsFrameStream) {
        debug!(
            "Released frame directory {} ({} frames unread)",
            self.dir.display(),
            stream.files.len()
        );
    }
}

/// Stream over the frame files of an [`FsCamera`].
pub struct FsFrameStream {
    files: VecDeque<PathBuf>,
    next_sequence: u64,
}

impl FsFrameStream {
    /// Frames not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl FrameStream for FsFrameStream {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.pop_front() else {
            return Ok(None);
        };
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        match image::open(&path) {
            Ok(image) => Ok(Some(Frame::new(
                sequence,
                path.to_string_lossy().into_owned(),
                image,
            ))),
            Err(e) => {
                warn!("Unreadable frame {}: {e}", path.display());
                Err(e).with_context(|| format!("Failed to decode frame: {}", path.display()))
            }
        }
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.as_str()))
}
