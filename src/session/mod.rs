//! Snapshot persistence and sample numbering
//!
//! Each program run gets one directory named from its start time; snapshots
//! land there as `p<sample>_<shot>.jpg`. The sample counter only advances
//! after at least one snapshot exists for the current sample.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::capture::frame::{swap_channel_order, Frame};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to create session directory {dir}: {source}")]
    CreateDir { dir: PathBuf, source: io::Error },
    #[error("frame buffer does not match its dimensions")]
    MalformedFrame,
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Owns the run directory, the sample/shot counters, and the frame most
/// recently shown on screen (the one a snapshot persists).
pub struct SessionController {
    dir: PathBuf,
    sample_id: u32,
    shot_id: u32,
    next_enabled: bool,
    last_frame: Option<Frame>,
}

impl SessionController {
    /// Creates the run directory under `root`, named `YYYYMMDD_HHMMSS` in
    /// local time.
    pub fn create(root: &Path) -> Result<Self, SessionError> {
        let name = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let dir = root.join(name);
        fs::create_dir_all(&dir).map_err(|source| SessionError::CreateDir {
            dir: dir.clone(),
            source,
        })?;

        Ok(Self {
            dir,
            sample_id: 0,
            shot_id: 0,
            next_enabled: false,
            last_frame: None,
        })
    }

    /// Remembers the frame just shown on screen, replacing any earlier one.
    /// Kept in its capture channel order, untouched by display conversion.
    pub fn observe_frame(&mut self, frame: Frame) {
        self.last_frame = Some(frame);
    }

    /// Writes the last displayed frame as `p<sample>_<shot>.jpg` and bumps
    /// the shot counter. Returns `Ok(None)` when no frame has been displayed
    /// yet, in which case nothing is written and no counter moves.
    pub fn take_snapshot(&mut self) -> Result<Option<PathBuf>, SessionError> {
        let Some(frame) = &self.last_frame else {
            return Ok(None);
        };

        let path = self
            .dir
            .join(format!("p{}_{}.jpg", self.sample_id, self.shot_id));

        let rgb = swap_channel_order(&frame.data);
        let img = image::RgbImage::from_raw(frame.meta.width, frame.meta.height, rgb)
            .ok_or(SessionError::MalformedFrame)?;
        img.save(&path).map_err(|source| SessionError::Write {
            path: path.clone(),
            source,
        })?;

        self.shot_id += 1;
        self.next_enabled = true;
        info!(path = %path.display(), "snapshot saved");
        Ok(Some(path))
    }

    /// Moves on to the next sample. Refused until the current sample has at
    /// least one snapshot; afterwards the shot counter restarts at zero.
    pub fn advance_sample(&mut self) -> bool {
        if !self.next_enabled {
            return false;
        }
        self.sample_id += 1;
        self.shot_id = 0;
        self.next_enabled = false;
        info!(sample = self.sample_id, "advanced to next sample");
        true
    }

    pub fn sample_id(&self) -> u32 {
        self.sample_id
    }

    pub fn shot_id(&self) -> u32 {
        self.shot_id
    }

    /// Whether advancing is currently permitted (drives the "Next" control).
    pub fn next_enabled(&self) -> bool {
        self.next_enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
