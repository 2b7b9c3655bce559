use super::{LandmarkSource, Selection};
use crate::{error::Error, frame::Frame, landmark::LandmarkSet};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::info;

/// Plays back recorded estimator output, one record line per frame.
pub(crate) struct Replay<R> {
    lines: R,
    selection: Selection,
    line: String,
    frames: usize,
    exhausted: bool,
}

impl Replay<BufReader<File>> {
    pub(crate) fn open<P: AsRef<Path>>(path: P, selection: Selection) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::OpenReplay(e, path.to_path_buf()))?;
        Ok(Self::new(BufReader::new(file), selection))
    }
}

impl<R: BufRead> Replay<R> {
    pub(crate) fn new(lines: R, selection: Selection) -> Self {
        Self {
            lines,
            selection,
            line: String::new(),
            frames: 0,
            exhausted: false,
        }
    }
}

impl<R: BufRead> LandmarkSource for Replay<R> {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>, Error> {
        if self.exhausted {
            return Ok(None);
        }

        self.line.clear();
        if self
            .lines
            .read_line(&mut self.line)
            .map_err(Error::ReadRecord)?
            == 0
        {
            info!(message = "replay finished", frames = self.frames);
            self.exhausted = true;
            return Ok(None);
        }

        self.frames += 1;
        if self.line.trim().is_empty() {
            return Ok(None);
        }
        self.selection.parse(&self.line)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
