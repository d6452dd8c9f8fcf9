use std::{borrow::Cow, fs, path::PathBuf};

use tracing::{debug, info};

use crate::{
    error::Result,
    model::Series,
    normalize::{dedup_dates, normalize},
    parser::parse,
};

/// Source of raw series text. `load` runs the whole pipeline on it.
pub trait SeriesLoader {
    fn fetch(&self) -> Result<Cow<'_, str>>;

    fn load(&self) -> Result<Series> {
        let text = self.fetch()?;
        let series = dedup_dates(normalize(parse(&text)?));

        info!(records = series.len(), "loaded series");
        Ok(series)
    }
}

pub struct FileLoader {
    pub path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeriesLoader for FileLoader {
    fn fetch(&self) -> Result<Cow<'_, str>> {
        debug!(path = %self.path.display(), "reading series file");
        Ok(Cow::Owned(fs::read_to_string(&self.path)?))
    }
}

/// Serves text already held in memory.
pub struct TextLoader {
    pub text: String,
}

impl SeriesLoader for TextLoader {
    fn fetch(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(&self.text))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Keeps the result of the most recently started load.
///
/// Each load takes a ticket before it starts. A result arriving with an
/// older ticket than the one already installed is discarded.
#[derive(Debug)]
pub struct LoadSequencer<T = Series> {
    issued: u64,
    current: Option<(LoadTicket, T)>,
}

impl<T> Default for LoadSequencer<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            current: None,
        }
    }
}

impl<T> LoadSequencer<T> {
    pub fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Installs `value` unless a newer load already completed.
    pub fn complete(&mut self, ticket: LoadTicket, value: T) -> bool {
        if let Some((installed, _)) = &self.current {
            if *installed > ticket {
                debug!(?ticket, ?installed, "discarding stale load");
                return false;
            }
        }

        self.current = Some((ticket, value));
        true
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref().map(|(_, value)| value)
    }
}
