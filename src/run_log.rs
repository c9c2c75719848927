//! Plain-text record of what a run did, written next to the downloaded files.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::{fetch::DownloadAttempt, request::time_stamp};

pub const LOG_FILE_NAME: &str = "log.txt";

pub struct RunLog<W: Write> {
    writer: W,
}

impl RunLog<BufWriter<File>> {
    /// Creates (or truncates) the log in `output_dir`.
    pub fn create(output_dir: &Path) -> Result<Self> {
        let path = output_dir.join(LOG_FILE_NAME);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create run log `{}`", path.display()))?;

        Ok(RunLog::new(BufWriter::new(file)))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(writer: W) -> Self {
        RunLog { writer }
    }

    pub fn header(&mut self, dataset_label: &str) -> Result<()> {
        writeln!(self.writer, "** Working on {} **", dataset_label)
            .context("Failed to write run log")?;
        self.writer.flush().context("Failed to write run log")?;

        Ok(())
    }

    /// Appends ` YYYYMMDD_HH success|fail` and flushes, so an interrupted run keeps its lines.
    pub fn record(&mut self, attempt: &DownloadAttempt) -> Result<()> {
        writeln!(
            self.writer,
            " {} {}",
            time_stamp(attempt.time),
            attempt.outcome
        )
        .context("Failed to write run log")?;
        self.writer.flush().context("Failed to write run log")?;

        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

// -- Tests -------------------------------------------------------------------
