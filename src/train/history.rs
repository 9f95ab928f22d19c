use std::fs::{File, OpenOptions};
use std::path::Path;

use csv::{Writer, WriterBuilder};
use log::debug;

use crate::error::Result;
use crate::train::epoch_stats::EpochStats;

/// Column names of the history file, in `EpochStats` field order.
pub const HEADER: [&str; 7] = [
    "epoch",
    "train_accuracy",
    "train_cost",
    "validation_accuracy",
    "validation_cost",
    "test_accuracy",
    "test_cost",
];

/// Appends one CSV row per epoch to a history file.
///
/// The file is opened in append mode; the header is written only when the
/// file is empty, so a resumed run keeps extending the same table. Every row
/// is flushed as soon as it is written. Dropping the writer closes the file.
pub struct HistoryWriter {
    writer: Writer<File>,
}

impl HistoryWriter {
    pub fn open(path: &Path) -> Result<HistoryWriter> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        debug!("Writing training history to {:?} (header: {})", path, needs_header);
        Ok(HistoryWriter { writer })
    }

    pub fn record(&mut self, stats: &EpochStats) -> Result<()> {
        self.writer.serialize(stats)?;
        self.writer.flush()?;
        Ok(())
    }
}
