//! Asynchronous CSV reader with batch interface
//!
//! Provides batched reading of packet definitions for the async strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of PacketSpecs
//!                  ↓
//!           csv_format module
//!           (CsvPacketRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvPacketRecord};
use crate::types::PacketSpec;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Reads packet definitions in batches with constant memory per batch.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 0,
        }
    }

    /// Read a batch of packet definitions
    ///
    /// Reads up to `batch_size` valid records. Invalid records are logged
    /// with their line number and skipped.
    ///
    /// # Returns
    ///
    /// The converted packet definitions, in file order. Returns an empty
    /// vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<PacketSpec> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvPacketRecord>();

        while batch.len() < batch_size {
            let Some(result) = records.next().await else {
                break;
            };
            self.line_num += 1;
            let line = self.line_num + 1;

            match result {
                Ok(csv_record) => match convert_csv_record(csv_record) {
                    Ok(spec) => batch.push(spec),
                    Err(e) => warn!(line, error = %e, "Skipping invalid packet record"),
                },
                Err(e) => warn!(line, error = %e, "CSV parse error"),
            }
        }

        batch
    }
}
