use clap::Args;
use swfplace_tags::{bit_buf::BitReader, OpaquePolicy};

use super::Command;
use crate::cli::{io, RecordArgs};

/// Decodes a record body, encodes it again and compares the bytes.
#[derive(Debug, Args)]
pub struct Roundtrip {
    #[clap(flatten)]
    record: RecordArgs,

    /// Write opaque embedded values back verbatim instead of failing.
    #[clap(long)]
    passthrough: bool,
}

impl Command for Roundtrip {
    fn handle(self) -> eyre::Result<()> {
        let version = self.record.version()?;
        let policy = if self.passthrough {
            OpaquePolicy::Passthrough
        } else {
            OpaquePolicy::Reject
        };
        let codec = self.record.codec(policy);
        let data = io::read_input(&self.record.input)?;

        let mut reader = BitReader::new(&data);
        let record = codec.decode(&mut reader, version)?;
        let consumed = &data[..data.len() - reader.remainder().len()];

        let encoded = codec.encode_to_vec(&record, version)?;
        if encoded != consumed {
            let offset = encoded
                .iter()
                .zip(consumed)
                .position(|(a, b)| a != b)
                .unwrap_or(encoded.len().min(consumed.len()));

            eyre::bail!(
                "re-encoded {version} record differs from the input at byte {offset} ({} vs. {} bytes)",
                encoded.len(),
                consumed.len()
            );
        }

        log::info!("{version} record of {} bytes re-encoded identically", consumed.len());
        Ok(())
    }
}
