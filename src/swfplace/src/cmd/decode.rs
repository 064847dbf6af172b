use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use swfplace_tags::{bit_buf::BitReader, OpaquePolicy, PlaceObject, Version};

use super::Command;
use crate::cli::{io, RecordArgs, HYPHEN};

/// Decodes a record body and prints it as JSON.
#[derive(Debug, Args)]
pub struct Decode {
    #[clap(flatten)]
    record: RecordArgs,

    /// The output file for the JSON rendering, or `-` for stdout.
    #[clap(short, default_value = HYPHEN)]
    output: PathBuf,
}

#[derive(Serialize)]
struct Rendered<'a> {
    version: Version,
    record: &'a PlaceObject,
}

impl Command for Decode {
    fn handle(self) -> eyre::Result<()> {
        let version = self.record.version()?;
        let codec = self.record.codec(OpaquePolicy::Reject);
        let data = io::read_input(&self.record.input)?;

        let mut reader = BitReader::new(&data);
        let record = codec.decode(&mut reader, version)?;
        if !reader.is_empty() {
            log::warn!(
                "{} bytes after the {version} record were not consumed",
                reader.remainder().len()
            );
        }

        io::serialize_to_output_source(
            io::output_file(self.output),
            &Rendered {
                version,
                record: &record,
            },
        )
    }
}
