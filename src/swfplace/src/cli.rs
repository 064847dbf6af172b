use clap::{Parser, Subcommand};

use crate::cmd::*;

mod args;
pub use args::RecordArgs;

pub mod io;

pub const HYPHEN: &str = "-";

/// The CLI interface for the swfplace application.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// The selected command.
    #[clap(subcommand)]
    pub command: SwfplaceCommand,

    #[clap(flatten)]
    pub verbosity: args::Verbosity,
}

/// The top-level commands supported by swfplace.
#[derive(Debug, Subcommand)]
pub enum SwfplaceCommand {
    /// Decodes a placement record body into JSON format.
    Decode(decode::Decode),
    /// Decodes and re-encodes a record body, verifying that the
    /// bytes are reproduced exactly.
    Roundtrip(roundtrip::Roundtrip),
}

impl Command for SwfplaceCommand {
    fn handle(self) -> eyre::Result<()> {
        match self {
            Self::Decode(decode) => decode.handle(),
            Self::Roundtrip(roundtrip) => roundtrip.handle(),
        }
    }
}
