use std::{
    fs,
    io::{self, BufWriter, IsTerminal, Read, Write},
    path::{Path, PathBuf},
    process,
};

use clap::CommandFactory;
use serde::Serialize;

use super::{Cli, HYPHEN};

/// Obtains a buffered reader over the contents of stdin.
///
/// This function will terminate the process and print the running
/// command's help if stdin is connected to a terminal.
pub fn stdin_reader() -> io::BufReader<io::StdinLock<'static>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        let _ = Cli::command().print_help();
        process::exit(2);
    }

    io::BufReader::new(stdin.lock())
}

/// Reads all bytes of the given input source.
pub fn read_input(input: &str) -> eyre::Result<Vec<u8>> {
    let data = if input == HYPHEN {
        let mut buf = Vec::new();
        stdin_reader().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(input)?
    };

    log::debug!("Read {} bytes from '{input}'", data.len());
    Ok(data)
}

/// Maps an output path argument to a file, or [`None`] for stdout.
pub fn output_file(out: PathBuf) -> Option<PathBuf> {
    (out != Path::new(HYPHEN)).then_some(out)
}

/// Serializes the given value to the respective output source.
///
/// This will produce valid JSON. If the output is a file or piped to
/// another application, a minified representation will be emitted.
///
/// Output to stdout always gets pretty-printed.
pub fn serialize_to_output_source<T: Serialize>(
    out: Option<PathBuf>,
    value: &T,
) -> eyre::Result<()> {
    if let Some(out) = out {
        let file = fs::File::create(&out)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    } else {
        let mut stdout = io::stdout().lock();

        if stdout.is_terminal() {
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        } else {
            serde_json::to_writer(&mut stdout, value)?;
        }
    }

    Ok(())
}
