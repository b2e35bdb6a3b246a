//! ccat - print the records of compressed or plain text files
//!
//! Reads every file matched by a file or pattern spec, decompressing `.gz` and `.bz2`
//! files transparently, and prints one line per record.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use compressed_source::{CompressedSource, CompressionSetting, Read, ReadOptions, TextSource};
use futures::TryStreamExt;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG controls verbosity
    env_logger::init();

    let matches = command().get_matches();

    let spec = matches
        .get_one::<String>("input")
        .context("input argument is required")?
        .clone();

    let mut options = load_options(&matches)?;
    if let Some(compression) = matches.get_one::<CompressionSetting>("compression") {
        options.compression = *compression;
    }

    let source = CompressedSource::from(TextSource::from(spec.as_str()))
        .with_decompression(options.compression.channel_factory());
    let read = Read::from(source).with_options(options);

    let records = read.into_stream();
    futures::pin_mut!(records);

    if matches.get_flag("count") {
        let mut count: u64 = 0;
        while records
            .try_next()
            .await
            .with_context(|| format!("Failed to read {spec}"))?
            .is_some()
        {
            count += 1;
        }
        println!("{count}");
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    while let Some(line) = records
        .try_next()
        .await
        .with_context(|| format!("Failed to read {spec}"))?
    {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    Ok(())
}

fn command() -> Command {
    let command = Command::new("ccat")
        .version(compressed_source::VERSION)
        .about("Print the lines of compressed or plain text files")
        .long_about(
            "ccat reads every file matched by FILE_OR_PATTERN and prints its lines. \
             Files ending in .gz or .bz2 are decompressed; anything else is read as-is \
             unless --compression forces a codec.",
        )
        .arg(
            Arg::new("input")
                .help("File or pattern (wildcards in the last path component) to read")
                .value_name("FILE_OR_PATTERN")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Decompression to apply")
                .value_parser(clap::value_parser!(CompressionSetting)),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Print the number of records instead of the records")
                .action(ArgAction::SetTrue),
        );

    #[cfg(feature = "config")]
    let command = command.arg(
        Arg::new("config")
            .long("config")
            .help("Options file (TOML); defaults to <config dir>/ccat/config.toml")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    );

    command
}

#[cfg(feature = "config")]
fn load_options(matches: &clap::ArgMatches) -> Result<ReadOptions> {
    let options = match matches.get_one::<std::path::PathBuf>("config") {
        Some(path) => ReadOptions::load(path)?,
        None => ReadOptions::load_or_default()?,
    };
    Ok(options)
}

#[cfg(not(feature = "config"))]
fn load_options(_matches: &clap::ArgMatches) -> Result<ReadOptions> {
    Ok(ReadOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!compressed_source::VERSION.is_empty());
    }

    #[test]
    fn test_command_parses_compression() {
        let matches = command()
            .try_get_matches_from(["ccat", "--compression", "bzip2", "data.bin"])
            .unwrap();
        assert_eq!(
            matches.get_one::<CompressionSetting>("compression"),
            Some(&CompressionSetting::Bzip2)
        );
        assert!(!matches.get_flag("count"));
    }

    #[test]
    fn test_command_rejects_unknown_compression() {
        let result = command().try_get_matches_from(["ccat", "--compression", "lz4", "data.bin"]);
        assert!(result.is_err());
    }
}
