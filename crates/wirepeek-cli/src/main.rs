//! wirepeek - Guess the structure of protobuf-style binary blobs
//!
//! This tool reads binary inputs and prints a best-guess decoding of each
//! one as protobuf wire data, without needing a schema.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use wirepeek_core::decoder::DEFAULT_MAX_DEPTH;
use wirepeek_core::{DecodeOptions, DecodeReport, Decoder};

/// Guess the structure of protobuf-style binary data without a schema
#[derive(Parser, Debug)]
#[command(name = "wirepeek")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Files or directories to decode (reads standard input when omitted)
    inputs: Vec<PathBuf>,

    /// Show all possible types instead of just the most likely one
    #[arg(long)]
    show_all: bool,

    /// Show the byte offset of each value
    #[arg(long)]
    show_offsets: bool,

    /// Deepest nested message to attempt before treating a payload as bytes
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print the fields decoded before an error instead of discarding them
    #[arg(long)]
    partial: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new()
            .show_all(self.show_all)
            .show_offsets(self.show_offsets)
            .max_depth(self.max_depth)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for decoded output
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let decoder = Decoder::with_options(cli.decode_options());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.inputs.is_empty() {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read standard input")?;
        process_input(&decoder, "<stdin>", &data, cli.partial, &mut out)?;
    }

    for input in &cli.inputs {
        for path in collect_files(input)? {
            writeln!(out, "parsing {}", path.display())?;

            trace!("Reading {}", path.display());
            let data = fs::read(&path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;

            process_input(&decoder, &path.display().to_string(), &data, cli.partial, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Expand an input path into the files to decode.
///
/// Directories are walked recursively in name order, skipping hidden entries.
fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    info!("Scanning directory: {}", input.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(input)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", input.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} files under {}", files.len(), input.display());
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Decode one input and print its report.
///
/// A malformed input is logged and skipped so the remaining inputs still run.
fn process_input(
    decoder: &Decoder,
    name: &str,
    data: &[u8],
    partial: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    trace!("Read {} bytes from {}", data.len(), name);
    let report = decoder.decode(data);

    if let Some(err) = &report.error {
        warn!("Failed to decode {}: {}", name, err);
    }

    write_report(out, report, partial)
}

/// Print a report in the `decoded N fields` block format.
///
/// Without `partial`, nothing is printed unless the whole input decoded
/// into at least one field. With it, fields decoded before an error are
/// printed along with the error.
fn write_report(out: &mut impl Write, report: DecodeReport, partial: bool) -> io::Result<()> {
    let (fields, lines, error) = report.into_parts();

    if fields == 0 || (error.is_some() && !partial) {
        return Ok(());
    }

    writeln!(out, "decoded {} fields", fields)?;
    if let Some(err) = error {
        writeln!(out, "error was {}", err)?;
    }
    writeln!(out)?;

    for line in lines {
        writeln!(out, "  {}", line)?;
    }

    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn render(data: &[u8], partial: bool) -> String {
        let mut out = Vec::new();
        process_input(&Decoder::new(), "test", data, partial, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_block() {
        let output = render(&[0x08, 0x96, 0x01, 0x12, 0x02, 0x08, 0x01], false);
        assert_eq!(
            output,
            "decoded 2 fields\n\n  1: (varint) 150\n  2: {\n    1: (varint) 1\n  }\n\n"
        );
    }

    #[test]
    fn test_empty_and_failed_inputs_print_nothing() {
        assert_eq!(render(&[], false), "");
        assert_eq!(render(&[0x08, 0x01, 0x00], false), "");
    }

    #[test]
    fn test_partial_output_includes_error() {
        let output = render(&[0x08, 0x01, 0x00], true);
        assert_eq!(
            output,
            "decoded 1 fields\nerror was tag was zero at offset 2\n\n  1: (varint) 1\n\n"
        );
    }

    #[test]
    fn test_collect_files_walks_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("b.bin"), [0x08, 0x01]).unwrap();
        fs::write(root.join("a.bin"), [0x08, 0x02]).unwrap();
        fs::write(root.join("nested").join("c.bin"), [0x08, 0x03]).unwrap();
        fs::write(root.join(".hidden"), [0x08, 0x04]).unwrap();

        let files = collect_files(root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.bin"),
                PathBuf::from("b.bin"),
                PathBuf::from("nested/c.bin"),
            ]
        );
    }

    #[test]
    fn test_collect_files_passes_plain_paths_through() {
        let files = collect_files(Path::new("/does/not/exist.bin")).unwrap();
        assert_eq!(files, vec![PathBuf::from("/does/not/exist.bin")]);
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/tmp/.git")));
        assert!(!is_hidden(Path::new("/tmp/data.bin")));
    }

    #[test]
    fn test_decode_options_from_flags() {
        let cli = Cli::parse_from(["wirepeek", "--show-all", "--max-depth", "3", "x.bin"]);
        let options = cli.decode_options();
        assert!(options.show_all);
        assert!(!options.show_offsets);
        assert_eq!(options.max_depth, 3);
        assert_eq!(cli.inputs, vec![PathBuf::from("x.bin")]);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
