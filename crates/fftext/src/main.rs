use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fft_text::{CharMapKind, TextBlock};
use iso_region::{Region, RegionSet};
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "fftext", about = "Dump and repack Final Fantasy Tactics text regions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a text region to a JSON array of strings
    Dump {
        #[command(flatten)]
        text: TextArgs,

        #[arg(long, value_parser = parse_number)]
        offset: u64,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode a JSON array of strings and write it back into the image
    Pack {
        #[command(flatten)]
        text: TextArgs,

        /// Every offset the text is stored at
        #[arg(long = "offset", value_parser = parse_number, required = true)]
        offsets: Vec<u64>,

        /// Read JSON from here instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct TextArgs {
    /// Disc image or extracted file
    image: PathBuf,

    #[arg(long, value_parser = parse_number)]
    max_length: u64,

    /// Use the PSP character map
    #[arg(long)]
    psp: bool,

    /// The region holds compressed text
    #[arg(long)]
    compressed: bool,

    /// Byte the unused tail of the region is padded with
    #[arg(long, value_parser = parse_byte, default_value = "0xFE")]
    fill: u8,
}

impl TextArgs {
    fn settings(&self) -> anyhow::Result<TextSettings> {
        Ok(TextSettings {
            kind: if self.psp { CharMapKind::Psp } else { CharMapKind::Psx },
            max_length: usize::try_from(self.max_length).context("max length does not fit in memory")?,
            compressed: self.compressed,
            fill: self.fill,
        })
    }
}

/// How one text region is laid out in the image.
#[derive(Debug, Clone, Copy)]
struct TextSettings {
    kind: CharMapKind,
    max_length: usize,
    compressed: bool,
    fill: u8,
}

fn parse_number(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let n = parse_number(s)?;
    u8::try_from(n).map_err(|_| format!("{s:?} does not fit in a byte"))
}

fn read_block(image: &[u8], offset: u64, settings: &TextSettings) -> anyhow::Result<TextBlock> {
    let region = Region::new(offset, settings.max_length);
    let window = region.read(&mut Cursor::new(image))?;
    let start = usize::try_from(offset).context("offset does not fit in memory")?;

    Ok(TextBlock::new(settings.kind)
        .compressed(settings.compressed)
        .max_length(settings.max_length)
        .fill(settings.fill)
        .read(image, &window, start))
}

/// Encodes `entries` and writes them to every offset. Returns the encoded
/// length.
fn write_block<F: Write + Seek>(
    image: &mut F,
    entries: Vec<String>,
    offsets: &[u64],
    settings: &TextSettings,
) -> anyhow::Result<usize> {
    let mut block = TextBlock::new(settings.kind)
        .compressed(settings.compressed)
        .max_length(settings.max_length);
    block.set_entries(entries);
    let data = block.to_bytes()?;

    let mut builder = RegionSet::builder()
        .max_length(settings.max_length)
        .fill(settings.fill);
    for &offset in offsets {
        builder = builder.location(offset);
    }
    builder.build()?.write_all(image, &data)?;
    Ok(data.len())
}

fn dump(text: &TextArgs, offset: u64, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut image = Vec::new();
    File::open(&text.image)
        .with_context(|| format!("opening {}", text.image.display()))?
        .read_to_end(&mut image)?;

    let block = read_block(&image, offset, &text.settings()?)?;
    info!(entries = block.entries.len(), offset, "decoded region");

    let json = serde_json::to_string_pretty(&block.entries)?;
    match output {
        Some(path) => std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn pack(text: &TextArgs, offsets: Vec<u64>, input: Option<PathBuf>) -> anyhow::Result<()> {
    let json = match input {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let entries: Vec<String> = serde_json::from_str(&json).context("expected a JSON array of strings")?;

    let settings = text.settings()?;
    let mut image = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&text.image)
        .with_context(|| format!("opening {}", text.image.display()))?;
    let length = write_block(&mut image, entries, &offsets, &settings)?;
    image.flush()?;

    info!(
        length,
        max_length = settings.max_length,
        locations = offsets.len(),
        "packed region"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fftext=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Dump { text, offset, output } => dump(&text, offset, output),
        Command::Pack { text, offsets, input } => pack(&text, offsets, input),
    }
}
