use clap::{Args as ClapArgs, Parser, Subcommand};
use plugin_core::LinkType;
use std::path::PathBuf;

fn parse_lanes(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("lanes must be greater than 0".into())
    } else {
        Ok(v)
    }
}

fn parse_layers(s: &str) -> Result<u8, String> {
    let v: u8 = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("layers must be greater than 0".into())
    } else {
        Ok(v)
    }
}

/// A captured frame given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(pub Vec<u8>);

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Parses a frame written as hex. `:`, `-` and whitespace between bytes are
/// ignored.
pub fn parse_frame(s: &str) -> Result<Frame, String> {
    let digits: Vec<u8> = s
        .bytes()
        .filter(|b| !matches!(b, b':' | b'-' | b' ' | b'\t'))
        .collect();
    if digits.is_empty() {
        return Err("empty frame".into());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte '{pair}'"))
        })
        .collect::<Result<Vec<u8>, String>>()
        .map(Frame)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Vigil - plugin registry and protocol codec dispatch",
    long_about = "Vigil loads protocol codecs and other extensions, validates them against the host ABI and builds the protocol dispatch table used to decode captured frames.

Examples:
  vigil plugins list                  # List registered plugins
  vigil codecs                        # Show the dispatch table
  vigil decode 000102030405...        # Decode a hex frame",
    subcommand_required = true
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Extra plugin search path, colon separated
    #[arg(long = "plugin-path", global = true)]
    pub plugin_paths: Vec<String>,
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
    /// Suppress log output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect registered plugins
    #[command(subcommand, alias = "plugin")]
    Plugins(PluginCmd),
    /// Show instantiated codecs and the raw decoder
    Codecs(CodecsArgs),
    /// Decode hex frames through the codec chain
    Decode(DecodeArgs),
}

#[derive(Subcommand)]
pub enum PluginCmd {
    /// List registered plugins with version and source
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show every registered plugin with its help text
    Show,
}

#[derive(ClapArgs)]
pub struct CodecsArgs {
    /// Link type used to pick the raw decoder
    #[arg(long = "link-type")]
    pub link_type: Option<LinkType>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs)]
pub struct DecodeArgs {
    /// Link type of the frames
    #[arg(long = "link-type")]
    pub link_type: Option<LinkType>,
    /// Maximum number of layers decoded per frame
    #[arg(long, value_parser = parse_layers)]
    pub layers: Option<u8>,
    /// Number of worker lanes
    #[arg(long, value_parser = parse_lanes)]
    pub lanes: Option<usize>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
    /// Frames as hex strings
    #[arg(required = true, value_parser = parse_frame)]
    pub frames: Vec<Frame>,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
