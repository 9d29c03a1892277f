use anyhow::Context;
use clap::Parser;
use prompt_flatten::{
    Config, ImageMode, JsonMode, Optimizer, Source, TextMode, TokenizerKind,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "prompt-flatten",
    version,
    author,
    about = "Flatten structured data into token-efficient text for LLM prompts",
    long_about = "Flatten structured data into token-efficient text for LLM prompts.\n\n\
    Reads JSON, plain text, or binary input and emits compact path:value lines, \
    collapsing uniform arrays into tabular blocks. Malformed input degrades to a \
    diagnostic line instead of failing.\n\n\
    USAGE EXAMPLES:\n  \
      # Flatten a JSON file\n  \
      prompt-flatten data.json\n\n  \
      # Flatten stdin, picking the strategy automatically\n  \
      cat data.json | prompt-flatten --auto\n\n  \
      # Abbreviate repeated path segments\n  \
      prompt-flatten data.json --abbreviate\n\n  \
      # Describe a binary blob\n  \
      prompt-flatten photo.jpg --binary"
)]
struct Cli {
    /// Input file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Treat the input as an opaque binary blob
    #[arg(long)]
    binary: bool,

    /// Rendering mode for structured input
    #[arg(long, value_enum, default_value = "flatten")]
    json_mode: CliJsonMode,

    /// Handling mode for long plain text
    #[arg(long, value_enum, default_value = "clean")]
    text_mode: CliTextMode,

    /// Handling mode for binary input
    #[arg(long, value_enum, default_value = "metadata")]
    image_mode: CliImageMode,

    /// Character threshold separating short text from long text
    #[arg(long, default_value_t = 500)]
    long_text_threshold: usize,

    /// Pick the encoding strategy automatically from the input shape
    #[arg(long)]
    auto: bool,

    /// Abbreviate repeated leading path segments
    #[arg(long)]
    abbreviate: bool,

    /// Minimum occurrences before a segment is abbreviated
    #[arg(long, default_value_t = 2)]
    abbreviation_threshold: usize,

    /// Dotted path to keep in filter mode (can be used multiple times)
    #[arg(long = "keep-path", value_name = "PATH")]
    keep_paths: Vec<String>,

    /// Tokenizer used for the savings estimate
    #[arg(long, value_enum, default_value = "enhanced")]
    tokenizer: CliTokenizer,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliJsonMode {
    None,
    Flatten,
    ToYaml,
    Filter,
}

impl From<CliJsonMode> for JsonMode {
    fn from(m: CliJsonMode) -> Self {
        match m {
            CliJsonMode::None => Self::None,
            CliJsonMode::Flatten => Self::Flatten,
            CliJsonMode::ToYaml => Self::ToYaml,
            CliJsonMode::Filter => Self::Filter,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliTextMode {
    None,
    Clean,
    SummarizeFast,
    SummarizeHighQuality,
}

impl From<CliTextMode> for TextMode {
    fn from(m: CliTextMode) -> Self {
        match m {
            CliTextMode::None => Self::None,
            CliTextMode::Clean => Self::Clean,
            CliTextMode::SummarizeFast => Self::SummarizeFast,
            CliTextMode::SummarizeHighQuality => Self::SummarizeHighQuality,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliImageMode {
    None,
    Ocr,
    Metadata,
}

impl From<CliImageMode> for ImageMode {
    fn from(m: CliImageMode) -> Self {
        match m {
            CliImageMode::None => Self::None,
            CliImageMode::Ocr => Self::Ocr,
            CliImageMode::Metadata => Self::Metadata,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliTokenizer {
    Simple,
    Enhanced,
}

impl From<CliTokenizer> for TokenizerKind {
    fn from(t: CliTokenizer) -> Self {
        match t {
            CliTokenizer::Simple => Self::Simple,
            CliTokenizer::Enhanced => Self::Enhanced,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let config = Config::builder()
        .json_mode(cli.json_mode.into())
        .text_mode(cli.text_mode.into())
        .image_mode(cli.image_mode.into())
        .long_text_threshold(cli.long_text_threshold)
        .enable_abbreviations(cli.abbreviate)
        .abbreviation_threshold(cli.abbreviation_threshold)
        .json_paths_to_keep(cli.keep_paths)
        .tokenizer(cli.tokenizer.into())
        .build()
        .context("Failed to build configuration")?;

    let source = read_input(cli.input.as_deref(), cli.binary)?;

    let optimizer = Optimizer::new(config).context("Failed to create optimizer")?;
    let result = if cli.auto {
        optimizer.optimize_auto(source)
    } else {
        optimizer.optimize(source)
    }
    .context("Optimization failed")?;

    tracing::info!(
        input_tokens = result.input_tokens,
        output_tokens = result.output_tokens,
        saved = result.saved_tokens(),
        "token estimate"
    );

    println!("{}", result.output);

    Ok(())
}

/// Reads the input file (or stdin) as text or binary.
fn read_input(path: Option<&Path>, binary: bool) -> anyhow::Result<Source> {
    match path {
        Some(path) => {
            if binary {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read '{}'", path.display()))?;
                Ok(Source::bytes(bytes))
            } else {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read '{}'", path.display()))?;
                Ok(Source::text(text))
            }
        }
        None => {
            if binary {
                let mut bytes = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut bytes)
                    .context("Failed to read stdin")?;
                Ok(Source::bytes(bytes))
            } else {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                Ok(Source::text(text))
            }
        }
    }
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("prompt_flatten=warn"),
        1 => EnvFilter::new("prompt_flatten=info"),
        2 => EnvFilter::new("prompt_flatten=debug"),
        _ => EnvFilter::new("prompt_flatten=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_read_input_text_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("data.json");
        file.write_str(r#"{"a":1}"#).unwrap();

        let source = read_input(Some(file.path()), false).unwrap();
        assert_eq!(source, Source::text(r#"{"a":1}"#));
    }

    #[test]
    fn test_read_input_binary_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("blob.bin");
        file.write_binary(&[0xff, 0x00]).unwrap();

        let source = read_input(Some(file.path()), true).unwrap();
        assert_eq!(source, Source::bytes(vec![0xff, 0x00]));
    }

    #[test]
    fn test_read_input_missing_file() {
        let result = read_input(Some(Path::new("/nonexistent/input.json")), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::parse_from(["prompt-flatten"]);
        assert!(cli.input.is_none());
        assert!(!cli.auto);
        assert_eq!(cli.long_text_threshold, 500);
    }

    #[test]
    fn test_cli_parses_modes() {
        let cli = Cli::parse_from([
            "prompt-flatten",
            "data.json",
            "--json-mode",
            "to-yaml",
            "--auto",
            "--abbreviate",
        ]);
        assert!(matches!(cli.json_mode, CliJsonMode::ToYaml));
        assert!(cli.auto);
        assert!(cli.abbreviate);
    }
}
