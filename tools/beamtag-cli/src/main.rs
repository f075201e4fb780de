//! # beamtag
//!
//! Decode per-token label distributions into schema-valid label sequences,
//! evaluate decoded predictions against gold labels, and convert label
//! sequences between tagging schemes.
//!
//! Input and output are JSON lines on stdin/stdout; logs go to stderr.

use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use beamtag_core::config::bound_from_signed;
use beamtag_core::{
    AnnotatedSegment, DecodeStrategy, Decoded, Decoder, DecoderConfig, Evaluator, Label,
    LabelAlphabet, Scheme, Token, Tokenizer, build_segments, convert,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "beamtag")]
#[command(about = "Constrained decoding of sequence-labeling scores")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode JSON lines of `{"text": "...", "scores": [[...], ...]}`
    /// (or pre-split `"tokens": [...]` instead of `"text"`)
    Decode {
        #[command(flatten)]
        decoder: DecoderArgs,

        /// Also emit the entity segments of each sentence
        #[arg(short, long)]
        segments: bool,
    },
    /// Decode JSON lines of `{"gold": [...], "scores": [[...], ...]}` and
    /// report per-label metrics
    Evaluate {
        #[command(flatten)]
        decoder: DecoderArgs,

        /// Skip tokens whose gold label is not in the alphabet
        #[arg(long)]
        ignore_missing: bool,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert whitespace-separated label lines between schemes
    Convert {
        /// Scheme of the input labels
        #[arg(long, default_value = "iob")]
        from: Scheme,

        /// Scheme of the output labels
        #[arg(long, default_value = "bieou")]
        to: Scheme,
    },
}

/// Options shared by the decoding commands.
#[derive(Args)]
struct DecoderArgs {
    /// Label alphabet file: `{"scheme": "bieou", "labels": ["O", "B-PER", ...]}`
    #[arg(short, long, env = "BEAMTAG_ALPHABET")]
    alphabet: PathBuf,

    /// Decoder configuration file (JSON, `-1` = unbounded)
    #[arg(short, long, env = "BEAMTAG_CONFIG")]
    config: Option<PathBuf>,

    /// Max live states per step (-1 = unbounded)
    #[arg(long, env = "BEAMTAG_BEAM_SIZE", allow_negative_numbers = true)]
    beam_size: Option<i64>,

    /// Max extensions per state (-1 = unbounded)
    #[arg(long, env = "BEAMTAG_FORK_SIZE", allow_negative_numbers = true)]
    fork_size: Option<i64>,

    /// Longest sentence the beam search attempts (-1 = unbounded)
    #[arg(long, env = "BEAMTAG_MAX_ITERATIONS", allow_negative_numbers = true)]
    max_iterations: Option<i64>,

    /// Worker threads (0 = one per core)
    #[arg(short, long, env = "BEAMTAG_WORKERS", default_value_t = 1)]
    workers: usize,
}

impl DecoderArgs {
    /// Defaults, then the config file, then explicit flags.
    fn decoder_config(&self) -> Result<DecoderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => DecoderConfig::default(),
        };

        if let Some(v) = self.beam_size {
            config = config.with_beam_size(bound_from_signed(v).context("--beam-size")?);
        }
        if let Some(v) = self.fork_size {
            config = config.with_fork_size(bound_from_signed(v).context("--fork-size")?);
        }
        if let Some(v) = self.max_iterations {
            let bound = bound_from_signed(v).context("--max-iterations")?;
            config = config.with_max_iterations(bound);
        }
        config.validate()?;
        Ok(config)
    }

    fn decoder(&self) -> Result<Decoder> {
        let alphabet = load_alphabet(&self.alphabet)?;
        let config = self.decoder_config()?;
        info!(
            scheme = %alphabet.scheme(),
            labels = alphabet.len(),
            ?config,
            "decoder ready"
        );
        Ok(Decoder::new(Arc::new(alphabet), config)?)
    }
}

fn load_alphabet(path: &Path) -> Result<LabelAlphabet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read alphabet {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid alphabet {}", path.display()))
}

/// One input line of `decode`.
#[derive(Debug, Deserialize)]
struct DecodeRequest {
    /// Raw sentence, tokenized here so segment offsets point into it.
    #[serde(default)]
    text: Option<String>,
    /// Pre-split forms, assumed to be joined by single spaces.
    #[serde(default)]
    tokens: Option<Vec<String>>,
    scores: Vec<Vec<f64>>,
}

impl DecodeRequest {
    fn tokens(&self, tokenizer: &Tokenizer) -> Result<Option<Vec<Token>>> {
        let tokens = match (&self.text, &self.tokens) {
            (Some(_), Some(_)) => bail!("give either \"text\" or \"tokens\", not both"),
            (Some(text), None) => tokenizer.tokenize(text),
            (None, Some(forms)) => Token::from_forms(forms),
            (None, None) => return Ok(None),
        };
        if tokens.len() != self.scores.len() {
            bail!(
                "{} tokens but {} score vectors",
                tokens.len(),
                self.scores.len()
            );
        }
        Ok(Some(tokens))
    }
}

/// One output line of `decode`.
#[derive(Debug, Serialize)]
struct DecodeOutput {
    labels: Vec<String>,
    scores: Vec<f64>,
    strategy: DecodeStrategy,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    segments: Option<Vec<AnnotatedSegment>>,
}

/// One input line of `evaluate`.
#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    gold: Vec<String>,
    scores: Vec<Vec<f64>>,
}

/// Parse non-empty JSON lines, numbering them from 1 for error messages.
fn read_json_lines<T, R>(input: R) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    R: BufRead,
{
    let mut items = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid JSON", i + 1))?;
        items.push(item);
    }
    Ok(items)
}

fn decode_output(
    request: &DecodeRequest,
    decoded: Decoded,
    with_segments: bool,
    tokenizer: &Tokenizer,
) -> Result<DecodeOutput> {
    let tokens = request.tokens(tokenizer)?;

    let segments = if with_segments {
        Some(build_segments(&decoded.labels, tokens.as_deref())?)
    } else {
        None
    };

    Ok(DecodeOutput {
        labels: decoded.labels.iter().map(|l| l.inner.to_string()).collect(),
        scores: decoded.labels.iter().map(|l| l.score).collect(),
        strategy: decoded.strategy,
        score: decoded.score,
        segments,
    })
}

fn run_decode<R: BufRead, W: Write>(
    decoder: &Decoder,
    workers: usize,
    with_segments: bool,
    input: R,
    mut output: W,
) -> Result<()> {
    let requests: Vec<DecodeRequest> = read_json_lines(input)?;
    let batch: Vec<Vec<Vec<f64>>> = requests.iter().map(|r| r.scores.clone()).collect();
    let decoded = decoder.decode_batch(&batch, workers)?;
    let tokenizer = Tokenizer::new()?;

    let mut fallbacks = 0;
    for (i, (request, decoded)) in requests.iter().zip(decoded).enumerate() {
        if decoded.is_fallback() {
            fallbacks += 1;
        }
        let line = decode_output(request, decoded, with_segments, &tokenizer)
            .with_context(|| format!("sentence {}", i + 1))?;
        serde_json::to_writer(&mut output, &line)?;
        writeln!(output)?;
    }

    info!(sentences = requests.len(), fallbacks, "decoding finished");
    Ok(())
}

fn run_evaluate<R: BufRead, W: Write>(
    decoder: &Decoder,
    workers: usize,
    ignore_missing: bool,
    as_json: bool,
    input: R,
    mut output: W,
) -> Result<()> {
    let requests: Vec<EvaluateRequest> = read_json_lines(input)?;
    let batch: Vec<Vec<Vec<f64>>> = requests.iter().map(|r| r.scores.clone()).collect();
    let decoded = decoder.decode_batch(&batch, workers)?;

    let mut evaluator = Evaluator::new(decoder.alphabet(), ignore_missing);
    for (i, (request, decoded)) in requests.iter().zip(decoded).enumerate() {
        let gold = request
            .gold
            .iter()
            .map(|s| s.parse::<Label>())
            .collect::<beamtag_core::Result<Vec<_>>>()
            .with_context(|| format!("sentence {}: invalid gold label", i + 1))?;
        let predicted: Vec<Label> = decoded.labels.into_iter().map(|l| l.inner).collect();
        evaluator
            .evaluate_sentence(&gold, &predicted)
            .with_context(|| format!("sentence {}", i + 1))?;
    }

    let stats = evaluator.into_stats();
    if as_json {
        serde_json::to_writer_pretty(&mut output, &stats)?;
        writeln!(output)?;
    } else {
        writeln!(output, "{stats}")?;
    }
    Ok(())
}

fn convert_line(line: &str, from: Scheme, to: Scheme) -> Result<String> {
    let labels = line
        .split_whitespace()
        .map(str::parse)
        .collect::<beamtag_core::Result<Vec<Label>>>()?;
    let converted = convert(&labels, from, to)?;
    Ok(converted
        .iter()
        .map(Label::to_string)
        .collect::<Vec<_>>()
        .join(" "))
}

fn run_convert<R: BufRead, W: Write>(
    from: Scheme,
    to: Scheme,
    input: R,
    mut output: W,
) -> Result<()> {
    for (i, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let converted = convert_line(&line, from, to).with_context(|| format!("line {}", i + 1))?;
        writeln!(output, "{converted}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    match cli.command {
        Commands::Decode { decoder, segments } => {
            let workers = decoder.workers;
            let decoder = decoder.decoder()?;
            run_decode(&decoder, workers, segments, stdin, stdout)
        }
        Commands::Evaluate {
            decoder,
            ignore_missing,
            json,
        } => {
            let workers = decoder.workers;
            let decoder = decoder.decoder()?;
            run_evaluate(&decoder, workers, ignore_missing, json, stdin, stdout)
        }
        Commands::Convert { from, to } => {
            debug!(%from, %to, "converting labels");
            run_convert(from, to, stdin, stdout)
        }
    }
}
