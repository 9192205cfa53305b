//! CLI binary for smartflip.
//!
//! Maps flags onto `ExtractionConfig` / `GenerationConfig`, runs one
//! extraction (for `--file`) and one generation, and prints the result.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use smartflip::{
    extract_for_generation, generate, ArtifactKind, ArtifactSet, DocumentFile, ExtractionConfig,
    ExtractionProgressCallback, Flashcard, GenerationConfig, ProgressCallback, QuizQuestion,
    SourceMode, TestItem, ValidationPolicy,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &str, message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_prefix(prefix.to_string());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── Page progress for PDF extraction ─────────────────────────────────────────

/// Starts as a spinner (covers the first-run pdfium download and document
/// load) and turns into a page bar once the page count is known.
struct PageProgress {
    bar: ProgressBar,
}

impl PageProgress {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            bar: spinner("Reading", name),
        })
    }
}

impl ExtractionProgressCallback for PageProgress {
    fn on_extraction_start(&self, total_pages: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} pages  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_pages as u64);
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _chars: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total_pages,
            dim(error)
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();
        if total_pages > 1 {
            eprintln!(
                "{} {}/{} pages read",
                green("✔"),
                bold(&success_count.to_string()),
                total_pages
            );
        }
    }
}

// ── Arguments ────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Flashcards about a topic
  smartflip --topic "Capitales de Europa"

  # A quiz from pasted text
  smartflip --kind quiz --text "La fotosíntesis es el proceso..."

  # A practice test from a document, as JSON
  smartflip --kind test --file apuntes.pdf --json > test.json

  # Only show the text that would be sent
  smartflip --file apuntes.docx --extract-only

  # Use another provider through edgequake-llm
  smartflip --provider openai --model gpt-4.1-mini --topic "La Revolución Francesa"

ENVIRONMENT VARIABLES:
  SMARTFLIP_API_KEY       Bearer token for the chat endpoint
  DEEPSEEK_API_KEY        Fallback bearer token
  SMARTFLIP_API_URL       Chat-completion endpoint
  SMARTFLIP_MODEL         Model identifier
  SMARTFLIP_PROVIDER      edgequake-llm provider (openai, anthropic, gemini, ollama)
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips the download
  SMARTFLIP_PDFIUM_CACHE  Override the pdfium cache directory

  PDFium (~30 MB) is downloaded on the first PDF and cached under
  ~/.cache/smartflip/pdfium-7690/.
"#;

/// Generate flashcards, quizzes and practice tests with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "smartflip",
    version,
    about = "Generate flashcards, quizzes and practice tests from a topic, text or document",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("source").required(true).args(["topic", "text", "file"]))
)]
struct Cli {
    /// Generate from a topic description.
    #[arg(long)]
    topic: Option<String>,

    /// Generate from this text.
    #[arg(long)]
    text: Option<String>,

    /// Generate from a PDF, Word (.docx) or plain-text file.
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// What to generate.
    #[arg(long, short, env = "SMARTFLIP_KIND", value_enum, default_value = "flashcards")]
    kind: KindArg,

    /// Model identifier.
    #[arg(long, env = "SMARTFLIP_MODEL", default_value = smartflip::config::DEFAULT_MODEL)]
    model: String,

    /// Chat-completion endpoint.
    #[arg(long, env = "SMARTFLIP_API_URL", default_value = smartflip::config::DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token (falls back to DEEPSEEK_API_KEY).
    #[arg(long, env = "SMARTFLIP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Use an edgequake-llm provider instead of the built-in HTTP client.
    #[arg(long, env = "SMARTFLIP_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "SMARTFLIP_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Override the per-kind max_tokens (2000 / 3000 / 4000).
    #[arg(long, env = "SMARTFLIP_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Per-request timeout in seconds (none by default).
    #[arg(long, env = "SMARTFLIP_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// How generated items are checked.
    #[arg(long, env = "SMARTFLIP_VALIDATION", value_enum, default_value = "strict")]
    validation: ValidationArg,

    /// Maximum PDF pages to read.
    #[arg(long, env = "SMARTFLIP_MAX_PAGES", default_value_t = 100)]
    max_pages: usize,

    /// PDF load timeout in seconds.
    #[arg(long, env = "SMARTFLIP_LOAD_TIMEOUT", default_value_t = 30)]
    load_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "SMARTFLIP_PDF_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print the extracted text of --file and exit.
    #[arg(long, requires = "file")]
    extract_only: bool,

    /// Print the result as JSON.
    #[arg(long, env = "SMARTFLIP_JSON")]
    json: bool,

    /// Disable progress bars.
    #[arg(long, env = "SMARTFLIP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SMARTFLIP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SMARTFLIP_QUIET")]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Flashcards,
    Quiz,
    Test,
}

impl From<KindArg> for ArtifactKind {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::Flashcards => ArtifactKind::Flashcards,
            KindArg::Quiz => ArtifactKind::Quiz,
            KindArg::Test => ArtifactKind::Test,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ValidationArg {
    Strict,
    Lenient,
    Off,
}

impl From<ValidationArg> for ValidationPolicy {
    fn from(v: ValidationArg) -> Self {
        match v {
            ValidationArg::Strict => ValidationPolicy::Strict,
            ValidationArg::Lenient => ValidationPolicy::Lenient,
            ValidationArg::Off => ValidationPolicy::Off,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are hidden while a progress bar is on screen.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Source text ──────────────────────────────────────────────────────
    let (source_text, mode) = if let Some(ref topic) = cli.topic {
        (topic.clone(), SourceMode::Topic)
    } else if let Some(ref text) = cli.text {
        (text.clone(), SourceMode::PastedText)
    } else if let Some(ref path) = cli.file {
        let text = read_document(&cli, path, show_progress).await?;
        if cli.extract_only {
            let mut out = io::stdout().lock();
            writeln!(out, "{text}").context("Failed to write to stdout")?;
            return Ok(());
        }
        (text, SourceMode::FileText)
    } else {
        anyhow::bail!("one of --topic, --text or --file is required");
    };

    // ── Generate ─────────────────────────────────────────────────────────
    let kind: ArtifactKind = cli.kind.into();
    let config = generation_config(&cli)?;

    let start = Instant::now();
    let bar = show_progress.then(|| spinner("Generating", kind.as_str()));
    let result = generate(&source_text, mode, kind, &config).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let set = result.with_context(|| format!("Generating {kind} failed"))?;

    if !cli.quiet {
        eprintln!(
            "{} {} {} in {:.1}s",
            green("✔"),
            bold(&set.len().to_string()),
            kind,
            start.elapsed().as_secs_f64()
        );
    }

    // ── Output ───────────────────────────────────────────────────────────
    let mut out = io::stdout().lock();
    if cli.json {
        let json = serde_json::to_string_pretty(&set).context("Failed to serialise output")?;
        writeln!(out, "{json}").context("Failed to write to stdout")?;
    } else {
        out.write_all(render(&set).as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

async fn read_document(cli: &Cli, path: &Path, show_progress: bool) -> Result<String> {
    let file = DocumentFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut builder = ExtractionConfig::builder()
        .max_pages(cli.max_pages)
        .load_timeout_secs(cli.load_timeout);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    let progress = show_progress.then(|| PageProgress::new(&file.name));
    if let Some(ref p) = progress {
        builder = builder.progress_callback(Arc::clone(p) as ProgressCallback);
    }
    let config = builder.build().context("Invalid extraction settings")?;

    let result = extract_for_generation(&file, &config).await;
    // Load failures never reach on_extraction_complete.
    if let Some(p) = progress {
        p.bar.finish_and_clear();
    }
    result.with_context(|| format!("Could not extract text from {}", file.name))
}

fn generation_config(cli: &Cli) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .api_url(cli.api_url.clone())
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .validation(cli.validation.into());
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(secs) = cli.request_timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder.build().context("Invalid generation settings")
}

// ── Human-readable rendering ─────────────────────────────────────────────────

const LETTERS: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];

fn render(set: &ArtifactSet) -> String {
    let mut out = String::new();
    match set {
        ArtifactSet::Flashcards(cards) => {
            for (i, card) in cards.iter().enumerate() {
                render_flashcard(&mut out, i + 1, card);
            }
        }
        ArtifactSet::Quiz(questions) => {
            for (i, q) in questions.iter().enumerate() {
                render_quiz_question(&mut out, i + 1, q);
            }
        }
        ArtifactSet::Test(items) => {
            for (i, item) in items.iter().enumerate() {
                render_test_item(&mut out, i + 1, item);
            }
        }
    }
    out
}

fn render_flashcard(out: &mut String, n: usize, card: &Flashcard) {
    out.push_str(&format!("{:>3}. {}\n     {}\n\n", n, bold(&card.front), card.back));
}

fn render_options(out: &mut String, options: &[String], correct: usize) {
    for (j, option) in options.iter().enumerate() {
        let letter = LETTERS.get(j).copied().unwrap_or('?');
        if j == correct {
            out.push_str(&format!("     {}) {} {}\n", letter, option, green("✓")));
        } else {
            out.push_str(&format!("     {}) {}\n", letter, option));
        }
    }
}

fn render_quiz_question(out: &mut String, n: usize, q: &QuizQuestion) {
    out.push_str(&format!("{:>3}. {}\n", n, bold(&q.question)));
    render_options(out, &q.options, q.correct_answer);
    out.push_str(&format!("     {}\n\n", dim(&q.explanation)));
}

fn render_test_item(out: &mut String, n: usize, item: &TestItem) {
    out.push_str(&format!(
        "{:>3}. {} {}\n",
        n,
        dim(&format!("[{}]", item.type_tag())),
        bold(item.question())
    ));
    match item {
        TestItem::Multiple {
            options,
            correct_answer,
            ..
        } => render_options(out, options, *correct_answer),
        TestItem::TrueFalse { correct_answer, .. } => {
            let answer = if *correct_answer { "Verdadero" } else { "Falso" };
            out.push_str(&format!("     → {}\n", green(answer)));
        }
        TestItem::Fill { correct_answer, .. } => {
            out.push_str(&format!("     → {}\n", green(correct_answer)));
        }
        TestItem::Match {
            options,
            correct_answer,
            ..
        } => {
            for (term, definition) in options.iter().zip(correct_answer) {
                out.push_str(&format!("     {} ↔ {}\n", term, green(definition)));
            }
        }
    }
    out.push_str(&format!("     {}\n\n", dim(item.explanation())));
}
