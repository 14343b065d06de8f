//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use adpt_core::build::{BuildResult, ProgressReporter, build_document};
use adpt_core::{
    AssembleOptions, Author, ConfigSource, Copyright, DocumentConfiguration, DocumentType,
    HttpFetcher,
};
use adpt_shared::{AppConfig, check_target_directory, document_id, init_config, load_config};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Prefix marking a `--chapter` value as a part.
const PART_PREFIX: &str = "part:";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// adpt: structure-first AsciiDoc documents.
#[derive(Parser)]
#[command(
    name = "adpt",
    version,
    about = "Declare a document's structure once and regenerate its AsciiDoc master file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create a new document directory and build it.
    New {
        /// Target directory (created if missing). Defaults to an id derived from the title.
        dir: Option<PathBuf>,

        /// Document title.
        #[arg(short, long)]
        title: String,

        /// Author as "First [Middle] Last [<email>]" (repeatable, in byline order).
        #[arg(short, long = "author", required = true)]
        authors: Vec<String>,

        /// Document type: book or article.
        #[arg(long = "type", default_value = "book")]
        doc_type: String,

        /// Language code.
        #[arg(short, long, default_value = "en")]
        lang: String,

        /// First copyright year (defaults to the current year).
        #[arg(long)]
        from_year: Option<i32>,

        /// Chapter title (repeatable, in order). Prefix with "part:" for a part.
        #[arg(short, long = "chapter")]
        chapters: Vec<String>,

        /// Allow writing into a non-empty directory.
        #[arg(long)]
        overwrite: bool,
    },

    /// Append a chapter to an existing document.
    AddChapter {
        /// Document directory.
        dir: PathBuf,

        /// Chapter title.
        title: String,

        /// Include the chapter as a top-level part.
        #[arg(long)]
        part: bool,
    },

    /// Append an author to an existing document.
    AddAuthor {
        /// Document directory.
        dir: PathBuf,

        /// Author as "First [Middle] Last [<email>]".
        author: String,
    },

    /// Regenerate the master document and scaffold missing fragments.
    Build {
        /// Document directory.
        dir: PathBuf,
    },

    /// Validate document.json and print a summary.
    Check {
        /// Document directory.
        dir: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "adpt=info,adpt_core=info,adpt_shared=info",
        1 => "adpt=debug,adpt_core=debug,adpt_shared=debug",
        _ => "adpt=trace,adpt_core=trace,adpt_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;

    match cli.command {
        Command::New {
            dir,
            title,
            authors,
            doc_type,
            lang,
            from_year,
            chapters,
            overwrite,
        } => {
            let draft = NewDocument {
                title,
                authors,
                doc_type,
                lang,
                from_year,
                chapters,
            };
            let dir = dir.unwrap_or_else(|| PathBuf::from(document_id(&draft.title)));
            cmd_new(&config, &dir, draft, overwrite).await
        }
        Command::AddChapter { dir, title, part } => {
            cmd_add_chapter(&config, &dir, &title, part).await
        }
        Command::AddAuthor { dir, author } => cmd_add_author(&config, &dir, &author).await,
        Command::Build { dir } => cmd_build(&config, &dir).await,
        Command::Check { dir } => cmd_check(&config, &dir).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Values collected by `adpt new`.
struct NewDocument {
    title: String,
    authors: Vec<String>,
    doc_type: String,
    lang: String,
    from_year: Option<i32>,
    chapters: Vec<String>,
}

impl NewDocument {
    fn into_configuration(self) -> Result<DocumentConfiguration> {
        let mut document = DocumentConfiguration::new();
        document.set_title(&self.title)?;

        let authors = self
            .authors
            .iter()
            .map(|a| a.parse::<Author>())
            .collect::<adpt_shared::Result<Vec<_>>>()?;
        document.set_authors(authors)?;

        document.set_doc_type(self.doc_type.parse::<DocumentType>()?);
        document.set_lang(&self.lang);
        if let Some(year) = self.from_year {
            document.set_copyright(Copyright::since(year));
        }

        for chapter in &self.chapters {
            match chapter.strip_prefix(PART_PREFIX) {
                Some(title) => document.add_chapter(title.trim(), true)?,
                None => document.add_chapter(chapter, false)?,
            }
        }

        Ok(document)
    }
}

async fn cmd_new(config: &AppConfig, dir: &Path, draft: NewDocument, overwrite: bool) -> Result<()> {
    let document = draft.into_configuration()?;
    check_target_directory(dir, overwrite, true)?;

    let path = document.write_file(dir)?;
    info!(path = %path.display(), "document configuration written");

    let result = build(config, dir, &document).await?;

    println!();
    println!("  Document created!");
    println!("  Title:    {}", document.title().unwrap_or_default());
    println!("  Authors:  {}", document.authors().len());
    println!("  Chapters: {}", document.chapters().len());
    println!("  Master:   {}", result.master_path.display());
    println!();

    Ok(())
}

async fn cmd_add_chapter(config: &AppConfig, dir: &Path, title: &str, part: bool) -> Result<()> {
    let mut document = load_document(config, dir).await?;
    document.add_chapter(title, part)?;
    document.write_file(dir)?;

    info!(title, part, "chapter added");
    println!("Added chapter '{title}'. Run `adpt build` to regenerate the master document.");
    Ok(())
}

async fn cmd_add_author(config: &AppConfig, dir: &Path, author: &str) -> Result<()> {
    let mut document = load_document(config, dir).await?;
    let author: Author = author.parse()?;
    document.add_author(author.clone())?;
    document.write_file(dir)?;

    info!(%author, "author added");
    println!("Added author {author}.");
    Ok(())
}

async fn cmd_build(config: &AppConfig, dir: &Path) -> Result<()> {
    let document = load_document(config, dir).await?;
    let result = build(config, dir, &document).await?;

    println!();
    println!("  Master:  {}", result.master_path.display());
    for path in &result.created {
        println!("  Created: {}", path.display());
    }
    println!();

    Ok(())
}

async fn cmd_check(config: &AppConfig, dir: &Path) -> Result<()> {
    let document = load_document(config, dir).await?;

    println!("  Title:     {}", document.title().unwrap_or("(none)"));
    println!("  Type:      {}", document.doc_type());
    println!("  Language:  {}", document.lang());
    for author in document.authors() {
        println!("  Author:    {author}");
    }
    for chapter in document.chapters() {
        let kind = if chapter.part { "part" } else { "chapter" };
        println!("  {kind:<9}  {}", chapter.title);
    }

    if !document.check_if_valid() {
        return Err(eyre!("document needs a title and at least one author"));
    }
    println!("  OK");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_document(config: &AppConfig, dir: &Path) -> Result<DocumentConfiguration> {
    if !DocumentConfiguration::is_document_directory(dir) {
        return Err(eyre!(
            "no {} found in '{}'; is this a document directory?",
            adpt_core::FILE_NAME,
            dir.display()
        ));
    }

    let fetcher = HttpFetcher::from_config(&config.remote)?;
    let document = DocumentConfiguration::load_with_schema(
        ConfigSource::Directory(dir.to_path_buf()),
        &fetcher,
        &config.remote.schema_url,
    )
    .await?;
    Ok(document)
}

async fn build(config: &AppConfig, dir: &Path, document: &DocumentConfiguration) -> Result<BuildResult> {
    let fetcher = HttpFetcher::from_config(&config.remote)?;
    let reporter = CliProgress::new();
    let result = build_document(
        dir,
        document,
        &fetcher,
        AssembleOptions::from(config),
        &reporter,
    )
    .await?;
    Ok(result)
}

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_written(&self, path: &Path) {
        self.spinner.set_message(format!("Wrote {}", path.display()));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
