#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use bytes::Bytes;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ezhuthu::app_config::{Config, LogLevel};
use ezhuthu::assets::{HttpAssetUploader, image_content_type};
use ezhuthu::content::record::{ContentStatus, NewContent, Slot, resolve_display};
use ezhuthu::content::workflow;
use ezhuthu::document::codec::{SourceShape, decode, serialize};
use ezhuthu::document::model::Dimension;
use ezhuthu::editor::EditorController;
use ezhuthu::language_utils::Language;
use ezhuthu::providers::HttpTranslator;
use ezhuthu::render::render_html;
use ezhuthu::store::{ContentStore, DatabaseConnection, SqliteContentStore};
use ezhuthu::translation::{ContentTranslator, TranslationCache};

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI language selector
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLanguage {
    English,
    Tamil,
}

impl From<CliLanguage> for Language {
    fn from(language: CliLanguage) -> Self {
        match language {
            CliLanguage::English => Language::English,
            CliLanguage::Tamil => Language::Tamil,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ezhuthu", version, about = "Bilingual rich-text content tools")]
struct CommandLineOptions {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a stored document to HTML
    Render {
        /// File holding the stored document
        file: PathBuf,
    },

    /// Rewrite a stored document in the current single-encoded form
    Normalize {
        /// File holding the stored document
        file: PathBuf,

        /// Overwrite the file instead of printing the result
        #[arg(short, long)]
        in_place: bool,
    },

    /// Translate a stored document into the other language and print it
    Translate {
        /// File holding the stored document
        file: PathBuf,

        /// Title to translate along with the document
        #[arg(short, long, default_value = "")]
        title: String,
    },

    /// Import a document into the local content database
    Import {
        /// File holding the English document
        file: PathBuf,

        /// English title
        #[arg(short, long)]
        title: String,

        /// File holding the Tamil document
        #[arg(long)]
        secondary_file: Option<PathBuf>,

        /// Tamil title
        #[arg(long)]
        secondary_title: Option<String>,
    },

    /// Show a stored record in one language
    Show {
        /// Content id
        id: String,

        /// Language to display
        #[arg(short = 'L', long, value_enum, default_value = "english")]
        language: CliLanguage,

        /// Print HTML instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Upload an image and append it to one language of a stored record
    AddImage {
        /// Content id
        id: String,

        /// Image file (png, jpeg, gif, webp or avif)
        file: PathBuf,

        /// Language variant to add the image to
        #[arg(short = 'L', long, value_enum, default_value = "english")]
        language: CliLanguage,

        /// Display width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Display height in pixels
        #[arg(long)]
        height: Option<u32>,
    },

    /// Translate one language of a stored record into the other and store it
    Localize {
        /// Content id
        id: String,

        /// Language to translate from
        #[arg(short = 'L', long, value_enum, default_value = "english")]
        from: CliLanguage,
    },

    /// Move a record through the publication workflow
    Status {
        /// Content id
        id: String,

        /// New status (draft, pending_approval, approved, rejected, published)
        status: String,
    },

    /// Generate shell completions for ezhuthu
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Colored, timestamped stderr logger. The active level is the global max
/// level, so it can be changed after config loading.
struct CustomLogger;

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    /// ANSI color of each level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ezhuthu", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load_or_create(&cli.config)?;
    config.validate().context("Configuration validation failed")?;
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    run(cli.command, &config).await
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Render { file } => {
            let decoded = decode(&read_file(&file)?);
            println!("{}", render_html(&decoded.document));
        }

        Commands::Normalize { file, in_place } => {
            let decoded = decode(&read_file(&file)?);
            if decoded.shape == SourceShape::Fallback {
                warn!("{} could not be read as a document; keeping its text as one paragraph", file.display());
            }
            let normalized = serialize(&decoded.document);
            if in_place {
                std::fs::write(&file, &normalized)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                info!("Normalized {} ({:?}, {} repairs)", file.display(), decoded.shape, decoded.issues.len());
            } else {
                println!("{}", normalized);
            }
        }

        Commands::Translate { file, title } => {
            let translator = ContentTranslator::new(HttpTranslator::from_config(&config.translation))
                .with_cache(TranslationCache::new(config.translation.cache_enabled));
            let translated = translator
                .translate_serialized(&title, &read_file(&file)?)
                .await?;
            info!("Translated {} -> {}", translated.source, translated.target);
            if !translated.title.is_empty() {
                println!("{}", translated.title);
            }
            println!("{}", translated.serialized);
        }

        Commands::Import {
            file,
            title,
            secondary_file,
            secondary_title,
        } => {
            let store = open_store(config)?;
            let document = serialize(&decode(&read_file(&file)?).document);
            let document_secondary = match secondary_file {
                Some(path) => Some(serialize(&decode(&read_file(&path)?).document)),
                None => None,
            };

            let record = store
                .insert(NewContent {
                    title,
                    document,
                    title_secondary: secondary_title,
                    document_secondary,
                    status: ContentStatus::Draft,
                })
                .await?;
            println!("{}", record.id);
        }

        Commands::Show { id, language, html } => {
            let store = open_store(config)?;
            let record = store.get(&id).await?;
            let display = resolve_display(&record, language.into());

            println!("{}", display.title);
            match (&display.document, display.content_placeholder) {
                (Some(document), _) if html => println!("{}", render_html(document)),
                (Some(document), _) => println!("{}", document.plain_text()),
                (None, Some(placeholder)) => println!("{}", placeholder),
                (None, None) => {}
            }
        }

        Commands::AddImage {
            id,
            file,
            language,
            width,
            height,
        } => {
            let content_type = image_content_type(&file)?;
            let data = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let store = Arc::new(open_store(config)?);
            let uploader = Arc::new(HttpAssetUploader::from_config(&config.storage));

            let slot = Slot::from(Language::from(language));
            let mut editor = EditorController::load(store, uploader, &id, slot).await?;
            let url = editor
                .insert_image(Bytes::from(data), content_type, pixels_or_auto(width), pixels_or_auto(height))
                .await?;
            editor.save(None).await?;
            println!("{}", url);
        }

        Commands::Localize { id, from } => {
            let store = Arc::new(open_store(config)?);
            let uploader = Arc::new(HttpAssetUploader::from_config(&config.storage));
            let translator = ContentTranslator::new(HttpTranslator::from_config(&config.translation))
                .with_cache(TranslationCache::new(config.translation.cache_enabled));

            let slot = Slot::from(Language::from(from));
            let editor = EditorController::load(store, uploader, &id, slot).await?;
            let translated = editor.translate_to_other_slot(&translator).await?;
            info!("Stored {} version of {}", translated.target.english_name(), id);
            println!("{}", translated.title);
        }

        Commands::Status { id, status } => {
            let store = open_store(config)?;
            let next: ContentStatus = status.parse()?;
            workflow::transition(&store, &id, next).await?;
            println!("{} -> {}", id, next);
        }

        Commands::Completions { .. } => return Err(anyhow!("completions are handled before config loading")),
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn open_store(config: &Config) -> Result<SqliteContentStore> {
    let db = DatabaseConnection::open(config.database_path()?)?;
    debug!("Using content database {:?}", db.path());
    Ok(SqliteContentStore::new(db))
}

fn pixels_or_auto(value: Option<u32>) -> Dimension {
    value.map(Dimension::pixels).unwrap_or(Dimension::Auto)
}
