use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use lessonplan::{Config, Error, GeminiClient, LessonInput, Result};

#[derive(Parser)]
#[command(name = "lessonplan")]
#[command(about = "Generate lesson plans and render them to HTML or PDF")]
struct Cli {
    /// Config file (missing file means built-in defaults)
    #[arg(short, long, global = true, default_value = "lessonplan.toml")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render an existing text file
    Render {
        /// Input text file
        input: PathBuf,

        /// Output file (defaults to input name with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
        format: Format,
    },
    /// Generate a lesson plan from a TOML file of lesson parameters and render it
    Generate {
        /// Lesson parameters (author, subject, learning_outcomes, ...)
        lesson: PathBuf,

        /// Output file (defaults to the configured filename)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
        format: Format,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Html,
    Typst,
    Json,
    /// Raw generated text, unrendered
    Text,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Html => "html",
            Format::Typst => "typ",
            Format::Json => "json",
            Format::Text => "md",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install logger: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Render {
            input,
            output,
            format,
        } => {
            let text = read(&input)?;
            let output = output.unwrap_or_else(|| input.with_extension(format.extension()));
            write(&output, &render(&text, format, &config)?)
        }
        Command::Generate {
            lesson,
            output,
            format,
        } => {
            let content = read(&lesson)?;
            let input: LessonInput =
                toml::from_str(&content).map_err(|source| Error::LessonInput {
                    path: lesson.clone(),
                    source,
                })?;

            let client = GeminiClient::from_env(&config.generation)?;
            let text = lessonplan::generate_lesson(&client, &input)?;

            let output = output.unwrap_or_else(|| {
                PathBuf::from(&config.output.filename).with_extension(format.extension())
            });
            write(&output, &render(&text, format, &config)?)
        }
    }
}

fn render(text: &str, format: Format, config: &Config) -> Result<Vec<u8>> {
    let blocks = lessonplan::parse(text);
    info!(blocks = blocks.len(), "parsed text");

    let bytes = match format {
        Format::Pdf => lessonplan::blocks_to_pdf(&blocks, config)?,
        Format::Html => lessonplan::render_html_document(&blocks, config).into_bytes(),
        Format::Typst => lessonplan::blocks_to_typst(&blocks, config).into_bytes(),
        Format::Json => serde_json::to_vec_pretty(&blocks)?,
        Format::Text => text.as_bytes().to_vec(),
    };
    Ok(bytes)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    println!("Created {}", path.display());
    Ok(())
}
