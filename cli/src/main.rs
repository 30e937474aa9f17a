//! cvdoc CLI - resume and cover letter rendering tool
//!
//! Reads profile or cover-letter JSON and writes PDF or DOCX files.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use cvdoc::{
    normalize_cover_letter_id, normalize_markup, render, CandidateProfile, CoverLetter,
    DocumentFormat, RenderConfig, RenderPool, RenderedDocument, Renderer, Subject, TemplateKind,
    TemplateRegistry,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Resume and cover letter rendering to PDF and DOCX
#[derive(Parser)]
#[command(
    name = "cvdoc",
    version,
    about = "Render resumes and cover letters to PDF and DOCX",
    long_about = "cvdoc - Resume and cover letter rendering tool.\n\n\
                  Reads candidate profile or cover letter JSON and renders it.\n\n\
                  Usage:\n  \
                  cvdoc pdf profile.json -t modern_profile_template\n  \
                  cvdoc docx letter.json --cover-letter\n  \
                  cvdoc batch a.json b.json --format docx -o out/"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of template overrides (<id>.html)
    #[arg(long, global = true)]
    template_dir: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to PDF through a template
    Pdf {
        /// Input JSON file
        input: PathBuf,

        /// Template id (see `cvdoc templates`)
        #[arg(short, long)]
        template: String,

        /// Input is a cover letter rather than a profile
        #[arg(long)]
        cover_letter: bool,

        /// Output file or directory (default: suggested filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a document to DOCX
    Docx {
        /// Input JSON file
        input: PathBuf,

        /// Input is a cover letter rather than a profile
        #[arg(long)]
        cover_letter: bool,

        /// Output file or directory (default: suggested filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render many inputs concurrently
    Batch {
        /// Input JSON files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "docx")]
        format: FormatArg,

        /// Template id (required for PDF)
        #[arg(short, long)]
        template: Option<String>,

        /// Inputs are cover letters rather than profiles
        #[arg(long)]
        cover_letter: bool,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum worker threads
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Print the structural document layout as JSON
    Structure {
        /// Input JSON file
        input: PathBuf,

        /// Input is a cover letter rather than a profile
        #[arg(long)]
        cover_letter: bool,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Reduce a markup fragment to plain text
    Normalize {
        /// Input file (default: stdin)
        input: Option<PathBuf>,
    },

    /// List available template ids
    Templates,

    /// Show version information
    Version,
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// PDF through an HTML template
    Pdf,
    /// DOCX document
    Docx,
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Docx => DocumentFormat::Docx,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        let client_error = e
            .downcast_ref::<cvdoc::Error>()
            .is_some_and(cvdoc::Error::is_client_error);
        std::process::exit(if client_error { 2 } else { 1 });
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_module("cvdoc", log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = RenderConfig::from_env()?;
    if let Some(dir) = cli.template_dir {
        config.templates.template_dir = Some(dir);
    }

    match cli.command {
        Commands::Pdf {
            input,
            template,
            cover_letter,
            output,
        } => {
            let pb = create_spinner("Rendering PDF...");
            let renderer = Renderer::with_config(&config)?;
            let subject = load_subject(&input, cover_letter)?;
            let template = template_id(&template, cover_letter);

            let document = renderer.render_pdf(&subject, &template)?;
            pb.finish_and_clear();

            let path = write_document(&document, output.as_deref())?;
            println!("{} Rendered PDF: {}", "✓".green().bold(), path.display());
        }

        Commands::Docx {
            input,
            cover_letter,
            output,
        } => {
            let pb = create_spinner("Rendering DOCX...");
            let renderer = Renderer::with_config(&config)?;
            let subject = load_subject(&input, cover_letter)?;

            let document = renderer.render_docx(&subject)?;
            pb.finish_and_clear();

            let path = write_document(&document, output.as_deref())?;
            println!("{} Rendered DOCX: {}", "✓".green().bold(), path.display());
        }

        Commands::Batch {
            inputs,
            format,
            template,
            cover_letter,
            output,
            workers,
        } => {
            if let Some(max) = workers {
                config.pool.max_workers = max;
                config.pool.min_workers = config.pool.min_workers.min(max);
            }
            let template = template.map(|t| template_id(&t, cover_letter));
            run_batch(
                &config,
                &inputs,
                format.into(),
                template,
                cover_letter,
                &output,
            )?;
        }

        Commands::Structure {
            input,
            cover_letter,
            compact,
        } => {
            let subject = load_subject(&input, cover_letter)?;
            subject.validate()?;
            let document = render::build_structure(&subject.with_defaults());

            let json = if compact {
                serde_json::to_string(&document)?
            } else {
                serde_json::to_string_pretty(&document)?
            };
            writeln!(io::stdout().lock(), "{json}")?;
        }

        Commands::Normalize { input } => {
            let markup = match input {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            writeln!(io::stdout().lock(), "{}", normalize_markup(&markup))?;
        }

        Commands::Templates => {
            print_templates();
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn run_batch(
    config: &RenderConfig,
    inputs: &[PathBuf],
    format: DocumentFormat,
    template: Option<String>,
    cover_letter: bool,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;

    let renderer = Renderer::with_config(config)?;
    let pool = RenderPool::new(config.pool.clone())?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut pending = Vec::with_capacity(inputs.len());
    for input in inputs {
        let subject = match load_subject(input, cover_letter) {
            Ok(subject) => subject,
            Err(e) => {
                pending.push((input, Err(e)));
                continue;
            }
        };
        let renderer = renderer.clone();
        let template = template.clone();
        let handle =
            pool.submit(move || renderer.render(&subject, format, template.as_deref()));
        pending.push((input, Ok(handle)));
    }

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for (input, job) in pending {
        pb.set_message(input.display().to_string());
        let result = job.and_then(|handle| handle.join()).and_then(|rendered| rendered);
        match result {
            Ok(document) => written.push(write_document(&document, Some(output_dir))?),
            Err(e) => failures.push((input, e)),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("{}", "Batch Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    for path in &written {
        println!(
            "  {} {}",
            "✓".green(),
            path.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    for (input, e) in &failures {
        println!("  {} {}: {}", "✗".red(), input.display(), e);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} of {} inputs failed", failures.len(), inputs.len()).into())
    }
}

/// Reads and parses one JSON input.
fn load_subject(path: &Path, cover_letter: bool) -> cvdoc::Result<Subject> {
    let json = fs::read_to_string(path)?;
    if cover_letter {
        Ok(CoverLetter::from_json(&json)?.into())
    } else {
        Ok(CandidateProfile::from_json(&json)?.into())
    }
}

fn template_id(raw: &str, cover_letter: bool) -> String {
    let raw = raw.trim();
    if cover_letter {
        normalize_cover_letter_id(raw)
    } else {
        raw.to_string()
    }
}

/// Writes a rendered document to `output`, or under its suggested filename
/// when `output` is a directory or absent.
fn write_document(
    document: &RenderedDocument,
    output: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Only the last component of the suggested name is used.
    let name = Path::new(&document.filename)
        .file_name()
        .ok_or_else(|| format!("unusable output file name '{}'", document.filename))?;
    let path = match output {
        Some(p) if p.is_dir() => p.join(name),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(name),
    };
    fs::write(&path, &document.bytes)?;
    Ok(path)
}

fn print_templates() {
    for (title, kind) in [
        ("Profile templates", TemplateKind::Profile),
        ("Cover letter templates", TemplateKind::CoverLetter),
    ] {
        println!("{}", title.cyan().bold());
        println!("{}", "─".repeat(40));
        for id in TemplateRegistry::ids(kind) {
            println!("  {id}");
        }
        println!();
    }
}

fn print_version() {
    println!("{} {}", "cvdoc".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Resume and cover letter rendering to PDF and DOCX");
    println!();
    println!("Library: cvdoc {}", cvdoc::VERSION);
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_template_id_normalization() {
        assert_eq!(
            template_id("professional_template_002", true),
            "cover_letter_professional_002"
        );
        assert_eq!(template_id(" profile_template ", false), "profile_template");
    }

    #[test]
    fn test_load_subject() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{"name": "Jane Roe", "skills": ["Rust"]}"#).unwrap();

        let subject = load_subject(&path, false).unwrap();
        assert_eq!(subject.display_name(), "Jane Roe");

        fs::write(&path, "{not json").unwrap();
        let err = load_subject(&path, false).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_write_document_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let document = RenderedDocument {
            bytes: vec![1u8, 2, 3].into(),
            filename: "Jane_Roe_resume.docx".into(),
            format: DocumentFormat::Docx,
        };

        let path = write_document(&document, Some(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("Jane_Roe_resume.docx"));
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_write_document_stays_in_directory() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        fs::create_dir(&out).unwrap();
        let document = RenderedDocument {
            bytes: vec![9u8].into(),
            filename: "../escaped_resume.docx".into(),
            format: DocumentFormat::Docx,
        };

        let path = write_document(&document, Some(&out)).unwrap();
        assert_eq!(path, out.join("escaped_resume.docx"));
        assert!(!root.path().join("escaped_resume.docx").exists());

        let document = RenderedDocument {
            filename: "..".into(),
            ..document
        };
        assert!(write_document(&document, Some(&out)).is_err());
    }

    #[test]
    fn test_batch_names_from_hostile_input_stay_local() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        fs::create_dir(&out).unwrap();

        let renderer = Renderer::new().unwrap();
        let subject = Subject::from(CandidateProfile::new("../../tmp/evil"));
        let document = renderer.render_docx(&subject).unwrap();

        let path = write_document(&document, Some(&out)).unwrap();
        assert_eq!(path.parent(), Some(out.as_path()));
        assert_eq!(document.filename, "tmp_evil_resume.docx");
    }
}
