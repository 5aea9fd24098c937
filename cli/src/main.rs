//! answerspace CLI - insert answer space into worksheet pages and export them

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use answerspace::export::export_document_with_progress;
use answerspace::{
    plan_segments, reflowed_height, DirectorySink, ExportMode, ExportOptions, ImageSequence, OutputFormat, PageSize,
    PageSource, Project, SpacerStore,
};

#[derive(Parser)]
#[command(name = "answerspace")]
#[command(version)]
#[command(about = "Insert answer space into worksheet pages and export them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export page images with their spacers applied
    Export {
        /// Page images in order, or a single directory of page images
        #[arg(value_name = "PAGES", required = true)]
        pages: Vec<PathBuf>,

        /// Project file holding the spacers
        #[arg(short, long, value_name = "FILE", env = "ANSWERSPACE_PROJECT")]
        project: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Export mode
        #[arg(long, value_enum, default_value = "paginated")]
        mode: Mode,

        /// Start every source page on a fresh output page
        #[arg(long)]
        independent: bool,

        /// Output page size
        #[arg(long, value_enum, default_value = "a4")]
        page_size: Paper,

        /// Pixels per page unit
        #[arg(long, default_value = "2.0")]
        dpi: f32,

        /// JPEG quality (0.0-1.0)
        #[arg(long, default_value = "0.8")]
        quality: f32,

        /// Write PNG instead of JPEG
        #[arg(long)]
        png: bool,
    },

    /// Print the segment plan of one page as JSON
    Plan {
        /// Height of the page in page units
        #[arg(value_name = "PAGE_HEIGHT")]
        page_height: f32,

        /// Project file holding the spacers
        #[arg(short, long, value_name = "FILE", env = "ANSWERSPACE_PROJECT")]
        project: PathBuf,

        /// 1-indexed page number
        #[arg(long, default_value = "1")]
        page: usize,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show project information
    Info {
        /// Project file
        #[arg(short, long, value_name = "FILE", env = "ANSWERSPACE_PROJECT")]
        project: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Fixed-size output pages
    Paginated,
    /// One tall image for the whole document
    Long,
}

impl From<Mode> for ExportMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Paginated => ExportMode::Paginated,
            Mode::Long => ExportMode::Long,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Paper {
    /// 595 x 842 units
    A4,
    /// 612 x 792 units
    Letter,
}

impl From<Paper> for PageSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A4 => PageSize::A4,
            Paper::Letter => PageSize::LETTER,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Export {
            pages,
            project,
            output,
            mode,
            independent,
            page_size,
            dpi,
            quality,
            png,
        }) => {
            let mut options = ExportOptions::new()
                .with_mode(mode.into())
                .with_page_size(page_size.into())
                .with_dpi(dpi)
                .with_quality(quality);
            if independent {
                options = options.independent();
            }
            let format = if png { OutputFormat::Png } else { OutputFormat::Jpeg };
            cmd_export(&pages, project.as_deref(), output.as_deref(), &options, format)
        }
        Some(Commands::Plan {
            page_height,
            project,
            page,
            compact,
        }) => cmd_plan(page_height, &project, page, compact),
        Some(Commands::Info { project }) => cmd_info(&project),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: answerspace export <PAGES>... --project <FILE>".yellow());
            println!("       answerspace --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn open_pages(pages: &[PathBuf]) -> Result<ImageSequence, Box<dyn std::error::Error>> {
    match pages {
        [dir] if dir.is_dir() => Ok(ImageSequence::from_dir(dir)?),
        _ => Ok(ImageSequence::new(pages.iter().cloned())),
    }
}

fn cmd_export(
    pages: &[PathBuf],
    project: Option<&Path>,
    output: Option<&Path>,
    options: &ExportOptions,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = open_pages(pages)?;
    let store = match project {
        Some(path) => Project::load(path)?.spacer_store()?,
        None => SpacerStore::new(),
    };

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("answerspace_output"));

    let pb = ProgressBar::new(source.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Rendering pages...");

    let doc = export_document_with_progress(&source, &store, options, |progress| {
        pb.set_position(progress.page as u64);
        pb.set_message(format!("Page {}/{}", progress.page, progress.total));
    });
    let doc = match doc {
        Ok(doc) => doc,
        Err(e) => {
            pb.abandon_with_message("Export failed");
            return Err(e.into());
        }
    };

    pb.set_message("Writing images...");
    let mut sink = DirectorySink::new(&output_dir, format, options.output_quality)?;
    doc.write_to(&mut sink)?;
    pb.finish_with_message("Done!");

    let written = sink.into_written();
    println!("\n{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        println!("  {} {}", branch.dimmed(), name);
    }
    println!(
        "\n{} {} source pages, {} spacers, {} output pages",
        "Summary:".bold(),
        doc.stats.source_pages,
        doc.stats.spacer_count,
        doc.stats.output_pages
    );

    Ok(())
}

fn cmd_plan(page_height: f32, project: &Path, page: usize, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Project::load(project)?.spacer_store()?;
    let segments = plan_segments(page_height, store.spacers_on(page));

    let json = if compact {
        serde_json::to_string(&segments)?
    } else {
        serde_json::to_string_pretty(&segments)?
    };
    println!("{}", json);
    log::debug!("Page {} reflows to {} units", page, reflowed_height(&segments));

    Ok(())
}

fn cmd_info(project: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = Project::load(project)?;
    let store = loaded.spacer_store()?;

    println!("{}", "Project Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), project.display());
    if !loaded.pdf_name.is_empty() {
        println!("{}: {}", "Document".bold(), loaded.pdf_name);
    }
    println!("{}: {}", "Saved".bold(), loaded.timestamp.to_rfc3339());
    println!("{}: {:.0}%", "Zoom".bold(), loaded.scale * 100.0);
    println!("{}: {}", "Current page".bold(), loaded.current_page);

    println!();
    println!("{}", "Spacers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if store.is_empty() {
        println!("{}", "No spacers".dimmed());
        return Ok(());
    }
    for (page, spacers) in store.pages() {
        let inserted = store.inserted_height(page);
        println!("{} {}: {} spacers, +{} units", "Page".bold(), page, spacers.len(), inserted);
        for spacer in store.sorted_on(page) {
            println!(
                "  {} #{} at y={} height={} {}",
                "•".dimmed(),
                spacer.id,
                spacer.y,
                spacer.height,
                spacer.style.as_str()
            );
        }
    }
    println!("{}: {}", "Total".bold(), store.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "answerspace".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Answer space insertion and page export tool");
    println!();
    println!("License: MIT");
}
