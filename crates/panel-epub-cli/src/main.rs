use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use panel_epub::{ConversionOptions, ConversionStatistics, ReadingDirection, SpineLayout};
use panel_epub_runtime::logger::RunLogger;
use panel_epub_runtime::{ConvertCommand, ConvertUpdate, worker_task};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "panel2epub", about = "Comic and manga images to fixed-layout EPUB", version)]
struct Cli {
    /// Log per-file detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a folder of page images into one EPUB
    Folder {
        /// Folder holding the page images
        #[arg(short, long)]
        source: PathBuf,

        /// Folder that receives the EPUB (and the temporary staging tree)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Book title, also used for the file name
        #[arg(long)]
        title: Option<String>,

        /// Book identifier (a urn:uuid is generated when omitted)
        #[arg(long)]
        book_id: Option<String>,

        /// Print the planned page layout without writing anything
        #[arg(long)]
        plan_only: bool,

        /// Write the effective options as JSON to this file
        #[arg(long)]
        save_config: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Convert CBZ archives, one EPUB per archive titled after its file name
    Cbz {
        /// Input CBZ file(s)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Folder that receives the EPUB files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Settings shared by both commands; anything left unset keeps the value from
/// `--config` or the default.
#[derive(Args)]
struct LayoutArgs {
    /// JSON options file to start from
    #[arg(long)]
    config: Option<PathBuf>,

    /// Book author
    #[arg(long)]
    creator: Option<String>,

    /// Page-turn direction
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// Do not treat the first image as the cover
    #[arg(long)]
    no_cover: bool,

    /// Target device resolution, e.g. 1072x1448
    #[arg(long)]
    resolution: Option<String>,

    /// rendition:spread value
    #[arg(long)]
    spread_mode: Option<String>,

    /// Width/height ratio at which a page counts as a double spread
    #[arg(long)]
    double_page_ratio: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    /// Left to right (western comics)
    Ltr,
    /// Right to left (manga)
    Rtl,
}

impl From<DirectionArg> for ReadingDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ltr => Self::Ltr,
            DirectionArg::Rtl => Self::Rtl,
        }
    }
}

impl LayoutArgs {
    async fn into_options(self) -> Result<ConversionOptions> {
        let mut options = match &self.config {
            Some(path) => ConversionOptions::load(path).await?,
            None => ConversionOptions::default(),
        };

        if let Some(creator) = self.creator {
            options.creator = creator;
        }
        if let Some(direction) = self.direction {
            options.reading_direction = direction.into();
        }
        if self.no_cover {
            options.has_cover = false;
        }
        if let Some(resolution) = self.resolution {
            options.original_resolution = resolution;
        }
        if let Some(spread_mode) = self.spread_mode {
            options.spread_mode = spread_mode;
        }
        if let Some(ratio) = self.double_page_ratio {
            options.double_page_ratio = ratio;
        }

        options.validate()?;
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    RunLogger::new(1000)
        .with_level(level)
        .with_echo(!cli.quiet)
        .init()?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx));

    match cli.command {
        Commands::Folder {
            source,
            output,
            title,
            book_id,
            plan_only,
            save_config,
            layout,
        } => {
            let mut options = layout.into_options().await?;
            options.source_dir = source;
            options.base_path = output;
            if let Some(title) = title {
                options.title = title;
            }
            if book_id.is_some() {
                options.book_id = book_id;
            }

            if let Some(path) = save_config {
                command_tx.send(ConvertCommand::SaveConfig {
                    options: options.clone(),
                    path,
                })?;
            }
            if plan_only {
                command_tx.send(ConvertCommand::Preview { options })?;
            } else {
                command_tx.send(ConvertCommand::ConvertFolder { options })?;
            }
        }
        Commands::Cbz {
            input,
            output,
            layout,
        } => {
            let template = layout.into_options().await?;
            command_tx.send(ConvertCommand::ConvertCbzBatch {
                cbz_paths: input,
                root: output,
                template,
            })?;
        }
    }
    drop(command_tx);

    let mut failure = None;
    while let Some(update) = update_rx.recv().await {
        match update {
            ConvertUpdate::Progress { .. } => {}
            ConvertUpdate::FolderComplete { output } => {
                print_statistics(&output.statistics);
                println!("Created → {}", output.epub_path.display());
            }
            ConvertUpdate::BatchComplete { outputs } => {
                for output in &outputs {
                    println!("Created → {}", output.epub_path.display());
                }
                println!("{} EPUB file(s) generated", outputs.len());
            }
            ConvertUpdate::PreviewReady { layout } => print_plan(&layout),
            ConvertUpdate::ConfigSaved { path } => {
                println!("Options saved → {}", path.display());
            }
            ConvertUpdate::ConfigLoaded { .. } => {}
            ConvertUpdate::Error { message } => failure = Some(message),
        }
    }
    worker.await?;

    if let Some(message) = failure {
        return Err(anyhow!(message));
    }
    Ok(())
}

fn print_statistics(stats: &ConversionStatistics) {
    println!("Conversion Statistics:");
    println!("  Source images: {}", stats.source_images);
    println!("  Single pages: {}", stats.single_pages);
    println!("  Double pages split: {}", stats.spreads_split);
    if stats.split_failures > 0 {
        println!("  Split failures: {}", stats.split_failures);
    }
    if stats.fallback_sized > 0 {
        println!("  Unreadable images (fallback size): {}", stats.fallback_sized);
    }
    println!("  Blank pages added: {}", stats.blank_pages_added);
    println!("  Spine entries: {}", stats.spine_entries);
    if stats.skipped_images > 0 {
        println!("  Skipped images: {}", stats.skipped_images);
    }
}

fn print_plan(layout: &SpineLayout) {
    println!("Planned Layout:");
    for (idx, entry) in layout.spine.iter().enumerate() {
        println!("  {:>4}  {:<6}  {}", idx + 1, entry.spread.as_str(), entry.idref);
    }
    println!(
        "  {} page(s), {} blank page(s) added",
        layout.spine.len(),
        layout.blank_pages.len()
    );
}
