use std::path::PathBuf;

mod handlers;
pub mod logger;
mod worker;

// Re-export types from the library crate
pub use panel_epub::{ConversionOptions, ConversionOutput, ConversionStatistics, SpineLayout};
pub use worker::worker_task;

/// Commands sent from a host to the worker
#[derive(Debug)]
pub enum ConvertCommand {
    ConvertFolder {
        options: ConversionOptions,
    },
    ConvertCbzBatch {
        cbz_paths: Vec<PathBuf>,
        root: PathBuf,
        template: ConversionOptions,
    },
    /// Dry-run layout; only the latest queued preview is computed
    Preview {
        options: ConversionOptions,
    },
    LoadConfig {
        path: PathBuf,
    },
    SaveConfig {
        options: ConversionOptions,
        path: PathBuf,
    },
}

/// Updates sent from the worker back to the host
#[derive(Debug, Clone)]
pub enum ConvertUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    FolderComplete {
        output: ConversionOutput,
    },
    BatchComplete {
        outputs: Vec<ConversionOutput>,
    },
    PreviewReady {
        layout: SpineLayout,
    },
    ConfigLoaded {
        options: ConversionOptions,
    },
    ConfigSaved {
        path: PathBuf,
    },
    Error {
        message: String,
    },
}
