use crate::{ConversionOptions, ConvertUpdate};
use panel_epub::{convert_cbz_batch, convert_folder, preview_layout};
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn handle_convert_folder(
    options: ConversionOptions,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) {
    let _ = update_tx.send(ConvertUpdate::Progress {
        operation: format!("Converting {}", options.source_dir.display()),
        current: 0,
        total: 1,
    });

    match convert_folder(&options).await {
        Ok(output) => {
            let _ = update_tx.send(ConvertUpdate::Progress {
                operation: "Conversion finished".to_string(),
                current: 1,
                total: 1,
            });
            let _ = update_tx.send(ConvertUpdate::FolderComplete { output });
        }
        Err(e) => {
            let _ = update_tx.send(ConvertUpdate::Error {
                message: format!("Failed to convert folder: {}", e),
            });
        }
    }
}

pub async fn handle_convert_cbz_batch(
    cbz_paths: Vec<PathBuf>,
    root: PathBuf,
    template: ConversionOptions,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) {
    if cbz_paths.is_empty() {
        let _ = update_tx.send(ConvertUpdate::Error {
            message: "No CBZ files specified".to_string(),
        });
        return;
    }

    let _ = update_tx.send(ConvertUpdate::Progress {
        operation: format!("Converting {} CBZ file(s)", cbz_paths.len()),
        current: 0,
        total: cbz_paths.len(),
    });

    match convert_cbz_batch(&cbz_paths, &root, &template).await {
        Ok(outputs) => {
            let _ = update_tx.send(ConvertUpdate::Progress {
                operation: "Batch finished".to_string(),
                current: cbz_paths.len(),
                total: cbz_paths.len(),
            });
            let _ = update_tx.send(ConvertUpdate::BatchComplete { outputs });
        }
        Err(e) => {
            let _ = update_tx.send(ConvertUpdate::Error {
                message: format!("Failed to convert CBZ files: {}", e),
            });
        }
    }
}

pub async fn handle_preview(
    options: ConversionOptions,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) {
    match preview_layout(&options).await {
        Ok(layout) => {
            let _ = update_tx.send(ConvertUpdate::PreviewReady { layout });
        }
        Err(e) => {
            let _ = update_tx.send(ConvertUpdate::Error {
                message: format!("Failed to preview layout: {}", e),
            });
        }
    }
}

pub async fn handle_load_config(path: PathBuf, update_tx: &mpsc::UnboundedSender<ConvertUpdate>) {
    match ConversionOptions::load(&path).await {
        Ok(options) => {
            let _ = update_tx.send(ConvertUpdate::ConfigLoaded { options });
        }
        Err(e) => {
            let _ = update_tx.send(ConvertUpdate::Error {
                message: format!("Failed to load configuration: {}", e),
            });
        }
    }
}

pub async fn handle_save_config(
    options: ConversionOptions,
    path: PathBuf,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) {
    match options.save(&path).await {
        Ok(()) => {
            let _ = update_tx.send(ConvertUpdate::ConfigSaved { path });
        }
        Err(e) => {
            let _ = update_tx.send(ConvertUpdate::Error {
                message: format!("Failed to save configuration: {}", e),
            });
        }
    }
}
