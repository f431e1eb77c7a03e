use crate::handlers;
use crate::{ConvertCommand, ConvertUpdate};
use tokio::sync::mpsc;

/// Async worker task that runs conversion commands and sends updates.
///
/// Commands run one at a time, so two conversions never share a staging
/// folder.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<ConvertCommand>,
    update_tx: mpsc::UnboundedSender<ConvertUpdate>,
) {
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut command_rx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: ConvertCommand,
    command_rx: &mut mpsc::UnboundedReceiver<ConvertCommand>,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) {
    match cmd {
        ConvertCommand::ConvertFolder { options } => {
            handlers::handle_convert_folder(options, update_tx).await;
        }
        ConvertCommand::ConvertCbzBatch {
            cbz_paths,
            root,
            template,
        } => {
            handlers::handle_convert_cbz_batch(cbz_paths, root, template, update_tx).await;
        }
        ConvertCommand::Preview { mut options } => {
            // Drain queued previews, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let ConvertCommand::Preview {
                    options: new_options,
                } = next_cmd
                {
                    log::debug!("Discarding queued preview, using newer request");
                    options = new_options;
                } else {
                    // Can't put it back, so it runs before the preview
                    Box::pin(process_command(next_cmd, command_rx, update_tx)).await;
                }
            }

            handlers::handle_preview(options, update_tx).await;
        }
        ConvertCommand::LoadConfig { path } => {
            handlers::handle_load_config(path, update_tx).await;
        }
        ConvertCommand::SaveConfig { options, path } => {
            handlers::handle_save_config(options, path, update_tx).await;
        }
    }
}
