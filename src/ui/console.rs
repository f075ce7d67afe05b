//! Interactive console front end
//!
//! Reads commands line by line and prints every state change it observes.
//! Recognition requests run on the runtime while input keeps being read.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{parse_command, render_help, render_result, Action};
use crate::app::RecognitionOrchestrator;
use crate::config::DisplaySettings;
use crate::shared::ResultRecord;
use crate::vision::RecognitionError;

type PendingRecognition = JoinHandle<Result<ResultRecord, RecognitionError>>;

fn render_state(record: &ResultRecord, display: &DisplaySettings) -> String {
    if record.processing_enabled {
        render_result(record, display)
    } else {
        "Processing...\n".to_string()
    }
}

async fn write_text<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

/// Run the console until `quit` or end of input.
///
/// At end of input an in-flight recognition is awaited and its result
/// printed before returning.
pub async fn run_console<R, W>(
    orchestrator: Arc<RecognitionOrchestrator>,
    display: &DisplaySettings,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut observer = orchestrator.store().subscribe();
    let mut pending: Option<PendingRecognition> = None;

    let header = format!(
        "{}\n{}\n\n{}\n{}",
        display.title,
        display.description,
        render_help(),
        render_state(&observer.current(), display)
    );
    write_text(&mut output, &header).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Console input closed");
                    break;
                };

                match parse_command(&line) {
                    Ok(Action::Quit) => break,
                    Ok(Action::Help) => write_text(&mut output, &render_help()).await?,
                    Ok(Action::Show) => {
                        let current = orchestrator.store().current();
                        write_text(&mut output, &render_state(&current, display)).await?;
                    }
                    Ok(action) => {
                        let in_flight = pending.as_ref().is_some_and(|handle| !handle.is_finished());
                        if in_flight || !action.is_enabled(&orchestrator.store().current()) {
                            let message = format!("{} is disabled while processing\n", action);
                            write_text(&mut output, &message).await?;
                        } else if let Action::Recognize(image) = action {
                            pending = Some(orchestrator.spawn_recognition(image));
                        } else {
                            orchestrator.reset();
                        }
                    }
                    Err(e) => write_text(&mut output, &format!("{}\n", e)).await?,
                }
            }
            Some(record) = observer.changed() => {
                write_text(&mut output, &render_state(&record, display)).await?;
            }
        }
    }

    if let Some(handle) = pending.take() {
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!("Last recognition ended with: {}", e),
            Err(e) => warn!("Recognition task failed: {}", e),
        }
        let current = orchestrator.store().current();
        write_text(&mut output, &render_state(&current, display)).await?;
    }

    Ok(())
}
