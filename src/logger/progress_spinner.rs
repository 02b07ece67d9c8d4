use std::io::{IsTerminal, Write};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use crate::services::progress_tracker::ProgressTracker;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Redraws the tracker's summary on stderr until stopped. Does nothing when
/// stderr is not a terminal.
pub struct ProgressSpinner {
    message: String,
    tracker: Arc<ProgressTracker>,
    stop_sender: Option<mpsc::UnboundedSender<()>>,
    task_handle: Option<JoinHandle<()>>,
}

impl ProgressSpinner {
    pub fn new(message: impl Into<String>, tracker: Arc<ProgressTracker>) -> Self {
        Self {
            message: message.into(),
            tracker,
            stop_sender: None,
            task_handle: None,
        }
    }

    pub fn start(&mut self) {
        if !std::io::stderr().is_terminal() || self.task_handle.is_some() {
            return;
        }

        let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
        let message = self.message.clone();
        let tracker = Arc::clone(&self.tracker);

        let handle = tokio::spawn(async move {
            let mut frame = 0;
            let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(150));

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        tracker.update_scan_countdown();
                        let progress = tracker.get_progress();
                        eprint!("\r\x1b[K{} {} {}", FRAMES[frame], message, progress.summary());
                        let _ = std::io::stderr().flush();
                        frame = (frame + 1) % FRAMES.len();
                    }
                    _ = stop_rx.recv() => break,
                }
            }
        });

        self.stop_sender = Some(stop_tx);
        self.task_handle = Some(handle);
    }

    async fn halt(&mut self) -> bool {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.send(());
        }

        match self.task_handle.take() {
            Some(handle) => {
                let _ = handle.await;
                eprint!("\r\x1b[K");
                true
            }
            None => false,
        }
    }

    pub async fn stop(&mut self, final_message: &str) {
        if self.halt().await {
            eprintln!("✅ {}", final_message);
        }
    }

    pub async fn error(&mut self, error_message: &str) {
        self.halt().await;
        eprintln!("❌ {}", error_message);
    }
}
