//! Client core of the shared-history calculator: the expression evaluator,
//! the per-client session state machine and the relay client. UI layers
//! stay thin: they translate key presses into [`Command`]s and render the
//! snapshots carried by [`SessionEvent`]s.

use std::sync::Arc;

use anyhow::Result;
use shared::protocol::ServerEvent;
use tokio::sync::{broadcast, Mutex};

pub mod editor;
pub mod error;
pub mod eval;
pub mod history;
pub mod operators;
pub mod relay;
pub mod session;
pub mod token;

pub use editor::ExpressionEditor;
pub use error::EvalError;
pub use history::{HistoryEntry, HistoryLog, HISTORY_CAPACITY};
pub use operators::OpId;
pub use relay::{HistoryRelay, LoopbackRelay, WsRelay};
pub use session::{CalcSession, Command, CommandOutcome};
pub use token::Token;

/// Notifications for the UI layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A relay echo was applied; carries the refreshed display line.
    HistoryLogged { display: String },
    Error(String),
}

/// Glues a [`CalcSession`] to a [`HistoryRelay`]: commands go in, `Equals`
/// payloads go out to the relay, and echoed events are applied to the
/// session as they arrive.
pub struct CalcClient {
    session: Mutex<CalcSession>,
    relay: Arc<dyn HistoryRelay>,
    events: broadcast::Sender<SessionEvent>,
}

impl CalcClient {
    pub fn new(relay: Arc<dyn HistoryRelay>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let client = Arc::new(Self {
            session: Mutex::new(CalcSession::new()),
            relay,
            events,
        });
        client.spawn_echo_task();
        client
    }

    /// Runs one command against the session, publishing the result when the
    /// command was `Equals`. Local state is only updated by the echo.
    pub async fn handle_input(&self, command: Command) -> Result<()> {
        let outcome = { self.session.lock().await.handle_input(command)? };
        if let CommandOutcome::Publish(payload) = outcome {
            self.relay.publish(payload).await?;
        }
        Ok(())
    }

    pub async fn display(&self) -> String {
        self.session.lock().await.display().to_string()
    }

    /// History entries newest first, cloned out for rendering.
    pub async fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.session
            .lock()
            .await
            .history()
            .newest_first()
            .cloned()
            .collect()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn spawn_echo_task(self: &Arc<Self>) {
        let mut echoes = self.relay.subscribe();
        let client = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match echoes.recv().await {
                    Ok(ServerEvent::HistoryLogged(payload)) => {
                        let mut session = client.session.lock().await;
                        match session.apply_history_event(&payload) {
                            Ok(()) => {
                                let _ = client.events.send(SessionEvent::HistoryLogged {
                                    display: session.display().to_string(),
                                });
                            }
                            Err(err) => {
                                let _ = client
                                    .events
                                    .send(SessionEvent::Error(format!("invalid echo: {err}")));
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        let _ = client.events.send(SessionEvent::Error(format!(
                            "dropped {skipped} relay echoes"
                        )));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
