//! Client side of the history relay: a publish/subscribe seam with a real
//! websocket implementation and an in-memory loopback for tests and offline
//! sessions.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use shared::protocol::{ClientMessage, HistoryPayload, ServerEvent};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::warn;

/// Boundary to the relay server: fire-and-forget publish plus a broadcast
/// subscription carrying everything the relay fans out.
#[async_trait]
pub trait HistoryRelay: Send + Sync {
    async fn publish(&self, payload: HistoryPayload) -> Result<()>;
    fn subscribe(&self) -> broadcast::Receiver<ServerEvent>;
}

/// In-memory relay with the same fan-out contract as the server, the sender
/// echo included.
#[derive(Debug)]
pub struct LoopbackRelay {
    events: broadcast::Sender<ServerEvent>,
}

impl LoopbackRelay {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self { events }
    }
}

impl Default for LoopbackRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryRelay for LoopbackRelay {
    async fn publish(&self, payload: HistoryPayload) -> Result<()> {
        // Nobody listening is fine; the relay retains nothing.
        let _ = self.events.send(ServerEvent::HistoryLogged(payload));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }
}

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Websocket connection to the relay server. A reader task fans incoming
/// `historyLogged` events out to subscribers until the connection ends.
pub struct WsRelay {
    writer: Mutex<WsWriter>,
    events: broadcast::Sender<ServerEvent>,
    reader_task: JoinHandle<()>,
}

impl WsRelay {
    /// Connects to `server_url` (`http://` or `ws://`) and starts the
    /// reader task.
    pub async fn connect(server_url: &str) -> Result<Self> {
        let ws_url = ws_url(server_url)?;
        let (stream, _) = connect_async(&ws_url)
            .await
            .with_context(|| format!("failed to connect websocket: {ws_url}"))?;
        let (writer, mut reader) = stream.split();
        let (events, _) = broadcast::channel(64);

        let fanout = events.clone();
        let reader_task = tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            let _ = fanout.send(event);
                        }
                        Err(err) => warn!(%err, "dropping unparseable relay frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!(%err, "relay connection failed");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            writer: Mutex::new(writer),
            events,
            reader_task,
        })
    }
}

#[async_trait]
impl HistoryRelay for WsRelay {
    async fn publish(&self, payload: HistoryPayload) -> Result<()> {
        let frame = serde_json::to_string(&ClientMessage::History(payload))?;
        self.writer
            .lock()
            .await
            .send(Message::Text(frame))
            .await
            .context("relay publish failed")
    }

    fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }
}

impl Drop for WsRelay {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

fn ws_url(server_url: &str) -> Result<String> {
    let base = if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if server_url.starts_with("ws://") {
        server_url.to_string()
    } else {
        return Err(anyhow!("server url must start with http:// or ws://"));
    };
    Ok(format!("{}/ws", base.trim_end_matches('/')))
}
