//! Desktop WebSocket transport using tokio-tungstenite

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::infrastructure::websocket::shared::preview;
use crate::ports::outbound::{TransportEvents, TransportPort};

struct Socket {
    outbound: mpsc::UnboundedSender<Message>,
    task: JoinHandle<()>,
}

/// WebSocket transport for desktop builds.
///
/// Each `open` spawns one task on the current tokio runtime that owns the
/// stream until the socket ends.
#[derive(Default)]
pub struct TungsteniteTransport {
    socket: Mutex<Option<Socket>>,
}

impl TungsteniteTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn socket(&self) -> MutexGuard<'_, Option<Socket>> {
        self.socket.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransportPort for TungsteniteTransport {
    fn open(&self, url: &str, events: TransportEvents) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| anyhow::anyhow!("No tokio runtime for WebSocket task: {}", e))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_socket(url.to_string(), events, rx));

        if let Some(previous) = self.socket().replace(Socket { outbound: tx, task }) {
            previous.task.abort();
        }
        Ok(())
    }

    fn send(&self, text: String) -> Result<()> {
        let socket = self.socket();
        let Some(socket) = socket.as_ref() else {
            return Err(anyhow::anyhow!("Not connected"));
        };
        socket
            .outbound
            .send(Message::Text(text))
            .map_err(|_| anyhow::anyhow!("WebSocket task has stopped"))
    }

    fn close(&self) {
        if let Some(socket) = self.socket().take() {
            // The task finishes the close handshake and exits.
            let _ = socket.outbound.send(Message::Close(None));
        }
    }
}

async fn run_socket(
    url: String,
    events: TransportEvents,
    mut outbound: mpsc::UnboundedReceiver<Message>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", url, e);
            events.error(e.to_string());
            events.closed();
            return;
        }
    };

    tracing::info!("Connected to {}", url);
    events.opened();

    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => events.message(text),
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed connection");
                    break;
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Ignoring {} byte binary frame", data.len());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!("WebSocket error: {}", e);
                    events.error(e.to_string());
                    break;
                }
            },
            queued = outbound.recv() => match queued {
                Some(message) => {
                    let closing = matches!(message, Message::Close(_));
                    if let Message::Text(ref text) = message {
                        tracing::trace!("Sending {}", preview(text));
                    }
                    if let Err(e) = write.send(message).await {
                        tracing::error!("Failed to send message: {}", e);
                        events.error(e.to_string());
                        break;
                    }
                    if closing {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    events.closed();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::net::TcpListener;

    use crate::ports::outbound::TransportEventSink;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Opened,
        Message(String),
        Error,
        Closed,
    }

    struct ChannelSink(mpsc::UnboundedSender<Seen>);

    impl TransportEventSink for ChannelSink {
        fn opened(&self) {
            let _ = self.0.send(Seen::Opened);
        }
        fn message(&self, text: String) {
            let _ = self.0.send(Seen::Message(text));
        }
        fn error(&self, _message: String) {
            let _ = self.0.send(Seen::Error);
        }
        fn closed(&self) {
            let _ = self.0.send(Seen::Closed);
        }
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event within timeout")
            .expect("sink alive")
    }

    #[tokio::test]
    async fn test_exchanges_text_frames_with_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");
            ws.send(Message::Text(r#"{"event":"state","data":{}}"#.to_string()))
                .await
                .expect("server send");
            let reply = ws.next().await.expect("frame").expect("valid frame");
            ws.close(None).await.expect("server close");
            reply
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = TungsteniteTransport::new();
        transport
            .open(&format!("ws://{addr}/ws"), Arc::new(ChannelSink(tx)))
            .expect("open");

        assert_eq!(next(&mut rx).await, Seen::Opened);
        assert_eq!(
            next(&mut rx).await,
            Seen::Message(r#"{"event":"state","data":{}}"#.to_string())
        );

        transport.send("hello".to_string()).expect("send");
        assert_eq!(next(&mut rx).await, Seen::Closed);

        let reply = server.await.expect("server task");
        assert_eq!(reply, Message::Text("hello".to_string()));
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = TungsteniteTransport::new();
        transport
            .open(&format!("ws://{addr}/ws"), Arc::new(ChannelSink(tx)))
            .expect("open spawns");

        assert_eq!(next(&mut rx).await, Seen::Error);
        assert_eq!(next(&mut rx).await, Seen::Closed);
    }

    #[test]
    fn test_send_without_socket_fails() {
        let transport = TungsteniteTransport::new();
        assert!(transport.send("x".to_string()).is_err());
        transport.close();
    }
}
