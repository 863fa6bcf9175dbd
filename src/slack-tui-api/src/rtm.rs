//! RTM (real-time messaging) subscription.
//!
//! [`RtmSubscription::spawn`] starts a background task that:
//! - asks the Web API for a socket URL (`rtm.connect`)
//! - connects with `tokio-tungstenite` and keeps the socket alive with pings
//! - forwards every parsed frame as an [`RtmEvent`]
//! - reconnects after [`RtmOptions::reconnect_delay`] when the socket drops
//!
//! The subscription itself is a [`Stream`] of events. Dropping it (or calling
//! [`RtmSubscription::cancel`]) stops the task.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::SplitStream;
use futures::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

use crate::client::SlackApi;
use crate::error::{SlackError, SlackResult};
use crate::events::{RtmEvent, parse_rtm_event};

/// Type alias for the WebSocket connection.
type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Tuning for the RTM socket.
#[derive(Debug, Clone)]
pub struct RtmOptions {
    /// Delay between reconnection attempts.
    pub reconnect_delay: Duration,
    /// Ping interval for WebSocket keep-alive.
    pub ping_interval: Duration,
    /// Capacity of the event channel.
    pub buffer: usize,
}

impl Default for RtmOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
            buffer: 256,
        }
    }
}

/// How a single connection ended.
enum SocketExit {
    /// Shutdown was requested.
    Shutdown,
    /// The server closed the socket (or said goodbye).
    Closed,
    /// Nobody is listening for events any more.
    ReceiverGone,
}

/// A live RTM connection, consumed as a stream of events.
pub struct RtmSubscription {
    /// Parsed events from the background task.
    events: mpsc::Receiver<RtmEvent>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
    /// Background connection loop.
    task: JoinHandle<()>,
}

impl std::fmt::Debug for RtmSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtmSubscription")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl RtmSubscription {
    /// Start the connection loop on the current runtime.
    pub fn spawn(api: Arc<dyn SlackApi>, options: RtmOptions) -> Self {
        let (event_tx, events) = mpsc::channel(options.buffer.max(1));
        let (shutdown_tx, _) = broadcast::channel(1);
        let shutdown_rx = shutdown_tx.subscribe();

        let task = tokio::spawn(run_loop(api, options, event_tx, shutdown_rx));

        Self {
            events,
            shutdown_tx,
            task,
        }
    }

    /// Stop the background task. The stream ends once buffered events are
    /// drained.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Receive the next event, or `None` once the subscription has stopped.
    pub async fn recv(&mut self) -> Option<RtmEvent> {
        self.events.recv().await
    }
}

impl Stream for RtmSubscription {
    type Item = RtmEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl Drop for RtmSubscription {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        self.task.abort();
    }
}

/// Connect, run, and reconnect until shut down.
async fn run_loop(
    api: Arc<dyn SlackApi>,
    options: RtmOptions,
    event_tx: mpsc::Sender<RtmEvent>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        let connect = tokio::select! {
            _ = shutdown_rx.recv() => return,
            info = api.rtm_connect() => info,
        };

        let result = match connect {
            Ok(info) => {
                info!("Connecting to RTM...");
                connect_and_run(&info.url, &options, &event_tx, &mut shutdown_rx).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(SocketExit::Shutdown) | Ok(SocketExit::ReceiverGone) => {
                debug!("RTM subscription stopped");
                return;
            }
            Ok(SocketExit::Closed) => {
                info!("RTM connection closed, reconnecting");
            }
            Err(e) => {
                error!("RTM connection error: {}", e);
                info!("Reconnecting in {:?}...", options.reconnect_delay);
                tokio::select! {
                    _ = shutdown_rx.recv() => return,
                    _ = tokio::time::sleep(options.reconnect_delay) => {}
                }
            }
        }
    }
}

/// Connect to the WebSocket and pump frames until it ends.
async fn connect_and_run(
    ws_url: &str,
    options: &RtmOptions,
    event_tx: &mpsc::Sender<RtmEvent>,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> SlackResult<SocketExit> {
    let (ws_stream, _) = connect_async(ws_url).await?;
    let (mut write, read) = ws_stream.split();

    // Channel for outgoing frames
    let (msg_tx, mut msg_rx) = mpsc::channel::<WsMessage>(16);

    let write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            if let Err(e) = write.send(msg).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    // RTM keep-alive is an application-level ping frame with a running id.
    let ping_tx = msg_tx.clone();
    let ping_interval = options.ping_interval;
    let ping_task = tokio::spawn(async move {
        let mut interval = interval(ping_interval);
        // The first tick completes immediately.
        interval.tick().await;
        let mut id: u64 = 0;
        loop {
            interval.tick().await;
            id += 1;
            let frame = serde_json::json!({"id": id, "type": "ping"}).to_string();
            if ping_tx.send(WsMessage::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let result = process_frames(read, msg_tx, event_tx, shutdown_rx).await;

    ping_task.abort();
    write_task.abort();

    result
}

/// Process incoming WebSocket frames.
async fn process_frames(
    mut read: SplitStream<WsConnection>,
    msg_tx: mpsc::Sender<WsMessage>,
    event_tx: &mpsc::Sender<RtmEvent>,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> SlackResult<SocketExit> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Received shutdown signal");
                return Ok(SocketExit::Shutdown);
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        let event = match parse_rtm_event(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                warn!("Failed to parse RTM frame: {}", e);
                                continue;
                            }
                        };
                        match event {
                            RtmEvent::Unknown => continue,
                            RtmEvent::Goodbye => {
                                info!("RTM server said goodbye");
                                let _ = event_tx.send(RtmEvent::Goodbye).await;
                                return Ok(SocketExit::Closed);
                            }
                            event => {
                                if event_tx.send(event).await.is_err() {
                                    return Ok(SocketExit::ReceiverGone);
                                }
                            }
                        }
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = msg_tx.send(WsMessage::Pong(data)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        info!("WebSocket closed by server");
                        return Ok(SocketExit::Closed);
                    }
                    Some(Err(e)) => {
                        return Err(SlackError::WebSocket(e.to_string()));
                    }
                    None => {
                        return Ok(SocketExit::Closed);
                    }
                    _ => {}
                }
            }
        }
    }
}
