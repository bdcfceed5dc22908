//! Transport worker: one websocket connection, decoded in arrival order.
//!
//! The worker runs a current-thread tokio runtime on its own named thread.
//! The main context drives it through a command channel and drains
//! [`TransportEvent`]s without blocking. Reconnection is unconditional: a
//! closed or timed-out socket is retried after a fixed delay until the
//! worker is shut down.

/// Ticketed ordering gate for decode tasks.
pub mod order_lock;

use std::sync::{mpsc, Arc};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc as tokio_mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

pub use self::order_lock::OrderLock;
use crate::error::ClientError;
use crate::options::TransportOptions;
use crate::protocol::codec::{decode_batch, encode_message};
use crate::protocol::Message;

/// Something the connection reports to the main context.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The socket opened.
    Connected,
    /// The socket closed, failed to open, or timed out while opening.
    Closed,
    /// One decoded frame, in wire order.
    Batch(Vec<Message>),
}

/// Connection seam between the client and the network.
pub trait Transport {
    /// Point the connection at `url`, closing any open socket.
    ///
    /// # Errors
    ///
    /// [`ClientError::TransportClosed`] if the transport has shut down.
    fn set_server(&mut self, url: &str) -> Result<(), ClientError>;

    /// Encode and send one message as its own frame.
    ///
    /// # Errors
    ///
    /// [`ClientError::Encode`] if the message cannot be encoded, or
    /// [`ClientError::TransportClosed`] if the transport has shut down.
    fn send(&mut self, message: &Message) -> Result<(), ClientError>;

    /// Next pending event, without blocking.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Close the socket and stop reconnecting.
    fn shutdown(&mut self);
}

enum Command {
    SetServer(String),
    Send(Vec<u8>),
    Shutdown,
}

enum SessionEnd {
    Closed,
    Retarget(String),
    Shutdown,
}

/// [`Transport`] backed by a background websocket thread.
pub struct TransportWorker {
    commands: tokio_mpsc::UnboundedSender<Command>,
    events: mpsc::Receiver<TransportEvent>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl TransportWorker {
    /// Spawn the worker thread. It stays idle until a server is set.
    ///
    /// # Errors
    ///
    /// [`ClientError::ThreadSpawn`] if the thread cannot start.
    pub fn spawn(options: TransportOptions) -> Result<Self, ClientError> {
        let (command_tx, command_rx) = tokio_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("transport-worker".into())
            .spawn(move || Self::thread_main(command_rx, event_tx, options))
            .map_err(ClientError::ThreadSpawn)?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            thread: Some(thread),
        })
    }

    #[allow(clippy::needless_pass_by_value)]
    fn thread_main(
        commands: tokio_mpsc::UnboundedReceiver<Command>,
        events: mpsc::Sender<TransportEvent>,
        options: TransportOptions,
    ) {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!("transport runtime failed to start: {e}");
                return;
            }
        };
        runtime.block_on(run(commands, events, options));
        log::debug!("transport worker stopped");
    }

    fn command(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::TransportClosed)
    }
}

impl Transport for TransportWorker {
    fn set_server(&mut self, url: &str) -> Result<(), ClientError> {
        self.command(Command::SetServer(url.to_owned()))
    }

    fn send(&mut self, message: &Message) -> Result<(), ClientError> {
        let frame = encode_message(message)?;
        self.command(Command::Send(frame))
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    fn shutdown(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TransportWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Worker side ──

async fn run(
    mut commands: tokio_mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<TransportEvent>,
    options: TransportOptions,
) {
    let gate = OrderLock::new();
    let mut server: Option<String> = None;

    loop {
        let Some(url) = server.clone() else {
            match commands.recv().await {
                Some(Command::SetServer(url)) => server = Some(url),
                Some(Command::Send(_)) => log::warn!("dropping send: no server set"),
                Some(Command::Shutdown) | None => return,
            }
            continue;
        };

        let end = session(&url, &mut commands, &events, &options, &gate).await;
        let _ = events.send(TransportEvent::Closed);
        match end {
            SessionEnd::Shutdown => return,
            SessionEnd::Retarget(next) => {
                server = Some(next);
                continue;
            }
            SessionEnd::Closed => {}
        }

        log::info!("reconnecting to {url} in {:?}", options.reconnect_delay());
        let delay = tokio::time::sleep(options.reconnect_delay());
        tokio::pin!(delay);
        loop {
            tokio::select! {
                () = &mut delay => break,
                command = commands.recv() => match command {
                    Some(Command::SetServer(next)) => {
                        server = Some(next);
                        break;
                    }
                    Some(Command::Send(_)) => log::warn!("dropping send while disconnected"),
                    Some(Command::Shutdown) | None => return,
                },
            }
        }
    }
}

async fn session(
    url: &str,
    commands: &mut tokio_mpsc::UnboundedReceiver<Command>,
    events: &mpsc::Sender<TransportEvent>,
    options: &TransportOptions,
    gate: &Arc<OrderLock>,
) -> SessionEnd {
    log::info!("connecting to {url}");
    let connect = tokio::time::timeout(
        options.connect_timeout(),
        tokio_tungstenite::connect_async(url),
    );
    tokio::pin!(connect);

    let socket = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok(Ok((socket, _response))) => break socket,
                Ok(Err(e)) => {
                    log::warn!("connection to {url} failed: {e}");
                    return SessionEnd::Closed;
                }
                Err(_) => {
                    log::warn!(
                        "connection to {url} timed out after {:?}",
                        options.connect_timeout()
                    );
                    return SessionEnd::Closed;
                }
            },
            command = commands.recv() => match command {
                Some(Command::SetServer(next)) => return SessionEnd::Retarget(next),
                Some(Command::Send(_)) => log::warn!("dropping send: socket still opening"),
                Some(Command::Shutdown) | None => return SessionEnd::Shutdown,
            },
        }
    };

    log::info!("connected to {url}");
    let _ = events.send(TransportEvent::Connected);
    let (mut sink, mut stream) = socket.split();

    let end = loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Binary(bytes))) => {
                    spawn_decode(bytes, gate, events.clone(), options.order_lock_timeout());
                }
                Some(Ok(WsMessage::Close(_))) | None => break SessionEnd::Closed,
                Some(Ok(WsMessage::Text(text))) => {
                    log::warn!("ignoring {}-byte text frame", text.len());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("socket error: {e}");
                    break SessionEnd::Closed;
                }
            },
            command = commands.recv() => match command {
                Some(Command::Send(frame)) => {
                    if let Err(e) = sink.send(WsMessage::Binary(frame)).await {
                        log::warn!("send failed: {e}");
                        break SessionEnd::Closed;
                    }
                }
                Some(Command::SetServer(next)) => break SessionEnd::Retarget(next),
                Some(Command::Shutdown) | None => break SessionEnd::Shutdown,
            },
        }
    };

    if !matches!(end, SessionEnd::Closed) {
        let _ = sink.close().await;
    }
    log::info!("disconnected from {url}");
    end
}

/// Decode one frame off the reactor thread and hand the batch off once
/// every earlier frame has been handed off.
fn spawn_decode(
    bytes: Vec<u8>,
    gate: &Arc<OrderLock>,
    events: mpsc::Sender<TransportEvent>,
    bound: Duration,
) {
    let ticket = gate.ticket();
    let gate = Arc::clone(gate);
    drop(tokio::spawn(async move {
        let _guard = gate.acquire(ticket, bound).await;
        match tokio::task::spawn_blocking(move || decode_batch(&bytes)).await {
            Ok(Ok(batch)) => {
                if !batch.is_empty() {
                    let _ = events.send(TransportEvent::Batch(batch));
                }
            }
            Ok(Err(e)) => log::warn!("dropping undecodable frame: {e}"),
            Err(e) => log::error!("decode task failed: {e}"),
        }
    }));
}
