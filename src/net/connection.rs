use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::sync::watch;

use super::framing::{FrameHeader, FramingStrategy};
use super::Transport;
use crate::config::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_SEND_TIMEOUT};
use crate::{Result, RtspError};

const READ_BUFFER_CAPACITY: usize = 0xffff;

/// Lifecycle of a connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnStatus {
    /// Created, loops not running yet
    None,
    /// Read and write loops running
    Connected,
    /// Closed, by either side
    Disconnected,
}

/// Events emitted by a [`FramedConnection`].
#[derive(Debug, Clone)]
pub enum ConnEvent {
    /// The loops started
    Connected,
    /// One complete framed message
    Data(Bytes),
    /// The connection is gone; emitted exactly once
    Disconnected,
}

type EventSink = Arc<dyn Fn(ConnEvent) + Send + Sync>;
type SendQueueItem = Option<Bytes>;

struct Shared {
    status: Mutex<ConnStatus>,
    framing: Mutex<Option<Box<dyn FramingStrategy>>>,
    shutdown: watch::Sender<bool>,
}

impl Shared {
    fn mark_disconnected(&self) {
        let mut status = self.status.lock();
        if *status == ConnStatus::Connected {
            *status = ConnStatus::Disconnected;
        }
    }

    fn stop(&self) {
        self.mark_disconnected();
        self.shutdown.send_replace(true);
    }

    fn with_framing<R>(&self, f: impl FnOnce(&mut dyn FramingStrategy) -> R) -> Result<R> {
        let mut framing = self.framing.lock();
        match framing.as_mut() {
            Some(strategy) => Ok(f(strategy.as_mut())),
            None => Err(RtspError::Protocol("nil stream protocol".into())),
        }
    }
}

struct Pending {
    transport: Box<dyn Transport>,
    send_rx: mpsc::Receiver<SendQueueItem>,
}

/// A byte-stream socket cut into messages by a [`FramingStrategy`].
///
/// The connection owns one read task and one write task once [`run`](Self::run)
/// is called. Outbound messages go through a bounded FIFO queue; inbound
/// messages and the final disconnect are handed to the event sink given at
/// construction.
pub struct FramedConnection {
    shared: Arc<Shared>,
    send_tx: mpsc::Sender<SendQueueItem>,
    pending: Mutex<Option<Pending>>,
    on_event: EventSink,
    send_timeout: Duration,
    read_timeout: Option<Duration>,
    max_message_size: usize,
}

impl fmt::Debug for FramedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramedConnection")
            .field("status", &self.status())
            .field("send_timeout", &self.send_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("max_message_size", &self.max_message_size)
            .finish()
    }
}

impl FramedConnection {
    /// Wraps `transport`. Nothing is read or written until [`run`](Self::run).
    pub fn new<T, F>(transport: T, send_queue_capacity: usize, on_event: F) -> Self
    where
        T: Transport,
        F: Fn(ConnEvent) + Send + Sync + 'static,
    {
        let (send_tx, send_rx) = mpsc::channel(send_queue_capacity.max(1));
        let (shutdown, _) = watch::channel(false);

        Self {
            shared: Arc::new(Shared {
                status: Mutex::new(ConnStatus::None),
                framing: Mutex::new(None),
                shutdown,
            }),
            send_tx,
            pending: Mutex::new(Some(Pending {
                transport: Box::new(transport),
                send_rx,
            })),
            on_event: Arc::new(on_event),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            read_timeout: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Sets a deadline for every read; an expired deadline ends the connection.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets how long an enqueue may wait on a full queue.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Sets the bound on one framed message.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Installs the framing strategy.
    pub fn set_framing(&self, framing: Box<dyn FramingStrategy>) {
        *self.shared.framing.lock() = Some(framing);
    }

    /// Current status.
    pub fn status(&self) -> ConnStatus {
        *self.shared.status.lock()
    }

    /// Starts the read and write tasks. Must be called inside a tokio runtime.
    pub fn run(&self) {
        let Some(pending) = self.pending.lock().take() else {
            warn!("connection already running");
            return;
        };

        if self.shared.with_framing(|f| f.init()).is_err() {
            error!("nil stream protocol, closing connection");
            *self.shared.status.lock() = ConnStatus::Disconnected;
            drop(pending);
            (self.on_event)(ConnEvent::Disconnected);
            return;
        }

        *self.shared.status.lock() = ConnStatus::Connected;
        (self.on_event)(ConnEvent::Connected);

        let (read_half, write_half) = tokio::io::split(pending.transport);
        let reader = BufReader::with_capacity(READ_BUFFER_CAPACITY, read_half);
        let writer = BufWriter::new(write_half);

        tokio::spawn(read_loop(
            self.shared.clone(),
            reader,
            self.on_event.clone(),
            self.read_timeout,
            self.max_message_size,
        ));
        tokio::spawn(write_loop(self.shared.clone(), writer, pending.send_rx));
    }

    /// Enqueues a copy of `msg`.
    pub async fn send(&self, msg: &[u8]) {
        self.send_bytes(Bytes::copy_from_slice(msg)).await;
    }

    /// Enqueues `msg` without copying. Silently ignored unless connected.
    pub async fn send_bytes(&self, msg: Bytes) {
        if self.status() != ConnStatus::Connected {
            return;
        }
        self.enqueue(Some(msg)).await;
    }

    /// Lets queued messages drain, then closes the socket.
    pub async fn close(&self) {
        if self.status() != ConnStatus::Connected {
            return;
        }
        self.enqueue(None).await;
    }

    /// Closes immediately; queued messages are dropped.
    pub fn force_close(&self) {
        if self.status() == ConnStatus::None {
            // never ran: drop the socket and report it like a normal close
            if self.pending.lock().take().is_some() {
                *self.shared.status.lock() = ConnStatus::Disconnected;
                (self.on_event)(ConnEvent::Disconnected);
            }
            return;
        }
        self.shared.stop();
    }

    async fn enqueue(&self, msg: SendQueueItem) {
        match self.send_tx.send_timeout(msg, self.send_timeout).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                warn!("conn send message timeout, close it");
                self.shared.stop();
            }
            Err(SendTimeoutError::Closed(_)) => {
                debug!("send queue closed, message dropped");
            }
        }
    }
}

async fn read_loop<R>(
    shared: Arc<Shared>,
    mut reader: BufReader<R>,
    on_event: EventSink,
    read_timeout: Option<Duration>,
    max_message_size: usize,
) where
    R: AsyncRead + Unpin,
{
    let mut shutdown = shared.shutdown.subscribe();

    loop {
        let result = tokio::select! {
            result = read_message(&shared, &mut reader, read_timeout, max_message_size) => result,
            _ = wait_closed(&mut shutdown) => {
                debug!("connection closed locally");
                break;
            }
        };

        match result {
            Ok(msg) => on_event(ConnEvent::Data(msg)),
            Err(e) => {
                info!("conn read error: {}", e);
                break;
            }
        }
    }

    shared.stop();
    on_event(ConnEvent::Disconnected);
    debug!("connection read loop quit");
}

async fn write_loop<W>(
    shared: Arc<Shared>,
    mut writer: BufWriter<W>,
    mut queue: mpsc::Receiver<SendQueueItem>,
) where
    W: AsyncWrite + Unpin,
{
    let mut shutdown = shared.shutdown.subscribe();

    loop {
        let item = tokio::select! {
            item = queue.recv() => item,
            _ = wait_closed(&mut shutdown) => break,
        };

        let msg = match item {
            Some(Some(msg)) => msg,
            Some(None) => {
                info!("user disconnect");
                break;
            }
            None => break,
        };

        let header = match shared.with_framing(|f| f.serialize_header(&msg)) {
            Ok(header) => header,
            Err(e) => {
                error!("conn write error: {}", e);
                break;
            }
        };
        if let Err(e) = write_message(&mut writer, header, &msg).await {
            error!("conn write error: {}", e);
            break;
        }
    }

    let _ = writer.shutdown().await;
    shared.stop();
    debug!("connection write loop quit");
}

async fn write_message<W>(
    writer: &mut BufWriter<W>,
    header: Option<Bytes>,
    msg: &[u8],
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if let Some(header) = header {
        writer.write_all(&header).await?;
    }
    writer.write_all(msg).await?;
    writer.flush().await
}

/// Resolves once `flag` turns true or its sender is gone.
pub(crate) async fn wait_closed(flag: &mut watch::Receiver<bool>) {
    let _ = flag.wait_for(|closed| *closed).await;
}

async fn with_deadline<T, E, F>(deadline: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    RtspError: From<E>,
{
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RtspError::Transport("read deadline exceeded".into())),
        },
        None => Ok(fut.await?),
    }
}

// `read + more`, rejecting sums past `max` or overflowing
fn bounded_len(read: usize, more: usize, max: usize) -> Result<usize> {
    match read.checked_add(more) {
        Some(total) if total <= max => Ok(total),
        _ => Err(RtspError::MessageTooLong(read.saturating_add(more))),
    }
}

/// Reads one message: header, body, then the optional content segment.
async fn read_message<R>(
    shared: &Shared,
    reader: &mut BufReader<R>,
    deadline: Option<Duration>,
    max_message_size: usize,
) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let header_len = shared.with_framing(|f| f.header_len())?;
    if header_len > max_message_size {
        return Err(RtspError::MessageTooLong(header_len));
    }

    let mut buf = BytesMut::zeroed(header_len);
    with_deadline(deadline, reader.read_exact(&mut buf[..])).await?;

    let decision = shared.with_framing(|f| f.parse_header(&buf))?;
    match decision {
        FrameHeader::Length(body_len) => {
            let total = bounded_len(header_len, body_len, max_message_size)?;
            buf.resize(total, 0);
            with_deadline(deadline, reader.read_exact(&mut buf[header_len..])).await?;
        }
        FrameHeader::Delimiter(marker) => {
            let scan = async {
                loop {
                    if buf.len() + 1 > max_message_size {
                        return Err(RtspError::MessageTooLong(buf.len() + 1));
                    }
                    let byte = reader.read_u8().await?;
                    buf.put_u8(byte);
                    let body = &buf[header_len..];
                    if body.len() >= marker.len() && body.ends_with(marker) {
                        return Ok::<(), RtspError>(());
                    }
                }
            };
            with_deadline(deadline, scan).await?;
        }
        FrameHeader::Unframed => {
            let available = reader.buffer();
            let take = available.len().min(max_message_size - header_len);
            buf.extend_from_slice(&available[..take]);
            reader.consume(take);
            return Ok(buf.freeze());
        }
    }

    let content_len = shared.with_framing(|f| f.content_length(&buf))?;
    if content_len > 0 {
        let start = buf.len();
        let total = bounded_len(start, content_len, max_message_size)?;
        buf.resize(total, 0);
        with_deadline(deadline, reader.read_exact(&mut buf[start..])).await?;
    }

    Ok(buf.freeze())
}
