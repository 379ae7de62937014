use std::io::ErrorKind;

use log::warn;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::Transport;

/// Default timeout for writing one frame.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame payload (1 MB). Larger length prefixes are rejected.
pub const MAX_MESSAGE_SIZE: u32 = 1_000_000;

/// Length of the big-endian size prefix in front of every frame.
const HEADER_LEN: usize = 4;

/// Length-prefixed bincode frames over a TCP stream.
///
/// Bytes are read into an internal buffer and frames are cut from it, so a
/// `recv` cancelled mid-frame picks up where it left off.
pub struct TcpTransport {
    stream: TcpStream,
    send_timeout: Duration,
    max_message_size: u32,
    read_buf: Vec<u8>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_SEND_TIMEOUT, MAX_MESSAGE_SIZE)
    }

    /// Wrap `stream`, turning off Nagle's algorithm so each small frame is
    /// written out immediately.
    pub fn with_config(stream: TcpStream, send_timeout: Duration, max_message_size: u32) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Could not set TCP_NODELAY: {}", e);
        }
        Self {
            stream,
            send_timeout,
            max_message_size,
            read_buf: Vec::new(),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Whether small frames are sent without coalescing delay.
    pub fn nodelay(&self) -> bool {
        self.stream.nodelay().unwrap_or(false)
    }

    /// Cut one complete frame off the front of the read buffer, if present.
    fn take_frame(&mut self) -> anyhow::Result<Option<Message>> {
        if self.read_buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let mut len_buf = [0u8; HEADER_LEN];
        len_buf.copy_from_slice(&self.read_buf[..HEADER_LEN]);
        let len = u32::from_be_bytes(len_buf);
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }
        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        let end = HEADER_LEN + len as usize;
        if self.read_buf.len() < end {
            return Ok(None);
        }
        let msg = bincode::deserialize(&self.read_buf[HEADER_LEN..end])
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
        self.read_buf.drain(..end);
        Ok(Some(msg))
    }
}

fn map_io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        ErrorKind::ConnectionReset | ErrorKind::BrokenPipe => {
            anyhow::anyhow!("Connection reset by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let data =
            bincode::serialize(&msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() > self.max_message_size as usize {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.max_message_size
            ));
        }
        let mut frame = Vec::with_capacity(HEADER_LEN + data.len());
        frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
        frame.extend_from_slice(&data);

        timeout(self.send_timeout, self.stream.write_all(&frame))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.send_timeout))?
            .map_err(map_io_error)
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(msg) = self.take_frame()? {
                return Ok(msg);
            }
            let n = self.stream.read(&mut chunk).await.map_err(map_io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.read_buf.extend_from_slice(&chunk[..n]);
        }
    }
}
