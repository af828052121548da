//! Newline-delimited JSON-RPC over stdio.
//!
//! Each incoming line is handled on its own task so slow CLI invocations do
//! not hold up other requests. Responses funnel through a channel into a
//! single writer, which keeps frames from interleaving.

use crate::core::{Error, Result};
use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse};
use crate::mcp::server::McpServer;
use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{
    AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, FramedRead, FramedWrite, LinesCodec,
    LinesCodecError,
};
use tracing::{debug, error, info, warn};

/// Longest accepted input frame (16 MiB)
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Serve MCP on the process's stdin and stdout until stdin closes
pub async fn serve_stdio(server: McpServer) -> Result<()> {
    info!("Serving MCP on stdio");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve MCP over an arbitrary reader/writer pair
pub async fn serve<R, W>(server: McpServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_with_limit(server, reader, writer, MAX_FRAME_BYTES).await
}

/// Serve MCP with a custom input frame limit
pub async fn serve_with_limit<R, W>(
    server: McpServer,
    reader: R,
    writer: W,
    max_frame_bytes: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let (read_result, write_result) = tokio::join!(
        read_requests(server, reader, tx, max_frame_bytes),
        write_responses(writer, rx)
    );

    read_result?;
    write_result
}

/// One newline-delimited input frame
#[derive(Debug, PartialEq)]
enum Frame {
    Line(Bytes),
    /// Longer than the limit; the codec skips to the next newline
    Oversized,
}

/// Newline framing that reports an over-long line as a frame instead of an
/// error, so `FramedRead` keeps decoding what is already buffered.
#[derive(Debug)]
struct FrameCodec {
    inner: AnyDelimiterCodec,
}

impl FrameCodec {
    fn new(max_frame_bytes: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                b"\n".to_vec(),
                max_frame_bytes,
            ),
        }
    }

    fn lift(
        decoded: std::result::Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> std::io::Result<Option<Frame>> {
        match decoded {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(AnyDelimiterCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> std::io::Result<Option<Frame>> {
        Self::lift(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> std::io::Result<Option<Frame>> {
        Self::lift(self.inner.decode_eof(buf))
    }
}

fn reject_frame(tx: &mpsc::UnboundedSender<JsonRpcResponse>, details: String) {
    let _ = tx.send(JsonRpcResponse::error(
        Value::Null,
        JsonRpcError::parse_error(details),
    ));
}

async fn read_requests<R>(
    server: McpServer,
    reader: R,
    tx: mpsc::UnboundedSender<JsonRpcResponse>,
    max_frame_bytes: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(reader, FrameCodec::new(max_frame_bytes));

    while let Some(frame) = frames.next().await {
        if tx.is_closed() {
            warn!("Response writer stopped, no longer reading requests");
            break;
        }

        let bytes = match frame? {
            Frame::Line(bytes) => bytes,
            Frame::Oversized => {
                warn!(limit = max_frame_bytes, "Discarding oversized frame");
                reject_frame(&tx, format!("frame exceeds {} bytes", max_frame_bytes));
                continue;
            }
        };

        // Raw bytes, so a line that is not UTF-8 is answered rather than
        // ending the stream.
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.to_string(),
            Err(e) => {
                warn!(error = %e, "Discarding frame that is not valid UTF-8");
                reject_frame(&tx, format!("frame is not valid UTF-8: {}", e));
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = server.handle_message(&line).await {
                if tx.send(response).is_err() {
                    debug!("Response dropped, writer already closed");
                }
            }
        });
    }

    debug!("Input closed, waiting for in-flight requests");
    Ok(())
}

async fn write_responses<W>(
    writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frames = FramedWrite::new(writer, LinesCodec::new());

    while let Some(response) = rx.recv().await {
        let line = serde_json::to_string(&response)?;
        if let Err(e) = frames.send(line).await {
            error!(error = %e, "Failed to write response");
            return Err(match e {
                LinesCodecError::Io(e) => Error::Io(e),
                other => Error::protocol(other.to_string()),
            });
        }
    }

    Ok(())
}
