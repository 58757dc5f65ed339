//! Response framing

use crate::error::ServerError;
use crate::stats::StatsRegistry;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Fixed reply for unknown routes and missing assets
pub const NOT_FOUND_RESPONSE: &[u8] =
    b"HTTP/1.1 404 Not Found\r\nContent-Length: 13\r\n\r\n404 Not Found";

/// Build the `200 OK` header block for a body of `content_length` bytes
pub fn response_header(content_type: &str, content_length: usize) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        content_type, content_length
    )
}

/// Write the header then the body, and count both towards bytes sent
pub async fn send<W>(
    conn: &mut W,
    stats: &StatsRegistry,
    content_type: &str,
    body: &[u8],
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let header = response_header(content_type, body.len());

    conn.write_all(header.as_bytes())
        .await
        .map_err(ServerError::Write)?;
    conn.write_all(body).await.map_err(ServerError::Write)?;
    conn.flush().await.map_err(ServerError::Write)?;

    stats.record_sent((header.len() + body.len()) as u64).await;
    Ok(())
}

/// Write the fixed 404 literal. Not counted in bytes sent.
pub async fn send_not_found<W>(conn: &mut W) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    conn.write_all(NOT_FOUND_RESPONSE)
        .await
        .map_err(ServerError::Write)?;
    conn.flush().await.map_err(ServerError::Write)
}
