use std::path::Path;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

/// Connect, write `script`, close: the whole client side of the protocol.
pub async fn send_script(socket: &Path, script: &str) -> std::io::Result<()> {
    let mut stream = UnixStream::connect(socket).await?;
    stream.write_all(script.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Write one script into a FIFO (blocks until a reader opens it).
pub async fn write_fifo(fifo: &Path, script: &str) -> std::io::Result<()> {
    let fifo = fifo.to_path_buf();
    let script = script.to_string();
    tokio::task::spawn_blocking(move || std::fs::write(fifo, script))
        .await
        .map_err(std::io::Error::other)?
}
