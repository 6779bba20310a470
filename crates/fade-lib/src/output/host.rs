use crate::deb::DebArtifact;
use crate::error::FadeError;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const MAX_REQUEST_HEAD: usize = 8192;

pub async fn bind_host(address: SocketAddr) -> Result<TcpListener, FadeError> {
    TcpListener::bind(address).await.map_err(|e| FadeError::Host {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Reads the request head and returns the method, or `None` if the client
/// hung up or sent something that is not HTTP.
async fn read_request_method(stream: &mut TcpStream) -> std::io::Result<Option<String>> {
    let mut head = Vec::new();
    let mut buffer = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        if head.len() > MAX_REQUEST_HEAD {
            return Ok(None);
        }
        let read = stream.read(&mut buffer).await?;
        if read == 0 {
            return Ok(None);
        }
        head.extend_from_slice(&buffer[..read]);
    }

    let request = String::from_utf8_lossy(&head);
    Ok(request
        .split_whitespace()
        .next()
        .map(|method| method.to_ascii_uppercase()))
}

/// Answers one connection; returns whether the package body was sent.
async fn respond(stream: &mut TcpStream, artifact: &DebArtifact) -> std::io::Result<bool> {
    let Some(method) = read_request_method(stream).await? else {
        return Ok(false);
    };

    if method != "GET" && method != "HEAD" {
        stream
            .write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nAllow: GET, HEAD\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            )
            .await?;
        return Ok(false);
    }

    let head = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/vnd.debian.binary-package\r\n\
         Content-Disposition: attachment; filename=\"{}\"\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        artifact.file_name,
        artifact.bytes.len()
    );
    stream.write_all(head.as_bytes()).await?;
    if method == "HEAD" {
        return Ok(false);
    }
    stream.write_all(&artifact.bytes).await?;
    stream.shutdown().await?;
    Ok(true)
}

/// Serves `artifact` over HTTP until one client has downloaded it.
pub async fn serve_once(listener: TcpListener, artifact: &DebArtifact) -> Result<(), FadeError> {
    let address = listener
        .local_addr()
        .map(|address| address.to_string())
        .unwrap_or_else(|_| "unknown address".to_string());
    tracing::info!(
        "Hosting {} at http://{}/{}",
        artifact.file_name,
        address,
        artifact.file_name
    );

    loop {
        let (mut stream, peer) = listener.accept().await.map_err(|e| FadeError::Host {
            address: address.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Connection from {}", peer);

        match respond(&mut stream, artifact).await {
            Ok(true) => {
                tracing::info!("{} downloaded by {}", artifact.file_name, peer);
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                return Err(FadeError::Host {
                    address,
                    reason: format!("transfer to {peer} failed: {e}"),
                });
            }
        }
    }
}

pub async fn host_deb(artifact: &DebArtifact, address: SocketAddr) -> Result<(), FadeError> {
    let listener = bind_host(address).await?;
    serve_once(listener, artifact).await
}
