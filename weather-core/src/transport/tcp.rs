use std::{future::Future, io, net::SocketAddr, time::Duration};

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpStream, lookup_host},
};
use tracing::debug;

use super::{Connection, Transport};

/// Plain TCP transport on the tokio runtime.
///
/// Every operation is bounded by `timeout` when one is configured.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    timeout: Option<Duration>,
}

impl TcpTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<SocketAddr> {
        let mut addrs = with_deadline(self.timeout, lookup_host((host, port))).await?;
        // Only IPv4 is reachable on the targets this worker runs on.
        let addr = addrs.find(SocketAddr::is_ipv4).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no IPv4 address found for {host}"),
            )
        })?;
        debug!(%host, %addr, "resolved weather service");
        Ok(addr)
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<Box<dyn Connection>> {
        let stream = with_deadline(self.timeout, TcpStream::connect(addr)).await?;
        Ok(Box::new(StreamConnection::new(stream, self.timeout)))
    }
}

/// [`Connection`] over any async byte stream.
#[derive(Debug)]
pub struct StreamConnection<S> {
    stream: S,
    timeout: Option<Duration>,
}

impl<S> StreamConnection<S> {
    pub fn new(stream: S, timeout: Option<Duration>) -> Self {
        Self { stream, timeout }
    }
}

#[async_trait]
impl<S> Connection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        with_deadline(self.timeout, self.stream.write_all(bytes)).await?;
        with_deadline(self.timeout, self.stream.flush()).await?;
        Ok(bytes.len())
    }

    async fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        with_deadline(self.timeout, self.stream.read(buf)).await
    }

    async fn close(&mut self) -> io::Result<()> {
        with_deadline(self.timeout, self.stream.shutdown()).await
    }
}

async fn with_deadline<T, F>(timeout: Option<Duration>, op: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, op).await.map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!("operation timed out after {limit:?}"),
            )
        })?,
        None => op.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn sends_and_receives_over_stream() {
        let mock = Builder::new()
            .write(b"GET / HTTP/1.1\r\n\r\n")
            .read(b"HTTP/1.1 200 OK\r\n\r\n{}")
            .build();
        let mut conn = StreamConnection::new(mock, None);

        let sent = conn.send(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(sent, 18);

        let mut buf = [0u8; 64];
        let n = conn.receive(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"HTTP/1.1 200 OK\r\n\r\n{}");
    }

    #[tokio::test]
    async fn receive_error_is_propagated() {
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut conn = StreamConnection::new(mock, None);

        let mut buf = [0u8; 16];
        let err = conn.receive(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn receive_respects_buffer_length() {
        let mock = Builder::new().read(b"01234567").build();
        let mut conn = StreamConnection::new(mock, None);

        let mut buf = [0u8; 4];
        let n = conn.receive(&mut buf).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf, b"0123");

        let n = conn.receive(&mut buf).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf, b"4567");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_maps_to_timed_out() {
        let err = with_deadline(
            Some(Duration::from_millis(50)),
            std::future::pending::<io::Result<()>>(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
