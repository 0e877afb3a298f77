use async_trait::async_trait;
use std::{fmt::Debug, io, net::SocketAddr};

pub mod tcp;

pub use tcp::{StreamConnection, TcpTransport};

/// Opens connections to the weather service.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<SocketAddr>;

    async fn connect(&self, addr: SocketAddr) -> io::Result<Box<dyn Connection>>;
}

/// One open connection. `close` must be called once the exchange is over.
#[async_trait]
pub trait Connection: Send {
    /// Sends `bytes`, returning how many were written.
    async fn send(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Reads once into `buf`, returning how many bytes arrived.
    async fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    async fn close(&mut self) -> io::Result<()>;
}
