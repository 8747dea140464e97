//! A one-connection stub MPD server for the engine's integration tests
//! (§8's seed scenarios). [`Listener::bind`] gets an address synchronously
//! so the caller can start connecting a real client concurrently with
//! [`Listener::accept`] — otherwise the two sides deadlock waiting on each
//! other.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub struct Listener {
    pub addr: std::net::SocketAddr,
    listener: TcpListener,
}

impl Listener {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { addr, listener }
    }

    /// Accepts the one connection this stub ever serves, sending `welcome`
    /// immediately — mirroring the real server's unsolicited welcome line
    /// (§6). Run concurrently (e.g. via `tokio::join!`) with the client's
    /// own connect call.
    pub async fn accept(self, welcome: &[u8]) -> Stub {
        let (stream, _) = self.listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(welcome).await.unwrap();

        let (tx, client_bytes) = mpsc::unbounded_channel();
        tokio::spawn(relay_reads(read_half, tx));

        Stub {
            client_bytes,
            write_half,
        }
    }
}

pub struct Stub {
    client_bytes: mpsc::UnboundedReceiver<Vec<u8>>,
    write_half: OwnedWriteHalf,
}

impl Stub {
    pub async fn send(&mut self, bytes: &[u8]) {
        self.write_half.write_all(bytes).await.unwrap();
    }

    /// Waits for and returns the next chunk of bytes the client wrote.
    pub async fn recv_client_bytes(&mut self) -> Vec<u8> {
        self.client_bytes.recv().await.expect("client closed")
    }
}

async fn relay_reads(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    tx: mpsc::UnboundedSender<Vec<u8>>,
) {
    let mut buf = vec![0u8; 4096];
    loop {
        match read_half.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}
