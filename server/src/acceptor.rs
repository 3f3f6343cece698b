//! Lobby connection acceptor.
//!
//! Accepts inbound connections only while the lobby is open and feeds the
//! roster. The loop is the one cancellable piece of the host: the operator
//! stops it when the game begins, and no joins are possible afterwards —
//! roster composition is fixed before rounds start.

use crate::roster::Roster;
use crate::session::PlayerSession;
use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch, RwLock};

pub struct ConnectionAcceptor {
    listener: TcpListener,
    next_player_id: u32,
    read_deadline: Duration,
}

impl ConnectionAcceptor {
    /// Binds the listening socket. A bind failure is fatal to starting a
    /// game; the operator shell surfaces it with a retry/abort prompt.
    pub async fn bind(addr: &str, read_deadline: Duration) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(ConnectionAcceptor {
            listener,
            next_player_id: 1,
            read_deadline,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Each new connection performs the name handshake and is
    /// inserted into the roster; the joined name is reported over
    /// `joined_tx` for status display. Stops when `shutdown` fires.
    pub async fn run(
        mut self,
        roster: Arc<RwLock<Roster>>,
        joined_tx: mpsc::UnboundedSender<String>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                result = self.listener.accept() => match result {
                    Ok((stream, addr)) => {
                        let id = self.next_player_id;
                        self.next_player_id += 1;

                        match PlayerSession::accept(stream, id, self.read_deadline).await {
                            Ok(session) => {
                                let name = session.name().to_string();
                                if roster.write().await.add(session) {
                                    let _ = joined_tx.send(name);
                                }
                            }
                            Err(e) => warn!("Handshake with {} failed: {}", addr, e),
                        }
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                },
                _ = shutdown.changed() => {
                    info!("Lobby closed, stopping accept loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TextStream;
    use tokio::net::TcpStream;

    const TEST_DEADLINE: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_accepts_players_into_the_roster() {
        let acceptor = ConnectionAcceptor::bind("127.0.0.1:0", TEST_DEADLINE)
            .await
            .unwrap();
        let addr = acceptor.local_addr().unwrap();

        let roster = Arc::new(RwLock::new(Roster::new()));
        let (joined_tx, mut joined_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(acceptor.run(Arc::clone(&roster), joined_tx, shutdown_rx));

        let mut ada = TextStream::new(TcpStream::connect(addr).await.unwrap());
        ada.send("Ada").await.unwrap();
        let mut brin = TextStream::new(TcpStream::connect(addr).await.unwrap());
        brin.send("Brin").await.unwrap();

        assert_eq!(joined_rx.recv().await.unwrap(), "Ada");
        assert_eq!(joined_rx.recv().await.unwrap(), "Brin");
        assert_eq!(roster.read().await.live_names(), vec!["Ada", "Brin"]);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_handshake_does_not_join() {
        let acceptor = ConnectionAcceptor::bind("127.0.0.1:0", TEST_DEADLINE)
            .await
            .unwrap();
        let addr = acceptor.local_addr().unwrap();

        let roster = Arc::new(RwLock::new(Roster::new()));
        let (joined_tx, mut joined_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(acceptor.run(Arc::clone(&roster), joined_tx, shutdown_rx));

        // Connects but never sends a name; the handshake deadline expires.
        let silent = TcpStream::connect(addr).await.unwrap();

        let mut ada = TextStream::new(TcpStream::connect(addr).await.unwrap());
        ada.send("Ada").await.unwrap();

        assert_eq!(joined_rx.recv().await.unwrap(), "Ada");
        assert_eq!(roster.read().await.live_names(), vec!["Ada"]);

        drop(silent);
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let acceptor = ConnectionAcceptor::bind("127.0.0.1:0", TEST_DEADLINE)
            .await
            .unwrap();

        let roster = Arc::new(RwLock::new(Roster::new()));
        let (joined_tx, mut joined_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(acceptor.run(roster, joined_tx, shutdown_rx));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
        // The join channel closes with the loop.
        assert_eq!(joined_rx.recv().await, None);
    }
}
