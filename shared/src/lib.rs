//! Wire vocabulary and line codec shared by the game host and player client.
//!
//! The protocol is newline-delimited text over one persistent TCP connection
//! per player. List payloads are preceded by an explicit count line; there is
//! no other framing.

use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const DEFAULT_PORT: u16 = 4444;
pub const ROUNDS_PER_GAME: u32 = 4;
pub const CATEGORIES_PER_ROUND: usize = 12;
pub const COUNTDOWN_SECS: u32 = 20;
pub const READ_TIMEOUT_SECS: u64 = 10;

/// Liveness probe, host to player.
pub const MSG_ALIVE: &str = "alive?";
/// Affirmative reply, player to host (liveness or receipt).
pub const MSG_YES: &str = "yes";
/// Category broadcast header; followed by a count line and that many categories.
pub const MSG_CATEGORIES: &str = "categories";
/// Receipt request the host sends after a broadcast payload.
pub const MSG_RECEIVED: &str = "received?";
/// Letter broadcast header; followed by one line holding the letter.
pub const MSG_LETTER: &str = "letter";
/// Answer trigger; the player replies with exactly one line per category.
pub const MSG_ANSWERS: &str = "answers";

/// A host command line as seen by the player client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    Alive,
    Categories,
    Letter,
    Answers,
    Unknown(String),
}

impl HostMessage {
    pub fn parse(line: &str) -> Self {
        match line {
            MSG_ALIVE => HostMessage::Alive,
            MSG_CATEGORIES => HostMessage::Categories,
            MSG_LETTER => HostMessage::Letter,
            MSG_ANSWERS => HostMessage::Answers,
            other => HostMessage::Unknown(other.to_string()),
        }
    }
}

/// Newline-delimited text channel over a TCP stream.
///
/// Reads strip the line terminator and nothing else, so an empty line (a
/// valid "no answer") survives the trip. End of stream surfaces as
/// `UnexpectedEof` and an expired deadline as `TimedOut`; callers above the
/// protocol boundary collapse both into a failed primitive.
pub struct TextStream {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TextStream {
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        TextStream {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// Sends one line, appending the terminator and flushing.
    pub async fn send(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Reads one line, blocking until the peer replies or the stream closes.
    pub async fn recv(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            ));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Reads one line with a bounded deadline.
    pub async fn recv_deadline(&mut self, deadline: Duration) -> io::Result<String> {
        match timeout(deadline, self.recv()).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "peer did not reply within the read deadline",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn connected_pair() -> (TextStream, TextStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (TextStream::new(server), TextStream::new(client))
    }

    #[test]
    fn test_host_message_parsing() {
        assert_eq!(HostMessage::parse("alive?"), HostMessage::Alive);
        assert_eq!(HostMessage::parse("categories"), HostMessage::Categories);
        assert_eq!(HostMessage::parse("letter"), HostMessage::Letter);
        assert_eq!(HostMessage::parse("answers"), HostMessage::Answers);
        assert_eq!(
            HostMessage::parse("gibberish"),
            HostMessage::Unknown("gibberish".to_string())
        );
    }

    #[test]
    fn test_tokens_match_wire_vocabulary() {
        // These literals are the wire protocol; changing them breaks
        // compatibility with existing clients.
        assert_eq!(MSG_ALIVE, "alive?");
        assert_eq!(MSG_YES, "yes");
        assert_eq!(MSG_RECEIVED, "received?");
    }

    #[tokio::test]
    async fn test_send_recv_roundtrip() {
        let (mut host, mut player) = connected_pair().await;

        host.send("categories").await.unwrap();
        host.send("2").await.unwrap();
        assert_eq!(player.recv().await.unwrap(), "categories");
        assert_eq!(player.recv().await.unwrap(), "2");

        player.send("yes").await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_empty_line_survives() {
        let (mut host, mut player) = connected_pair().await;

        player.send("").await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_crlf_terminator_stripped() {
        let (mut host, mut player) = connected_pair().await;

        // A peer using \r\n line endings must parse identically.
        use tokio::io::AsyncWriteExt;
        player.writer.write_all(b"yes\r\n").await.unwrap();
        player.writer.flush().await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_recv_after_close_is_unexpected_eof() {
        let (mut host, player) = connected_pair().await;

        drop(player);
        let err = host.recv().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_recv_deadline_times_out_on_silent_peer() {
        let (mut host, _player) = connected_pair().await;

        let err = host
            .recv_deadline(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
