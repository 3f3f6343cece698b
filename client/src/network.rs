//! Player-side protocol handling.
//!
//! The host drives the conversation; the client reacts to one command line
//! at a time. Liveness probes and broadcast receipts are answered inline,
//! and typed answer lines are folded into the [`AnswerBuffer`] between host
//! messages.

use crate::input::{AnswerBuffer, Recorded};
use log::{info, warn};
use shared::{HostMessage, TextStream, MSG_RECEIVED, MSG_YES};
use std::io;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Either side of the select loop: a host command line, or a line typed by
/// the player.
enum Event {
    Host(io::Result<String>),
    Typed(Option<String>),
}

pub struct Connection {
    conn: TextStream,
    categories: Vec<String>,
    answers: AnswerBuffer,
}

impl Connection {
    /// Connects to the host and completes the name handshake: the first
    /// line a new peer sends is its display name.
    pub async fn connect(addr: &str, name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(addr).await?;
        let mut conn = TextStream::new(stream);
        conn.send(name).await?;
        info!("Connected to {} as {}", addr, name);
        Ok(Connection {
            conn,
            categories: Vec::new(),
            answers: AnswerBuffer::new(),
        })
    }

    /// Serves the protocol until the host closes the connection. `typed`
    /// carries the player's keyboard lines.
    pub async fn run(
        &mut self,
        mut typed: mpsc::UnboundedReceiver<String>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut keyboard_open = true;

        loop {
            // Keystrokes already entered must be folded in before the next
            // host command is honored, so the answer trigger can never race
            // past a buffered answer line.
            let event = tokio::select! {
                biased;
                line = typed.recv(), if keyboard_open => Event::Typed(line),
                line = self.conn.recv() => Event::Host(line),
            };

            match event {
                Event::Host(Ok(line)) => match HostMessage::parse(&line) {
                    HostMessage::Alive => self.conn.send(MSG_YES).await?,
                    HostMessage::Categories => self.read_categories().await?,
                    HostMessage::Letter => self.read_letter().await?,
                    HostMessage::Answers => self.send_answers().await?,
                    HostMessage::Unknown(other) => warn!("Unknown message {:?}", other),
                },
                Event::Host(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    info!("Host closed the connection");
                    println!("The host has ended the session. Thanks for playing!");
                    return Ok(());
                }
                Event::Host(Err(e)) => return Err(e.into()),
                Event::Typed(Some(line)) => self.handle_typed(&line),
                Event::Typed(None) => keyboard_open = false,
            }
        }
    }

    async fn read_categories(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let count: usize = self.conn.recv().await?.parse()?;
        let mut categories = Vec::with_capacity(count);
        for _ in 0..count {
            categories.push(self.conn.recv().await?);
        }
        self.acknowledge_receipt().await?;

        println!();
        println!("This round's categories:");
        for (index, category) in categories.iter().enumerate() {
            println!("  {:>2}. {}", index + 1, category);
        }
        println!("Waiting for the host to reveal the letter...");

        self.answers.reset(categories.len());
        self.categories = categories;
        Ok(())
    }

    async fn read_letter(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let line = self.conn.recv().await?;
        let letter = line.chars().next().ok_or("empty letter broadcast")?;
        self.acknowledge_receipt().await?;

        println!();
        println!("The letter is: {}", letter);
        println!("Type one answer per category, in order. Use 'N: text' to revise answer N.");
        Ok(())
    }

    /// The receipt handshake from the player's side: the host asks
    /// `received?` after the payload and we confirm. A missing request is
    /// logged and skipped, matching the reference client.
    async fn acknowledge_receipt(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let request = self.conn.recv().await?;
        if request == MSG_RECEIVED {
            self.conn.send(MSG_YES).await?;
        } else {
            warn!("Expected a read receipt request, got {:?}", request);
        }
        Ok(())
    }

    /// Replies to the answer trigger with exactly one line per category;
    /// unanswered categories go out as empty lines. No handshake follows.
    async fn send_answers(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        println!();
        println!("Time's up! Sending your answers...");
        for answer in self.answers.take_answers() {
            self.conn.send(&answer).await?;
        }
        // Late keystrokes are meaningless until the next round.
        self.answers.reset(0);
        Ok(())
    }

    fn handle_typed(&mut self, line: &str) {
        match self.answers.record(line) {
            Recorded::Slot(index) => {
                let category = self
                    .categories
                    .get(index)
                    .map(String::as_str)
                    .unwrap_or("?");
                let answers = self.answers.take_answers();
                let stored = answers.get(index).map(String::as_str).unwrap_or("");
                if stored.is_empty() {
                    println!("[{} cleared]", category);
                } else {
                    println!("[{} = {}]", category, stored);
                }
            }
            Recorded::AllFull => {
                println!("Every category has an answer; use 'N: text' to revise one.");
            }
            Recorded::OutOfRange(number) => {
                println!(
                    "There is no category {}; this round has {}.",
                    number,
                    self.answers.arity()
                );
            }
            Recorded::Ignored => {}
            Recorded::Inactive => {
                println!("No round in progress; nothing to answer right now.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Boots a Connection against a scripted host and returns the host's
    /// side of the wire plus the keyboard channel.
    async fn connection_under_test() -> (
        tokio::task::JoinHandle<()>,
        TextStream,
        mpsc::UnboundedSender<String>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (typed_tx, typed_rx) = mpsc::unbounded_channel();
        let addr_string = addr.to_string();
        let client_task = tokio::spawn(async move {
            let mut connection = Connection::connect(&addr_string, "Ada").await.unwrap();
            connection.run(typed_rx).await.unwrap();
        });

        let (stream, _) = listener.accept().await.unwrap();
        let mut host = TextStream::new(stream);
        assert_eq!(host.recv().await.unwrap(), "Ada");
        (client_task, host, typed_tx)
    }

    #[tokio::test]
    async fn test_answers_liveness_probe() {
        let (client_task, mut host, _typed) = connection_under_test().await;

        host.send("alive?").await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "yes");

        drop(host);
        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_full_round_from_the_player_side() {
        let (client_task, mut host, typed) = connection_under_test().await;

        // Category broadcast with the receipt handshake.
        host.send("categories").await.unwrap();
        host.send("3").await.unwrap();
        host.send("Fruits").await.unwrap();
        host.send("Birds").await.unwrap();
        host.send("Vegetables").await.unwrap();
        host.send("received?").await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "yes");

        // Letter broadcast.
        host.send("letter").await.unwrap();
        host.send("C").await.unwrap();
        host.send("received?").await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "yes");

        // The player answers two of three categories.
        typed.send("Cherry".to_string()).unwrap();
        typed.send("3: Cabbage".to_string()).unwrap();

        // Collection: exactly three lines, the gap as an empty line.
        host.send("answers").await.unwrap();
        assert_eq!(host.recv().await.unwrap(), "Cherry");
        assert_eq!(host.recv().await.unwrap(), "");
        assert_eq!(host.recv().await.unwrap(), "Cabbage");

        drop(host);
        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_clean_shutdown_when_host_disconnects() {
        let (client_task, host, _typed) = connection_under_test().await;
        drop(host);
        // run() treats EOF as a clean end, not an error.
        client_task.await.unwrap();
    }
}
