//! Per-player protocol session.
//!
//! Each session owns one connection and exposes the four protocol primitives
//! as sequential request/acknowledge exchanges. Primitives on one session are
//! never invoked concurrently, and every failure mode — I/O error, end of
//! stream, an expired read deadline, a mismatched reply token — degrades to a
//! plain `false`. Nothing crosses the session boundary as an error; the
//! orchestrator decides what to do with a failed session (it prunes it).

use log::debug;
use shared::{TextStream, MSG_ALIVE, MSG_ANSWERS, MSG_CATEGORIES, MSG_LETTER, MSG_RECEIVED, MSG_YES};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// A connected player and their per-round answer state.
pub struct PlayerSession {
    id: u32,
    name: String,
    conn: TextStream,
    /// Answer arity recorded by the last successful category broadcast.
    expected_answers: usize,
    answers: Vec<String>,
    read_deadline: Duration,
}

impl PlayerSession {
    /// Completes the connection handshake: the first line a new peer sends
    /// is its display name. The name is set once and never re-validated.
    pub async fn accept(
        stream: TcpStream,
        id: u32,
        read_deadline: Duration,
    ) -> io::Result<Self> {
        let mut conn = TextStream::new(stream);
        let name = conn.recv_deadline(read_deadline).await?;
        Ok(PlayerSession {
            id,
            name,
            conn,
            expected_answers: 0,
            answers: Vec::new(),
            read_deadline,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The answer collected for the given category index this round.
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    /// Sends `alive?` and reads one line; true iff the reply is `yes`.
    pub async fn probe_liveness(&mut self) -> bool {
        self.query(MSG_ALIVE).await
    }

    /// Broadcasts the round's categories: header, count, then each category
    /// on its own line, followed by the receipt handshake. On success the
    /// count is recorded as the expected per-round answer arity.
    pub async fn push_categories(&mut self, categories: &[String]) -> bool {
        if self.conn.send(MSG_CATEGORIES).await.is_err() {
            return false;
        }
        if self.conn.send(&categories.len().to_string()).await.is_err() {
            return false;
        }
        for category in categories {
            if self.conn.send(category).await.is_err() {
                return false;
            }
        }
        if !self.query(MSG_RECEIVED).await {
            return false;
        }
        self.expected_answers = categories.len();
        true
    }

    /// Broadcasts the round letter, followed by the receipt handshake.
    pub async fn push_letter(&mut self, letter: char) -> bool {
        if self.conn.send(MSG_LETTER).await.is_err() {
            return false;
        }
        if self.conn.send(&letter.to_string()).await.is_err() {
            return false;
        }
        self.query(MSG_RECEIVED).await
    }

    /// Requests the round's answers and reads exactly as many lines as the
    /// recorded category count, verbatim. An empty line is a valid "no
    /// answer"; a premature end of stream fails the whole collection. No
    /// handshake follows.
    pub async fn collect_answers(&mut self) -> bool {
        if self.conn.send(MSG_ANSWERS).await.is_err() {
            return false;
        }
        let mut collected = Vec::with_capacity(self.expected_answers);
        for index in 0..self.expected_answers {
            match self.conn.recv_deadline(self.read_deadline).await {
                Ok(answer) => collected.push(answer),
                Err(e) => {
                    debug!(
                        "Session {} ({}) failed on answer {}/{}: {}",
                        self.id, self.name, index + 1, self.expected_answers, e
                    );
                    return false;
                }
            }
        }
        self.answers = collected;
        true
    }

    /// One query round trip: send the token, read one line, require `yes`.
    ///
    /// The receipt handshake goes through here too — the host explicitly
    /// asks `received?` after a broadcast payload instead of letting the
    /// peer ack unprompted. Existing clients expect that exact exchange.
    async fn query(&mut self, token: &str) -> bool {
        if self.conn.send(token).await.is_err() {
            return false;
        }
        match self.conn.recv_deadline(self.read_deadline).await {
            Ok(reply) => {
                if reply == MSG_YES {
                    true
                } else {
                    debug!(
                        "Session {} ({}) replied {:?} to {:?}",
                        self.id, self.name, reply, token
                    );
                    false
                }
            }
            Err(e) => {
                debug!("Session {} ({}) query {:?} failed: {}", self.id, self.name, token, e);
                false
            }
        }
    }
}
