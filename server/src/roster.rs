//! The ordered collection of live player sessions.
//!
//! The roster is written from two logical flows that never overlap: the
//! accept loop inserts during the lobby, and phase fan-outs prune afterwards.
//! The orchestrator wraps it in `Arc<RwLock<..>>` so mutation and iteration
//! stay mutually exclusive.

use crate::session::PlayerSession;
use log::{info, warn};

/// One protocol primitive to fan out across the roster.
///
/// A typed phase selector instead of per-phase callbacks keeps the prune
/// discipline in exactly one place.
#[derive(Clone, Copy)]
pub enum Fanout<'a> {
    Probe,
    Categories(&'a [String]),
    Letter(char),
    Answers,
}

/// Outcome of a single fan-out pass.
#[derive(Debug)]
pub struct FanoutReport {
    /// Display names of sessions pruned during this pass.
    pub pruned: Vec<String>,
    /// Sessions still live after the pass.
    pub remaining: usize,
}

pub struct Roster {
    players: Vec<PlayerSession>,
    lobby_open: bool,
}

impl Roster {
    pub fn new() -> Self {
        Roster {
            players: Vec::new(),
            lobby_open: true,
        }
    }

    /// Inserts a session. Valid only while the lobby is open; a late insert
    /// is rejected, since roster composition is fixed once rounds start.
    pub fn add(&mut self, session: PlayerSession) -> bool {
        if !self.lobby_open {
            warn!(
                "Rejecting session {} ({}): lobby is closed",
                session.id(),
                session.name()
            );
            return false;
        }
        info!("Player {} ({}) joined", session.id(), session.name());
        self.players.push(session);
        true
    }

    /// Closes the lobby; no further sessions can be added.
    pub fn close_lobby(&mut self) {
        self.lobby_open = false;
    }

    /// Applies one primitive to every member in order, in a single pass,
    /// removing members whose primitive returns false. One member's failure
    /// never affects another member's evaluation.
    pub async fn fan_out(&mut self, phase: Fanout<'_>) -> FanoutReport {
        let members = std::mem::take(&mut self.players);
        let mut pruned = Vec::new();

        for mut session in members {
            let ok = match phase {
                Fanout::Probe => session.probe_liveness().await,
                Fanout::Categories(categories) => session.push_categories(categories).await,
                Fanout::Letter(letter) => session.push_letter(letter).await,
                Fanout::Answers => session.collect_answers().await,
            };

            if ok {
                self.players.push(session);
            } else {
                info!("Pruning player {} ({})", session.id(), session.name());
                pruned.push(session.name().to_string());
            }
        }

        FanoutReport {
            pruned,
            remaining: self.players.len(),
        }
    }

    /// Display names of all live sessions, in join order.
    pub fn live_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.id()).collect()
    }

    pub fn sessions(&self) -> &[PlayerSession] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
