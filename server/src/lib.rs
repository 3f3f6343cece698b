//! # Game Host Library
//!
//! Server side of the party word game: it synchronizes every connected
//! player through fixed rounds — broadcast categories, broadcast a random
//! letter, run a countdown, collect answers, adjudicate scores, repeat.
//!
//! ## Architecture
//!
//! Each player holds one persistent newline-delimited text connection,
//! owned by a [`session::PlayerSession`]. Every protocol primitive is a
//! synchronous round trip that degrades any failure to a boolean, and the
//! [`roster::Roster`] applies a primitive to every member in a single pass,
//! pruning members that fail without disturbing the rest. The
//! [`orchestrator::RoundOrchestrator`] composes these fan-outs into the
//! round state machine; game state only advances once a whole fan-out has
//! completed, so every live player sees an identical category set and
//! letter per round.
//!
//! Connections are only accepted during the lobby
//! ([`acceptor::ConnectionAcceptor`]); once the operator begins the game
//! the roster is frozen. Player failure handling is prune-and-continue
//! throughout — there are no retries and no reconnects.
//!
//! The binary in `main.rs` is a thin console shell: it renders phase
//! reports and relays operator decisions (begin game, start round, score
//! approvals) into orchestrator calls.

pub mod acceptor;
pub mod categories;
pub mod orchestrator;
pub mod roster;
pub mod scores;
pub mod session;
pub mod timer;
