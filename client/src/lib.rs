//! # Player Client Library
//!
//! Terminal client for the party word game. The host drives the whole
//! conversation over one persistent newline-delimited text connection; the
//! client's job is to react: confirm liveness probes, display each round's
//! categories and letter (acknowledging both through the receipt
//! handshake), and hand back one answer line per category when the host
//! collects.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Buffers the answers a player types while the countdown runs. Lines fill
//! categories in order, with a `N: text` form for revising earlier slots;
//! whatever is buffered when the host collects is what goes on the wire.
//!
//! ### Network Module (`network`)
//! Owns the connection: the name handshake, the host-command dispatch loop,
//! and the exchanges behind each command.

pub mod input;
pub mod network;
