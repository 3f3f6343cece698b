//! The round state machine.
//!
//! Drives a game as a sequence of explicit phase methods, each fanning one
//! protocol primitive out across the roster and returning a typed report.
//! The operator shell composes these methods; it holds no game logic of its
//! own. Phases are strictly sequential, so no two fan-out passes ever run
//! concurrently and scoring never begins before every remaining session has
//! answered.

use crate::categories::CategoryPool;
use crate::roster::{Fanout, FanoutReport, Roster};
use crate::scores::ScoreKeeper;
use crate::timer::Countdown;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Game states. `RoundAdvance` is transient: it resolves to `AwaitingStart`
/// or `Complete` within the adjudication call that reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    AwaitingStart,
    Broadcasting,
    Countdown,
    Collecting,
    Scoring,
    RoundAdvance,
    Complete,
}

/// An operation was invoked in a phase that does not permit it.
#[derive(Debug)]
pub struct WrongPhase {
    operation: &'static str,
    phase: Phase,
}

impl fmt::Display for WrongPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot {} during the {:?} phase",
            self.operation, self.phase
        )
    }
}

impl std::error::Error for WrongPhase {}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rounds: u32,
    pub categories_per_round: usize,
    pub countdown_secs: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rounds: shared::ROUNDS_PER_GAME,
            categories_per_round: shared::CATEGORIES_PER_ROUND,
            countdown_secs: shared::COUNTDOWN_SECS,
        }
    }
}

/// One player's line on a scoring sheet.
#[derive(Debug, Clone)]
pub struct ScoringRow {
    pub player_id: u32,
    pub name: String,
    pub answer: String,
    /// An empty answer is never selectable for credit.
    pub creditable: bool,
}

/// Everything the operator needs to adjudicate one category.
#[derive(Debug, Clone)]
pub struct CategorySheet {
    /// Zero-based category index within the round.
    pub index: usize,
    /// Total categories in the round.
    pub total: usize,
    pub category: String,
    pub rows: Vec<ScoringRow>,
}

/// Per-round state, created when categories go out and discarded once the
/// round is scored.
struct RoundState {
    categories: Vec<String>,
    letter: Option<char>,
}

pub struct RoundOrchestrator {
    roster: Arc<RwLock<Roster>>,
    pool: CategoryPool,
    scores: ScoreKeeper,
    config: GameConfig,
    rng: StdRng,
    phase: Phase,
    round_index: u32,
    round: Option<RoundState>,
    current_category: usize,
}

impl RoundOrchestrator {
    pub fn new(roster: Arc<RwLock<Roster>>, pool: CategoryPool, config: GameConfig) -> Self {
        Self::with_rng(roster, pool, config, StdRng::from_entropy())
    }

    /// Constructor taking an explicit RNG so tests can seed the category
    /// sampling and letter draw.
    pub fn with_rng(
        roster: Arc<RwLock<Roster>>,
        pool: CategoryPool,
        config: GameConfig,
        rng: StdRng,
    ) -> Self {
        RoundOrchestrator {
            roster,
            pool,
            scores: ScoreKeeper::new(),
            config,
            rng,
            phase: Phase::Lobby,
            round_index: 0,
            round: None,
            current_category: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Zero-based index of the current round.
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scores(&self) -> &ScoreKeeper {
        &self.scores
    }

    pub async fn live_names(&self) -> Vec<String> {
        self.roster.read().await.live_names()
    }

    /// Lobby → AwaitingStart. Freezes the roster, prunes every session that
    /// fails a liveness probe, and zeroes the survivors' scores.
    pub async fn begin_game(&mut self) -> Result<FanoutReport, WrongPhase> {
        self.ensure_phase(Phase::Lobby, "begin the game")?;

        let mut roster = self.roster.write().await;
        roster.close_lobby();
        let report = roster.fan_out(Fanout::Probe).await;
        self.scores.reset(&roster.ids());
        drop(roster);

        self.round_index = 0;
        self.phase = Phase::AwaitingStart;
        info!(
            "Game started with {} player(s), {} round(s)",
            report.remaining, self.config.rounds
        );
        Ok(report)
    }

    /// AwaitingStart → Broadcasting. Samples this round's categories and
    /// fans them out, pruning failures.
    pub async fn broadcast_categories(&mut self) -> Result<FanoutReport, WrongPhase> {
        self.ensure_phase(Phase::AwaitingStart, "broadcast categories")?;

        let categories = self
            .pool
            .sample(&mut self.rng, self.config.categories_per_round);
        let report = self
            .roster
            .write()
            .await
            .fan_out(Fanout::Categories(&categories))
            .await;

        info!(
            "Round {}: {} categories sent to {} player(s)",
            self.round_index + 1,
            categories.len(),
            report.remaining
        );
        self.round = Some(RoundState {
            categories,
            letter: None,
        });
        self.phase = Phase::Broadcasting;
        Ok(report)
    }

    /// Broadcasting → Countdown. Draws the round letter uniformly and fans
    /// it out with the same prune discipline.
    pub async fn start_round(&mut self) -> Result<(char, FanoutReport), WrongPhase> {
        self.ensure_phase(Phase::Broadcasting, "start the round")?;

        let letter = draw_letter(&mut self.rng);
        let report = self
            .roster
            .write()
            .await
            .fan_out(Fanout::Letter(letter))
            .await;

        info!(
            "Round {}: letter {} sent to {} player(s)",
            self.round_index + 1,
            letter,
            report.remaining
        );
        if let Some(round) = &mut self.round {
            round.letter = Some(letter);
        }
        self.phase = Phase::Countdown;
        Ok((letter, report))
    }

    /// Countdown → Collecting, unconditionally on expiry. `on_tick` receives
    /// the remaining seconds after every tick; display is the caller's
    /// business. The countdown cannot be cut short.
    pub async fn run_countdown<F: FnMut(u32)>(&mut self, mut on_tick: F) -> Result<(), WrongPhase> {
        self.ensure_phase(Phase::Countdown, "run the countdown")?;

        let mut countdown = Countdown::new(self.config.countdown_secs);
        while let Some(remaining) = countdown.tick().await {
            on_tick(remaining);
        }
        self.phase = Phase::Collecting;
        Ok(())
    }

    /// Collecting → Scoring. Fans out the answer collection; every surviving
    /// session has a full answer list once this returns.
    pub async fn collect_answers(&mut self) -> Result<FanoutReport, WrongPhase> {
        self.ensure_phase(Phase::Collecting, "collect answers")?;

        let report = self.roster.write().await.fan_out(Fanout::Answers).await;
        info!(
            "Round {}: answers collected from {} player(s)",
            self.round_index + 1,
            report.remaining
        );

        self.current_category = 0;
        let total = self.round.as_ref().map_or(0, |r| r.categories.len());
        if total == 0 {
            // Nothing to adjudicate (an empty pool); the round is over.
            self.advance_round();
        } else {
            self.phase = Phase::Scoring;
        }
        Ok(report)
    }

    /// The sheet for the category currently under adjudication: one row per
    /// live player, empty answers marked non-creditable.
    pub async fn scoring_sheet(&self) -> Result<CategorySheet, WrongPhase> {
        self.ensure_phase(Phase::Scoring, "read the scoring sheet")?;

        let round = self.round.as_ref().ok_or(WrongPhase {
            operation: "read the scoring sheet",
            phase: self.phase,
        })?;
        let category = round
            .categories
            .get(self.current_category)
            .ok_or(WrongPhase {
                operation: "read the scoring sheet",
                phase: self.phase,
            })?
            .clone();

        let roster = self.roster.read().await;
        let rows = roster
            .sessions()
            .iter()
            .map(|session| {
                let answer = session
                    .answer(self.current_category)
                    .unwrap_or_default()
                    .to_string();
                ScoringRow {
                    player_id: session.id(),
                    name: session.name().to_string(),
                    creditable: !answer.is_empty(),
                    answer,
                }
            })
            .collect();

        Ok(CategorySheet {
            index: self.current_category,
            total: round.categories.len(),
            category,
            rows,
        })
    }

    /// Credits each approved player exactly one point for the current
    /// category, then advances to the next category — or, after the last
    /// one, to the next round or game completion. Approvals for empty
    /// answers are dropped; they are never creditable.
    pub async fn apply_scores(&mut self, approved: &[u32]) -> Result<Phase, WrongPhase> {
        self.ensure_phase(Phase::Scoring, "adjudicate scores")?;

        {
            let roster = self.roster.read().await;
            for session in roster.sessions() {
                if !approved.contains(&session.id()) {
                    continue;
                }
                let creditable = session
                    .answer(self.current_category)
                    .map_or(false, |a| !a.is_empty());
                if creditable {
                    self.scores.credit(session.id());
                } else {
                    warn!(
                        "Ignoring approval for {} ({}): empty answer",
                        session.id(),
                        session.name()
                    );
                }
            }
        }

        self.current_category += 1;
        let total = self.round.as_ref().map_or(0, |r| r.categories.len());
        if self.current_category >= total {
            self.advance_round();
        }
        Ok(self.phase)
    }

    /// Final name → score table, in join order. Complete phase only.
    pub async fn final_scores(&self) -> Result<Vec<(String, u32)>, WrongPhase> {
        self.ensure_phase(Phase::Complete, "read the final scores")?;

        let roster = self.roster.read().await;
        Ok(roster
            .sessions()
            .iter()
            .map(|session| (session.name().to_string(), self.scores.get(session.id())))
            .collect())
    }

    fn advance_round(&mut self) {
        self.phase = Phase::RoundAdvance;
        self.round = None;
        if self.round_index + 1 < self.config.rounds {
            self.round_index += 1;
            info!("Advancing to round {}", self.round_index + 1);
            self.phase = Phase::AwaitingStart;
        } else {
            info!("All {} round(s) complete", self.config.rounds);
            self.phase = Phase::Complete;
        }
    }

    fn ensure_phase(&self, expected: Phase, operation: &'static str) -> Result<(), WrongPhase> {
        if self.phase == expected {
            Ok(())
        } else {
            warn!("Refusing to {}: game is in {:?}", operation, self.phase);
            Err(WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }
}

/// Uniform draw over the 26 uppercase letters.
fn draw_letter<R: Rng>(rng: &mut R) -> char {
    char::from(b'A' + rng.gen_range(0..26u8))
}
