//! Console operator shell for the game host.
//!
//! All game logic lives in the library; this binary renders phase reports
//! and relays the operator's decisions — begin the game, start each round,
//! approve answers — into orchestrator calls.

use clap::Parser;
use log::warn;
use server::acceptor::ConnectionAcceptor;
use server::categories::CategoryPool;
use server::orchestrator::{CategorySheet, GameConfig, Phase, RoundOrchestrator};
use server::roster::{FanoutReport, Roster};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch, RwLock};

/// Category list bundled with the binary, used unless one is given on the
/// command line.
const DEFAULT_CATEGORIES: &str = include_str!("../categories.txt");

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind the listener to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,

    /// Number of rounds per game
    #[arg(short, long, default_value_t = shared::ROUNDS_PER_GAME)]
    rounds: u32,

    /// Categories broadcast per round (clamped to the pool size)
    #[arg(short, long, default_value_t = shared::CATEGORIES_PER_ROUND)]
    categories: usize,

    /// Countdown length in seconds
    #[arg(long, default_value_t = shared::COUNTDOWN_SECS)]
    countdown_secs: u32,

    /// Per-read deadline in seconds; a player that stays silent this long
    /// during an exchange is dropped from the game
    #[arg(long, default_value_t = shared::READ_TIMEOUT_SECS)]
    read_timeout_secs: u64,

    /// Newline-delimited category list to use instead of the bundled one
    #[arg(long)]
    categories_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let pool = match &args.categories_file {
        Some(path) => CategoryPool::parse(&tokio::fs::read_to_string(path).await?),
        None => CategoryPool::parse(DEFAULT_CATEGORIES),
    };
    if pool.is_empty() {
        warn!("Category pool is empty; rounds will have no categories");
    }

    let mut operator = BufReader::new(tokio::io::stdin()).lines();
    let read_deadline = Duration::from_secs(args.read_timeout_secs);

    // Bind failure is fatal to starting a game; give the operator a
    // retry/abort path instead of dying outright.
    let address = format!("{}:{}", args.host, args.port);
    let acceptor = loop {
        match ConnectionAcceptor::bind(&address, read_deadline).await {
            Ok(acceptor) => break acceptor,
            Err(e) => {
                println!("Couldn't establish a server on {}: {}", address, e);
                println!("Press Enter to retry, or type 'quit' to abort.");
                match operator.next_line().await? {
                    Some(line) if line.trim() == "quit" => return Ok(()),
                    Some(_) => continue,
                    None => return Ok(()),
                }
            }
        }
    };

    let roster = Arc::new(RwLock::new(Roster::new()));
    let (joined_tx, mut joined_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let accept_handle = tokio::spawn(acceptor.run(Arc::clone(&roster), joined_tx, shutdown_rx));

    println!("Waiting for players to connect on {}...", address);
    println!("Press Enter to begin the game once everyone has joined.");
    loop {
        tokio::select! {
            Some(name) = joined_rx.recv() => {
                let names = roster.read().await.live_names();
                println!("{} connected. Players: {}", name, names.join(", "));
            }
            line = operator.next_line() => {
                if line?.is_none() {
                    println!("Input closed, exiting.");
                    return Ok(());
                }
                break;
            }
        }
    }

    // Stop the lobby; no joins are possible once rounds start.
    shutdown_tx.send(true)?;
    accept_handle.await?;

    let config = GameConfig {
        rounds: args.rounds,
        categories_per_round: args.categories,
        countdown_secs: args.countdown_secs,
    };
    let mut orchestrator = RoundOrchestrator::new(Arc::clone(&roster), pool, config);

    let report = orchestrator.begin_game().await?;
    announce_pruned(&report);
    println!(
        "Starting game with: {}",
        orchestrator.live_names().await.join(", ")
    );

    loop {
        match orchestrator.phase() {
            Phase::AwaitingStart => {
                println!();
                println!(
                    "--- Round {} of {} ---",
                    orchestrator.round_index() + 1,
                    orchestrator.config().rounds
                );
                let report = orchestrator.broadcast_categories().await?;
                announce_pruned(&report);
                println!("Categories sent to {} player(s).", report.remaining);
            }

            Phase::Broadcasting => {
                println!("Press Enter to reveal the letter and start the countdown.");
                if operator.next_line().await?.is_none() {
                    println!("Input closed, exiting.");
                    return Ok(());
                }
                let (letter, report) = orchestrator.start_round().await?;
                announce_pruned(&report);
                println!("The letter is: {}", letter);
            }

            Phase::Countdown => {
                orchestrator
                    .run_countdown(|remaining| {
                        print!("\r{:>3}s ", remaining);
                        let _ = std::io::stdout().flush();
                    })
                    .await?;
                println!();
                println!("Time's up!");
            }

            Phase::Collecting => {
                let report = orchestrator.collect_answers().await?;
                announce_pruned(&report);
            }

            Phase::Scoring => {
                let sheet = orchestrator.scoring_sheet().await?;
                if sheet.rows.is_empty() {
                    println!(
                        "#{} - {}: no players left to score.",
                        sheet.index + 1,
                        sheet.category
                    );
                    orchestrator.apply_scores(&[]).await?;
                    continue;
                }

                print_sheet(&sheet);
                println!("Enter the row numbers to credit (e.g. '1 3'), or leave blank:");
                let line = match operator.next_line().await? {
                    Some(line) => line,
                    None => {
                        println!("Input closed, exiting.");
                        return Ok(());
                    }
                };
                let approved = parse_approvals(&line, &sheet);
                orchestrator.apply_scores(&approved).await?;
            }

            Phase::Complete => {
                println!();
                println!("=== Final scores ===");
                for (name, score) in orchestrator.final_scores().await? {
                    println!("{}: {}", name, score);
                }
                return Ok(());
            }

            phase => {
                // Lobby is behind us and RoundAdvance resolves internally.
                warn!("Unexpected phase {:?} in the shell loop", phase);
                return Ok(());
            }
        }
    }
}

fn announce_pruned(report: &FanoutReport) {
    for name in &report.pruned {
        println!("{} dropped from the game.", name);
    }
}

fn print_sheet(sheet: &CategorySheet) {
    println!();
    println!(
        "#{}/{} - {}",
        sheet.index + 1,
        sheet.total,
        sheet.category
    );
    for (row_number, row) in sheet.rows.iter().enumerate() {
        let shown = if row.creditable {
            row.answer.as_str()
        } else {
            "<no answer>"
        };
        println!("  {}. {} - {}", row_number + 1, row.name, shown);
    }
}

/// Maps operator-entered row numbers to creditable player ids. Malformed
/// and out-of-range entries are reported and skipped.
fn parse_approvals(line: &str, sheet: &CategorySheet) -> Vec<u32> {
    let mut approved = Vec::new();
    for token in line.split_whitespace() {
        match token.parse::<usize>() {
            Ok(number) if number >= 1 && number <= sheet.rows.len() => {
                let row = &sheet.rows[number - 1];
                if row.creditable {
                    if !approved.contains(&row.player_id) {
                        approved.push(row.player_id);
                    }
                } else {
                    println!("Row {} has no answer and cannot be credited.", number);
                }
            }
            _ => println!("Ignoring '{}': not a row number on this sheet.", token),
        }
    }
    approved
}
