//! Terminal front end for Block Blast.

mod telemetry;
mod terminal;

use anyhow::Result;
use blast_board::Game;
use blast_core::{AppConfig, Error};
use blast_leaderboard::{sanitize_input, LeaderboardClient, LocalHighScores};
use terminal::Command;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize telemetry
    let _telemetry = telemetry::init_telemetry(config.otel_endpoint.as_deref())?;

    info!(
        rules = ?config.game.rules.clear_mode,
        leaderboard = config.leaderboard.is_enabled(),
        "Starting Block Blast"
    );

    let local = LocalHighScores::new(&config.highscore.path);
    let leaderboard = if config.leaderboard.is_enabled() {
        Some(LeaderboardClient::new(config.leaderboard.clone())?)
    } else {
        None
    };

    let mut game = Game::new(config.game.clone())?;
    match local.best().await {
        Ok(best) => game.set_high_score(best),
        Err(e) => warn!("Could not read local high score: {}", e),
    }
    telemetry::record_game_started(game.id());

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", terminal::render(&game));
    print!("{}", terminal::help_text(&game));

    while let Some(line) = input.next_line().await? {
        let command = match terminal::parse_command(&line, &game.config().palette) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        let outcome = match command {
            Command::Quit => break,
            Command::Help => {
                print!("{}", terminal::help_text(&game));
                continue;
            }
            Command::Scores => {
                show_leaderboard(leaderboard.as_ref()).await;
                continue;
            }
            Command::Restart => {
                game.restart();
                telemetry::record_game_started(game.id());
                print!("{}", terminal::render(&game));
                continue;
            }
            Command::Color(color) => game.select_color(color),
            Command::Cell(pos) => game.select_cell(pos),
        };

        match outcome {
            Ok(outcome) if outcome.is_noop() => println!("Nothing to clear there."),
            Ok(outcome) => {
                print!("{}", terminal::render(&game));
                if outcome.game_over {
                    finish_game(
                        game.score(),
                        game.turn(),
                        &local,
                        leaderboard.as_ref(),
                        &mut input,
                    )
                    .await?;
                    println!("Type r to play again or q to quit.");
                }
            }
            Err(Error::GameOver) => println!("The game is over. Type r to play again."),
            Err(e) => println!("{}", e),
        }
    }

    info!("Exiting");
    Ok(())
}

async fn show_leaderboard(client: Option<&LeaderboardClient>) {
    let Some(client) = client else {
        println!("No leaderboard configured (set BLAST_LEADERBOARD_URL).");
        return;
    };

    println!("Loading leaderboard...");
    match client.fetch_top(client.config().limit).await {
        Ok(scores) => print!("{}", terminal::render_leaderboard(&scores)),
        Err(e) => {
            error!("Leaderboard load failed: {}", e);
            println!("Could not load the leaderboard.");
        }
    }
}

/// Leaderboard entry first, so the local record carries the submitted name
async fn finish_game<R>(
    score: u64,
    turns: u32,
    local: &LocalHighScores,
    leaderboard: Option<&LeaderboardClient>,
    input: &mut Lines<R>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("Game over! Final score: {}", score);

    let name = match leaderboard {
        Some(client) => submit_if_qualified(client, score, input).await?,
        None => None,
    };

    let personal_best = match local.record(score, name.as_deref()).await {
        Ok(improved) => improved,
        Err(e) => {
            warn!("Could not save local high score: {}", e);
            false
        }
    };
    if personal_best {
        println!("New personal best!");
    }

    telemetry::record_game_finished(score, turns, personal_best);
    Ok(())
}

/// Returns the name the score was registered under, if any
async fn submit_if_qualified<R>(
    client: &LeaderboardClient,
    score: u64,
    input: &mut Lines<R>,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    show_leaderboard(Some(client)).await;

    if !client.qualifies(score).await {
        return Ok(None);
    }

    loop {
        println!("You made the board! Enter a name (A-Z, 0-9, max 8), blank to skip:");
        let Some(raw) = input.next_line().await? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let name = sanitize_input(&raw);
        println!("Submitting...");
        match client.submit(&name, score).await {
            Ok(name) => {
                println!("Score registered for {}!", name);
                show_leaderboard(Some(client)).await;
                return Ok(Some(name));
            }
            Err(Error::InvalidName(message)) => println!("{}", message),
            Err(e) => {
                error!("Score submission failed: {}", e);
                println!("Could not register the score. Please try again.");
            }
        }
    }
}
