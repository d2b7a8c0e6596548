//! Divide Teams CLI Tool
//!
//! Balances a roster file into three teams without running the service.
//!
//! Usage:
//!   cargo run --bin divide-teams -- --roster roster.json
//!   cargo run --bin divide-teams -- --roster roster.json --json
//!
//! The roster file is either `{ "players": [...] }` or a bare array of
//! `{ "id", "username"?, "skill_level" }` entries.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use soccer_booking::teams::{balance, RosterPayload};
use soccer_booking::types::{team_skill_sum, BalancedTeams};
use soccer_booking::BookingError;

#[derive(Parser)]
#[command(name = "divide-teams")]
#[command(about = "Divide an 18-player roster into three skill-balanced teams")]
struct Cli {
    /// Roster file (JSON)
    #[arg(short, long, value_name = "FILE")]
    roster: PathBuf,

    /// Print the teams as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn print_table(teams: &BalancedTeams) {
    for (index, team) in teams.teams().iter().enumerate() {
        println!(
            "Team {} (total skill {}, {} players)",
            index + 1,
            team_skill_sum(team),
            team.len()
        );
        for player in team.iter() {
            println!(
                "  {:>4}  {:<24} {:>3}",
                player.id, player.username, player.skill_level
            );
        }
        println!();
    }
    println!("Skill spread: {}", teams.skill_spread());
}

fn run(cli: &Cli) -> Result<BalancedTeams> {
    let contents = std::fs::read_to_string(&cli.roster)
        .with_context(|| format!("Failed to read roster file {}", cli.roster.display()))?;
    let roster = RosterPayload::parse(&contents)?;
    Ok(balance(roster.players())?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(teams) => {
            if cli.json {
                match serde_json::to_string_pretty(&teams) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to encode teams: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_table(&teams);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<BookingError>() {
                Some(roster_error @ BookingError::InvalidRosterSize { .. }) => {
                    eprintln!("{}", roster_error)
                }
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
