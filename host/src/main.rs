// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interactive homomorphic battleship: you against an automated opponent.
//!
//! Both boards are encrypted cell by cell under their owner's Paillier key
//! before the first shot. Hits are applied to the encrypted board with
//! ciphertext addition, and after every hit a referee-style health check
//! decrypts only the homomorphic sum of the defender's grid.

mod render;

use std::thread;
use std::time::Duration;

use anyhow::Context;
use cipherfleet_core::paillier::DEFAULT_KEY_BITS;
use cipherfleet_core::{
    AttackOutcome, Board, CellMark, Coord, DecisionSource, Grid, Match, MatchError, MatchState,
    RandomGunner, BOARD_SIZE, SHIP_SIZES,
};
use inquire::Text;
use regex::Regex;

const YOU: usize = 0;
const OPPONENT_NAME: &str = "Bob";

fn main() -> anyhow::Result<()> {
    // Initialize tracing. In order to view logs, run `RUST_LOG=info cargo run`
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    println!("=============================================");
    println!("          HOMOMORPHIC BATTLESHIP");
    println!("=============================================\n");

    let mut rng = rand::rng();

    println!("[You] Generating a Paillier key pair and encrypting your board...");
    let your_board = Board::new(BOARD_SIZE, &SHIP_SIZES, DEFAULT_KEY_BITS, &mut rng)
        .context("setting up your board")?;
    println!("[{OPPONENT_NAME}] Generating a Paillier key pair and encrypting their board...");
    let their_board = Board::new(BOARD_SIZE, &SHIP_SIZES, DEFAULT_KEY_BITS, &mut rng)
        .context("setting up the opponent's board")?;

    let mut game = Match::new(your_board, their_board);
    let mut you = HumanGunner::new()?;
    let mut opponent = RandomGunner::new(rand::rng());

    loop {
        let attacker = game.attacker();
        let defender = game.defender();
        let (attacker_name, defender_name) = if attacker == YOU {
            ("You", OPPONENT_NAME)
        } else {
            (OPPONENT_NAME, "You")
        };
        println!(
            "\n=== TURN {}: {} attack{} {} ===",
            game.turn(),
            attacker_name,
            if attacker == YOU { "" } else { "s" },
            defender_name,
        );
        render::render_guesses(
            &format!("{defender_name}: board status"),
            game.board(defender).guesses(),
        );

        let report = if attacker == YOU {
            game.play_turn(&mut you, &mut rng)?
        } else {
            let report = game.play_turn(&mut opponent, &mut rng)?;
            println!("{OPPONENT_NAME} fires at {}", report.coord);
            // Small delay so the exchange stays readable.
            thread::sleep(Duration::from_secs(1));
            report
        };

        match report.outcome {
            AttackOutcome::Hit => {
                println!("*** {attacker_name} scored a HIT at {}! ***", report.coord);
                println!(
                    "    (Updating encrypted cell {} via homomorphic addition...)",
                    report.coord
                );
            }
            AttackOutcome::Miss => println!("--- {attacker_name} missed at {}. ---", report.coord),
            AttackOutcome::AlreadyAttacked => {
                println!("Position {} already attacked! Wasted turn.", report.coord)
            }
        }

        if let Some(remaining) = report.remaining {
            println!("    [Referee] Verifying {defender_name}'s remaining life securely...");
            println!("    [Referee decrypts] {remaining} ship part(s) remaining.");
        }

        if let MatchState::Finished { winner } = game.state() {
            println!(
                "\nGAME OVER! {} win{}!",
                if winner == YOU { "You" } else { OPPONENT_NAME },
                if winner == YOU { "" } else { "s" },
            );
            return Ok(());
        }
    }
}

/// Interactive decision source: prompts for coordinates like "B7".
struct HumanGunner {
    coord_regex: Regex,
}

impl HumanGunner {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            coord_regex: Regex::new(r"^([A-Za-z])\s*([0-9]{1,2})$")?,
        })
    }
}

impl DecisionSource for HumanGunner {
    fn next_coordinate(&mut self, guesses: &Grid<CellMark>) -> Result<Coord, MatchError> {
        let size = guesses.size();
        loop {
            let input = Text::new("Enter coordinates (e.g. B7):")
                .prompt()
                .map_err(|err| MatchError::Decision(Box::new(err)))?;

            if let Some(captures) = self.coord_regex.captures(input.trim()) {
                let row_char = captures[1].chars().next().expect("regex matched a letter");
                let row = (row_char.to_ascii_uppercase() as u8 - b'A') as usize;
                let col_number: usize = captures[2].parse().expect("regex matched a number");

                if col_number >= 1 {
                    let coord = Coord {
                        row,
                        col: col_number - 1,
                    };
                    if coord.in_bounds(size) {
                        return Ok(coord);
                    }
                }
            }

            println!(
                "Invalid coordinates! Use a row letter A-{} and a column number 1-{}.",
                (b'A' + size as u8 - 1) as char,
                size,
            );
        }
    }
}
