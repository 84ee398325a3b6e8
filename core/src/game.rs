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

//! Turn sequencing between two boards.
//!
//! [Match] alternates the attacker role by turn-counter parity, pulls a
//! coordinate from the attacker's [DecisionSource], resolves the attack
//! against the defending board and consults the health oracle to decide
//! termination. The match runs strictly one attack at a time; nothing here is
//! concurrent.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{AttackOutcome, Board, CellMark, Grid};
use crate::paillier::CryptoError;
use crate::Coord;

/// Seat number of a player; seat 0 attacks on turn 1.
pub type PlayerId = usize;

#[derive(Debug, Error)]
pub enum MatchError {
    /// [Match::play_turn] was called after the match reached a winner.
    #[error("the match is already finished")]
    Finished,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The attacker's decision source failed to produce a coordinate, e.g.
    /// an interactive prompt losing its terminal.
    #[error("decision source failed")]
    Decision(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where an attacker's coordinates come from: an interactive prompt, an
/// automated strategy, or a script in tests.
pub trait DecisionSource {
    /// Choose the next attack given the defender's guess grid, the only view
    /// of the defending board an attacker is entitled to.
    ///
    /// The returned coordinate must be in bounds. Automated sources must
    /// additionally return only cells still marked [CellMark::Unknown];
    /// interactive sources may return a resolved cell, which wastes the turn.
    fn next_coordinate(&mut self, guesses: &Grid<CellMark>) -> Result<Coord, MatchError>;
}

/// Automated opponent: uniform resampling until an unattacked cell comes up.
pub struct RandomGunner<R> {
    rng: R,
}

impl<R: Rng> RandomGunner<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DecisionSource for RandomGunner<R> {
    fn next_coordinate(&mut self, guesses: &Grid<CellMark>) -> Result<Coord, MatchError> {
        // While a match is in progress the defender always has an unknown
        // cell left: a fully marked grid would mean every ship part was hit,
        // which would have ended the match already.
        loop {
            let coord = Coord {
                row: self.rng.random_range(0..guesses.size()),
                col: self.rng.random_range(0..guesses.size()),
            };
            if guesses[coord] == CellMark::Unknown {
                return Ok(coord);
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MatchState {
    InProgress,
    /// Terminal; a match never leaves this state once entered.
    Finished { winner: PlayerId },
}

/// What happened on one turn, for the presentation layer to narrate.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: u64,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub coord: Coord,
    pub outcome: AttackOutcome,
    /// Defender's surviving ship parts per the health oracle. `None` when
    /// the oracle read was skipped because the turn could not have changed
    /// the aggregate (a miss or a wasted repeat attack).
    pub remaining: Option<u64>,
}

/// A two-player match, owning both boards.
pub struct Match {
    boards: [Board; 2],
    turn: u64,
    state: MatchState,
}

impl Match {
    pub fn new(first: Board, second: Board) -> Self {
        Self {
            boards: [first, second],
            turn: 1,
            state: MatchState::InProgress,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// The seat attacking on the current turn: seat 0 on odd turns.
    pub fn attacker(&self) -> PlayerId {
        if self.turn % 2 == 1 {
            0
        } else {
            1
        }
    }

    pub fn defender(&self) -> PlayerId {
        1 - self.attacker()
    }

    pub fn board(&self, player: PlayerId) -> &Board {
        &self.boards[player]
    }

    /// Play one turn using `source` as the current attacker's decision maker.
    ///
    /// Attacking an already-resolved cell wastes the turn but still advances
    /// the counter. Any primitive failure aborts the match by propagating;
    /// there is no partial recovery.
    pub fn play_turn<R: Rng + ?Sized>(
        &mut self,
        source: &mut dyn DecisionSource,
        rng: &mut R,
    ) -> Result<TurnReport, MatchError> {
        if matches!(self.state, MatchState::Finished { .. }) {
            return Err(MatchError::Finished);
        }

        let attacker = self.attacker();
        let defender = self.defender();
        let coord = source.next_coordinate(self.boards[defender].guesses())?;
        let outcome = self.boards[defender].resolve_attack(coord, rng)?;
        debug!(turn = self.turn, attacker, cell = %coord, ?outcome, "attack resolved");

        // A miss or repeat attack leaves the ciphertext grid untouched, so
        // the previous oracle reading still stands and the read is skipped.
        let remaining = match outcome {
            AttackOutcome::Hit => Some(self.boards[defender].remaining_parts()?),
            AttackOutcome::Miss | AttackOutcome::AlreadyAttacked => None,
        };

        let report = TurnReport {
            turn: self.turn,
            attacker,
            defender,
            coord,
            outcome,
            remaining,
        };

        if remaining == Some(0) {
            self.state = MatchState::Finished { winner: attacker };
            info!(turn = self.turn, winner = attacker, "match finished");
        } else {
            self.turn += 1;
        }
        Ok(report)
    }
}
