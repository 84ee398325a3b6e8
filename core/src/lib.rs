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

//! Battleship played over an encrypted board.
//!
//! Each player's board lives in two forms: a plaintext shadow used for local
//! hit/miss logic, and a grid of Paillier ciphertexts that stands in as the
//! externally visible game state. Hits are applied to the ciphertext grid by
//! homomorphic addition of an encrypted `-1`, so no individual cell is ever
//! decrypted. Win checks decrypt only the homomorphic sum of the whole grid,
//! revealing the number of surviving ship parts and nothing about where they
//! are.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub mod board;
pub mod game;
pub mod oracle;
pub mod paillier;
pub mod placement;

pub use board::{AttackOutcome, Board, CellMark, Grid, SetupError};
pub use game::{DecisionSource, Match, MatchError, MatchState, RandomGunner, TurnReport};
pub use paillier::{Ciphertext, CryptoError, PrivateKey, PublicKey};
pub use placement::PlacementError;

/// Side length of the default square board.
pub const BOARD_SIZE: usize = 10;

/// Ship lengths placed on each board in the default configuration.
pub const SHIP_SIZES: [usize; 5] = [5, 4, 3, 2, 2];

/// A cell address on a board, row-major from the top-left corner.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Check that the [Coord] is within the bounds of a `size` by `size` board.
    #[must_use]
    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }
}

impl From<(usize, usize)> for Coord {
    fn from(value: (usize, usize)) -> Self {
        Self {
            row: value.0,
            col: value.1,
        }
    }
}

impl Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Rows render as letters and columns as 1-based numbers, "B7" style.
        let row_char = (b'A' + (self.row as u8 % 26)) as char;
        write!(f, "{}{}", row_char, self.col + 1)
    }
}
