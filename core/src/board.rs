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

//! A single player's dual-representation board.
//!
//! [Board] owns a plaintext shadow of ship occupancy, the ciphertext grid that
//! acts as the externally visible game state, and the guess grid the opponent
//! sees. Every mutation goes through [Board::resolve_attack], which keeps the
//! shadow and ciphertext grids in lockstep: after any sequence of attacks,
//! decrypting a ciphertext cell yields exactly the shadow value.

use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::paillier::{self, Ciphertext, CryptoError, PrivateKey, PublicKey};
use crate::placement::{self, PlacementError};
use crate::Coord;

/// Row-major square grid storage shared by all three board representations.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }
}

impl<T> Grid<T> {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// All coordinates of the grid in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord { row, col }))
    }

    fn offset(&self, coord: Coord) -> usize {
        assert!(
            coord.in_bounds(self.size),
            "coordinate {coord} is outside the {size}x{size} board",
            size = self.size
        );
        coord.row * self.size + coord.col
    }
}

impl<T> Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, coord: Coord) -> &T {
        &self.cells[self.offset(coord)]
    }
}

impl<T> IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, coord: Coord) -> &mut T {
        let offset = self.offset(coord);
        &mut self.cells[offset]
    }
}

/// Opponent-visible record of one cell's attack history.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Hash)]
pub enum CellMark {
    Unknown,
    Hit,
    Miss,
}

/// Result of resolving one attack against a board.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Hash)]
pub enum AttackOutcome {
    /// The cell was already resolved; nothing changed.
    AlreadyAttacked,
    Hit,
    Miss,
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// One player's board with its key pair.
///
/// Constructed fully armed: keys generated, fleet placed, and every cell
/// encrypted before the first attack can be resolved.
pub struct Board {
    size: usize,
    /// Plaintext occupancy, authoritative for hit/miss decisions. Never
    /// exposed outside the owning player.
    pub(crate) shadow: Grid<u8>,
    /// Encryption of `shadow` under `public_key`, cell for cell.
    pub(crate) cipher: Grid<Ciphertext>,
    guesses: Grid<CellMark>,
    public_key: PublicKey,
    pub(crate) private_key: PrivateKey,
}

impl Board {
    /// Create a board with a fresh key pair and a random fleet placement.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        ship_sizes: &[usize],
        key_bits: u64,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let shadow = placement::generate_placement(size, ship_sizes, rng)?;
        Ok(Self::from_placement(shadow, key_bits, rng)?)
    }

    /// Create a board from an explicit occupancy grid. This is the seam
    /// between the placement generator and the encrypted board, and the entry
    /// point for scripted games.
    pub fn from_placement<R: Rng + ?Sized>(
        shadow: Grid<u8>,
        key_bits: u64,
        rng: &mut R,
    ) -> Result<Self, CryptoError> {
        assert!(
            shadow.iter().all(|&cell| cell <= 1),
            "occupancy grid must hold only bits"
        );

        let size = shadow.size();
        let (public_key, private_key) = paillier::generate_keypair(rng, key_bits)?;

        // Eager full-grid encryption; from here on the ciphertext grid is
        // only ever touched by apply_hit.
        let cells = shadow
            .iter()
            .map(|&bit| public_key.encrypt(i64::from(bit), rng))
            .collect::<Result<Vec<_>, _>>()?;
        let cipher = Grid { size, cells };

        info!(size, "board encrypted and ready");
        Ok(Self {
            size,
            shadow,
            cipher,
            guesses: Grid::filled(size, CellMark::Unknown),
            public_key,
            private_key,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The attack history the opponent is allowed to see.
    pub fn guesses(&self) -> &Grid<CellMark> {
        &self.guesses
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Resolve one attack against this board.
    ///
    /// An already-resolved cell is reported as [AttackOutcome::AlreadyAttacked]
    /// and mutates nothing. A hit updates the shadow and ciphertext grids
    /// together; a miss only marks the guess grid. The coordinate must be in
    /// bounds; callers validate input before it reaches the board.
    pub fn resolve_attack<R: Rng + ?Sized>(
        &mut self,
        coord: Coord,
        rng: &mut R,
    ) -> Result<AttackOutcome, CryptoError> {
        if self.guesses[coord] != CellMark::Unknown {
            return Ok(AttackOutcome::AlreadyAttacked);
        }

        if self.shadow[coord] == 1 {
            self.apply_hit(coord, rng)?;
            self.mark_guess(coord, CellMark::Hit);
            Ok(AttackOutcome::Hit)
        } else {
            self.mark_guess(coord, CellMark::Miss);
            Ok(AttackOutcome::Miss)
        }
    }

    /// Turn an occupied cell into an empty one in both representations.
    ///
    /// The ciphertext cell is never decrypted: it is replaced by the
    /// homomorphic sum of itself and a fresh encryption of `-1`, taking
    /// Enc(1) to Enc(0). Both grids are assigned only after the ciphertext
    /// algebra has succeeded, so a primitive failure leaves the board
    /// untouched.
    fn apply_hit<R: Rng + ?Sized>(&mut self, coord: Coord, rng: &mut R) -> Result<(), CryptoError> {
        assert_eq!(self.shadow[coord], 1, "apply_hit on empty cell {coord}");

        let minus_one = self.public_key.encrypt(-1, rng)?;
        let decremented = self.public_key.add(&self.cipher[coord], &minus_one)?;

        self.cipher[coord] = decremented;
        self.shadow[coord] = 0;
        debug!(cell = %coord, "homomorphic decrement applied");
        Ok(())
    }

    fn mark_guess(&mut self, coord: Coord, mark: CellMark) {
        assert_eq!(
            self.guesses[coord],
            CellMark::Unknown,
            "cell {coord} is already marked"
        );
        self.guesses[coord] = mark;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    pub(crate) const TEST_KEY_BITS: u64 = 256;

    /// 4x4 board with a single horizontal ship of length 2 at A1-A2.
    pub(crate) fn two_part_board(seed: u64) -> Board {
        let mut grid = Grid::filled(4, 0u8);
        grid[Coord { row: 0, col: 0 }] = 1;
        grid[Coord { row: 0, col: 1 }] = 1;
        let mut rng = StdRng::seed_from_u64(seed);
        Board::from_placement(grid, TEST_KEY_BITS, &mut rng).unwrap()
    }

    fn assert_grids_consistent(board: &Board) {
        for coord in board.shadow.coords() {
            let decrypted = board.private_key.decrypt(&board.cipher[coord]).unwrap();
            assert_eq!(
                decrypted,
                i64::from(board.shadow[coord]),
                "cipher and shadow disagree at {coord}"
            );
        }
    }

    #[test]
    fn encryption_matches_shadow_at_setup() {
        let board = two_part_board(10);
        assert_grids_consistent(&board);
    }

    #[test]
    fn hit_keeps_grids_consistent() {
        let mut board = two_part_board(11);
        let mut rng = StdRng::seed_from_u64(200);

        let outcome = board
            .resolve_attack(Coord { row: 0, col: 0 }, &mut rng)
            .unwrap();
        assert_eq!(outcome, AttackOutcome::Hit);
        assert_eq!(board.guesses()[Coord { row: 0, col: 0 }], CellMark::Hit);
        assert_grids_consistent(&board);
    }

    #[test]
    fn hit_cell_decrypts_to_zero() {
        let mut board = two_part_board(12);
        let mut rng = StdRng::seed_from_u64(201);
        let coord = Coord { row: 0, col: 1 };

        board.resolve_attack(coord, &mut rng).unwrap();
        assert_eq!(board.private_key.decrypt(&board.cipher[coord]).unwrap(), 0);
    }

    #[test]
    fn miss_marks_guess_only() {
        let mut board = two_part_board(13);
        let mut rng = StdRng::seed_from_u64(202);
        let coord = Coord { row: 3, col: 3 };

        let outcome = board.resolve_attack(coord, &mut rng).unwrap();
        assert_eq!(outcome, AttackOutcome::Miss);
        assert_eq!(board.guesses()[coord], CellMark::Miss);
        assert_grids_consistent(&board);
    }

    #[test]
    fn repeat_attack_is_a_no_op() {
        let mut board = two_part_board(14);
        let mut rng = StdRng::seed_from_u64(203);
        let coord = Coord { row: 0, col: 0 };

        assert_eq!(
            board.resolve_attack(coord, &mut rng).unwrap(),
            AttackOutcome::Hit
        );
        let cipher_before = board.cipher[coord].clone();
        assert_eq!(
            board.resolve_attack(coord, &mut rng).unwrap(),
            AttackOutcome::AlreadyAttacked
        );
        assert_eq!(board.cipher[coord], cipher_before);
        assert_eq!(board.guesses()[coord], CellMark::Hit);

        // Misses are no different.
        let empty = Coord { row: 2, col: 2 };
        assert_eq!(
            board.resolve_attack(empty, &mut rng).unwrap(),
            AttackOutcome::Miss
        );
        assert_eq!(
            board.resolve_attack(empty, &mut rng).unwrap(),
            AttackOutcome::AlreadyAttacked
        );
    }

    #[test]
    #[should_panic(expected = "apply_hit on empty cell")]
    fn apply_hit_on_empty_cell_panics() {
        let mut board = two_part_board(15);
        let mut rng = StdRng::seed_from_u64(204);
        board
            .apply_hit(Coord { row: 3, col: 0 }, &mut rng)
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "outside the 4x4 board")]
    fn out_of_bounds_attack_panics() {
        let mut board = two_part_board(16);
        let mut rng = StdRng::seed_from_u64(205);
        let _ = board.resolve_attack(Coord { row: 4, col: 0 }, &mut rng);
    }

    #[test]
    fn random_board_starts_unknown_everywhere() {
        let mut rng = StdRng::seed_from_u64(17);
        let board = Board::new(6, &[3, 2], TEST_KEY_BITS, &mut rng).unwrap();
        assert!(board.guesses().iter().all(|&m| m == CellMark::Unknown));
        assert_eq!(board.shadow.iter().filter(|&&c| c == 1).count(), 5);
        assert_grids_consistent(&board);
    }

    #[test]
    fn unfittable_fleet_fails_setup() {
        let mut rng = StdRng::seed_from_u64(18);
        assert!(matches!(
            Board::new(3, &[5], TEST_KEY_BITS, &mut rng),
            Err(SetupError::Placement(_))
        ));
    }
}
