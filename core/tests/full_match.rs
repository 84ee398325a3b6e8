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

//! End-to-end matches over the public API, with seeded randomness so every
//! run is reproducible.

use cipherfleet_core::{
    AttackOutcome, Board, CellMark, Coord, DecisionSource, Grid, Match, MatchError, MatchState,
    RandomGunner,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TEST_KEY_BITS: u64 = 256;

/// A decision source that walks the board in row-major order, skipping
/// nothing. Deterministic and exhaustive, so a match against it always ends.
struct Sweep {
    next: usize,
}

impl DecisionSource for Sweep {
    fn next_coordinate(&mut self, guesses: &Grid<CellMark>) -> Result<Coord, MatchError> {
        let size = guesses.size();
        let coord = Coord {
            row: self.next / size,
            col: self.next % size,
        };
        self.next += 1;
        Ok(coord)
    }
}

fn board_with_ship(seed: u64, cells: &[(usize, usize)]) -> Board {
    let mut grid = Grid::filled(4, 0u8);
    for &cell in cells {
        grid[Coord::from(cell)] = 1;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Board::from_placement(grid, TEST_KEY_BITS, &mut rng).unwrap()
}

// The walkthrough from the protocol description: a 4x4 board with one
// two-part ship at A1-A2, attacked step by step.
#[test]
fn canonical_engagement() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut board = board_with_ship(2, &[(0, 0), (0, 1)]);

    assert_eq!(board.remaining_parts().unwrap(), 2);

    let first = Coord { row: 0, col: 0 };
    assert_eq!(
        board.resolve_attack(first, &mut rng).unwrap(),
        AttackOutcome::Hit
    );
    assert_eq!(board.remaining_parts().unwrap(), 1);
    assert_eq!(board.guesses()[first], CellMark::Hit);

    assert_eq!(
        board.resolve_attack(first, &mut rng).unwrap(),
        AttackOutcome::AlreadyAttacked
    );
    assert_eq!(board.remaining_parts().unwrap(), 1);

    let empty = Coord { row: 3, col: 3 };
    assert_eq!(
        board.resolve_attack(empty, &mut rng).unwrap(),
        AttackOutcome::Miss
    );
    assert_eq!(board.remaining_parts().unwrap(), 1);
    assert_eq!(board.guesses()[empty], CellMark::Miss);

    assert_eq!(
        board
            .resolve_attack(Coord { row: 0, col: 1 }, &mut rng)
            .unwrap(),
        AttackOutcome::Hit
    );
    assert_eq!(board.remaining_parts().unwrap(), 0);
    assert!(board.defeated().unwrap());
}

#[test]
fn sweeping_attacker_wins_with_exactly_the_fleet_size_in_hits() {
    let mut rng = StdRng::seed_from_u64(3);
    // Seat 1's fleet sits at the start of the sweep order and seat 0's at
    // the end, so seat 0 wins and the win lands on its third hit.
    let first = board_with_ship(4, &[(3, 0), (3, 1), (3, 2)]);
    let second = board_with_ship(5, &[(0, 0), (0, 1), (0, 2)]);
    let mut game = Match::new(first, second);

    let mut sweeps = [Sweep { next: 0 }, Sweep { next: 0 }];
    let mut hits = 0;
    while game.state() == MatchState::InProgress {
        let attacker = game.attacker();
        let report = game.play_turn(&mut sweeps[attacker], &mut rng).unwrap();
        if report.attacker == 0 && report.outcome == AttackOutcome::Hit {
            hits += 1;
        }
        assert!(game.turn() <= 33, "sweep must end within one board pass");
    }

    assert_eq!(game.state(), MatchState::Finished { winner: 0 });
    assert_eq!(hits, 3, "defeat takes exactly one hit per ship part");
    assert_eq!(game.board(1).remaining_parts().unwrap(), 0);
    // The loser never finished hitting seat 0's fleet.
    assert!(game.board(0).remaining_parts().unwrap() > 0);
}

#[test]
fn random_match_on_generated_boards_terminates() {
    let mut rng = StdRng::seed_from_u64(6);
    let first = Board::new(5, &[3, 2], TEST_KEY_BITS, &mut rng).unwrap();
    let second = Board::new(5, &[3, 2], TEST_KEY_BITS, &mut rng).unwrap();
    let mut game = Match::new(first, second);

    let mut gunners = [
        RandomGunner::new(StdRng::seed_from_u64(7)),
        RandomGunner::new(StdRng::seed_from_u64(8)),
    ];

    // Gunners never repeat a cell, so 2 * 25 turns is a hard ceiling.
    for _ in 0..50 {
        if let MatchState::Finished { winner } = game.state() {
            let loser = 1 - winner;
            assert_eq!(game.board(loser).remaining_parts().unwrap(), 0);
            return;
        }
        let attacker = game.attacker();
        game.play_turn(&mut gunners[attacker], &mut rng).unwrap();
    }
    panic!("match failed to terminate");
}
