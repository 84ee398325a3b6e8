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

//! Random ship placement.
//!
//! Produces the plaintext occupancy grid a [crate::Board] is built from. The
//! search is retry-until-valid: draw an orientation and anchor, accept if the
//! run is in bounds and currently empty. Retries are bounded so an impossible
//! configuration surfaces as an error instead of a livelock.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::board::Grid;
use crate::Coord;

/// Placement attempts per ship before the configuration is declared
/// unsatisfiable.
pub const MAX_ATTEMPTS_PER_SHIP: u32 = 1_000;

#[derive(Debug, Error)]
pub enum PlacementError {
    /// The ship list cannot possibly fit the board. A configuration error,
    /// detected before any random search runs.
    #[error("ships of total length {total} cannot fit a {size}x{size} board")]
    DoesNotFit { size: usize, total: usize },

    /// The random search gave up. Only reachable for configurations dense
    /// enough that uniform sampling is hopeless.
    #[error("gave up placing a ship of length {length} after {attempts} attempts")]
    Exhausted { length: usize, attempts: u32 },
}

#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Generate a random non-overlapping, in-bounds placement of `ship_sizes` on
/// a `size` by `size` grid. Occupied cells are `1`, empty cells `0`.
pub fn generate_placement<R: Rng + ?Sized>(
    size: usize,
    ship_sizes: &[usize],
    rng: &mut R,
) -> Result<Grid<u8>, PlacementError> {
    let total: usize = ship_sizes.iter().sum();
    if total > size * size || ship_sizes.iter().any(|&length| length > size) {
        return Err(PlacementError::DoesNotFit { size, total });
    }

    let mut grid = Grid::filled(size, 0u8);
    for &length in ship_sizes {
        let mut placed = false;
        for _ in 0..MAX_ATTEMPTS_PER_SHIP {
            let orientation = if rng.random::<bool>() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let anchor = Coord {
                row: rng.random_range(0..size),
                col: rng.random_range(0..size),
            };
            if let Some(run) = run_cells(&grid, anchor, length, orientation) {
                for coord in run {
                    grid[coord] = 1;
                }
                placed = true;
                break;
            }
        }
        if !placed {
            return Err(PlacementError::Exhausted {
                length,
                attempts: MAX_ATTEMPTS_PER_SHIP,
            });
        }
    }

    debug!(size, ships = ship_sizes.len(), total, "placed fleet");
    Ok(grid)
}

/// The cells a ship would occupy, or `None` if the run leaves the board or
/// crosses an occupied cell.
fn run_cells(
    grid: &Grid<u8>,
    anchor: Coord,
    length: usize,
    orientation: Orientation,
) -> Option<Vec<Coord>> {
    let size = grid.size();
    let cells: Vec<Coord> = (0..length)
        .map(|offset| match orientation {
            Orientation::Horizontal => Coord {
                row: anchor.row,
                col: anchor.col + offset,
            },
            Orientation::Vertical => Coord {
                row: anchor.row + offset,
                col: anchor.col,
            },
        })
        .collect();

    if cells.iter().any(|c| !c.in_bounds(size)) {
        return None;
    }
    if cells.iter().any(|&c| grid[c] != 0) {
        return None;
    }
    Some(cells)
}
