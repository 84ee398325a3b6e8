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

use cipherfleet_core::{CellMark, Coord, Grid};

/// Print a guess grid with lettered rows and numbered columns.
///
/// This is all either player ever sees of the opposing board: hits, misses
/// and unknown water. Ship positions exist only inside the defender's process
/// as ciphertext.
pub fn render_guesses(title: &str, guesses: &Grid<CellMark>) {
    let size = guesses.size();

    println!("\n--- {title} ---");
    print!("   ");
    for col in 1..=size {
        print!("{col:>2}");
    }
    println!();

    for row in 0..size {
        let label = (b'A' + row as u8) as char;
        print!("{label} |");
        for col in 0..size {
            let mark = match guesses[Coord { row, col }] {
                CellMark::Unknown => '.',
                CellMark::Hit => 'X',
                CellMark::Miss => 'O',
            };
            print!("{mark}|");
        }
        println!();
    }
}
