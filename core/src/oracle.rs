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

//! The health oracle.
//!
//! Answers "how many ship parts survive on this board" from the ciphertext
//! grid alone: every cell is folded into one homomorphic sum and only that
//! aggregate is decrypted. This is the single place the private key is used,
//! and it reveals the total and nothing about which cells contribute to it.

use tracing::debug;

use crate::board::Board;
use crate::paillier::CryptoError;

impl Board {
    /// Count the remaining ship parts without decrypting any cell.
    ///
    /// Ciphertext addition is commutative and associative, so the fold order
    /// is irrelevant. Because every hit decrements the matching ciphertext in
    /// lockstep with the shadow grid, the aggregate always equals the number
    /// of occupied shadow cells.
    pub fn remaining_parts(&self) -> Result<u64, CryptoError> {
        let mut cells = self.cipher.iter();
        let Some(first) = cells.next() else {
            return Ok(0);
        };
        let total = cells.try_fold(first.clone(), |acc, cell| self.public_key().add(&acc, cell))?;

        let count = self.private_key.decrypt(&total)?;
        debug!(count, "health oracle read");
        u64::try_from(count).map_err(|_| CryptoError::PlaintextOutOfRange)
    }

    /// A board is defeated exactly when no ship part survives.
    pub fn defeated(&self) -> Result<bool, CryptoError> {
        Ok(self.remaining_parts()? == 0)
    }
}
