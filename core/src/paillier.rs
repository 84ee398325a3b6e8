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

//! Additive-homomorphic encryption as consumed by the game core.
//!
//! Textbook Paillier over [num_bigint::BigUint] with the common `g = n + 1`
//! parameterization. The rest of the crate relies only on the algebraic
//! contract `decrypt(add(encrypt(a), encrypt(b))) == a + b`; nothing outside
//! this module inspects the representation of a [Ciphertext] or either key.
//!
//! This is a faithful implementation of the scheme serving the game protocol,
//! not a hardened cryptographic library.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Modulus size used for real play. Tests use far smaller keys.
pub const DEFAULT_KEY_BITS: u64 = 1024;

const MILLER_RABIN_ROUNDS: u32 = 25;
const KEYGEN_ATTEMPTS: u32 = 8;

const SMALL_PRIMES: &[u32] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The prime pair drawn during key generation never produced an
    /// invertible decryption parameter.
    #[error("failed to generate a usable key pair after {0} attempts")]
    KeygenExhausted(u32),

    /// A ciphertext is not an element of the group the key operates on.
    #[error("malformed ciphertext")]
    MalformedCiphertext,

    /// A plaintext does not fit the key's message space, or a decrypted
    /// aggregate cannot be represented as an `i64`.
    #[error("plaintext magnitude exceeds the key's message space")]
    PlaintextOutOfRange,
}

/// Paillier public key: the modulus `n` (with `n^2` cached).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PublicKey {
    n: BigUint,
    n_sq: BigUint,
}

/// Paillier private key. Holds the factorization-derived decryption
/// parameters; used by the health oracle and nowhere else.
#[derive(Clone)]
pub struct PrivateKey {
    lambda: BigUint,
    mu: BigUint,
    public: PublicKey,
}

// Keep decryption parameters out of logs and panic messages.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("lambda", &"[redacted]")
            .field("mu", &"[redacted]")
            .field("public", &self.public)
            .finish()
    }
}

/// An encryption of a single integer, opaque outside this module.
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ciphertext(BigUint);

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ciphertext")
            .field(&format_args!("<{} bits>", self.0.bits()))
            .finish()
    }
}

/// Generate a fresh key pair with a modulus of `modulus_bits` bits.
pub fn generate_keypair<R: Rng + ?Sized>(
    rng: &mut R,
    modulus_bits: u64,
) -> Result<(PublicKey, PrivateKey), CryptoError> {
    assert!(modulus_bits >= 16, "modulus too small to hold game state");

    for _ in 0..KEYGEN_ATTEMPTS {
        let p = random_prime(rng, modulus_bits / 2);
        let q = random_prime(rng, modulus_bits.div_ceil(2));
        if p == q {
            continue;
        }

        let n = &p * &q;
        let n_sq = &n * &n;
        let lambda = (&p - 1u32).lcm(&(&q - 1u32));

        // With g = n + 1, L(g^lambda mod n^2) = lambda mod n, so mu is just
        // its inverse. Inversion fails only for degenerate prime pairs.
        let Some(mu) = (&lambda % &n).modinv(&n) else {
            continue;
        };

        debug!(bits = n.bits(), "generated paillier key pair");
        let public = PublicKey { n, n_sq };
        let private = PrivateKey {
            lambda,
            mu,
            public: public.clone(),
        };
        return Ok((public, private));
    }

    Err(CryptoError::KeygenExhausted(KEYGEN_ATTEMPTS))
}

impl PublicKey {
    /// Encrypt a signed integer. Negative values wrap into the upper half of
    /// the message space, so an encryption of `-1` acts as a homomorphic
    /// decrement.
    pub fn encrypt<R: Rng + ?Sized>(
        &self,
        value: i64,
        rng: &mut R,
    ) -> Result<Ciphertext, CryptoError> {
        let m = self.encode(value)?;

        // Blinding factor r must be a unit mod n.
        let r = loop {
            let r = random_below(rng, &self.n);
            if !r.is_zero() && r.gcd(&self.n).is_one() {
                break r;
            }
        };

        // c = (1 + n)^m * r^n = (1 + m*n) * r^n  (mod n^2)
        let g_m = (BigUint::one() + m * &self.n) % &self.n_sq;
        let c = (g_m * r.modpow(&self.n, &self.n_sq)) % &self.n_sq;
        Ok(Ciphertext(c))
    }

    /// Homomorphic addition: the product of two ciphertexts decrypts to the
    /// sum of their plaintexts.
    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        self.check_element(a)?;
        self.check_element(b)?;
        Ok(Ciphertext((&a.0 * &b.0) % &self.n_sq))
    }

    fn check_element(&self, c: &Ciphertext) -> Result<(), CryptoError> {
        if c.0.is_zero() || c.0 >= self.n_sq || !c.0.gcd(&self.n).is_one() {
            return Err(CryptoError::MalformedCiphertext);
        }
        Ok(())
    }

    /// Map a signed value into `Z_n`, rejecting magnitudes that would be
    /// ambiguous under the centered decoding in [PrivateKey::decrypt].
    fn encode(&self, value: i64) -> Result<BigUint, CryptoError> {
        let magnitude = BigUint::from(value.unsigned_abs());
        if magnitude > (&self.n >> 1) {
            return Err(CryptoError::PlaintextOutOfRange);
        }
        if value >= 0 {
            Ok(magnitude)
        } else {
            Ok(&self.n - magnitude)
        }
    }
}

impl PrivateKey {
    /// Decrypt a ciphertext produced under the matching public key, decoding
    /// the upper half of the message space as negative values.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<i64, CryptoError> {
        let pk = &self.public;
        pk.check_element(c)?;

        // m = L(c^lambda mod n^2) * mu  (mod n), with L(x) = (x - 1) / n.
        let u = c.0.modpow(&self.lambda, &pk.n_sq);
        let l = (&u - 1u32) / &pk.n;
        let m = (l * &self.mu) % &pk.n;

        let centered: BigInt = if m > (&pk.n >> 1) {
            BigInt::from(m) - BigInt::from(pk.n.clone())
        } else {
            BigInt::from(m)
        };
        centered.to_i64().ok_or(CryptoError::PlaintextOutOfRange)
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

/// Uniform draw from `[0, bound)`.
fn random_below<R: Rng + ?Sized>(rng: &mut R, bound: &BigUint) -> BigUint {
    let bits = bound.bits();
    let bytes = bits.div_ceil(8) as usize;
    let excess = (bytes as u64 * 8 - bits) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf) >> excess;
        if &candidate < bound {
            return candidate;
        }
    }
}

/// Draw a random prime of exactly `bits` bits.
fn random_prime<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> BigUint {
    assert!(bits >= 8);
    let bytes = bits.div_ceil(8) as usize;
    let excess = (bytes as u64 * 8 - bits) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let mut candidate = BigUint::from_bytes_be(&buf) >> excess;
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_prime(rng, &candidate) {
            return candidate;
        }
    }
}

/// Miller-Rabin with random bases, preceded by small-prime trial division.
fn is_prime<R: Rng + ?Sized>(rng: &mut R, n: &BigUint) -> bool {
    for &p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().expect("n is odd and > 1");
    let d = &n_minus_one >> s;

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = random_below(rng, &(n - 3u32)) + 2u32;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
