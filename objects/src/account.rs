// Copyright (C) 2023-2025 Tracenet Labs Inc.
// This file is part of the tracenet library.

// The tracenet library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The tracenet library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the tracenet library. If not, see <https://www.gnu.org/licenses/>.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{
    de::{self, Deserializer},
    ser::Serializer,
    Deserialize, Serialize,
};
use sha2::{Digest, Sha256};

use std::fmt;

/// The prime modulus of the secp256k1 base field.
static FIELD_MODULUS: Lazy<BigInt> = Lazy::new(|| {
    BigInt::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
        16,
    )
    .expect("valid secp256k1 field modulus")
});

/// The order of the secp256k1 generator point.
static CURVE_ORDER: Lazy<BigInt> = Lazy::new(|| {
    BigInt::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
        16,
    )
    .expect("valid secp256k1 curve order")
});

static CURVE_ORDER_UINT: Lazy<BigUint> = Lazy::new(|| {
    CURVE_ORDER
        .to_biguint()
        .expect("the curve order is non-negative")
});

static GENERATOR: Lazy<Point> = Lazy::new(|| {
    let x = BigInt::parse_bytes(
        b"55066263022277343669578718895168534326250603453777594175500187360389116729240",
        10,
    )
    .expect("valid secp256k1 generator x");
    let y = BigInt::parse_bytes(
        b"32670510020758816978083085130507043184471273380659243275938904335757337482424",
        10,
    )
    .expect("valid secp256k1 generator y");
    Point::Affine(x, y)
});

/// A point on the curve, with the point at infinity as the group identity.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Point {
    Infinity,
    Affine(BigInt, BigInt),
}

fn modp(value: &BigInt) -> BigInt {
    let modulus = &*FIELD_MODULUS;
    ((value % modulus) + modulus) % modulus
}

/// Modular inverse by Fermat's little theorem; `modulus` must be prime.
fn mod_inv(value: &BigInt, modulus: &BigInt) -> Option<BigInt> {
    let reduced = ((value % modulus) + modulus) % modulus;
    if reduced.is_zero() {
        return None;
    }
    Some(reduced.modpow(&(modulus - BigInt::from(2)), modulus))
}

fn point_add(p: &Point, q: &Point) -> Point {
    let (x1, y1, x2, y2) = match (p, q) {
        (Point::Infinity, _) => return q.clone(),
        (_, Point::Infinity) => return p.clone(),
        (Point::Affine(x1, y1), Point::Affine(x2, y2)) => (x1, y1, x2, y2),
    };

    // P + (-P) = 0, which also covers doubling a point with y = 0.
    if x1 == x2 && modp(&(y1 + y2)).is_zero() {
        return Point::Infinity;
    }

    let slope = if x1 == x2 && y1 == y2 {
        match mod_inv(&(y1 + y1), &FIELD_MODULUS) {
            Some(inv) => modp(&(BigInt::from(3) * x1 * x1 * inv)),
            None => return Point::Infinity,
        }
    } else {
        match mod_inv(&(x2 - x1), &FIELD_MODULUS) {
            Some(inv) => modp(&((y2 - y1) * inv)),
            None => return Point::Infinity,
        }
    };

    let x3 = modp(&(&slope * &slope - x1 - x2));
    let y3 = modp(&(&slope * (x1 - &x3) - y1));

    Point::Affine(x3, y3)
}

fn scalar_mult(scalar: &BigUint, point: &Point) -> Point {
    let mut result = Point::Infinity;
    let mut addend = point.clone();
    let mut k = scalar.clone();

    while !k.is_zero() {
        if k.bit(0) {
            result = point_add(&result, &addend);
        }
        addend = point_add(&addend, &addend);
        k >>= 1;
    }

    result
}

fn message_digest(message: &str) -> BigInt {
    let digest = Sha256::digest(message.as_bytes());
    BigInt::from(BigUint::from_bytes_be(&digest))
}

fn serialize_pair<S: Serializer>(a: &BigUint, b: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    [a.to_str_radix(10), b.to_str_radix(10)].serialize(serializer)
}

fn deserialize_pair<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(BigUint, BigUint), D::Error> {
    let [a, b] = <[String; 2]>::deserialize(deserializer)?;
    let parse = |digits: &String| {
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom("expected a decimal big integer"))
    };
    Ok((parse(&a)?, parse(&b)?))
}

/// An affine secp256k1 public key, serialized on the wire as a 2-element
/// array of decimal strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub x: BigUint,
    pub y: BigUint,
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pair(&self.x, &self.y, serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = deserialize_pair(deserializer)?;
        Ok(Self { x, y })
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An ECDSA signature pair `(r, s)`, serialized like the public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pair(&self.r, &self.s, serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (r, s) = deserialize_pair(deserializer)?;
        Ok(Self { r, s })
    }
}

/// Derives the short participant address from a public key: `"0x"` followed
/// by the last two bytes of the digest over the decimal coordinates.
///
/// Collisions are possible at this 16-bit width; the deployments this ledger
/// targets are small enough that the operator resolves them out of band.
pub fn address_from_public_key(public_key: &PublicKey) -> String {
    let mut preimage = public_key.x.to_str_radix(10);
    preimage.push_str(&public_key.y.to_str_radix(10));
    let digest = hex::encode(Sha256::digest(preimage.as_bytes()));
    format!("0x{}", &digest[digest.len() - 4..])
}

/// Verifies an ECDSA signature over `message` under the given public key.
pub fn verify(message: &str, signature: &Signature, public_key: &PublicKey) -> bool {
    let order = &*CURVE_ORDER;
    let r = BigInt::from(signature.r.clone());
    let s = BigInt::from(signature.s.clone());

    if r < BigInt::one() || r >= *order || s < BigInt::one() || s >= *order {
        return false;
    }

    let z = message_digest(message);
    let w = match mod_inv(&s, order) {
        Some(w) => w,
        None => return false,
    };
    let u1 = (&z * &w) % order;
    let u2 = (&r * &w) % order;

    let pk_point = Point::Affine(
        BigInt::from(public_key.x.clone()),
        BigInt::from(public_key.y.clone()),
    );
    let u1 = match u1.to_biguint() {
        Some(u1) => u1,
        None => return false,
    };
    let u2 = match u2.to_biguint() {
        Some(u2) => u2,
        None => return false,
    };

    let point = point_add(&scalar_mult(&u1, &GENERATOR), &scalar_mult(&u2, &pk_point));
    match point {
        Point::Infinity => false,
        Point::Affine(x, _) => (x % order) == r,
    }
}

/// A node's signing identity: a secp256k1 keypair plus the derived address.
#[derive(Clone, Debug)]
pub struct Account {
    secret_key: BigUint,
    public_key: PublicKey,
    address: String,
}

impl Account {
    /// Generates a fresh keypair.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let secret_key = rng.gen_biguint_below(&CURVE_ORDER_UINT);
            if secret_key.is_zero() {
                continue;
            }
            if let Point::Affine(x, y) = scalar_mult(&secret_key, &GENERATOR) {
                let public_key = PublicKey {
                    x: x.to_biguint().unwrap_or_default(),
                    y: y.to_biguint().unwrap_or_default(),
                };
                let address = address_from_public_key(&public_key);
                return Self {
                    secret_key,
                    public_key,
                    address,
                };
            }
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Produces an ECDSA signature over `message`.
    pub fn sign<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Signature {
        let order = &*CURVE_ORDER;
        let z = message_digest(message);
        let secret = BigInt::from(self.secret_key.clone());

        loop {
            let k_uint = rng.gen_biguint_below(&CURVE_ORDER_UINT);
            if k_uint.is_zero() {
                continue;
            }

            let x = match scalar_mult(&k_uint, &GENERATOR) {
                Point::Affine(x, _) => x,
                Point::Infinity => continue,
            };
            let r = x % order;
            if r.is_zero() {
                continue;
            }

            let k_inv = match mod_inv(&BigInt::from(k_uint), order) {
                Some(inv) => inv,
                None => continue,
            };
            let s = (k_inv * (&z + &r * &secret)) % order;
            if s.is_zero() {
                continue;
            }

            // r and s are reduced modulo the positive order, so the casts hold.
            match (r.to_biguint(), s.to_biguint()) {
                (Some(r), Some(s)) => return Signature { r, s },
                _ => continue,
            }
        }
    }
}
