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

use crate::account::{self, Account, PublicKey, Signature};

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A signed supply-chain event, immutable after construction.
///
/// The canonical message is `"{sender_addr}:{receiver_addr}:{data}"`; both
/// the signature and the transaction id are computed over it. Two
/// transactions with identical sender, receiver and payload therefore share
/// a txid and are deduplicated by the memory pool and by block inclusion;
/// replays of the exact same event are suppressed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireTransaction", into = "WireTransaction")]
pub struct Transaction {
    pub sender_pk: PublicKey,
    pub sender_addr: String,
    pub receiver_addr: String,
    pub data: String,
    pub signature: Signature,
    pub txid: String,
}

impl Transaction {
    /// Creates and signs a transaction with the given account.
    pub fn new<R: Rng + ?Sized>(
        account: &Account,
        receiver_addr: impl Into<String>,
        data: impl Into<String>,
        rng: &mut R,
    ) -> Self {
        let sender_addr = account.address().to_string();
        let receiver_addr = receiver_addr.into();
        let data = data.into();

        let message = canonical_message(&sender_addr, &receiver_addr, &data);
        let signature = account.sign(&message, rng);
        let txid = compute_txid(&message);

        Self {
            sender_pk: account.public_key().clone(),
            sender_addr,
            receiver_addr,
            data,
            signature,
            txid,
        }
    }

    /// The message the signature and txid commit to.
    pub fn canonical_message(&self) -> String {
        canonical_message(&self.sender_addr, &self.receiver_addr, &self.data)
    }

    /// Checks the signature against the stated sender public key.
    pub fn verify(&self) -> bool {
        account::verify(&self.canonical_message(), &self.signature, &self.sender_pk)
    }
}

fn canonical_message(sender_addr: &str, receiver_addr: &str, data: &str) -> String {
    format!("{}:{}:{}", sender_addr, receiver_addr, data)
}

/// The digest of the canonical message, hex-encoded.
pub fn compute_txid(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

/// The on-wire representation: the sender address is derived, not carried.
#[derive(Serialize, Deserialize)]
struct WireTransaction {
    sender_pk: PublicKey,
    receiver_addr: String,
    data: String,
    signature: Signature,
    txid: String,
}

impl From<WireTransaction> for Transaction {
    fn from(wire: WireTransaction) -> Self {
        let sender_addr = account::address_from_public_key(&wire.sender_pk);
        Self {
            sender_pk: wire.sender_pk,
            sender_addr,
            receiver_addr: wire.receiver_addr,
            data: wire.data,
            signature: wire.signature,
            txid: wire.txid,
        }
    }
}

impl From<Transaction> for WireTransaction {
    fn from(tx: Transaction) -> Self {
        Self {
            sender_pk: tx.sender_pk,
            receiver_addr: tx.receiver_addr,
            data: tx.data,
            signature: tx.signature,
            txid: tx.txid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn test_transaction(data: &str) -> Transaction {
        let rng = &mut thread_rng();
        let sender = Account::new(rng);
        let receiver = Account::new(rng);
        Transaction::new(&sender, receiver.address(), data, rng)
    }

    #[test]
    fn txid_commits_to_the_canonical_message() {
        let tx = test_transaction("Crude extraction report: 4000 barrels extracted at Permian Basin");
        assert_eq!(tx.txid, compute_txid(&tx.canonical_message()));
        assert_eq!(tx.txid.len(), 64);
    }

    #[test]
    fn valid_signature_verifies() {
        let tx = test_transaction("Pipeline shipment #2041: 9000 barrels");
        assert!(tx.verify());
    }

    #[test]
    fn substituted_signature_fails_verification() {
        let rng = &mut thread_rng();
        let sender = Account::new(rng);
        let other = Account::new(rng);

        let mut tx = Transaction::new(&sender, "0xbeef", "Invoice INV-77120: 500 bbl", rng);
        // A signature over the same message under a different keypair.
        tx.signature = other.sign(&tx.canonical_message(), rng);

        assert!(!tx.verify());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let mut tx = test_transaction("Fuel delivery 3000 liters of Diesel B5");
        tx.data.push_str(" (amended)");
        assert!(!tx.verify());
    }

    #[test]
    fn wire_round_trip_rederives_the_sender_address() {
        let tx = test_transaction("Storage tank T-7 filled to 80% capacity");

        let json = serde_json::to_string(&tx).unwrap();
        assert!(!json.contains("sender_addr"));

        let decoded: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.sender_addr, tx.sender_addr);
    }
}
