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

mod common;

mod fork_resolution {
    use crate::common::{test_node, test_node_with_timer};
    use tracenet_consensus::{MiningStatus, MiningTimer};
    use tracenet_network::message::current_timestamp;
    use tracenet_objects::Block;
    use tracenet_testing::{sample_block, test_consensus};

    use std::time::Duration;
    use tokio::time::timeout;

    // A block extending the current tip is applied directly.
    #[tokio::test]
    async fn direct_extension_is_appended() {
        let node = test_node("direct_extension");
        let genesis_hash = node.ledger().latest_hash();

        let block = sample_block(&genesis_hash, 2);
        assert!(node.handle_block(block.clone()));
        assert_eq!(node.blocks().pending_len(), 1);

        assert!(node.process_pending_queue().await);
        assert_eq!(node.ledger().height(), 2);
        assert_eq!(node.ledger().latest_hash(), block.hash);
        assert!(node.blocks().pending_is_empty());
    }

    // The longest-chain rule: a three-block fork overtakes a two-block
    // chain rooted at the same genesis.
    #[tokio::test]
    async fn longer_fork_replaces_the_active_chain() {
        let node = test_node("longer_fork");
        let genesis_hash = node.ledger().latest_hash();

        // Chain A: G <- A1 <- A2.
        let a1 = sample_block(&genesis_hash, 1);
        let a2 = sample_block(&a1.hash, 1);
        for block in [&a1, &a2] {
            assert!(node.handle_block(block.clone()));
            assert!(node.process_pending_queue().await);
        }
        assert_eq!(node.ledger().height(), 3);

        // Chain B: G <- B1 <- B2 <- B3, delivered while A is active.
        let b1 = sample_block(&genesis_hash, 1);
        let b2 = sample_block(&b1.hash, 1);
        let b3 = sample_block(&b2.hash, 1);
        for block in [&b1, &b2, &b3] {
            assert!(node.handle_block(block.clone()));
        }

        assert!(node.process_pending_queue().await);

        let chain = node.ledger().chain_snapshot();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[1].hash, b1.hash);
        assert_eq!(chain[2].hash, b2.hash);
        assert_eq!(chain[3].hash, b3.hash);

        // The overtaken fork blocks left in the queue are recognised as
        // part of the new active chain and dropped on the next pass.
        node.process_pending_queue().await;
        assert!(node.blocks().pending_is_empty());

        // Linkage holds across the switch.
        for window in chain.windows(2) {
            assert_eq!(window[1].prev_hash, window[0].hash);
        }
    }

    // A strictly greater length is required: an equal-length fork loses to
    // the first-seen chain.
    #[tokio::test]
    async fn equal_length_fork_is_not_adopted() {
        let node = test_node("equal_fork");
        let genesis_hash = node.ledger().latest_hash();

        let first = sample_block(&genesis_hash, 1);
        assert!(node.handle_block(first.clone()));
        assert!(node.process_pending_queue().await);

        let rival = sample_block(&genesis_hash, 1);
        assert!(node.handle_block(rival.clone()));
        assert!(!node.process_pending_queue().await);

        assert_eq!(node.ledger().latest_hash(), first.hash);
        // The rival stays queued as an inert fork tip.
        assert_eq!(node.blocks().pending_len(), 1);
    }

    // A block with a timestamp two hours in the past is dropped outright:
    // no chain growth, no index entry, no queue entry.
    #[tokio::test]
    async fn skewed_timestamp_is_rejected() {
        let node = test_node("skewed_timestamp");
        let genesis_hash = node.ledger().latest_hash();

        let stale = Block::with_timestamp(genesis_hash, Vec::new(), current_timestamp() - 7200.0);
        assert!(!node.handle_block(stale.clone()));

        assert_eq!(node.ledger().height(), 1);
        assert!(!node.blocks().contains(&stale.hash));
        assert!(node.blocks().pending_is_empty());
    }

    // A block containing a transaction with a forged signature is dropped.
    #[tokio::test]
    async fn invalid_transaction_signature_is_rejected() {
        let node = test_node("bad_signature");
        let genesis_hash = node.ledger().latest_hash();

        let mut block = sample_block(&genesis_hash, 2);
        block.transactions[1].data.push_str(" (tampered)");

        assert!(!node.handle_block(block.clone()));
        assert!(!node.blocks().contains(&block.hash));
    }

    // A block whose parent is neither the tip nor indexed is dropped; the
    // core keeps no orphan pool.
    #[tokio::test]
    async fn unknown_parent_is_rejected() {
        let node = test_node("unknown_parent");

        let orphan = sample_block(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            1,
        );
        assert!(!node.handle_block(orphan.clone()));
        assert!(!node.blocks().contains(&orphan.hash));
    }

    // A block that has already been admitted once is not admitted again,
    // even under a fresh gossip envelope.
    #[tokio::test]
    async fn duplicate_blocks_are_dropped_at_intake() {
        let node = test_node("duplicate_block");
        let block = sample_block(&node.ledger().latest_hash(), 1);

        assert!(node.handle_block(block.clone()));
        assert!(!node.handle_block(block));
        assert_eq!(node.blocks().pending_len(), 1);
    }

    // Receiving a block that extends a strictly longer chain aborts the
    // mining round in flight.
    #[tokio::test]
    async fn longer_chain_intake_aborts_mining() {
        let miner = MiningTimer::with_sampler(&test_consensus(), Box::new(|_| 300.0));
        let node = test_node_with_timer("abort_on_intake", miner);

        let timer = node.miner().clone();
        let round = tokio::spawn(async move { timer.mine().await });

        // Let the round arm before the competing block arrives.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let block = sample_block(&node.ledger().latest_hash(), 1);
        assert!(node.handle_block(block));

        let status = timeout(Duration::from_secs(2), round)
            .await
            .expect("the round should abort promptly")
            .unwrap();
        assert_eq!(status, MiningStatus::Aborted);
    }
}
