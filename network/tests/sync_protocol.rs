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

mod sync_protocol {
    use crate::common::test_node;
    use tracenet_network::{message::current_timestamp, read_json, Message};
    use tracenet_objects::Block;
    use tracenet_testing::{sample_block, sample_transaction};
    use tracenet_testing::wait_until;

    use tokio::{io::AsyncWriteExt, net::TcpStream};

    async fn send_message(address: std::net::SocketAddr, message: &Message) -> TcpStream {
        let mut stream = TcpStream::connect(address).await.unwrap();
        stream
            .write_all(&serde_json::to_vec(message).unwrap())
            .await
            .unwrap();
        stream
    }

    #[tokio::test]
    async fn chain_request_returns_the_full_chain() {
        let node = test_node("chain_request");
        let block = sample_block(&node.ledger().latest_hash(), 1);
        node.handle_block(block.clone());
        node.process_pending_queue().await;

        let address = node.start_listener().await.unwrap();

        let mut stream = send_message(address, &Message::ChainRequest).await;
        match read_json::<Message>(&mut stream).await.unwrap() {
            Message::ChainResponse { chain } => {
                assert_eq!(chain.len(), 2);
                assert!(chain[0].is_genesis());
                assert_eq!(chain[1].hash, block.hash);
            }
            other => panic!("expected a CHAIN_RESPONSE, got {}", other),
        }
    }

    #[tokio::test]
    async fn liveness_ping_is_answered_with_alive() {
        let node = test_node("liveness");
        let address = node.start_listener().await.unwrap();

        let ping = Message::Liveness {
            ip: "127.0.0.1".to_string(),
            port: 12345,
            time: current_timestamp(),
        };
        let mut stream = send_message(address, &ping).await;

        match read_json::<Message>(&mut stream).await.unwrap() {
            Message::Alive { ip, port } => {
                assert_eq!(ip, "127.0.0.1");
                assert_eq!(port, address.port());
            }
            other => panic!("expected an ALIVE, got {}", other),
        }
    }

    #[tokio::test]
    async fn transaction_gossip_lands_in_the_memory_pool() {
        let node = test_node("tx_gossip");
        let address = node.start_listener().await.unwrap();

        let tx = sample_transaction("Refinery Gulf Refinery intake: 700 barrels crude");
        let message = Message::Transaction {
            id: "1:127.0.0.1:1".to_string(),
            ip: "127.0.0.1".to_string(),
            port: 12345,
            timestamp: current_timestamp(),
            data: tx.clone(),
        };

        send_message(address, &message).await;
        wait_until!(5, node.memory_pool().lock().size() == 1);

        // The same envelope again is deduplicated by its gossip id.
        send_message(address, &message).await;
        // The same transaction under a new envelope is deduplicated by txid.
        let replay = Message::Transaction {
            id: "2:127.0.0.1:2".to_string(),
            ip: "127.0.0.1".to_string(),
            port: 12345,
            timestamp: current_timestamp(),
            data: tx,
        };
        send_message(address, &replay).await;

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(node.memory_pool().lock().size(), 1);
    }

    #[tokio::test]
    async fn invalid_transaction_gossip_is_dropped() {
        let node = test_node("bad_tx_gossip");
        let address = node.start_listener().await.unwrap();

        let mut tx = sample_transaction("Export clearance XP-9001: 800 barrels");
        tx.data.push_str(" (tampered)");
        let message = Message::Transaction {
            id: "1:127.0.0.1:1".to_string(),
            ip: "127.0.0.1".to_string(),
            port: 12345,
            timestamp: current_timestamp(),
            data: tx,
        };
        send_message(address, &message).await;

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(node.memory_pool().lock().is_empty());
    }

    #[tokio::test]
    async fn block_gossip_is_admitted_and_queued() {
        let node = test_node("block_gossip");
        let address = node.start_listener().await.unwrap();

        let block = sample_block(&node.ledger().latest_hash(), 2);
        let message = Message::Block {
            id: "1:127.0.0.1:1".to_string(),
            ip: "127.0.0.1".to_string(),
            port: 12345,
            timestamp: current_timestamp(),
            data: block.clone(),
        };
        send_message(address, &message).await;

        wait_until!(5, node.blocks().contains(&block.hash));
        assert_eq!(node.blocks().pending_len(), 1);
    }

    #[tokio::test]
    async fn a_node_syncs_the_chain_from_its_peer() {
        // Node A holds a three-block chain.
        let node_a = test_node("sync_server");
        for _ in 0..2 {
            let block = sample_block(&node_a.ledger().latest_hash(), 1);
            node_a.handle_block(block);
            node_a.process_pending_queue().await;
        }
        assert_eq!(node_a.ledger().height(), 3);
        let address_a = node_a.start_listener().await.unwrap();

        // Node B starts from genesis and syncs from A.
        let node_b = test_node("sync_client");
        node_b.peers().lock().insert(address_a);
        assert!(node_b.is_syncing());

        node_b.request_chain_sync().await;

        assert!(!node_b.is_syncing());
        assert_eq!(node_b.ledger().height(), 3);
        assert_eq!(node_b.ledger().latest_hash(), node_a.ledger().latest_hash());
    }

    #[tokio::test]
    async fn a_shorter_received_chain_is_ignored() {
        let node = test_node("short_chain");
        for _ in 0..2 {
            let block = sample_block(&node.ledger().latest_hash(), 1);
            node.handle_block(block);
            node.process_pending_queue().await;
        }
        let tip = node.ledger().latest_hash();

        let rival = vec![Block::genesis(), sample_block(&Block::genesis().hash, 1)];
        assert!(!node.adopt_chain(rival));

        assert_eq!(node.ledger().height(), 3);
        assert_eq!(node.ledger().latest_hash(), tip);
    }

    #[tokio::test]
    async fn an_inconsistent_received_chain_is_ignored() {
        let node = test_node("broken_chain");

        let broken = vec![
            Block::genesis(),
            sample_block("1111111111111111111111111111111111111111111111111111111111111111", 1),
        ];
        assert!(!node.adopt_chain(broken));
        assert_eq!(node.ledger().height(), 1);
    }
}
