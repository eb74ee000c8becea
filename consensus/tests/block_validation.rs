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

mod block_validation {
    use tracenet_testing::{sample_block, test_consensus};

    // The timestamp tolerance is inclusive: a drift of exactly one hour is
    // accepted, anything beyond it is rejected.
    #[test]
    fn timestamp_tolerance_boundary() {
        let consensus = test_consensus();
        let block = sample_block("0", 1);

        assert!(consensus.verify_block(&block, block.timestamp + 3600.0).is_ok());
        assert!(consensus.verify_block(&block, block.timestamp - 3600.0).is_ok());
        assert!(consensus.verify_block(&block, block.timestamp + 3600.01).is_err());
        assert!(consensus.verify_block(&block, block.timestamp - 3600.01).is_err());
    }

    #[test]
    fn a_tampered_transaction_fails_validation() {
        let consensus = test_consensus();
        let mut block = sample_block("0", 3);
        block.transactions[2].data.push_str(" (tampered)");

        assert!(consensus.verify_block(&block, block.timestamp).is_err());
    }

    #[test]
    fn a_clean_block_passes_validation() {
        let consensus = test_consensus();
        let block = sample_block("0", 3);
        assert!(consensus.verify_block(&block, block.timestamp).is_ok());
    }
}
