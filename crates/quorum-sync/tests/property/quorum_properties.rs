use proptest::prelude::*;

use quorum_core::config::QuorumConfig;
use quorum_core::constants::MAX_CONVERGENCE_STEPS;
use quorum_core::Digest;
use quorum_sync::block::{BlockState, ByteField, FieldSchema};
use quorum_sync::consensus::{FieldDiff, QuorumStrategySet};
use quorum_sync::{CausalRelation, NodeAddress, QuorumNode, SharedBuffer};

const FIELDS: [&str; 5] = ["header", "payload", "metadata", "index", "link"];

fn field_updates() -> impl Strategy<Value = Vec<(usize, Vec<u8>)>> {
    prop::collection::vec((0..FIELDS.len(), prop::collection::vec(any::<u8>(), 0..32)), 1..24)
}

proptest! {
    #[test]
    fn address_roundtrip(prefix in 0u64..(1 << 48), subnet in any::<u16>(), node in any::<u32>(), clock in any::<u32>()) {
        let addr = NodeAddress::encode(prefix, subnet, node, clock).unwrap();
        let parts = addr.decode();
        prop_assert_eq!((parts.prefix, parts.subnet, parts.node_id, parts.clock), (prefix, subnet, node, clock));
        let parsed: NodeAddress = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
        prop_assert_eq!(NodeAddress::from_bytes(&addr.to_bytes()).unwrap(), addr);
    }

    #[test]
    fn stored_digests_reproduce_root(contents in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 3..8)) {
        let fields: Vec<ByteField> = contents
            .iter()
            .enumerate()
            .map(|(i, bytes)| ByteField::new(format!("f{i}"), bytes))
            .collect();
        let state = BlockState::create(fields, None);
        prop_assert_eq!(BlockState::reproduce_root(state.field_digests()), state.root());
        prop_assert!(state.verify().is_ok());
    }

    #[test]
    fn timestamps_are_monotonic_and_chain_is_intact(updates in field_updates()) {
        let mut node = QuorumNode::new(1, QuorumConfig::default()).unwrap();
        let mut previous = node.current().clone();
        for (field, bytes) in &updates {
            let next = node.update(FIELDS[*field], bytes).unwrap();
            prop_assert_eq!(next.timestamp(), previous.timestamp() + 1);
            prop_assert_eq!(next.previous_root(), previous.root());
            prop_assert_eq!(u64::from(next.address().clock()), next.timestamp());
            previous = next;
        }
        let health = node.state().chain_health();
        prop_assert!(health.reaches_genesis);
        prop_assert_eq!(health.length, updates.len() + 1);
        prop_assert_eq!(node.state().history_len(), updates.len() + 1);
        prop_assert!(node.diagnostics().consistency_failures.is_empty());
    }

    #[test]
    fn self_comparison_has_no_flags(updates in field_updates()) {
        let mut node = QuorumNode::new(1, QuorumConfig::default()).unwrap();
        for (field, bytes) in &updates {
            node.update(FIELDS[*field], bytes).unwrap();
        }
        let cmp = node.compare(node.current());
        prop_assert_eq!(cmp.relation(), CausalRelation::Identical);
        prop_assert!(!cmp.happens_before && !cmp.happens_after && !cmp.concurrent);
    }

    #[test]
    fn convergence_steps_are_bounded(equal in prop::collection::vec(any::<bool>(), 5), elapsed in any::<u64>()) {
        let set = QuorumStrategySet::for_schema(&FieldSchema::default());
        let outcome = set.evaluate(&FieldDiff::from_flags(equal, elapsed));
        prop_assert!(outcome.convergence_steps <= MAX_CONVERGENCE_STEPS);
    }

    #[test]
    fn failed_merge_leaves_local_untouched(
        local in field_updates(),
        peer in field_updates(),
    ) {
        let mut a = QuorumNode::new(1, QuorumConfig::default()).unwrap();
        let mut b = QuorumNode::new(2, QuorumConfig::default()).unwrap();
        for (field, bytes) in &local {
            a.update(FIELDS[*field], bytes).unwrap();
        }
        for (field, bytes) in &peer {
            b.update(FIELDS[*field], bytes).unwrap();
        }
        let before = a.export_state();
        let result = a.merge(b.current(), &b.state().ancestry()).unwrap();
        if result.success {
            prop_assert!(a.timestamp() >= before.current.timestamp());
        } else {
            let after = a.export_state();
            prop_assert_eq!(after.current, before.current);
            prop_assert_eq!(after.history, before.history);
            prop_assert_eq!(result.new_state.root(), a.root());
        }
    }

    #[test]
    fn byte_writes_are_visible_to_every_holder(bytes in prop::collection::vec(any::<u8>(), 1..64), value in any::<u8>()) {
        let buffer = SharedBuffer::from_bytes(&bytes);
        let alias = buffer.clone();
        let offset = bytes.len() - 1;
        buffer.write_bytes(offset, &[value]).unwrap();
        prop_assert_eq!(alias.read_bytes(offset, 1).unwrap(), vec![value]);
        prop_assert_eq!(alias.digest(), Digest::of(&buffer.to_vec()));
    }
}
