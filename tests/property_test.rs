use probabilistic_sketches::bloom::BloomFilter;
use probabilistic_sketches::count_min_sketch::CountMinSketch;
use probabilistic_sketches::hyperloglog::HyperLogLog;
use probabilistic_sketches::{double_hash_index, SipHasherBuilder};
use proptest::prelude::*;
use std::collections::HashMap;

fn arb_hasher() -> impl Strategy<Value = SipHasherBuilder> {
    (any::<u64>(), any::<u64>()).prop_map(|(k0, k1)| SipHasherBuilder::from_seed(k0, k1))
}

proptest! {
    #[test]
    fn double_hash_index_in_range(
        hash1 in any::<u64>(),
        hash2 in any::<u64>(),
        round in 0u64..64,
        modulus in 1usize..100_000,
    ) {
        prop_assert!(double_hash_index(hash1, hash2, round, modulus) < modulus);
    }

    #[test]
    fn bloom_filter_has_no_false_negatives(
        hash_builder in arb_hasher(),
        bit_count in 1usize..2048,
        hasher_count in 1usize..12,
        items in prop::collection::vec("[a-z]{1,8}", 0..200),
        others in prop::collection::vec("[a-z]{1,8}", 0..200),
    ) {
        let mut filter = BloomFilter::<String>::with_hasher(bit_count, hasher_count, hash_builder)
            .unwrap();
        for item in &items {
            filter.insert(item.as_str());
            prop_assert!(filter.contains(item.as_str()));
        }
        for other in &others {
            filter.insert(other.as_str());
        }
        for item in &items {
            prop_assert!(filter.contains(item.as_str()));
        }
    }

    #[test]
    fn bloom_filter_duplicate_insert_is_idempotent(
        hash_builder in arb_hasher(),
        items in prop::collection::vec(any::<u32>(), 1..100),
    ) {
        let mut once = BloomFilter::<u32>::with_hasher(512, 5, hash_builder).unwrap();
        let mut twice = once.clone();
        for item in &items {
            once.insert(item);
            twice.insert(item);
            twice.insert(item);
        }
        prop_assert_eq!(&once, &twice);
        let queries = (0..50u32).map(|item| once.contains(&item)).collect::<Vec<_>>();
        let repeated = (0..50u32).map(|item| once.contains(&item)).collect::<Vec<_>>();
        prop_assert_eq!(queries, repeated);
    }

    #[test]
    fn count_min_sketch_never_undercounts(
        hash_builder in arb_hasher(),
        width in 1usize..64,
        depth in 1usize..8,
        inserts in prop::collection::vec((0u32..50, 1u64..10), 0..300),
    ) {
        let mut cms = CountMinSketch::<u32>::with_hasher(width, depth, hash_builder).unwrap();
        let mut exact = HashMap::new();
        for (item, count) in &inserts {
            cms.insert(item, *count);
            *exact.entry(*item).or_insert(0u64) += *count;
        }
        for (item, count) in &exact {
            let estimate = cms.estimate(item);
            prop_assert!(estimate >= *count);
            prop_assert!(estimate <= cms.total());
            prop_assert_eq!(estimate, cms.estimate(item));
        }
    }

    #[test]
    fn hyperloglog_is_duplicate_insensitive(
        hash_builder in arb_hasher(),
        precision in 4usize..12,
        items in prop::collection::vec(any::<u64>(), 0..500),
    ) {
        let mut once = HyperLogLog::<u64>::with_hasher(precision, hash_builder).unwrap();
        let mut twice = once.clone();
        for item in &items {
            once.insert(item);
        }
        for item in items.iter().chain(items.iter()) {
            twice.insert(item);
        }
        prop_assert_eq!(once.cardinality(), twice.cardinality());
        prop_assert_eq!(once.cardinality(), once.cardinality());
        prop_assert_eq!(items.is_empty(), once.is_empty());
    }

    #[test]
    fn hyperloglog_merge_is_commutative(
        hash_builder in arb_hasher(),
        left_items in prop::collection::vec(any::<u64>(), 0..300),
        right_items in prop::collection::vec(any::<u64>(), 0..300),
    ) {
        let mut left = HyperLogLog::<u64>::with_hasher(8, hash_builder).unwrap();
        let mut right = left.clone();
        for item in &left_items {
            left.insert(item);
        }
        for item in &right_items {
            right.insert(item);
        }
        let mut left_right = left.clone();
        left_right.merge(&right).unwrap();
        let mut right_left = right.clone();
        right_left.merge(&left).unwrap();
        prop_assert_eq!(left_right, right_left);
    }
}
