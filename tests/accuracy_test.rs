use probabilistic_sketches::bloom::BloomFilter;
use probabilistic_sketches::count_min_sketch::CountMinSketch;
use probabilistic_sketches::hyperloglog::HyperLogLog;
use probabilistic_sketches::SipHasherBuilder;
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::collections::{HashMap, HashSet};

fn random_strings(rng: &mut XorShiftRng, count: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    while seen.len() < count {
        let len = rng.gen_range(4, 12usize);
        let item: String = (0..len).map(|_| rng.sample(Alphanumeric)).collect();
        seen.insert(item);
    }
    seen.into_iter().collect()
}

#[test]
fn bloom_filter_false_positive_rate() {
    let item_count = 10_000;
    let fpp = 0.01;
    let mut filter = BloomFilter::<u64>::optimally_sized_with_hasher(
        item_count,
        fpp,
        SipHasherBuilder::from_seed(7, 11),
    )
    .unwrap();

    for item in 0..item_count as u64 {
        filter.insert(&item);
    }
    for item in 0..item_count as u64 {
        assert!(filter.contains(&item));
    }

    let queries = 100_000u64;
    let false_positives = (item_count as u64..item_count as u64 + queries)
        .filter(|item| filter.contains(item))
        .count();
    let observed = false_positives as f64 / queries as f64;

    assert!(observed < fpp * 3.0, "observed fpp {}", observed);
    assert!(filter.estimated_fpp() < fpp * 3.0);
}

#[test]
fn bloom_filter_saturates_past_capacity() {
    let mut filter =
        BloomFilter::<u64>::optimally_sized_with_hasher(100, 0.01, SipHasherBuilder::from_seed(1, 2))
            .unwrap();
    for item in 0..5_000u64 {
        filter.insert(&item);
    }
    let false_positives = (5_000..6_000u64)
        .filter(|item| filter.contains(item))
        .count();
    assert!(false_positives > 900);
}

#[test]
fn count_min_sketch_error_bound() {
    let epsilon = 0.001;
    let delta = 0.01;
    let mut rng = XorShiftRng::seed_from_u64(42);

    let mut cms =
        CountMinSketch::<u32>::from_error_with_hasher(epsilon, delta, SipHasherBuilder::from_seed(3, 5))
            .unwrap();
    let mut exact = HashMap::new();
    for _ in 0..100_000 {
        // Skewed toward small keys.
        let key = rng.gen_range(0, 1000u32) % rng.gen_range(1, 1000u32);
        let count = rng.gen_range(1, 4u64);
        cms.insert(&key, count);
        *exact.entry(key).or_insert(0u64) += count;
    }

    let total: u64 = exact.values().sum();
    assert_eq!(cms.total(), total);

    let bound = (epsilon * total as f64).ceil() as u64;
    let mut violations = 0;
    for (key, count) in &exact {
        let estimate = cms.estimate(key);
        assert!(estimate >= *count);
        if estimate > count + bound {
            violations += 1;
        }
    }
    assert!(
        (violations as f64) <= (delta * exact.len() as f64).ceil() + 1.0,
        "{} of {} estimates exceeded the bound",
        violations,
        exact.len()
    );
}

#[test]
fn count_min_sketch_unseen_items() {
    let mut cms =
        CountMinSketch::<u32>::from_error_with_hasher(0.01, 0.01, SipHasherBuilder::from_seed(9, 9))
            .unwrap();
    for key in 0..100u32 {
        cms.insert(&key, 1);
    }
    let total = cms.total();
    for key in 1000..1100u32 {
        assert!(cms.estimate(&key) <= total);
    }
}

#[test]
fn hyperloglog_accuracy_small_strings() {
    let rsd = 0.01;
    let mut within = 0;
    let trials = 20;
    for trial in 0..trials {
        let mut rng = XorShiftRng::seed_from_u64(trial);
        let items = random_strings(&mut rng, 1000);
        let mut hhl = HyperLogLog::<String>::from_rsd_with_hasher(
            rsd,
            SipHasherBuilder::from_seed(trial, trial + 1),
        )
        .unwrap();
        for item in &items {
            hhl.insert(item.as_str());
        }
        let estimate = hhl.cardinality() as f64;
        if (estimate - 1000.0).abs() <= 3.0 * rsd * 1000.0 {
            within += 1;
        }
    }
    assert!(within >= trials - 2, "{} of {} trials within bound", within, trials);
}

#[test]
fn hyperloglog_accuracy_large_cardinality() {
    let precisions = [10usize, 12, 14];
    for &precision in &precisions {
        let mut hhl =
            HyperLogLog::<u64>::with_hasher(precision, SipHasherBuilder::from_seed(13, 17))
                .unwrap();
        let n = 200_000u64;
        for item in 0..n {
            hhl.insert(&item);
        }
        let estimate = hhl.cardinality() as f64;
        let tolerance = 4.0 * hhl.relative_standard_deviation() * n as f64;
        assert!(
            (estimate - n as f64).abs() <= tolerance,
            "precision {}: estimated {} for {}",
            precision,
            estimate,
            n
        );
    }
}

#[test]
fn hyperloglog_ignores_duplicates() {
    let mut hhl = HyperLogLog::<u64>::with_hasher(12, SipHasherBuilder::from_seed(0, 1)).unwrap();
    for _ in 0..10 {
        for item in 0..500u64 {
            hhl.insert(&item);
        }
    }
    let mut single = HyperLogLog::<u64>::with_hasher(12, SipHasherBuilder::from_seed(0, 1)).unwrap();
    for item in 0..500u64 {
        single.insert(&item);
    }
    assert_eq!(hhl, single);
    assert_eq!(hhl.cardinality(), single.cardinality());
}

#[test]
fn hyperloglog_merge_matches_union() {
    let hash_builder = SipHasherBuilder::from_seed(21, 34);
    let mut left = HyperLogLog::<u64>::with_hasher(12, hash_builder).unwrap();
    let mut right = HyperLogLog::<u64>::with_hasher(12, hash_builder).unwrap();
    let mut both = HyperLogLog::<u64>::with_hasher(12, hash_builder).unwrap();
    for item in 0..3_000u64 {
        left.insert(&item);
        both.insert(&item);
    }
    for item in 2_000..6_000u64 {
        right.insert(&item);
        both.insert(&item);
    }
    left.merge(&right).unwrap();
    assert_eq!(left, both);
}
