//! Primary and step hashes for double hashing.
//!
//! Each hash is split into a capacity-independent accumulator over the key
//! bytes (`primary_raw`, `step_raw`) and a reduction against a capacity
//! (`home_index`, `stride`). Entries keep the raw values so a resize never
//! re-reads key bytes.

use crate::config::StridePolicy;

/// The golden ratio conjugate (0.6180339887498948...) in 0.64 fixed point.
const GOLDEN_RATIO_FIXED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Rolling accumulator `c + (h << 6) + (h << 16) - h` over the key bytes.
#[inline]
pub fn primary_raw(key: &str) -> u64 {
    key.bytes().fold(0u64, |h, c| {
        u64::from(c)
            .wrapping_add(h << 6)
            .wrapping_add(h << 16)
            .wrapping_sub(h)
    })
}

/// Rolling accumulator `c + (h << 5) + h` over the key bytes.
#[inline]
pub fn step_raw(key: &str) -> u64 {
    key.bytes()
        .fold(0u64, |h, c| u64::from(c).wrapping_add(h << 5).wrapping_add(h))
}

/// Multiplicative hashing: `floor(capacity * frac(raw * 0.618...))`.
///
/// The fractional product is taken in fixed point; a float product has no
/// fractional bits left once `raw` passes 2^52. The constant is the 64-bit
/// expansion 0.6180339887498948..., not the ten-digit 0.6180339887, so for
/// mid-sized `raw` the index can differ by one slot from the float formula
/// with the shorter constant. Small values such as single bytes agree.
#[inline]
pub fn home_index(raw: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    let frac = raw.wrapping_mul(GOLDEN_RATIO_FIXED);
    let scaled = ((frac as u128 * capacity as u128) >> 64) as usize;
    scaled % capacity
}

/// Probe stride in `[1, capacity - 1]`. Requires `capacity >= 2`.
#[inline]
pub fn stride(raw: u64, capacity: usize, policy: StridePolicy) -> usize {
    debug_assert!(capacity >= 2);
    let s = (raw % (capacity as u64 - 1)) as usize + 1;
    match policy {
        // capacity - 1 is odd for a power-of-two capacity, so s | 1 stays in range.
        StridePolicy::Coprime => s | 1,
        StridePolicy::Unadjusted => s,
    }
}

/// Home index of `key` in a table of `capacity` slots.
pub fn primary_hash(key: &str, capacity: usize) -> usize {
    home_index(primary_raw(key), capacity)
}

/// Probe stride of `key` in a table of `capacity` slots.
pub fn step_hash(key: &str, capacity: usize, policy: StridePolicy) -> usize {
    stride(step_raw(key), capacity, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulators_match_hand_computed_values() {
        assert_eq!(primary_raw(""), 0);
        assert_eq!(step_raw(""), 0);
        assert_eq!(primary_raw("a"), 97);
        assert_eq!(step_raw("a"), 97);
        assert_eq!(primary_raw("hello"), 7_416_051_667_693_574_450);
        assert_eq!(step_raw("hello"), 127_086_708);
    }

    #[test]
    fn home_index_agrees_with_float_formula_for_small_hashes() {
        // 97 * 0.6180339887 = 59.949..., frac * 1024 = 972.08
        assert_eq!(primary_hash("a", 1024), 972);
        assert_eq!(primary_hash("b", 1024), 580);
        assert_eq!(primary_hash("c", 1024), 189);
        for raw in 0..256u64 {
            let float = ((raw as f64 * 0.6180339887).fract() * 1024.0) as usize;
            assert_eq!(home_index(raw, 1024), float, "raw {raw}");
        }
    }

    #[test]
    fn home_index_uses_the_full_width_constant() {
        // 5323 * 0.6180339887498948 = 3289.794922..., frac * 1024 = 814.0001
        // 5323 * 0.6180339887       = 3289.794921..., frac * 1024 = 813.9999
        assert_eq!(home_index(5323, 1024), 814);
    }

    #[test]
    fn home_index_stays_in_range() {
        for cap in [2usize, 4, 1024, 1 << 20] {
            for raw in [0u64, 1, 97, u64::MAX, 0xdead_beef_cafe_f00d] {
                assert!(home_index(raw, cap) < cap);
            }
        }
    }

    #[test]
    fn long_keys_do_not_collapse_onto_one_index() {
        let cap = 1024;
        let mut seen = std::collections::BTreeSet::new();
        for i in 0..256 {
            seen.insert(primary_hash(&format!("a-rather-long-key-{i:08}"), cap));
        }
        assert!(seen.len() > 150, "only {} distinct home indices", seen.len());
    }

    #[test]
    fn stride_is_never_zero_and_below_capacity() {
        for cap in [2usize, 4, 8, 1024] {
            for raw in [0u64, 1, 2, 97, u64::MAX] {
                for policy in [StridePolicy::Coprime, StridePolicy::Unadjusted] {
                    let s = stride(raw, cap, policy);
                    assert!(s >= 1 && s < cap, "stride {s} for cap {cap}");
                }
            }
        }
    }

    #[test]
    fn coprime_policy_forces_odd_stride() {
        // "a": 97 % 3 + 1 = 2 raw, 3 when forced odd.
        assert_eq!(step_hash("a", 4, StridePolicy::Unadjusted), 2);
        assert_eq!(step_hash("a", 4, StridePolicy::Coprime), 3);
        for raw in 0..2048u64 {
            assert_eq!(stride(raw, 1024, StridePolicy::Coprime) % 2, 1);
        }
    }
}
