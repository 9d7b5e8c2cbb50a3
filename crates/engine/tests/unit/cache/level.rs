//! Cache Level Unit Tests.
//!
//! Exercises one level in isolation: hit/miss classification, allocation
//! and eviction reporting, dirty write-back detection, forced installs,
//! invalidation, and the counters. Geometries are tiny so every set
//! conflict is visible by hand.

use cachesim_core::cache::{CacheEntry, CacheLevel};
use cachesim_core::common::access::AccessKind::{Read, Write};
use pretty_assertions::assert_eq;

use crate::common::{direct_mapped, fully_associative, set_associative};

// ══════════════════════════════════════════════════════════
// 1. Direct-mapped conflicts
// ══════════════════════════════════════════════════════════

/// 256 B direct-mapped, 64 B blocks: 4 sets, one way each.
///
/// 0x0 and 0x100 collide in set 0; 0x40 sits alone in set 1. Every
/// re-reference of a collided address evicts the other.
#[test]
fn direct_mapped_conflict_chain() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let outcomes: Vec<bool> = [0x0u64, 0x0, 0x100, 0x0, 0x40, 0x100]
        .iter()
        .map(|&addr| cache.access(addr, Read).hit)
        .collect();

    assert_eq!(outcomes, vec![false, true, false, false, false, false]);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 5);
}

/// The conflicting install reports the displaced block's address.
#[test]
fn conflict_eviction_reports_victim_address() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let _ = cache.access(0x0, Read);
    let outcome = cache.access(0x100, Read);

    assert!(!outcome.hit);
    assert_eq!(outcome.evicted_address, Some(0x0));
    let entry = outcome.evicted_entry.unwrap();
    assert!(entry.valid);
    assert!(!entry.dirty);
}

/// Accesses within one block hit regardless of offset.
#[test]
fn same_block_different_offset_hits() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let _ = cache.access(0x1000, Read);
    assert!(cache.access(0x1000 + 32, Read).hit);
    assert!(cache.access(0x1000 + 63, Write).hit);
}

// ══════════════════════════════════════════════════════════
// 2. Set-associative LRU ordering
// ══════════════════════════════════════════════════════════

/// 256 B 2-way, 64 B blocks: 2 sets. 0x0, 0x80, 0x100 all map to set 0.
///
/// Once a third block enters the set, each successive re-reference
/// evicts the least recently used survivor, so the tail of the sequence
/// is all misses.
#[test]
fn two_way_lru_eviction_order() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();
    let (a, b, c) = (0x0u64, 0x80u64, 0x100u64);

    let outcomes: Vec<bool> = [a, b, a, b, c, a, b]
        .iter()
        .map(|&addr| cache.access(addr, Read).hit)
        .collect();

    assert_eq!(
        outcomes,
        vec![false, false, true, true, false, false, false]
    );

    // The tail displaced a, then b, then c; a and b were refetched.
    assert!(cache.probe(a).is_some());
    assert!(cache.probe(b).is_some());
    assert!(cache.probe(c).is_none());
}

/// A hit refreshes recency: the untouched way is the one displaced.
#[test]
fn hit_protects_block_from_eviction() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();
    let (a, b, c) = (0x0u64, 0x80u64, 0x100u64);

    let _ = cache.access(a, Read);
    let _ = cache.access(b, Read);
    let _ = cache.access(a, Read);

    let outcome = cache.access(c, Read);
    assert_eq!(outcome.evicted_address, Some(b));
    assert!(cache.probe(a).is_some());
}

// ══════════════════════════════════════════════════════════
// 3. Write-back and dirty state
// ══════════════════════════════════════════════════════════

/// Read, write, then conflict: the displaced block is dirty, so the
/// outcome raises the write-back flag and names the victim.
#[test]
fn dirty_eviction_raises_writeback() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let _ = cache.access(0x0, Read);
    let _ = cache.access(0x0, Write);
    let outcome = cache.access(0x100, Read);

    assert!(!outcome.hit);
    assert!(outcome.writeback);
    assert_eq!(outcome.evicted_address, Some(0x0));
    assert!(outcome.evicted_entry.unwrap().dirty);
}

/// Clean evictions never raise the write-back flag.
#[test]
fn clean_eviction_has_no_writeback() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let _ = cache.access(0x0, Read);
    let outcome = cache.access(0x100, Read);

    assert!(!outcome.writeback);
    assert_eq!(outcome.evicted_address, Some(0x0));
}

/// A write miss with write-allocate installs the block already dirty.
#[test]
fn write_allocate_installs_dirty() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let outcome = cache.access(0x0, Write);
    assert!(!outcome.hit);
    let entry = cache.get_entry(0x0).unwrap();
    assert!(entry.dirty);
}

/// Write-through levels never set the dirty bit, so their evictions
/// never write back.
#[test]
fn write_through_never_dirties() {
    let mut spec = direct_mapped(1, 256, 64);
    spec.write_back = false;
    let mut cache = CacheLevel::new(&spec).unwrap();

    let _ = cache.access(0x0, Write);
    assert!(!cache.get_entry(0x0).unwrap().dirty);

    let _ = cache.access(0x0, Write);
    assert!(!cache.get_entry(0x0).unwrap().dirty);

    let outcome = cache.access(0x100, Read);
    assert!(!outcome.writeback);
}

/// Without write-allocate, a write miss leaves the array untouched.
#[test]
fn no_write_allocate_skips_install() {
    let mut spec = direct_mapped(1, 256, 64);
    spec.write_allocate = false;
    let mut cache = CacheLevel::new(&spec).unwrap();

    let outcome = cache.access(0x0, Write);
    assert!(!outcome.hit);
    assert!(outcome.evicted_address.is_none());
    assert!(cache.get_entry(0x0).is_none());
    assert_eq!(cache.misses(), 1);

    // The block was never installed, so the read misses too.
    assert!(!cache.access(0x0, Read).hit);
}

// ══════════════════════════════════════════════════════════
// 4. Forced installs
// ══════════════════════════════════════════════════════════

/// A forced install never moves the hit/miss counters.
#[test]
fn force_install_does_not_count() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();

    let entry = CacheEntry {
        valid: true,
        dirty: false,
        tag: 0,
    };
    let _ = cache.force_install(0x0, entry, Read);

    assert_eq!(cache.hits(), 0);
    assert_eq!(cache.misses(), 0);
    assert!(cache.probe(0x0).is_some());
}

/// Installing over a resident tag overwrites in place, keeping the
/// caller's dirty flag.
#[test]
fn force_install_overwrites_resident_tag() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();

    let _ = cache.access(0x0, Read);
    assert!(!cache.get_entry(0x0).unwrap().dirty);

    let dirty = CacheEntry {
        valid: true,
        dirty: true,
        tag: 0,
    };
    let outcome = cache.force_install(0x0, dirty, Read);

    assert!(outcome.evicted_address.is_none());
    assert!(cache.get_entry(0x0).unwrap().dirty);
}

/// A write-kind install into a write-back level forces the dirty bit.
#[test]
fn force_install_write_forces_dirty() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();

    let clean = CacheEntry {
        valid: true,
        dirty: false,
        tag: 0,
    };
    let _ = cache.force_install(0x0, clean, Write);

    assert!(cache.get_entry(0x0).unwrap().dirty);
}

/// A forced install into a full set displaces a victim like any miss.
#[test]
fn force_install_evicts_when_full() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    let _ = cache.access(0x0, Write);
    let entry = CacheEntry {
        valid: true,
        dirty: false,
        tag: 99,
    };
    let outcome = cache.force_install(0x100, entry, Read);

    assert_eq!(outcome.evicted_address, Some(0x0));
    assert!(outcome.writeback);
}

// ══════════════════════════════════════════════════════════
// 5. Invalidate, probe, reset
// ══════════════════════════════════════════════════════════

/// Invalidation removes the block; doing it twice is the same as once.
#[test]
fn invalidate_is_idempotent() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();

    let _ = cache.access(0x0, Write);
    cache.invalidate(0x0);
    assert!(cache.get_entry(0x0).is_none());

    cache.invalidate(0x0);
    assert!(cache.get_entry(0x0).is_none());
    assert_eq!(cache.misses(), 1);
}

/// Probing neither counts nor refreshes recency.
#[test]
fn probe_is_pure() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();
    let (a, b, c) = (0x0u64, 0x80u64, 0x100u64);

    let _ = cache.access(a, Read);
    let _ = cache.access(b, Read);

    // Probing `a` must not promote it.
    assert!(cache.probe(a).is_some());

    let outcome = cache.access(c, Read);
    assert_eq!(outcome.evicted_address, Some(a));
    assert_eq!(cache.hits(), 0);
    assert_eq!(cache.misses(), 3);
}

/// After reset, the cache replays a sequence exactly like a fresh one.
#[test]
fn reset_restores_initial_state() {
    let sequence = [0x0u64, 0x80, 0x0, 0x100, 0x40, 0x0];

    let mut used = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();
    let first: Vec<bool> = sequence.iter().map(|&a| used.access(a, Read).hit).collect();

    used.reset();
    assert_eq!(used.hits(), 0);
    assert_eq!(used.misses(), 0);

    let replay: Vec<bool> = sequence.iter().map(|&a| used.access(a, Read).hit).collect();
    assert_eq!(first, replay);
}

// ══════════════════════════════════════════════════════════
// 6. Boundary geometries
// ══════════════════════════════════════════════════════════

/// Block size equal to cache size: a one-entry cache.
#[test]
fn single_entry_cache() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 64, 64)).unwrap();
    assert_eq!(cache.num_sets(), 1);
    assert_eq!(cache.num_ways(), 1);

    assert!(!cache.access(0x0, Read).hit);
    assert!(cache.access(0x3F, Read).hit);
    assert!(!cache.access(0x40, Read).hit);
    assert!(!cache.access(0x0, Read).hit);
}

/// Fully-associative: one set spanning the whole cache, LRU across it.
#[test]
fn fully_associative_single_set() {
    let mut cache = CacheLevel::new(&fully_associative(1, 256, 64)).unwrap();
    assert_eq!(cache.num_sets(), 1);
    assert_eq!(cache.num_ways(), 4);

    for addr in [0x0u64, 0x1000, 0x2000, 0x3000] {
        assert!(!cache.access(addr, Read).hit);
    }
    // All four coexist despite sharing the single set.
    for addr in [0x0u64, 0x1000, 0x2000, 0x3000] {
        assert!(cache.access(addr, Read).hit);
    }

    // A fifth block displaces the least recently used, 0x0.
    let outcome = cache.access(0x4000, Read);
    assert_eq!(outcome.evicted_address, Some(0x0));
}

/// Extreme addresses survive decomposition and round-trip through the
/// eviction report.
#[test]
fn extreme_addresses_round_trip() {
    let mut cache = CacheLevel::new(&direct_mapped(1, 256, 64)).unwrap();

    assert!(!cache.access(u64::MAX, Read).hit);
    assert!(cache.access(u64::MAX, Read).hit);

    // u64::MAX lives in set 3; 0xC0 collides with it.
    let outcome = cache.access(0xC0, Read);
    assert_eq!(outcome.evicted_address, Some(u64::MAX & !63));
}

/// Counters always add up to the accesses delivered.
#[test]
fn counters_sum_to_accesses() {
    let mut cache = CacheLevel::new(&set_associative(1, 256, 64, 2)).unwrap();
    let addresses = [0x0u64, 0x40, 0x80, 0xC0, 0x100, 0x0, 0x40, 0x200];

    for (i, &addr) in addresses.iter().enumerate() {
        let kind = if i % 3 == 0 { Write } else { Read };
        let _ = cache.access(addr, kind);
    }
    assert_eq!(cache.hits() + cache.misses(), addresses.len() as u64);
}
