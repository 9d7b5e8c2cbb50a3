//! Write-Through Propagation Tests.
//!
//! A write satisfied at a write-through level repeats as a synthetic
//! write access at the next level down; a store that falls past the last
//! cache level is surfaced for the driver to charge to main memory.
//! Write-through levels never mark entries dirty.

use cachesim_core::common::access::AccessKind::{Read, Write};
use cachesim_core::hierarchy::CacheHierarchy;

use crate::common::direct_mapped;

/// Write-through L1 over a write-back L2: the store is absorbed below.
fn wt_over_wb() -> CacheHierarchy {
    let mut l1 = direct_mapped(1, 128, 64);
    l1.write_back = false;
    let mut l2 = direct_mapped(2, 256, 64);
    l2.access_latency = 10;
    CacheHierarchy::from_specs(&[l1, l2]).unwrap()
}

/// A write hit at write-through L1 lands in L2 as a dirty block; the L1
/// copy stays clean.
#[test]
fn write_hit_propagates_to_l2() {
    let mut hierarchy = wt_over_wb();

    let _ = hierarchy.access(0x0, Write);
    let outcome = hierarchy.access(0x0, Write);
    assert!(outcome.hit);
    assert_eq!(outcome.memory_write_throughs, 0, "write-back L2 absorbs the store");

    assert!(!hierarchy.levels()[0].get_entry(0x0).unwrap().dirty);
    assert!(hierarchy.levels()[1].get_entry(0x0).unwrap().dirty);
}

/// The synthetic write counts as an access at L2.
#[test]
fn propagated_write_counts_at_l2() {
    let mut hierarchy = wt_over_wb();

    let _ = hierarchy.access(0x0, Write); // L2 miss (allocating)
    let _ = hierarchy.access(0x0, Write); // L1 hit, synthetic L2 write: hit
    let l2 = &hierarchy.levels()[1];
    assert_eq!(l2.misses(), 1);
    assert_eq!(l2.hits(), 1);
}

/// With a single write-through level, every write hit falls out of the
/// tower and must reach memory.
#[test]
fn single_level_write_through_reaches_memory() {
    let mut l1 = direct_mapped(1, 128, 64);
    l1.write_back = false;
    let mut hierarchy = CacheHierarchy::from_specs(&[l1]).unwrap();

    let first = hierarchy.access(0x0, Write);
    assert!(!first.hit);
    assert_eq!(first.memory_write_throughs, 0, "the miss itself reaches memory");

    let second = hierarchy.access(0x0, Write);
    assert!(second.hit);
    assert_eq!(second.memory_write_throughs, 1);
}

/// Reads never trigger propagation.
#[test]
fn reads_do_not_propagate() {
    let mut hierarchy = wt_over_wb();

    let _ = hierarchy.access(0x0, Read);
    let outcome = hierarchy.access(0x0, Read);
    assert!(outcome.hit);
    assert_eq!(outcome.latency, 1, "an L1 read hit touches nothing below");

    let l2 = &hierarchy.levels()[1];
    assert_eq!(l2.hits() + l2.misses(), 1);
}

/// A dirty write-back victim falling out of the last level is surfaced
/// as memory write traffic.
#[test]
fn last_level_dirty_eviction_is_surfaced() {
    let l1 = direct_mapped(1, 128, 64);
    let mut hierarchy = CacheHierarchy::from_specs(&[l1]).unwrap();

    let _ = hierarchy.access(0x0, Write);
    let outcome = hierarchy.access(0x80, Read);
    assert_eq!(outcome.memory_writebacks, 1);
}
