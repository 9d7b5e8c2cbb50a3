//! Simulation statistics and AMAT derivation.
//!
//! This module turns the raw counters of a finished run into a report:
//! 1. **Per level:** hits, misses, hit rate, and the level's weighted
//!    contribution to the average memory access time.
//! 2. **AMAT:** each level's latency weighted by the probability the
//!    reference descends that far, plus the memory term.
//! 3. **Traffic:** main-memory read and write counts.
//! 4. **Timing:** simulated cycles and host wall-clock time of the run.

use std::time::Duration;

use crate::config::InclusionPolicy;
use crate::hierarchy::CacheHierarchy;
use crate::memory::MainMemory;

/// Derived statistics for one cache level.
#[derive(Clone, Debug)]
pub struct LevelReport {
    /// Level number from the configuration (1 = closest to CPU).
    pub level: u64,
    /// User accesses that hit this level.
    pub hits: u64,
    /// User accesses that missed this level.
    pub misses: u64,
    /// `hits / (hits + misses)`, zero when the level saw no accesses.
    pub hit_rate: f64,
    /// Configured access latency in cycles.
    pub latency: u64,
    /// This level's term in the AMAT sum: its latency weighted by the
    /// probability of reaching it.
    pub amat_contribution: f64,
    /// Inclusion relationship with the level above.
    pub inclusion: InclusionPolicy,
}

/// Full report for one simulated test.
#[derive(Clone, Debug)]
pub struct SimReport {
    /// Test name from the configuration.
    pub test_name: String,
    /// Per-level statistics, closest to the CPU first.
    pub levels: Vec<LevelReport>,
    /// Average memory access time in cycles.
    pub amat: f64,
    /// The memory term of the AMAT sum.
    pub memory_contribution: f64,
    /// Configured main-memory latency in cycles.
    pub memory_latency: u64,
    /// Reads served by main memory.
    pub memory_reads: u64,
    /// Writes absorbed by main memory.
    pub memory_writes: u64,
    /// References delivered to the hierarchy.
    pub total_accesses: u64,
    /// Read references in the trace.
    pub reads: u64,
    /// Write references in the trace.
    pub writes: u64,
    /// Total simulated latency over the run, memory included.
    pub sim_cycles: u64,
    /// Host wall-clock duration of the run.
    pub elapsed: Duration,
}

impl SimReport {
    /// Derives the report from a finished run's components.
    pub fn collect(
        test_name: &str,
        hierarchy: &CacheHierarchy,
        memory: &MainMemory,
        totals: RunTotals,
        elapsed: Duration,
    ) -> Self {
        // Probability that a reference descends past every level seen so
        // far; starts at 1 for level 1.
        let mut reach = 1.0;
        let mut amat = 0.0;
        let mut levels = Vec::with_capacity(hierarchy.levels().len());

        for cache in hierarchy.levels() {
            let hit_rate = hit_rate(cache.hits(), cache.misses());
            let contribution = reach * cache.latency() as f64;
            amat += contribution;
            levels.push(LevelReport {
                level: cache.level(),
                hits: cache.hits(),
                misses: cache.misses(),
                hit_rate,
                latency: cache.latency(),
                amat_contribution: contribution,
                inclusion: cache.inclusion(),
            });
            reach *= 1.0 - hit_rate;
        }

        let memory_contribution = reach * memory.latency() as f64;
        amat += memory_contribution;

        Self {
            test_name: test_name.to_owned(),
            levels,
            amat,
            memory_contribution,
            memory_latency: memory.latency(),
            memory_reads: memory.reads(),
            memory_writes: memory.writes(),
            total_accesses: totals.accesses,
            reads: totals.reads,
            writes: totals.writes,
            sim_cycles: totals.sim_cycles,
            elapsed,
        }
    }

    /// Prints the report as an aligned table to stdout.
    pub fn print(&self) {
        println!("\n==========================================================");
        println!("CACHE HIERARCHY SIMULATION — {}", self.test_name);
        println!("==========================================================");
        println!("host_seconds             {:.4} s", self.elapsed.as_secs_f64());
        println!("accesses                 {}", self.total_accesses);
        println!("reads                    {}", self.reads);
        println!("writes                   {}", self.writes);
        println!("sim_cycles               {}", self.sim_cycles);
        println!("----------------------------------------------------------");
        for level in &self.levels {
            println!(
                "  L{:<2} hits: {:<12} misses: {:<12} hit_rate: {:.2}%",
                level.level,
                level.hits,
                level.misses,
                level.hit_rate * 100.0
            );
            println!(
                "      latency: {:<4} contribution: {:<10.4} policy: {}",
                level.latency, level.amat_contribution, level.inclusion
            );
        }
        println!("----------------------------------------------------------");
        println!("  memory reads: {:<12} writes: {}", self.memory_reads, self.memory_writes);
        println!(
            "  memory latency: {:<6} contribution: {:.4}",
            self.memory_latency, self.memory_contribution
        );
        println!("----------------------------------------------------------");
        println!("AMAT                     {:.4} cycles", self.amat);
        println!("==========================================================");
    }
}

/// Raw counters the driver accumulates while feeding the trace.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunTotals {
    /// References delivered to the hierarchy.
    pub accesses: u64,
    /// Read references.
    pub reads: u64,
    /// Write references.
    pub writes: u64,
    /// Summed simulated latency, memory included.
    pub sim_cycles: u64,
}

/// `hits / (hits + misses)` with `0 / 0 = 0`.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
