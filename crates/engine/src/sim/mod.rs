//! Simulation driver.
//!
//! Owns the hierarchy and main memory side-by-side and feeds a trace
//! through them in order, one access at a time. The hierarchy reports
//! what it did; the driver charges main memory for full misses and for
//! the write-back and write-through traffic the hierarchy surfaces, then
//! collects the final report.

use std::time::Instant;

use crate::common::access::{AccessKind, MemoryAccess};
use crate::common::error::{ConfigError, TraceError};
use crate::config::SimConfig;
use crate::hierarchy::CacheHierarchy;
use crate::memory::MainMemory;
use crate::metrics::{RunTotals, SimReport};
use crate::trace::Trace;

/// One configured test, ready to run.
#[derive(Clone, Debug)]
pub struct Simulator {
    test_name: String,
    hierarchy: CacheHierarchy,
    memory: MainMemory,
    totals: RunTotals,
    started: Instant,
}

impl Simulator {
    /// Builds the hierarchy and memory a configuration describes.
    ///
    /// # Errors
    ///
    /// Any geometry problem in the configuration surfaces here.
    pub fn from_config(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            test_name: config.test_name.clone(),
            hierarchy: CacheHierarchy::from_specs(&config.cache_hierarchy)?,
            memory: MainMemory::new(config.memory.access_latency),
            totals: RunTotals::default(),
            started: Instant::now(),
        })
    }

    /// Drives every access of `trace` through the hierarchy.
    ///
    /// # Errors
    ///
    /// A malformed trace line aborts the run with the offending line
    /// number; everything simulated up to that point is discarded with it.
    pub fn run(&mut self, trace: &mut Trace) -> Result<SimReport, TraceError> {
        self.started = Instant::now();
        for item in trace {
            self.step(item?);
        }
        let report = self.report();
        tracing::debug!(
            test = %self.test_name,
            accesses = self.totals.accesses,
            amat = report.amat,
            "run complete"
        );
        Ok(report)
    }

    /// The report for everything simulated so far.
    pub fn report(&self) -> SimReport {
        SimReport::collect(
            &self.test_name,
            &self.hierarchy,
            &self.memory,
            self.totals,
            self.started.elapsed(),
        )
    }

    /// Simulates a single access.
    pub fn step(&mut self, access: MemoryAccess) {
        self.totals.accesses += 1;
        match access.kind {
            AccessKind::Read => self.totals.reads += 1,
            AccessKind::Write => self.totals.writes += 1,
        }

        let outcome = self.hierarchy.access(access.address, access.kind);
        self.totals.sim_cycles += outcome.latency;
        if !outcome.hit {
            self.totals.sim_cycles += self.memory.access(access.address, access.kind);
        }

        // Write-backs and write-through stores retire off the critical
        // path; only the traffic counter matters.
        for _ in 0..outcome.memory_writebacks + outcome.memory_write_throughs {
            let _ = self.memory.access(access.address, AccessKind::Write);
        }
    }

    /// Restores the simulator to its freshly-built state.
    pub fn reset(&mut self) {
        self.hierarchy.reset();
        self.memory.reset();
        self.totals = RunTotals::default();
        self.started = Instant::now();
    }

    /// Test name from the configuration.
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// The cache tower.
    pub fn hierarchy(&self) -> &CacheHierarchy {
        &self.hierarchy
    }

    /// The main memory behind the tower.
    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }
}
