// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A deterministic, sleep-driven stand-in for the real tiled-WSI
//! inference pipeline, which stays out of scope for this crate.

use crate::context::{ExecutionContext, ProgressReporter};
use crate::error::ExecutorError;
use crate::executor::{JobExecutor, JobOutcome};
use async_trait::async_trait;
use std::time::Duration;

/// Simulates processing `tile_count` tiles, sleeping `tick` between each
/// and reporting progress after every tile. An `image_path` ending in
/// `.fail` deterministically fails, for exercising the failure path in
/// tests without a real executor.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedExecutor {
    tile_count: u64,
    tick: Duration,
}

impl SimulatedExecutor {
    pub fn new(tile_count: u64, tick: Duration) -> Self {
        Self { tile_count, tick }
    }

    /// A near-instant variant for tests that care about ordering, not timing.
    pub fn fast() -> Self {
        Self::new(4, Duration::from_millis(1))
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(50))
    }
}

#[async_trait]
impl JobExecutor for SimulatedExecutor {
    async fn execute(&self, ctx: ExecutionContext, progress: ProgressReporter) -> Result<JobOutcome, ExecutorError> {
        if ctx.image_path.ends_with(".fail") {
            return Err(ExecutorError::Failed(format!("simulated failure processing {}", ctx.image_path)));
        }

        if self.tile_count == 0 {
            progress.report(1.0, 0, 0);
            return Ok(JobOutcome { result_path: Some(format!("sim://{}/result", ctx.job_id)) });
        }

        for tile in 1..=self.tile_count {
            tokio::time::sleep(self.tick).await;
            progress.report(tile as f64 / self.tile_count as f64, tile, self.tile_count);
        }

        Ok(JobOutcome { result_path: Some(format!("sim://{}/result", ctx.job_id)) })
    }
}

#[cfg(test)]
#[path = "simulated_tests.rs"]
mod tests;
