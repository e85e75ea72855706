// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::sync::Arc;

use legik_core::algorithm::{IterativeSolver, ParallelLeg};
use legik_core::lut::{self, Grid, LookupTable};
use legik_core::JointChain;

use crate::config::DumpConfig;

/// Progress is reported in steps of this percentage of cells.
const PROGRESS_STEP: usize = 5;

/// Tracks solved cells and yields the percentage to report.
struct Progress {
    done: usize,
    total: usize,
    next: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            done: 0,
            total,
            next: PROGRESS_STEP,
        }
    }

    /// Add solved cells, returns the reached percentage when a step is crossed.
    ///
    /// The percentage is rounded down to a multiple of the step.
    fn advance(&mut self, cells: usize) -> Option<usize> {
        self.done = (self.done + cells).min(self.total);

        let percent = if self.total == 0 {
            100
        } else {
            self.done * 100 / self.total
        };

        if percent < self.next {
            return None;
        }

        let reached = percent - (percent % PROGRESS_STEP);
        self.next = reached + PROGRESS_STEP;

        Some(reached)
    }
}

struct Problem {
    grid: Grid,
    solver: IterativeSolver,
    chain: JointChain,
    leg: ParallelLeg,
}

/// Solve every grid cell.
///
/// Rows are solved on the blocking thread pool with at most `workers` rows in
/// flight. Every cell starts from the zero pose, so the result does not
/// depend on the number of workers.
pub(crate) async fn sweep(config: &DumpConfig, workers: usize) -> anyhow::Result<LookupTable> {
    let problem = Arc::new(Problem {
        grid: config.grid,
        solver: config.solver.solver(),
        chain: config.leg.chain(),
        leg: config.leg.kinematics(),
    });

    let semaphore = Arc::new(tokio::sync::Semaphore::new(workers));
    let height = problem.grid.y.steps();

    let mut handles = Vec::with_capacity(height);

    for y_index in 0..height {
        let permit = semaphore.clone().acquire_owned().await?;
        let problem = problem.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let row = lut::sweep_row(
                &problem.grid,
                y_index,
                &problem.solver,
                &problem.chain,
                &problem.leg,
            );
            drop(permit);
            row
        }));
    }

    let mut table = LookupTable::new(problem.grid, problem.chain.len())
        .set_failure_angle(config.output.failure_angle);

    let mut progress = Progress::new(problem.grid.len());

    for (y_index, handle) in handles.into_iter().enumerate() {
        let row = handle.await?;
        let cells = row.len();

        table.set_row(y_index, row);

        if let Some(percent) = progress.advance(cells) {
            log::info!(
                "Lookup table generation progress: {}% ({} of {} cells)",
                percent,
                progress.done,
                progress.total
            );
        }
    }

    Ok(table)
}
