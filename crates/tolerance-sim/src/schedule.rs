//! Batch arithmetic shared by every removal policy.
//!
//! # Overview
//!
//! A run removes `target = round(f × n)` of the `n` starting vertices
//! (round half to even). The target is split into batches of
//! `batch_size = floor(target / steps)`; when `steps` does not divide the
//! target the batches keep that size and a final, smaller batch carries the
//! remainder. So a run records `ceil(target / batch_size)` rows, which is
//! exactly `steps` whenever the division is even.
//!
//! ```rust
//! use tolerance_sim::BatchPlan;
//!
//! // 30% of 10 vertices in 2 steps: batches of 1, three rows.
//! let plan = BatchPlan::new(0.3, 2, 10)?;
//! assert_eq!(plan.target(), 3);
//! assert_eq!(plan.batch_sizes(), vec![1, 1, 1]);
//! # Ok::<(), tolerance_sim::SimError>(())
//! ```

use serde::Serialize;

use crate::error::SimError;

/// Number of vertices a run with fraction `fraction` removes from
/// `node_count` vertices.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn removal_target(fraction: f64, node_count: usize) -> usize {
    let target = (fraction * node_count as f64).round_ties_even();
    if target <= 0.0 {
        0
    } else {
        (target as usize).min(node_count)
    }
}

/// Validated batch layout for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    node_count: usize,
    target: usize,
    batch_size: usize,
}

impl BatchPlan {
    /// Lay out `steps` batches removing `fraction` of `node_count` vertices.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] if `fraction` is not in
    /// `(0, 1]`, `steps` is zero, or the batch size would be zero.
    pub fn new(fraction: f64, steps: usize, node_count: usize) -> Result<Self, SimError> {
        check_fraction(fraction)?;
        check_steps(steps)?;
        let target = removal_target(fraction, node_count);
        let batch_size = target / steps;
        if batch_size < 1 {
            return Err(SimError::invalid("steps greater than nodes to be removed"));
        }
        Ok(Self {
            node_count,
            target,
            batch_size,
        })
    }

    /// Vertices in the graph when the run started.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Total vertices the run removes.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Size of every batch but possibly the last.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches, and so of result rows.
    #[must_use]
    pub const fn batch_count(&self) -> usize {
        self.target.div_ceil(self.batch_size)
    }

    /// Size of each batch in application order.
    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        (0..self.batch_count())
            .map(|i| {
                let start = i * self.batch_size;
                self.batch_size.min(self.target - start)
            })
            .collect()
    }

    /// Fraction of the starting vertices gone after `removed` removals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction_removed(&self, removed: usize) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            removed as f64 / self.node_count as f64
        }
    }
}

/// Disjoint batches of vertex ids, fixed before the first removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalSchedule {
    batches: Vec<Vec<String>>,
}

impl RemovalSchedule {
    /// Split an ordered removal pool into batches following `plan`.
    ///
    /// The pool must hold exactly `plan.target()` distinct ids.
    #[must_use]
    pub fn from_pool(pool: &[String], plan: &BatchPlan) -> Self {
        let batches = pool
            .chunks(plan.batch_size())
            .map(<[String]>::to_vec)
            .collect();
        Self { batches }
    }

    /// Batches in application order.
    #[must_use]
    pub fn batches(&self) -> &[Vec<String>] {
        &self.batches
    }

    /// Every scheduled id in removal order.
    #[must_use]
    pub fn order(&self) -> Vec<String> {
        self.batches.iter().flatten().cloned().collect()
    }
}

pub(crate) fn check_fraction(fraction: f64) -> Result<(), SimError> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(SimError::invalid(format!(
            "fraction must be in (0, 1], got {fraction}"
        )))
    }
}

pub(crate) fn check_steps(steps: usize) -> Result<(), SimError> {
    if steps == 0 {
        return Err(SimError::invalid("steps must be at least 1"));
    }
    Ok(())
}
