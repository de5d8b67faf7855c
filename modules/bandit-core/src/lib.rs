//! Per-(domain, arm) feedback aggregates in Postgres, ranked with a
//! UCB1-style exploration/exploitation score.
//!
//! Two feedback channels per arm, deliberately decoupled: hits ("the arm
//! was tried N more times") and rewards ("the arm produced value R").
//! [`StatStore`] folds both into one durable row per key; [`score::rank`]
//! turns a batch of those rows into a deterministic ranking.

pub mod error;
pub mod score;
pub mod store;

pub use error::{BanditError, Result};
pub use score::{rank, RankedArm};
pub use store::{ArmAggregate, StatStore};
