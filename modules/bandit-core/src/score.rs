//! UCB1-style ranking over a batch of arm aggregates.
//!
//! Pure and deterministic: no storage access, and score ties are broken by
//! arm identifier so the same input always produces the same order.

use serde::Serialize;

use crate::store::ArmAggregate;

/// One ranked arm, highest score first in [`rank`]'s output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedArm {
    pub arm: String,
    pub score: f64,
}

/// Rank arms by mean reward plus a UCB1 exploration bonus:
///
/// `score = mean_reward + sqrt(2 * ln(T) / hits)`
///
/// where `T` is the hit total over exactly the supplied batch — the
/// candidate set is the universe the caller is choosing from, not the
/// whole domain. The first term rewards observed payoff, the second
/// rewards under-explored arms and shrinks as `hits` grows.
///
/// Arms with zero hits have no defined exploration term and are skipped;
/// the store's read contract already excludes them. An empty batch ranks
/// to an empty vec.
pub fn rank(stats: &[(String, ArmAggregate)]) -> Vec<RankedArm> {
    let total_hits: i64 = stats.iter().map(|(_, agg)| agg.hits).sum();
    if total_hits == 0 {
        return Vec::new();
    }
    // Every included arm has hits > 0, so T >= 1 and ln(T) is defined.
    let ln_total = (total_hits as f64).ln();

    let mut ranked: Vec<RankedArm> = stats
        .iter()
        .filter(|(_, agg)| agg.hits > 0)
        .map(|(arm, agg)| RankedArm {
            arm: arm.clone(),
            score: agg.mean_reward() + (2.0 * ln_total / agg.hits as f64).sqrt(),
        })
        .collect();

    // Descending score, ascending arm id on ties — a total order.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.arm.cmp(&b.arm))
    });

    ranked
}
