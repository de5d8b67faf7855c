//! Postgres persistence for per-(domain, arm) feedback aggregates.
//!
//! One row per key, created lazily by the first event and updated in place
//! by every later one. Every mutation is a single atomic upsert — there is
//! no find-or-create step, so concurrent first writes for the same key can
//! neither lose updates nor leave duplicate rows.

use sqlx::PgPool;

use crate::error::{BanditError, Result};

/// Running aggregate for one (domain, arm) key.
///
/// `hits` and `reward_count` are independent counters: an arm can be shown
/// without ever converting, and vice versa. Nothing forces
/// `reward_count <= hits`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmAggregate {
    pub hits: i64,
    pub reward_sum: f64,
    pub reward_count: i64,
}

impl ArmAggregate {
    /// Mean observed reward, 0.0 before the first reward lands.
    pub fn mean_reward(&self) -> f64 {
        if self.reward_count == 0 {
            0.0
        } else {
            self.reward_sum / self.reward_count as f64
        }
    }
}

/// Durable store for arm feedback. Owns all aggregate state; the pool is a
/// shared handle injected at construction.
#[derive(Clone)]
pub struct StatStore {
    pool: PgPool,
}

impl StatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add `delta` trial events to an arm, creating the row if absent.
    ///
    /// N concurrent calls with delta=1 on a fresh key leave `hits == N`.
    pub async fn record_hit(&self, domain: &str, arm: &str, delta: i64) -> Result<()> {
        validate_key(domain, arm)?;
        if delta < 1 {
            return Err(BanditError::InvalidInput(format!(
                "hit delta must be >= 1, got {delta}"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO bandit_stat (domain, arm, hits)
            VALUES ($1, $2, $3)
            ON CONFLICT (domain, arm)
            DO UPDATE SET hits = bandit_stat.hits + EXCLUDED.hits
            "#,
        )
        .bind(domain)
        .bind(arm)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fold one reward observation into an arm's running sum/count,
    /// creating the row if absent.
    ///
    /// The sum/count pair keeps updates and mean computation O(1) with
    /// bounded storage per key, no matter how many rewards accumulate.
    pub async fn record_reward(&self, domain: &str, arm: &str, value: f64) -> Result<()> {
        validate_key(domain, arm)?;

        sqlx::query(
            r#"
            INSERT INTO bandit_stat (domain, arm, reward_sum, reward_count)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (domain, arm)
            DO UPDATE SET reward_sum   = bandit_stat.reward_sum + EXCLUDED.reward_sum,
                          reward_count = bandit_stat.reward_count + 1
            "#,
        )
        .bind(domain)
        .bind(arm)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Current aggregates for the requested arms that have recorded hits.
    ///
    /// Arms with no hits, or never seen, are simply absent from the result —
    /// never an error. Rows may reflect different instants relative to
    /// concurrent writers; the consumer is a heuristic ranking, not a ledger.
    pub async fn batch_read(
        &self,
        domain: &str,
        arms: &[String],
    ) -> Result<Vec<(String, ArmAggregate)>> {
        if domain.is_empty() {
            return Err(BanditError::InvalidInput(
                "domain must not be empty".to_string(),
            ));
        }
        if arms.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, StatRow>(
            r#"
            SELECT arm, hits, reward_sum, reward_count
            FROM bandit_stat
            WHERE domain = $1 AND arm = ANY($2) AND hits > 0
            "#,
        )
        .bind(domain)
        .bind(arms)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.arm,
                    ArmAggregate {
                        hits: r.hits,
                        reward_sum: r.reward_sum,
                        reward_count: r.reward_count,
                    },
                )
            })
            .collect())
    }
}

/// A row from the bandit_stat table.
#[derive(Debug, sqlx::FromRow)]
struct StatRow {
    arm: String,
    hits: i64,
    reward_sum: f64,
    reward_count: i64,
}

fn validate_key(domain: &str, arm: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(BanditError::InvalidInput(
            "domain must not be empty".to_string(),
        ));
    }
    if arm.is_empty() {
        return Err(BanditError::InvalidInput(
            "arm must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_reward_is_zero_before_first_reward() {
        let agg = ArmAggregate {
            hits: 7,
            reward_sum: 0.0,
            reward_count: 0,
        };
        assert_eq!(agg.mean_reward(), 0.0);
    }

    #[test]
    fn mean_reward_divides_sum_by_count() {
        let agg = ArmAggregate {
            hits: 2,
            reward_sum: 1.0,
            reward_count: 2,
        };
        assert_eq!(agg.mean_reward(), 0.5);
    }

    #[test]
    fn rewards_do_not_require_hits() {
        // The two feedback channels are decoupled: a conversion can be
        // logged for an arm that never recorded a trial.
        let agg = ArmAggregate {
            hits: 0,
            reward_sum: 3.0,
            reward_count: 2,
        };
        assert_eq!(agg.mean_reward(), 1.5);
    }
}
