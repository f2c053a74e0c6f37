//! Reinforcement selection policies.
//!
//! Given the live pool of lendable recruits for one at-risk mine, a
//! policy picks the recruit to borrow or reports that none is
//! acceptable. Selection is pure: policies never touch the network; the
//! caller supplies the pool snapshot and the options.
//!
//! Policies are variants behind one [`ReinforceStrategy::select_recruit`]
//! entry point; new policies are added as new variants.

use thiserror::Error;

use crate::game::Recruit;

/// Errors a selection policy can report.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StrategyError {
    /// Every recruit in the pool costs more than the price ceiling and
    /// the policy was not allowed to relax it.
    #[error("cheapest recruit costs {price} base units, over the ceiling of {ceiling}")]
    PriceTooHigh {
        /// Cheapest price the pool offered, in base units.
        price: u128,
        /// The caller's ceiling, in base units.
        ceiling: u128,
    },

    /// The pool contained no recruit at all.
    #[error("no recruit available to borrow")]
    NoRecruitAvailable,
}

/// Options governing one selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOptions {
    /// Fail with [`StrategyError::PriceTooHigh`] instead of relaxing the
    /// ceiling when nothing qualifies.
    pub strict: bool,
    /// Maximum acceptable borrowing price in base units. `None` leaves
    /// the ceiling unenforced.
    pub max_price: Option<u128>,
}

impl SelectOptions {
    /// Options that fail instead of relaxing the ceiling.
    #[must_use]
    pub const fn strict(max_price: Option<u128>) -> Self {
        Self {
            strict: true,
            max_price,
        }
    }

    /// Options that fall back to the cheapest recruit on a ceiling miss.
    #[must_use]
    pub const fn lenient(max_price: Option<u128>) -> Self {
        Self {
            strict: false,
            max_price,
        }
    }
}

/// Reinforcement selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinforceStrategy {
    /// The cheapest recruit that satisfies the ceiling; with no ceiling,
    /// the cheapest in the pool.
    Cheapest,
    /// The highest mining power among recruits under the ceiling.
    ///
    /// When nothing satisfies the ceiling and the options are not
    /// strict, the policy falls back to the cheapest recruit regardless
    /// of power. The fallback recruit is then over the ceiling; keeping
    /// that relaxation switchable is exactly what
    /// [`SelectOptions::strict`] is for.
    HighestPower,
}

impl ReinforceStrategy {
    /// Picks the recruit to borrow from `pool`.
    ///
    /// Power ties under [`ReinforceStrategy::HighestPower`] keep the
    /// first-encountered recruit in pool order.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::NoRecruitAvailable`] when the pool is
    /// empty, and [`StrategyError::PriceTooHigh`] when a ceiling is set,
    /// no recruit satisfies it, and the options forbid relaxing it.
    pub fn select_recruit<'a>(
        self,
        pool: &'a [Recruit],
        options: SelectOptions,
    ) -> Result<&'a Recruit, StrategyError> {
        let cheapest = cheapest(pool).ok_or(StrategyError::NoRecruitAvailable)?;
        match self {
            Self::Cheapest => match options.max_price {
                Some(ceiling) if cheapest.price > ceiling => {
                    if options.strict {
                        Err(StrategyError::PriceTooHigh {
                            price: cheapest.price,
                            ceiling,
                        })
                    } else {
                        Ok(cheapest)
                    }
                },
                _ => Ok(cheapest),
            },
            Self::HighestPower => {
                let strongest = pool
                    .iter()
                    .filter(|r| options.max_price.is_none_or(|ceiling| r.price <= ceiling))
                    .fold(None::<&Recruit>, |best, recruit| match best {
                        Some(b) if b.mining_power >= recruit.mining_power => Some(b),
                        _ => Some(recruit),
                    });
                match strongest {
                    Some(recruit) => Ok(recruit),
                    // Reachable only with a ceiling set: the pool is
                    // non-empty, so an unbounded filter keeps everything.
                    None if options.strict => Err(StrategyError::PriceTooHigh {
                        price: cheapest.price,
                        ceiling: options.max_price.unwrap_or(0),
                    }),
                    None => Ok(cheapest),
                }
            },
        }
    }
}

/// First-wins scan for the cheapest recruit.
fn cheapest(pool: &[Recruit]) -> Option<&Recruit> {
    let mut best: Option<&Recruit> = None;
    for recruit in pool {
        match best {
            Some(b) if b.price <= recruit.price => {},
            _ => best = Some(recruit),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn recruit(recruit_id: u64, price: u128, mining_power: u32) -> Recruit {
        Recruit {
            recruit_id,
            price,
            mining_power,
        }
    }

    #[test]
    fn empty_pool_is_no_recruit_available() {
        let err = ReinforceStrategy::Cheapest
            .select_recruit(&[], SelectOptions::lenient(Some(100)))
            .unwrap_err();
        assert_eq!(err, StrategyError::NoRecruitAvailable);

        let err = ReinforceStrategy::HighestPower
            .select_recruit(&[], SelectOptions::strict(None))
            .unwrap_err();
        assert_eq!(err, StrategyError::NoRecruitAvailable);
    }

    #[test]
    fn cheapest_returns_minimum_qualifying_price() {
        let pool = vec![recruit(1, 80, 5), recruit(2, 30, 1), recruit(3, 50, 9)];
        let picked = ReinforceStrategy::Cheapest
            .select_recruit(&pool, SelectOptions::lenient(Some(60)))
            .expect("a recruit under the ceiling exists");
        assert_eq!(picked.recruit_id, 2);
    }

    #[test]
    fn cheapest_without_ceiling_is_global_cheapest() {
        let pool = vec![recruit(1, 80, 5), recruit(2, 30, 1)];
        let picked = ReinforceStrategy::Cheapest
            .select_recruit(&pool, SelectOptions::lenient(None))
            .expect("non-empty pool");
        assert_eq!(picked.recruit_id, 2);
    }

    #[test]
    fn cheapest_strict_over_ceiling_fails() {
        let pool = vec![recruit(1, 80, 5), recruit(2, 90, 1)];
        let err = ReinforceStrategy::Cheapest
            .select_recruit(&pool, SelectOptions::strict(Some(60)))
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::PriceTooHigh {
                price: 80,
                ceiling: 60
            }
        );
    }

    #[test]
    fn cheapest_lenient_over_ceiling_relaxes() {
        let pool = vec![recruit(1, 80, 5), recruit(2, 90, 1)];
        let picked = ReinforceStrategy::Cheapest
            .select_recruit(&pool, SelectOptions::lenient(Some(60)))
            .expect("lenient options relax the ceiling");
        assert_eq!(picked.recruit_id, 1);
    }

    #[test]
    fn highest_power_picks_strongest_under_ceiling() {
        let pool = vec![
            recruit(1, 40, 200),
            recruit(2, 90, 900),
            recruit(3, 55, 400),
        ];
        let picked = ReinforceStrategy::HighestPower
            .select_recruit(&pool, SelectOptions::lenient(Some(60)))
            .expect("recruits under the ceiling exist");
        assert_eq!(picked.recruit_id, 3);
    }

    #[test]
    fn highest_power_tie_keeps_pool_order() {
        let pool = vec![recruit(1, 40, 500), recruit(2, 45, 500)];
        let picked = ReinforceStrategy::HighestPower
            .select_recruit(&pool, SelectOptions::lenient(None))
            .expect("non-empty pool");
        assert_eq!(picked.recruit_id, 1);
    }

    #[test]
    fn highest_power_strict_over_ceiling_fails_with_cheapest_price() {
        let pool = vec![recruit(1, 80, 900), recruit(2, 70, 100)];
        let err = ReinforceStrategy::HighestPower
            .select_recruit(&pool, SelectOptions::strict(Some(60)))
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::PriceTooHigh {
                price: 70,
                ceiling: 60
            }
        );
    }

    #[test]
    fn highest_power_lenient_falls_back_to_cheapest() {
        let pool = vec![recruit(1, 80, 900), recruit(2, 70, 100)];
        let picked = ReinforceStrategy::HighestPower
            .select_recruit(&pool, SelectOptions::lenient(Some(60)))
            .expect("lenient options fall back");
        assert_eq!(picked.recruit_id, 2);
    }

    proptest! {
        #[test]
        fn cheapest_is_minimal_over_qualifying_pool(
            prices in proptest::collection::vec(1u64..1_000_000, 1..30),
            ceiling in proptest::option::of(1u64..1_000_000),
        ) {
            let pool: Vec<Recruit> = prices
                .iter()
                .enumerate()
                .map(|(i, &p)| recruit(i as u64, u128::from(p), 0))
                .collect();
            let options = SelectOptions::lenient(ceiling.map(u128::from));
            let picked = ReinforceStrategy::Cheapest
                .select_recruit(&pool, options)
                .expect("non-empty pool never fails lenient selection");
            let global_min = pool.iter().map(|r| r.price).min().expect("non-empty");
            match ceiling.map(u128::from) {
                Some(c) if global_min <= c => {
                    // Minimum qualifying price.
                    prop_assert!(picked.price <= c);
                    prop_assert_eq!(picked.price, global_min);
                },
                // No ceiling, or nothing qualifies: global cheapest.
                _ => prop_assert_eq!(picked.price, global_min),
            }
        }

        #[test]
        fn highest_power_strict_respects_ceiling(
            entries in proptest::collection::vec((1u64..1_000, 0u32..1_000), 1..30),
            ceiling in 1u64..1_000,
        ) {
            let pool: Vec<Recruit> = entries
                .iter()
                .enumerate()
                .map(|(i, &(p, mp))| recruit(i as u64, u128::from(p), mp))
                .collect();
            let result = ReinforceStrategy::HighestPower
                .select_recruit(&pool, SelectOptions::strict(Some(u128::from(ceiling))));
            let qualifying: Vec<&Recruit> = pool
                .iter()
                .filter(|r| r.price <= u128::from(ceiling))
                .collect();
            match result {
                Ok(picked) => {
                    prop_assert!(picked.price <= u128::from(ceiling));
                    let max_power = qualifying
                        .iter()
                        .map(|r| r.mining_power)
                        .max()
                        .expect("a qualifying recruit was picked");
                    prop_assert_eq!(picked.mining_power, max_power);
                },
                Err(StrategyError::PriceTooHigh { .. }) => {
                    prop_assert!(qualifying.is_empty());
                },
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }
}
