use bon::Builder;
use chrono::{DateTime, Local};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        constraints::Constraints,
        error::PlanError,
        slot::{PriceSlot, is_contiguous},
    },
    prelude::*,
    quantity::{cost::Pence, currency::Pounds, energy::KilowattHours, rate::KilowattHourRate},
};

/// Optimization weights of a single run.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Options {
    pub estimated_energy: KilowattHours,

    /// Not used in the cost yet.
    pub carbon_weight: f64,

    /// Not used in the cost yet.
    pub pv_weight: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self { estimated_energy: KilowattHours::from(1.0), carbon_weight: 0.0, pv_weight: 0.0 }
    }
}

/// Suggested run of an appliance.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub cost: Pounds,

    /// Total cost before the currency conversion, lower is better.
    pub score: Pence,

    pub reason: String,
}

/// Lowest-cost contiguous runs among the feasible slots.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct WindowSearch<'a> {
    slots: &'a [PriceSlot],
    run_minutes: u32,
    constraints: &'a Constraints,
    options: &'a Options,

    /// Zero falls back to the default.
    #[builder(default = WindowSearch::DEFAULT_TOP_N)]
    top_n: usize,
}

impl<S: window_search_builder::IsComplete> WindowSearchBuilder<'_, S> {
    pub fn search(self) -> Result<Vec<Recommendation>, PlanError> {
        self.build().search()
    }
}

impl WindowSearch<'_> {
    pub const DEFAULT_TOP_N: usize = 3;

    const SLOT_MINUTES: u32 = 30;

    #[instrument(
        skip_all,
        name = "Searching…",
        fields(n_slots = self.slots.len(), run_minutes = self.run_minutes, top_n = self.top_n),
    )]
    fn search(self) -> Result<Vec<Recommendation>, PlanError> {
        if self.slots.is_empty() {
            return Err(PlanError::InvalidInput("no price slots"));
        }
        if self.run_minutes == 0 {
            return Err(PlanError::InvalidInput("run duration must be positive"));
        }
        let top_n = if self.top_n == 0 { Self::DEFAULT_TOP_N } else { self.top_n };
        let n_required = self.run_minutes.div_ceil(Self::SLOT_MINUTES) as usize;

        let feasible = self.constraints.filter(self.slots);
        debug!(n_feasible = feasible.len(), n_required, "Filtered");
        if feasible.len() < n_required {
            return Err(PlanError::NoFeasibleSlots);
        }

        #[allow(clippy::cast_precision_loss)]
        let energy_per_slot = self.options.estimated_energy / n_required as f64;
        let ranking = PriceRanking::new(self.slots);

        let mut recommendations: Vec<Recommendation> = feasible
            .windows(n_required)
            .filter(|run| is_contiguous(run))
            .map(|run| {
                let score: Pence = run.iter().map(|slot| energy_per_slot * slot.rate).sum();
                Recommendation {
                    start: run[0].start,
                    end: run[run.len() - 1].end,
                    cost: Pounds::from(score),
                    score,
                    reason: ranking.reason(mean_rate(run)),
                }
            })
            .collect();
        if recommendations.is_empty() {
            return Err(PlanError::NoFeasibleSlots);
        }

        // Stable, so that the earlier run wins a tie:
        recommendations.sort_by_key(|recommendation| OrderedFloat(recommendation.score.0));
        recommendations.truncate(top_n);
        debug!(n_recommendations = recommendations.len(), "Found");
        Ok(recommendations)
    }
}

/// Find the best runs of the specified duration.
pub fn best_windows(
    slots: &[PriceSlot],
    run_minutes: u32,
    constraints: &Constraints,
    options: &Options,
    top_n: usize,
) -> Result<Vec<Recommendation>, PlanError> {
    WindowSearch::builder()
        .slots(slots)
        .run_minutes(run_minutes)
        .constraints(constraints)
        .options(options)
        .top_n(top_n)
        .search()
}

#[allow(clippy::cast_precision_loss)]
fn mean_rate(run: &[PriceSlot]) -> KilowattHourRate {
    run.iter().map(|slot| slot.rate).sum::<KilowattHourRate>() / run.len() as f64
}

/// Ranks a rate against all the rates of the input.
struct PriceRanking(Vec<OrderedFloat<f64>>);

impl PriceRanking {
    fn new(slots: &[PriceSlot]) -> Self {
        let mut rates: Vec<_> = slots.iter().map(|slot| OrderedFloat(slot.rate.0)).collect();
        rates.sort_unstable();
        Self(rates)
    }

    /// Share of the rates strictly below the specified one.
    ///
    /// A rate above all the others ranks at the top.
    #[allow(clippy::cast_precision_loss)]
    fn percentile(&self, rate: KilowattHourRate) -> f64 {
        let index = self.0.partition_point(|other| *other < OrderedFloat(rate.0));
        if index == self.0.len() { 1.0 } else { index as f64 / self.0.len() as f64 }
    }

    fn reason(&self, mean_rate: KilowattHourRate) -> String {
        let percentile = self.percentile(mean_rate);
        let percent = percentile * 100.0;
        if percentile < 0.2 {
            format!("Excellent price (bottom {percent:.0}% of the day)")
        } else if percentile < 0.4 {
            format!("Good price ({percent:.0}% percentile)")
        } else if percentile < 0.6 {
            String::from("Moderate pricing")
        } else {
            format!("Higher price ({percent:.0}% percentile) but fits constraints")
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone, Timelike};
    use itertools::Itertools;

    use super::*;
    use crate::core::{
        interval::Interval,
        time_window::{TimeWindow, any_contains},
    };

    /// Half-hourly rates of a typical winter day.
    pub const RATES: [f64; 48] = [
        15.0, 14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 8.0, 12.0, 13.0, 15.0, 18.0, 20.0, 22.0, 24.0,
        26.0, 25.0, 24.0, 23.0, 22.0, 21.0, 20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 14.0, 13.0, 12.0,
        11.0, 10.0, 15.0, 18.0, 20.0, 25.0, 30.0, 35.0, 40.0, 38.0, 35.0, 30.0, 25.0, 20.0, 18.0,
        16.0, 15.0, 14.0,
    ];

    /// Build the day of slots starting at midnight.
    pub fn day(midnight: DateTime<Local>, rates: &[f64]) -> Vec<PriceSlot> {
        rates
            .iter()
            .enumerate()
            .map(|(i, rate)| {
                PriceSlot::half_hour(
                    midnight + PriceSlot::DURATION * i32::try_from(i).unwrap(),
                    KilowattHourRate::from(*rate),
                )
            })
            .collect()
    }

    fn midnight() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
    }

    fn slots() -> Vec<PriceSlot> {
        day(midnight(), &RATES)
    }

    fn search(
        slots: &[PriceSlot],
        run_minutes: u32,
        constraints: &Constraints,
    ) -> Result<Vec<Recommendation>, PlanError> {
        best_windows(slots, run_minutes, constraints, &Options::default(), 0)
    }

    #[test]
    fn test_cheapest_hour() -> Result {
        let recommendations = search(&slots(), 60, &Constraints::default())?;
        assert_eq!(recommendations.len(), 3);
        let best = &recommendations[0];
        assert_eq!((best.start.hour(), best.start.minute()), (3, 0));
        assert_eq!(best.end - best.start, TimeDelta::minutes(60));
        // 0.5 kWh at 9p and 0.5 kWh at 8p:
        assert_abs_diff_eq!(best.score.0, 8.5);
        assert_abs_diff_eq!(best.cost.0, 0.085);
        assert_eq!(best.reason, "Excellent price (bottom 2% of the day)");
        Ok(())
    }

    #[test]
    fn test_duration_rounds_up() -> Result {
        let recommendations = search(&slots(), 75, &Constraints::default())?;
        let best = &recommendations[0];
        assert_eq!((best.start.hour(), best.start.minute()), (2, 30));
        assert_eq!(best.end - best.start, TimeDelta::minutes(90));
        assert_abs_diff_eq!(best.score.0, 9.0);
        Ok(())
    }

    #[test]
    fn test_sorted_by_score() -> Result {
        for run_minutes in [30, 60, 120, 240] {
            let recommendations = best_windows(
                &slots(),
                run_minutes,
                &Constraints::default(),
                &Options::default(),
                48,
            )?;
            assert!(recommendations.iter().is_sorted_by_key(|it| OrderedFloat(it.score.0)));
            assert!(recommendations.iter().all(|it| {
                it.end - it.start >= TimeDelta::minutes(i64::from(run_minutes))
            }));
        }
        Ok(())
    }

    #[test]
    fn test_tie_goes_to_earlier_run() -> Result {
        let slots = day(midnight(), &[10.0; 6]);
        let recommendations = search(&slots, 30, &Constraints::default())?;
        assert!(recommendations.iter().map(|it| it.start).tuple_windows().all(|(a, b)| a < b));
        assert_eq!(recommendations[0].start, slots[0].start);
        Ok(())
    }

    #[test]
    fn test_respects_quiet_hours() -> Result {
        let quiet_hours = vec![TimeWindow::new("22:00".parse()?, "07:00".parse()?)];
        let constraints =
            Constraints::builder().quiet_hours(quiet_hours.clone()).noise_level(4).build();
        let recommendations = search(&slots(), 60, &constraints)?;
        assert!(!recommendations.is_empty());
        for recommendation in &recommendations {
            assert!(!any_contains(&quiet_hours, recommendation.start));
        }
        assert_eq!(recommendations[0].start.hour(), 15);
        Ok(())
    }

    #[test]
    fn test_respects_price_cap() -> Result {
        let slots = slots();
        let constraints = Constraints::builder().price_cap(KilowattHourRate::from(20.0)).build();
        for recommendation in search(&slots, 120, &constraints)? {
            let interval = Interval::new(recommendation.start, recommendation.end);
            assert!(
                slots
                    .iter()
                    .filter(|slot| interval.contains(slot.start))
                    .all(|slot| slot.rate <= KilowattHourRate::from(20.0))
            );
        }
        Ok(())
    }

    #[test]
    fn test_run_must_not_span_infeasible_slot() {
        let slots = day(midnight(), &[1.0, 99.0, 1.0]);
        let constraints = Constraints::builder().price_cap(KilowattHourRate::from(50.0)).build();
        assert_eq!(search(&slots, 60, &constraints), Err(PlanError::NoFeasibleSlots));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            search(&[], 60, &Constraints::default()),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            search(&slots(), 0, &Constraints::default()),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_not_enough_feasible_slots() {
        let constraints = Constraints::builder().price_cap(KilowattHourRate::from(9.0)).build();
        assert_eq!(search(&slots(), 120, &constraints), Err(PlanError::NoFeasibleSlots));
    }

    #[test]
    fn test_reason_bands() {
        let ranking = PriceRanking::new(&day(midnight(), &[10.0, 20.0, 30.0, 40.0, 50.0]));
        assert_eq!(
            ranking.reason(KilowattHourRate::from(10.0)),
            "Excellent price (bottom 0% of the day)",
        );
        assert_eq!(ranking.reason(KilowattHourRate::from(20.0)), "Good price (20% percentile)");
        assert_eq!(ranking.reason(KilowattHourRate::from(25.0)), "Moderate pricing");
        assert_eq!(
            ranking.reason(KilowattHourRate::from(45.0)),
            "Higher price (80% percentile) but fits constraints",
        );
    }

    #[test]
    fn test_rate_above_all_ranks_at_the_top() {
        let ranking = PriceRanking::new(&day(midnight(), &[1.0, 2.0]));
        assert_abs_diff_eq!(ranking.percentile(KilowattHourRate::from(3.0)), 1.0);
        assert_eq!(
            ranking.reason(KilowattHourRate::from(3.0)),
            "Higher price (100% percentile) but fits constraints",
        );
    }
}
