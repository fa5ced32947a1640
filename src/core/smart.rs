use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, Days, Local, NaiveDate};
use enumset::{EnumSet, EnumSetType};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        appliance::{Appliance, ApplianceClass, WaitDays},
        constraints::Constraints,
        error::PlanError,
        household::Household,
        interval::Interval,
        search::{Options, Recommendation, WindowSearch},
        slot::PriceSlot,
        weather::WeatherForecast,
    },
    prelude::*,
    quantity::{cost::Pence, currency::Pounds, energy::KilowattHours},
};

/// How the laundry gets dry after the wash.
#[derive(Debug, Hash, EnumSetType)]
pub enum DryingStrategy {
    /// Run the successor appliance right after the primary one.
    TumbleDry,

    /// Hang the laundry outside for free.
    LineDry,
}

impl DryingStrategy {
    /// Strategies worth offering for the day.
    pub fn applicable(
        weather: Option<&WeatherForecast>,
        successor_class: ApplianceClass,
    ) -> EnumSet<Self> {
        let mut strategies = EnumSet::only(Self::TumbleDry);
        if successor_class == ApplianceClass::WeatherDependent
            && weather.is_some_and(|weather| weather.is_sunny)
        {
            strategies.insert(Self::LineDry);
        }
        strategies
    }
}

/// One of the alternatives offered to the user.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOption {
    /// `Today`, `Tomorrow`, or the weekday name.
    pub day_label: String,

    pub date: NaiveDate,
    pub primary_slot: Recommendation,

    /// Successor run, when tumble-drying.
    pub coupled_slot: Option<Recommendation>,

    pub total_cost: Pounds,
    pub weather: Option<WeatherForecast>,
    pub uses_natural_dry: bool,

    /// Positive when cheaper than the first generated option.
    ///
    /// Kept as is by [`SmartRecommendation::retain_upcoming`], even when the first option is gone.
    pub savings_vs_first_option: Pounds,

    pub recommendation: String,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmartRecommendation {
    pub appliance_name: String,
    pub options: Vec<RecommendationOption>,
    pub best_option_index: usize,
}

impl SmartRecommendation {
    fn new(appliance_name: String, options: Vec<RecommendationOption>) -> Self {
        let best_option_index = best_option_index(&options);
        Self { appliance_name, options, best_option_index }
    }

    pub fn best_option(&self) -> Option<&RecommendationOption> {
        self.options.get(self.best_option_index)
    }

    /// Drop the options which have already started and pick the best one again.
    ///
    /// Returns `false` when nothing is left.
    pub fn retain_upcoming(&mut self, now: DateTime<Local>) -> bool {
        self.options.retain(|option| option.primary_slot.start > now);
        self.best_option_index = best_option_index(&self.options);
        !self.options.is_empty()
    }
}

/// Cheapest option, the first one on a tie.
fn best_option_index(options: &[RecommendationOption]) -> usize {
    options.iter().position_min_by_key(|option| OrderedFloat(option.total_cost.0)).unwrap_or(0)
}

/// Multi-day, weather-aware planner of a single appliance.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct SmartPlanner<'a> {
    appliance: &'a Appliance,

    /// Successor of a coupled appliance.
    coupled_appliance: Option<&'a Appliance>,

    prices_by_date: &'a BTreeMap<NaiveDate, Vec<PriceSlot>>,
    weather_by_date: &'a BTreeMap<NaiveDate, WeatherForecast>,
    household: &'a Household,

    /// Raw constraints of the primary appliance, the practical ones get applied on top.
    constraints: &'a Constraints,

    options: &'a Options,
    today: NaiveDate,
}

impl<S: smart_planner_builder::IsComplete> SmartPlannerBuilder<'_, S> {
    pub fn plan(self) -> Result<SmartRecommendation, PlanError> {
        self.build().plan()
    }
}

impl SmartPlanner<'_> {
    #[instrument(
        skip_all,
        name = "Planning…",
        fields(appliance = %self.appliance.id, class = %self.appliance.class, today = %self.today),
    )]
    fn plan(self) -> Result<SmartRecommendation, PlanError> {
        let constraints = self.constraints.clone().with_practical(self.appliance, self.household);
        match (self.appliance.class, self.coupled_appliance) {
            (ApplianceClass::Standalone, _) => self.plan_standalone(&constraints),
            (ApplianceClass::Coupled, Some(successor)) => {
                self.plan_coupled(successor, &constraints)
            }
            (class, _) => Err(PlanError::UnsupportedClass(class)),
        }
    }

    /// Best run today.
    fn plan_standalone(
        &self,
        constraints: &Constraints,
    ) -> Result<SmartRecommendation, PlanError> {
        let slots = self
            .prices_by_date
            .get(&self.today)
            .filter(|slots| !slots.is_empty())
            .ok_or(PlanError::NoFeasibleSlots)?;
        let primary_slot =
            self.search_primary(slots, constraints).map_err(|_| PlanError::NoFeasibleSlots)?;
        let recommendation = format!(
            "Best time: {} - {}",
            primary_slot.start.format("%H:%M"),
            primary_slot.end.format("%H:%M"),
        );
        let option = RecommendationOption {
            day_label: Self::day_label(self.today, 0),
            date: self.today,
            total_cost: primary_slot.cost,
            primary_slot,
            coupled_slot: None,
            weather: self.weather_by_date.get(&self.today).copied(),
            uses_natural_dry: false,
            savings_vs_first_option: Pounds::ZERO,
            recommendation,
        };
        Ok(SmartRecommendation::new(self.appliance.name.clone(), vec![option]))
    }

    /// Weigh the successor step against drying outside, over the next few days.
    fn plan_coupled(
        &self,
        successor: &Appliance,
        constraints: &Constraints,
    ) -> Result<SmartRecommendation, PlanError> {
        let n_days = self.appliance.can_wait_days.get().clamp(1, WaitDays::MAX);
        let mut options: Vec<RecommendationOption> = Vec::new();

        for offset in 0..n_days {
            let Some(date) = self.today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let Some(slots) = self.prices_by_date.get(&date) else {
                debug!(%date, "No prices, skipping");
                continue;
            };
            let primary_slot = match self.search_primary(slots, constraints) {
                Ok(primary_slot) => primary_slot,
                Err(error) => {
                    debug!(%date, %error, "Skipping");
                    continue;
                }
            };
            let weather = self.weather_by_date.get(&date).copied();

            for strategy in DryingStrategy::applicable(weather.as_ref(), successor.class) {
                let (coupled_slot, total_cost) = match strategy {
                    DryingStrategy::TumbleDry => {
                        let successor_slot =
                            self.successor_slot(successor, &primary_slot, date);
                        let total_cost = primary_slot.cost + successor_slot.cost;
                        (Some(successor_slot), total_cost)
                    }
                    DryingStrategy::LineDry => (None, primary_slot.cost),
                };
                let savings_vs_first_option = options
                    .first()
                    .map_or(Pounds::ZERO, |first| first.total_cost - total_cost);
                let recommendation = match &coupled_slot {
                    Some(coupled_slot) => format!(
                        "Start wash at {}, finishes at {}. Then tumble dry until {} ({total_cost} total)",
                        primary_slot.start.format("%H:%M"),
                        primary_slot.end.format("%H:%M"),
                        coupled_slot.end.format("%H:%M"),
                    ),
                    None => format!(
                        "Start wash at {}, finishes at {}. Then hang outside to dry in sunshine ({total_cost}, save {savings_vs_first_option}!)",
                        primary_slot.start.format("%H:%M"),
                        primary_slot.end.format("%H:%M"),
                    ),
                };
                options.push(RecommendationOption {
                    day_label: Self::day_label(date, offset),
                    date,
                    primary_slot: primary_slot.clone(),
                    coupled_slot,
                    total_cost,
                    weather,
                    uses_natural_dry: strategy == DryingStrategy::LineDry,
                    savings_vs_first_option,
                    recommendation,
                });
            }
        }

        if options.is_empty() {
            return Err(PlanError::NoFeasibleOptions);
        }
        info!(n_options = options.len(), "Planned");
        Ok(SmartRecommendation::new(self.appliance.name.clone(), options))
    }

    fn search_primary(
        &self,
        slots: &[PriceSlot],
        constraints: &Constraints,
    ) -> Result<Recommendation, PlanError> {
        WindowSearch::builder()
            .slots(slots)
            .run_minutes(self.appliance.cycle_minutes)
            .constraints(constraints)
            .options(self.options)
            .top_n(1)
            .search()?
            .into_iter()
            .next()
            .ok_or(PlanError::NoFeasibleSlots)
    }

    /// Successor run starting right when the primary one ends.
    ///
    /// The next day's slots are considered too, so that a late run is still priced.
    fn successor_slot(
        &self,
        successor: &Appliance,
        primary_slot: &Recommendation,
        date: NaiveDate,
    ) -> Recommendation {
        let interval = Interval::starting_at(primary_slot.end, successor.cycle_duration());
        let next_date_slots = date
            .checked_add_days(Days::new(1))
            .and_then(|next_date| self.prices_by_date.get(&next_date))
            .into_iter()
            .flatten();
        let slots = self.prices_by_date.get(&date).into_iter().flatten().chain(next_date_slots);
        let score = estimate_cost(slots, interval, successor.estimated_energy);
        Recommendation {
            start: interval.start,
            end: interval.end,
            cost: Pounds::from(score),
            score,
            reason: format!("Starts when {} finishes", self.appliance.name),
        }
    }

    fn day_label(date: NaiveDate, offset: u8) -> String {
        match offset {
            0 => String::from("Today"),
            1 => String::from("Tomorrow"),
            _ => date.format("%A").to_string(),
        }
    }
}

/// Spread the energy evenly over the slots starting within the interval.
fn estimate_cost<'a>(
    slots: impl IntoIterator<Item = &'a PriceSlot>,
    interval: Interval,
    energy: KilowattHours,
) -> Pence {
    let rates: Vec<_> = slots
        .into_iter()
        .filter(|slot| interval.contains(slot.start))
        .map(|slot| slot.rate)
        .collect();
    if rates.is_empty() {
        return Pence::ZERO;
    }
    #[allow(clippy::cast_precision_loss)]
    let energy_per_slot = energy / rates.len() as f64;
    rates.into_iter().map(|rate| energy_per_slot * rate).sum()
}

/// Plan a single appliance, see [`SmartPlanner`].
#[allow(clippy::too_many_arguments)]
pub fn generate_smart_recommendations(
    appliance: &Appliance,
    coupled_appliance: Option<&Appliance>,
    prices_by_date: &BTreeMap<NaiveDate, Vec<PriceSlot>>,
    weather_by_date: &BTreeMap<NaiveDate, WeatherForecast>,
    household: &Household,
    constraints: &Constraints,
    options: &Options,
    today: NaiveDate,
) -> Result<SmartRecommendation, PlanError> {
    SmartPlanner::builder()
        .appliance(appliance)
        .maybe_coupled_appliance(coupled_appliance)
        .prices_by_date(prices_by_date)
        .weather_by_date(weather_by_date)
        .household(household)
        .constraints(constraints)
        .options(options)
        .today(today)
        .plan()
}
