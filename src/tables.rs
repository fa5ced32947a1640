use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use smart_run::{
    core::{
        appliance::Appliance,
        search::Recommendation,
        slot::PriceSlot,
        smart::SmartRecommendation,
        weather::WeatherForecast,
    },
    quantity::rate::KilowattHourRate,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_slots_table(slots: &[PriceSlot]) -> Table {
    #[allow(clippy::cast_precision_loss)]
    let mean_rate = if slots.is_empty() {
        KilowattHourRate::ZERO
    } else {
        slots.iter().map(|slot| slot.rate).sum::<KilowattHourRate>() / slots.len() as f64
    };

    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Rate"]);
    for slot in slots {
        table.add_row(vec![
            Cell::new(slot.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(slot.start.format("%H:%M")),
            Cell::new(slot.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(slot.rate)
                .set_alignment(CellAlignment::Right)
                .fg(if slot.rate >= mean_rate { Color::Red } else { Color::Green }),
        ]);
    }
    table
}

pub fn build_appliances_table(appliances: &[Appliance]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Name", "ID", "Cycle", "Energy", "Noise", "Control", "Class", "Enabled"]);
    for appliance in appliances {
        let name = Cell::new(&appliance.name);
        table.add_row(vec![
            if appliance.enabled { name } else { name.add_attribute(Attribute::Dim) },
            Cell::new(&appliance.id).add_attribute(Attribute::Dim),
            Cell::new(format!("{} min", appliance.cycle_minutes))
                .set_alignment(CellAlignment::Right),
            Cell::new(appliance.estimated_energy).set_alignment(CellAlignment::Right),
            Cell::new(appliance.noise_level).set_alignment(CellAlignment::Right),
            Cell::new(appliance.control_type),
            Cell::new(appliance.class),
            if appliance.enabled {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::DarkYellow)
            },
        ]);
    }
    table
}

pub fn build_recommendations_table(recommendations: &[Recommendation]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Start", "End", "Cost", "Reason"]);
    for (index, recommendation) in recommendations.iter().enumerate() {
        let start = Cell::new(recommendation.start.format("%H:%M"));
        table.add_row(vec![
            if index == 0 { start.add_attribute(Attribute::Bold) } else { start },
            Cell::new(recommendation.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(recommendation.cost).set_alignment(CellAlignment::Right),
            Cell::new(&recommendation.reason),
        ]);
    }
    table
}

pub fn build_options_table(recommendation: &SmartRecommendation) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Day", "Wash", "Dry", "Weather", "Total", "Savings"]);
    for (index, option) in recommendation.options.iter().enumerate() {
        let is_best = index == recommendation.best_option_index;
        let day = Cell::new(&option.day_label);
        table.add_row(vec![
            if is_best { day.add_attribute(Attribute::Bold) } else { day },
            Cell::new(format!(
                "{}–{}",
                option.primary_slot.start.format("%H:%M"),
                option.primary_slot.end.format("%H:%M"),
            )),
            match &option.coupled_slot {
                Some(coupled_slot) => Cell::new(format!(
                    "tumble {}–{}",
                    coupled_slot.start.format("%H:%M"),
                    coupled_slot.end.format("%H:%M"),
                )),
                None if option.uses_natural_dry => Cell::new("line").fg(Color::Green),
                None => Cell::new("—").add_attribute(Attribute::Dim),
            },
            option.weather.map_or_else(
                || Cell::new("—").add_attribute(Attribute::Dim),
                |weather| weather_cell(&weather),
            ),
            Cell::new(option.total_cost)
                .set_alignment(CellAlignment::Right)
                .fg(if is_best { Color::Green } else { Color::Reset }),
            Cell::new(option.savings_vs_first_option).set_alignment(CellAlignment::Right).fg(
                if option.savings_vs_first_option.0 > 0.0 { Color::Green } else { Color::Reset },
            ),
        ]);
    }
    table
}

pub fn build_weather_table(forecasts: &[WeatherForecast]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Sunshine", "Max", "Min", "Rain", "Drying"]);
    for forecast in forecasts {
        table.add_row(vec![
            Cell::new(forecast.date.format("%a %b %d")),
            Cell::new(format!("{:.1} h", forecast.sunshine_hours))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1} °C", forecast.max_temp_c)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1} °C", forecast.min_temp_c))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.0}%", forecast.precip_prob_percent))
                .set_alignment(CellAlignment::Right),
            weather_cell(forecast),
        ]);
    }
    table
}

fn weather_cell(forecast: &WeatherForecast) -> Cell {
    if forecast.is_sunny {
        Cell::new("sunny").fg(Color::Green)
    } else {
        Cell::new("indoors").fg(Color::DarkYellow)
    }
}
