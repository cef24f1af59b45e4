//! Human-readable text for tool results. Pure functions only.

use crate::model::{
    CityInfo, ClockEntry, ForecastReport, TimeDifference, TimeFormat, TimeInfo, WeatherReport,
    WorldClock,
};

pub const DEMO_NOTICE: &str =
    "Note: This is demo data, not live conditions. Set OPENWEATHER_API_KEY for real-time data.";

/// "new york" → "New York".
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn weather(report: &WeatherReport) -> String {
    let t = report.units.temperature_symbol();
    let demo = if report.is_demo_data { " (Demo Data)" } else { "" };

    let mut lines = vec![format!("Current weather in {}{demo}:", report.location)];

    let mut temperature = format!("Temperature: {:.1}{t}", report.temperature);
    if let Some(feels) = report.feels_like {
        temperature.push_str(&format!(" (feels like {feels:.1}{t})"));
    }
    lines.push(temperature);
    lines.push(format!("Condition: {}", title_case(&report.conditions)));
    lines.push(format!("Humidity: {}%", report.humidity));
    lines.push(format!("Wind: {:.1} {}", report.wind_speed, report.units.speed_symbol()));
    if let Some(km) = report.visibility_km {
        lines.push(format!("Visibility: {km:.1} km"));
    }
    if report.pressure > 0.0 {
        lines.push(format!("Pressure: {:.0} hPa", report.pressure));
    }
    if report.is_demo_data {
        lines.push(DEMO_NOTICE.to_string());
    }

    lines.join("\n")
}

pub fn forecast(report: &ForecastReport) -> String {
    let t = report.units.temperature_symbol();
    let demo = if report.is_demo_data { " (Demo Data)" } else { "" };

    let mut lines = vec![format!("Weather forecast for {}{demo}:", report.location)];
    for (i, day) in report.days.iter().enumerate() {
        lines.push(format!(
            "Day {} ({}): {:.1}{t}, {}, humidity {}%, wind {:.1} {}",
            i + 1,
            day.date.format("%Y-%m-%d"),
            day.temperature,
            title_case(&day.conditions),
            day.humidity,
            day.wind_speed,
            report.units.speed_symbol(),
        ));
    }
    if report.is_demo_data {
        lines.push(DEMO_NOTICE.to_string());
    }

    lines.join("\n")
}

pub fn current_time(info: &TimeInfo, format: TimeFormat) -> String {
    match format {
        TimeFormat::Standard => format!(
            "The current time in {} is {} ({})",
            info.location, info.formatted, info.timezone_id
        ),
        TimeFormat::Detailed => format!(
            "Time information for {}:\nLocal time: {}\nTimezone: {} ({})\nUTC offset: {}\nUTC time: {}",
            info.location,
            info.formatted,
            info.timezone_id,
            info.abbreviation,
            info.utc_offset_label(),
            info.local_timestamp.naive_utc().format("%Y-%m-%d %H:%M:%S"),
        ),
        TimeFormat::Utc => format!(
            "Time in {}:\nLocal: {} ({})\nUTC: {}",
            info.location,
            info.local_timestamp.format("%Y-%m-%d %H:%M:%S"),
            info.utc_offset_label(),
            info.formatted,
        ),
    }
}

/// "1 hour", "5 hours and 30 minutes", "45 minutes".
pub fn describe_minutes(minutes: i32) -> String {
    let minutes = minutes.unsigned_abs();
    let (h, m) = (minutes / 60, minutes % 60);
    let plural = |n: u32, unit: &str| format!("{n} {unit}{}", if n == 1 { "" } else { "s" });

    match (h, m) {
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} and {}", plural(h, "hour"), plural(m, "minute")),
    }
}

pub fn time_difference(diff: &TimeDifference) -> String {
    let a = &diff.city_a;
    let b = &diff.city_b;

    let headline = match diff.difference_minutes {
        0 if a.location == b.location => {
            format!("Both cities ({}) are the same, so there is no time difference.", a.location)
        }
        0 => format!("{} and {} are currently at the same UTC offset.", a.location, b.location),
        d if d > 0 => format!("{} is {} ahead of {}.", a.location, describe_minutes(d), b.location),
        d => format!("{} is {} ahead of {}.", b.location, describe_minutes(d), a.location),
    };

    format!(
        "{headline}\nCurrent time in {}: {} {}\nCurrent time in {}: {} {}",
        a.location, a.formatted, a.abbreviation, b.location, b.formatted, b.abbreviation
    )
}

pub fn world_clock(clock: &WorldClock) -> String {
    let mut lines = vec!["World Clock:".to_string()];
    let mut errors = Vec::new();

    for entry in &clock.entries {
        match entry {
            ClockEntry::Resolved { time, .. } => lines.push(format!(
                "{}: {} ({}, {})",
                time.location, time.formatted, time.day_of_week, time.timezone_id
            )),
            ClockEntry::Failed { city, message, .. } => {
                lines.push(format!("{}: unavailable", display_city(city)));
                errors.push(format!("{}: {message}", display_city(city)));
            }
        }
    }

    if !errors.is_empty() {
        lines.push(String::new());
        lines.push(format!("Errors: {}", errors.join("; ")));
    }
    if clock.truncated() {
        lines.push(String::new());
        lines.push(format!(
            "Note: Limited to first {} cities out of {} provided.",
            clock.entries.len(),
            clock.requested
        ));
    }

    lines.join("\n")
}

pub fn city_info(info: &CityInfo) -> String {
    let loc = &info.location;
    format!(
        "Information for {}:\nCoordinates: {:.4}, {:.4}\nTimezone: {}\nFull address: {}\nCountry: {}",
        loc.name,
        loc.latitude,
        loc.longitude,
        info.timezone_id.as_deref().unwrap_or("Unknown"),
        loc.display_name,
        loc.country.as_deref().unwrap_or("Unknown"),
    )
}

fn display_city(city: &str) -> String {
    if city.is_empty() { "(blank)".to_string() } else { title_case(city) }
}
