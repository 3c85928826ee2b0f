//! Reply rendering for Telegram MarkdownV2.

use crate::{error::LookupError, model::CurrentWeather};

const SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Prefix every MarkdownV2 special character with a backslash.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// One decimal place, ties rounded away from zero (`3.25` -> `3.3`).
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// Five-line weather report. `city` is shown exactly as the user typed it.
pub fn format_report(city: &str, weather: &CurrentWeather) -> String {
    let temp = one_decimal(weather.temperature);
    let apparent = one_decimal(weather.apparent_temperature);
    let wind = one_decimal(weather.wind_speed);
    let humidity = weather.relative_humidity.to_string();

    [
        format!("🌆 *{}*", escape(city)),
        format!("🌡 Текущая температура: {}°C", escape(&temp)),
        format!("🌞 Ощущается: {}°C", escape(&apparent)),
        format!("💨 Скорость ветра: {} m/s", escape(&wind)),
        format!("💧 Влажность: {}%", escape(&humidity)),
    ]
    .join("\n")
}

/// Single warning line for a failed lookup.
pub fn format_error(err: &LookupError) -> String {
    format!("⚠️ Error: {}", escape(&err.user_message()))
}
