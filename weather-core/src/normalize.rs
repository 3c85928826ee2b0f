/// Canonical form of a city name before it is sent to the geocoder.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .replace('-', " ")
        .replace('ё', "е")
        .replace('Ё', "Е")
        .to_lowercase()
}
