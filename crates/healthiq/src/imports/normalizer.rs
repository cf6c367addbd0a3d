const HEADERS: [&str; 9] = [
    "ID",
    "Facility ID",
    "Facility",
    "Patient",
    "Date",
    "Score",
    "Status",
    "Type",
    "Notes",
];

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps a header cell onto its canonical spelling, ignoring case and stray
/// whitespace. Unknown headers pass through cleaned.
pub(crate) fn canonical_header(value: &str) -> String {
    let cleaned = normalize_text(value);
    HEADERS
        .iter()
        .find(|header| header.eq_ignore_ascii_case(&cleaned))
        .map(|header| header.to_string())
        .unwrap_or(cleaned)
}

pub(crate) fn headers() -> &'static [&'static str] {
    &HEADERS
}
