//! Event listing extraction from the calendar page.
//!
//! Each `.glz-event` card becomes one [`RawEvent`], in document order. A card
//! is never dropped: missing sub-fields just produce empty strings.

use std::sync::LazyLock;

use gwcal_core::RawEvent;
use regex::Regex;

use crate::markup::{find_by_class, first_img_src, text_of_class};

/// Class marking one listing card on the calendar page.
pub const EVENT_CARD_CLASS: &str = "glz-event";

const NAME_CLASS: &str = "event-name";
const CITY_CLASS: &str = "event-city";
const DATE_CLASS: &str = "event-date";
const COUNTRY_CLASS: &str = "event-country";

static COUNTRY_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)countries/([a-z]{2,3})\.(?:png|jpg|svg)\b").expect("valid country regex")
});

/// Parses every listing card in `html`.
///
/// The output length always equals the number of cards found.
#[must_use]
pub fn extract_events(html: &str) -> Vec<RawEvent> {
    find_by_class(html, EVENT_CARD_CLASS)
        .iter()
        .enumerate()
        .map(|(index, card)| parse_listing(index, card.inner))
        .collect()
}

fn parse_listing(index: usize, card: &str) -> RawEvent {
    let id = RawEvent::sequence_id(index);
    let name_raw = text_of_class(card, NAME_CLASS);
    let city = text_of_class(card, CITY_CLASS).trim().to_string();
    let date = text_of_class(card, DATE_CLASS).trim().to_string();

    let country_code = find_by_class(card, COUNTRY_CLASS)
        .iter()
        .find_map(|el| first_img_src(el.inner))
        .and_then(|src| country_code_from_flag_url(&src));

    let location_text = location_text(&city, country_code.as_deref());

    // The name field may carry the city on a second line.
    let name = first_non_empty_line(&name_raw)
        .map(str::to_string)
        .or_else(|| (!city.is_empty()).then(|| city.clone()))
        .unwrap_or_else(|| id.clone());

    RawEvent {
        id,
        name,
        date,
        location_text,
        country_code,
    }
}

/// Upper-cased country code from a flag image URL such as
/// `https://cdn.example/img/countries/fr.png`.
#[must_use]
pub fn country_code_from_flag_url(url: &str) -> Option<String> {
    COUNTRY_CODE_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Joins the non-empty parts with `", "`. Empty when both are missing.
#[must_use]
pub fn location_text(city: &str, country_code: Option<&str>) -> String {
    [Some(city), country_code]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_non_empty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
