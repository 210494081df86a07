use super::*;

fn card(name: &str, city: &str, date: &str, flag_src: Option<&str>) -> String {
    let flag = flag_src.map_or_else(String::new, |src| {
        format!(r#"<div class="event-country"><img src="{src}" alt=""></div>"#)
    });
    format!(
        r#"<div class="glz-event">
  <h3 class="event-name">{name}</h3>
  <div class="event-meta">
    <span class="event-city">{city}</span>
    {flag}
  </div>
  <div class="event-date">{date}</div>
</div>"#
    )
}

fn page(cards: &[String]) -> String {
    format!(
        r#"<html><body><section class="calendar">{}</section></body></html>"#,
        cards.join("\n")
    )
}

#[test]
fn extracts_single_listing_with_secondary_name_line() {
    let html = page(&[card(
        "Gravel Classic\nSomeCity",
        "SomeCity",
        "10 Oct 2026",
        Some("https://cdn.example.com/img/countries/fr.png"),
    )]);

    let events = extract_events(&html);

    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.id, "ev-0");
    assert_eq!(ev.name, "Gravel Classic");
    assert_eq!(ev.date, "10 Oct 2026");
    assert_eq!(ev.location_text, "SomeCity, FR");
    assert_eq!(ev.country_code.as_deref(), Some("FR"));
}

#[test]
fn name_split_on_br_takes_first_line() {
    let html = page(&[card(
        "The Traka<br><small>Girona</small>",
        "Girona",
        "1-4 May 2026",
        Some("/countries/es.svg"),
    )]);
    let events = extract_events(&html);
    assert_eq!(events[0].name, "The Traka");
    assert_eq!(events[0].date, "1-4 May 2026");
    assert_eq!(events[0].location_text, "Girona, ES");
}

#[test]
fn name_skips_leading_blank_lines() {
    let html = page(&[card("\n   \n  Seven\n  Perth", "Perth", "", None)]);
    assert_eq!(extract_events(&html)[0].name, "Seven");
}

#[test]
fn missing_flag_gives_city_only_location() {
    let html = page(&[card("Race", "Nannup", "2 Nov 2026", None)]);
    let events = extract_events(&html);
    assert!(events[0].country_code.is_none());
    assert_eq!(events[0].location_text, "Nannup");
}

#[test]
fn flag_without_matching_path_gives_no_country() {
    let html = page(&[card("Race", "Nannup", "", Some("/flags/australia.webp"))]);
    let events = extract_events(&html);
    assert!(events[0].country_code.is_none());
    assert_eq!(events[0].location_text, "Nannup");
}

#[test]
fn country_without_city_gives_code_only_location() {
    let html = page(&[card("Race", "", "", Some("/countries/be.jpg"))]);
    let events = extract_events(&html);
    assert_eq!(events[0].location_text, "BE");
}

#[test]
fn empty_card_is_kept_with_id_as_name() {
    let html = page(&[
        card("First", "Town", "1 Jan", None),
        r#"<div class="glz-event"></div>"#.to_string(),
    ]);
    let events = extract_events(&html);
    assert_eq!(events.len(), 2, "a card without sub-fields must not be dropped");
    let ev = &events[1];
    assert_eq!(ev.id, "ev-1");
    assert_eq!(ev.name, "ev-1");
    assert_eq!(ev.date, "");
    assert_eq!(ev.location_text, "");
    assert!(ev.country_code.is_none());
}

#[test]
fn empty_name_falls_back_to_city() {
    let html = page(&[card("  ", "Unbound Town", "", None)]);
    assert_eq!(extract_events(&html)[0].name, "Unbound Town");
}

#[test]
fn output_preserves_document_order_and_count() {
    let cards: Vec<String> = (0..5)
        .map(|i| card(&format!("Race {i}"), &format!("City {i}"), "", None))
        .collect();
    let events = extract_events(&page(&cards));
    assert_eq!(events.len(), 5);
    for (i, ev) in events.iter().enumerate() {
        assert_eq!(ev.id, format!("ev-{i}"));
        assert_eq!(ev.name, format!("Race {i}"));
    }
}

#[test]
fn page_without_cards_yields_no_events() {
    assert!(extract_events("<html><body><p>No races</p></body></html>").is_empty());
}

#[test]
fn entities_in_fields_are_decoded() {
    let html = page(&[card(
        "Gravel &amp; Grit",
        "Saint-&Eacute;tienne",
        "12&nbsp;Sep",
        Some("/countries/fr.png"),
    )]);
    let ev = &extract_events(&html)[0];
    assert_eq!(ev.name, "Gravel & Grit");
    assert_eq!(ev.location_text, "Saint-Étienne, FR");
    assert_eq!(ev.date, "12\u{a0}Sep");
}

#[test]
fn accented_names_and_cities_are_decoded() {
    let html = page(&[card(
        "Gravel &Eacute;preuve",
        "B&eacute;ziers",
        "",
        Some("/countries/fr.png"),
    )]);
    let ev = &extract_events(&html)[0];
    assert_eq!(ev.name, "Gravel Épreuve");
    assert_eq!(ev.location_text, "Béziers, FR");
}

#[test]
fn list_cards_without_end_tags_stay_separate() {
    let html = r#"<ul class="calendar">
<li class="glz-event"><span class="event-name">A</span><span class="event-city">CityA</span>
<li class="glz-event"><span class="event-name">B</span><span class="event-city">CityB</span>
</ul>"#;
    let events = extract_events(html);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "A");
    assert_eq!(events[0].location_text, "CityA");
    assert_eq!(events[1].name, "B");
    assert_eq!(events[1].location_text, "CityB");
}

#[test]
fn large_page_is_extracted_quickly() {
    let filler: String = (0..8_000)
        .map(|i| format!(r#"<a class="nav-link item-{i}" href="/p/{i}">Link {i}</a>"#))
        .collect();
    let cards: Vec<String> = (0..300)
        .map(|i| {
            card(
                &format!("Race {i}"),
                &format!("City {i}"),
                "1 Jan 2027",
                Some("/countries/it.png"),
            )
        })
        .collect();
    let html = page(&cards).replace("<body>", &format!("<body><nav>{filler}</nav>"));

    let started = std::time::Instant::now();
    let events = extract_events(&html);
    let elapsed = started.elapsed();

    assert_eq!(events.len(), 300);
    assert_eq!(events[299].name, "Race 299");
    assert_eq!(events[299].location_text, "City 299, IT");
    assert!(
        elapsed < std::time::Duration::from_secs(10),
        "extraction took {elapsed:?}"
    );
}

#[test]
fn country_code_from_flag_url_uppercases() {
    assert_eq!(
        country_code_from_flag_url("https://x.test/wp/countries/nz.png").as_deref(),
        Some("NZ")
    );
    assert_eq!(
        country_code_from_flag_url("/countries/usa.svg").as_deref(),
        Some("USA")
    );
    assert!(country_code_from_flag_url("/countries/fr.gif").is_none());
    assert!(country_code_from_flag_url("/regions/fr.png").is_none());
    assert!(country_code_from_flag_url("").is_none());
}

#[test]
fn location_text_joins_present_parts() {
    assert_eq!(location_text("Girona", Some("ES")), "Girona, ES");
    assert_eq!(location_text("Girona", None), "Girona");
    assert_eq!(location_text("", Some("ES")), "ES");
    assert_eq!(location_text("", None), "");
}
