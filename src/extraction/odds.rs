//! Row-by-row parsing of the eurovisionworld odds table.
//!
//! The contract is lenient by design: a row either fully parses into an
//! [`OddsEntry`] or is dropped with a debug log. Dropping never aborts the
//! document; the source table occasionally omits data per row, and the
//! service must still return every other row.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker row: every odds-table row carries a `data-dt` date-time
/// attribute. The fetcher waits on this same selector before handing the
/// document over.
pub const ROW_SELECTOR: &str = "tr[data-dt]";

/// Compound title carried by the country link, e.g.
/// `Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu"`. The contest year is
/// matched structurally rather than as a literal so the pattern survives
/// the source rolling to a new year.
pub const TITLE_PATTERN: &str = r#"Eurovision \d{4} (.*?): (.*?) - "(.*?)""#;

/// One fully parsed odds-table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsEntry {
    pub country: String,
    pub artist: String,
    pub song: String,
    /// Win probability exactly as reported by the source (`data-prb`);
    /// never scaled or normalized.
    #[serde(rename = "winChance")]
    pub win_chance: f64,
    /// One value per bookmaker column, in document order. Length varies
    /// per row and is not padded to a uniform width.
    pub odds: Vec<f64>,
}

struct RowMatchers {
    row: Selector,
    country_link: Selector,
    win_chance: Selector,
    odds_cell: Selector,
    title: Regex,
}

impl RowMatchers {
    fn new() -> Self {
        Self {
            row: Selector::parse(ROW_SELECTOR).expect("row selector is valid"),
            country_link: Selector::parse("td.odt a").expect("country selector is valid"),
            win_chance: Selector::parse("td[data-prb]").expect("win-chance selector is valid"),
            // Every cell not tagged as the country (.odt), highlight (.ohi)
            // or popular (.opo) cell is a bookmaker odds column.
            odds_cell: Selector::parse("td:not(.odt):not(.ohi):not(.opo)")
                .expect("odds selector is valid"),
            title: Regex::new(TITLE_PATTERN).expect("title pattern is valid"),
        }
    }
}

/// Parse every marker row in the document, document order, skipping rows
/// that fail the validity predicate. Total: an empty or alien document
/// yields an empty vector, never an error.
pub fn parse_document(html: &str) -> Vec<OddsEntry> {
    let matchers = RowMatchers::new();
    let document = Html::parse_document(html);
    document
        .select(&matchers.row)
        .filter_map(|row| parse_row(&matchers, row))
        .collect()
}

fn parse_row(m: &RowMatchers, row: ElementRef<'_>) -> Option<OddsEntry> {
    let Some(country_link) = row.select(&m.country_link).next() else {
        debug!("row skipped: no country cell");
        return None;
    };
    let Some(win_cell) = row.select(&m.win_chance).next() else {
        debug!("row skipped: no probability cell");
        return None;
    };
    let odds_cells: Vec<ElementRef<'_>> = row.select(&m.odds_cell).collect();
    if odds_cells.is_empty() {
        debug!("row skipped: no odds cells");
        return None;
    }

    let title = country_link.value().attr("title").unwrap_or_default();
    let Some(caps) = m.title.captures(title) else {
        debug!("row skipped: unrecognized title format {title:?}");
        return None;
    };
    let country = caps[1].trim().to_string();
    let artist = caps[2].trim().to_string();
    let song = caps[3].trim().to_string();

    let prb = win_cell.value().attr("data-prb").unwrap_or_default();
    let Ok(win_chance) = prb.trim().parse::<f64>() else {
        debug!("row skipped: unparseable win chance {prb:?}");
        return None;
    };

    // An entry is all-or-nothing: one bad column drops the whole row
    // rather than emitting a partially populated entry.
    let mut odds = Vec::with_capacity(odds_cells.len());
    for cell in odds_cells {
        let text: String = cell.text().collect();
        let Ok(value) = text.trim().parse::<f64>() else {
            debug!("row skipped: unparseable odds value {:?}", text.trim());
            return None;
        };
        odds.push(value);
    }

    Some(OddsEntry {
        country,
        artist,
        song,
        win_chance,
        odds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title_attr: &str, prb: &str, odds: &[&str]) -> String {
        let odds_cells: String = odds.iter().map(|o| format!("<td>{o}</td>")).collect();
        format!(
            r#"<tr data-dt="2025-05-17 21:00">
                <td class="odt"><a href="/odds/sweden"{title_attr}>Sweden</a></td>
                <td class="ohi" data-prb="{prb}">{prb}%</td>
                {odds_cells}
                <td class="opo">1</td>
            </tr>"#
        )
    }

    // The live site entity-escapes the quotes around song names; the DOM
    // (and scraper) hand back the decoded value.
    fn titled(title: &str) -> String {
        format!(r#" title="{}""#, title.replace('"', "&quot;"))
    }

    fn document(rows: &[String]) -> String {
        format!(
            "<html><body><table><tbody>{}</tbody></table></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn test_reference_row() {
        let html = document(&[row(
            &titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#),
            "12.5",
            &["3.5", "4.0"],
        )]);
        let entries = parse_document(&html);
        assert_eq!(
            entries,
            vec![OddsEntry {
                country: "Sweden".to_string(),
                artist: "KAJ".to_string(),
                song: "Bara Bada Bastu".to_string(),
                win_chance: 12.5,
                odds: vec![3.5, 4.0],
            }]
        );
    }

    #[test]
    fn test_entries_keep_document_row_order() {
        let html = document(&[
            row(&titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#), "12.5", &["3.5"]),
            row(&titled(r#"Eurovision 2025 Austria: JJ - "Wasted Love""#), "21.0", &["2.1"]),
            row(&titled(r#"Eurovision 2025 France: Louane - "maman""#), "8.0", &["9.0"]),
        ]);
        let entries = parse_document(&html);
        let countries: Vec<&str> = entries.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(countries, ["Sweden", "Austria", "France"]);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_row_without_country_cell_is_skipped() {
        let html = document(&[
            row(&titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#), "12.5", &["3.5"]),
            // no td.odt at all
            r#"<tr data-dt="2025-05-17"><td class="ohi" data-prb="5.0">5%</td><td>2.0</td></tr>"#
                .to_string(),
            row(&titled(r#"Eurovision 2025 France: Louane - "maman""#), "8.0", &["9.0"]),
        ]);
        let entries = parse_document(&html);
        let countries: Vec<&str> = entries.iter().map(|e| e.country.as_str()).collect();
        // the malformed middle row is dropped, its neighbors survive
        assert_eq!(countries, ["Sweden", "France"]);
    }

    #[test]
    fn test_row_without_probability_cell_is_skipped() {
        let html = document(&[
            r#"<tr data-dt="2025-05-17">
                <td class="odt"><a title="Eurovision 2025 Sweden: KAJ - &quot;Bara Bada Bastu&quot;">Sweden</a></td>
                <td>3.5</td>
            </tr>"#
                .to_string(),
            row(&titled(r#"Eurovision 2025 Austria: JJ - "Wasted Love""#), "21.0", &["2.1"]),
        ]);
        let entries = parse_document(&html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].country, "Austria");
    }

    #[test]
    fn test_row_without_odds_cells_is_skipped() {
        let html = document(&[row(
            &titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#),
            "12.5",
            &[],
        )]);
        assert!(parse_document(&html).is_empty());
    }

    #[test]
    fn test_unrecognized_title_is_skipped() {
        let html = document(&[
            row(&titled("Sweden - KAJ"), "12.5", &["3.5"]),
            row("", "12.5", &["3.5"]), // no title attribute at all
            row(&titled(r#"Eurovision 2025 Austria: JJ - "Wasted Love""#), "21.0", &["2.1"]),
        ]);
        let entries = parse_document(&html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].country, "Austria");
    }

    #[test]
    fn test_title_pattern_accepts_any_contest_year() {
        let html = document(&[row(
            &titled(r#"Eurovision 2026 Finland: Erika Vikman - "Ich komme""#),
            "14.2",
            &["5.5"],
        )]);
        let entries = parse_document(&html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].country, "Finland");
        assert_eq!(entries[0].artist, "Erika Vikman");
        assert_eq!(entries[0].song, "Ich komme");
    }

    #[test]
    fn test_captured_fields_are_trimmed() {
        let html = document(&[row(
            &titled(r#"Eurovision 2025 Sweden :  KAJ  - " Bara Bada Bastu ""#),
            "12.5",
            &["3.5"],
        )]);
        let entries = parse_document(&html);
        assert_eq!(entries[0].country, "Sweden");
        assert_eq!(entries[0].artist, "KAJ");
        assert_eq!(entries[0].song, "Bara Bada Bastu");
    }

    #[test]
    fn test_unparseable_numbers_drop_the_row() {
        let html = document(&[
            row(&titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#), "n/a", &["3.5"]),
            row(&titled(r#"Eurovision 2025 Austria: JJ - "Wasted Love""#), "21.0", &["2.1", "-"]),
            row(&titled(r#"Eurovision 2025 France: Louane - "maman""#), "8.0", &["9.0"]),
        ]);
        let entries = parse_document(&html);
        let countries: Vec<&str> = entries.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(countries, ["France"]);
    }

    #[test]
    fn test_ragged_odds_lengths_are_preserved() {
        let html = document(&[
            row(&titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#), "12.5", &["3.5"]),
            row(
                &titled(r#"Eurovision 2025 Austria: JJ - "Wasted Love""#),
                "21.0",
                &["2.1", "2.2", "2.05"],
            ),
        ]);
        let entries = parse_document(&html);
        assert_eq!(entries[0].odds, vec![3.5]);
        assert_eq!(entries[1].odds, vec![2.1, 2.2, 2.05]);
    }

    #[test]
    fn test_win_chance_passes_through_raw() {
        // No unit inference: a 0-100-looking value stays as reported.
        let html = document(&[row(
            &titled(r#"Eurovision 2025 Sweden: KAJ - "Bara Bada Bastu""#),
            "87.3",
            &["1.2"],
        )]);
        assert_eq!(parse_document(&html)[0].win_chance, 87.3);
    }

    #[test]
    fn test_alien_document_yields_empty() {
        assert!(parse_document("<html><body><p>maintenance</p></body></html>").is_empty());
        assert!(parse_document("").is_empty());
    }

    #[test]
    fn test_wire_shape_uses_camel_case_win_chance() {
        let entry = OddsEntry {
            country: "Sweden".to_string(),
            artist: "KAJ".to_string(),
            song: "Bara Bada Bastu".to_string(),
            win_chance: 12.5,
            odds: vec![3.5, 4.0],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["winChance"], 12.5);
        assert!(json.get("win_chance").is_none());
    }
}
