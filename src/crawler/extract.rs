//! Listing-page extraction ruleset
//!
//! One canonical, purely functional ruleset turns a listing page's HTML into
//! lead rows plus an optional next-page reference. Both page-driver back-ends
//! go through [`parse_listing`]: the HTTP back-end on the fetched body, the
//! DOM back-end on the rendered page content. Keeping a single ruleset is
//! what guarantees the two back-ends cannot drift apart on grouping fields.
//!
//! Extraction irregularities (missing cells, unexpected markup) degrade to
//! empty field values instead of errors; one malformed row must not abort a
//! page. A row without a native id and without a name is unidentifiable and
//! is dropped.

use crate::crawler::driver::{CaptureMode, LeadRow};
use crate::text::normalize;
use scraper::{ElementRef, Html, Selector};

/// "Next page" vocabulary: localized labels plus symbolic arrows.
///
/// Shared between the HTML ruleset and the DOM back-end's click script so
/// both resolve pagination identically.
pub const NEXT_LABELS: [&str; 5] = ["próxima", "proxima", "próximo", "proximo", "next"];

/// Symbols accepted only as the element's entire text
pub const NEXT_SYMBOLS: [&str; 2] = [">", "»"];

/// A parsed listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Lead rows in document order
    pub rows: Vec<LeadRow>,

    /// href of the next-page link, possibly relative; None ends the crawl
    pub next_href: Option<String>,
}

/// Parses one listing page.
///
/// Grouping fields (identity, name, broker, status) are always extracted;
/// detail fields (email, phone, product) only under [`CaptureMode::Full`],
/// to keep summary runs cheap. Pure function of the input:
/// parsing the same HTML twice yields identical results.
pub fn parse_listing(html: &str, mode: CaptureMode) -> ListingPage {
    let document = Html::parse_document(html);

    let rows = extract_rows(&document, mode);
    let next_href = find_next_href(&document);

    ListingPage { rows, next_href }
}

/// Returns true when a normalized label matches the next-page vocabulary
pub fn matches_next_vocab(label: &str) -> bool {
    let label = label.to_lowercase();
    NEXT_LABELS.iter().any(|word| label.contains(word))
        || NEXT_SYMBOLS.iter().any(|sym| label == *sym)
}

fn extract_rows(document: &Html, mode: CaptureMode) -> Vec<LeadRow> {
    let mut rows = Vec::new();

    let row_selector = match Selector::parse("tbody > tr") {
        Ok(s) => s,
        Err(_) => return rows,
    };

    for tr in document.select(&row_selector) {
        // The portal renders its filter bar as a pseudo-row
        if tr.value().attr("id") == Some("buscaListagem") {
            continue;
        }

        if let Some(row) = extract_row(&tr, mode) {
            rows.push(row);
        }
    }

    rows
}

fn extract_row(tr: &ElementRef, mode: CaptureMode) -> Option<LeadRow> {
    let native_id = select_text(tr, r#"span[data-col="id"]"#)
        .filter(|s| !s.is_empty())
        .or_else(|| select_attr(tr, "input.table-check-row", "value"))
        .unwrap_or_default();

    let name = select_text(tr, r#"[data-col="name"]"#).unwrap_or_default();

    let (email, phone, product) = if mode == CaptureMode::Full {
        let email = select_attr(tr, r#"div[data-col="email"]"#, "data-bs-title")
            .filter(|s| !s.is_empty())
            .or_else(|| select_text(tr, r#"div[data-col="email"]"#))
            .unwrap_or_default();

        let phone = select_text(tr, r#"div[data-col="phone"] .hidden-text-blur"#)
            .filter(|s| !s.is_empty())
            .or_else(|| select_text(tr, r#"div[data-col="phone"]"#))
            .unwrap_or_default();

        let product = select_text(tr, "td:nth-of-type(4) .abrevia").unwrap_or_default();

        (email, phone, product)
    } else {
        (String::new(), String::new(), String::new())
    };

    let broker = select_text(tr, r#"div[data-col="corretor"] .abrevia"#)
        .filter(|s| !s.is_empty())
        .or_else(|| select_text(tr, r#"div[data-col="corretor"] span"#))
        .unwrap_or_default();

    let status = select_attr(tr, "a.badge.aw-situacoes", "data-bs-title")
        .filter(|s| !s.is_empty())
        .or_else(|| select_text(tr, "a.badge.aw-situacoes"))
        .unwrap_or_default();

    // Identity: native row id, else a composite; id-less AND nameless rows
    // cannot be deduplicated and are dropped.
    let identity = if !native_id.is_empty() {
        native_id.clone()
    } else if name.is_empty() {
        return None;
    } else {
        format!("{}|{}|{}", name, email, phone)
    };

    Some(LeadRow {
        identity,
        name,
        email,
        phone,
        product,
        broker,
        status,
    })
}

/// Resolves the next-page reference, first match wins:
///
/// 1. an explicit `a[rel="next"]` link;
/// 2. the first `a`/`button` whose text or aria-label matches the next-page
///    vocabulary and carries a usable (non-javascript) href;
/// 3. a pagination-region anchor matching the same vocabulary.
pub fn find_next_href(document: &Html) -> Option<String> {
    if let Ok(rel_selector) = Selector::parse(r#"a[rel="next"]"#) {
        if let Some(href) = document
            .select(&rel_selector)
            .next()
            .and_then(|el| el.value().attr("href"))
        {
            return Some(href.to_string());
        }
    }

    if let Ok(clickable_selector) = Selector::parse("a, button") {
        for el in document.select(&clickable_selector) {
            let text = normalize(&el.text().collect::<String>());
            let aria = el.value().attr("aria-label").unwrap_or("");
            if !matches_next_vocab(&text) && !matches_next_vocab(aria) {
                continue;
            }
            if let Some(href) = el.value().attr("href") {
                if !href.starts_with("javascript") {
                    return Some(href.to_string());
                }
            }
        }
    }

    if let Ok(pagination_selector) = Selector::parse(".pagination a") {
        for el in document.select(&pagination_selector) {
            let text = normalize(&el.text().collect::<String>());
            if matches_next_vocab(&text) {
                if let Some(href) = el.value().attr("href") {
                    return Some(href.to_string());
                }
            }
        }
    }

    None
}

fn select_text(tr: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    tr.select(&selector)
        .next()
        .map(|el| normalize(&el.text().collect::<String>()))
}

fn select_attr(tr: &ElementRef, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    tr.select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_row(id: &str, name: &str, broker: &str, status: &str) -> String {
        format!(
            r#"<tr>
                <td><input class="table-check-row" type="checkbox" value="{id}" />
                    <span data-col="id">{id}</span>
                    <span data-col="name">{name}</span></td>
                <td><div data-col="email" data-bs-title="{name}@example.com">•••</div>
                    <div data-col="phone"><span class="hidden-text-blur">+55 11 90000-0000</span></div></td>
                <td><div data-col="corretor"><span class="abrevia">{broker}</span></div></td>
                <td><span class="abrevia">Residencial Aurora</span></td>
                <td><a class="badge aw-situacoes" data-bs-title="{status}">{status}</a></td>
            </tr>"#
        )
    }

    fn page(rows: &[String], pagination: &str) -> String {
        format!(
            "<html><body><table><tbody>{}</tbody></table>{}</body></html>",
            rows.join("\n"),
            pagination
        )
    }

    #[test]
    fn test_grouping_fields_extracted_in_summary_mode() {
        let html = page(&[listing_row("101", "Ana Dias", "Carla M.", "Novo")], "");
        let parsed = parse_listing(&html, CaptureMode::Summary);

        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.identity, "101");
        assert_eq!(row.name, "Ana Dias");
        assert_eq!(row.broker, "Carla M.");
        assert_eq!(row.status, "Novo");
        // Detail fields are skipped in summary mode
        assert_eq!(row.email, "");
        assert_eq!(row.phone, "");
        assert_eq!(row.product, "");
    }

    #[test]
    fn test_detail_fields_extracted_in_full_mode() {
        let html = page(&[listing_row("101", "Ana Dias", "Carla M.", "Novo")], "");
        let parsed = parse_listing(&html, CaptureMode::Full);

        let row = &parsed.rows[0];
        assert_eq!(row.email, "Ana Dias@example.com");
        assert_eq!(row.phone, "+55 11 90000-0000");
        assert_eq!(row.product, "Residencial Aurora");
    }

    #[test]
    fn test_parse_is_pure() {
        let html = page(
            &[
                listing_row("1", "Ana", "C", "Novo"),
                listing_row("2", "Bia", "C", "Contatado"),
            ],
            r#"<a rel="next" href="/leads?page=2">Próxima</a>"#,
        );
        let first = parse_listing(&html, CaptureMode::Full);
        let second = parse_listing(&html, CaptureMode::Full);

        assert_eq!(first.rows.len(), second.rows.len());
        for (a, b) in first.rows.iter().zip(second.rows.iter()) {
            assert_eq!(a.identity, b.identity);
            assert_eq!(a.email, b.email);
        }
        assert_eq!(first.next_href, second.next_href);
    }

    #[test]
    fn test_filter_row_skipped() {
        let html = page(
            &[
                r#"<tr id="buscaListagem"><td><input /></td></tr>"#.to_string(),
                listing_row("7", "Ana", "C", "Novo"),
            ],
            "",
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].identity, "7");
    }

    #[test]
    fn test_checkbox_value_id_fallback() {
        let html = page(
            &[r#"<tr><td><input class="table-check-row" value="555" />
                 <span data-col="name">Bia</span></td></tr>"#
                .to_string()],
            "",
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.rows[0].identity, "555");
    }

    #[test]
    fn test_composite_identity_when_no_native_id() {
        let html = page(
            &[r#"<tr><td><span data-col="name">Bia Reis</span></td></tr>"#.to_string()],
            "",
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.rows[0].identity, "Bia Reis||");
    }

    #[test]
    fn test_unidentifiable_row_dropped() {
        let html = page(
            &[r#"<tr><td><div data-col="corretor"><span>C</span></div></td></tr>"#.to_string()],
            "",
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn test_mojibake_normalized_in_fields() {
        let html = page(
            &[listing_row("1", "Jo\u{00C3}\u{00A3}o", "C", "Novo")],
            "",
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.rows[0].name, "João");
    }

    #[test]
    fn test_next_rel_link_wins() {
        let html = page(
            &[],
            r#"<a href="/leads?page=9">Próxima</a><a rel="next" href="/leads?page=2">2</a>"#,
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.next_href.as_deref(), Some("/leads?page=2"));
    }

    #[test]
    fn test_next_by_text() {
        let html = page(&[], r#"<a href="/leads?page=2">Próxima</a>"#);
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.next_href.as_deref(), Some("/leads?page=2"));
    }

    #[test]
    fn test_next_by_aria_label() {
        let html = page(&[], r#"<a aria-label="Next page" href="/p2">&#187;</a>"#);
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.next_href.as_deref(), Some("/p2"));
    }

    #[test]
    fn test_next_symbol_arrow() {
        let html = page(&[], r#"<a href="/p2">»</a>"#);
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.next_href.as_deref(), Some("/p2"));
    }

    #[test]
    fn test_javascript_href_skipped_then_pagination_anchor() {
        let html = page(
            &[],
            r#"<button>Próxima</button>
               <a href="javascript:void(0)">Próxima</a>
               <div class="pagination"><a href="/leads?page=3">Proxima</a></div>"#,
        );
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert_eq!(parsed.next_href.as_deref(), Some("/leads?page=3"));
    }

    #[test]
    fn test_no_next_page() {
        let html = page(&[], r#"<a href="/other">Voltar</a>"#);
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert!(parsed.next_href.is_none());
    }

    #[test]
    fn test_greater_than_symbol_requires_exact_text() {
        // "> mais" is not the arrow symbol; must not match
        let html = page(&[], r#"<a href="/p2">&gt; mais</a>"#);
        let parsed = parse_listing(&html, CaptureMode::Summary);
        assert!(parsed.next_href.is_none());
    }
}
