//! Peer table extraction. Pulls region headers and healthy peer rows out of
//! the public peers page with plain substring scanning; the page is simple
//! enough that a full HTML parser buys nothing.

use super::{CatalogPeer, RegionCatalog};

const KNOWN_SCHEMES: &[&str] = &["tcp://", "tls://", "ws://", "wss://", "quic://"];

/// Parse the peers page into a region catalog. Only rows whose class marks
/// them `statusgood` are kept; the listing's own health report is trusted
/// as-is.
pub fn parse_peer_table(html: &str) -> RegionCatalog {
    let mut catalog = RegionCatalog::new();
    let mut current_region: Option<String> = None;

    for chunk in html.split("<tr").skip(1) {
        let row = chunk.split("</tr>").next().unwrap_or(chunk);

        if let Some(region) = cell_text(row, "id=\"country\"") {
            if !region.is_empty() {
                current_region = Some(region);
            }
            continue;
        }

        if !row_is_statusgood(row) {
            continue;
        }
        let Some(region) = current_region.clone() else {
            continue;
        };
        let Some(address) = cell_text(row, "id=\"address\"") else {
            continue;
        };
        if !KNOWN_SCHEMES.iter().any(|s| address.starts_with(s)) {
            continue;
        }
        let Some(reliability) = cell_text(row, "id=\"reliability\"") else {
            continue;
        };
        if !reliability.ends_with('%') {
            continue;
        }

        catalog
            .entry(region)
            .or_default()
            .push(CatalogPeer { address, reliability });
    }

    catalog
}

/// Check the `<tr ...>` attribute segment for a statusgood class
fn row_is_statusgood(row: &str) -> bool {
    let attrs = row.split('>').next().unwrap_or("");
    attr_value(attrs, "class=\"").is_some_and(|class| class.contains("statusgood"))
}

fn attr_value<'a>(attrs: &'a str, marker: &str) -> Option<&'a str> {
    let at = attrs.find(marker)? + marker.len();
    let rest = &attrs[at..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Text content of the first cell in `row` carrying the given id attribute,
/// with any inner tags (flag images and the like) stripped out
fn cell_text(row: &str, id_marker: &str) -> Option<String> {
    let at = row.find(id_marker)?;
    let rest = &row[at + id_marker.len()..];
    let start = rest.find('>')? + 1;
    let end = rest[start..].find("</")? + start;
    Some(strip_tags(&rest[start..end]))
}

fn strip_tags(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = concat!(
        "<html><body><table>",
        "<tr><th id=\"country\" colspan=\"4\"><img src=\"flags/de.svg\"> germany</th></tr>",
        "<tr class=\"statusgood\"><td id=\"address\">tls://ygg.example.de:443</td>",
        "<td id=\"status\">online</td><td id=\"reliability\">100%</td></tr>",
        "<tr class=\"statusgood\"><td id=\"address\">tcp://ygg.example.de:80</td>",
        "<td id=\"status\">online</td><td id=\"reliability\">98%</td></tr>",
        "<tr class=\"statusbad\"><td id=\"address\">tls://down.example.de:443</td>",
        "<td id=\"status\">offline</td><td id=\"reliability\">12%</td></tr>",
        "<tr><th id=\"country\" colspan=\"4\"><img src=\"flags/fr.svg\"> france</th></tr>",
        "<tr class=\"statusgood\"><td id=\"address\">tls://[2001:db8::1]:443</td>",
        "<td id=\"status\">online</td><td id=\"reliability\">100%</td></tr>",
        "<tr class=\"statusgood\"><td id=\"address\">not-a-peer-uri</td>",
        "<td id=\"status\">online</td><td id=\"reliability\">100%</td></tr>",
        "</table></body></html>"
    );

    #[test]
    fn test_parses_regions_and_good_rows() {
        let catalog = parse_peer_table(PAGE);
        assert_eq!(catalog.len(), 2);

        let germany = &catalog["germany"];
        assert_eq!(germany.len(), 2);
        assert_eq!(germany[0].address, "tls://ygg.example.de:443");
        assert_eq!(germany[0].reliability, "100%");
        // Catalog presentation order is preserved within the region
        assert_eq!(germany[1].address, "tcp://ygg.example.de:80");

        let france = &catalog["france"];
        assert_eq!(france.len(), 1);
        assert_eq!(france[0].address, "tls://[2001:db8::1]:443");
    }

    #[test]
    fn test_bad_status_rows_are_dropped() {
        let catalog = parse_peer_table(PAGE);
        assert!(
            catalog["germany"]
                .iter()
                .all(|p| !p.address.contains("down.example.de"))
        );
    }

    #[test]
    fn test_non_peer_address_text_is_dropped() {
        let catalog = parse_peer_table(PAGE);
        assert!(
            catalog["france"]
                .iter()
                .all(|p| p.address.starts_with("tls://"))
        );
    }

    #[test]
    fn test_rows_before_any_region_header_are_ignored() {
        let page = concat!(
            "<tr class=\"statusgood\"><td id=\"address\">tcp://stray.example.org:80</td>",
            "<td id=\"status\">online</td><td id=\"reliability\">100%</td></tr>"
        );
        assert!(parse_peer_table(page).is_empty());
    }

    #[test]
    fn test_missing_reliability_cell_drops_row() {
        let page = concat!(
            "<tr><th id=\"country\">nowhere</th></tr>",
            "<tr class=\"statusgood\"><td id=\"address\">tcp://x.example.org:80</td>",
            "<td id=\"status\">online</td></tr>"
        );
        assert!(parse_peer_table(page).is_empty());
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<img src=\"x.svg\"> germany"), "germany");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_peer_table("").is_empty());
        assert!(parse_peer_table("<html><body>nothing here</body></html>").is_empty());
    }
}
