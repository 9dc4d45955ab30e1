//! Holding display formatting.
//!
//! The default policy reproduces the reference catalog-page formatter
//! exactly, string for string, so rendered output stays compatible across
//! deployments. Deployments that need different text implement
//! [`HoldingFormatter`].

use crate::decode::Holding;
use crate::schema::InventoryKind;

/// Line-break marker between holdings in a rendered cell.
pub const HOLDINGS_SEPARATOR: &str = "<br/>";

/// Per-deployment formatting seam.
///
/// `format` may return `None` to suppress a holding from rendered output.
pub trait HoldingFormatter: Send + Sync {
    fn format(&self, holding: &Holding) -> Option<String>;

    /// Join individually-formatted, non-empty holdings with the line-break
    /// marker. An empty input yields an empty string, which callers must
    /// treat as "resolved, nothing to show" rather than a failure.
    fn format_many(&self, holdings: &[Holding]) -> String {
        holdings
            .iter()
            .filter_map(|h| self.format(h))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(HOLDINGS_SEPARATOR)
    }
}

/// The stock formatter.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFormatter;

impl HoldingFormatter for DefaultFormatter {
    fn format(&self, holding: &Holding) -> Option<String> {
        format_holding(holding)
    }
}

/// Default per-kind display string for one holding.
pub fn format_holding(holding: &Holding) -> Option<String> {
    let text = match holding.kind {
        InventoryKind::Physical => format_physical(holding),
        InventoryKind::Digital => format_digital(holding),
        InventoryKind::Electronic => format_electronic(holding),
    };
    Some(text)
}

fn format_physical(holding: &Holding) -> String {
    let library_and_location = join_nonempty(
        &[holding.get("library"), holding.get("location")],
        " - ",
    );
    join_nonempty(
        &[
            holding.get("availability"),
            Some(library_and_location.as_str()),
            holding.get("call_number"),
        ],
        ". ",
    )
}

fn format_digital(holding: &Holding) -> String {
    let joined = join_nonempty(
        &[
            holding.get("institution"),
            holding.get("repository_name"),
            holding.get("label"),
            holding.get("representation"),
        ],
        " - ",
    );
    if joined.is_empty() {
        "Digital Resource (no other information available)".to_string()
    } else {
        joined
    }
}

fn format_electronic(holding: &Holding) -> String {
    let link = match holding.get("link_to_service_page") {
        Some(url) if !url.trim().is_empty() => {
            let text = holding
                .get("collection")
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("Electronic resource");
            format!("<a href=\"{}\">{}</a>", url, text)
        }
        _ => "Electronic Resource (no URL available)".to_string(),
    };
    join_nonempty(
        &[
            Some(link.as_str()),
            holding.get("coverage_statement"),
            holding.get("public_note"),
        ],
        " - ",
    )
}

/// Join the present, non-blank parts with `sep`. Absent and empty parts
/// are omitted entirely, never rendered as blank separators.
fn join_nonempty(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .filter_map(|p| *p)
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(kind: InventoryKind, fields: &[(&str, &str)]) -> Holding {
        let mut h = Holding::new(kind);
        for (name, value) in fields {
            h.set(*name, *value);
        }
        h
    }

    #[test]
    fn physical_joins_all_parts() {
        let h = holding(
            InventoryKind::Physical,
            &[
                ("availability", "available"),
                ("library", "Main Library"),
                ("location", "Stacks"),
                ("call_number", "QA76.73"),
            ],
        );
        assert_eq!(
            format_holding(&h).unwrap(),
            "available. Main Library - Stacks. QA76.73"
        );
    }

    #[test]
    fn physical_omits_absent_parts() {
        let h = holding(
            InventoryKind::Physical,
            &[("availability", "available"), ("library", "Main Library")],
        );
        assert_eq!(format_holding(&h).unwrap(), "available. Main Library");

        // no blank " - " when only one of the pair is present
        let h = holding(InventoryKind::Physical, &[("location", "Stacks")]);
        assert_eq!(format_holding(&h).unwrap(), "Stacks");

        let h = holding(InventoryKind::Physical, &[]);
        assert_eq!(format_holding(&h).unwrap(), "");
    }

    #[test]
    fn digital_joins_or_falls_back() {
        let h = holding(
            InventoryKind::Digital,
            &[
                ("institution", "Inst"),
                ("repository_name", "Repo"),
                ("label", "Label"),
                ("representation", "Rep"),
            ],
        );
        assert_eq!(format_holding(&h).unwrap(), "Inst - Repo - Label - Rep");

        let h = holding(InventoryKind::Digital, &[]);
        assert_eq!(
            format_holding(&h).unwrap(),
            "Digital Resource (no other information available)"
        );
    }

    #[test]
    fn electronic_links_to_service_page() {
        let h = holding(
            InventoryKind::Electronic,
            &[
                ("link_to_service_page", "https://example.edu/svc"),
                ("collection", "JSTOR"),
                ("coverage_statement", "1990-2001"),
            ],
        );
        assert_eq!(
            format_holding(&h).unwrap(),
            "<a href=\"https://example.edu/svc\">JSTOR</a> - 1990-2001"
        );
    }

    #[test]
    fn electronic_fallback_texts() {
        let h = holding(
            InventoryKind::Electronic,
            &[("link_to_service_page", "https://example.edu/svc")],
        );
        assert_eq!(
            format_holding(&h).unwrap(),
            "<a href=\"https://example.edu/svc\">Electronic resource</a>"
        );

        let h = holding(InventoryKind::Electronic, &[("public_note", "On site only")]);
        assert_eq!(
            format_holding(&h).unwrap(),
            "Electronic Resource (no URL available) - On site only"
        );
    }

    #[test]
    fn format_many_joins_and_skips_empty() {
        let formatter = DefaultFormatter;
        let holdings = vec![
            holding(
                InventoryKind::Physical,
                &[("availability", "available"), ("library", "Main")],
            ),
            // formats to an empty string and is skipped
            holding(InventoryKind::Physical, &[]),
            holding(InventoryKind::Digital, &[("label", "Scans")]),
        ];
        assert_eq!(
            formatter.format_many(&holdings),
            "available. Main<br/>Scans"
        );
    }

    #[test]
    fn format_many_empty_input_is_empty_string() {
        assert_eq!(DefaultFormatter.format_many(&[]), "");
    }
}
