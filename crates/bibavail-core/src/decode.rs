//! Holdings decoder.
//!
//! Turns one raw bib-availability envelope into normalized holdings keyed
//! by record id. Decoding is schema-driven: a datafield's tag selects the
//! inventory kind, the kind's table names each subfield, and everything
//! outside the tables is dropped rather than guessed at.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::envelope::{as_list, content_string, subfield_content, web_service_result};
use crate::error::{upstream_message, DecodeError};
use crate::schema::InventoryKind;

/// One inventory unit attached to a bib record.
///
/// Carries exactly one kind plus the fields actually present in the raw
/// response. Absent fields are absent, never null-filled, and fields from
/// other kinds never leak in.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub kind: InventoryKind,
    fields: HashMap<String, String>,
}

impl Holding {
    pub fn new(kind: InventoryKind) -> Self {
        Self {
            kind,
            fields: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field value. A repeated subfield code overwrites, matching
    /// the upstream's last-wins fold.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of decoding one envelope.
#[derive(Debug, Default)]
pub struct Decoded {
    /// Record id to its holdings, in envelope order per record. Duplicate
    /// ids within one envelope concatenate rather than overwrite.
    pub records: HashMap<String, Vec<Holding>>,
    /// Bibs that could not be interpreted and were excluded. Kept as a
    /// count for observability; never escalated to the caller.
    pub skipped_bibs: usize,
}

/// Post-decode hook applied to each holding before it is stored.
///
/// Deployments can rewrite a holding or return `None` to suppress it.
pub type HoldingTransform = dyn Fn(Holding) -> Option<Holding> + Send + Sync;

/// Schema-driven decoder for availability envelopes.
pub struct Decoder {
    transform: Option<Box<HoldingTransform>>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Decoder with the identity transform.
    pub fn new() -> Self {
        Self { transform: None }
    }

    /// Decoder with a deployment-specific holding transform.
    pub fn with_transform<F>(transform: F) -> Self
    where
        F: Fn(Holding) -> Option<Holding> + Send + Sync + 'static,
    {
        Self {
            transform: Some(Box::new(transform)),
        }
    }

    /// Decode one envelope into per-record holdings.
    ///
    /// Fails only on an upstream error payload (`web_service_result`) or a
    /// missing `bibs` structure. A malformed individual bib never aborts
    /// the rest of the envelope; it is logged, counted, and excluded.
    pub fn decode(&self, envelope: &Value) -> Result<Decoded, DecodeError> {
        if let Some(result) = web_service_result(envelope) {
            let detail = result
                .get("errorList")
                .cloned()
                .unwrap_or(Value::Null);
            return Err(DecodeError::Upstream {
                message: upstream_message(&detail),
                detail,
            });
        }

        let bibs = envelope
            .get("bibs")
            .and_then(Value::as_object)
            .ok_or(DecodeError::MalformedEnvelope)?;

        let mut decoded = Decoded::default();
        for bib in as_list(bibs.get("bib")) {
            match self.decode_bib(bib) {
                Some((record_id, holdings)) => {
                    decoded.records.entry(record_id).or_default().extend(holdings);
                }
                None => decoded.skipped_bibs += 1,
            }
        }
        Ok(decoded)
    }

    fn decode_bib(&self, bib: &Value) -> Option<(String, Vec<Holding>)> {
        let Some(bib) = bib.as_object() else {
            warn!("skipping non-object bib in availability envelope");
            return None;
        };
        let Some(record_id) = bib.get("mms_id").and_then(content_string) else {
            warn!("skipping bib without mms_id in availability envelope");
            return None;
        };

        let datafields = bib.get("record").and_then(|record| record.get("datafield"));
        let mut holdings = Vec::new();
        for datafield in as_list(datafields) {
            let Some(tag) = datafield.get("tag").and_then(Value::as_str) else {
                continue;
            };
            // Other MARC tags coexist in the same record; only the three
            // availability tags carry inventory data.
            let Some(kind) = InventoryKind::from_tag(tag) else {
                continue;
            };

            let mut holding = Holding::new(kind);
            for subfield in as_list(datafield.get("subfield")) {
                let Some(code) = subfield.get("code").and_then(Value::as_str) else {
                    continue;
                };
                let Some(name) = kind.field_name(code) else {
                    continue;
                };
                let Some(value) = subfield_content(subfield) else {
                    continue;
                };
                holding.set(name, value);
            }

            let holding = match &self.transform {
                Some(transform) => match transform(holding) {
                    Some(h) => h,
                    None => continue,
                },
                None => holding,
            };
            holdings.push(holding);
        }
        Some((record_id, holdings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn physical_datafield(availability: &str, library: &str) -> Value {
        json!({
            "tag": "AVA",
            "subfield": [
                { "code": "e", "__content__": availability },
                { "code": "q", "__content__": library }
            ]
        })
    }

    #[test]
    fn collapsed_lists_decode_like_explicit_lists() {
        let collapsed = json!({
            "bibs": {
                "bib": {
                    "mms_id": "991",
                    "record": {
                        "datafield": {
                            "tag": "AVA",
                            "subfield": { "code": "e", "__content__": "available" }
                        }
                    }
                }
            }
        });
        let explicit = json!({
            "bibs": {
                "bib": [{
                    "mms_id": "991",
                    "record": {
                        "datafield": [{
                            "tag": "AVA",
                            "subfield": [{ "code": "e", "__content__": "available" }]
                        }]
                    }
                }]
            }
        });

        let a = Decoder::new().decode(&collapsed).unwrap();
        let b = Decoder::new().decode(&explicit).unwrap();
        assert_eq!(a.records, b.records);
        assert_eq!(
            a.records.get("991").unwrap()[0].get("availability"),
            Some("available")
        );
    }

    #[test]
    fn unrecognized_tags_are_dropped() {
        let envelope = json!({
            "bibs": {
                "bib": {
                    "mms_id": "991",
                    "record": {
                        "datafield": [
                            { "tag": "245", "subfield": { "code": "a", "__content__": "A title" } },
                            physical_datafield("available", "Main")
                        ]
                    }
                }
            }
        });
        let decoded = Decoder::new().decode(&envelope).unwrap();
        let holdings = decoded.records.get("991").unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].kind, InventoryKind::Physical);
        // nothing from the 245 field leaks through
        assert!(holdings[0].fields().all(|(_, v)| v != "A title"));
    }

    #[test]
    fn unknown_subfield_codes_are_dropped_not_renamed() {
        let envelope = json!({
            "bibs": {
                "bib": {
                    "mms_id": "991",
                    "record": {
                        "datafield": {
                            "tag": "AVD",
                            "subfield": [
                                { "code": "a", "__content__": "Inst" },
                                { "code": "z", "__content__": "mystery" }
                            ]
                        }
                    }
                }
            }
        });
        let decoded = Decoder::new().decode(&envelope).unwrap();
        let holding = &decoded.records.get("991").unwrap()[0];
        assert_eq!(holding.get("institution"), Some("Inst"));
        assert_eq!(holding.fields().count(), 1);
    }

    #[test]
    fn one_record_per_id_with_order_preserved() {
        let envelope = json!({
            "bibs": {
                "bib": [
                    {
                        "mms_id": "111",
                        "record": {
                            "datafield": [
                                physical_datafield("available", "First"),
                                physical_datafield("unavailable", "Second")
                            ]
                        }
                    },
                    {
                        "mms_id": "222",
                        "record": {
                            "datafield": physical_datafield("available", "Other")
                        }
                    }
                ]
            }
        });
        let decoded = Decoder::new().decode(&envelope).unwrap();
        assert_eq!(decoded.records.len(), 2);

        let first = decoded.records.get("111").unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].get("library"), Some("First"));
        assert_eq!(first[1].get("library"), Some("Second"));

        let second = decoded.records.get("222").unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].get("library"), Some("Other"));
    }

    #[test]
    fn duplicate_ids_within_envelope_concatenate() {
        // bound-with records can surface the same mms_id twice
        let envelope = json!({
            "bibs": {
                "bib": [
                    {
                        "mms_id": "111",
                        "record": { "datafield": physical_datafield("available", "A") }
                    },
                    {
                        "mms_id": "111",
                        "record": { "datafield": physical_datafield("available", "B") }
                    }
                ]
            }
        });
        let decoded = Decoder::new().decode(&envelope).unwrap();
        let holdings = decoded.records.get("111").unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].get("library"), Some("A"));
        assert_eq!(holdings[1].get("library"), Some("B"));
    }

    #[test]
    fn malformed_bib_is_isolated_and_counted() {
        let envelope = json!({
            "bibs": {
                "bib": [
                    "not an object",
                    { "record": {} },
                    {
                        "mms_id": "333",
                        "record": { "datafield": physical_datafield("available", "Main") }
                    }
                ]
            }
        });
        let decoded = Decoder::new().decode(&envelope).unwrap();
        assert_eq!(decoded.skipped_bibs, 2);
        assert_eq!(decoded.records.len(), 1);
        assert!(decoded.records.contains_key("333"));
    }

    #[test]
    fn bib_without_datafields_yields_empty_holdings() {
        let envelope = json!({
            "bibs": { "bib": { "mms_id": "444" } }
        });
        let decoded = Decoder::new().decode(&envelope).unwrap();
        assert_eq!(decoded.records.get("444").unwrap().len(), 0);
        assert_eq!(decoded.skipped_bibs, 0);
    }

    #[test]
    fn upstream_error_short_circuits() {
        let envelope = json!({
            "web_service_result": {
                "errorsExist": "true",
                "errorList": {
                    "error": {
                        "errorCode": "INTERNAL_SERVER_ERROR",
                        "errorMessage": "The web server encountered an unexpected condition."
                    }
                }
            }
        });
        let err = Decoder::new().decode(&envelope).unwrap_err();
        match err {
            DecodeError::Upstream { message, detail } => {
                assert!(message.contains("INTERNAL_SERVER_ERROR"));
                // the errorList payload is forwarded verbatim
                assert!(detail.get("error").is_some());
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn missing_bibs_is_malformed() {
        let err = Decoder::new().decode(&json!({})).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedEnvelope));

        let err = Decoder::new()
            .decode(&json!({ "bibs": "nope" }))
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedEnvelope));
    }

    #[test]
    fn transform_hook_rewrites_and_suppresses() {
        let envelope = json!({
            "bibs": {
                "bib": {
                    "mms_id": "991",
                    "record": {
                        "datafield": [
                            physical_datafield("available", "Main"),
                            physical_datafield("suppress me", "Annex")
                        ]
                    }
                }
            }
        });
        let decoder = Decoder::with_transform(|mut holding| {
            if holding.get("availability") == Some("suppress me") {
                return None;
            }
            holding.set("note", "enriched");
            Some(holding)
        });
        let decoded = decoder.decode(&envelope).unwrap();
        let holdings = decoded.records.get("991").unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].get("note"), Some("enriched"));
    }
}
