//! Inventory-type schema registry.
//!
//! The ILS reports availability as MARC-style datafields whose tag selects
//! the inventory kind: `AVA` (physical), `AVD` (digital), `AVE` (electronic).
//! Each kind has a fixed subfield-code to field-name table. The tables are
//! const data describing the upstream API contract; any other tag in the
//! record is not inventory data.

/// Closed set of inventory kinds carried by availability datafields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryKind {
    /// Physical copies on a shelf (`AVA`)
    Physical,
    /// Digital repository representations (`AVD`)
    Digital,
    /// Electronic portfolios/collections (`AVE`)
    Electronic,
}

const PHYSICAL_FIELDS: &[(&str, &str)] = &[
    ("a", "institution"),
    ("b", "library_code"),
    ("c", "location"),
    ("d", "call_number"),
    ("e", "availability"),
    ("f", "total_items"),
    ("g", "non_available_items"),
    ("j", "location_code"),
    ("k", "call_number_type"),
    ("p", "priority"),
    ("q", "library"),
    ("t", "holding_info"),
    ("8", "holding_id"),
];

const DIGITAL_FIELDS: &[(&str, &str)] = &[
    ("a", "institution"),
    ("b", "representations_id"),
    ("c", "representation"),
    ("d", "repository_name"),
    ("e", "label"),
];

const ELECTRONIC_FIELDS: &[(&str, &str)] = &[
    ("c", "collection_id"),
    ("e", "activation_status"),
    ("l", "library_code"),
    ("m", "collection"),
    ("n", "public_note"),
    ("s", "coverage_statement"),
    ("t", "interface_name"),
    ("u", "link_to_service_page"),
    ("8", "portfolio_pid"),
];

impl InventoryKind {
    /// Resolve a datafield tag to its inventory kind.
    ///
    /// Returns `None` for every tag outside the three availability tags;
    /// those datafields must be excluded before per-field decoding.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "AVA" => Some(Self::Physical),
            "AVD" => Some(Self::Digital),
            "AVE" => Some(Self::Electronic),
            _ => None,
        }
    }

    /// The datafield tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Physical => "AVA",
            Self::Digital => "AVD",
            Self::Electronic => "AVE",
        }
    }

    /// Lower-case label used in logs and display contexts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Digital => "digital",
            Self::Electronic => "electronic",
        }
    }

    /// Look up the human-readable field name for a subfield code.
    ///
    /// A code absent from the kind's table has no name; the caller must
    /// drop the subfield rather than invent a key.
    pub fn field_name(&self, code: &str) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Physical => PHYSICAL_FIELDS,
            Self::Digital => DIGITAL_FIELDS,
            Self::Electronic => ELECTRONIC_FIELDS,
        }
    }
}
