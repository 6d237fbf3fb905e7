//! Funding-method translation.
//!
//! Store settings carry funding sources as strings; the SDK wants entries
//! of its `paypal.FUNDING` table. Translation happens in two steps so the
//! name mapping stays testable off-browser: names resolve to this enum
//! here, and the enum resolves to the opaque table values at render time
//! (see `bindings::funding_values`).

use serde::Deserialize;

/// Funding sources understood by checkout.js.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundingMethod {
    Card,
    Credit,
    Elv,
    Venmo,
}

impl FundingMethod {
    /// Key of this method in the SDK's `FUNDING` table.
    pub fn sdk_key(self) -> &'static str {
        match self {
            FundingMethod::Card => "CARD",
            FundingMethod::Credit => "CREDIT",
            FundingMethod::Elv => "ELV",
            FundingMethod::Venmo => "VENMO",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CARD" => Some(FundingMethod::Card),
            "CREDIT" => Some(FundingMethod::Credit),
            "ELV" => Some(FundingMethod::Elv),
            "VENMO" => Some(FundingMethod::Venmo),
            _ => None,
        }
    }
}

/// Translate configured names, dropping anything the SDK does not define.
/// Order is preserved.
pub fn translate(names: &[String]) -> Vec<FundingMethod> {
    names
        .iter()
        .filter_map(|name| FundingMethod::from_name(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_one_to_one_in_order() {
        let names = vec!["VENMO".to_owned(), "CARD".to_owned(), "CREDIT".to_owned()];
        assert_eq!(
            translate(&names),
            vec![
                FundingMethod::Venmo,
                FundingMethod::Card,
                FundingMethod::Credit
            ]
        );
    }

    #[test]
    fn unknown_names_are_dropped_silently() {
        let names = vec![
            "CARD".to_owned(),
            "BITCOIN".to_owned(),
            "elv".to_owned(), // names are case-sensitive, as in the SDK table
            "ELV".to_owned(),
        ];
        assert_eq!(
            translate(&names),
            vec![FundingMethod::Card, FundingMethod::Elv]
        );
    }

    #[test]
    fn empty_input_translates_to_empty_output() {
        assert!(translate(&[]).is_empty());
    }
}
