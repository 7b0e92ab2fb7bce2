//! ID prefixes for store-generated identifiers.
//!
//! IDs have the shape `<prefix>-<8 hex chars>`, e.g. `act-a3f8b2c1`.

pub const PREFIX_ACTIVITY: &str = "act";
pub const PREFIX_CREDIT: &str = "crd";

/// Every prefix the store may generate.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_ACTIVITY, PREFIX_CREDIT];

/// Mask a real organization id for display to peers.
///
/// Peers only ever see `Org-` plus the last six characters of the id.
#[must_use]
pub fn mask_org_id(org_id: &str) -> String {
    let tail: String = org_id
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("Org-{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_six_chars() {
        assert_eq!(mask_org_id("org-1234567890"), "Org-567890");
    }

    #[test]
    fn mask_short_ids_whole() {
        assert_eq!(mask_org_id("abc"), "Org-abc");
    }
}
