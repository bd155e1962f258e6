//! Carrying visitation codes forward from earlier runs.

use std::collections::HashMap;

use log::debug;

use crate::models::{Address, UNVISITED};

/// Sets each address's visitation code from `knowledge`, keyed by
/// formatted address. Addresses without an entry become [`UNVISITED`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use u_canvass::models::Address;
/// use u_canvass::pipeline::apply_knowledge;
///
/// let knowledge = HashMap::from([("1 Main St".to_string(), "not-home".to_string())]);
/// let stops = apply_knowledge(
///     vec![Address::new("1 Main St", 0.0, 0.0), Address::new("2 Main St", 0.0, 0.0)],
///     &knowledge,
/// );
/// assert_eq!(stops[0].code(), "not-home");
/// assert_eq!(stops[1].code(), "unvisited");
/// ```
pub fn apply_knowledge(
    addresses: Vec<Address>,
    knowledge: &HashMap<String, String>,
) -> Vec<Address> {
    let mut known = 0;
    let out: Vec<Address> = addresses
        .into_iter()
        .map(|a| match knowledge.get(a.formatted_address()) {
            Some(code) => {
                known += 1;
                let code = code.clone();
                a.with_code(code)
            }
            None => a.with_code(UNVISITED),
        })
        .collect();
    debug!("knowledge base matched {known} of {} addresses", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_existing_code() {
        let knowledge = HashMap::from([("a".to_string(), "refused".to_string())]);
        let stops = apply_knowledge(vec![Address::new("a", 0.0, 0.0).with_code("old")], &knowledge);
        assert_eq!(stops[0].code(), "refused");
    }

    #[test]
    fn test_unknown_reset_to_unvisited() {
        let stops = apply_knowledge(
            vec![Address::new("a", 0.0, 0.0).with_code("stale")],
            &HashMap::new(),
        );
        assert_eq!(stops[0].code(), UNVISITED);
    }
}
