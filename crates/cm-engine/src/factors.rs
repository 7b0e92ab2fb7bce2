//! Emission factor table.
//!
//! An immutable lookup of activity kind to kg CO2e per unit. The engine is
//! constructed with one; tests substitute fixtures via [`FactorTable::from_entries`].

use std::collections::HashMap;

use cm_core::entities::FactorRef;
use serde::Serialize;

/// One factor: kg CO2e per `unit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionFactor {
    pub key: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
}

impl EmissionFactor {
    #[must_use]
    pub fn to_ref(&self) -> FactorRef {
        FactorRef {
            key: self.key.clone(),
            value: self.value,
            unit: self.unit.clone(),
            source: self.source.clone(),
        }
    }
}

/// Keys whose factor is per tonne-km; pricing them needs a cargo weight.
pub const FREIGHT_KEYS: [&str; 3] = ["Road Freight", "Rail Freight", "Ship Freight"];

const BUILTIN: &[(&str, f64, &str, &str)] = &[
    // Scope 1 fuels
    ("Petrol", 2.31, "kg CO2e/litre", "IPCC 2006"),
    ("Diesel", 2.68, "kg CO2e/litre", "IPCC 2006"),
    ("CNG", 1.85, "kg CO2e/kg", "IPCC 2006"),
    ("Natural Gas", 2.0, "kg CO2e/cubic meter", "IPCC 2006"),
    ("LPG", 2.98, "kg CO2e/kg", "IPCC 2006"),
    ("Coal", 2.86, "kg CO2e/kg", "IPCC 2006"),
    ("Furnace Oil", 3.15, "kg CO2e/litre", "IPCC 2006"),
    // Scope 2 energy
    ("Electricity (Grid)", 0.82, "kg CO2e/kWh", "India CEA 2023"),
    ("Electricity (Renewable)", 0.0, "kg CO2e/kWh", "Zero emission"),
    ("Steam", 340.0, "kg CO2e/ton", "Industry average"),
    ("Heating", 0.25, "kg CO2e/kWh", "Industry average"),
    ("Cooling", 0.18, "kg CO2e/kWh", "Industry average"),
    // Scope 3 transport
    ("Air Travel", 0.255, "kg CO2e/passenger-km", "DEFRA 2023"),
    ("Rail Travel", 0.041, "kg CO2e/passenger-km", "DEFRA 2023"),
    ("Road Freight", 0.062, "kg CO2e/ton-km", "IPCC"),
    ("Rail Freight", 0.022, "kg CO2e/ton-km", "IPCC"),
    ("Ship Freight", 0.016, "kg CO2e/ton-km", "IMO 2021"),
    ("Car Commute", 0.192, "kg CO2e/km", "IPCC"),
    ("Hotel Night", 12.5, "kg CO2e/night", "Industry average"),
    // Scope 3 waste
    ("Landfill", 420.0, "kg CO2e/ton", "IPCC Waste"),
    ("Recycled", 50.0, "kg CO2e/ton", "IPCC Waste"),
    ("Incinerated", 330.0, "kg CO2e/ton", "IPCC Waste"),
    // Scope 3 purchased goods
    ("Raw Materials", 0.5, "kg CO2e/INR", "Industry estimate"),
    ("Capital Goods", 0.3, "kg CO2e/INR", "Industry estimate"),
];

/// Case-insensitive factor lookup.
#[derive(Debug, Clone)]
pub struct FactorTable {
    entries: HashMap<String, EmissionFactor>,
}

impl FactorTable {
    /// IPCC / CEA / DEFRA factors for the common activity kinds.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().map(|(key, value, unit, source)| EmissionFactor {
            key: (*key).to_string(),
            value: *value,
            unit: (*unit).to_string(),
            source: (*source).to_string(),
        }))
    }

    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = EmissionFactor>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|f| (normalize(&f.key), f))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EmissionFactor> {
        self.entries.get(&normalize(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All factors sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<&EmissionFactor> {
        let mut all: Vec<_> = self.entries.values().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }
}

impl Default for FactorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_every_entry() {
        let table = FactorTable::builtin();
        assert_eq!(table.len(), BUILTIN.len());
        for key in FREIGHT_KEYS {
            assert!(table.get(key).is_some(), "{key} missing");
        }
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table = FactorTable::builtin();
        let diesel = table.get("  diesel ").unwrap();
        assert_eq!(diesel.key, "Diesel");
        assert!((diesel.value - 2.68).abs() < f64::EPSILON);
    }

    #[test]
    fn fixture_table_replaces_builtin() {
        let table = FactorTable::from_entries([EmissionFactor {
            key: "Widget".into(),
            value: 10.0,
            unit: "kg CO2e/unit".into(),
            source: "fixture".into(),
        }]);
        assert!(table.get("Diesel").is_none());
        assert!(table.get("widget").is_some());
    }
}
