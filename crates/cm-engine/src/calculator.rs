//! Calculation engine: one activity in, one emission value out.
//!
//! Pure over an injected [`FactorTable`]. Values are `quantity × factor / 1000`
//! (kg to tonnes), or `distance × weight × factor / 1000` for freight, rounded
//! to four decimals.

use cm_core::entities::ActivityPayload;
use cm_core::responses::EmissionCalculation;

use crate::error::EngineError;
use crate::factors::{FREIGHT_KEYS, FactorTable};

const KM_PER_MILE: f64 = 1.609_344;

/// Prices activities against a factor table.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    factors: FactorTable,
}

impl Calculator {
    #[must_use]
    pub const fn new(factors: FactorTable) -> Self {
        Self { factors }
    }

    #[must_use]
    pub const fn factors(&self) -> &FactorTable {
        &self.factors
    }

    /// Compute the emission value of one activity.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for negative or non-finite quantities,
    ///   a transport activity without a mode, or freight without a weight.
    /// - [`EngineError::UnknownActivityKind`] when no factor matches.
    pub fn compute(&self, payload: &ActivityPayload) -> Result<EmissionCalculation, EngineError> {
        if !payload.quantity.is_finite() || payload.quantity < 0.0 {
            return Err(EngineError::Validation(format!(
                "quantity must be a non-negative number, got {}",
                payload.quantity
            )));
        }

        let key = resolve_key(payload)?;
        let factor = self
            .factors
            .get(&key)
            .ok_or_else(|| EngineError::UnknownActivityKind(key.clone()))?;

        let (quantity, unit) = normalize_distance(payload);
        let is_freight = FREIGHT_KEYS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(&factor.key));

        let kg = if is_freight {
            let weight = match payload.weight {
                Some(w) if w.is_finite() && w > 0.0 => w,
                Some(w) => {
                    return Err(EngineError::Validation(format!(
                        "freight weight must be a positive number of tonnes, got {w}"
                    )));
                }
                None => {
                    return Err(EngineError::Validation(format!(
                        "{} is priced per tonne-km and needs a cargo weight",
                        factor.key
                    )));
                }
            };
            quantity * weight * factor.value
        } else {
            quantity * factor.value
        };

        Ok(EmissionCalculation {
            emission_value: round4(kg / 1000.0),
            factor: factor.to_ref(),
            normalized_quantity: quantity,
            normalized_unit: unit,
        })
    }
}

/// Map kind (plus sub-mode) to a factor key.
fn resolve_key(payload: &ActivityPayload) -> Result<String, EngineError> {
    let kind = payload.kind.trim();
    let mode = payload
        .mode
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    if kind.eq_ignore_ascii_case("transport") {
        let mode = mode.ok_or_else(|| {
            EngineError::Validation(
                "transport activities need a mode (Air, Rail, Road, Ship or Car)".into(),
            )
        })?;
        let key = match mode.to_ascii_lowercase().as_str() {
            "air" => "Air Travel",
            "rail" if payload.weight.is_some() => "Rail Freight",
            "rail" => "Rail Travel",
            "road" | "truck" => "Road Freight",
            "ship" | "sea" => "Ship Freight",
            "car" => "Car Commute",
            _ => return Err(EngineError::UnknownActivityKind(format!("Transport ({mode})"))),
        };
        return Ok(key.to_string());
    }

    if kind.eq_ignore_ascii_case("electricity") {
        let source = mode.unwrap_or("Grid");
        return Ok(format!("Electricity ({})", title_case(source)));
    }

    Ok(kind.to_string())
}

/// Convert transport distances given in miles to km.
fn normalize_distance(payload: &ActivityPayload) -> (f64, String) {
    match payload.unit.trim().to_ascii_lowercase().as_str() {
        "mi" | "mile" | "miles" => (payload.quantity * KM_PER_MILE, "km".to_string()),
        _ => (payload.quantity, payload.unit.trim().to_string()),
    }
}

fn title_case(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payload(kind: &str, quantity: f64, unit: &str) -> ActivityPayload {
        ActivityPayload {
            kind: kind.into(),
            quantity,
            unit: unit.into(),
            mode: None,
            weight: None,
        }
    }

    fn transport(mode: &str, distance: f64, weight: Option<f64>) -> ActivityPayload {
        ActivityPayload {
            kind: "Transport".into(),
            quantity: distance,
            unit: "km".into(),
            mode: Some(mode.into()),
            weight,
        }
    }

    #[rstest]
    #[case("Diesel", 1000.0, 2.68)]
    #[case("Petrol", 100.0, 0.231)]
    #[case("Coal", 500.0, 1.43)]
    #[case("Steam", 2.0, 0.68)]
    #[case("Landfill", 1.5, 0.63)]
    #[case("Hotel Night", 3.0, 0.0375)]
    fn direct_kinds_use_quantity_times_factor(
        #[case] kind: &str,
        #[case] quantity: f64,
        #[case] expected: f64,
    ) {
        let calc = Calculator::default();
        let result = calc.compute(&payload(kind, quantity, "unit")).unwrap();
        assert!(
            (result.emission_value - expected).abs() < 1e-9,
            "{kind}: {} != {expected}",
            result.emission_value
        );
    }

    #[test]
    fn every_builtin_factor_follows_the_formula() {
        let calc = Calculator::default();
        for factor in calc.factors().entries() {
            if FREIGHT_KEYS.contains(&factor.key.as_str()) {
                continue;
            }
            let result = calc.compute(&payload(&factor.key, 123.0, "unit")).unwrap();
            assert!((result.emission_value - round4(123.0 * factor.value / 1000.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn electricity_defaults_to_grid() {
        let calc = Calculator::default();
        let result = calc.compute(&payload("Electricity", 1000.0, "kWh")).unwrap();
        assert_eq!(result.factor.key, "Electricity (Grid)");
        assert!((result.emission_value - 0.82).abs() < 1e-9);

        let mut renewable = payload("electricity", 1000.0, "kWh");
        renewable.mode = Some("renewable".into());
        let result = calc.compute(&renewable).unwrap();
        assert_eq!(result.factor.key, "Electricity (Renewable)");
        assert!(result.emission_value.abs() < f64::EPSILON);
    }

    #[test]
    fn freight_multiplies_by_weight() {
        let calc = Calculator::default();
        let result = calc.compute(&transport("Road", 500.0, Some(2.0))).unwrap();
        assert_eq!(result.factor.key, "Road Freight");
        assert!((result.emission_value - 0.062).abs() < 1e-9);
    }

    #[test]
    fn freight_without_weight_is_rejected() {
        let calc = Calculator::default();
        let err = calc.compute(&transport("Ship", 500.0, None)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn rail_is_passenger_without_weight_and_freight_with_it() {
        let calc = Calculator::default();
        let passenger = calc.compute(&transport("Rail", 1000.0, None)).unwrap();
        assert_eq!(passenger.factor.key, "Rail Travel");
        assert!((passenger.emission_value - 0.041).abs() < 1e-9);

        let freight = calc.compute(&transport("Rail", 1000.0, Some(10.0))).unwrap();
        assert_eq!(freight.factor.key, "Rail Freight");
        assert!((freight.emission_value - 0.22).abs() < 1e-9);
    }

    #[test]
    fn miles_are_converted_to_km() {
        let calc = Calculator::default();
        let mut trip = transport("Car", 100.0, None);
        trip.unit = "miles".into();
        let result = calc.compute(&trip).unwrap();
        assert_eq!(result.normalized_unit, "km");
        assert!((result.normalized_quantity - 160.9344).abs() < 1e-9);
        assert!((result.emission_value - round4(160.9344 * 0.192 / 1000.0)).abs() < 1e-12);
    }

    #[test]
    fn unknown_kind_is_an_error_not_zero() {
        let calc = Calculator::default();
        let err = calc.compute(&payload("Unobtainium", 1.0, "kg")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownActivityKind(ref k) if k == "Unobtainium"));
    }

    #[test]
    fn unknown_transport_mode_is_an_error() {
        let calc = Calculator::default();
        let err = calc.compute(&transport("Hyperloop", 10.0, None)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownActivityKind(_)));
    }

    #[test]
    fn transport_without_mode_is_validation() {
        let calc = Calculator::default();
        let err = calc.compute(&payload("Transport", 10.0, "km")).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn bad_quantities_are_rejected(#[case] quantity: f64) {
        let calc = Calculator::default();
        let err = calc.compute(&payload("Diesel", quantity, "L")).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn results_round_to_four_decimals() {
        let calc = Calculator::default();
        let result = calc.compute(&payload("Diesel", 1.0, "L")).unwrap();
        assert!((result.emission_value - 0.0027).abs() < 1e-12);
    }
}
