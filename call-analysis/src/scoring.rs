use crate::analysis::EnrichmentSnapshot;
use serde::{Deserialize, Serialize};

/// Weights for combining enrichment sub-scores into a single SDOH risk
/// score.
///
/// The composite is
/// `transportation * w_t + health_literacy * w_l + pharmacy * w_p +
/// rural * w_r + uninsured * w_i`, clamped to `0.0..=1.0`, where the
/// pharmacy term is the distance normalized against
/// `pharmacy_distance_cap_miles` and the rural/uninsured terms are 0 or 1.
///
/// Defaults (an even split, with insurance weighted slightly higher):
///
/// | Weight | Env var | Default |
/// |---|---|---|
/// | `transportation` | `SDOH_WEIGHT_TRANSPORTATION` | 0.20 |
/// | `health_literacy` | `SDOH_WEIGHT_HEALTH_LITERACY` | 0.20 |
/// | `pharmacy_distance` | `SDOH_WEIGHT_PHARMACY_DISTANCE` | 0.20 |
/// | `rural` | `SDOH_WEIGHT_RURAL` | 0.15 |
/// | `uninsured` | `SDOH_WEIGHT_UNINSURED` | 0.25 |
/// | `pharmacy_distance_cap_miles` | `SDOH_PHARMACY_DISTANCE_CAP_MILES` | 25.0 |
///
/// These are product-tunable policy, not invariants; deployments override
/// them per market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub transportation: f64,
    pub health_literacy: f64,
    pub pharmacy_distance: f64,
    pub rural: f64,
    pub uninsured: f64,
    /// Distance at which the pharmacy term saturates to 1.0.
    pub pharmacy_distance_cap_miles: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            transportation: 0.20,
            health_literacy: 0.20,
            pharmacy_distance: 0.20,
            rural: 0.15,
            uninsured: 0.25,
            pharmacy_distance_cap_miles: 25.0,
        }
    }
}

impl ScoringWeights {
    /// Load weights from environment variables, falling back to the
    /// documented defaults per field.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        fn env_f64(name: &str, default: f64) -> f64 {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        }

        Self {
            transportation: env_f64("SDOH_WEIGHT_TRANSPORTATION", defaults.transportation),
            health_literacy: env_f64("SDOH_WEIGHT_HEALTH_LITERACY", defaults.health_literacy),
            pharmacy_distance: env_f64(
                "SDOH_WEIGHT_PHARMACY_DISTANCE",
                defaults.pharmacy_distance,
            ),
            rural: env_f64("SDOH_WEIGHT_RURAL", defaults.rural),
            uninsured: env_f64("SDOH_WEIGHT_UNINSURED", defaults.uninsured),
            pharmacy_distance_cap_miles: env_f64(
                "SDOH_PHARMACY_DISTANCE_CAP_MILES",
                defaults.pharmacy_distance_cap_miles,
            ),
        }
    }

    /// Weighted composite risk for an enrichment snapshot, clamped to
    /// `0.0..=1.0`.
    pub fn risk_score(&self, enrichment: &EnrichmentSnapshot) -> f64 {
        let pharmacy_term = if self.pharmacy_distance_cap_miles > 0.0 {
            (enrichment.pharmacy_distance_miles / self.pharmacy_distance_cap_miles).min(1.0)
        } else {
            0.0
        };
        let rural_term = if enrichment.rural { 1.0 } else { 0.0 };
        let uninsured_term = if enrichment.insurance_covered { 0.0 } else { 1.0 };

        let score = enrichment.transportation_score * self.transportation
            + enrichment.health_literacy_score * self.health_literacy
            + pharmacy_term * self.pharmacy_distance
            + rural_term * self.rural
            + uninsured_term * self.uninsured;

        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EnrichmentSnapshot {
        EnrichmentSnapshot {
            rural: true,
            transportation_score: 0.5,
            health_literacy_score: 0.5,
            pharmacy_distance_miles: 12.5,
            insurance_covered: false,
        }
    }

    #[test]
    fn default_weights_produce_expected_score() {
        let weights = ScoringWeights::default();
        let score = weights.risk_score(&snapshot());
        // 0.5*0.2 + 0.5*0.2 + 0.5*0.2 + 1.0*0.15 + 1.0*0.25
        assert!((score - 0.70).abs() < 1e-9);
    }

    #[test]
    fn score_is_clamped() {
        let weights = ScoringWeights {
            transportation: 2.0,
            health_literacy: 2.0,
            pharmacy_distance: 2.0,
            rural: 2.0,
            uninsured: 2.0,
            pharmacy_distance_cap_miles: 25.0,
        };
        assert_eq!(weights.risk_score(&snapshot()), 1.0);
    }

    #[test]
    fn pharmacy_term_saturates_at_cap() {
        let weights = ScoringWeights {
            transportation: 0.0,
            health_literacy: 0.0,
            pharmacy_distance: 1.0,
            rural: 0.0,
            uninsured: 0.0,
            pharmacy_distance_cap_miles: 10.0,
        };
        let mut snap = snapshot();
        snap.pharmacy_distance_miles = 120.0;
        assert_eq!(weights.risk_score(&snap), 1.0);
    }
}
