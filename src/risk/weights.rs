//! Category weight table

use super::registry::{RiskCategory, MAX_BASE_RISK};
use super::scorer::SCORE_PRECISION;
use crate::domain::errors::PhiGuardError;
use crate::domain::result::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Multiplier per risk category
///
/// Every category always has a weight. Tables are values: an adjustment
/// produces a new table through [`WeightTable::merged`], and the scoring
/// session publishes it in one swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    weights: BTreeMap<RiskCategory, f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        let weights = BTreeMap::from([
            (RiskCategory::Name, 1.0),
            (RiskCategory::Id, 1.0),
            (RiskCategory::Date, 0.8),
            (RiskCategory::Time, 0.6),
            (RiskCategory::Uid, 0.7),
            (RiskCategory::Descriptor, 0.5),
            (RiskCategory::Unknown, 1.0),
        ]);
        Self { weights }
    }
}

impl WeightTable {
    pub fn weight(&self, category: RiskCategory) -> f64 {
        self.weights.get(&category).copied().unwrap_or(1.0)
    }

    /// Copy of this table with `overrides` merged in
    ///
    /// All overrides are validated first; on error `self` is untouched and
    /// no partial table is produced.
    pub fn merged<I>(&self, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (RiskCategory, f64)>,
    {
        let overrides: Vec<(RiskCategory, f64)> = overrides.into_iter().collect();
        for (category, multiplier) in &overrides {
            validate_multiplier(*category, *multiplier)?;
        }

        let mut weights = self.weights.clone();
        weights.extend(overrides);
        Ok(Self { weights })
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskCategory, f64)> + '_ {
        self.weights.iter().map(|(c, w)| (*c, *w))
    }
}

/// Parse category names into typed overrides
///
/// Unknown category names fail with [`PhiGuardError::UnknownCategory`].
pub fn parse_overrides<I, K>(overrides: I) -> Result<Vec<(RiskCategory, f64)>>
where
    I: IntoIterator<Item = (K, f64)>,
    K: AsRef<str>,
{
    overrides
        .into_iter()
        .map(|(name, multiplier)| {
            let category = name.as_ref().parse::<RiskCategory>()?;
            validate_multiplier(category, multiplier)?;
            Ok((category, multiplier))
        })
        .collect()
}

/// Multipliers must be non-negative and keep the largest possible field risk
/// finite at [`SCORE_PRECISION`] decimals
fn validate_multiplier(category: RiskCategory, multiplier: f64) -> Result<()> {
    let scaled = MAX_BASE_RISK * multiplier * 10f64.powi(SCORE_PRECISION);
    if !multiplier.is_finite() || multiplier < 0.0 || !scaled.is_finite() {
        return Err(PhiGuardError::InvalidWeight {
            category: category.to_string(),
            multiplier,
        });
    }
    Ok(())
}
