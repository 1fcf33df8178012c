use std::collections::BTreeMap;

use serde::Serialize;

use super::error::ConfigError;
use super::types::AssetClass;

/// Ordered annual returns for one asset class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassSeries {
    pub asset: AssetClass,
    pub first_year: i32,
    pub returns: Vec<f64>,
}

impl AssetClassSeries {
    pub fn new(asset: AssetClass, first_year: i32, returns: Vec<f64>) -> Self {
        Self {
            asset,
            first_year,
            returns,
        }
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Return for calendar `year`, clamped to the last observation once the
    /// series has ended. `None` before the first year or for an empty series.
    pub fn for_year(&self, year: i32) -> Option<f64> {
        let offset = usize::try_from(year.checked_sub(self.first_year)?).ok()?;
        let last = self.returns.len().checked_sub(1)?;
        Some(self.returns[offset.min(last)])
    }

    pub fn calendar_year(&self, index: usize) -> i32 {
        self.first_year + index as i32
    }

    pub fn last_year(&self) -> i32 {
        self.calendar_year(self.returns.len().saturating_sub(1))
    }
}

/// Symmetric cross-asset correlations. Missing pairs read as 0, the
/// diagonal always reads as 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pairs: BTreeMap<(AssetClass, AssetClass), f64>,
}

impl CorrelationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, a: AssetClass, b: AssetClass, rho: f64) -> Result<(), ConfigError> {
        if a == b {
            return Ok(());
        }
        if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
            return Err(ConfigError::CorrelationRange {
                left: a.label(),
                right: b.label(),
                value: rho,
            });
        }
        self.pairs.insert((a, b), rho);
        self.pairs.insert((b, a), rho);
        Ok(())
    }

    pub fn with(mut self, a: AssetClass, b: AssetClass, rho: f64) -> Result<Self, ConfigError> {
        self.set(a, b, rho)?;
        Ok(self)
    }

    pub fn get(&self, a: AssetClass, b: AssetClass) -> f64 {
        if a == b {
            return 1.0;
        }
        self.pairs.get(&(a, b)).copied().unwrap_or(0.0)
    }

    /// Dense sub-matrix over `assets`, in the given order.
    pub fn dense(&self, assets: &[AssetClass]) -> Vec<Vec<f64>> {
        assets
            .iter()
            .map(|a| assets.iter().map(|b| self.get(*a, *b)).collect())
            .collect()
    }
}

/// Read-only historical inputs injected into the engine.
pub trait HistoricalDataSource: Send + Sync {
    fn series(&self, asset: AssetClass) -> Option<&AssetClassSeries>;
    fn inflation(&self) -> &[f64];
    fn correlation(&self) -> &CorrelationMatrix;
}

#[derive(Debug, Clone, Default)]
pub struct HistoricalData {
    series: BTreeMap<AssetClass, AssetClassSeries>,
    inflation: Vec<f64>,
    correlation: CorrelationMatrix,
}

impl HistoricalData {
    pub fn new(inflation: Vec<f64>, correlation: CorrelationMatrix) -> Self {
        Self {
            series: BTreeMap::new(),
            inflation,
            correlation,
        }
    }

    /// Empty series are dropped so lookups treat them as absent.
    pub fn with_series(mut self, series: AssetClassSeries) -> Self {
        if series.is_empty() {
            self.series.remove(&series.asset);
        } else {
            self.series.insert(series.asset, series);
        }
        self
    }

    pub fn without_series(mut self, asset: AssetClass) -> Self {
        self.series.remove(&asset);
        self
    }

    pub fn all_series(&self) -> impl Iterator<Item = &AssetClassSeries> {
        self.series.values()
    }
}

impl HistoricalDataSource for HistoricalData {
    fn series(&self, asset: AssetClass) -> Option<&AssetClassSeries> {
        self.series.get(&asset)
    }

    fn inflation(&self) -> &[f64] {
        &self.inflation
    }

    fn correlation(&self) -> &CorrelationMatrix {
        &self.correlation
    }
}
