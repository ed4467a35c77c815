use serde::{Deserialize, Serialize};

/// One row of the provider breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetric {
    name: String,
    total_rvu: f64,
}

impl ProviderMetric {
    pub fn new(name: impl Into<String>, total_rvu: f64) -> Self {
        Self {
            name: name.into(),
            total_rvu,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_rvu(&self) -> f64 {
        self.total_rvu
    }
}

/// Aggregated productivity for one clinic scope over one reporting period.
///
/// Values are taken as given: the aggregation step that builds this is
/// responsible for non-negative, finite numbers. `provider_breakdown` keeps
/// insertion order, which is the order rows are printed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicPeriodMetrics {
    clinic_name: String,
    period_label: String,
    total_weighted_rvu: f64,
    rvu_per_fte: f64,
    new_patient_count_approx: u64,
    #[serde(default)]
    provider_breakdown: Vec<ProviderMetric>,
}

impl ClinicPeriodMetrics {
    pub fn new(
        clinic_name: impl Into<String>,
        period_label: impl Into<String>,
        total_weighted_rvu: f64,
        rvu_per_fte: f64,
        new_patient_count_approx: u64,
        provider_breakdown: Vec<ProviderMetric>,
    ) -> Self {
        Self {
            clinic_name: clinic_name.into(),
            period_label: period_label.into(),
            total_weighted_rvu,
            rvu_per_fte,
            new_patient_count_approx,
            provider_breakdown,
        }
    }

    /// Divides `total` by `fte`, yielding 0.0 when there is no usable
    /// denominator.
    pub fn per_fte(total: f64, fte: f64) -> f64 {
        if fte.is_finite() && fte > 0.0 {
            total / fte
        } else {
            0.0
        }
    }

    /// Same metrics with providers ordered by descending `total_rvu`.
    /// Ties keep their original relative order.
    pub fn sorted_by_volume(mut self) -> Self {
        self.provider_breakdown
            .sort_by(|a, b| b.total_rvu.total_cmp(&a.total_rvu));
        self
    }

    pub fn clinic_name(&self) -> &str {
        &self.clinic_name
    }

    pub fn period_label(&self) -> &str {
        &self.period_label
    }

    pub fn total_weighted_rvu(&self) -> f64 {
        self.total_weighted_rvu
    }

    pub fn rvu_per_fte(&self) -> f64 {
        self.rvu_per_fte
    }

    pub fn new_patient_count_approx(&self) -> u64 {
        self.new_patient_count_approx
    }

    pub fn provider_breakdown(&self) -> &[ProviderMetric] {
        &self.provider_breakdown
    }

    pub fn provider_count(&self) -> usize {
        self.provider_breakdown.len()
    }

    pub fn is_breakdown_empty(&self) -> bool {
        self.provider_breakdown.is_empty()
    }
}
