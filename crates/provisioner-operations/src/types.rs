use serde::{Deserialize, Serialize};

/// A KPI as authored, before it is shaped for the stats calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub id: String,
    pub name: String,
    pub expression: String,
    /// Minimum share of reporting sources for a value to be trusted.
    #[serde(default = "default_reliability")]
    pub reliability: f64,
}

fn default_reliability() -> f64 {
    1.0
}

/// Enrichment rule pushed to the augmentation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationRule {
    pub id: String,
    pub kpi_id: String,
    pub field: String,
    pub value: String,
}

/// The pending work item a provisioning run applies.
/// File format:
/// ```toml
/// [[definitions]]
/// id = "cpu_load"
/// name = "CPU load"
/// expression = "avg(cpu.busy)"
///
/// [[augmentations]]
/// id = "cpu_load_site"
/// kpi_id = "cpu_load"
/// field = "site"
/// value = "north"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningWork {
    #[serde(default)]
    pub definitions: Vec<KpiDefinition>,
    #[serde(default)]
    pub augmentations: Vec<AugmentationRule>,
}

impl ProvisioningWork {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.augmentations.is_empty()
    }
}

/// Settings for shaping KPI definitions into calculator definitions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Added to every KPI's reliability before clamping to `0.0..=1.0`.
    pub reliability_offset: f64,
}

/// A KPI definition in the shape the stats calculator accepts; also the
/// record kept in the local resolved-definition store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorDefinition {
    pub id: String,
    pub name: String,
    pub expression: String,
    pub reliability_threshold: f64,
}

impl CalculatorDefinition {
    #[must_use]
    pub fn from_kpi(kpi: &KpiDefinition, config: &TransformConfig) -> Self {
        Self {
            id: kpi.id.clone(),
            name: kpi.name.clone(),
            expression: kpi.expression.clone(),
            reliability_threshold: (kpi.reliability + config.reliability_offset).clamp(0.0, 1.0),
        }
    }
}
