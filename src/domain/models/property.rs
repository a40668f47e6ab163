use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One rentable apartment as configured for the deployment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PropertyConfig {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub cleaning_fee: Decimal,
    #[serde(default)]
    pub vrbo_ics_url: Option<String>,
}

/// Shared property-id → apartment lookup table.
#[derive(Debug, Clone, Default)]
pub struct PropertyCatalog {
    properties: Vec<PropertyConfig>,
}

impl PropertyCatalog {
    pub fn new(properties: Vec<PropertyConfig>) -> Self {
        Self { properties }
    }

    pub fn all(&self) -> &[PropertyConfig] {
        &self.properties
    }

    pub fn find_by_id(&self, id: i64) -> Option<&PropertyConfig> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PropertyConfig> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn name_for(&self, id: i64) -> String {
        self.find_by_id(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Property {}", id))
    }

    pub fn cleaning_fee_for(&self, name: &str) -> Decimal {
        self.find_by_name(name).map(|p| p.cleaning_fee).unwrap_or(Decimal::ZERO)
    }
}
