use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum QuoteType {
    #[serde(rename = "3d")]
    PrintJob,
    #[serde(rename = "project")]
    Project,
}

impl QuoteType {
    pub fn label(self) -> &'static str {
        match self {
            QuoteType::PrintJob => "Impressão 3D",
            QuoteType::Project => "Projeto / Design",
        }
    }
}

impl fmt::Display for QuoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Piece count of a print job, never below 1.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(n: u32) -> Self {
        Quantity(n.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(self) -> Self {
        Quantity(self.0.saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        Quantity::new(self.0.saturating_sub(1))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity(1)
    }
}

/// An add-on line picked from the catalog for the current quote.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Addon {
    pub name: String,
    pub price: f64,
}

/// Print job form as typed by the user. Money and hours stay as
/// decimal-comma text until pricing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrintJobInput {
    pub description: String,
    pub material_weight: String,
    pub print_time: String,
    pub quantity: u32,
    pub profit_margin: u32,
    pub loss_margin: u32,
    pub finishing_cost: String,
    pub filament_cost_per_kg: String,
    pub machine_hour_cost: String,
    pub energy_hour_cost: String,
    #[serde(default)]
    pub addons: Vec<Addon>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub description: String,
    pub execution_time: String,
    pub hourly_rate: String,
    pub materials_cost: String,
    pub software_cost: String,
    pub other_costs: String,
    pub deadline: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum CalculationInput {
    PrintJob(PrintJobInput),
    Project(ProjectInput),
}

impl CalculationInput {
    pub fn quote_type(&self) -> QuoteType {
        match self {
            CalculationInput::PrintJob(_) => QuoteType::PrintJob,
            CalculationInput::Project(_) => QuoteType::Project,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub material_cost: f64,
    pub time_cost: f64,
    pub other_cost: f64,
    pub addon_cost: f64,
    pub profit: f64,
    pub loss_amount: f64,
    pub profit_margin: u32,
    pub loss_margin: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub execution_hours: f64,
    pub hourly_rate: f64,
    pub materials_cost: f64,
    pub software_cost: f64,
    pub other_costs: f64,
    pub deadline: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CostDetails {
    PrintJob(CostBreakdown),
    Project(ProjectDetails),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub description: String,
    pub quantity: u32,
    pub total: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub addons: Vec<Addon>,
    pub details: CostDetails,
}

impl CalculationResult {
    pub fn deadline(&self) -> Option<&str> {
        match &self.details {
            CostDetails::Project(p) => p.deadline.as_deref(),
            CostDetails::PrintJob(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ClientData {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RegisteredItem {
    pub id: String,
    pub name: String,
    pub price: f64,
}

/// A finished quote. Never edited after creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub quote_type: QuoteType,
    pub calculation_data: CalculationResult,
    pub client_data: ClientData,
    pub created_at: DateTime<Utc>,
}

impl QuoteRecord {
    pub fn new(
        quote_type: QuoteType,
        calculation_data: CalculationResult,
        client_data: ClientData,
        created_at: DateTime<Utc>,
    ) -> Self {
        QuoteRecord {
            id: quote_id(created_at),
            quote_type,
            calculation_data,
            client_data,
            created_at,
        }
    }
}

/// `ORC-` plus the last six digits of the millisecond timestamp.
/// Two quotes in the same truncated window share an id.
pub fn quote_id(at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    format!("ORC-{}", tail)
}
