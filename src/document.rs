//! Human-facing forms of a finished quote: the typst document source and the
//! short message that gets pasted into a chat app.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::currency;
use crate::errors::Result;
use crate::model::{ClientData, QuoteRecord, QuoteType};
use crate::settings::CompanyInfo;

pub const TEMPLATE_NAME: &str = "quote.tera";

// Embed template at compile time to ensure availability
const DEFAULT_TEMPLATE: &str = include_str!("../templates/quote.tera");

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: String,
    pub amount: String,
    /// Sub-row (add-on or deadline) shown under the main row.
    pub indented: bool,
}

#[derive(Serialize)]
pub struct QuoteContext {
    pub id: String,
    pub date: String,
    pub company: CompanyInfo,
    pub company_address: String,
    pub client: ClientData,
    pub client_location: String,
    pub is_print_job: bool,
    pub rows: Vec<LineItem>,
    pub total: String,
}

impl QuoteContext {
    pub fn new(record: &QuoteRecord, company: &CompanyInfo) -> Self {
        let client = &record.client_data;
        let client_location = [&client.address, &client.city, &client.state]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        QuoteContext {
            id: record.id.clone(),
            date: record.created_at.format("%d/%m/%Y").to_string(),
            company: company.clone(),
            company_address: format!("{}, {}", company.address, company.city_state),
            client: client.clone(),
            client_location,
            is_print_job: record.quote_type == QuoteType::PrintJob,
            rows: line_items(record),
            total: currency::format(record.calculation_data.total),
        }
    }
}

/// Table rows of the document.
///
/// For print jobs the main row carries the total minus the add-ons, and each
/// add-on gets its own row scaled by the quantity.
pub fn line_items(record: &QuoteRecord) -> Vec<LineItem> {
    let calc = &record.calculation_data;

    match record.quote_type {
        QuoteType::Project => {
            let mut rows = vec![LineItem {
                description: calc.description.clone(),
                quantity: 1,
                unit_price: currency::format(calc.total),
                amount: currency::format(calc.total),
                indented: false,
            }];
            if let Some(deadline) = calc.deadline() {
                rows.push(LineItem {
                    description: "Prazo de Entrega".to_string(),
                    quantity: 1,
                    unit_price: String::new(),
                    amount: deadline.to_string(),
                    indented: true,
                });
            }
            rows
        }
        QuoteType::PrintJob => {
            let quantity = calc.quantity.max(1);
            let qty = f64::from(quantity);
            let addons_total: f64 = calc.addons.iter().map(|a| a.price * qty).sum();
            let item_subtotal = calc.total - addons_total;

            let mut rows = vec![LineItem {
                description: calc.description.clone(),
                quantity,
                unit_price: currency::format(item_subtotal / qty),
                amount: currency::format(item_subtotal),
                indented: false,
            }];
            rows.extend(calc.addons.iter().map(|addon| LineItem {
                description: addon.name.clone(),
                quantity,
                unit_price: currency::format(addon.price),
                amount: currency::format(addon.price * qty),
                indented: true,
            }));
            rows
        }
    }
}

/// Plain-text summary for pasting into a messaging app.
pub fn share_message(record: &QuoteRecord, company_name: &str) -> String {
    let calc = &record.calculation_data;
    let mut lines = vec![
        format!("Olá, {}! 👋", record.client_data.name),
        String::new(),
        format!("Segue o seu orçamento da {}:", company_name),
        String::new(),
        format!("📄 *Orçamento:* #{}", record.id),
        format!("*Descrição:* {}", calc.description),
    ];
    if record.quote_type == QuoteType::PrintJob {
        lines.push(format!("*Quantidade:* {} peça(s)", calc.quantity));
    }
    lines.extend([
        String::new(),
        format!("💰 *Valor Total: {}*", currency::format(calc.total)),
        String::new(),
        "Agradecemos pela preferência!".to_string(),
        "Qualquer dúvida, estou à disposição.".to_string(),
    ]);
    lines.join("\n")
}

/// Loads `*.tera` from `dir`, writing the built-in template there first if
/// the user has not customised one. Falls back to the built-in template when
/// `dir` cannot be created, written or parsed.
pub fn load_templates(dir: &Path) -> Result<Tera> {
    load_template_dir(dir).or_else(|e| {
        tracing::warn!("Using built-in quote template, {:?} unusable: {}", dir, e);
        builtin_templates()
    })
}

fn load_template_dir(dir: &Path) -> Result<Tera> {
    fs::create_dir_all(dir)?;
    let template_path = dir.join(TEMPLATE_NAME);
    if !template_path.exists() {
        println!("✨ Criando modelo padrão do orçamento...");
        fs::write(&template_path, DEFAULT_TEMPLATE)?;
    }
    let pattern = dir.join("*.tera");
    Ok(Tera::new(&pattern.to_string_lossy())?)
}

pub fn builtin_templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
    Ok(tera)
}

/// Typst source for the quote document.
pub fn render(tera: &Tera, record: &QuoteRecord, company: &CompanyInfo) -> Result<String> {
    let context = Context::from_serialize(QuoteContext::new(record, company))?;
    Ok(tera.render(TEMPLATE_NAME, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Addon, CalculationResult, CostBreakdown, CostDetails, ProjectDetails, QuoteType,
    };
    use crate::settings::CompanyConfig;
    use chrono::{TimeZone, Utc};

    fn client() -> ClientData {
        ClientData {
            name: "Diego".into(),
            email: "diego@example.com".into(),
            phone: "11 95555-1234".into(),
            address: "Rua A, 10".into(),
            city: "Cotia".into(),
            state: "".into(),
        }
    }

    fn print_record() -> QuoteRecord {
        QuoteRecord::new(
            QuoteType::PrintJob,
            CalculationResult {
                description: "Luminária \"lua\"".into(),
                quantity: 2,
                total: 50.0,
                unit_price: 25.0,
                addons: vec![Addon {
                    name: "LED".into(),
                    price: 2.5,
                }],
                details: CostDetails::PrintJob(CostBreakdown {
                    material_cost: 10.0,
                    time_cost: 20.0,
                    other_cost: 0.0,
                    addon_cost: 5.0,
                    profit: 10.0,
                    loss_amount: 5.0,
                    profit_margin: 30,
                    loss_margin: 10,
                }),
            },
            client(),
            Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap(),
        )
    }

    fn project_record(deadline: Option<&str>) -> QuoteRecord {
        QuoteRecord::new(
            QuoteType::Project,
            CalculationResult {
                description: "Logo".into(),
                quantity: 1,
                total: 165.0,
                unit_price: 165.0,
                addons: vec![],
                details: CostDetails::Project(ProjectDetails {
                    execution_hours: 3.0,
                    hourly_rate: 50.0,
                    materials_cost: 10.0,
                    software_cost: 5.0,
                    other_costs: 0.0,
                    deadline: deadline.map(str::to_string),
                }),
            },
            client(),
            Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_print_job_rows_split_addons() {
        let rows = line_items(&print_record());
        assert_eq!(rows.len(), 2);
        // 50 - 2.5 * 2 = 45 over 2 pieces
        assert_eq!(rows[0].amount, "R$ 45,00");
        assert_eq!(rows[0].unit_price, "R$ 22,50");
        assert_eq!(rows[1].description, "LED");
        assert_eq!(rows[1].amount, "R$ 5,00");
        assert!(rows[1].indented);
    }

    #[test]
    fn test_project_rows_with_deadline() {
        let rows = line_items(&project_record(Some("20 dias")));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, "R$ 165,00");
        assert_eq!(rows[1].description, "Prazo de Entrega");
        assert_eq!(rows[1].amount, "20 dias");

        assert_eq!(line_items(&project_record(None)).len(), 1);
    }

    #[test]
    fn test_share_message_print_job() {
        let record = print_record();
        let text = share_message(&record, "Nanda 3D Arte");
        let expected = format!(
            "Olá, Diego! 👋\n\nSegue o seu orçamento da Nanda 3D Arte:\n\n📄 *Orçamento:* #{}\n*Descrição:* Luminária \"lua\"\n*Quantidade:* 2 peça(s)\n\n💰 *Valor Total: R$ 50,00*\n\nAgradecemos pela preferência!\nQualquer dúvida, estou à disposição.",
            record.id
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_share_message_project_has_no_quantity() {
        let text = share_message(&project_record(None), "Nanda 3D Arte");
        assert!(!text.contains("Quantidade"));
        assert!(text.contains("*Descrição:* Logo\n\n💰 *Valor Total: R$ 165,00*"));
    }

    #[test]
    fn test_render_typst_document() {
        let tera = builtin_templates().unwrap();
        let company = CompanyConfig::builtin().unwrap().company;
        let source = render(&tera, &print_record(), &company).unwrap();

        assert!(source.contains("#\"Nanda 3D Arte\""));
        assert!(source.contains("Data: *#\"09/03/2024\"*"));
        // quotes inside user text are escaped as typst string literals
        assert!(source.contains("#\"Luminária \\\"lua\\\"\""));
        assert!(source.contains("#h(1em)↳ #\"LED\""));
        assert!(source.contains("#\"Rua A, 10, Cotia\""));
        assert!(source.contains("válido por 15 dias"));
        assert!(source.contains("[*Valor Unit.*]"));
    }

    #[test]
    fn test_render_project_document() {
        let tera = builtin_templates().unwrap();
        let company = CompanyConfig::builtin().unwrap().company;
        let source = render(&tera, &project_record(Some("10 dias")), &company).unwrap();
        assert!(source.contains("table.header([*Descrição*], [*Valor*])"));
        assert!(source.contains("#\"Prazo de Entrega\""));
        assert!(!source.contains("Valor Unit."));
    }

    #[test]
    fn test_load_templates_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let tera = load_templates(&dir.path().join("templates")).unwrap();
        assert!(dir.path().join("templates/quote.tera").exists());
        assert!(tera.get_template_names().any(|n| n == TEMPLATE_NAME));
    }

    #[test]
    fn test_load_templates_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        let tera = load_templates(&blocker.join("templates")).unwrap();
        assert!(tera.get_template_names().any(|n| n == TEMPLATE_NAME));
        let company = CompanyConfig::builtin().unwrap().company;
        assert!(render(&tera, &print_record(), &company).is_ok());
    }
}
