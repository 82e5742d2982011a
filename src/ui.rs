//! Terminal rendering of quotes, history and the item catalog.

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

use crate::currency;
use crate::document::{QuoteContext, line_items};
use crate::model::{QuoteRecord, QuoteType, RegisteredItem};
use crate::settings::CompanyInfo;

const GREEN: Color = Color::Rgb { r: 4, g: 120, b: 87 };
const PURPLE: Color = Color::Rgb { r: 109, g: 40, b: 217 };

fn money(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

/// On-screen version of the quote document.
pub fn render_preview(record: &QuoteRecord, company: &CompanyInfo) -> String {
    let ctx = QuoteContext::new(record, company);
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}  |  {}\nCNPJ: {}\n",
        company.name, company.slogan, company.cnpj
    ));
    out.push_str(&format!("Orçamento #{}   Data: {}\n\n", ctx.id, ctx.date));

    let mut parties = Table::new();
    parties.set_header(vec![
        Cell::new("Empresa").fg(PURPLE),
        Cell::new("Cliente").fg(PURPLE),
    ]);
    parties.add_row(vec![
        Cell::new(format!(
            "{}\n{}\n{}",
            ctx.company_address, company.email, company.phone
        )),
        Cell::new(
            [
                ctx.client.name.as_str(),
                ctx.client.email.as_str(),
                ctx.client.phone.as_str(),
                ctx.client_location.as_str(),
            ]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n"),
        ),
    ]);
    out.push_str(&format!("{parties}\n\n"));

    let mut items = Table::new();
    match record.quote_type {
        QuoteType::PrintJob => {
            items.set_header(vec!["Descrição", "Qtd.", "Valor Unit.", "Subtotal"]);
            for row in line_items(record) {
                let description = if row.indented {
                    format!("  ↳ {}", row.description)
                } else {
                    row.description
                };
                items.add_row(vec![
                    Cell::new(description),
                    money(row.quantity.to_string()),
                    money(row.unit_price),
                    money(row.amount),
                ]);
            }
        }
        QuoteType::Project => {
            items.set_header(vec!["Descrição", "Valor"]);
            for row in line_items(record) {
                let description = if row.indented {
                    format!("  ↳ {}", row.description)
                } else {
                    row.description
                };
                items.add_row(vec![Cell::new(description), money(row.amount)]);
            }
        }
    }
    out.push_str(&format!("{items}\n"));

    out.push_str(&format!("\n💰 Valor Total: {}\n", ctx.total));
    out.push_str(&format!(
        "\nOrçamento válido por {} dias. Agradecemos pela preferência!\n{}\n",
        company.validity_days, company.name
    ));
    out
}

pub fn history_table(records: &[QuoteRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Orçamento", "Tipo", "Cliente", "Descrição", "Total", "Data"]);
    for r in records {
        table.add_row(vec![
            Cell::new(&r.id).add_attribute(Attribute::Bold),
            Cell::new(r.quote_type.label()),
            Cell::new(&r.client_data.name),
            Cell::new(&r.calculation_data.description),
            money(currency::format(r.calculation_data.total)).fg(GREEN),
            Cell::new(r.created_at.format("%d/%m/%Y").to_string()),
        ]);
    }
    table
}

pub fn items_table(items: &[RegisteredItem]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Insumo", "Preço", "Id"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.name),
            money(currency::format(item.price)),
            Cell::new(&item.id),
        ]);
    }
    table
}

/// One-line label used in selection prompts.
pub fn record_label(r: &QuoteRecord) -> String {
    format!(
        "{} | {} | {} | {}",
        r.id,
        r.client_data.name,
        r.calculation_data.description,
        currency::format(r.calculation_data.total)
    )
}

pub fn item_label(item: &RegisteredItem) -> String {
    format!("{} ({})", item.name, currency::format(item.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Addon, CalculationResult, ClientData, CostBreakdown, CostDetails, QuoteType,
    };
    use crate::settings::CompanyConfig;
    use chrono::{TimeZone, Utc};

    fn record() -> QuoteRecord {
        QuoteRecord::new(
            QuoteType::PrintJob,
            CalculationResult {
                description: "Chaveiro".into(),
                quantity: 10,
                total: 100.0,
                unit_price: 10.0,
                addons: vec![Addon {
                    name: "Argola".into(),
                    price: 1.0,
                }],
                details: CostDetails::PrintJob(CostBreakdown {
                    material_cost: 0.0,
                    time_cost: 0.0,
                    other_cost: 0.0,
                    addon_cost: 10.0,
                    profit: 0.0,
                    loss_amount: 0.0,
                    profit_margin: 0,
                    loss_margin: 0,
                }),
            },
            ClientData {
                name: "Fabi".into(),
                email: "fabi@example.com".into(),
                phone: "11 91234-5678".into(),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_preview_contains_document_parts() {
        let company = CompanyConfig::builtin().unwrap().company;
        let text = render_preview(&record(), &company);
        assert!(text.contains("Nanda 3D Arte"));
        assert!(text.contains("Data: 02/01/2025"));
        assert!(text.contains("Fabi"));
        assert!(text.contains("↳ Argola"));
        assert!(text.contains("R$ 90,00"));
        assert!(text.contains("Valor Total: R$ 100,00"));
        assert!(text.contains("válido por 15 dias"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            record_label(&record()),
            format!("{} | Fabi | Chaveiro | R$ 100,00", record().id)
        );
        let item = RegisteredItem {
            id: "led".into(),
            name: "LED".into(),
            price: 2.5,
        };
        assert_eq!(item_label(&item), "LED (R$ 2,50)");
    }
}
