//! Interactive controller: draws each wizard screen with prompts and feeds
//! the resulting actions through [`wizard::reduce`].

use chrono::Utc;
use inquire::{Confirm, CustomType, Select, Text};

use crate::currency;
use crate::document;
use crate::errors::{Error, Result};
use crate::export::Exporter;
use crate::history::QuoteHistory;
use crate::items::ItemCatalog;
use crate::model::{
    Addon, CalculationInput, CalculationResult, ClientData, CostDetails, PrintJobInput,
    ProjectInput, Quantity, QuoteType,
};
use crate::settings::{CompanyConfig, CompanyInfo};
use crate::storage::KeyValueStore;
use crate::ui;
use crate::wizard::{self, Action, AppState, Effect, Preview};

const OPT_FILL: &str = "📝 Preencher dados";
const OPT_HISTORY: &str = "📜 Histórico";
const OPT_BACK: &str = "⬅️  Voltar";
const OPT_NEW: &str = "🔄 Novo orçamento";

enum Step {
    Dispatch(Action),
    Stay,
    Quit,
}

pub struct App<S: KeyValueStore> {
    state: AppState,
    history: QuoteHistory<S>,
    catalog: ItemCatalog<S>,
    config: CompanyConfig,
    exporter: Exporter,
    // Last values typed on the input screens, offered again after a
    // validation failure or a "back".
    draft_calculation: Option<CalculationInput>,
    draft_client: Option<ClientData>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(
        history: QuoteHistory<S>,
        catalog: ItemCatalog<S>,
        config: CompanyConfig,
        exporter: Exporter,
    ) -> Self {
        App {
            state: AppState::Welcome,
            history,
            catalog,
            config,
            exporter,
            draft_calculation: None,
            draft_client: None,
        }
    }

    pub fn history(&self) -> &QuoteHistory<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut QuoteHistory<S> {
        &mut self.history
    }

    pub fn catalog(&self) -> &ItemCatalog<S> {
        &self.catalog
    }

    pub fn company(&self) -> &CompanyInfo {
        &self.config.company
    }

    pub fn catalog_mut(&mut self) -> &mut ItemCatalog<S> {
        &mut self.catalog
    }

    /// Runs one action through the reducer and applies its effect.
    /// On error the current state is kept.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let transition = wizard::reduce(&self.state, action)?;
        if let Some(effect) = transition.effect {
            self.apply(effect);
        }
        if transition.state == AppState::Welcome {
            self.draft_calculation = None;
            self.draft_client = None;
        }
        tracing::debug!("{} -> {}", self.state.name(), transition.state.name());
        self.state = transition.state;
        Ok(())
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SaveQuote(record) => {
                println!("🎉 Orçamento {} salvo!", record.id);
                self.history.append(record);
            }
        }
    }

    /// Prompt loop until the user quits or cancels a prompt.
    pub fn run(&mut self, start: AppState) -> Result<()> {
        self.state = start;
        loop {
            let step = match self.state.clone() {
                AppState::Welcome => self.welcome_screen(),
                AppState::TypeInput { quote_type } => self.type_input_screen(quote_type),
                AppState::ClientInput { calculation, .. } => self.client_screen(&calculation),
                AppState::Preview(preview) => self.preview_screen(&preview),
                AppState::History => self.history_screen(),
            };

            let outcome = match step {
                Ok(Step::Dispatch(action)) => self.dispatch(action),
                Ok(Step::Stay) => Ok(()),
                Ok(Step::Quit) => return Ok(()),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {
                    println!("👋 Até logo!");
                    return Ok(());
                }
                Err(e @ (Error::Validation(_) | Error::Export(_) | Error::Transition { .. })) => {
                    println!("⚠️  {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ==========================================
    // Screens
    // ==========================================

    fn welcome_screen(&mut self) -> Result<Step> {
        println!("\n✨ Selecione o tipo de orçamento que deseja criar.");
        let print = format!("🖨️  {}", QuoteType::PrintJob.label());
        let project = format!("🎨 {}", QuoteType::Project.label());
        let quit = "🚪 Sair".to_string();

        let choice = Select::new("Novo orçamento:", vec![print.clone(), project, quit.clone()])
            .prompt()?;
        Ok(if choice == quit {
            Step::Quit
        } else if choice == print {
            Step::Dispatch(Action::SelectType(QuoteType::PrintJob))
        } else {
            Step::Dispatch(Action::SelectType(QuoteType::Project))
        })
    }

    fn type_input_screen(&mut self, quote_type: QuoteType) -> Result<Step> {
        println!("\n--- {} ---", quote_type.label());
        let choice = Select::new("O que deseja fazer?", vec![OPT_FILL, OPT_HISTORY, OPT_BACK])
            .prompt()?;
        match choice {
            OPT_HISTORY => return Ok(Step::Dispatch(Action::ShowHistory)),
            OPT_BACK => return Ok(Step::Dispatch(Action::Back)),
            _ => {}
        }

        let input = match quote_type {
            QuoteType::PrintJob => CalculationInput::PrintJob(self.print_job_form()?),
            QuoteType::Project => CalculationInput::Project(self.project_form()?),
        };
        self.draft_calculation = Some(input.clone());
        Ok(Step::Dispatch(Action::SubmitCalculation(input)))
    }

    fn client_screen(&mut self, calculation: &CalculationResult) -> Result<Step> {
        println!("\n--- Dados do Cliente ---");
        print_calculation_summary(calculation);

        let choice = Select::new("O que deseja fazer?", vec![OPT_FILL, OPT_HISTORY, OPT_BACK])
            .prompt()?;
        match choice {
            OPT_HISTORY => return Ok(Step::Dispatch(Action::ShowHistory)),
            OPT_BACK => return Ok(Step::Dispatch(Action::Back)),
            _ => {}
        }

        let draft = self.draft_client.clone().unwrap_or_default();
        let client = ClientData {
            name: prompt_text("Nome completo:", &draft.name)?,
            email: prompt_text("Email:", &draft.email)?,
            phone: prompt_text("Telefone / WhatsApp:", &draft.phone)?,
            address: prompt_text("Endereço (opcional):", &draft.address)?,
            city: prompt_text("Cidade (opcional):", &draft.city)?,
            state: prompt_text("Estado (opcional):", &draft.state)?,
        };
        self.draft_client = Some(client.clone());
        Ok(Step::Dispatch(Action::SubmitClient {
            client,
            at: Utc::now(),
        }))
    }

    fn preview_screen(&mut self, preview: &Preview) -> Result<Step> {
        let record = preview.record();
        if preview.is_viewing() {
            println!("\n📂 Orçamento salvo em {}", record.created_at.format("%d/%m/%Y"));
        }
        println!("{}", ui::render_preview(record, &self.config.company));

        const OPT_SHARE: &str = "💬 Mensagem p/ WhatsApp";
        const OPT_IMAGE: &str = "🖼️  Gerar imagem";
        const OPT_PRINT: &str = "🖨️  Imprimir";
        let options = vec![OPT_SHARE, OPT_IMAGE, OPT_PRINT, OPT_BACK, OPT_HISTORY, OPT_NEW];

        match Select::new("Ações:", options).prompt()? {
            OPT_SHARE => {
                println!(
                    "\n{}\n",
                    document::share_message(record, &self.config.company.name)
                );
                Ok(Step::Stay)
            }
            OPT_IMAGE => {
                let path = self.exporter.export_image(record)?;
                println!("✅ Imagem gerada: {:?}", path);
                Ok(Step::Stay)
            }
            OPT_PRINT => {
                let path = self.exporter.print(record)?;
                println!("✅ PDF pronto para impressão: {:?}", path);
                Ok(Step::Stay)
            }
            OPT_BACK => Ok(Step::Dispatch(Action::Back)),
            OPT_HISTORY => Ok(Step::Dispatch(Action::ShowHistory)),
            _ => Ok(Step::Dispatch(Action::NewQuote)),
        }
    }

    fn history_screen(&mut self) -> Result<Step> {
        println!("\n--- Histórico de Orçamentos ---");
        if self.history.list().is_empty() {
            println!("Nenhum orçamento salvo. Crie um novo orçamento para vê-lo aqui.");
            Select::new("", vec!["🏠 Início"]).prompt()?;
            return Ok(Step::Dispatch(Action::Back));
        }
        println!("{}", ui::history_table(self.history.list()));

        let mut options: Vec<String> = self.history.list().iter().map(ui::record_label).collect();
        let delete_opt = "🗑️  Excluir orçamento".to_string();
        let home_opt = "🏠 Início".to_string();
        options.push(delete_opt);
        options.push(home_opt);

        let choice = Select::new("Visualizar:", options)
            .with_page_size(10)
            .raw_prompt()?;
        let count = self.history.list().len();
        if choice.index < count {
            let record = self.history.list()[choice.index].clone();
            Ok(Step::Dispatch(Action::View(record)))
        } else if choice.index == count {
            delete_quote(&mut self.history)?;
            Ok(Step::Stay)
        } else {
            Ok(Step::Dispatch(Action::Back))
        }
    }

    // ==========================================
    // Forms
    // ==========================================

    fn print_job_form(&mut self) -> Result<PrintJobInput> {
        let pricing = &self.config.pricing;
        let draft = match &self.draft_calculation {
            Some(CalculationInput::PrintJob(d)) => d.clone(),
            _ => PrintJobInput {
                description: String::new(),
                material_weight: String::new(),
                print_time: String::new(),
                quantity: 1,
                profit_margin: pricing.profit_margin,
                loss_margin: pricing.loss_margin,
                finishing_cost: pricing.finishing_cost.clone(),
                filament_cost_per_kg: pricing.filament_cost_per_kg.clone(),
                machine_hour_cost: pricing.machine_hour_cost.clone(),
                energy_hour_cost: pricing.energy_hour_cost.clone(),
                addons: Vec::new(),
            },
        };

        let description = prompt_text("Descrição da peça:", &draft.description)?;
        let material_weight = prompt_money("Peso do material (gramas):", &draft.material_weight)?;
        let print_time = prompt_money("Tempo de impressão (horas):", &draft.print_time)?;
        let quantity = prompt_quantity(Quantity::new(draft.quantity))?.get();
        let finishing_cost = prompt_money("Custo de acabamento (R$ por peça):", &draft.finishing_cost)?;

        let (filament_cost_per_kg, machine_hour_cost, energy_hour_cost) =
            if Confirm::new("Ajustar custos de filamento, máquina e energia?")
                .with_default(false)
                .prompt()?
            {
                (
                    prompt_money("Custo do filamento (kg):", &draft.filament_cost_per_kg)?,
                    prompt_money("Custo da hora/máquina:", &draft.machine_hour_cost)?,
                    prompt_money("Custo da hora/energia:", &draft.energy_hour_cost)?,
                )
            } else {
                (
                    draft.filament_cost_per_kg.clone(),
                    draft.machine_hour_cost.clone(),
                    draft.energy_hour_cost.clone(),
                )
            };

        let loss_margin = prompt_percent("Margem de perda (%):", draft.loss_margin, 100)?;
        let profit_margin = prompt_percent("Margem de lucro (%):", draft.profit_margin, 200)?;
        let addons = self.addons_menu(draft.addons)?;

        Ok(PrintJobInput {
            description,
            material_weight,
            print_time,
            quantity,
            profit_margin,
            loss_margin,
            finishing_cost,
            filament_cost_per_kg,
            machine_hour_cost,
            energy_hour_cost,
            addons,
        })
    }

    fn project_form(&mut self) -> Result<ProjectInput> {
        let draft = match &self.draft_calculation {
            Some(CalculationInput::Project(d)) => d.clone(),
            _ => ProjectInput {
                description: String::new(),
                execution_time: String::new(),
                hourly_rate: self.config.pricing.hourly_rate.clone(),
                materials_cost: "0,00".to_string(),
                software_cost: "0,00".to_string(),
                other_costs: "0,00".to_string(),
                deadline: None,
            },
        };

        let description = prompt_text("Descrição do projeto:", &draft.description)?;
        let execution_time = prompt_money("Tempo de execução (horas):", &draft.execution_time)?;
        let hourly_rate = prompt_money("Valor da hora (R$):", &draft.hourly_rate)?;
        let materials_cost = prompt_money("Custo de materiais (R$):", &draft.materials_cost)?;
        let software_cost = prompt_money("Software / licenças (R$):", &draft.software_cost)?;
        let other_costs = prompt_money("Outros custos (R$):", &draft.other_costs)?;
        let deadline = prompt_text(
            "Prazo de entrega (opcional):",
            draft.deadline.as_deref().unwrap_or(""),
        )?;

        Ok(ProjectInput {
            description,
            execution_time,
            hourly_rate,
            materials_cost,
            software_cost,
            other_costs,
            deadline: Some(deadline).filter(|d| !d.trim().is_empty()),
        })
    }

    fn addons_menu(&mut self, mut addons: Vec<Addon>) -> Result<Vec<Addon>> {
        const OPT_ADD: &str = "➕ Adicionar insumo";
        const OPT_REMOVE: &str = "➖ Remover insumo";
        const OPT_REGISTER: &str = "📦 Cadastrar novo insumo";
        const OPT_UNREGISTER: &str = "🗑️  Excluir insumo cadastrado";
        const OPT_DONE: &str = "✅ Calcular";

        loop {
            if !addons.is_empty() {
                println!("Insumos selecionados:");
                for a in &addons {
                    println!("  • {} ({})", a.name, currency::format(a.price));
                }
            }
            let options = vec![OPT_DONE, OPT_ADD, OPT_REMOVE, OPT_REGISTER, OPT_UNREGISTER];
            match Select::new("Acabamento e insumos:", options).prompt()? {
                OPT_ADD => {
                    let items = self.catalog.list();
                    if items.is_empty() {
                        println!("Nenhum insumo cadastrado.");
                        continue;
                    }
                    let labels: Vec<String> = items.iter().map(ui::item_label).collect();
                    let choice = Select::new("Selecione um insumo:", labels).raw_prompt()?;
                    let item = &items[choice.index];
                    addons.push(Addon {
                        name: item.name.clone(),
                        price: item.price,
                    });
                }
                OPT_REMOVE => {
                    if addons.is_empty() {
                        continue;
                    }
                    let labels: Vec<String> = addons
                        .iter()
                        .map(|a| format!("{} ({})", a.name, currency::format(a.price)))
                        .collect();
                    let choice = Select::new("Remover:", labels).raw_prompt()?;
                    addons.remove(choice.index);
                }
                OPT_REGISTER => match register_item(&mut self.catalog) {
                    Ok(()) => {}
                    Err(e @ Error::Validation(_)) => println!("⚠️  {}", e),
                    Err(e) => return Err(e),
                },
                OPT_UNREGISTER => unregister_item(&mut self.catalog)?,
                _ => return Ok(addons),
            }
        }
    }
}

fn print_calculation_summary(calc: &CalculationResult) {
    println!("Descrição: {}", calc.description);
    if let CostDetails::PrintJob(b) = &calc.details {
        println!(
            "Material: {} | Tempo: {} | Acabamento: {} | Insumos: {}",
            currency::format(b.material_cost),
            currency::format(b.time_cost),
            currency::format(b.other_cost),
            currency::format(b.addon_cost),
        );
        println!(
            "Perda ({}%): {} | Lucro ({}%): {}",
            b.loss_margin,
            currency::format(b.loss_amount),
            b.profit_margin,
            currency::format(b.profit),
        );
        println!(
            "Quantidade: {} | Valor unitário: {}",
            calc.quantity,
            currency::format(calc.unit_price)
        );
    }
    println!("💰 Total: {}", currency::format(calc.total));
}

fn prompt_text(message: &str, initial: &str) -> Result<String> {
    Ok(Text::new(message).with_initial_value(initial).prompt()?)
}

/// Decimal-comma text, cleaned the same way live input is.
fn prompt_money(message: &str, initial: &str) -> Result<String> {
    let raw = Text::new(message)
        .with_initial_value(initial)
        .with_placeholder("0,00")
        .prompt()?;
    Ok(currency::sanitize(&raw))
}

/// Stepper over the piece count; typing a value is still possible.
fn prompt_quantity(initial: Quantity) -> Result<Quantity> {
    const OPT_MORE: &str = "➕ Aumentar";
    const OPT_LESS: &str = "➖ Diminuir";
    const OPT_TYPE: &str = "⌨️  Digitar quantidade";

    let mut quantity = initial;
    loop {
        let done = format!("✅ {} peça(s)", quantity.get());
        let options = vec![done.as_str(), OPT_MORE, OPT_LESS, OPT_TYPE];
        match Select::new("Quantidade:", options).prompt()? {
            OPT_MORE => quantity = quantity.increment(),
            OPT_LESS => quantity = quantity.decrement(),
            OPT_TYPE => {
                quantity = CustomType::<u32>::new("Quantidade:")
                    .with_default(quantity.get())
                    .with_error_message("Digite um número inteiro")
                    .prompt()
                    .map(Quantity::new)?;
            }
            _ => return Ok(quantity),
        }
    }
}

fn prompt_percent(message: &str, default: u32, max: u32) -> Result<u32> {
    let value = CustomType::<u32>::new(message)
        .with_default(default.min(max))
        .with_help_message(&format!("0 a {}", max))
        .with_error_message("Digite um número inteiro")
        .prompt()?;
    Ok(value.min(max))
}

// ==========================================
// Shared by the wizard and the subcommands
// ==========================================

pub fn register_item<S: KeyValueStore>(catalog: &mut ItemCatalog<S>) -> Result<()> {
    let name = Text::new("Nome do insumo:")
        .with_placeholder("Ex: Tinta Acrílica")
        .prompt()?;
    let price = prompt_money("Preço (R$):", "")?;
    let item = catalog.add(&name, &price)?;
    println!("✅ Insumo \"{}\" adicionado.", item.name);
    Ok(())
}

pub fn unregister_item<S: KeyValueStore>(catalog: &mut ItemCatalog<S>) -> Result<()> {
    if catalog.list().is_empty() {
        println!("Nenhum insumo cadastrado.");
        return Ok(());
    }
    let labels: Vec<String> = catalog.list().iter().map(ui::item_label).collect();
    let choice = Select::new("Excluir insumo:", labels).raw_prompt()?;
    let id = catalog.list()[choice.index].id.clone();
    catalog.remove(&id);
    println!("🗑️  Insumo removido.");
    Ok(())
}

pub fn delete_quote<S: KeyValueStore>(history: &mut QuoteHistory<S>) -> Result<()> {
    if history.list().is_empty() {
        println!("Nenhum orçamento salvo.");
        return Ok(());
    }
    let labels: Vec<String> = history.list().iter().map(ui::record_label).collect();
    let choice = Select::new("Excluir orçamento:", labels)
        .with_page_size(10)
        .raw_prompt()?;
    let id = history.list()[choice.index].id.clone();
    if Confirm::new(&format!("Excluir {}?", id))
        .with_default(false)
        .prompt()?
    {
        history.remove(&id);
        println!("🗑️  Orçamento {} excluído.", id);
    }
    Ok(())
}
