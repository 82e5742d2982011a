//! Quote wizard as a pure reducer over an explicit state value.
//!
//! ```text
//! Welcome -> TypeInput -> ClientInput -> Preview
//!               \             |            /
//!                `------> History <-------'
//! ```
//!
//! The caller applies any returned [`Effect`] to the stores; `reduce` never
//! touches them itself, so every transition can be exercised without a
//! terminal or a disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::model::{
    CalculationInput, CalculationResult, ClientData, PrintJobInput, ProjectInput, QuoteRecord,
    QuoteType,
};
use crate::pricing;

/// Where the quote on the preview screen came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Preview {
    /// Just produced by this wizard run.
    Fresh(QuoteRecord),
    /// Opened read-only from the history list.
    FromHistory(QuoteRecord),
}

impl Preview {
    pub fn record(&self) -> &QuoteRecord {
        match self {
            Preview::Fresh(r) | Preview::FromHistory(r) => r,
        }
    }

    pub fn is_viewing(&self) -> bool {
        matches!(self, Preview::FromHistory(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum AppState {
    #[default]
    Welcome,
    TypeInput {
        quote_type: QuoteType,
    },
    ClientInput {
        quote_type: QuoteType,
        calculation: CalculationResult,
    },
    Preview(Preview),
    History,
}

impl AppState {
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Welcome => "welcome",
            AppState::TypeInput { .. } => "quote input",
            AppState::ClientInput { .. } => "client input",
            AppState::Preview(_) => "preview",
            AppState::History => "history",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectType(QuoteType),
    SubmitCalculation(CalculationInput),
    SubmitClient { client: ClientData, at: DateTime<Utc> },
    Back,
    ShowHistory,
    View(QuoteRecord),
    NewQuote,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::SelectType(_) => "select type",
            Action::SubmitCalculation(_) => "submit calculation",
            Action::SubmitClient { .. } => "submit client",
            Action::Back => "back",
            Action::ShowHistory => "show history",
            Action::View(_) => "view",
            Action::NewQuote => "new quote",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Prepend the finished quote to history.
    SaveQuote(QuoteRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(state: AppState) -> Self {
        Transition { state, effect: None }
    }
}

/// Computes the next state. On error the caller keeps `state` as it was.
pub fn reduce(state: &AppState, action: Action) -> Result<Transition> {
    let unavailable = Error::Transition {
        action: action.name(),
        screen: state.name(),
    };

    match (state, action) {
        (_, Action::NewQuote) => Ok(Transition::to(AppState::Welcome)),

        (AppState::Welcome, Action::SelectType(quote_type)) => {
            Ok(Transition::to(AppState::TypeInput { quote_type }))
        }

        (AppState::TypeInput { quote_type }, Action::SubmitCalculation(input))
            if input.quote_type() == *quote_type =>
        {
            validate_calculation(&input)?;
            Ok(Transition::to(AppState::ClientInput {
                quote_type: *quote_type,
                calculation: pricing::calculate(&input),
            }))
        }

        (
            AppState::ClientInput {
                quote_type,
                calculation,
            },
            Action::SubmitClient { client, at },
        ) => {
            validate_client(&client)?;
            let record = QuoteRecord::new(*quote_type, calculation.clone(), client, at);
            tracing::debug!("Created quote {}", record.id);
            Ok(Transition {
                state: AppState::Preview(Preview::Fresh(record.clone())),
                effect: Some(Effect::SaveQuote(record)),
            })
        }

        (AppState::TypeInput { .. }, Action::Back) | (AppState::History, Action::Back) => {
            Ok(Transition::to(AppState::Welcome))
        }
        (AppState::ClientInput { quote_type, .. }, Action::Back) => {
            Ok(Transition::to(AppState::TypeInput {
                quote_type: *quote_type,
            }))
        }
        (AppState::Preview(Preview::FromHistory(_)), Action::Back) => {
            Ok(Transition::to(AppState::History))
        }
        (AppState::Preview(Preview::Fresh(record)), Action::Back) => {
            Ok(Transition::to(AppState::ClientInput {
                quote_type: record.quote_type,
                calculation: record.calculation_data.clone(),
            }))
        }

        (
            AppState::TypeInput { .. } | AppState::ClientInput { .. } | AppState::Preview(_),
            Action::ShowHistory,
        ) => Ok(Transition::to(AppState::History)),

        (AppState::History, Action::View(record)) => {
            Ok(Transition::to(AppState::Preview(Preview::FromHistory(record))))
        }

        _ => Err(unavailable),
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn validate_calculation(input: &CalculationInput) -> Result<()> {
    match input {
        CalculationInput::PrintJob(PrintJobInput {
            description,
            material_weight,
            print_time,
            quantity,
            ..
        }) => {
            if blank(description) || blank(material_weight) || blank(print_time) || *quantity == 0
            {
                return Err(Error::Validation(
                    "Por favor, preencha todos os campos obrigatórios para calcular.".to_string(),
                ));
            }
        }
        CalculationInput::Project(ProjectInput {
            description,
            execution_time,
            hourly_rate,
            ..
        }) => {
            if blank(description) || blank(execution_time) || blank(hourly_rate) {
                return Err(Error::Validation(
                    "Por favor, preencha a descrição, tempo de execução e valor da hora."
                        .to_string(),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_client(client: &ClientData) -> Result<()> {
    if blank(&client.name) || blank(&client.email) || blank(&client.phone) {
        return Err(Error::Validation(
            "Por favor, preencha nome, email e telefone.".to_string(),
        ));
    }
    Ok(())
}
