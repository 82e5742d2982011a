use directories::{BaseDirs, ProjectDirs};
use inquire::Text;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::errors::{Error, Result};

const DEFAULT_COMPANY_TEMPLATE: &str = include_str!("../company.toml");
const DEFAULT_DATA_ROOT: &str = "~/Documents/Orcamentos";

#[derive(Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub data_root: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompanyInfo {
    pub name: String,
    pub slogan: String,
    pub cnpj: String,
    pub address: String,
    pub city_state: String,
    pub phone: String,
    pub email: String,
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

fn default_validity_days() -> u32 {
    15
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricingDefaults {
    pub filament_cost_per_kg: String,
    pub machine_hour_cost: String,
    pub energy_hour_cost: String,
    pub finishing_cost: String,
    pub profit_margin: u32,
    pub loss_margin: u32,
    pub hourly_rate: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompanyConfig {
    pub company: CompanyInfo,
    pub pricing: PricingDefaults,
}

impl CompanyConfig {
    /// The built-in configuration shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Ok(toml::from_str(DEFAULT_COMPANY_TEMPLATE)?)
    }
}

/// Directory layout under the configured data root.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn company_path(&self) -> PathBuf {
        self.root.join("company.toml")
    }
}

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("br", "quote-maker", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings() -> Option<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Ignoring unreadable settings {:?}: {}", path, e);
            None
        }
    }
}

pub fn setup_config_wizard() -> Result<AppSettings> {
    println!("\n⚙️  --- Configuração ---");
    let default_val = load_settings()
        .map(|s| s.data_root)
        .unwrap_or_else(|| DEFAULT_DATA_ROOT.to_string());

    println!("📂 Abrindo seletor de pastas...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Pasta de dados dos orçamentos")
        .pick_folder();

    let data_root = match picked_path {
        Some(path) => path.to_string_lossy().to_string(),
        None => {
            println!("❌ Nenhuma pasta selecionada. Digite o caminho manualmente.");
            Text::new("Pasta de dados:")
                .with_default(&default_val)
                .prompt()?
        }
    };

    let settings = AppSettings { data_root };
    let path = get_config_path();
    let toml_str = toml::to_string_pretty(&settings)
        .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))?;
    fs::write(&path, toml_str)?;
    tracing::info!("Settings saved to {:?}", path);
    println!("✅ Configuração salva.");
    Ok(settings)
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

/// Reads `company.toml`, writing the built-in one on first use.
pub fn load_company_config(workspace: &Workspace) -> Result<CompanyConfig> {
    let path = workspace.company_path();
    if path.exists() {
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))
    } else {
        println!("✨ Criando configuração padrão da empresa...");
        let config = CompanyConfig::builtin()?;
        if let Err(e) = fs::create_dir_all(&workspace.root)
            .and_then(|_| fs::write(&path, DEFAULT_COMPANY_TEMPLATE))
        {
            tracing::warn!("Could not write {:?}, using built-in company config: {}", path, e);
        }
        Ok(config)
    }
}
