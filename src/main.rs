//src/main.rs

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use registry::{seed, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env().context("Falha ao carregar a configuração")?;
    let app_state = AppState::new(config)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    if app_state.config.seed_demo_data {
        seed::seed_demo_data(&app_state).await?;
    }

    let companies = app_state.companies.list().await?;
    let employees = app_state.employees.list().await?;
    let customers = app_state.customers.list().await?;

    tracing::info!(
        "📋 Cadastro pronto: {} empresas, {} funcionários, {} clientes (documentos em {})",
        companies.len(),
        employees.len(),
        customers.len(),
        app_state.config.storage_root.display()
    );
    Ok(())
}
