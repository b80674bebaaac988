use dotenvy::dotenv;
use timeledger::{
    config::{database, mail, settings},
    core::invoice::load_invoice_sequence,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    info!(
        "Configuration loaded: {} services, {} billing rules",
        app_config.services.len(),
        app_config.billing_rules.len()
    );

    // 4. Connect and create the schema
    let database_url = database::get_database_url();
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        let file = path.split('?').next().unwrap_or(path);
        if let Some(parent) = std::path::Path::new(file).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed services, default rates and billing rules
    settings::seed_reference_data(&db, &app_config, chrono::Utc::now())
        .await
        .inspect_err(|e| error!("Failed to seed reference data: {e}"))?;

    // 6. Prepare the invoice number sequence for this process
    let sequence = load_invoice_sequence(&db, &app_config.invoicing.prefix).await?;
    let mail_settings = mail::get_mail_settings();
    info!(
        "TimeLedger ready for {} (invoice prefix {}, mail from {})",
        app_config.company.name,
        sequence.prefix(),
        mail_settings.sender
    );

    Ok(())
}
