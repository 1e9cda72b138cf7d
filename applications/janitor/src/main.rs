/// Port User Janitor - removes inactive users from a Port organization
use anyhow::Context;
use chrono::Local;
use port_client::{PortClient, PortConfig, USER_BLUEPRINT};
use port_user_janitor::config::{credentials_in_env, CredentialSource, JanitorConfig};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_cleanup::{BackupWriter, CleanupPipeline, InactivityFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "port_user_janitor=info,user_cleanup=info,port_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Values already in the environment take precedence over .env
    let set_before_dotenv = credentials_in_env();
    let dotenv = match dotenvy::dotenv() {
        Ok(path) => {
            info!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(e) => {
            info!(error = %e, "No .env file loaded");
            None
        }
    };
    report_credential_source(set_before_dotenv, dotenv.as_deref());

    let config = JanitorConfig::load().context("Failed to read configuration")?;
    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(e).context("Invalid configuration");
    }

    let credentials = config.credentials();
    info!(
        api_url = %config.api_url,
        client_id = %credentials.hint(),
        threshold_days = config.threshold_days,
        "Starting inactive user cleanup"
    );

    let port = PortClient::new(PortConfig::new(config.api_url.clone()))
        .context("Invalid Port API URL")?;

    info!("Authenticating with Port API");
    if let Err(e) = port.authenticate(&credentials).await {
        error!(error = %e, "Authentication failed");
        eprintln!("\nTroubleshooting tips:");
        eprintln!("1. Verify PORT_CLIENT_ID and PORT_CLIENT_SECRET in your .env file or environment");
        eprintln!("2. Ensure the credentials are correct and have not expired");
        eprintln!("3. Check that your Port organization has API access enabled");
        return Err(e).context("Error authenticating");
    }
    info!("Authentication successful");

    let users = port.entities(USER_BLUEPRINT).await?;
    let pipeline = CleanupPipeline::new(
        InactivityFilter::new(config.threshold_days),
        BackupWriter::new(config.backup_dir.clone()),
        ".",
    );

    let report = pipeline
        .run(&users, Local::now())
        .await
        .context("Error fetching users")?;

    println!("{}", report);
    Ok(())
}

fn report_credential_source(set_before_dotenv: bool, dotenv: Option<&Path>) {
    let source = CredentialSource::detect(set_before_dotenv, dotenv, credentials_in_env());
    info!(source = %source, "Resolved credential source");

    if let CredentialSource::Environment {
        dotenv_shadowed: true,
    } = source
    {
        warn!(
            "A .env file exists but PORT_CLIENT_ID/PORT_CLIENT_SECRET are already set in the \
             environment; the environment values are used. Unset them to use the .env file."
        );
    }
}
