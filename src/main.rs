use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use application_form::cli::{self, Command};
use application_form::config::FormConfig;
use application_form::form::FormSession;
use application_form::form::rules::format_size_limit;
use application_form::store::{DraftStore, LibSqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = FormConfig::from_env()?;

    let db_path = std::env::var("APPLICATION_FORM_DB_PATH")
        .unwrap_or_else(|_| "./data/application-form.db".to_string());
    let applicant =
        std::env::var("APPLICATION_FORM_APPLICANT").unwrap_or_else(|_| "default".to_string());

    let store = LibSqlStore::new_local(std::path::Path::new(&db_path), &applicant).await?;
    let last_saved = match store.updated_at(&config.draft_key).await {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read draft timestamp");
            None
        }
    };
    let applicant = store.applicant_id().to_string();
    let store: Arc<dyn DraftStore> = Arc::new(store);

    let mut session = FormSession::initialize(store, config).await;
    let max_file_size = format_size_limit(session.config().limits.max_file_size);

    eprintln!("📝 Application Form v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", db_path);
    eprintln!("   Applicant: {}", applicant);
    eprintln!("   Session: {}", session.id());
    eprintln!("   Max file size: {}", max_file_size);
    if let Some(saved) = last_saved {
        eprintln!("   Resuming draft saved {}", saved.format("%Y-%m-%d %H:%M UTC"));
    }
    eprintln!("   Type `help` for commands.\n");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }

        match Command::parse(line) {
            Ok(Command::Quit) => break,
            Ok(command) => match cli::execute(&mut session, command).await {
                Ok(output) => println!("{output}"),
                Err(e) => {
                    tracing::error!(error = %e, "Command failed");
                    eprintln!("error: {e}");
                }
            },
            Err(message) => eprintln!("{message}"),
        }

        if session.data().is_complete {
            break;
        }
        eprint!("> ");
    }

    Ok(())
}
