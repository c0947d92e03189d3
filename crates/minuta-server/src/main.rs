//! Minuta — contract generation server and command-line tools.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod convert;
mod routes;
mod state;

use minuta_contract::ContractGenerator;
use minuta_core::MinutaConfig;
use minuta_store::{CompanyImport, SqliteStore};
use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("MINUTA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("Minuta — contract generation server");
    println!();
    println!("Usage: minuta [command]");
    println!();
    println!("Commands:");
    println!("  (none)                       Start the server");
    println!("  sync <companies.json>        Load importer output into the company store");
    println!("  extract <file.docx>          Print the editable text of a document");
    println!("  reconstruct <file> <edited>  Rebuild a document from edited text");
    println!("  template-info                Check the configured contract template");
    println!("  help                         Show this help message");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "sync" => {
                let Some(source) = args.get(2) else {
                    usage_error("Usage: minuta sync <companies.json>");
                };
                let raw = std::fs::read_to_string(source)?;
                let companies: Vec<CompanyImport> = serde_json::from_str(&raw)?;
                let config = MinutaConfig::from_env(resolve_data_dir())?;
                let store = SqliteStore::open(&config.data_paths.db)?;
                let report = store.sync_companies(&companies)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            "extract" => {
                let Some(file) = args.get(2) else {
                    usage_error("Usage: minuta extract <file.docx>");
                };
                println!("{}", minuta_contract::extract(PathBuf::from(file).as_path()));
            }
            "reconstruct" => {
                let (Some(file), Some(edited)) = (args.get(2), args.get(3)) else {
                    usage_error("Usage: minuta reconstruct <file.docx> <edited.txt>");
                };
                let text = std::fs::read_to_string(edited)?;
                let output = minuta_contract::reconstruct(PathBuf::from(file).as_path(), &text)?;
                println!("{}", output.display());
            }
            "template-info" => {
                let config = MinutaConfig::from_env(resolve_data_dir())?;
                let info = minuta_contract::template::inspect(&config.template_path);
                println!("{}", serde_json::to_string_pretty(&info)?);
                std::process::exit(if info.valid { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => print_help(),
            _ => usage_error(&format!(
                "Unknown command: {}. Use 'minuta help' for usage.",
                args[1]
            )),
        }
        return Ok(());
    }

    // Normal server startup
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = MinutaConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    // A missing template is fatal at startup.
    let generator = ContractGenerator::new(&config.template_path, &config.output_dir)?;
    info!("Template: {}", generator.template_path().display());

    let state = Arc::new(AppState::new(config, store, generator));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Minuta server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
