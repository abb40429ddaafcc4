// ==========================================
// Darpan Portal - import CLI
// ==========================================
// Runs one import from the command line. The web portal drives the same
// ImportService; this binary exists for operators and backfills.
// ==========================================

use darpan_portal::db::{init_schema, open_sqlite_connection};
use darpan_portal::{
    logging, ImportApi, ImportConfig, ImportRepositoryImpl, ImportRequest, ImportService,
    RecordType,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn usage() -> ! {
    eprintln!(
        "usage: darpan-import <sales|stock|contacts> <file> --company <id> \
         [--user <name>] [--db <path>] [--config <path>]"
    );
    std::process::exit(2);
}

struct CliArgs {
    record_type: RecordType,
    file_path: PathBuf,
    company_id: String,
    actor: String,
    db_path: Option<String>,
    config_path: Option<String>,
}

fn parse_args() -> CliArgs {
    let mut args = std::env::args().skip(1);

    let record_type = match args.next().as_deref().and_then(RecordType::parse) {
        Some(t) => t,
        None => usage(),
    };
    let file_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => usage(),
    };

    let mut company_id = String::new();
    let mut actor = String::new();
    let mut db_path = None;
    let mut config_path = None;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--company" => company_id = args.next().unwrap_or_else(|| usage()),
            "--user" => actor = args.next().unwrap_or_else(|| usage()),
            "--db" => db_path = Some(args.next().unwrap_or_else(|| usage())),
            "--config" => config_path = Some(args.next().unwrap_or_else(|| usage())),
            _ => usage(),
        }
    }

    if company_id.is_empty() {
        usage();
    }

    CliArgs {
        record_type,
        file_path,
        company_id,
        actor,
        db_path,
        config_path,
    }
}

fn default_db_path() -> String {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("darpan-portal");
    let _ = std::fs::create_dir_all(&dir);
    dir.join("portal.db").to_string_lossy().to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("{} v{} - import engine", darpan_portal::APP_NAME, darpan_portal::VERSION);

    let cli = parse_args();
    let db_path = cli.db_path.unwrap_or_else(default_db_path);
    tracing::info!(db = %db_path, "using database");

    // Make sure the schema exists before the repository opens
    match open_sqlite_connection(&db_path) {
        Ok(conn) => {
            if let Err(e) = init_schema(&conn) {
                tracing::error!(error = %e, "schema initialization failed");
                return ExitCode::FAILURE;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "cannot open database");
            return ExitCode::FAILURE;
        }
    }

    let repo = match ImportRepositoryImpl::new(&db_path) {
        Ok(repo) => repo,
        Err(e) => {
            tracing::error!(error = %e, "cannot open repository");
            return ExitCode::FAILURE;
        }
    };

    let config = match cli.config_path {
        Some(path) => match ImportConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(config = %path, error = %e, "cannot load config override");
                return ExitCode::FAILURE;
            }
        },
        None => ImportConfig::default(),
    };

    let api = ImportApi::new(ImportService::new(repo, config));
    let request = ImportRequest {
        company_id: cli.company_id,
        actor: cli.actor,
        record_type: cli.record_type,
        file_path: cli.file_path,
    };

    let response = api.import(&request).await;

    match serde_json::to_string_pretty(&response) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            tracing::error!(error = %e, "cannot render response");
            return ExitCode::FAILURE;
        }
    }

    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
