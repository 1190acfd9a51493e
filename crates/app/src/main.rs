use std::{net::SocketAddr, sync::Arc};

use chrono_tz::Tz;
use engine::{LedgerStore, LocalAttachmentStorage, MemoryStore, Persistence, SqliteStore};
use migration::{Migrator, MigratorTrait};
use server::ServerState;
use settings::Database;

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kas={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", settings.app.timezone))?;

    let persistence = open_persistence(&settings.server.database).await?;
    let attachments = LocalAttachmentStorage::new(
        &settings.attachments.root,
        &settings.attachments.public_base_url,
        &settings.attachments.upload_preset,
        settings.attachments.max_bytes,
    );
    let state = ServerState::new(LedgerStore::new(persistence), Arc::new(attachments), timezone)
        .with_uploads_dir(&settings.attachments.root);

    let addr: SocketAddr = format!("{}:{}", settings.server.bind, settings.server.port).parse()?;
    tracing::info!(%timezone, "starting kas");
    server::run(state, addr).await;

    Ok(())
}

async fn open_persistence(config: &Database) -> Result<Arc<dyn Persistence>, BoxError> {
    match config {
        Database::Memory => {
            tracing::info!("using in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        Database::Sqlite(path) => {
            let database = sea_orm::Database::connect(format!("sqlite:{path}?mode=rwc")).await?;
            Migrator::up(&database, None).await?;
            tracing::info!(%path, "using sqlite store");
            Ok(Arc::new(SqliteStore::new(database).await?))
        }
    }
}
