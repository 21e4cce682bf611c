use std::{net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use engine::{BalanceStore, InvalidationPolicy, MemoryBalanceStore, RedisBalanceStore};
use migration::{Migrator, MigratorTrait};
use settings::{CacheBackend, Database};

mod settings;

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "splitter", about = "Shared expenses server")]
struct Cli {
    /// Settings file, with or without the `.toml` extension.
    #[arg(long, default_value = "settings")]
    config: String,

    /// Apply database migrations and exit.
    #[arg(long)]
    create_schema: bool,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitter={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    if cli.create_schema {
        tracing::info!("database schema is up to date");
        return Ok(());
    }

    let balance_store = parse_cache(&settings.cache).await?;
    let invalidation = if settings.cache.invalidate_participants {
        InvalidationPolicy::InvalidateParticipants
    } else {
        InvalidationPolicy::WriteThroughOwner
    };

    let engine = engine::Engine::builder()
        .database(db)
        .balance_store(balance_store)
        .ttl(Duration::from_secs(settings.cache.ttl_seconds))
        .invalidation(invalidation)
        .build()
        .await?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr: SocketAddr = format!("{}:{}", bind, settings.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn parse_database(config: &settings::Database) -> AppResult<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

async fn parse_cache(config: &settings::Cache) -> AppResult<Arc<dyn BalanceStore>> {
    match config.backend {
        CacheBackend::Memory => {
            tracing::info!("using in-process balance cache");
            Ok(Arc::new(MemoryBalanceStore::new()))
        }
        CacheBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or("cache.redis_url is required for the redis backend")?;
            tracing::info!("using redis balance cache");
            Ok(Arc::new(RedisBalanceStore::connect(url).await?))
        }
    }
}
