use std::{
    error::Error,
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sale_ledger::{
    AppState, DEFAULT_SEED_URL, PaginationConfig, SeedSource, build_router, graceful_shutdown,
    logging_middleware, reseed,
};

/// The web server for sale_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    port: u16,

    /// File path to the application SQLite database. Use ":memory:" for a
    /// database that only lives as long as the server.
    #[arg(long, env = "DATABASE_URL", default_value = "sale_ledger.db")]
    db_path: String,

    /// The URL of the JSON array used to reseed the database.
    #[arg(long, env = "SEED_URL", default_value = DEFAULT_SEED_URL)]
    seed_url: String,

    /// A local JSON file to reseed the database from instead of the seed URL.
    #[arg(long, env = "SEED_FILE")]
    seed_file: Option<PathBuf>,

    /// Reseed the database once before serving requests.
    #[arg(long)]
    seed_on_start: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging()?;

    let seed_source = match args.seed_file {
        Some(path) => SeedSource::File(path),
        None => SeedSource::url(&args.seed_url),
    };

    let conn = Connection::open(&args.db_path)?;
    let state = AppState::new(conn, seed_source, PaginationConfig::default())?;

    if args.seed_on_start {
        let count = reseed(&state.seed_source, &state.db_connection).await?;
        tracing::info!("Seeded the database with {count} transactions");
    }

    let db_connection = state.db_connection.clone();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    close_database(db_connection);

    Ok(())
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .try_init()?;

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged by the handlers.
        .on_failure(());

    router.layer(tracing_layer)
}

fn close_database(db_connection: Arc<Mutex<Connection>>) {
    let Ok(mutex) = Arc::try_unwrap(db_connection) else {
        tracing::warn!("database connection still in use at shutdown, leaving it to be dropped");
        return;
    };

    match mutex.into_inner() {
        Ok(connection) => {
            if let Err((_, error)) = connection.close() {
                tracing::error!("could not close the database connection: {error}");
            }
        }
        Err(error) => tracing::error!("database lock was poisoned at shutdown: {error}"),
    }
}
