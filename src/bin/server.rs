use std::{net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use multicut_server::server::{
    app_state::{AppState, DbPool},
    router::create_router,
    schema::create_schema,
};

use structopt::StructOpt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use axum::http::HeaderValue;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use axum_server::tls_rustls::RustlsConfig;

const BIND_ADDRESS: [u8; 4] = [0, 0, 0, 0];

async fn connect_to_database(opts: &Opts) -> anyhow::Result<DbPool> {
    let url = opts
        .database_url
        .as_deref()
        .context("database url must be set")?;

    let connect_options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url {url:?}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .min_connections(opts.db_min_connections)
        .max_connections(opts.db_max_connections)
        .connect_with(connect_options)
        .await
        .context("failed to connect to the database")?;

    create_schema(&pool)
        .await
        .context("failed to create the database schema")?;

    info!("Connection to the database is successful!");
    Ok(pool)
}

fn cors_layer(opts: &Opts) -> anyhow::Result<CorsLayer> {
    Ok(match &opts.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid cors origin {origin:?}"))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    })
}

async fn http_server(app_state: Arc<AppState>, opts: Arc<Opts>) -> Result<(), anyhow::Error> {
    let app = create_router(app_state)
        .layer(cors_layer(&opts)?)
        .layer(CompressionLayer::new());

    let addr = SocketAddr::from((BIND_ADDRESS, opts.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Start listening on for HTTP on {addr:?}");
    Ok(axum::serve(listener, app).await?)
}

async fn https_server(app_state: Arc<AppState>, opts: Arc<Opts>) -> Result<(), anyhow::Error> {
    let app = create_router(app_state).layer(cors_layer(&opts)?);

    // configure certificate and private key used by https
    let tls_config = match RustlsConfig::from_pem_file(
        opts.certs_dir.join("cert.pem"),
        opts.certs_dir.join("privkey.pem"),
    )
    .await
    {
        Ok(config) => config,
        Err(e) => {
            warn!(
                "Loading TLS certificates failed (expected files at {}/{{cert,privkey}}.pem); will only serve on HTTP port: {e}",
                opts.certs_dir.display()
            );
            return Ok(());
        }
    };

    let addr = SocketAddr::from((BIND_ADDRESS, opts.https_port));
    info!("Start listening on for HTTPS on {addr:?}");
    Ok(axum_server::bind_rustls(addr, tls_config)
        .serve(app.into_make_service())
        .await?)
}

#[derive(StructOpt)]
struct Opts {
    #[structopt(short = "-h", long, default_value = "8000")]
    http_port: u16,
    #[structopt(short = "-s", long, default_value = "8080")]
    https_port: u16,

    #[structopt(long, default_value = "certs", parse(from_os_str))]
    certs_dir: PathBuf,

    /// SQLite url, e.g. sqlite://multicut.db; falls back to DATABASE_URL
    #[structopt(short, long)]
    database_url: Option<String>,

    #[structopt(long, default_value = "1")]
    db_min_connections: u32,

    #[structopt(long, default_value = "8")]
    db_max_connections: u32,

    /// Allowed CORS origin; any origin if omitted
    #[structopt(long)]
    cors_origin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let opts = Arc::new({
        let mut opts = Opts::from_args();
        if opts.database_url.is_none() {
            opts.database_url = Some(
                std::env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set or --database-url must be provided")?,
            );
        }

        cors_layer(&opts)?;
        anyhow::ensure!(
            opts.db_min_connections <= opts.db_max_connections,
            "min_connections must be less than or equal to max_connections"
        );
        opts
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multicut_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_state = match connect_to_database(&opts).await {
        Ok(pool) => Arc::new(AppState::new(pool)),
        Err(err) => {
            error!("Failed to connect to the database: {err:?}");
            std::process::exit(1);
        }
    };

    tokio::spawn(https_server(app_state.clone(), opts.clone()));
    http_server(app_state, opts).await
}
