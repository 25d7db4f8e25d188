use std::{env, net::SocketAddr, path::PathBuf};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use khata_rs::{AppState, PhoneUniqueness, build_router, graceful_shutdown, logging_middleware};

/// The web server for khata_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "KHATA_DB_PATH")]
    db_path: String,

    /// Directory holding an SSL certificate `cert.pem` and key `key.pem`.
    ///
    /// Without it the app is served over plain HTTP. The session cookie is
    /// marked secure, which browsers only accept over HTTP for localhost.
    #[arg(long, env = "KHATA_CERT_PATH")]
    cert_path: Option<PathBuf>,

    /// The port to serve the app from, always on 127.0.0.1.
    #[arg(short, long, env = "KHATA_PORT", default_value_t = 5000)]
    port: u16,

    /// Whether customer phone numbers must be unique per user or across all users.
    #[arg(long, env = "KHATA_PHONE_UNIQUENESS", value_enum, default_value_t)]
    phone_uniqueness: PhoneUniqueness,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(conn, &secret, args.phone_uniqueness)
        .expect("Could not initialize the database");
    tracing::info!(
        "Using database {} with {:?} phone uniqueness",
        args.db_path,
        args.phone_uniqueness
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let result = match args.cert_path {
        Some(cert_path) => {
            let tls_config = RustlsConfig::from_pem_file(
                cert_path.join("cert.pem"),
                cert_path.join("key.pem"),
            )
            .await
            .expect("Could not open TLS certificates.");

            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
        None => {
            tracing::warn!(
                "No certificate given, serving plain HTTP. Log-in only works from localhost."
            );
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
    };

    if let Err(error) = result {
        tracing::error!("Server stopped with an error: {error}");
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(filter))
        .init();
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
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use khata_rs::PhoneUniqueness;

    use super::Args;

    #[test]
    fn args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn cert_path_is_optional() {
        let args = Args::try_parse_from(["server", "--db-path", "khata.db"]).unwrap();

        assert_eq!(args.cert_path, None);
        assert_eq!(args.port, 5000);
        assert_eq!(args.phone_uniqueness, PhoneUniqueness::PerUser);
    }

    #[test]
    fn parses_cert_path() {
        let args = Args::try_parse_from([
            "server",
            "--db-path",
            "khata.db",
            "--cert-path",
            "certs",
            "--phone-uniqueness",
            "global",
        ])
        .unwrap();

        assert_eq!(args.cert_path, Some(PathBuf::from("certs")));
        assert_eq!(args.phone_uniqueness, PhoneUniqueness::Global);
    }
}
