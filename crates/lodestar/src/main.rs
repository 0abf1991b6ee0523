use clap::{Parser, Subcommand, ValueEnum};
use lodestar_apiserver::{
    ApiServer, AppState, Config as ApiConfig, TlsMode, DEFAULT_MAX_BODY_BYTES,
};
use lodestar_scheduler::{Extender, Policy};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "lodestar", about = "Lodestar Kubernetes Scheduler Extender")]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "LODESTAR_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the filter and prioritize endpoints
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8888", env = "LODESTAR_BIND")]
        bind: String,
        /// Path prefix of the extender endpoints (the orchestrator's urlPrefix)
        #[arg(long, default_value = "", env = "LODESTAR_URL_PREFIX")]
        url_prefix: String,
        /// Policy file; the built-in default policy is used when absent
        #[arg(long, env = "LODESTAR_POLICY")]
        policy: Option<PathBuf>,
        /// Largest accepted request body in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "LODESTAR_MAX_BODY_BYTES")]
        max_body_bytes: usize,
        #[command(flatten)]
        tls: TlsArgs,
    },
    /// Load and validate a policy file, then print the resolved registries
    CheckPolicy {
        /// Policy file to check
        #[arg(long, env = "LODESTAR_POLICY")]
        policy: PathBuf,
    },
}

#[derive(clap::Args)]
struct TlsArgs {
    /// PEM certificate to serve HTTPS with
    #[arg(long, requires = "tls_key", env = "LODESTAR_TLS_CERT")]
    tls_cert: Option<PathBuf>,
    /// PEM private key for --tls-cert
    #[arg(long, requires = "tls_cert", env = "LODESTAR_TLS_KEY")]
    tls_key: Option<PathBuf>,
    /// Serve HTTPS with a generated self-signed certificate
    #[arg(long, conflicts_with = "tls_cert", env = "LODESTAR_TLS_AUTO")]
    tls_auto: bool,
    /// Where generated TLS material is kept
    #[arg(long, default_value = "./lodestar-tls", env = "LODESTAR_TLS_DIR")]
    tls_dir: PathBuf,
    /// Subject alternative names of the generated certificate
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["localhost", "127.0.0.1"],
        env = "LODESTAR_TLS_SAN"
    )]
    tls_san: Vec<String>,
}

impl TlsArgs {
    fn mode(self) -> TlsMode {
        match (self.tls_cert, self.tls_key) {
            (Some(cert_path), Some(key_path)) => TlsMode::Provided {
                cert_path,
                key_path,
            },
            _ if self.tls_auto => TlsMode::AutoGenerate {
                dir: self.tls_dir,
                san_entries: self.tls_san,
            },
            _ => TlsMode::Disabled,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    match cli.command {
        Commands::Serve {
            bind,
            url_prefix,
            policy,
            max_body_bytes,
            tls,
        } => {
            run_serve(
                &bind,
                url_prefix,
                policy.as_deref(),
                max_body_bytes,
                tls.mode(),
            )
            .await
        }
        Commands::CheckPolicy { policy } => check_policy(&policy),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

fn load_policy(path: Option<&Path>) -> miette::Result<Policy> {
    match path {
        Some(path) => Ok(Policy::from_file(path)?),
        None => {
            info!("No policy file given, using the default policy");
            Ok(Policy::default())
        }
    }
}

/// Run the extender until Ctrl-C
async fn run_serve(
    bind: &str,
    url_prefix: String,
    policy: Option<&Path>,
    max_body_bytes: usize,
    tls: TlsMode,
) -> miette::Result<()> {
    info!("Starting lodestar scheduler extender");

    let extender = Extender::from_policy(&load_policy(policy)?)?;
    let state = Arc::new(AppState::new(extender).with_max_body_bytes(max_body_bytes));

    let listen_addr: SocketAddr = bind
        .parse()
        .map_err(|e| miette::miette!("Invalid bind address '{}': {}", bind, e))?;

    let config = ApiConfig {
        listen_addr,
        url_prefix,
        tls,
    };

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        info!("Received shutdown signal, draining requests");
        signal_token.cancel();
    });

    ApiServer::new(config, state).run(token).await
}

/// Validate a policy file and print what it resolves to
fn check_policy(path: &Path) -> miette::Result<()> {
    let policy = Policy::from_file(path)?;
    let extender = Extender::from_policy(&policy)?;

    println!("policy {} is valid", path.display());
    println!("predicates:");
    for name in extender.predicates().names() {
        println!("  - {}", name);
    }
    println!("priorities (combiner {}):", extender.priorities().combiner());
    for entry in extender.priorities().entries() {
        println!("  - {} (weight {})", entry.function.name(), entry.weight);
    }

    Ok(())
}
