use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use skilldex_api::{RestApi, ServerConfig};
use skilldex_core::{Distance, Encoder, HandlerConfig, HashingEncoder, QueryHandler, DEFAULT_DIM};
use skilldex_storage::{ArtifactManager, BuildOptions, DEFAULT_BUILD_BATCH, DEFAULT_SKILLS_COLUMN};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Skill retrieval by semantic similarity
#[derive(Parser, Debug)]
#[command(name = "skilldex", version)]
#[command(about = "Free text in, skill labels of the nearest reference rows out", long_about = None)]
struct Cli {
    /// Log level; RUST_LOG takes precedence when set
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info, env = "SKILLDEX_LOG_LEVEL")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the artifacts and serve the HTTP API
    Serve(ServeArgs),
    /// Encode the corpus and write an index blob
    BuildIndex(BuildIndexArgs),
    /// Answer one query and print the skills as JSON
    Query(QueryArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EncoderKind {
    /// Feature-hashing encoder, no model download
    Hashing,
    /// all-MiniLM-L6-v2 (requires the `fastembed` feature)
    Fastembed,
}

#[derive(Args, Debug)]
struct EncoderArgs {
    #[arg(long, value_enum, default_value_t = EncoderKind::Hashing, env = "SKILLDEX_ENCODER")]
    encoder: EncoderKind,

    /// Output dimension of the hashing encoder
    #[arg(long, default_value_t = DEFAULT_DIM, env = "SKILLDEX_DIM")]
    dim: usize,

    /// Where fastembed keeps downloaded model files
    #[arg(long, env = "SKILLDEX_MODEL_CACHE")]
    model_cache: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ArtifactArgs {
    /// Reference corpus CSV
    #[arg(long, env = "SKILLDEX_CORPUS")]
    corpus: PathBuf,

    /// Index blob built from the corpus
    #[arg(long, env = "SKILLDEX_INDEX")]
    index: PathBuf,

    /// Column holding the skills text
    #[arg(long, default_value = DEFAULT_SKILLS_COLUMN, env = "SKILLDEX_SKILLS_COLUMN")]
    skills_column: String,

    /// Refuse to start when index and corpus disagree
    #[arg(long, env = "SKILLDEX_STRICT")]
    strict: bool,

    /// Nearest rows whose skills are returned
    #[arg(long, default_value_t = 1, env = "SKILLDEX_TOP_K")]
    top_k: usize,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(flatten)]
    encoder: EncoderArgs,

    #[arg(long, default_value = "0.0.0.0", env = "SKILLDEX_HOST")]
    host: String,

    #[arg(long, default_value_t = 5000, env = "SKILLDEX_PORT")]
    port: u16,

    /// HTTP worker threads (default: one per core)
    #[arg(long, env = "SKILLDEX_WORKERS")]
    workers: Option<usize>,
}

#[derive(Args, Debug)]
struct BuildIndexArgs {
    #[arg(long, env = "SKILLDEX_CORPUS")]
    corpus: PathBuf,

    /// Where to write the index blob
    #[arg(long, env = "SKILLDEX_INDEX")]
    output: PathBuf,

    #[arg(long, default_value = DEFAULT_SKILLS_COLUMN, env = "SKILLDEX_SKILLS_COLUMN")]
    skills_column: String,

    /// Column to embed (default: the skills column)
    #[arg(long)]
    embed_column: Option<String>,

    /// euclidean, cosine or dot
    #[arg(long, default_value = "euclidean")]
    metric: Distance,

    #[arg(long, default_value_t = DEFAULT_BUILD_BATCH)]
    batch_size: usize,

    #[command(flatten)]
    encoder: EncoderArgs,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(flatten)]
    encoder: EncoderArgs,

    /// Free text to look up
    text: String,
}

fn init_tracing(level: LogLevel) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn make_encoder(args: &EncoderArgs) -> anyhow::Result<Arc<dyn Encoder>> {
    match args.encoder {
        EncoderKind::Hashing => Ok(Arc::new(HashingEncoder::new(args.dim)?)),
        #[cfg(feature = "fastembed")]
        EncoderKind::Fastembed => {
            if args.dim != DEFAULT_DIM {
                tracing::warn!(dim = args.dim, "--dim is ignored by the fastembed encoder");
            }
            let encoder = skilldex_core::MiniLmEncoder::new(args.model_cache.clone(), None)?;
            Ok(Arc::new(encoder))
        }
        #[cfg(not(feature = "fastembed"))]
        EncoderKind::Fastembed => {
            bail!("this binary was built without the `fastembed` feature")
        }
    }
}

fn load_handler(artifacts: &ArtifactArgs, encoder: &EncoderArgs) -> anyhow::Result<QueryHandler> {
    let encoder = make_encoder(encoder)?;
    let manager = ArtifactManager::new(&artifacts.corpus, &artifacts.index)
        .with_skills_column(&artifacts.skills_column)
        .strict(artifacts.strict);

    let context = manager.open(encoder).with_context(|| {
        format!(
            "failed to load corpus {} with index {}",
            artifacts.corpus.display(),
            artifacts.index.display()
        )
    })?;
    info!(
        rows = context.corpus().len(),
        indexed = context.index().len(),
        model = context.encoder().model_id(),
        "skill context ready"
    );

    let handler = QueryHandler::new(
        Arc::new(context),
        HandlerConfig {
            top_k: artifacts.top_k,
        },
    )?;
    Ok(handler)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    // Loading completes before the server binds; a half-loaded instance never serves.
    let handler = Arc::new(load_handler(&args.artifacts, &args.encoder)?);
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        workers: args.workers,
    };
    info!("HTTP API: http://{}:{}/get_skills", config.host, config.port);

    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(RestApi::start(handler, config))
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
            match joined {
                Ok(Ok(Ok(()))) => info!("HTTP server stopped"),
                Ok(Ok(Err(e))) => return Err(e).context("HTTP server failed"),
                Ok(Err(_)) => bail!("HTTP server thread panicked"),
                Err(e) => return Err(e).context("HTTP server task failed"),
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn build_index(args: BuildIndexArgs) -> anyhow::Result<()> {
    let encoder = make_encoder(&args.encoder)?;
    let manager = ArtifactManager::new(&args.corpus, &args.output)
        .with_skills_column(&args.skills_column);
    let options = BuildOptions {
        embed_column: args.embed_column,
        distance: args.metric,
        batch_size: args.batch_size,
    };

    let header = manager
        .build_index(encoder.as_ref(), &options)
        .with_context(|| format!("failed to build index from {}", args.corpus.display()))?;
    info!(
        output = %args.output.display(),
        rows = header.row_count,
        dim = header.dim,
        distance = %header.distance,
        "index built"
    );
    Ok(())
}

fn query(args: QueryArgs) -> anyhow::Result<()> {
    let handler = load_handler(&args.artifacts, &args.encoder)?;
    let skills = handler.handle(&args.text)?;
    println!("{}", serde_json::to_string_pretty(&skills)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level)?;
    info!("skilldex v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::BuildIndex(args) => build_index(args),
        Command::Query(args) => query(args),
    }
}
