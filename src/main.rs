use dotenvy::dotenv;
use guide_bot::bot::setup_handler;
use guide_bot::catalog::Catalog;
use guide_bot::config::Settings;
use guide_bot::health::{self, HealthState};
use guide_bot::navigation::{ConversationStore, NavigationController};
use guide_bot::render::ContentRenderer;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// How often idle conversations are dropped
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Regex patterns for redacting bot tokens
struct RedactionPatterns {
    token_url: Regex,
    token_bare: Regex,
    token_prefixed: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token_bare: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            token_prefixed: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let output = self
            .token_url
            .replace_all(input, "$1[TELEGRAM_TOKEN]$3");
        let output = self.token_bare.replace_all(&output, "[TELEGRAM_TOKEN]");
        self.token_prefixed
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .into_owned()
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let redacted = self.patterns.redact(&String::from_utf8_lossy(buf));
        self.inner.write_all(redacted.as_bytes())?;
        // Report the caller's length; the redacted text may be shorter or longer.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: (self.make_inner)(),
            patterns: self.patterns.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Before logging, so no line escapes unredacted
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);
    init_logging(patterns);

    info!("Starting guide bot...");

    let settings = init_settings();

    let catalog = Arc::new(Catalog::load_or_empty(&settings.catalog_path));
    let store = ConversationStore::new(settings.session_idle_secs, settings.session_max_entries);
    let controller = Arc::new(NavigationController::new(
        catalog.clone(),
        ContentRenderer::new(settings.message_limit()),
        store.clone(),
        settings.chunk_delay(),
    ));

    let shutdown = CancellationToken::new();
    let sweeper = store.spawn_sweeper(SWEEP_INTERVAL, shutdown.clone());
    let health_task = spawn_health(
        settings.port,
        HealthState::new(&catalog, store),
        shutdown.clone(),
    )
    .await?;

    let bot = Bot::new(settings.telegram_token.clone());

    info!(sections = catalog.len(), "Bot is running...");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![controller])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped, shutting down health endpoint");
    shutdown.cancel();
    if let Err(e) = health_task.await {
        error!("Health endpoint task failed: {}", e);
    }
    if let Err(e) = sweeper.await {
        error!("Conversation sweeper task failed: {}", e);
    }

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stderr,
        patterns,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

async fn spawn_health(
    port: u16,
    state: HealthState,
    shutdown: CancellationToken,
) -> io::Result<tokio::task::JoinHandle<()>> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await.map_err(|e| {
        error!("Failed to bind health endpoint on port {}: {}", port, e);
        e
    })?;
    Ok(tokio::spawn(async move {
        if let Err(e) = health::serve(listener, state, shutdown).await {
            error!("Health endpoint error: {}", e);
        }
    }))
}
