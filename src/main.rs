mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_site::api::{http_client, AdminClient, ContentClient};
use catalog_site::blog::{ArticleKey, BlogDetailLoader, BlogListingLoader, ListingKey};
use catalog_site::config::Config;
use catalog_site::course::{Certificate, Curriculum, ModuleTabs};
use catalog_site::routing::SiteRoutes;
use catalog_site::session::{
    AuthorizedClient, CheckState, FileStorage, LogNavigator, LoginTarget, Navigator,
    SessionGate, SessionStore, SubmitState,
};
use catalog_site::view::{FetchController, Loader, ViewState};
use catalog_site::{health, render, web};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let http = http_client(config.http_timeout).context("Failed to build HTTP client")?;

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        host: None,
    }) {
        Commands::Serve { port, host } => serve(config, http, host, port).await,
        Commands::Blogs { category } => show_blogs(&config, http, category).await,
        Commands::Blog { category, slug } => show_blog(&config, http, category, slug).await,
        Commands::Login {
            username,
            password,
            blogs,
        } => login(&config, http, &username, &password, blogs).await,
        Commands::Logout => {
            let store = open_session_store(&config).await?;
            store.clear().await.context("Failed to clear admin session")?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Session => show_session(&config, http).await,
        Commands::Fetch { path } => fetch(&config, http, &path).await,
        Commands::Ping => {
            let reports = health::ping_once(
                &AdminClient::from_config(http.clone(), &config),
                &ContentClient::from_config(http, &config),
            )
            .await;
            for report in &reports {
                println!("{}: {:?}", report.target.as_str(), report.outcome);
            }
            Ok(())
        }
        Commands::Curriculum { file, tab } => show_course(&file, tab.as_deref()).await,
    }
}

async fn serve(
    mut config: Config,
    http: reqwest::Client,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.web_host = host;
    }
    if let Some(port) = port {
        config.web_port = port;
    }

    info!(
        api_url = config.api_url.as_deref().unwrap_or("<unset>"),
        blog_api_url = config.blog_api_url.as_deref().unwrap_or("<unset>"),
        "Starting catalog-site"
    );

    let routes = load_routes(&config).await?;
    let content = ContentClient::from_config(http.clone(), &config);
    let shutdown = CancellationToken::new();

    let ping_handle = if config.ping_enabled {
        let admin = AdminClient::from_config(http, &config);
        let content = content.clone();
        let interval = config.ping_interval;
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            health::run_loop(admin, content, interval, token).await;
        }))
    } else {
        info!("Backend pings disabled");
        None
    };

    let state = web::AppState::new(config, content, routes);
    let web_shutdown = shutdown.clone();
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(state, web_shutdown).await {
            error!("Web server error: {e:#}");
        }
    });

    shutdown_signal().await;

    info!("Shutting down...");
    shutdown.cancel();

    if let Err(e) = web_handle.await {
        warn!("Web server task failed: {e}");
    }
    if let Some(handle) = ping_handle {
        if let Err(e) = handle.await {
            warn!("Ping task failed: {e}");
        }
    }

    info!("Shutdown complete");
    Ok(())
}

async fn show_blogs(config: &Config, http: reqwest::Client, category: Option<String>) -> Result<()> {
    let loader = BlogListingLoader::new(ContentClient::from_config(http, config))
        .with_image_patterns(load_routes(config).await?.images);
    let controller = FetchController::new(loader);
    let key = match category.as_deref() {
        None | Some("all") => ListingKey::All,
        Some(c) => ListingKey::Category(c.to_string()),
    };

    drive(&controller, key, |state| {
        render::render_listing(state, category.as_deref())
    })
    .await
}

async fn show_blog(
    config: &Config,
    http: reqwest::Client,
    category: String,
    slug: String,
) -> Result<()> {
    let loader = BlogDetailLoader::new(
        ContentClient::from_config(http, config),
        config.related_failure_policy,
    )
    .with_image_patterns(load_routes(config).await?.images);
    let controller = FetchController::new(loader);
    drive(&controller, ArticleKey::new(category, slug), render::render_article).await
}

async fn load_routes(config: &Config) -> Result<SiteRoutes> {
    SiteRoutes::load(config.routes_file.as_deref())
        .await
        .context("Failed to load routing rules")
}

/// Load, print, and offer a retry for as long as the failure is retryable.
async fn drive<L: Loader>(
    controller: &FetchController<L>,
    key: L::Key,
    show: impl Fn(&ViewState<L::Output>) -> String,
) -> Result<()> {
    let mut state = controller.load(key).await;
    loop {
        print!("{}", show(&state));
        if !state.is_retryable() || !prompt_retry().await? {
            break;
        }
        state = controller.retry().await;
    }
    controller.teardown();
    Ok(())
}

async fn prompt_retry() -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Retry? [y/N] ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read answer")?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn open_session_store(config: &Config) -> Result<SessionStore> {
    SessionStore::init(FileStorage::new(&config.session_file))
        .await
        .with_context(|| {
            format!(
                "Failed to open session storage: {}",
                config.session_file.display()
            )
        })
}

fn navigator() -> Arc<dyn Navigator> {
    Arc::new(LogNavigator)
}

async fn login(
    config: &Config,
    http: reqwest::Client,
    username: &str,
    password: &str,
    blogs: bool,
) -> Result<()> {
    let store = Arc::new(open_session_store(config).await?);
    let gate = SessionGate::new(AdminClient::from_config(http, config), store, navigator());

    let target = if blogs {
        LoginTarget::Blogs(config.blogs_login_target.clone())
    } else {
        LoginTarget::Dashboard
    };

    match gate.submit(username, password, target).await {
        SubmitState::Redirected(destination) => {
            println!("Logged in. Continue at {}", destination.as_str());
            Ok(())
        }
        SubmitState::ShowError(message) => anyhow::bail!("{message}"),
        other => anyhow::bail!("Login did not complete: {other:?}"),
    }
}

async fn show_session(config: &Config, http: reqwest::Client) -> Result<()> {
    let store = Arc::new(open_session_store(config).await?);
    let gate = SessionGate::new(
        AdminClient::from_config(http, config),
        store.clone(),
        navigator(),
    );

    if let CheckState::Authenticated(_) = gate.check() {
        print!("{}", render::render_session(store.read().as_ref()));
    } else {
        print!("{}", render::render_session(None));
    }
    Ok(())
}

async fn fetch(config: &Config, http: reqwest::Client, path: &str) -> Result<()> {
    let store = Arc::new(open_session_store(config).await?);
    let client = AuthorizedClient::from_config(http, config, store, navigator());
    let body: Value = client
        .get_json(path)
        .await
        .map_err(|e| {
            let message = e.user_message("Request failed.");
            anyhow::Error::new(e).context(message)
        })?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn show_course(file: &std::path::Path, tab: Option<&str>) -> Result<()> {
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: Value = serde_json::from_slice(&raw).context("Course file is not JSON")?;

    if value.get("tabs").is_some() {
        let mut tabs = ModuleTabs::from_json(value.clone())?;
        if let Some(tab) = tab {
            if let Err(e) = tabs.select_tab(tab) {
                warn!(tab = %tab, "{e}");
                println!("Selected tab data not found.");
                return Ok(());
            }
        }
        let active = tabs.active_tab();
        println!("{} - {}", tabs.title, active.label());
        if let Some(module) = tabs.active_module() {
            println!(
                "{} ({})",
                module.title,
                module.duration.as_deref().unwrap_or("-")
            );
            for line in &module.content {
                println!("  - {line}");
            }
        }
    } else {
        print!("{}", render::render_curriculum(&Curriculum::from_json(value.clone())?));
    }

    if let Some(certificate) = value.get("certificate") {
        let certificate = Certificate::from_json(certificate.clone())?;
        println!("\n{} [{}]", certificate.alt, certificate.image);
        if !certificate.completion_text.is_empty() {
            println!("{}", certificate.completion_text);
        }
    }
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog_site=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // Logs go to stderr so command output on stdout stays clean.
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
