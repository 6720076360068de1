use clap::Parser;
use library::{FileFilter, MediaLibrary};
use tracing::{info, warn};
use vidshelf_server::build_router;
use vidshelf_server::config::{default_config_path, load_or_create_config, CliArgs, Settings};
use vidshelf_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let (config, created) = load_or_create_config(&config_path)?;
    let settings = Settings::resolve(&args, &config, &config_path);

    let default_level = if settings.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let library = MediaLibrary::open(
        &settings.data_dir,
        FileFilter::new(&settings.extensions),
        &settings.index_file,
    )
    .map_err(|err| format!("cannot open data directory {:?}: {}", settings.data_dir, err))?;
    let index = library
        .refresh()
        .map_err(|err| format!("cannot scan data directory {:?}: {}", library.root(), err))?;
    info!("Serving {} indexed files from {:?}", index.len(), library.root());

    if !settings.app_dir.exists() {
        warn!("App directory {:?} does not exist; UI requests will 404", settings.app_dir);
    }

    let state = AppState::new(library, settings.app_dir.clone());
    let app = build_router(state);

    let bind_addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = wait_for_ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!("Failed to install terminate signal handler: {}", err);
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    info!("Shutdown signal received.");
}

/// Resolves on ctrl-c only. If the handler cannot be installed the server
/// keeps running until it is killed.
async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
}
