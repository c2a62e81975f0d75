use crate::{
    config::{self, Config},
    error, info, logging,
    server::{self, AppState},
    success, warning,
};

/// Options of the `serve` command.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Overrides `PORT`.
    pub port: Option<u16>,
    /// Open the login page in the default browser once listening.
    pub open: bool,
    pub json_logs: bool,
}

pub async fn serve(opts: ServeOptions) {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    logging::init(opts.json_logs);

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };
    if let Some(port) = opts.port {
        config.port = port;
    }

    let listener = match server::bind(&config).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", config.server_addr(), e),
    };

    success!("Listening on port {}", config.port);
    info!("Connect a Spotify account at {}", config.login_url());

    if opts.open && webbrowser::open(&config.login_url()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            config.login_url()
        )
    }

    if let Err(e) = server::start_api_server(listener, AppState::in_memory(config)).await {
        error!("Server error: {}", e);
    }
}
