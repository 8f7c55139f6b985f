use clickhouse::Client;
use color_eyre::Result;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tps_history_collector::{
    scheduler,
    Collector,
    SourceClient,
    TpsCollector,
};
use tps_history_config::{
    Config,
    StorageBackend,
};
use tps_history_store::{
    ClickHouseStore,
    HistoryStore,
    MemoryStore,
};

/// The collector and the query API, sharing one store.
pub struct App {
    config: Config,
    store: Arc<dyn HistoryStore>,
    collector: Arc<dyn Collector>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store = build_store(&config);

        let source = SourceClient::new(
            HttpClient::new(),
            config.source_url()?.clone(),
            config.collector.fetch_timeout,
        );
        info!(url = %source.url(), timeout = ?config.collector.fetch_timeout, "source API configured");
        let collector = Arc::new(TpsCollector::new(source, store.clone()));

        Ok(Self {
            config,
            store,
            collector,
        })
    }

    /// Runs until ctrl-c or SIGTERM. The scheduler stops ticking, the HTTP
    /// server drains its open requests, then the store is dropped.
    pub async fn run(self) -> Result<()> {
        let shutdown = CancellationToken::new();

        let scheduler = tokio::spawn(scheduler::run_every(
            self.collector.clone(),
            self.config.collector.interval,
            shutdown.clone(),
        ));

        let address = self.config.http.listen_address();
        let listener = TcpListener::bind(address).await?;
        info!("listening on {}", address);

        let app = tps_history_http::router::create_router(self.store.clone());
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
            .await?;

        shutdown.cancel();
        scheduler.await?;
        info!("shut down");
        Ok(())
    }
}

fn build_store(config: &Config) -> Arc<dyn HistoryStore> {
    match config.storage.backend {
        StorageBackend::ClickHouse => {
            let mut client = Client::default()
                .with_url(config.database.url())
                .with_user(config.database.user.clone())
                .with_database(config.database.name.clone());

            if let Some(password) = &config.database.password {
                client = client.with_password(password.clone());
            }

            info!(url = %config.database.url(), database = %config.database.name, "using ClickHouse store");
            Arc::new(ClickHouseStore::new(client))
        }
        StorageBackend::Memory => {
            warn!("using in-memory store, samples are lost on exit");
            Arc::new(MemoryStore::new())
        }
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
