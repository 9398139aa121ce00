use actix_web::{web, HttpServer};
use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use chirp::{config, database, http, App};

#[derive(Debug, Error)]
#[error("Failed to start the API server")]
pub struct StartServerError;

#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

pub fn run(args: ServerCommand) -> Result<(), StartServerError> {
    dotenvy::dotenv().ok();

    let mut config = config::Server::load().change_context(StartServerError)?;
    args.override_config(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(StartServerError)
        .attach_printable("could not build tokio runtime")?
        .block_on(serve(config))
}

async fn serve(config: config::Server) -> Result<(), StartServerError> {
    let app = App::new(config).await.change_context(StartServerError)?;
    database::migrations::run_pending(&app.primary_db)
        .await
        .change_context(StartServerError)?;

    app.media_store
        .init()
        .await
        .change_context(StartServerError)?;

    let addr = (app.config.ip, app.config.port);
    let workers = app.config.workers.get();
    info!("starting HTTP server on {}:{}", addr.0, addr.1);

    HttpServer::new({
        let app = app.clone();
        move || {
            actix_web::App::new()
                .app_data(web::Data::new(app.clone()))
                .wrap(TracingLogger::default())
                .configure(http::controllers::configure)
        }
    })
    .workers(workers)
    .bind(addr)
    .change_context(StartServerError)
    .attach_printable("could not bind to the configured address")?
    .run()
    .await
    .change_context(StartServerError)
}

impl ServerCommand {
    fn override_config(&self, config: &mut config::Server) {
        // cli flags win over the file and the environment
        if let Some(address) = self.address {
            config.ip = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}
