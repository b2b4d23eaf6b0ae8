use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use env_logger::Env;
use log::{error, info};
use portal::config::Config;
use portal::db::Db;
use portal::state::AppState;
use portal::{configure_app, uploads};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    uploads::prepare_folders(&config)?;
    let db = Db::open(&config.database_path).map_err(|e| {
        error!("could not open the database: {}", e);
        io::Error::other(e.to_string())
    })?;

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::new(config, db);

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure_app(state.clone()))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
