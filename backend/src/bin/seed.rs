use env_logger::Env;
use log::{error, info};
use portal::config::Config;
use portal::db::seed::{self, AdminSeed};
use portal::db::Db;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut admin = AdminSeed::default();
    if let Ok(username) = env::var("ADMIN_USERNAME") {
        admin.username = username;
    }
    if let Ok(password) = env::var("ADMIN_PASSWORD") {
        admin.password = password;
    }
    if let Ok(email) = env::var("ADMIN_EMAIL") {
        admin.email = email;
    }

    let outcome = Db::open(&config.database_path)
        .and_then(|db| db.transact(|tx| seed::run(tx, &admin, config.bcrypt_cost)));
    match outcome {
        Ok(report) => {
            if report.admin_created {
                info!("log in as '{}' with the configured password", admin.username);
            }
            info!("database seeded successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("seeding failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
