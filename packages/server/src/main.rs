#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the income vs crime dashboard.
//!
//! Listens on `BIND_ADDR`:`PORT` (default `127.0.0.1:8080`) and serves the
//! dataset configured through `INCOME_CRIME_CONFIG`,
//! `INCOME_CRIME_DATASET` and `INCOME_CRIME_TABLE`.

use income_crime_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    run_server(ServerConfig::from_env()).await?;
    Ok(())
}
