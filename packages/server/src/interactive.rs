//! Interactive mode for the server.
//!
//! Prompts the user for bind address and port before serving a dataset
//! cache that is already loaded.

use std::sync::Arc;

use dialoguer::{Confirm, Input};
use income_crime_dataset::DatasetCache;

use crate::{ServerConfig, ServerError};

/// Serves `cache` after prompting for the listen address.
///
/// The prompts are pre-filled from `BIND_ADDR` and `PORT` (or the
/// defaults), then delegates to [`super::run_server_with`].
///
/// # Errors
///
/// Returns [`ServerError`] if the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(cache: Arc<DatasetCache>) -> Result<(), ServerError> {
    let defaults = ServerConfig::from_env();

    println!("Income vs Crime Dashboard Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server_with(cache, ServerConfig { bind_addr, port }).await
}
