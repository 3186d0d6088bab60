//! Helpdesk client demo
//!
//! Logs in with env-supplied credentials, resolves the persisted session,
//! and prints the user's profile and ticket list. Exercises the same flow
//! a mobile presentation layer would drive.
//!
//! Environment:
//! - `HELPDESK_API_URL` / `HELPDESK_AUTH_URL` — backend base URLs
//! - `HELPDESK_USERNAME` / `HELPDESK_PASSWORD` — login credentials
//! - `HELPDESK_DATA_DIR` — credential file location (default `./data`)

use std::sync::Arc;

use anyhow::{Context, Result};
use hd_client::{
    build_http_client, ApiConfig, AuthFlow, FileStore, ProfileService, SessionResolver,
    TicketService,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ApiConfig::from_env();
    let username =
        std::env::var("HELPDESK_USERNAME").context("HELPDESK_USERNAME must be set")?;
    let password =
        std::env::var("HELPDESK_PASSWORD").context("HELPDESK_PASSWORD must be set")?;
    let data_dir = std::env::var("HELPDESK_DATA_DIR").unwrap_or_else(|_| "./data".to_string());

    info!(api = %config.base_url, auth = %config.auth_base_url, "starting helpdesk client");

    let client = build_http_client(&config)?;
    let store = Arc::new(FileStore::new(&data_dir));
    let resolver = Arc::new(SessionResolver::new(store.clone()));

    let auth = AuthFlow::new(client.clone(), config.clone(), store);
    let session = auth.login(&username, &password).await?;
    info!(user_id = %session.user_id, role = ?session.role, "logged in");

    let profiles = ProfileService::new(client.clone(), config.clone(), resolver.clone());
    let profile = profiles.fetch().await?;
    println!(
        "Profile: {} {} <{}>",
        hd_client::display_or_na(&profile.first_name),
        hd_client::display_or_na(&profile.last_name),
        hd_client::display_or_na(&profile.email),
    );

    let tickets = TicketService::new(client, config, resolver);
    let list = tickets.list().await?;
    if list.is_empty() {
        println!("No tickets found.");
    } else {
        println!("{:<30} {:<12} {:<12} {:<12} {}", "Issue", "Status", "Created", "Finished", "Assigned");
        for ticket in &list {
            println!(
                "{:<30} {:<12} {:<12} {:<12} {}",
                ticket.issue,
                ticket.status,
                ticket.date_created_display(),
                ticket.date_finished_display(),
                ticket.assigned_staff_display(),
            );
        }
    }

    Ok(())
}
