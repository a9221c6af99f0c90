//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::domain::EngagementService;
use crate::domain::ports::InMemoryEngagementRepository;
use crate::inbound::http::health::{health, live};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tracking::{click_redirect, open_pixel};
use crate::outbound::persistence::DieselEngagementRepository;

/// Build the handler state from the configuration.
///
/// A configured pool selects the Diesel-backed store; otherwise the
/// in-memory store serves the same contract without persistence, keeping
/// the pixel and redirect responses deterministic under storage outage.
fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => {
            let repository = Arc::new(DieselEngagementRepository::new(pool.clone()));
            let recorder = Arc::new(EngagementService::new(
                repository.clone(),
                config.signatures.clone(),
            ));
            HttpState::new(recorder, repository)
        }
        None => {
            let repository = Arc::new(InMemoryEngagementRepository::default());
            let recorder = Arc::new(EngagementService::new(
                repository.clone(),
                config.signatures.clone(),
            ));
            HttpState::new(recorder, repository)
        }
    }
}

fn build_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .service(open_pixel)
        .service(click_redirect)
        .service(health)
        .service(live)
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(build_http_state(&config));

    let server = HttpServer::new(move || build_app(state.clone()))
        .bind(config.bind_addr)?
        .run();

    Ok(server)
}
