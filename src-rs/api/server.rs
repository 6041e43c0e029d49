use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::api::handlers::{
    handle_clear_history, handle_convert, handle_copy_section, handle_credential_status,
    handle_current_result, handle_dismiss_result, handle_fill, handle_health, handle_history,
    handle_remove_credential, handle_save_credential, handle_select_history, AppState,
};
use crate::converter::Converter;
use crate::injector::Injector;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/credential",
            get(handle_credential_status)
                .put(handle_save_credential)
                .delete(handle_remove_credential),
        )
        .route("/convert", post(handle_convert))
        .route("/history", get(handle_history).delete(handle_clear_history))
        .route("/history/:index", post(handle_select_history))
        .route("/result", get(handle_current_result).delete(handle_dismiss_result))
        .route("/result/copy/:section", get(handle_copy_section))
        .route("/fill", post(handle_fill))
        .with_state(state)
}

pub struct ConverterServer {
    pub port: u16,
    pub state: AppState,
}

impl ConverterServer {
    pub fn new(port: u16, converter: Converter, injector: Injector) -> Self {
        Self {
            port,
            state: AppState {
                converter: Arc::new(Mutex::new(converter)),
                injector: Arc::new(injector),
            },
        }
    }

    pub async fn start(&self) -> Result<(), String> {
        let app = build_router(self.state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "task converter listening");
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}
