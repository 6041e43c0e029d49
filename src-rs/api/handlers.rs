use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::channel::InjectorChannel;
use crate::converter::{deliver_fill, Converter};
use crate::error::ConverterError;
use crate::injector::{Injector, MemoryDocument};
use crate::task::{ConversionRecord, GeneratedTask};

#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Mutex<Converter>>,
    pub injector: Arc<Injector>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub task: Option<GeneratedTask>,
    pub message: String,
    pub error: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub key: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FillPageRequest {
    pub tab_url: String,
    pub page: MemoryDocument,
}

#[derive(Debug, Serialize)]
pub struct FillPageResponse {
    pub success: bool,
    pub message: String,
    pub code: Option<String>,
    pub page: MemoryDocument,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn status_for(err: &ConverterError) -> StatusCode {
    match err {
        ConverterError::InvalidInput { .. } | ConverterError::NotTargetPage(_) => StatusCode::BAD_REQUEST,
        ConverterError::ServiceError(_) | ConverterError::NetworkError(_) => StatusCode::BAD_GATEWAY,
        ConverterError::TargetNotFound => StatusCode::NOT_FOUND,
        ConverterError::ChannelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ConverterError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: ConverterError) -> ApiError {
    (
        status_for(&err),
        Json(json!({
            "error": err.to_string(),
            "code": err.code(),
            "message": err.user_message(),
        })),
    )
}

fn lock_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "converter lock error"})),
    )
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_credential_status(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    let saved = converter.credential().map_err(api_error)?.is_some();
    Ok(Json(json!({"saved": saved})))
}

pub async fn handle_save_credential(
    State(state): State<AppState>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    converter.save_credential(&req.key).map_err(api_error)?;
    Ok(Json(json!({"saved": true, "message": "API key saved successfully!"})))
}

pub async fn handle_remove_credential(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    converter.remove_credential().map_err(api_error)?;
    Ok(Json(json!({"saved": false, "message": "API key removed"})))
}

pub async fn handle_convert(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Json<ConvertResponse> {
    let converter = state.converter.clone();
    let result = tokio::task::spawn_blocking(move || {
        let converter = converter.lock().map_err(|_| "converter lock error".to_string())?;
        Ok::<_, String>(converter.convert_stored(&req.text))
    })
    .await;

    match result {
        Ok(Ok(Ok(task))) => Json(ConvertResponse {
            success: true,
            task: Some(task),
            message: "Task generated successfully!".to_string(),
            error: None,
            code: None,
        }),
        Ok(Ok(Err(err))) => Json(ConvertResponse {
            success: false,
            task: None,
            message: err.user_message(),
            error: Some(err.to_string()),
            code: Some(err.code().to_string()),
        }),
        Ok(Err(err)) => Json(failed_convert(err)),
        Err(err) => Json(failed_convert(err.to_string())),
    }
}

fn failed_convert(error: String) -> ConvertResponse {
    ConvertResponse {
        success: false,
        task: None,
        message: "An error occurred while generating the task.".to_string(),
        error: Some(error),
        code: None,
    }
}

pub async fn handle_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    let mut items: Vec<ConversionRecord> = converter.history().map_err(api_error)?;
    if let Some(limit) = query.limit {
        items.truncate(limit);
    }
    Ok(Json(json!({"history": items})))
}

pub async fn handle_clear_history(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    converter.clear_history().map_err(api_error)?;
    Ok(Json(json!({"message": "History cleared"})))
}

pub async fn handle_select_history(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    match converter.select_history(index).map_err(api_error)? {
        Some(record) => Ok(Json(json!({"result": record}))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("no history entry {}", index)})),
        )),
    }
}

pub async fn handle_current_result(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    let current = converter.current_result().map_err(api_error)?;
    Ok(Json(json!({"result": current})))
}

pub async fn handle_dismiss_result(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    converter.dismiss_result().map_err(api_error)?;
    Ok(Json(json!({"result": null})))
}

pub async fn handle_copy_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<String, ApiError> {
    let converter = state.converter.lock().map_err(|_| lock_error())?;
    converter.copy_section(&section).map_err(api_error)
}

pub async fn handle_fill(
    State(state): State<AppState>,
    Json(req): Json<FillPageRequest>,
) -> Result<Json<FillPageResponse>, ApiError> {
    if let Err(err) = req.page.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string(), "code": "invalid_page"})),
        ));
    }

    let AppState { converter, injector } = state;
    let result = tokio::task::spawn_blocking(move || {
        let mut page = req.page;
        let prepared = match converter.lock() {
            Ok(converter) => converter
                .prepare_fill(&req.tab_url)
                .map(|command| (command, converter.config.ready_delay)),
            Err(_) => Err(ConverterError::ServiceError("converter lock error".to_string())),
        };
        // The lock is released before waiting on the page.
        let outcome = prepared.and_then(|(command, ready_delay)| {
            if !ready_delay.is_zero() {
                std::thread::sleep(ready_delay);
            }
            let mut channel = InjectorChannel::new(&injector, &mut page);
            deliver_fill(&req.tab_url, &command, &mut channel)
        });
        (outcome, page)
    })
    .await;

    let response = match result {
        Ok((Ok(message), page)) => FillPageResponse {
            success: true,
            message,
            code: None,
            page,
        },
        Ok((Err(err), page)) => FillPageResponse {
            success: false,
            message: err.user_message(),
            code: Some(err.code().to_string()),
            page,
        },
        Err(err) => FillPageResponse {
            success: false,
            message: err.to_string(),
            code: None,
            page: MemoryDocument::default(),
        },
    };
    Ok(Json(response))
}
