//! HTTP request handlers for the journal API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::{JournalRequest, WorkbookFormat, run_journal};

use super::request::JournalApiRequest;
use super::response::{ApiError, ApiErrorResponse, HealthResponse, JournalApiResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/journal", post(journal_handler))
        .with_state(state)
}

/// Handler for GET / endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "API is up".to_string(),
    })
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Handler for POST /journal endpoint.
///
/// Reads the payroll sheet named in the request and writes the journal
/// workbook into a directory of its own under the configured output
/// directory.
async fn journal_handler(
    State(state): State<AppState>,
    payload: Result<Json<JournalApiRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing journal request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let journal_request: JournalRequest = request.into();

    if let Err(err) = WorkbookFormat::from_file_name(&journal_request.upload_name()) {
        warn!(
            correlation_id = %correlation_id,
            error = %err,
            "Unsupported workbook type"
        );
        let api_error: ApiErrorResponse = err.into();
        return json_response(api_error.status, api_error.error);
    }

    if !journal_request.input_path.is_file() {
        warn!(
            correlation_id = %correlation_id,
            input = %journal_request.input_path.display(),
            "Input workbook not found"
        );
        return json_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error(format!(
                "input_path '{}' is not a readable file",
                journal_request.input_path.display()
            )),
        );
    }

    let output_dir = state.output_dir().join(correlation_id.to_string());
    let converter = state.converter();

    let outcome = tokio::task::spawn_blocking(move || {
        run_journal(&journal_request, &output_dir, converter.as_deref())
    })
    .await;

    match outcome {
        Ok(Ok(output)) => {
            info!(
                correlation_id = %correlation_id,
                file = %output.file_name,
                lines = output.batch.lines.len(),
                "Journal request completed"
            );
            json_response(StatusCode::OK, JournalApiResponse::from(output))
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Journal request failed"
            );
            let api_error: ApiErrorResponse = err.into();
            json_response(api_error.status, api_error.error)
        }
        Err(join_error) => {
            warn!(
                correlation_id = %correlation_id,
                error = %join_error,
                "Journal task aborted"
            );
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(join_error.to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, ServerConfig, ServiceConfig, WorkspaceConfig};
    use axum::body::Body;
    use axum::http::Request;
    use rust_xlsxwriter::Workbook;
    use serde_json::Value;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_state(output_dir: &Path) -> AppState {
        AppState::new(ConfigLoader::from_config(ServiceConfig {
            server: ServerConfig::default(),
            workspace: WorkspaceConfig {
                output_dir: output_dir.to_path_buf(),
            },
            converter: None,
        }))
    }

    fn write_payroll(dir: &Path) -> PathBuf {
        let path = dir.join("payroll.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Payroll").unwrap();
        for (col, header) in ["Employee", "Department Code", "Total Basic Salary", "Monthly Food"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        let rows = [("Ann", 3003.0, 1000.0, 100.0), ("Bob", 3003.0, 2000.0, 0.0), ("Cid", 9999.0, 1500.0, 50.0)];
        for (i, (name, dept, basic, food)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *name).unwrap();
            sheet.write_number(row, 1, *dept).unwrap();
            sheet.write_number(row, 2, *basic).unwrap();
            sheet.write_number(row, 3, *food).unwrap();
        }
        workbook.save(&path).unwrap();
        path
    }

    fn journal_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/journal")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "API is up");
    }

    #[tokio::test]
    async fn test_plain_journal_returns_200() {
        let dir = TempDir::new().unwrap();
        let input = write_payroll(dir.path());
        let output_dir = dir.path().join("out");
        let router = create_router(create_test_state(&output_dir));

        let body = serde_json::json!({
            "input_path": input,
            "sheet_name": "Payroll",
            "posting_date": "15/01/24",
            "journal_code": "PAYJV"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = body_json(response).await;
        assert_eq!(body["file_name"], "processed_output.xlsx");
        assert_eq!(body["line_count"], 4);
        assert_eq!(body["departments"], 2);
        assert!(body.get("sheet_name").is_none());
        assert_eq!(body["lines"][0]["department"], "3003");
        assert_eq!(body["lines"][0]["description"], "MONTHLY FOOD JANUARY 2024");
        assert_eq!(body["lines"][0]["account_number"], "640140");
        let output_path = PathBuf::from(body["output_path"].as_str().unwrap());
        assert!(output_path.starts_with(&output_dir));
        assert!(output_path.is_file());
    }

    #[tokio::test]
    async fn test_preserve_mode_names_output_after_upload() {
        let dir = TempDir::new().unwrap();
        let input = write_payroll(dir.path());
        let router = create_router(create_test_state(&dir.path().join("out")));

        let body = serde_json::json!({
            "input_path": input,
            "sheet_name": "Payroll",
            "posting_date": "28/02/25",
            "journal_code": "PAYJV",
            "preserve_formatting": true,
            "file_name": "February Payroll.xlsx"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["file_name"], "February Payroll_with_JV_Feb_2025.xlsx");
        assert_eq!(body["sheet_name"], "JV Feb 2025");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let response = router
            .oneshot(journal_request("{invalid json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let body = r#"{"input_path": "/tmp/x.xlsx", "sheet_name": "Payroll"}"#;
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("missing field"));
    }

    #[tokio::test]
    async fn test_missing_input_file_returns_400() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let body = serde_json::json!({
            "input_path": dir.path().join("nowhere.xlsx"),
            "sheet_name": "Payroll",
            "posting_date": "15/01/24",
            "journal_code": "PAYJV"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_file_type_checked_before_existence() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let body = serde_json::json!({
            "input_path": "/missing/x.csv",
            "sheet_name": "Payroll",
            "posting_date": "15/01/24",
            "journal_code": "PAYJV"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_unknown_sheet_returns_400() {
        let dir = TempDir::new().unwrap();
        let input = write_payroll(dir.path());
        let router = create_router(create_test_state(dir.path()));

        let body = serde_json::json!({
            "input_path": input,
            "sheet_name": "Salaries",
            "posting_date": "15/01/24",
            "journal_code": "PAYJV"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "SHEET_NOT_FOUND");
        assert_eq!(error.message, "Sheet 'Salaries' not found.");
    }

    #[tokio::test]
    async fn test_bad_date_returns_400() {
        let dir = TempDir::new().unwrap();
        let input = write_payroll(dir.path());
        let router = create_router(create_test_state(dir.path()));

        let body = serde_json::json!({
            "input_path": input,
            "sheet_name": "Payroll",
            "posting_date": "2024-01-15",
            "journal_code": "PAYJV"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "INVALID_DATE_FORMAT");
        assert_eq!(error.message, "Invalid date format. Please use (dd/mm/yy).");
    }

    #[tokio::test]
    async fn test_xls_preserve_without_converter_returns_500() {
        let dir = TempDir::new().unwrap();
        let input = write_payroll(dir.path());
        let router = create_router(create_test_state(dir.path()));

        // A valid workbook uploaded under a legacy name.
        let body = serde_json::json!({
            "input_path": input,
            "sheet_name": "Payroll",
            "posting_date": "15/01/24",
            "journal_code": "PAYJV",
            "preserve_formatting": true,
            "file_name": "legacy.xls"
        });
        let response = router
            .oneshot(journal_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "CONVERSION_FAILED");
    }
}
