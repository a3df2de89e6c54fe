use axum::{
    extract::{
        multipart::Multipart,
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, FromRequest, Query, Request, State,
    },
    http::header::CONTENT_TYPE,
    routing::{get, post},
    Json, Router,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::AppError;
use super::models::{
    HealthResponse, ProcessRequest, ProcessResponse, TestDateRequest, TestDateResponse,
};
use crate::adapters::source::{LocalFileSource, UploadedFileSource};
use crate::core::processor::CsvProcessor;
use crate::core::RunSummary;
use crate::utils::error::Result;

const UPLOAD_FIELD: &str = "csvfile";
const NO_INPUT_MESSAGE: &str =
    "No file provided. Either upload a file or provide filePath in request body.";

pub struct AppState {
    pub processor: CsvProcessor,
    pub upload_dir: PathBuf,
}

impl AppState {
    /// 上傳目錄不存在時建立
    pub fn new(processor: CsvProcessor, upload_dir: impl Into<PathBuf>) -> Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            processor,
            upload_dir,
        })
    }
}

/// 單次請求的輸入，上傳檔案優先於 filePath
enum ProcessInput {
    Upload(UploadedFileSource),
    Path(LocalFileSource),
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "CSV Processor API is running!",
    })
}

pub async fn process_csv(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> std::result::Result<Json<ProcessResponse>, AppError> {
    tracing::info!("📥 Starting CSV processing...");

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let (input, window_days) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        read_multipart(multipart, &state.upload_dir).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<ProcessRequest>::from_request(request, &state)
            .await
            .map_err(|e: JsonRejection| AppError::bad_request(e.body_text()))?;
        let input = body
            .file_path
            .filter(|p| !p.trim().is_empty())
            .map(|p| ProcessInput::Path(LocalFileSource::new(p)));
        (input, body.window_days)
    } else {
        (None, None)
    };

    let input = input.ok_or_else(|| AppError::bad_request(NO_INPUT_MESSAGE))?;

    // 處理器 future 被丟棄（客戶端斷線）時 guard 會取消這次執行
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let summary = run(&state.processor, input, window_days, cancel).await;
    guard.disarm();

    Ok(Json(ProcessResponse::success(summary?)))
}

async fn run(
    processor: &CsvProcessor,
    input: ProcessInput,
    window_days: Option<u32>,
    cancel: CancellationToken,
) -> std::result::Result<RunSummary, AppError> {
    let summary = match input {
        ProcessInput::Upload(source) => {
            tracing::info!(
                "📤 Processing uploaded file: {}",
                source.original_name().unwrap_or("<unnamed>")
            );
            processor.process(source, window_days, cancel).await?
        }
        ProcessInput::Path(source) => {
            tracing::info!("📂 Processing file from path: {}", source.path().display());
            source.ensure_exists()?;
            processor.process(source, window_days, cancel).await?
        }
    };
    Ok(summary)
}

async fn read_multipart(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> std::result::Result<(Option<ProcessInput>, Option<u32>), AppError> {
    let mut upload = None;
    let mut file_path = None;
    let mut window_days = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            UPLOAD_FIELD => {
                let original_name = field.file_name().map(str::to_string);
                let mut temp = tempfile::Builder::new()
                    .prefix("upload-")
                    .suffix(".csv")
                    .tempfile_in(upload_dir)?;

                let mut written = 0usize;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?
                {
                    temp.write_all(&chunk)?;
                    written += chunk.len();
                }
                temp.flush()?;

                tracing::debug!(
                    "📤 Received upload {:?} ({} bytes) at {}",
                    original_name,
                    written,
                    temp.path().display()
                );
                upload = Some(UploadedFileSource::new(temp, original_name));
            }
            "filePath" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                if !text.trim().is_empty() {
                    file_path = Some(text);
                }
            }
            "windowDays" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                let days = text
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| AppError::bad_request(format!("Invalid windowDays: {}", text)))?;
                window_days = Some(days);
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let input = match (upload, file_path) {
        (Some(upload), _) => Some(ProcessInput::Upload(upload)),
        (None, Some(path)) => Some(ProcessInput::Path(LocalFileSource::new(path))),
        (None, None) => None,
    };
    Ok((input, window_days))
}

pub async fn test_date_query(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<TestDateRequest>, QueryRejection>,
) -> std::result::Result<Json<TestDateResponse>, AppError> {
    let Query(request) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(test_date(&state.processor, request)))
}

pub async fn test_date_json(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<TestDateRequest>, JsonRejection>,
) -> std::result::Result<Json<TestDateResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(test_date(&state.processor, request)))
}

fn test_date(processor: &CsvProcessor, request: TestDateRequest) -> TestDateResponse {
    let window_days = request
        .window_days
        .unwrap_or_else(|| processor.default_window());
    let matches = processor.test_date(&request.date_string, window_days);

    tracing::debug!(
        "📅 test-date '{}' within {} days: {}",
        request.date_string,
        window_days,
        matches
    );

    TestDateResponse {
        date_string: request.date_string,
        window_days,
        reference_date: CsvProcessor::today(),
        matches,
    }
}

// Define all API routes
pub fn routes(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/process-csv", post(process_csv))
        .route("/test-date", get(test_date_query).post(test_date_json))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
