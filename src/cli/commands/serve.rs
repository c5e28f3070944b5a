//! HTTP API server for integration with other systems.
//!
//! Exposes the core operations as REST endpoints: ingestion, chat,
//! flashcard and quiz generation, and document listing.

use crate::cli::Output;
use crate::config::Settings;
use crate::generate::GenerationOutcome;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings.clone())?;

    let state = Arc::new(AppState {
        orchestrator,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/chat", post(chat))
        .route("/flashcards", post(generate_flashcards))
        .route("/quiz", post(generate_quiz))
        .route("/documents", get(list_documents))
        .route("/documents/{file_id}", get(get_document))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Terp API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Chat", "POST /chat");
    Output::kv("Flashcards", "POST /flashcards");
    Output::kv("Quiz", "POST /quiz");
    Output::kv("List Documents", "GET  /documents");
    Output::kv("Get Document", "GET  /documents/:file_id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    /// Path to the PDF file on the server
    path: String,
    /// Document id (defaults to the file stem)
    #[serde(default)]
    id: Option<String>,
    /// Force re-ingestion even if already indexed
    #[serde(default)]
    force: bool,
    /// Acting user (defaults to the configured principal)
    #[serde(default)]
    user: Option<String>,
}

#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    file_id: String,
    file_name: String,
    chunks_indexed: usize,
    skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChatRequest {
    document_id: String,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
    citations: Vec<usize>,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_number: Option<u32>,
    content: String,
}

#[derive(Deserialize)]
struct GenerateRequest {
    document_id: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentInfo>,
    total: usize,
}

#[derive(Serialize)]
struct DocumentInfo {
    file_id: String,
    file_name: String,
    chunk_count: u32,
}

#[derive(Serialize)]
struct DocumentDetailResponse {
    file_id: String,
    file_name: String,
    chunk_count: usize,
    flashcard_count: usize,
    quiz_question_count: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    let owner = match state.settings.resolve_principal(req.user.as_deref()) {
        Ok(owner) => owner,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state
        .orchestrator
        .ingest_document(Path::new(&req.path), req.id, &owner, req.force)
        .await
    {
        Ok(result) => Json(IngestResponse {
            success: true,
            file_id: result.file_id,
            file_name: result.file_name,
            chunks_indexed: result.chunks_indexed,
            skipped: result.skipped,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(IngestResponse {
                success: false,
                file_id: String::new(),
                file_name: String::new(),
                chunks_indexed: 0,
                skipped: false,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    // Chat never fails; internal errors come back as displayable answers
    let reply = state.orchestrator.chat(&req.document_id, &req.message).await;

    Json(ChatResponse {
        citations: reply.citations(),
        sources: reply
            .sources
            .iter()
            .enumerate()
            .map(|(i, source)| SourceInfo {
                index: i + 1,
                page_number: source.page_number,
                content: source.content.clone(),
            })
            .collect(),
        answer: reply.answer,
    })
}

async fn generate_flashcards(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let owner = match state.settings.resolve_principal(req.user.as_deref()) {
        Ok(owner) => owner,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state
        .orchestrator
        .generate_flashcards(&req.document_id, &owner)
        .await
    {
        Ok(GenerationOutcome::Generated(count)) => Json(GenerateResponse {
            status: "generated",
            count: Some(count),
        })
        .into_response(),
        Ok(GenerationOutcome::SkippedExisting) => Json(GenerateResponse {
            status: "skipped",
            count: None,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let owner = match state.settings.resolve_principal(req.user.as_deref()) {
        Ok(owner) => owner,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state
        .orchestrator
        .generate_quiz(&req.document_id, &owner)
        .await
    {
        Ok(GenerationOutcome::Generated(count)) => Json(GenerateResponse {
            status: "generated",
            count: Some(count),
        })
        .into_response(),
        Ok(GenerationOutcome::SkippedExisting) => Json(GenerateResponse {
            status: "skipped",
            count: None,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn list_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.vector_store().list_documents().await {
        Ok(documents) => Json(DocumentListResponse {
            total: documents.len(),
            documents: documents
                .into_iter()
                .map(|d| DocumentInfo {
                    file_id: d.file_id,
                    file_name: d.file_name,
                    chunk_count: d.chunk_count,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn get_document(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(file_id): axum::extract::Path<String>,
) -> impl IntoResponse {
    let store = state.orchestrator.sqlite_store();

    let chunks = match state.orchestrator.vector_store().get_by_file_id(&file_id).await {
        Ok(chunks) => chunks,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let record = match store.get_document(&file_id) {
        Ok(record) => record,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    if chunks.is_empty() && record.is_none() {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Document not found: {}", file_id),
        );
    }

    let flashcard_count = store
        .flashcards_by_file_id(&file_id)
        .map(|cards| cards.len())
        .unwrap_or(0);
    let quiz_question_count = store.quiz_question_count(&file_id).unwrap_or(0);

    let file_name = record
        .map(|r| r.file_name)
        .unwrap_or_else(|| file_id.clone());

    Json(DocumentDetailResponse {
        file_id,
        file_name,
        chunk_count: chunks.len(),
        flashcard_count,
        quiz_question_count,
    })
    .into_response()
}
