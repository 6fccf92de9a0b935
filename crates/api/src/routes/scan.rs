//! POST /api/v1/scan -- upload a video, stream back screening progress.
//!
//! The response body is newline-delimited JSON: one event per line,
//! forwarded from the pipeline as it runs. The connection stays open
//! until the terminal `complete` or `error` event.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use framegate_events::ChannelSink;
use framegate_pipeline::VideoJob;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/scan", post(scan))
}

async fn scan(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .unwrap_or("upload.mp4")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
            upload = Some((filename, data));
        }
    }

    let (filename, data) = upload
        .ok_or_else(|| AppError::BadRequest("no file field in upload".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("uploaded file is empty".into()));
    }

    let job = VideoJob::new(filename, data);
    tracing::info!(job_id = %job.id, filename = %job.filename, size = job.size(), "Scan started");

    // Events flow pipeline -> channel -> response body. If the client
    // disconnects, the sink reports closed and the job logs it; the
    // pipeline itself runs to completion either way.
    let (tx, rx) = mpsc::channel::<Bytes>(64);
    let sink = ChannelSink::new(tx);
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run(job, &sink).await {
            tracing::error!(error = %e, "Screening job failed");
        }
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Response::builder()
        .header(CONTENT_TYPE, "application/x-ndjson")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))
}
