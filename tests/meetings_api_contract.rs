use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bson::{Document, oid::ObjectId};
use http_body_util::BodyExt;
use meetings_service::{
    application::meeting_service::MeetingService,
    build_router,
    state::AppState,
    store::{
        DocumentCollection, DocumentStoreHandler, InMemoryCollection, Query, SortSpec,
        StoreResult,
    },
    transcription::{AudioClip, Transcriber, TranscriptionError, UploadSpool},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "meetings-contract-boundary";

/// Transcriber double that echoes the file name and byte count.
#[derive(Default)]
struct EchoTranscriber {
    calls: AtomicUsize,
}

#[async_trait]
impl Transcriber for EchoTranscriber {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} ({} bytes)", clip.file_name, clip.bytes.len()))
    }
}

struct RejectingTranscriber;

#[async_trait]
impl Transcriber for RejectingTranscriber {
    async fn transcribe(&self, _clip: AudioClip) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::Rejected {
            status: 415,
            body: "unsupported audio".into(),
        })
    }
}

/// Collection whose inserts succeed but are never visible to reads.
struct InvisibleWritesCollection;

#[async_trait]
impl DocumentCollection for InvisibleWritesCollection {
    fn name(&self) -> &str {
        "invisible_writes"
    }

    async fn insert_one(&self, _document: Document) -> StoreResult<ObjectId> {
        Ok(ObjectId::new())
    }

    async fn find_one(&self, _query: &Query) -> StoreResult<Option<Document>> {
        Ok(None)
    }

    async fn find_window(
        &self,
        _query: &Query,
        _sort: &SortSpec,
        _skip: u64,
        _limit: u64,
    ) -> StoreResult<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn count(&self, _query: &Query) -> StoreResult<u64> {
        Ok(0)
    }

    async fn replace_one(&self, _query: &Query, _replacement: Document) -> StoreResult<u64> {
        Ok(0)
    }

    async fn delete_one(&self, _query: &Query) -> StoreResult<u64> {
        Ok(0)
    }
}

fn app_with(transcriber: Arc<dyn Transcriber>) -> (Router, TempDir) {
    app_over(
        Arc::new(InMemoryCollection::new("meetings_collection")),
        transcriber,
    )
}

fn app_over(
    collection: Arc<dyn DocumentCollection>,
    transcriber: Arc<dyn Transcriber>,
) -> (Router, TempDir) {
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let store = DocumentStoreHandler::new(collection);
    let service = Arc::new(MeetingService::new(
        store,
        transcriber,
        UploadSpool::new(uploads.path()),
    ));
    (build_router(AppState::new(service)), uploads)
}

async fn request_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(request)
        .await
        .expect("router should serve request");

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();

    if body.is_empty() {
        return (status, Value::Null);
    }

    let value = serde_json::from_slice(&body).expect("body should be valid json");
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid json request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("valid get request")
}

fn multipart_upload(field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/transcribe")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("valid multipart request")
}

fn assert_error_body(body: &Value, expected_status: u16, origin: &str) {
    assert_eq!(
        body.get("http_status_code").and_then(Value::as_u64),
        Some(u64::from(expected_status))
    );
    assert!(body.get("error_code").and_then(Value::as_u64).is_some());
    assert!(body.get("error_description").and_then(Value::as_str).is_some());
    assert_eq!(body.get("error_origin").and_then(Value::as_str), Some(origin));
    assert!(body.get("correlation_id").and_then(Value::as_str).is_some());
}

fn spooled_files(uploads: &TempDir) -> usize {
    std::fs::read_dir(uploads.path())
        .map(|entries| entries.count())
        .unwrap_or(0)
}

fn id_of(meeting: &Value) -> String {
    meeting
        .get("id")
        .and_then(Value::as_str)
        .expect("meeting must include id")
        .to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));
    let (status, body) = request_json(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_meeting_fills_defaults_and_assigns_id() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (status, created) = request_json(
        app.clone(),
        post_json("/meetings", json!({ "title": "Kickoff", "duration": 45 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.get("title").and_then(Value::as_str), Some("Kickoff"));
    assert_eq!(created.get("duration").and_then(Value::as_i64), Some(45));
    assert_eq!(
        created.get("participants"),
        Some(&json!(["Placeholder"]))
    );
    assert_eq!(
        created.get("transcript").and_then(Value::as_str),
        Some("Placeholder")
    );
    assert_eq!(id_of(&created).len(), 24);

    let (status, fetched) =
        request_json(app, get(&format!("/meetings/{}", id_of(&created)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_meeting_rejects_invalid_fields() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (status, problem) =
        request_json(app, post_json("/meetings", json!({ "duration": -5 }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&problem, 422, "routes/meetings");
}

#[tokio::test]
async fn list_meetings_pages_in_insertion_order() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let mut ids = Vec::new();
    for title in ["A", "B", "C"] {
        let (status, created) =
            request_json(app.clone(), post_json("/meetings", json!({ "title": title }))).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(id_of(&created));
    }

    let (status, first) = request_json(app.clone(), get("/meetings?page=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first.get("page_count").and_then(Value::as_u64), Some(2));
    assert_eq!(first.get("total_count").and_then(Value::as_u64), Some(3));
    let first_ids = first
        .get("items")
        .and_then(Value::as_array)
        .expect("items array")
        .iter()
        .map(id_of)
        .collect::<Vec<_>>();
    assert_eq!(first_ids, ids[..2].to_vec());

    let (status, second) = request_json(app.clone(), get("/meetings?page=2&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let second_ids = second
        .get("items")
        .and_then(Value::as_array)
        .expect("items array")
        .iter()
        .map(id_of)
        .collect::<Vec<_>>();
    assert_eq!(second_ids, ids[2..].to_vec());

    let (status, sorted) =
        request_json(app.clone(), get("/meetings?sort_by=title&order=desc")).await;
    assert_eq!(status, StatusCode::OK);
    let titles = sorted
        .get("items")
        .and_then(Value::as_array)
        .expect("items array")
        .iter()
        .filter_map(|item| item.get("title").and_then(Value::as_str))
        .collect::<Vec<_>>();
    assert_eq!(titles, ["C", "B", "A"]);

    let (status, filtered) = request_json(app, get("/meetings?title=B")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered.get("total_count").and_then(Value::as_u64), Some(1));
}

#[tokio::test]
async fn list_meetings_on_empty_store_has_no_pages() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (status, page) = request_json(app, get("/meetings?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.get("items"), Some(&json!([])));
    assert_eq!(page.get("page_count").and_then(Value::as_u64), Some(0));
    assert_eq!(page.get("total_count").and_then(Value::as_u64), Some(0));
}

#[tokio::test]
async fn list_meetings_rejects_invalid_paging() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    for uri in [
        "/meetings?limit=0",
        "/meetings?limit=-3",
        "/meetings?page=0",
        "/meetings?page=3&limit=9223372036854775807",
    ] {
        let (status, problem) = request_json(app.clone(), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_error_body(&problem, 400, "routes/meetings");
        assert_eq!(problem.get("error_code").and_then(Value::as_u64), Some(4));
    }
}

#[tokio::test]
async fn malformed_query_and_body_use_error_body_shape() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (status, problem) = request_json(app.clone(), get("/meetings?page=abc")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&problem, 422, "routes/meetings");

    let (status, problem) = request_json(
        app.clone(),
        post_json("/meetings", json!({ "duration": "long" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&problem, 422, "routes/meetings");

    let (status, problem) = request_json(
        app,
        Request::builder()
            .method("POST")
            .uri("/meetings")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("valid raw request"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&problem, 422, "routes/meetings");
}

#[tokio::test]
async fn create_without_read_back_is_a_bad_request() {
    let (app, _uploads) = app_over(
        Arc::new(InvisibleWritesCollection),
        Arc::new(EchoTranscriber::default()),
    );

    let (status, problem) =
        request_json(app, post_json("/meetings", json!({ "title": "Lost" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&problem, 400, "routes/meetings");
    assert_eq!(problem.get("error_code").and_then(Value::as_u64), Some(3));
}

#[tokio::test]
async fn update_and_delete_meeting_by_id() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (_, created) =
        request_json(app.clone(), post_json("/meetings", json!({ "title": "Draft" }))).await;
    let id = id_of(&created);

    let (status, updated) = request_json(
        app.clone(),
        Request::builder()
            .method("PUT")
            .uri(format!("/meetings/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "title": "Final",
                    "date": "2024-05-05T12:00:00",
                    "duration": 60,
                    "participants": ["ana", "ben"],
                    "transcript": "t",
                    "summary": "s"
                })
                .to_string(),
            ))
            .expect("valid update request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&updated), id);
    assert_eq!(updated.get("title").and_then(Value::as_str), Some("Final"));
    assert_eq!(updated.get("participants"), Some(&json!(["ana", "ben"])));

    let delete = |id: String| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/meetings/{id}"))
            .body(Body::empty())
            .expect("valid delete request")
    };

    let (status, body) = request_json(app.clone(), delete(id.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, problem) = request_json(app.clone(), delete(id.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_body(&problem, 404, "routes/meetings");

    let (status, _) = request_json(app, get(&format!("/meetings/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_missing_meeting_is_not_found() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (status, problem) = request_json(
        app,
        Request::builder()
            .method("PUT")
            .uri("/meetings/0123456789abcdef01234567")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "title": "Ghost" }).to_string()))
            .expect("valid update request"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_body(&problem, 404, "routes/meetings");
}

#[tokio::test]
async fn malformed_id_is_a_validation_error() {
    let (app, _uploads) = app_with(Arc::new(EchoTranscriber::default()));

    let (status, problem) = request_json(app, get("/meetings/not-an-object-id")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&problem, 422, "routes/meetings");
}

#[tokio::test]
async fn transcribe_stores_meeting_with_transcript() {
    let transcriber = Arc::new(EchoTranscriber::default());
    let (app, uploads) = app_with(transcriber.clone());

    let (status, created) =
        request_json(app.clone(), multipart_upload("file", "standup.wav", b"RIFFdata")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created.get("transcript").and_then(Value::as_str),
        Some("standup.wav (8 bytes)")
    );
    assert_eq!(created.get("title").and_then(Value::as_str), Some("Placeholder"));
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);

    assert_eq!(spooled_files(&uploads), 0);

    let (status, fetched) =
        request_json(app, get(&format!("/meetings/{}", id_of(&created)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn transcribe_requires_file_part() {
    let transcriber = Arc::new(EchoTranscriber::default());
    let (app, _uploads) = app_with(transcriber.clone());

    let (status, problem) =
        request_json(app, multipart_upload("audio", "standup.wav", b"RIFF")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&problem, 422, "routes/transcribe");
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transcriber_failure_is_a_bad_gateway() {
    let (app, uploads) = app_with(Arc::new(RejectingTranscriber));

    let (status, problem) =
        request_json(app.clone(), multipart_upload("file", "noise.bin", b"\x00\x01")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_error_body(&problem, 502, "routes/transcribe");
    assert_eq!(spooled_files(&uploads), 0);

    let (_, page) = request_json(app, get("/meetings")).await;
    assert_eq!(page.get("total_count").and_then(Value::as_u64), Some(0));
}
