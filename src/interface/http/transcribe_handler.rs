use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    application::dto::MeetingResponse,
    interface::http::problem::{ApiProblem, ApiResult},
    state::AppState,
    transcription::AudioClip,
};

const ORIGIN: &str = "routes/transcribe";
const FILE_FIELD: &str = "file";

pub async fn transcribe_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MeetingResponse>)> {
    let mut clip = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiProblem::validation(format!("invalid multipart body: {err}"), ORIGIN))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|err| {
            ApiProblem::validation(format!("failed to read uploaded file: {err}"), ORIGIN)
        })?;

        clip = Some(AudioClip {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let Some(clip) = clip else {
        return Err(ApiProblem::validation(
            "multipart body must include a `file` part",
            ORIGIN,
        ));
    };
    if clip.bytes.is_empty() {
        return Err(ApiProblem::validation("uploaded file is empty", ORIGIN));
    }

    let created = state
        .meeting_service
        .transcribe_meeting(clip)
        .await
        .map_err(|err| ApiProblem::from_domain(err, ORIGIN))?;

    Ok((StatusCode::CREATED, Json(created)))
}
