use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use bson::oid::ObjectId;

use crate::{
    application::dto::{
        HealthResponse, ListMeetingsQueryRequest, MeetingResponse, PaginatedMeetingsResponse,
    },
    domain::meeting::NewMeeting,
    interface::http::problem::{ApiProblem, ApiResult},
    state::AppState,
};

const ORIGIN: &str = "routes/meetings";

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn create_meeting(
    State(state): State<AppState>,
    payload: Result<Json<NewMeeting>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MeetingResponse>)> {
    let Json(request) = payload.map_err(body_problem)?;
    let created = state
        .meeting_service
        .create_meeting(request)
        .await
        .map_err(|err| ApiProblem::from_domain(err, ORIGIN))?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MeetingResponse>> {
    let meeting_id = parse_object_id(&id)?;
    let meeting = state
        .meeting_service
        .get_meeting(meeting_id)
        .await
        .map_err(|err| ApiProblem::from_domain(err, ORIGIN))?;
    Ok(Json(meeting))
}

pub async fn list_meetings(
    State(state): State<AppState>,
    query: Result<Query<ListMeetingsQueryRequest>, QueryRejection>,
) -> ApiResult<Json<PaginatedMeetingsResponse>> {
    let Query(query) = query.map_err(|rejection| {
        ApiProblem::validation(format!("invalid query string: {}", rejection.body_text()), ORIGIN)
    })?;
    let meetings = state
        .meeting_service
        .list_meetings(query)
        .await
        .map_err(|err| ApiProblem::from_domain(err, ORIGIN))?;
    Ok(Json(meetings))
}

pub async fn update_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewMeeting>, JsonRejection>,
) -> ApiResult<Json<MeetingResponse>> {
    let meeting_id = parse_object_id(&id)?;
    let Json(request) = payload.map_err(body_problem)?;
    let updated = state
        .meeting_service
        .update_meeting(meeting_id, request)
        .await
        .map_err(|err| ApiProblem::from_domain(err, ORIGIN))?;
    Ok(Json(updated))
}

pub async fn delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let meeting_id = parse_object_id(&id)?;
    state
        .meeting_service
        .delete_meeting(meeting_id)
        .await
        .map_err(|err| ApiProblem::from_domain(err, ORIGIN))?;

    Ok(StatusCode::NO_CONTENT)
}

fn body_problem(rejection: JsonRejection) -> ApiProblem {
    ApiProblem::validation(format!("invalid meeting body: {}", rejection.body_text()), ORIGIN)
}

fn parse_object_id(raw: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(raw)
        .map_err(|_| ApiProblem::validation("id must be a 24-character hex ObjectId", ORIGIN))
}
