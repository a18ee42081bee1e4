use serde::{Deserialize, Serialize};

use crate::{
    domain::meeting::{Meeting, MeetingSortBy},
    store::{Paginated, Query, SortDirection, SortSpec},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingResponse {
    pub id: String,
    pub title: String,
    pub date: String,
    pub duration: i64,
    pub participants: Vec<String>,
    pub transcript: String,
    pub summary: String,
}

impl From<Meeting> for MeetingResponse {
    fn from(value: Meeting) -> Self {
        Self {
            id: value.id.to_hex(),
            title: value.title,
            date: value.date,
            duration: value.duration,
            participants: value.participants,
            transcript: value.transcript,
            summary: value.summary,
        }
    }
}

/// Query-string form of a list request. Paging values are passed through
/// unchecked; the store handler rejects out-of-range windows.
#[derive(Debug, Clone, Deserialize)]
pub struct ListMeetingsQueryRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub sort_by: MeetingSortByRequest,
    #[serde(default)]
    pub order: SortOrderRequest,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub participant: Option<String>,
}

impl Default for ListMeetingsQueryRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            sort_by: MeetingSortByRequest::default(),
            order: SortOrderRequest::default(),
            title: None,
            participant: None,
        }
    }
}

impl ListMeetingsQueryRequest {
    pub fn to_query(&self) -> Query {
        let mut query = Query::All;
        if let Some(title) = self.title.as_ref() {
            query = query.and(Query::eq("title", title.as_str()));
        }
        if let Some(participant) = self.participant.as_ref() {
            query = query.and(Query::eq("participants", participant.as_str()));
        }
        query
    }

    /// Non-identity sorts fall back to identity order for ties so that
    /// consecutive pages never overlap.
    pub fn to_sort(&self) -> SortSpec {
        let sort_by = self.sort_by.into_domain();
        let direction = self.order.into_domain();
        SortSpec::by(sort_by.field(), direction)
            .then_by(MeetingSortBy::Id.field(), SortDirection::Ascending)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingSortByRequest {
    #[default]
    Id,
    Title,
    Date,
    Duration,
}

impl MeetingSortByRequest {
    fn into_domain(self) -> MeetingSortBy {
        match self {
            Self::Id => MeetingSortBy::Id,
            Self::Title => MeetingSortBy::Title,
            Self::Date => MeetingSortBy::Date,
            Self::Duration => MeetingSortBy::Duration,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrderRequest {
    #[default]
    Asc,
    Desc,
}

impl SortOrderRequest {
    fn into_domain(self) -> SortDirection {
        match self {
            Self::Asc => SortDirection::Ascending,
            Self::Desc => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedMeetingsResponse {
    pub items: Vec<MeetingResponse>,
    pub page: i64,
    pub limit: i64,
    pub page_count: u64,
    pub total_count: u64,
}

impl PaginatedMeetingsResponse {
    pub fn new(page: Paginated<Meeting>, request: &ListMeetingsQueryRequest) -> Self {
        let page = page.map(MeetingResponse::from);
        Self {
            items: page.items,
            page: request.page,
            limit: request.limit,
            page_count: page.page_count,
            total_count: page.total_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    10
}
