use std::sync::Arc;

use crate::application::meeting_service::MeetingService;

#[derive(Clone)]
pub struct AppState {
    pub meeting_service: Arc<MeetingService>,
}

impl AppState {
    pub fn new(meeting_service: Arc<MeetingService>) -> Self {
        Self { meeting_service }
    }
}
