use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::{info, warn};

use crate::{
    application::dto::{ListMeetingsQueryRequest, MeetingResponse, PaginatedMeetingsResponse},
    domain::{
        errors::DomainError,
        meeting::{Meeting, NewMeeting},
    },
    store::{DocumentStoreHandler, Query},
    transcription::{AudioClip, Transcriber, UploadSpool},
};

#[derive(Clone)]
pub struct MeetingService {
    store: DocumentStoreHandler<Meeting>,
    transcriber: Arc<dyn Transcriber>,
    spool: UploadSpool,
}

impl MeetingService {
    pub fn new(
        store: DocumentStoreHandler<Meeting>,
        transcriber: Arc<dyn Transcriber>,
        spool: UploadSpool,
    ) -> Self {
        Self {
            store,
            transcriber,
            spool,
        }
    }

    pub async fn create_meeting(&self, meeting: NewMeeting) -> Result<MeetingResponse, DomainError> {
        meeting.validate()?;

        let Some(created) = self.store.add(&meeting).await? else {
            return Err(DomainError::not_persisted(
                "meeting could not be read back after insert",
            ));
        };

        info!(meeting_id = %created.id, "meeting created");
        Ok(MeetingResponse::from(created))
    }

    pub async fn get_meeting(&self, id: ObjectId) -> Result<MeetingResponse, DomainError> {
        let Some(meeting) = self.store.retrieve_one(&Query::by_id(id)).await? else {
            return Err(DomainError::not_found(format!("meeting {id} not found")));
        };
        Ok(MeetingResponse::from(meeting))
    }

    pub async fn list_meetings(
        &self,
        request: ListMeetingsQueryRequest,
    ) -> Result<PaginatedMeetingsResponse, DomainError> {
        let page = self
            .store
            .retrieve_page(
                &request.to_query(),
                request.page,
                &request.to_sort(),
                request.limit,
            )
            .await?;
        Ok(PaginatedMeetingsResponse::new(page, &request))
    }

    /// Replaces every field of the meeting. The store treats a missing target
    /// as a no-op; here it surfaces as `NotFound`.
    pub async fn update_meeting(
        &self,
        id: ObjectId,
        meeting: NewMeeting,
    ) -> Result<MeetingResponse, DomainError> {
        meeting.validate()?;

        let Some(updated) = self.store.update(&Query::by_id(id), &meeting).await? else {
            return Err(DomainError::not_found(format!("meeting {id} not found")));
        };
        Ok(MeetingResponse::from(updated))
    }

    pub async fn delete_meeting(&self, id: ObjectId) -> Result<(), DomainError> {
        if !self.store.delete(&Query::by_id(id)).await? {
            return Err(DomainError::not_found(format!("meeting {id} not found")));
        }

        info!(meeting_id = %id, "meeting deleted");
        Ok(())
    }

    /// Spools the upload, transcribes it and stores a meeting whose transcript
    /// is the resulting text. The spooled copy is removed whether or not
    /// transcription succeeds.
    pub async fn transcribe_meeting(&self, clip: AudioClip) -> Result<MeetingResponse, DomainError> {
        let path = self.spool.persist(&clip).await.map_err(|err| {
            warn!(error = %err, dir = %self.spool.dir().display(), "failed to spool upload");
            DomainError::internal(format!("failed to store upload: {err}"))
        })?;
        info!(path = %path.display(), byte_count = clip.bytes.len(), "upload spooled");

        let transcribed = self.transcriber.transcribe(clip).await;
        if let Err(err) = self.spool.discard(&path).await {
            warn!(error = %err, path = %path.display(), "failed to remove spooled upload");
        }

        let text = transcribed?;
        self.create_meeting(NewMeeting::from_transcript(text)).await
    }
}
