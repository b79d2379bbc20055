//! ReviewChangeRequestHandler - Approves, rejects or withdraws a change request.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::change_request::ChangeRequest;
use crate::domain::foundation::ChangeRequestId;
use crate::domain::lifecycle::LifecycleError;
use crate::ports::ChangeRequestRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    /// Withdrawn by the requester or staff.
    Cancel,
}

#[derive(Debug, Clone)]
pub struct ReviewChangeRequestCommand {
    pub request_id: ChangeRequestId,
    pub decision: ReviewDecision,
    pub note: Option<String>,
}

pub struct ReviewChangeRequestHandler {
    requests: Arc<dyn ChangeRequestRepository>,
}

impl ReviewChangeRequestHandler {
    pub fn new(requests: Arc<dyn ChangeRequestRepository>) -> Self {
        Self { requests }
    }

    #[instrument(skip(self), fields(request_id = %cmd.request_id))]
    pub async fn handle(&self, cmd: ReviewChangeRequestCommand) -> Result<ChangeRequest, LifecycleError> {
        let mut request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("ChangeRequest", cmd.request_id))?;

        match cmd.decision {
            ReviewDecision::Approve => request.approve(cmd.note)?,
            ReviewDecision::Reject => request.reject(cmd.note)?,
            ReviewDecision::Cancel => request.cancel()?,
        }
        self.requests.update(&request).await?;

        info!(status = %request.status, "change request reviewed");
        Ok(request)
    }
}
