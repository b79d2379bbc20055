//! ProcessScheduledChangesHandler - Applies every approved change that has
//! come due.
//!
//! Requests are applied one at a time in effective-date order, so several
//! changes to one participation land in the order they were meant to.
//! A request that fails for a reason a later run cannot fix, e.g. its
//! participation has ended, is rejected with the error as its note; lost
//! races and storage failures leave it approved for the next run.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{ProcessChangeRequestCommand, ProcessChangeRequestHandler};
use crate::domain::lifecycle::LifecycleError;
use crate::ports::ChangeRequestRepository;

#[derive(Debug, Clone)]
pub struct ProcessScheduledChangesCommand {
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduledChangesReport {
    pub due: usize,
    pub processed: usize,
    /// Left approved, retried next run.
    pub failed: usize,
    /// Could never apply; moved to rejected.
    pub rejected: usize,
}

pub struct ProcessScheduledChangesHandler {
    requests: Arc<dyn ChangeRequestRepository>,
    processor: Arc<ProcessChangeRequestHandler>,
}

impl ProcessScheduledChangesHandler {
    pub fn new(
        requests: Arc<dyn ChangeRequestRepository>,
        processor: Arc<ProcessChangeRequestHandler>,
    ) -> Self {
        Self {
            requests,
            processor,
        }
    }

    #[instrument(skip(self))]
    pub async fn handle(
        &self,
        cmd: ProcessScheduledChangesCommand,
    ) -> Result<ScheduledChangesReport, LifecycleError> {
        let due = self.requests.find_due(cmd.as_of).await?;
        let mut report = ScheduledChangesReport {
            due: due.len(),
            ..ScheduledChangesReport::default()
        };

        for request in due {
            let result = self
                .processor
                .handle(ProcessChangeRequestCommand {
                    request_id: request.id,
                    today: cmd.as_of,
                })
                .await;
            match result {
                Ok(_) => report.processed += 1,
                Err(e) if e.is_retryable() => {
                    report.failed += 1;
                    warn!(request_id = %request.id, error = %e, "scheduled change failed, will retry");
                }
                Err(e) => {
                    warn!(request_id = %request.id, error = %e, "scheduled change rejected");
                    let mut rejected = request;
                    rejected.reject(Some(format!("Not applied: {}", e)))?;
                    self.requests.update(&rejected).await?;
                    report.rejected += 1;
                }
            }
        }

        info!(
            due = report.due,
            processed = report.processed,
            failed = report.failed,
            rejected = report.rejected,
            "scheduled changes processed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{date, Fixture};
    use crate::domain::change_request::{ChangeKind, ChangeRequest, ChangeRequestStatus};
    use crate::domain::eligibility::Eligibility;
    use crate::domain::lifecycle::TransitionRequest;
    use crate::domain::participation::{Participation, ParticipationStatus};
    use crate::ports::ParticipationRepository;

    async fn approved(fx: &Fixture, p: &Participation, kind: ChangeKind, effective: NaiveDate) {
        let mut request = ChangeRequest::draft(p.id, kind, effective);
        request
            .submit(
                &Eligibility {
                    eligible: true,
                    reasons: vec![],
                },
                None,
            )
            .unwrap();
        request.approve(None).unwrap();
        fx.backend.change_requests.insert(&request).await.unwrap();
    }

    fn handler(fx: &Fixture) -> ProcessScheduledChangesHandler {
        let processor = ProcessChangeRequestHandler::new(
            fx.executor(),
            fx.backend.change_requests.clone(),
            fx.backend.catalog.clone(),
            fx.members.clone(),
        );
        ProcessScheduledChangesHandler::new(fx.backend.change_requests.clone(), Arc::new(processor))
    }

    #[tokio::test]
    async fn applies_due_changes_only() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        approved(&fx, &p, ChangeKind::Pause { resume_on: None }, date(2024, 6, 1)).await;
        let later = fx.active_membership().await;
        approved(&fx, &later, ChangeKind::Pause { resume_on: None }, date(2024, 9, 1)).await;

        let report = handler(&fx)
            .handle(ProcessScheduledChangesCommand {
                as_of: date(2024, 6, 15),
            })
            .await
            .unwrap();

        assert_eq!(
            report,
            ScheduledChangesReport {
                due: 1,
                processed: 1,
                failed: 0,
                rejected: 0
            }
        );
        assert_eq!(fx.reload(&p).await.status, ParticipationStatus::Suspended);
        assert_eq!(fx.reload(&later).await.status, ParticipationStatus::Active);
    }

    #[tokio::test]
    async fn change_that_can_never_apply_is_rejected_with_note() {
        let fx = Fixture::new().await;
        let p = fx.prospect_membership().await;
        approved(&fx, &p, ChangeKind::Pause { resume_on: None }, date(2024, 6, 1)).await;
        let handler = handler(&fx);
        let cmd = ProcessScheduledChangesCommand {
            as_of: date(2024, 6, 1),
        };

        let report = handler.handle(cmd.clone()).await.unwrap();

        assert_eq!(report.rejected, 1);
        assert_eq!(report.failed, 0);
        let stored = fx.backend.change_requests.all().await;
        assert_eq!(stored[0].status, ChangeRequestStatus::Rejected);
        assert!(stored[0]
            .review_note
            .as_deref()
            .is_some_and(|note| note.starts_with("Not applied")));
        assert_eq!(fx.reload(&p).await.status, ParticipationStatus::Prospect);

        let rerun = handler.handle(cmd).await.unwrap();
        assert_eq!(rerun.due, 0);
    }

    #[tokio::test]
    async fn change_on_ended_participation_is_rejected() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        approved(
            &fx,
            &p,
            ChangeKind::Extension {
                until: date(2025, 3, 31),
            },
            date(2024, 11, 1),
        )
        .await;
        fx.executor()
            .transition(
                &p,
                &TransitionRequest::new(ParticipationStatus::Cancelled, "moved away"),
                date(2024, 10, 1),
            )
            .await
            .unwrap();

        let report = handler(&fx)
            .handle(ProcessScheduledChangesCommand {
                as_of: date(2024, 11, 1),
            })
            .await
            .unwrap();

        assert_eq!(report.rejected, 1);
        let ended = fx.reload(&p).await;
        assert_eq!(ended.term_end, date(2024, 12, 31));
        assert_eq!(fx.backend.participations.history_for(&p.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rerun_finds_nothing_due() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        approved(&fx, &p, ChangeKind::Pause { resume_on: None }, date(2024, 6, 1)).await;
        let handler = handler(&fx);
        let cmd = ProcessScheduledChangesCommand {
            as_of: date(2024, 6, 1),
        };

        handler.handle(cmd.clone()).await.unwrap();
        let report = handler.handle(cmd).await.unwrap();

        assert_eq!(report.due, 0);
    }
}
