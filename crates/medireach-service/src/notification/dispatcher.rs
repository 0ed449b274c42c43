//! Translation of committed events into notification drafts.

use medireach_core::events::{DomainEvent, RequestEvent};
use medireach_core::types::UserId;
use medireach_entity::notification::{NotificationDraft, NotificationKind};
use medireach_entity::request::{Request, RequestStatus};

/// Extra data the dispatcher needs beyond the event and the request.
#[derive(Debug, Clone, Default)]
pub struct DispatchContext<'a> {
    /// Display name of the acting user.
    pub actor_name: &'a str,
    /// Contact phone of the acting user.
    pub actor_phone: Option<&'a str>,
    /// Every verifier-role user; only read for `Created`.
    pub verifier_ids: &'a [UserId],
}

/// Decides who hears about an event and what they are told.
///
/// Pure: no store access, no delivery. A recipient receives at most one
/// draft per event even when several rules select them; the first rule
/// wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationDispatcher;

/// Draft accumulator enforcing one draft per recipient.
struct Drafts<'a> {
    event: &'a DomainEvent,
    request: &'a Request,
    out: Vec<NotificationDraft>,
}

impl<'a> Drafts<'a> {
    fn new(event: &'a DomainEvent, request: &'a Request) -> Self {
        Self {
            event,
            request,
            out: Vec::new(),
        }
    }

    fn push(&mut self, recipient_id: UserId, kind: NotificationKind, message: String) {
        if self.out.iter().any(|d| d.recipient_id == recipient_id) {
            return;
        }
        self.out.push(NotificationDraft {
            recipient_id,
            message,
            kind,
            related_request_id: self.request.id,
            created_by: Some(self.event.actor_id),
            created_at: self.event.timestamp,
        });
    }
}

impl NotificationDispatcher {
    /// Creates a new dispatcher.
    pub fn new() -> Self {
        Self
    }

    /// Produce the drafts for `event`, which was committed against `request`.
    ///
    /// `request` is the state after the write.
    pub fn dispatch(
        &self,
        event: &DomainEvent,
        request: &Request,
        ctx: &DispatchContext<'_>,
    ) -> Vec<NotificationDraft> {
        let mut drafts = Drafts::new(event, request);
        let tracking = request.tracking_id.as_str();
        let resource = request.resource_type.label();

        match &event.payload {
            RequestEvent::Created { urgent, .. } => {
                for verifier in ctx.verifier_ids {
                    drafts.push(
                        *verifier,
                        NotificationKind::VerificationRequired,
                        format!(
                            "New request submitted: {resource} ({}) in {}",
                            request.urgency.label(),
                            request.location
                        ),
                    );
                }
                for donor in &request.matched_donor_ids {
                    if *urgent {
                        drafts.push(
                            *donor,
                            NotificationKind::UrgentRequest,
                            format!(
                                "Urgent: a nearby {resource} request ({}) in {} needs your help.",
                                request.urgency.label(),
                                request.location
                            ),
                        );
                    } else {
                        drafts.push(
                            *donor,
                            NotificationKind::RequestMatch,
                            format!("A nearby request ({resource}) matches your profile."),
                        );
                    }
                }
            }
            RequestEvent::Verified { .. } => {
                drafts.push(
                    request.owner_id,
                    NotificationKind::RequestVerified,
                    format!(
                        "Your request ({tracking}) has been verified by {}",
                        ctx.actor_name
                    ),
                );
            }
            RequestEvent::Rejected { reason, .. } => {
                drafts.push(
                    request.owner_id,
                    NotificationKind::RequestRejected,
                    format!("Your request ({tracking}) has been rejected. Reason: {reason}"),
                );
            }
            RequestEvent::Edited { .. } => {
                drafts.push(
                    request.owner_id,
                    NotificationKind::RequestEdited,
                    format!("Your {resource} request ({tracking}) has been successfully updated."),
                );
                let verifier = request
                    .verified_by
                    .filter(|_| request.status == RequestStatus::Verified);
                if let Some(verifier) = verifier {
                    drafts.push(
                        verifier,
                        NotificationKind::RequestChanged,
                        format!(
                            "A verified request ({tracking}) has been edited by the requester."
                        ),
                    );
                }
            }
            RequestEvent::Cancelled { .. } => {
                for donor in request.involved_donor_ids() {
                    let message = if request.has_accepted(donor) {
                        format!("The request ({tracking}) you accepted has been cancelled.")
                    } else {
                        format!(
                            "The {resource} request ({tracking}) has been cancelled by the requester."
                        )
                    };
                    drafts.push(donor, NotificationKind::RequestCancelled, message);
                }
            }
            RequestEvent::DonorAccepted { .. } => {
                drafts.push(
                    request.owner_id,
                    NotificationKind::DonorAccepted,
                    format!(
                        "Great news! {} has accepted your request ({tracking}). Contact: {}",
                        ctx.actor_name,
                        ctx.actor_phone.unwrap_or("Not provided")
                    ),
                );
            }
            RequestEvent::Advanced { .. } => {}
            RequestEvent::Completed { .. } => {
                for donor in &request.accepted_donor_ids {
                    drafts.push(
                        *donor,
                        NotificationKind::RequestCompleted,
                        format!(
                            "The request ({tracking}) you accepted has been marked as completed. Thank you for your help!"
                        ),
                    );
                }
            }
        }

        drafts.out
    }
}
