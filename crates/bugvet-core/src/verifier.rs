//! Verification Engine.
//!
//! Evaluates, per bug, whether every linked review request carries the
//! QA approval label and applies the outcome back to the tracker: a
//! passing bug is moved `ON_QA` -> `VERIFIED`, a failing bug receives an
//! explanatory private comment. The comment is idempotent: identical
//! text already posted by one of the configured robot identities
//! suppresses a re-post.
//!
//! Failures are isolated per bug; the only condition that aborts a
//! whole batch is a release tag that does not parse.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::{CodeHost, DefectTracker};
use crate::config::VerifierConfig;
use crate::domain::{BugId, BugStatus, NewComment, QaContact, ReviewRequestRef, VerifyError};
use crate::release::ReleaseVersion;
use crate::resolver::resolve_links;

/// Ties the defect tracker, the code host and the policy configuration
/// together into the verification procedure.
pub struct Verifier {
    tracker: Arc<dyn DefectTracker>,
    code_host: Arc<dyn CodeHost>,
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(
        tracker: Arc<dyn DefectTracker>,
        code_host: Arc<dyn CodeHost>,
        config: VerifierConfig,
    ) -> Self {
        Self {
            tracker,
            code_host,
            config,
        }
    }

    /// Sole entry point: resolve the bugs' review requests, then verify
    /// each bug against `release_tag`.
    ///
    /// Returns every non-fatal error encountered across the batch. An
    /// unparseable tag short-circuits before any tracker call.
    pub async fn verify_bugs(&self, bug_ids: &[BugId], release_tag: &str) -> Vec<VerifyError> {
        if let Err(err) = ReleaseVersion::parse_tolerant(release_tag) {
            return vec![VerifyError::TagParse(err)];
        }
        let (resolved, mut errors) = resolve_links(self.tracker.as_ref(), &self.config, bug_ids).await;
        errors.extend(self.verify(&resolved, release_tag).await);
        errors
    }

    /// Verify a pre-resolved bug-to-review-requests mapping against
    /// `release_tag`.
    pub async fn verify(
        &self,
        bug_requests: &BTreeMap<BugId, Vec<ReviewRequestRef>>,
        release_tag: &str,
    ) -> Vec<VerifyError> {
        let tag = match ReleaseVersion::parse_tolerant(release_tag) {
            Ok(tag) => tag,
            Err(err) => return vec![VerifyError::TagParse(err)],
        };
        let tag_stream = tag.major_minor();

        let mut errors = Vec::new();
        for (&bug_id, requests) in bug_requests {
            self.verify_bug(bug_id, requests, release_tag, &tag_stream, &mut errors)
                .await;
        }
        errors
    }

    /// Run the full per-bug procedure. Anything that goes wrong lands
    /// in `errors`; the caller moves on to the next bug regardless.
    async fn verify_bug(
        &self,
        bug_id: BugId,
        requests: &[ReviewRequestRef],
        release_tag: &str,
        tag_stream: &str,
        errors: &mut Vec<VerifyError>,
    ) {
        let bug = match self.tracker.get_bug(bug_id).await {
            Ok(bug) => bug,
            Err(source) => {
                errors.push(VerifyError::BugFetch {
                    bug: bug_id,
                    source,
                });
                return;
            }
        };

        // Trackers usually denote an unset target release with a sentinel
        // in the first slot.
        let target = match bug.target_release.first() {
            Some(t) if *t != self.config.unset_release_sentinel => t,
            _ => {
                warn!(bug = bug.id, "bug does not have a target release");
                return;
            }
        };

        // Target release is `major.minor.{patch,z}`; only the stream matters.
        let parts: Vec<&str> = target.split('.').collect();
        if parts.len() < 2 {
            errors.push(VerifyError::MalformedTargetRelease {
                bug: bug.id,
                value: target.clone(),
            });
            return;
        }
        let bug_stream = format!("{}.{}", parts[0], parts[1]);
        if bug_stream != tag_stream {
            info!(
                bug = bug.id,
                bug_stream = %bug_stream,
                tag = release_tag,
                "bugfix belongs to a different release stream"
            );
            return;
        }

        let mut success = false;
        let mut unapproved: Vec<ReviewRequestRef> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();

        match &bug.status {
            BugStatus::Verified => {
                // Already in the terminal desired state; must not re-notify.
                debug!(bug = bug.id, "bug already in VERIFIED status");
                return;
            }
            BugStatus::Other(_) => {
                reasons.push("Bug is not in ON_QA status".to_string());
            }
            BugStatus::OnQa => {
                for request in requests {
                    match self
                        .code_host
                        .get_labels(&request.org, &request.repo, request.number)
                        .await
                    {
                        Ok(labels) => {
                            let approved =
                                labels.iter().any(|l| l.name == self.config.approval_label);
                            if !approved {
                                unapproved.push(request.clone());
                            }
                        }
                        Err(source) => {
                            let err = VerifyError::LabelFetch {
                                request: request.clone(),
                                source,
                            };
                            reasons.push(err.to_string());
                            errors.push(err);
                        }
                    }
                }
                if unapproved.is_empty() && reasons.is_empty() {
                    success = true;
                }
            }
        }

        let message = compose_message(
            release_tag,
            success,
            &unapproved,
            &reasons,
            bug.qa_contact.as_ref(),
        );

        // Idempotent posting: an identical message already left by one of
        // our own identities means this outcome was reported before.
        let comments = match self.tracker.get_comments(bug.id).await {
            Ok(comments) => comments,
            Err(source) => {
                errors.push(VerifyError::CommentFetch {
                    bug: bug.id,
                    source,
                });
                return;
            }
        };
        let already_commented = comments
            .iter()
            .any(|c| c.text == message && self.config.is_robot(&c.creator));
        if !already_commented {
            let comment = NewComment {
                bug_id: bug.id,
                text: message,
                is_private: true,
            };
            if let Err(source) = self.tracker.create_comment(comment).await {
                errors.push(VerifyError::CommentPost {
                    bug: bug.id,
                    source,
                });
            }
        }

        if success {
            debug!(bug = bug.id, status = %bug.status, "updating bug to VERIFIED status");
            if let Err(source) = self
                .tracker
                .update_bug_status(bug.id, BugStatus::Verified)
                .await
            {
                errors.push(VerifyError::StatusUpdate {
                    bug: bug.id,
                    source,
                });
            }
        } else {
            debug!(bug = bug.id, status = %bug.status, "bug not approved by QA contact");
        }
    }
}

/// Compose the outcome message for one bug. Deterministic and
/// order-preserving: unapproved requests first, then policy reasons,
/// each in encounter order.
fn compose_message(
    release_tag: &str,
    success: bool,
    unapproved: &[ReviewRequestRef],
    reasons: &[String],
    qa_contact: Option<&QaContact>,
) -> String {
    let mut message = format!("Bugfix included in accepted release {release_tag}");
    if success {
        message.push_str(
            "\nAll linked GitHub PRs have been approved by a QA contact; updating bug status to VERIFIED",
        );
        return message;
    }

    message.push_str("\nBug will not be automatically moved to VERIFIED for the following reasons:");
    for request in unapproved {
        message.push_str(&format!("\n- PR {request} not approved by QA contact"));
    }
    for reason in reasons {
        message.push_str(&format!("\n- {reason}"));
    }
    message.push_str("\n\nThis bug must now be manually moved to VERIFIED");
    if let Some(contact) = qa_contact {
        message.push_str(&format!(" by {}", contact.name));
    }
    message
}
