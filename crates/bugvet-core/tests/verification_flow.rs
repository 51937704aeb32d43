use std::collections::BTreeMap;
use std::sync::Arc;

use bugvet_core::fakes::{MemoryCodeHost, MemoryTracker};
use bugvet_core::{
    Bug, BugId, BugStatus, Comment, ExternalLink, QaContact, ReviewRequestRef, Verifier,
    VerifierConfig, VerifyError,
};

fn bug(id: BugId, status: BugStatus, target_release: &[&str]) -> Bug {
    Bug {
        id,
        status,
        target_release: target_release.iter().map(|s| s.to_string()).collect(),
        qa_contact: None,
    }
}

fn github_link(org: &str, repo: &str, number: u32) -> ExternalLink {
    ExternalLink {
        org: org.to_string(),
        repo: repo.to_string(),
        number,
        external_system_url: "https://github.com/".to_string(),
    }
}

fn setup() -> (Arc<MemoryTracker>, Arc<MemoryCodeHost>, Verifier) {
    let tracker = Arc::new(MemoryTracker::new());
    let host = Arc::new(MemoryCodeHost::new());
    let verifier = Verifier::new(tracker.clone(), host.clone(), VerifierConfig::default());
    (tracker, host, verifier)
}

/// Seed one ON_QA bug with target release 4.14.0 linked to org/repo#5.
fn seed_on_qa_bug(tracker: &MemoryTracker) {
    tracker.put_bug(bug(1, BugStatus::OnQa, &["4.14.0"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);
}

// ---- Tag precondition ----

#[tokio::test]
async fn invalid_tag_aborts_with_single_error_and_no_writes() {
    let (tracker, _host, verifier) = setup();
    seed_on_qa_bug(&tracker);

    let errors = verifier.verify_bugs(&[1], "not-a-semver").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::TagParse(_)));
    assert_eq!(tracker.write_calls(), 0);
    assert!(tracker.comments_for(1).is_empty());
}

#[tokio::test]
async fn invalid_tag_aborts_verify_over_prebuilt_mapping() {
    let (_tracker, _host, verifier) = setup();
    let mut mapping = BTreeMap::new();
    mapping.insert(1, vec![ReviewRequestRef::new("org", "repo", 5)]);

    let errors = verifier.verify(&mapping, "4.garbage").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::TagParse(_)));
}

// ---- Suppressed skips ----

#[tokio::test]
async fn already_verified_bug_is_left_alone() {
    let (tracker, _host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::Verified, &["4.14.0"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert!(errors.is_empty());
    assert_eq!(tracker.write_calls(), 0);
    assert!(tracker.comments_for(1).is_empty());
    assert!(tracker.status_updates().is_empty());
}

#[tokio::test]
async fn unset_target_release_performs_no_writes() {
    let (tracker, _host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::OnQa, &["---"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);
    tracker.put_bug(bug(2, BugStatus::OnQa, &[]));
    tracker.put_links(2, vec![github_link("org", "repo", 6)]);

    let errors = verifier.verify_bugs(&[1, 2], "4.14.3").await;
    assert!(errors.is_empty());
    assert_eq!(tracker.write_calls(), 0);
}

#[tokio::test]
async fn different_release_stream_performs_no_writes() {
    let (tracker, host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::OnQa, &["4.13.0"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);
    host.put_labels("org", "repo", 5, &["qe-approved"]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert!(errors.is_empty());
    assert_eq!(tracker.write_calls(), 0);
}

// ---- Recorded per-bug errors ----

#[tokio::test]
async fn malformed_target_release_is_recorded() {
    let (tracker, _host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::OnQa, &["4"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        VerifyError::MalformedTargetRelease { bug: 1, .. }
    ));
    assert_eq!(tracker.write_calls(), 0);
}

#[tokio::test]
async fn bug_fetch_failure_is_isolated_from_other_bugs() {
    let (tracker, host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::OnQa, &["4.14.0"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);
    tracker.fail_bug_fetch(1);
    tracker.put_bug(bug(2, BugStatus::OnQa, &["4.14.0"]));
    tracker.put_links(2, vec![github_link("org", "repo", 6)]);
    host.put_labels("org", "repo", 6, &["qe-approved"]);

    let errors = verifier.verify_bugs(&[1, 2], "4.14.3").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::BugFetch { bug: 1, .. }));
    assert_eq!(tracker.status_updates(), vec![(2, BugStatus::Verified)]);
}

// ---- Approval policy ----

#[tokio::test]
async fn unapproved_request_blocks_transition_and_explains() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &["lgtm"]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert!(errors.is_empty());
    assert!(tracker.status_updates().is_empty());

    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].is_private);
    assert!(comments[0]
        .text
        .contains("PR org/repo#5 not approved by QA contact"));
}

#[tokio::test]
async fn approved_request_moves_bug_to_verified_once() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &["qe-approved", "lgtm"]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert!(errors.is_empty());
    assert_eq!(tracker.status_updates(), vec![(1, BugStatus::Verified)]);

    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].text.ends_with("updating bug status to VERIFIED"));
}

#[tokio::test]
async fn only_the_unapproved_request_is_listed() {
    let (tracker, host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::OnQa, &["4.14.0"]));
    tracker.put_links(
        1,
        vec![github_link("org", "repo", 5), github_link("org", "repo", 6)],
    );
    host.put_labels("org", "repo", 5, &["qe-approved"]);
    host.put_labels("org", "repo", 6, &[]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert!(errors.is_empty());

    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0]
        .text
        .contains("PR org/repo#6 not approved by QA contact"));
    assert!(!comments[0].text.contains("PR org/repo#5"));
    assert!(tracker.status_updates().is_empty());
}

#[tokio::test]
async fn non_on_qa_status_fails_policy_without_label_lookups() {
    let (tracker, host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::Other("NEW".to_string()), &["4.14.0"]));
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);
    // Would surface as a LabelFetch error if the engine consulted the host.
    host.fail_labels("org", "repo", 5);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert!(errors.is_empty());
    assert!(tracker.status_updates().is_empty());

    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].text.contains("Bug is not in ON_QA status"));
}

#[tokio::test]
async fn label_fetch_failure_degrades_bug_and_is_recorded() {
    let (tracker, host, verifier) = setup();
    tracker.put_bug(bug(1, BugStatus::OnQa, &["4.14.0"]));
    tracker.put_links(
        1,
        vec![github_link("org", "repo", 5), github_link("org", "repo", 6)],
    );
    host.fail_labels("org", "repo", 5);
    host.put_labels("org", "repo", 6, &["qe-approved"]);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::LabelFetch { .. }));
    assert!(tracker.status_updates().is_empty());

    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].text.contains("unable to fetch labels"));
}

#[tokio::test]
async fn qa_contact_is_named_in_the_manual_instruction() {
    let (tracker, host, verifier) = setup();
    tracker.put_bug(Bug {
        id: 1,
        status: BugStatus::OnQa,
        target_release: vec!["4.14.0".to_string()],
        qa_contact: Some(QaContact {
            name: "Jordan QA".to_string(),
            email: Some("jordan@example.com".to_string()),
        }),
    });
    tracker.put_links(1, vec![github_link("org", "repo", 5)]);
    host.put_labels("org", "repo", 5, &[]);

    verifier.verify_bugs(&[1], "4.14.3").await;
    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0]
        .text
        .ends_with("This bug must now be manually moved to VERIFIED by Jordan QA"));
}

// ---- Idempotent posting ----

#[tokio::test]
async fn second_invocation_suppresses_duplicate_comment() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &[]);

    verifier.verify_bugs(&[1], "4.14.3").await;
    verifier.verify_bugs(&[1], "4.14.3").await;

    assert_eq!(tracker.comments_for(1).len(), 1);
}

#[tokio::test]
async fn rerun_after_success_does_not_repost_or_retransition() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &["qe-approved"]);

    verifier.verify_bugs(&[1], "4.14.3").await;
    // The fake applied the transition, so the bug is now VERIFIED and the
    // second pass skips it entirely.
    verifier.verify_bugs(&[1], "4.14.3").await;

    assert_eq!(tracker.comments_for(1).len(), 1);
    assert_eq!(tracker.status_updates().len(), 1);
}

#[tokio::test]
async fn identical_text_from_a_human_does_not_suppress_posting() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &[]);

    let expected = "Bugfix included in accepted release 4.14.3\n\
        Bug will not be automatically moved to VERIFIED for the following reasons:\n\
        - PR org/repo#5 not approved by QA contact\n\
        \nThis bug must now be manually moved to VERIFIED";
    tracker.put_comment(
        1,
        Comment {
            text: expected.to_string(),
            creator: "some-human".to_string(),
            is_private: false,
            created_at: None,
        },
    );

    verifier.verify_bugs(&[1], "4.14.3").await;

    let comments = tracker.comments_for(1);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].text, expected);
    assert!(comments[1].is_private);
}

// ---- Side-effect failure handling ----

#[tokio::test]
async fn comment_fetch_failure_skips_the_transition() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &["qe-approved"]);
    tracker.fail_comment_fetch(1);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::CommentFetch { bug: 1, .. }));
    assert!(tracker.status_updates().is_empty());
}

#[tokio::test]
async fn comment_post_failure_does_not_block_the_transition() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &["qe-approved"]);
    tracker.fail_comment_post(1);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::CommentPost { bug: 1, .. }));
    assert_eq!(tracker.status_updates(), vec![(1, BugStatus::Verified)]);
}

#[tokio::test]
async fn status_update_failure_is_recorded() {
    let (tracker, host, verifier) = setup();
    seed_on_qa_bug(&tracker);
    host.put_labels("org", "repo", 5, &["qe-approved"]);
    tracker.fail_status_update(1);

    let errors = verifier.verify_bugs(&[1], "4.14.3").await;
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], VerifyError::StatusUpdate { bug: 1, .. }));
    // The explanatory comment still landed.
    assert_eq!(tracker.comments_for(1).len(), 1);
}
