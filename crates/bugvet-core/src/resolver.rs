//! Link Resolver: bug IDs to review requests on the configured host.
//!
//! For each bug the tracker's external links are fetched and filtered
//! to the code-review host of interest. Bugs that resolve to nothing
//! are omitted from the mapping, not errored: operators sometimes set
//! tracker flags by hand and never link the fix.

use std::collections::BTreeMap;

use tracing::debug;

use crate::clients::DefectTracker;
use crate::config::VerifierConfig;
use crate::domain::{BugId, ReviewRequestRef, VerifyError};

/// Resolve each bug to the ordered list of review requests linked to it.
///
/// Returns the mapping plus the non-fatal errors hit along the way.
/// Access denial on a bug is suppressed (logged only): a handful of
/// bugs carry restricted groups and failing the batch over them is not
/// actionable. Any other fetch failure is recorded and the batch
/// continues.
pub async fn resolve_links(
    tracker: &dyn DefectTracker,
    config: &VerifierConfig,
    bug_ids: &[BugId],
) -> (BTreeMap<BugId, Vec<ReviewRequestRef>>, Vec<VerifyError>) {
    let mut resolved = BTreeMap::new();
    let mut errors = Vec::new();

    for &bug_id in bug_ids {
        let links = match tracker.get_external_links(bug_id).await {
            Ok(links) => links,
            Err(source) if source.is_access_denied() => {
                debug!(bug = bug_id, error = %source, "access denied fetching external links");
                continue;
            }
            Err(source) => {
                errors.push(VerifyError::LinkFetch {
                    bug: bug_id,
                    source,
                });
                continue;
            }
        };

        let requests: Vec<ReviewRequestRef> = links
            .into_iter()
            .filter(|link| link.external_system_url == config.host_link_url)
            .map(|link| ReviewRequestRef::new(link.org, link.repo, link.number))
            .collect();

        if requests.is_empty() {
            debug!(bug = bug_id, "no linked review request found");
            continue;
        }
        resolved.insert(bug_id, requests);
    }

    (resolved, errors)
}
