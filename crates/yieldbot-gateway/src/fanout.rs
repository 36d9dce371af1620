//! Bounded Fan-Out
//!
//! Comparisons fetch one listing per subject. Calls run concurrently but
//! never more than `MAX_CONCURRENT_FETCHES` at a time, and an individual
//! subject failing marks only that subject, not the whole batch.

use futures::{stream, StreamExt};

use yieldbot_core::{Result, YieldOpportunity};

use crate::{DataGateway, Fetched, YieldFilter};

/// Upper bound on concurrent upstream calls within one invocation
pub const MAX_CONCURRENT_FETCHES: usize = 5;

/// Per-subject outcome of a fan-out fetch
pub struct SubjectYields {
    pub subject: String,
    pub outcome: Result<Fetched<YieldOpportunity>>,
}

/// Fetch yield listings for each subject with bounded concurrency.
///
/// Results preserve the input subject order regardless of completion order.
pub async fn fetch_yields_per_subject(
    gateway: &dyn DataGateway,
    subjects: &[String],
) -> Vec<SubjectYields> {
    let mut indexed: Vec<(usize, SubjectYields)> = stream::iter(subjects.iter().enumerate())
        .map(|(index, subject)| async move {
            let filter = YieldFilter::protocol(subject.clone());
            let outcome = gateway.fetch_yields(&filter).await;
            (
                index,
                SubjectYields {
                    subject: subject.clone(),
                    outcome,
                },
            )
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;

    // buffer_unordered yields in completion order; restore input order
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockGateway;

    #[tokio::test]
    async fn test_fanout_preserves_subject_order() {
        let gateway = MockGateway::new();
        let subjects = vec!["curve".to_string(), "aave".to_string(), "ghost".to_string()];

        let results = fetch_yields_per_subject(&gateway, &subjects).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].subject, "curve");
        assert_eq!(results[1].subject, "aave");

        // Unknown protocol succeeds with zero rows, it is not a failure
        let ghost = &results[2];
        assert!(ghost.outcome.as_ref().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fanout_marks_individual_failures() {
        let gateway = MockGateway::with_upstream_failure();
        let subjects = vec!["aave".to_string(), "compound".to_string()];

        let results = fetch_yields_per_subject(&gateway, &subjects).await;
        assert!(results.iter().all(|r| r.outcome.is_err()));
    }
}
