use crate::session::Verdict;

/// Derive a verdict from free-form review text
///
/// Case-insensitive substring checks, in order: "approved"/"accept" wins,
/// then "rejected"/"reject", otherwise `NeedsWork`. A review that says
/// "not approved" therefore counts as approved.
#[must_use]
pub fn parse_verdict(review: &str) -> Verdict {
    let lower = review.to_lowercase();
    if lower.contains("approved") || lower.contains("accept") {
        Verdict::Approved
    } else if lower.contains("rejected") || lower.contains("reject") {
        Verdict::Rejected
    } else {
        Verdict::NeedsWork
    }
}
