//! Keyword buckets used to match a request against past successes

/// Category used when no bucket matches
pub const GENERAL_CATEGORY: &str = "general";

/// Buckets in priority order; the first bucket with a matching keyword wins
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("component", &["component", "ui", "button", "form", "modal", "card"]),
    ("api", &["api", "endpoint", "route", "rest", "graphql"]),
    ("database", &["database", "query", "sql", "mongodb", "postgres"]),
    ("auth", &["authentication", "login", "oauth", "jwt", "session"]),
    ("testing", &["test", "unit test", "integration", "jest", "cypress"]),
    ("security", &["security", "vulnerability", "encrypt", "xss", "csrf"]),
    ("performance", &["optimize", "performance", "slow", "cache", "speed"]),
    ("deployment", &["deploy", "docker", "kubernetes", "ci/cd", "build"]),
];

/// Case-insensitive substring match of `request` against [`CATEGORIES`]
///
/// Matching is on raw substrings, so "guide" lands in `component` via "ui".
#[must_use]
pub fn categorize_request(request: &str) -> &'static str {
    let lower = request.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(name, _)| *name)
        .unwrap_or(GENERAL_CATEGORY)
}
