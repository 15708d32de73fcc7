//! Skill tokenizer
//!
//! Splits a free-text skills blob into discrete skill tokens with two
//! regular patterns. The rule is deliberately approximate: it over- and
//! under-segments irregular input, and callers get exactly that behavior.

use regex::Regex;
use std::sync::LazyLock;

/// Standalone "ex", a recurring artifact in the skills corpus
static EX_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bex\b").expect("ex artifact pattern is valid"));

/// A capitalized word with lowercase continuation words, or an uppercase run
static SKILL_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+(?:\s+[a-z]+)*|[A-Z]+").expect("skill run pattern is valid")
});

/// Split a skills blob into tokens, in order of appearance, without dedup.
///
/// ```
/// use skilldex_core::split_skills;
///
/// assert_eq!(split_skills("Python, Java, SQL"), vec!["Python", "Java", "SQL"]);
/// assert_eq!(split_skills("ex Machine learning"), vec!["Machine learning"]);
/// assert!(split_skills("").is_empty());
/// ```
pub fn split_skills(text: &str) -> Vec<String> {
    let cleaned = EX_ARTIFACT.replace_all(text, "");
    SKILL_RUN
        .find_iter(&cleaned)
        .map(|m| m.as_str().to_string())
        .collect()
}
