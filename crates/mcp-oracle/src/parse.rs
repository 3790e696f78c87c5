//! Strict parsing of oracle answers.
//!
//! Oracles are asked for bare JSON but sometimes wrap it in markdown fences,
//! add prose around it or sprinkle `//` comments. Those are stripped; what
//! remains must be an object with all three tiers as string arrays, and no
//! path may sit in two tiers. Anything else is a failed classification.

use mcp_gateway_adaptive::SchemaClassification;
use mcp_gateway_core::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("valid regex"));
static LINE_COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|\s)//.*$").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct TieredPaths {
    pinned: Vec<String>,
    noise: Vec<String>,
    ghosts: Vec<String>,
}

/// Parses and validates an oracle answer for `operation`.
///
/// # Errors
///
/// Returns `Error::ClassificationFailed` if no JSON object can be found, a
/// tier is missing or not an array of strings, or tiers overlap.
///
/// # Examples
///
/// ```
/// use mcp_gateway_oracle::parse_classification;
///
/// let answer = "```json\n{\"pinned\": [\"id\"], \"noise\": [], \"ghosts\": [\"body\"]}\n```";
/// let schema = parse_classification(answer, "gh_get_issue").unwrap();
/// assert_eq!(schema.ghosts, vec!["body"]);
///
/// assert!(parse_classification("{\"pinned\": []}", "gh_get_issue").is_err());
/// ```
pub fn parse_classification(text: &str, operation: &str) -> Result<SchemaClassification> {
    let cleaned = FENCE_REGEX.replace_all(text, "");
    let cleaned = LINE_COMMENT_REGEX.replace_all(&cleaned, "$1");
    let json = extract_object(cleaned.trim()).ok_or_else(|| Error::ClassificationFailed {
        operation: operation.to_string(),
        reason: "no JSON object in oracle answer".to_string(),
    })?;

    let tiers: TieredPaths =
        serde_json::from_str(json).map_err(|e| Error::ClassificationFailed {
            operation: operation.to_string(),
            reason: format!("malformed classification: {e}"),
        })?;

    let schema = SchemaClassification {
        pinned: tiers.pinned,
        noise: tiers.noise,
        ghosts: tiers.ghosts,
    };
    validate_classification(&schema, operation)?;
    Ok(schema)
}

/// Rejects classifications that put a path in more than one tier.
///
/// # Errors
///
/// Returns `Error::ClassificationFailed` naming the overlapping paths.
pub fn validate_classification(schema: &SchemaClassification, operation: &str) -> Result<()> {
    let overlapping = schema.overlapping_paths();
    if overlapping.is_empty() {
        Ok(())
    } else {
        Err(Error::ClassificationFailed {
            operation: operation.to_string(),
            reason: format!("paths in more than one tier: {}", overlapping.join(", ")),
        })
    }
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
