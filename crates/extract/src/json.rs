//! Recovering the JSON body from a model reply.
//!
//! Models are told to answer with bare JSON but regularly wrap it in a
//! Markdown code fence anyway. [`extract_json_body`] removes exactly that
//! wrapping and nothing else:
//!
//! 1. surrounding whitespace is trimmed;
//! 2. a leading fence (three backticks plus an optional info string such as
//!    `json`) is removed;
//! 3. a trailing fence is removed;
//! 4. whatever remains is trimmed again and returned.
//!
//! Prose before or after the fence is left in place, so such a reply fails to
//! parse instead of being guessed at.

const FENCE: &str = "```";

/// Strip an optional surrounding Markdown code fence from `reply`.
///
/// ```rust
/// use extract::extract_json_body;
///
/// assert_eq!(extract_json_body("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(extract_json_body("  {\"a\": 1}  "), "{\"a\": 1}");
/// ```
pub fn extract_json_body(reply: &str) -> &str {
    let mut body = reply.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        // Info string: `json`, `JSON`, `json5`, ... up to the first
        // non-alphanumeric character.
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        body = &rest[tag_len..];
    }

    let trimmed = body.trim_end();
    if let Some(rest) = trimmed.strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}
