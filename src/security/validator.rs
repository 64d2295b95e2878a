//! Request input validation.
//!
//! # Responsibilities
//! - Check URL scheme and host against the domain allow-list
//! - Normalize and filter tags (silently drops bad ones)
//! - Bound and scan the free-text note (fails the request on a hit)
//!
//! # Design Decisions
//! - Fail closed: an unparsable URL is simply not allowed
//! - Host matching is exact or dot-suffix, never substring
//! - Notes are truncated before scanning, so text past the limit is never seen

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::config::ValidationConfig;
use crate::error::{GateError, GateResult};
use crate::security::patterns::{first_match, input_patterns};

static TAG_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("tag charset must compile"));

/// Allow-list and input bounds for incoming archive requests.
#[derive(Debug, Clone)]
pub struct Validator {
    allowed_domains: Vec<String>,
    max_note_length: usize,
    max_tag_count: usize,
    max_tag_length: usize,
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Self {
        let allowed_domains = config
            .allowed_domains
            .iter()
            .map(|d| strip_www(&d.trim().to_lowercase()).to_string())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            allowed_domains,
            max_note_length: config.max_note_length,
            max_tag_count: config.max_tag_count,
            max_tag_length: config.max_tag_length,
        }
    }

    /// Whether `url` is an http(s) URL on an allow-listed domain.
    pub fn validate_url(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "URL parsing failed");
                return false;
            }
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            tracing::warn!(url = %url, scheme = parsed.scheme(), "Invalid protocol");
            return false;
        }

        let Some(host) = parsed.host_str() else {
            tracing::warn!(url = %url, "URL has no host");
            return false;
        };
        let hostname = strip_www(host);

        if !self.is_allowed_host(hostname) {
            tracing::warn!(url = %url, hostname = %hostname, "Domain not in whitelist");
            return false;
        }

        tracing::debug!(url = %url, "URL validated");
        true
    }

    fn is_allowed_host(&self, hostname: &str) -> bool {
        self.allowed_domains.iter().any(|domain| {
            hostname == domain
                || hostname
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Lower-case, trim and filter tags, keeping at most `max_tag_count`.
    ///
    /// Never fails: empty, oversized, suspicious or non `[a-z0-9_-]` tags are
    /// dropped, as are repeats of a tag already kept.
    pub fn sanitize_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let mut kept: Vec<String> = Vec::new();

        for raw in tags {
            let tag = raw.as_ref().trim().to_lowercase();
            let len = tag.chars().count();

            if len == 0 || len > self.max_tag_length {
                tracing::warn!(tag = %tag, length = len, "Tag length invalid");
                continue;
            }
            if let Some(pattern) = first_match(input_patterns(), &tag) {
                tracing::warn!(tag = %tag, pattern = pattern.id(), "Dangerous pattern in tag");
                continue;
            }
            if !TAG_CHARSET.is_match(&tag) {
                tracing::warn!(tag = %tag, "Invalid characters in tag");
                continue;
            }
            if kept.contains(&tag) {
                tracing::debug!(tag = %tag, "Duplicate tag dropped");
                continue;
            }
            kept.push(tag);
        }

        kept.truncate(self.max_tag_count);
        kept
    }

    /// Truncate the note to `max_note_length`, then reject it on any pattern hit.
    pub fn sanitize_note(&self, note: &str) -> GateResult<String> {
        let original_length = note.chars().count();
        let note = if original_length > self.max_note_length {
            tracing::warn!(
                original_length,
                max_length = self.max_note_length,
                "Note too long, truncating"
            );
            truncate_chars(note, self.max_note_length)
        } else {
            note
        };

        if let Some(pattern) = first_match(input_patterns(), note) {
            tracing::error!(pattern = pattern.id(), "Dangerous pattern detected in note");
            return Err(GateError::DangerousContent(
                "Note contains dangerous pattern".to_string(),
            ));
        }

        Ok(note.trim().to_string())
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Prefix of `text` holding at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
