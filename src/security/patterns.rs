//! Injection pattern sets.
//!
//! Two sets share the same instruction-hijacking phrases. Caller-authored
//! input (tags, notes) is additionally checked for raw role markers and
//! markup/script injection; fetched third-party content is checked for the
//! phrases only. All patterns are case-insensitive.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Family of disallowed phrasing a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternClass {
    InstructionOverride,
    RoleReassignment,
    MarkupInjection,
}

/// One compiled disallowed pattern.
#[derive(Debug)]
pub struct InjectionPattern {
    id: &'static str,
    class: PatternClass,
    regex: Regex,
}

impl InjectionPattern {
    fn compile(id: &'static str, class: PatternClass, source: &str) -> Self {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .expect("injection pattern must compile");
        Self { id, class, regex }
    }

    /// Stable identifier reported when this pattern trips.
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn class(&self) -> PatternClass {
        self.class
    }

    /// Regex source, for log fields.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

const PHRASES: &[(&str, PatternClass, &str)] = &[
    (
        "ignore_instructions",
        PatternClass::InstructionOverride,
        r"ignore\s+(?:all\s+)?(?:previous|prior)\s+instructions",
    ),
    (
        "disregard_previous",
        PatternClass::InstructionOverride,
        r"disregard\s+(?:all\s+)?(?:previous|prior)",
    ),
    ("forget_everything", PatternClass::InstructionOverride, r"forget\s+everything"),
    ("new_instructions", PatternClass::InstructionOverride, r"new\s+instructions:"),
    ("system_prompt", PatternClass::InstructionOverride, r"system\s+prompt:"),
    ("you_are_now", PatternClass::RoleReassignment, r"you\s+are\s+now"),
    ("act_as_if", PatternClass::RoleReassignment, r"act\s+as\s+if"),
    ("pretend_to_be", PatternClass::RoleReassignment, r"pretend\s+to\s+be"),
];

const INPUT_ONLY: &[(&str, PatternClass, &str)] = &[
    ("system_role", PatternClass::RoleReassignment, r"system\s*:"),
    ("assistant_role", PatternClass::RoleReassignment, r"assistant\s*:"),
    ("script_tag", PatternClass::MarkupInjection, r"<script"),
    ("javascript_uri", PatternClass::MarkupInjection, r"javascript:"),
    ("event_handler", PatternClass::MarkupInjection, r"on\w+\s*="),
];

static CONTENT_PATTERNS: LazyLock<Vec<InjectionPattern>> = LazyLock::new(|| {
    PHRASES
        .iter()
        .map(|&(id, class, src)| InjectionPattern::compile(id, class, src))
        .collect()
});

static INPUT_PATTERNS: LazyLock<Vec<InjectionPattern>> = LazyLock::new(|| {
    PHRASES
        .iter()
        .chain(INPUT_ONLY)
        .map(|&(id, class, src)| InjectionPattern::compile(id, class, src))
        .collect()
});

/// Patterns applied to fetched third-party content.
pub fn content_patterns() -> &'static [InjectionPattern] {
    &CONTENT_PATTERNS
}

/// Patterns applied to caller-supplied tags and notes.
pub fn input_patterns() -> &'static [InjectionPattern] {
    &INPUT_PATTERNS
}

/// First pattern in `patterns` matching `text`, in declaration order.
pub fn first_match<'a>(patterns: &'a [InjectionPattern], text: &str) -> Option<&'a InjectionPattern> {
    patterns.iter().find(|p| p.is_match(text))
}
