//! Verification code extraction from a single message.
//!
//! A message is a verification message when its text contains one of the
//! trigger keywords. The code is the leftmost run of 4 to 6 ASCII digits.
//!
//! CHANGELOG:
//! - 10/18/2026 - Injectable keyword set, case-insensitive matching
//! - 10/18/2026 - Initial extractor

use regex::Regex;
use std::sync::LazyLock;

use crate::db::source::Message;

/// Default trigger keywords ("verification code" and its common variants).
pub const DEFAULT_KEYWORDS: [&str; 4] = ["验证码", "校验码", "动态码", "短信码"];

// ASCII only: `\d` in the regex crate also matches non-ASCII digits.
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4,6}").expect("code pattern is valid"));

/// Outcome of examining the latest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    Found,
    NoCodeInMessage,
    NotAVerificationMessage,
    NoMessage,
}

/// Extracted code plus the reason it is (or is not) present.
///
/// `code` is `Some` exactly when `status` is `Found`; the constructors are the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    code: Option<String>,
    status: ExtractionStatus,
}

impl ExtractionResult {
    fn found(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            status: ExtractionStatus::Found,
        }
    }

    fn without_code(status: ExtractionStatus) -> Self {
        debug_assert_ne!(status, ExtractionStatus::Found);
        Self { code: None, status }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn status(&self) -> ExtractionStatus {
        self.status
    }
}

/// Trigger substrings that mark a message as a verification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    // Stored lowercased so matching ignores case in cased scripts.
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a set from arbitrary keywords. Blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True if any keyword occurs anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let haystack = text.to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

/// Stateless extractor; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct CodeExtractor {
    keywords: KeywordSet,
}

impl CodeExtractor {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    /// Classify the latest message (or its absence) and pull out the code.
    pub fn extract(&self, latest: Option<&Message>) -> ExtractionResult {
        match latest {
            None => ExtractionResult::without_code(ExtractionStatus::NoMessage),
            Some(message) => self.extract_text(&message.text),
        }
    }

    /// Same as [`extract`](Self::extract) for raw message text.
    pub fn extract_text(&self, text: &str) -> ExtractionResult {
        if !self.keywords.matches(text) {
            return ExtractionResult::without_code(ExtractionStatus::NotAVerificationMessage);
        }

        match CODE_PATTERN.find(text) {
            Some(m) => ExtractionResult::found(m.as_str()),
            None => ExtractionResult::without_code(ExtractionStatus::NoCodeInMessage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(text: &str) -> Message {
        Message {
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_six_digit_code() {
        let result = CodeExtractor::default().extract_text("您的验证码是123456,请勿泄露");
        assert_eq!(result.status(), ExtractionStatus::Found);
        assert_eq!(result.code(), Some("123456"));
    }

    #[test]
    fn test_seven_digit_run_takes_first_six() {
        let result = CodeExtractor::default().extract_text("您的验证码是1234567");
        assert_eq!(result.code(), Some("123456"));
    }

    #[test]
    fn test_not_a_verification_message() {
        let extractor = CodeExtractor::default();
        let result = extractor.extract_text("Hello, how are you?");
        assert_eq!(result.status(), ExtractionStatus::NotAVerificationMessage);
        assert_eq!(result.code(), None);

        // Digits alone are not enough
        let result = extractor.extract_text("Your order 883921 has shipped");
        assert_eq!(result.status(), ExtractionStatus::NotAVerificationMessage);
    }

    #[test]
    fn test_keyword_without_digits() {
        let result = CodeExtractor::default().extract_text("您的校验码发送失败");
        assert_eq!(result.status(), ExtractionStatus::NoCodeInMessage);
        assert_eq!(result.code(), None);
    }

    #[test]
    fn test_short_runs_are_skipped() {
        let extractor = CodeExtractor::default();
        let result = extractor.extract_text("动态码 123 有效期 5 分钟");
        assert_eq!(result.status(), ExtractionStatus::NoCodeInMessage);

        let result = extractor.extract_text("短信码: 12 3 0456 (5分钟内有效)");
        assert_eq!(result.code(), Some("0456"));
    }

    #[test]
    fn test_first_run_wins() {
        let result = CodeExtractor::default().extract_text("【银行】尾号8812的验证码为 902113");
        assert_eq!(result.code(), Some("8812"));
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let result = CodeExtractor::default().extract_text("验证码：004512");
        assert_eq!(result.code(), Some("004512"));
    }

    #[test]
    fn test_fullwidth_digits_ignored() {
        let result = CodeExtractor::default().extract_text("验证码：１２３４５６");
        assert_eq!(result.status(), ExtractionStatus::NoCodeInMessage);
    }

    #[test]
    fn test_absent_message() {
        let result = CodeExtractor::default().extract(None);
        assert_eq!(result.status(), ExtractionStatus::NoMessage);
        assert_eq!(result.code(), None);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = CodeExtractor::default();
        let msg = message("您的验证码是654321");
        assert_eq!(extractor.extract(Some(&msg)), extractor.extract(Some(&msg)));
    }

    #[test]
    fn test_custom_keywords_case_insensitive() {
        let extractor = CodeExtractor::new(KeywordSet::new(["verification code", "  "]));
        let result = extractor.extract_text("Your Verification Code is 4821");
        assert_eq!(result.code(), Some("4821"));

        // Default keywords are no longer active
        let result = extractor.extract_text("您的验证码是123456");
        assert_eq!(result.status(), ExtractionStatus::NotAVerificationMessage);
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let keywords = KeywordSet::new(Vec::<String>::new());
        assert!(keywords.is_empty());
        let result = CodeExtractor::new(keywords).extract_text("验证码 123456");
        assert_eq!(result.status(), ExtractionStatus::NotAVerificationMessage);
    }
}
