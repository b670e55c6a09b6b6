//! Context extraction
//!
//! Pulls location, service type and intent signals out of a chat message
//! using the tables in [`ContextVocabulary`]. All functions are pure.
//!
//! Matching works on a normalised form of the message: lower-cased, with
//! every non-alphanumeric character replaced by a space.
//!
//! - Areas match as whole words or whole-word phrases.
//! - Service and intent keywords are substrings anchored at a word start, so
//!   `electrician` also matches "electricians" and `ac` never fires inside
//!   "place". A keyword whose last word is shorter than
//!   [`MIN_STEM_CHARS`] may only grow by a plural `s` ("ACs" but not
//!   "across").

use chat_router_config::ContextVocabulary;
use chat_router_core::{ContextUpdate, Message, Role};

/// Shortest final keyword word that may match as a word-start prefix
pub const MIN_STEM_CHARS: usize = 3;

/// Lower-case `text` and collapse every run of non-alphanumerics to one space
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Normalised message padded with spaces, ready for phrase lookups
struct Haystack(String);

impl Haystack {
    fn new(text: &str) -> Self {
        Self(format!(" {} ", normalize(text)))
    }

    fn contains_phrase(&self, phrase: &str) -> bool {
        let phrase = normalize(phrase);
        !phrase.is_empty() && self.0.contains(&format!(" {} ", phrase))
    }

    fn contains_keyword(&self, keyword: &str) -> bool {
        let keyword = normalize(keyword);
        let last_word = keyword.rsplit(' ').next().unwrap_or_default();
        if last_word.is_empty() {
            return false;
        }
        if last_word.chars().count() >= MIN_STEM_CHARS {
            return self.0.contains(&format!(" {}", keyword));
        }
        self.0.contains(&format!(" {} ", keyword)) || self.0.contains(&format!(" {}s ", keyword))
    }
}

/// Rule-based extractor over a context vocabulary
#[derive(Debug, Clone, Default)]
pub struct ContextExtractor {
    vocabulary: ContextVocabulary,
}

impl ContextExtractor {
    pub fn new(vocabulary: ContextVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &ContextVocabulary {
        &self.vocabulary
    }

    /// Area named in `message`, else the first area named by an earlier
    /// user turn in `history`
    ///
    /// The current message always wins. History is scanned oldest first and
    /// only user-role messages are considered.
    pub fn extract_location(&self, message: &str, history: &[Message]) -> Option<String> {
        if let Some(area) = self.location_in(message) {
            return Some(area);
        }

        history
            .iter()
            .filter(|m| m.role == Role::User)
            .find_map(|m| self.location_in(&m.content))
    }

    /// Canonical service type of the first keyword, in table order, that
    /// occurs in `message`
    pub fn extract_service_type(&self, message: &str) -> Option<String> {
        let haystack = Haystack::new(message);
        self.vocabulary
            .service_keywords
            .iter()
            .find(|entry| haystack.contains_keyword(&entry.keyword))
            .map(|entry| entry.canonical.clone())
    }

    /// Coarse intent of `message` (booking, pricing, availability, find_service)
    pub fn extract_intent(&self, message: &str) -> Option<String> {
        let haystack = Haystack::new(message);
        self.vocabulary
            .intent_keywords
            .iter()
            .find(|entry| haystack.contains_keyword(&entry.keyword))
            .map(|entry| entry.intent.clone())
    }

    /// Everything extractable from one turn, as a partial session update
    pub fn extract(&self, message: &str, history: &[Message]) -> ContextUpdate {
        let update = ContextUpdate {
            service_type: self.extract_service_type(message),
            location: self.extract_location(message, history),
            user_intent: self.extract_intent(message),
        };

        tracing::debug!(
            service_type = ?update.service_type,
            location = ?update.location,
            user_intent = ?update.user_intent,
            "Extracted context"
        );

        update
    }

    fn location_in(&self, text: &str) -> Option<String> {
        let haystack = Haystack::new(text);
        self.vocabulary
            .gazetteer
            .iter()
            .find(|area| haystack.contains_phrase(area))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_router_config::ServiceKeyword;

    fn extractor() -> ContextExtractor {
        ContextExtractor::default()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Fix my A/C, in Al-Reem!! "), "fix my a c in al reem");
        assert_eq!(normalize("?!"), "");
    }

    #[test]
    fn test_location_from_message() {
        let ex = extractor();
        assert_eq!(
            ex.extract_location("I need a plumber in Al Reem", &[]).as_deref(),
            Some("al reem")
        );
        assert_eq!(
            ex.extract_location("anyone on YAS ISLAND?", &[]).as_deref(),
            Some("yas island")
        );
        assert_eq!(ex.extract_location("hello", &[]), None);
    }

    #[test]
    fn test_location_message_beats_history() {
        let ex = extractor();
        let history = vec![Message::user("I live in Saadiyat")];
        assert_eq!(
            ex.extract_location("actually I'm in khalifa city now", &history).as_deref(),
            Some("khalifa city")
        );
    }

    #[test]
    fn test_location_from_first_user_turn_in_history() {
        let ex = extractor();
        let history = vec![
            Message::assistant("Which area are you in? Al Reem or Yas Island?"),
            Message::user("mussafah please"),
            Message::user("or maybe al raha"),
        ];
        assert_eq!(
            ex.extract_location("need a cleaner", &history).as_deref(),
            Some("mussafah")
        );
    }

    #[test]
    fn test_service_type_synonyms() {
        let ex = extractor();
        for msg in ["fix my ac", "HVAC is broken", "my air conditioner leaks water"] {
            assert_eq!(ex.extract_service_type(msg).as_deref(), Some("ac repair"), "{msg}");
        }
        assert_eq!(ex.extract_service_type("need a plumber").as_deref(), Some("plumbing"));
        assert_eq!(ex.extract_service_type("hello"), None);
    }

    #[test]
    fn test_service_type_whole_word_only() {
        let ex = extractor();
        assert_eq!(ex.extract_service_type("what a nice place"), None);
    }

    #[test]
    fn test_service_type_plural_keywords() {
        let ex = extractor();
        let cases = [
            ("need electricians in al reem", "electrical"),
            ("any painters around?", "painting"),
            ("carpenters for shelves", "carpentry"),
            ("two ACs broken", "ac repair"),
            ("need a cleaner", "cleaning"),
        ];
        for (msg, expected) in cases {
            assert_eq!(ex.extract_service_type(msg).as_deref(), Some(expected), "{msg}");
        }
    }

    #[test]
    fn test_short_keyword_does_not_prefix_match() {
        let ex = extractor();
        assert_eq!(ex.extract_service_type("shortcut across town"), None);
        assert_eq!(ex.extract_service_type("update my account"), None);
    }

    #[test]
    fn test_service_type_tie_break_is_table_order() {
        let mut vocab = ContextVocabulary::default();
        vocab.service_keywords = vec![
            ServiceKeyword {
                keyword: "leak".into(),
                canonical: "plumbing".into(),
            },
            ServiceKeyword {
                keyword: "ac".into(),
                canonical: "ac repair".into(),
            },
        ];
        let ex = ContextExtractor::new(vocab);
        // Both keywords occur; the one declared first wins regardless of position
        assert_eq!(
            ex.extract_service_type("my ac has a leak").as_deref(),
            Some("plumbing")
        );
    }

    #[test]
    fn test_intent() {
        let ex = extractor();
        assert_eq!(ex.extract_intent("how much for a deep clean").as_deref(), Some("pricing"));
        assert_eq!(ex.extract_intent("can I book tomorrow").as_deref(), Some("booking"));
        assert_eq!(ex.extract_intent("hi"), None);
    }

    #[test]
    fn test_extract_combines_signals() {
        let ex = extractor();
        let update = ex.extract("I need a plumber in Al Reem", &[]);
        assert_eq!(update.location.as_deref(), Some("al reem"));
        assert_eq!(update.service_type.as_deref(), Some("plumbing"));
        assert_eq!(update.user_intent.as_deref(), Some("find_service"));

        assert!(ex.extract("hello", &[]).is_empty());
    }
}
