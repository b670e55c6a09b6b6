//! User-facing response text
//!
//! Everything here is deterministic: the same records or the same
//! missing-context combination always produce the same text.

use std::fmt::Write;

use chat_router_core::ServiceRecord;
use unicode_segmentation::UnicodeSegmentation;

pub use chat_router_llm::FALLBACK_APOLOGY;

/// Asked when neither location nor service type is known
pub const CLARIFY_BOTH: &str =
    "I'd be happy to help! Could you tell me what service you need and which area you're in?";

/// Asked when only the location is missing
pub const CLARIFY_LOCATION: &str =
    "Which area are you located in? For example: Al Reem, Yas Island, or Khalifa City.";

/// Asked when only the service type is missing
pub const CLARIFY_SERVICE_TYPE: &str =
    "What type of service are you looking for? For example: AC repair, plumbing, or cleaning.";

/// Returned when routing fails unexpectedly
pub const ERROR_APOLOGY: &str =
    "Sorry, something went wrong while handling your request. Please try again in a moment.";

/// Longest description shown per record, in grapheme clusters
pub const DESCRIPTION_MAX_GRAPHEMES: usize = 120;

const STAR: &str = "⭐";

/// Clarifying question for the given (location known, type known) pair.
///
/// `None` means nothing is missing.
pub fn clarify_question(location_known: bool, service_type_known: bool) -> Option<&'static str> {
    match (location_known, service_type_known) {
        (false, false) => Some(CLARIFY_BOTH),
        (false, true) => Some(CLARIFY_LOCATION),
        (true, false) => Some(CLARIFY_SERVICE_TYPE),
        (true, true) => None,
    }
}

/// Numbered summary of matched records, in the order given
pub fn format_records(records: &[ServiceRecord]) -> String {
    let mut out = format!(
        "I found {} service(s) matching your request:\n",
        records.len()
    );

    for (i, record) in records.iter().enumerate() {
        out.push('\n');
        let _ = write!(out, "{}. {}", i + 1, record.name);
        let stars = star_count(record.rating);
        if stars > 0 {
            out.push(' ');
            out.push_str(&STAR.repeat(stars));
        }
        out.push('\n');

        let description = truncate_description(&record.description);
        if !description.is_empty() {
            let _ = writeln!(out, "   {}", description);
        }
        if let Some(price) = record.price {
            let _ = writeln!(out, "   Price: AED {:.2}", price);
        }
        if let Some(location) = record.location.as_deref().filter(|l| !l.trim().is_empty()) {
            let _ = writeln!(out, "   Location: {}", location);
        }
    }

    out.trim_end().to_string()
}

fn star_count(rating: Option<f32>) -> usize {
    match rating {
        Some(r) if r.is_finite() && r > 0.0 => r.round() as usize,
        _ => 0,
    }
}

fn truncate_description(description: &str) -> String {
    let description = description.trim();
    let graphemes: Vec<&str> = description.graphemes(true).collect();
    if graphemes.len() <= DESCRIPTION_MAX_GRAPHEMES {
        return description.to_string();
    }
    let mut truncated: String = graphemes[..DESCRIPTION_MAX_GRAPHEMES].concat();
    truncated.truncate(truncated.trim_end().len());
    truncated.push_str("...");
    truncated
}
