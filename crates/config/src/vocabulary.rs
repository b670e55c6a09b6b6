//! Context vocabulary: area gazetteer, service synonyms and intent keywords
//!
//! These tables drive context extraction. The built-in defaults cover Abu
//! Dhabi and Dubai districts and common home-service trades; a deployment can
//! replace them with a YAML file (see `Settings::vocabulary_path`).
//!
//! Table order matters: when several entries match a message, the entry
//! declared first wins.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Maps a user-facing keyword or synonym to a canonical service type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceKeyword {
    pub keyword: String,
    pub canonical: String,
}

/// Maps a keyword to a coarse user intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentKeyword {
    pub keyword: String,
    pub intent: String,
}

/// Context vocabulary loaded from vocabulary.yaml or built in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVocabulary {
    /// Known area names, lower-case
    #[serde(default = "default_gazetteer")]
    pub gazetteer: Vec<String>,

    /// Keyword → canonical service type, in tie-break order
    #[serde(default = "default_service_keywords")]
    pub service_keywords: Vec<ServiceKeyword>,

    /// Keyword → intent, in tie-break order
    #[serde(default = "default_intent_keywords")]
    pub intent_keywords: Vec<IntentKeyword>,
}

impl Default for ContextVocabulary {
    fn default() -> Self {
        Self {
            gazetteer: default_gazetteer(),
            service_keywords: default_service_keywords(),
            intent_keywords: default_intent_keywords(),
        }
    }
}

impl ContextVocabulary {
    /// Load from a YAML file. Missing tables fall back to the built-in ones.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let vocabulary: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let vocabulary = vocabulary.normalized();
        vocabulary.validate()?;

        tracing::info!(
            path = %path.as_ref().display(),
            areas = vocabulary.gazetteer.len(),
            service_keywords = vocabulary.service_keywords.len(),
            service_types = vocabulary.canonical_service_types().len(),
            "Loaded context vocabulary"
        );

        Ok(vocabulary)
    }

    /// Lower-case and trim every entry
    pub fn normalized(mut self) -> Self {
        for area in &mut self.gazetteer {
            *area = area.trim().to_lowercase();
        }
        for entry in &mut self.service_keywords {
            entry.keyword = entry.keyword.trim().to_lowercase();
            entry.canonical = entry.canonical.trim().to_lowercase();
        }
        for entry in &mut self.intent_keywords {
            entry.keyword = entry.keyword.trim().to_lowercase();
            entry.intent = entry.intent.trim().to_lowercase();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gazetteer.is_empty() {
            return Err(ConfigError::MissingField("vocabulary.gazetteer".to_string()));
        }
        if self.service_keywords.is_empty() {
            return Err(ConfigError::MissingField(
                "vocabulary.service_keywords".to_string(),
            ));
        }
        if let Some(area) = self.gazetteer.iter().find(|a| a.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "vocabulary.gazetteer".to_string(),
                message: format!("Empty area name '{}'", area),
            });
        }
        if let Some(entry) = self
            .service_keywords
            .iter()
            .find(|e| e.keyword.trim().is_empty() || e.canonical.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "vocabulary.service_keywords".to_string(),
                message: format!(
                    "Empty keyword or canonical type ('{}' -> '{}')",
                    entry.keyword, entry.canonical
                ),
            });
        }
        if let Some(entry) = self
            .intent_keywords
            .iter()
            .find(|e| e.keyword.trim().is_empty() || e.intent.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "vocabulary.intent_keywords".to_string(),
                message: format!("Empty keyword or intent ('{}' -> '{}')", entry.keyword, entry.intent),
            });
        }
        Ok(())
    }

    /// Distinct canonical service types, in declaration order
    pub fn canonical_service_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for entry in &self.service_keywords {
            if !seen.contains(&entry.canonical.as_str()) {
                seen.push(entry.canonical.as_str());
            }
        }
        seen
    }
}

fn default_gazetteer() -> Vec<String> {
    [
        // Abu Dhabi
        "al reem",
        "reem island",
        "yas island",
        "saadiyat",
        "al raha",
        "khalifa city",
        "mohammed bin zayed city",
        "mbz city",
        "mussafah",
        "al reef",
        "al khalidiyah",
        "al bateen",
        "al mushrif",
        "al nahyan",
        "corniche",
        "al maryah",
        "masdar city",
        "al shamkha",
        "al ain",
        // Dubai
        "dubai marina",
        "jumeirah",
        "downtown dubai",
        "business bay",
        "al barsha",
        "deira",
        "bur dubai",
        "jlt",
        "palm jumeirah",
        "mirdif",
        "al quoz",
        "silicon oasis",
        // Northern emirates
        "sharjah",
        "ajman",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_service_keywords() -> Vec<ServiceKeyword> {
    [
        ("ac repair", "ac repair"),
        ("air conditioner", "ac repair"),
        ("air conditioning", "ac repair"),
        ("hvac", "ac repair"),
        ("ac", "ac repair"),
        ("a/c", "ac repair"),
        ("plumber", "plumbing"),
        ("plumbers", "plumbing"),
        ("plumbing", "plumbing"),
        ("leak", "plumbing"),
        ("leaking", "plumbing"),
        ("pipe", "plumbing"),
        ("electrician", "electrical"),
        ("electrical", "electrical"),
        ("wiring", "electrical"),
        ("power outage", "electrical"),
        ("cleaning", "cleaning"),
        ("cleaner", "cleaning"),
        ("cleaners", "cleaning"),
        ("maid", "cleaning"),
        ("deep clean", "cleaning"),
        ("pest control", "pest control"),
        ("pest", "pest control"),
        ("cockroach", "pest control"),
        ("painter", "painting"),
        ("painting", "painting"),
        ("carpenter", "carpentry"),
        ("carpentry", "carpentry"),
        ("furniture assembly", "carpentry"),
        ("movers", "moving"),
        ("moving", "moving"),
        ("relocation", "moving"),
        ("handyman", "handyman"),
        ("washing machine", "appliance repair"),
        ("fridge", "appliance repair"),
        ("refrigerator", "appliance repair"),
        ("appliance", "appliance repair"),
        ("gardener", "gardening"),
        ("gardening", "gardening"),
        ("landscaping", "gardening"),
    ]
    .into_iter()
    .map(|(keyword, canonical)| ServiceKeyword {
        keyword: keyword.to_string(),
        canonical: canonical.to_string(),
    })
    .collect()
}

fn default_intent_keywords() -> Vec<IntentKeyword> {
    [
        ("book", "booking"),
        ("booking", "booking"),
        ("appointment", "booking"),
        ("schedule", "booking"),
        ("price", "pricing"),
        ("prices", "pricing"),
        ("cost", "pricing"),
        ("how much", "pricing"),
        ("quote", "pricing"),
        ("available", "availability"),
        ("availability", "availability"),
        ("today", "availability"),
        ("tomorrow", "availability"),
        ("need", "find_service"),
        ("looking for", "find_service"),
        ("find", "find_service"),
        ("recommend", "find_service"),
    ]
    .into_iter()
    .map(|(keyword, intent)| IntentKeyword {
        keyword: keyword.to_string(),
        intent: intent.to_string(),
    })
    .collect()
}
