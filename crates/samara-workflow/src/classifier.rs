//! Keyword-based intent classification.
//!
//! Free-text prompts are classified into a set of boolean flags via
//! case-insensitive substring matching against a fixed keyword table.
//! All keywords are compiled into a single [`AhoCorasick`] automaton;
//! every overlapping match sets the flag its keyword is mapped to.
//!
//! This is a best-effort heuristic, not language understanding: the
//! table is deliberately small and enumerable so it stays unit-testable
//! and can be swapped for a real classifier without touching pipeline
//! sequencing.  Substring containment has known quirks (e.g. "budget"
//! contains "get"), inherited knowingly.

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Keyword table
// ---------------------------------------------------------------------------

/// The flag a keyword sets when found in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    DataSource,
    Document,
    Deck,
    Mail,
    Meeting,
    TaskList,
    Merge,
    Analyze,
    Summarize,
    Create,
    Extract,
}

/// Keyword → flag rules.  A keyword may appear under several flags and
/// multiple flags may be set by one prompt; nothing here is mutually
/// exclusive.
const RULES: &[(&str, Flag)] = &[
    ("excel", Flag::DataSource),
    ("spreadsheet", Flag::DataSource),
    ("budget", Flag::DataSource),
    ("merge", Flag::DataSource),
    ("word", Flag::Document),
    ("document", Flag::Document),
    ("report", Flag::Document),
    ("summary", Flag::Document),
    ("powerpoint", Flag::Deck),
    ("presentation", Flag::Deck),
    ("slides", Flag::Deck),
    ("email", Flag::Mail),
    ("send", Flag::Mail),
    ("notify", Flag::Mail),
    ("meeting", Flag::Meeting),
    ("schedule", Flag::Meeting),
    ("task", Flag::TaskList),
    ("planner", Flag::TaskList),
    ("action item", Flag::TaskList),
    ("merge", Flag::Merge),
    ("combine", Flag::Merge),
    ("consolidate", Flag::Merge),
    ("analyze", Flag::Analyze),
    ("analysis", Flag::Analyze),
    ("insights", Flag::Analyze),
    ("summary", Flag::Summarize),
    ("summarize", Flag::Summarize),
    ("overview", Flag::Summarize),
    ("create", Flag::Create),
    ("generate", Flag::Create),
    ("make", Flag::Create),
    ("extract", Flag::Extract),
    ("pull", Flag::Extract),
    ("get", Flag::Extract),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Verb-level action flags detected in the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags {
    pub merge: bool,
    pub analyze: bool,
    pub summarize: bool,
    pub create: bool,
    pub extract: bool,
}

impl ActionFlags {
    /// Number of action flags that are set.
    pub fn count(&self) -> usize {
        [
            self.merge,
            self.analyze,
            self.summarize,
            self.create,
            self.extract,
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }
}

/// The classified intent of a prompt.
///
/// Derived once per run and immutable afterward; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub needs_data_source: bool,
    pub needs_document: bool,
    pub needs_deck: bool,
    pub needs_mail: bool,
    pub needs_meeting: bool,
    pub needs_task_list: bool,
    pub actions: ActionFlags,
}

impl Intent {
    /// Number of application-level flags that are set.
    pub fn app_count(&self) -> usize {
        [
            self.needs_data_source,
            self.needs_document,
            self.needs_deck,
            self.needs_mail,
            self.needs_meeting,
            self.needs_task_list,
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }

    fn set(&mut self, flag: Flag) {
        match flag {
            Flag::DataSource => self.needs_data_source = true,
            Flag::Document => self.needs_document = true,
            Flag::Deck => self.needs_deck = true,
            Flag::Mail => self.needs_mail = true,
            Flag::Meeting => self.needs_meeting = true,
            Flag::TaskList => self.needs_task_list = true,
            Flag::Merge => self.actions.merge = true,
            Flag::Analyze => self.actions.analyze = true,
            Flag::Summarize => self.actions.summarize = true,
            Flag::Create => self.actions.create = true,
            Flag::Extract => self.actions.extract = true,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Compiled keyword matcher.
///
/// Build once and reuse; the automaton is immutable after construction.
pub struct IntentClassifier {
    automaton: AhoCorasick,
}

impl IntentClassifier {
    /// Compile the fixed keyword table.
    pub fn new() -> Self {
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(RULES.iter().map(|(keyword, _)| *keyword))
            .expect("static keyword table always builds");
        Self { automaton }
    }

    /// Classify a prompt into an [`Intent`].
    ///
    /// Every overlapping keyword occurrence sets its flag; repeated
    /// occurrences are idempotent.
    pub fn classify(&self, prompt: &str) -> Intent {
        let mut intent = Intent::default();
        for mat in self.automaton.find_overlapping_iter(prompt) {
            let (_, flag) = RULES[mat.pattern().as_usize()];
            intent.set(flag);
        }
        debug!(
            apps = intent.app_count(),
            actions = intent.actions.count(),
            "classified intent"
        );
        intent
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(prompt: &str) -> Intent {
        IntentClassifier::new().classify(prompt)
    }

    #[test]
    fn excel_and_email_set_only_their_flags() {
        let intent = classify("Take the excel numbers and email them around");
        assert!(intent.needs_data_source);
        assert!(intent.needs_mail);
        assert!(!intent.needs_deck);
        assert!(!intent.needs_meeting);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let intent = classify("Build a POWERPOINT from the Budget SPREADSHEET");
        assert!(intent.needs_deck);
        assert!(intent.needs_data_source);
    }

    #[test]
    fn merge_sets_both_data_source_and_action() {
        let intent = classify("merge the quarterly files");
        assert!(intent.needs_data_source);
        assert!(intent.actions.merge);
    }

    #[test]
    fn multi_word_keyword_matches() {
        let intent = classify("add an action item for the team");
        assert!(intent.needs_task_list);
    }

    #[test]
    fn substring_quirk_is_inherited() {
        // "budget" contains "get", so the extract action fires too.
        let intent = classify("check the budget");
        assert!(intent.needs_data_source);
        assert!(intent.actions.extract);
    }

    #[test]
    fn unrelated_prompt_sets_nothing() {
        let intent = classify("hello there");
        assert_eq!(intent, Intent::default());
        assert_eq!(intent.app_count(), 0);
        assert_eq!(intent.actions.count(), 0);
    }

    #[test]
    fn counts_reflect_set_flags() {
        let intent = classify("write a summary of the excel budget and email finance");
        // "summary" sets both the document flag and the summarize action;
        // excel/budget set data source; email sets mail.
        assert_eq!(intent.app_count(), 3);
        assert!(intent.actions.summarize);
    }
}
