use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{OptionId, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question has no answer options")]
    NoOptions,

    #[error("correct option {0} is not among the answer options")]
    UnknownCorrectOption(OptionId),
}

/// Read-only reference data for a single quiz question.
///
/// Supplied by the content collaborator and immutable for the lifetime of a
/// session; the engine never mutates or persists question records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    id: QuestionId,
    stem: String,
    options: BTreeMap<OptionId, String>,
    correct_option_id: OptionId,
    explanation: String,
    topic: String,
}

impl QuestionRecord {
    /// Build a validated question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` if the option map is empty and
    /// `QuestionError::UnknownCorrectOption` if the correct option id is not
    /// one of the offered options.
    pub fn new(
        id: QuestionId,
        stem: impl Into<String>,
        options: BTreeMap<OptionId, String>,
        correct_option_id: OptionId,
        explanation: impl Into<String>,
        topic: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if !options.contains_key(&correct_option_id) {
            return Err(QuestionError::UnknownCorrectOption(correct_option_id));
        }

        Ok(Self {
            id,
            stem: stem.into(),
            options,
            correct_option_id,
            explanation: explanation.into(),
            topic: topic.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<OptionId, String> {
        &self.options
    }

    #[must_use]
    pub fn correct_option_id(&self) -> &OptionId {
        &self.correct_option_id
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the chosen option is the correct one.
    #[must_use]
    pub fn is_correct(&self, chosen: &OptionId) -> bool {
        &self.correct_option_id == chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(ids: &[&str]) -> BTreeMap<OptionId, String> {
        ids.iter()
            .map(|id| (OptionId::new(*id), format!("option {id}")))
            .collect()
    }

    #[test]
    fn rejects_missing_correct_option() {
        let err = QuestionRecord::new(
            QuestionId::new("q1"),
            "2 + 2 = ?",
            options(&["a", "b"]),
            OptionId::new("c"),
            "",
            "arithmetic",
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::UnknownCorrectOption(_)));
    }

    #[test]
    fn grades_chosen_options() {
        let question = QuestionRecord::new(
            QuestionId::new("q1"),
            "2 + 2 = ?",
            options(&["a", "b"]),
            OptionId::new("b"),
            "four",
            "arithmetic",
        )
        .unwrap();

        assert!(question.is_correct(&OptionId::new("b")));
        assert!(!question.is_correct(&OptionId::new("a")));
    }
}
