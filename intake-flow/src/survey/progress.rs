//! Survey progress indicator
//!
//! The step number shown in the progress bar is re-derived from which
//! answers are present, never stored. Each check below contributes one
//! step when it holds; detail checks only count while their parent is
//! answered "yes".

use serde::Serialize;

use crate::answers::{AnswerStore, QuestionId};

/// One ordered contribution to the effective step number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCheck {
    /// Answer present and not blank
    Answered(QuestionId),
    /// Yes/no answer present (either value)
    Decided(QuestionId),
    /// Parent answered "yes" and its detail answered
    Detail {
        parent: QuestionId,
        detail: QuestionId,
    },
}

impl ProgressCheck {
    pub fn holds(&self, answers: &AnswerStore) -> bool {
        match *self {
            ProgressCheck::Answered(id) => answers.is_answered(id),
            ProgressCheck::Decided(id) => answers.flag(id).is_some(),
            ProgressCheck::Detail { parent, detail } => {
                answers.flag(parent) == Some(true) && answers.is_answered(detail)
            }
        }
    }
}

/// Checks in the order the progress bar evaluates them
pub const PROGRESS_CHECKS: [ProgressCheck; 14] = [
    ProgressCheck::Answered(QuestionId::Name),
    ProgressCheck::Answered(QuestionId::Age),
    ProgressCheck::Decided(QuestionId::PreviousTransplant),
    ProgressCheck::Decided(QuestionId::ChronicIllness),
    ProgressCheck::Detail {
        parent: QuestionId::ChronicIllness,
        detail: QuestionId::ChronicIllnessDetails,
    },
    ProgressCheck::Decided(QuestionId::RegularMedication),
    ProgressCheck::Detail {
        parent: QuestionId::RegularMedication,
        detail: QuestionId::MedicationDetails,
    },
    ProgressCheck::Decided(QuestionId::Allergies),
    ProgressCheck::Detail {
        parent: QuestionId::Allergies,
        detail: QuestionId::AllergyDetails,
    },
    ProgressCheck::Answered(QuestionId::Smoking),
    ProgressCheck::Answered(QuestionId::HairLossPattern),
    ProgressCheck::Decided(QuestionId::PreviousTreatments),
    ProgressCheck::Detail {
        parent: QuestionId::PreviousTreatments,
        detail: QuestionId::TreatmentDetails,
    },
    ProgressCheck::Decided(QuestionId::FamilyHistory),
];

/// Number of progress checks that currently hold
pub fn effective_step(answers: &AnswerStore) -> usize {
    PROGRESS_CHECKS
        .iter()
        .filter(|check| check.holds(answers))
        .count()
}

/// What the progress bar renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub current: usize,
    pub total: usize,
    pub percent: u8,
}

impl ProgressSnapshot {
    pub fn from_answers(answers: &AnswerStore) -> Self {
        Self::new(effective_step(answers), answers.compute_total_steps())
    }

    pub fn new(current: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((current as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
        };
        Self { current, total, percent }
    }

    /// "Adım 3 / 10"
    pub fn label(&self) -> String {
        format!("Adım {} / {}", self.current, self.total)
    }
}
