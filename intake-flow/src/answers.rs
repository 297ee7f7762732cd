//! Answer store
//!
//! In-memory map of question id → answer. Created empty when the
//! survey starts, filled one answer at a time as the patient advances,
//! and cleared on restart or after a successful submission.
//!
//! The store does not validate answer shape; input rules live in the
//! survey engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Identifier of a survey step
///
/// Every answer key is a variant here, so the store can only ever hold
/// known question ids. `PhotoIntro` is the instructional hand-off step
/// and never carries an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionId {
    Name,
    Age,
    PreviousTransplant,
    ChronicIllness,
    ChronicIllnessDetails,
    RegularMedication,
    MedicationDetails,
    Allergies,
    AllergyDetails,
    Smoking,
    HairLossPattern,
    PreviousTreatments,
    TreatmentDetails,
    FamilyHistory,
    Expectations,
    #[serde(rename = "photo-intro")]
    PhotoIntro,
}

impl QuestionId {
    pub const ALL: [QuestionId; 16] = [
        QuestionId::Name,
        QuestionId::Age,
        QuestionId::PreviousTransplant,
        QuestionId::ChronicIllness,
        QuestionId::ChronicIllnessDetails,
        QuestionId::RegularMedication,
        QuestionId::MedicationDetails,
        QuestionId::Allergies,
        QuestionId::AllergyDetails,
        QuestionId::Smoking,
        QuestionId::HairLossPattern,
        QuestionId::PreviousTreatments,
        QuestionId::TreatmentDetails,
        QuestionId::FamilyHistory,
        QuestionId::Expectations,
        QuestionId::PhotoIntro,
    ];

    /// Wire name used in routes and submission payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionId::Name => "name",
            QuestionId::Age => "age",
            QuestionId::PreviousTransplant => "previousTransplant",
            QuestionId::ChronicIllness => "chronicIllness",
            QuestionId::ChronicIllnessDetails => "chronicIllnessDetails",
            QuestionId::RegularMedication => "regularMedication",
            QuestionId::MedicationDetails => "medicationDetails",
            QuestionId::Allergies => "allergies",
            QuestionId::AllergyDetails => "allergyDetails",
            QuestionId::Smoking => "smoking",
            QuestionId::HairLossPattern => "hairLossPattern",
            QuestionId::PreviousTreatments => "previousTreatments",
            QuestionId::TreatmentDetails => "treatmentDetails",
            QuestionId::FamilyHistory => "familyHistory",
            QuestionId::Expectations => "expectations",
            QuestionId::PhotoIntro => "photo-intro",
        }
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown question id: {}", s))
    }
}

/// A recorded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free text or integer-like text
    Text(String),
    /// Yes/no answer
    Flag(bool),
    /// Code of the selected option in a multiple-choice group
    Choice(String),
}

impl AnswerValue {
    /// Text as the patient would see it pre-filled in an input box
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Text(s) | AnswerValue::Choice(s) => s.clone(),
            AnswerValue::Flag(b) => b.to_string(),
        }
    }
}

/// Number of progress steps before any optional detail question opens
pub const BASE_STEP_COUNT: usize = 10;

/// Yes/no questions whose "yes" opens a follow-up detail question
pub const DETAIL_BRANCHES: [(QuestionId, QuestionId); 4] = [
    (QuestionId::ChronicIllness, QuestionId::ChronicIllnessDetails),
    (QuestionId::RegularMedication, QuestionId::MedicationDetails),
    (QuestionId::Allergies, QuestionId::AllergyDetails),
    (QuestionId::PreviousTreatments, QuestionId::TreatmentDetails),
];

/// In-memory answer record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStore {
    answers: BTreeMap<QuestionId, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the answer for `id`
    pub fn update(&mut self, id: QuestionId, value: AnswerValue) {
        self.answers.insert(id, value);
    }

    /// Clear every answer (flow restart or after submission)
    pub fn reset(&mut self) {
        self.answers.clear();
    }

    pub fn get(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(&id)
    }

    /// Present and, for text answers, not blank
    pub fn is_answered(&self, id: QuestionId) -> bool {
        match self.answers.get(&id) {
            Some(AnswerValue::Text(s)) | Some(AnswerValue::Choice(s)) => !s.is_empty(),
            Some(AnswerValue::Flag(_)) => true,
            None => false,
        }
    }

    pub fn flag(&self, id: QuestionId) -> Option<bool> {
        match self.answers.get(&id) {
            Some(AnswerValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text(&self, id: QuestionId) -> Option<&str> {
        match self.answers.get(&id) {
            Some(AnswerValue::Text(s)) | Some(AnswerValue::Choice(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn patient_name(&self) -> Option<&str> {
        self.text(QuestionId::Name).filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.answers.iter().map(|(k, v)| (*k, v))
    }

    /// Total progress steps for the current answers
    ///
    /// Base count plus one for every detail branch whose parent was
    /// answered "yes". Derived on every call, never stored.
    pub fn compute_total_steps(&self) -> usize {
        BASE_STEP_COUNT
            + DETAIL_BRANCHES
                .iter()
                .filter(|(parent, _)| self.flag(*parent) == Some(true))
                .count()
    }

    /// Answers as a JSON object keyed by wire id
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .answers
            .iter()
            .map(|(id, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (id.as_str().to_string(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_returns_latest_write() {
        let mut store = AnswerStore::new();
        store.update(QuestionId::Name, AnswerValue::Text("Ali".into()));
        store.update(QuestionId::Age, AnswerValue::Text("35".into()));
        store.update(QuestionId::Name, AnswerValue::Text("Ali Yılmaz".into()));

        assert_eq!(store.text(QuestionId::Name), Some("Ali Yılmaz"));
        assert_eq!(store.text(QuestionId::Age), Some("35"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_total_steps_without_detail_branches() {
        let mut store = AnswerStore::new();
        assert_eq!(store.compute_total_steps(), 10);

        store.update(QuestionId::PreviousTransplant, AnswerValue::Flag(false));
        store.update(QuestionId::ChronicIllness, AnswerValue::Flag(false));
        assert_eq!(store.compute_total_steps(), 10);
    }

    #[test]
    fn test_total_steps_grows_per_active_branch() {
        let mut store = AnswerStore::new();
        store.update(QuestionId::ChronicIllness, AnswerValue::Flag(true));
        store.update(QuestionId::ChronicIllnessDetails, AnswerValue::Text("asthma".into()));
        assert_eq!(store.compute_total_steps(), 11);

        store.update(QuestionId::PreviousTreatments, AnswerValue::Flag(true));
        store.update(QuestionId::Allergies, AnswerValue::Flag(true));
        store.update(QuestionId::RegularMedication, AnswerValue::Flag(true));
        assert_eq!(store.compute_total_steps(), 14);

        // Flipping a parent back to "no" closes its branch
        store.update(QuestionId::Allergies, AnswerValue::Flag(false));
        assert_eq!(store.compute_total_steps(), 13);
    }

    #[test]
    fn test_total_steps_independent_of_answer_order() {
        let mut forward = AnswerStore::new();
        let mut backward = AnswerStore::new();
        for (parent, _) in DETAIL_BRANCHES {
            forward.update(parent, AnswerValue::Flag(true));
        }
        for (parent, _) in DETAIL_BRANCHES.iter().rev() {
            backward.update(*parent, AnswerValue::Flag(true));
        }
        assert_eq!(forward.compute_total_steps(), 14);
        assert_eq!(forward.compute_total_steps(), backward.compute_total_steps());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = AnswerStore::new();
        store.update(QuestionId::Allergies, AnswerValue::Flag(true));
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.compute_total_steps(), BASE_STEP_COUNT);
    }

    #[test]
    fn test_blank_text_is_not_answered() {
        let mut store = AnswerStore::new();
        store.update(QuestionId::Name, AnswerValue::Text(String::new()));
        assert!(!store.is_answered(QuestionId::Name));
        assert_eq!(store.patient_name(), None);

        store.update(QuestionId::FamilyHistory, AnswerValue::Flag(false));
        assert!(store.is_answered(QuestionId::FamilyHistory));
    }

    #[test]
    fn test_question_id_wire_names_round_trip() {
        for id in QuestionId::ALL {
            assert_eq!(id.as_str().parse::<QuestionId>().unwrap(), id);
            let json = serde_json::to_value(id).unwrap();
            assert_eq!(json, serde_json::Value::String(id.as_str().to_string()));
        }
        assert!("welcome".parse::<QuestionId>().is_err());
    }

    #[test]
    fn test_to_json_uses_wire_names_and_native_types() {
        let mut store = AnswerStore::new();
        store.update(QuestionId::Smoking, AnswerValue::Choice("1-10".into()));
        store.update(QuestionId::FamilyHistory, AnswerValue::Flag(true));

        let json = store.to_json();
        assert_eq!(json["smoking"], "1-10");
        assert_eq!(json["familyHistory"], true);
    }
}
