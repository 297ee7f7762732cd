//! Survey question definitions

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerValue, QuestionId};
use crate::routes::NextStep;

/// How a question is presented and answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Single-line free text
    ShortText,
    /// Integer-like text with inclusive bounds
    NumericText,
    /// Multi-line free text with a minimum length
    LongText,
    /// Two options, each carrying its own next step
    YesNo,
    /// Option cards sharing (or overriding) a next step
    MultipleChoice,
    /// Information only, no answer recorded
    Instructional,
}

impl QuestionKind {
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::YesNo | QuestionKind::MultipleChoice)
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            QuestionKind::ShortText | QuestionKind::NumericText | QuestionKind::LongText
        )
    }
}

/// Value carried by a selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Code(String),
}

impl OptionValue {
    pub fn to_answer(&self) -> AnswerValue {
        match self {
            OptionValue::Flag(b) => AnswerValue::Flag(*b),
            OptionValue::Code(code) => AnswerValue::Choice(code.clone()),
        }
    }
}

/// A selectable option of a yes/no or multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub value: OptionValue,
    /// Option-level target; None defers to the question's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextStep>,
}

impl ChoiceOption {
    pub fn new(label: &str, value: OptionValue) -> Self {
        Self {
            label: label.to_string(),
            subtitle: None,
            value,
            next: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn then(mut self, next: NextStep) -> Self {
        self.next = Some(next);
        self
    }
}

/// Static definition of one survey step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    /// Question-level default next step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextStep>,
}

impl SurveyQuestion {
    pub fn new(id: QuestionId, kind: QuestionKind, title: &str) -> Self {
        Self {
            id,
            kind,
            title: title.to_string(),
            subtitle: None,
            placeholder: None,
            options: Vec::new(),
            next: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_option(mut self, option: ChoiceOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn then(mut self, next: NextStep) -> Self {
        self.next = Some(next);
        self
    }

    /// Instructional steps never write to the answer store
    pub fn records_answer(&self) -> bool {
        self.kind != QuestionKind::Instructional
    }

    /// Effective target of option `index`: its own target, else the question default
    pub fn option_target(&self, index: usize) -> Option<&NextStep> {
        let option = self.options.get(index)?;
        option.next.as_ref().or(self.next.as_ref())
    }

    /// Every next step this question can lead to
    pub fn targets(&self) -> impl Iterator<Item = &NextStep> {
        self.next
            .iter()
            .chain(self.options.iter().filter_map(|o| o.next.as_ref()))
    }
}
