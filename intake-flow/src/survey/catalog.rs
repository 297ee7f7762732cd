//! Survey catalog
//!
//! The ordered question set plus the checks that make it a well-formed
//! graph. The shipped questionnaire is a single path with four
//! yes→detail detours that rejoin the main path, ending in the
//! instructional photo hand-off.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::answers::QuestionId;
use crate::error::{Error, Result};
use crate::routes::{NextStep, Route};
use crate::survey::question::{ChoiceOption, OptionValue, QuestionKind, SurveyQuestion};

/// Validated, ordered set of survey questions
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyCatalog {
    questions: Vec<SurveyQuestion>,
}

impl SurveyCatalog {
    /// Build a catalog, rejecting graphs with dangling or missing edges
    pub fn new(questions: Vec<SurveyQuestion>) -> Result<Self> {
        if questions.is_empty() {
            return Err(Error::Catalog("catalog has no questions".to_string()));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(Error::Catalog(format!("duplicate question id: {}", question.id)));
            }
        }

        for question in &questions {
            validate_question(question, &seen)?;
        }

        Ok(Self { questions })
    }

    /// Parse and validate a JSON array of questions
    pub fn from_json_str(json: &str) -> Result<Self> {
        let questions: Vec<SurveyQuestion> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Load a JSON catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(intake_common::Error::from)?;
        let catalog = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            questions = catalog.len(),
            "Loaded survey catalog"
        );
        Ok(catalog)
    }

    /// Serialize to the same JSON shape `from_json_str` accepts
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.questions)?)
    }

    pub fn get(&self, id: QuestionId) -> Option<&SurveyQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Like `get`, for ids that must be present
    pub fn require(&self, id: QuestionId) -> Result<&SurveyQuestion> {
        self.get(id)
            .ok_or_else(|| Error::QuestionNotFound(id.to_string()))
    }

    /// Entry point of the flow
    pub fn first(&self) -> &SurveyQuestion {
        // Non-empty is checked in `new`
        &self.questions[0]
    }

    pub fn questions(&self) -> &[SurveyQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Position among answerable (non-instructional) questions
    pub fn answerable_index(&self, id: QuestionId) -> Option<usize> {
        self.questions
            .iter()
            .filter(|q| q.records_answer())
            .position(|q| q.id == id)
    }

    /// The questionnaire shipped with the clinic app
    pub fn builtin() -> Self {
        Self { questions: builtin_questions() }
    }

    pub fn builtin_shared() -> Arc<Self> {
        Arc::new(Self::builtin())
    }
}

fn validate_question(question: &SurveyQuestion, known: &HashSet<QuestionId>) -> Result<()> {
    let id = question.id;

    for target in question.targets() {
        if let NextStep::Question(target_id) = target {
            if !known.contains(target_id) {
                return Err(Error::Catalog(format!(
                    "{} leads to unknown question {}",
                    id, target_id
                )));
            }
        }
    }

    if question.kind.is_choice() {
        if question.options.is_empty() {
            return Err(Error::Catalog(format!("{} is a choice question without options", id)));
        }
        for (index, option) in question.options.iter().enumerate() {
            if question.option_target(index).is_none() {
                return Err(Error::Catalog(format!(
                    "{} option \"{}\" has no next step and no question default",
                    id, option.label
                )));
            }
            let value_fits = match (question.kind, &option.value) {
                (QuestionKind::YesNo, OptionValue::Flag(_)) => true,
                (QuestionKind::MultipleChoice, OptionValue::Code(_)) => true,
                _ => false,
            };
            if !value_fits {
                return Err(Error::Catalog(format!(
                    "{} option \"{}\" has a value of the wrong type",
                    id, option.label
                )));
            }
        }
    } else {
        if !question.options.is_empty() {
            return Err(Error::Catalog(format!("{} is not a choice question but has options", id)));
        }
        if question.next.is_none() {
            return Err(Error::Catalog(format!("{} has no next step", id)));
        }
    }

    Ok(())
}

fn go(id: QuestionId) -> NextStep {
    NextStep::Question(id)
}

fn yes_no(no: NextStep, yes: NextStep) -> [ChoiceOption; 2] {
    [
        ChoiceOption::new("Hayır", OptionValue::Flag(false)).then(no),
        ChoiceOption::new("Evet", OptionValue::Flag(true)).then(yes),
    ]
}

fn code(label: &str, value: &str) -> ChoiceOption {
    ChoiceOption::new(label, OptionValue::Code(value.to_string()))
}

fn yes_no_question(
    id: QuestionId,
    title: &str,
    subtitle: Option<&str>,
    no: NextStep,
    yes: NextStep,
) -> SurveyQuestion {
    let mut question = SurveyQuestion::new(id, QuestionKind::YesNo, title);
    if let Some(subtitle) = subtitle {
        question = question.with_subtitle(subtitle);
    }
    yes_no(no, yes)
        .into_iter()
        .fold(question, |q, option| q.with_option(option))
}

fn builtin_questions() -> Vec<SurveyQuestion> {
    use QuestionId::*;
    use QuestionKind::*;

    vec![
        SurveyQuestion::new(Name, ShortText, "Adınız ve soyadınız nedir?")
            .with_subtitle("Size daha kişisel bir deneyim sunabilmemiz için")
            .with_placeholder("Adınız Soyadınız")
            .then(go(Age)),
        SurveyQuestion::new(Age, NumericText, "Yaşınız kaç?")
            .with_subtitle("Bu bilgi tedavi planınızı oluşturmamıza yardımcı olur")
            .with_placeholder("Örn: 35")
            .then(go(PreviousTransplant)),
        yes_no_question(
            PreviousTransplant,
            "Daha önce saç ekimi operasyonu geçirdiniz mi?",
            None,
            go(ChronicIllness),
            go(ChronicIllness),
        ),
        yes_no_question(
            ChronicIllness,
            "Teşhisi konmuş kronik bir rahatsızlığınız var mı?",
            Some("Diyabet, hipertansiyon, kalp hastalığı vb."),
            go(RegularMedication),
            go(ChronicIllnessDetails),
        ),
        SurveyQuestion::new(
            ChronicIllnessDetails,
            LongText,
            "Rahatsızlığınızı ve kullandığınız ilaçları belirtir misiniz?",
        )
        .with_placeholder("Örn: Tip 2 Diyabet - Metformin kullanıyorum")
        .then(go(RegularMedication)),
        yes_no_question(
            RegularMedication,
            "Düzenli kullandığınız bir ilaç var mı?",
            Some("Vitamin, takviye dahil"),
            go(Allergies),
            go(MedicationDetails),
        ),
        SurveyQuestion::new(MedicationDetails, LongText, "Hangi ilaçları kullanıyorsunuz?")
            .with_placeholder("Örn: D vitamini, Omega 3, Aspirin")
            .then(go(Allergies)),
        yes_no_question(
            Allergies,
            "Herhangi bir şeye alerjiniz var mı?",
            Some("İlaç, besin, lateks vb."),
            go(Smoking),
            go(AllergyDetails),
        ),
        SurveyQuestion::new(AllergyDetails, LongText, "Alerjilerinizi belirtir misiniz?")
            .with_placeholder("Örn: Penisilin, Polen, Fındık")
            .then(go(Smoking)),
        SurveyQuestion::new(Smoking, MultipleChoice, "Sigara kullanıyor musunuz?")
            .with_option(code("Hiç kullanmadım", "never"))
            .with_option(code("Günde 1-10 adet", "1-10"))
            .with_option(code("Günde 10+ adet", "10+"))
            .then(go(HairLossPattern)),
        SurveyQuestion::new(HairLossPattern, MultipleChoice, "Saç dökülmenizi nasıl tanımlarsınız?")
            .with_option(code("Ön çizgim geriledi", "receding").with_subtitle("Alın bölgesinde saç kaybı"))
            .with_option(code("Tepemde açılma var", "crown").with_subtitle("Tepe bölgesinde saç kaybı"))
            .with_option(
                code("Genel seyreklik", "overall")
                    .with_subtitle("Saçlarımın tamamı incelmiş/seyrekleşmiş"),
            )
            .then(go(PreviousTreatments)),
        yes_no_question(
            PreviousTreatments,
            "Daha önce saç dökülmesi için tedavi aldınız mı?",
            Some("İlaç, serum, PRP, mezoterapi vb."),
            go(FamilyHistory),
            go(TreatmentDetails),
        ),
        SurveyQuestion::new(TreatmentDetails, LongText, "Hangi tedavileri denediniz?")
            .with_placeholder("Örn: 6 ay Minoxidil kullandım, PRP tedavisi gördüm")
            .then(go(FamilyHistory)),
        yes_no_question(
            FamilyHistory,
            "Ailenizde saç dökülmesi öyküsü var mı?",
            Some("Anne, baba veya kardeşlerinizde"),
            go(Expectations),
            go(Expectations),
        ),
        SurveyQuestion::new(Expectations, LongText, "Saç ekiminden temel beklentiniz nedir?")
            .with_subtitle("Size en uygun planı hazırlamamız için bu çok önemli")
            .with_placeholder("Örn: Daha dolgun görünmek istiyorum...")
            .then(go(PhotoIntro)),
        SurveyQuestion::new(PhotoIntro, Instructional, "Teşekkürler, {name}!")
            .with_subtitle("Şimdi durumunuzu net görebilmemiz için fotoğraflara ihtiyacımız var.")
            .then(NextStep::Exit(Route::ModeSelection)),
    ]
}

/// Preparation checklist shown on the instructional photo step
pub const PHOTO_PREPARATION: [&str; 4] = [
    "İyi ışık alan bir odada çekim yapın",
    "Düz, tek renkli bir arka plan önünde durun",
    "Saçlarınız kuru ve düz olsun",
    "Şapka veya aksesuar kullanmayın",
];
