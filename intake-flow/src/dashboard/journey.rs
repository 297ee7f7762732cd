//! Treatment journey and pre-operation checklist

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JourneyStep {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub status: JourneyStatus,
    pub date: Option<&'static str>,
    pub details: &'static [&'static str],
}

pub const JOURNEY_STEPS: [JourneyStep; 6] = [
    JourneyStep {
        id: "consultation",
        title: "Online Konsültasyon",
        description: "Fotoğraf analizi ve değerlendirme",
        status: JourneyStatus::Completed,
        date: Some("28 Ekim 2024"),
        details: &[
            "Fotoğraflarınız başarıyla alındı",
            "Uzman ekibimiz tarafından analiz edildi",
            "Önerilen greft sayısı: 4.500-5.000",
        ],
    },
    JourneyStep {
        id: "pre-op",
        title: "Operasyon Öncesi Hazırlık",
        description: "Kontrol listesi ve talimatlar",
        status: JourneyStatus::Current,
        date: Some("1-3 Kasım 2024"),
        details: &[
            "Kan sulandırıcı ilaçları bırakın",
            "Alkol ve sigara kullanımını durdurun",
            "Rahat kıyafetler hazırlayın",
            "Ulaşım planınızı yapın",
        ],
    },
    JourneyStep {
        id: "operation-day",
        title: "Operasyon Günü",
        description: "Saç ekimi prosedürü",
        status: JourneyStatus::Upcoming,
        date: Some("4 Kasım 2024"),
        details: &[
            "Kliniğe geliş: 09:00",
            "İşlem süresi: 6-8 saat",
            "Yerel anestezi uygulanacak",
            "Öğle yemeği molası verilecek",
        ],
    },
    JourneyStep {
        id: "first-wash",
        title: "İlk Yıkama",
        description: "Klinik kontrolü ve yıkama eğitimi",
        status: JourneyStatus::Upcoming,
        date: Some("7 Kasım 2024"),
        details: &[
            "Klinikte ilk yıkama yapılacak",
            "Ev yıkama teknikleri öğretilecek",
            "Yıkama ürünleri verilecek",
            "Video talimatları izleyin",
        ],
    },
    JourneyStep {
        id: "shock-loss",
        title: "Şok Dökülme",
        description: "Ekilen saçlar geçici olarak dökülür",
        status: JourneyStatus::Upcoming,
        date: Some("15 Kasım - 15 Aralık 2024"),
        details: &[
            "Bu tamamen normal bir süreçtir",
            "Kök hücreler zarar görmez",
            "Yeni saçlar 3. aydan itibaren çıkar",
            "Endişelenmeyin, koordinatörünüzle iletişimde kalın",
        ],
    },
    JourneyStep {
        id: "month-12",
        title: "12. Ay (Final)",
        description: "Son sonuç",
        status: JourneyStatus::Upcoming,
        date: Some("4 Kasım 2025"),
        details: &[
            "Nihai sonuç değerlendirmesi",
            "%90-95 saç çıkışı",
            "Öncesi/sonrası karşılaştırma",
            "İşlem tamamlanmış olur",
        ],
    },
];

/// Read model over a journey step list
#[derive(Debug, Clone, Copy)]
pub struct Journey {
    steps: &'static [JourneyStep],
}

impl Default for Journey {
    fn default() -> Self {
        Self::new(&JOURNEY_STEPS)
    }
}

impl Journey {
    pub fn new(steps: &'static [JourneyStep]) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &'static [JourneyStep] {
        self.steps
    }

    /// The step in progress, if any
    pub fn current(&self) -> Option<&'static JourneyStep> {
        self.steps.iter().find(|s| s.status == JourneyStatus::Current)
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == JourneyStatus::Completed)
            .count()
    }

    pub fn find(&self, id: &str) -> Option<&'static JourneyStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// The first-wash step links to its washing videos until done
    pub fn shows_wash_videos(step: &JourneyStep) -> bool {
        step.id == "first-wash" && step.status != JourneyStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistStatus {
    Completed,
    Pending,
    Todo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub status: ChecklistStatus,
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub const PRE_OP_CHECKLIST: [ChecklistItem; 6] = [
    ChecklistItem {
        status: ChecklistStatus::Completed,
        title: "Online konsültasyon tamamlandı",
        subtitle: "2 gün önce",
    },
    ChecklistItem {
        status: ChecklistStatus::Completed,
        title: "Kan tahlilleri yüklendi",
        subtitle: "1 gün önce",
    },
    ChecklistItem {
        status: ChecklistStatus::Completed,
        title: "Ulaşım detayları onaylandı",
        subtitle: "1 gün önce",
    },
    ChecklistItem {
        status: ChecklistStatus::Pending,
        title: "Operasyon öncesi 24 saat video izle",
        subtitle: "Yakında",
    },
    ChecklistItem {
        status: ChecklistStatus::Todo,
        title: "Operasyon günü alkol/kafein almayın",
        subtitle: "Operasyon günü",
    },
    ChecklistItem {
        status: ChecklistStatus::Todo,
        title: "Rahat kıyafetler giyin",
        subtitle: "Operasyon günü",
    },
];

/// "3/6 Tamamlandı"
pub fn checklist_badge(items: &[ChecklistItem]) -> String {
    let done = items
        .iter()
        .filter(|i| i.status == ChecklistStatus::Completed)
        .count();
    format!("{}/{} Tamamlandı", done, items.len())
}
