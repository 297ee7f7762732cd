//! Support tab: FAQ, contact channels and the coordinator chat

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use intake_common::events::{EventBus, IntakeEvent};
use intake_common::time;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::capture::capabilities::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaqItem {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQS: [FaqItem; 5] = [
    FaqItem {
        question: "Operasyondan önce hangi ilaçları bırakmalıyım?",
        answer: "Operasyondan 1 hafta önce aspirin, ibuprofen ve diğer kan sulandırıcı ilaçları bırakmalısınız. Düzenli kullandığınız ilaçlar varsa, mutlaka koordinatörünüze bildirin.",
    },
    FaqItem {
        question: "Operasyon ne kadar sürer?",
        answer: "Saç ekimi operasyonu genellikle 6-8 saat sürer. Bu süre, eklenecek greft sayısına göre değişebilir. İşlem sırasında öğle yemeği molası verilir.",
    },
    FaqItem {
        question: "Operasyon ağrılı mı?",
        answer: "Hayır. Operasyon yerel anestezi altında yapılır, bu nedenle ağrı hissetmezsiniz. Enjeksiyon sırasında hafif bir rahatsızlık yaşayabilirsiniz, ancak bu çok kısa sürer.",
    },
    FaqItem {
        question: "Ne zaman işe dönebilirim?",
        answer: "Operasyondan 3-5 gün sonra işe dönebilirsiniz. Ancak ilk 10 gün boyunca ağır egzersiz ve ter gerektiren aktivitelerden kaçınmalısınız.",
    },
    FaqItem {
        question: "Şok dökülme nedir?",
        answer: "Operasyondan 2-4 hafta sonra ekilen saçların geçici olarak dökülmesi normal bir süreçtir. Bu \"şok dökülme\" olarak adlandırılır. Endişelenmeyin, saç kökleri zarar görmez ve 3. aydan itibaren yeni saçlar çıkmaya başlar.",
    },
];

/// At most one FAQ answer is expanded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaqAccordion {
    open: Option<usize>,
}

impl FaqAccordion {
    /// Open `index`, or close it if it is already open
    pub fn toggle(&mut self, index: usize) {
        self.open = if self.open == Some(index) { None } else { Some(index) };
    }

    pub fn open(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContactChannel {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub details: &'static str,
    /// Link opened when the card is tapped
    pub uri: &'static str,
}

pub const CONTACTS: [ContactChannel; 4] = [
    ContactChannel {
        title: "Telefon",
        subtitle: "+90 212 XXX XX XX",
        details: "Pzt - Cuma: 09:00 - 18:00",
        uri: "tel:+902120000000",
    },
    ContactChannel {
        title: "WhatsApp",
        subtitle: "+90 555 XXX XX XX",
        details: "7/24 Aktif",
        uri: "https://wa.me/905550000000",
    },
    ContactChannel {
        title: "E-posta",
        subtitle: "info@smilehairclinic.com",
        details: "24 saat içinde yanıt",
        uri: "mailto:info@smilehairclinic.com",
    },
    ContactChannel {
        title: "Acil Hat",
        subtitle: "+90 555 123 45 67",
        details: "7/24 Acil Destek",
        uri: "tel:+905551234567",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Patient,
    Coordinator,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Patient => "patient",
            Sender::Coordinator => "coordinator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: Sender, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.to_string(),
            timestamp,
        }
    }

    /// "14:05"
    pub fn clock(&self) -> String {
        time::clock_label(self.timestamp)
    }
}

pub const AUTO_REPLY: &str = "Mesajınızı aldım. En kısa sürede size dönüş yapacağım.";
pub const AUTO_REPLY_DELAY: Duration = Duration::from_secs(2);

fn seed_thread(now: DateTime<Utc>) -> Vec<ChatMessage> {
    let minutes_ago = |m: i64| now - chrono::Duration::minutes(m);
    vec![
        ChatMessage::new(
            Sender::Coordinator,
            "Merhaba! Ben hasta koordinatörünüz Ayşe. Size nasıl yardımcı olabilirim?",
            minutes_ago(120),
        ),
        ChatMessage::new(
            Sender::Patient,
            "Merhaba, operasyon sonrası ilk yıkamayı ne zaman yapmalıyım?",
            minutes_ago(115),
        ),
        ChatMessage::new(
            Sender::Coordinator,
            "İlk yıkamanız operasyondan 3 gün sonra kliniğimizde yapılacaktır. Size hatırlatma göndereceğiz. Yıkama videolarını \"Gelişimim\" bölümünden izleyebilirsiniz.",
            minutes_ago(110),
        ),
    ]
}

/// Patient ↔ coordinator chat thread
///
/// Until a messaging backend exists the coordinator answers every
/// patient message with a canned reply after a short delay.
#[derive(Clone)]
pub struct SupportChat {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
    ticker: Arc<dyn Ticker>,
    reply_delay: Duration,
    events: Option<EventBus>,
}

impl std::fmt::Debug for SupportChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportChat")
            .field("reply_delay", &self.reply_delay)
            .finish_non_exhaustive()
    }
}

impl SupportChat {
    /// Thread seeded with the coordinator's greeting
    pub fn new(ticker: Arc<dyn Ticker>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(seed_thread(time::now()))),
            ticker,
            reply_delay: AUTO_REPLY_DELAY,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Post a patient message and schedule the coordinator reply
    ///
    /// Blank input is ignored and returns None. Otherwise returns the
    /// handle of the pending auto-reply.
    pub async fn send(&self, text: &str) -> Option<JoinHandle<()>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Blank chat message ignored");
            return None;
        }

        self.post(ChatMessage::new(Sender::Patient, text, time::now())).await;

        let chat = self.clone();
        Some(tokio::spawn(async move {
            chat.ticker.wait(chat.reply_delay).await;
            chat.post(ChatMessage::new(Sender::Coordinator, AUTO_REPLY, time::now()))
                .await;
        }))
    }

    async fn post(&self, message: ChatMessage) {
        info!(message_id = %message.id, sender = message.sender.as_str(), "Chat message posted");
        if let Some(events) = &self.events {
            events.emit_lossy(IntakeEvent::ChatMessagePosted {
                message_id: message.id,
                sender: message.sender.as_str().to_string(),
                timestamp: message.timestamp,
            });
        }
        self.messages.write().await.push(message);
    }
}
