//! Patient dashboard read models
//!
//! Consumers of the photo store history and static clinic content; none
//! of these mutate intake state.

pub mod journey;
pub mod progress;
pub mod support;

pub use journey::{
    checklist_badge, ChecklistItem, ChecklistStatus, Journey, JourneyStatus, JourneyStep,
    JOURNEY_STEPS, PRE_OP_CHECKLIST,
};
pub use progress::{ComparisonPair, ProgressBoard, ProgressView};
pub use support::{
    ChatMessage, ContactChannel, FaqAccordion, FaqItem, Sender, SupportChat, AUTO_REPLY, CONTACTS,
    FAQS,
};
