//! Intake session
//!
//! Composition root for one running intake: configuration, the survey
//! catalog, the two shared stores and the event bus. Engines are built
//! from the session and receive the stores by handle, so separate
//! sessions (one per test, say) never share state.

use std::sync::Arc;

use intake_common::config::IntakeConfig;
use intake_common::events::{CaptureMode, EventBus, IntakeEvent};
use tokio::sync::{broadcast, RwLock};
use tracing::info;

use crate::answers::AnswerStore;
use crate::capture::{CaptureEngine, CaptureProviders, CaptureSettings, Ticker};
use crate::dashboard::SupportChat;
use crate::error::Result;
use crate::photos::PhotoStore;
use crate::review::ReviewDesk;
use crate::survey::{AnswerRules, SurveyCatalog, SurveyEngine, SurveyNavigator};

pub struct IntakeSession {
    config: IntakeConfig,
    catalog: Arc<SurveyCatalog>,
    answers: Arc<RwLock<AnswerStore>>,
    photos: Arc<RwLock<PhotoStore>>,
    events: EventBus,
}

impl IntakeSession {
    /// Session using the configured catalog file, or the built-in one
    pub fn new(config: IntakeConfig) -> Result<Self> {
        let catalog = match &config.survey.catalog_path {
            Some(path) => SurveyCatalog::load(path)?,
            None => SurveyCatalog::builtin(),
        };
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: IntakeConfig, catalog: SurveyCatalog) -> Self {
        let events = EventBus::new(config.events.capacity);
        info!(
            questions = catalog.len(),
            event_capacity = events.capacity(),
            "Intake session created"
        );
        Self {
            config,
            catalog: Arc::new(catalog),
            answers: Arc::new(RwLock::new(AnswerStore::new())),
            photos: Arc::new(RwLock::new(PhotoStore::new())),
            events,
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SurveyCatalog {
        &self.catalog
    }

    pub fn answers(&self) -> Arc<RwLock<AnswerStore>> {
        Arc::clone(&self.answers)
    }

    pub fn photos(&self) -> Arc<RwLock<PhotoStore>> {
        Arc::clone(&self.photos)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.events.subscribe()
    }

    pub fn survey_engine(&self) -> SurveyEngine {
        SurveyEngine::new(Arc::clone(&self.catalog), AnswerRules::from(&self.config.survey))
            .with_events(self.events.clone())
    }

    pub fn navigator(&self) -> SurveyNavigator {
        SurveyNavigator::new(self.survey_engine(), self.answers())
    }

    /// Capture session writing into this session's photo set
    pub fn capture(
        &self,
        mode: CaptureMode,
        retake: Option<usize>,
        providers: CaptureProviders,
    ) -> Result<CaptureEngine> {
        let engine = CaptureEngine::new(
            mode,
            retake,
            self.photos(),
            providers,
            CaptureSettings::from(&self.config),
        )?;
        Ok(engine.with_events(self.events.clone()))
    }

    pub fn review(&self) -> ReviewDesk {
        ReviewDesk::new(self.answers(), self.photos()).with_events(self.events.clone())
    }

    pub fn support_chat(&self, ticker: Arc<dyn Ticker>) -> SupportChat {
        SupportChat::new(ticker).with_events(self.events.clone())
    }

    /// Start over: clear answers and working photos, keep history
    pub async fn restart(&self) {
        self.answers.write().await.reset();
        self.photos.write().await.clear_photos();
        info!("Intake restarted");
    }
}
