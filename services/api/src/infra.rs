use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use placement_cell::academics::AcademicsService;
use placement_cell::board::BoardService;
use placement_cell::config::AppConfig;
use placement_cell::identity::IdentityService;
use placement_cell::mailer::MemoryMailer;
use placement_cell::profiles::ProfileService;
use placement_cell::recruitment::RecruitmentService;
use placement_cell::settings::{MemorySettings, SettingsStore};
use placement_cell::store::MemoryStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// All five domain services wired to one shared in-memory store.
pub(crate) struct Portal {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) mailer: Arc<MemoryMailer>,
    pub(crate) identity: Arc<IdentityService<MemoryStore, MemoryMailer>>,
    pub(crate) profiles: Arc<ProfileService<MemoryStore>>,
    pub(crate) academics: Arc<AcademicsService<MemoryStore>>,
    pub(crate) recruitment: Arc<RecruitmentService<MemoryStore>>,
    pub(crate) board: Arc<BoardService<MemoryStore>>,
}

impl Portal {
    pub(crate) fn new(config: &AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(MemoryMailer::new());
        let settings: Arc<dyn SettingsStore> =
            Arc::new(MemorySettings::seeded(&config.academics));

        Self {
            identity: Arc::new(IdentityService::new(
                store.clone(),
                mailer.clone(),
                &config.verification,
            )),
            profiles: Arc::new(ProfileService::new(store.clone(), settings.clone())),
            academics: Arc::new(AcademicsService::new(store.clone(), settings.clone())),
            recruitment: Arc::new(RecruitmentService::new(store.clone())),
            board: Arc::new(BoardService::new(store.clone(), settings)),
            store,
            mailer,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
