use academy_portal::access::RoleDirectory;
use academy_portal::store::PortalStore;
use academy_portal::workflows::admissions::{
    ApplicationReviewService, ReviewPolicy, TracingNotifier,
};
use academy_portal::workflows::catalog::CatalogService;
use academy_portal::workflows::cohort::CohortService;
use academy_portal::workflows::curriculum::CurriculumLibrary;
use academy_portal::workflows::students::StudentService;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ReviewService = ApplicationReviewService<PortalStore, TracingNotifier>;

/// Every portal service, sharing one store handle.
#[derive(Clone)]
pub(crate) struct PortalServices {
    pub(crate) applications: Arc<ReviewService>,
    pub(crate) catalog: Arc<CatalogService<PortalStore>>,
    pub(crate) cohort: Arc<CohortService<PortalStore>>,
    pub(crate) curriculum: Arc<CurriculumLibrary<PortalStore>>,
    pub(crate) students: Arc<StudentService<PortalStore>>,
    pub(crate) roles: Arc<RoleDirectory<PortalStore>>,
}

impl PortalServices {
    pub(crate) fn new(store: Arc<PortalStore>, policy: ReviewPolicy) -> Self {
        Self {
            applications: Arc::new(ApplicationReviewService::new(
                store.clone(),
                Arc::new(TracingNotifier),
                policy,
            )),
            catalog: Arc::new(CatalogService::new(store.clone())),
            cohort: Arc::new(CohortService::new(store.clone())),
            curriculum: Arc::new(CurriculumLibrary::new(store.clone())),
            students: Arc::new(StudentService::new(store.clone())),
            roles: Arc::new(RoleDirectory::new(store)),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
