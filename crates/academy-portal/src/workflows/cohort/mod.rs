//! Program calendar milestones and the announcement board.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    Announcement, AnnouncementDraft, AnnouncementKind, AnnouncementStats, Audience, Milestone,
    MilestoneDraft, MilestoneFilter, MilestoneKind, MilestoneStats,
};
pub use router::cohort_router;
pub use service::CohortService;
