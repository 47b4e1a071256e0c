use serde::Serialize;

use super::domain::{Application, ApplicationStatus};

/// Per-status application counts. `total` always equals the sum of the five buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub reviewing: usize,
    pub approved: usize,
    pub rejected: usize,
    pub waitlisted: usize,
}

impl ApplicationStats {
    pub fn from_applications<'a, I>(applications: I) -> Self
    where
        I: IntoIterator<Item = &'a Application>,
    {
        Self::from_statuses(applications.into_iter().map(|application| application.status))
    }

    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ApplicationStatus>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut stats, status| {
                stats.total += 1;
                *stats.bucket_mut(status) += 1;
                stats
            })
    }

    pub fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Pending => self.pending,
            ApplicationStatus::Reviewing => self.reviewing,
            ApplicationStatus::Approved => self.approved,
            ApplicationStatus::Rejected => self.rejected,
            ApplicationStatus::Waitlisted => self.waitlisted,
        }
    }

    fn bucket_mut(&mut self, status: ApplicationStatus) -> &mut usize {
        match status {
            ApplicationStatus::Pending => &mut self.pending,
            ApplicationStatus::Reviewing => &mut self.reviewing,
            ApplicationStatus::Approved => &mut self.approved,
            ApplicationStatus::Rejected => &mut self.rejected,
            ApplicationStatus::Waitlisted => &mut self.waitlisted,
        }
    }

    /// Share of decided applications (approved, rejected, waitlisted), rounded to a whole percent.
    pub fn decided_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let decided = self.approved + self.rejected + self.waitlisted;
        ((decided as f64 / self.total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
