use serde::Serialize;

use super::auth::User;
use super::property::PropertyRecord;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Complete,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineStep {
    pub name: &'static str,
    pub status: StepStatus,
    pub date: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveTransaction {
    pub id: &'static str,
    pub title: &'static str,
    pub steps: Vec<TimelineStep>,
}

impl ActiveTransaction {
    /// Placeholder purchase shown to every signed-in buyer until a
    /// transaction service exists.
    pub fn sample() -> Self {
        let step = |name, status, date| TimelineStep { name, status, date };
        Self {
            id: "HW-HYD-8821",
            title: "Plot #102, Gachibowli",
            steps: vec![
                step("Plot Selection", StepStatus::Complete, "Oct 24"),
                step("Token Payment", StepStatus::Complete, "Oct 26"),
                step("Legal Verification", StepStatus::Current, "In Progress"),
                step("Sale Agreement", StepStatus::Upcoming, "Est. Nov 5"),
                step("Registration", StepStatus::Upcoming, "Est. Nov 20"),
            ],
        }
    }

    pub fn current_step(&self) -> Option<&TimelineStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Current)
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: User,
    pub saved_properties: Vec<PropertyRecord>,
    pub active_transaction: ActiveTransaction,
}
