use serde::{Deserialize, Serialize};

/// Planning session header: which period, region, and manager the grid
/// belongs to. Carried verbatim into assembled payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanContext {
    pub period: String,
    pub region: String,
    pub manager: String,
}

impl PlanContext {
    pub fn new(
        period: impl Into<String>,
        region: impl Into<String>,
        manager: impl Into<String>,
    ) -> Self {
        Self { period: period.into(), region: region.into(), manager: manager.into() }
    }

    /// Short reference string used to tag audit events.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.period, self.region)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "draft",
            SubmissionStatus::Submitted => "submitted",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "draft" => Some(SubmissionStatus::Draft),
            "submitted" => Some(SubmissionStatus::Submitted),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_joins_period_and_region() {
        let context = PlanContext::new("2026-09", "north", "s.oliveira");
        assert_eq!(context.reference(), "2026-09/north");
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [SubmissionStatus::Draft, SubmissionStatus::Submitted] {
            assert_eq!(SubmissionStatus::from_label(status.as_str()), Some(status));
        }
        assert_eq!(SubmissionStatus::from_label("finalized"), None);
    }
}
