use crate::doctor::VisitReason;
use serde::Serialize;

/// One entry of the visit-reason list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitReasonOption {
    pub value: VisitReason,
    pub label: &'static str,
    pub description: &'static str,
}

pub fn visit_reason_options() -> Vec<VisitReasonOption> {
    VisitReason::ALL
        .into_iter()
        .map(|value| VisitReasonOption {
            value,
            label: value.label(),
            description: value.description(),
        })
        .collect()
}

/// The confirm control is only enabled once a reason has been chosen.
pub fn can_confirm(selected: Option<VisitReason>) -> bool {
    selected.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_list_all_reasons_in_order() {
        let options = visit_reason_options();
        assert_eq!(options.len(), 5);
        assert_eq!(options[0].label, "Emergency Care");
        assert_eq!(options[3].value, VisitReason::FollowUp);
        assert_eq!(
            options[4].description,
            "Specialized medical consultation"
        );
    }

    #[test]
    fn confirm_requires_selection() {
        assert!(!can_confirm(None));
        assert!(can_confirm(Some(VisitReason::Referral)));
    }
}
