use crate::doctor::HealthRecord;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTab {
    #[default]
    HealthRecords,
    LabResults,
    Medications,
    ClinicalNotes,
}

impl RecordTab {
    pub const ALL: [RecordTab; 4] = [
        RecordTab::HealthRecords,
        RecordTab::LabResults,
        RecordTab::Medications,
        RecordTab::ClinicalNotes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RecordTab::HealthRecords => "Health Records",
            RecordTab::LabResults => "Lab Results",
            RecordTab::Medications => "Medications",
            RecordTab::ClinicalNotes => "Clinical Notes",
        }
    }

    /// Data category recorded in access logs.
    pub fn category(self) -> &'static str {
        match self {
            RecordTab::HealthRecords => "health_records",
            RecordTab::LabResults => "lab_results",
            RecordTab::Medications => "medications",
            RecordTab::ClinicalNotes => "clinical_notes",
        }
    }
}

impl FromStr for RecordTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordTab::ALL
            .into_iter()
            .find(|t| t.category() == s.trim())
            .ok_or_else(|| format!("unknown record tab: {s}"))
    }
}

/// What the selected tab shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabContent<'a> {
    Records(&'a [HealthRecord]),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordViewState {
    tab: RecordTab,
    records: Vec<HealthRecord>,
}

impl RecordViewState {
    pub fn tab(&self) -> RecordTab {
        self.tab
    }

    pub fn records(&self) -> &[HealthRecord] {
        &self.records
    }

    pub fn select_tab(&mut self, tab: RecordTab) {
        self.tab = tab;
    }

    pub fn content(&self) -> TabContent<'_> {
        match self.tab {
            RecordTab::HealthRecords => TabContent::Records(&self.records),
            RecordTab::LabResults => TabContent::Placeholder("Lab results content"),
            RecordTab::Medications => TabContent::Placeholder("Medications content"),
            RecordTab::ClinicalNotes => TabContent::Placeholder("Clinical notes content"),
        }
    }

    pub(crate) fn load(&mut self, records: Vec<HealthRecord>) {
        self.tab = RecordTab::default();
        self.records = records;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_health_records;

    #[test]
    fn first_tab_lists_loaded_records() {
        let mut state = RecordViewState::default();
        state.load(test_health_records());
        match state.content() {
            TabContent::Records(records) => assert_eq!(records.len(), 2),
            other => panic!("expected records, got {other:?}"),
        }
    }

    #[test]
    fn other_tabs_show_placeholders() {
        let mut state = RecordViewState::default();
        state.select_tab(RecordTab::Medications);
        assert_eq!(
            state.content(),
            TabContent::Placeholder("Medications content")
        );
        assert_eq!("clinical_notes".parse(), Ok(RecordTab::ClinicalNotes));
    }
}
