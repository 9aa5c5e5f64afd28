use crate::doctor::Patient;

pub const NO_RESULTS_MESSAGE: &str = "No patients found matching your search criteria";

/// Query and results of the patient search screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSearchState {
    query: String,
    results: Vec<Patient>,
    searched: bool,
    error: Option<String>,
}

impl PatientSearchState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Patient] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn find(&self, patient_id: &str) -> Option<&Patient> {
        self.results.iter().find(|p| p.id == patient_id)
    }

    /// The empty-state message, shown only after a search that found nobody.
    pub fn empty_message(&self) -> Option<&'static str> {
        let show = self.searched
            && self.results.is_empty()
            && !self.query.trim().is_empty()
            && self.error.is_none();
        show.then_some(NO_RESULTS_MESSAGE)
    }

    pub(crate) fn set_results(&mut self, results: Vec<Patient>) {
        self.results = results;
        self.searched = true;
        self.error = None;
    }

    pub(crate) fn set_failed(&mut self, error: String) {
        self.results.clear();
        self.searched = true;
        self.error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_patients;

    #[test]
    fn empty_message_needs_a_completed_search() {
        let mut state = PatientSearchState::default();
        state.set_query("Nobody");
        assert_eq!(state.empty_message(), None);

        state.set_results(Vec::new());
        assert_eq!(state.empty_message(), Some(NO_RESULTS_MESSAGE));

        state.set_failed("boom".into());
        assert_eq!(state.empty_message(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = PatientSearchState::default();
        state.set_query("John");
        state.set_results(test_patients());
        assert!(state.find("2").is_some());

        state.clear();
        assert_eq!(state, PatientSearchState::default());
    }
}
