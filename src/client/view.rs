use crate::types::StudentRecord;
use serde::Serialize;

/// What the front end shows. Records only ever come from the latest read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub student_name_input: String,
    pub search_id_input: String,
    selected: Option<StudentRecord>,
    modal_open: bool,
    directory_generation: u64,
}

impl ViewState {
    #[must_use]
    pub const fn selected(&self) -> Option<&StudentRecord> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Bumped each time the directory list must be re-fetched.
    #[must_use]
    pub const fn directory_generation(&self) -> u64 {
        self.directory_generation
    }

    pub(crate) fn show(&mut self, record: StudentRecord) {
        self.selected = Some(record);
        self.modal_open = true;
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn open_modal(&mut self) {
        self.modal_open = true;
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    pub(crate) fn invalidate_directory(&mut self) {
        self.directory_generation = self.directory_generation.wrapping_add(1);
    }
}
