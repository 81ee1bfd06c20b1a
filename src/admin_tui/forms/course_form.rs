use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use super::{signal_after_validation, submission};
use crate::{
    admin_tui::{
        components::form_field::{Form, FormField, FormFieldType, FormInput},
        list_controller::FormMount,
        traits::{FormSignal, RecordForm},
    },
    api::RecordWriter,
    models::{Course, CoursePayload},
};

const NAME: usize = 0;
const CODE: usize = 1;
const HOURS: usize = 2;

/// Course form; the code is fixed once the course exists because updates
/// are addressed by it
pub struct CourseForm {
    form: Form,
    writer: Arc<dyn RecordWriter<CoursePayload>>,
    update_target: Option<String>,
}

impl CourseForm {
    pub fn new(writer: Arc<dyn RecordWriter<CoursePayload>>, mount: FormMount<Course>) -> Self {
        let update_target = mount.update_target();
        let course = mount.item_to_edit.as_ref();
        let hours = course.map(|c| c.hours.to_string()).unwrap_or_default();

        let form = Form::new(vec![
            FormField::new("Course name", FormFieldType::Text)
                .with_value(course.map_or("", |c| c.name.as_str()))
                .required(),
            FormField::new("Code", FormFieldType::Text)
                .with_value(course.map_or("", |c| c.code.as_str()))
                .read_only(mount.is_editing())
                .required(),
            FormField::new("Hours", FormFieldType::Number)
                .with_value(&hours)
                .required(),
        ]);

        Self {
            form,
            writer,
            update_target,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    fn payload(form: &Form) -> CoursePayload {
        CoursePayload {
            name: form.value(NAME),
            code: form.value(CODE),
            hours: form.get_field(HOURS).and_then(|f| f.as_number()).unwrap_or_default(),
        }
    }
}

impl RecordForm for CourseForm {
    fn title(&self) -> String {
        if self.update_target.is_some() {
            "Edit Course".to_string()
        } else {
            "Add Course".to_string()
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        self.form.render(f, area);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> FormSignal {
        match self.form.handle_key_event(key) {
            FormInput::Submit => {
                let writer = self.writer.clone();
                let target = self.update_target.clone();
                signal_after_validation(&mut self.form, |form| {
                    submission(writer, target, Self::payload(form))
                })
            }
            FormInput::Cancel => FormSignal::Cancel,
            FormInput::Edited | FormInput::Ignored => FormSignal::Idle,
        }
    }

    fn set_submitting(&mut self, submitting: bool) {
        self.form.submitting = submitting;
        if submitting {
            self.form.error = None;
        }
    }

    fn submit_failed(&mut self, message: String) {
        self.form.error = Some(message);
    }
}
