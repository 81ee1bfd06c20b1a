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
    models::{Student, StudentPayload},
};

const NAME: usize = 0;
const EMAIL: usize = 1;
const PHONE: usize = 2;

pub struct StudentForm {
    form: Form,
    writer: Arc<dyn RecordWriter<StudentPayload>>,
    update_target: Option<String>,
}

impl StudentForm {
    pub fn new(writer: Arc<dyn RecordWriter<StudentPayload>>, mount: FormMount<Student>) -> Self {
        let update_target = mount.update_target();
        let student = mount.item_to_edit.as_ref();

        let form = Form::new(vec![
            FormField::new("Name", FormFieldType::Text)
                .with_value(student.map_or("", |s| s.name.as_str()))
                .required(),
            FormField::new("Email", FormFieldType::Text)
                .with_value(student.map_or("", |s| s.email.as_str()))
                .with_placeholder("name@example.com")
                .required(),
            FormField::new("Phone", FormFieldType::Text)
                .with_value(student.and_then(|s| s.phone.as_deref()).unwrap_or(""))
                .with_placeholder("optional"),
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

    fn payload(form: &Form) -> StudentPayload {
        let phone = form.value(PHONE);
        StudentPayload {
            name: form.value(NAME),
            email: form.value(EMAIL),
            phone: if phone.is_empty() { None } else { Some(phone) },
        }
    }

    fn submit(&mut self) -> FormSignal {
        if let Some(email) = self.form.get_field_mut(EMAIL) {
            if !email.is_empty() && !email.value.contains('@') {
                email.validation_error = Some("not an email address".to_string());
                self.form.error = Some("Email: not an email address".to_string());
                return FormSignal::Idle;
            }
        }

        let writer = self.writer.clone();
        let target = self.update_target.clone();
        signal_after_validation(&mut self.form, |form| {
            submission(writer, target, Self::payload(form))
        })
    }
}

impl RecordForm for StudentForm {
    fn title(&self) -> String {
        if self.update_target.is_some() {
            "Edit Student".to_string()
        } else {
            "Add Student".to_string()
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        self.form.render(f, area);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> FormSignal {
        match self.form.handle_key_event(key) {
            FormInput::Submit => self.submit(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::{
        forms::testing::{run, RecordingWriter, WriteCall},
        list_controller::UpdateKey,
    };
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut StudentForm, text: &str) {
        for c in text.chars() {
            form.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    fn ana() -> Student {
        Student {
            id: 4,
            name: "Ana".to_string(),
            email: "ana@escola.br".to_string(),
            phone: Some("1199".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_creates_student_without_phone() {
        let writer = RecordingWriter::new();
        let mut form = StudentForm::new(
            writer.clone(),
            FormMount { item_to_edit: None, update_key: UpdateKey::Id },
        );
        assert_eq!(form.title(), "Add Student");

        type_text(&mut form, "Bruno");
        form.handle_key_event(key(KeyCode::Tab));
        type_text(&mut form, "bruno@escola.br");

        let result = run(form.handle_key_event(key(KeyCode::Enter))).await;
        assert_eq!(result, Some(Ok(())));
        assert_eq!(
            writer.calls(),
            vec![WriteCall::Create(StudentPayload {
                name: "Bruno".to_string(),
                email: "bruno@escola.br".to_string(),
                phone: None,
            })]
        );
    }

    #[tokio::test]
    async fn test_edit_prefills_and_updates_by_id() {
        let writer = RecordingWriter::new();
        let mut form = StudentForm::new(
            writer.clone(),
            FormMount { item_to_edit: Some(ana()), update_key: UpdateKey::Id },
        );
        assert_eq!(form.title(), "Edit Student");
        assert_eq!(form.form().value(EMAIL), "ana@escola.br");

        type_text(&mut form, " Lima");
        run(form.handle_key_event(key(KeyCode::Enter))).await;

        let expected = StudentPayload {
            name: "Ana Lima".to_string(),
            email: "ana@escola.br".to_string(),
            phone: Some("1199".to_string()),
        };
        assert_eq!(writer.calls(), vec![WriteCall::Update("4".to_string(), expected)]);
    }

    #[tokio::test]
    async fn test_invalid_input_builds_no_submission() {
        let writer = RecordingWriter::new();
        let mut form = StudentForm::new(
            writer.clone(),
            FormMount { item_to_edit: None, update_key: UpdateKey::Id },
        );

        assert!(run(form.handle_key_event(key(KeyCode::Enter))).await.is_none());
        assert_eq!(form.form().error.as_deref(), Some("Name: required"));

        type_text(&mut form, "Bruno");
        form.handle_key_event(key(KeyCode::Tab));
        type_text(&mut form, "bruno");
        assert!(run(form.handle_key_event(key(KeyCode::Enter))).await.is_none());
        assert!(writer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_is_shown_in_form() {
        let writer = RecordingWriter::new();
        writer.fail_with("Email já cadastrado");
        let mut form = StudentForm::new(
            writer.clone(),
            FormMount { item_to_edit: Some(ana()), update_key: UpdateKey::Id },
        );

        let result = run(form.handle_key_event(key(KeyCode::Enter))).await;
        assert_eq!(result, Some(Err("Email já cadastrado".to_string())));

        form.submit_failed("Email já cadastrado".to_string());
        assert_eq!(form.form().error.as_deref(), Some("Email já cadastrado"));
        assert!(matches!(form.handle_key_event(key(KeyCode::Esc)), FormSignal::Cancel));
    }
}
