//! Enrollment form
//!
//! Both dropdowns are filled from the backend after the form is mounted. The
//! load runs as a spawned task; [`RecordForm::poll`] applies its result.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::warn;

use super::submission;
use crate::{
    admin_tui::{
        components::form_field::{Form, FormField, FormFieldType, FormInput},
        fetch::FetchFn,
        list_controller::FormMount,
        traits::{FormSignal, RecordForm},
    },
    api::RecordWriter,
    models::{Course, Enrollment, EnrollmentPayload, RecordId, Student},
};

const STUDENT: usize = 0;
const COURSE: usize = 1;

const SELECT_BOTH: &str = "Please select a student and a course.";
const OPTIONS_FAILED: &str = "Could not load students and courses.";

type Options = Result<(Vec<Student>, Vec<Course>), String>;

pub struct EnrollmentForm {
    form: Form,
    writer: Arc<dyn RecordWriter<EnrollmentPayload>>,
    update_target: Option<String>,
    students: Vec<Student>,
    courses: Vec<Course>,
    /// Student and course of the edited enrollment, applied once options arrive
    preselect: Option<(RecordId, RecordId)>,
    options: Option<oneshot::Receiver<Options>>,
}

impl EnrollmentForm {
    /// Mount the form and start loading its options.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        writer: Arc<dyn RecordWriter<EnrollmentPayload>>,
        load_students: FetchFn<Student>,
        load_courses: FetchFn<Course>,
        mount: FormMount<Enrollment>,
    ) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let loaded = async {
                let students = load_students().await?;
                let courses = load_courses().await?;
                Ok::<_, String>((students, courses))
            }
            .await;
            let _ = tx.send(loaded);
        });

        let form = Form::new(vec![
            FormField::new("Student", FormFieldType::Dropdown).with_placeholder("Loading students..."),
            FormField::new("Course", FormFieldType::Dropdown).with_placeholder("Loading courses..."),
        ]);

        Self {
            form,
            writer,
            update_target: mount.update_target(),
            students: Vec::new(),
            courses: Vec::new(),
            preselect: mount
                .item_to_edit
                .as_ref()
                .map(|e| (e.student.id, e.course.id)),
            options: Some(rx),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    fn apply_options(&mut self, loaded: Options) {
        let (students, courses) = match loaded {
            Ok(options) => options,
            Err(message) => {
                warn!("Enrollment form options failed to load: {}", message);
                self.form.error = Some(OPTIONS_FAILED.to_string());
                return;
            }
        };

        let student_labels = students.iter().map(|s| s.name.clone()).collect();
        let course_labels = courses
            .iter()
            .map(|c| format!("{} ({})", c.name, c.code))
            .collect();

        if let Some(field) = self.form.get_field_mut(STUDENT) {
            field.placeholder = "Select a student".to_string();
            field.set_dropdown_options(student_labels);
        }
        if let Some(field) = self.form.get_field_mut(COURSE) {
            field.placeholder = "Select a course".to_string();
            field.set_dropdown_options(course_labels);
        }

        if let Some((student_id, course_id)) = self.preselect.take() {
            if let Some(index) = students.iter().position(|s| s.id == student_id) {
                if let Some(field) = self.form.get_field_mut(STUDENT) {
                    field.select_option(index);
                }
            }
            if let Some(index) = courses.iter().position(|c| c.id == course_id) {
                if let Some(field) = self.form.get_field_mut(COURSE) {
                    field.select_option(index);
                }
            }
        }

        self.students = students;
        self.courses = courses;
    }

    fn selection(&self) -> Option<EnrollmentPayload> {
        let student = self
            .form
            .get_field(STUDENT)
            .and_then(|f| f.selected_option())
            .and_then(|i| self.students.get(i))?;
        let course = self
            .form
            .get_field(COURSE)
            .and_then(|f| f.selected_option())
            .and_then(|i| self.courses.get(i))?;

        Some(EnrollmentPayload {
            student_id: student.id,
            course_id: course.id,
        })
    }
}

impl RecordForm for EnrollmentForm {
    fn title(&self) -> String {
        if self.update_target.is_some() {
            "Edit Enrollment".to_string()
        } else {
            "New Enrollment".to_string()
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        self.form.render(f, area);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> FormSignal {
        match self.form.handle_key_event(key) {
            FormInput::Submit => match self.selection() {
                Some(payload) => {
                    self.form.error = None;
                    FormSignal::Submit(submission(
                        self.writer.clone(),
                        self.update_target.clone(),
                        payload,
                    ))
                }
                None => {
                    self.form.error = Some(SELECT_BOTH.to_string());
                    FormSignal::Idle
                }
            },
            FormInput::Cancel => FormSignal::Cancel,
            FormInput::Edited | FormInput::Ignored => FormSignal::Idle,
        }
    }

    fn poll(&mut self) {
        let Some(rx) = self.options.as_mut() else {
            return;
        };
        let loaded = match rx.try_recv() {
            Ok(loaded) => loaded,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err("option load interrupted".to_string()),
        };
        self.options = None;
        self.apply_options(loaded);
    }

    fn is_loading(&self) -> bool {
        self.options.is_some()
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
    use crate::{
        admin_tui::{
            fetch::fetch_fn,
            forms::testing::{run, RecordingWriter, WriteCall},
            list_controller::UpdateKey,
        },
        models::RecordRef,
    };
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn student(id: RecordId, name: &str) -> Student {
        Student {
            id,
            name: name.to_string(),
            email: format!("{}@escola.br", name.to_lowercase()),
            phone: None,
        }
    }

    fn course(id: RecordId, name: &str, code: &str) -> Course {
        Course {
            id,
            name: name.to_string(),
            code: code.to_string(),
            hours: 40,
        }
    }

    fn loaders() -> (FetchFn<Student>, FetchFn<Course>) {
        (
            fetch_fn(|| async { Ok(vec![student(1, "Ana"), student(2, "Bruno")]) }),
            fetch_fn(|| async { Ok(vec![course(10, "Math", "MAT"), course(20, "Physics", "FIS")]) }),
        )
    }

    async fn loaded(form: &mut EnrollmentForm) {
        for _ in 0..100 {
            form.poll();
            if !form.is_loading() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("options never loaded");
    }

    #[tokio::test]
    async fn test_requires_both_selections() {
        let writer = RecordingWriter::new();
        let (students, courses) = loaders();
        let mut form = EnrollmentForm::new(
            writer.clone(),
            students,
            courses,
            FormMount { item_to_edit: None, update_key: UpdateKey::Id },
        );
        loaded(&mut form).await;

        // Pick the first student only
        form.handle_key_event(key(KeyCode::Enter));
        assert!(run(form.handle_key_event(key(KeyCode::Enter))).await.is_none());
        assert_eq!(form.form().error.as_deref(), Some(SELECT_BOTH));

        form.handle_key_event(key(KeyCode::Tab));
        form.handle_key_event(key(KeyCode::Down));
        form.handle_key_event(key(KeyCode::Enter));
        assert_eq!(run(form.handle_key_event(key(KeyCode::Enter))).await, Some(Ok(())));
        assert_eq!(
            writer.calls(),
            vec![WriteCall::Create(EnrollmentPayload { student_id: 1, course_id: 20 })]
        );
    }

    #[tokio::test]
    async fn test_edit_preselects_and_updates_by_id() {
        let writer = RecordingWriter::new();
        let (students, courses) = loaders();
        let enrollment = Enrollment {
            id: 5,
            student: RecordRef { id: 2, name: "Bruno".to_string() },
            course: RecordRef { id: 10, name: "Math".to_string() },
        };
        let mut form = EnrollmentForm::new(
            writer.clone(),
            students,
            courses,
            FormMount { item_to_edit: Some(enrollment), update_key: UpdateKey::Id },
        );
        loaded(&mut form).await;

        assert_eq!(form.form().value(STUDENT), "Bruno");
        assert_eq!(form.form().value(COURSE), "Math (MAT)");

        // Switch the course to Physics
        form.handle_key_event(key(KeyCode::Tab));
        form.handle_key_event(key(KeyCode::Down));
        form.handle_key_event(key(KeyCode::Enter));
        run(form.handle_key_event(key(KeyCode::Enter))).await;

        assert_eq!(
            writer.calls(),
            vec![WriteCall::Update(
                "5".to_string(),
                EnrollmentPayload { student_id: 2, course_id: 20 }
            )]
        );
    }

    #[tokio::test]
    async fn test_option_load_failure_is_reported() {
        let writer = RecordingWriter::new();
        let mut form = EnrollmentForm::new(
            writer,
            fetch_fn(|| async { Err("Could not load the students.".to_string()) }),
            fetch_fn(|| async { Ok(Vec::new()) }),
            FormMount { item_to_edit: None, update_key: UpdateKey::Id },
        );
        loaded(&mut form).await;

        assert_eq!(form.form().error.as_deref(), Some(OPTIONS_FAILED));
        assert!(run(form.handle_key_event(key(KeyCode::Enter))).await.is_none());
        assert_eq!(form.form().error.as_deref(), Some(SELECT_BOTH));
    }
}
