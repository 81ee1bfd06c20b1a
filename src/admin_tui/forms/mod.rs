//! Create/edit forms mounted by the entity list screens

pub mod course_form;
pub mod enrollment_form;
pub mod student_form;

pub use course_form::CourseForm;
pub use enrollment_form::EnrollmentForm;
pub use student_form::StudentForm;

use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};

use crate::{
    admin_tui::{
        components::form_field::Form,
        traits::{FormHandler, FormSignal},
    },
    api::RecordWriter,
};

/// Create when `update_target` is `None`, otherwise update the record it names
pub fn submission<P>(
    writer: Arc<dyn RecordWriter<P>>,
    update_target: Option<String>,
    payload: P,
) -> BoxFuture<'static, Result<(), String>>
where
    P: Send + 'static,
{
    async move {
        match update_target {
            Some(key) => writer.update(&key, payload).await,
            None => writer.create(payload).await,
        }
    }
    .boxed()
}

/// Run field validation; on failure the first error becomes the form error
fn validated(form: &mut Form) -> bool {
    if form.validate_all() {
        form.error = None;
        true
    } else {
        form.error = FormHandler::validate(form).err();
        false
    }
}

fn signal_after_validation<F>(form: &mut Form, build: F) -> FormSignal
where
    F: FnOnce(&Form) -> BoxFuture<'static, Result<(), String>>,
{
    if validated(form) {
        FormSignal::Submit(build(form))
    } else {
        FormSignal::Idle
    }
}
