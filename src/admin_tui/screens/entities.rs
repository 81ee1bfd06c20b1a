//! Per-entity list screens
//!
//! Each page builder binds one collection handle to the generic
//! [`EntityListController`](crate::admin_tui::list_controller::EntityListController):
//! how to fetch, which columns to show, which form to mount and how to delete.

use std::sync::Arc;

use crate::{
    admin_tui::{
        components::record_table::Column,
        fetch::{fetch_fn, FetchFn},
        forms::{CourseForm, EnrollmentForm, StudentForm},
        list_controller::{delete_fn, FormMount, ListConfig, UpdateKey},
        traits::{Record, RecordForm},
    },
    api::{Collections, Courses, Enrollments, RecordWriter, Students},
    models::{Course, CoursePayload, Enrollment, EnrollmentPayload, RecordId, Student, StudentPayload},
};

impl Record for Student {
    fn id(&self) -> RecordId {
        self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Record for Course {
    fn id(&self) -> RecordId {
        self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Record for Enrollment {
    fn id(&self) -> RecordId {
        self.id
    }
}

pub fn student_list(students: &Students) -> FetchFn<Student> {
    let students = students.clone();
    fetch_fn(move || {
        let students = students.clone();
        async move { students.list().await }
    })
}

pub fn course_list(courses: &Courses) -> FetchFn<Course> {
    let courses = courses.clone();
    fetch_fn(move || {
        let courses = courses.clone();
        async move { courses.list().await }
    })
}

pub fn enrollment_list(enrollments: &Enrollments) -> FetchFn<Enrollment> {
    let enrollments = enrollments.clone();
    fetch_fn(move || {
        let enrollments = enrollments.clone();
        async move { enrollments.list().await }
    })
}

pub fn students_page(students: &Students) -> ListConfig<Student> {
    let writer: Arc<dyn RecordWriter<StudentPayload>> = Arc::new(students.clone());
    let deleter = students.clone();

    ListConfig::new(
        "Students",
        student_list(students),
        Arc::new(move |mount: FormMount<Student>| {
            Box::new(StudentForm::new(writer.clone(), mount)) as Box<dyn RecordForm>
        }),
        vec![
            Column::<Student>::field("Name", "nome", |s| s.name.as_str()),
            Column::<Student>::field("Email", "email", |s| s.email.as_str()),
            Column::<Student>::field("Phone", "telefone", |s| s.phone.as_deref().unwrap_or("")),
        ],
        delete_fn(move |id| {
            let students = deleter.clone();
            async move { students.delete(id).await }
        }),
    )
    .with_add_label("Add Student")
}

/// Courses are updated by their code, not by id
pub fn courses_page(courses: &Courses) -> ListConfig<Course> {
    let writer: Arc<dyn RecordWriter<CoursePayload>> = Arc::new(courses.clone());
    let deleter = courses.clone();

    ListConfig::new(
        "Courses",
        course_list(courses),
        Arc::new(move |mount: FormMount<Course>| {
            Box::new(CourseForm::new(writer.clone(), mount)) as Box<dyn RecordForm>
        }),
        vec![
            Column::<Course>::field("Name", "nome", |c| c.name.as_str()),
            Column::<Course>::field("Code", "codigo", |c| c.code.as_str()),
            Column::<Course>::derived("Hours", "carga_horaria", |c| format!("{}h", c.hours)),
        ],
        delete_fn(move |id| {
            let courses = deleter.clone();
            async move { courses.delete(id).await }
        }),
    )
    .with_add_label("Add Course")
    .with_update_key(UpdateKey::Field(|c: &Course| c.code.clone()))
}

pub fn enrollments_page(collections: &Collections) -> ListConfig<Enrollment> {
    let writer: Arc<dyn RecordWriter<EnrollmentPayload>> = Arc::new(collections.enrollments.clone());
    let load_students = student_list(&collections.students);
    let load_courses = course_list(&collections.courses);
    let deleter = collections.enrollments.clone();

    ListConfig::new(
        "Enrollments",
        enrollment_list(&collections.enrollments),
        Arc::new(move |mount: FormMount<Enrollment>| {
            Box::new(EnrollmentForm::new(
                writer.clone(),
                load_students.clone(),
                load_courses.clone(),
                mount,
            )) as Box<dyn RecordForm>
        }),
        vec![
            Column::<Enrollment>::derived("Student", "aluno", |e| e.student.name.clone()),
            Column::<Enrollment>::derived("Course", "curso", |e| e.course.name.clone()),
        ],
        delete_fn(move |id| {
            let enrollments = deleter.clone();
            async move { enrollments.delete(id).await }
        }),
    )
    .with_add_label("New Enrollment")
    .with_display_name(|e: &Enrollment| format!("{} in {}", e.student.name, e.course.name))
}
