//! Typed handles for the three backend collections
//!
//! Every method reports failures as a user-facing message. Listing failures
//! always use a fixed message; mutations surface the server's `detail` when
//! there is one.

use async_trait::async_trait;
use tracing::warn;

use crate::{
    api::{client::ApiClient, errors::ApiError},
    models::{
        Course, CoursePayload, CourseRoster, Enrollment, EnrollmentPayload, RecordId, Student,
        StudentPayload, StudentRoster,
    },
};

/// Create/update collaborator used by the record forms
#[async_trait]
pub trait RecordWriter<P>: Send + Sync {
    async fn create(&self, payload: P) -> Result<(), String>;

    /// Update the record addressed by `key`, which is whatever the page's
    /// update key resolved to (an id, or a natural key such as a course code)
    async fn update(&self, key: &str, payload: P) -> Result<(), String>;
}

fn report(context: &str, err: ApiError, fallback: &str) -> String {
    warn!("{}: {}", context, err);
    err.user_message(fallback)
}

#[derive(Debug, Clone)]
pub struct Students {
    client: ApiClient,
}

impl Students {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Student>, String> {
        self.client.get_json(&["alunos"]).await.map_err(|e| {
            warn!("Failed to fetch students: {}", e);
            "Could not load the students.".to_string()
        })
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), String> {
        self.client
            .delete(&["alunos", &id.to_string()])
            .await
            .map_err(|e| report(&format!("Failed to delete student {}", id), e, "Could not delete the student."))
    }
}

#[async_trait]
impl RecordWriter<StudentPayload> for Students {
    async fn create(&self, payload: StudentPayload) -> Result<(), String> {
        self.client.post(&["alunos"], &payload).await.map_err(|e| {
            report(
                "Failed to create student",
                e,
                "Could not create the student. Check the data and try again.",
            )
        })
    }

    async fn update(&self, key: &str, payload: StudentPayload) -> Result<(), String> {
        self.client
            .put(&["alunos", key], &payload)
            .await
            .map_err(|e| report(&format!("Failed to update student {}", key), e, "Could not update the student."))
    }
}

#[derive(Debug, Clone)]
pub struct Courses {
    client: ApiClient,
}

impl Courses {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Course>, String> {
        self.client.get_json(&["cursos"]).await.map_err(|e| {
            warn!("Failed to fetch courses: {}", e);
            "Could not load the courses.".to_string()
        })
    }

    /// Look a course up by its code
    pub async fn find_by_code(&self, code: &str) -> Result<Course, String> {
        self.client
            .get_json(&["cursos", code])
            .await
            .map_err(|e| report(&format!("Failed to fetch course {}", code), e, "Could not find the course."))
    }

    /// Courses are deleted by id even though they are updated by code
    pub async fn delete(&self, id: RecordId) -> Result<(), String> {
        self.client
            .delete(&["cursos", &id.to_string()])
            .await
            .map_err(|e| report(&format!("Failed to delete course {}", id), e, "Could not delete the course."))
    }
}

#[async_trait]
impl RecordWriter<CoursePayload> for Courses {
    async fn create(&self, payload: CoursePayload) -> Result<(), String> {
        self.client.post(&["cursos"], &payload).await.map_err(|e| {
            report(
                "Failed to create course",
                e,
                "Could not create the course. Check the data and try again.",
            )
        })
    }

    /// `key` is the course code
    async fn update(&self, key: &str, payload: CoursePayload) -> Result<(), String> {
        self.client
            .put(&["cursos", key], &payload)
            .await
            .map_err(|e| report(&format!("Failed to update course {}", key), e, "Could not update the course."))
    }
}

#[derive(Debug, Clone)]
pub struct Enrollments {
    client: ApiClient,
}

impl Enrollments {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Enrollment>, String> {
        self.client.get_json(&["matriculas"]).await.map_err(|e| {
            warn!("Failed to fetch enrollments: {}", e);
            "Could not load the enrollments.".to_string()
        })
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), String> {
        self.client
            .delete(&["matriculas", &id.to_string()])
            .await
            .map_err(|e| report(&format!("Failed to delete enrollment {}", id), e, "Could not delete the enrollment."))
    }

    /// Courses of the first student whose name contains `student_name`
    pub async fn courses_of(&self, student_name: &str) -> Result<StudentRoster, String> {
        self.client
            .get_json(&["matriculas", "aluno", student_name])
            .await
            .map_err(|e| report("Failed to fetch student roster", e, "Could not load the student's courses."))
    }

    pub async fn students_in(&self, course_code: &str) -> Result<CourseRoster, String> {
        self.client
            .get_json(&["matriculas", "curso", course_code])
            .await
            .map_err(|e| report("Failed to fetch course roster", e, "Could not load the course's students."))
    }
}

#[async_trait]
impl RecordWriter<EnrollmentPayload> for Enrollments {
    async fn create(&self, payload: EnrollmentPayload) -> Result<(), String> {
        self.client
            .post(&["matriculas"], &payload)
            .await
            .map_err(|e| report("Failed to create enrollment", e, "Could not create the enrollment."))
    }

    async fn update(&self, key: &str, payload: EnrollmentPayload) -> Result<(), String> {
        self.client
            .put(&["matriculas", key], &payload)
            .await
            .map_err(|e| report(&format!("Failed to update enrollment {}", key), e, "Could not update the enrollment."))
    }
}

/// The three collection handles over one client
#[derive(Debug, Clone)]
pub struct Collections {
    pub students: Students,
    pub courses: Courses,
    pub enrollments: Enrollments,
}

impl Collections {
    pub fn new(client: ApiClient) -> Self {
        Self {
            students: Students::new(client.clone()),
            courses: Courses::new(client.clone()),
            enrollments: Enrollments::new(client),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::spawn_backend;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post, put},
        Json, Router,
    };
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<String>>>;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), base_url).unwrap()
    }

    #[tokio::test]
    async fn test_course_update_is_addressed_by_code() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/cursos/:key",
                put(|State(seen): State<Seen>, Path(key): Path<String>, Json(body): Json<serde_json::Value>| async move {
                    seen.lock().unwrap().push(format!("{}:{}", key, body["nome"]));
                    Json(body)
                }),
            )
            .with_state(seen.clone());
        let courses = Courses::new(client(&spawn_backend(router).await));

        let payload = CoursePayload {
            name: "Physics".to_string(),
            code: "PHY".to_string(),
            hours: 40,
        };
        courses.update("PHY", payload).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), ["PHY:\"Physics\""]);
    }

    #[tokio::test]
    async fn test_listing_failure_uses_fixed_message() {
        let router = Router::new().route(
            "/alunos",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"detail": "boom"}))) }),
        );
        let students = Students::new(client(&spawn_backend(router).await));

        assert_eq!(students.list().await.unwrap_err(), "Could not load the students.");
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_server_detail() {
        let router = Router::new().route(
            "/matriculas",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"detail": "Aluno já matriculado neste curso"})),
                )
            }),
        );
        let enrollments = Enrollments::new(client(&spawn_backend(router).await));

        let err = enrollments
            .create(EnrollmentPayload { student_id: 1, course_id: 2 })
            .await
            .unwrap_err();
        assert_eq!(err, "Aluno já matriculado neste curso");
    }

    #[tokio::test]
    async fn test_find_course_by_code() {
        let router = Router::new().route(
            "/cursos/:codigo",
            get(|Path(codigo): Path<String>| async move {
                if codigo == "MAT" {
                    Ok(Json(serde_json::json!({"id": 2, "nome": "Math", "codigo": "MAT", "carga_horaria": 60})))
                } else {
                    Err((
                        StatusCode::NOT_FOUND,
                        Json(serde_json::json!({"detail": "Nenhum curso encontrado com o código XYZ"})),
                    ))
                }
            }),
        );
        let courses = Courses::new(client(&spawn_backend(router).await));

        let course = courses.find_by_code("MAT").await.unwrap();
        assert_eq!((course.id, course.name.as_str(), course.hours), (2, "Math", 60));

        let err = courses.find_by_code("XYZ").await.unwrap_err();
        assert_eq!(err, "Nenhum curso encontrado com o código XYZ");
    }

    #[tokio::test]
    async fn test_rosters() {
        let router = Router::new()
            .route(
                "/matriculas/aluno/:nome",
                get(|Path(nome): Path<String>| async move {
                    Json(serde_json::json!({"aluno": nome, "cursos": ["Math", "Physics"]}))
                }),
            )
            .route(
                "/matriculas/curso/:codigo",
                get(|| async { Json(serde_json::json!({"curso": "Math", "alunos": ["Ana"]})) }),
            );
        let enrollments = Enrollments::new(client(&spawn_backend(router).await));

        let roster = enrollments.courses_of("Ana Maria").await.unwrap();
        assert_eq!(roster.student, "Ana Maria");
        assert_eq!(roster.courses, vec!["Math", "Physics"]);

        let roster = enrollments.students_in("MAT").await.unwrap();
        assert_eq!(roster.course, "Math");
        assert_eq!(roster.students, vec!["Ana"]);
    }
}
