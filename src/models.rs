use serde::{Deserialize, Serialize};

/// Backend-assigned identifier shared by every record type
pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: RecordId,
    #[serde(rename = "nome")]
    pub name: String,
    /// Natural key; the backend addresses course updates by code
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "carga_horaria")]
    pub hours: i64,
}

/// Link between one student and one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: RecordId,
    #[serde(rename = "aluno")]
    pub student: RecordRef,
    #[serde(rename = "curso")]
    pub course: RecordRef,
}

/// Related record embedded for display, reduced to id and name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: RecordId,
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPayload {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "carga_horaria")]
    pub hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentPayload {
    #[serde(rename = "aluno_id")]
    pub student_id: RecordId,
    #[serde(rename = "curso_id")]
    pub course_id: RecordId,
}

/// Courses a student is enrolled in
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentRoster {
    #[serde(rename = "aluno")]
    pub student: String,
    #[serde(rename = "cursos")]
    pub courses: Vec<String>,
}

/// Students enrolled in a course
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseRoster {
    #[serde(rename = "curso")]
    pub course: String,
    #[serde(rename = "alunos")]
    pub students: Vec<String>,
}

impl From<&Student> for StudentPayload {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
        }
    }
}

impl From<&Course> for CoursePayload {
    fn from(course: &Course) -> Self {
        Self {
            name: course.name.clone(),
            code: course.code.clone(),
            hours: course.hours,
        }
    }
}
