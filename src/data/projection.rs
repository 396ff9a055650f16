use utoipa::ToSchema;
use uuid::Uuid;

use super::assignment::Assignment;
use super::grade::Grade;
use super::repo::Repo;
use super::semester::Semester;
use super::store::DocumentStore;
use super::subject::Subject;
use super::teacher::Teacher;
use super::user::User;
use crate::resp::problem::Problem;

/// Display fields of a referenced record embedded into read responses.
pub trait Projection: Sized {
    type Source: super::entity::Entity;

    fn project(source: Self::Source) -> Self;
}

/// Looks up a referenced record and projects it. A dangling or absent
/// reference projects to `None`.
pub async fn populate<P: Projection>(
    store: &dyn DocumentStore,
    id: Option<Uuid>,
) -> Result<Option<P>, Problem> {
    let id = match id {
        Some(it) => it,
        None => return Ok(None),
    };

    let source = Repo::new(store).find::<P::Source>(id).await?;
    Ok(source.map(P::project))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub email: String,
}

impl Projection for UserSummary {
    type Source = User;

    fn project(user: User) -> Self {
        UserSummary {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubjectSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "subjectTitle")]
    pub subject_title: String,
}

impl Projection for SubjectSummary {
    type Source = Subject;

    fn project(subject: Subject) -> Self {
        SubjectSummary {
            id: subject.id,
            subject_title: subject.subject_title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

impl Projection for AssignmentSummary {
    type Source = Assignment;

    fn project(assignment: Assignment) -> Self {
        AssignmentSummary {
            id: assignment.id,
            name: assignment.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TeacherSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub school_email: String,
}

impl Projection for TeacherSummary {
    type Source = Teacher;

    fn project(teacher: Teacher) -> Self {
        TeacherSummary {
            id: teacher.id,
            first_name: teacher.first_name,
            last_name: teacher.last_name,
            school_email: teacher.school_email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SemesterSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
}

impl Projection for SemesterSummary {
    type Source = Semester;

    fn project(semester: Semester) -> Self {
        SemesterSummary {
            id: semester.id,
            title: semester.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub grade: f64,
    #[serde(rename = "outOf")]
    pub out_of: f64,
}

impl Projection for GradeSummary {
    type Source = Grade;

    fn project(grade: Grade) -> Self {
        GradeSummary {
            id: grade.id,
            grade: grade.grade,
            out_of: grade.out_of,
        }
    }
}
