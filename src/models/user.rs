use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role a user account holds against the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    SaOffice,
    FacultyCoordinator,
    Dean,
    Admin,
    Dev,
}

impl UserRole {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Ok(UserRole::Student),
            "SA_OFFICE" => Ok(UserRole::SaOffice),
            "FACULTY_COORDINATOR" => Ok(UserRole::FacultyCoordinator),
            "DEAN" => Ok(UserRole::Dean),
            "ADMIN" => Ok(UserRole::Admin),
            "DEV" => Ok(UserRole::Dev),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::SaOffice => "SA_OFFICE",
            UserRole::FacultyCoordinator => "FACULTY_COORDINATOR",
            UserRole::Dean => "DEAN",
            UserRole::Admin => "ADMIN",
            UserRole::Dev => "DEV",
        }
    }

    /// Admin and dev accounts hold the administrative override capability
    pub fn is_administrative(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Dev)
    }

    /// The decision slot this role owns, if it is an approver role
    pub fn approver_role(&self) -> Option<crate::models::ApproverRole> {
        match self {
            UserRole::SaOffice => Some(crate::models::ApproverRole::Sa),
            UserRole::FacultyCoordinator => Some(crate::models::ApproverRole::Faculty),
            UserRole::Dean => Some(crate::models::ApproverRole::Dean),
            _ => None,
        }
    }
}

/// User account as resolved by the user directory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        UserRole::from_str(&s)
    }
}

impl User {
    /// Create a new User (typically used when seeding test fixtures)
    pub fn new(username: impl Into<String>, display_name: impl Into<String>, role: UserRole) -> Self {
        let username = username.into();
        let email = format!("{}@example.edu", username);
        Self {
            id: Uuid::new_v4(),
            username,
            display_name: display_name.into(),
            email,
            role,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
