//! User and department domain models

use super::ids::{DepartmentId, UserId};
use serde::{Deserialize, Serialize};

/// Maximum department name length
pub const DEPARTMENT_NAME_MAX_LEN: usize = 50;

/// Maximum user display name length
pub const USER_NAME_MAX_LEN: usize = 30;

/// Sales department (team)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

impl Department {
    /// Creates a department, rejecting empty or overlong names
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        validate_name(&name, DEPARTMENT_NAME_MAX_LEN, "Department name")?;
        Ok(Self {
            id: DepartmentId::generate(),
            name,
        })
    }
}

/// Sales employee account
///
/// `email` is the login identity and is unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub department: Option<DepartmentId>,

    /// Account enabled; cleared by soft delete
    pub is_active: bool,

    /// Custom elevated permission; bypasses ownership checks
    pub is_admin: bool,

    /// May use staff tooling
    pub is_staff: bool,

    /// Full access to every model
    pub is_superuser: bool,
}

impl User {
    /// Creates an active, unprivileged user
    ///
    /// # Examples
    ///
    /// ```
    /// use purgo::domain::user::User;
    ///
    /// let user = User::new("Kim@Example.COM", "Kim").unwrap();
    /// assert_eq!(user.email, "Kim@example.com");
    /// assert!(user.is_active);
    /// assert!(!user.is_admin);
    /// ```
    pub fn new(email: &str, name: impl Into<String>) -> Result<Self, String> {
        let email = normalize_email(email)?;
        let name = name.into();
        validate_name(&name, USER_NAME_MAX_LEN, "Name")?;
        Ok(Self {
            id: UserId::generate(),
            email,
            name,
            department: None,
            is_active: true,
            is_admin: false,
            is_staff: false,
            is_superuser: false,
        })
    }

    /// Creates a user with every elevated flag set
    pub fn new_superuser(email: &str, name: impl Into<String>) -> Result<Self, String> {
        let mut user = Self::new(email, name)?;
        user.is_admin = true;
        user.is_staff = true;
        user.is_superuser = true;
        Ok(user)
    }

    /// Assigns a department
    pub fn with_department(mut self, department: DepartmentId) -> Self {
        self.department = Some(department);
        self
    }
}

/// Normalizes an email address for use as a login identity
///
/// The domain part is lower-cased; the local part is kept as typed.
pub fn normalize_email(email: &str) -> Result<String, String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(format!("{local}@{}", domain.to_lowercase()))
        }
        _ => Err(format!("Invalid email address: {email}")),
    }
}

fn validate_name(name: &str, max_len: usize, label: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{label} cannot be empty"));
    }
    if name.chars().count() > max_len {
        return Err(format!("{label} must be at most {max_len} characters"));
    }
    Ok(())
}
