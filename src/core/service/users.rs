//! User accounts and departments

use super::{found, require_login};
use crate::adapters::database::traits::UserStore;
use crate::core::authz::{authorize, Action, Target};
use crate::domain::ids::{DepartmentId, UserId};
use crate::domain::user::{normalize_email, Department, User, USER_NAME_MAX_LEN};
use crate::domain::{PurgoError, Result};
use std::sync::Arc;

/// Partial update of a user's own profile
///
/// `None` leaves a field as is; `department: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub department: Option<Option<DepartmentId>>,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Self-registration; open to anonymous callers
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed or already registered
    /// email.
    pub async fn register(&self, email: &str, name: &str) -> Result<User> {
        let user = User::new(email, name).map_err(PurgoError::Validation)?;
        authorize(None, &Target::User(&user), Action::Create)?;
        self.insert_unique(user).await
    }

    /// Bootstrap an account with every elevated flag set
    ///
    /// Not gated by a principal; meant for operators.
    pub async fn create_superuser(&self, email: &str, name: &str) -> Result<User> {
        let user = User::new_superuser(email, name).map_err(PurgoError::Validation)?;
        let user = self.insert_unique(user).await?;
        tracing::info!(user_id = %user.id, "Superuser created");
        Ok(user)
    }

    async fn insert_unique(&self, user: User) -> Result<User> {
        if self.users.find_user_by_email(&user.email).await?.is_some() {
            return Err(PurgoError::Validation(format!(
                "email already registered: {}",
                user.email
            )));
        }
        self.users.insert_user(&user).await?;
        Ok(user)
    }

    pub async fn get(&self, principal: Option<&User>, id: &UserId) -> Result<User> {
        require_login(principal)?;
        let user = found(self.users.get_user(id).await?, "user", id)?;
        authorize(principal, &Target::User(&user), Action::Read)?;
        Ok(user)
    }

    pub async fn find_by_email(&self, principal: Option<&User>, email: &str) -> Result<User> {
        require_login(principal)?;
        let email = normalize_email(email).map_err(PurgoError::Validation)?;
        found(self.users.find_user_by_email(&email).await?, "user", email)
    }

    pub async fn list(&self, principal: Option<&User>) -> Result<Vec<User>> {
        require_login(principal)?;
        self.users.list_users().await
    }

    /// Owner or admin only
    pub async fn update_profile(
        &self,
        principal: Option<&User>,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User> {
        require_login(principal)?;
        let mut user = found(self.users.get_user(id).await?, "user", id)?;
        authorize(principal, &Target::User(&user), Action::Update)?;

        if let Some(name) = update.name {
            if name.trim().is_empty() || name.chars().count() > USER_NAME_MAX_LEN {
                return Err(PurgoError::Validation(format!(
                    "Name must be 1 to {USER_NAME_MAX_LEN} characters"
                )));
            }
            user.name = name;
        }
        if let Some(department) = update.department {
            if let Some(department_id) = department {
                found(
                    self.users.get_department(&department_id).await?,
                    "department",
                    department_id,
                )?;
            }
            user.department = department;
        }

        self.users.update_user(&user).await?;
        Ok(user)
    }

    /// Deactivates the account; its sales history stays
    ///
    /// Owner or admin only. Deactivating an inactive account is a no-op.
    pub async fn soft_delete(&self, principal: Option<&User>, id: &UserId) -> Result<User> {
        require_login(principal)?;
        let mut user = found(self.users.get_user(id).await?, "user", id)?;
        authorize(principal, &Target::User(&user), Action::Delete)?;

        if user.is_active {
            user.is_active = false;
            self.users.update_user(&user).await?;
            tracing::info!(user_id = %user.id, "User deactivated");
        }
        Ok(user)
    }

    pub async fn list_departments(&self, principal: Option<&User>) -> Result<Vec<Department>> {
        require_login(principal)?;
        self.users.list_departments().await
    }

    pub async fn create_department(&self, principal: Option<&User>, name: &str) -> Result<Department> {
        authorize(principal, &Target::Department, Action::Create)?;
        let department = Department::new(name).map_err(PurgoError::Validation)?;
        self.users.insert_department(&department).await?;
        Ok(department)
    }

    pub async fn rename_department(
        &self,
        principal: Option<&User>,
        id: &DepartmentId,
        name: &str,
    ) -> Result<Department> {
        authorize(principal, &Target::Department, Action::Update)?;
        let renamed = Department::new(name).map_err(PurgoError::Validation)?;
        let mut department = found(self.users.get_department(id).await?, "department", id)?;
        department.name = renamed.name;
        self.users.update_department(&department).await?;
        Ok(department)
    }

    /// Members keep their accounts with no department
    pub async fn delete_department(&self, principal: Option<&User>, id: &DepartmentId) -> Result<()> {
        authorize(principal, &Target::Department, Action::Delete)?;
        if !self.users.delete_department(id).await? {
            return Err(PurgoError::not_found("department", id));
        }
        Ok(())
    }
}
