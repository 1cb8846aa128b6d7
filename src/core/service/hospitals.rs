//! Hospital assignments and deletion
//!
//! Hospitals are created only by the reconciler; people can read them,
//! assign managers and directors, and delete them.

use super::{found, require_login};
use crate::adapters::database::traits::{DirectoryStore, HospitalStore, UserStore};
use crate::core::authz::{authorize, Action, Target};
use crate::domain::hospital::Hospital;
use crate::domain::ids::{DoctorId, HospitalId, UserId};
use crate::domain::user::User;
use crate::domain::{PurgoError, Result};
use std::sync::Arc;

pub struct HospitalService {
    hospitals: Arc<dyn HospitalStore>,
    users: Arc<dyn UserStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl HospitalService {
    pub fn new(
        hospitals: Arc<dyn HospitalStore>,
        users: Arc<dyn UserStore>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            hospitals,
            users,
            directory,
        }
    }

    pub async fn get(&self, principal: Option<&User>, id: &HospitalId) -> Result<Hospital> {
        require_login(principal)?;
        let hospital = found(self.hospitals.get_hospital(id).await?, "hospital", id)?;
        authorize(principal, &Target::Hospital(&hospital), Action::Read)?;
        Ok(hospital)
    }

    /// Hospitals whose manager is `manager`
    pub async fn managed_by(
        &self,
        principal: Option<&User>,
        manager: &UserId,
    ) -> Result<Vec<HospitalId>> {
        require_login(principal)?;
        self.hospitals.hospitals_managed_by(manager).await
    }

    /// Set or clear the manager; admin only
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown hospital or user; a validation error if
    /// the user is deactivated.
    pub async fn assign_manager(
        &self,
        principal: Option<&User>,
        id: &HospitalId,
        manager: Option<UserId>,
    ) -> Result<Hospital> {
        require_login(principal)?;
        let mut hospital = found(self.hospitals.get_hospital(id).await?, "hospital", id)?;
        authorize(principal, &Target::Hospital(&hospital), Action::AssignManager)?;

        if let Some(user_id) = manager {
            let user = found(self.users.get_user(&user_id).await?, "user", user_id)?;
            if !user.is_active {
                return Err(PurgoError::Validation(format!(
                    "user {user_id} is deactivated and cannot manage hospitals"
                )));
            }
        }

        self.hospitals.set_manager(id, manager).await?;
        hospital.manager = manager;
        tracing::info!(hospital_id = %id, manager = ?manager, "Hospital manager assigned");
        Ok(hospital)
    }

    /// Set or clear the director; manager of the hospital or admin
    pub async fn set_director(
        &self,
        principal: Option<&User>,
        id: &HospitalId,
        director: Option<DoctorId>,
    ) -> Result<Hospital> {
        require_login(principal)?;
        let mut hospital = found(self.hospitals.get_hospital(id).await?, "hospital", id)?;
        authorize(principal, &Target::Hospital(&hospital), Action::SetDirector)?;

        if let Some(doctor_id) = director {
            found(self.directory.get_doctor(&doctor_id).await?, "doctor", doctor_id)?;
        }

        self.hospitals.set_director(id, director).await?;
        hospital.director = director;
        Ok(hospital)
    }

    /// Delete a hospital and its sales history; admin only
    pub async fn delete(&self, principal: Option<&User>, id: &HospitalId) -> Result<()> {
        require_login(principal)?;
        let hospital = found(self.hospitals.get_hospital(id).await?, "hospital", id)?;
        authorize(principal, &Target::Hospital(&hospital), Action::Delete)?;

        self.hospitals.delete_hospital(id).await?;
        tracing::info!(hospital_id = %id, "Hospital deleted");
        Ok(())
    }
}
