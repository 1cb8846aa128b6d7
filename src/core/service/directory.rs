//! Doctors, schools and majors
//!
//! Any logged-in user may add and edit entries; deleting is for admins.

use super::{found, require_login};
use crate::adapters::database::traits::DirectoryStore;
use crate::core::authz::{authorize, Action, Target};
use crate::domain::directory::{Doctor, Major, School};
use crate::domain::ids::{DoctorId, MajorId, SchoolId};
use crate::domain::user::User;
use crate::domain::{PurgoError, Result};
use std::sync::Arc;

/// Partial update of a doctor
///
/// Nested options clear the field when `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub graduate_year: Option<Option<i32>>,
    pub graduate_school: Option<Option<SchoolId>>,
    pub major: Option<Option<MajorId>>,
}

pub struct DirectoryService {
    directory: Arc<dyn DirectoryStore>,
}

impl DirectoryService {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    pub async fn get_doctor(&self, principal: Option<&User>, id: &DoctorId) -> Result<Doctor> {
        authorize(principal, &Target::Doctor, Action::Read)?;
        found(self.directory.get_doctor(id).await?, "doctor", id)
    }

    pub async fn create_doctor(
        &self,
        principal: Option<&User>,
        name: &str,
        details: DoctorUpdate,
    ) -> Result<Doctor> {
        authorize(principal, &Target::Doctor, Action::Create)?;
        let mut doctor = Doctor::new(name).map_err(PurgoError::Validation)?;
        self.apply(&mut doctor, details).await?;
        self.directory.insert_doctor(&doctor).await?;
        Ok(doctor)
    }

    pub async fn update_doctor(
        &self,
        principal: Option<&User>,
        id: &DoctorId,
        update: DoctorUpdate,
    ) -> Result<Doctor> {
        authorize(principal, &Target::Doctor, Action::Update)?;
        let mut doctor = found(self.directory.get_doctor(id).await?, "doctor", id)?;
        self.apply(&mut doctor, update).await?;
        self.directory.update_doctor(&doctor).await?;
        Ok(doctor)
    }

    /// Hospitals directed by this doctor are left without a director
    pub async fn delete_doctor(&self, principal: Option<&User>, id: &DoctorId) -> Result<()> {
        authorize(principal, &Target::Doctor, Action::Delete)?;
        if !self.directory.delete_doctor(id).await? {
            return Err(PurgoError::not_found("doctor", id));
        }
        Ok(())
    }

    async fn apply(&self, doctor: &mut Doctor, update: DoctorUpdate) -> Result<()> {
        if let Some(name) = update.name {
            doctor.name = Doctor::new(name).map_err(PurgoError::Validation)?.name;
        }
        if let Some(year) = update.graduate_year {
            doctor.graduate_year = year;
        }
        if let Some(school) = update.graduate_school {
            if let Some(school_id) = school {
                found(self.directory.get_school(&school_id).await?, "school", school_id)?;
            }
            doctor.graduate_school = school;
        }
        if let Some(major) = update.major {
            if let Some(major_id) = major {
                found(self.directory.get_major(&major_id).await?, "major", major_id)?;
            }
            doctor.major = major;
        }
        Ok(())
    }

    pub async fn list_schools(&self, principal: Option<&User>) -> Result<Vec<School>> {
        require_login(principal)?;
        self.directory.list_schools().await
    }

    pub async fn create_school(&self, principal: Option<&User>, name: &str) -> Result<School> {
        authorize(principal, &Target::School, Action::Create)?;
        let school = School::new(name).map_err(PurgoError::Validation)?;
        self.directory.insert_school(&school).await?;
        Ok(school)
    }

    pub async fn rename_school(
        &self,
        principal: Option<&User>,
        id: &SchoolId,
        name: &str,
    ) -> Result<School> {
        authorize(principal, &Target::School, Action::Update)?;
        let name = School::new(name).map_err(PurgoError::Validation)?.name;
        let mut school = found(self.directory.get_school(id).await?, "school", id)?;
        school.name = name;
        self.directory.update_school(&school).await?;
        Ok(school)
    }

    pub async fn delete_school(&self, principal: Option<&User>, id: &SchoolId) -> Result<()> {
        authorize(principal, &Target::School, Action::Delete)?;
        if !self.directory.delete_school(id).await? {
            return Err(PurgoError::not_found("school", id));
        }
        Ok(())
    }

    pub async fn list_majors(&self, principal: Option<&User>) -> Result<Vec<Major>> {
        require_login(principal)?;
        self.directory.list_majors().await
    }

    pub async fn create_major(&self, principal: Option<&User>, name: &str) -> Result<Major> {
        authorize(principal, &Target::Major, Action::Create)?;
        let major = Major::new(name).map_err(PurgoError::Validation)?;
        self.directory.insert_major(&major).await?;
        Ok(major)
    }

    pub async fn rename_major(
        &self,
        principal: Option<&User>,
        id: &MajorId,
        name: &str,
    ) -> Result<Major> {
        authorize(principal, &Target::Major, Action::Update)?;
        let name = Major::new(name).map_err(PurgoError::Validation)?.name;
        let mut major = found(self.directory.get_major(id).await?, "major", id)?;
        major.name = name;
        self.directory.update_major(&major).await?;
        Ok(major)
    }

    pub async fn delete_major(&self, principal: Option<&User>, id: &MajorId) -> Result<()> {
        authorize(principal, &Target::Major, Action::Delete)?;
        if !self.directory.delete_major(id).await? {
            return Err(PurgoError::not_found("major", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    #[tokio::test]
    async fn test_doctor_with_unknown_school_rejected() {
        let service = DirectoryService::new(Arc::new(MemoryStore::new()));
        let user = User::new("rep@example.com", "Rep").unwrap();

        let err = service
            .create_doctor(
                Some(&user),
                "Dr. Park",
                DoctorUpdate {
                    graduate_school: Some(Some(SchoolId::generate())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_school_delete_is_admin_only_and_clears_doctors() {
        let service = DirectoryService::new(Arc::new(MemoryStore::new()));
        let user = User::new("rep@example.com", "Rep").unwrap();
        let admin = User::new_superuser("root@example.com", "Root").unwrap();

        let school = service.create_school(Some(&user), "Seoul Medical").await.unwrap();
        let doctor = service
            .create_doctor(
                Some(&user),
                "Dr. Park",
                DoctorUpdate {
                    graduate_school: Some(Some(school.id)),
                    graduate_year: Some(Some(2001)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.delete_school(Some(&user), &school.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        service.delete_school(Some(&admin), &school.id).await.unwrap();
        let doctor = service.get_doctor(Some(&user), &doctor.id).await.unwrap();
        assert_eq!(doctor.graduate_school, None);
        assert_eq!(doctor.graduate_year, Some(2001));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_list() {
        let service = DirectoryService::new(Arc::new(MemoryStore::new()));
        let err = service.list_majors(None).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
