//! Database abstraction traits
//!
//! This module defines the traits that storage adapters implement. Each
//! trait covers one aggregate; an adapter usually implements all of them
//! over a shared connection pool.

use crate::domain::directory::{Doctor, Major, School};
use crate::domain::hospital::{Hospital, HospitalRecord};
use crate::domain::ids::{
    DepartmentId, DoctorId, HospitalId, MajorId, SalesHistoryId, SchoolId, UserId,
};
use crate::domain::sales::{SalesHistoryEntry, SalesStatus};
use crate::domain::user::{Department, User};
use crate::domain::Result;
use async_trait::async_trait;

/// Connection-level operations
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Test the database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Create tables and indexes if they do not exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &str;
}

/// Hospital persistence
#[async_trait]
pub trait HospitalStore: Send + Sync {
    /// Load a hospital by primary key
    ///
    /// Returns `Ok(None)` if no such hospital exists.
    async fn get_hospital(&self, id: &HospitalId) -> Result<Option<Hospital>>;

    /// Insert a new hospital
    ///
    /// # Errors
    ///
    /// Returns a database error if the key already exists.
    async fn insert_hospital(&self, hospital: &Hospital) -> Result<()>;

    /// Overwrite the registry-sourced columns of an existing hospital
    ///
    /// `manager` and `director` are left as stored.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the hospital does not exist.
    async fn update_registry_fields(&self, record: &HospitalRecord) -> Result<()>;

    /// Set or clear the manager of record
    async fn set_manager(&self, id: &HospitalId, manager: Option<UserId>) -> Result<()>;

    /// Set or clear the director
    async fn set_director(&self, id: &HospitalId, director: Option<DoctorId>) -> Result<()>;

    /// Delete a hospital together with its sales history
    ///
    /// Returns `false` if it did not exist.
    async fn delete_hospital(&self, id: &HospitalId) -> Result<bool>;

    /// Ids of the hospitals managed by `user`
    async fn hospitals_managed_by(&self, user: &UserId) -> Result<Vec<HospitalId>>;

    /// Number of stored hospitals
    async fn count_hospitals(&self) -> Result<u64>;
}

/// User and department persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Look a user up by normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Users ordered by name
    async fn list_users(&self) -> Result<Vec<User>>;

    /// # Errors
    ///
    /// Returns a validation error if the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn update_user(&self, user: &User) -> Result<()>;

    async fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>>;

    async fn list_departments(&self) -> Result<Vec<Department>>;

    async fn insert_department(&self, department: &Department) -> Result<()>;

    async fn update_department(&self, department: &Department) -> Result<()>;

    /// Delete a department; its employees keep existing with no department
    async fn delete_department(&self, id: &DepartmentId) -> Result<bool>;
}

/// Sales history persistence
#[async_trait]
pub trait SalesHistoryStore: Send + Sync {
    async fn get_sales_entry(&self, id: &SalesHistoryId) -> Result<Option<SalesHistoryEntry>>;

    /// # Errors
    ///
    /// Returns `NotFound` if the referenced hospital does not exist.
    async fn insert_sales_entry(&self, entry: &SalesHistoryEntry) -> Result<()>;

    /// Write `content` and `status`, bumping `modified_at`
    ///
    /// Returns the entry as stored.
    async fn update_sales_entry(&self, entry: &SalesHistoryEntry) -> Result<SalesHistoryEntry>;

    async fn delete_sales_entry(&self, id: &SalesHistoryId) -> Result<bool>;

    /// Entries of one hospital, most recently modified first
    async fn list_sales_for_hospital(&self, hospital: &HospitalId)
        -> Result<Vec<SalesHistoryEntry>>;

    /// Entry count per status, restricted to hospitals managed by
    /// `manager` when given
    async fn sales_status_counts(&self, manager: Option<&UserId>)
        -> Result<Vec<(SalesStatus, u64)>>;

    /// Most recently modified entries, newest first
    async fn recent_sales(
        &self,
        manager: Option<&UserId>,
        limit: usize,
    ) -> Result<Vec<SalesHistoryEntry>>;
}

/// Doctor, school and major persistence
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get_doctor(&self, id: &DoctorId) -> Result<Option<Doctor>>;
    async fn insert_doctor(&self, doctor: &Doctor) -> Result<()>;
    async fn update_doctor(&self, doctor: &Doctor) -> Result<()>;

    /// Delete a doctor; hospitals they directed lose their director
    async fn delete_doctor(&self, id: &DoctorId) -> Result<bool>;

    async fn get_school(&self, id: &SchoolId) -> Result<Option<School>>;
    async fn list_schools(&self) -> Result<Vec<School>>;
    async fn insert_school(&self, school: &School) -> Result<()>;
    async fn update_school(&self, school: &School) -> Result<()>;

    /// Delete a school; doctors keep existing with no graduate school
    async fn delete_school(&self, id: &SchoolId) -> Result<bool>;

    async fn get_major(&self, id: &MajorId) -> Result<Option<Major>>;
    async fn list_majors(&self) -> Result<Vec<Major>>;
    async fn insert_major(&self, major: &Major) -> Result<()>;
    async fn update_major(&self, major: &Major) -> Result<()>;

    /// Delete a major; doctors keep existing with no major
    async fn delete_major(&self, id: &MajorId) -> Result<bool>;
}
