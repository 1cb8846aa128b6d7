//! In-process storage backend
//!
//! Keeps every table in one lock so cascades and null-outs happen
//! atomically, matching the foreign-key behavior of the PostgreSQL schema.

use crate::adapters::database::traits::{
    DatabaseClient, DirectoryStore, HospitalStore, SalesHistoryStore, UserStore,
};
use crate::domain::directory::{Doctor, Major, School};
use crate::domain::hospital::{Hospital, HospitalRecord};
use crate::domain::ids::{
    DepartmentId, DoctorId, HospitalId, MajorId, SalesHistoryId, SchoolId, UserId,
};
use crate::domain::sales::{SalesHistoryEntry, SalesStatus};
use crate::domain::user::{Department, User};
use crate::domain::{PurgoError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    hospitals: HashMap<HospitalId, Hospital>,
    users: HashMap<UserId, User>,
    departments: HashMap<DepartmentId, Department>,
    sales: HashMap<SalesHistoryId, SalesHistoryEntry>,
    doctors: HashMap<DoctorId, Doctor>,
    schools: HashMap<SchoolId, School>,
    majors: HashMap<MajorId, Major>,
}

impl Tables {
    fn managed_by(&self, manager: Option<&UserId>) -> Option<HashSet<HospitalId>> {
        manager.map(|m| {
            self.hospitals
                .values()
                .filter(|h| h.is_managed_by(m))
                .map(|h| h.id().clone())
                .collect()
        })
    }
}

/// Storage held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful mutating calls so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn next_modified(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl DatabaseClient for MemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl HospitalStore for MemoryStore {
    async fn get_hospital(&self, id: &HospitalId) -> Result<Option<Hospital>> {
        Ok(self.tables.read().await.hospitals.get(id).cloned())
    }

    async fn insert_hospital(&self, hospital: &Hospital) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.hospitals.contains_key(hospital.id()) {
            return Err(PurgoError::Database(format!(
                "duplicate key: hospital {}",
                hospital.id()
            )));
        }
        tables.hospitals.insert(hospital.id().clone(), hospital.clone());
        self.record_write();
        Ok(())
    }

    async fn update_registry_fields(&self, record: &HospitalRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        let hospital = tables
            .hospitals
            .get_mut(&record.hospital_id)
            .ok_or_else(|| PurgoError::not_found("hospital", &record.hospital_id))?;
        let changed = hospital.apply_record(record);
        tracing::trace!(hospital_id = %record.hospital_id, fields = ?changed, "Registry fields applied");
        self.record_write();
        Ok(())
    }

    async fn set_manager(&self, id: &HospitalId, manager: Option<UserId>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let hospital = tables
            .hospitals
            .get_mut(id)
            .ok_or_else(|| PurgoError::not_found("hospital", id))?;
        hospital.manager = manager;
        self.record_write();
        Ok(())
    }

    async fn set_director(&self, id: &HospitalId, director: Option<DoctorId>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let hospital = tables
            .hospitals
            .get_mut(id)
            .ok_or_else(|| PurgoError::not_found("hospital", id))?;
        hospital.director = director;
        self.record_write();
        Ok(())
    }

    async fn delete_hospital(&self, id: &HospitalId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.hospitals.remove(id).is_none() {
            return Ok(false);
        }
        tables.sales.retain(|_, entry| entry.hospital != *id);
        self.record_write();
        Ok(true)
    }

    async fn hospitals_managed_by(&self, user: &UserId) -> Result<Vec<HospitalId>> {
        let tables = self.tables.read().await;
        let mut ids: Vec<HospitalId> = tables
            .hospitals
            .values()
            .filter(|h| h.is_managed_by(user))
            .map(|h| h.id().clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn count_hospitals(&self) -> Result<u64> {
        Ok(self.tables.read().await.hospitals.len() as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(PurgoError::Validation(format!(
                "email already registered: {}",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        self.record_write();
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(PurgoError::Validation(format!(
                "email already registered: {}",
                user.email
            )));
        }
        match tables.users.get_mut(&user.id) {
            Some(stored) => *stored = user.clone(),
            None => return Err(PurgoError::not_found("user", user.id)),
        }
        self.record_write();
        Ok(())
    }

    async fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>> {
        Ok(self.tables.read().await.departments.get(id).cloned())
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        let tables = self.tables.read().await;
        let mut departments: Vec<Department> = tables.departments.values().cloned().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn insert_department(&self, department: &Department) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.departments.insert(department.id, department.clone());
        self.record_write();
        Ok(())
    }

    async fn update_department(&self, department: &Department) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.departments.get_mut(&department.id) {
            Some(stored) => *stored = department.clone(),
            None => return Err(PurgoError::not_found("department", department.id)),
        }
        self.record_write();
        Ok(())
    }

    async fn delete_department(&self, id: &DepartmentId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.departments.remove(id).is_none() {
            return Ok(false);
        }
        for user in tables.users.values_mut() {
            if user.department == Some(*id) {
                user.department = None;
            }
        }
        self.record_write();
        Ok(true)
    }
}

#[async_trait]
impl SalesHistoryStore for MemoryStore {
    async fn get_sales_entry(&self, id: &SalesHistoryId) -> Result<Option<SalesHistoryEntry>> {
        Ok(self.tables.read().await.sales.get(id).cloned())
    }

    async fn insert_sales_entry(&self, entry: &SalesHistoryEntry) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.hospitals.contains_key(&entry.hospital) {
            return Err(PurgoError::not_found("hospital", &entry.hospital));
        }
        tables.sales.insert(entry.id, entry.clone());
        self.record_write();
        Ok(())
    }

    async fn update_sales_entry(&self, entry: &SalesHistoryEntry) -> Result<SalesHistoryEntry> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .sales
            .get_mut(&entry.id)
            .ok_or_else(|| PurgoError::not_found("sales history", entry.id))?;
        stored.content = entry.content.clone();
        stored.status = entry.status;
        stored.modified_at = next_modified(stored.modified_at);
        let updated = stored.clone();
        self.record_write();
        Ok(updated)
    }

    async fn delete_sales_entry(&self, id: &SalesHistoryId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.sales.remove(id).is_some();
        if removed {
            self.record_write();
        }
        Ok(removed)
    }

    async fn list_sales_for_hospital(
        &self,
        hospital: &HospitalId,
    ) -> Result<Vec<SalesHistoryEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<SalesHistoryEntry> = tables
            .sales
            .values()
            .filter(|e| e.hospital == *hospital)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(entries)
    }

    async fn sales_status_counts(
        &self,
        manager: Option<&UserId>,
    ) -> Result<Vec<(SalesStatus, u64)>> {
        let tables = self.tables.read().await;
        let scope = tables.managed_by(manager);
        let mut counts: HashMap<SalesStatus, u64> = HashMap::new();
        for entry in tables.sales.values() {
            if scope.as_ref().map_or(true, |s| s.contains(&entry.hospital)) {
                *counts.entry(entry.status).or_default() += 1;
            }
        }
        let mut counts: Vec<(SalesStatus, u64)> = counts.into_iter().collect();
        counts.sort_by_key(|(status, _)| status.code());
        Ok(counts)
    }

    async fn recent_sales(
        &self,
        manager: Option<&UserId>,
        limit: usize,
    ) -> Result<Vec<SalesHistoryEntry>> {
        let tables = self.tables.read().await;
        let scope = tables.managed_by(manager);
        let mut entries: Vec<SalesHistoryEntry> = tables
            .sales
            .values()
            .filter(|e| scope.as_ref().map_or(true, |s| s.contains(&e.hospital)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get_doctor(&self, id: &DoctorId) -> Result<Option<Doctor>> {
        Ok(self.tables.read().await.doctors.get(id).cloned())
    }

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<()> {
        self.tables.write().await.doctors.insert(doctor.id, doctor.clone());
        self.record_write();
        Ok(())
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.doctors.get_mut(&doctor.id) {
            Some(stored) => *stored = doctor.clone(),
            None => return Err(PurgoError::not_found("doctor", doctor.id)),
        }
        self.record_write();
        Ok(())
    }

    async fn delete_doctor(&self, id: &DoctorId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.doctors.remove(id).is_none() {
            return Ok(false);
        }
        for hospital in tables.hospitals.values_mut() {
            if hospital.director == Some(*id) {
                hospital.director = None;
            }
        }
        self.record_write();
        Ok(true)
    }

    async fn get_school(&self, id: &SchoolId) -> Result<Option<School>> {
        Ok(self.tables.read().await.schools.get(id).cloned())
    }

    async fn list_schools(&self) -> Result<Vec<School>> {
        let tables = self.tables.read().await;
        let mut schools: Vec<School> = tables.schools.values().cloned().collect();
        schools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schools)
    }

    async fn insert_school(&self, school: &School) -> Result<()> {
        self.tables.write().await.schools.insert(school.id, school.clone());
        self.record_write();
        Ok(())
    }

    async fn update_school(&self, school: &School) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.schools.get_mut(&school.id) {
            Some(stored) => *stored = school.clone(),
            None => return Err(PurgoError::not_found("school", school.id)),
        }
        self.record_write();
        Ok(())
    }

    async fn delete_school(&self, id: &SchoolId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.schools.remove(id).is_none() {
            return Ok(false);
        }
        for doctor in tables.doctors.values_mut() {
            if doctor.graduate_school == Some(*id) {
                doctor.graduate_school = None;
            }
        }
        self.record_write();
        Ok(true)
    }

    async fn get_major(&self, id: &MajorId) -> Result<Option<Major>> {
        Ok(self.tables.read().await.majors.get(id).cloned())
    }

    async fn list_majors(&self) -> Result<Vec<Major>> {
        let tables = self.tables.read().await;
        let mut majors: Vec<Major> = tables.majors.values().cloned().collect();
        majors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(majors)
    }

    async fn insert_major(&self, major: &Major) -> Result<()> {
        self.tables.write().await.majors.insert(major.id, major.clone());
        self.record_write();
        Ok(())
    }

    async fn update_major(&self, major: &Major) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.majors.get_mut(&major.id) {
            Some(stored) => *stored = major.clone(),
            None => return Err(PurgoError::not_found("major", major.id)),
        }
        self.record_write();
        Ok(())
    }

    async fn delete_major(&self, id: &MajorId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.majors.remove(id).is_none() {
            return Ok(false);
        }
        for doctor in tables.doctors.values_mut() {
            if doctor.major == Some(*id) {
                doctor.major = None;
            }
        }
        self.record_write();
        Ok(true)
    }
}
