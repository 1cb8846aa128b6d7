//! PostgreSQL adapter implementing the store traits

use crate::adapters::database::traits::{
    DatabaseClient, DirectoryStore, HospitalStore, SalesHistoryStore, UserStore,
};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    department_from_row, doctor_from_row, hospital_from_row, major_from_row, sales_entry_from_row,
    school_from_row, user_from_row, DOCTOR_COLUMNS, HOSPITAL_COLUMNS, SALES_COLUMNS, USER_COLUMNS,
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
use std::sync::Arc;
use uuid::Uuid;

/// PostgreSQL implementation of the store traits
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    fn expect_one(affected: u64, entity: &'static str, id: impl ToString) -> Result<()> {
        if affected == 0 {
            return Err(PurgoError::not_found(entity, id));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseClient for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}

#[async_trait]
impl HospitalStore for PostgreSQLAdapter {
    async fn get_hospital(&self, id: &HospitalId) -> Result<Option<Hospital>> {
        let sql = format!("SELECT {HOSPITAL_COLUMNS} FROM hospitals WHERE hospital_id = $1");
        self.client
            .query_opt(&sql, &[&id.as_str()])
            .await?
            .map(|row| hospital_from_row(&row))
            .transpose()
    }

    async fn insert_hospital(&self, hospital: &Hospital) -> Result<()> {
        let r = &hospital.info;
        let manager = hospital.manager.map(|m| m.as_uuid());
        let director = hospital.director.map(|d| d.as_uuid());
        let sql = format!(
            "INSERT INTO hospitals ({HOSPITAL_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)"
        );
        self.client
            .execute(
                &sql,
                &[
                    &r.hospital_id.as_str(),
                    &r.hospital_name,
                    &r.class_code,
                    &r.class_code_number,
                    &r.phone,
                    &r.url,
                    &r.established_at,
                    &r.sggu_name,
                    &r.emdong_name,
                    &r.post_no,
                    &r.address,
                    &r.sido_name,
                    &r.sggu_no,
                    &r.sido_no,
                    &r.general_doctor_count,
                    &r.intern_count,
                    &r.resident_count,
                    &r.fellow_doctor_count,
                    &manager,
                    &director,
                ],
            )
            .await?;
        Ok(())
    }

    async fn update_registry_fields(&self, r: &HospitalRecord) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE hospitals SET hospital_name = $2, class_code = $3, class_code_number = $4, \
                 phone = $5, url = $6, established_at = $7, sggu_name = $8, emdong_name = $9, \
                 post_no = $10, address = $11, sido_name = $12, sggu_no = $13, sido_no = $14, \
                 general_doctor_count = $15, intern_count = $16, resident_count = $17, \
                 fellow_doctor_count = $18 WHERE hospital_id = $1",
                &[
                    &r.hospital_id.as_str(),
                    &r.hospital_name,
                    &r.class_code,
                    &r.class_code_number,
                    &r.phone,
                    &r.url,
                    &r.established_at,
                    &r.sggu_name,
                    &r.emdong_name,
                    &r.post_no,
                    &r.address,
                    &r.sido_name,
                    &r.sggu_no,
                    &r.sido_no,
                    &r.general_doctor_count,
                    &r.intern_count,
                    &r.resident_count,
                    &r.fellow_doctor_count,
                ],
            )
            .await?;
        Self::expect_one(affected, "hospital", &r.hospital_id)
    }

    async fn set_manager(&self, id: &HospitalId, manager: Option<UserId>) -> Result<()> {
        let manager = manager.map(|m| m.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE hospitals SET manager_id = $2 WHERE hospital_id = $1",
                &[&id.as_str(), &manager],
            )
            .await?;
        Self::expect_one(affected, "hospital", id)
    }

    async fn set_director(&self, id: &HospitalId, director: Option<DoctorId>) -> Result<()> {
        let director = director.map(|d| d.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE hospitals SET director_id = $2 WHERE hospital_id = $1",
                &[&id.as_str(), &director],
            )
            .await?;
        Self::expect_one(affected, "hospital", id)
    }

    async fn delete_hospital(&self, id: &HospitalId) -> Result<bool> {
        // sales_histories rows go with it through ON DELETE CASCADE
        let affected = self
            .client
            .execute("DELETE FROM hospitals WHERE hospital_id = $1", &[&id.as_str()])
            .await?;
        Ok(affected > 0)
    }

    async fn hospitals_managed_by(&self, user: &UserId) -> Result<Vec<HospitalId>> {
        let rows = self
            .client
            .query(
                "SELECT hospital_id FROM hospitals WHERE manager_id = $1 ORDER BY hospital_id",
                &[&user.as_uuid()],
            )
            .await?;
        rows.iter()
            .map(|row| {
                let id: String = row.get(0);
                HospitalId::new(id).map_err(PurgoError::Database)
            })
            .collect()
    }

    async fn count_hospitals(&self) -> Result<u64> {
        let rows = self.client.query("SELECT COUNT(*) FROM hospitals", &[]).await?;
        let count: i64 = rows.first().map(|r| r.get(0)).unwrap_or(0);
        Ok(count as u64)
    }
}

#[async_trait]
impl UserStore for PostgreSQLAdapter {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.client
            .query_opt(&sql, &[&id.as_uuid()])
            .await?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.client
            .query_opt(&sql, &[&email])
            .await?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY name, email");
        let rows = self.client.query(&sql, &[]).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let department = user.department.map(|d| d.as_uuid());
        let sql = format!("INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)");
        self.client
            .execute(
                &sql,
                &[
                    &user.id.as_uuid(),
                    &user.email,
                    &user.name,
                    &department,
                    &user.is_active,
                    &user.is_admin,
                    &user.is_staff,
                    &user.is_superuser,
                ],
            )
            .await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let department = user.department.map(|d| d.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE users SET email = $2, name = $3, department_id = $4, is_active = $5, \
                 is_admin = $6, is_staff = $7, is_superuser = $8 WHERE id = $1",
                &[
                    &user.id.as_uuid(),
                    &user.email,
                    &user.name,
                    &department,
                    &user.is_active,
                    &user.is_admin,
                    &user.is_staff,
                    &user.is_superuser,
                ],
            )
            .await?;
        Self::expect_one(affected, "user", user.id)
    }

    async fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>> {
        self.client
            .query_opt("SELECT id, name FROM departments WHERE id = $1", &[&id.as_uuid()])
            .await?
            .map(|row| department_from_row(&row))
            .transpose()
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        let rows = self
            .client
            .query("SELECT id, name FROM departments ORDER BY name", &[])
            .await?;
        rows.iter().map(department_from_row).collect()
    }

    async fn insert_department(&self, department: &Department) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO departments (id, name) VALUES ($1, $2)",
                &[&department.id.as_uuid(), &department.name],
            )
            .await?;
        Ok(())
    }

    async fn update_department(&self, department: &Department) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE departments SET name = $2 WHERE id = $1",
                &[&department.id.as_uuid(), &department.name],
            )
            .await?;
        Self::expect_one(affected, "department", department.id)
    }

    async fn delete_department(&self, id: &DepartmentId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM departments WHERE id = $1", &[&id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl SalesHistoryStore for PostgreSQLAdapter {
    async fn get_sales_entry(&self, id: &SalesHistoryId) -> Result<Option<SalesHistoryEntry>> {
        let sql = format!("SELECT {SALES_COLUMNS} FROM sales_histories WHERE id = $1");
        self.client
            .query_opt(&sql, &[&id.as_uuid()])
            .await?
            .map(|row| sales_entry_from_row(&row))
            .transpose()
    }

    async fn insert_sales_entry(&self, entry: &SalesHistoryEntry) -> Result<()> {
        let sql = format!("INSERT INTO sales_histories ({SALES_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)");
        let result = self
            .client
            .execute(
                &sql,
                &[
                    &entry.id.as_uuid(),
                    &entry.hospital.as_str(),
                    &entry.content,
                    &entry.status.code(),
                    &entry.created_at,
                    &entry.modified_at,
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            // foreign-key violation surfaces as a validation error
            Err(PurgoError::Validation(_)) => Err(PurgoError::not_found("hospital", &entry.hospital)),
            Err(e) => Err(e),
        }
    }

    async fn update_sales_entry(&self, entry: &SalesHistoryEntry) -> Result<SalesHistoryEntry> {
        let sql = format!(
            "UPDATE sales_histories SET content = $2, status = $3, \
             modified_at = GREATEST(NOW(), modified_at + INTERVAL '1 microsecond') \
             WHERE id = $1 RETURNING {SALES_COLUMNS}"
        );
        let row = self
            .client
            .query_opt(&sql, &[&entry.id.as_uuid(), &entry.content, &entry.status.code()])
            .await?
            .ok_or_else(|| PurgoError::not_found("sales history", entry.id))?;
        sales_entry_from_row(&row)
    }

    async fn delete_sales_entry(&self, id: &SalesHistoryId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM sales_histories WHERE id = $1", &[&id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn list_sales_for_hospital(
        &self,
        hospital: &HospitalId,
    ) -> Result<Vec<SalesHistoryEntry>> {
        let sql = format!(
            "SELECT {SALES_COLUMNS} FROM sales_histories WHERE hospital_id = $1 \
             ORDER BY modified_at DESC"
        );
        let rows = self.client.query(&sql, &[&hospital.as_str()]).await?;
        rows.iter().map(sales_entry_from_row).collect()
    }

    async fn sales_status_counts(
        &self,
        manager: Option<&UserId>,
    ) -> Result<Vec<(SalesStatus, u64)>> {
        let manager: Option<Uuid> = manager.map(|m| m.as_uuid());
        let rows = self
            .client
            .query(
                "SELECT s.status, COUNT(*) FROM sales_histories s \
                 JOIN hospitals h ON h.hospital_id = s.hospital_id \
                 WHERE $1::uuid IS NULL OR h.manager_id = $1 \
                 GROUP BY s.status ORDER BY s.status",
                &[&manager],
            )
            .await?;

        rows.iter()
            .map(|row| {
                let code: i16 = row.get(0);
                let count: i64 = row.get(1);
                let status = SalesStatus::from_code(code).ok_or_else(|| {
                    PurgoError::Database(format!("Unknown sales status code {code}"))
                })?;
                Ok((status, count as u64))
            })
            .collect()
    }

    async fn recent_sales(
        &self,
        manager: Option<&UserId>,
        limit: usize,
    ) -> Result<Vec<SalesHistoryEntry>> {
        let manager: Option<Uuid> = manager.map(|m| m.as_uuid());
        let limit = limit as i64;
        let rows = self
            .client
            .query(
                "SELECT s.id, s.hospital_id, s.content, s.status, s.created_at, s.modified_at \
                 FROM sales_histories s JOIN hospitals h ON h.hospital_id = s.hospital_id \
                 WHERE $1::uuid IS NULL OR h.manager_id = $1 \
                 ORDER BY s.modified_at DESC LIMIT $2",
                &[&manager, &limit],
            )
            .await?;
        rows.iter().map(sales_entry_from_row).collect()
    }
}

#[async_trait]
impl DirectoryStore for PostgreSQLAdapter {
    async fn get_doctor(&self, id: &DoctorId) -> Result<Option<Doctor>> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1");
        self.client
            .query_opt(&sql, &[&id.as_uuid()])
            .await?
            .map(|row| doctor_from_row(&row))
            .transpose()
    }

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<()> {
        let school = doctor.graduate_school.map(|s| s.as_uuid());
        let major = doctor.major.map(|m| m.as_uuid());
        let sql = format!("INSERT INTO doctors ({DOCTOR_COLUMNS}) VALUES ($1, $2, $3, $4, $5)");
        self.client
            .execute(
                &sql,
                &[&doctor.id.as_uuid(), &doctor.name, &doctor.graduate_year, &school, &major],
            )
            .await?;
        Ok(())
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<()> {
        let school = doctor.graduate_school.map(|s| s.as_uuid());
        let major = doctor.major.map(|m| m.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE doctors SET name = $2, graduate_year = $3, graduate_school_id = $4, \
                 major_id = $5 WHERE id = $1",
                &[&doctor.id.as_uuid(), &doctor.name, &doctor.graduate_year, &school, &major],
            )
            .await?;
        Self::expect_one(affected, "doctor", doctor.id)
    }

    async fn delete_doctor(&self, id: &DoctorId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM doctors WHERE id = $1", &[&id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn get_school(&self, id: &SchoolId) -> Result<Option<School>> {
        self.client
            .query_opt("SELECT id, name FROM schools WHERE id = $1", &[&id.as_uuid()])
            .await?
            .map(|row| school_from_row(&row))
            .transpose()
    }

    async fn list_schools(&self) -> Result<Vec<School>> {
        let rows = self
            .client
            .query("SELECT id, name FROM schools ORDER BY name", &[])
            .await?;
        rows.iter().map(school_from_row).collect()
    }

    async fn insert_school(&self, school: &School) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO schools (id, name) VALUES ($1, $2)",
                &[&school.id.as_uuid(), &school.name],
            )
            .await?;
        Ok(())
    }

    async fn update_school(&self, school: &School) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE schools SET name = $2 WHERE id = $1",
                &[&school.id.as_uuid(), &school.name],
            )
            .await?;
        Self::expect_one(affected, "school", school.id)
    }

    async fn delete_school(&self, id: &SchoolId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM schools WHERE id = $1", &[&id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn get_major(&self, id: &MajorId) -> Result<Option<Major>> {
        self.client
            .query_opt("SELECT id, name FROM majors WHERE id = $1", &[&id.as_uuid()])
            .await?
            .map(|row| major_from_row(&row))
            .transpose()
    }

    async fn list_majors(&self) -> Result<Vec<Major>> {
        let rows = self
            .client
            .query("SELECT id, name FROM majors ORDER BY name", &[])
            .await?;
        rows.iter().map(major_from_row).collect()
    }

    async fn insert_major(&self, major: &Major) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO majors (id, name) VALUES ($1, $2)",
                &[&major.id.as_uuid(), &major.name],
            )
            .await?;
        Ok(())
    }

    async fn update_major(&self, major: &Major) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE majors SET name = $2 WHERE id = $1",
                &[&major.id.as_uuid(), &major.name],
            )
            .await?;
        Self::expect_one(affected, "major", major.id)
    }

    async fn delete_major(&self, id: &MajorId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM majors WHERE id = $1", &[&id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }
}
