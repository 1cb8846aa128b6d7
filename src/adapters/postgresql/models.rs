//! Row mapping between PostgreSQL and domain types

use crate::domain::directory::{Doctor, Major, School};
use crate::domain::hospital::{Hospital, HospitalRecord};
use crate::domain::ids::{
    DepartmentId, DoctorId, HospitalId, MajorId, SalesHistoryId, SchoolId, UserId,
};
use crate::domain::sales::{SalesHistoryEntry, SalesStatus};
use crate::domain::user::{Department, User};
use crate::domain::{PurgoError, Result};
use tokio_postgres::Row;
use uuid::Uuid;

/// Column list matching [`hospital_from_row`]
pub const HOSPITAL_COLUMNS: &str = "hospital_id, hospital_name, class_code, class_code_number, \
     phone, url, established_at, sggu_name, emdong_name, post_no, address, sido_name, sggu_no, \
     sido_no, general_doctor_count, intern_count, resident_count, fellow_doctor_count, \
     manager_id, director_id";

/// Column list matching [`user_from_row`]
pub const USER_COLUMNS: &str =
    "id, email, name, department_id, is_active, is_admin, is_staff, is_superuser";

/// Column list matching [`sales_entry_from_row`]
pub const SALES_COLUMNS: &str = "id, hospital_id, content, status, created_at, modified_at";

/// Column list matching [`doctor_from_row`]
pub const DOCTOR_COLUMNS: &str = "id, name, graduate_year, graduate_school_id, major_id";

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|e| PurgoError::Database(format!("Failed to read column {name}: {e}")))
}

pub fn hospital_from_row(row: &Row) -> Result<Hospital> {
    let id: String = column(row, "hospital_id")?;
    let mut info = HospitalRecord::new(HospitalId::new(id).map_err(PurgoError::Database)?);
    info.hospital_name = column(row, "hospital_name")?;
    info.class_code = column(row, "class_code")?;
    info.class_code_number = column(row, "class_code_number")?;
    info.phone = column(row, "phone")?;
    info.url = column(row, "url")?;
    info.established_at = column(row, "established_at")?;
    info.sggu_name = column(row, "sggu_name")?;
    info.emdong_name = column(row, "emdong_name")?;
    info.post_no = column(row, "post_no")?;
    info.address = column(row, "address")?;
    info.sido_name = column(row, "sido_name")?;
    info.sggu_no = column(row, "sggu_no")?;
    info.sido_no = column(row, "sido_no")?;
    info.general_doctor_count = column(row, "general_doctor_count")?;
    info.intern_count = column(row, "intern_count")?;
    info.resident_count = column(row, "resident_count")?;
    info.fellow_doctor_count = column(row, "fellow_doctor_count")?;

    let manager: Option<Uuid> = column(row, "manager_id")?;
    let director: Option<Uuid> = column(row, "director_id")?;

    Ok(Hospital {
        info,
        manager: manager.map(UserId::from_uuid),
        director: director.map(DoctorId::from_uuid),
    })
}

pub fn user_from_row(row: &Row) -> Result<User> {
    let department: Option<Uuid> = column(row, "department_id")?;
    Ok(User {
        id: UserId::from_uuid(column(row, "id")?),
        email: column(row, "email")?,
        name: column(row, "name")?,
        department: department.map(DepartmentId::from_uuid),
        is_active: column(row, "is_active")?,
        is_admin: column(row, "is_admin")?,
        is_staff: column(row, "is_staff")?,
        is_superuser: column(row, "is_superuser")?,
    })
}

pub fn department_from_row(row: &Row) -> Result<Department> {
    Ok(Department {
        id: DepartmentId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
    })
}

pub fn sales_entry_from_row(row: &Row) -> Result<SalesHistoryEntry> {
    let hospital: String = column(row, "hospital_id")?;
    let code: i16 = column(row, "status")?;
    let status = SalesStatus::from_code(code)
        .ok_or_else(|| PurgoError::Database(format!("Unknown sales status code {code}")))?;

    Ok(SalesHistoryEntry {
        id: SalesHistoryId::from_uuid(column(row, "id")?),
        hospital: HospitalId::new(hospital).map_err(PurgoError::Database)?,
        content: column(row, "content")?,
        status,
        created_at: column(row, "created_at")?,
        modified_at: column(row, "modified_at")?,
    })
}

pub fn doctor_from_row(row: &Row) -> Result<Doctor> {
    let school: Option<Uuid> = column(row, "graduate_school_id")?;
    let major: Option<Uuid> = column(row, "major_id")?;
    Ok(Doctor {
        id: DoctorId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        graduate_year: column(row, "graduate_year")?,
        graduate_school: school.map(SchoolId::from_uuid),
        major: major.map(MajorId::from_uuid),
    })
}

pub fn school_from_row(row: &Row) -> Result<School> {
    Ok(School {
        id: SchoolId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
    })
}

pub fn major_from_row(row: &Row) -> Result<Major> {
    Ok(Major {
        id: MajorId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
    })
}
