//! Hospital domain model
//!
//! [`HospitalRecord`] is what the registry says about a facility.
//! [`Hospital`] is the persisted row: the same registry fields plus the
//! sales-side references (`manager`, `director`) that only people set.

use super::ids::{DoctorId, HospitalId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Registry snapshot of a single hospital
///
/// Every field except `hospital_id` is optional; a tag missing from the
/// registry payload is `None`.
///
/// # Examples
///
/// ```
/// use purgo::domain::hospital::HospitalRecord;
/// use purgo::domain::ids::HospitalId;
///
/// let mut record = HospitalRecord::new(HospitalId::new("H1").unwrap());
/// record.hospital_name = Some("Test Hospital".to_string());
/// record.class_code_number = Some(1);
///
/// assert!(record.phone.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalRecord {
    /// Registry key (`ykiho`)
    pub hospital_id: HospitalId,

    /// Facility name (`yadmNm`)
    pub hospital_name: Option<String>,

    /// Human-readable classification name (`clCdNm`)
    pub class_code: Option<String>,

    /// Registry numeric classification code (`clCd`)
    pub class_code_number: Option<i32>,

    /// Phone number (`telno`)
    pub phone: Option<String>,

    /// Homepage (`hospUrl`)
    pub url: Option<String>,

    /// Founding date (`estbDd`, `YYYYMMDD`)
    pub established_at: Option<NaiveDate>,

    /// District name (`sgguCdNm`)
    pub sggu_name: Option<String>,

    /// Town name (`emdongNm`)
    pub emdong_name: Option<String>,

    /// Postal code (`postNo`)
    pub post_no: Option<i32>,

    /// Street address (`addr`)
    pub address: Option<String>,

    /// Province name (`sidoCdNm`)
    pub sido_name: Option<String>,

    /// District code (`sgguCd`)
    pub sggu_no: Option<i32>,

    /// Province code (`sidoCd`)
    pub sido_no: Option<i32>,

    /// General doctors on staff (`detyGdrCnt`)
    pub general_doctor_count: Option<i32>,

    /// Interns on staff (`detyIntnCnt`)
    pub intern_count: Option<i32>,

    /// Residents on staff (`detyResdntCnt`)
    pub resident_count: Option<i32>,

    /// Fellows on staff (`detySdrCnt`)
    pub fellow_doctor_count: Option<i32>,
}

// Expands `$apply!(field)` once per registry-sourced field, in column order.
macro_rules! for_each_registry_field {
    ($apply:ident) => {
        $apply!(hospital_name);
        $apply!(class_code);
        $apply!(class_code_number);
        $apply!(phone);
        $apply!(url);
        $apply!(established_at);
        $apply!(sggu_name);
        $apply!(emdong_name);
        $apply!(post_no);
        $apply!(address);
        $apply!(sido_name);
        $apply!(sggu_no);
        $apply!(sido_no);
        $apply!(general_doctor_count);
        $apply!(intern_count);
        $apply!(resident_count);
        $apply!(fellow_doctor_count);
    };
}

impl HospitalRecord {
    /// Names of the registry-sourced columns, in column order
    pub const FIELD_NAMES: [&'static str; 17] = [
        "hospital_name",
        "class_code",
        "class_code_number",
        "phone",
        "url",
        "established_at",
        "sggu_name",
        "emdong_name",
        "post_no",
        "address",
        "sido_name",
        "sggu_no",
        "sido_no",
        "general_doctor_count",
        "intern_count",
        "resident_count",
        "fellow_doctor_count",
    ];

    /// Creates a record with only its key set
    pub fn new(hospital_id: HospitalId) -> Self {
        Self {
            hospital_id,
            hospital_name: None,
            class_code: None,
            class_code_number: None,
            phone: None,
            url: None,
            established_at: None,
            sggu_name: None,
            emdong_name: None,
            post_no: None,
            address: None,
            sido_name: None,
            sggu_no: None,
            sido_no: None,
            general_doctor_count: None,
            intern_count: None,
            resident_count: None,
            fellow_doctor_count: None,
        }
    }

    /// Names of the fields whose values differ between `self` and `other`
    ///
    /// The key is not compared.
    pub fn diff(&self, other: &HospitalRecord) -> Vec<&'static str> {
        let mut changed = Vec::new();
        macro_rules! compare {
            ($field:ident) => {
                if self.$field != other.$field {
                    changed.push(stringify!($field));
                }
            };
        }
        for_each_registry_field!(compare);
        changed
    }

    /// Copies the fields of `source` that differ into `self`
    ///
    /// Returns the names of the fields that were overwritten.
    pub fn merge_from(&mut self, source: &HospitalRecord) -> Vec<&'static str> {
        let mut changed = Vec::new();
        macro_rules! merge {
            ($field:ident) => {
                if self.$field != source.$field {
                    self.$field = source.$field.clone();
                    changed.push(stringify!($field));
                }
            };
        }
        for_each_registry_field!(merge);
        changed
    }
}

/// Persisted hospital
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    /// Registry-sourced columns, including the key
    pub info: HospitalRecord,

    /// Sales manager of record
    pub manager: Option<UserId>,

    /// Doctor acting as director
    pub director: Option<DoctorId>,
}

impl Hospital {
    /// Creates a hospital from a fresh registry record, unassigned
    pub fn from_record(record: HospitalRecord) -> Self {
        Self {
            info: record,
            manager: None,
            director: None,
        }
    }

    /// Primary key
    pub fn id(&self) -> &HospitalId {
        &self.info.hospital_id
    }

    /// Overwrites the registry-sourced fields that differ from `record`
    ///
    /// `manager` and `director` are never touched. Returns the changed
    /// field names; an empty vector means the row is already current.
    pub fn apply_record(&mut self, record: &HospitalRecord) -> Vec<&'static str> {
        debug_assert_eq!(self.info.hospital_id, record.hospital_id);
        self.info.merge_from(record)
    }

    /// Whether `user` is this hospital's manager
    pub fn is_managed_by(&self, user: &UserId) -> bool {
        self.manager.as_ref() == Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> HospitalRecord {
        HospitalRecord::new(HospitalId::new(id).unwrap())
    }

    #[test]
    fn test_new_record_is_empty() {
        let r = record("H1");
        assert_eq!(r.hospital_id.as_str(), "H1");
        assert!(r.hospital_name.is_none());
        assert!(r.fellow_doctor_count.is_none());
    }

    #[test]
    fn test_diff_detects_changed_fields() {
        let mut a = record("H1");
        let mut b = record("H1");
        a.hospital_name = Some("Old".to_string());
        b.hospital_name = Some("New".to_string());
        b.intern_count = Some(3);

        assert_eq!(a.diff(&b), vec!["hospital_name", "intern_count"]);
        assert!(a.diff(&a).is_empty());
    }

    #[test]
    fn test_merge_copies_nulls_too() {
        let mut stored = record("H1");
        stored.phone = Some("02-000-0000".to_string());
        let incoming = record("H1");

        let changed = stored.merge_from(&incoming);
        assert_eq!(changed, vec!["phone"]);
        assert!(stored.phone.is_none());
    }

    #[test]
    fn test_field_names_cover_every_field() {
        let empty = record("H1");
        let mut full = record("H1");
        full.hospital_name = Some("a".into());
        full.class_code = Some("a".into());
        full.class_code_number = Some(1);
        full.phone = Some("a".into());
        full.url = Some("a".into());
        full.established_at = NaiveDate::from_ymd_opt(2000, 1, 1);
        full.sggu_name = Some("a".into());
        full.emdong_name = Some("a".into());
        full.post_no = Some(1);
        full.address = Some("a".into());
        full.sido_name = Some("a".into());
        full.sggu_no = Some(1);
        full.sido_no = Some(1);
        full.general_doctor_count = Some(1);
        full.intern_count = Some(1);
        full.resident_count = Some(1);
        full.fellow_doctor_count = Some(1);

        assert_eq!(empty.diff(&full), HospitalRecord::FIELD_NAMES.to_vec());
    }

    #[test]
    fn test_apply_record_keeps_manager_and_director() {
        let manager = UserId::generate();
        let director = DoctorId::generate();
        let mut hospital = Hospital::from_record(record("H1"));
        hospital.manager = Some(manager);
        hospital.director = Some(director);

        let mut update = record("H1");
        update.hospital_name = Some("Renamed".to_string());
        let changed = hospital.apply_record(&update);

        assert_eq!(changed, vec!["hospital_name"]);
        assert_eq!(hospital.manager, Some(manager));
        assert_eq!(hospital.director, Some(director));
        assert!(hospital.is_managed_by(&manager));
    }
}
