//! Table-driven tests for the permission policy

use purgo::core::authz::{authorize, is_admin, is_manager, is_owner, Action, Target};
use purgo::domain::{Hospital, HospitalId, HospitalRecord, PermissionError, PurgoError, User};
use test_case::test_case;

#[derive(Clone, Copy, Debug)]
enum Who {
    Anonymous,
    Inactive,
    Owner,
    Other,
    Manager,
    Admin,
}

#[derive(Clone, Copy, Debug)]
enum Outcome {
    Allowed,
    Unauthenticated,
    Forbidden,
}

struct World {
    owner: User,
    other: User,
    manager: User,
    admin: User,
    inactive: User,
    hospital: Hospital,
}

impl World {
    fn new() -> Self {
        let owner = User::new("owner@example.com", "Owner").unwrap();
        let other = User::new("other@example.com", "Other").unwrap();
        let manager = User::new("manager@example.com", "Manager").unwrap();
        let mut admin = User::new("admin@example.com", "Admin").unwrap();
        admin.is_admin = true;
        let mut inactive = User::new("gone@example.com", "Gone").unwrap();
        inactive.is_active = false;
        inactive.is_admin = true;

        let mut hospital = Hospital::from_record(HospitalRecord::new(HospitalId::new("H1").unwrap()));
        hospital.manager = Some(manager.id);

        Self {
            owner,
            other,
            manager,
            admin,
            inactive,
            hospital,
        }
    }

    fn principal(&self, who: Who) -> Option<&User> {
        match who {
            Who::Anonymous => None,
            Who::Inactive => Some(&self.inactive),
            Who::Owner => Some(&self.owner),
            Who::Other => Some(&self.other),
            Who::Manager => Some(&self.manager),
            Who::Admin => Some(&self.admin),
        }
    }
}

fn check(result: Result<(), PermissionError>, expected: Outcome) {
    match (result, expected) {
        (Ok(()), Outcome::Allowed) => {}
        (Err(PermissionError::NotAuthenticated), Outcome::Unauthenticated) => {}
        (Err(PermissionError::Forbidden { .. }), Outcome::Forbidden) => {}
        (got, want) => panic!("expected {want:?}, got {got:?}"),
    }
}

#[test_case(Who::Anonymous, Outcome::Unauthenticated; "anonymous")]
#[test_case(Who::Inactive, Outcome::Unauthenticated; "inactive admin")]
#[test_case(Who::Owner, Outcome::Allowed; "owner")]
#[test_case(Who::Other, Outcome::Forbidden; "other user")]
#[test_case(Who::Admin, Outcome::Allowed; "admin")]
fn user_update(who: Who, expected: Outcome) {
    let world = World::new();
    let target = Target::User(&world.owner);
    check(authorize(world.principal(who), &target, Action::Update), expected);
    check(authorize(world.principal(who), &target, Action::Delete), expected);
}

#[test_case(Who::Anonymous, Outcome::Unauthenticated; "anonymous")]
#[test_case(Who::Other, Outcome::Forbidden; "other user")]
#[test_case(Who::Manager, Outcome::Allowed; "manager")]
#[test_case(Who::Admin, Outcome::Allowed; "admin")]
fn sales_history_create(who: Who, expected: Outcome) {
    let world = World::new();
    let target = Target::SalesHistory {
        hospital: &world.hospital,
    };
    check(authorize(world.principal(who), &target, Action::Create), expected);
}

#[test_case(Who::Manager, Action::SetDirector, Outcome::Allowed; "manager sets director")]
#[test_case(Who::Manager, Action::AssignManager, Outcome::Forbidden; "manager cannot reassign")]
#[test_case(Who::Manager, Action::Delete, Outcome::Forbidden; "manager cannot delete")]
#[test_case(Who::Admin, Action::AssignManager, Outcome::Allowed; "admin reassigns")]
#[test_case(Who::Admin, Action::Delete, Outcome::Allowed; "admin deletes")]
#[test_case(Who::Other, Action::Read, Outcome::Allowed; "anyone logged in reads")]
#[test_case(Who::Anonymous, Action::Read, Outcome::Unauthenticated; "anonymous read")]
fn hospital_actions(who: Who, action: Action, expected: Outcome) {
    let world = World::new();
    check(
        authorize(world.principal(who), &Target::Hospital(&world.hospital), action),
        expected,
    );
}

#[test_case(Action::Create, Outcome::Allowed; "create")]
#[test_case(Action::Update, Outcome::Allowed; "update")]
#[test_case(Action::Delete, Outcome::Forbidden; "delete")]
fn directory_for_plain_user(action: Action, expected: Outcome) {
    let world = World::new();
    for target in [Target::Doctor, Target::School, Target::Major] {
        check(authorize(Some(&world.other), &target, action), expected);
    }
}

#[test]
fn anonymous_may_register() {
    let candidate = User::new("new@example.com", "New").unwrap();
    assert!(authorize(None, &Target::User(&candidate), Action::Create).is_ok());
}

#[test]
fn unmanaged_hospital_has_no_manager() {
    let world = World::new();
    let unmanaged = Hospital::from_record(HospitalRecord::new(HospitalId::new("H2").unwrap()));
    assert!(!is_manager(&world.manager, &Target::Hospital(&unmanaged)));
    assert!(is_manager(&world.manager, &Target::Hospital(&world.hospital)));
}

#[test]
fn predicates() {
    let world = World::new();
    assert!(is_admin(Some(&world.admin)));
    assert!(!is_admin(Some(&world.inactive)));
    assert!(!is_admin(None));
    assert!(is_owner(&world.owner, &Target::User(&world.owner)));
    assert!(!is_owner(&world.other, &Target::User(&world.owner)));
}

#[test]
fn status_codes_distinguish_401_from_403() {
    let unauthenticated = PurgoError::from(PermissionError::NotAuthenticated);
    let forbidden = PurgoError::from(PermissionError::Forbidden {
        action: "delete",
        resource: "hospital",
    });
    assert_eq!(unauthenticated.status_code(), 401);
    assert_eq!(forbidden.status_code(), 403);
}
