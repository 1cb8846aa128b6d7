//! Permission predicates
//!
//! Plain functions over the current user and a [`Target`]; requirements
//! are built from them with ordinary boolean logic.

use crate::core::authz::policy::Target;
use crate::domain::user::User;

/// The principal if it may act at all
///
/// Inactive (soft-deleted) accounts count as unauthenticated.
pub fn authenticated(principal: Option<&User>) -> Option<&User> {
    principal.filter(|user| user.is_active)
}

pub fn is_authenticated(principal: Option<&User>) -> bool {
    authenticated(principal).is_some()
}

/// Authenticated and carrying the admin flag
pub fn is_admin(principal: Option<&User>) -> bool {
    authenticated(principal).is_some_and(|user| user.is_admin)
}

/// The target is the user's own account
pub fn is_owner(user: &User, target: &Target<'_>) -> bool {
    match target {
        Target::User(other) => other.id == user.id,
        _ => false,
    }
}

/// The user manages the target hospital, or the hospital a sales entry
/// belongs to
///
/// A hospital with no manager is managed by nobody.
pub fn is_manager(user: &User, target: &Target<'_>) -> bool {
    match target {
        Target::Hospital(hospital) | Target::SalesHistory { hospital } => {
            hospital.is_managed_by(&user.id)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hospital::{Hospital, HospitalRecord};
    use crate::domain::ids::HospitalId;

    fn hospital(manager: Option<&User>) -> Hospital {
        let mut hospital =
            Hospital::from_record(HospitalRecord::new(HospitalId::new("H1").unwrap()));
        hospital.manager = manager.map(|user| user.id);
        hospital
    }

    #[test]
    fn test_inactive_admin_is_not_admin() {
        let mut admin = User::new_superuser("root@example.com", "Root").unwrap();
        assert!(is_admin(Some(&admin)));

        admin.is_active = false;
        assert!(!is_authenticated(Some(&admin)));
        assert!(!is_admin(Some(&admin)));
        assert!(!is_admin(None));
    }

    #[test]
    fn test_owner_only_matches_own_account() {
        let alice = User::new("alice@example.com", "Alice").unwrap();
        let bob = User::new("bob@example.com", "Bob").unwrap();

        assert!(is_owner(&alice, &Target::User(&alice)));
        assert!(!is_owner(&alice, &Target::User(&bob)));
        assert!(!is_owner(&alice, &Target::Department));
    }

    #[test]
    fn test_manager_covers_hospital_and_its_sales_history() {
        let rep = User::new("rep@example.com", "Rep").unwrap();
        let other = User::new("other@example.com", "Other").unwrap();
        let managed = hospital(Some(&rep));
        let unassigned = hospital(None);

        assert!(is_manager(&rep, &Target::Hospital(&managed)));
        assert!(is_manager(&rep, &Target::SalesHistory { hospital: &managed }));
        assert!(!is_manager(&other, &Target::Hospital(&managed)));
        assert!(!is_manager(&rep, &Target::Hospital(&unassigned)));
    }
}
