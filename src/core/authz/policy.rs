//! Per-resource permission policy

use crate::core::authz::predicates::{authenticated, is_admin, is_authenticated, is_manager, is_owner};
use crate::domain::errors::PermissionError;
use crate::domain::hospital::Hospital;
use crate::domain::user::User;

/// What a request acts on
///
/// Variants carry the data the ownership predicates need; resources
/// governed only by role carry nothing.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    User(&'a User),
    Department,
    Hospital(&'a Hospital),
    /// A sales entry, or the sales history of a hospital when creating
    SalesHistory { hospital: &'a Hospital },
    Doctor,
    School,
    Major,
}

impl Target<'_> {
    pub fn resource_name(&self) -> &'static str {
        match self {
            Target::User(_) => "user",
            Target::Department => "department",
            Target::Hospital(_) => "hospital",
            Target::SalesHistory { .. } => "sales history",
            Target::Doctor => "doctor",
            Target::School => "school",
            Target::Major => "major",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    AssignManager,
    SetDirector,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::AssignManager => "assign the manager of",
            Action::SetDirector => "set the director of",
        }
    }
}

/// Who may perform an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// No login needed
    Anyone,
    Authenticated,
    Admin,
    OwnerOrAdmin,
    ManagerOrAdmin,
    /// Not reachable through a principal at all
    Nobody,
}

impl Requirement {
    /// Evaluate against a principal that has already passed authentication
    pub fn is_met(self, user: &User, target: &Target<'_>) -> bool {
        let principal = Some(user);
        match self {
            Requirement::Anyone => true,
            Requirement::Authenticated => is_authenticated(principal),
            Requirement::Admin => is_admin(principal),
            Requirement::OwnerOrAdmin => is_owner(user, target) || is_admin(principal),
            Requirement::ManagerOrAdmin => is_manager(user, target) || is_admin(principal),
            Requirement::Nobody => false,
        }
    }
}

/// Look up the requirement for `action` on `target`
pub fn requirement(target: &Target<'_>, action: Action) -> Requirement {
    use Action::*;

    match (target, action) {
        (_, Read) => Requirement::Authenticated,

        (Target::User(_), Create) => Requirement::Anyone,
        (Target::User(_), Update | Delete) => Requirement::OwnerOrAdmin,

        (Target::Department, Create | Update | Delete) => Requirement::Admin,

        (Target::Hospital(_), Create) => Requirement::Nobody,
        (Target::Hospital(_), Update | SetDirector) => Requirement::ManagerOrAdmin,
        (Target::Hospital(_), Delete | AssignManager) => Requirement::Admin,

        (Target::SalesHistory { .. }, Create | Update | Delete) => Requirement::ManagerOrAdmin,

        (Target::Doctor | Target::School | Target::Major, Create | Update) => {
            Requirement::Authenticated
        }
        (Target::Doctor | Target::School | Target::Major, Delete) => Requirement::Admin,

        _ => Requirement::Nobody,
    }
}

/// Decide whether `principal` may perform `action` on `target`
///
/// Authentication is checked before any ownership predicate.
///
/// # Errors
///
/// [`PermissionError::NotAuthenticated`] for an absent or inactive
/// principal, [`PermissionError::Forbidden`] when the requirement fails.
///
/// # Examples
///
/// ```
/// use purgo::core::authz::{authorize, Action, Target};
/// use purgo::domain::{PermissionError, User};
///
/// let alice = User::new("alice@example.com", "Alice").unwrap();
/// let bob = User::new("bob@example.com", "Bob").unwrap();
///
/// assert!(authorize(Some(&alice), &Target::User(&alice), Action::Update).is_ok());
/// assert!(matches!(
///     authorize(Some(&bob), &Target::User(&alice), Action::Update),
///     Err(PermissionError::Forbidden { .. })
/// ));
/// assert_eq!(
///     authorize(None, &Target::User(&alice), Action::Update),
///     Err(PermissionError::NotAuthenticated)
/// );
/// ```
pub fn authorize(
    principal: Option<&User>,
    target: &Target<'_>,
    action: Action,
) -> Result<(), PermissionError> {
    let required = requirement(target, action);
    if required == Requirement::Anyone {
        return Ok(());
    }

    let user = authenticated(principal).ok_or(PermissionError::NotAuthenticated)?;

    let allowed = required.is_met(user, target);

    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %user.id,
            action = action.as_str(),
            resource = target.resource_name(),
            "Permission denied"
        );
        Err(PermissionError::Forbidden {
            action: action.as_str(),
            resource: target.resource_name(),
        })
    }
}
