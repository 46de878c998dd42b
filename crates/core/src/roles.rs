//! Well-known role names and the role hierarchy.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000002_create_departments_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MAIN_PMO: &str = "main_pmo";
pub const ROLE_DIRECTOR: &str = "director";
pub const ROLE_PMO: &str = "pmo";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_MEMBER: &str = "member";

/// All valid roles, highest privilege first.
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_MAIN_PMO,
    ROLE_DIRECTOR,
    ROLE_PMO,
    ROLE_MANAGER,
    ROLE_MEMBER,
];

/// Roles that receive project approval requests.
pub const APPROVER_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MAIN_PMO, ROLE_DIRECTOR];

/// Rank of a role in the hierarchy. Higher is more privileged; unknown roles rank 0.
pub fn role_rank(role: &str) -> u8 {
    match role {
        ROLE_ADMIN => 6,
        ROLE_MAIN_PMO => 5,
        ROLE_DIRECTOR => 4,
        ROLE_PMO => 3,
        ROLE_MANAGER => 2,
        ROLE_MEMBER => 1,
        _ => 0,
    }
}

/// Whether `role` is at least as privileged as `minimum`.
pub fn has_at_least(role: &str, minimum: &str) -> bool {
    let rank = role_rank(role);
    rank > 0 && rank >= role_rank(minimum)
}

/// Validate that a role string is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_outranks_everyone() {
        for role in VALID_ROLES {
            assert!(has_at_least(ROLE_ADMIN, role));
        }
    }

    #[test]
    fn manager_is_not_director() {
        assert!(has_at_least(ROLE_MANAGER, ROLE_MANAGER));
        assert!(!has_at_least(ROLE_MANAGER, ROLE_DIRECTOR));
    }

    #[test]
    fn unknown_role_has_no_privileges() {
        assert!(!has_at_least("guest", ROLE_MEMBER));
        assert_eq!(role_rank("guest"), 0);
    }

    #[test]
    fn validate_role_rejects_unknown() {
        assert!(validate_role("director").is_ok());
        let err = validate_role("Director").unwrap_err();
        assert!(err.contains("Invalid role"));
    }
}
