/// Role claim carried in the bearer token. Ids match the identity service.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Staff = 3,
    System = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Staff),
            4 => Some(Role::System),
            _ => None,
        }
    }

    /// Reviewers approve, reject, rank and bind substitutes.
    pub fn can_review(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_and_hr_review() {
        assert!(Role::Admin.can_review());
        assert!(Role::Hr.can_review());
        assert!(!Role::Staff.can_review());
        assert!(!Role::System.can_review());
        assert_eq!(Role::from_id(9), None);
    }
}
