/// Role id carried in the `role` claim of access tokens.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub fn from_claim(id: u8) -> Option<Self> {
        [Role::Admin, Role::Hr, Role::Employee]
            .into_iter()
            .find(|role| *role as u8 == id)
    }

    /// Admin and HR may manage offices and review everyone's attendance.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_ids_map_to_roles() {
        assert_eq!(Role::from_claim(1), Some(Role::Admin));
        assert_eq!(Role::from_claim(2), Some(Role::Hr));
        assert_eq!(Role::from_claim(3), Some(Role::Employee));
        assert_eq!(Role::from_claim(0), None);
        assert_eq!(Role::from_claim(4), None);
    }

    #[test]
    fn only_admin_and_hr_are_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Hr.is_staff());
        assert!(!Role::Employee.is_staff());
    }
}
