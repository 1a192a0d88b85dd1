//! Records used when nothing usable is persisted.

use chrono::DateTime;
use roster_model::{
    Permission, PermissionSet, Role, RoleId, Timestamp, User, UserId,
    UserStatus,
};

fn date(year: i32, month: u32, day: u32) -> Timestamp {
    Timestamp::from_ymd(year, month, day)
        .unwrap_or_else(|| Timestamp::new(DateTime::UNIX_EPOCH))
}

/// The two accounts a fresh panel starts with.
pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: UserId(1),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            role: "admin".to_string(),
            status: UserStatus::Active,
            last_login: date(2024, 3, 20),
            created_at: Some(date(2024, 1, 15)),
        },
        User {
            id: UserId(2),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            role: "user".to_string(),
            status: UserStatus::Active,
            last_login: date(2024, 3, 21),
            created_at: Some(date(2024, 2, 1)),
        },
    ]
}

/// The default `admin` and `user` roles.
pub fn seed_roles() -> Vec<Role> {
    vec![
        Role {
            id: RoleId(1),
            name: "admin".to_string(),
            permissions: Permission::all().iter().copied().collect(),
            description: "Full system access".to_string(),
        },
        Role {
            id: RoleId(2),
            name: "user".to_string(),
            permissions: PermissionSet::from(vec![Permission::Read]),
            description: "Basic access".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_match_documented_records() {
        let users = seed_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "John Doe");
        assert_eq!(users[0].created_at, Timestamp::from_ymd(2024, 1, 15));
        assert_eq!(users[1].email, "jane@example.com");
        assert_eq!(users[1].last_login, date(2024, 3, 21));

        let roles = seed_roles();
        assert_eq!(
            roles[0].permissions.as_slice(),
            &[Permission::Read, Permission::Write, Permission::Delete]
        );
        assert_eq!(roles[1].permissions.as_slice(), &[Permission::Read]);
    }
}
