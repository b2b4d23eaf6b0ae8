//! Identity, sessions and role guards.
//!
//! An authenticated caller is a [`Principal`]: either an administrator or a
//! student. The session cookie stores only the identity string
//! `{kind}:{id}` (for example `admin:1` or `student:7`); every request
//! resolves it back into a principal with a single lookup that dispatches on
//! the kind.

pub mod guard;
pub mod password;
pub mod session;

use crate::db;
use crate::error::AppError;
use common::model::{AdminUser, Role, Student};
use rusqlite::Connection;
use std::fmt;
use std::str::FromStr;

/// The session identity: which table, which row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub id: i64,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

impl FromStr for Identity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or(())?;
        Ok(Identity {
            role: kind.parse().map_err(|_| ())?,
            id: id.parse().map_err(|_| ())?,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Principal {
    Admin(AdminUser),
    Student(Student),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Admin(_) => Role::Admin,
            Principal::Student(_) => Role::Student,
        }
    }

    pub fn identity(&self) -> Identity {
        let id = match self {
            Principal::Admin(admin) => admin.id,
            Principal::Student(student) => student.id,
        };
        Identity {
            role: self.role(),
            id,
        }
    }
}

/// Loads the principal behind a session identity. Deactivated students no
/// longer resolve.
pub fn resolve(conn: &Connection, identity: Identity) -> Result<Option<Principal>, AppError> {
    Ok(match identity.role {
        Role::Admin => db::admins::find(conn, identity.id)?.map(Principal::Admin),
        Role::Student => db::students::find(conn, identity.id)?
            .filter(|s| s.is_active)
            .map(Principal::Student),
    })
}

/// Checks a login attempt for the given role. `username` is the admin
/// username or the student-id.
pub fn authenticate(
    conn: &Connection,
    role: Role,
    username: &str,
    password: &str,
) -> Result<Principal, AppError> {
    let principal = match role {
        Role::Admin => db::admins::find_by_username(conn, username)?.map(Principal::Admin),
        Role::Student => {
            db::students::find_active_by_student_id(conn, username)?.map(Principal::Student)
        }
    };
    let principal = principal.ok_or(AppError::InvalidCredentials)?;
    let hash = match &principal {
        Principal::Admin(admin) => &admin.password_hash,
        Principal::Student(student) => &student.password_hash,
    };
    if password::verify(password, hash) {
        Ok(principal)
    } else {
        Err(AppError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::students::{self, fixtures};
    use crate::db::test_support::temp_db;

    #[test]
    fn identities_round_trip_through_text() {
        let identity: Identity = "student:7".parse().unwrap();
        assert_eq!(identity, Identity { role: Role::Student, id: 7 });
        assert_eq!(identity.to_string(), "student:7");
        assert!("teacher:1".parse::<Identity>().is_err());
        assert!("admin:".parse::<Identity>().is_err());
        assert!("admin".parse::<Identity>().is_err());
    }

    #[test]
    fn students_authenticate_by_student_id_while_active() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let hash = password::hash("s3cretpw", 4).unwrap();
        let id = students::insert(&conn, "MPC-2026-001", &fixtures::fields("A", "a@x.io", 10), &hash)
            .unwrap();

        let principal = authenticate(&conn, Role::Student, "MPC-2026-001", "s3cretpw").unwrap();
        assert_eq!(principal.identity(), Identity { role: Role::Student, id });
        assert!(matches!(
            authenticate(&conn, Role::Student, "MPC-2026-001", "wrong"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&conn, Role::Admin, "MPC-2026-001", "s3cretpw"),
            Err(AppError::InvalidCredentials)
        ));

        students::deactivate(&conn, id).unwrap();
        assert!(authenticate(&conn, Role::Student, "MPC-2026-001", "s3cretpw").is_err());
        assert!(resolve(&conn, Identity { role: Role::Student, id }).unwrap().is_none());
    }
}
