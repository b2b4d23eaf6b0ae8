//! First-run data: one administrator and the default subjects.
//! Both steps are skipped when their data already exists.

use super::subjects::SubjectFields;
use super::{admins, subjects};
use crate::auth::password;
use crate::error::AppError;
use log::info;
use rusqlite::Connection;

/// The administrator account to create on a fresh database.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl Default for AdminSeed {
    fn default() -> Self {
        AdminSeed {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            email: "admin@mathphicafe.com".to_string(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub subjects_created: usize,
}

const DEFAULT_SUBJECTS: [(&str, &str, &str, &str, &str); 5] = [
    (
        "Mathematics",
        "MATH",
        "Comprehensive mathematics coaching covering algebra, geometry, trigonometry, calculus, and more.",
        "bi-calculator",
        "#6C63FF",
    ),
    (
        "Physics",
        "PHY",
        "In-depth physics coaching covering mechanics, thermodynamics, optics, electromagnetism, and modern physics.",
        "bi-lightning",
        "#FF6584",
    ),
    (
        "Chemistry",
        "CHEM",
        "Complete chemistry coaching including organic, inorganic, and physical chemistry.",
        "bi-droplet-half",
        "#00C9A7",
    ),
    (
        "Biology",
        "BIO",
        "Thorough biology coaching covering botany, zoology, genetics, and ecology.",
        "bi-tree",
        "#F59E0B",
    ),
    (
        "Computer Science",
        "CS",
        "Programming and computer science fundamentals including Python, data structures, and algorithms.",
        "bi-cpu",
        "#8B5CF6",
    ),
];

pub fn run(conn: &Connection, admin: &AdminSeed, bcrypt_cost: u32) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    if admins::find_by_username(conn, &admin.username)?.is_none() {
        let hash = password::hash(&admin.password, bcrypt_cost)?;
        admins::insert(conn, &admin.username, &admin.email, &hash, "Administrator", true)?;
        info!("admin user '{}' created", admin.username);
        report.admin_created = true;
    } else {
        info!("admin user '{}' already exists", admin.username);
    }

    if subjects::count(conn)? == 0 {
        for (name, code, description, icon, color) in DEFAULT_SUBJECTS {
            subjects::insert(
                conn,
                &SubjectFields {
                    name: name.to_string(),
                    code: code.to_string(),
                    description: Some(description.to_string()),
                    icon: Some(icon.to_string()),
                    color: Some(color.to_string()),
                },
            )?;
            report.subjects_created += 1;
        }
        info!("{} default subjects created", report.subjects_created);
    } else {
        info!("subjects already exist");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;

    #[test]
    fn seeding_twice_creates_nothing_new() {
        let (_dir, db) = temp_db();
        let admin = AdminSeed::default();

        let first = db.transact(|tx| run(tx, &admin, 4)).unwrap();
        assert_eq!(
            first,
            SeedReport {
                admin_created: true,
                subjects_created: 5
            }
        );

        let second = db.transact(|tx| run(tx, &admin, 4)).unwrap();
        assert_eq!(second, SeedReport::default());

        let conn = db.connect().unwrap();
        assert_eq!(subjects::count(&conn).unwrap(), 5);
        assert!(subjects::find_active_by_code(&conn, "CS").unwrap().is_some());
    }
}
