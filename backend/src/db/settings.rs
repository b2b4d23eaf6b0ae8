use common::model::SiteSetting;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

fn map_row(row: &Row<'_>) -> rusqlite::Result<SiteSetting> {
    Ok(SiteSetting {
        id: row.get("id")?,
        key: row.get("key")?,
        value: row.get("value")?,
    })
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<SiteSetting>> {
    let mut stmt = conn.prepare("SELECT id, key, value FROM site_settings ORDER BY key")?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

/// Every stored setting as `key -> value`, missing values as empty text.
pub fn as_map(conn: &Connection) -> rusqlite::Result<BTreeMap<String, String>> {
    Ok(list(conn)?
        .into_iter()
        .map(|s| (s.key, s.value.unwrap_or_default()))
        .collect())
}

/// Replaces the value of `key`, inserting the row on first write.
pub fn upsert(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO site_settings (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;

    #[test]
    fn writing_the_same_pairs_twice_keeps_one_row_per_key() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();

        for _ in 0..2 {
            upsert(&conn, "site_name", "MathPhi Cafe").unwrap();
            upsert(&conn, "tagline", "Learn by doing").unwrap();
        }
        upsert(&conn, "tagline", "Think clearly").unwrap();

        let rows = list(&conn).unwrap();
        assert_eq!(rows.len(), 2);
        let map = as_map(&conn).unwrap();
        assert_eq!(map["tagline"], "Think clearly");
    }
}
