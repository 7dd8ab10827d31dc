use rusqlite::{params, OptionalExtension};

use crate::db::models::{NewUser, User};
use crate::error::AppResult;
use crate::state::DbPool;

/// Write a user record, replacing any existing record for the same email.
pub fn put_user(db: &DbPool, user: &NewUser) -> AppResult<()> {
    let conn = db.get()?;
    conn.execute(
        "INSERT OR REPLACE INTO users (email, username, registration_date)
         VALUES (?1, ?2, ?3)",
        params![&user.email, &user.username, &user.registration_date],
    )?;
    Ok(())
}

pub fn find_user(db: &DbPool, email: &str) -> AppResult<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            "SELECT email, username, registration_date FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    email: row.get(0)?,
                    username: row.get(1)?,
                    registration_date: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn put_then_find() {
        let pool = test_pool();
        put_user(&pool, &NewUser::new("a@x.com", "alice").unwrap()).unwrap();

        let user = find_user(&pool, "a@x.com").unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(find_user(&pool, "nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn registering_again_overwrites() {
        let pool = test_pool();
        put_user(&pool, &NewUser::new("a@x.com", "alice").unwrap()).unwrap();
        put_user(&pool, &NewUser::new("a@x.com", "alicia").unwrap()).unwrap();

        let user = find_user(&pool, "a@x.com").unwrap().unwrap();
        assert_eq!(user.username, "alicia");

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
