use rusqlite::{params, Connection, Row};
use serde::Deserialize;

use crate::db::models::{
    CustomList, CustomListEntry, CustomListMovie, CustomListWithCount, CustomListWithMovies,
    CustomListWithOwner, ProfileSummary,
};
use crate::state::DbPool;
use crate::store::{movies, StoreError, StoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CustomListDraft {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

/// Patchable list fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomListUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

pub fn create_custom_list(
    pool: &DbPool,
    user_id: &str,
    draft: &CustomListDraft,
) -> StoreResult<CustomList> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO custom_lists (id, user_id, name, description, is_public)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, user_id, draft.name, draft.description, draft.is_public],
    )?;

    fetch_list(&conn, &id)
}

/// The owner's lists with per-list movie counts, newest first.
pub fn get_user_custom_lists(
    pool: &DbPool,
    user_id: &str,
) -> StoreResult<Vec<CustomListWithCount>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT l.id, l.user_id, l.name, l.description, l.is_public, l.created_at, l.updated_at,
                (SELECT COUNT(*) FROM custom_list_movies lm WHERE lm.list_id = l.id)
         FROM custom_lists l
         WHERE l.user_id = ?1
         ORDER BY l.created_at DESC, l.id DESC",
    )?;

    let lists = stmt
        .query_map(params![user_id], |row| {
            Ok(CustomListWithCount {
                list: list_from_row(row, 0)?,
                movie_count: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lists)
}

/// One list with every member movie's full record and when it was added.
/// Visible when public or owned by `viewer`; otherwise `NotFound`.
pub fn get_custom_list(
    pool: &DbPool,
    list_id: &str,
    viewer: Option<&str>,
) -> StoreResult<CustomListWithMovies> {
    let conn = pool.get()?;

    let list = conn.query_row(
        "SELECT id, user_id, name, description, is_public, created_at, updated_at
         FROM custom_lists
         WHERE id = ?1 AND (is_public = 1 OR user_id = ?2)",
        params![list_id, viewer.unwrap_or("")],
        |row| list_from_row(row, 0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT lm.id, lm.added_at,
                m.id, m.imdb_id, m.title, m.year, m.poster_url, m.plot, m.genre, m.director,
                m.actors, m.imdb_rating, m.created_at, m.updated_at
         FROM custom_list_movies lm
         JOIN movies m ON m.id = lm.movie_id
         WHERE lm.list_id = ?1
         ORDER BY lm.added_at DESC, lm.id DESC",
    )?;

    let entries = stmt
        .query_map(params![list_id], |row| {
            Ok(CustomListEntry {
                id: row.get(0)?,
                added_at: row.get(1)?,
                movie: movies::movie_from_row(row, 2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CustomListWithMovies {
        list,
        movies: entries,
    })
}

/// Public lists, newest first, with owner projection and movie counts.
pub fn get_public_custom_lists(
    pool: &DbPool,
    limit: i64,
) -> StoreResult<Vec<CustomListWithOwner>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT l.id, l.user_id, l.name, l.description, l.is_public, l.created_at, l.updated_at,
                u.username, u.display_name, u.avatar_url,
                (SELECT COUNT(*) FROM custom_list_movies lm WHERE lm.list_id = l.id)
         FROM custom_lists l
         JOIN profiles u ON u.id = l.user_id
         WHERE l.is_public = 1
         ORDER BY l.created_at DESC, l.id DESC
         LIMIT ?1",
    )?;

    let lists = stmt
        .query_map(params![limit], |row| {
            Ok(CustomListWithOwner {
                list: list_from_row(row, 0)?,
                user: ProfileSummary {
                    username: row.get(7)?,
                    display_name: row.get(8)?,
                    avatar_url: row.get(9)?,
                },
                movie_count: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lists)
}

/// Owner-scoped patch; a non-owner's update matches zero rows.
pub fn update_custom_list(
    pool: &DbPool,
    list_id: &str,
    user_id: &str,
    updates: &CustomListUpdate,
) -> StoreResult<CustomList> {
    let conn = pool.get()?;

    let rows = conn.execute(
        "UPDATE custom_lists SET
            name = COALESCE(?3, name),
            description = COALESCE(?4, description),
            is_public = COALESCE(?5, is_public),
            updated_at = datetime('now')
         WHERE id = ?1 AND user_id = ?2",
        params![
            list_id,
            user_id,
            updates.name,
            updates.description,
            updates.is_public
        ],
    )?;
    if rows == 0 {
        return Err(StoreError::NotFound);
    }

    fetch_list(&conn, list_id)
}

/// Owner-scoped delete; membership rows go with the list (cascade).
pub fn delete_custom_list(pool: &DbPool, list_id: &str, user_id: &str) -> StoreResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM custom_lists WHERE id = ?1 AND user_id = ?2",
        params![list_id, user_id],
    )?;
    Ok(rows > 0)
}

/// Adds a movie to a list the caller owns. A list the caller does not own
/// is treated as absent. Duplicate membership surfaces `UniqueViolation`.
pub fn add_movie_to_custom_list(
    pool: &DbPool,
    list_id: &str,
    movie_id: &str,
    user_id: &str,
) -> StoreResult<CustomListMovie> {
    let conn = pool.get()?;

    conn.query_row(
        "SELECT 1 FROM custom_lists WHERE id = ?1 AND user_id = ?2",
        params![list_id, user_id],
        |row| row.get::<_, i64>(0),
    )?;

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO custom_list_movies (id, list_id, movie_id) VALUES (?1, ?2, ?3)",
        params![id, list_id, movie_id],
    )?;

    let entry = conn.query_row(
        "SELECT id, list_id, movie_id, added_at FROM custom_list_movies WHERE id = ?1",
        params![id],
        |row| {
            Ok(CustomListMovie {
                id: row.get(0)?,
                list_id: row.get(1)?,
                movie_id: row.get(2)?,
                added_at: row.get(3)?,
            })
        },
    )?;
    Ok(entry)
}

/// Removes a membership row from a list the caller owns. Returns whether
/// one existed.
pub fn remove_movie_from_custom_list(
    pool: &DbPool,
    list_id: &str,
    movie_id: &str,
    user_id: &str,
) -> StoreResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM custom_list_movies
         WHERE list_id = ?1 AND movie_id = ?2
           AND EXISTS (SELECT 1 FROM custom_lists WHERE id = ?1 AND user_id = ?3)",
        params![list_id, movie_id, user_id],
    )?;
    Ok(rows > 0)
}

fn fetch_list(conn: &Connection, list_id: &str) -> StoreResult<CustomList> {
    let list = conn.query_row(
        "SELECT id, user_id, name, description, is_public, created_at, updated_at
         FROM custom_lists WHERE id = ?1",
        params![list_id],
        |row| list_from_row(row, 0),
    )?;
    Ok(list)
}

fn list_from_row(row: &Row, start: usize) -> rusqlite::Result<CustomList> {
    Ok(CustomList {
        id: row.get(start)?,
        user_id: row.get(start + 1)?,
        name: row.get(start + 2)?,
        description: row.get(start + 3)?,
        is_public: row.get(start + 4)?,
        created_at: row.get(start + 5)?,
        updated_at: row.get(start + 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::{seed_movie, seed_user, test_pool};

    fn draft(name: &str, public: bool) -> CustomListDraft {
        CustomListDraft {
            name: name.to_string(),
            description: None,
            is_public: public,
        }
    }

    #[test]
    fn create_then_get_with_movies_and_counts() {
        let pool = test_pool();
        let user = seed_user(&pool, "alice");
        let m1 = seed_movie(&pool, "tt1", "Heat");
        let m2 = seed_movie(&pool, "tt2", "Ronin");

        let list = create_custom_list(&pool, &user, &draft("Crime", true)).unwrap();
        add_movie_to_custom_list(&pool, &list.id, &m1, &user).unwrap();
        add_movie_to_custom_list(&pool, &list.id, &m2, &user).unwrap();

        let full = get_custom_list(&pool, &list.id, None).unwrap();
        assert_eq!(full.movies.len(), 2);
        assert!(full.movies.iter().all(|e| !e.added_at.is_empty()));

        let lists = get_user_custom_lists(&pool, &user).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].movie_count, 2);
    }

    #[test]
    fn private_list_is_visible_to_owner_only() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice");
        let bob = seed_user(&pool, "bob");

        let list = create_custom_list(&pool, &alice, &draft("Secret", false)).unwrap();

        assert!(get_custom_list(&pool, &list.id, Some(&alice)).is_ok());
        assert!(get_custom_list(&pool, &list.id, Some(&bob))
            .unwrap_err()
            .is_not_found());
        assert!(get_custom_list(&pool, &list.id, None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn public_browse_joins_owner_and_respects_limit() {
        let pool = test_pool();
        let user = seed_user(&pool, "alice");

        for i in 0..4 {
            create_custom_list(&pool, &user, &draft(&format!("List {}", i), true)).unwrap();
        }
        create_custom_list(&pool, &user, &draft("Hidden", false)).unwrap();

        let lists = get_public_custom_lists(&pool, 3).unwrap();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].list.name, "List 3");
        assert_eq!(lists[0].user.username, "alice");
        assert!(lists.iter().all(|l| l.list.is_public));
    }

    #[test]
    fn update_patches_only_submitted_fields() {
        let pool = test_pool();
        let user = seed_user(&pool, "alice");
        let list = create_custom_list(&pool, &user, &draft("Crime", false)).unwrap();

        let updated = update_custom_list(
            &pool,
            &list.id,
            &user,
            &CustomListUpdate {
                is_public: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(updated.is_public);
        assert_eq!(updated.name, "Crime");
        assert!(updated.description.is_none());
    }

    #[test]
    fn delete_cascades_to_membership_rows() {
        let pool = test_pool();
        let user = seed_user(&pool, "alice");
        let movie = seed_movie(&pool, "tt1", "Heat");
        let list = create_custom_list(&pool, &user, &draft("Crime", true)).unwrap();
        add_movie_to_custom_list(&pool, &list.id, &movie, &user).unwrap();

        assert!(delete_custom_list(&pool, &list.id, &user).unwrap());

        assert!(get_custom_list(&pool, &list.id, Some(&user))
            .unwrap_err()
            .is_not_found());
        let conn = pool.get().unwrap();
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM custom_list_movies", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn membership_writes_are_owner_scoped() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice");
        let bob = seed_user(&pool, "bob");
        let movie = seed_movie(&pool, "tt1", "Heat");
        let list = create_custom_list(&pool, &alice, &draft("Crime", true)).unwrap();

        let err = add_movie_to_custom_list(&pool, &list.id, &movie, &bob).unwrap_err();
        assert!(err.is_not_found());

        add_movie_to_custom_list(&pool, &list.id, &movie, &alice).unwrap();
        assert!(!remove_movie_from_custom_list(&pool, &list.id, &movie, &bob).unwrap());
        assert!(remove_movie_from_custom_list(&pool, &list.id, &movie, &alice).unwrap());
    }

    #[test]
    fn duplicate_membership_is_unique_violation() {
        let pool = test_pool();
        let user = seed_user(&pool, "alice");
        let movie = seed_movie(&pool, "tt1", "Heat");
        let list = create_custom_list(&pool, &user, &draft("Crime", true)).unwrap();

        add_movie_to_custom_list(&pool, &list.id, &movie, &user).unwrap();
        let err = add_movie_to_custom_list(&pool, &list.id, &movie, &user).unwrap_err();
        assert!(err.is_unique_violation());
    }
}
