//! Typed reads and mutations against the database. Rows are mapped to the
//! concrete records in [`crate::db`] here; nothing above this layer sees raw
//! rows. Counter columns come straight from the store and are never
//! recomputed locally.

use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    db::{Category, Problem, Profile, Solution, Upvote},
    AppResult,
};

const PROBLEM_COLUMNS: &str = "p.id, p.user_id, p.title, p.description, p.category, \
     p.upvotes_count, p.solutions_count, p.created_at, pr.display_name AS author_name";

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Problems, newest first, optionally restricted to one category.
pub async fn list_problems(
    pool: &SqlitePool,
    category: Option<Category>,
) -> AppResult<Vec<Problem>> {
    let problems = match category {
        Some(category) => {
            sqlx::query_as::<_, Problem>(&format!(
                "SELECT {PROBLEM_COLUMNS} FROM problems p \
                 LEFT JOIN profiles pr ON pr.id = p.user_id \
                 WHERE p.category = ? ORDER BY p.created_at DESC"
            ))
            .bind(category)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Problem>(&format!(
                "SELECT {PROBLEM_COLUMNS} FROM problems p \
                 LEFT JOIN profiles pr ON pr.id = p.user_id \
                 ORDER BY p.created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(problems)
}

/// The most upvoted problems, for the home page.
pub async fn featured_problems(pool: &SqlitePool, limit: i64) -> AppResult<Vec<Problem>> {
    Ok(sqlx::query_as::<_, Problem>(&format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems p \
         LEFT JOIN profiles pr ON pr.id = p.user_id \
         ORDER BY p.upvotes_count DESC, p.created_at DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn get_problem(pool: &SqlitePool, id: Uuid) -> AppResult<Option<Problem>> {
    Ok(sqlx::query_as::<_, Problem>(&format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems p \
         LEFT JOIN profiles pr ON pr.id = p.user_id \
         WHERE p.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

/// Solutions for a problem, most upvoted first. Ties break on creation time
/// ascending so the ordering stays deterministic.
pub async fn list_solutions(pool: &SqlitePool, problem_id: Uuid) -> AppResult<Vec<Solution>> {
    Ok(sqlx::query_as::<_, Solution>(
        "SELECT s.id, s.problem_id, s.user_id, s.content, s.upvotes_count, s.created_at, \
                pr.display_name AS author_name \
         FROM solutions s \
         LEFT JOIN profiles pr ON pr.id = s.user_id \
         WHERE s.problem_id = ? \
         ORDER BY s.upvotes_count DESC, s.created_at ASC",
    )
    .bind(problem_id)
    .fetch_all(pool)
    .await?)
}

/// The parent problem of a solution, for redirects and cache invalidation.
pub async fn solution_problem_id(
    pool: &SqlitePool,
    solution_id: Uuid,
) -> AppResult<Option<Uuid>> {
    Ok(sqlx::query_scalar::<_, Uuid>(
        "SELECT problem_id FROM solutions WHERE id = ?",
    )
    .bind(solution_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn user_upvotes(pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<Upvote>> {
    Ok(sqlx::query_as::<_, Upvote>(
        "SELECT user_id, solution_id FROM upvotes WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn insert_problem(
    pool: &SqlitePool,
    user_id: Uuid,
    title: &str,
    description: &str,
    category: Category,
) -> AppResult<Uuid> {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO problems (id, user_id, title, description, category, created_at) \
         VALUES (?,?,?,?,?,?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(category)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_solution(
    pool: &SqlitePool,
    problem_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> AppResult<Uuid> {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO solutions (id, problem_id, user_id, content, created_at) \
         VALUES (?,?,?,?,?)",
    )
    .bind(id)
    .bind(problem_id)
    .bind(user_id)
    .bind(content)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(id)
}

/// Insert when the caller observed no upvote, delete when it observed one.
/// Returns the new state. Not idempotent under concurrent toggles from two
/// sessions; the UNIQUE(user_id, solution_id) constraint is the backstop.
pub async fn toggle_upvote(
    pool: &SqlitePool,
    user_id: Uuid,
    solution_id: Uuid,
    has_upvoted: bool,
) -> AppResult<bool> {
    if has_upvoted {
        sqlx::query("DELETE FROM upvotes WHERE user_id = ? AND solution_id = ?")
            .bind(user_id)
            .bind(solution_id)
            .execute(pool)
            .await?;
        Ok(false)
    } else {
        sqlx::query(
            "INSERT INTO upvotes (id, user_id, solution_id, created_at) VALUES (?,?,?,?)",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(solution_id)
        .bind(now())
        .execute(pool)
        .await?;
        Ok(true)
    }
}

pub async fn create_profile(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    display_name: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO profiles (id, email, password_hash, display_name, created_at) \
         VALUES (?,?,?,?,?)",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn profile_by_email(
    pool: &SqlitePool,
    email: &str,
) -> AppResult<Option<(Uuid, String)>> {
    Ok(sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, password_hash FROM profiles WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?)
}

pub async fn get_profile(pool: &SqlitePool, id: Uuid) -> AppResult<Option<Profile>> {
    Ok(sqlx::query_as::<_, Profile>(
        "SELECT id, email, display_name FROM profiles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::db::test_pool;

    async fn signed_up(pool: &SqlitePool, email: &str) -> Uuid {
        create_profile(pool, email, "hash", Some("Test User"))
            .await
            .unwrap()
    }

    fn long(n: usize) -> String {
        "x".repeat(n)
    }

    #[tokio::test]
    async fn problems_come_back_newest_first_and_filtered() {
        let pool = test_pool().await;
        let user = signed_up(&pool, "a@example.com").await;

        let tech = insert_problem(&pool, user, &long(20), &long(60), Category::Technology)
            .await
            .unwrap();
        let edu = insert_problem(&pool, user, &long(20), &long(60), Category::Education)
            .await
            .unwrap();
        // Force distinct timestamps.
        sqlx::query("UPDATE problems SET created_at = created_at + 10 WHERE id = ?")
            .bind(edu)
            .execute(&pool)
            .await
            .unwrap();

        let all = list_problems(&pool, None).await.unwrap();
        assert_eq!(
            all.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![edu, tech]
        );

        let only_tech = list_problems(&pool, Some(Category::Technology)).await.unwrap();
        assert_eq!(only_tech.len(), 1);
        assert_eq!(only_tech[0].id, tech);
        assert_eq!(only_tech[0].author_name.as_deref(), Some("Test User"));
    }

    #[tokio::test]
    async fn unfiltered_list_is_union_of_categories_without_duplicates() {
        let pool = test_pool().await;
        let user = signed_up(&pool, "a@example.com").await;
        for c in Category::ALL {
            insert_problem(&pool, user, &long(20), &long(60), c).await.unwrap();
        }

        let all = list_problems(&pool, None).await.unwrap();
        let mut union = Vec::new();
        for c in Category::ALL {
            union.extend(list_problems(&pool, Some(c)).await.unwrap());
        }
        let all_ids: HashSet<_> = all.iter().map(|p| p.id).collect();
        let union_ids: HashSet<_> = union.iter().map(|p| p.id).collect();
        assert_eq!(all_ids.len(), all.len());
        assert_eq!(all_ids, union_ids);
    }

    #[tokio::test]
    async fn missing_owner_yields_null_author_not_error() {
        let pool = test_pool().await;
        let ghost = Uuid::now_v7();
        let id = insert_problem(&pool, ghost, &long(20), &long(60), Category::Startups)
            .await
            .unwrap();
        let problem = get_problem(&pool, id).await.unwrap().unwrap();
        assert_eq!(problem.author_name, None);
    }

    #[tokio::test]
    async fn solutions_order_by_upvotes_then_creation() {
        let pool = test_pool().await;
        let author = signed_up(&pool, "a@example.com").await;
        let voter = signed_up(&pool, "b@example.com").await;
        let problem = insert_problem(&pool, author, &long(20), &long(60), Category::Education)
            .await
            .unwrap();

        let first = insert_solution(&pool, problem, author, "first idea").await.unwrap();
        let second = insert_solution(&pool, problem, author, "second idea").await.unwrap();
        sqlx::query("UPDATE solutions SET created_at = created_at + 10 WHERE id = ?")
            .bind(second)
            .execute(&pool)
            .await
            .unwrap();

        // Tied at zero upvotes: earlier solution wins.
        let solutions = list_solutions(&pool, problem).await.unwrap();
        assert_eq!(solutions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![first, second]);

        toggle_upvote(&pool, voter, second, false).await.unwrap();
        let solutions = list_solutions(&pool, problem).await.unwrap();
        assert_eq!(solutions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(solutions[0].upvotes_count, 1);
    }

    #[tokio::test]
    async fn submitted_solution_appears_exactly_once() {
        let pool = test_pool().await;
        let user = signed_up(&pool, "a@example.com").await;
        let problem = insert_problem(&pool, user, &long(20), &long(60), Category::Environment)
            .await
            .unwrap();

        let id = insert_solution(&pool, problem, user, "plant more trees").await.unwrap();
        let solutions = list_solutions(&pool, problem).await.unwrap();
        assert_eq!(solutions.iter().filter(|s| s.id == id).count(), 1);

        // The trigger maintains the counter.
        let problem = get_problem(&pool, problem).await.unwrap().unwrap();
        assert_eq!(problem.solutions_count, 1);
    }

    #[tokio::test]
    async fn problem_counter_tracks_solution_upvotes_and_drives_featured() {
        let pool = test_pool().await;
        let author = signed_up(&pool, "a@example.com").await;
        let voter = signed_up(&pool, "b@example.com").await;

        let popular = insert_problem(&pool, author, &long(20), &long(60), Category::Technology)
            .await
            .unwrap();
        let quiet = insert_problem(&pool, author, &long(20), &long(60), Category::Education)
            .await
            .unwrap();
        // The quiet problem is newer, so recency alone would rank it first.
        sqlx::query("UPDATE problems SET created_at = created_at + 10 WHERE id = ?")
            .bind(quiet)
            .execute(&pool)
            .await
            .unwrap();

        let solution = insert_solution(&pool, popular, author, "an idea").await.unwrap();
        toggle_upvote(&pool, author, solution, false).await.unwrap();
        toggle_upvote(&pool, voter, solution, false).await.unwrap();

        let problem = get_problem(&pool, popular).await.unwrap().unwrap();
        assert_eq!(problem.upvotes_count, 2);

        let featured = featured_problems(&pool, 2).await.unwrap();
        assert_eq!(
            featured.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![popular, quiet]
        );

        // Removing an upvote walks the counter back down.
        toggle_upvote(&pool, voter, solution, true).await.unwrap();
        let problem = get_problem(&pool, popular).await.unwrap().unwrap();
        assert_eq!(problem.upvotes_count, 1);
    }

    #[tokio::test]
    async fn solutions_resolve_their_parent_problem() {
        let pool = test_pool().await;
        let user = signed_up(&pool, "a@example.com").await;
        let problem = insert_problem(&pool, user, &long(20), &long(60), Category::Startups)
            .await
            .unwrap();
        let solution = insert_solution(&pool, problem, user, "an idea").await.unwrap();

        assert_eq!(
            solution_problem_id(&pool, solution).await.unwrap(),
            Some(problem)
        );
        assert_eq!(solution_problem_id(&pool, Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn double_toggle_restores_original_state() {
        let pool = test_pool().await;
        let user = signed_up(&pool, "a@example.com").await;
        let problem = insert_problem(&pool, user, &long(20), &long(60), Category::Technology)
            .await
            .unwrap();
        let solution = insert_solution(&pool, problem, user, "an idea").await.unwrap();

        assert!(toggle_upvote(&pool, user, solution, false).await.unwrap());
        assert!(!toggle_upvote(&pool, user, solution, true).await.unwrap());
        assert!(user_upvotes(&pool, user).await.unwrap().is_empty());

        let solutions = list_solutions(&pool, problem).await.unwrap();
        assert_eq!(solutions[0].upvotes_count, 0);
    }

    #[tokio::test]
    async fn has_upvoted_predicate_matches_upvote_rows() {
        let pool = test_pool().await;
        let author = signed_up(&pool, "a@example.com").await;
        let voter = signed_up(&pool, "b@example.com").await;
        let problem = insert_problem(&pool, author, &long(20), &long(60), Category::SocialImpact)
            .await
            .unwrap();

        let a = insert_solution(&pool, problem, author, "a").await.unwrap();
        let b = insert_solution(&pool, problem, author, "b").await.unwrap();
        let c = insert_solution(&pool, problem, author, "c").await.unwrap();

        toggle_upvote(&pool, voter, a, false).await.unwrap();
        toggle_upvote(&pool, voter, c, false).await.unwrap();

        let upvoted: HashSet<_> = user_upvotes(&pool, voter)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.solution_id)
            .collect();
        assert!(upvoted.contains(&a));
        assert!(!upvoted.contains(&b));
        assert!(upvoted.contains(&c));
    }

    #[tokio::test]
    async fn second_upvote_for_same_pair_is_rejected_by_the_store() {
        let pool = test_pool().await;
        let user = signed_up(&pool, "a@example.com").await;
        let problem = insert_problem(&pool, user, &long(20), &long(60), Category::Startups)
            .await
            .unwrap();
        let solution = insert_solution(&pool, problem, user, "an idea").await.unwrap();

        toggle_upvote(&pool, user, solution, false).await.unwrap();
        // A stale observation tries to insert again; uniqueness holds.
        assert!(toggle_upvote(&pool, user, solution, false).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let pool = test_pool().await;
        signed_up(&pool, "a@example.com").await;
        let err = create_profile(&pool, "a@example.com", "hash", None)
            .await
            .unwrap_err();
        assert!(err
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation()));
    }
}
