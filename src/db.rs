use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

/// Fixed five-value classification for problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Category {
    Education,
    Technology,
    Environment,
    SocialImpact,
    Startups,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Education,
        Category::Technology,
        Category::Environment,
        Category::SocialImpact,
        Category::Startups,
    ];

    pub fn as_str(&self) -> &'static str {
        use Category::*;
        match self {
            Education => "education",
            Technology => "technology",
            Environment => "environment",
            SocialImpact => "social_impact",
            Startups => "startups",
        }
    }

    pub fn label(&self) -> &'static str {
        use Category::*;
        match self {
            Education => "Education",
            Technology => "Technology",
            Environment => "Environment",
            SocialImpact => "Social Impact",
            Startups => "Startups",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Problem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub upvotes_count: i64,
    pub solutions_count: i64,
    pub created_at: i64,
    /// Owner's display name via LEFT JOIN; None when the profile is gone.
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Solution {
    pub id: Uuid,
    pub problem_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub upvotes_count: i64,
    pub created_at: i64,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Upvote {
    pub user_id: Uuid,
    pub solution_id: Uuid,
}

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Bootstrap the schema. The counter columns are maintained by triggers; an
/// upvote bumps both its solution and that solution's parent problem, and the
/// application never recomputes them. The one-upvote-per-user rule is
/// enforced only by the UNIQUE constraint.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS problems (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            upvotes_count INTEGER NOT NULL DEFAULT 0,
            solutions_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS solutions (
            id TEXT PRIMARY KEY,
            problem_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            content TEXT NOT NULL,
            upvotes_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS upvotes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            solution_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE (user_id, solution_id)
        );

        CREATE TRIGGER IF NOT EXISTS solutions_count_up
        AFTER INSERT ON solutions BEGIN
            UPDATE problems SET solutions_count = solutions_count + 1
            WHERE id = NEW.problem_id;
        END;

        CREATE TRIGGER IF NOT EXISTS upvotes_count_up
        AFTER INSERT ON upvotes BEGIN
            UPDATE solutions SET upvotes_count = upvotes_count + 1
            WHERE id = NEW.solution_id;
            UPDATE problems SET upvotes_count = upvotes_count + 1
            WHERE id = (SELECT problem_id FROM solutions WHERE id = NEW.solution_id);
        END;

        CREATE TRIGGER IF NOT EXISTS upvotes_count_down
        AFTER DELETE ON upvotes BEGIN
            UPDATE solutions SET upvotes_count = upvotes_count - 1
            WHERE id = OLD.solution_id;
            UPDATE problems SET upvotes_count = upvotes_count - 1
            WHERE id = (SELECT problem_id FROM solutions WHERE id = OLD.solution_id);
        END;
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    ensure_schema(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("cooking"), None);
    }
}
