use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::catalog::defaults::{default_games, DEFAULT_GAMES};
use crate::database::Database;

/// A game listed in the catalog.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub game_url: String,
    pub thumbnail: Option<String>,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<NewGame> for Game {
    fn from(new_game: NewGame) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: new_game.title,
            description: new_game.description,
            category: new_game.category,
            game_url: new_game.game_url,
            thumbnail: new_game.thumbnail,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewGame {
    pub title: String,
    pub description: String,
    pub category: String,
    pub game_url: String,

    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Clone)]
pub struct Catalog {
    database: Database,
}

impl Catalog {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Categories in alphabetical order along with how many games each holds.
    pub async fn count_by_category(&self) -> Result<Vec<CategoryCount>, CatalogError> {
        let counts = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM games GROUP BY category ORDER BY category;",
        )
        .fetch_all(self.database.pool())
        .await?;

        Ok(counts)
    }

    /// Returns whether a game with that id existed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?;")
            .bind(id)
            .execute(self.database.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn insert(&self, new_game: NewGame) -> Result<Game, CatalogError> {
        let game = Game::from(new_game);

        insert_game(self.database.pool(), &game).await?;

        Ok(game)
    }

    /// Every game in insertion order, optionally limited to a single category.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Game>, CatalogError> {
        let query = match category {
            Some(category) => sqlx::query_as::<_, Game>(
                "SELECT id, title, description, category, game_url, thumbnail, created_at
                    FROM games WHERE category = ? ORDER BY rowid;",
            )
            .bind(category),
            None => sqlx::query_as::<_, Game>(
                "SELECT id, title, description, category, game_url, thumbnail, created_at
                    FROM games ORDER BY rowid;",
            ),
        };

        Ok(query.fetch_all(self.database.pool()).await?)
    }

    /// Drops everything in the catalog and replaces it with the stock set of games. Returns the
    /// number of games now present.
    pub async fn replace_with_defaults(&self) -> Result<usize, CatalogError> {
        let mut transaction = self.database.pool().begin().await?;

        sqlx::query("DELETE FROM games;")
            .execute(&mut *transaction)
            .await?;

        for new_game in default_games() {
            let game = Game::from(new_game);

            insert_game(&mut *transaction, &game).await?;
        }

        transaction.commit().await?;

        Ok(DEFAULT_GAMES.len())
    }
}

async fn insert_game<'e, E>(executor: E, game: &Game) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO games (id, title, description, category, game_url, thumbnail, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?);",
    )
    .bind(&game.id)
    .bind(&game.title)
    .bind(&game.description)
    .bind(&game.category)
    .bind(&game.game_url)
    .bind(&game.thumbnail)
    .bind(game.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog storage failed: {0}")]
    Storage(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::helpers::test_database;

    fn new_game(title: &str, category: &str) -> NewGame {
        NewGame {
            title: title.to_string(),
            description: format!("{title} description"),
            category: category.to_string(),
            game_url: format!("https://games.test/{}", title.to_lowercase()),
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_filter() {
        let catalog = Catalog::new(test_database().await);

        let chess = catalog.insert(new_game("Chess", "Strategy")).await.unwrap();
        catalog.insert(new_game("Tetris", "Puzzle")).await.unwrap();
        catalog.insert(new_game("Go", "Strategy")).await.unwrap();

        let all = catalog.list(None).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Chess", "Tetris", "Go"]);
        assert_eq!(all[0].id, chess.id);

        let strategy = catalog.list(Some("Strategy")).await.unwrap();
        assert_eq!(strategy.len(), 2);
        assert!(strategy.iter().all(|g| g.category == "Strategy"));

        assert!(catalog.list(Some("Racing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_anything_was_removed() {
        let catalog = Catalog::new(test_database().await);
        let game = catalog.insert(new_game("Chess", "Strategy")).await.unwrap();

        assert!(catalog.delete_by_id(&game.id).await.unwrap());
        assert!(!catalog.delete_by_id(&game.id).await.unwrap());
        assert!(catalog.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_are_counted_in_order() {
        let catalog = Catalog::new(test_database().await);
        catalog.insert(new_game("Tetris", "Puzzle")).await.unwrap();
        catalog.insert(new_game("Chess", "Strategy")).await.unwrap();
        catalog.insert(new_game("2048", "Puzzle")).await.unwrap();
        catalog.insert(new_game("Pac-Man", "Arcade")).await.unwrap();

        let counts = catalog.count_by_category().await.unwrap();

        assert_eq!(
            counts,
            vec![
                CategoryCount { category: "Arcade".into(), count: 1 },
                CategoryCount { category: "Puzzle".into(), count: 2 },
                CategoryCount { category: "Strategy".into(), count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_defaults_replace_existing_games() {
        let catalog = Catalog::new(test_database().await);
        catalog.insert(new_game("Custom", "Other")).await.unwrap();

        let count = catalog.replace_with_defaults().await.unwrap();
        assert_eq!(count, 6);

        let games = catalog.list(None).await.unwrap();
        assert_eq!(games.len(), 6);
        assert!(games.iter().all(|g| g.title != "Custom"));
        assert_eq!(games[0].title, "2048");

        // running it again doesn't duplicate anything
        catalog.replace_with_defaults().await.unwrap();
        assert_eq!(catalog.list(None).await.unwrap().len(), 6);
    }
}
