use crate::database::{self, Database};

pub(crate) async fn test_database() -> Database {
    database::connect("sqlite::memory:").await.expect("db setup")
}
