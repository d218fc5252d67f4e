use std::path::PathBuf;

use crate::prelude::{eprintln, println, *};
use crate::storage::{parse_collection, ASSIGNMENTS_KEY, ROSTER_KEY};

#[derive(Debug, clap::Parser)]
#[command(name = "load")]
#[command(about = "Replace or show the stored assignment and roster collections")]
pub struct App {
    /// Collection to work on
    #[arg(value_enum)]
    collection: Collection,

    /// JSON array replacing the collection; without it the stored collection is printed
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    /// Teaching assignments (`chronos:horarios`)
    Assignments,
    /// Instructor roster (`chronos:profesores`)
    Roster,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Assignments => ASSIGNMENTS_KEY,
            Collection::Roster => ROSTER_KEY,
        }
    }
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let store = global.store();
    let key = app.collection.key();

    let Some(file) = app.file else {
        let values = store.values(key);
        if global.verbose {
            eprintln!("{} items under {key}", values.len());
        }
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    };

    let body = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| f!("Failed to read {}", file.display()))?;
    let items = parse_collection(&body)?;
    let count = store.replace(key, &items)?;
    println!("Stored {count} items under {key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_collection_argument() {
        let app = App::try_parse_from(["load", "roster", "people.json"]).unwrap();
        assert_eq!(app.collection, Collection::Roster);
        assert_eq!(app.file, Some(PathBuf::from("people.json")));
        assert_eq!(app.collection.key(), ROSTER_KEY);

        let app = App::try_parse_from(["load", "assignments"]).unwrap();
        assert!(app.file.is_none());
        assert!(App::try_parse_from(["load", "courses"]).is_err());
    }
}
