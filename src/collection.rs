// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env::current_dir;
use std::path::PathBuf;

use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::settings::Settings;

/// The single local learner.
pub const LOCAL_USER: &str = "local";

/// A data directory: the database and the settings next to it.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub settings: Settings,
    pub user_id: String,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let db_path: PathBuf = directory.join("zapcards.db");
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;
        db.ensure_user(LOCAL_USER)?;

        let settings = Settings::load(&directory)?;
        log::debug!("Loaded settings: {settings:?}");

        Ok(Self {
            directory,
            db,
            settings,
            user_id: LOCAL_USER.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: directory does not exist.".to_string())
        );
    }

    #[test]
    fn test_new_collection() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        assert!(coll.directory.join("zapcards.db").exists());
        assert_eq!(coll.db.xp(&coll.user_id)?, 0);
        assert_eq!(coll.settings, Settings::default());
        Ok(())
    }
}
