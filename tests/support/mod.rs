#![allow(dead_code)]

pub mod fakes;

use std::fs;
use std::path::{Path, PathBuf};

pub fn get_conductor_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_conductor"))
}

/// Writes `conductor.toml` plus `projects.json` into `dir`
pub fn write_config(dir: &Path, collection_url: &str, phases: &str, projects: &str) -> PathBuf {
    let settings = format!(
        r#"[general]
sleep = 1

[es_collection]
url = "{collection_url}"

[es_enrichment]
url = "{collection_url}"

[projects]
database = "projects_db"
projects_file = "projects.json"

[sortinghat]
database = "sh_db"

[phases]
{phases}

[backends.git]
raw_index = "git_raw"
enriched_index = "git"

[backends.github]
raw_index = "github_raw"
enriched_index = "github"
token = "test-token"
"#
    );

    let path = dir.join("conductor.toml");
    fs::write(&path, settings).expect("Failed to write settings");
    fs::write(dir.join("projects.json"), projects).expect("Failed to write projects");
    path
}
