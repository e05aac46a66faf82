use chrono::{DateTime, Utc};
use git2::Repository;
use std::env;
use std::fs;
use std::path::Path;

const UNKNOWN: &str = "unknown";

fn get_git_info() -> Option<(String, String)> {
    let repo = Repository::open(".").ok()?;
    let head = repo.head().ok()?;
    let commit = head.peel_to_commit().ok()?;
    let dt = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)?;
    Some((
        dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        commit.id().to_string(),
    ))
}

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let (commit_date, sha) = get_git_info().unwrap_or_else(|| (UNKNOWN.into(), UNKNOWN.into()));

    fs::write(
        Path::new(&out_dir).join("version_info.rs"),
        format!(
            "pub const PKG_VERSION: &str = \"{}\";\n\
             pub const COMMIT_DATE: &str = \"{}\";\n\
             pub const GIT_SHA: &str = \"{}\";\n",
            env!("CARGO_PKG_VERSION"),
            commit_date,
            sha,
        ),
    )
    .unwrap();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
