#[derive(Debug)]
pub struct VersionInfo {
    pub version: &'static str,
    pub build_date: &'static str,
    pub git_sha: &'static str,
}

mod version_info {
    include!(concat!(env!("OUT_DIR"), "/version_info.rs"));
}

pub fn get_version_info() -> VersionInfo {
    VersionInfo {
        version: version_info::PKG_VERSION,
        build_date: version_info::COMMIT_DATE,
        git_sha: version_info::GIT_SHA,
    }
}

pub fn format_version_info_json() -> String {
    let info = get_version_info();
    serde_json::json!({
        "tsbs-bench": {
            "version": info.version,
            "commit_date": info.build_date,
            "commit_sha": info.git_sha,
        }
    })
    .to_string()
}

pub fn format_version_info_human() -> String {
    let info = get_version_info();
    format!(
        "tsbs-bench:\n\
         - Version: {}\n\
         - Build Date: {}\n\
         - Git SHA: {}",
        info.version, info.build_date, info.git_sha,
    )
}
