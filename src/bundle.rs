use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::process::OsType;

/// Bundle identifier of the application bundle at `path`.
///
/// Fails only when `path` itself can't be reached. A plain executable, a
/// directory without `Contents/Info.plist`, or an Info.plist without
/// `CFBundleIdentifier` all yield `Ok(None)`.
pub fn bundle_identifier(path: &Path) -> Result<Option<String>> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to locate bundle at {}", path.display()))?;
    if !metadata.is_dir() {
        return Ok(None);
    }

    let Some(info) = read_info_plist(path) else {
        return Ok(None);
    };
    Ok(info_string(&info, "CFBundleIdentifier"))
}

/// Executable type and creator codes of the bundle at `path`.
///
/// `Contents/PkgInfo` holds both as eight bytes; Info.plist's
/// `CFBundlePackageType`/`CFBundleSignature` are used when it is missing.
/// Unknown codes are all zero bytes.
pub fn type_and_creator(path: &Path) -> (OsType, OsType) {
    if let Ok(pkg_info) = fs::read(path.join("Contents").join("PkgInfo")) {
        if pkg_info.len() >= 8 {
            let file_type = OsType([pkg_info[0], pkg_info[1], pkg_info[2], pkg_info[3]]);
            let creator = OsType([pkg_info[4], pkg_info[5], pkg_info[6], pkg_info[7]]);
            return (file_type, creator);
        }
    }

    let Some(info) = read_info_plist(path) else {
        return (OsType::default(), OsType::default());
    };
    let code = |key: &str| {
        info_string(&info, key)
            .and_then(|value| OsType::from_str_bytes(&value))
            .unwrap_or_default()
    };
    (code("CFBundlePackageType"), code("CFBundleSignature"))
}

fn read_info_plist(bundle: &Path) -> Option<plist::Dictionary> {
    let info_path = bundle.join("Contents").join("Info.plist");
    if !info_path.is_file() {
        return None;
    }
    match plist::Value::from_file(&info_path) {
        Ok(plist::Value::Dictionary(info)) => Some(info),
        Ok(_) => None,
        Err(err) => {
            debug!(path = %info_path.display(), "unreadable Info.plist: {err}");
            None
        }
    }
}

fn info_string(info: &plist::Dictionary, key: &str) -> Option<String> {
    info.get(key)
        .and_then(|value| value.as_string())
        .map(str::to_string)
}
