//! Path helpers working on `/`-separated relative paths.

use std::path::{Component, Path, PathBuf};

/// Render a path with forward slashes.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexically normalize a `/`-separated path, folding `.` and `..` segments.
///
/// Leading `..` segments that climb above the start are kept.
pub fn normalize_slash_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Directory part of a `/`-separated path; empty for top-level entries.
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Join two `/`-separated paths, where an empty `dir` means the root.
pub fn join_slash(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        normalize_slash_path(rest)
    } else {
        normalize_slash_path(&format!("{dir}/{rest}"))
    }
}

/// Relative `/`-separated path from directory `from_dir` to `to`.
///
/// Both inputs are root-relative `/`-separated paths.
pub fn relative_slash_path(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|p| !p.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|p| !p.is_empty()).collect();
    let common = from
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = vec![".."; from.len() - common];
    out.extend(&to_parts[common..]);
    out.join("/")
}

/// Relative path from directory `from_dir` to `to`, both absolute.
///
/// Returns `None` when the two paths share no root (e.g. different drives).
pub fn relative_fs_path(from_dir: &Path, to: &Path) -> Option<PathBuf> {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();
    if from.first() != to_parts.first() {
        return None;
    }
    let common = from
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for part in &to_parts[common..] {
        out.push(part.as_os_str());
    }
    Some(out)
}

/// Turn a relative path into an ES module specifier (`./x` or `../x`).
pub fn module_specifier(relative: &str) -> String {
    if relative.starts_with("../") || relative == ".." {
        relative.to_string()
    } else {
        format!("./{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slash_path() {
        assert_eq!(normalize_slash_path("a/./b/../c"), "a/c");
        assert_eq!(normalize_slash_path("./x"), "x");
        assert_eq!(normalize_slash_path("../x/y"), "../x/y");
        assert_eq!(normalize_slash_path("a/../../b"), "../b");
        assert_eq!(normalize_slash_path("a//b/"), "a/b");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("a/b/c.ts"), "a/b");
        assert_eq!(parent_dir("c.ts"), "");
    }

    #[test]
    fn test_join_slash() {
        assert_eq!(join_slash("", "./a"), "a");
        assert_eq!(join_slash("src/x", "../y/z"), "src/y/z");
    }

    #[test]
    fn test_relative_slash_path() {
        assert_eq!(relative_slash_path("a/b", "a/c/d"), "../c/d");
        assert_eq!(relative_slash_path("a", "a/c"), "c");
        assert_eq!(relative_slash_path("", "x/y"), "x/y");
        assert_eq!(relative_slash_path("a/b", "c"), "../../c");
    }

    #[test]
    fn test_relative_fs_path() {
        let rel = relative_fs_path(Path::new("/p/out/sdk"), Path::new("/p/src/central.ts"));
        assert_eq!(rel, Some(PathBuf::from("../../src/central.ts")));
    }

    #[test]
    fn test_module_specifier() {
        assert_eq!(module_specifier("a/b"), "./a/b");
        assert_eq!(module_specifier("../a"), "../a");
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b/c.ts")), "a/b/c.ts");
        assert_eq!(to_slash(Path::new("./a/b")), "a/b");
    }
}
