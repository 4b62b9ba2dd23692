//! Unix-style path string helpers.
//!
//! Manifest entries and source map `sources` are forward-slash paths
//! regardless of host platform, so these helpers work on strings and always
//! emit `/` separators. All resolution is lexical; the filesystem is never
//! consulted.

/// Convert backslashes to forward slashes.
pub fn to_unix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lexically resolve `.` and `..` segments and collapse repeated separators.
///
/// A leading `/` is kept. Leading `..` segments of a relative path are kept,
/// while `..` above the root of an absolute path is dropped.
pub fn normalize(path: &str) -> String {
    let unix = to_unix(path);
    let absolute = unix.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in unix.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join `name` onto `dir` and normalize the result.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        return normalize(name);
    }
    normalize(&format!("{dir}/{name}"))
}

/// Path of `to` relative to the directory `from`.
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_parts: Vec<&str> = from.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    let to_parts: Vec<&str> = to.split('/').filter(|p| !p.is_empty() && *p != ".").collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = vec![".."; from_parts.len() - common];
    out.extend_from_slice(&to_parts[common..]);
    out.join("/")
}

/// Extension without the dot, or `""` if the last dot belongs to a directory
/// name or there is none.
pub fn extension(path: &str) -> &str {
    let Some(dot) = path.rfind('.') else {
        return "";
    };
    match path.rfind(['/', '\\']) {
        Some(slash) if slash > dot => "",
        _ => &path[dot + 1..],
    }
}

/// Drop the first `/`-separated segment (`bin-debug/a/b.js` → `a/b.js`).
///
/// A path with a single segment is returned unchanged.
pub fn strip_first_segment(path: &str) -> &str {
    match path.split_once('/') {
        Some((_, rest)) => rest,
        None => path,
    }
}

/// Replace a trailing `.from` extension with `.to`. Paths without that
/// extension are returned unchanged.
pub fn replace_extension(path: &str, from: &str, to: &str) -> String {
    if extension(path) == from {
        let stem = &path[..path.len() - from.len()];
        format!("{stem}{to}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_separators() {
        assert_eq!(to_unix(r"bin-debug\a\b.js"), "bin-debug/a/b.js");
    }

    #[test]
    fn normalize_cases() {
        assert_eq!(normalize("a/./b/../c"), "a/c");
        assert_eq!(normalize("a//b/"), "a/b");
        assert_eq!(normalize("../a/../../b"), "../../b");
        assert_eq!(normalize("/a/../../b"), "/b");
        assert_eq!(normalize("a/.."), ".");
        assert_eq!(normalize(r"a\b\..\c"), "a/c");
    }

    #[test]
    fn join_and_relative() {
        assert_eq!(join("root", "dist/main.js"), "root/dist/main.js");
        assert_eq!(join("", "./a.js"), "a.js");
        assert_eq!(join("root/sub", "../x"), "root/x");
        assert_eq!(relative("dist", "src/a.ts"), "../src/a.ts");
        assert_eq!(relative("a/b", "a/b/c/d"), "c/d");
        assert_eq!(relative("a", "a"), "");
    }

    #[test]
    fn extension_cases() {
        assert_eq!(extension("a/b.js"), "js");
        assert_eq!(extension("a/b.js.map"), "map");
        assert_eq!(extension("a.dir/b"), "");
        assert_eq!(extension("noext"), "");
    }

    #[test]
    fn rename_helpers() {
        assert_eq!(strip_first_segment("bin-debug/a/b.js"), "a/b.js");
        assert_eq!(strip_first_segment("Main.js"), "Main.js");
        assert_eq!(replace_extension("a/b.js", "js", "ts"), "a/b.ts");
        assert_eq!(replace_extension("a/b.mjs", "js", "ts"), "a/b.mjs");
        assert_eq!(replace_extension("a.js/b", "js", "ts"), "a.js/b");
    }
}
