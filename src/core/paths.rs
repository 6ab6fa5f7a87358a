//! core::paths
//!
//! Platform-independent path normalization.
//!
//! All filtering and cache keying operates on posix-style forward-slash
//! strings so that the persisted cache is identical across platforms.
//! Normalization is purely lexical: `.` and `..` segments are resolved
//! against the string, never against the filesystem.
//!
//! # Example
//!
//! ```
//! use stampwork::core::paths::posix_normalize;
//!
//! assert_eq!(posix_normalize(r"dir\sub\file.txt"), "dir/sub/file.txt");
//! assert_eq!(posix_normalize("dir/./sub/../file.txt"), "dir/file.txt");
//! ```

use std::path::Path;

/// Normalize a path to its forward-slash form.
///
/// Backslashes become forward slashes, duplicate separators collapse, and
/// `.`/`..` segments are resolved lexically. Leading `..` segments of a
/// relative path are preserved.
pub fn posix_normalize(path: impl AsRef<Path>) -> String {
    let raw = path.as_ref().to_string_lossy().replace('\\', "/");
    let absolute = raw.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // A ".." can only cancel a real segment; at the head of a
                // relative path it must be kept.
                match parts.last() {
                    Some(&"..") | None if !absolute => parts.push(".."),
                    Some(_) => {
                        parts.pop();
                    }
                    None => {}
                }
            }
            segment => parts.push(segment),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Check whether a path string is relative.
pub fn is_relative(path: &str) -> bool {
    !Path::new(path).is_absolute()
}

/// Join a (possibly relative) path onto a root and normalize the result.
///
/// Absolute inputs are normalized as-is.
pub fn resolve_against(root: &str, path: &str) -> String {
    if is_relative(path) {
        posix_normalize(format!("{}/{}", root, path))
    } else {
        posix_normalize(path)
    }
}

/// Strip the project-root-with-trailing-slash prefix from a normalized
/// full path, yielding the cache key. Paths outside the root are returned
/// unchanged.
pub fn relative_to_root(full_path: &str, root_trailing_slash: &str) -> String {
    full_path
        .strip_prefix(root_trailing_slash)
        .unwrap_or(full_path)
        .to_string()
}

/// The final path segment of a normalized path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
