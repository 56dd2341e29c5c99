//! Small path helpers shared by the backend and client crates.

/// Returns the extension of the final path segment, without the dot.
///
/// Dotfiles and extensionless names yield an empty string.
///
/// # Examples
///
/// ```
/// use folio_types::file_extension;
///
/// assert_eq!(file_extension("posts/2024/hello.md"), "md");
/// assert_eq!(file_extension("Makefile"), "");
/// ```
pub fn file_extension(name: &str) -> &str {
    let segment = name.rsplit('/').next().unwrap_or(name);
    match segment.rsplit_once('.') {
        Some(("", _)) => "",
        Some((_, ext)) => ext,
        None => "",
    }
}

/// Strips any leading slashes from a repository path.
///
/// Commit actions and raw URLs require paths relative to the repository
/// root.
pub fn trim_leading_slash(path: &str) -> &str {
    path.trim_start_matches('/')
}
