use crate::FileOpsError;

/// Splits a client-supplied `/`-separated path into the segments to join
/// onto the output folder.
///
/// Empty and `.` segments are dropped. Rejected:
/// - paths naming no file (`""`, `"."`, `"./"`)
/// - a leading `/`
/// - any `..` segment
/// - segments carrying `\`, `:` or NUL, which could turn into a drive,
///   UNC or alternate-stream path on Windows
pub fn relative_segments(relative: &str) -> Result<Vec<&str>, FileOpsError> {
    if relative.starts_with('/') {
        return Err(FileOpsError::InvalidPath(format!(
            "absolute path not allowed: {relative}"
        )));
    }

    let mut segments = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(FileOpsError::InvalidPath(format!(
                    "parent directory traversal not allowed: {relative}"
                )));
            }
            s if s.contains(['\\', ':', '\0']) => {
                return Err(FileOpsError::InvalidPath(format!(
                    "unsupported character in segment {s:?}"
                )));
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(FileOpsError::InvalidPath("empty path".into()));
    }
    Ok(segments)
}
