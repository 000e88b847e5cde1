//! Front-end bundle served from disk.

use std::path::Path;

use tower_http::services::ServeDir;
use tracing::info;

/// Static file service for `dir`, or `None` if the directory doesn't exist.
/// Directory requests resolve to their `index.html`.
pub fn static_files(dir: &Path) -> Option<ServeDir> {
    if !dir.is_dir() {
        info!(
            path = %dir.display(),
            "No front-end build directory found, serving the API only"
        );
        return None;
    }

    info!(path = %dir.display(), "Serving front-end build");
    Some(ServeDir::new(dir).append_index_html_on_directories(true))
}
