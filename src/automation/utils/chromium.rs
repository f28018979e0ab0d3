//! Browser executable discovery.
//!
//! Used when no explicit browser path is configured: checks the common
//! install locations for the host platform and caches the first hit for the
//! life of the process.

use once_cell::sync::Lazy;
use std::path::PathBuf;

static DISCOVERED: Lazy<Option<PathBuf>> = Lazy::new(find_browser);

/// First browser executable found among the platform's common install
/// locations, if any.
pub fn discover() -> Option<PathBuf> {
    DISCOVERED.clone()
}

fn find_browser() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(unix)]
    {
        candidates.push(PathBuf::from("/usr/bin/chromium"));
        candidates.push(PathBuf::from("/usr/bin/chromium-browser"));
        candidates.push(PathBuf::from("/usr/bin/google-chrome"));
        candidates.push(PathBuf::from("/usr/bin/google-chrome-stable"));
        candidates.push(PathBuf::from("/opt/google/chrome/chrome"));

        #[cfg(target_os = "macos")]
        {
            candidates.push(PathBuf::from(
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            ));
            candidates.push(PathBuf::from(
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ));
            candidates.push(PathBuf::from(
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            ));
        }
    }

    #[cfg(windows)]
    {
        candidates.push(PathBuf::from(
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
        ));
        candidates.push(PathBuf::from(
            "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
        ));
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            candidates.push(PathBuf::from(format!(
                "{local}\\Google\\Chrome\\Application\\chrome.exe"
            )));
            candidates.push(PathBuf::from(format!(
                "{local}\\Chromium\\Application\\chrome.exe"
            )));
        }
        candidates.push(PathBuf::from(
            "C:\\Program Files\\Microsoft\\Edge\\Application\\msedge.exe",
        ));
    }

    let found = candidates.into_iter().find(|path| path.is_file());
    match &found {
        Some(path) => {
            tracing::debug!(target: "automation", "Found browser executable at {}", path.display())
        }
        None => tracing::debug!(
            target: "automation",
            "No browser executable found at common locations; relying on the WebDriver default"
        ),
    }
    found
}
