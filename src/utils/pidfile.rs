//! Pidfile handling for the supervisor.

use std::path::Path;

use crate::error_handling::InitializationError;

/// Writes the current process id to `path`, replacing any previous content.
pub fn create_pidfile(path: &Path) -> Result<(), InitializationError> {
    std::fs::write(path, std::process::id().to_string())?;
    log::debug!("Wrote pid {} to {}", std::process::id(), path.display());
    Ok(())
}
