//! Opening the rendered chart in the platform's image viewer

use std::env;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Returns true if a graphical session is likely available
///
/// macOS and Windows always have one; elsewhere an X11 or Wayland display must be set.
pub fn display_available() -> bool {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }

    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|name| env::var_os(name).is_some_and(|value| !value.is_empty()))
}

/// Builds the command that opens `path` with the default viewer
fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(path);
        command
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}

/// Launches the viewer without waiting for it to close
pub fn show_image(path: &Path) -> io::Result<()> {
    viewer_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
