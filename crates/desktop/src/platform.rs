use std::process::Command;

/// Whether the desktop prefers a dark appearance. Unknown setups read as dark.
pub fn is_dark_mode() -> bool {
    query_appearance().unwrap_or(true)
}

#[cfg(target_os = "macos")]
fn query_appearance() -> Option<bool> {
    // The key only exists while dark mode is on.
    let output = Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    Some(String::from_utf8_lossy(&output.stdout).trim().eq_ignore_ascii_case("dark"))
}

#[cfg(target_os = "windows")]
fn query_appearance() -> Option<bool> {
    let output = Command::new("reg")
        .args([
            "query",
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
            "/v",
            "AppsUseLightTheme",
        ])
        .output()
        .ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.contains("0x0") {
        Some(true)
    } else if stdout.contains("0x1") {
        Some(false)
    } else {
        None
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn query_appearance() -> Option<bool> {
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .ok()?;
    parse_color_scheme(&String::from_utf8_lossy(&output.stdout))
}

/// Parses GNOME's `color-scheme` value, e.g. `'prefer-dark'`.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn parse_color_scheme(value: &str) -> Option<bool> {
    match value.trim().trim_matches('\'') {
        "prefer-dark" => Some(true),
        "prefer-light" | "default" => Some(false),
        _ => None,
    }
}
