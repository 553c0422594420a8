/*!
 * OS user/host identification for the MHL `<creatorinfo>` block.
 *
 * The original tool dispatches on platform: a password-database GECOS
 * lookup on Unix, `GetUserNameExW(NameDisplay)` on Windows. This crate
 * simplifies that to the environment variables every shell and service
 * manager already populates, which is sufficient for a manifest's
 * "who ran this" field and avoids pulling in an FFI-heavy user-database
 * dependency the rest of the stack has no other use for.
 */

pub fn username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Human display name. Falls back to the login name when no richer identity
/// is available in the environment.
pub fn display_name() -> String {
    std::env::var("OCOPY_DISPLAY_NAME").unwrap_or_else(|_| username())
}

pub fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string())
}
