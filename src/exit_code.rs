use crate::error::CookieKitError;

pub fn exit_code_for_error(err: &CookieKitError) -> i32 {
    match err {
        CookieKitError::Config(_) => 2,
        CookieKitError::InvalidUrl(_) => 3,
        CookieKitError::Validation(_) => 4,
        CookieKitError::Parse(_) => 5,
        CookieKitError::Jar(_) => 6,
        CookieKitError::RemovedButNotRecreated { .. } => 7,
        CookieKitError::CookieNotFound(_) => 8,
        CookieKitError::Io(_) => 23,
        CookieKitError::Json(_) => 26,
        CookieKitError::PermissionDenied(_) | CookieKitError::FileNotFound(_) => 37,
    }
}
