use crate::models::Role;

/// Role a portal path is reserved for.
pub fn required_role(path: &str) -> Option<Role> {
    if is_under(path, "/admin") {
        Some(Role::Admin)
    } else if is_under(path, "/employee") {
        Some(Role::Employee)
    } else {
        None
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_prefixes() {
        assert_eq!(required_role("/admin"), Some(Role::Admin));
        assert_eq!(required_role("/admin/tickets/4"), Some(Role::Admin));
        assert_eq!(required_role("/employee"), Some(Role::Employee));
        assert_eq!(required_role("/employee/job-cards"), Some(Role::Employee));
    }

    #[test]
    fn test_public_paths() {
        assert_eq!(required_role("/"), None);
        assert_eq!(required_role("/login"), None);
        assert_eq!(required_role("/health"), None);
        assert_eq!(required_role("/administrator"), None);
        assert_eq!(required_role("/employees"), None);
    }
}
