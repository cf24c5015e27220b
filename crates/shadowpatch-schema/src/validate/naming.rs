use crate::{
    MAX_MEMBER_NAME_LEN, MAX_TYPE_PATH_LEN,
    node::{LIST_PATH, MAP_PATH, NULLABLE_PATH},
    types::Primitive,
};

/// Ensure an identifier is non-empty and free of whitespace.
pub(crate) fn validate_ident(ident: &str) -> Result<(), String> {
    if ident.is_empty() {
        return Err("ident is empty".to_string());
    }
    if ident.chars().any(char::is_whitespace) {
        return Err(format!("ident '{ident}' contains whitespace"));
    }

    Ok(())
}

/// Ensure member names are valid idents within the maximum length.
pub(crate) fn validate_member_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("member name is empty".to_string());
    }
    if name.len() > MAX_MEMBER_NAME_LEN {
        return Err(format!(
            "member name '{name}' exceeds max length {MAX_MEMBER_NAME_LEN}"
        ));
    }

    validate_ident(name)
}

/// Type paths must be ASCII, bounded, and must not shadow a builtin.
pub(crate) fn validate_type_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("type path is empty".to_string());
    }
    if path.len() > MAX_TYPE_PATH_LEN {
        return Err(format!(
            "type path '{path}' exceeds max length {MAX_TYPE_PATH_LEN}"
        ));
    }
    if !path.is_ascii() {
        return Err(format!("type path '{path}' must be ASCII"));
    }
    if is_builtin(path) {
        return Err(format!("type path '{path}' is reserved for a builtin"));
    }

    validate_ident(path)
}

fn is_builtin(path: &str) -> bool {
    matches!(path, LIST_PATH | MAP_PATH | NULLABLE_PATH) || Primitive::from_path(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_builtin_and_empty_paths() {
        assert!(validate_type_path("").is_err());
        assert!(validate_type_path("Text").is_err());
        assert!(validate_type_path("List").is_err());
        assert!(validate_type_path("app::Person").is_ok());
    }

    #[test]
    fn member_name_length_is_bounded() {
        let long = "x".repeat(MAX_MEMBER_NAME_LEN + 1);

        assert!(validate_member_name(&long).is_err());
        assert!(validate_member_name("ok").is_ok());
        assert!(validate_member_name("has space").is_err());
    }
}
