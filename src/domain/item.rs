use crate::domain::category::CategoryId;

/// Error returned when item text is outside the supported alphabet or is
/// badly spaced.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidTextError {
    /// The text is empty.
    #[error("text is empty")]
    Empty,
    /// The text contains a character other than ASCII letters, space or '?'.
    #[error("unsupported character {0:?} in text")]
    Character(char),
    /// The text starts or ends with a space, or contains two in a row.
    #[error("text has leading, trailing or consecutive spaces")]
    Spacing,
}

/// Checks that `text` is non-empty, uses only ASCII letters, spaces and
/// question marks, and has no leading, trailing or doubled spaces.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_text(text: &str) -> Result<(), InvalidTextError> {
    if text.is_empty() {
        return Err(InvalidTextError::Empty);
    }
    if let Some(c) = text
        .chars()
        .find(|&c| !(c.is_ascii_alphabetic() || c == ' ' || c == '?'))
    {
        return Err(InvalidTextError::Character(c));
    }
    if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
        return Err(InvalidTextError::Spacing);
    }
    Ok(())
}

/// A text record resolved to its owning category.
///
/// Items exist only while the prefix index is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<'a> {
    /// The owning category.
    pub category: CategoryId,
    /// The item text.
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Why are many reptiles green?"; "sentence")]
    #[test_case("?"; "lone question mark")]
    #[test_case("a"; "single letter")]
    fn accepts_well_formed_text(text: &str) {
        assert_eq!(validate_text(text), Ok(()));
    }

    #[test_case("", InvalidTextError::Empty; "empty")]
    #[test_case("Is it 42?", InvalidTextError::Character('4'); "digit")]
    #[test_case("Why, though?", InvalidTextError::Character(','); "comma")]
    #[test_case(" Why", InvalidTextError::Spacing; "leading space")]
    #[test_case("Why ", InvalidTextError::Spacing; "trailing space")]
    #[test_case("Why  not", InvalidTextError::Spacing; "double space")]
    fn rejects_malformed_text(text: &str, expected: InvalidTextError) {
        assert_eq!(validate_text(text), Err(expected));
    }
}
