use derive_more::{AsRef, Display};

/// Free-form description attached to exercises and trainings.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    pub fn new(value: &str) -> Result<Self, DescriptionError> {
        let len = value.chars().count();

        if len > 1000 {
            return Err(DescriptionError::TooLong(len));
        }

        Ok(Description(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DescriptionError {
    #[error("Description cannot exceed 1000 characters ({0} > 1000)")]
    TooLong(usize),
}

/// Notes on exercise links and recorded sets.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct Notes(String);

impl Notes {
    pub fn new(value: &str) -> Result<Self, NotesError> {
        let len = value.chars().count();

        if len > 1000 {
            return Err(NotesError::TooLong(len));
        }

        Ok(Notes(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NotesError {
    #[error("Notes cannot exceed 1000 characters ({0} > 1000)")]
    TooLong(usize),
}

/// Notes on trainings and training sessions, which allow longer text.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct LongNotes(String);

impl LongNotes {
    pub fn new(value: &str) -> Result<Self, LongNotesError> {
        let len = value.chars().count();

        if len > 2000 {
            return Err(LongNotesError::TooLong(len));
        }

        Ok(LongNotes(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LongNotesError {
    #[error("Notes cannot exceed 2000 characters ({0} > 2000)")]
    TooLong(usize),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", Ok(Notes(String::new())))]
    #[case("Focus on form", Ok(Notes("Focus on form".to_string())))]
    #[case(&"a".repeat(1001), Err(NotesError::TooLong(1001)))]
    fn test_notes_new(#[case] value: &str, #[case] expected: Result<Notes, NotesError>) {
        assert_eq!(Notes::new(value), expected);
    }

    #[rstest]
    #[case(1000, true)]
    #[case(1001, false)]
    fn test_description_limit(#[case] len: usize, #[case] ok: bool) {
        assert_eq!(Description::new(&"a".repeat(len)).is_ok(), ok);
    }

    #[rstest]
    #[case(2000, true)]
    #[case(2001, false)]
    fn test_long_notes_limit(#[case] len: usize, #[case] ok: bool) {
        assert_eq!(LongNotes::new(&"a".repeat(len)).is_ok(), ok);
    }
}
