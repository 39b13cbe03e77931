use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Minimum length of a todo's text after trimming surrounding whitespace.
const MIN_TEXT_LEN: usize = 2;

fn validate_todo_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().chars().count() < MIN_TEXT_LEN {
        return Err(ValidationError::new("text_too_short"));
    }
    Ok(())
}

/// Input structure for creating a todo item.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// The text of the todo. Trimmed before storage; must be at least
    /// 2 characters long after trimming.
    #[validate(custom = "validate_todo_text")]
    pub text: String,
}

/// Partial update payload for a todo item.
///
/// Both fields are optional. When `completed` is anything other than
/// `Some(true)`, the item is forced back to not-completed and its
/// completion timestamp is cleared.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoPatch {
    /// Replacement text, trimmed and re-validated when present.
    #[validate(custom = "validate_todo_text")]
    pub text: Option<String>,
    /// Desired completion state.
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Resolves the completion state this patch requests.
    ///
    /// Returns the new `completed` flag and the matching `completed_at`
    /// value (epoch milliseconds). `completed_at` is `Some` exactly when
    /// the flag is true.
    pub fn completion(&self) -> (bool, Option<i64>) {
        match self.completed {
            Some(true) => (true, Some(Utc::now().timestamp_millis())),
            _ => (false, None),
        }
    }
}

/// Represents a todo item as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Todo {
    /// Unique identifier for the todo (UUID v4).
    pub id: Uuid,
    /// The text of the todo.
    pub text: String,
    /// Whether the todo has been completed.
    pub completed: bool,
    /// Epoch milliseconds of completion. `Some` if and only if `completed`.
    pub completed_at: Option<i64>,
    /// Identifier of the user who created the todo. Immutable after creation.
    pub creator_id: Uuid,
    /// Timestamp of when the todo was created.
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new `Todo` from `TodoInput` and the creator's id.
    /// The text is trimmed, `completed` starts false, and `completed_at`
    /// starts unset.
    pub fn new(input: TodoInput, creator_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: input.text.trim().to_string(),
            completed: false,
            completed_at: None,
            creator_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_creation_trims_text() {
        let input = TodoInput {
            text: "  buy milk  ".to_string(),
        };
        let creator = Uuid::new_v4();

        let todo = Todo::new(input, creator);
        assert_eq!(todo.text, "buy milk");
        assert_eq!(todo.creator_id, creator);
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_todo_input_validation() {
        let valid = TodoInput {
            text: "do the thing".to_string(),
        };
        assert!(valid.validate().is_ok());

        let too_short = TodoInput {
            text: "x".to_string(),
        };
        assert!(too_short.validate().is_err());

        // Whitespace padding does not count toward the minimum length.
        let padded = TodoInput {
            text: "   a   ".to_string(),
        };
        assert!(padded.validate().is_err());
    }

    #[test]
    fn test_patch_completion_sets_timestamp() {
        let patch = TodoPatch {
            text: None,
            completed: Some(true),
        };
        let (completed, completed_at) = patch.completion();
        assert!(completed);
        assert!(completed_at.unwrap() > 0);
    }

    #[test]
    fn test_patch_completion_clears_timestamp() {
        // Explicit false and absent both reset completion.
        for completed in [Some(false), None] {
            let patch = TodoPatch {
                text: None,
                completed,
            };
            assert_eq!(patch.completion(), (false, None));
        }
    }

    #[test]
    fn test_patch_text_validation() {
        let patch = TodoPatch {
            text: Some(" ".to_string()),
            completed: None,
        };
        assert!(patch.validate().is_err());

        let patch = TodoPatch {
            text: None,
            completed: Some(true),
        };
        assert!(patch.validate().is_ok());
    }
}
