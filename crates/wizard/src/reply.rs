use crate::choice::Choice;

pub const BTN_BACK: &str = "⬅️ Back";
pub const BTN_CANCEL: &str = "❌ Cancel";
pub const BTN_SKIP: &str = "⏭️ Skip";

pub const TOTAL_STEPS: u8 = 12;

/// Longest order name shown on an inline button.
pub const BUTTON_LABEL_LIMIT: usize = 45;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, choice: &Choice) -> Self {
        Self {
            label: label.into(),
            data: choice.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    None,
    /// Hide the reply keyboard left by an earlier free-text step.
    Remove,
    /// Reply keyboard with Back and Cancel, plus Skip on optional fields.
    Field { skip: bool },
    Inline(Vec<Vec<Button>>),
}

/// Something to show the user, independent of the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Send { text: String, keyboard: Keyboard },
    /// Replace the text of the message whose button was pressed.
    EditText(String),
    /// Replace the inline keyboard of the message whose button was pressed.
    EditKeyboard(Vec<Vec<Button>>),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Send {
            text: text.into(),
            keyboard: Keyboard::None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Send {
            text: text.into(),
            keyboard,
        }
    }

    pub fn field(text: impl Into<String>, skip: bool) -> Self {
        Self::with_keyboard(text, Keyboard::Field { skip })
    }

    pub fn inline(text: impl Into<String>, rows: Vec<Vec<Button>>) -> Self {
        Self::with_keyboard(text, Keyboard::Inline(rows))
    }

    /// Visible text of the reply, if it carries any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Send { text, .. } | Self::EditText(text) => Some(text),
            Self::EditKeyboard(_) => None,
        }
    }
}

/// A reserved token typed or tapped on the field keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Back,
    Cancel,
    Skip,
}

impl Nav {
    pub fn detect(text: &str) -> Option<Self> {
        match text.trim() {
            BTN_BACK => Some(Self::Back),
            BTN_CANCEL => Some(Self::Cancel),
            BTN_SKIP => Some(Self::Skip),
            _ => None,
        }
    }
}

pub fn step_text(step: u8, title: &str, instruction: &str) -> String {
    let mut message = format!("🧭 Step {step}/{TOTAL_STEPS} — {title}");
    if !instruction.is_empty() {
        message.push('\n');
        message.push_str(instruction);
    }
    message
}

pub fn truncate_label(label: &str) -> String {
    label.chars().take(BUTTON_LABEL_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_header_counts_out_of_twelve() {
        assert_eq!(step_text(3, "Service Number", ""), "🧭 Step 3/12 — Service Number");
        assert_eq!(
            step_text(6, "Tanggal Open", "Format: DD-MM-YYYY HH:MM:SS"),
            "🧭 Step 6/12 — Tanggal Open\nFormat: DD-MM-YYYY HH:MM:SS"
        );
    }

    #[test]
    fn navigation_tokens_are_exact_after_trim() {
        assert_eq!(Nav::detect(" ⬅️ Back "), Some(Nav::Back));
        assert_eq!(Nav::detect("❌ Cancel"), Some(Nav::Cancel));
        assert_eq!(Nav::detect("⏭️ Skip"), Some(Nav::Skip));
        assert_eq!(Nav::detect("back"), None);
        assert_eq!(Nav::detect("Skip"), None);
    }

    #[test]
    fn labels_are_truncated_by_characters() {
        let long = "é".repeat(60);
        assert_eq!(truncate_label(&long).chars().count(), BUTTON_LABEL_LIMIT);
        assert_eq!(truncate_label("Ganti ONT"), "Ganti ONT");
    }
}
