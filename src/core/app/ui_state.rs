use std::collections::VecDeque;

/// Toasts kept around for the renderer; older ones fall off the front.
pub const MAX_TOASTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// A short transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Presentation state that is not part of the conversation itself.
#[derive(Debug, Default)]
pub struct UiState {
    pub toasts: VecDeque<Toast>,
    /// Text the completion dialog was opened with, while it is open.
    pub completion_dialog: Option<String>,
}

impl UiState {
    pub fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            level,
            message: message.into(),
        });
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.push_toast(ToastLevel::Error, message);
    }

    pub fn last_toast(&self) -> Option<&Toast> {
        self.toasts.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_are_capped() {
        let mut ui = UiState::default();
        for i in 0..(MAX_TOASTS + 3) {
            ui.push_error(format!("error {i}"));
        }
        assert_eq!(ui.toasts.len(), MAX_TOASTS);
        assert_eq!(ui.toasts[0].message, "error 3");
        assert_eq!(
            ui.last_toast().map(|t| t.message.as_str()),
            Some(format!("error {}", MAX_TOASTS + 2).as_str())
        );
    }
}
