//! What the interactive session offers at each stage
//!
//! Kept free of terminal I/O so the menu for any session state can be
//! checked directly.

use mailwright::{Notification, NotificationKind, SessionView, Stage};

/// One entry in the action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Edit the generation prompt
    EditPrompt,
    /// Enter the Groq API key
    EditGenerationKey,
    /// Ask the relay for an email
    Generate,
    /// Edit the generated subject
    EditSubject,
    /// Edit the generated body in `$EDITOR`
    EditBody,
    /// Edit one recipient slot
    EditRecipient(usize),
    /// Append a blank recipient slot
    AddRecipient,
    /// Pick a recipient slot to remove
    RemoveRecipient,
    /// Edit the sender address
    EditSender,
    /// Enter the sender's SMTP password
    EditSenderPassword,
    /// Edit the SMTP host and port
    EditSmtpTarget,
    /// Ask the relay to deliver
    Send,
    /// Switch to another stage
    GoTo(Stage),
    /// Hide the visible notification
    DismissNotification,
    /// Leave the session
    Quit,
}

impl MenuAction {
    /// Menu text for this action given the current session
    #[must_use]
    pub fn label(self, view: &SessionView) -> String {
        match self {
            Self::EditPrompt => {
                if view.form.prompt.trim().is_empty() {
                    "Write prompt".to_string()
                } else {
                    format!("Edit prompt: {}", truncate(&view.form.prompt, 40))
                }
            }
            Self::EditGenerationKey => {
                format!("Groq API key {}", set_marker(!view.form.generation_credential.is_blank()))
            }
            Self::Generate => {
                if view.generated.is_some() {
                    "Regenerate email".to_string()
                } else {
                    "Generate email".to_string()
                }
            }
            Self::EditSubject => "Edit subject".to_string(),
            Self::EditBody => "Edit body".to_string(),
            Self::EditRecipient(index) => {
                let value = view
                    .form
                    .recipients()
                    .get(index)
                    .filter(|r| !r.trim().is_empty())
                    .map_or("(empty)", String::as_str);
                format!("Recipient {}: {value}", index + 1)
            }
            Self::AddRecipient => "Add recipient".to_string(),
            Self::RemoveRecipient => "Remove a recipient".to_string(),
            Self::EditSender => {
                if view.form.sender_email.is_empty() {
                    "Sender email: (empty)".to_string()
                } else {
                    format!("Sender email: {}", view.form.sender_email)
                }
            }
            Self::EditSenderPassword => {
                format!("Sender password {}", set_marker(!view.form.sender_credential.is_blank()))
            }
            Self::EditSmtpTarget => {
                format!("SMTP server: {}:{}", view.form.relay_host, view.form.relay_port)
            }
            Self::Send => "Send email".to_string(),
            Self::GoTo(Stage::Compose) => "Back to compose".to_string(),
            Self::GoTo(Stage::Send) if view.stage == Stage::Preview => "Continue to send".to_string(),
            Self::GoTo(stage) => format!("Go to {stage}"),
            Self::DismissNotification => "Dismiss notification".to_string(),
            Self::Quit => "Quit".to_string(),
        }
    }
}

/// Actions offered for the current stage, in display order
#[must_use]
pub fn actions_for(view: &SessionView) -> Vec<MenuAction> {
    let mut actions = match view.stage {
        Stage::Compose => vec![
            MenuAction::EditPrompt,
            MenuAction::EditGenerationKey,
            MenuAction::Generate,
        ],
        Stage::Preview if view.generated.is_some() => vec![
            MenuAction::EditSubject,
            MenuAction::EditBody,
            MenuAction::Generate,
        ],
        Stage::Preview => Vec::new(),
        Stage::Send => {
            let slots = view.form.recipients().len();
            let mut send: Vec<MenuAction> = (0..slots).map(MenuAction::EditRecipient).collect();
            send.push(MenuAction::AddRecipient);
            if slots > 1 {
                send.push(MenuAction::RemoveRecipient);
            }
            send.extend([
                MenuAction::EditSender,
                MenuAction::EditSenderPassword,
                MenuAction::EditSmtpTarget,
                MenuAction::Send,
            ]);
            send
        }
    };

    actions.extend(
        Stage::ALL
            .into_iter()
            .filter(|stage| *stage != view.stage)
            .map(MenuAction::GoTo),
    );
    if view.notification.is_some() {
        actions.push(MenuAction::DismissNotification);
    }
    actions.push(MenuAction::Quit);
    actions
}

/// Stage indicator with the active stage in brackets
#[must_use]
pub fn stage_bar(active: Stage) -> String {
    Stage::ALL
        .iter()
        .map(|stage| {
            if *stage == active {
                format!("[{stage}]")
            } else {
                stage.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Single-line rendering of a notification with the seconds it stays visible
#[must_use]
pub fn notification_line(notification: &Notification) -> String {
    let marker = match notification.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error => "✗",
    };
    let seconds_left = notification.remaining().as_millis().div_ceil(1000);
    format!("{marker} {} ({seconds_left}s)", notification.message)
}

const fn set_marker(is_set: bool) -> &'static str {
    if is_set {
        "(set)"
    } else {
        "(not set)"
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max_chars || text.lines().nth(1).is_some() {
        let head: String = line.chars().take(max_chars).collect();
        format!("{head}…")
    } else {
        line.to_string()
    }
}
