//! Interactive compose → preview → send session

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Editor, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use mailwright::{
    ActionOutcome, FormState, HttpRelayClient, MailwrightConfig, NotificationKind, SessionView,
    Stage, WorkflowController,
};

use crate::menu::{self, MenuAction};

/// Options that pre-fill the session form
#[derive(Debug, Clone, Default, Args)]
pub struct ComposeArgs {
    /// Generation prompt
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Recipient address (repeatable)
    #[arg(short, long = "recipient")]
    pub recipients: Vec<String>,

    /// Sender email address
    #[arg(short, long)]
    pub sender: Option<String>,

    /// SMTP server the relay should connect to
    #[arg(long)]
    pub smtp_server: Option<String>,

    /// SMTP port the relay should connect to
    #[arg(long)]
    pub smtp_port: Option<u16>,

    /// Relay base URL (overrides configuration)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    /// SMTP password for the sender
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,
}

/// Run an interactive composition session
pub struct ComposeCommand {
    args: ComposeArgs,
}

impl ComposeCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(args: ComposeArgs) -> Self {
        Self { args }
    }

    /// Relay URL from the flag, else configuration
    #[must_use]
    pub fn relay_url(&self, config: &MailwrightConfig) -> String {
        self.args
            .api_url
            .clone()
            .unwrap_or_else(|| config.client.base_url.clone())
    }

    /// Starting form: configured SMTP target overlaid with command-line values
    ///
    /// # Errors
    ///
    /// Returns an error if a recipient slot cannot be filled
    pub fn seed_form(&self, config: &MailwrightConfig) -> Result<FormState> {
        let mut form = config.new_form();
        let args = &self.args;

        if let Some(prompt) = &args.prompt {
            form.prompt.clone_from(prompt);
        }
        if let Some(key) = &args.groq_api_key {
            form.generation_credential = key.as_str().into();
        }
        for (index, recipient) in args.recipients.iter().enumerate() {
            if index > 0 {
                form.add_recipient();
            }
            form.set_recipient(index, recipient.as_str())?;
        }
        if let Some(sender) = &args.sender {
            form.sender_email.clone_from(sender);
        }
        if let Some(password) = &args.smtp_password {
            form.sender_credential = password.as_str().into();
        }
        if let Some(host) = &args.smtp_server {
            form.relay_host.clone_from(host);
        }
        if let Some(port) = args.smtp_port {
            form.relay_port = port;
        }

        Ok(form)
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read from
    pub async fn execute(self, config: &MailwrightConfig) -> Result<()> {
        let base_url = self.relay_url(config);
        let form = self.seed_form(config)?;
        let ctl = WorkflowController::from_client(HttpRelayClient::new(&base_url), form);
        let theme = ColorfulTheme::default();

        println!(
            "{} {}",
            style("mailwright").green().bold(),
            style(format!("(relay: {base_url})")).dim()
        );

        loop {
            let view = ctl.snapshot();
            print_view(&view);

            let actions = menu::actions_for(&view);
            let labels: Vec<String> = actions.iter().map(|a| a.label(&view)).collect();
            let choice = Select::with_theme(&theme)
                .with_prompt("What next?")
                .items(&labels)
                .default(0)
                .interact()
                .context("Failed to read menu choice")?;
            let Some(action) = actions.get(choice).copied() else {
                continue;
            };

            if action == MenuAction::Quit {
                break;
            }
            apply(&ctl, &theme, &view, action).await?;
        }

        Ok(())
    }
}

async fn apply(
    ctl: &WorkflowController,
    theme: &ColorfulTheme,
    view: &SessionView,
    action: MenuAction,
) -> Result<()> {
    match action {
        MenuAction::EditPrompt => {
            let prompt: String = Input::with_theme(theme)
                .with_prompt("Prompt")
                .with_initial_text(view.form.prompt.clone())
                .allow_empty(true)
                .interact_text()?;
            ctl.set_prompt(prompt);
        }
        MenuAction::EditGenerationKey => {
            let key = Password::with_theme(theme)
                .with_prompt("Groq API key")
                .allow_empty_password(true)
                .interact()?;
            ctl.set_generation_credential(key);
        }
        MenuAction::Generate => {
            let outcome = with_spinner("Generating email...", ctl.request_generation()).await?;
            report_busy(&outcome);
        }
        MenuAction::EditSubject => {
            let current = view.generated.as_ref().map(|e| e.subject.clone()).unwrap_or_default();
            let subject: String = Input::with_theme(theme)
                .with_prompt("Subject")
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            ctl.set_subject(subject);
        }
        MenuAction::EditBody => {
            let current = view.generated.as_ref().map(|e| e.body.clone()).unwrap_or_default();
            if let Some(body) = Editor::new().edit(&current)? {
                ctl.set_body(body);
            }
        }
        MenuAction::EditRecipient(index) => {
            let current = view.form.recipients().get(index).cloned().unwrap_or_default();
            let recipient: String = Input::with_theme(theme)
                .with_prompt(format!("Recipient {}", index + 1))
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            ctl.set_recipient(index, recipient)?;
        }
        MenuAction::AddRecipient => ctl.add_recipient(),
        MenuAction::RemoveRecipient => {
            let slots: Vec<String> = (0..view.form.recipients().len())
                .map(|i| MenuAction::EditRecipient(i).label(view))
                .collect();
            let index = Select::with_theme(theme)
                .with_prompt("Remove which recipient?")
                .items(&slots)
                .default(0)
                .interact()?;
            ctl.remove_recipient(index);
        }
        MenuAction::EditSender => {
            let sender: String = Input::with_theme(theme)
                .with_prompt("Sender email")
                .with_initial_text(view.form.sender_email.clone())
                .allow_empty(true)
                .interact_text()?;
            ctl.set_sender_email(sender);
        }
        MenuAction::EditSenderPassword => {
            let password = Password::with_theme(theme)
                .with_prompt("SMTP password")
                .allow_empty_password(true)
                .interact()?;
            ctl.set_sender_credential(password);
        }
        MenuAction::EditSmtpTarget => {
            let host: String = Input::with_theme(theme)
                .with_prompt("SMTP server")
                .with_initial_text(view.form.relay_host.clone())
                .interact_text()?;
            let port: u16 = Input::with_theme(theme)
                .with_prompt("SMTP port")
                .default(view.form.relay_port)
                .interact_text()?;
            ctl.set_relay_target(host, port);
        }
        MenuAction::Send => {
            let outcome = with_spinner("Sending email...", ctl.request_delivery()).await?;
            report_busy(&outcome);
        }
        MenuAction::GoTo(Stage::Compose) => ctl.back_to_compose(),
        MenuAction::GoTo(Stage::Send) if view.stage == Stage::Preview => ctl.continue_to_send(),
        MenuAction::GoTo(stage) => ctl.select_stage(stage),
        MenuAction::DismissNotification => ctl.dismiss_notification(),
        MenuAction::Quit => {}
    }
    Ok(())
}

async fn with_spinner(
    message: &'static str,
    action: impl Future<Output = ActionOutcome>,
) -> Result<ActionOutcome> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Failed to set progress style")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);

    let outcome = action.await;
    spinner.finish_and_clear();
    Ok(outcome)
}

fn report_busy(outcome: &ActionOutcome) {
    if *outcome == ActionOutcome::Busy {
        println!("{}", style("A request is already in progress").dim());
    }
}

fn print_view(view: &SessionView) {
    println!();
    println!("{}", style(menu::stage_bar(view.stage)).bold());

    if let Some(notification) = &view.notification {
        let line = menu::notification_line(notification);
        match notification.kind {
            NotificationKind::Success => println!("{}", style(line).green()),
            NotificationKind::Error => println!("{}", style(line).red()),
        }
    }

    match (view.stage, &view.generated) {
        (Stage::Preview, Some(email)) => {
            println!();
            println!("{} {}", style("Subject:").bold(), email.subject);
            println!();
            println!("{}", email.body);
            println!();
        }
        (Stage::Preview, None) => {
            println!("{}", style("Nothing generated yet. Compose a prompt first.").dim());
        }
        (Stage::Send, None) => {
            println!("{}", style("Generate an email before sending.").dim());
        }
        (Stage::Send, Some(email)) => {
            println!("{} {}", style("Sending:").bold(), email.subject);
        }
        (Stage::Compose, _) => {}
    }
}
