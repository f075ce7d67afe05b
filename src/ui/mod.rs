//! User-facing surface
//!
//! Three trigger actions (one per bundled image) and a reset action, gated
//! on the processing flag, plus the text rendering of the current result.

pub mod console;

use std::fmt;

use crate::assets::BundledImage;
use crate::config::DisplaySettings;
use crate::shared::ResultRecord;

pub use console::run_console;

/// A user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Recognize text in a bundled image
    Recognize(BundledImage),
    /// Clear the result
    Reset,
    /// Print the current result again
    Show,
    /// List the commands
    Help,
    /// Leave the application
    Quit,
}

impl Action {
    /// Whether the action is only available while no request is in flight
    pub fn requires_idle(self) -> bool {
        matches!(self, Action::Recognize(_) | Action::Reset)
    }

    /// Whether the action can be triggered in the given state
    pub fn is_enabled(self, record: &ResultRecord) -> bool {
        !self.requires_idle() || record.processing_enabled
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Recognize(image) => write!(f, "{}", image),
            Action::Reset => f.write_str("Reset"),
            Action::Show => f.write_str("Show"),
            Action::Help => f.write_str("Help"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// Parse one line of console input
pub fn parse_command(line: &str) -> Result<Action, String> {
    let command = line.trim().to_ascii_lowercase();
    match command.as_str() {
        "r" | "reset" => Ok(Action::Reset),
        "s" | "show" => Ok(Action::Show),
        "h" | "help" | "?" => Ok(Action::Help),
        "q" | "quit" | "exit" => Ok(Action::Quit),
        "" => Err("empty command".to_string()),
        other => other
            .parse::<BundledImage>()
            .map(Action::Recognize)
            .map_err(|_| format!("unknown command '{}'", other)),
    }
}

/// Actions that are currently enabled
pub fn available_actions(record: &ResultRecord) -> Vec<Action> {
    let mut actions = vec![Action::Reset];
    actions.extend(BundledImage::ALL.iter().map(|image| Action::Recognize(*image)));
    actions.extend([Action::Show, Action::Help, Action::Quit]);
    actions.retain(|action| action.is_enabled(record));
    actions
}

/// Result text as shown to the user
pub fn render_result(record: &ResultRecord, display: &DisplaySettings) -> String {
    if record.text_elements.is_empty() {
        return format!("{}\n", display.empty_message);
    }

    format!(
        "{:?}\n{:?}\n{}{:?}\n",
        record.text_elements,
        record.element_confidence,
        display.total_confidence_label,
        record.total_confidence
    )
}

/// Help text listing the commands
pub fn render_help() -> String {
    let mut help = String::from("Commands:\n");
    for image in BundledImage::ALL {
        let name = format!("{:?}", image).to_lowercase();
        help.push_str(&format!("  {} | {:<8} {}\n", image.index() + 1, name, image.label()));
    }
    help.push_str("  r | reset    Clear the result\n");
    help.push_str("  s | show     Show the current result\n");
    help.push_str("  q | quit     Exit\n");
    help
}
