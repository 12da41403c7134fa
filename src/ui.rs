use console::{strip_ansi_codes, Term};
use fridge_protocol::Role;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::chat::Message;
use crate::sensor::{ChartGrid, FridgeTemperature, POINT_GLYPH};
use crate::utils::{split_emphasis, Segment};

/// Terminal output helpers
pub struct UI {
    term: Term,
}

impl UI {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Apply `color_fn` only when the terminal supports color
    fn colorize<F>(&self, text: &str, color_fn: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if self.supports_color() {
            color_fn(text)
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.colorize(message, |m| m.green().bold().to_string()));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.colorize(message, |m| m.red().bold().to_string()));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.colorize(message, |m| m.yellow().bold().to_string()));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.colorize(message, |m| m.blue().bold().to_string()));
    }

    /// Fridge temperature, cyan for a reading and red for a failure
    pub fn format_temperature(&self, temperature: &FridgeTemperature) -> String {
        let text = temperature.to_string();
        if temperature.is_reading() {
            self.colorize(&text, |t| t.cyan().bold().to_string())
        } else {
            self.colorize(&text, |t| t.red().to_string())
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        let term_width = self.width();
        let title_len = title.width() + 4;
        let line_len = term_width.saturating_sub(title_len) / 2;
        let line = "═".repeat(line_len.min(40));

        println!();
        if self.supports_color() {
            println!("{} {} {}", line.cyan(), title.cyan().bold(), line.cyan());
        } else {
            println!("{} {} {}", line, title, line);
        }
        println!();
    }

    /// Card-style display of label/value pairs
    pub fn card(&self, title: &str, content: Vec<(&str, String)>) {
        let card_width = self.width().saturating_sub(4).clamp(50, 80);
        let supports_color = self.supports_color();

        println!("╭{}╮", "─".repeat(card_width - 2));
        let title_spaces = card_width.saturating_sub(title.width() + 4);
        if supports_color {
            println!("│ {} {}│", title.cyan().bold(), " ".repeat(title_spaces));
        } else {
            println!("│ {} {}│", title, " ".repeat(title_spaces));
        }
        println!("├{}┤", "─".repeat(card_width - 2));

        for (label, value) in content {
            // Widths are measured without ANSI codes
            let label_width = strip_ansi_codes(label).width();
            let value_width = strip_ansi_codes(&value).width();
            let content_width = label_width + value_width + 4;
            let spaces = if content_width < card_width - 1 {
                card_width - content_width - 1
            } else {
                1
            };

            if supports_color {
                println!("│ {}: {}{}│", label.dimmed(), value, " ".repeat(spaces));
            } else {
                println!("│ {}: {}{}│", label, value, " ".repeat(spaces));
            }
        }

        println!("╰{}╯", "─".repeat(card_width - 2));
        println!();
    }

    /// Numbered list of items
    pub fn list(&self, title: &str, items: &[String]) {
        self.header(title);
        if items.is_empty() {
            self.warning("Nothing here yet");
            return;
        }
        for (index, item) in items.iter().enumerate() {
            let number = format!("{:>3}.", index + 1);
            println!("{} {}", self.colorize(&number, |n| n.dimmed().to_string()), item);
        }
        println!();
    }

    /// Render `text`, emphasizing the runs wrapped in `**`
    pub fn emphasized(&self, text: &str) -> String {
        split_emphasis(text)
            .into_iter()
            .map(|segment| match segment {
                Segment::Plain(part) => part.to_string(),
                Segment::Emphasized(part) => {
                    self.colorize(part, |p| p.bold().to_string())
                }
            })
            .collect()
    }

    /// Print one chat turn
    pub fn message_bubble(&self, message: &Message) {
        let (label, body) = match message.role {
            Role::User => (
                self.colorize("You", |l| l.blue().bold().to_string()),
                message.content.clone(),
            ),
            Role::Assistant => (
                self.colorize("Assistant", |l| l.green().bold().to_string()),
                self.emphasized(&message.content),
            ),
        };

        println!("{}", label);
        if let Some(image) = &message.image {
            let note = format!("[image: {}]", image.file_name());
            println!("  {}", self.colorize(&note, |n| n.dimmed().to_string()));
        }
        for line in body.lines() {
            println!("  {}", line);
        }
        println!();
    }

    /// Print the temperature chart
    pub fn chart(&self, grid: &ChartGrid) {
        let point = POINT_GLYPH.to_string();
        for row in &grid.rows {
            if self.supports_color() {
                println!("{}", row.replace(&point, &point.red().to_string()));
            } else {
                println!("{}", row);
            }
        }
        println!("{}", self.colorize(&grid.x_axis, |x| x.dimmed().to_string()));
        println!();
    }

    /// Spinner shown while a request is pending
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Terminal width in columns
    pub fn width(&self) -> usize {
        self.term.size().1 as usize
    }

    pub fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;

    #[test]
    fn test_format_temperature_keeps_text() {
        let ui = UI::new();
        let reading = ui.format_temperature(&FridgeTemperature::Reading(4));
        assert_eq!(strip_ansi_codes(&reading), "4°C");

        let failure = ui.format_temperature(&FridgeTemperature::NetworkError);
        assert_eq!(strip_ansi_codes(&failure), "Network error");
    }

    #[test]
    fn test_emphasized_drops_markers() {
        let ui = UI::new();
        let text = ui.emphasized("**Omelette** rapide");
        assert_eq!(strip_ansi_codes(&text), "Omelette rapide");
    }
}
