//! Output formatting for the CLI.

use console::style;
use upsell_widget::{OfferCard, RenderOutput, WidgetView};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print one published render output.
    pub fn frame(&self, index: usize, frame: &RenderOutput) {
        if self.json {
            return;
        }

        let label = match &frame.view {
            WidgetView::Skeleton => style("skeleton").dim().to_string(),
            WidgetView::Nothing => style("nothing").dim().to_string(),
            WidgetView::OfferWithPicker(_) => style("offer (picker)").green().to_string(),
            WidgetView::OfferSingleVariant(_) => style("offer").green().to_string(),
        };
        println!("{} {}", style(format!("[{}]", index)).dim(), label);

        if let Some(card) = frame.offer() {
            self.card(card);
        }
        if let Some(banner) = &frame.error_banner {
            println!("  {} {}", style("!").red().bold(), style(banner).red());
        }
    }

    fn card(&self, card: &OfferCard) {
        self.kv("product", &format!("{} ({})", card.title, card.product_id));
        self.kv("variant", &format!("{} ({})", card.variant_label, card.variant_id));
        self.kv("price", &card.price);
        self.kv("image", &card.image_url);
        for choice in &card.variants {
            let marker = if choice.selected { "●" } else { "○" };
            self.list_item(&format!("{} {} ({})", marker, choice.label, choice.id));
        }
        if card.adding {
            self.kv("add", &style("adding…").yellow().to_string());
        }
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Color a lifecycle state name.
pub fn state_badge(state: &str) -> String {
    match state {
        "ready" | "succeeded" => style(state).green().to_string(),
        "loading" | "submitting" => style(state).yellow().to_string(),
        "failed" => style(state).red().to_string(),
        "idle" => style(state).dim().to_string(),
        _ => state.to_string(),
    }
}
