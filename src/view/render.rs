use crate::{controller::Rejection, models::Phase};
use colored::*;

pub const TITLE: &str = "✨ ImaGEN AI Image Generator ✨";
pub const SUBTITLE: &str = "Transform your ideas into vivid AI-generated images";
pub const PLACEHOLDER: &str = "Enter your creative prompt...";
pub const LOADING: &str = "Generating image, please wait...";

pub fn banner() -> String {
    format!(
        "{}\n{}\n{}\n",
        TITLE.bright_magenta().bold(),
        SUBTITLE,
        PLACEHOLDER.bright_black()
    )
}

/// The submit affordance: disabled with a countdown while cooling down.
pub fn button_label(cooldown_secs: u32) -> String {
    if cooldown_secs > 0 {
        format!("Wait {}s", cooldown_secs)
    } else {
        "Generate".to_string()
    }
}

pub fn input_marker(cooldown_secs: u32) -> String {
    let label = button_label(cooldown_secs);
    let label = if cooldown_secs > 0 {
        label.bright_black().to_string()
    } else {
        label.bright_blue().bold().to_string()
    };
    format!("[{}] > ", label)
}

/// Whether a cooldown tick leaving `remaining_secs` should redraw the marker.
pub fn redraw_on_tick(remaining_secs: u32) -> bool {
    remaining_secs % 5 == 0
}

pub fn phase(phase: &Phase) -> Option<String> {
    match phase {
        Phase::Idle => None,
        Phase::Loading => Some(LOADING.yellow().to_string()),
        Phase::Success(result) => Some(format!(
            "{}\n{}",
            result.caption.bold(),
            result.image_url.underline()
        )),
        Phase::Error(message) => Some(message.red().to_string()),
    }
}

pub fn rejection(rejection: &Rejection) -> String {
    match rejection {
        Rejection::CoolingDown { remaining_secs } => button_label(*remaining_secs),
        Rejection::InFlight => LOADING.to_string(),
    }
}
