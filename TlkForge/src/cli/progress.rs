//! CLI progress display utilities
//!
//! Step indicators with emojis and a percent bar for the per-string
//! decode and encode loops.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::converter::{ConvertPhase, ConvertProgress};

// =============================================================================
// Emoji Constants (with ASCII fallbacks for terminals without emoji support)
// =============================================================================

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Gear - for processing/conversion operations
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

// =============================================================================
// Step-Based Progress
// =============================================================================

/// Format a step indicator: `[1/3] 🔍 Message...`
#[must_use]
pub fn step_line(current: usize, total: usize, emoji: &Emoji, msg: &str) -> String {
    format!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    )
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

fn phase_emoji(phase: ConvertPhase) -> &'static Emoji<'static, 'static> {
    match phase {
        ConvertPhase::ReadingSource => &LOOKING_GLASS,
        ConvertPhase::WritingOutput => &DISK,
        ConvertPhase::Complete => &SPARKLE,
        _ => &GEAR,
    }
}

// =============================================================================
// Progress Styles
// =============================================================================

/// Progress bar style with percentage
///
/// Format: `Decoding strings [████████░░░░░░░░] 50%`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style_with_percent() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {percent}%")
        .expect("valid template")
}

/// Create a 0-100 percent bar
#[must_use]
pub fn percent_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(bar_style_with_percent());
    pb.set_message(msg.to_string());
    pb
}

/// Route converter progress to a bar: steps are printed above it, the
/// per-string phases move it.
pub fn show_progress(pb: &ProgressBar, progress: &ConvertProgress) {
    match progress.phase {
        ConvertPhase::Decoding | ConvertPhase::Encoding => {
            pb.set_message(progress.phase.as_str());
            pb.set_position(progress.current as u64);
        }
        ConvertPhase::Complete => pb.finish_and_clear(),
        phase => {
            let msg = progress
                .current_file
                .as_deref()
                .unwrap_or_else(|| phase.as_str());
            pb.println(step_line(
                progress.current,
                progress.total,
                phase_emoji(phase),
                msg,
            ));
        }
    }
}
