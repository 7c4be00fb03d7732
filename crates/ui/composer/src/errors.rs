use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use color_eyre::Result;
use tracing::error;

use crate::tui;

static INIT: OnceLock<PathBuf> = OnceLock::new();

/// Install the composer's report and panic hooks.
///
/// Panics leave the terminal usable, land in `log_file` with ANSI codes
/// stripped and tell the user which file to attach to a bug report. Only the
/// first call installs anything.
pub fn init(log_file: &Path) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(panic_section(log_file))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    let support = support_text(log_file);
    std::panic::set_hook(Box::new(move |panic_info| {
        // before anything is printed
        if let Err(e) = tui::restore_terminal() {
            error!(error = %e, "could not restore terminal after panic");
        }

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, metadata, print_msg};
            let metadata = metadata!().support(support.clone());
            let dump = handle_dump(&metadata, panic_info);
            let _ = print_msg(dump, &metadata);
        }
        #[cfg(debug_assertions)]
        let _ = &support;

        let report = panic_hook.panic_report(panic_info).to_string();
        error!(report = %strip_ansi_escapes::strip_str(&report), "composer panicked");

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }
        #[cfg(not(debug_assertions))]
        {
            eprintln!("{report}");
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = INIT.set(log_file.to_path_buf());
    Ok(())
}

fn panic_section(log_file: &Path) -> String {
    format!(
        "The segment composer crashed; any unsaved draft is gone.\nThe session log is at {}",
        log_file.display()
    )
}

fn support_text(log_file: &Path) -> String {
    format!(
        "Attach {} and the crash report when filing an issue.",
        log_file.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_section_points_at_log() {
        let text = panic_section(Path::new("/tmp/segments/composer.log"));
        assert!(text.contains("segment composer crashed"));
        assert!(text.ends_with("/tmp/segments/composer.log"));
    }

    #[test]
    fn support_text_names_log() {
        let text = support_text(Path::new("composer.log"));
        assert_eq!(
            text,
            "Attach composer.log and the crash report when filing an issue."
        );
    }
}
