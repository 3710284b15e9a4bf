use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {msg} {spinner:.green}";

fn hidden_or(quiet_mode: bool, bar: impl FnOnce() -> ProgressBar) -> ProgressBar {
    match quiet_mode {
        true => ProgressBar::hidden(),
        false => bar(),
    }
}

/// Byte-based bar when the input size is known, a spinner otherwise.
pub fn create_progress_bar_bytes(quiet_mode: bool, msg: &str, length: Option<u64>) -> ProgressBar {
    let bar = hidden_or(quiet_mode, || match length {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    });

    bar.set_message(msg);
    match length.is_some() {
        true => bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {msg} {spinner:.green} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} eta: {eta}")
                .progress_chars("=> "),
        ),
        false => bar.set_style(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)),
    };

    bar.inc(0); // Just to avoid the drawing after the log.

    bar
}

/// Ticking spinner for work of unknown length, such as loading the catalog.
pub fn create_spinner(quiet_mode: bool, msg: &str) -> ProgressBar {
    let spinner = hidden_or(quiet_mode, ProgressBar::new_spinner);

    spinner.set_message(msg);
    spinner.set_style(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE));
    spinner.enable_steady_tick(200);

    spinner
}
