use streamdash_core::TimeRange;

pub fn run(url: &str, range: TimeRange) {
    let mut app = match crate::tui::app::App::new(url, range) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("TUI error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
