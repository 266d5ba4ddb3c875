pub mod historical;
pub mod monitor;
pub mod server;
pub mod tail;

/// Where `monitor`, `tail` and `historical` look for a server by default.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Build a tokio runtime or exit with a message.
pub fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    }
}
