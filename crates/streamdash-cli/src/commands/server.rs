use streamdash_server::ServerConfig;

pub fn run(host: &str, port: u16) {
    let config = ServerConfig {
        host: host.to_string(),
        port,
    };
    let base = format!("http://{}", config.addr());

    println!("📡 streamdash server v{}", streamdash_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /historical       Last 12 hours, one sample per minute (721 points)");
    println!("     GET /metrics          Server-sent events, one sample per second");
    println!("     GET /health           Health check");
    println!();
    println!("   Examples:");
    println!("     curl {base}/historical");
    println!("     curl -N {base}/metrics");
    println!();

    let rt = super::runtime();
    if let Err(e) = rt.block_on(streamdash_server::run_server(&config)) {
        eprintln!("Server error on {}: {e}", config.addr());
        std::process::exit(1);
    }
}
