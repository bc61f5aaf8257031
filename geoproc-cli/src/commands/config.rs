//! The `check-config` subcommand.

use std::error::Error;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<(), Box<dyn Error>> {
    let config = geoproc::config::load_config(config_path)?;

    println!("Configuration OK");
    println!();
    println!("[server]");
    println!("  title          = {}", config.server.title);
    println!("  address        = {}:{}", config.server.host, config.server.port);
    println!("[execution]");
    println!("  workers        = {}", config.execution.worker_count);
    println!("  queue          = {}", config.execution.queue_capacity);
    println!("  sync timeout   = {:?}", config.execution.sync_timeout);
    println!("[storage]");
    println!("  backend        = {:?}", config.storage.backend);
    println!("  wiping         = {}", config.storage.wiping_enabled);
    println!("  threshold      = {:?}", config.storage.wiping_threshold);
    println!("  period         = {:?}", config.storage.wiping_period);
    println!("[resolver]");
    println!("  timeout        = {:?}", config.resolver.timeout);
    println!("  max body bytes = {}", config.resolver.max_body_bytes);

    Ok(())
}
