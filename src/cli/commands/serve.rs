//! Web server command.

use console::style;

use crate::config::Settings;
use crate::server::AppState;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind
        .map(str::to_string)
        .unwrap_or_else(|| settings.server.bind_address());
    let (host, port) = parse_bind_address(&bind, settings.server.port)?;

    settings.validate()?;
    let state = AppState::from_settings(settings)?;

    // Best effort; every batch checks the header again.
    println!("{} Checking sheet header...", style("→").cyan());
    match state.sink.ensure_header().await {
        Ok(_) => println!("  {} Sheet ready", style("✓").green()),
        Err(e) => eprintln!("  {} Could not initialize sheet: {}", style("!").yellow(), e),
    }

    println!(
        "{} Starting cardscan server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(state, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:`default_port`
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
        anyhow::bail!("invalid port in bind address: {}", bind);
    }

    Ok((bind.to_string(), default_port))
}
