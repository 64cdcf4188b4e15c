//! `scoutclaw gateway`: start the HTTP server.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("ScoutClaw Gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.default_model);
    println!(
        "   Sessions:  {}",
        if config.sessions.enabled {
            config.sessions.resolved_dir().display().to_string()
        } else {
            "disabled".into()
        }
    );

    scoutclaw_gateway::start(config).await?;

    Ok(())
}
