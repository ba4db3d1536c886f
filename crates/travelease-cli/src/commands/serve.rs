//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting TravelEase web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Comma-separated lists from the environment
    let api_keys =
        travelease_server::parse_list(&std::env::var("TRAVELEASE_API_KEYS").unwrap_or_default());
    let allowed_origins = travelease_server::parse_list(
        &std::env::var("TRAVELEASE_ALLOWED_ORIGINS").unwrap_or_default(),
    );

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: identity proxy header (x-forwarded-email)");
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (TRAVELEASE_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} (TRAVELEASE_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = travelease_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    travelease_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
