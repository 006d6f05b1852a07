use std::path::{Path, PathBuf};

use log::info;
use tokio::io::AsyncWriteExt;

use crate::common::{address_host, address_port, RelayConfig, RELAY_CHANNEL_KEY, RELAY_HTTP_PORT};
use crate::error::Result;



pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_HTML_FILE: &str = "Cameras.html";

/// Client script the viewer page loads; shipped separately next to the page.
pub const PLAYER_SCRIPT: &str = "main.js";

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Cams</title>
<style>
  /* Define the grid layout */
  .grid-container {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(1px,  400px)); /* Adjust minmax values as needed */
    gap: 10px; /* Adjust the gap between grid items */
  }

  /* Make videos responsive within the grid */
  .mse-video {
    width: 100%;
    height: 100%;
    object-fit: cover; /* Ensure the video fills the grid item */
  }

  /* Media queries to adjust grid layout for different screen sizes */
  @media screen and (max-width: 1920px) {
    .grid-container {
      grid-template-columns: repeat(auto-fit, minmax(1px, 500px)); /* Adjust minmax values as needed */
    }
  }
</style>
</head>
<body>
<div class="grid-container">"#;

const VIDEO_TILE: &str = r#"   <video class="mse-video" autoplay muted playsinline controls style="max-width: 100%; max-height: 100%;"></video>"#;



/// WebSocket URL the relay serves the MSE stream for `stream_key` on.
///
/// A port in `relay_address` replaces the relay's default HTTP port.
pub fn viewer_url(relay_address: &str, stream_key: &str) -> String {
	let host = address_host(relay_address).unwrap_or_else(|| relay_address.to_string());
	let port = address_port(relay_address).unwrap_or(RELAY_HTTP_PORT);
	format!("ws://{host}:{port}/stream/{stream_key}/channel/{RELAY_CHANNEL_KEY}/mse?uuid=demo&channel=0")
}

fn escape_attribute(value: &str) -> String {
	value
		.replace('"', "&quot;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

/// Viewer page with one hidden URL input and one video tile per stream, in stream order.
pub fn render_html(relay_config: &RelayConfig, relay_address: &str) -> String {
	let mut html = String::from(HTML_HEAD);
	for stream_key in relay_config.streams.keys() {
		let url = escape_attribute(&viewer_url(relay_address, stream_key));
		html.push_str(&format!("\n   <input type=\"hidden\" name=\"mse-url\" class=\"mse-url\" value=\"{url}\">\n"));
		html.push_str(VIDEO_TILE);
		html.push('\n');
	}
	html.push_str(&format!("\n</div><script src=\"{PLAYER_SCRIPT}\"></script>\n</body>\n</html>"));
	html
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
	let file = tokio::fs::File::create(path).await?;
	let mut writer = tokio::io::BufWriter::new(file);
	writer.write_all(contents).await?;
	writer.flush().await?;
	Ok(())
}

/// Writes the relay configuration and the viewer page, overwriting existing files.
pub async fn write(relay_config: &RelayConfig, relay_address: &str, config_path: &Path, html_path: &Path) -> Result<(PathBuf, PathBuf)> {
	let json = serde_json::to_vec_pretty(relay_config)?;
	write_file(config_path, &json).await?;
	info!("Wrote relay config with {} streams to {}", relay_config.streams.len(), config_path.display());

	let html = render_html(relay_config, relay_address);
	write_file(html_path, html.as_bytes()).await?;
	info!("Wrote viewer page to {}", html_path.display());

	Ok((config_path.to_path_buf(), html_path.to_path_buf()))
}
