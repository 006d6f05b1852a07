#[macro_use] extern crate serde_derive;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use clap::value_parser;
use log::info;

mod artifacts;
mod common;
mod credentials;
mod device_api;
mod error;
mod stream_mapper;

use crate::common::{ChannelId, Credentials};
use crate::device_api::DeviceClient;



struct RunOptions {
	credentials_path: PathBuf,
	config_path: PathBuf,
	html_path: PathBuf,
	channel_id: ChannelId,
	verify_tls: bool,
}

fn cli() -> Command {
	Command::new("unvr-relay-config")
		.version("0.0.4")
		.about("Generates an RTSPtoWeb config and a camera grid page from a UniFi NVR's camera list.")
		.arg(
			Arg::new("credentials")
				.short('c')
				.long("credentials")
				.value_parser(value_parser!(PathBuf))
				.default_value(credentials::DEFAULT_CREDENTIALS_FILE)
				.help("JSON file with NVR login and addresses; asked for and created when missing")
		)
		.arg(
			Arg::new("config-out")
				.long("config-out")
				.value_parser(value_parser!(PathBuf))
				.default_value(artifacts::DEFAULT_CONFIG_FILE)
				.help("Where to write the RTSPtoWeb config")
		)
		.arg(
			Arg::new("html-out")
				.long("html-out")
				.value_parser(value_parser!(PathBuf))
				.default_value(artifacts::DEFAULT_HTML_FILE)
				.help("Where to write the viewer page")
		)
		.arg(
			Arg::new("channel-id")
				.long("channel-id")
				.value_parser(value_parser!(ChannelId))
				.default_value("2")
				.help("Id of the camera channel to relay")
		)
		.arg(
			Arg::new("verify-tls")
				.long("verify-tls")
				.action(ArgAction::SetTrue)
				.help("Check the NVR's TLS certificate (off by default since NVRs use self-signed certificates)")
		)
}

fn run_options(matches: &clap::ArgMatches) -> RunOptions {
	// All of these have defaults, so clap always supplies a value
	RunOptions {
		credentials_path: matches.get_one::<PathBuf>("credentials").cloned().unwrap_or_default(),
		config_path: matches.get_one::<PathBuf>("config-out").cloned().unwrap_or_default(),
		html_path: matches.get_one::<PathBuf>("html-out").cloned().unwrap_or_default(),
		channel_id: matches.get_one::<ChannelId>("channel-id").copied().unwrap_or(stream_mapper::DEFAULT_CHANNEL_ID),
		verify_tls: matches.get_flag("verify-tls"),
	}
}

async fn run(credentials: &Credentials, options: &RunOptions) -> anyhow::Result<()> {
	if !options.verify_tls {
		info!("Not verifying the NVR's TLS certificate");
	}
	let client = DeviceClient::new(&credentials.device_address, options.verify_tls)?;
	run_with_client(&client, credentials, options).await
}

// Nothing is written unless login, fetch and mapping all succeed
async fn run_with_client(client: &DeviceClient, credentials: &Credentials, options: &RunOptions) -> anyhow::Result<()> {
	let token = client.login(&credentials.username, &credentials.password).await
		.context("Unable to obtain session cookie")?;
	let inventory = client.fetch_inventory(&token).await
		.context("Failed to fetch camera list")?;

	let relay_config = stream_mapper::map(&inventory, &credentials.device_address, options.channel_id)?;

	let (config_path, html_path) = artifacts::write(&relay_config, &credentials.relay_address, &options.config_path, &options.html_path).await?;

	println!("Complete JSON data saved to {}, Please copy this file to the RTSPtoWeb Server, then run the service", config_path.display());
	println!("GO111MODULE=on go run *.go");
	println!(
		"HTML file saved as {}, copy it and {} to a computer with access to the RTSPtoWeb server.",
		html_path.display(),
		artifacts::PLAYER_SCRIPT
	);
	anyhow::Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let matches = cli().get_matches();
	let options = run_options(&matches);

	let credentials = credentials::load_or_create(&options.credentials_path)
		.with_context(|| format!("Could not get credentials from {}", options.credentials_path.display()))?;

	run(&credentials, &options).await
}
