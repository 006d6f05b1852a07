use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use log::{info, warn};
use url::Url;

use crate::common::Credentials;
use crate::error::{Error, Result};



pub const DEFAULT_CREDENTIALS_FILE: &str = "streamsconfig.json";

/// Loads credentials from `path`, or asks for them on the terminal and saves them there.
pub fn load_or_create(path: &Path) -> Result<Credentials> {
	let stdin = io::stdin();
	let mut input = stdin.lock();
	let mut output = io::stdout();
	load_or_create_with(path, &mut input, &mut output)
}

pub fn load_or_create_with<R: BufRead, W: Write>(path: &Path, input: &mut R, output: &mut W) -> Result<Credentials> {
	if path.exists() {
		let credentials = load(path)?;
		info!("Loaded credentials from {}", path.display());
		return Ok(credentials);
	}

	// First run, nothing saved yet
	warn!("No credentials file at {}; asking for credentials", path.display());
	let credentials = prompt(input, output)?;
	save(path, &credentials)?;
	info!("Saved credentials to {}", path.display());
	Ok(credentials)
}

pub fn load(path: &Path) -> Result<Credentials> {
	let file = File::open(path)?;
	let reader = BufReader::new(file);
	let credentials: Credentials = serde_json::from_reader(reader)
		.map_err(|source| Error::CredentialFileCorrupt { path: path.to_path_buf(), source })?;
	validate(&credentials).map_err(Error::InvalidCredentials)?;
	Ok(credentials)
}

pub fn save(path: &Path, credentials: &Credentials) -> Result<()> {
	let json = serde_json::to_string_pretty(credentials)?;
	std::fs::write(path, json)?;
	Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Credentials> {
	let username = ask(input, output, "Enter UNVR username: ", true, validate_not_empty)?;
	// Spaces can be part of a password, so only the line ending is removed
	let password = ask(input, output, "Enter UNVR password: ", false, validate_not_empty)?;
	let device_address = ask(input, output, "Enter UNVR IP: ", true, validate_address)?;
	let relay_address = ask(input, output, "Enter RTSPtoWeb Server IP: ", true, validate_address)?;

	Ok(Credentials {
		username,
		password,
		device_address,
		relay_address,
	})
}

// Keeps asking until the answer passes `check`
fn ask<R, W, F>(input: &mut R, output: &mut W, question: &str, trim: bool, check: F) -> Result<String>
where
	R: BufRead,
	W: Write,
	F: Fn(&str) -> std::result::Result<(), String>,
{
	loop {
		output.write_all(question.as_bytes())?;
		output.flush()?;

		let mut line = String::new();
		if input.read_line(&mut line)? == 0 {
			return Err(Error::InvalidCredentials(format!("input ended before answering \"{}\"", question.trim())));
		}
		let answer = if trim {
			line.trim().to_string()
		} else {
			line.trim_end_matches(['\r', '\n']).to_string()
		};

		match check(&answer) {
			Ok(()) => return Ok(answer),
			Err(reason) => writeln!(output, "{reason}, please try again.")?,
		}
	}
}

pub fn validate(credentials: &Credentials) -> std::result::Result<(), String> {
	validate_not_empty(&credentials.username).map_err(|e| format!("username: {e}"))?;
	validate_not_empty(&credentials.password).map_err(|e| format!("password: {e}"))?;
	validate_address(&credentials.device_address).map_err(|e| format!("device address: {e}"))?;
	validate_address(&credentials.relay_address).map_err(|e| format!("relay address: {e}"))?;
	Ok(())
}

fn validate_not_empty(value: &str) -> std::result::Result<(), String> {
	if value.is_empty() {
		return Err("Value must not be empty".to_string());
	}
	Ok(())
}

/// Accepts a bare host or `host:port`, e.g. `192.168.1.1` or `nvr.local:8443`.
pub fn validate_address(address: &str) -> std::result::Result<(), String> {
	validate_not_empty(address)?;
	if address.chars().any(char::is_whitespace) {
		return Err(format!("\"{address}\" contains whitespace"));
	}

	let url = Url::parse(&format!("https://{address}/"))
		.map_err(|e| format!("\"{address}\" is not a valid address ({e})"))?;
	let plain_host = url.host_str().is_some()
		&& url.path() == "/"
		&& url.query().is_none()
		&& url.fragment().is_none()
		&& url.username().is_empty()
		&& url.password().is_none();
	if !plain_host {
		return Err(format!("\"{address}\" should be a host name or IP address, optionally with a port"));
	}
	Ok(())
}
