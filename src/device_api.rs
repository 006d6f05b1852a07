use log::{debug, info};
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{Error, Result};



const LOGIN_PATH: &str = "api/auth/login";
const BOOTSTRAP_PATH: &str = "proxy/protect/api/bootstrap";
const TOKEN_COOKIE: &str = "TOKEN";

#[derive(Serialize)]
struct LoginRequest<'a> {
	username: &'a str,
	password: &'a str,
}

/// Session token handed out by the NVR on login, sent back as the `TOKEN` cookie.
#[derive(Clone)]
#[derive(PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Debug for SessionToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("SessionToken(<redacted>)")
	}
}



/// Client for the NVR management API.
pub struct DeviceClient {
	base_url: Url,
	http: Client,
}

impl DeviceClient {
	/// Client for the NVR at `device_address` over HTTPS.
	///
	/// NVRs ship with self-signed certificates, so unless `verify_tls` is set the
	/// certificate presented by the device is not checked.
	pub fn new(device_address: &str, verify_tls: bool) -> Result<Self> {
		let base_url = Url::parse(&format!("https://{device_address}/"))?;
		Self::with_base_url(base_url, verify_tls)
	}

	pub fn with_base_url(base_url: Url, verify_tls: bool) -> Result<Self> {
		let http = Client::builder()
			.danger_accept_invalid_certs(!verify_tls)
			.build()?;
		Ok(DeviceClient { base_url, http })
	}

	pub fn login_url(&self) -> Result<Url> {
		Ok(self.base_url.join(LOGIN_PATH)?)
	}

	/// URL of the bootstrap document holding the full camera inventory.
	pub fn bootstrap_url(&self) -> Result<Url> {
		Ok(self.base_url.join(BOOTSTRAP_PATH)?)
	}

	/// Exchanges a username and password for a session token.
	///
	/// Anything other than a 200 carrying a `TOKEN` cookie is reported as `AuthFailure`,
	/// whether the cause is bad credentials, the network, or the device itself.
	pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken> {
		let url = self.login_url()?;
		debug!("Logging in at {url}");

		let response = self.http
			.post(url)
			.json(&LoginRequest { username, password })
			.send()
			.await
			.map_err(|err| Error::AuthFailure(err.to_string()))?;

		if response.status() != StatusCode::OK {
			return Err(Error::AuthFailure(format!("device answered {}", response.status())));
		}

		let token = response.cookies()
			.filter(|cookie| cookie.name() == TOKEN_COOKIE)
			.map(|cookie| cookie.value().to_string())
			.last()
			.ok_or_else(|| Error::AuthFailure(format!("response carried no {TOKEN_COOKIE} cookie")))?;

		info!("Logged in as {username}");
		Ok(SessionToken(token))
	}

	/// Authenticated GET of `url`, returning the body as an untyped JSON document.
	pub async fn fetch(&self, url: Url, token: &SessionToken) -> Result<serde_json::Value> {
		debug!("Fetching {url}");

		let response = self.http
			.get(url)
			.header(COOKIE, format!("{TOKEN_COOKIE}={}", token.as_str()))
			.send()
			.await
			.map_err(|err| Error::FetchFailure(err.to_string()))?;

		if response.status() != StatusCode::OK {
			return Err(Error::FetchFailure(format!("device answered {}", response.status())));
		}

		response.json::<serde_json::Value>()
			.await
			.map_err(|err| Error::FetchFailure(format!("body is not JSON: {err}")))
	}

	pub async fn fetch_inventory(&self, token: &SessionToken) -> Result<serde_json::Value> {
		let url = self.bootstrap_url()?;
		let inventory = self.fetch(url, token).await?;
		info!("Fetched camera inventory");
		Ok(inventory)
	}
}
