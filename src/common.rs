use std::collections::BTreeMap;
use std::fmt;

use url::Url;



pub type ChannelId = u64;
pub type CameraList = Vec<Camera>;

/// Key under which the single relayed channel of every stream is published.
pub const RELAY_CHANNEL_KEY: &str = "0";

/// Port the NVR serves RTSPS streams on.
pub const DEVICE_RTSPS_PORT: u16 = 7441;

/// Port the relay server serves its HTTP/WebSocket viewer endpoints on.
pub const RELAY_HTTP_PORT: u16 = 8083;



// Older credential files name the addresses `UNVR_IP` and `RTSPW_IP`; both spellings are read.
#[derive(Clone)]
#[derive(PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Credentials {
	pub username: String,
	pub password: String,
	#[serde(alias = "UNVR_IP")]
	pub device_address: String,
	#[serde(alias = "RTSPW_IP")]
	pub relay_address: String,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("device_address", &self.device_address)
			.field("relay_address", &self.relay_address)
			.finish()
	}
}



/// The part of the NVR bootstrap document we care about. Everything else is ignored.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize, Deserialize)]
pub struct Inventory {
	pub cameras: CameraList,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize, Deserialize)]
pub struct Camera {
	pub name: String,
	pub channels: Vec<Channel>,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize, Deserialize)]
pub struct Channel {
	pub id: ChannelId,
	// Null when RTSP is disabled for the channel on the NVR
	#[serde(rename = "rtspAlias", default)]
	pub rtsp_alias: Option<String>,
}



#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct RelayConfig {
	pub channel_defaults: BTreeMap<String, serde_json::Value>,
	pub server: ServerSettings,
	pub streams: StreamMap,
}

impl RelayConfig {
	pub fn new(streams: StreamMap) -> Self {
		RelayConfig {
			channel_defaults: BTreeMap::new(),
			server: ServerSettings::default(),
			streams,
		}
	}
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ServerSettings {
	pub debug: bool,
	pub http_debug: bool,
	pub http_demo: bool,
	pub http_dir: String,
	pub http_login: String,
	pub http_password: String,
	pub http_port: String,
	pub https: bool,
	pub https_auto_tls: bool,
	pub https_auto_tls_name: String,
	pub https_cert: String,
	pub https_key: String,
	pub https_port: String,
	pub ice_credential: String,
	pub ice_servers: Vec<String>,
	pub ice_username: String,
	pub log_level: String,
	pub rtsp_port: String,
	pub token: TokenSettings,
	pub webrtc_port_max: u16,
	pub webrtc_port_min: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		ServerSettings {
			debug: true,
			http_debug: false,
			http_demo: true,
			http_dir: "web".to_string(),
			http_login: "demo".to_string(),
			http_password: "demo".to_string(),
			http_port: format!(":{RELAY_HTTP_PORT}"),
			https: false,
			https_auto_tls: false,
			https_auto_tls_name: String::new(),
			https_cert: "server.crt".to_string(),
			https_key: "server.key".to_string(),
			https_port: ":443".to_string(),
			ice_credential: String::new(),
			ice_servers: vec!["stun:stun.l.google.com:19302".to_string()],
			ice_username: String::new(),
			log_level: "debug".to_string(),
			rtsp_port: ":5541".to_string(),
			token: TokenSettings::default(),
			webrtc_port_max: 0,
			webrtc_port_min: 0,
		}
	}
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct TokenSettings {
	pub backend: String,
	pub enable: bool,
}

impl Default for TokenSettings {
	fn default() -> Self {
		TokenSettings {
			backend: "http://127.0.0.1/test.php".to_string(),
			enable: false,
		}
	}
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct StreamDescriptor {
	pub channels: BTreeMap<String, ChannelSettings>,
	pub name: String,
}

impl StreamDescriptor {
	/// Descriptor relaying a single on-demand channel from `url`.
	pub fn single_channel(name: &str, url: String) -> Self {
		let mut channels = BTreeMap::new();
		channels.insert(RELAY_CHANNEL_KEY.to_string(), ChannelSettings {
			on_demand: true,
			insecure_skip_verify: true,
			url,
		});
		StreamDescriptor {
			channels,
			name: name.to_string(),
		}
	}
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ChannelSettings {
	pub on_demand: bool,
	pub insecure_skip_verify: bool,
	pub url: String,
}



/// Stream entries keyed by normalized camera name, kept in insertion order.
///
/// The viewer page is rendered in the same order the entries appear here.
pub type StreamMap = serde_json::Map<String, serde_json::Value>;



/// Host part of a `host` or `host:port` address, bracketed for IPv6.
pub fn address_host(address: &str) -> Option<String> {
	let url = Url::parse(&format!("https://{address}/")).ok()?;
	url.host_str().map(str::to_string)
}

/// Port of a `host:port` address, if one was given.
pub fn address_port(address: &str) -> Option<u16> {
	Url::parse(&format!("https://{address}/")).ok()?.port()
}
