use std::path::PathBuf;

use thiserror::Error;



pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("Credentials file {path} is not valid JSON: {source}")]
	CredentialFileCorrupt {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Invalid credentials: {0}")]
	InvalidCredentials(String),

	#[error("Login failed: {0}")]
	AuthFailure(String),

	#[error("Request failed: {0}")]
	FetchFailure(String),

	#[error("Unexpected inventory layout: {0}")]
	MappingDefect(String),

	#[error("Invalid URL: {0}")]
	Url(#[from] url::ParseError),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("(De)Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
