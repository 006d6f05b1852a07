use log::{debug, info, warn};
use serde::Deserialize;

use crate::common::{address_host, Camera, ChannelId, Inventory, RelayConfig, StreamDescriptor, StreamMap, DEVICE_RTSPS_PORT};
use crate::error::{Error, Result};



/// Channel id the NVR uses for the stream variant we relay.
pub const DEFAULT_CHANNEL_ID: ChannelId = 2;

/// Camera name with all spaces removed, used as stream key and URL path segment.
pub fn normalize_name(name: &str) -> String {
	name.replace(' ', "")
}

/// RTSPS URL of a channel. Streams are always served on the NVR's RTSPS port,
/// whatever port the management API was reached on.
pub fn stream_url(device_address: &str, rtsp_alias: &str) -> String {
	let host = address_host(device_address).unwrap_or_else(|| device_address.to_string());
	format!("rtsps://{host}:{DEVICE_RTSPS_PORT}/{rtsp_alias}")
}

/// RTSP alias of the channel with id `channel_id`. When several channels share
/// the id the last one listed wins.
fn select_alias(camera: &Camera, channel_id: ChannelId) -> Option<&str> {
	camera.channels.iter()
		.filter(|channel| channel.id == channel_id)
		.last()
		.and_then(|channel| channel.rtsp_alias.as_deref())
}

/// Builds the relay configuration from the NVR bootstrap document.
///
/// Cameras without a usable `channel_id` channel are left out with a warning.
/// A document without a camera list, or cameras missing their name or channel
/// list, fail the whole mapping.
pub fn map(inventory: &serde_json::Value, device_address: &str, channel_id: ChannelId) -> Result<RelayConfig> {
	if inventory.get("cameras").is_none() {
		return Err(Error::MappingDefect("inventory has no \"cameras\" list".to_string()));
	}
	let inventory = Inventory::deserialize(inventory)
		.map_err(|err| Error::MappingDefect(format!("camera list could not be read: {err}")))?;

	let mut streams = StreamMap::new();
	for camera in &inventory.cameras {
		let alias = match select_alias(camera, channel_id) {
			Some(alias) => alias,
			None => {
				warn!("Skipping camera \"{}\": no channel {} with an RTSP alias", camera.name, channel_id);
				continue;
			}
		};

		let key = normalize_name(&camera.name);
		let url = stream_url(device_address, alias);
		debug!("Camera \"{}\" -> {}", camera.name, key);

		let descriptor = serde_json::to_value(StreamDescriptor::single_channel(&camera.name, url))?;
		if let Some(previous) = streams.insert(key.clone(), descriptor) {
			let previous_name = previous["name"].as_str().unwrap_or_default();
			warn!("Camera \"{}\" replaces \"{}\" under stream name {}", camera.name, previous_name, key);
		}
	}

	if streams.is_empty() && !inventory.cameras.is_empty() {
		warn!("None of the {} cameras could be mapped; check --channel-id", inventory.cameras.len());
	}
	info!("Mapped {} of {} cameras", streams.len(), inventory.cameras.len());
	Ok(RelayConfig::new(streams))
}



#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn front_door_example() {
		let inventory = json!({
			"cameras": [
				{"name": "Front Door", "channels": [{"id": 1, "rtspAlias": "a"}, {"id": 2, "rtspAlias": "b"}]}
			]
		});

		let config = map(&inventory, "10.0.0.1", DEFAULT_CHANNEL_ID).unwrap();
		let streams = serde_json::to_value(&config.streams).unwrap();
		assert_eq!(streams, json!({
			"FrontDoor": {
				"channels": {
					"0": {"on_demand": true, "insecure_skip_verify": true, "url": "rtsps://10.0.0.1:7441/b"}
				},
				"name": "Front Door"
			}
		}));
	}

	#[test]
	fn normalization() {
		assert_eq!(normalize_name("Back Yard Cam"), "BackYardCam");
		assert_eq!(normalize_name("Garage"), "Garage");
		assert_eq!(normalize_name(&normalize_name("A B")), normalize_name("A B"));
	}

	#[test]
	fn last_matching_channel_wins() {
		let inventory = json!({
			"cameras": [
				{"name": "Hall", "channels": [{"id": 2, "rtspAlias": "first"}, {"id": 2, "rtspAlias": "second"}]}
			]
		});

		let config = map(&inventory, "10.0.0.1", DEFAULT_CHANNEL_ID).unwrap();
		assert_eq!(config.streams["Hall"]["channels"]["0"]["url"], "rtsps://10.0.0.1:7441/second");
	}

	#[test]
	fn camera_without_channel_is_skipped_not_given_stale_alias() {
		let inventory = json!({
			"cameras": [
				{"name": "Porch", "channels": [{"id": 2, "rtspAlias": "porch"}]},
				{"name": "Attic", "channels": [{"id": 0, "rtspAlias": "attic-high"}]},
				{"name": "Shed", "channels": [{"id": 2, "rtspAlias": null}]},
				{"name": "Drive Way", "channels": [{"id": 2, "rtspAlias": "drive"}]}
			]
		});

		let config = map(&inventory, "10.0.0.1", DEFAULT_CHANNEL_ID).unwrap();
		assert_eq!(config.streams.keys().map(String::as_str).collect::<Vec<_>>(), vec!["Porch", "DriveWay"]);
	}

	#[test]
	fn other_channel_id_can_be_selected() {
		let inventory = json!({
			"cameras": [
				{"name": "Porch", "channels": [{"id": 0, "rtspAlias": "high"}, {"id": 2, "rtspAlias": "low"}]}
			]
		});

		let config = map(&inventory, "nvr.local", 0).unwrap();
		assert_eq!(config.streams["Porch"]["channels"]["0"]["url"], "rtsps://nvr.local:7441/high");
	}

	#[test]
	fn device_api_port_is_not_part_of_stream_url() {
		let inventory = json!({
			"cameras": [{"name": "Porch", "channels": [{"id": 2, "rtspAlias": "p"}]}]
		});

		let config = map(&inventory, "nvr.local:8443", DEFAULT_CHANNEL_ID).unwrap();
		let url = config.streams["Porch"]["channels"]["0"]["url"].as_str().unwrap();
		assert_eq!(url, "rtsps://nvr.local:7441/p");

		let parsed = url::Url::parse(url).unwrap();
		assert_eq!(parsed.host_str(), Some("nvr.local"));
		assert_eq!(parsed.port(), Some(7441));
	}

	#[test]
	fn duplicate_names_keep_first_position_with_last_camera() {
		let inventory = json!({
			"cameras": [
				{"name": "Front Door", "channels": [{"id": 2, "rtspAlias": "old"}]},
				{"name": "Garage", "channels": [{"id": 2, "rtspAlias": "g"}]},
				{"name": "FrontDoor", "channels": [{"id": 2, "rtspAlias": "new"}]}
			]
		});

		let config = map(&inventory, "10.0.0.1", DEFAULT_CHANNEL_ID).unwrap();
		assert_eq!(config.streams.keys().map(String::as_str).collect::<Vec<_>>(), vec!["FrontDoor", "Garage"]);
		assert_eq!(config.streams["FrontDoor"]["name"], "FrontDoor");
		assert_eq!(config.streams["FrontDoor"]["channels"]["0"]["url"], "rtsps://10.0.0.1:7441/new");
	}

	#[test]
	fn missing_cameras_key_is_mapping_defect() {
		let result = map(&json!({"nvr": {}}), "10.0.0.1", DEFAULT_CHANNEL_ID);
		assert!(matches!(result, Err(Error::MappingDefect(_))));
	}

	#[test]
	fn camera_without_channels_is_mapping_defect() {
		let inventory = json!({"cameras": [{"name": "Porch"}]});
		let result = map(&inventory, "10.0.0.1", DEFAULT_CHANNEL_ID);
		assert!(matches!(result, Err(Error::MappingDefect(_))));
	}

	#[test]
	fn unrelated_bootstrap_fields_are_ignored() {
		let inventory = json!({
			"nvr": {"name": "UNVR"},
			"cameras": [
				{"id": "abc", "name": "Porch", "isConnected": true,
					"channels": [{"id": 2, "rtspAlias": "p", "width": 640, "enabled": true}]}
			],
			"users": []
		});

		let config = map(&inventory, "10.0.0.1", DEFAULT_CHANNEL_ID).unwrap();
		assert_eq!(config.streams.len(), 1);
	}
}
