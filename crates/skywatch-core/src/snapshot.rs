//! Live spotter snapshot and its pure reconciler.
//!
//! The snapshot is an ordered collection of features keyed by a stable
//! identity (user ID, falling back to callsign). Every operation returns a
//! new snapshot and leaves its input untouched, so snapshots can be handed
//! to a renderer while the next update is being applied.
//!
//! Reconciliation rules:
//! - update for a known identity → replace the feature in place (order kept)
//! - update for an unknown identity → append
//! - `location_stopped` → remove exactly the matching identity
//!
//! Nothing here evicts features on staleness: a spotter that drops off
//! without sending `stop_sharing` stays visible until one arrives.
// TODO: consider TTL eviction matching the REST collaborator's 15-minute
// active-spotters window, so silent drop-offs eventually age out of the map.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::payloads::{LocationUpdatePayload, Role};

/// One spotter's current observed state, named after its geographic-point
/// rendering (a GeoJSON `Feature`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpotterFeature {
    /// Stable dedup key: user ID, or callsign when no ID was supplied.
    pub identity: String,
    /// Display callsign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    /// Spotter role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Meters above sea level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Fix accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Heading in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Speed in meters per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Sample time (opaque ISO-8601 string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SpotterFeature {
    /// Build a feature from an update payload.
    ///
    /// Returns `None` when the payload carries neither a user ID nor a
    /// callsign — there is no identity to key on, so the update is dropped.
    #[must_use]
    pub fn from_update(update: &LocationUpdatePayload) -> Option<Self> {
        let identity = update.identity()?.to_owned();
        Some(Self {
            identity,
            callsign: update.callsign.clone(),
            role: update.role,
            latitude: update.latitude,
            longitude: update.longitude,
            altitude: update.altitude,
            accuracy: update.accuracy,
            heading: update.heading,
            speed: update.speed,
            timestamp: update.timestamp.clone(),
        })
    }

    /// Render as a GeoJSON `Feature` (`coordinates` are `[longitude, latitude]`).
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.longitude, self.latitude],
            },
            "properties": {
                "user_id": self.identity,
                "callsign": self.callsign,
                "role": self.role,
                "altitude": self.altitude,
                "accuracy": self.accuracy,
                "heading": self.heading,
                "speed": self.speed,
                "timestamp": self.timestamp,
            },
        })
    }

    /// Parse a GeoJSON `Feature` as served by the REST collaborator's
    /// active-spotters endpoint.
    ///
    /// Returns `None` for geometries that are not a two-coordinate point or
    /// for features without a usable identity.
    #[must_use]
    pub fn from_geojson(feature: &Value) -> Option<Self> {
        let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
        let [longitude, latitude] = coords.as_slice() else {
            return None;
        };
        let props = feature.get("properties")?;
        let identity = props
            .get("user_id")
            .and_then(Value::as_str)
            .or_else(|| props.get("callsign").and_then(Value::as_str))?
            .to_owned();
        Some(Self {
            identity,
            callsign: props
                .get("callsign")
                .and_then(Value::as_str)
                .map(str::to_owned),
            role: props
                .get("role")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok()),
            latitude: latitude.as_f64()?,
            longitude: longitude.as_f64()?,
            altitude: props.get("altitude").and_then(Value::as_f64),
            accuracy: props.get("accuracy").and_then(Value::as_f64),
            heading: props.get("heading").and_then(Value::as_f64),
            speed: props.get("speed").and_then(Value::as_f64),
            timestamp: props
                .get("timestamp")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }
}

/// Ordered, identity-deduplicated collection of currently active spotters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotterSnapshot {
    features: Vec<SpotterFeature>,
}

impl SpotterSnapshot {
    /// Empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active spotters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Look up a feature by identity.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&SpotterFeature> {
        self.features.iter().find(|f| f.identity == identity)
    }

    /// Iterate features in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &SpotterFeature> {
        self.features.iter()
    }

    /// Apply a `location_update`: replace the matching identity in place, or
    /// append when unknown. Updates without an identity leave the snapshot
    /// unchanged.
    #[must_use]
    pub fn apply_update(&self, update: &LocationUpdatePayload) -> Self {
        let Some(feature) = SpotterFeature::from_update(update) else {
            return self.clone();
        };
        let mut features = self.features.clone();
        match features.iter().position(|f| f.identity == feature.identity) {
            Some(index) => features[index] = feature,
            None => features.push(feature),
        }
        Self { features }
    }

    /// Apply a `location_stopped` (or local stop): remove exactly the
    /// feature with the given identity.
    #[must_use]
    pub fn apply_stopped(&self, identity: &str) -> Self {
        let features = self
            .features
            .iter()
            .filter(|f| f.identity != identity)
            .cloned()
            .collect();
        Self { features }
    }

    /// Merge another snapshot underneath this one: features already known
    /// live keep their streamed state, unknown identities are appended.
    ///
    /// Used to fold the REST collaborator's initial active-spotters response
    /// into a snapshot that may already have received streamed updates.
    #[must_use]
    pub fn merge(&self, initial: &Self) -> Self {
        let mut features = self.features.clone();
        for feature in &initial.features {
            if !features.iter().any(|f| f.identity == feature.identity) {
                features.push(feature.clone());
            }
        }
        Self { features }
    }

    /// Parse a REST `FeatureCollection` response into a snapshot, skipping
    /// malformed entries.
    #[must_use]
    pub fn from_feature_collection(collection: &Value) -> Self {
        let features = collection
            .get("features")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(SpotterFeature::from_geojson)
                    .collect()
            })
            .unwrap_or_default();
        Self { features }
    }

    /// Render as a GeoJSON `FeatureCollection` with a `count`, matching the
    /// REST collaborator's active-spotters shape.
    #[must_use]
    pub fn to_feature_collection(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(SpotterFeature::to_geojson).collect::<Vec<_>>(),
            "count": self.features.len(),
        })
    }
}

impl<'a> IntoIterator for &'a SpotterSnapshot {
    type Item = &'a SpotterFeature;
    type IntoIter = std::slice::Iter<'a, SpotterFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
