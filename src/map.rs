//! GeoJSON markers for the cartography page.
//!
//! The map widget consumes a `FeatureCollection` of points; entities with
//! out-of-range coordinates are left off the map.

use serde_json::{json, Value};

use crate::db::models::EntiteCartographique;

/// Build a GeoJSON `FeatureCollection` with one point per placeable entity.
pub fn to_feature_collection(entities: &[EntiteCartographique]) -> Value {
    let features: Vec<Value> = entities
        .iter()
        .filter(|entity| {
            let valid = entity.has_valid_position();
            if !valid {
                tracing::warn!(id = %entity.id, "Entity has invalid coordinates");
            }
            valid
        })
        .map(|entity| {
            json!({
                "type": "Feature",
                "id": entity.id.to_string(),
                "geometry": {
                    "type": "Point",
                    // GeoJSON positions are [longitude, latitude].
                    "coordinates": [entity.longitude, entity.latitude],
                },
                "properties": {
                    "nom": entity.nom,
                    "type_entite": entity.type_entite,
                    "adresse": entity.adresse,
                    "telephone": entity.telephone,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
