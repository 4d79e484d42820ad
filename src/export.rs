//! GeoJSON export of located issues, for loading into any map tool.

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::protocol::Issue;

/// One point feature per issue that has coordinates. Issues without a location are skipped.
pub fn issues_to_geojson(issues: &[Issue]) -> FeatureCollection {
    let features = issues.iter().filter_map(issue_feature).collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn issue_feature(issue: &Issue) -> Option<Feature> {
    let coordinate = issue.coordinate()?;

    let mut properties = JsonObject::new();
    properties.insert("title".to_string(), json!(issue.title));
    properties.insert("category".to_string(), json!(issue.category));
    properties.insert("status".to_string(), json!(issue.status));
    properties.insert("zone".to_string(), json!(issue.resolved_zone()));
    if let Some(url) = &issue.image_url {
        properties.insert("imageUrl".to_string(), json!(url));
    }
    if let Some(created_at) = &issue.created_at {
        properties.insert("createdAt".to_string(), json!(created_at));
    }

    Some(Feature {
        bbox: None,
        // GeoJSON positions are [longitude, latitude]
        geometry: Some(Geometry::new(Value::Point(vec![
            coordinate.longitude,
            coordinate.latitude,
        ]))),
        id: Some(Id::Number(issue.id.into())),
        properties: Some(properties),
        foreign_members: None,
    })
}
