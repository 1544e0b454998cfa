use geo::BoundingRect;
use geo_types::{MultiPoint, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::MapConfig;

/// A (latitude, longitude) pair. Ranges are not checked.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinate> for Point {
    fn from(value: Coordinate) -> Self {
        Point::new(value.lng, value.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinate,
    pub title: String,
}

impl Marker {
    /// Markers dropped for places carry no title
    pub fn untitled(position: Coordinate) -> Self {
        Marker {
            position,
            title: String::new(),
        }
    }
}

/// The map shown in a container: a view plus the markers placed on it
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    container: String,
    view: MapView,
    markers: Vec<Marker>,
}

impl Map {
    pub fn new(config: &MapConfig) -> Self {
        Map {
            container: config.container.clone(),
            view: MapView {
                center: config.center,
                zoom: config.zoom,
            },
            markers: vec![],
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn to_geojson(&self) -> color_eyre::Result<FeatureCollection> {
        let features = self
            .markers
            .iter()
            .map(|marker| marker.into_marker_feature())
            .collect::<Vec<Feature>>();
        let bbox = self
            .markers
            .iter()
            .map(|marker| Point::from(marker.position))
            .collect::<MultiPoint>()
            .bounding_box();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("container".to_string(), json!(self.container));
        foreign_members.insert("center".to_string(), serde_json::to_value(self.view.center)?);
        foreign_members.insert("zoom".to_string(), json!(self.view.zoom));

        Ok(FeatureCollection {
            bbox,
            features,
            foreign_members: Some(foreign_members),
        })
    }
}

pub trait IntoMarkerFeature {
    fn into_marker_feature(&self) -> Feature;
}

impl IntoMarkerFeature for Marker {
    fn into_marker_feature(&self) -> Feature {
        let point = Point::from(self.position);
        Feature {
            geometry: Some(Geometry::new((&point).into())),
            properties: json!({ "title": self.title }).as_object().cloned(),
            ..Default::default()
        }
    }
}

//Get the bounding box for a geometry as a vector
pub trait BoundingBox<N> {
    fn bounding_box(&self) -> Option<Vec<N>>;
}

impl BoundingBox<f64> for MultiPoint<f64> {
    fn bounding_box(&self) -> Option<Vec<f64>> {
        self.bounding_rect()
            .map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y])
    }
}
