use color_eyre::Result;
use geo::{Contains, VincentyDistance};
use geo_types::{Point, Rect};
use gpx::Gpx;
use tracing::{info, instrument};

use crate::map::Coordinate;
use crate::types::dto::place::Spot;

/// Closer than this to the previous spot counts as standing still
pub const MIN_MOVE_METRES: f64 = 1.0;

pub trait IntoSpots {
    fn into_spots(&self) -> Vec<Spot>;
}

impl IntoSpots for Gpx {
    #[instrument(skip(self))]
    fn into_spots(&self) -> Vec<Spot> {
        info!("number of tracks in gpx: {}", self.tracks.len());
        let points = self
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .flat_map(|segment| segment.points.iter())
            .map(|waypoint| waypoint.point());
        moving_points(points)
            .into_iter()
            .map(|point| Spot {
                lat: point.y(),
                lng: point.x(),
            })
            .collect()
    }
}

pub fn read_spots(gpx: &str) -> Result<Vec<Spot>> {
    let gpx_data = gpx::read(gpx.as_bytes())?;
    Ok(gpx_data.into_spots())
}

/// Region spanned by two corner coordinates
pub fn region((lower_left, upper_right): (Coordinate, Coordinate)) -> Rect {
    Rect::new(Point::from(lower_left), Point::from(upper_right))
}

/// Whether the ride's last spot lies strictly inside the region
pub fn ends_in(spots: &[Spot], region: &Rect) -> bool {
    spots
        .last()
        .map_or(false, |last| region.contains(&Point::from(Coordinate::from(*last))))
}

/// Keeps the first point, then every point at least `MIN_MOVE_METRES` from the last kept one
fn moving_points(points: impl Iterator<Item = Point>) -> Vec<Point> {
    let mut kept: Vec<Point> = vec![];
    for point in points {
        let moved = kept.last().map_or(true, |last| {
            // points Vincenty cannot resolve are kept rather than guessed away
            last.vincenty_distance(&point)
                .map_or(true, |distance| distance >= MIN_MOVE_METRES)
        });
        if moved {
            kept.push(point);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SOFIA_BORDER;

    const RIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="lazy-spots" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>loop</name>
    <trkseg>
      <trkpt lat="42.6893643" lon="23.3255209"></trkpt>
      <trkpt lat="42.6893643" lon="23.3255209"></trkpt>
      <trkpt lat="42.6900000" lon="23.3260000"></trkpt>
      <trkpt lat="42.6900000" lon="23.3260000"></trkpt>
    </trkseg>
  </trk>
  <trk>
    <name>empty</name>
    <trkseg></trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn standing_still_is_dropped() {
        let spots = read_spots(RIDE).unwrap();
        assert_eq!(
            spots,
            vec![
                Spot {
                    lat: 42.6893643,
                    lng: 23.3255209
                },
                Spot {
                    lat: 42.69,
                    lng: 23.326
                },
            ]
        );
    }

    #[test]
    fn first_point_is_always_kept() {
        let kept = moving_points(std::iter::once(Point::new(23.0, 42.0)));
        assert_eq!(kept, vec![Point::new(23.0, 42.0)]);
    }

    fn ride_between(from: (f64, f64), to: (f64, f64)) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="lazy-spots" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="{}" lon="{}"></trkpt>
    <trkpt lat="{}" lon="{}"></trkpt>
  </trkseg></trk>
</gpx>"#,
            from.0, from.1, to.0, to.1
        )
    }

    #[test]
    fn ride_ending_in_sofia_is_in_region() {
        let spots = read_spots(&ride_between((42.60, 23.20), (42.70, 23.33))).unwrap();
        assert!(ends_in(&spots, &region(SOFIA_BORDER)));
    }

    #[test]
    fn ride_ending_in_paris_is_out_of_region() {
        let spots = read_spots(&ride_between((48.85, 2.35), (48.86, 2.36))).unwrap();
        assert_eq!(spots.len(), 2);
        assert!(!ends_in(&spots, &region(SOFIA_BORDER)));
    }

    #[test]
    fn only_the_end_point_counts() {
        let spots = read_spots(&ride_between((42.70, 23.33), (42.80, 23.33))).unwrap();
        assert!(!ends_in(&spots, &region(SOFIA_BORDER)));
    }

    #[test]
    fn border_itself_is_outside() {
        let spots = vec![Spot {
            lat: 42.656182,
            lng: 23.3,
        }];
        assert!(!ends_in(&spots, &region(SOFIA_BORDER)));
        assert!(!ends_in(&[], &region(SOFIA_BORDER)));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(read_spots("<gpx").is_err());
    }
}
