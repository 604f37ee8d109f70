//! Great-circle formulae on a spherical earth.
//!
//! All functions are scalar; the mesh and surface layers map them over site
//! arrays. Angles are degrees, distances kilometres.

use super::EARTH_RADIUS;

/// Great-circle distance between two points on the earth surface
/// (haversine form).
pub fn geodetic_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    let h = ((lat1 - lat2) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon1 - lon2) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

/// Initial bearing from the first point to the second, in `[0, 360)`.
pub fn azimuth(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    let cos_lat2 = lat2.cos();
    let true_course = ((lon1 - lon2).sin() * cos_lat2).atan2(
        lat1.cos() * lat2.sin() - lat1.sin() * cos_lat2 * (lon1 - lon2).cos(),
    );
    (360.0 - true_course.to_degrees()).rem_euclid(360.0)
}

/// Distance between two points taking depth into account: the hypotenuse
/// of the surface distance and the depth difference.
pub fn distance(lon1: f64, lat1: f64, depth1: f64, lon2: f64, lat2: f64, depth2: f64) -> f64 {
    let hdist = geodetic_distance(lon1, lat1, lon2, lat2);
    let vdist = depth1 - depth2;
    (hdist * hdist + vdist * vdist).sqrt()
}

/// Signed distance from a point to the great circle through `(alon, alat)`
/// with bearing `aazimuth`. Positive to the right of the arc.
pub fn distance_to_arc(alon: f64, alat: f64, aazimuth: f64, plon: f64, plat: f64) -> f64 {
    let azimuth_to_target = azimuth(alon, alat, plon, plat);
    let distance_to_target = geodetic_distance(alon, alat, plon, plat);
    let t_angle = (azimuth_to_target - aazimuth + 360.0).rem_euclid(360.0);
    let angle = (t_angle.to_radians().sin() * (distance_to_target / EARTH_RADIUS).sin())
        .clamp(-1.0, 1.0)
        .acos();
    (std::f64::consts::FRAC_PI_2 - angle) * EARTH_RADIUS
}

/// Signed distance from a point to the half great circle starting at
/// `(alon, alat)` with bearing `aazimuth`.
///
/// Points in front of the start use [`distance_to_arc`]. Points behind it
/// get the distance to the start point, negative on the left.
pub fn distance_to_semi_arc(alon: f64, alat: f64, aazimuth: f64, plon: f64, plat: f64) -> f64 {
    let delta = (aazimuth - azimuth(alon, alat, plon, plat)).to_radians();
    if delta.cos() > 0.0 {
        distance_to_arc(alon, alat, aazimuth, plon, plat)
    } else {
        let dist = geodetic_distance(alon, alat, plon, plat);
        if delta.sin() > 0.0 {
            -dist
        } else {
            dist
        }
    }
}

/// Signed distance from a point to the segment between `start` and `end`
/// (`(lon, lat)` pairs). Positive on the right of the segment direction.
pub fn min_distance_to_segment(start: (f64, f64), end: (f64, f64), plon: f64, plat: f64) -> f64 {
    let seg_azim = azimuth(start.0, start.1, end.0, end.1);
    let azimuth1 = azimuth(start.0, start.1, plon, plat);
    let azimuth2 = azimuth(end.0, end.1, plon, plat);

    let in_band = (seg_azim - azimuth1).to_radians().cos() >= 0.0
        && (seg_azim - azimuth2).to_radians().cos() <= 0.0;
    let dist = if in_band {
        distance_to_arc(start.0, start.1, seg_azim, plon, plat)
    } else {
        geodetic_distance(start.0, start.1, plon, plat)
            .min(geodetic_distance(end.0, end.1, plon, plat))
    }
    .abs();

    if (azimuth1 - seg_azim).to_radians().sin() < 0.0 {
        -dist
    } else {
        dist
    }
}

/// Coordinates of the point `distance` km away along `azimuth`.
pub fn point_at(lon: f64, lat: f64, azimuth: f64, distance: f64) -> (f64, f64) {
    let points = npoints_towards(lon, lat, 0.0, azimuth, distance, 0.0, 2);
    let [lon, lat, _] = points[1];
    (lon, lat)
}

/// `npoints` equally spaced points starting at the given one and heading
/// along `azimuth` for `hdist` km horizontally and `vdist` km vertically.
///
/// The first point is returned unchanged. Fewer than two points degrade to
/// just the starting point.
pub fn npoints_towards(
    lon: f64,
    lat: f64,
    depth: f64,
    azimuth: f64,
    hdist: f64,
    vdist: f64,
    npoints: usize,
) -> Vec<[f64; 3]> {
    if npoints < 2 {
        return vec![[lon, lat, depth]];
    }
    let rlon = lon.to_radians();
    let rlat = lat.to_radians();
    let tc = (360.0 - azimuth).to_radians();
    let (sin_tc, cos_tc) = tc.sin_cos();
    let (sin_lat, cos_lat) = rlat.sin_cos();
    let step = npoints as f64 - 1.0;

    let mut points = Vec::with_capacity(npoints);
    points.push([lon, lat, depth]);
    for i in 1..npoints {
        let i = i as f64;
        let hd = i * (hdist / EARTH_RADIUS) / step;
        let (sin_d, cos_d) = hd.sin_cos();
        let sin_lats = sin_lat * cos_d + cos_lat * sin_d * cos_tc;
        let plat = sin_lats.clamp(-1.0, 1.0).asin().to_degrees();
        let dlon = (sin_tc * sin_d * cos_lat).atan2(cos_d - sin_lat * sin_lats);
        let plon = ((rlon - dlon + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
            - std::f64::consts::PI)
            .to_degrees();
        points.push([plon, plat, depth + i * vdist / step]);
    }
    points
}

/// `npoints` equally spaced points between two points, both ends included.
/// The last point is returned unchanged.
pub fn npoints_between(
    lon1: f64,
    lat1: f64,
    depth1: f64,
    lon2: f64,
    lat2: f64,
    depth2: f64,
    npoints: usize,
) -> Vec<[f64; 3]> {
    let hdist = geodetic_distance(lon1, lat1, lon2, lat2);
    let vdist = depth2 - depth1;
    let mut points = npoints_towards(
        lon1,
        lat1,
        depth1,
        azimuth(lon1, lat1, lon2, lat2),
        hdist,
        vdist,
        npoints,
    );
    if npoints >= 2 {
        if let Some(last) = points.last_mut() {
            *last = [lon2, lat2, depth2];
        }
    }
    points
}

/// Points between two points spaced as close to `length` km as an integer
/// number of intervals allows. The second point itself is not pinned: the
/// last point lands on it only up to floating error.
///
/// Returns only the first point when the distance is less than half of
/// `length`. `length` must be positive.
pub fn intervals_between(
    lon1: f64,
    lat1: f64,
    depth1: f64,
    lon2: f64,
    lat2: f64,
    depth2: f64,
    length: f64,
) -> Vec<[f64; 3]> {
    let hdist = geodetic_distance(lon1, lat1, lon2, lat2);
    let vdist = depth2 - depth1;
    // Rounded so that pairs of points the same distance apart always get the
    // same number of intervals despite floating noise.
    let total_distance = round_to(hdist.hypot(vdist), 7);
    let num_intervals = (total_distance / length).round_ties_even();
    if num_intervals < 1.0 {
        return vec![[lon1, lat1, depth1]];
    }
    let dist_factor = (length * num_intervals) / total_distance;
    npoints_towards(
        lon1,
        lat1,
        depth1,
        azimuth(lon1, lat1, lon2, lat2),
        hdist * dist_factor,
        vdist * dist_factor,
        num_intervals as usize + 1,
    )
}

/// Index of and distance to the point of the first collection closest to
/// the given point, depth included.
pub fn min_idx_dst(
    lons: &[f64],
    lats: &[f64],
    depths: &[f64],
    plon: f64,
    plat: f64,
    pdepth: f64,
) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, ((&lon, &lat), &depth)) in lons.iter().zip(lats).zip(depths).enumerate() {
        let hdist = geodetic_distance(lon, lat, plon, plat);
        let vdist = depth - pdepth;
        let sq = hdist * hdist + vdist * vdist;
        if sq < best.1 {
            best = (i, sq);
        }
    }
    (best.0, best.1.sqrt())
}

/// Smallest surface distance from the given point to any point of the
/// collection. Depths are ignored.
pub fn min_geodetic_distance(lons: &[f64], lats: &[f64], plon: f64, plat: f64) -> f64 {
    lons.iter()
        .zip(lats)
        .map(|(&lon, &lat)| geodetic_distance(lon, lat, plon, plat))
        .fold(f64::INFINITY, f64::min)
}

/// Round half to even at `decimals` places, matching the reference
/// implementation's interval counting.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
