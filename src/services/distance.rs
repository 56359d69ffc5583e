//! 距离过滤 - 业务能力层
//!
//! WGS84 椭球上的 Vincenty 反算；两点接近对跖点不收敛时退回球面 haversine。

use crate::models::Coordinate;

/// WGS84 长半轴（米）
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 扁率
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 短半轴（米）
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// 平均地球半径（米），haversine 兜底用
const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;
const METERS_PER_MILE: f64 = 1_609.344;
const MAX_ITERATIONS: usize = 200;

/// 两点间的大地线距离（英里）
///
/// 结果与参数顺序无关。
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let (p, q) = if (a.lat, a.lng) <= (b.lat, b.lng) {
        (a, b)
    } else {
        (b, a)
    };
    let meters = vincenty_meters(p, q).unwrap_or_else(|| haversine_meters(p, q));
    meters / METERS_PER_MILE
}

/// 两点是否在半径内；任一坐标缺失时返回 `false`
pub fn within_radius(a: Option<Coordinate>, b: Option<Coordinate>, radius_miles: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => distance_miles(a, b) <= radius_miles,
        _ => false,
    }
}

fn vincenty_meters(p: Coordinate, q: Coordinate) -> Option<f64> {
    let l = (q.lng - p.lng).to_radians();
    let u1 = ((1.0 - WGS84_F) * p.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * q.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sq_sigma = (cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2);
        if sin_sq_sigma == 0.0 {
            // 重合点
            return Some(0.0);
        }
        let sin_sigma = sin_sq_sigma.sqrt();
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // 赤道线上 cos²α = 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - lambda_prev).abs() < 1e-12 {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(WGS84_B * big_a * (sigma - delta_sigma));
        }
    }
    None
}

fn haversine_meters(p: Coordinate, q: Coordinate) -> f64 {
    let d_lat = (q.lat - p.lat).to_radians();
    let d_lng = (q.lng - p.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + p.lat.to_radians().cos() * q.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS * h.sqrt().min(1.0).asin()
}
