//! 地理编码服务 - 业务能力层
//!
//! 地址 → 坐标。服务失败（网络错误、无匹配）一律降级为 `None`，不向上抛错，不重试。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Coordinate;

/// 地理编码能力
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// 解析地址坐标，每次调用只请求一次服务
    async fn resolve(&self, address: &str) -> Option<Coordinate>;
}

/// Nominatim `/search` 返回的单条结果
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// 基于 Nominatim 的地理编码
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// 创建新的地理编码服务
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.geocoder_user_agent.clone())
            .timeout(Duration::from_secs(config.wait_timeout_secs.max(1)))
            .build()
            .unwrap_or_else(|e| {
                warn!("创建 HTTP 客户端失败，使用默认客户端: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: config.geocoder_url.trim_end_matches('/').to_string(),
        }
    }

    async fn search(&self, address: &str) -> Result<Vec<NominatimPlace>, reqwest::Error> {
        let url = format!("{}/search", self.base_url);
        self.client
            .get(url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<NominatimPlace>>()
            .await
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Option<Coordinate> {
        debug!("地理编码: {}", address);
        match self.search(address).await {
            Ok(places) => {
                let coordinate = places.first().and_then(place_to_coordinate);
                if coordinate.is_none() {
                    warn!("地理编码无匹配结果: {}", address);
                }
                coordinate
            }
            Err(e) => {
                warn!("地理编码失败 {}: {}", address, e);
                None
            }
        }
    }
}

fn place_to_coordinate(place: &NominatimPlace) -> Option<Coordinate> {
    let lat = place.lat.trim().parse().ok()?;
    let lng = place.lon.trim().parse().ok()?;
    Coordinate::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder_for(server: &MockServer) -> NominatimGeocoder {
        let config = Config {
            geocoder_url: server.uri(),
            ..Config::default()
        };
        NominatimGeocoder::new(&config)
    }

    #[tokio::test]
    async fn test_resolve_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "4116 Tipperary Place, Charlotte NC 28215"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": "35.2500", "lon": "-80.7500", "display_name": "4116, Tipperary Place" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let coordinate = geocoder_for(&server)
            .resolve("4116 Tipperary Place, Charlotte NC 28215")
            .await;
        assert_eq!(coordinate, Coordinate::new(35.25, -80.75));
    }

    #[tokio::test]
    async fn test_no_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("nowhere").await.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("4116 Tipperary Place").await.is_none());
    }

    #[test]
    fn test_place_to_coordinate_rejects_garbage() {
        let place = NominatimPlace {
            lat: "abc".to_string(),
            lon: "-80.75".to_string(),
        };
        assert!(place_to_coordinate(&place).is_none());

        let place = NominatimPlace {
            lat: "95.0".to_string(),
            lon: "-80.75".to_string(),
        };
        assert!(place_to_coordinate(&place).is_none());
    }
}
