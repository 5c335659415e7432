use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{CandidateRoute, PlaceCandidate, Provider, RouteStep};
use crate::{
    config::Config,
    entities::Coordinate,
    error::{invalid_input_error, upstream_error, Error},
    navigation::polyline,
};

/// Client for the AMap (Gaode) web service API.
pub struct AMap {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Clone, Debug, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    info: String,
    pois: Option<Vec<Poi>>,
    route: Option<Route>,
}

#[derive(Clone, Debug, Deserialize)]
struct Poi {
    name: String,
    #[serde(default)]
    address: Value,
    #[serde(default)]
    location: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct Route {
    #[serde(default)]
    paths: Vec<Path>,
}

#[derive(Clone, Debug, Deserialize)]
struct Path {
    #[serde(default)]
    distance: Value,
    #[serde(default)]
    duration: Value,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
struct Step {
    #[serde(default)]
    polyline: Value,
}

impl AMap {
    pub fn new(api_base: String, api_key: String, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(
            config.amap_api_base.clone(),
            config.amap_api_key.clone(),
            config.request_timeout,
        )
    }

    fn url(&self, path: &str) -> String {
        if self.api_base.starts_with("http://") || self.api_base.starts_with("https://") {
            format!("{}{}", self.api_base.trim_end_matches('/'), path)
        } else {
            format!("https://{}{}", self.api_base.trim_end_matches('/'), path)
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, Error> {
        let res = self
            .client
            .get(self.url(path))
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response = res.json().await?;

        if data.status != "1" {
            tracing::warn!(info = %data.info, "amap rejected request");
            return Err(upstream_error());
        }

        Ok(data)
    }
}

#[async_trait]
impl Provider for AMap {
    #[tracing::instrument(skip(self))]
    async fn search_place(
        &self,
        keyword: &str,
        city: Option<&str>,
    ) -> Result<Vec<PlaceCandidate>, Error> {
        let mut query = vec![("keywords", keyword.to_string()), ("offset", "1".to_string())];
        if let Some(city) = city {
            query.push(("city", city.to_string()));
        }

        let data = self.get("/v3/place/text", &query).await?;

        place_candidates(data)
    }

    #[tracing::instrument(skip(self))]
    async fn walking_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<CandidateRoute>, Error> {
        let query = [
            ("origin", String::from(origin)),
            ("destination", String::from(destination)),
        ];

        let data = self.get("/v3/direction/walking", &query).await?;

        Ok(candidate_routes(data))
    }
}

/// Only the first POI is considered. A first POI without a usable location
/// is a malformed response, not an empty one.
fn place_candidates(data: Response) -> Result<Vec<PlaceCandidate>, Error> {
    let poi = match data.pois.unwrap_or_default().into_iter().next() {
        Some(poi) => poi,
        None => return Ok(Vec::new()),
    };

    let coordinate = polyline::parse_pair(text(&poi.location)).ok_or_else(|| {
        tracing::warn!(name = %poi.name, location = %poi.location, "amap place without a usable location");
        upstream_error()
    })?;

    Ok(vec![PlaceCandidate {
        address: text(&poi.address).to_string(),
        name: poi.name,
        coordinate,
    }])
}

fn candidate_routes(data: Response) -> Vec<CandidateRoute> {
    data.route
        .map(|route| route.paths)
        .unwrap_or_default()
        .into_iter()
        .map(|path| CandidateRoute {
            steps: path
                .steps
                .iter()
                .map(|step| RouteStep {
                    polyline: text(&step.polyline).to_string(),
                })
                .collect(),
            distance_meters: number(&path.distance),
            duration_seconds: number(&path.duration),
        })
        .collect()
}

// AMap sends `[]` in place of missing strings.
fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
