// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use showroom_app::{FetchError, FieldViolation, Vehicle, VehicleSource};
use std::thread;
use std::time::Duration;

/// Wire shape of one catalog record. Strict: unknown fields fail the
/// decode, matching the catalog contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawVehicle {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub brand: String,
    pub colors: Vec<String>,
    pub img: String,
}

/// Validates every raw record against the vehicle schema: non-empty type,
/// brand and colors, each color non-empty, image a well-formed URL. All
/// violations are collected; any violation fails the whole fetch.
pub fn validate_vehicles(raw: Vec<RawVehicle>) -> Result<Vec<Vehicle>, FetchError> {
    let mut violations = Vec::new();
    let mut vehicles = Vec::with_capacity(raw.len());

    for (record, raw) in raw.into_iter().enumerate() {
        check_record(record, &raw, &mut violations);
        vehicles.push(Vehicle {
            id: raw.id,
            kind: raw.kind,
            brand: raw.brand,
            colors: raw.colors,
            image_url: raw.img,
        });
    }

    if !violations.is_empty() {
        return Err(FetchError::Schema { violations });
    }
    Ok(vehicles)
}

fn check_record(record: usize, raw: &RawVehicle, violations: &mut Vec<FieldViolation>) {
    if raw.kind.is_empty() {
        violations.push(violation(record, "type", "must not be empty"));
    }
    if raw.brand.is_empty() {
        violations.push(violation(record, "brand", "must not be empty"));
    }
    if raw.colors.is_empty() {
        violations.push(violation(record, "colors", "must not be empty"));
    }
    for color in &raw.colors {
        if color.is_empty() {
            violations.push(violation(record, "colors", "contains an empty color"));
            break;
        }
    }
    if url::Url::parse(&raw.img).is_err() {
        violations.push(violation(record, "img", "not a valid URL"));
    }
}

fn violation(record: usize, field: &'static str, problem: &str) -> FieldViolation {
    FieldViolation {
        record,
        field,
        problem: problem.to_owned(),
    }
}

/// Decodes a catalog response body into validated vehicles. A body that is
/// not a JSON array is a request failure; records that decode but break
/// the schema, or fail to decode individually, become schema violations.
pub fn decode_vehicles(body: &str) -> Result<Vec<Vehicle>, FetchError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|error| FetchError::request(format!("decode catalog response -- {error}")))?;

    let mut violations = Vec::new();
    let mut raw = Vec::with_capacity(values.len());
    for (record, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawVehicle>(value) {
            Ok(decoded) => raw.push(decoded),
            Err(error) => violations.push(FieldViolation {
                record,
                field: "record",
                problem: error.to_string(),
            }),
        }
    }

    if !violations.is_empty() {
        return Err(FetchError::Schema { violations });
    }
    validate_vehicles(raw)
}

/// Catalog source backed by an HTTP endpoint serving `GET {base}/vehicles`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    http: HttpClient,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("catalog.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl VehicleSource for HttpCatalog {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError> {
        let response = self
            .http
            .get(format!("{}/vehicles", self.base_url))
            .send()
            .map_err(|error| {
                FetchError::request(format!(
                    "cannot reach {} -- check that the catalog is running ({error})",
                    self.base_url
                ))
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| FetchError::request(format!("read catalog response -- {error}")))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }

        decode_vehicles(&body)
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> FetchError {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return FetchError::request(format!("catalog error ({}): {}", status.as_u16(), error));
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return FetchError::request(format!(
            "catalog error ({}): {}",
            status.as_u16(),
            body.trim()
        ));
    }

    FetchError::request(format!("catalog returned {}", status.as_u16()))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_millis(1000);

/// One synthetic failure per this many fetches, on average.
pub const DEFAULT_FAILURE_ODDS: u32 = 20;

/// In-process catalog source simulating the real fetch: configurable
/// latency and a 1-in-N synthetic failure rate.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    vehicles: Vec<Vehicle>,
    latency: Duration,
    failure_odds: u32,
    rng: StdRng,
}

impl MockCatalog {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles,
            latency: DEFAULT_MOCK_LATENCY,
            failure_odds: DEFAULT_FAILURE_ODDS,
            rng: StdRng::from_entropy(),
        }
    }

    /// The built-in demo fleet.
    pub fn sample() -> Self {
        Self::new(sample_fleet())
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 1-in-N odds of a synthetic failure per fetch; 0 disables failures.
    pub fn failure_odds(mut self, odds: u32) -> Self {
        self.failure_odds = odds;
        self
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl VehicleSource for MockCatalog {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.failure_odds > 0 && self.rng.gen_range(0..self.failure_odds) == 0 {
            return Err(FetchError::request("fetch data error"));
        }
        Ok(self.vehicles.clone())
    }
}

/// The demo fleet: twelve vehicles across three types, eight colors.
pub fn sample_fleet() -> Vec<Vehicle> {
    fn vehicle(id: i64, kind: &str, brand: &str, colors: &[&str], slug: &str) -> Vehicle {
        Vehicle {
            id,
            kind: kind.to_owned(),
            brand: brand.to_owned(),
            colors: colors.iter().map(|color| (*color).to_owned()).collect(),
            image_url: format!("https://images.example.com/vehicles/{slug}.png"),
        }
    }

    vec![
        vehicle(1, "car", "Bugatti Veyron", &["red", "black"], "bugatti-veyron"),
        vehicle(
            2,
            "airplane",
            "Boeing 787 Dreamliner",
            &["red", "white"],
            "boeing-787",
        ),
        vehicle(
            3,
            "train",
            "USRA 0-6-6",
            &["green", "white", "black"],
            "usra-0-6-6",
        ),
        vehicle(
            4,
            "airplane",
            "Canadair North Star",
            &["white", "yellow"],
            "canadair-north-star",
        ),
        vehicle(
            5,
            "airplane",
            "Airbus A400M Atlas",
            &["blue", "white"],
            "airbus-a400m",
        ),
        vehicle(6, "airplane", "Bloch MB.131", &["brown", "green"], "bloch-mb-131"),
        vehicle(7, "train", "Prairie 2-6-2", &["black", "grey"], "prairie-2-6-2"),
        vehicle(8, "train", "EMD GP40", &["blue", "black"], "emd-gp40"),
        vehicle(9, "train", "Amer 4-4-0", &["grey", "red"], "amer-4-4-0"),
        vehicle(10, "car", "Ferrari F40", &["red", "yellow"], "ferrari-f40"),
        vehicle(
            11,
            "car",
            "Lamborghini Huracán",
            &["white", "green"],
            "lamborghini-huracan",
        ),
        vehicle(
            12,
            "car",
            "Porsche Carrera GT",
            &["black", "red"],
            "porsche-carrera-gt",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        MockCatalog, RawVehicle, decode_vehicles, sample_fleet, validate_vehicles,
    };
    use showroom_app::{FetchError, VehicleSource};
    use std::time::Duration;

    fn raw(id: i64, kind: &str, brand: &str, colors: &[&str], img: &str) -> RawVehicle {
        RawVehicle {
            id,
            kind: kind.to_owned(),
            brand: brand.to_owned(),
            colors: colors.iter().map(|color| (*color).to_owned()).collect(),
            img: img.to_owned(),
        }
    }

    #[test]
    fn valid_records_pass_validation() {
        let vehicles = validate_vehicles(vec![raw(
            1,
            "car",
            "Bugatti Veyron",
            &["red"],
            "https://images.example.com/bugatti.png",
        )])
        .expect("valid record should pass");
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].kind, "car");
        assert_eq!(vehicles[0].image_url, "https://images.example.com/bugatti.png");
    }

    #[test]
    fn validation_collects_every_violation() {
        let error = validate_vehicles(vec![
            raw(1, "", "Bugatti Veyron", &["red"], "https://images.example.com/a.png"),
            raw(2, "car", "", &[], "not a url"),
        ])
        .expect_err("invalid records should fail");

        let violations = error.violations();
        assert_eq!(violations.len(), 4);
        assert_eq!(violations[0].record, 0);
        assert_eq!(violations[0].field, "type");
        let fields = violations
            .iter()
            .map(|violation| violation.field)
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["type", "brand", "colors", "img"]);
    }

    #[test]
    fn empty_color_entries_are_rejected() {
        let error = validate_vehicles(vec![raw(
            1,
            "car",
            "Bugatti Veyron",
            &["red", ""],
            "https://images.example.com/a.png",
        )])
        .expect_err("empty color should fail");
        assert_eq!(error.violations().len(), 1);
        assert_eq!(error.violations()[0].field, "colors");
    }

    #[test]
    fn decode_rejects_unknown_fields() {
        let body = r#"[{"id":1,"type":"car","brand":"Bugatti Veyron","colors":["red"],"img":"https://images.example.com/a.png","price":100}]"#;
        let error = decode_vehicles(body).expect_err("unknown field should fail");
        match error {
            FetchError::Schema { violations } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].problem.contains("price"));
            }
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    fn decode_rejects_non_array_bodies_as_request_failures() {
        let error = decode_vehicles(r#"{"vehicles":[]}"#).expect_err("object body should fail");
        assert!(matches!(error, FetchError::Request { .. }));
        assert!(error.to_string().contains("decode catalog response"));
    }

    #[test]
    fn decode_accepts_an_empty_array() {
        let vehicles = decode_vehicles("[]").expect("empty array is a valid response");
        assert!(vehicles.is_empty());
    }

    #[test]
    fn sample_fleet_passes_its_own_schema() {
        let fleet = sample_fleet();
        assert_eq!(fleet.len(), 12);
        for vehicle in &fleet {
            assert!(!vehicle.kind.is_empty());
            assert!(!vehicle.brand.is_empty());
            assert!(!vehicle.colors.is_empty());
            assert!(url::Url::parse(&vehicle.image_url).is_ok());
        }
    }

    #[test]
    fn mock_catalog_with_zero_odds_never_fails() {
        let mut catalog = MockCatalog::sample()
            .latency(Duration::ZERO)
            .failure_odds(0);
        for _ in 0..50 {
            let vehicles = catalog.fetch_vehicles().expect("failures disabled");
            assert_eq!(vehicles.len(), 12);
        }
    }

    #[test]
    fn mock_catalog_with_certain_odds_always_fails() {
        let mut catalog = MockCatalog::sample()
            .latency(Duration::ZERO)
            .failure_odds(1)
            .seeded(7);
        let error = catalog.fetch_vehicles().expect_err("odds of 1 always fail");
        assert_eq!(error.to_string(), "fetch data error");
    }

    #[test]
    fn seeded_mock_catalogs_are_deterministic() {
        let run = |seed: u64| {
            let mut catalog = MockCatalog::sample()
                .latency(Duration::ZERO)
                .failure_odds(20)
                .seeded(seed);
            (0..40)
                .map(|_| catalog.fetch_vehicles().is_ok())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
