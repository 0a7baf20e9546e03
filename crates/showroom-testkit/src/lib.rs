// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use showroom_app::{FetchError, Vehicle, VehicleSource};
use std::collections::VecDeque;

/// Unique vehicle types in the sample fleet, in first-seen order.
pub const SAMPLE_TYPES: [&str; 3] = ["car", "airplane", "train"];

/// Unique brands in the sample fleet, in first-seen order.
pub const SAMPLE_BRANDS: [&str; 12] = [
    "Bugatti Veyron",
    "Boeing 787 Dreamliner",
    "USRA 0-6-6",
    "Canadair North Star",
    "Airbus A400M Atlas",
    "Bloch MB.131",
    "Prairie 2-6-2",
    "EMD GP40",
    "Amer 4-4-0",
    "Ferrari F40",
    "Lamborghini Huracán",
    "Porsche Carrera GT",
];

/// Unique colors in the sample fleet, in first-seen order.
pub const SAMPLE_COLORS: [&str; 8] = [
    "red", "black", "white", "green", "yellow", "blue", "brown", "grey",
];

/// The canonical twelve-vehicle fleet shared by tests across the workspace.
pub fn sample_vehicles() -> Vec<Vehicle> {
    showroom_catalog::sample_fleet()
}

/// The sample fleet in its wire form (`type`/`img` field names), for
/// feeding catalog decoders in tests.
pub fn sample_vehicles_json() -> String {
    let records = sample_vehicles()
        .into_iter()
        .map(|vehicle| {
            serde_json::json!({
                "id": vehicle.id,
                "type": vehicle.kind,
                "brand": vehicle.brand,
                "colors": vehicle.colors,
                "img": vehicle.image_url,
            })
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(records).to_string()
}

/// A vehicle source that replays scripted fetch outcomes in order. Runs dry
/// into a request failure, so an over-fetching test fails loudly instead of
/// hanging on fabricated data.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    outcomes: VecDeque<Result<Vec<Vehicle>, FetchError>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(mut self, vehicles: Vec<Vehicle>) -> Self {
        self.outcomes.push_back(Ok(vehicles));
        self
    }

    pub fn push_err(mut self, error: FetchError) -> Self {
        self.outcomes.push_back(Err(error));
        self
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl VehicleSource for ScriptedSource {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError> {
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::request("scripted source exhausted")))
    }
}
