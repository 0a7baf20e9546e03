// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use showroom_app::{FetchError, Vehicle, VehicleSource};
use showroom_catalog::{HttpCatalog, MockCatalog};
use showroom_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;

/// The configured catalog backend.
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    Mock(MockCatalog),
    Http(HttpCatalog),
}

impl VehicleSource for CatalogBackend {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError> {
        match self {
            Self::Mock(catalog) => catalog.fetch_vehicles(),
            Self::Http(catalog) => catalog.fetch_vehicles(),
        }
    }
}

/// Bridges the TUI to the catalog. Fetches run on their own thread so the
/// UI keeps drawing while the catalog (or its simulated latency) responds.
pub struct CatalogRuntime {
    backend: CatalogBackend,
}

impl CatalogRuntime {
    pub fn new(backend: CatalogBackend) -> Self {
        Self { backend }
    }
}

impl showroom_tui::AppRuntime for CatalogRuntime {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError> {
        self.backend.fetch_vehicles()
    }

    fn spawn_fetch(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let mut backend = self.backend.clone();
        thread::spawn(move || {
            let result = backend.fetch_vehicles();
            let _ = tx.send(InternalEvent::FetchCompleted { request_id, result });
        });
        Ok(())
    }
}
