// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{FetchError, InfoVariant, PopupDetails, Vehicle};

/// The catalog seam the store fetches through. Injected by the caller; the
/// store never knows whether records come from HTTP, a mock, or a test
/// script.
pub trait VehicleSource {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError>;
}

/// Reactive notifications emitted by store transitions, in the order the
/// transitions happened.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    LoadingChanged(bool),
    VehiclesLoaded { count: usize },
    FetchFailed(FetchError),
}

/// Holds the fetch status and the fetched record list for one fetch cycle.
///
/// Overlapping fetches are not deduplicated: whichever completion lands
/// last overwrites the stored outcome, and loading always clears on
/// completion regardless of which request finished.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleStore {
    loading: bool,
    error: Option<FetchError>,
    vehicles: Option<Vec<Vehicle>>,
    last_loaded_at: Option<OffsetDateTime>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// The fetched records; empty until a fetch has succeeded.
    pub fn vehicles(&self) -> &[Vehicle] {
        self.vehicles.as_deref().unwrap_or_default()
    }

    pub fn has_loaded(&self) -> bool {
        self.vehicles.is_some()
    }

    pub fn last_loaded_at(&self) -> Option<OffsetDateTime> {
        self.last_loaded_at
    }

    pub fn begin_fetch(&mut self) -> Vec<StoreEvent> {
        self.loading = true;
        vec![StoreEvent::LoadingChanged(true)]
    }

    /// Records a fetch outcome. Success stores the list and clears any
    /// prior error; failure stores the error and leaves previously fetched
    /// records in place. Loading clears on both paths.
    pub fn complete_fetch(
        &mut self,
        result: Result<Vec<Vehicle>, FetchError>,
        now: OffsetDateTime,
    ) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        match result {
            Ok(vehicles) => {
                let count = vehicles.len();
                self.vehicles = Some(vehicles);
                self.error = None;
                self.last_loaded_at = Some(now);
                events.push(StoreEvent::VehiclesLoaded { count });
            }
            Err(error) => {
                self.error = Some(error.clone());
                events.push(StoreEvent::FetchFailed(error));
            }
        }
        self.loading = false;
        events.push(StoreEvent::LoadingChanged(false));
        events
    }

    /// Runs one full fetch cycle against the injected source.
    pub fn fetch(
        &mut self,
        source: &mut dyn VehicleSource,
        now: OffsetDateTime,
    ) -> Vec<StoreEvent> {
        let mut events = self.begin_fetch();
        events.extend(self.complete_fetch(source.fetch_vehicles(), now));
        events
    }
}

/// Maps one store event to the popup it should raise, if any: an empty
/// successful fetch warns that no vehicles were found, a failed fetch
/// surfaces the error. Driven per completion event, so each finished fetch
/// raises at most one popup.
pub fn fetch_notification(event: &StoreEvent) -> Option<PopupDetails> {
    match event {
        StoreEvent::VehiclesLoaded { count: 0 } => Some(PopupDetails::Info {
            title: "Info".to_owned(),
            dismissible: true,
            variant: InfoVariant::Warning,
            description: "No vehicles found".to_owned(),
            confirm_label: "OK".to_owned(),
        }),
        StoreEvent::FetchFailed(error) => Some(PopupDetails::ApiError {
            title: "Error fetching vehicles data".to_owned(),
            dismissible: true,
            error: error.clone(),
            confirm_label: "OK".to_owned(),
        }),
        StoreEvent::VehiclesLoaded { .. } | StoreEvent::LoadingChanged(_) => None,
    }
}
