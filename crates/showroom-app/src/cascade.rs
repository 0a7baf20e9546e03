// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AttributeDescriptor, AttributeKind, SelectionEntry, Vehicle};

/// Active constraints accumulated while replaying the selection log.
#[derive(Debug, Clone, Copy, Default)]
struct ConstraintSet<'a> {
    kind: Option<&'a str>,
    brand: Option<&'a str>,
    color: Option<&'a str>,
}

impl<'a> ConstraintSet<'a> {
    fn get(&self, attribute: AttributeKind) -> Option<&'a str> {
        match attribute {
            AttributeKind::Type => self.kind,
            AttributeKind::Brand => self.brand,
            AttributeKind::Color => self.color,
        }
    }

    fn set(&mut self, attribute: AttributeKind, value: &'a str) {
        match attribute {
            AttributeKind::Type => self.kind = Some(value),
            AttributeKind::Brand => self.brand = Some(value),
            AttributeKind::Color => self.color = Some(value),
        }
    }

    fn matches(&self, vehicle: &Vehicle) -> bool {
        AttributeKind::ALL.iter().all(|attribute| {
            self.get(*attribute)
                .is_none_or(|value| vehicle.matches(*attribute, value))
        })
    }
}

/// Unique values of one attribute over the vehicles satisfying every active
/// constraint, deduplicated in first-seen order. Color values set-flatten:
/// a vehicle contributes each color it is available in.
fn unique_values(
    vehicles: &[Vehicle],
    constraints: &ConstraintSet<'_>,
    attribute: AttributeKind,
) -> Vec<String> {
    let mut values = Vec::new();
    for vehicle in vehicles {
        if !constraints.matches(vehicle) {
            continue;
        }
        match attribute {
            AttributeKind::Type => push_unique(&mut values, &vehicle.kind),
            AttributeKind::Brand => push_unique(&mut values, &vehicle.brand),
            AttributeKind::Color => {
                for color in &vehicle.colors {
                    push_unique(&mut values, color);
                }
            }
        }
    }
    values
}

fn push_unique(values: &mut Vec<String>, candidate: &str) {
    if !values.iter().any(|value| value == candidate) {
        values.push(candidate.to_owned());
    }
}

/// Computes the option set and retained selection for each of the three
/// attributes, in fixed Type/Brand/Color output order.
///
/// The selection log is replayed in the order the user made the choices:
/// each attribute's option list is derived from the constraints accumulated
/// *before* its own entry, so a selection never filters its own list.
/// Attributes the user has not touched get their list from the full
/// constraint set at the end.
pub fn compute_attribute_options(
    vehicles: &[Vehicle],
    selections: &[SelectionEntry],
) -> Vec<AttributeDescriptor> {
    let mut constraints = ConstraintSet::default();
    let mut computed: [Option<Vec<String>>; 3] = [None, None, None];

    for entry in selections {
        let slot = slot_of(entry.attribute);
        computed[slot] = Some(unique_values(vehicles, &constraints, entry.attribute));
        constraints.set(entry.attribute, &entry.value);
    }

    for (slot, attribute) in AttributeKind::ALL.iter().enumerate() {
        if computed[slot].is_none() {
            computed[slot] = Some(unique_values(vehicles, &constraints, *attribute));
        }
    }

    AttributeKind::ALL
        .iter()
        .zip(computed)
        .map(|(attribute, values)| AttributeDescriptor {
            attribute: *attribute,
            label: attribute.label(),
            available_values: values.unwrap_or_default(),
            selected_value: constraints.get(*attribute).map(str::to_owned),
        })
        .collect()
}

/// Vehicles satisfying every current selection, in original list order.
pub fn matching_vehicles<'a>(
    vehicles: &'a [Vehicle],
    selections: &[SelectionEntry],
) -> Vec<&'a Vehicle> {
    let mut constraints = ConstraintSet::default();
    for entry in selections {
        constraints.set(entry.attribute, &entry.value);
    }
    vehicles
        .iter()
        .filter(|vehicle| constraints.matches(vehicle))
        .collect()
}

fn slot_of(attribute: AttributeKind) -> usize {
    AttributeKind::ALL
        .iter()
        .position(|candidate| *candidate == attribute)
        .unwrap_or(0)
}
