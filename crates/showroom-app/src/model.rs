// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// The three selectable vehicle dimensions, in their fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Type,
    Brand,
    Color,
}

impl AttributeKind {
    pub const ALL: [Self; 3] = [Self::Type, Self::Brand, Self::Color];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Brand => "brand",
            Self::Color => "color",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "type" => Some(Self::Type),
            "brand" => Some(Self::Brand),
            "color" => Some(Self::Color),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "Vehicle",
            Self::Brand => "Brand",
            Self::Color => "Color",
        }
    }
}

/// One vehicle record as delivered by a catalog source. Immutable for the
/// lifetime of a fetch cycle; the store replaces the whole list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub kind: String,
    pub brand: String,
    pub colors: Vec<String>,
    pub image_url: String,
}

impl Vehicle {
    /// Whether this vehicle satisfies one attribute constraint. Type and
    /// brand match by equality; a color constraint matches by membership in
    /// the vehicle's color set.
    pub fn matches(&self, attribute: AttributeKind, value: &str) -> bool {
        match attribute {
            AttributeKind::Type => self.kind == value,
            AttributeKind::Brand => self.brand == value,
            AttributeKind::Color => self.colors.iter().any(|color| color == value),
        }
    }
}

/// One user choice in the selection log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub attribute: AttributeKind,
    pub value: String,
}

impl SelectionEntry {
    pub fn new(attribute: AttributeKind, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }
}

/// Derived per-attribute view the presentation layer renders a select box
/// from. Recomputed on every vehicle-list or selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub attribute: AttributeKind,
    pub label: &'static str,
    pub available_values: Vec<String>,
    pub selected_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{AttributeKind, Vehicle};

    fn vehicle() -> Vehicle {
        Vehicle {
            id: 1,
            kind: "car".to_owned(),
            brand: "Bugatti Veyron".to_owned(),
            colors: vec!["red".to_owned(), "black".to_owned()],
            image_url: "https://images.example.com/bugatti-veyron.png".to_owned(),
        }
    }

    #[test]
    fn attribute_kind_round_trips_through_strings() {
        for attribute in AttributeKind::ALL {
            assert_eq!(AttributeKind::parse(attribute.as_str()), Some(attribute));
        }
        assert_eq!(AttributeKind::parse("wheels"), None);
    }

    #[test]
    fn attribute_labels_match_display_names() {
        assert_eq!(AttributeKind::Type.label(), "Vehicle");
        assert_eq!(AttributeKind::Brand.label(), "Brand");
        assert_eq!(AttributeKind::Color.label(), "Color");
    }

    #[test]
    fn type_and_brand_match_by_equality() {
        let vehicle = vehicle();
        assert!(vehicle.matches(AttributeKind::Type, "car"));
        assert!(!vehicle.matches(AttributeKind::Type, "train"));
        assert!(vehicle.matches(AttributeKind::Brand, "Bugatti Veyron"));
        assert!(!vehicle.matches(AttributeKind::Brand, "Ferrari F40"));
    }

    #[test]
    fn color_matches_by_set_membership() {
        let vehicle = vehicle();
        assert!(vehicle.matches(AttributeKind::Color, "black"));
        assert!(!vehicle.matches(AttributeKind::Color, "green"));
    }
}
