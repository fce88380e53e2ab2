// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::Location;

/// Names a measurement axis, e.g. ("objects", "count").
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ValueType {
    pub r#type: String,
    pub unit: String,
}

impl ValueType {
    pub fn new(r#type: &str, unit: &str) -> Self {
        Self {
            r#type: r#type.to_owned(),
            unit: unit.to_owned(),
        }
    }
}

/// A sample annotation. Only one of `str` and `num` is meaningful;
/// `num_unit` only goes with `num`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Label {
    pub key: String,
    pub str: String,
    pub num: i64,
    pub num_unit: String,
}

impl Label {
    pub fn str(key: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            str: value.to_owned(),
            ..Label::default()
        }
    }

    pub fn num(key: &str, num: i64, unit: &str) -> Self {
        Self {
            key: key.to_owned(),
            num,
            num_unit: unit.to_owned(),
            ..Label::default()
        }
    }
}

/// One measurement.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Sample {
    /// Leaf first: index 0 is the innermost frame.
    pub locations: Vec<Location>,
    /// One value per sample type of the profile.
    pub values: Vec<i64>,
    pub labels: Vec<Label>,
}

impl Sample {
    pub fn new(locations: Vec<Location>, values: Vec<i64>) -> Self {
        Self {
            locations,
            values,
            labels: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }
}
