//! Topology model and change notifications.
//!
//! The simulated infrastructure is described by a set of resources held in a
//! [`ResourceModel`]. Changes to the topology reach the cost observer as
//! [`ModelEvent`] values: a typed event channel consumed synchronously on the
//! simulation timeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::probe::MetricKind;
use crate::types::{ResourceId, SimTime};

/// The value of a single resource attribute field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A numeric field such as `amount` or `interval`
    Number(f64),
    /// A textual field such as `unit`
    Text(String),
}

impl FieldValue {
    /// Returns the numeric value, if this is a number field.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Returns the textual value, if this is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s.as_str()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// A change notification from the topology model.
///
/// Structural changes unrelated to resource containers (link or connection
/// rewiring) arrive as [`ModelEvent::StructuralChange`] and are ignored by
/// the observer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModelEvent {
    /// A resource was added to the topology.
    ResourceAdded { id: ResourceId },
    /// A resource was removed from the topology.
    ResourceRemoved { id: ResourceId },
    /// A single attribute field was set on a resource.
    FieldSet {
        id: ResourceId,
        field: String,
        value: FieldValue,
    },
    /// Any other structural change; carries a short description for logging.
    StructuralChange { description: String },
}

impl ModelEvent {
    /// Creates a `ResourceAdded` event.
    pub fn added(id: impl Into<ResourceId>) -> Self {
        ModelEvent::ResourceAdded { id: id.into() }
    }

    /// Creates a `ResourceRemoved` event.
    pub fn removed(id: impl Into<ResourceId>) -> Self {
        ModelEvent::ResourceRemoved { id: id.into() }
    }

    /// Creates a `FieldSet` event.
    pub fn field_set(
        id: impl Into<ResourceId>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        ModelEvent::FieldSet {
            id: id.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a `StructuralChange` event.
    pub fn structural(description: impl Into<String>) -> Self {
        ModelEvent::StructuralChange {
            description: description.into(),
        }
    }
}

/// A simulated resource container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier of this resource
    pub id: ResourceId,
    /// Whether the pricing marker is applied to this resource
    pub priced: bool,
    /// Attribute fields set on this resource
    pub fields: HashMap<String, FieldValue>,
}

impl Resource {
    /// Creates a new unpriced resource with no fields.
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            priced: false,
            fields: HashMap::new(),
        }
    }

    /// Marks the resource as carrying the pricing marker.
    pub fn priced(mut self) -> Self {
        self.priced = true;
        self
    }

    /// Sets an attribute field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Environment-level configuration for periodic aggregate cost reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Interval between report firings, in simulation seconds
    pub interval: SimTime,
    /// The metric kinds to report; one trigger is created per kind
    pub metrics: Vec<MetricKind>,
    /// Name of the measuring point attached to emitted samples
    #[serde(default = "default_measuring_point")]
    pub measuring_point: String,
}

fn default_measuring_point() -> String {
    "resource-environment".to_string()
}

impl ReportConfig {
    /// Creates a report configuration with the default measuring point.
    pub fn new(interval: SimTime, metrics: Vec<MetricKind>) -> Self {
        Self {
            interval,
            metrics,
            measuring_point: default_measuring_point(),
        }
    }
}

/// In-memory store of the current topology.
///
/// Resources are kept in insertion order so that the observer's initial scan
/// is deterministic across runs.
#[derive(Debug, Default)]
pub struct ResourceModel {
    resources: Vec<Resource>,
    index: HashMap<ResourceId, usize>,
    report: Option<ReportConfig>,
}

impl ResourceModel {
    /// Creates a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource, replacing any existing resource with the same id.
    pub fn add_resource(&mut self, resource: Resource) {
        match self.index.get(&resource.id) {
            Some(&i) => self.resources[i] = resource,
            None => {
                self.index.insert(resource.id.clone(), self.resources.len());
                self.resources.push(resource);
            }
        }
    }

    /// Removes a resource by id.
    pub fn remove_resource(&mut self, id: &str) -> Option<Resource> {
        let i = self.index.remove(id)?;
        let removed = self.resources.remove(i);
        // Positions after the removed entry shift down by one.
        for (pos, resource) in self.resources.iter().enumerate().skip(i) {
            self.index.insert(resource.id.clone(), pos);
        }
        Some(removed)
    }

    /// Returns a resource by id.
    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.index.get(id).map(|&i| &self.resources[i])
    }

    /// Returns true if the resource exists and carries the pricing marker.
    pub fn has_pricing_marker(&self, id: &str) -> bool {
        self.get(id).map(|r| r.priced).unwrap_or(false)
    }

    /// Applies or removes the pricing marker on a resource.
    pub fn set_priced(&mut self, id: &str, priced: bool) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.resources[i].priced = priced;
                true
            }
            None => false,
        }
    }

    /// Sets an attribute field on a resource. Returns false if the resource
    /// does not exist.
    pub fn set_field(&mut self, id: &str, field: impl Into<String>, value: impl Into<FieldValue>) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.resources[i].fields.insert(field.into(), value.into());
                true
            }
            None => false,
        }
    }

    /// Returns an attribute field of a resource, or `None` if absent.
    pub fn field(&self, id: &str, name: &str) -> Option<&FieldValue> {
        self.get(id).and_then(|r| r.fields.get(name))
    }

    /// Iterates over all resources in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Returns the number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the model holds no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Returns the environment-level report configuration, if any.
    pub fn report(&self) -> Option<&ReportConfig> {
        self.report.as_ref()
    }

    /// Sets the environment-level report configuration.
    pub fn set_report(&mut self, report: ReportConfig) {
        self.report = Some(report);
    }

    /// Mutates the model according to a change event.
    ///
    /// The embedding simulation applies each event to the model before
    /// handing it to the observer, so that marker and field queries reflect
    /// the post-change state.
    pub fn apply(&mut self, event: &ModelEvent) {
        match event {
            ModelEvent::ResourceAdded { id } => {
                if !self.index.contains_key(id) {
                    self.add_resource(Resource::new(id.clone()));
                }
            }
            ModelEvent::ResourceRemoved { id } => {
                self.remove_resource(id);
            }
            ModelEvent::FieldSet { id, field, value } => {
                self.set_field(id, field.clone(), value.clone());
            }
            ModelEvent::StructuralChange { .. } => {}
        }
    }
}
