//! Attribute-completion detection.
//!
//! Cost attributes arrive as a stream of independent field-set notifications
//! in unspecified order. The [`CompletionDetector`] decides the instant a
//! resource's multi-field cost specification becomes fully specified: it
//! records every observed field per resource and, when the designated
//! *terminal* field is set, attempts to assemble a complete [`CostSpec`].
//!
//! The terminal field is configurable through [`CompletionPolicy`] rather
//! than hard-coded, so a change in the upstream field-emission order is a
//! one-line policy change instead of silent breakage.

use std::collections::HashMap;

use crate::error::{CostError, CostResult};
use crate::model::FieldValue;
use crate::spec::{CostSpec, FIELD_AMOUNT, FIELD_INTERVAL, FIELD_UNIT};
use crate::types::ResourceId;

/// The contract for declaring a cost specification complete.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionPolicy {
    /// Fields that must all be present for a complete specification
    pub required: Vec<String>,
    /// The field whose being-set means "specification now complete";
    /// must be one of the required fields
    pub terminal: String,
}

impl CompletionPolicy {
    /// Creates a policy, checking that the terminal field is required.
    pub fn new(
        required: impl IntoIterator<Item = impl Into<String>>,
        terminal: impl Into<String>,
    ) -> CostResult<Self> {
        let required: Vec<String> = required.into_iter().map(Into::into).collect();
        let terminal = terminal.into();
        if !required.contains(&terminal) {
            return Err(CostError::InvalidInput(format!(
                "terminal field '{terminal}' is not in the required field set"
            )));
        }
        Ok(Self { required, terminal })
    }
}

impl Default for CompletionPolicy {
    /// The upstream model emits `unit` last in a complete specification.
    fn default() -> Self {
        Self {
            required: vec![
                FIELD_AMOUNT.to_string(),
                FIELD_UNIT.to_string(),
                FIELD_INTERVAL.to_string(),
            ],
            terminal: FIELD_UNIT.to_string(),
        }
    }
}

/// Interprets partial field-set notifications per resource.
///
/// The caller is responsible for only feeding notifications of resources
/// that carry the pricing marker; unmarked resources never enter the
/// tracking set.
#[derive(Debug, Default)]
pub struct CompletionDetector {
    policy: CompletionPolicy,
    pending: HashMap<ResourceId, HashMap<String, FieldValue>>,
}

impl CompletionDetector {
    /// Creates a detector with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector with an explicit completion policy.
    pub fn with_policy(policy: CompletionPolicy) -> Self {
        Self {
            policy,
            pending: HashMap::new(),
        }
    }

    /// Returns the active completion policy.
    pub fn policy(&self) -> &CompletionPolicy {
        &self.policy
    }

    /// Records one field-set notification.
    ///
    /// Returns `Ok(None)` for any non-terminal field, even if every required
    /// field happens to be present already. When the terminal field is set,
    /// returns the completed `CostSpec`, or an error if a required field is
    /// missing (`Configuration`) or a present value is invalid
    /// (`InvalidInput`); in the error cases the resource is dropped from
    /// tracking and stays unpriced.
    pub fn observe(
        &mut self,
        id: &ResourceId,
        field: &str,
        value: FieldValue,
    ) -> CostResult<Option<CostSpec>> {
        let fields = self.pending.entry(id.clone()).or_default();
        fields.insert(field.to_string(), value);

        if field != self.policy.terminal {
            return Ok(None);
        }

        if let Some(missing) = self.policy.required.iter().find(|r| !fields.contains_key(*r)) {
            self.pending.remove(id);
            return Err(CostError::Configuration(format!(
                "resource {id} signalled a complete cost specification but field \
                 '{missing}' was never set"
            )));
        }

        match CostSpec::from_fields(fields) {
            Ok(spec) => Ok(Some(spec)),
            Err(err) => {
                self.pending.remove(id);
                Err(err)
            }
        }
    }

    /// Seeds the tracking set with fields already present on a resource.
    ///
    /// Used by the initial topology scan for marked resources whose
    /// specification is still incomplete: fields set before the observer
    /// subscribed will never re-arrive as notifications.
    pub fn seed(&mut self, id: &ResourceId, fields: &HashMap<String, FieldValue>) {
        self.pending
            .entry(id.clone())
            .or_default()
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Drops all tracking state for a resource. Returns false if the
    /// resource was not tracked.
    pub fn forget(&mut self, id: &str) -> bool {
        self.pending.remove(id).is_some()
    }

    /// Returns the number of resources currently tracked.
    pub fn tracked(&self) -> usize {
        self.pending.len()
    }
}
