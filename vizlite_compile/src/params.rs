// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive parameters.
//!
//! A [`ParamStore`] holds the current value of every declared parameter and validates updates
//! against the parameter's widget binding. [`InteractiveChart`] wires a store to a chart: each
//! accepted update refilters the dataset, recompiles the scene and notifies subscribers.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use vizlite_data::{Dataset, ParamLookup, Value};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::compile::{apply_filters, compile_filtered};
use crate::config::CompileConfig;
use crate::error::CompileError;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::scene::SceneDescriptor;
use crate::spec::ChartSpec;

/// The input widget a parameter is bound to.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamBind {
    /// A numeric range input.
    Slider {
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
        /// Grid step from `min`; accepted values snap to the nearest grid point.
        step: Option<f64>,
    },
    /// A drop-down over fixed options.
    Select {
        /// Accepted values.
        options: Vec<Value>,
    },
    /// A boolean toggle. Values are stored as `"true"` / `"false"`.
    Checkbox,
}

/// A declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    /// Name referenced by predicates.
    pub name: String,
    /// Initial value.
    pub value: Value,
    /// Widget binding; unbound parameters accept any value.
    pub bind: Option<ParamBind>,
}

impl ParamSpec {
    /// Declares an unbound parameter.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            bind: None,
        }
    }

    /// Binds the parameter to a widget.
    pub fn with_bind(mut self, bind: ParamBind) -> Self {
        self.bind = Some(bind);
        self
    }
}

/// Current parameter values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamStore {
    entries: Vec<(ParamSpec, Value)>,
}

impl ParamStore {
    /// Creates a store holding each parameter's initial value.
    ///
    /// Initial values are validated like updates. A repeated name replaces the earlier
    /// declaration.
    pub fn new(specs: &[ParamSpec]) -> Result<Self, CompileError> {
        let mut entries: Vec<(ParamSpec, Value)> = Vec::with_capacity(specs.len());
        for spec in specs {
            let value = validate(spec, &spec.value)?;
            match entries.iter().position(|(s, _)| s.name == spec.name) {
                Some(i) => entries[i] = (spec.clone(), value),
                None => entries.push((spec.clone(), value)),
            }
        }
        Ok(Self { entries })
    }

    /// Returns the current value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(s, _)| s.name == name)
            .map(|(_, v)| v)
    }

    /// Updates `name`, returning the previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value, CompileError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(s, _)| s.name == name)
            .ok_or_else(|| CompileError::UnknownParam(name.to_string()))?;
        let value = validate(&slot.0, &value.into())?;
        Ok(core::mem::replace(&mut slot.1, value))
    }

    /// Iterates over declared names and current values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(s, v)| (s.name.as_str(), v))
    }
}

impl ParamLookup for ParamStore {
    fn param(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Checks `value` against the parameter's binding, returning the value to store.
fn validate(spec: &ParamSpec, value: &Value) -> Result<Value, CompileError> {
    let invalid = |reason: String| CompileError::InvalidParamValue {
        name: spec.name.clone(),
        reason,
    };
    match &spec.bind {
        None => Ok(value.clone()),
        Some(ParamBind::Slider { min, max, step }) => {
            let Some(v) = value.as_f64().filter(|v| v.is_finite()) else {
                return Err(invalid(alloc::format!("`{value}` is not a number")));
            };
            if v < *min || v > *max {
                return Err(invalid(alloc::format!("{v} is outside [{min}, {max}]")));
            }
            Ok(Value::Number(snap(v, *min, *max, *step)))
        }
        Some(ParamBind::Select { options }) => {
            if options.iter().any(|o| o.key() == value.key()) {
                Ok(value.clone())
            } else {
                Err(invalid(alloc::format!("`{value}` is not an option")))
            }
        }
        Some(ParamBind::Checkbox) => {
            let on = match value {
                Value::Number(n) if *n == 1.0 => true,
                Value::Number(n) if *n == 0.0 => false,
                Value::String(s) if s == "true" => true,
                Value::String(s) if s == "false" => false,
                _ => return Err(invalid(alloc::format!("`{value}` is not a boolean"))),
            };
            Ok(Value::from(if on { "true" } else { "false" }))
        }
    }
}

/// Snaps `v` to the nearest `min + k * step` inside `[min, max]`.
fn snap(v: f64, min: f64, max: f64, step: Option<f64>) -> f64 {
    let Some(step) = step.filter(|s| s.is_finite() && *s > 0.0) else {
        return v;
    };
    let snapped = min + ((v - min) / step).round() * step;
    if snapped > max { snapped - step } else { snapped }
}

/// Identifies a scene subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SceneDescriptor)>;

/// A compiled chart that recompiles when its parameters change.
pub struct InteractiveChart<M = HeuristicTextMeasurer> {
    spec: ChartSpec,
    data: Dataset,
    config: CompileConfig,
    measurer: M,
    store: ParamStore,
    scene: SceneDescriptor,
    filtered_keys: Vec<u64>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl<M: fmt::Debug> fmt::Debug for InteractiveChart<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveChart")
            .field("spec", &self.spec)
            .field("config", &self.config)
            .field("measurer", &self.measurer)
            .field("store", &self.store)
            .field("rows", &self.filtered_keys.len())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl InteractiveChart {
    /// Compiles `spec` over `data` with the parameters at their initial values.
    pub fn new(
        spec: ChartSpec,
        data: Dataset,
        config: CompileConfig,
    ) -> Result<Self, CompileError> {
        Self::with_measurer(spec, data, config, HeuristicTextMeasurer)
    }
}

impl<M: TextMeasurer> InteractiveChart<M> {
    /// Like [`InteractiveChart::new`], measuring guide text with `measurer`.
    pub fn with_measurer(
        spec: ChartSpec,
        data: Dataset,
        config: CompileConfig,
        measurer: M,
    ) -> Result<Self, CompileError> {
        let store = ParamStore::new(&spec.params)?;
        let filtered = apply_filters(&spec, &data, &store)?;
        let scene = compile_filtered(&spec, &filtered, &config, &measurer)?;
        Ok(Self {
            filtered_keys: filtered.row_keys(),
            spec,
            data,
            config,
            measurer,
            store,
            scene,
            subscribers: Vec::new(),
            next_id: 0,
        })
    }

    /// The current scene.
    pub fn scene(&self) -> &SceneDescriptor {
        &self.scene
    }

    /// The chart spec.
    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    /// Current parameter values.
    pub fn params(&self) -> &ParamStore {
        &self.store
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.store.get(name)
    }

    /// Updates a parameter, recompiles and notifies subscribers.
    ///
    /// On error the parameter keeps its previous value and the scene is unchanged.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&SceneDescriptor, CompileError> {
        let previous = self.store.set(name, value)?;
        if let Err(e) = self.refresh() {
            // The previous value passed validation when it was stored.
            if let Some(slot) = self.store.entries.iter_mut().find(|(s, _)| s.name == name) {
                slot.1 = previous;
            }
            return Err(e);
        }
        for (_, callback) in &mut self.subscribers {
            callback(&self.scene);
        }
        Ok(&self.scene)
    }

    /// Calls `callback` with every new scene.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&SceneDescriptor) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    fn refresh(&mut self) -> Result<(), CompileError> {
        let filtered = apply_filters(&self.spec, &self.data, &self.store)?;
        let keys = filtered.row_keys();
        if keys == self.filtered_keys {
            log::debug!("params: filtered rows unchanged, reusing scene");
            return Ok(());
        }
        self.scene = compile_filtered(&self.spec, &filtered, &self.config, &self.measurer)?;
        self.filtered_keys = keys;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use serde_json::json;
    use vizlite_data::{CompareOp, Operand, Predicate};

    use super::*;
    use crate::channel::Channel;
    use crate::spec::{EncodingBinding, MarkKind, ViewSpec};

    fn slider() -> ParamSpec {
        ParamSpec::new("min_pop", 0.0).with_bind(ParamBind::Slider {
            min: 0.0,
            max: 100.0,
            step: Some(1.0),
        })
    }

    #[test]
    fn store_validates_updates() {
        let mut store = ParamStore::new(&[
            slider(),
            ParamSpec::new("region", "north").with_bind(ParamBind::Select {
                options: vec![Value::from("north"), Value::from("south")],
            }),
            ParamSpec::new("show", "true").with_bind(ParamBind::Checkbox),
        ])
        .unwrap();
        assert_eq!(store.set("min_pop", 40.0), Ok(Value::Number(0.0)));
        assert_eq!(store.get("min_pop"), Some(&Value::Number(40.0)));
        assert!(matches!(
            store.set("min_pop", 400.0),
            Err(CompileError::InvalidParamValue { .. })
        ));
        assert!(matches!(
            store.set("min_pop", "lots"),
            Err(CompileError::InvalidParamValue { .. })
        ));
        assert!(store.set("region", "south").is_ok());
        assert!(store.set("region", "west").is_err());
        assert!(store.set("show", 0.0).is_ok());
        assert_eq!(store.get("show"), Some(&Value::from("false")));
        assert_eq!(
            store.set("nope", 1.0),
            Err(CompileError::UnknownParam("nope".into()))
        );
        // Rejected updates leave the value alone.
        assert_eq!(store.param("min_pop"), Some(&Value::Number(40.0)));
    }

    #[test]
    fn slider_values_snap_to_the_step_grid() {
        let mut store = ParamStore::new(&[ParamSpec::new("p", 5.0).with_bind(ParamBind::Slider {
            min: 5.0,
            max: 102.0,
            step: Some(10.0),
        })])
        .unwrap();
        store.set("p", 44.0).unwrap();
        assert_eq!(store.get("p"), Some(&Value::Number(45.0)));
        store.set("p", 51.0).unwrap();
        assert_eq!(store.get("p"), Some(&Value::Number(55.0)));
        // The nearest grid point past `max` falls back one step.
        store.set("p", 101.0).unwrap();
        assert_eq!(store.get("p"), Some(&Value::Number(95.0)));

        let mut free = ParamStore::new(&[ParamSpec::new("q", 0.0).with_bind(ParamBind::Slider {
            min: 0.0,
            max: 1.0,
            step: None,
        })])
        .unwrap();
        free.set("q", 0.37).unwrap();
        assert_eq!(free.get("q"), Some(&Value::Number(0.37)));
    }

    #[test]
    fn invalid_initial_values_are_rejected() {
        let bad = ParamSpec::new("p", 500.0).with_bind(ParamBind::Slider {
            min: 0.0,
            max: 1.0,
            step: None,
        });
        assert!(ParamStore::new(&[bad]).is_err());
    }

    fn chart() -> InteractiveChart {
        let data = Dataset::from_json_values(
            json!([
                {"city": "a", "pop": 10},
                {"city": "b", "pop": 50},
                {"city": "c", "pop": 90}
            ])
            .as_array()
            .unwrap(),
        )
        .unwrap();
        let spec = ChartSpec::new(
            ViewSpec::new(MarkKind::Bar)
                .with_encoding(EncodingBinding::field(Channel::X, "city"))
                .with_encoding(EncodingBinding::field(Channel::Y, "pop")),
        )
        .with_param(slider())
        .with_filter(Predicate::compare("pop", CompareOp::Ge, Operand::Param("min_pop".into())));
        InteractiveChart::new(spec, data, CompileConfig::default()).unwrap()
    }

    #[test]
    fn set_recompiles_and_notifies() {
        let mut chart = chart();
        assert_eq!(chart.scene().mark_count(), 3);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = chart.subscribe(move |scene| sink.borrow_mut().push(scene.mark_count()));

        chart.set("min_pop", 40.0).unwrap();
        assert_eq!(chart.scene().mark_count(), 2);
        // Same rows: the scene is reused but subscribers still hear about it.
        chart.set("min_pop", 45.0).unwrap();
        assert_eq!(*seen.borrow(), vec![2, 2]);

        assert!(chart.unsubscribe(id));
        assert!(!chart.unsubscribe(id));
        chart.set("min_pop", 0.0).unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(chart.get("min_pop"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn failed_recompiles_roll_back() {
        let mut chart = chart();
        // No rows left: the y scale has no domain.
        assert!(matches!(
            chart.set("min_pop", 100.0),
            Err(CompileError::EmptyDomain { .. })
        ));
        assert_eq!(chart.get("min_pop"), Some(&Value::Number(0.0)));
        assert_eq!(chart.scene().mark_count(), 3);
        assert!(matches!(
            chart.set("missing", 1.0),
            Err(CompileError::UnknownParam(_))
        ));
    }
}
