use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property names the flow layer resolves.
pub mod props {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const SOURCE_OFFSET: &str = "source-offset";
    pub const TARGET_OFFSET: &str = "target-offset";
    pub const STROKE_WIDTH: &str = "stroke-width";
    pub const STROKE: &str = "stroke";
    pub const STROKE_STYLE: &str = "stroke-style";
    pub const OPACITY: &str = "opacity";
    pub const SANKEY_ANCHOR: &str = "sankey-anchor";
}

/// Which record a field mapping reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Record,
    Context,
}

/// Linear output range attached to a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub from: [f64; 2],
    pub to: [f64; 2],
    #[serde(default)]
    pub clamp: bool,
}

impl Scale {
    pub fn new(from: [f64; 2], to: [f64; 2]) -> Self {
        Self {
            from,
            to,
            clamp: false,
        }
    }

    /// Output bounds `[floor, ceiling]`.
    pub fn to(&self) -> [f64; 2] {
        self.to
    }

    pub fn map(&self, value: f64) -> f64 {
        self.map_with_floor(value, self.to[0])
    }

    /// Maps `value` as if the output floor were `floor`.
    pub fn map_with_floor(&self, value: f64, floor: f64) -> f64 {
        let [d0, d1] = self.from;
        let span = d1 - d0;
        if span == 0.0 {
            return floor;
        }
        let mut t = (value - d0) / span;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        floor + t * (self.to[1] - floor)
    }
}

/// A declarative mapping from a data record to a visual property value.
///
/// With `from` unset the mapping is the constant `value`. Otherwise the dot-separated
/// field path is read from the record (or the context record for `Scope::Context`),
/// numeric results pass through `using` when present, and a missing field falls back
/// to `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<Scale>,
}

impl Mapping {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn field(path: impl Into<String>) -> Self {
        Self {
            from: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn in_context(mut self) -> Self {
        self.scope = Scope::Context;
        self
    }

    pub fn using(&self) -> Option<&Scale> {
        self.using.as_ref()
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.using = Some(scale);
        self
    }

    pub fn resolve(&self, record: &Value, context: Option<&Value>) -> Option<Value> {
        let Some(raw) = self.lookup(record, context) else {
            return self.value.clone();
        };
        match (self.using(), as_number(raw)) {
            (Some(scale), Some(number)) => Some(Value::from(scale.map(number))),
            _ => Some(raw.clone()),
        }
    }

    /// Numeric resolution with an optional replacement for the scale's output floor.
    pub fn resolve_number_with_floor(
        &self,
        record: &Value,
        context: Option<&Value>,
        floor_override: Option<f64>,
    ) -> Option<f64> {
        let Some(raw) = self.lookup(record, context) else {
            return self.value.as_ref().and_then(as_number);
        };
        let number = as_number(raw)?;
        Some(match self.using() {
            Some(scale) => scale.map_with_floor(number, floor_override.unwrap_or(scale.to[0])),
            None => number,
        })
    }

    fn lookup<'a>(&self, record: &'a Value, context: Option<&'a Value>) -> Option<&'a Value> {
        let path = self.from.as_deref()?;
        let source = match self.scope {
            Scope::Record => record,
            Scope::Context => context.unwrap_or(record),
        };
        let mut cur = source;
        for key in path.split('.') {
            cur = cur.get(key)?;
        }
        (!cur.is_null()).then_some(cur)
    }
}

/// Numbers and numeric strings both count as numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// The mapping service consumed by the layout.
pub trait MappingResolver {
    fn mapping(&self, property: &str) -> Option<&Mapping>;

    fn value_for(&self, property: &str, record: &Value, context: Option<&Value>) -> Option<Value> {
        self.mapping(property)?.resolve(record, context)
    }

    fn number_for(&self, property: &str, record: &Value, default: f64, context: Option<&Value>) -> f64 {
        self.value_for(property, record, context)
            .as_ref()
            .and_then(as_number)
            .filter(|n| n.is_finite())
            .unwrap_or(default)
    }

    fn string_for(&self, property: &str, record: &Value, default: &str, context: Option<&Value>) -> String {
        match self.value_for(property, record, context) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }
}

/// Property name to mapping table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingSet {
    mappings: BTreeMap<String, Mapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node position from same-named node fields, both stand-offs from the node's `offset`, width from the link's `value`.
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.map(props::X, Mapping::field("x"));
        set.map(props::Y, Mapping::field("y"));
        set.map(props::SOURCE_OFFSET, Mapping::field("offset"));
        set.map(props::TARGET_OFFSET, Mapping::field("offset"));
        set.map(props::STROKE_WIDTH, Mapping::field("value"));
        set
    }

    pub fn map(&mut self, property: impl Into<String>, mapping: Mapping) -> &mut Self {
        self.mappings.insert(property.into(), mapping);
        self
    }

    pub fn merge(&mut self, other: MappingSet) {
        self.mappings.extend(other.mappings);
    }
}

impl MappingResolver for MappingSet {
    fn mapping(&self, property: &str) -> Option<&Mapping> {
        self.mappings.get(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_mapping_reads_nested_path() {
        let mapping = Mapping::field("weight.total");
        let record = json!({ "weight": { "total": 4 } });
        assert_eq!(mapping.resolve(&record, None), Some(json!(4)));
    }

    #[test]
    fn missing_field_falls_back_to_constant() {
        let mapping = Mapping {
            value: Some(json!("#333")),
            ..Mapping::field("color")
        };
        assert_eq!(mapping.resolve(&json!({}), None), Some(json!("#333")));
        assert_eq!(Mapping::field("color").resolve(&json!({}), None), None);
    }

    #[test]
    fn context_scope_reads_context_record() {
        let mapping = Mapping::field("gap").in_context();
        let node = json!({ "gap": 1 });
        let link = json!({ "gap": 7 });
        assert_eq!(mapping.resolve(&node, Some(&link)), Some(json!(7)));
        assert_eq!(mapping.resolve(&node, None), Some(json!(1)));
    }

    #[test]
    fn scale_maps_linearly() {
        let scale = Scale::new([0.0, 10.0], [2.0, 12.0]);
        assert_eq!(scale.map(5.0), 7.0);
        assert_eq!(scale.map_with_floor(5.0, 0.0), 6.0);
        assert_eq!(scale.to(), [2.0, 12.0]);
    }

    #[test]
    fn clamped_scale_stays_in_range() {
        let scale = Scale {
            clamp: true,
            ..Scale::new([0.0, 10.0], [0.0, 1.0])
        };
        assert_eq!(scale.map(20.0), 1.0);
        assert_eq!(scale.map(-5.0), 0.0);
    }

    #[test]
    fn floor_override_leaves_original_untouched() {
        let mapping = Mapping::field("value").with_scale(Scale::new([0.0, 10.0], [4.0, 14.0]));
        let record = json!({ "value": 0 });
        assert_eq!(mapping.resolve_number_with_floor(&record, None, Some(0.0)), Some(0.0));
        assert_eq!(mapping.resolve_number_with_floor(&record, None, None), Some(4.0));
        assert_eq!(mapping.using().map(Scale::to), Some([4.0, 14.0]));
    }

    #[test]
    fn resolver_helpers_apply_defaults() {
        let mut set = MappingSet::new();
        set.map(props::STROKE, Mapping::field("color"));
        set.map(props::OPACITY, Mapping::field("alpha"));
        let record = json!({ "alpha": "0.5" });
        assert_eq!(set.number_for(props::OPACITY, &record, 1.0, None), 0.5);
        assert_eq!(set.string_for(props::STROKE, &record, "#999", None), "#999");
        assert_eq!(set.number_for("unmapped", &record, 3.0, None), 3.0);
    }

    #[test]
    fn mapping_set_deserializes_from_json() {
        let set: MappingSet = serde_json::from_value(json!({
            "stroke-width": { "from": "value", "using": { "from": [0, 10], "to": [1, 11] } },
            "stroke": { "value": "red" }
        }))
        .expect("mappings");
        let width = set.mapping(props::STROKE_WIDTH).expect("width mapping");
        assert_eq!(width.using().map(Scale::to), Some([1.0, 11.0]));
        assert_eq!(set.string_for(props::STROKE, &Value::Null, "#999", None), "red");
    }
}
