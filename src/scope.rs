//! Scope frames and the binding resolver (spec.md §3 "Scope frame", §4.C).

use crate::{
    error::BindingExpressionError,
    expr::{Binding, Expr, PathStep},
    value::Value,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// An ordered mapping from name to [Value], plus a reference to its parent
/// frame. Lookup walks parent-ward; writes (via [Scope::child]) affect only
/// the new frame. Frames form a tree rooted at the Context args frame
/// (spec.md §3 "Scope frame" invariant).
///
/// Implemented as an immutable map with a parent pointer per spec.md §9's
/// design note: a partial's frame is a child of the *caller's* frame, not of
/// the Context, which is load-bearing for partial-argument scoping.
#[derive(Debug, Default)]
pub struct Scope {
    vars: IndexMap<String, Value>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Build a root frame with no parent, e.g. the Context args frame.
    pub fn root(vars: IndexMap<String, Value>) -> Arc<Scope> {
        Arc::new(Scope { vars, parent: None })
    }

    /// Push a new child frame. The child sees everything visible in
    /// `parent`, with `vars` taking precedence on name collisions.
    pub fn child(parent: &Arc<Scope>, vars: IndexMap<String, Value>) -> Arc<Scope> {
        Arc::new(Scope {
            vars,
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Insert or overwrite a binding in this frame. Only intended for use
    /// while a frame is being constructed (e.g. seeding `model` and exploded
    /// properties); frames are treated as immutable once shared.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Look up a head identifier, walking outward through parent frames.
    /// Returns `None` if no frame in the chain has a binding for `name`
    /// (the caller turns that into [Value::Unresolved]).
    fn lookup_head(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup_head(name))
    }
}

/// Evaluate a dotted/indexed binding against a scope chain.
///
/// Returns `Ok(Value::Unresolved)` when the head identifier has no binding
/// anywhere in the chain (spec.md §4.C: "Head lookup that finds no binding
/// returns Unresolved"). Returns `Err` only for the one hard safety
/// violation: a `.method(args)` path step, which is always fatal regardless
/// of the current value (spec.md §1, §4.C, §7).
pub fn resolve(binding: &Binding, scope: &Scope) -> Result<Value, BindingExpressionError> {
    let Some(mut current) = scope.lookup_head(binding.head.as_str()) else {
        return Ok(Value::Unresolved);
    };

    for step in &binding.steps {
        if let PathStep::MethodCall(..) = step {
            return Err(BindingExpressionError {
                expression: binding.to_string(),
            });
        }

        // Mid-path null/Unresolved always short-circuits to empty string,
        // never an error and never Unresolved itself (spec.md §4.C.3): null-
        // safe navigation is the dominant template-authoring use case.
        if matches!(current, Value::Null | Value::Unresolved) {
            return Ok(Value::String(String::new()));
        }

        current = match step {
            PathStep::Field(name) => field_of(&current, name.as_str()),
            PathStep::Index(key_expr) => index_of(&current, eval_index_key(key_expr, scope)?),
            PathStep::MethodCall(..) => unreachable!("handled above"),
        };
    }

    Ok(current)
}

fn field_of(value: &Value, name: &str) -> Value {
    match value {
        Value::Map(map) => map.get(name).cloned().unwrap_or(Value::Unresolved),
        Value::Host(host) => host.field(name).unwrap_or(Value::Unresolved),
        _ => Value::Unresolved,
    }
}

fn index_of(value: &Value, key: Value) -> Value {
    match value {
        Value::Map(map) => map
            .get(key.stringify().as_str())
            .cloned()
            .unwrap_or(Value::Unresolved),
        Value::List(items) => match key {
            Value::Integer(i) => usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Unresolved),
            _ => Value::Unresolved,
        },
        _ => Value::Unresolved,
    }
}

/// The grammar restricts `[...]` contents to a string, number, or binding
/// (spec.md §4.B), so evaluating one never needs the filter pipeline.
fn eval_index_key(expr: &Expr, scope: &Scope) -> Result<Value, BindingExpressionError> {
    match expr {
        Expr::Literal(literal) => Ok(crate::filters::literal_to_value(literal)),
        Expr::Binding(binding) => resolve(binding, scope),
        _ => unreachable!("index key grammar only admits literals and bindings"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Identifier, Literal};
    use indexmap::indexmap;

    fn field(name: &str) -> Identifier {
        Identifier::from(name)
    }

    #[test]
    fn head_not_found_is_unresolved() {
        let scope = Scope::root(IndexMap::new());
        let binding = Binding {
            head: field("missing"),
            steps: vec![],
        };
        assert_eq!(resolve(&binding, &scope).unwrap(), Value::Unresolved);
    }

    #[test]
    fn head_found_in_parent_frame() {
        let root = Scope::root(indexmap! { "x".to_string() => Value::Integer(1) });
        let child = Scope::child(&root, IndexMap::new());
        let binding = Binding {
            head: field("x"),
            steps: vec![],
        };
        assert_eq!(resolve(&binding, &child).unwrap(), Value::Integer(1));
    }

    #[test]
    fn child_frame_shadows_parent() {
        let root = Scope::root(indexmap! { "x".to_string() => Value::Integer(1) });
        let child = Scope::child(&root, indexmap! { "x".to_string() => Value::Integer(2) });
        let binding = Binding {
            head: field("x"),
            steps: vec![],
        };
        assert_eq!(resolve(&binding, &child).unwrap(), Value::Integer(2));
    }

    #[test]
    fn mid_path_null_dereference_yields_empty_string() {
        let root = Scope::root(indexmap! { "x".to_string() => Value::Null });
        let binding = Binding {
            head: field("x"),
            steps: vec![PathStep::Field(field("y"))],
        };
        assert_eq!(
            resolve(&binding, &root).unwrap(),
            Value::String(String::new())
        );
    }

    #[test]
    fn method_call_step_is_fatal() {
        let root = Scope::root(indexmap! { "model".to_string() => Value::Null });
        let binding = Binding {
            head: field("model"),
            steps: vec![PathStep::MethodCall(field("GetName"), vec![])],
        };
        assert!(resolve(&binding, &root).is_err());
    }

    #[test]
    fn map_indexing_by_literal_key() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Integer(5));
        let root = Scope::root(indexmap! { "m".to_string() => Value::Map(map) });
        let binding = Binding {
            head: field("m"),
            steps: vec![PathStep::Index(Box::new(Expr::Literal(Literal::String(
                "a".into(),
            ))))],
        };
        assert_eq!(resolve(&binding, &root).unwrap(), Value::Integer(5));
    }

    #[test]
    fn list_indexing_by_integer() {
        let root = Scope::root(indexmap! {
            "l".to_string() => Value::List(vec![Value::Integer(10), Value::Integer(20)])
        });
        let binding = Binding {
            head: field("l"),
            steps: vec![PathStep::Index(Box::new(Expr::Literal(Literal::Integer(1))))],
        };
        assert_eq!(resolve(&binding, &root).unwrap(), Value::Integer(20));
    }
}
