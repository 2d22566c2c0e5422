//! Page composition (spec.md §4.F): evaluating a template's placeholders
//! against a scope chain, resolving layouts, and applying HTML escaping.

use crate::{
    context::Context,
    error::{FilterError, LayoutRecursionError, RenderError},
    escape::escape_html,
    expr::Expr,
    filters::{literal_to_value, FilterContext, Registry},
    page::{LayoutChoice, Page, PageResult},
    parse::{Template, TemplateChunk},
    scope::{self, Scope},
    value::{HostObject, Value},
};
use indexmap::IndexMap;
use std::sync::Arc;

pub(crate) fn render(ctx: &Context, result: PageResult) -> Result<String, RenderError> {
    let template = load(ctx, result.page())?;
    let root_scope = build_root_scope(ctx, &result);
    let extra = result.extra_filters();

    let mut body = render_template(ctx, &template, &root_scope, extra)?;
    for transform in result.page_transformers() {
        body = transform(body);
    }

    let body = match resolve_layout(ctx, &result)? {
        Some(layout_path) => {
            if layout_path == result.page().name() {
                return Err(LayoutRecursionError {
                    page: result.page().name().to_string(),
                }
                .into());
            }
            let body = match (extension_of(result.page().name()), extension_of(&layout_path)) {
                (Some(page_ext), Some(layout_ext)) if page_ext != layout_ext => {
                    ctx.transform_page_body(page_ext, body)
                }
                _ => body,
            };
            let layout_template = ctx.get_template(&layout_path)?;
            let layout_scope = Scope::child(&root_scope, {
                let mut frame = IndexMap::new();
                frame.insert("page".to_string(), Value::String(body));
                frame
            });
            render_template(ctx, &layout_template, &layout_scope, extra)?
        }
        None => body,
    };

    let mut body = if result.trim() { body.trim().to_string() } else { body };
    for transform in result.output_transformers() {
        body = transform(body);
    }
    Ok(body)
}

/// Render a named partial against a fresh child of `caller_scope`, used by
/// the `partial` filter. Never goes through layout resolution; only
/// top-level pages get a layout.
fn render_partial(
    ctx: &Context,
    caller_scope: &Arc<Scope>,
    name: &str,
    model: Value,
    extra: &Registry,
) -> Result<String, FilterError> {
    let template = ctx
        .get_template(name)
        .map_err(|err| FilterError::new("partial", err.to_string()))?;
    let frame = model_frame(&model);
    let scope = Scope::child(caller_scope, frame);
    render_template(ctx, &template, &scope, extra).map_err(|err| FilterError::new("partial", err.to_string()))
}

/// Parse `source` as a standalone template fragment and render it against a
/// fresh child of `caller_scope` binding a single variable, used by the
/// `forEach` filter to render its subject once per list element.
fn render_fragment(
    ctx: &Context,
    caller_scope: &Arc<Scope>,
    source: &str,
    var_name: &str,
    value: Value,
    extra: &Registry,
) -> Result<String, FilterError> {
    let template: Template = source
        .parse()
        .map_err(|err: crate::error::TemplateParseError| FilterError::new("forEach", err.to_string()))?;
    let mut frame = IndexMap::new();
    frame.insert(var_name.to_string(), value);
    let scope = Scope::child(caller_scope, frame);
    render_template(ctx, &template, &scope, extra).map_err(|err| FilterError::new("forEach", err.to_string()))
}

fn load(ctx: &Context, page: &Page) -> Result<Arc<Template>, RenderError> {
    match page {
        Page::FilePage { path } => ctx.get_template(path),
        Page::OneTimePage { source, .. } => {
            let template: Template = source.parse()?;
            Ok(Arc::new(template))
        }
    }
}

/// Resolve the layout for this render: an explicit override wins outright;
/// otherwise the nearest `_layout.<ext>` in the page's own directory or any
/// ancestor directory is used, climbing all the way to the root (spec.md
/// §4.F "Layout resolution").
fn resolve_layout(ctx: &Context, result: &PageResult) -> Result<Option<String>, RenderError> {
    match result.layout_override() {
        Some(LayoutChoice::Explicit(path)) => Ok(Some(path.clone())),
        Some(LayoutChoice::None) => Ok(None),
        None => {
            let Some(ext) = extension_of(result.page().name()) else {
                return Ok(None);
            };
            for dir in ancestor_dirs(result.page().name()) {
                let candidate = format!("{dir}_layout.{ext}");
                if ctx.page_exists(&candidate) {
                    return Ok(Some(candidate));
                }
            }
            Ok(None)
        }
    }
}

fn extension_of(path: &str) -> Option<&str> {
    path.rsplit('.').next().filter(|ext| *ext != path)
}

/// The page's own directory (as a `/`-terminated prefix), then each parent
/// directory in turn, ending with `""` for the root. `"a/b/page.html"`
/// yields `["a/b/", "a/", ""]`; `"page.html"` yields `[""]`.
fn ancestor_dirs(path: &str) -> Vec<String> {
    let own_dir = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    };

    let mut dirs = Vec::new();
    let mut current = own_dir;
    loop {
        dirs.push(current.to_string());
        if current.is_empty() {
            break;
        }
        let trimmed = &current[..current.len() - 1];
        current = match trimmed.rfind('/') {
            Some(i) => &trimmed[..=i],
            None => "",
        };
    }
    dirs
}

/// Build the Context-level root frame: default args, then the per-call args
/// and synthetic clock bindings, then the model itself bound as `model` and
/// exploded field-by-field (spec.md §4.C "property explosion").
fn build_root_scope(ctx: &Context, result: &PageResult) -> Arc<Scope> {
    let root = Scope::root(ctx.default_args().clone());

    let mut frame = result.args().clone();
    let now = chrono::Utc::now();
    frame.insert("now".to_string(), Value::Timestamp(now));
    frame.insert("utcNow".to_string(), Value::Timestamp(now));
    frame.insert("model".to_string(), result.model().clone());
    for (key, value) in model_frame(result.model()) {
        frame.entry(key).or_insert(value);
    }

    Scope::child(&root, frame)
}

fn model_frame(model: &Value) -> IndexMap<String, Value> {
    match model {
        Value::Map(map) => map.clone(),
        Value::Host(host) => host
            .field_names()
            .into_iter()
            .filter_map(|name| host.field(&name).map(|value| (name, value)))
            .collect(),
        _ => IndexMap::new(),
    }
}

fn render_template(
    ctx: &Context,
    template: &Template,
    scope: &Arc<Scope>,
    extra: &Registry,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for chunk in template.chunks() {
        match chunk {
            TemplateChunk::Literal(text) => out.push_str(text),
            TemplateChunk::Placeholder { expr, source } => {
                out.push_str(&render_placeholder(ctx, scope, expr, source, extra)?);
            }
        }
    }
    Ok(out)
}

fn render_placeholder(
    ctx: &Context,
    scope: &Arc<Scope>,
    expr: &Expr,
    source: &str,
    extra: &Registry,
) -> Result<String, RenderError> {
    let filter_ctx = FilterContext {
        settings: ctx.settings(),
        culture: ctx.culture(),
        render_partial: Some(&|name: &str, model: Value| render_partial(ctx, scope, name, model, extra)),
        render_fragment: Some(&|fragment: &str, var_name: &str, value: Value| {
            render_fragment(ctx, scope, fragment, var_name, value, extra)
        }),
    };

    let value = match eval(expr, scope, ctx.filters(), extra, &filter_ctx) {
        Ok(value) => value,
        Err(RenderError::Filter(err)) if !ctx.strict() => {
            tracing::warn!(error = %err, "filter error suppressed by non-strict context");
            return Ok(String::new());
        }
        Err(err) => return Err(err),
    };

    if value.is_unresolved() {
        return Ok(source.to_string());
    }

    let rendered = value.stringify();
    Ok(if is_raw(expr) { rendered } else { escape_html(&rendered) })
}

fn is_raw(expr: &Expr) -> bool {
    match expr {
        Expr::Pipe { call, .. } | Expr::Call(call) => call.name.as_str() == "raw",
        _ => false,
    }
}

fn eval(
    expr: &Expr,
    scope: &Scope,
    registry: &Registry,
    extra: &Registry,
    filter_ctx: &FilterContext,
) -> Result<Value, RenderError> {
    match expr {
        Expr::Literal(literal) => Ok(literal_to_value(literal)),
        Expr::Binding(binding) => Ok(scope::resolve(binding, scope)?),
        Expr::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval(item, scope, registry, extra, filter_ctx)?);
            }
            Ok(Value::List(values))
        }
        Expr::Object(entries) => {
            let mut map = IndexMap::new();
            for (key, value_expr) in entries {
                map.insert(key.as_str().to_string(), eval(value_expr, scope, registry, extra, filter_ctx)?);
            }
            Ok(Value::Map(map))
        }
        Expr::Call(call) => {
            let mut evaluated = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                evaluated.push(eval(arg, scope, registry, extra, filter_ctx)?);
            }
            let Some((subject, rest)) = evaluated.split_first() else {
                return Err(RenderError::other(format!(
                    "filter `{}` called with no subject argument",
                    call.name
                )));
            };
            Ok(registry.invoke_with_override(extra, &call.name, subject.clone(), rest, filter_ctx)?)
        }
        Expr::Pipe { subject, call } => {
            let subject_value = eval(subject, scope, registry, extra, filter_ctx)?;
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(eval(arg, scope, registry, extra, filter_ctx)?);
            }
            Ok(registry.invoke_with_override(extra, &call.name, subject_value, &args, filter_ctx)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Context, page::PageResult, test_util::InMemoryVfs, value::Value};
    use indexmap::indexmap;

    fn ctx_with(files: impl IntoIterator<Item = (&'static str, &'static str)>) -> Context {
        Context::builder().vfs(InMemoryVfs::new(files)).build()
    }

    #[test]
    fn literal_text_passes_through_unchanged() {
        let ctx = ctx_with([("page.html", "<p>hello</p>")]);
        let result = PageResult::one_time("page.html", "<p>hello</p>", Value::Null);
        assert_eq!(ctx.render(result).unwrap(), "<p>hello</p>");
    }

    #[test]
    fn placeholder_value_is_html_escaped() {
        let ctx = ctx_with([]);
        let model = Value::Map(indexmap! { "name".to_string() => Value::String("<b>Al</b>".into()) });
        let result = PageResult::one_time("p", "{{ model.name }}", model);
        assert_eq!(ctx.render(result).unwrap(), "&lt;b&gt;Al&lt;/b&gt;");
    }

    #[test]
    fn raw_filter_bypasses_escaping() {
        let ctx = ctx_with([]);
        let model = Value::Map(indexmap! { "name".to_string() => Value::String("<b>Al</b>".into()) });
        let result = PageResult::one_time("p", "{{ model.name | raw }}", model);
        assert_eq!(ctx.render(result).unwrap(), "<b>Al</b>");
    }

    #[test]
    fn unresolved_binding_passes_through_source_text() {
        let ctx = ctx_with([]);
        let result = PageResult::one_time("p", "{{ nope.field }}", Value::Null);
        assert_eq!(ctx.render(result).unwrap(), "{{ nope.field }}");
    }

    #[test]
    fn method_call_is_a_binding_expression_error() {
        let ctx = ctx_with([]);
        let result = PageResult::one_time("p", "{{ model.GetName() }}", Value::Null);
        assert!(matches!(ctx.render(result), Err(RenderError::Binding(_))));
    }

    #[test]
    fn explicit_layout_wraps_page_body() {
        let ctx = ctx_with([("_layout.html", "<html>{{ page | raw }}</html>")]);
        let result = PageResult::one_time("page.html", "hi", Value::Null).with_layout("_layout.html");
        assert_eq!(ctx.render(result).unwrap(), "<html>hi</html>");
    }

    #[test]
    fn layout_self_recursion_is_rejected() {
        let ctx = ctx_with([]);
        let result = PageResult::one_time("page.html", "hi", Value::Null).with_layout("page.html");
        assert!(matches!(ctx.render(result), Err(RenderError::LayoutRecursion(_))));
    }

    #[test]
    fn property_explosion_exposes_model_fields_directly() {
        let ctx = ctx_with([]);
        let model = Value::Map(indexmap! { "title".to_string() => Value::String("Hi".into()) });
        let result = PageResult::one_time("p", "{{ title }}", model);
        assert_eq!(ctx.render(result).unwrap(), "Hi");
    }

    #[test]
    fn layout_convention_climbs_to_an_ancestor_directory() {
        let ctx = ctx_with([
            ("_layout.html", "<html>{{ page | raw }}</html>"),
            ("section/page.html", "hi"),
        ]);
        let result = PageResult::new(Page::file("section/page.html"), Value::Null);
        assert_eq!(ctx.render(result).unwrap(), "<html>hi</html>");
    }

    #[test]
    fn layout_convention_prefers_nearest_directory_over_an_ancestor() {
        let ctx = ctx_with([
            ("_layout.html", "<html>{{ page | raw }}</html>"),
            ("section/_layout.html", "<section>{{ page | raw }}</section>"),
            ("section/page.html", "hi"),
        ]);
        let result = PageResult::new(Page::file("section/page.html"), Value::Null);
        assert_eq!(ctx.render(result).unwrap(), "<section>hi</section>");
    }

    #[test]
    fn page_transformers_run_before_layout_injection() {
        let ctx = ctx_with([("_layout.html", "<html>{{ page | raw }}</html>")]);
        let result = PageResult::one_time("page.html", "hi", Value::Null)
            .with_layout("_layout.html")
            .with_page_transform(|body| body.to_uppercase());
        assert_eq!(ctx.render(result).unwrap(), "<html>HI</html>");
    }

    #[test]
    fn output_transformers_run_after_layout_injection() {
        let ctx = ctx_with([("_layout.html", "<html>{{ page | raw }}</html>")]);
        let result = PageResult::one_time("page.html", "hi", Value::Null)
            .with_layout("_layout.html")
            .with_output_transform(|body| format!("<!-- generated -->{body}"));
        assert_eq!(ctx.render(result).unwrap(), "<!-- generated --><html>hi</html>");
    }

    #[test]
    fn page_body_is_transformed_when_page_and_layout_extensions_differ() {
        let ctx = Context::builder()
            .vfs(InMemoryVfs::new([("_layout.html", "<html>{{ page | raw }}</html>")]))
            .format(crate::host::PageFormat::new("md", "text/markdown", |body| {
                body.replace("**", "")
            }))
            .build();
        let result = PageResult::one_time("page.md", "**hi**", Value::Null).with_layout("_layout.html");
        assert_eq!(ctx.render(result).unwrap(), "<html>hi</html>");
    }

    #[test]
    fn per_result_filter_override_takes_precedence() {
        let ctx = ctx_with([]);
        let result = PageResult::one_time("p", "{{ 'x' | upper }}", Value::Null)
            .with_filter("upper", 0, false, |_args, _ctx| Ok(Value::String("overridden".into())));
        assert_eq!(ctx.render(result).unwrap(), "overridden");
    }
}
