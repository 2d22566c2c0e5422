//! The `appSetting` filter (spec.md §4.E "Settings"), reading through the
//! host-provided [crate::host::SettingsProvider].
//!
//! Registered under two arities so both call shapes work: the prefix-call
//! form `appSetting('siteName')` evaluates to a single positional argument,
//! which the expression evaluator treats as the filter's subject, so arity 0
//! reads the key straight off the subject; the piped form
//! `x | appSetting('siteName')` carries the key as the filter's own
//! argument at arity 1 instead.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("appSetting", 0, true, app_setting_from_subject);
    registry.register("appSetting", 1, true, app_setting_from_argument);
}

fn app_setting_from_subject(args: &[Value], ctx: &FilterContext) -> Result<Value, FilterError> {
    let key = args[0]
        .as_str()
        .ok_or_else(|| FilterError::new("appSetting", "key must be a string"))?;
    lookup(ctx, key)
}

fn app_setting_from_argument(args: &[Value], ctx: &FilterContext) -> Result<Value, FilterError> {
    let key = arg(args, 1, "appSetting")?
        .as_str()
        .ok_or_else(|| FilterError::new("appSetting", "key must be a string"))?;
    lookup(ctx, key)
}

fn lookup(ctx: &FilterContext, key: &str) -> Result<Value, FilterError> {
    let Some(settings) = ctx.settings else {
        return Ok(Value::Unresolved);
    };
    Ok(settings.get(key).unwrap_or(Value::Unresolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SettingsProvider;

    struct FixedSettings;
    impl SettingsProvider for FixedSettings {
        fn get(&self, key: &str) -> Option<Value> {
            (key == "siteName").then(|| Value::String("Acme".into()))
        }
    }

    #[test]
    fn reads_through_settings_provider_via_argument_form() {
        let ctx = FilterContext {
            settings: Some(&FixedSettings),
            culture: None,
            render_partial: None,
            render_fragment: None,
        };
        let result = app_setting_from_argument(
            &[Value::Null, Value::String("siteName".into())],
            &ctx,
        )
        .unwrap();
        assert_eq!(result, Value::String("Acme".into()));
    }

    #[test]
    fn reads_through_settings_provider_via_subject_form() {
        let ctx = FilterContext {
            settings: Some(&FixedSettings),
            culture: None,
            render_partial: None,
            render_fragment: None,
        };
        let result = app_setting_from_subject(&[Value::String("siteName".into())], &ctx).unwrap();
        assert_eq!(result, Value::String("Acme".into()));
    }

    #[test]
    fn missing_settings_provider_is_unresolved() {
        let result = app_setting_from_argument(
            &[Value::Null, Value::String("siteName".into())],
            &FilterContext::bare(),
        )
        .unwrap();
        assert_eq!(result, Value::Unresolved);
    }
}
