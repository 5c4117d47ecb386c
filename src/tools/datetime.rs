/// Current Date/Time Tool
///
/// Formats the context clock's current instant as
/// `yyyy-MM-dd HH:mm:ss <zone abbreviation>` in the requested IANA time zone,
/// or UTC when none (or a blank one) is given.

use chrono_tz::Tz;
use serde_json::Value;

use crate::core::context::ToolContext;
use crate::core::descriptor::{Arguments, ParameterDescriptor, ParameterKind, ToolDescriptor};
use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

pub const NAME: &str = "current-date-time";

const FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    let tool = ToolDescriptor::new(
        NAME,
        "Gives the current date and time as yyyy-MM-dd HH:mm:ss followed by the zone abbreviation.",
    )
    .with_parameter(ParameterDescriptor::optional(
        "timezone",
        ParameterKind::String,
        "IANA time zone identifier such as America/New_York; UTC when omitted",
    ));
    registry.register(tool, execute)
}

fn execute(ctx: &ToolContext, args: &Arguments) -> Result<Value, ToolError> {
    let zone = resolve_zone(args.optional_string("timezone"))?;
    let now = ctx.clock.now().with_timezone(&zone);
    Ok(Value::String(now.format(FORMAT).to_string()))
}

fn resolve_zone(requested: Option<&str>) -> Result<Tz, ToolError> {
    match requested.map(str::trim) {
        None | Some("") => Ok(Tz::UTC),
        Some(id) => id
            .parse::<Tz>()
            .map_err(|_| ToolError::InvalidTimeZone(id.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::FixedClock;
    use crate::core::error::ErrorKind;
    use crate::core::registry::InvocationResult;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn registry_at(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> ToolRegistry {
        let instant = Utc.with_ymd_and_hms(year, month, day, h, m, s).unwrap();
        let mut registry = ToolRegistry::new(ToolContext::default().with_clock(FixedClock(instant)));
        register(&mut registry).unwrap();
        registry
    }

    fn text(result: InvocationResult) -> String {
        match result {
            InvocationResult::Success { value: Value::String(s) } => s,
            other => panic!("expected string result, got {:?}", other),
        }
    }

    #[test]
    fn defaults_to_utc() {
        let registry = registry_at(2024, 3, 9, 7, 5, 3);
        assert_eq!(text(registry.invoke(NAME, &json!({}))), "2024-03-09 07:05:03 UTC");
        assert_eq!(
            text(registry.invoke(NAME, &json!({"timezone": "   "}))),
            "2024-03-09 07:05:03 UTC"
        );
        assert_eq!(
            text(registry.invoke(NAME, &json!({"timezone": "UTC"}))),
            "2024-03-09 07:05:03 UTC"
        );
    }

    #[test]
    fn converts_to_named_zone() {
        let registry = registry_at(2024, 1, 15, 17, 0, 0);
        assert_eq!(
            text(registry.invoke(NAME, &json!({"timezone": "America/New_York"}))),
            "2024-01-15 12:00:00 EST"
        );

        let registry = registry_at(2024, 7, 15, 17, 0, 0);
        assert_eq!(
            text(registry.invoke(NAME, &json!({"timezone": "America/New_York"}))),
            "2024-07-15 13:00:00 EDT"
        );
    }

    #[test]
    fn wall_clock_output_has_expected_shape() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        register(&mut registry).unwrap();
        let out = text(registry.invoke(NAME, &json!({"timezone": "UTC"})));

        let (stamp, zone) = out.split_at(19);
        let digits_at = [0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18];
        for (i, c) in stamp.char_indices() {
            match i {
                4 | 7 => assert_eq!(c, '-'),
                10 => assert_eq!(c, ' '),
                13 | 16 => assert_eq!(c, ':'),
                _ => assert!(digits_at.contains(&i) && c.is_ascii_digit(), "{}", out),
            }
        }
        let zone = zone.strip_prefix(' ').unwrap();
        assert!(!zone.is_empty() && !zone.contains(char::is_whitespace));
    }

    #[test]
    fn rejects_unknown_zone() {
        let registry = registry_at(2024, 1, 1, 0, 0, 0);
        let result = registry.invoke(NAME, &json!({"timezone": "Not/AZone"}));
        assert_eq!(
            result,
            InvocationResult::Failure {
                kind: ErrorKind::InvalidTimeZone,
                message: "invalid time zone: Not/AZone".to_string(),
            }
        );
    }
}
