//! Template loading and management

use crate::swift;
use clientgen_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

pub const MODEL: &str = "model.swift";
pub const SERVICE: &str = "service.swift";
pub const ACCESSORS: &str = "accessors.swift";
pub const METADATA: &str = "metadata.swift";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("swift_string", swift_string_filter);

    let templates = [
        (MODEL, include_str!("../templates/model.swift.tera")),
        (SERVICE, include_str!("../templates/service.swift.tera")),
        (ACCESSORS, include_str!("../templates/accessors.swift.tera")),
        (METADATA, include_str!("../templates/metadata.swift.tera")),
    ];
    for (name, source) in templates {
        tera.add_raw_template(name, source).map_err(|e| {
            GeneratorError::Generation(format!("Failed to load {} template: {}", name, e))
        })?;
    }

    Ok(tera)
}

/// Filter to escape a value for a Swift string literal
fn swift_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("swift_string filter expects a string"))?;

    Ok(Value::String(swift::string_literal(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    #[test]
    fn test_templates_load() {
        let tera = load_templates().unwrap();
        let names: Vec<_> = tera.get_template_names().collect();
        for name in [MODEL, SERVICE, ACCESSORS, METADATA] {
            assert!(names.contains(&name), "{} not loaded", name);
        }
    }

    #[test]
    fn test_swift_string_filter() {
        let mut tera = load_templates().unwrap();
        tera.add_raw_template("quoted", r#""{{ value | swift_string }}""#)
            .unwrap();
        let mut context = Context::new();
        context.insert("value", "Say \"hi\"");

        assert_eq!(tera.render("quoted", &context).unwrap(), r#""Say \"hi\"""#);
    }
}
