//! Project-independent view of a resolved compose model
//!
//! The engine injects the project name into network and volume names (and
//! sometimes elsewhere). Consumers that apply their own naming scheme strip
//! those values, together with the fields that only make sense for a named
//! project.

use serde_json::Value;

/// Top-level keys removed from the model
const TOP_LEVEL_KEYS: &[&str] = &["name", "version"];

/// Service keys removed from every service
const SERVICE_KEYS: &[&str] = &["container_name"];

/// Normalize a resolved project in place
pub fn normalize(project: &mut Value, project_name: &str) {
    let Some(root) = project.as_object_mut() else {
        return;
    };

    for key in TOP_LEVEL_KEYS {
        root.remove(*key);
    }

    if !project_name.is_empty() {
        remove_project_name(project, project_name);
    }

    if let Some(services) = project.get_mut("services").and_then(Value::as_object_mut) {
        for service in services.values_mut().filter_map(Value::as_object_mut) {
            for key in SERVICE_KEYS {
                service.remove(*key);
            }
            if service.get("entrypoint").is_some_and(is_null_command) {
                service.remove("entrypoint");
            }
        }
    }
}

/// Remove every string value that contains the project name
fn remove_project_name(value: &mut Value, project_name: &str) {
    let mut stack = vec![value];

    while let Some(current) = stack.pop() {
        match current {
            Value::Object(map) => {
                map.retain(|_, v| !contains_name(v, project_name));
                stack.extend(map.values_mut());
            }
            Value::Array(items) => {
                items.retain(|v| !contains_name(v, project_name));
                stack.extend(items.iter_mut());
            }
            _ => {}
        }
    }
}

fn contains_name(value: &Value, project_name: &str) -> bool {
    matches!(value, Value::String(s) if s.contains(project_name))
}

/// `null` or `[null]`
fn is_null_command(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.len() == 1 && items[0].is_null(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PROJECT: &str = "0b8a3c40-5d7c-4a43-9a83-1b5ad1b0f6f2";

    #[test]
    fn test_normalize_simple_project() {
        let mut project = json!({
            "name": PROJECT,
            "version": "3.8",
            "services": {
                "web": {
                    "image": "nginx:latest",
                    "container_name": "web-1",
                    "command": ["nginx", "-g", "daemon off;"],
                    "entrypoint": [null],
                    "networks": { "my-network": null },
                    "volumes": [
                        { "type": "volume", "source": "my-volume", "target": "/var/www/html" }
                    ]
                }
            },
            "networks": {
                "my-network": { "name": format!("{}_my-network", PROJECT), "ipam": {} }
            },
            "volumes": {
                "my-volume": { "name": format!("{}_my-volume", PROJECT) }
            }
        });

        normalize(&mut project, PROJECT);

        assert_eq!(
            project,
            json!({
                "services": {
                    "web": {
                        "image": "nginx:latest",
                        "command": ["nginx", "-g", "daemon off;"],
                        "networks": { "my-network": null },
                        "volumes": [
                            { "type": "volume", "source": "my-volume", "target": "/var/www/html" }
                        ]
                    }
                },
                "networks": { "my-network": { "ipam": {} } },
                "volumes": { "my-volume": {} }
            })
        );
    }

    #[test]
    fn test_keeps_real_entrypoint() {
        let mut project = json!({
            "services": { "app": { "entrypoint": ["/bin/sh", "-c"] } }
        });
        normalize(&mut project, PROJECT);
        assert_eq!(project["services"]["app"]["entrypoint"], json!(["/bin/sh", "-c"]));
    }

    #[test]
    fn test_removes_project_name_in_lists() {
        let mut project = json!({
            "services": {
                "app": { "labels": { "a": "keep", "b": format!("x-{}", PROJECT) },
                         "extra": ["keep", PROJECT] }
            }
        });
        normalize(&mut project, PROJECT);
        assert_eq!(project["services"]["app"]["labels"], json!({ "a": "keep" }));
        assert_eq!(project["services"]["app"]["extra"], json!(["keep"]));
    }

    #[test]
    fn test_non_object_is_untouched() {
        let mut project = json!(["not", "a", "project"]);
        normalize(&mut project, "not");
        assert_eq!(project, json!(["not", "a", "project"]));
    }
}
