//! Method naming and service grouping
//!
//! Operation identities are inconsistent (`ListTodolistGroups`,
//! `GetMyProfile`, `SearchRecordings`), so method names and target service
//! classes come from an ordered rule table rather than from the identity
//! alone. All tables live in [`NamingConfig`] and are read-only.

use clientgen_common::case::{to_pascal_case, to_snake_case};
use clientgen_common::{
    GeneratorConfig, GeneratorError, NamingConfig, Operation, Result, ServiceGroup,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Group name for operations that carry no tag
pub const UNTAGGED_GROUP: &str = "Untagged";

/// Derives method names and service groups from operation identities
pub struct NamingEngine<'a> {
    naming: &'a NamingConfig,
    strict: bool,
}

impl<'a> NamingEngine<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            naming: &config.naming,
            strict: config.strict_naming,
        }
    }

    /// Split an identity into its verb prefix and resource remainder
    ///
    /// A prefix only matches on a word boundary, so `Settle` is not `Set` + `tle`.
    pub fn split_verb<'id>(&self, operation_id: &'id str) -> Option<(&'a str, &'id str)> {
        self.naming.verb_prefixes.iter().find_map(|prefix| {
            let remainder = operation_id.strip_prefix(prefix.as_str())?;
            let on_boundary = remainder
                .chars()
                .next()
                .map_or(true, |c| c.is_ascii_uppercase() || c.is_ascii_digit());
            on_boundary.then_some((prefix.as_str(), remainder))
        })
    }

    /// Method name on the generated service class
    ///
    /// # Examples
    /// ```
    /// use clientgen_common::GeneratorConfig;
    /// use clientgen_parser::NamingEngine;
    ///
    /// let config = GeneratorConfig::default();
    /// let naming = NamingEngine::new(&config);
    ///
    /// assert_eq!(naming.method_name("ListTodolistGroups").unwrap(), "list");
    /// assert_eq!(naming.method_name("CompleteCardStep").unwrap(), "completeCardStep");
    /// assert_eq!(naming.method_name("GetMyProfile").unwrap(), "me");
    /// ```
    pub fn method_name(&self, operation_id: &str) -> Result<String> {
        if let Some(name) = self.naming.override_for(operation_id) {
            return Ok(name.to_string());
        }

        if let Some((verb, remainder)) = self.split_verb(operation_id) {
            let verb = verb.to_lowercase();
            if self
                .naming
                .simple_resources
                .contains(&remainder.to_lowercase())
            {
                return Ok(verb);
            }
            return Ok(format!("{}{}", verb, remainder));
        }

        if self.strict {
            return Err(GeneratorError::Naming(format!(
                "operation {} matches no verb prefix and has no override",
                operation_id
            )));
        }

        debug!(
            "Operation {} matches no naming rule, using the lowercased identity",
            operation_id
        );
        Ok(operation_id.to_lowercase())
    }

    /// Service group (class name without the `Service` suffix)
    ///
    /// # Examples
    /// ```
    /// use clientgen_common::GeneratorConfig;
    /// use clientgen_parser::NamingEngine;
    ///
    /// let config = GeneratorConfig::default();
    /// let naming = NamingEngine::new(&config);
    ///
    /// assert_eq!(naming.service_group("CreateCardStep", Some("Card Tables")), "CardSteps");
    /// assert_eq!(naming.service_group("GetCardTable", Some("Card Tables")), "CardTables");
    /// assert_eq!(naming.service_group("ListWebhooks", Some("Webhooks")), "Webhooks");
    /// assert_eq!(naming.service_group("Ping", None), "Untagged");
    /// ```
    pub fn service_group(&self, operation_id: &str, tag: Option<&str>) -> String {
        let Some(tag) = tag.filter(|t| !t.trim().is_empty()) else {
            return UNTAGGED_GROUP.to_string();
        };

        if let Some(splits) = self.naming.service_splits.get(tag) {
            let split = splits
                .iter()
                .find(|(_, ids)| ids.iter().any(|id| id == operation_id));
            if let Some((group, _)) = split {
                return group.clone();
            }
        }

        if let Some(group) = self.naming.tag_groups.get(tag) {
            return group.clone();
        }

        let group = to_pascal_case(tag);
        if group.is_empty() {
            UNTAGGED_GROUP.to_string()
        } else {
            group
        }
    }

    /// Resource name reported to telemetry hooks, e.g. `todolist_groups`
    pub fn resource_type(&self, operation_id: &str, tag: Option<&str>) -> String {
        let from_identity = self
            .split_verb(operation_id)
            .map(|(_, remainder)| to_snake_case(remainder))
            .filter(|r| !r.is_empty());

        from_identity
            .or_else(|| tag.map(to_snake_case).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| to_snake_case(operation_id))
    }

    /// Bucket operations into service groups, sorted by group name and identity
    pub fn group_operations(&self, operations: &[Operation]) -> Vec<ServiceGroup> {
        let mut buckets: BTreeMap<String, Vec<Operation>> = BTreeMap::new();
        for op in operations {
            let group = self.service_group(&op.operation_id, op.tag.as_deref());
            buckets.entry(group).or_default().push(op.clone());
        }

        buckets
            .into_iter()
            .map(|(name, mut operations)| {
                operations.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
                let entity_types = entity_types(&operations);
                ServiceGroup {
                    name,
                    operations,
                    entity_types,
                }
            })
            .collect()
    }
}

/// Schema names that appear in the group's method signatures
fn entity_types(operations: &[Operation]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for op in operations {
        if let Some(response_type) = &op.response_type {
            names.extend(response_type.referenced_names().into_iter().map(String::from));
        }
        if let Some(body) = &op.body {
            names.extend(body.field_type.referenced_names().into_iter().map(String::from));
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_common::{FieldType, HttpMethod};

    fn engine_with(config: &GeneratorConfig) -> NamingEngine<'_> {
        NamingEngine::new(config)
    }

    fn operation(id: &str, tag: Option<&str>) -> Operation {
        Operation {
            operation_id: id.to_string(),
            method_name: String::new(),
            http_method: HttpMethod::Get,
            path: "/things".to_string(),
            description: None,
            tag: tag.map(String::from),
            path_params: vec![],
            query_params: vec![],
            body: None,
            binary_body: false,
            response_schema: None,
            response_type: None,
            returns_array: false,
            returns_void: true,
            is_mutation: false,
            is_paginated: false,
            resource_type: String::new(),
        }
    }

    #[test]
    fn test_simple_resource_collapses_to_verb() {
        let config = GeneratorConfig::default();
        let naming = engine_with(&config);
        assert_eq!(naming.method_name("ListTodolistGroups").unwrap(), "list");
        assert_eq!(naming.method_name("GetTodo").unwrap(), "get");
        assert_eq!(naming.method_name("TrashRecording").unwrap(), "trash");
    }

    #[test]
    fn test_non_simple_resource_keeps_remainder() {
        let mut config = GeneratorConfig::default();
        config.naming.simple_resources.remove("todolistgroups");
        let naming = engine_with(&config);
        assert_eq!(
            naming.method_name("ListTodolistGroups").unwrap(),
            "listTodolistGroups"
        );
    }

    #[test]
    fn test_prefix_order_and_word_boundary() {
        let config = GeneratorConfig::default();
        let naming = engine_with(&config);
        // Unarchive is listed before Archive; Uncomplete before Complete
        assert_eq!(naming.split_verb("UnarchiveProject"), Some(("Unarchive", "Project")));
        assert_eq!(naming.split_verb("UncompleteTodo"), Some(("Uncomplete", "Todo")));
        // "Settle" does not start with the verb "Set"
        assert_eq!(naming.split_verb("SettleInvoice"), None);
        assert_eq!(naming.split_verb("Get2FAStatus"), Some(("Get", "2FAStatus")));
    }

    #[test]
    fn test_fallback_and_strict_mode() {
        let config = GeneratorConfig::default();
        let naming = engine_with(&config);
        assert_eq!(naming.method_name("RedirectToBucket").unwrap(), "redirecttobucket");

        let strict = GeneratorConfig {
            strict_naming: true,
            ..GeneratorConfig::default()
        };
        let naming = engine_with(&strict);
        let err = naming.method_name("RedirectToBucket").unwrap_err();
        assert!(matches!(err, GeneratorError::Naming(_)));
        // Overrides still apply in strict mode
        assert_eq!(naming.method_name("GetMyProfile").unwrap(), "me");
    }

    #[test]
    fn test_split_beats_tag_default() {
        let config = GeneratorConfig::default();
        let naming = engine_with(&config);
        assert_eq!(naming.service_group("ListTodolistGroups", Some("Todos")), "TodolistGroups");
        assert_eq!(naming.service_group("GetTodolist", Some("Todos")), "Todolists");
        assert_eq!(naming.service_group("CompleteTodo", Some("Todos")), "Todos");
        assert_eq!(naming.service_group("GetChatbot", Some("chat bots")), "ChatBots");
        assert_eq!(naming.service_group("GetThing", Some("  ")), UNTAGGED_GROUP);
    }

    #[test]
    fn test_resource_type() {
        let config = GeneratorConfig::default();
        let naming = engine_with(&config);
        assert_eq!(naming.resource_type("ListTodolistGroups", Some("Todos")), "todolist_groups");
        assert_eq!(naming.resource_type("RedirectToBucket", Some("Card Tables")), "card_tables");
        assert_eq!(naming.resource_type("RedirectToBucket", None), "redirect_to_bucket");
    }

    #[test]
    fn test_group_operations_sorted() {
        let config = GeneratorConfig::default();
        let naming = engine_with(&config);

        let mut get_todo = operation("GetTodo", Some("Todos"));
        get_todo.response_type = Some(FieldType::Ref("Todo".to_string()));
        let mut list_groups = operation("ListTodolistGroups", Some("Todos"));
        list_groups.response_type = Some(FieldType::Ref("TodolistGroup".to_string()));

        let ops = vec![
            operation("UpdateTodo", Some("Todos")),
            list_groups,
            get_todo,
            operation("Ping", None),
        ];
        let groups = naming.group_operations(&ops);

        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["TodolistGroups", "Todos", "Untagged"]);

        let todos = &groups[1];
        let ids: Vec<_> = todos.operations.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["GetTodo", "UpdateTodo"]);
        assert_eq!(todos.entity_types.iter().collect::<Vec<_>>(), vec!["Todo"]);
    }
}
