//! Generator configuration loading from YAML files
//!
//! The naming tables, tenant parameter, and extension keys the generator
//! relies on have built-in defaults. A YAML file can replace any of them
//! without touching Rust code; omitted keys keep their defaults.

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Root structure for generator configuration files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path parameter carrying the account/tenant id, handled by the transport
    pub tenant_param: String,
    /// Operation extension key marking page-streamed list responses
    pub pagination_extension: String,
    /// Schema name suffixes that identify error responses
    pub error_schema_suffixes: Vec<String>,
    /// Fail instead of falling back when an identity matches no naming rule
    pub strict_naming: bool,
    /// Method naming and service grouping tables
    pub naming: NamingConfig,
}

/// Method naming and service grouping tables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Verb prefixes, matched in order; the first match wins
    pub verb_prefixes: Vec<String>,
    /// Lowercased resource remainders that collapse to the bare verb
    pub simple_resources: BTreeSet<String>,
    /// Operation identity -> method name
    pub method_overrides: BTreeMap<String, String>,
    /// Tag -> default service group
    pub tag_groups: BTreeMap<String, String>,
    /// Tag -> service group -> exact operation identities
    pub service_splits: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tenant_param: "accountId".to_string(),
            pagination_extension: "x-pagination".to_string(),
            error_schema_suffixes: vec![
                "ErrorResponseContent".to_string(),
                "ErrorResponse".to_string(),
            ],
            strict_naming: false,
            naming: NamingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            GeneratorError::Config(format!("Failed to parse config YAML from {:?}: {}", path, e))
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables that could never produce a usable client
    pub fn validate(&self) -> Result<()> {
        if self.tenant_param.is_empty() {
            return Err(GeneratorError::Config(
                "tenant_param must not be empty".to_string(),
            ));
        }
        if let Some(prefix) = self.naming.verb_prefixes.iter().find(|p| p.is_empty()) {
            return Err(GeneratorError::Config(format!(
                "verb prefix {:?} must not be empty",
                prefix
            )));
        }
        for (tag, splits) in &self.naming.service_splits {
            let mut seen = BTreeSet::new();
            for ids in splits.values() {
                for id in ids {
                    if !seen.insert(id) {
                        return Err(GeneratorError::Config(format!(
                            "operation {} appears in more than one split of tag {}",
                            id, tag
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl NamingConfig {
    /// Whether an operation identity carries an explicit method name
    pub fn override_for(&self, operation_id: &str) -> Option<&str> {
        self.method_overrides.get(operation_id).map(String::as_str)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for NamingConfig {
    fn default() -> Self {
        let verb_prefixes = strings(&[
            "List",
            "Get",
            "Create",
            "Update",
            "Delete",
            "Trash",
            "Unarchive",
            "Archive",
            "Uncomplete",
            "Complete",
            "Reposition",
            "Move",
            "Unpin",
            "Pin",
            "Unsubscribe",
            "Subscribe",
            "Enable",
            "Disable",
            "Set",
            "Search",
            "Clone",
            "Publish",
            "Upload",
            "Download",
        ]);

        let simple_resources = strings(&[
            "attachment",
            "campfire",
            "campfires",
            "card",
            "cards",
            "comment",
            "comments",
            "document",
            "documents",
            "event",
            "events",
            "forward",
            "forwards",
            "message",
            "messages",
            "messagetype",
            "messagetypes",
            "people",
            "person",
            "project",
            "projects",
            "recording",
            "recordings",
            "schedule",
            "subscription",
            "template",
            "templates",
            "todo",
            "todos",
            "todolist",
            "todolistgroup",
            "todolistgroups",
            "todolists",
            "todoset",
            "upload",
            "uploads",
            "vault",
            "vaults",
            "webhook",
            "webhooks",
        ])
        .into_iter()
        .collect();

        let method_overrides = pairs(&[
            ("GetMyProfile", "me"),
            ("ListPingablePeople", "pingable"),
            ("GetProgressReport", "progress"),
            ("GetPersonProgress", "personProgress"),
            ("GetProjectTimeline", "projectTimeline"),
            ("GetTimesheetReport", "report"),
            ("GetProjectTimesheet", "projectReport"),
            ("GetRecordingTimesheet", "recordingReport"),
            ("GetSearchMetadata", "metadata"),
            ("SearchRecordings", "search"),
            ("ListAssignablePeople", "assignablePeople"),
            ("ListOverdueTodos", "overdueTodos"),
        ]);

        let tag_groups = pairs(&[
            ("Card Tables", "CardTables"),
            ("Check-ins", "Checkins"),
            ("Client Features", "ClientApprovals"),
            ("Messages", "Messages"),
            ("People", "People"),
            ("Projects", "Projects"),
            ("Todos", "Todos"),
        ]);

        let mut service_splits = BTreeMap::new();
        service_splits.insert(
            "Card Tables".to_string(),
            BTreeMap::from([
                (
                    "CardColumns".to_string(),
                    strings(&[
                        "CreateCardColumn",
                        "DisableCardColumnOnHold",
                        "EnableCardColumnOnHold",
                        "GetCardColumn",
                        "MoveCardColumn",
                        "SetCardColumnColor",
                        "UpdateCardColumn",
                    ]),
                ),
                (
                    "CardSteps".to_string(),
                    strings(&[
                        "CompleteCardStep",
                        "CreateCardStep",
                        "DeleteCardStep",
                        "RepositionCardStep",
                        "UncompleteCardStep",
                        "UpdateCardStep",
                    ]),
                ),
                (
                    "Cards".to_string(),
                    strings(&["CreateCard", "GetCard", "ListCards", "MoveCard", "UpdateCard"]),
                ),
            ]),
        );
        service_splits.insert(
            "Client Features".to_string(),
            BTreeMap::from([
                (
                    "ClientCorrespondences".to_string(),
                    strings(&["GetClientCorrespondence", "ListClientCorrespondences"]),
                ),
                (
                    "ClientReplies".to_string(),
                    strings(&["GetClientReply", "ListClientReplies"]),
                ),
            ]),
        );
        service_splits.insert(
            "Todos".to_string(),
            BTreeMap::from([
                (
                    "TodolistGroups".to_string(),
                    strings(&[
                        "CreateTodolistGroup",
                        "GetTodolistGroup",
                        "ListTodolistGroups",
                        "RepositionTodolistGroup",
                        "UpdateTodolistGroup",
                    ]),
                ),
                (
                    "Todolists".to_string(),
                    strings(&[
                        "CreateTodolist",
                        "GetTodolist",
                        "ListTodolists",
                        "UpdateTodolist",
                    ]),
                ),
            ]),
        );

        Self {
            verb_prefixes,
            simple_resources,
            method_overrides,
            tag_groups,
            service_splits,
        }
    }
}
