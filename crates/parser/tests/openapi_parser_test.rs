//! Integration test for OpenAPI parser

use clientgen_common::{FieldType, GeneratorConfig, HttpMethod, SchemaKind};
use clientgen_parser::openapi::OpenApiParser;

const TODOS_API: &str = r##"{
    "openapi": "3.1.0",
    "info": {
        "title": "Todos API",
        "version": "2024-01-01"
    },
    "paths": {
        "/{accountId}/buckets/{projectId}/todolists/{todolistId}/todos.json": {
            "parameters": [
                { "$ref": "#/components/parameters/AccountId" },
                { "name": "projectId", "in": "path", "required": true, "schema": { "type": "integer" } },
                { "name": "todolistId", "in": "path", "required": true, "schema": { "type": "integer" } }
            ],
            "get": {
                "operationId": "ListTodos",
                "tags": ["Todos"],
                "description": "List todos in a todolist",
                "x-pagination": { "style": "link", "pageSize": 50 },
                "parameters": [
                    { "name": "status", "in": "query", "schema": { "type": "string" } },
                    { "name": "completed", "in": "query", "schema": { "type": "boolean" } }
                ],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ListTodosResponseContent" }
                            }
                        }
                    },
                    "404": {
                        "description": "Not found",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/NotFoundErrorResponseContent" }
                            }
                        }
                    }
                }
            },
            "post": {
                "operationId": "CreateTodo",
                "tags": ["Todos"],
                "requestBody": {
                    "required": true,
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/CreateTodoRequestContent" }
                        }
                    }
                },
                "responses": {
                    "201": {
                        "description": "Created",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Todo" }
                            }
                        }
                    }
                }
            }
        },
        "/{accountId}/buckets/{projectId}/todos/{todoId}/completion.json": {
            "post": {
                "operationId": "CompleteTodo",
                "tags": ["Todos"],
                "parameters": [
                    { "$ref": "#/components/parameters/AccountId" },
                    { "name": "projectId", "in": "path", "required": true, "schema": { "type": "integer" } },
                    { "name": "todoId", "in": "path", "required": true, "schema": { "type": "integer" } }
                ],
                "responses": {
                    "204": { "description": "Completed" }
                }
            }
        },
        "/{accountId}/buckets/{projectId}/todolists/{todolistId}/groups.json": {
            "get": {
                "operationId": "ListTodolistGroups",
                "tags": ["Todos"],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/TodolistGroup" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "/{accountId}/buckets/{projectId}/recordings/{recordingId}.json": {
            "get": {
                "operationId": "GetRecording",
                "tags": ["Recordings"],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Recording" }
                            }
                        }
                    }
                }
            }
        },
        "/{accountId}/reports/progress.json": {
            "get": {
                "operationId": "GetProgressReport",
                "tags": ["Reports"],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ProgressByPerson" }
                            }
                        }
                    }
                }
            }
        },
        "/{accountId}/status.json": {
            "get": {
                "summary": "Health check without an operation id",
                "responses": { "200": { "description": "OK" } }
            }
        }
    },
    "components": {
        "parameters": {
            "AccountId": { "name": "accountId", "in": "path", "required": true, "schema": { "type": "string" } }
        },
        "schemas": {
            "ListTodosResponseContent": {
                "type": "array",
                "items": { "$ref": "#/components/schemas/Todo" }
            },
            "Todo": {
                "type": "object",
                "required": ["id", "title"],
                "properties": {
                    "id": { "type": "integer", "format": "int64" },
                    "title": { "type": "string" },
                    "creator": { "$ref": "#/components/schemas/Person" },
                    "parent": { "$ref": "#/components/schemas/Todolist" },
                    "completed": { "type": "boolean" }
                }
            },
            "Todolist": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" },
                    "todos": { "type": "array", "items": { "$ref": "#/components/schemas/Todo" } }
                }
            },
            "TodolistGroup": {
                "type": "object",
                "properties": { "name": { "type": "string" } }
            },
            "Person": {
                "type": "object",
                "properties": { "name": { "type": "string" } }
            },
            "CreateTodoRequestContent": {
                "type": "object",
                "required": ["content"],
                "properties": {
                    "content": { "type": "string" },
                    "assignee": { "$ref": "#/components/schemas/Person" },
                    "notify": { "type": "boolean" }
                }
            },
            "Recording": {
                "oneOf": [
                    { "type": "object", "properties": { "title": { "type": "string" }, "todo": { "$ref": "#/components/schemas/Todo" } } },
                    { "type": "object", "properties": { "subject": { "type": "string" }, "title": { "type": "string" } } }
                ]
            },
            "ProgressByPerson": {
                "type": "object",
                "additionalProperties": { "$ref": "#/components/schemas/Person" }
            },
            "NotFoundErrorResponseContent": {
                "type": "object",
                "properties": { "error": { "type": "string" } }
            }
        }
    }
}"##;

fn parse() -> clientgen_common::ApiDefinition {
    OpenApiParser::from_json(TODOS_API, GeneratorConfig::default())
        .unwrap()
        .parse()
        .unwrap()
}

#[test]
fn test_operations_parsed_and_sorted() {
    let api = parse();
    assert_eq!(api.title, "Todos API");

    let ids: Vec<_> = api.operations.iter().map(|o| o.operation_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "CompleteTodo",
            "CreateTodo",
            "GetProgressReport",
            "GetRecording",
            "ListTodolistGroups",
            "ListTodos"
        ]
    );

    for op in &api.operations {
        assert_eq!(op.is_mutation, op.http_method != HttpMethod::Get);
        assert!(op.path_params.iter().all(|p| p.name != "accountId"));
    }
}

#[test]
fn test_paginated_list_operation() {
    let api = parse();
    let list = api
        .operations
        .iter()
        .find(|o| o.operation_id == "ListTodos")
        .unwrap();

    assert!(list.returns_array);
    assert!(list.is_paginated);
    assert!(list.is_paginated_list());
    assert!(list.has_options());
    assert_eq!(list.method_name, "list");
    assert_eq!(list.response_type, Some(FieldType::Ref("Todo".to_string())));

    let path: Vec<_> = list.path_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(path, vec!["projectId", "todolistId"]);
    let query: Vec<_> = list.query_params.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(query, vec!["status", "completed"]);
}

#[test]
fn test_void_and_override() {
    let api = parse();
    let complete = api
        .operations
        .iter()
        .find(|o| o.operation_id == "CompleteTodo")
        .unwrap();
    assert!(complete.returns_void);
    assert!(complete.is_mutation);
    assert_eq!(complete.method_name, "complete");

    let progress = api
        .operations
        .iter()
        .find(|o| o.operation_id == "GetProgressReport")
        .unwrap();
    assert_eq!(progress.method_name, "progress");
}

#[test]
fn test_service_groups() {
    let api = parse();
    let names: Vec<_> = api.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Recordings", "Reports", "TodolistGroups", "Todos"]);

    let todos = api.groups.iter().find(|g| g.name == "Todos").unwrap();
    let ids: Vec<_> = todos.operations.iter().map(|o| o.operation_id.as_str()).collect();
    assert_eq!(ids, vec!["CompleteTodo", "CreateTodo", "ListTodos"]);
    assert_eq!(
        todos.entity_types.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["CreateTodoRequestContent", "Todo"]
    );
}

#[test]
fn test_model_collection() {
    let api = parse();

    let entities: Vec<_> = api.models.entities.keys().map(String::as_str).collect();
    assert_eq!(
        entities,
        vec!["Person", "ProgressByPerson", "Recording", "Todo", "Todolist", "TodolistGroup"]
    );
    let requests: Vec<_> = api.models.requests.keys().map(String::as_str).collect();
    assert_eq!(requests, vec!["CreateTodoRequestContent"]);

    // Array wrappers and error responses are never models
    assert!(!api.models.contains("ListTodosResponseContent"));
    assert!(!api.models.contains("NotFoundErrorResponseContent"));

    // Every type a service references is emitted
    for group in &api.groups {
        for name in &group.entity_types {
            assert!(api.models.contains(name), "{} missing from models", name);
        }
    }
}

#[test]
fn test_schema_kinds() {
    let api = parse();

    match &api.models.entities["ProgressByPerson"].kind {
        SchemaKind::Map { value } => assert_eq!(value, &FieldType::Ref("Person".to_string())),
        other => panic!("expected map, got {:?}", other),
    }

    match &api.models.entities["Recording"].kind {
        SchemaKind::Union { variants } => {
            assert_eq!(variants.len(), 2);
            let merged = clientgen_parser::flatten_variants(variants);
            let names: Vec<_> = merged.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["subject", "title", "todo"]);
        }
        other => panic!("expected union, got {:?}", other),
    }

    match &api.models.entities["Todolist"].kind {
        SchemaKind::Object { properties, .. } => {
            let todos = properties.iter().find(|p| p.name == "todos").unwrap();
            assert_eq!(
                todos.field_type,
                FieldType::List(Box::new(FieldType::Ref("Todo".to_string())))
            );
        }
        other => panic!("expected object, got {:?}", other),
    }
}

#[test]
fn test_parse_is_deterministic() {
    assert_eq!(parse(), parse());
}
