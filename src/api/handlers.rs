//! api::handlers
//!
//! One function per endpoint. Path parameters arrive as raw strings and are
//! validated here; request bodies arrive already deserialized.

use serde::Serialize;
use serde_json::Value;

use crate::core::types::{ProjectName, ResourcePath, ServiceName, StageName, TypeError};
use crate::store::{ConfigStore, ResourceScope, StoreError};

use super::models::{
    ErrorPayload, ProjectPayload, ResourcePayload, Resources, StagePayload, Stages, VersionPayload,
};

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(e) => {
                log::error!("cannot serialize response: {}", e);
                Self::error(500, "Could not encode response.")
            }
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let payload = ErrorPayload {
            code: status,
            message: message.into(),
        };
        Self {
            status,
            body: serde_json::to_value(payload).ok(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The error payload, if this is an error response.
    pub fn error_payload(&self) -> Option<ErrorPayload> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_value(b.clone()).ok())
            .filter(|_| !self.is_success())
    }
}

/// Client errors pass their message through; storage detail stays in the log.
fn failure(status: u16, err: &StoreError, fallback: &str) -> ApiResponse {
    if err.is_client_error() {
        ApiResponse::error(status, err.to_string())
    } else {
        log::error!("{}: {}", fallback, err);
        ApiResponse::error(status, fallback)
    }
}

fn parse_scope(stage: Option<&str>, service: Option<&str>) -> Result<ResourceScope, StoreError> {
    match (stage, service) {
        (None, None) => Ok(ResourceScope::Project),
        (Some(stage), None) => Ok(ResourceScope::Stage(StageName::new(stage)?)),
        (Some(stage), Some(service)) => Ok(ResourceScope::Service(
            StageName::new(stage)?,
            ServiceName::new(service)?,
        )),
        (None, Some(service)) => Err(TypeError::InvalidServiceName(format!(
            "service '{}' requires a stage",
            service
        ))
        .into()),
    }
}

// =============================================================================
// Projects
// =============================================================================

pub fn post_project(store: &ConfigStore, body: &ProjectPayload) -> ApiResponse {
    let project = match ProjectName::new(body.project_name.as_str()) {
        Ok(p) => p,
        Err(e) => return ApiResponse::error(400, e.to_string()),
    };

    match store.create_project(&project) {
        Ok(_) => ApiResponse::no_content(),
        Err(e @ StoreError::AlreadyExists { .. }) => ApiResponse::error(409, e.to_string()),
        Err(e) => failure(400, &e, "Could not create project."),
    }
}

pub fn delete_project(store: &ConfigStore, project: &str) -> ApiResponse {
    let Ok(project) = ProjectName::new(project) else {
        return ApiResponse::error(404, "Project does not exist.");
    };

    match store.delete_project(&project) {
        Ok(()) => ApiResponse::no_content(),
        Err(StoreError::ProjectNotFound { .. }) => ApiResponse::error(404, "Project does not exist."),
        Err(e) => failure(500, &e, "Could not delete project."),
    }
}

// =============================================================================
// Stages
// =============================================================================

pub fn post_stage(store: &ConfigStore, project: &str, body: &StagePayload) -> ApiResponse {
    let (project, stage) = match (ProjectName::new(project), StageName::new(body.stage_name.as_str())) {
        (Ok(p), Ok(s)) => (p, s),
        (Err(_), _) => return ApiResponse::error(400, "Project does not exist."),
        (_, Err(e)) => return ApiResponse::error(400, e.to_string()),
    };

    match store.create_stage(&project, &stage) {
        Ok(_) => ApiResponse::no_content(),
        Err(StoreError::ProjectNotFound { .. }) => ApiResponse::error(400, "Project does not exist."),
        Err(e) => {
            log::error!("could not create stage {}/{}: {}", project, stage, e);
            ApiResponse::error(400, "Could not create stage.")
        }
    }
}

pub fn get_stages(store: &ConfigStore, project: &str) -> ApiResponse {
    let Ok(project) = ProjectName::new(project) else {
        return ApiResponse::error(404, "Project does not exist.");
    };

    match store.list_stages(&project) {
        Ok(stages) => {
            let stages = stages
                .into_iter()
                .map(|s| StagePayload {
                    stage_name: s.name.to_string(),
                })
                .collect();
            ApiResponse::json(200, &Stages::single_page(stages))
        }
        Err(StoreError::ProjectNotFound { .. }) => ApiResponse::error(404, "Project does not exist."),
        Err(e @ StoreError::MalformedDefinition(_)) => {
            log::error!("{}: {}", project, e);
            ApiResponse::error(500, "Could not read shipyard file.")
        }
        Err(e) => {
            log::error!("{}: {}", project, e);
            ApiResponse::error(500, "Could not retrieve stages.")
        }
    }
}

pub fn get_stage(store: &ConfigStore, project: &str, stage: &str) -> ApiResponse {
    let Ok(project) = ProjectName::new(project) else {
        return ApiResponse::error(404, "Project not found");
    };
    let Ok(stage) = StageName::new(stage) else {
        return ApiResponse::error(404, "Stage not found");
    };

    match store.get_stage(&project, &stage) {
        Ok(stage) => ApiResponse::json(
            200,
            &StagePayload {
                stage_name: stage.name.to_string(),
            },
        ),
        Err(StoreError::ProjectNotFound { .. }) => ApiResponse::error(404, "Project not found"),
        Err(StoreError::StageNotFound { .. }) => ApiResponse::error(404, "Stage not found"),
        Err(e) => failure(500, &e, "Could not retrieve stage."),
    }
}

fn not_implemented(result: Result<(), StoreError>, operation: &'static str) -> ApiResponse {
    let err = match result {
        Err(e @ StoreError::Unsupported { .. }) => e,
        _ => StoreError::Unsupported { operation },
    };
    ApiResponse::error(501, err.to_string())
}

pub fn put_stage(store: &ConfigStore, project: &str, stage: &str) -> ApiResponse {
    let result = match (ProjectName::new(project), StageName::new(stage)) {
        (Ok(p), Ok(s)) => store.update_stage(&p, &s),
        _ => Ok(()),
    };
    not_implemented(result, "updating a stage")
}

pub fn delete_stage(store: &ConfigStore, project: &str, stage: &str) -> ApiResponse {
    let result = match (ProjectName::new(project), StageName::new(stage)) {
        (Ok(p), Ok(s)) => store.delete_stage(&p, &s),
        _ => Ok(()),
    };
    not_implemented(result, "deleting a stage")
}

// =============================================================================
// Resources
// =============================================================================

fn put_resources(
    store: &ConfigStore,
    project: &str,
    stage: Option<&str>,
    service: Option<&str>,
    body: &Resources,
) -> ApiResponse {
    let prepared = (|| -> Result<_, StoreError> {
        let project = ProjectName::new(project)?;
        let scope = parse_scope(stage, service)?;
        let resources = body
            .resources
            .iter()
            .map(|r| -> Result<(ResourcePath, Vec<u8>), StoreError> {
                Ok((
                    ResourcePath::new(r.resource_uri.as_str())?,
                    r.resource_content.clone().into_bytes(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((project, scope, resources))
    })();

    let result = prepared.and_then(|(project, scope, resources)| {
        store.put_resources(&project, &scope, &resources)
    });

    match result {
        Ok(version) => ApiResponse::json(
            201,
            &VersionPayload {
                version: version.to_string(),
            },
        ),
        Err(e) => failure(400, &e, "Could not update resources."),
    }
}

pub fn put_project_resources(store: &ConfigStore, project: &str, body: &Resources) -> ApiResponse {
    put_resources(store, project, None, None, body)
}

pub fn put_stage_resources(
    store: &ConfigStore,
    project: &str,
    stage: &str,
    body: &Resources,
) -> ApiResponse {
    put_resources(store, project, Some(stage), None, body)
}

pub fn put_service_resources(
    store: &ConfigStore,
    project: &str,
    stage: &str,
    service: &str,
    body: &Resources,
) -> ApiResponse {
    put_resources(store, project, Some(stage), Some(service), body)
}

/// Read one resource, at the branch head or at `version`.
pub fn get_resource(
    store: &ConfigStore,
    project: &str,
    stage: Option<&str>,
    service: Option<&str>,
    path: &str,
    version: Option<&str>,
) -> ApiResponse {
    let parsed = (|| -> Result<_, StoreError> {
        Ok((
            ProjectName::new(project)?,
            parse_scope(stage, service)?,
            ResourcePath::new(path)?,
        ))
    })();
    let (project, scope, path) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return ApiResponse::error(400, e.to_string()),
    };

    let content = match version {
        Some(version) => store.get_resource_at_version(&project, &scope, &path, version),
        None => store
            .get_resource(&project, &scope, &path)
            .map(|resource| resource.content),
    };

    match content {
        Ok(content) => match String::from_utf8(content) {
            Ok(text) => ApiResponse::json(
                200,
                &ResourcePayload {
                    resource_uri: path.to_string(),
                    resource_content: text,
                },
            ),
            Err(_) => {
                log::error!("{}/{} is not valid UTF-8", project, path);
                ApiResponse::error(500, "Resource content is not valid UTF-8.")
            }
        },
        Err(
            e @ (StoreError::ProjectNotFound { .. }
            | StoreError::StageNotFound { .. }
            | StoreError::ResourceNotFound { .. }
            | StoreError::VersionNotFound { .. }),
        ) => ApiResponse::error(404, e.to_string()),
        Err(e) => failure(500, &e, "Could not retrieve resource."),
    }
}

pub fn delete_resource(
    store: &ConfigStore,
    project: &str,
    stage: Option<&str>,
    service: Option<&str>,
    path: &str,
) -> ApiResponse {
    let parsed = (|| -> Result<_, StoreError> {
        Ok((
            ProjectName::new(project)?,
            parse_scope(stage, service)?,
            ResourcePath::new(path)?,
        ))
    })();
    let (project, scope, path) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return ApiResponse::error(400, e.to_string()),
    };

    match store.delete_resource(&project, &scope, &path) {
        Ok(version) => ApiResponse::json(
            200,
            &VersionPayload {
                version: version.to_string(),
            },
        ),
        Err(
            e @ (StoreError::ProjectNotFound { .. }
            | StoreError::StageNotFound { .. }
            | StoreError::ResourceNotFound { .. }),
        ) => ApiResponse::error(404, e.to_string()),
        Err(e) => failure(400, &e, "Could not delete resource."),
    }
}
