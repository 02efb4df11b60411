use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::api::dto::{
    ApiErrorBody, AuthResponse, CreateProjectRequest, CreateTaskRequest, HealthResponse,
    LoginRequest, ProjectDto, RegisterRequest, TaskDto, UpdateProjectRequest,
    UpdateTaskRequest, UserDto,
};

const UNAUTH_INVALID_SESSION: &str =
    "Session expired or invalid. Run `taskflow login` to authenticate.";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid API URL: {}", base_url))?;

        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for path {}", path))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, call_name: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to call {}", call_name))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            anyhow::bail!("{UNAUTH_INVALID_SESSION}");
        }

        if !response.status().is_success() {
            let status = response.status();
            // Prefer the message from the server's error envelope.
            if let Ok(body) = response.json::<ApiErrorBody>().await {
                anyhow::bail!("{} failed: {}", call_name, body.message);
            }
            anyhow::bail!("{} returned {}", call_name, status);
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, call_name: &str) -> Result<T> {
        let request = self.authed(self.client.get(self.endpoint(path)?));
        let response = self.send(request, call_name).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", call_name))
    }

    // -- auth ---------------------------------------------------------------

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        let request = self.client.post(self.endpoint("/auth/register")?).json(req);
        let response = self.send(request, "register").await?;
        response
            .json::<AuthResponse>()
            .await
            .context("Failed to parse register response")
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        let request = self.client.post(self.endpoint("/auth/login")?).json(req);
        let response = self.send(request, "login").await?;
        response
            .json::<AuthResponse>()
            .await
            .context("Failed to parse login response")
    }

    pub async fn me(&self) -> Result<UserDto> {
        self.get_json("/auth/me", "get current user").await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        // Health reports a body on failure too, so bypass the error path.
        let response = self
            .client
            .get(self.endpoint("/health")?)
            .send()
            .await
            .context("Failed to call health")?;

        response
            .json::<HealthResponse>()
            .await
            .context("Failed to parse health response")
    }

    // -- projects -----------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<ProjectDto>> {
        self.get_json("/projects", "list projects").await
    }

    pub async fn create_project(&self, req: &CreateProjectRequest) -> Result<ProjectDto> {
        let request = self
            .authed(self.client.post(self.endpoint("/projects")?))
            .json(req);
        let response = self.send(request, "create project").await?;
        response
            .json::<ProjectDto>()
            .await
            .context("Failed to parse create project response")
    }

    pub async fn get_project(&self, id: i32) -> Result<ProjectDto> {
        self.get_json(&format!("/projects/{}", id), "get project")
            .await
    }

    pub async fn get_project_by_slug(&self, slug: &str) -> Result<ProjectDto> {
        self.get_json(&format!("/projects/slug/{}", slug), "get project")
            .await
    }

    pub async fn update_project(
        &self,
        id: i32,
        req: &UpdateProjectRequest,
    ) -> Result<ProjectDto> {
        let request = self
            .authed(self.client.patch(self.endpoint(&format!("/projects/{}", id))?))
            .json(req);
        let response = self.send(request, "update project").await?;
        response
            .json::<ProjectDto>()
            .await
            .context("Failed to parse update project response")
    }

    pub async fn delete_project(&self, id: i32) -> Result<()> {
        let request = self.authed(
            self.client
                .delete(self.endpoint(&format!("/projects/{}", id))?),
        );
        self.send(request, "delete project").await?;
        Ok(())
    }

    // -- tasks --------------------------------------------------------------

    pub async fn list_tasks(&self, project_id: Option<i32>) -> Result<Vec<TaskDto>> {
        let path = match project_id {
            Some(id) => format!("/tasks?projectId={}", id),
            None => "/tasks".to_string(),
        };
        self.get_json(&path, "list tasks").await
    }

    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<TaskDto> {
        let request = self
            .authed(self.client.post(self.endpoint("/tasks")?))
            .json(req);
        let response = self.send(request, "create task").await?;
        response
            .json::<TaskDto>()
            .await
            .context("Failed to parse create task response")
    }

    pub async fn get_task(&self, id: i32) -> Result<TaskDto> {
        self.get_json(&format!("/tasks/{}", id), "get task").await
    }

    pub async fn update_task(&self, id: i32, req: &UpdateTaskRequest) -> Result<TaskDto> {
        let request = self
            .authed(self.client.patch(self.endpoint(&format!("/tasks/{}", id))?))
            .json(req);
        let response = self.send(request, "update task").await?;
        response
            .json::<TaskDto>()
            .await
            .context("Failed to parse update task response")
    }

    pub async fn delete_task(&self, id: i32) -> Result<()> {
        let request = self.authed(
            self.client
                .delete(self.endpoint(&format!("/tasks/{}", id))?),
        );
        self.send(request, "delete task").await?;
        Ok(())
    }
}
