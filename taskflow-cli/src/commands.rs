use anyhow::Result;

use crate::api::dto::{
    CreateProjectRequest, CreateTaskRequest, LoginRequest, ProjectDto, RegisterRequest,
    TaskDto, UpdateProjectRequest, UpdateTaskRequest,
};
use crate::api::ApiClient;
use crate::cli::{ProjectCommands, StatusArg, TaskCommands};
use crate::session_store;
use crate::state::SessionState;

pub async fn register(client: &ApiClient, email: String, name: Option<String>) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;

    let response = client
        .register(&RegisterRequest {
            email,
            password,
            name,
        })
        .await?;

    session_store::save_token(&response.access_token)?;
    println!(
        "Registered as {} (slug: {}). Session saved.",
        response.user.email, response.user.slug
    );
    Ok(())
}

pub async fn login(client: &ApiClient, email: String) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;

    let response = client.login(&LoginRequest { email, password }).await?;

    session_store::save_token(&response.access_token)?;
    println!("Logged in as {}. Session saved.", response.user.email);
    Ok(())
}

pub fn logout(state: &mut SessionState) -> Result<()> {
    session_store::clear_token()?;
    state.reset();
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(client: &ApiClient) -> Result<()> {
    let user = client.me().await?;
    println!("{} <{}>", user.name.as_deref().unwrap_or("(no name)"), user.email);
    println!("id: {}  slug: {}  member since: {}", user.id, user.slug, user.created_at);
    Ok(())
}

pub async fn health(client: &ApiClient) -> Result<()> {
    let health = client.health().await?;
    println!("status: {}  database: {}", health.status, health.database);
    Ok(())
}

pub async fn project(
    client: &ApiClient,
    state: &mut SessionState,
    command: ProjectCommands,
) -> Result<()> {
    match command {
        ProjectCommands::List => {
            state.projects.set_all(client.list_projects().await?);
            render_projects(state.projects.all());
        }
        ProjectCommands::Create { name, description } => {
            state.projects.set_all(client.list_projects().await?);

            let created = client
                .create_project(&CreateProjectRequest { name, description })
                .await?;
            println!("Created project {} (slug: {})", created.id, created.slug);

            state.projects.add_project(created);
            render_projects(state.projects.all());
        }
        ProjectCommands::Show { project } => {
            let found = match project.parse::<i32>() {
                Ok(id) => client.get_project(id).await?,
                Err(_) => client.get_project_by_slug(&project).await?,
            };
            print_project(&found);
        }
        ProjectCommands::Update {
            id,
            name,
            description,
        } => {
            state.projects.set_all(client.list_projects().await?);

            let updated = client
                .update_project(id, &UpdateProjectRequest { name, description })
                .await?;

            state.projects.update_project(updated.clone());
            print_project(&updated);
        }
        ProjectCommands::Delete { id } => {
            state.projects.set_all(client.list_projects().await?);

            client.delete_project(id).await?;
            println!("Deleted project {} and its tasks.", id);

            state.projects.remove_project(id);
            state.tasks.remove_project_tasks(id);
            render_projects(state.projects.all());
        }
    }

    Ok(())
}

pub async fn task(
    client: &ApiClient,
    state: &mut SessionState,
    command: TaskCommands,
) -> Result<()> {
    match command {
        TaskCommands::List { project } => {
            state.tasks.set_all(client.list_tasks(project).await?);
            render_tasks(state.tasks.all());
        }
        TaskCommands::Add {
            title,
            project,
            description,
            priority,
        } => {
            state.tasks.set_all(client.list_tasks(Some(project)).await?);

            let created = client
                .create_task(&CreateTaskRequest {
                    title,
                    description,
                    project_id: project,
                    priority: priority.map(|p| p.as_wire().to_string()),
                })
                .await?;
            println!("Created task {} (slug: {})", created.id, created.slug);

            state.tasks.add_task(created);
            render_tasks(state.tasks.all());
        }
        TaskCommands::Show { id } => {
            let found = client.get_task(id).await?;
            print_task(&found);
        }
        TaskCommands::Update {
            id,
            title,
            description,
            status,
            priority,
        } => {
            let updated = client
                .update_task(
                    id,
                    &UpdateTaskRequest {
                        title,
                        description,
                        status: status.map(|s| s.as_wire().to_string()),
                        priority: priority.map(|p| p.as_wire().to_string()),
                    },
                )
                .await?;

            state.tasks.update_task(updated.clone());
            print_task(&updated);
        }
        TaskCommands::Done { id } => {
            let updated = client
                .update_task(
                    id,
                    &UpdateTaskRequest {
                        status: Some(StatusArg::Done.as_wire().to_string()),
                        ..UpdateTaskRequest::default()
                    },
                )
                .await?;

            state.tasks.update_task(updated.clone());
            print_task(&updated);
        }
        TaskCommands::Delete { id } => {
            state.tasks.set_all(client.list_tasks(None).await?);

            client.delete_task(id).await?;
            println!("Deleted task {}.", id);

            state.tasks.remove_task(id);
            render_tasks(state.tasks.all());
        }
    }

    Ok(())
}

fn render_projects(projects: &[ProjectDto]) {
    if projects.is_empty() {
        println!("No projects.");
        return;
    }

    println!("{:<5} {:<28} {:<28} {}", "ID", "NAME", "SLUG", "UPDATED");
    for project in projects {
        println!(
            "{:<5} {:<28} {:<28} {}",
            project.id, project.name, project.slug, project.updated_at
        );
    }
}

fn render_tasks(tasks: &[TaskDto]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    println!(
        "{:<5} {:<32} {:<12} {:<10} {}",
        "ID", "TITLE", "STATUS", "PRIORITY", "PROJECT"
    );
    for task in tasks {
        println!(
            "{:<5} {:<32} {:<12} {:<10} {}",
            task.id, task.title, task.status, task.priority, task.project_id
        );
    }
}

fn print_project(project: &ProjectDto) {
    println!("Project {}: {}", project.id, project.name);
    println!("  slug:        {}", project.slug);
    if let Some(description) = &project.description {
        println!("  description: {}", description);
    }
    println!("  created:     {}", project.created_at);
    println!("  updated:     {}", project.updated_at);
}

fn print_task(task: &TaskDto) {
    println!("Task {}: {}", task.id, task.title);
    println!("  status:      {}", task.status);
    println!("  priority:    {}", task.priority);
    println!("  slug:        {}", task.slug);
    println!("  project:     {}", task.project_id);
    if let Some(description) = &task.description {
        println!("  description: {}", description);
    }
    println!("  created:     {}", task.created_at);
    println!("  updated:     {}", task.updated_at);
}
