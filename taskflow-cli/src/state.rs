//! Session-scoped view-state mirrors of the server's lists.
//!
//! Stores are plain values constructed per authenticated session and reset
//! on logout; mutation happens only through the explicit methods below.
//! Command handlers apply a mutation to the store only after the API call
//! succeeded; on failure the prior state is left untouched (no rollback or
//! retry).

use crate::api::dto::{ProjectDto, TaskDto};

#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: Vec<ProjectDto>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[ProjectDto] {
        &self.projects
    }

    /// Replace the whole mirror with a fresh server listing.
    pub fn set_all(&mut self, projects: Vec<ProjectDto>) {
        self.projects = projects;
    }

    /// Prepend a newly created project (listings are most-recently-updated
    /// first).
    pub fn add_project(&mut self, project: ProjectDto) {
        self.projects.insert(0, project);
    }

    /// Replace the project with the same id, if mirrored.
    pub fn update_project(&mut self, project: ProjectDto) {
        if let Some(existing) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *existing = project;
        }
    }

    pub fn remove_project(&mut self, id: i32) {
        self.projects.retain(|p| p.id != id);
    }

    pub fn get_by_id(&self, id: i32) -> Option<&ProjectDto> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&ProjectDto> {
        self.projects.iter().find(|p| p.slug == slug)
    }

    pub fn reset(&mut self) {
        self.projects.clear();
    }
}

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<TaskDto>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[TaskDto] {
        &self.tasks
    }

    pub fn set_all(&mut self, tasks: Vec<TaskDto>) {
        self.tasks = tasks;
    }

    /// Prepend a newly created task (listings are newest first).
    pub fn add_task(&mut self, task: TaskDto) {
        self.tasks.insert(0, task);
    }

    pub fn update_task(&mut self, task: TaskDto) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        }
    }

    pub fn remove_task(&mut self, id: i32) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Drop every task mirrored from one project, as a project cascade
    /// delete does on the server.
    pub fn remove_project_tasks(&mut self, project_id: i32) {
        self.tasks.retain(|t| t.project_id != project_id);
    }

    pub fn reset(&mut self) {
        self.tasks.clear();
    }
}

/// All per-session client state. Built after authentication, dropped (or
/// reset) on logout; nothing here is global.
#[derive(Debug, Default)]
pub struct SessionState {
    pub projects: ProjectStore,
    pub tasks: TaskStore,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.projects.reset();
        self.tasks.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i32, name: &str) -> ProjectDto {
        ProjectDto {
            id,
            name: name.to_string(),
            description: None,
            slug: name.to_lowercase(),
            user_id: 1,
            created_at: "2024-06-12T00:00:00Z".to_string(),
            updated_at: "2024-06-12T00:00:00Z".to_string(),
        }
    }

    fn task(id: i32, project_id: i32, title: &str) -> TaskDto {
        TaskDto {
            id,
            title: title.to_string(),
            description: None,
            status: "OPEN".to_string(),
            priority: "MEDIUM".to_string(),
            slug: title.to_lowercase(),
            project_id,
            created_at: "2024-06-12T00:00:00Z".to_string(),
            updated_at: "2024-06-12T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn add_prepends_to_the_mirror() {
        let mut store = ProjectStore::new();
        store.set_all(vec![project(1, "Old")]);
        store.add_project(project(2, "New"));

        let ids: Vec<i32> = store.all().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn update_replaces_only_the_matching_project() {
        let mut store = ProjectStore::new();
        store.set_all(vec![project(1, "Alpha"), project(2, "Beta")]);

        store.update_project(project(2, "Renamed"));

        assert_eq!(store.get_by_id(1).unwrap().name, "Alpha");
        assert_eq!(store.get_by_id(2).unwrap().name, "Renamed");
    }

    #[test]
    fn update_of_unknown_id_leaves_the_mirror_untouched() {
        let mut store = ProjectStore::new();
        store.set_all(vec![project(1, "Alpha")]);

        store.update_project(project(99, "Ghost"));

        assert_eq!(store.all().len(), 1);
        assert!(store.get_by_id(99).is_none());
    }

    #[test]
    fn remove_and_lookup_by_slug() {
        let mut store = ProjectStore::new();
        store.set_all(vec![project(1, "Alpha"), project(2, "Beta")]);

        store.remove_project(1);
        assert!(store.get_by_id(1).is_none());
        assert_eq!(store.get_by_slug("beta").unwrap().id, 2);
    }

    #[test]
    fn cascade_removal_drops_only_that_projects_tasks() {
        let mut store = TaskStore::new();
        store.set_all(vec![task(1, 10, "a"), task(2, 10, "b"), task(3, 20, "c")]);

        store.remove_project_tasks(10);

        let ids: Vec<i32> = store.all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn reset_clears_every_mirror() {
        let mut state = SessionState::new();
        state.projects.set_all(vec![project(1, "Alpha")]);
        state.tasks.set_all(vec![task(1, 1, "a")]);

        state.reset();

        assert!(state.projects.all().is_empty());
        assert!(state.tasks.all().is_empty());
    }
}
