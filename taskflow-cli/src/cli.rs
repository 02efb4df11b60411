use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "taskflow")]
#[command(about = "Command line client for the TaskFlow API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account and log in
    Register {
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Authenticate and save the session token
    Login { email: String },
    /// Remove the local session token
    Logout,
    /// Show the currently authenticated user
    Whoami,
    /// Check API and database health
    Health,
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// List your projects, most recently updated first
    List,
    /// Create a project
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show one project, by id or slug
    Show { project: String },
    /// Update name and/or description
    Update {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a project and all of its tasks
    Delete { id: i32 },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    /// List your tasks, newest first
    List {
        /// Only tasks in this project
        #[arg(long)]
        project: Option<i32>,
    },
    /// Add a task to a project
    Add {
        title: String,
        #[arg(long)]
        project: i32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
    },
    /// Show one task
    Show { id: i32 },
    /// Update fields of a task
    Update {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
    },
    /// Mark a task as done
    Done { id: i32 },
    /// Delete a task
    Delete { id: i32 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Open,
    InProgress,
    Done,
}

impl StatusArg {
    /// The wire representation the API expects.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl PriorityArg {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::VeryHigh => "VERY_HIGH",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::VeryLow => "VERY_LOW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_values_match_the_api() {
        assert_eq!(StatusArg::Open.as_wire(), "OPEN");
        assert_eq!(StatusArg::InProgress.as_wire(), "IN_PROGRESS");
        assert_eq!(StatusArg::Done.as_wire(), "DONE");
    }

    #[test]
    fn priority_wire_values_match_the_api() {
        assert_eq!(PriorityArg::VeryHigh.as_wire(), "VERY_HIGH");
        assert_eq!(PriorityArg::VeryLow.as_wire(), "VERY_LOW");
    }
}
