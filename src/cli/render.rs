//! Terminal rendering of tasks.

use colored::*;

use tasktrack::domain::{Task, TaskStatus, timestamp};

/// Which listing the user asked for; each has its own header and empty message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    All,
    Status(TaskStatus),
    Done,
    Pending,
    InProgress,
}

impl ListView {
    pub fn header(&self) -> ColoredString {
        match self {
            ListView::All => "📋 Your tasks:".cyan(),
            ListView::Status(status) => format!("📋 Your {} tasks:", status).cyan(),
            ListView::Done => "✅ Completed tasks:".green(),
            ListView::Pending => "📋 Pending tasks:".cyan(),
            ListView::InProgress => "🔄 Tasks in progress:".blue(),
        }
    }

    pub fn empty_message(&self) -> ColoredString {
        match self {
            ListView::All => {
                let hint = format!("{} add \"your task\"", env!("CARGO_PKG_NAME"));
                format!("📋 No tasks yet! Add one with: {}", hint).yellow()
            }
            ListView::Status(status) => format!("📋 No {} tasks found!", status).yellow(),
            ListView::Done => "✅ No completed tasks yet!".yellow(),
            ListView::Pending => "📋 No pending tasks! Great job!".yellow(),
            ListView::InProgress => "🔄 No tasks in progress!".yellow(),
        }
    }
}

pub fn status_emoji(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "⏳",
        TaskStatus::InProgress => "🔄",
        TaskStatus::Done => "✅",
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Yellow,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::Done => Color::Green,
    }
}

/// One line of a listing.
pub fn task_line(task: &Task) -> String {
    format!(
        "  {} {} {} {}",
        status_emoji(task.status),
        format!("#{}:", task.id).white(),
        task.title.bold(),
        format!("({})", task.status).color(status_color(task.status))
    )
}

/// Full listing for a view, header included.
pub fn task_list(view: ListView, tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return view.empty_message().to_string();
    }

    let mut lines = vec![view.header().to_string()];
    lines.extend(tasks.iter().map(task_line));
    lines.join("\n")
}

/// Multi-line detail view used by `show`.
pub fn task_detail(task: &Task) -> String {
    [
        format!("{} {} {}", status_emoji(task.status), format!("#{}:", task.id).white(), task.title.bold()),
        format!("  status:  {}", task.status.as_str().color(status_color(task.status))),
        format!("  created: {}", timestamp::format(&task.created_at)),
        format!("  updated: {}", timestamp::format(&task.updated_at)),
    ]
    .join("\n")
}
