//! `tasklist`: running processes as CSV rows

use indexmap::IndexMap;
use std::fmt;

use super::{CommandError, CommandRunner};

pub const IMAGE_NAME: &str = "Image Name";

const RULE_WIDTH: usize = 51;

pub type Task = IndexMap<String, String>;

/// Snapshot of the running tasks, sorted by their CSV line
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn load(runner: &impl CommandRunner) -> Result<Self, CommandError> {
        let args = ["/fi", "STATUS eq running", "/fo", "CSV"].map(String::from);
        let output = runner.output("tasklist", &args)?;
        Self::from_csv(&output)
    }

    /// Parse `tasklist /fo CSV` output; the header line stays first
    pub fn from_csv(output: &str) -> Result<Self, CommandError> {
        let mut lines = output.trim().lines();
        let Some(header) = lines.next() else {
            return Ok(Self::default());
        };
        let mut rows: Vec<&str> = lines.collect();
        rows.sort_unstable();

        let mut text = String::from(header);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();

        let mut tasks = Vec::new();
        for record in reader.records() {
            let record = record?;
            let task: Task = headers
                .iter()
                .zip(record.iter())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            tasks.push(task);
        }

        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn headers(&self) -> Vec<&str> {
        self.tasks
            .first()
            .map(|task| task.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Tasks whose `key` column equals `value`, ignoring case
    pub fn instances(&self, value: &str, key: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.get(key).is_some_and(|v| v.eq_ignore_ascii_case(value)))
            .collect()
    }

    pub fn running_exes(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .map(|task| task.get(IMAGE_NAME).map(String::as_str).unwrap_or("None"))
            .collect()
    }

    pub fn is_running(&self, exe: &str) -> bool {
        self.running_exes().iter().any(|name| name.eq_ignore_ascii_case(exe))
    }
}

impl fmt::Display for TaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!(" {}", "-".repeat(RULE_WIDTH));
        writeln!(f, "{}", rule)?;
        for task in &self.tasks {
            for (k, v) in task {
                writeln!(f, "|   {:15} : {:30}|", k, v)?;
            }
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
