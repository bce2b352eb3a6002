//! Line commands for the terminal booking shell and their text rendering.

use client_core::{CascadeEvent, CascadeState, Notice};
use shared::domain::Directory;

pub const HELP: &str = "\
Commands:
  departments            list departments
  department <name>      choose a department (empty to clear)
  doctor <name>          choose a doctor from the department
  date <value>           set the appointment date, e.g. 2025-03-01
  time <value>           choose one of the available times
  issue <text>           describe the reason for the visit
  submit                 book the appointment
  show                   print the current form
  list                   print saved appointments
  help                   print this help
  quit                   leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Blank,
    Help,
    Quit,
    Departments,
    Show,
    List,
    Update(CascadeEvent),
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };
    let value = rest.to_string();

    let command = match keyword.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Blank,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "departments" => ShellCommand::Departments,
        "show" => ShellCommand::Show,
        "list" => ShellCommand::List,
        "department" | "dept" => ShellCommand::Update(CascadeEvent::DepartmentChanged(value)),
        "doctor" => ShellCommand::Update(CascadeEvent::DoctorChanged(value)),
        "date" => ShellCommand::Update(CascadeEvent::DateChanged(value)),
        "time" => ShellCommand::Update(CascadeEvent::TimeChanged(value)),
        "issue" => ShellCommand::Update(CascadeEvent::IssueChanged(value)),
        "submit" | "book" => ShellCommand::Update(CascadeEvent::Submitted),
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(command)
}

/// What to print back after an update has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Doctors,
    Times,
    Time,
    Issue,
    Submission,
}

impl Echo {
    pub fn for_event(event: &CascadeEvent) -> Option<Self> {
        match event {
            CascadeEvent::DepartmentChanged(_) => Some(Self::Doctors),
            CascadeEvent::DoctorChanged(_) | CascadeEvent::DateChanged(_) => Some(Self::Times),
            CascadeEvent::TimeChanged(_) => Some(Self::Time),
            CascadeEvent::IssueChanged(_) => Some(Self::Issue),
            CascadeEvent::Submitted => Some(Self::Submission),
            _ => None,
        }
    }

    pub fn render(self, state: &CascadeState) -> String {
        match self {
            Self::Doctors => format_options("Doctors", state.doctor_options()),
            Self::Times => {
                if state.scope().is_complete() {
                    format_options("Times", state.time_options())
                } else {
                    "Times: choose a department, doctor and date first".to_string()
                }
            }
            Self::Time => format!("Time: {}", display_value(state.time())),
            Self::Issue => format!("Issue: {}", display_value(state.issue().trim())),
            Self::Submission => describe_form(state),
        }
    }
}

pub fn format_options<S: AsRef<str>>(label: &str, options: &[S]) -> String {
    if options.is_empty() {
        return format!("{label}: (none)");
    }
    let joined = options
        .iter()
        .map(|option| option.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{label}: {joined}")
}

pub fn format_departments(directory: &Directory) -> String {
    let departments = directory.departments().collect::<Vec<_>>();
    format_options("Departments", &departments)
}

pub fn format_notice(notice: &Notice) -> String {
    if notice.is_error() {
        format!("error: {}", notice.message())
    } else {
        format!("ok: {}", notice.message())
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn describe_form(state: &CascadeState) -> String {
    [
        format!("Department: {}", display_value(state.department())),
        format!("Doctor:     {}", display_value(state.doctor())),
        format!("Date:       {}", display_value(state.date())),
        format!("Time:       {}", display_value(state.time())),
        format!("Issue:      {}", display_value(state.issue().trim())),
    ]
    .join("\n")
}

pub fn describe_appointments(state: &CascadeState) -> String {
    let view = state.appointments();
    if !view.is_loaded() {
        return "Appointments have not been loaded.".to_string();
    }
    view.to_plain_text()
}
