//! CLI argument definitions using clap
//!
//! Every command is one-shot: load config, open the data directory, act,
//! print a single JSON response, exit.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::requests::{RequestStatus, RequestType, Urgency};

/// acadreq - Academic request lifecycle and access-control engine
#[derive(Parser, Debug)]
#[command(name = "acadreq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./acadreq.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the data directory (seeding example data if configured)
    Init,

    /// Start a session as the principal resolved from an email
    Login {
        #[arg(long)]
        email: String,
    },

    /// End the current session
    Logout,

    /// Show the session principal
    Whoami,

    /// List visible requests, most recent first
    List(ListArgs),

    /// Show one request with its valid next statuses
    Show {
        #[arg(long)]
        id: String,
    },

    /// Submit a new request (students only)
    Submit(SubmitArgs),

    /// Move a request to a new status
    Status {
        #[arg(long)]
        id: String,

        /// Target status
        #[arg(long)]
        to: RequestStatus,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Comment on a request
    Comment {
        #[arg(long)]
        id: String,

        #[arg(long)]
        text: String,
    },

    /// Set who is handling a request
    Assign {
        #[arg(long)]
        id: String,

        #[arg(long)]
        assignee: String,
    },

    /// Attach document metadata to a request
    Attach(AttachArgs),

    /// Status counts and the most recent requests
    Dashboard,

    /// Request-management statistics
    Stats,

    /// Show or update the session principal's notifications
    Notifications(NotificationArgs),

    /// Ask the access guard about a navigation path
    CanAccess {
        #[arg(long)]
        path: String,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Keep only these statuses (repeatable)
    #[arg(long = "status")]
    pub statuses: Vec<RequestStatus>,

    /// Keep only these request types (repeatable)
    #[arg(long = "type")]
    pub types: Vec<RequestType>,

    /// Case-insensitive text over title, description and requester name
    #[arg(long)]
    pub search: Option<String>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    #[arg(long = "type")]
    pub request_type: RequestType,

    #[arg(long, default_value = "medium")]
    pub urgency: Urgency,

    /// Defaults to the student's department
    #[arg(long)]
    pub department: Option<String>,
}

#[derive(Args, Debug)]
pub struct AttachArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub file_name: String,

    #[arg(long)]
    pub media_type: String,

    /// Size in bytes
    #[arg(long)]
    pub size: u64,

    /// Opaque handle to the stored bytes
    #[arg(long)]
    pub content_ref: String,
}

#[derive(Args, Debug)]
pub struct NotificationArgs {
    #[arg(long, conflicts_with_all = ["mark_all_read", "clear"])]
    pub mark_read: Option<String>,

    #[arg(long, conflicts_with = "clear")]
    pub mark_all_read: bool,

    #[arg(long)]
    pub clear: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_command() {
        let cli = Cli::try_parse_from([
            "acadreq", "status", "--id", "2", "--to", "approved", "--comment", "ok",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("./acadreq.json"));
        match cli.command {
            Command::Status { id, to, comment } => {
                assert_eq!(id, "2");
                assert_eq!(to, RequestStatus::Approved);
                assert_eq!(comment.as_deref(), Some("ok"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_repeated_filters() {
        let cli = Cli::try_parse_from([
            "acadreq", "list", "--status", "created", "--status", "pending", "--type",
            "transcript", "--config", "/tmp/a.json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/tmp/a.json"));
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.statuses, vec![RequestStatus::Created, RequestStatus::Pending]);
                assert_eq!(args.types, vec![RequestType::Transcript]);
                assert_eq!(args.page, 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["acadreq", "status", "--id", "1", "--to", "done"]).is_err());
    }

    #[test]
    fn test_notification_flags_conflict() {
        assert!(Cli::try_parse_from([
            "acadreq", "notifications", "--mark-read", "1", "--clear", "1"
        ])
        .is_err());
    }
}
