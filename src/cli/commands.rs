//! CLI command implementations
//!
//! Each invocation loads the config, opens the data directory (principal,
//! requests and notifications slots), runs exactly one operation, and
//! returns the JSON value that `run` wraps in the response envelope.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{check_access, Credentials, DemoDirectory, GuardDecision, Principal, PrincipalStore, Resource};
use crate::notifications::NotificationCenter;
use crate::observability::{log_event_with_fields, Event};
use crate::requests::{
    paginate, AttachmentDraft, FilterCriteria, LifecycleEngine, Request, RequestDraft,
    RequestRepository,
};
use crate::slot::{save_json, DurableSlot, FileSlot, REQUESTS_KEY};

use super::args::{AttachArgs, Command, ListArgs, NotificationArgs, SubmitArgs};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Write the example dataset when the data directory is first initialized
    #[serde(default = "default_seed_on_first_start")]
    pub seed_on_first_start: bool,

    /// Number of requests on the dashboard (default 5)
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Requests per page in listings (default 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_seed_on_first_start() -> bool {
    true
}
fn default_recent_limit() -> usize {
    5
}
fn default_page_size() -> usize {
    10
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", config.data_dir.as_str())]);

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.recent_limit == 0 {
            return Err(CliError::config_error("recent_limit must be > 0"));
        }

        if self.page_size == 0 {
            return Err(CliError::config_error("page_size must be > 0"));
        }

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }
}

/// Main CLI entry point
///
/// Parses arguments, runs the command, and prints the response envelope.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();

    match execute(&cli.config, cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run one command and return its response payload
pub fn execute(config_path: &Path, cmd: Command) -> CliResult<Value> {
    let config = Config::load(config_path)?;

    match cmd {
        Command::Init => init(&config),
        cmd => Workspace::open(config)?.execute(cmd),
    }
}

/// Create the data directory and its slots
///
/// Refuses to run twice. With `seed_on_first_start` the example requests
/// and notifications are written; otherwise an empty collection is.
pub fn init(config: &Config) -> CliResult<Value> {
    let data_dir = config.data_path();
    let slot = FileSlot::new(data_dir);

    if is_initialized(&slot) {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(data_dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", data_dir, e))
    })?;

    let slot: Arc<dyn DurableSlot> = Arc::new(slot);
    let seed = config.seed_on_first_start;

    let repository = RequestRepository::open(slot.clone(), seed)?;
    if !seed {
        save_json(slot.as_ref(), REQUESTS_KEY, &Vec::<Request>::new())
            .map_err(|e| CliError::io_error(e.to_string()))?;
    }
    NotificationCenter::open(slot, seed)?;

    Ok(json!({
        "initialized": true,
        "seeded": seed,
        "requests": repository.len()?,
    }))
}

fn is_initialized(slot: &FileSlot) -> bool {
    slot.exists(REQUESTS_KEY)
}

/// Everything one command needs, opened from the data directory
struct Workspace {
    config: Config,
    principals: PrincipalStore,
    engine: LifecycleEngine,
    notifications: Arc<NotificationCenter>,
}

impl Workspace {
    fn open(config: Config) -> CliResult<Self> {
        let file_slot = FileSlot::new(config.data_path());
        if !is_initialized(&file_slot) {
            return Err(CliError::not_initialized());
        }

        let slot: Arc<dyn DurableSlot> = Arc::new(file_slot);
        let seed = config.seed_on_first_start;

        let principals = PrincipalStore::bootstrap(slot.clone())?;
        let notifications = Arc::new(NotificationCenter::open(slot.clone(), seed)?);
        let repository = RequestRepository::open(slot, seed)?;
        let engine = LifecycleEngine::new(repository, notifications.clone());

        Ok(Self {
            config,
            principals,
            engine,
            notifications,
        })
    }

    fn execute(&mut self, cmd: Command) -> CliResult<Value> {
        match cmd {
            Command::Init => Err(CliError::already_initialized()),
            Command::Login { email } => self.login(&email),
            Command::Logout => self.logout(),
            Command::Whoami => Ok(serde_json::to_value(self.principal()?)?),
            Command::List(args) => self.list(args),
            Command::Show { id } => self.show(&id),
            Command::Submit(args) => self.submit(args),
            Command::Status { id, to, comment } => {
                let principal = self.principal()?;
                let updated = self
                    .engine
                    .request_status_change(&id, to, principal, comment.as_deref())?;
                Ok(serde_json::to_value(updated)?)
            }
            Command::Comment { id, text } => {
                let principal = self.principal()?;
                let comment = self.engine.add_comment(&id, principal, &text)?;
                Ok(serde_json::to_value(comment)?)
            }
            Command::Assign { id, assignee } => {
                let principal = self.principal()?;
                let updated = self.engine.assign_request(&id, principal, &assignee)?;
                Ok(serde_json::to_value(updated)?)
            }
            Command::Attach(args) => self.attach(args),
            Command::Dashboard => self.dashboard(),
            Command::Stats => {
                let principal = self.principal()?;
                Ok(serde_json::to_value(self.engine.statistics(principal)?)?)
            }
            Command::Notifications(args) => self.inbox(args),
            Command::CanAccess { path } => Ok(self.can_access(&path)),
        }
    }

    fn principal(&self) -> CliResult<&Principal> {
        Ok(self.principals.require_principal()?)
    }

    fn login(&mut self, email: &str) -> CliResult<Value> {
        let principal = self
            .principals
            .login(&DemoDirectory::new(), &Credentials::new(email, ""))?;
        Ok(serde_json::to_value(principal)?)
    }

    fn logout(&mut self) -> CliResult<Value> {
        self.principals.logout()?;
        Ok(json!({ "loggedOut": true }))
    }

    fn list(&self, args: ListArgs) -> CliResult<Value> {
        let principal = self.principal()?;
        let criteria = FilterCriteria {
            statuses: args.statuses,
            types: args.types,
            department: None,
            search_text: args.search,
        };

        let requests = self.engine.list_requests(principal, criteria)?;
        let page = paginate(requests, args.page, self.config.page_size);
        Ok(serde_json::to_value(page)?)
    }

    fn show(&self, id: &str) -> CliResult<Value> {
        let principal = self.principal()?;
        let request = self.engine.get_request(principal, id)?;
        let next = self.engine.available_transitions(principal, request.status);

        Ok(json!({
            "request": request,
            "nextStatuses": next,
        }))
    }

    fn submit(&self, args: SubmitArgs) -> CliResult<Value> {
        let principal = self.principal()?;
        let mut draft = RequestDraft::new(args.title, args.description, args.request_type)
            .with_urgency(args.urgency);
        if let Some(department) = args.department {
            draft = draft.with_department(department);
        }

        let request = self.engine.submit_request(draft, principal)?;
        Ok(serde_json::to_value(request)?)
    }

    fn attach(&self, args: AttachArgs) -> CliResult<Value> {
        let principal = self.principal()?;
        let draft = AttachmentDraft::new(args.file_name, args.media_type, args.size, args.content_ref);
        let attachment = self.engine.add_attachment(&args.id, principal, draft)?;
        Ok(serde_json::to_value(attachment)?)
    }

    fn dashboard(&self) -> CliResult<Value> {
        let principal = self.principal()?;
        let counts = self.engine.status_counts(principal)?;
        let recent = self.engine.recent_requests(principal, self.config.recent_limit)?;
        let unread = self.notifications.unread_count(&principal.id)?;

        Ok(json!({
            "principal": principal,
            "counts": counts,
            "recent": recent,
            "unreadNotifications": unread,
        }))
    }

    fn inbox(&self, args: NotificationArgs) -> CliResult<Value> {
        let principal = self.principal()?;

        if let Some(id) = args.mark_read {
            self.notifications.mark_as_read(&principal.id, &id)?;
        } else if args.mark_all_read {
            self.notifications.mark_all_as_read(&principal.id)?;
        } else if let Some(id) = args.clear {
            self.notifications.clear(&principal.id, &id)?;
        }

        Ok(json!({
            "notifications": self.notifications.for_recipient(&principal.id)?,
            "unreadCount": self.notifications.unread_count(&principal.id)?,
        }))
    }

    fn can_access(&self, path: &str) -> Value {
        let principal = self.principals.current_principal();
        let decision = check_access(&Resource::from_path(path), principal);

        match decision {
            GuardDecision::Allow => json!({ "path": path, "allowed": true }),
            GuardDecision::Redirect(target) => {
                let principal_id = principal.map(|p| p.id.as_str()).unwrap_or("anonymous");
                log_event_with_fields(
                    Event::AccessDenied,
                    &[("path", path), ("principal_id", principal_id)],
                );
                json!({ "path": path, "allowed": false, "redirect": target })
            }
        }
    }
}
