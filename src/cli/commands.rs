use clap::{Parser, Subcommand};

const VERSION: &str = env!("GIT_VERSION");

#[derive(Parser)]
#[command(
    name = "plano",
    version = VERSION,
    about = "Department activity tracking CLI",
    after_help = "\
NOTE:
  Data lives at <root>/.plano/plano.db. Run `plano init` before anything else.
  Every command except `init` requires a verified session:
  `plano auth request <email>` prints a one-time code; confirm it with
  `plano auth verify <email> <code>`. Sessions expire 24 hours after
  verification.

ROLES:
  Members see and edit only their own setor's tasks. Admins see everything,
  manage setores and users, delete tasks, and resolve completion requests.

COMPLETION FLOW:
  `task request-completion` files a request (status is untouched).
  `approvals approve` sets the task to 'Concluído'.
  `approvals reject` sends it back to 'Em andamento'."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the plano store in this directory
    Init {
        /// Seed a bootstrap admin with this name (requires --admin-email)
        #[arg(long, requires = "admin_email")]
        admin_name: Option<String>,
        /// Seed a bootstrap admin with this email (requires --admin-name)
        #[arg(long, requires = "admin_name")]
        admin_email: Option<String>,
    },

    /// Authentication (one-time email codes)
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Completion-approval queue (admin)
    #[command(subcommand)]
    Approvals(ApprovalCommands),

    /// Setor (department) management (admin)
    #[command(subcommand)]
    Setor(SetorCommands),

    /// User management (admin)
    #[command(subcommand)]
    User(UserCommands),

    /// File exports
    #[command(subcommand)]
    Export(ExportCommands),

    /// Overall counters for the visible task set
    Status,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Issue a one-time code for an email
    Request {
        email: String,
    },
    /// Verify a one-time code and open a session
    Verify {
        email: String,
        code: String,
    },
    /// Show the authenticated user
    Whoami,
    /// Invalidate the current session
    Logout,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Responsible person (free text)
        #[arg(long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Baixa, Média, Alta or Crítica
        #[arg(long, default_value = "Média")]
        priority: String,
        /// Backlog, Em andamento, Bloqueado or Concluído
        #[arg(long, default_value = "Backlog")]
        status: String,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Target setor by name or id (admin only; members always get their own)
        #[arg(long)]
        setor: Option<String>,
    },
    /// List visible tasks
    List {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Assignee substring
        #[arg(long)]
        assignee: Option<String>,
        /// Match the search text against tags only
        #[arg(long)]
        tags_only: bool,
        /// Restrict to one setor (admin only)
        #[arg(long)]
        setor: Option<String>,
    },
    /// Show task details
    Show {
        /// Task id, display id (ID001) or id prefix
        id: String,
    },
    /// Edit a task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Replace the tag set (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Move to another setor (admin only)
        #[arg(long)]
        setor: Option<String>,
    },
    /// Delete a task (admin only)
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// File a completion request for admin approval
    RequestCompletion {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Manage task attachments
    #[command(subcommand)]
    Attach(AttachCommands),
}

#[derive(Subcommand)]
pub enum AttachCommands {
    /// Attach a file URL (data:, http:// or https://) to a task
    Add {
        task: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
    },
    /// List a task's attachments (invalid URLs are omitted)
    List {
        task: String,
    },
    /// Replace the whole attachment set; an empty set clears it
    Set {
        task: String,
        /// Attachment as NAME=URL (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Remove an attachment by id
    Remove {
        attachment_id: String,
    },
}

#[derive(Subcommand)]
pub enum ApprovalCommands {
    /// List tasks awaiting approval, with requester names
    List,
    /// Count tasks awaiting approval
    Count,
    /// Approve a pending request (task becomes 'Concluído')
    Approve {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject a pending request (task returns to 'Em andamento')
    Reject {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SetorCommands {
    /// Create a setor
    Create {
        nome: String,
        /// Hex color, e.g. #1e40af
        #[arg(long)]
        cor: String,
    },
    /// List setores
    List,
    /// Edit a setor
    Update {
        /// Setor id or name
        reference: String,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        cor: Option<String>,
    },
    /// Delete a setor (blocked while users or tasks reference it)
    Delete {
        reference: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Reactivate a setor
    Activate {
        reference: String,
    },
    /// Deactivate a setor
    Deactivate {
        reference: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    Create {
        nome: String,
        #[arg(long)]
        email: String,
        /// Setor by name or id
        #[arg(long)]
        setor: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// List users
    List,
    /// Edit a user
    Update {
        /// User id or email
        reference: String,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        setor: Option<String>,
        /// Set the admin role (true/false)
        #[arg(long)]
        admin: Option<bool>,
    },
    /// Delete a user (blocked while tasks are assigned to them)
    Delete {
        reference: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Reactivate a user
    Activate {
        reference: String,
    },
    /// Deactivate a user (treated as unauthenticated from then on)
    Deactivate {
        reference: String,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export every visible task (with attachments) as a JSON document
    Json {
        /// Output file
        #[arg(long, default_value = "atividades.json")]
        out: String,
    },
    /// Export the filtered view as a tabular text report, sorted by due date
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        tags_only: bool,
        #[arg(long)]
        setor: Option<String>,
        /// Output file
        #[arg(long, default_value = "lista_atividades.txt")]
        out: String,
    },
}
