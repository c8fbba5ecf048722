use super::complete::cached_ids;
use super::styles::{names, SFS_THEME};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use console::Term;
use sfsclient::config::OutputFormat;
use sfsclient::v2;
use sfsclient::version::{MAX_API_VERSION, MIN_API_VERSION};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.4.2" for releases, "0.4.2@abc1234 2024-01-15 14:30" for dev builds
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

/// Builds the clap Command for use with CompleteEnv.
pub fn build_command() -> clap::Command {
    Cli::command()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Parses `key=value`; the value may be empty but the key may not.
pub fn parse_key_value(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", text)),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sfs",
    bin_name = "sfs",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Command-line shell for the Shared File System API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Service endpoint, e.g. http://host:8786/v2/<project>
    #[arg(long, global = true, env = "OS_SHARE_ENDPOINT", help_heading = "Options")]
    pub endpoint: Option<String>,

    /// Authentication token
    #[arg(
        long = "os-token",
        global = true,
        env = "OS_TOKEN",
        hide_env_values = true,
        help_heading = "Options"
    )]
    pub os_token: Option<String>,

    /// Project id used by quota commands
    #[arg(long = "os-project-id", global = true, env = "OS_PROJECT_ID", help_heading = "Options")]
    pub os_project_id: Option<String>,

    /// API microversion (X.Y or "latest")
    #[arg(long, global = true, env = "OS_SHARE_API_VERSION", help_heading = "Options")]
    pub api_version: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, help_heading = "Options")]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, global = true, help_heading = "Options")]
    pub insecure: bool,

    /// Log requests and responses to stderr
    #[arg(long, global = true, help_heading = "Options")]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, help_heading = "Options")]
    pub format: Option<FormatArg>,

    /// Record seen ids for shell completion
    #[arg(long = "os-cache", global = true, help_heading = "Options")]
    pub os_cache: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Shares,
    Snapshots,
    ShareServers,
    ShareReplicas,
    Quotas,
    Locks,
    ShareTypes,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Shares => "Share Commands:",
            CommandGroup::Snapshots => "Snapshot Commands:",
            CommandGroup::ShareServers => "Share Server Commands:",
            CommandGroup::ShareReplicas => "Share Replica Commands:",
            CommandGroup::Quotas => "Quota Commands:",
            CommandGroup::Locks => "Resource Lock Commands:",
            CommandGroup::ShareTypes => "Share Type Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    /// Returns the group for a given command name
    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "availability-zone-list" | "service-list" | "service-enable" | "service-disable"
            | "api-version" | "config" | "help" => Some(CommandGroup::Misc),
            n if n.starts_with("snapshot-") => Some(CommandGroup::Snapshots),
            n if n.starts_with("share-server-") => Some(CommandGroup::ShareServers),
            n if n.starts_with("share-replica-") => Some(CommandGroup::ShareReplicas),
            n if n.starts_with("quota-") => Some(CommandGroup::Quotas),
            n if n.starts_with("lock-") => Some(CommandGroup::Locks),
            n if n.starts_with("type-") => Some(CommandGroup::ShareTypes),
            _ => Some(CommandGroup::Shares),
        }
    }

    /// Returns all groups in display order
    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Shares,
            CommandGroup::Snapshots,
            CommandGroup::ShareServers,
            CommandGroup::ShareReplicas,
            CommandGroup::Quotas,
            CommandGroup::Locks,
            CommandGroup::ShareTypes,
            CommandGroup::Misc,
        ]
    }
}

/// Command name to the library operation it calls.
const COMMAND_OPERATIONS: &[(&str, &str)] = &[
    ("create", "shares.create"),
    ("list", "shares.list"),
    ("show", "shares.get"),
    ("update", "shares.update"),
    ("delete", "shares.delete"),
    ("force-delete", "shares.force_delete"),
    ("extend", "shares.extend"),
    ("shrink", "shares.shrink"),
    ("reset-state", "shares.reset_state"),
    ("access-allow", "shares.allow_access"),
    ("access-deny", "shares.deny_access"),
    ("access-list", "shares.access_list"),
    ("metadata-show", "shares.metadata_get"),
    ("metadata-set", "shares.metadata_set"),
    ("metadata-unset", "shares.metadata_unset"),
    ("migration-start", "shares.migration_start"),
    ("migration-complete", "shares.migration_complete"),
    ("migration-cancel", "shares.migration_cancel"),
    ("migration-get-progress", "shares.migration_get_progress"),
    ("snapshot-create", "snapshots.create"),
    ("snapshot-list", "snapshots.list"),
    ("snapshot-show", "snapshots.get"),
    ("snapshot-update", "snapshots.update"),
    ("snapshot-delete", "snapshots.delete"),
    ("snapshot-force-delete", "snapshots.force_delete"),
    ("snapshot-reset-state", "snapshots.reset_state"),
    ("share-server-list", "share_servers.list"),
    ("share-server-show", "share_servers.get"),
    ("share-server-delete", "share_servers.delete"),
    ("share-server-reset-state", "share_servers.reset_state"),
    ("share-server-migration-check", "share_servers.migration_check"),
    ("share-server-migration-start", "share_servers.migration_start"),
    ("share-server-migration-complete", "share_servers.migration_complete"),
    ("share-server-migration-cancel", "share_servers.migration_cancel"),
    ("share-server-migration-get-progress", "share_servers.migration_get_progress"),
    ("share-replica-create", "share_replicas.create"),
    ("share-replica-list", "share_replicas.list"),
    ("share-replica-show", "share_replicas.get"),
    ("share-replica-delete", "share_replicas.delete"),
    ("share-replica-promote", "share_replicas.promote"),
    ("share-replica-resync", "share_replicas.resync"),
    ("quota-show", "quotas.get"),
    ("quota-defaults", "quotas.defaults"),
    ("quota-update", "quotas.update"),
    ("quota-delete", "quotas.delete"),
    ("lock-create", "resource_locks.create"),
    ("lock-list", "resource_locks.list"),
    ("lock-show", "resource_locks.get"),
    ("lock-update", "resource_locks.update"),
    ("lock-delete", "resource_locks.delete"),
    ("type-list", "share_types.list"),
    ("type-show", "share_types.get"),
    ("type-create", "share_types.create"),
    ("type-delete", "share_types.delete"),
    ("type-key-set", "share_types.set_keys"),
    ("type-key-unset", "share_types.unset_keys"),
    ("availability-zone-list", "availability_zones.list"),
    ("service-list", "services.list"),
    ("service-enable", "services.enable"),
    ("service-disable", "services.disable"),
];

pub fn operation_for(command: &str) -> Option<&'static str> {
    COMMAND_OPERATIONS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, operation)| *operation)
}

/// Commands whose operation is still experimental at the newest version
/// this client speaks.
pub fn experimental_commands() -> Vec<&'static str> {
    let Ok(registry) = v2::registry() else {
        return Vec::new();
    };
    COMMAND_OPERATIONS
        .iter()
        .filter(|(_, operation)| registry.is_experimental_at(operation, MAX_API_VERSION))
        .map(|(name, _)| *name)
        .collect()
}

/// Returns the custom grouped help output as a string
pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");
    let experimental = experimental_commands();
    let use_color = Term::stdout().features().colors_supported();
    let tag = if use_color {
        SFS_THEME.apply(names::EXPERIMENTAL, "[experimental]")
    } else {
        SFS_THEME.apply_plain(names::EXPERIMENTAL, "[experimental]")
    };

    let mut output = String::new();
    output.push_str(&format!("sfs {version}\n"));
    output.push_str("Command-line shell for the Shared File System API\n");
    output.push_str(&format!(
        "Supported API versions: {} - {}\n",
        MIN_API_VERSION, MAX_API_VERSION
    ));
    output.push('\n');
    output.push_str("Usage: sfs [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let name = sc.get_name();
                let mut about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                if experimental.contains(&name) {
                    about.push(' ');
                    about.push_str(&tag);
                }
                output.push_str(&format!("  {:<37} {}\n", name, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("      --endpoint <URL>          Service endpoint [env: OS_SHARE_ENDPOINT]\n");
    output.push_str("      --os-token <TOKEN>        Authentication token [env: OS_TOKEN]\n");
    output.push_str("      --os-project-id <ID>      Project id for quota commands [env: OS_PROJECT_ID]\n");
    output.push_str("      --api-version <X.Y>       API microversion or \"latest\" [env: OS_SHARE_API_VERSION]\n");
    output.push_str("      --timeout <SECONDS>       Request timeout\n");
    output.push_str("      --insecure                Skip TLS certificate verification\n");
    output.push_str("      --debug                   Log requests and responses\n");
    output.push_str("      --format <table|json>     Output format\n");
    output.push_str("      --os-cache                Record seen ids for shell completion\n");
    output.push_str("  -h, --help                    Print help\n");
    output.push_str("  -V, --version                 Print version\n");
    output.push('\n');
    output.push_str("Shell completion (ids come from the --os-cache cache):\n");
    output.push_str("  source <(COMPLETE=bash sfs)   # add to ~/.bashrc\n");
    output.push_str("  source <(COMPLETE=zsh sfs)    # add to ~/.zshrc\n");

    output
}

/// Generates the custom grouped help output
pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Finds the subcommand named in raw arguments, so `sfs show -h` works even
/// when required arguments are missing.
pub fn subcommand_in_args(args: &[String]) -> Option<String> {
    let cmd = Cli::command();
    args.iter()
        .skip(1)
        .find_map(|arg| cmd.find_subcommand(arg).map(|sc| sc.get_name().to_string()))
}

/// Version ranges serving `command`, e.g. `2.22..=2.28 (experimental), 2.29.. (experimental)`.
pub fn version_summary(command: &str) -> Option<String> {
    let operation = operation_for(command)?;
    let registry = v2::registry().ok()?;
    let ranges: Vec<String> = registry
        .candidates(operation)
        .iter()
        .map(|method| {
            if method.experimental {
                format!("{} (experimental)", method.range())
            } else {
                method.range()
            }
        })
        .collect();
    (!ranges.is_empty()).then(|| ranges.join(", "))
}

/// Prints help for a command by name
pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();

    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            let help = subcmd.render_help();
            print!("{}", help);
            if let Some(summary) = version_summary(name) {
                println!();
                println!("API versions: {}", summary);
            }
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Share(ShareCommands),

    #[command(flatten)]
    Snapshot(SnapshotCommands),

    #[command(flatten)]
    Server(ServerCommands),

    #[command(flatten)]
    Replica(ReplicaCommands),

    #[command(flatten)]
    Quota(QuotaCommands),

    #[command(flatten)]
    Lock(LockCommands),

    #[command(flatten)]
    Type(TypeCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum ShareCommands {
    /// Create a share
    #[command(display_order = 1)]
    Create {
        /// Share protocol (NFS, CIFS, GLUSTERFS, HDFS, CEPHFS, MAPRFS)
        share_protocol: String,

        /// Size in GiB
        size: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Create the share from this snapshot
        #[arg(long)]
        snapshot_id: Option<String>,

        #[arg(long)]
        share_network: Option<String>,

        #[arg(long)]
        share_type: Option<String>,

        #[arg(long)]
        availability_zone: Option<String>,

        /// Make the share visible to every project
        #[arg(long)]
        public: bool,

        /// Metadata as key=value (repeatable)
        #[arg(long, value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,

        /// Share group id (2.31+)
        #[arg(long)]
        share_group: Option<String>,

        /// Scheduler hint as key=value, repeatable (2.65+)
        #[arg(long, value_parser = parse_key_value)]
        scheduler_hint: Vec<(String, String)>,

        /// Mount point name (2.84+)
        #[arg(long)]
        mount_point_name: Option<String>,
    },

    /// List shares
    #[command(alias = "ls", display_order = 2)]
    List {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        share_type: Option<String>,

        #[arg(long)]
        host: Option<String>,

        /// Include shares of every project (admin only)
        #[arg(long)]
        all_projects: bool,

        #[arg(long)]
        limit: Option<u32>,

        /// Extra filter as key=value (repeatable)
        #[arg(long, value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },

    /// Show a share
    #[command(display_order = 3)]
    Show {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,
    },

    /// Rename a share or change its visibility
    #[command(display_order = 4)]
    Update {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// true or false
        #[arg(long)]
        public: Option<bool>,
    },

    /// Delete one or more shares
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// Names or IDs of the shares
        #[arg(required = true, num_args = 1.., add = cached_ids("share"))]
        shares: Vec<String>,
    },

    /// Force-delete one or more shares regardless of state (admin only)
    #[command(display_order = 6)]
    ForceDelete {
        /// Names or IDs of the shares
        #[arg(required = true, num_args = 1.., add = cached_ids("share"))]
        shares: Vec<String>,
    },

    /// Grow a share
    #[command(display_order = 7)]
    Extend {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// New size in GiB
        new_size: i64,

        /// Skip scheduler checks (admin only, 2.64+)
        #[arg(long)]
        force: bool,
    },

    /// Shrink a share
    #[command(display_order = 8)]
    Shrink {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// New size in GiB
        new_size: i64,
    },

    /// Explicitly set the state of a share (admin only)
    #[command(display_order = 9)]
    ResetState {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        #[arg(long, default_value = "available")]
        state: String,
    },

    /// Allow access to a share
    #[command(display_order = 10)]
    AccessAllow {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// ip, user, cert or cephx
        access_type: String,

        /// Address, user name, certificate CN or cephx id
        access_to: String,

        /// rw or ro
        #[arg(long, default_value = "rw")]
        access_level: String,

        /// Rule metadata as key=value, repeatable (2.45+)
        #[arg(long, value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// Revoke one or more access rules
    #[command(display_order = 11)]
    AccessDeny {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// Access rule IDs
        #[arg(required = true, num_args = 1..)]
        access_ids: Vec<String>,
    },

    /// List the access rules of a share
    #[command(display_order = 12)]
    AccessList {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,
    },

    /// Show share metadata
    #[command(display_order = 13)]
    MetadataShow {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,
    },

    /// Set share metadata
    #[command(display_order = 14)]
    MetadataSet {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// key=value pairs
        #[arg(required = true, num_args = 1.., value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// Remove share metadata keys
    #[command(display_order = 15)]
    MetadataUnset {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },

    /// Start migrating a share to another host (admin only)
    #[command(display_order = 16)]
    MigrationStart {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// Destination host@backend#pool
        host: String,

        #[arg(long)]
        force_host_assisted_migration: bool,

        #[arg(long)]
        preserve_metadata: bool,

        /// Only accepted from 2.29
        #[arg(long)]
        preserve_snapshots: bool,

        #[arg(long)]
        writable: bool,

        #[arg(long)]
        nondisruptive: bool,

        #[arg(long)]
        new_share_network: Option<String>,

        #[arg(long)]
        new_share_type: Option<String>,
    },

    /// Complete a share migration (admin only)
    #[command(display_order = 17)]
    MigrationComplete {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,
    },

    /// Cancel a share migration (admin only)
    #[command(display_order = 18)]
    MigrationCancel {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,
    },

    /// Show the progress of a share migration (admin only)
    #[command(display_order = 19)]
    MigrationGetProgress {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommands {
    /// Snapshot a share
    #[command(display_order = 20)]
    SnapshotCreate {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        /// Snapshot even if the share is busy
        #[arg(long)]
        force: bool,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Metadata as key=value, repeatable (2.73+)
        #[arg(long, value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// List snapshots
    #[command(display_order = 21)]
    SnapshotList {
        #[arg(long)]
        share_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        all_projects: bool,

        /// Extra filter as key=value (repeatable)
        #[arg(long, value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },

    /// Show a snapshot
    #[command(display_order = 22)]
    SnapshotShow {
        /// Name or ID of the snapshot
        #[arg(add = cached_ids("snapshot"))]
        snapshot: String,
    },

    /// Rename a snapshot or change its description
    #[command(display_order = 23)]
    SnapshotUpdate {
        /// Name or ID of the snapshot
        #[arg(add = cached_ids("snapshot"))]
        snapshot: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete one or more snapshots
    #[command(display_order = 24)]
    SnapshotDelete {
        #[arg(required = true, num_args = 1.., add = cached_ids("snapshot"))]
        snapshots: Vec<String>,
    },

    /// Force-delete one or more snapshots (admin only)
    #[command(display_order = 25)]
    SnapshotForceDelete {
        #[arg(required = true, num_args = 1.., add = cached_ids("snapshot"))]
        snapshots: Vec<String>,
    },

    /// Explicitly set the state of a snapshot (admin only)
    #[command(display_order = 26)]
    SnapshotResetState {
        /// Name or ID of the snapshot
        #[arg(add = cached_ids("snapshot"))]
        snapshot: String,

        #[arg(long, default_value = "available")]
        state: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServerCommands {
    /// List share servers (admin only)
    #[command(display_order = 30)]
    ShareServerList {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        share_network: Option<String>,

        #[arg(long)]
        project_id: Option<String>,

        /// Extra filter as key=value (repeatable)
        #[arg(long, value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },

    /// Show a share server
    #[command(display_order = 31)]
    ShareServerShow {
        #[arg(add = cached_ids("share_server"))]
        id: String,
    },

    /// Delete one or more share servers
    #[command(display_order = 32)]
    ShareServerDelete {
        #[arg(required = true, num_args = 1.., add = cached_ids("share_server"))]
        ids: Vec<String>,
    },

    /// Explicitly set the state of a share server (2.49+)
    #[command(display_order = 33)]
    ShareServerResetState {
        #[arg(add = cached_ids("share_server"))]
        id: String,

        #[arg(long, default_value = "active")]
        state: String,
    },

    /// Check whether a share server can be migrated (2.57+)
    #[command(display_order = 34)]
    ShareServerMigrationCheck {
        #[arg(add = cached_ids("share_server"))]
        id: String,

        /// Destination host@backend
        host: String,

        #[arg(long)]
        writable: bool,

        #[arg(long)]
        nondisruptive: bool,

        #[arg(long)]
        preserve_snapshots: bool,

        #[arg(long)]
        new_share_network: Option<String>,
    },

    /// Start migrating a share server (2.57+)
    #[command(display_order = 35)]
    ShareServerMigrationStart {
        #[arg(add = cached_ids("share_server"))]
        id: String,

        /// Destination host@backend
        host: String,

        #[arg(long)]
        writable: bool,

        #[arg(long)]
        nondisruptive: bool,

        #[arg(long)]
        preserve_snapshots: bool,

        #[arg(long)]
        new_share_network: Option<String>,
    },

    /// Complete a share server migration (2.57+)
    #[command(display_order = 36)]
    ShareServerMigrationComplete {
        #[arg(add = cached_ids("share_server"))]
        id: String,
    },

    /// Cancel a share server migration (2.57+)
    #[command(display_order = 37)]
    ShareServerMigrationCancel {
        #[arg(add = cached_ids("share_server"))]
        id: String,
    },

    /// Show the progress of a share server migration (2.57+)
    #[command(display_order = 38)]
    ShareServerMigrationGetProgress {
        #[arg(add = cached_ids("share_server"))]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReplicaCommands {
    /// Create a replica of a share (2.11+)
    #[command(display_order = 40)]
    ShareReplicaCreate {
        /// Name or ID of the share
        #[arg(add = cached_ids("share"))]
        share: String,

        #[arg(long)]
        availability_zone: Option<String>,

        #[arg(long)]
        share_network: Option<String>,
    },

    /// List share replicas
    #[command(display_order = 41)]
    ShareReplicaList {
        /// Only replicas of this share (name or ID)
        #[arg(long)]
        share: Option<String>,
    },

    /// Show a share replica
    #[command(display_order = 42)]
    ShareReplicaShow {
        #[arg(add = cached_ids("share_replica"))]
        id: String,
    },

    /// Delete one or more share replicas
    #[command(display_order = 43)]
    ShareReplicaDelete {
        #[arg(required = true, num_args = 1.., add = cached_ids("share_replica"))]
        ids: Vec<String>,
    },

    /// Promote a replica to active
    #[command(display_order = 44)]
    ShareReplicaPromote {
        #[arg(add = cached_ids("share_replica"))]
        id: String,
    },

    /// Resynchronise a replica with the active one
    #[command(display_order = 45)]
    ShareReplicaResync {
        #[arg(add = cached_ids("share_replica"))]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuotaCommands {
    /// Show quotas for a project, user or share type
    #[command(display_order = 50)]
    QuotaShow {
        /// Project (defaults to --os-project-id)
        #[arg(long)]
        tenant_id: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        /// Share type quotas (2.39+)
        #[arg(long)]
        share_type: Option<String>,

        /// Include in-use and reserved counts (2.25+)
        #[arg(long)]
        detail: bool,
    },

    /// Show the default quotas for a project
    #[command(display_order = 51)]
    QuotaDefaults {
        #[arg(long)]
        tenant_id: Option<String>,
    },

    /// Update quotas for a project, user or share type
    #[command(display_order = 52)]
    QuotaUpdate {
        /// Project to update
        tenant_id: String,

        #[arg(long)]
        user_id: Option<String>,

        /// 2.39+
        #[arg(long)]
        share_type: Option<String>,

        #[arg(long)]
        shares: Option<i64>,

        #[arg(long)]
        snapshots: Option<i64>,

        #[arg(long)]
        gigabytes: Option<i64>,

        #[arg(long)]
        snapshot_gigabytes: Option<i64>,

        #[arg(long)]
        share_networks: Option<i64>,

        /// 2.40+
        #[arg(long)]
        share_groups: Option<i64>,

        /// 2.40+
        #[arg(long)]
        share_group_snapshots: Option<i64>,

        /// 2.53+
        #[arg(long)]
        share_replicas: Option<i64>,

        /// 2.53+
        #[arg(long)]
        replica_gigabytes: Option<i64>,

        /// 2.62+
        #[arg(long)]
        per_share_gigabytes: Option<i64>,

        /// Allow limits below current usage
        #[arg(long)]
        force: bool,
    },

    /// Reset quotas to the defaults
    #[command(display_order = 53)]
    QuotaDelete {
        #[arg(long)]
        tenant_id: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        share_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LockCommands {
    /// Lock a resource against an action (2.81+)
    #[command(display_order = 60)]
    LockCreate {
        /// ID of the resource to lock
        #[arg(add = cached_ids("share"))]
        resource: String,

        /// share or access_rule
        #[arg(long, default_value = "share")]
        resource_type: String,

        /// delete or show
        #[arg(long, default_value = "delete")]
        resource_action: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// List resource locks
    #[command(display_order = 61)]
    LockList {
        #[arg(long)]
        resource_id: Option<String>,

        #[arg(long)]
        resource_type: Option<String>,

        #[arg(long)]
        resource_action: Option<String>,

        #[arg(long)]
        all_projects: bool,

        /// Extra filter as key=value (repeatable)
        #[arg(long, value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },

    /// Show a resource lock
    #[command(display_order = 62)]
    LockShow {
        #[arg(add = cached_ids("resource_lock"))]
        id: String,
    },

    /// Change the action or reason of a lock
    #[command(display_order = 63)]
    LockUpdate {
        #[arg(add = cached_ids("resource_lock"))]
        id: String,

        #[arg(long)]
        resource_action: Option<String>,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Delete one or more resource locks
    #[command(display_order = 64)]
    LockDelete {
        #[arg(required = true, num_args = 1.., add = cached_ids("resource_lock"))]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TypeCommands {
    /// List share types
    #[command(display_order = 70)]
    TypeList {
        /// Include private types (admin only)
        #[arg(long)]
        all: bool,
    },

    /// Show a share type
    #[command(display_order = 71)]
    TypeShow {
        /// Name or ID of the share type
        #[arg(add = cached_ids("share_type"))]
        share_type: String,
    },

    /// Create a share type (admin only)
    #[command(display_order = 72)]
    TypeCreate {
        name: String,

        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        driver_handles_share_servers: bool,

        /// Restrict the type to projects granted access
        #[arg(long)]
        private: bool,

        /// 2.41+
        #[arg(long)]
        description: Option<String>,

        /// Extra spec as key=value (repeatable)
        #[arg(long, value_parser = parse_key_value)]
        extra_spec: Vec<(String, String)>,
    },

    /// Delete one or more share types
    #[command(display_order = 73)]
    TypeDelete {
        #[arg(required = true, num_args = 1.., add = cached_ids("share_type"))]
        share_types: Vec<String>,
    },

    /// Set extra specs on a share type
    #[command(display_order = 74)]
    TypeKeySet {
        /// Name or ID of the share type
        #[arg(add = cached_ids("share_type"))]
        share_type: String,

        #[arg(required = true, num_args = 1.., value_parser = parse_key_value)]
        specs: Vec<(String, String)>,
    },

    /// Remove extra specs from a share type
    #[command(display_order = 75)]
    TypeKeyUnset {
        /// Name or ID of the share type
        #[arg(add = cached_ids("share_type"))]
        share_type: String,

        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// List availability zones
    #[command(display_order = 80)]
    AvailabilityZoneList,

    /// List services (admin only)
    #[command(display_order = 81)]
    ServiceList {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        binary: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        zone: Option<String>,
    },

    /// Enable a service (admin only)
    #[command(display_order = 82)]
    ServiceEnable { host: String, binary: String },

    /// Disable a service (admin only)
    #[command(display_order = 83)]
    ServiceDisable { host: String, binary: String },

    /// Show client, server and negotiated API versions
    #[command(display_order = 84)]
    ApiVersion,

    /// Get or set configuration
    #[command(display_order = 85)]
    Config {
        /// Configuration key (e.g. endpoint)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for sfs or a subcommand
    #[command(display_order = 86)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn every_visible_command_has_a_group() {
        for sc in Cli::command().get_subcommands() {
            if !sc.is_hide_set() {
                assert!(
                    CommandGroup::for_command(sc.get_name()).is_some(),
                    "{} has no group",
                    sc.get_name()
                );
            }
        }
    }

    #[test]
    fn command_operations_exist_in_registry() {
        let registry = v2::registry().unwrap();
        let cmd = Cli::command();
        for (name, operation) in COMMAND_OPERATIONS {
            assert!(registry.contains(operation), "{} is not registered", operation);
            assert!(cmd.find_subcommand(name).is_some(), "{} is not a command", name);
        }
    }

    #[test]
    fn grouped_help_flags_experimental_commands() {
        let help = get_grouped_help();
        assert!(help.contains("Share Commands:"));
        let line = help
            .lines()
            .find(|l| l.trim_start().starts_with("migration-start "))
            .unwrap();
        assert!(line.ends_with("[experimental]"));
        let line = help
            .lines()
            .find(|l| l.trim_start().starts_with("share-replica-create "))
            .unwrap();
        assert!(!line.contains("[experimental]"));
        assert!(help.contains("source <(COMPLETE=bash sfs)"));
    }

    #[test]
    fn version_summary_lists_every_range() {
        assert_eq!(
            version_summary("share-replica-promote").as_deref(),
            Some("2.11..=2.55 (experimental), 2.56..")
        );
        assert_eq!(version_summary("lock-show").as_deref(), Some("2.81.."));
        assert_eq!(version_summary("config"), None);
    }

    #[test]
    fn parses_key_value_pairs() {
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_key_value("k=").unwrap(), ("k".to_string(), String::new()));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=v").is_err());
    }

    #[test]
    fn finds_subcommand_in_raw_args() {
        let args: Vec<String> = ["sfs", "--debug", "show", "-h"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(subcommand_in_args(&args).as_deref(), Some("show"));
        let args = vec!["sfs".to_string(), "ls".to_string(), "--help".to_string()];
        assert_eq!(subcommand_in_args(&args).as_deref(), Some("list"));
        let args = vec!["sfs".to_string(), "-h".to_string()];
        assert_eq!(subcommand_in_args(&args), None);
    }

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sfs",
            "delete",
            "a",
            "b",
            "--endpoint",
            "http://sfs:8786/v2/p",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("http://sfs:8786/v2/p"));
        assert_eq!(cli.format, Some(FormatArg::Json));
        match cli.command {
            Some(Commands::Share(ShareCommands::Delete { shares })) => {
                assert_eq!(shares, vec!["a", "b"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
