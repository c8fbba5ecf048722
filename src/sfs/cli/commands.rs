//! # CLI Commands
//!
//! `run()` parses arguments, builds an [`AppContext`] and dispatches to one
//! `handle_*` function per subcommand. Handlers translate arguments into
//! manager calls on the library and hand results to `render.rs`; they hold no
//! API logic of their own.
//!
//! Precedence for connection settings is flag, then environment variable
//! (clap reads those for us), then the config file, then built-in defaults.
//!
//! Commands that take several names or ids attempt every item and report one
//! aggregate failure at the end (see [`Batch`]).

use super::render::{print_list, print_messages, print_resource, print_show, render_text_list};
use super::setup::{
    build_command, print_grouped_help, print_help_for_command, subcommand_in_args, Cli, Commands,
    LockCommands, MiscCommands, QuotaCommands, ReplicaCommands, ServerCommands, ShareCommands,
    SnapshotCommands, TypeCommands,
};
use clap::Parser;
use clap_complete::CompleteEnv;
use env_logger::Env;
use serde_json::{json, Map, Value};
use sfsclient::batch::{Batch, CmdMessage};
use sfsclient::cache::CompletionCache;
use sfsclient::client::{Client, VersionRequest};
use sfsclient::config::{config_dir, OutputFormat, SfsConfig};
use sfsclient::error::{Result, SfsError};
use sfsclient::find::{find_resource, Lookup};
use sfsclient::query::QueryFilters;
use sfsclient::resource::Resource;
use sfsclient::v2::quotas::{QuotaTarget, QuotaUpdate};
use sfsclient::v2::resource_locks::LockCreate;
use sfsclient::v2::share_servers::ServerMigration;
use sfsclient::v2::share_types::ShareTypeCreate;
use sfsclient::v2::shares::{AccessRule, MigrationRequest, ShareCreate, ShareUpdate};
use sfsclient::v2::snapshots::SnapshotCreate;
use sfsclient::version::{MAX_API_VERSION, MIN_API_VERSION};
use std::collections::BTreeMap;
use std::time::Duration;

const SHARE_COLUMNS: &[&str] = &[
    "ID",
    "Name",
    "Size",
    "Share Proto",
    "Status",
    "Is Public",
    "Share Type Name",
    "Host",
    "Availability Zone",
];
const SNAPSHOT_COLUMNS: &[&str] = &["ID", "Share ID", "Status", "Name", "Share Size"];
const ACCESS_COLUMNS: &[&str] = &["ID", "Access Type", "Access To", "Access Level", "State"];
const SERVER_COLUMNS: &[&str] = &[
    "ID",
    "Host",
    "Status",
    "Share Network Name",
    "Project ID",
    "Updated At",
];
const REPLICA_COLUMNS: &[&str] = &[
    "ID",
    "Status",
    "Replica State",
    "Share ID",
    "Host",
    "Availability Zone",
    "Updated At",
];
const LOCK_COLUMNS: &[&str] = &[
    "ID",
    "Resource ID",
    "Resource Type",
    "Resource Action",
    "Lock Reason",
];
const TYPE_COLUMNS: &[&str] = &[
    "ID",
    "Name",
    "Is Default",
    "Required Extra Specs",
    "Description",
];
const ZONE_COLUMNS: &[&str] = &["ID", "Name", "Created At", "Updated At"];
const SERVICE_COLUMNS: &[&str] = &["ID", "Binary", "Host", "Zone", "Status", "State", "Updated At"];

struct AppContext {
    client: Client,
    format: OutputFormat,
}

impl AppContext {
    /// `--tenant-id` when given, else the session's project.
    fn project_id(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.client.project_id().map(str::to_string))
            .ok_or_else(|| {
                SfsError::CommandError(
                    "A project id is required: pass --tenant-id or set OS_PROJECT_ID".to_string(),
                )
            })
    }
}

pub fn run() -> Result<()> {
    // `COMPLETE=<shell> sfs` prints the shell registration; the registered
    // function calls back here and exits before normal parsing.
    CompleteEnv::with_factory(build_command).complete();

    let args: Vec<String> = std::env::args().collect();

    // Help is answered before parsing so that `sfs show -h` works without
    // the command's required arguments.
    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        match subcommand_in_args(&args) {
            Some(name) => print_help_for_command(&name),
            None => print_grouped_help(),
        }
        return Ok(());
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.debug);

    if cli.help {
        print_grouped_help();
        return Ok(());
    }

    let config = SfsConfig::load(config_dir()?)?;

    // Commands that never talk to the service
    match &cli.command {
        None => {
            print_grouped_help();
            return Ok(());
        }
        Some(Commands::Misc(MiscCommands::Help { command })) => {
            return handle_help(command.clone());
        }
        Some(Commands::Misc(MiscCommands::Config { key, value })) => {
            return handle_config(key.clone(), value.clone());
        }
        Some(_) => {}
    }

    let ctx = init_context(&cli, &config)?;

    match cli.command {
        Some(Commands::Share(cmd)) => match cmd {
            ShareCommands::Create {
                share_protocol,
                size,
                name,
                description,
                snapshot_id,
                share_network,
                share_type,
                availability_zone,
                public,
                metadata,
                share_group,
                scheduler_hint,
                mount_point_name,
            } => {
                let request = ShareCreate {
                    share_proto: share_protocol,
                    size,
                    name,
                    description,
                    snapshot_id,
                    share_network_id: share_network,
                    share_type,
                    availability_zone,
                    is_public: public,
                    metadata: metadata.into_iter().collect(),
                    share_group_id: share_group,
                    scheduler_hints: scheduler_hint.into_iter().collect(),
                    mount_point_name,
                };
                handle_create(&ctx, &request)
            }
            ShareCommands::List {
                name,
                status,
                share_type,
                host,
                all_projects,
                limit,
                filter,
            } => {
                let mut filters = QueryFilters::new()
                    .with_opt("name", name)
                    .with_opt("status", status)
                    .with_opt("share_type", share_type)
                    .with_opt("host", host)
                    .with_opt("all_tenants", all_projects.then_some(1))
                    .with_opt("limit", limit);
                filters.extend(extra_filters(filter));
                handle_list(&ctx, filters)
            }
            ShareCommands::Show { share } => handle_show(&ctx, &share),
            ShareCommands::Update {
                share,
                name,
                description,
                public,
            } => {
                let update = ShareUpdate {
                    name,
                    description,
                    is_public: public,
                };
                handle_update(&ctx, &share, &update)
            }
            ShareCommands::Delete { shares } => handle_delete(&ctx, &shares, false),
            ShareCommands::ForceDelete { shares } => handle_delete(&ctx, &shares, true),
            ShareCommands::Extend {
                share,
                new_size,
                force,
            } => handle_extend(&ctx, &share, new_size, force),
            ShareCommands::Shrink { share, new_size } => handle_shrink(&ctx, &share, new_size),
            ShareCommands::ResetState { share, state } => {
                handle_reset_state(&ctx, &share, &state)
            }
            ShareCommands::AccessAllow {
                share,
                access_type,
                access_to,
                access_level,
                metadata,
            } => {
                let mut rule = AccessRule::new(access_type, access_to);
                rule.access_level = access_level;
                rule.metadata = metadata.into_iter().collect();
                handle_access_allow(&ctx, &share, &rule)
            }
            ShareCommands::AccessDeny { share, access_ids } => {
                handle_access_deny(&ctx, &share, &access_ids)
            }
            ShareCommands::AccessList { share } => handle_access_list(&ctx, &share),
            ShareCommands::MetadataShow { share } => handle_metadata_show(&ctx, &share),
            ShareCommands::MetadataSet { share, metadata } => {
                handle_metadata_set(&ctx, &share, metadata.into_iter().collect())
            }
            ShareCommands::MetadataUnset { share, keys } => {
                handle_metadata_unset(&ctx, &share, &keys)
            }
            ShareCommands::MigrationStart {
                share,
                host,
                force_host_assisted_migration,
                preserve_metadata,
                preserve_snapshots,
                writable,
                nondisruptive,
                new_share_network,
                new_share_type,
            } => {
                let request = MigrationRequest {
                    host,
                    force_host_assisted_migration,
                    preserve_metadata,
                    preserve_snapshots,
                    writable,
                    nondisruptive,
                    new_share_network_id: new_share_network,
                    new_share_type_id: new_share_type,
                };
                handle_migration_start(&ctx, &share, &request)
            }
            ShareCommands::MigrationComplete { share } => handle_migration_complete(&ctx, &share),
            ShareCommands::MigrationCancel { share } => handle_migration_cancel(&ctx, &share),
            ShareCommands::MigrationGetProgress { share } => {
                handle_migration_get_progress(&ctx, &share)
            }
        },
        Some(Commands::Snapshot(cmd)) => match cmd {
            SnapshotCommands::SnapshotCreate {
                share,
                force,
                name,
                description,
                metadata,
            } => handle_snapshot_create(
                &ctx,
                &share,
                SnapshotCreate {
                    share_id: String::new(),
                    force,
                    name,
                    description,
                    metadata: metadata.into_iter().collect(),
                },
            ),
            SnapshotCommands::SnapshotList {
                share_id,
                name,
                status,
                all_projects,
                filter,
            } => {
                let mut filters = QueryFilters::new()
                    .with_opt("share_id", share_id)
                    .with_opt("name", name)
                    .with_opt("status", status)
                    .with_opt("all_tenants", all_projects.then_some(1));
                filters.extend(extra_filters(filter));
                handle_snapshot_list(&ctx, filters)
            }
            SnapshotCommands::SnapshotShow { snapshot } => handle_snapshot_show(&ctx, &snapshot),
            SnapshotCommands::SnapshotUpdate {
                snapshot,
                name,
                description,
            } => handle_snapshot_update(&ctx, &snapshot, name.as_deref(), description.as_deref()),
            SnapshotCommands::SnapshotDelete { snapshots } => {
                handle_snapshot_delete(&ctx, &snapshots, false)
            }
            SnapshotCommands::SnapshotForceDelete { snapshots } => {
                handle_snapshot_delete(&ctx, &snapshots, true)
            }
            SnapshotCommands::SnapshotResetState { snapshot, state } => {
                handle_snapshot_reset_state(&ctx, &snapshot, &state)
            }
        },
        Some(Commands::Server(cmd)) => match cmd {
            ServerCommands::ShareServerList {
                host,
                status,
                share_network,
                project_id,
                filter,
            } => {
                let mut filters = QueryFilters::new()
                    .with_opt("host", host)
                    .with_opt("status", status)
                    .with_opt("share_network", share_network)
                    .with_opt("project_id", project_id);
                filters.extend(extra_filters(filter));
                handle_server_list(&ctx, filters)
            }
            ServerCommands::ShareServerShow { id } => handle_server_show(&ctx, &id),
            ServerCommands::ShareServerDelete { ids } => handle_server_delete(&ctx, &ids),
            ServerCommands::ShareServerResetState { id, state } => {
                handle_server_reset_state(&ctx, &id, &state)
            }
            ServerCommands::ShareServerMigrationCheck {
                id,
                host,
                writable,
                nondisruptive,
                preserve_snapshots,
                new_share_network,
            } => {
                let migration = ServerMigration {
                    host,
                    writable,
                    nondisruptive,
                    preserve_snapshots,
                    new_share_network_id: new_share_network,
                };
                handle_server_migration_check(&ctx, &id, &migration)
            }
            ServerCommands::ShareServerMigrationStart {
                id,
                host,
                writable,
                nondisruptive,
                preserve_snapshots,
                new_share_network,
            } => {
                let migration = ServerMigration {
                    host,
                    writable,
                    nondisruptive,
                    preserve_snapshots,
                    new_share_network_id: new_share_network,
                };
                handle_server_migration_start(&ctx, &id, &migration)
            }
            ServerCommands::ShareServerMigrationComplete { id } => {
                handle_server_migration_complete(&ctx, &id)
            }
            ServerCommands::ShareServerMigrationCancel { id } => {
                handle_server_migration_cancel(&ctx, &id)
            }
            ServerCommands::ShareServerMigrationGetProgress { id } => {
                handle_server_migration_get_progress(&ctx, &id)
            }
        },
        Some(Commands::Replica(cmd)) => match cmd {
            ReplicaCommands::ShareReplicaCreate {
                share,
                availability_zone,
                share_network,
            } => handle_replica_create(
                &ctx,
                &share,
                availability_zone.as_deref(),
                share_network.as_deref(),
            ),
            ReplicaCommands::ShareReplicaList { share } => {
                handle_replica_list(&ctx, share.as_deref())
            }
            ReplicaCommands::ShareReplicaShow { id } => handle_replica_show(&ctx, &id),
            ReplicaCommands::ShareReplicaDelete { ids } => handle_replica_delete(&ctx, &ids),
            ReplicaCommands::ShareReplicaPromote { id } => handle_replica_promote(&ctx, &id),
            ReplicaCommands::ShareReplicaResync { id } => handle_replica_resync(&ctx, &id),
        },
        Some(Commands::Quota(cmd)) => match cmd {
            QuotaCommands::QuotaShow {
                tenant_id,
                user_id,
                share_type,
                detail,
            } => {
                let target = QuotaTarget {
                    project_id: ctx.project_id(tenant_id)?,
                    user_id,
                    share_type,
                };
                handle_quota_show(&ctx, &target, detail)
            }
            QuotaCommands::QuotaDefaults { tenant_id } => {
                let project_id = ctx.project_id(tenant_id)?;
                handle_quota_defaults(&ctx, &project_id)
            }
            QuotaCommands::QuotaUpdate {
                tenant_id,
                user_id,
                share_type,
                shares,
                snapshots,
                gigabytes,
                snapshot_gigabytes,
                share_networks,
                share_groups,
                share_group_snapshots,
                share_replicas,
                replica_gigabytes,
                per_share_gigabytes,
                force,
            } => {
                let target = QuotaTarget {
                    project_id: tenant_id,
                    user_id,
                    share_type,
                };
                let update = QuotaUpdate {
                    shares,
                    snapshots,
                    gigabytes,
                    snapshot_gigabytes,
                    share_networks,
                    share_groups,
                    share_group_snapshots,
                    share_replicas,
                    replica_gigabytes,
                    per_share_gigabytes,
                    force,
                };
                handle_quota_update(&ctx, &target, &update)
            }
            QuotaCommands::QuotaDelete {
                tenant_id,
                user_id,
                share_type,
            } => {
                let target = QuotaTarget {
                    project_id: ctx.project_id(tenant_id)?,
                    user_id,
                    share_type,
                };
                handle_quota_delete(&ctx, &target)
            }
        },
        Some(Commands::Lock(cmd)) => match cmd {
            LockCommands::LockCreate {
                resource,
                resource_type,
                resource_action,
                reason,
            } => {
                let request = LockCreate {
                    resource_id: resource,
                    resource_type,
                    resource_action,
                    lock_reason: reason,
                };
                handle_lock_create(&ctx, &request)
            }
            LockCommands::LockList {
                resource_id,
                resource_type,
                resource_action,
                all_projects,
                filter,
            } => {
                let mut filters = QueryFilters::new()
                    .with_opt("resource_id", resource_id)
                    .with_opt("resource_type", resource_type)
                    .with_opt("resource_action", resource_action)
                    .with_opt("all_projects", all_projects.then_some(1));
                filters.extend(extra_filters(filter));
                handle_lock_list(&ctx, filters)
            }
            LockCommands::LockShow { id } => handle_lock_show(&ctx, &id),
            LockCommands::LockUpdate {
                id,
                resource_action,
                reason,
            } => handle_lock_update(&ctx, &id, resource_action.as_deref(), reason.as_deref()),
            LockCommands::LockDelete { ids } => handle_lock_delete(&ctx, &ids),
        },
        Some(Commands::Type(cmd)) => match cmd {
            TypeCommands::TypeList { all } => handle_type_list(&ctx, all),
            TypeCommands::TypeShow { share_type } => handle_type_show(&ctx, &share_type),
            TypeCommands::TypeCreate {
                name,
                driver_handles_share_servers,
                private,
                description,
                extra_spec,
            } => {
                let request = ShareTypeCreate {
                    name,
                    driver_handles_share_servers,
                    is_public: !private,
                    description,
                    extra_specs: extra_spec.into_iter().collect(),
                };
                handle_type_create(&ctx, &request)
            }
            TypeCommands::TypeDelete { share_types } => handle_type_delete(&ctx, &share_types),
            TypeCommands::TypeKeySet { share_type, specs } => {
                handle_type_key_set(&ctx, &share_type, specs.into_iter().collect())
            }
            TypeCommands::TypeKeyUnset { share_type, keys } => {
                handle_type_key_unset(&ctx, &share_type, &keys)
            }
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::AvailabilityZoneList => handle_availability_zone_list(&ctx),
            MiscCommands::ServiceList {
                host,
                binary,
                status,
                state,
                zone,
            } => {
                let filters = QueryFilters::new()
                    .with_opt("host", host)
                    .with_opt("binary", binary)
                    .with_opt("status", status)
                    .with_opt("state", state)
                    .with_opt("zone", zone);
                handle_service_list(&ctx, filters)
            }
            MiscCommands::ServiceEnable { host, binary } => {
                handle_service_toggle(&ctx, &host, &binary, true)
            }
            MiscCommands::ServiceDisable { host, binary } => {
                handle_service_toggle(&ctx, &host, &binary, false)
            }
            MiscCommands::ApiVersion => handle_api_version(&ctx),
            MiscCommands::Config { .. } | MiscCommands::Help { .. } => Ok(()),
        },
        None => Ok(()),
    }
}

fn init_logging(debug: bool) {
    let default = if debug {
        "warn,sfsclient=debug,sfs=debug"
    } else {
        "warn"
    };
    // A logger may already be installed when run() is called twice in-process.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default)).try_init();
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve_endpoint(cli: &Cli, config: &SfsConfig) -> Option<String> {
    non_empty(cli.endpoint.clone()).or_else(|| non_empty(config.endpoint.clone()))
}

fn init_context(cli: &Cli, config: &SfsConfig) -> Result<AppContext> {
    let endpoint = resolve_endpoint(cli, config).ok_or_else(|| {
        SfsError::CommandError(
            "You must provide an endpoint URL via --endpoint, OS_SHARE_ENDPOINT or `sfs config endpoint <url>`"
                .to_string(),
        )
    })?;
    let token = non_empty(cli.os_token.clone()).ok_or_else(|| {
        SfsError::CommandError("You must provide a token via --os-token or OS_TOKEN".to_string())
    })?;

    let version = match non_empty(cli.api_version.clone())
        .or_else(|| non_empty(config.api_version.clone()))
    {
        Some(text) => VersionRequest::parse(&text)?,
        None => VersionRequest::Latest,
    };

    let mut builder = Client::builder(endpoint.as_str())
        .token(token.as_str())
        .version_request(version)
        .insecure(cli.insecure || config.insecure);
    if let Some(project_id) = non_empty(cli.os_project_id.clone()) {
        builder = builder.project_id(project_id);
    }
    if let Some(seconds) = cli.timeout.or(config.timeout) {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    if cli.os_cache || config.cache {
        if let Some(base) = CompletionCache::default_base() {
            builder = builder.completion_cache(CompletionCache::for_session(
                &base,
                &endpoint,
                Some(token.as_str()),
            ));
        }
    }

    Ok(AppContext {
        client: builder.build()?,
        format: cli.format.map(Into::into).unwrap_or(config.format),
    })
}

fn extra_filters(pairs: Vec<(String, String)>) -> QueryFilters {
    let mut filters = QueryFilters::new();
    for (key, value) in pairs {
        filters.insert(key, value);
    }
    filters
}

/// Resolves a name or id to the resource's id.
fn resolve_id<L: Lookup>(manager: &L, name_or_id: &str) -> Result<String> {
    let resource = find_resource(manager, name_or_id)?;
    resource.id().map(str::to_string).ok_or_else(|| {
        SfsError::CommandError(format!(
            "The {} '{}' has no id in the service response",
            manager.kind(),
            name_or_id
        ))
    })
}

fn accepted(verb: &str, kind: &str, item: &str) {
    print_messages(&[CmdMessage::success(format!(
        "Request to {} {} {} has been accepted.",
        verb, kind, item
    ))]);
}

fn finish_batch(batch: Batch) -> Result<()> {
    print_messages(batch.messages());
    batch.finish()
}

// Shares

fn handle_create(ctx: &AppContext, request: &ShareCreate) -> Result<()> {
    let share = ctx.client.shares().create(request)?;
    print_resource(ctx.format, &share)
}

fn handle_list(ctx: &AppContext, filters: QueryFilters) -> Result<()> {
    let shares = ctx.client.shares().list(filters)?;
    print_list(ctx.format, &shares, SHARE_COLUMNS)
}

fn handle_show(ctx: &AppContext, share: &str) -> Result<()> {
    let share = find_resource(&ctx.client.shares(), share)?;
    print_resource(ctx.format, &share)
}

fn handle_update(ctx: &AppContext, share: &str, update: &ShareUpdate) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let updated = shares.update(&id, update)?;
    print_resource(ctx.format, &updated)
}

fn handle_delete(ctx: &AppContext, items: &[String], force: bool) -> Result<()> {
    let shares = ctx.client.shares();
    let verb = if force { "force-delete" } else { "delete" };
    let mut batch = Batch::new("share", "shares", verb);
    batch.run_all(items, |item| {
        let id = resolve_id(&shares, item)?;
        if force {
            shares.force_delete(&id)
        } else {
            shares.delete(&id)
        }
    });
    finish_batch(batch)
}

fn handle_extend(ctx: &AppContext, share: &str, new_size: i64, force: bool) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.extend(&id, new_size, force)?;
    accepted("extend", "share", share);
    Ok(())
}

fn handle_shrink(ctx: &AppContext, share: &str, new_size: i64) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.shrink(&id, new_size)?;
    accepted("shrink", "share", share);
    Ok(())
}

fn handle_reset_state(ctx: &AppContext, share: &str, state: &str) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.reset_state(&id, state)?;
    accepted("reset the state of", "share", share);
    Ok(())
}

fn handle_access_allow(ctx: &AppContext, share: &str, rule: &AccessRule) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let access = shares.allow(&id, rule)?;
    print_resource(ctx.format, &access)
}

fn handle_access_deny(ctx: &AppContext, share: &str, access_ids: &[String]) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let mut batch = Batch::new("access rule", "access rules", "deny");
    batch.run_all(access_ids, |access_id| shares.deny(&id, access_id));
    finish_batch(batch)
}

fn handle_access_list(ctx: &AppContext, share: &str) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let rules = shares.access_list(&id)?;
    print_list(ctx.format, &rules, ACCESS_COLUMNS)
}

fn handle_metadata_show(ctx: &AppContext, share: &str) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let metadata = shares.get_metadata(&id)?;
    print_show(ctx.format, &metadata)
}

fn handle_metadata_set(
    ctx: &AppContext,
    share: &str,
    metadata: BTreeMap<String, String>,
) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let updated = shares.set_metadata(&id, &metadata)?;
    print_show(ctx.format, &updated)
}

fn handle_metadata_unset(ctx: &AppContext, share: &str, keys: &[String]) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.unset_metadata(&id, keys)?;
    accepted("unset metadata on", "share", share);
    Ok(())
}

fn handle_migration_start(ctx: &AppContext, share: &str, request: &MigrationRequest) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.migration_start(&id, request)?;
    accepted("migrate", "share", share);
    Ok(())
}

fn handle_migration_complete(ctx: &AppContext, share: &str) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.migration_complete(&id)?;
    accepted("complete migration of", "share", share);
    Ok(())
}

fn handle_migration_cancel(ctx: &AppContext, share: &str) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    shares.migration_cancel(&id)?;
    accepted("cancel migration of", "share", share);
    Ok(())
}

fn handle_migration_get_progress(ctx: &AppContext, share: &str) -> Result<()> {
    let shares = ctx.client.shares();
    let id = resolve_id(&shares, share)?;
    let progress = shares.migration_get_progress(&id)?;
    print_resource(ctx.format, &progress)
}

// Snapshots

fn handle_snapshot_create(
    ctx: &AppContext,
    share: &str,
    mut request: SnapshotCreate,
) -> Result<()> {
    request.share_id = resolve_id(&ctx.client.shares(), share)?;
    let snapshot = ctx.client.snapshots().create(&request)?;
    print_resource(ctx.format, &snapshot)
}

fn handle_snapshot_list(ctx: &AppContext, filters: QueryFilters) -> Result<()> {
    let snapshots = ctx.client.snapshots().list(filters)?;
    print_list(ctx.format, &snapshots, SNAPSHOT_COLUMNS)
}

fn handle_snapshot_show(ctx: &AppContext, snapshot: &str) -> Result<()> {
    let snapshot = find_resource(&ctx.client.snapshots(), snapshot)?;
    print_resource(ctx.format, &snapshot)
}

fn handle_snapshot_update(
    ctx: &AppContext,
    snapshot: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let snapshots = ctx.client.snapshots();
    let id = resolve_id(&snapshots, snapshot)?;
    let updated = snapshots.update(&id, name, description)?;
    print_resource(ctx.format, &updated)
}

fn handle_snapshot_delete(ctx: &AppContext, items: &[String], force: bool) -> Result<()> {
    let snapshots = ctx.client.snapshots();
    let verb = if force { "force-delete" } else { "delete" };
    let mut batch = Batch::new("snapshot", "snapshots", verb);
    batch.run_all(items, |item| {
        let id = resolve_id(&snapshots, item)?;
        if force {
            snapshots.force_delete(&id)
        } else {
            snapshots.delete(&id)
        }
    });
    finish_batch(batch)
}

fn handle_snapshot_reset_state(ctx: &AppContext, snapshot: &str, state: &str) -> Result<()> {
    let snapshots = ctx.client.snapshots();
    let id = resolve_id(&snapshots, snapshot)?;
    snapshots.reset_state(&id, state)?;
    accepted("reset the state of", "snapshot", snapshot);
    Ok(())
}

// Share servers

fn handle_server_list(ctx: &AppContext, filters: QueryFilters) -> Result<()> {
    let servers = ctx.client.share_servers().list(filters)?;
    print_list(ctx.format, &servers, SERVER_COLUMNS)
}

fn handle_server_show(ctx: &AppContext, id: &str) -> Result<()> {
    let server = ctx.client.share_servers().get(id)?;
    print_resource(ctx.format, &server)
}

fn handle_server_delete(ctx: &AppContext, ids: &[String]) -> Result<()> {
    let servers = ctx.client.share_servers();
    let mut batch = Batch::new("share server", "share servers", "delete");
    batch.run_all(ids, |id| servers.delete(id));
    finish_batch(batch)
}

fn handle_server_reset_state(ctx: &AppContext, id: &str, state: &str) -> Result<()> {
    ctx.client.share_servers().reset_state(id, state)?;
    accepted("reset the state of", "share server", id);
    Ok(())
}

fn handle_server_migration_check(
    ctx: &AppContext,
    id: &str,
    migration: &ServerMigration,
) -> Result<()> {
    let result = ctx.client.share_servers().migration_check(id, migration)?;
    print_resource(ctx.format, &result)
}

fn handle_server_migration_start(
    ctx: &AppContext,
    id: &str,
    migration: &ServerMigration,
) -> Result<()> {
    ctx.client.share_servers().migration_start(id, migration)?;
    accepted("migrate", "share server", id);
    Ok(())
}

fn handle_server_migration_complete(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.client.share_servers().migration_complete(id)?;
    print_resource(ctx.format, &result)
}

fn handle_server_migration_cancel(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.client.share_servers().migration_cancel(id)?;
    accepted("cancel migration of", "share server", id);
    Ok(())
}

fn handle_server_migration_get_progress(ctx: &AppContext, id: &str) -> Result<()> {
    let progress = ctx.client.share_servers().migration_get_progress(id)?;
    print_resource(ctx.format, &progress)
}

// Share replicas

fn handle_replica_create(
    ctx: &AppContext,
    share: &str,
    availability_zone: Option<&str>,
    share_network: Option<&str>,
) -> Result<()> {
    let share_id = resolve_id(&ctx.client.shares(), share)?;
    let replica = ctx
        .client
        .share_replicas()
        .create(&share_id, availability_zone, share_network)?;
    print_resource(ctx.format, &replica)
}

fn handle_replica_list(ctx: &AppContext, share: Option<&str>) -> Result<()> {
    let share_id = match share {
        Some(share) => Some(resolve_id(&ctx.client.shares(), share)?),
        None => None,
    };
    let replicas = ctx.client.share_replicas().list(share_id.as_deref())?;
    print_list(ctx.format, &replicas, REPLICA_COLUMNS)
}

fn handle_replica_show(ctx: &AppContext, id: &str) -> Result<()> {
    let replica = ctx.client.share_replicas().get(id)?;
    print_resource(ctx.format, &replica)
}

fn handle_replica_delete(ctx: &AppContext, ids: &[String]) -> Result<()> {
    let replicas = ctx.client.share_replicas();
    let mut batch = Batch::new("share replica", "share replicas", "delete");
    batch.run_all(ids, |id| replicas.delete(id));
    finish_batch(batch)
}

fn handle_replica_promote(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.client.share_replicas().promote(id)?;
    accepted("promote", "share replica", id);
    Ok(())
}

fn handle_replica_resync(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.client.share_replicas().resync(id)?;
    accepted("resync", "share replica", id);
    Ok(())
}

// Quotas

fn handle_quota_show(ctx: &AppContext, target: &QuotaTarget, detail: bool) -> Result<()> {
    let quotas = ctx.client.quotas().get(target, detail)?;
    print_resource(ctx.format, &quotas)
}

fn handle_quota_defaults(ctx: &AppContext, project_id: &str) -> Result<()> {
    let quotas = ctx.client.quotas().defaults(project_id)?;
    print_resource(ctx.format, &quotas)
}

fn handle_quota_update(ctx: &AppContext, target: &QuotaTarget, update: &QuotaUpdate) -> Result<()> {
    let quotas = ctx.client.quotas().update(target, update)?;
    print_resource(ctx.format, &quotas)
}

fn handle_quota_delete(ctx: &AppContext, target: &QuotaTarget) -> Result<()> {
    ctx.client.quotas().delete(target)?;
    accepted("reset quotas of", "project", &target.project_id);
    Ok(())
}

// Resource locks

fn handle_lock_create(ctx: &AppContext, request: &LockCreate) -> Result<()> {
    let lock = ctx.client.resource_locks().create(request)?;
    print_resource(ctx.format, &lock)
}

fn handle_lock_list(ctx: &AppContext, filters: QueryFilters) -> Result<()> {
    let locks = ctx.client.resource_locks().list(filters)?;
    print_list(ctx.format, &locks, LOCK_COLUMNS)
}

fn handle_lock_show(ctx: &AppContext, id: &str) -> Result<()> {
    let lock = ctx.client.resource_locks().get(id)?;
    print_resource(ctx.format, &lock)
}

fn handle_lock_update(
    ctx: &AppContext,
    id: &str,
    resource_action: Option<&str>,
    reason: Option<&str>,
) -> Result<()> {
    let lock = ctx.client.resource_locks().update(id, resource_action, reason)?;
    print_resource(ctx.format, &lock)
}

fn handle_lock_delete(ctx: &AppContext, ids: &[String]) -> Result<()> {
    let locks = ctx.client.resource_locks();
    let mut batch = Batch::new("resource lock", "resource locks", "delete");
    batch.run_all(ids, |id| locks.delete(id));
    finish_batch(batch)
}

// Share types

fn handle_type_list(ctx: &AppContext, all: bool) -> Result<()> {
    let types = ctx.client.share_types().list(all)?;
    print_list(ctx.format, &types, TYPE_COLUMNS)
}

fn handle_type_show(ctx: &AppContext, share_type: &str) -> Result<()> {
    let share_type = find_resource(&ctx.client.share_types(), share_type)?;
    print_resource(ctx.format, &share_type)
}

fn handle_type_create(ctx: &AppContext, request: &ShareTypeCreate) -> Result<()> {
    let share_type = ctx.client.share_types().create(request)?;
    print_resource(ctx.format, &share_type)
}

fn handle_type_delete(ctx: &AppContext, items: &[String]) -> Result<()> {
    let types = ctx.client.share_types();
    let mut batch = Batch::new("share type", "share types", "delete");
    batch.run_all(items, |item| {
        let id = resolve_id(&types, item)?;
        types.delete(&id)
    });
    finish_batch(batch)
}

fn handle_type_key_set(
    ctx: &AppContext,
    share_type: &str,
    specs: BTreeMap<String, String>,
) -> Result<()> {
    let types = ctx.client.share_types();
    let id = resolve_id(&types, share_type)?;
    let extra_specs = types.set_keys(&id, &specs)?;
    print_show(ctx.format, &extra_specs)
}

fn handle_type_key_unset(ctx: &AppContext, share_type: &str, keys: &[String]) -> Result<()> {
    let types = ctx.client.share_types();
    let id = resolve_id(&types, share_type)?;
    types.unset_keys(&id, keys)?;
    accepted("unset extra specs on", "share type", share_type);
    Ok(())
}

// Miscellaneous

fn handle_availability_zone_list(ctx: &AppContext) -> Result<()> {
    let zones = ctx.client.availability_zones().list()?;
    print_list(ctx.format, &zones, ZONE_COLUMNS)
}

fn handle_service_list(ctx: &AppContext, filters: QueryFilters) -> Result<()> {
    let services = ctx.client.services().list(filters)?;
    print_list(ctx.format, &services, SERVICE_COLUMNS)
}

fn handle_service_toggle(ctx: &AppContext, host: &str, binary: &str, enable: bool) -> Result<()> {
    let services = ctx.client.services();
    let service: Resource = if enable {
        services.enable(host, binary)?
    } else {
        services.disable(host, binary)?
    };
    print_resource(ctx.format, &service)
}

fn handle_api_version(ctx: &AppContext) -> Result<()> {
    let (server_min, server_max) = match ctx.client.server_versions() {
        Some(range) => range,
        None => ctx.client.discover_versions()?,
    };
    let report = json!({
        "client_min_version": MIN_API_VERSION.to_string(),
        "client_max_version": MAX_API_VERSION.to_string(),
        "server_min_version": server_min.to_string(),
        "server_max_version": server_max.to_string(),
        "negotiated_version": ctx.client.api_version().to_string(),
    });
    let report: Map<String, Value> = match report {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    print_show(ctx.format, &report)
}

fn handle_config(key: Option<String>, value: Option<String>) -> Result<()> {
    let dir = config_dir()?;
    let mut config = SfsConfig::load(&dir)?;

    match (key, value) {
        (None, _) => {
            let lines: Vec<String> = config
                .list_all()
                .into_iter()
                .map(|(k, v)| format!("{} = {}", k, v))
                .collect();
            print!("{}", render_text_list(&lines, "No configuration values."));
        }
        (Some(key), None) => {
            let value = config.get(&key).ok_or_else(|| {
                SfsError::InvalidArgument(format!("Unknown config key: {}", key))
            })?;
            println!("{} = {}", key, value);
        }
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(&dir)?;
            print_messages(&[CmdMessage::success(format!(
                "{} set to '{}'.",
                key,
                value.trim()
            ))]);
        }
    }
    Ok(())
}

fn handle_help(command: Option<String>) -> Result<()> {
    match command {
        Some(cmd) => print_help_for_command(&cmd),
        None => print_grouped_help(),
    }
    Ok(())
}

