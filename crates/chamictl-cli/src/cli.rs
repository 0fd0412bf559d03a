//! CLI argument definitions using clap.

use std::path::PathBuf;

use chamictl_core::codec::DataFormat;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

/// chamictl - client for cluster boot, inventory, cloud-init and power services
#[derive(Parser, Debug)]
#[command(name = "chamictl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file to use instead of the system and user files
    #[arg(short = 'c', long, global = true, env = "CHAMICTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not read any configuration file
    #[arg(long, global = true)]
    pub ignore_config: bool,

    /// Log level (overrides config)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log format (overrides config)
    #[arg(short = 'L', long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Format of output printed to standard output (json, json-pretty, yaml)
    #[arg(short = 'F', long, global = true)]
    pub format_output: Option<DataFormat>,

    #[command(flatten)]
    pub conn: ConnArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection options shared by every service command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnArgs {
    /// Name of configured cluster to use
    #[arg(short = 'C', long, global = true)]
    pub cluster: Option<String>,

    /// Base URI of the cluster, overriding config
    #[arg(short = 'u', long, global = true)]
    pub cluster_uri: Option<String>,

    /// Path to PEM CA certificate to trust
    #[arg(long, global = true)]
    pub cacert: Option<PathBuf>,

    /// Access token to use instead of <CLUSTER>_ACCESS_TOKEN
    #[arg(short = 't', long, global = true)]
    pub token: Option<String>,

    /// Do not send an access token
    #[arg(long, global = true, conflicts_with = "token")]
    pub no_token: bool,

    /// Do not verify TLS certificates
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Basic,
    Rfc3339,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Basic => "basic",
            LogFormat::Rfc3339 => "rfc3339",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View or modify configuration
    Config(ConfigArgs),

    /// Boot script service
    Bss(BssArgs),

    /// State manager / inventory database
    Smd(SmdArgs),

    /// Cloud-init metadata service
    #[command(name = "cloud-init")]
    CloudInit(CloudInitArgs),

    /// Power control service
    Pcs(PcsArgs),
}

// ==================== Shared ====================

/// Request payload from `--data`.
#[derive(Args, Debug, Clone, Default)]
pub struct PayloadArgs {
    /// Payload data: inline, @file, or @- / - for stdin
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Format of payload data
    #[arg(short = 'f', long, default_value = "json")]
    pub format_input: DataFormat,
}

/// Targets of a delete: ids, everything, or ids read from a payload.
#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("target").required(true).args(["ids", "all", "data"])))]
pub struct DeleteArgs {
    /// Identifiers to delete
    pub ids: Vec<String>,

    /// Delete everything
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Payload listing the items to delete: inline, @file, or @- / - for stdin
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Format of payload data
    #[arg(short = 'f', long, default_value = "json")]
    pub format_input: DataFormat,

    /// Do not ask before deleting
    #[arg(long)]
    pub force: bool,
}

/// Single-node selector.
#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("node").args(["xname", "mac", "nid"])))]
pub struct NodeArgs {
    /// Xname of node
    #[arg(short = 'x', long)]
    pub xname: Option<String>,

    /// MAC address of node
    #[arg(short = 'm', long)]
    pub mac: Option<String>,

    /// Node ID
    #[arg(short = 'n', long)]
    pub nid: Option<i32>,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Operate on the system configuration file
    #[arg(long, global = true, conflicts_with = "user")]
    pub system: bool,

    /// Operate on the user configuration file
    #[arg(long, global = true)]
    pub user: bool,

    /// Create a missing configuration file without asking
    #[arg(long, global = true)]
    pub no_confirm: bool,

    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show configuration, or the value of one key
    Show(ConfigShowArgs),

    /// Manage cluster entries
    Cluster(ConfigClusterArgs),

    /// Set a configuration key (log.level, log.format, default-cluster)
    Set(ConfigSetArgs),

    /// Remove a configuration key
    Unset(ConfigUnsetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Dotted key to show, e.g. log.level
    pub key: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigClusterArgs {
    #[command(subcommand)]
    pub command: ConfigClusterCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigClusterCommands {
    /// Add or update a cluster
    Set(ConfigClusterSetArgs),

    /// Delete a cluster
    Delete(ConfigClusterDeleteArgs),
}

#[derive(Args, Debug)]
pub struct ConfigClusterSetArgs {
    /// Cluster name
    pub name: String,

    /// Cluster-wide base URI
    #[arg(long)]
    pub uri: Option<String>,

    /// Whether requests to this cluster need an access token
    #[arg(long)]
    pub enable_auth: Option<bool>,

    /// BSS URI (absolute, or a path joined onto the cluster URI)
    #[arg(long)]
    pub bss_uri: Option<String>,

    /// SMD URI
    #[arg(long)]
    pub smd_uri: Option<String>,

    /// Cloud-init URI
    #[arg(long)]
    pub cloud_init_uri: Option<String>,

    /// PCS URI
    #[arg(long)]
    pub pcs_uri: Option<String>,

    /// Also make this the default cluster
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug)]
pub struct ConfigClusterDeleteArgs {
    /// Cluster name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args, Debug)]
pub struct ConfigUnsetArgs {
    pub key: String,
}

// ==================== BSS ====================

#[derive(Args, Debug)]
pub struct BssArgs {
    /// BSS base URI (absolute, or a path joined onto the cluster URI)
    #[arg(long, global = true)]
    pub uri: Option<String>,

    #[command(subcommand)]
    pub command: BssCommands,
}

#[derive(Subcommand, Debug)]
pub enum BssCommands {
    /// Manage boot parameters
    #[command(name = "bootparams")]
    BootParams(BootParamsArgs),

    /// Get boot scripts
    #[command(name = "bootscript")]
    BootScript(BootScriptArgs),

    /// Get service status
    Status(BssStatusArgs),

    /// Get host information
    Hosts(BssHostsArgs),

    /// Get endpoint access history
    History(BssHistoryArgs),

    /// Dump the service's internal state
    Dumpstate,
}

#[derive(Args, Debug)]
pub struct BootParamsArgs {
    #[command(subcommand)]
    pub command: BootParamsCommands,
}

#[derive(Subcommand, Debug)]
pub enum BootParamsCommands {
    /// Get boot parameters for all nodes or one node
    Get(NodeArgs),

    /// Add new boot parameters
    Add(BootParamsWriteArgs),

    /// Replace boot parameters
    Set(BootParamsWriteArgs),

    /// Update existing boot parameters
    Update(BootParamsWriteArgs),

    /// Delete boot parameters
    Delete(BootParamsDeleteArgs),
}

/// Boot parameters from flags, or a payload.
#[derive(Args, Debug, Clone, Default)]
pub struct BootParamsFields {
    /// Xnames to apply to
    #[arg(short = 'x', long = "xname", value_delimiter = ',')]
    pub xnames: Vec<String>,

    /// MAC addresses to apply to
    #[arg(short = 'm', long = "mac", value_delimiter = ',')]
    pub macs: Vec<String>,

    /// Node IDs to apply to
    #[arg(short = 'n', long = "nid", value_delimiter = ',')]
    pub nids: Vec<i32>,

    /// URI of kernel
    #[arg(long)]
    pub kernel: Option<String>,

    /// URI of initrd/initramfs
    #[arg(long)]
    pub initrd: Option<String>,

    /// Kernel parameters
    #[arg(long)]
    pub params: Option<String>,
}

#[derive(Args, Debug)]
pub struct BootParamsWriteArgs {
    #[command(flatten)]
    pub fields: BootParamsFields,

    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct BootParamsDeleteArgs {
    #[command(flatten)]
    pub fields: BootParamsFields,

    #[command(flatten)]
    pub payload: PayloadArgs,

    /// Do not ask before deleting
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct BootScriptArgs {
    #[command(subcommand)]
    pub command: BootScriptCommands,
}

#[derive(Subcommand, Debug)]
pub enum BootScriptCommands {
    /// Get the boot script for one node
    Get(NodeArgs),
}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
#[command(group(ArgGroup::new("which").args(["all", "storage", "smd", "version"])))]
pub struct BssStatusArgs {
    /// Status of every BSS component
    #[arg(long)]
    pub all: bool,

    /// Storage backend status
    #[arg(long)]
    pub storage: bool,

    /// SMD connection status
    #[arg(long)]
    pub smd: bool,

    /// BSS version
    #[arg(long)]
    pub version: bool,
}

#[derive(Args, Debug)]
pub struct BssHostsArgs {
    #[command(subcommand)]
    pub command: BssHostsCommands,
}

#[derive(Subcommand, Debug)]
pub enum BssHostsCommands {
    /// Get host information for all nodes or one node
    Get(NodeArgs),
}

#[derive(Args, Debug)]
pub struct BssHistoryArgs {
    /// Filter by xname
    #[arg(long)]
    pub xname: Option<String>,

    /// Filter by endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

// ==================== SMD ====================

#[derive(Args, Debug)]
pub struct SmdArgs {
    /// SMD base URI (absolute, or a path joined onto the cluster URI)
    #[arg(long, global = true)]
    pub uri: Option<String>,

    #[command(subcommand)]
    pub command: SmdCommands,
}

#[derive(Subcommand, Debug)]
pub enum SmdCommands {
    /// Get service status
    Status(SmdStatusArgs),

    /// Manage components
    Component(ComponentArgs),

    /// Manage component endpoints
    Compep(CollectionArgs),

    /// Manage redfish endpoints
    Rfe(CollectionArgs),

    /// Manage ethernet interfaces
    Iface(CollectionArgs),

    /// Manage groups
    Group(GroupArgs),
}

#[derive(Args, Debug)]
pub struct SmdStatusArgs {
    /// Show all service values instead of readiness
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ComponentArgs {
    #[command(subcommand)]
    pub command: ComponentCommands,
}

#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
    /// Get all components or one component
    Get(ComponentGetArgs),

    /// Add components
    Add(ComponentAddArgs),

    /// Delete components
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("selector").args(["xname", "nid"])))]
pub struct ComponentGetArgs {
    /// Xname of component
    #[arg(short = 'x', long)]
    pub xname: Option<String>,

    /// Node ID of component
    #[arg(short = 'n', long)]
    pub nid: Option<i64>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["xname", "data"])))]
pub struct ComponentAddArgs {
    /// Xname of component to add
    #[arg(requires = "nid")]
    pub xname: Option<String>,

    /// Node ID of component to add
    pub nid: Option<i64>,

    /// Component state
    #[arg(long, default_value = "Ready")]
    pub state: String,

    /// Whether the component is enabled
    #[arg(long, default_value_t = true)]
    pub enabled: bool,

    /// Component role
    #[arg(long, default_value = "Compute")]
    pub role: String,

    /// Component architecture
    #[arg(long, default_value = "X86")]
    pub arch: String,

    /// Payload data: inline, @file, or @- / - for stdin
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Format of payload data
    #[arg(short = 'f', long, default_value = "json")]
    pub format_input: DataFormat,
}

/// get / add / delete on an SMD collection.
#[derive(Args, Debug)]
pub struct CollectionArgs {
    #[command(subcommand)]
    pub command: CollectionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommands {
    /// Get all items or one item
    Get(IdArg),

    /// Add items from a payload, one request each
    Add(RequiredPayloadArgs),

    /// Delete items
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Identifier of a single item
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequiredPayloadArgs {
    /// Payload data: inline, @file, or @- / - for stdin
    #[arg(short = 'd', long, required = true)]
    pub data: String,

    /// Format of payload data
    #[arg(short = 'f', long, default_value = "json")]
    pub format_input: DataFormat,
}

#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Get all groups or one group
    Get(IdArg),

    /// Add groups from a payload, one request each
    Add(RequiredPayloadArgs),

    /// Delete groups
    Delete(DeleteArgs),

    /// Manage group members
    Member(GroupMemberArgs),
}

#[derive(Args, Debug)]
pub struct GroupMemberArgs {
    #[command(subcommand)]
    pub command: GroupMemberCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupMemberCommands {
    /// List members of a group
    Get(GroupMemberGetArgs),

    /// Add members to a group
    Add(GroupMemberEditArgs),

    /// Remove members from a group
    Delete(GroupMemberDeleteArgs),
}

#[derive(Args, Debug)]
pub struct GroupMemberGetArgs {
    pub label: String,
}

#[derive(Args, Debug)]
pub struct GroupMemberEditArgs {
    pub label: String,

    /// Component xnames
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GroupMemberDeleteArgs {
    pub label: String,

    /// Component xnames
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Do not ask before deleting
    #[arg(long)]
    pub force: bool,
}

// ==================== Cloud-init ====================

#[derive(Args, Debug)]
pub struct CloudInitArgs {
    /// Cloud-init base URI (absolute, or a path joined onto the cluster URI)
    #[arg(long, global = true)]
    pub uri: Option<String>,

    #[command(subcommand)]
    pub command: CloudInitCommands,
}

#[derive(Subcommand, Debug)]
pub enum CloudInitCommands {
    /// Manage per-node configs
    Config(CiConfigArgs),

    /// Manage group configs
    Group(CiGroupArgs),

    /// Get data served to nodes
    Node(CiNodeArgs),

    /// Get service status
    Status(CiStatusArgs),
}

#[derive(Args, Debug)]
pub struct CiConfigArgs {
    /// Use the secure endpoint
    #[arg(long, global = true)]
    pub secure: bool,

    #[command(subcommand)]
    pub command: CiConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum CiConfigCommands {
    /// Get all configs or one config
    Get(IdArg),

    /// Add configs from a payload
    Add(RequiredPayloadArgs),

    /// Replace configs from a payload, by name
    Set(RequiredPayloadArgs),

    /// Delete configs
    Delete(CiDeleteArgs),
}

/// Like [`DeleteArgs`] without `--all`; cloud-init has no bulk delete.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["ids", "data"])))]
pub struct CiDeleteArgs {
    /// Names to delete
    pub ids: Vec<String>,

    /// Payload listing the items to delete: inline, @file, or @- / - for stdin
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Format of payload data
    #[arg(short = 'f', long, default_value = "json")]
    pub format_input: DataFormat,

    /// Do not ask before deleting
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CiGroupArgs {
    #[command(subcommand)]
    pub command: CiGroupCommands,
}

#[derive(Subcommand, Debug)]
pub enum CiGroupCommands {
    /// Get all groups or one group
    Get(IdArg),

    /// Add groups from a payload
    Add(RequiredPayloadArgs),

    /// Replace groups from a payload, by name
    Set(RequiredPayloadArgs),

    /// Delete groups
    Delete(CiDeleteArgs),

    /// Render a group's cloud-config for a node
    Render(CiRenderArgs),
}

#[derive(Args, Debug)]
pub struct CiRenderArgs {
    pub group: String,
    pub node: String,
}

#[derive(Args, Debug)]
pub struct CiNodeArgs {
    #[command(subcommand)]
    pub command: CiNodeCommands,
}

#[derive(Subcommand, Debug)]
pub enum CiNodeCommands {
    /// Get meta-data, user-data or vendor-data for nodes
    Get(CiNodeGetArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeDataKind {
    MetaData,
    UserData,
    VendorData,
}

#[derive(Args, Debug)]
pub struct CiNodeGetArgs {
    #[arg(value_enum)]
    pub kind: NodeDataKind,

    /// Node IDs
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub struct CiStatusArgs {
    /// Print version information
    #[arg(long)]
    pub version: bool,

    /// Print the OpenAPI spec
    #[arg(long)]
    pub api: bool,

    /// Print nothing; exit 0 if running, 1 if not
    #[arg(short = 'q', long, conflicts_with_all = ["version", "api"])]
    pub quiet: bool,
}

// ==================== PCS ====================

#[derive(Args, Debug)]
pub struct PcsArgs {
    /// PCS base URI (absolute, or a path joined onto the cluster URI)
    #[arg(long, global = true)]
    pub uri: Option<String>,

    #[command(subcommand)]
    pub command: PcsCommands,
}

#[derive(Subcommand, Debug)]
pub enum PcsCommands {
    /// Get service status
    Status(PcsStatusArgs),

    /// Manage power transitions
    Transition(TransitionArgs),
}

#[derive(Args, Debug)]
pub struct PcsStatusArgs {
    /// Service state plus every health field
    #[arg(long, conflicts_with_all = ["storage", "smd", "vault"])]
    pub all: bool,

    /// Storage backend health
    #[arg(long)]
    pub storage: bool,

    /// SMD connection health
    #[arg(long)]
    pub smd: bool,

    /// Vault health
    #[arg(long)]
    pub vault: bool,
}

#[derive(Args, Debug)]
pub struct TransitionArgs {
    #[command(subcommand)]
    pub command: TransitionCommands,
}

#[derive(Subcommand, Debug)]
pub enum TransitionCommands {
    /// Start a transition
    Start(TransitionStartArgs),

    /// List transitions
    List,

    /// Show one transition
    Show(TransitionIdArgs),

    /// Abort a transition
    Abort(TransitionAbortArgs),
}

#[derive(Args, Debug)]
pub struct TransitionStartArgs {
    /// on, off, soft-off, soft-restart, hard-restart, reinit or force-off
    pub operation: String,

    /// Target xnames
    #[arg(short = 'x', long = "xname", required = true, value_delimiter = ',')]
    pub xnames: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TransitionIdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct TransitionAbortArgs {
    pub id: String,

    /// Do not ask before aborting
    #[arg(long)]
    pub force: bool,
}
