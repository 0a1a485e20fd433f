//! Wire constants, config keys and defaults

// This file contains constants shared across the management API resources and the CLI
// Error messages carried by classified remote failures live here too

// Management API path segments
/// Root segment of every management call
pub const API_ROOT: &str = "api";
/// Vhost collection
pub const API_VHOSTS: &str = "vhosts";
/// Exchange collection
pub const API_EXCHANGES: &str = "exchanges";
/// Queue collection
pub const API_QUEUES: &str = "queues";
/// Binding collection
pub const API_BINDINGS: &str = "bindings";
/// Policy collection
pub const API_POLICIES: &str = "policies";
/// Definitions export/import
pub const API_DEFINITIONS: &str = "definitions";
/// Trailing segments of `exchanges/{vhost}/{source}/bindings/source`
pub const API_BINDINGS_SOURCE: [&str; 2] = ["bindings", "source"];

// Binding path codes
/// Binding path code for an exchange
pub const BINDING_CODE_EXCHANGE: &str = "e";
/// Binding path code for a queue
pub const BINDING_CODE_QUEUE: &str = "q";

// Schemes
/// Scheme used for every management call
pub const MANAGEMENT_SCHEME: &str = "https";
/// Scheme used by the messaging gateway
pub const AMQP_SCHEME: &str = "amqps";

// JSON field names
/// `name`
pub const JSON_FIELD_NAME: &str = "name";
/// `routing_key`
pub const JSON_FIELD_ROUTING_KEY: &str = "routing_key";
/// `arguments`
pub const JSON_FIELD_ARGUMENTS: &str = "arguments";
/// `id`
pub const JSON_FIELD_ID: &str = "id";
/// `timestamp`
pub const JSON_FIELD_TIMESTAMP: &str = "timestamp";
/// `context`
pub const JSON_FIELD_CONTEXT: &str = "context";

// Classified error messages
/// Message of `Error::NotFound`
pub const MSG_NOT_FOUND: &str = "resource not found";
/// Message of `Error::ServerError`
pub const MSG_SERVER_ERROR: &str = "server exception";
/// Prefix of `Error::Template` messages
pub const MSG_TEMPLATE_EXCEPTION: &str = "exception in template";

// Template files
/// Template file extension
pub const TEMPLATE_EXTENSION: &str = "json";

// Config sections and keys
/// Directories, resolved against the INI file
pub const CONFIG_SECTION_PATHS: &str = "Paths";
/// Registry file names
pub const CONFIG_SECTION_FILES: &str = "Files";
/// History database settings
pub const CONFIG_SECTION_HISTORY: &str = "History";
/// Template root
pub const CONFIG_KEY_TEMPLATE_FILES: &str = "template_files";
/// Registry directory
pub const CONFIG_KEY_CONFIG_FILES: &str = "config_files";
/// History database directory
pub const CONFIG_KEY_HISTORY_FILES: &str = "history_files";
/// Environments registry file
pub const CONFIG_KEY_ENVIRONMENTS: &str = "environments";
/// Accounts registry file
pub const CONFIG_KEY_ACCOUNTS: &str = "accounts";
/// History database name, without extension
pub const CONFIG_KEY_DB_NAME: &str = "db_name";

// Defaults
/// Config used when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "app.ini";
/// Environments registry file name
pub const DEFAULT_ENVIRONMENTS_FILE: &str = "environments.json";
/// Accounts registry file name
pub const DEFAULT_ACCOUNTS_FILE: &str = "accounts.json";
/// History database name
pub const DEFAULT_HISTORY_DB: &str = "provisioning";
/// History database extension
pub const HISTORY_DB_EXTENSION: &str = "db";
/// Table holding history rows
pub const HISTORY_TABLE: &str = "History";
/// Recorded when no OS user can be found
pub const UNKNOWN_USER: &str = "unknown";

// HTTP client
/// Whole-request timeout
pub const HTTP_TIMEOUT_SECS: u64 = 30;
/// Connect timeout
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
