//! Command line surface
//!
//! Thin wiring from clap commands to the library: resolve config, environment and templates,
//! run one operation, print its result.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser, Subcommand};
use rabbitmq_provisioner::config::Config;
use rabbitmq_provisioner::constants::{
    CONFIG_KEY_ACCOUNTS, CONFIG_KEY_CONFIG_FILES, CONFIG_KEY_DB_NAME, CONFIG_KEY_ENVIRONMENTS,
    CONFIG_KEY_HISTORY_FILES, CONFIG_KEY_TEMPLATE_FILES, CONFIG_SECTION_FILES,
    CONFIG_SECTION_HISTORY, DEFAULT_ACCOUNTS_FILE, DEFAULT_CONFIG_FILE, DEFAULT_ENVIRONMENTS_FILE,
    DEFAULT_HISTORY_DB,
};
use rabbitmq_provisioner::environments::{Accounts, Environments};
use rabbitmq_provisioner::history::{History, NewHistoryRecord};
use rabbitmq_provisioner::management::{Binding, ManagementClient, NamedEntities, Transport};
use rabbitmq_provisioner::messaging::{AmqpGateway, build_conn_string};
use rabbitmq_provisioner::report::Report;
use rabbitmq_provisioner::templates::Templates;
use rabbitmq_provisioner::{Broker, DestinationType, Error};
use serde_json::{Map, Value, json};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "rabbitmq-provisioner", version)]
#[command(about = "Provision RabbitMQ vhosts, exchanges, queues, bindings and policies", long_about = None)]
pub struct Cli {
    /// Application config (INI with a [Paths] section)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Environment name from the environments registry
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Virtual hosts
    #[command(subcommand)]
    Vhost(VhostCommand),
    /// Exchanges of a vhost
    #[command(subcommand)]
    Exchange(EntityCommand),
    /// Queues of a vhost
    #[command(subcommand)]
    Queue(EntityCommand),
    /// Bindings of a vhost
    #[command(subcommand)]
    Binding(BindingCommand),
    /// Policies of a vhost
    #[command(subcommand)]
    Policy(EntityCommand),
    /// Export or import a vhost's definitions
    #[command(subcommand)]
    Definitions(DefinitionsCommand),
    /// Publish or receive one test message
    #[command(subcommand)]
    Message(MessageCommand),
}

#[derive(Debug, Subcommand)]
enum VhostCommand {
    List,
    Exists { name: String },
    Create { name: String },
    Delete { name: String },
}

#[derive(Debug, Subcommand)]
enum EntityCommand {
    List {
        #[arg(long)]
        vhost: String,
    },
    Exists {
        #[arg(long)]
        vhost: String,
        name:  String,
    },
    Create {
        #[arg(long)]
        vhost: String,
        name:  String,
        #[command(flatten)]
        body:  BodySource,
    },
    Delete {
        #[arg(long)]
        vhost: String,
        name:  String,
    },
}

/// Where a request body comes from
#[derive(Debug, Args)]
struct BodySource {
    /// JSON file used as the body
    #[arg(long, conflicts_with = "template")]
    file:     Option<PathBuf>,
    /// Template name under the template root, without `.json`
    #[arg(long)]
    template: Option<String>,
    /// Template argument, repeatable
    #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    args:     Vec<(String, String)>,
}

#[derive(Debug, Args)]
struct BindingArgs {
    #[arg(long)]
    vhost:            String,
    #[arg(long)]
    source:           String,
    #[arg(long)]
    destination:      String,
    #[arg(long, value_enum)]
    destination_type: DestinationType,
    #[arg(long, default_value = "")]
    routing_key:      String,
}

#[derive(Debug, Subcommand)]
enum BindingCommand {
    List {
        #[arg(long)]
        vhost:  String,
        /// Only bindings whose source is this exchange
        #[arg(long)]
        source: Option<String>,
    },
    Create {
        #[command(flatten)]
        binding:   BindingArgs,
        /// Binding arguments as a JSON object
        #[arg(long)]
        arguments: Option<String>,
    },
    Delete {
        #[command(flatten)]
        binding:        BindingArgs,
        /// Broker-assigned key from `binding list`; `~` for an empty routing key
        #[arg(long, default_value = "~")]
        properties_key: String,
    },
}

#[derive(Debug, Subcommand)]
enum DefinitionsCommand {
    Export {
        #[arg(long)]
        vhost:  String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Import {
        #[arg(long)]
        vhost:  String,
        #[arg(long)]
        file:   PathBuf,
        /// Write the run report to this file instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum MessageCommand {
    /// Publish to the account's exchange
    Publish {
        #[arg(long)]
        account:     String,
        #[arg(long, default_value = "")]
        routing_key: String,
        /// JSON message body
        #[arg(long)]
        message:     String,
    },
    /// Fetch one message from the account's queue
    Receive {
        #[arg(long)]
        account: String,
    },
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

fn read_json(path: &Path) -> rabbitmq_provisioner::Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_io("read", path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{} is not valid JSON: {e}", path.display())))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolved configuration shared by every command
struct Context {
    config: Config,
    env:    Option<String>,
}

impl Context {
    fn environment(&self) -> Result<&str> {
        self.env
            .as_deref()
            .context("--env is required for this command")
    }

    fn broker(&self) -> Result<Broker> {
        let file = self.config.get_value_or(
            CONFIG_SECTION_FILES,
            CONFIG_KEY_ENVIRONMENTS,
            DEFAULT_ENVIRONMENTS_FILE,
        );
        let environments =
            Environments::load(self.config.get_file_path(CONFIG_KEY_CONFIG_FILES, &file)?)?;
        Ok(environments.get_env(self.environment()?)?)
    }

    fn templates(&self) -> Result<Templates> {
        Ok(Templates::new(self.config.get_path(CONFIG_KEY_TEMPLATE_FILES)?))
    }

    fn accounts(&self) -> Result<Accounts> {
        let file =
            self.config
                .get_value_or(CONFIG_SECTION_FILES, CONFIG_KEY_ACCOUNTS, DEFAULT_ACCOUNTS_FILE);
        Ok(Accounts::load(self.config.get_file_path(CONFIG_KEY_CONFIG_FILES, &file)?)?)
    }

    async fn history(&self) -> Result<History> {
        let db_name =
            self.config
                .get_value_or(CONFIG_SECTION_HISTORY, CONFIG_KEY_DB_NAME, DEFAULT_HISTORY_DB);
        Ok(History::open(self.config.get_path(CONFIG_KEY_HISTORY_FILES)?, &db_name).await?)
    }

    fn body(&self, source: &BodySource) -> Result<Value> {
        match (&source.file, &source.template) {
            (Some(file), _) => Ok(read_json(file)?),
            (None, Some(template)) => Ok(self.templates()?.load_with_args(
                template,
                source.args.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            )?),
            (None, None) => bail!("either --file or --template is required"),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load(&self.config)
            .with_context(|| format!("loading config {}", self.config.display()))?;
        let context = Context {
            config,
            env: self.env,
        };
        let client = ManagementClient::https();

        match self.command {
            Command::Vhost(command) => run_vhost(&context, &client, command).await,
            Command::Exchange(command) => {
                run_entity(&context, &client.exchanges(), command).await
            }
            Command::Queue(command) => run_entity(&context, &client.queues(), command).await,
            Command::Binding(command) => run_binding(&context, &client, command).await,
            Command::Policy(command) => run_policy(&context, &client, command).await,
            Command::Definitions(command) => run_definitions(&context, &client, command).await,
            Command::Message(command) => run_message(&context, command).await,
        }
    }
}

async fn run_vhost<T: Transport>(
    context: &Context,
    client: &ManagementClient<T>,
    command: VhostCommand,
) -> Result<()> {
    let broker = context.broker()?;
    let vhosts = client.vhosts();
    match command {
        VhostCommand::List => {
            for name in vhosts.list(&broker).await? {
                println!("{name}");
            }
        }
        VhostCommand::Exists { name } => println!("{}", vhosts.is_present(&broker, &name).await?),
        VhostCommand::Create { name } => vhosts.create(&broker, &name).await?,
        VhostCommand::Delete { name } => vhosts.delete(&broker, &name).await?,
    }
    Ok(())
}

async fn run_entity<T: Transport>(
    context: &Context,
    entities: &NamedEntities<'_, T>,
    command: EntityCommand,
) -> Result<()> {
    let broker = context.broker()?;
    match command {
        EntityCommand::List { vhost } => {
            for name in entities.list(&broker, &vhost).await? {
                println!("{name}");
            }
        }
        EntityCommand::Exists { vhost, name } => {
            println!("{}", entities.is_present(&broker, &vhost, &name).await?);
        }
        EntityCommand::Create { vhost, name, body } => {
            let body = context.body(&body)?;
            entities.create(&broker, &vhost, &name, &body).await?;
        }
        EntityCommand::Delete { vhost, name } => entities.delete(&broker, &vhost, &name).await?,
    }
    Ok(())
}

async fn run_policy<T: Transport>(
    context: &Context,
    client: &ManagementClient<T>,
    command: EntityCommand,
) -> Result<()> {
    let broker = context.broker()?;
    let policies = client.policies();
    match command {
        EntityCommand::List { vhost } => {
            for name in policies.list(&broker, &vhost).await? {
                println!("{name}");
            }
        }
        EntityCommand::Exists { vhost, name } => {
            println!("{}", policies.is_present(&broker, &vhost, &name).await?);
        }
        EntityCommand::Create { vhost, name, body } => match (&body.template, body.args.is_empty()) {
            (Some(template), true) if body.file.is_none() => {
                policies
                    .create_from_template(&broker, &vhost, &name, &context.templates()?, template)
                    .await?;
            }
            _ => {
                let policy = context.body(&body)?;
                policies.create(&broker, &vhost, &name, &policy).await?;
            }
        },
        EntityCommand::Delete { vhost, name } => policies.delete(&broker, &vhost, &name).await?,
    }
    Ok(())
}

async fn run_binding<T: Transport>(
    context: &Context,
    client: &ManagementClient<T>,
    command: BindingCommand,
) -> Result<()> {
    let broker = context.broker()?;
    let bindings = client.bindings();
    match command {
        BindingCommand::List { vhost, source } => {
            let listed = match source {
                Some(source) => bindings.list_from_source(&broker, &vhost, &source).await?,
                None => bindings.list(&broker, &vhost).await?,
            };
            print_json(&Value::Array(listed.iter().map(Binding::to_json).collect()))?;
        }
        BindingCommand::Create { binding, arguments } => {
            let arguments = arguments
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("--arguments must be a JSON object")?
                .unwrap_or(Value::Null);
            let vhost = binding.vhost.clone();
            let binding = to_binding(binding).with_arguments(arguments);
            bindings.create(&broker, &vhost, &binding).await?;
        }
        BindingCommand::Delete {
            binding,
            properties_key,
        } => {
            let vhost = binding.vhost.clone();
            let binding = to_binding(binding).with_properties_key(properties_key);
            bindings.delete(&broker, &vhost, &binding).await?;
        }
    }
    Ok(())
}

fn to_binding(args: BindingArgs) -> Binding {
    Binding::new(
        args.source,
        args.destination,
        args.destination_type,
        args.routing_key,
    )
}

async fn run_definitions<T: Transport>(
    context: &Context,
    client: &ManagementClient<T>,
    command: DefinitionsCommand,
) -> Result<()> {
    let broker = context.broker()?;
    match command {
        DefinitionsCommand::Export { vhost, output } => {
            let definitions = client.definitions().get(&broker, &vhost).await?;
            match output {
                Some(path) => {
                    fs::write(&path, serde_json::to_string_pretty(&definitions)?)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("definitions of {vhost} written to {}", path.display());
                }
                None => print_json(&definitions)?,
            }
        }
        DefinitionsCommand::Import {
            vhost,
            file,
            report: report_path,
        } => {
            let definitions = read_json(&file)?;
            client.definitions().load(&broker, &vhost, &definitions).await?;

            let environment = context.environment()?.to_string();
            let mut report = Report::new();
            report.set_context(json!({
                "environment": environment,
                "vhost": vhost,
                "input_file": file.display().to_string(),
            }));
            report.append_event("definitions loaded", Map::new());
            match &report_path {
                Some(path) => fs::write(path, report.report())
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{}", report.report()),
            }

            let history = context.history().await?;
            let record = NewHistoryRecord::now(
                file.display().to_string(),
                report_path.map(|path| path.display().to_string()),
                Some(environment),
            );
            history.append(&record).await?;
            history.close().await;
        }
    }
    Ok(())
}

async fn run_message(context: &Context, command: MessageCommand) -> Result<()> {
    let broker = context.broker()?;
    let accounts = context.accounts()?;
    let account_name = match &command {
        MessageCommand::Publish { account, .. } | MessageCommand::Receive { account } => account,
    };
    let account = accounts.get_account(account_name)?;
    let conn_string = build_conn_string(&broker.host, &account.user, &account.password, &account.vhost)?;
    let gateway = AmqpGateway::connect(&conn_string).await?;

    match &command {
        MessageCommand::Publish {
            routing_key,
            message,
            ..
        } => {
            let message: Value =
                serde_json::from_str(message).context("--message must be valid JSON")?;
            gateway
                .publish_message(&account.artefact, routing_key, &message)
                .await?;
        }
        MessageCommand::Receive { .. } => match gateway.receive_message(&account.artefact).await? {
            Some(message) => print_json(&message)?,
            None => eprintln!("no message waiting on {}", account.artefact),
        },
    }
    gateway.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("field=a").unwrap(),
            ("field".to_string(), "a".to_string())
        );
        assert_eq!(
            parse_key_val("value=a=b").unwrap(),
            ("value".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn test_parse_binding_create() {
        let cli = Cli::try_parse_from([
            "rabbitmq-provisioner",
            "--env",
            "test",
            "binding",
            "create",
            "--vhost",
            "EA",
            "--source",
            "one-s",
            "--destination",
            "one-d",
            "--destination-type",
            "queue",
            "--routing-key",
            "one-r",
        ])
        .unwrap();

        let Command::Binding(BindingCommand::Create { binding, arguments }) = cli.command else {
            panic!("expected binding create");
        };
        assert!(arguments.is_none());
        assert_eq!(to_binding(binding).path(), "e/one-s/q/one-d");
    }

    #[test]
    fn test_parse_queue_create_from_template() {
        let cli = Cli::try_parse_from([
            "rabbitmq-provisioner",
            "queue",
            "create",
            "--vhost",
            "EA",
            "orders",
            "--template",
            "queues/classic",
            "--arg",
            "ttl=60000",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("app.ini"));
        let Command::Queue(EntityCommand::Create { body, .. }) = cli.command else {
            panic!("expected queue create");
        };
        assert_eq!(body.template.as_deref(), Some("queues/classic"));
        assert_eq!(body.args, vec![("ttl".to_string(), "60000".to_string())]);
    }

    #[test]
    fn test_file_and_template_conflict() {
        let result = Cli::try_parse_from([
            "rabbitmq-provisioner",
            "exchange",
            "create",
            "--vhost",
            "EA",
            "orders",
            "--file",
            "orders.json",
            "--template",
            "exchanges/topic",
        ]);
        assert!(result.is_err());
    }
}
