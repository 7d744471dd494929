//! Command-line interface over the Graph security API client.
//!
//! Authenticates with client credentials (tenant/client id as flags, the
//! secret via `MSGRAPH_CLIENT_SECRET`) and prints resources as pretty JSON,
//! one subcommand per endpoint family.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use msgraph_security::alerts::{
    self, AlertClassification, AlertDetermination, AlertStatus, UpdateAlertRequest,
};
use msgraph_security::auth::{TokenProvider, GRAPH_DEFAULT_SCOPE};
use msgraph_security::client::GraphClient;
use msgraph_security::ediscovery::{self, AddCustodianRequest, CreateCaseRequest};
use msgraph_security::error::Result;
use msgraph_security::incidents::{self, IncidentStatus, UpdateIncidentRequest};
use msgraph_security::odata::ODataQuery;
use msgraph_security::operations::PollConfig;

#[derive(Debug, Parser)]
#[command(name = "msgraph-security", about = "Microsoft Graph security API client")]
struct Cli {
    #[command(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct AuthArgs {
    /// Azure AD tenant (directory) id
    #[arg(long, env = "MSGRAPH_TENANT_ID")]
    tenant_id: String,

    /// Application (client) id
    #[arg(long, env = "MSGRAPH_CLIENT_ID")]
    client_id: String,

    /// Application client secret
    #[arg(long, env = "MSGRAPH_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// OData $filter expression, e.g. "severity eq 'high'"
    #[arg(long)]
    filter: Option<String>,

    /// Maximum number of items per page
    #[arg(long)]
    top: Option<u32>,

    /// OData $orderby expression, e.g. "createdDateTime desc"
    #[arg(long)]
    orderby: Option<String>,
}

impl ListArgs {
    fn to_query(&self) -> ODataQuery {
        let mut query = ODataQuery::new();
        if let Some(filter) = &self.filter {
            query = query.filter(filter);
        }
        if let Some(top) = self.top {
            query = query.top(top);
        }
        if let Some(orderby) = &self.orderby {
            query = query.orderby(orderby);
        }
        query
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Work with alerts (security/alerts_v2)
    Alerts {
        #[command(subcommand)]
        command: AlertsCommand,
    },
    /// Work with incidents (security/incidents)
    Incidents {
        #[command(subcommand)]
        command: IncidentsCommand,
    },
    /// Work with eDiscovery cases (security/cases/ediscoveryCases)
    Ediscovery {
        #[command(subcommand)]
        command: EdiscoveryCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AlertsCommand {
    /// List alerts
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one alert
    Get { alert_id: String },
    /// Update an alert's status, classification, determination, or assignee
    Update {
        alert_id: String,
        #[arg(long, value_parser = alert_status)]
        status: Option<AlertStatus>,
        #[arg(long, value_parser = classification)]
        classification: Option<AlertClassification>,
        #[arg(long, value_parser = determination)]
        determination: Option<AlertDetermination>,
        #[arg(long)]
        assigned_to: Option<String>,
    },
    /// Add an analyst comment to an alert
    Comment {
        alert_id: String,
        comment: String,
    },
}

#[derive(Debug, Subcommand)]
enum IncidentsCommand {
    /// List incidents
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one incident
    Get {
        incident_id: String,
        /// Include the incident's alerts ($expand=alerts)
        #[arg(long)]
        with_alerts: bool,
    },
    /// Update an incident's status, classification, or assignee
    Update {
        incident_id: String,
        #[arg(long, value_parser = incident_status)]
        status: Option<IncidentStatus>,
        #[arg(long, value_parser = classification)]
        classification: Option<AlertClassification>,
        #[arg(long, value_parser = determination)]
        determination: Option<AlertDetermination>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        resolving_comment: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum EdiscoveryCommand {
    /// List cases
    Cases {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one case
    Get { case_id: String },
    /// Create a new case
    Create {
        display_name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        external_id: Option<String>,
    },
    /// Close a case
    Close { case_id: String },
    /// Reopen a closed case
    Reopen { case_id: String },
    /// Delete a closed case
    Delete { case_id: String },
    /// List the custodians of a case
    Custodians { case_id: String },
    /// Add a custodian to a case by primary SMTP address
    AddCustodian { case_id: String, email: String },
    /// Apply a legal hold to custodians of a case
    ApplyHold {
        case_id: String,
        /// Custodian ids to hold
        custodian_ids: Vec<String>,
        /// Wait for the hold operation to finish
        #[arg(long)]
        wait: bool,
    },
    /// Remove a legal hold from custodians of a case
    RemoveHold {
        case_id: String,
        /// Custodian ids to release
        custodian_ids: Vec<String>,
        /// Wait for the hold operation to finish
        #[arg(long)]
        wait: bool,
    },
}

/// Parses a CLI string into a serde camelCase enum, so `--status resolved`
/// accepts exactly the values the wire format uses. The enums carry a
/// `#[serde(other)]` catch-all that swallows any input; re-serializing and
/// comparing detects that case, so a typo is rejected here instead of being
/// written to the service as a catch-all wire value.
fn enum_value<T>(value: &str) -> std::result::Result<T, String>
where
    T: serde::de::DeserializeOwned + Serialize,
{
    let parsed: T =
        serde_json::from_value(Value::String(value.to_string())).map_err(|e| e.to_string())?;
    let canonical = serde_json::to_value(&parsed).map_err(|e| e.to_string())?;
    if canonical == Value::String(value.to_string()) {
        Ok(parsed)
    } else {
        Err(format!("unknown value '{value}'"))
    }
}

fn alert_status(value: &str) -> std::result::Result<AlertStatus, String> {
    enum_value(value)
}

fn incident_status(value: &str) -> std::result::Result<IncidentStatus, String> {
    enum_value(value)
}

fn classification(value: &str) -> std::result::Result<AlertClassification, String> {
    enum_value(value)
}

fn determination(value: &str) -> std::result::Result<AlertDetermination, String> {
    enum_value(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let auth = TokenProvider::new(
        &cli.auth.tenant_id,
        &cli.auth.client_id,
        &cli.auth.client_secret,
        GRAPH_DEFAULT_SCOPE,
    );
    let client = GraphClient::new(auth)?;

    match cli.command {
        Command::Alerts { command } => match command {
            AlertsCommand::List { list } => {
                let alerts = alerts::list_alerts(&client, &list.to_query()).await?;
                print_json(&alerts)
            }
            AlertsCommand::Get { alert_id } => {
                let alert = alerts::get_alert(&client, &alert_id).await?;
                print_json(&alert)
            }
            AlertsCommand::Update {
                alert_id,
                status,
                classification,
                determination,
                assigned_to,
            } => {
                let update = UpdateAlertRequest {
                    status,
                    classification,
                    determination,
                    assigned_to,
                };
                let alert = alerts::update_alert(&client, &alert_id, &update).await?;
                print_json(&alert)
            }
            AlertsCommand::Comment { alert_id, comment } => {
                let comments = alerts::create_alert_comment(&client, &alert_id, &comment).await?;
                print_json(&comments)
            }
        },
        Command::Incidents { command } => match command {
            IncidentsCommand::List { list } => {
                let items = incidents::list_incidents(&client, &list.to_query()).await?;
                print_json(&items)
            }
            IncidentsCommand::Get {
                incident_id,
                with_alerts,
            } => {
                let mut options = ODataQuery::new();
                if with_alerts {
                    options = options.expand("alerts");
                }
                let incident = incidents::get_incident(&client, &incident_id, &options).await?;
                print_json(&incident)
            }
            IncidentsCommand::Update {
                incident_id,
                status,
                classification,
                determination,
                assigned_to,
                resolving_comment,
            } => {
                let update = UpdateIncidentRequest {
                    status,
                    classification,
                    determination,
                    assigned_to,
                    custom_tags: None,
                    resolving_comment,
                };
                let incident = incidents::update_incident(&client, &incident_id, &update).await?;
                print_json(&incident)
            }
        },
        Command::Ediscovery { command } => match command {
            EdiscoveryCommand::Cases { list } => {
                let cases = ediscovery::list_cases(&client, &list.to_query()).await?;
                print_json(&cases)
            }
            EdiscoveryCommand::Get { case_id } => {
                let case = ediscovery::get_case(&client, &case_id).await?;
                print_json(&case)
            }
            EdiscoveryCommand::Create {
                display_name,
                description,
                external_id,
            } => {
                let request = CreateCaseRequest {
                    display_name,
                    description,
                    external_id,
                };
                let case = ediscovery::create_case(&client, &request).await?;
                print_json(&case)
            }
            EdiscoveryCommand::Close { case_id } => {
                ediscovery::close_case(&client, &case_id).await?;
                println!("close requested for case {case_id}");
                Ok(())
            }
            EdiscoveryCommand::Reopen { case_id } => {
                ediscovery::reopen_case(&client, &case_id).await?;
                println!("reopen requested for case {case_id}");
                Ok(())
            }
            EdiscoveryCommand::Delete { case_id } => {
                ediscovery::delete_case(&client, &case_id).await?;
                println!("deleted case {case_id}");
                Ok(())
            }
            EdiscoveryCommand::Custodians { case_id } => {
                let custodians =
                    ediscovery::list_custodians(&client, &case_id, &ODataQuery::new()).await?;
                print_json(&custodians)
            }
            EdiscoveryCommand::AddCustodian { case_id, email } => {
                let custodian =
                    ediscovery::add_custodian(&client, &case_id, &AddCustodianRequest { email })
                        .await?;
                print_json(&custodian)
            }
            EdiscoveryCommand::ApplyHold {
                case_id,
                custodian_ids,
                wait,
            } => {
                let ids: Vec<&str> = custodian_ids.iter().map(String::as_str).collect();
                let poll = PollConfig::default();
                let poll = wait.then_some(&poll);
                match ediscovery::apply_hold(&client, &case_id, &ids, poll).await? {
                    Some(operation) => print_json(&operation),
                    None => {
                        println!("hold requested for {} custodian(s)", ids.len());
                        Ok(())
                    }
                }
            }
            EdiscoveryCommand::RemoveHold {
                case_id,
                custodian_ids,
                wait,
            } => {
                let ids: Vec<&str> = custodian_ids.iter().map(String::as_str).collect();
                let poll = PollConfig::default();
                let poll = wait.then_some(&poll);
                match ediscovery::remove_hold(&client, &case_id, &ids, poll).await? {
                    Some(operation) => print_json(&operation),
                    None => {
                        println!("hold release requested for {} custodian(s)", ids.len());
                        Ok(())
                    }
                }
            }
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
