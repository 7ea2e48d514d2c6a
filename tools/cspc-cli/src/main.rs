//! CSPC command-line client
//!
//! Thin wrapper over `cspc-client` for inventory queries, discovery and
//! seed-file handling from a shell. Connection settings come from flags or
//! the `CSPC_*` environment variables; transport options from an optional
//! YAML file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cspc_client::{
    ApplianceResponse, ClientOptions, CredentialContext, CspcClient, DeviceField, DeviceListing,
    MatchValue, ResponseFormat, SeedRow,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xmltree::EmitterConfig;

#[derive(Debug, Parser)]
#[command(name = "cspc", version, about = "Query and manage a CSPC collector appliance")]
struct Cli {
    /// Appliance host name or IP address
    #[arg(long, env = "CSPC_HOST")]
    host: String,

    /// API user
    #[arg(long, env = "CSPC_USER")]
    user: String,

    /// API password; prompted for when neither the flag nor the variable is set
    #[arg(long, env = "CSPC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Verify the appliance's TLS certificate
    #[arg(long, env = "CSPC_VERIFY_TLS")]
    verify_tls: bool,

    /// YAML file with client options (scheme, port, template_dir, namespace, seed_file_tls)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the appliance's diagnostic information
    Info,
    /// List all devices
    Devices {
        /// Print decoded JSON instead of XML
        #[arg(long)]
        structured: bool,
    },
    /// List devices that are not reachable
    Unreachable,
    /// Find devices whose field contains any of the given values
    Find {
        /// Device field, e.g. HostName or IPAddress
        #[arg(long, default_value = "HostName", value_parser = parse_field)]
        key: DeviceField,
        /// Substring to look for (case-sensitive)
        #[arg(long, num_args = 1.., required = true)]
        value: Vec<String>,
    },
    /// Start a discovery job for the given addresses
    Discover {
        #[arg(required = true)]
        ips: Vec<String>,
    },
    /// Delete every device that is not reachable
    DeleteUnreachable,
    /// Print a seed-file line for one device
    SeedRow {
        ip: String,
        #[arg(long, default_value = "")]
        host_name: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        device_password: String,
        #[arg(long, default_value = "")]
        enable_password: String,
        #[arg(long, default_value = "")]
        snmp_ro: String,
        #[arg(long, default_value = "")]
        snmp_rw: String,
    },
    /// Upload a seed file and schedule its import
    ImportSeed {
        /// CSV seed file
        file: PathBuf,
        /// Device group to import into
        #[arg(long)]
        group: String,
    },
}

fn parse_field(s: &str) -> Result<DeviceField, String> {
    s.parse::<DeviceField>().map_err(|e| e.to_string())
}

fn resolve_password(
    given: Option<String>,
    prompt: impl FnOnce() -> std::io::Result<String>,
) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => prompt().context("Failed to read password"),
    }
}

fn load_options(path: Option<&Path>) -> Result<ClientOptions> {
    let Some(path) = path else {
        return Ok(ClientOptions::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

fn match_value(mut values: Vec<String>) -> MatchValue {
    if values.len() == 1 {
        MatchValue::One(values.remove(0))
    } else {
        MatchValue::AnyOf(values.into_iter().collect())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_response(response: ApplianceResponse) -> Result<()> {
    match response {
        ApplianceResponse::Xml(body) => println!("{}", body),
        ApplianceResponse::Structured(value) => print_json(&value)?,
    }
    Ok(())
}

fn print_seed_row(command: Command) -> Result<()> {
    if let Command::SeedRow {
        ip,
        host_name,
        username,
        device_password,
        enable_password,
        snmp_ro,
        snmp_rw,
    } = command
    {
        let row = SeedRow {
            host_name,
            primary_user: username,
            primary_password: device_password,
            primary_enable_password: enable_password,
            snmp_ro,
            snmp_rw,
            ..SeedRow::new(ip)
        };
        print!("{}", row.to_csv_line());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Offline command: no appliance connection needed
    if let Command::SeedRow { .. } = cli.command {
        return print_seed_row(cli.command);
    }

    let password = resolve_password(cli.password, || {
        rpassword::prompt_password(format!("Password for {}@{}: ", cli.user, cli.host))
    })?;
    let credentials = CredentialContext::new(cli.host, cli.user, password, cli.verify_tls);
    let options = load_options(cli.config.as_deref())?;
    info!("Connecting with {}", credentials);

    let client = CspcClient::with_options(&credentials, &options)
        .context("Failed to create CSPC client")?;

    match cli.command {
        Command::Info => println!("{}", client.get_info().await?),
        Command::Devices { structured } => {
            let format = if structured {
                ResponseFormat::Structured
            } else {
                ResponseFormat::Xml
            };
            match client.list_devices(format).await? {
                DeviceListing::Structured(devices) => print_json(&Value::Array(devices))?,
                DeviceListing::Elements(devices) => {
                    for device in devices {
                        let mut out = Vec::new();
                        device.write_with_config(
                            &mut out,
                            EmitterConfig::new()
                                .perform_indent(true)
                                .write_document_declaration(false),
                        )?;
                        println!("{}", String::from_utf8_lossy(&out));
                    }
                }
            }
        }
        Command::Unreachable => print_json(&client.list_unreachable_devices().await?)?,
        Command::Find { key, value } => {
            print_json(&client.find_devices_by(key, match_value(value)).await?)?
        }
        Command::Discover { ips } => {
            print_response(client.discover_devices(&ips, ResponseFormat::Xml).await?)?
        }
        Command::DeleteUnreachable => {
            let unreachable = client.list_unreachable_devices().await?;
            if unreachable.is_empty() {
                info!("No unreachable devices");
            } else {
                info!("Deleting {} unreachable devices", unreachable.len());
                print_response(client.delete_devices(&unreachable, ResponseFormat::Xml).await?)?;
            }
        }
        Command::SeedRow { .. } => {}
        Command::ImportSeed { file, group } => {
            let csv = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read seed file {}", file.display()))?;
            println!("{}", client.import_seed_file(&csv, &group).await?);
        }
    }

    Ok(())
}
