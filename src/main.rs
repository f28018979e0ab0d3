//! dash-pilot command line interface.

mod service;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dash_pilot_core::{
    load_config, AppError, Automation, Config, PanelClient, Result, Session,
};

#[derive(Parser)]
#[command(name = "dash-pilot", version, about = "Automation for the InfinityFree hosting dashboard")]
struct Cli {
    /// Path to a TOML configuration file (default: ./dash-pilot.toml,
    /// ~/.dash-pilot/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify that the configured authentication works.
    Verify,
    /// List hosting accounts.
    Accounts,
    /// List domains under an account.
    Domains {
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// DNS record operations.
    #[command(subcommand)]
    Dns(DnsCommand),
    /// List available free-subdomain extensions (cached per process).
    Extensions {
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Register a free subdomain (e.g. `register myapp rf.gd`).
    Register {
        subdomain: String,
        extension: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Register a custom subdomain under an already-owned parent domain.
    RegisterSub {
        parent_domain: String,
        subdomain: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Delete a domain from an account.
    DeleteDomain {
        domain: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Manage the local chromedriver service.
    #[command(subcommand)]
    Driver(DriverCommand),
}

#[derive(Subcommand)]
enum DnsCommand {
    /// List a domain's DNS records.
    List {
        domain: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Create a CNAME record.
    CreateCname {
        domain: String,
        host: String,
        target: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Create an MX record.
    CreateMx {
        domain: String,
        priority: u16,
        target: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Create a TXT record.
    CreateTxt {
        domain: String,
        host: String,
        content: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
    /// Delete a DNS record via its scraped delete handle.
    Delete {
        handle: String,
        #[arg(long, env = "DASH_PILOT_ACCOUNT")]
        account: Option<String>,
    },
}

#[derive(Subcommand)]
enum DriverCommand {
    Start,
    Stop,
    Restart,
    Status,
    Logs {
        #[arg(default_value_t = 50)]
        lines: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn resolve_account(config: &Config, account: Option<String>) -> Result<String> {
    account
        .or_else(|| config.default_account.clone())
        .ok_or_else(|| {
            AppError::Config(
                "no account id given; pass --account or configure default_account".to_string(),
            )
        })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Arc::new(load_config(cli.config.as_deref())?);

    if let Command::Driver(cmd) = &cli.command {
        return match cmd {
            DriverCommand::Start => service::chromedriver::start(&config).await,
            DriverCommand::Stop => service::chromedriver::stop(&config).await,
            DriverCommand::Restart => service::chromedriver::restart(&config).await,
            DriverCommand::Status => {
                let responsive = service::chromedriver::status(&config).await?;
                println!(
                    "chromedriver: {}",
                    if responsive { "running" } else { "not running" }
                );
                Ok(())
            }
            DriverCommand::Logs { lines } => {
                println!("{}", service::chromedriver::logs(*lines)?);
                Ok(())
            }
        };
    }

    let session = Arc::new(Session::new(&config)?);
    let panel = PanelClient::new(config.clone(), session.clone())?;

    match cli.command {
        Command::Verify => {
            let status = panel.verify().await?;
            println!("{}", status.detail);
        }
        Command::Accounts => {
            let accounts = panel.list_accounts().await?;
            print_json(&accounts)?;
        }
        Command::Domains { account } => {
            let account = resolve_account(&config, account)?;
            let domains = panel.list_domains(&account).await?;
            print_json(&domains)?;
        }
        Command::Dns(cmd) => run_dns(&config, &panel, cmd).await?,
        Command::Extensions { account } => {
            let account = resolve_account(&config, account)?;
            let automation = Automation::new(config.clone(), session.clone())?;
            let extensions = automation.list_available_extensions(&account).await?;
            print_json(&extensions)?;
        }
        Command::Register {
            subdomain,
            extension,
            account,
        } => {
            let account = resolve_account(&config, account)?;
            let automation = Automation::new(config.clone(), session.clone())?;
            let outcome = automation
                .register_free_domain(&account, &subdomain, &extension)
                .await?;
            println!("{}", outcome.message);
        }
        Command::RegisterSub {
            parent_domain,
            subdomain,
            account,
        } => {
            let account = resolve_account(&config, account)?;
            let automation = Automation::new(config.clone(), session.clone())?;
            let outcome = automation
                .register_custom_subdomain(&account, &parent_domain, &subdomain)
                .await?;
            println!("{}", outcome.message);
        }
        Command::DeleteDomain { domain, account } => {
            let account = resolve_account(&config, account)?;
            let automation = Automation::new(config.clone(), session.clone())?;
            let outcome = automation.delete_domain(&account, &domain).await?;
            println!("{}", outcome.message);
        }
        Command::Driver(_) => unreachable!("handled above"),
    }

    Ok(())
}

async fn run_dns(config: &Config, panel: &PanelClient, cmd: DnsCommand) -> Result<()> {
    match cmd {
        DnsCommand::List { domain, account } => {
            let account = resolve_account(config, account)?;
            let records = panel.list_dns_records(&account, &domain).await?;
            print_json(&records)?;
        }
        DnsCommand::CreateCname {
            domain,
            host,
            target,
            account,
        } => {
            let account = resolve_account(config, account)?;
            let outcome = panel
                .create_cname(&account, &domain, &host, &target)
                .await?;
            println!("{}", outcome.message);
        }
        DnsCommand::CreateMx {
            domain,
            priority,
            target,
            account,
        } => {
            let account = resolve_account(config, account)?;
            let outcome = panel
                .create_mx(&account, &domain, priority, &target)
                .await?;
            println!("{}", outcome.message);
        }
        DnsCommand::CreateTxt {
            domain,
            host,
            content,
            account,
        } => {
            let account = resolve_account(config, account)?;
            let outcome = panel
                .create_txt(&account, &domain, &host, &content)
                .await?;
            println!("{}", outcome.message);
        }
        DnsCommand::Delete { handle, account } => {
            let account = resolve_account(config, account)?;
            let outcome = panel
                .delete_dns_record(&account, &dash_pilot_core::DeleteHandle(handle))
                .await?;
            println!("{}", outcome.message);
        }
    }
    Ok(())
}
