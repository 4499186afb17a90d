//! panctl - Policy object console
//!
//! A GUI and command line client for checking and creating firewall policy
//! objects through a Panorama-style policy backend.
//!
//! # Features
//!
//! - Address and service object lookup with create-on-miss
//! - Address and service group search and creation with member browsers
//! - Security rule form with reference checks and a preview before submit
//! - Device-group hierarchy tree per managed firewall
//! - Audit logging of every create request
//!
//! # Architecture
//!
//! - `api`: REST client for the policy backend
//! - `app`: GUI application state and event handling
//! - `core`: Object types, hierarchy tree and rule resolution
//! - `validators`: Input validation for addresses, ports and names
//! - `audit`: Create request audit trail
//!
//! # Usage
//!
//! ```bash
//! # Run the GUI application
//! panctl
//!
//! # CLI commands
//! panctl validate address 10.0.0.0/24
//! panctl check-address 10.1.1.5
//! panctl check-service --protocol tcp --port 8443
//! panctl create-address web-01 10.1.1.5 --description "web frontend"
//! panctl list service-groups
//! panctl hierarchy --firewall fw-01
//! panctl --backend http://pano-api:8000 list applications
//! ```

mod api;
mod app;
mod audit;
mod config;
mod core;
mod theme;
mod utils;
mod validators;

use clap::{Parser, Subcommand, ValueEnum};
use iced::Size;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::api::{BackendClient, SERVICE_OBJECT_TYPE, ServiceQuery};
use crate::app::forms::{AddressObjectForm, FormErrors, ServiceObjectForm};
use crate::audit::EventType;
use crate::config::AppConfig;
use crate::core::error::{Error, Result};
use crate::core::hierarchy::{self, HierarchyAction, HierarchyView};
use crate::core::objects::{AddressType, ProfileCategory, ServiceProtocol};
use crate::validators::Validation;

#[derive(Parser)]
#[command(name = "panctl")]
#[command(about = "Policy object console for a Panorama-style backend", long_about = None)]
struct Cli {
    /// Backend origin, overrides PANCTL_BACKEND_URL and config.json
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a value locally without contacting the backend
    Validate {
        #[arg(value_enum)]
        kind: ValidateKind,
        value: String,
    },
    /// Look up address objects matching an IP, CIDR or range
    CheckAddress { value: String },
    /// Look up a service object by name or by protocol and port
    CheckService {
        #[arg(long, conflicts_with_all = ["protocol", "port"])]
        name: Option<String>,
        #[arg(long, default_value = "tcp")]
        protocol: ServiceProtocol,
        #[arg(long)]
        port: Option<String>,
    },
    /// Create an address object
    CreateAddress {
        name: String,
        value: String,
        /// ip-netmask, ip-range or fqdn (detected from the value if omitted)
        #[arg(long = "type")]
        address_type: Option<AddressType>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Create a service object
    CreateService {
        name: String,
        #[arg(long, default_value = "tcp")]
        protocol: ServiceProtocol,
        #[arg(long)]
        port: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma separated tags
        #[arg(long, default_value = "")]
        tags: String,
        /// Device group (defaults to the configured one)
        #[arg(long)]
        device_group: Option<String>,
    },
    /// List what the backend knows about
    List {
        #[arg(value_enum)]
        what: ListKind,
    },
    /// Print the device-group chain of managed firewalls
    Hierarchy {
        /// Only this firewall
        #[arg(long)]
        firewall: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ValidateKind {
    Address,
    Port,
    Name,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListKind {
    AddressObjects,
    ServiceObjects,
    AddressGroups,
    ServiceGroups,
    Applications,
    Profiles,
}

fn main() -> ExitCode {
    let _ = crate::utils::ensure_dirs();
    let cli = Cli::parse();

    let config = match config::load_config_blocking()
        .with_overrides(cli.backend)
        .validated()
    {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(command) = cli.command {
        init_cli_logging();
        // Create Tokio runtime only for CLI commands
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
        match runtime.block_on(handle_cli(command, config)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                print_error(&e);
                ExitCode::FAILURE
            }
        }
    } else {
        // GUI runs in normal sync context (Iced has its own async runtime)
        launch_gui(config)
    }
}

fn init_cli_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_error(error: &Error) {
    let translation = error.translate();
    eprintln!("Error: {}", translation.user_message);
    for suggestion in &translation.suggestions {
        eprintln!("  hint: {suggestion}");
    }
}

/// First failing field of a create form, as a validation error
fn form_error(errors: FormErrors) -> Error {
    [
        ("name", errors.name),
        ("value", errors.value),
        ("port", errors.port),
        ("description", errors.description),
        ("members", errors.members),
    ]
    .into_iter()
    .find_map(|(field, message)| message.map(|m| Error::validation(field, m)))
    .unwrap_or_else(|| Error::validation("form", "Invalid input"))
}

async fn handle_cli(command: Commands, config: AppConfig) -> Result<()> {
    let client = BackendClient::from_config(&config);

    match command {
        Commands::Validate { kind, value } => {
            let (field, result) = match kind {
                ValidateKind::Address => ("address", validators::validate_address(value.trim())),
                ValidateKind::Port => ("port", validators::validate_port(value.trim())),
                ValidateKind::Name => ("name", validators::validate_name(&value)),
            };
            match result {
                Validation::Valid => println!("✓ {value} is a valid {field}"),
                Validation::Invalid(reason) => return Err(Error::validation(field, reason)),
            }
            if let ValidateKind::Address = kind
                && let Ok(spec) = validators::parse_address(value.trim())
                && let Some(note) = validators::check_reserved_ip(&spec)
            {
                println!("  note: {note}");
            }
        }
        Commands::CheckAddress { value } => {
            let value = value.trim();
            if let Validation::Invalid(reason) = validators::validate_address(value)
                && validators::detect_address_type(value) != AddressType::Fqdn
            {
                return Err(Error::validation("address", reason));
            }
            let matches = client.check_object(value).await?;
            if matches.is_empty() {
                return Err(Error::not_found("address object", value));
            }
            println!("Address objects matching {value}:");
            for object in matches {
                println!(
                    "  {}  {}",
                    object.object_name,
                    object.value().unwrap_or_default()
                );
            }
        }
        Commands::CheckService {
            name,
            protocol,
            port,
        } => {
            let query = match (name, port) {
                (Some(name), _) => ServiceQuery::by_name(name.trim()),
                (None, Some(port)) => {
                    if let Validation::Invalid(reason) = validators::validate_port(port.trim()) {
                        return Err(Error::validation("port", reason));
                    }
                    ServiceQuery::by_port(protocol.to_string(), port.trim())
                }
                (None, None) => {
                    return Err(Error::validation("service", "Pass --name or --port"));
                }
            };
            match client.check_service(&query).await? {
                None => return Err(Error::not_found("service object", query.to_string())),
                Some(matches) if matches.is_empty() => {
                    println!("✓ A matching service object exists");
                }
                Some(matches) => {
                    println!("Service objects matching {query}:");
                    for object in matches {
                        println!(
                            "  {}  {}/{}",
                            object.object_name,
                            object.protocol().unwrap_or_else(|| "any".into()),
                            object.port().unwrap_or_else(|| "any".into())
                        );
                    }
                }
            }
        }
        Commands::CreateAddress {
            name,
            value,
            address_type,
            description,
        } => {
            let mut form = AddressObjectForm::default();
            form.open_create(&value, None);
            if let Some(draft) = form.create.as_mut() {
                draft.name = name;
                draft.description = description;
                if let Some(address_type) = address_type {
                    draft.address_type = address_type;
                }
            }
            if let Some(errors) = form.validate() {
                return Err(form_error(errors));
            }
            let Some(request) = form.to_request() else {
                return Ok(());
            };

            let outcome = client.create_object(&request).await;
            audit::log_create(
                config.enable_audit_log,
                EventType::CreateAddressObject,
                client.base_url(),
                serde_json::json!({
                    "name": request.object_name,
                    "value": request.value,
                    "type": request.address_type,
                }),
                &outcome,
            )
            .await;
            println!("✓ Address object \"{}\" created", outcome?);
        }
        Commands::CreateService {
            name,
            protocol,
            port,
            description,
            tags,
            device_group,
        } => {
            let mut form = ServiceObjectForm::default();
            form.open_create(protocol, &port, None);
            if let Some(draft) = form.create.as_mut() {
                draft.name = name;
                draft.description = description;
                draft.tags = tags;
            }
            if let Some(errors) = form.validate() {
                return Err(form_error(errors));
            }
            let device_group = device_group.unwrap_or_else(|| config.default_device_group.clone());
            let Some(request) = form.to_request(&device_group) else {
                return Ok(());
            };

            match client
                .check_object_name(&request.object_name, SERVICE_OBJECT_TYPE)
                .await
            {
                Ok(true) => return Err(Error::conflict("Service object", &request.object_name)),
                Ok(false) => {}
                Err(e) => tracing::warn!("Name check failed, continuing: {e}"),
            }

            let outcome = client.create_service(&request).await;
            audit::log_create(
                config.enable_audit_log,
                EventType::CreateServiceObject,
                client.base_url(),
                serde_json::json!({
                    "name": request.object_name,
                    "protocol": request.protocol,
                    "port": request.port,
                }),
                &outcome,
            )
            .await;
            println!("✓ Service object \"{}\" created", outcome?);
        }
        Commands::List { what } => list(&client, what).await?,
        Commands::Hierarchy { firewall } => {
            let firewalls = client.firewall_hierarchy().await?;
            let selected: Vec<_> = match firewall.as_deref() {
                Some(hostname) => hierarchy::find_firewall(&firewalls, hostname)
                    .into_iter()
                    .collect(),
                None => firewalls.iter().collect(),
            };
            if selected.is_empty() {
                return Err(Error::not_found(
                    "firewall",
                    firewall.unwrap_or_else(|| "(any)".into()),
                ));
            }

            for fw in selected {
                println!("{}", fw.hostname);
                let Some(tree) = hierarchy::build_tree(&fw.path) else {
                    println!("  (no device-group path)");
                    continue;
                };
                let view =
                    HierarchyView::default().apply(HierarchyAction::ExpandChain(fw.path.clone()));
                for row in hierarchy::rows(&tree, &view) {
                    println!("  {}{} {}", "  ".repeat(row.depth), row.glyph(), row.name);
                }
            }
        }
    }
    Ok(())
}

async fn list(client: &BackendClient, what: ListKind) -> Result<()> {
    match what {
        ListKind::AddressObjects => {
            for object in client.list_address_objects().await? {
                println!("{}  {}  {}", object.name, object.address_type, object.value);
            }
        }
        ListKind::ServiceObjects => {
            for object in client.list_service_objects().await? {
                println!("{}", object.display());
            }
        }
        ListKind::AddressGroups => {
            for group in client.list_address_groups().await? {
                println!(
                    "{} ({})  {}",
                    group.name,
                    group.group_type,
                    group.members.join(", ")
                );
            }
        }
        ListKind::ServiceGroups => {
            for group in client.list_service_groups().await? {
                println!("{}  {}", group.name, group.members.join(", "));
            }
        }
        ListKind::Applications => {
            let apps = match client.list_applications().await {
                Ok(apps) => apps,
                Err(e) => {
                    tracing::warn!("Falling back to built-in applications: {e}");
                    api::fallback_applications()
                }
            };
            for app in apps {
                println!("{app}");
            }
        }
        ListKind::Profiles => {
            use strum::IntoEnumIterator;

            let catalog = client.list_security_profiles().await?;
            for category in ProfileCategory::iter() {
                let names = catalog.names(category);
                if names.is_empty() {
                    continue;
                }
                println!("{}:", category.label());
                for name in names {
                    println!("  {name}");
                }
            }
        }
    }
    Ok(())
}

fn launch_gui(config: AppConfig) -> ExitCode {
    // Set up logging to file
    let file = crate::utils::log_file_path().and_then(|path| std::fs::File::create(path).ok());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(file)
            .init(),
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let result = iced::application(
        move || app::State::with_config(config.clone()),
        app::State::update,
        app::State::view,
    )
    .subscription(app::State::subscription)
    .window(iced::window::Settings {
        size: Size::new(1100.0, 760.0),
        ..Default::default()
    })
    .title("panctl")
    .theme(|state: &app::State| state.theme.iced_theme())
    .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
