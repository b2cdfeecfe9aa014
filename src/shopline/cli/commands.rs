use super::help_json::help_for;
use super::render::{render, render_profiles};
use clap::Command;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use shopline::api::{endpoint, ApiClient, HttpClient};
use shopline::command_tree::build_command_tree;
use shopline::config::{Settings, ShoplineConfig, CONFIG_KEYS, ENV_LOG};
use shopline::error::{Result, ShoplineError};
use shopline::hooks::{run_pre_run, PreRun};
use shopline::invocation::{Invocation, OutputFormat};
use shopline::profiles::{select_credentials, Selection};
use shopline::schema::{find_resource, plan_request, ApiRequest, Target, RESOURCES};
use shopline::store::fs::FileCredentialStore;
use shopline::store::{CredentialStore, Credentials};
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let mut root = build_command_tree();
    let matches = match root.try_get_matches_from_mut(std::env::args_os()) {
        Ok(matches) => matches,
        Err(e) => e.exit(),
    };
    let mut inv = Invocation::from_matches(&root, &matches)?;

    init_logging(inv.globals.verbose);
    apply_color(&inv.globals.color);
    debug!(command = %inv.command_name(), "parsed");

    let settings = Settings::from_env()?;
    let default_output = settings.output.clone().unwrap_or_else(|| "text".into());
    let mut input = io::stdin().lock();
    run_pre_run(&mut PreRun {
        inv: &mut inv,
        input: &mut input,
        default_output: &default_output,
    })?;

    match inv.path.first().map(String::as_str) {
        Some("auth") => handle_auth(&inv, &settings),
        Some("config") => handle_config(&inv, &settings),
        Some("schema") => handle_schema(&inv),
        Some("help-json") => handle_help_json(&root, &inv),
        _ => handle_resource(&inv, &settings, &mut input),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn apply_color(mode: &str) {
    match mode {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(settings: &Settings) -> Result<FileCredentialStore> {
    FileCredentialStore::open(&settings.config_dir)
}

fn handle_auth(inv: &Invocation, settings: &Settings) -> Result<()> {
    match inv.path.get(1).map(String::as_str) {
        Some("login") => {
            let required = |name: &str| -> Result<String> {
                inv.string(name)?
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ShoplineError::Usage(format!("--{} cannot be empty", name)))
            };
            let mut creds = Credentials::new(required("name")?, required("handle")?, required("token")?);
            creds.region = inv.string("region")?.filter(|r| !r.trim().is_empty());

            let mut store = open_store(settings)?;
            store.save(&creds)?;
            println!(
                "{}",
                format!("Saved profile \"{}\" ({})", creds.name, creds.handle).green()
            );
            Ok(())
        }
        Some("list") => {
            let store = open_store(settings)?;
            let mut profiles = Vec::new();
            for name in store.list()? {
                match store.get(&name) {
                    Ok(creds) => profiles.push(creds),
                    Err(e) => eprintln!("{}", format!("Skipping profile {}: {}", name, e).yellow()),
                }
            }
            if inv.output.format == OutputFormat::Json {
                let listed: Vec<_> = profiles
                    .iter()
                    .map(|p| {
                        json!({
                            "name": p.name,
                            "handle": p.handle,
                            "region": p.region,
                            "created_at": p.created_at,
                        })
                    })
                    .collect();
                return print_json(&listed);
            }
            println!("{}", render_profiles(&profiles));
            Ok(())
        }
        Some("logout") => {
            let name = inv.string("profile")?.unwrap_or_default();
            let mut store = open_store(settings)?;
            store.delete(&name)?;
            println!("{}", format!("Removed profile \"{}\"", name).green());
            Ok(())
        }
        _ => Err(ShoplineError::Usage(format!(
            "unknown command: {}",
            inv.command_name()
        ))),
    }
}

fn handle_config(inv: &Invocation, settings: &Settings) -> Result<()> {
    let mut config = ShoplineConfig::load(&settings.config_dir)?;
    let key = inv.string("key")?;
    let value = inv.string("value")?;

    match (key, value) {
        (None, _) => {
            if inv.output.format == OutputFormat::Json {
                return print_json(&config);
            }
            for key in CONFIG_KEYS {
                let shown = config
                    .get(key)?
                    .unwrap_or_else(|| "(unset)".dimmed().to_string());
                println!("{} = {}", key.bold(), shown);
            }
            Ok(())
        }
        (Some(key), None) => {
            println!("{}", config.get(&key)?.unwrap_or_default());
            Ok(())
        }
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(&settings.config_dir)?;
            match config.get(&key)? {
                Some(v) => println!("{}", format!("{} = {}", key, v).green()),
                None => println!("{}", format!("{} cleared", key).green()),
            }
            Ok(())
        }
    }
}

fn handle_schema(inv: &Invocation) -> Result<()> {
    match inv.string("resource")? {
        Some(name) => {
            let resource = find_resource(&name)
                .ok_or_else(|| ShoplineError::Usage(format!("unknown resource '{}'", name)))?;
            print_json(resource)
        }
        None if inv.output.format == OutputFormat::Json => print_json(&RESOURCES),
        None => {
            let width = RESOURCES.iter().map(|r| r.name.len()).max().unwrap_or(0);
            for resource in RESOURCES {
                println!("{:<width$}  {}", resource.name, resource.about, width = width);
            }
            Ok(())
        }
    }
}

fn handle_help_json(root: &Command, inv: &Invocation) -> Result<()> {
    let path = inv.strings("command")?;
    print_json(&help_for(root, &path)?)
}

#[derive(Serialize)]
struct DryRun<'a> {
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a str>,
    base_url: String,
    #[serde(flatten)]
    request: &'a ApiRequest,
}

/// Asks on stderr; anything but `y`/`yes` declines.
fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn handle_resource(inv: &Invocation, settings: &Settings, input: &mut impl BufRead) -> Result<()> {
    let target = Target::from_path(&inv.path).ok_or_else(|| {
        ShoplineError::Usage(format!("unknown command: {}", inv.command_name()))
    })?;

    let selection = select_credentials(inv.globals.store.as_deref(), settings, || {
        Ok(Box::new(open_store(settings)?) as Box<dyn CredentialStore>)
    })?;
    let profile = match &selection {
        Selection::Profile(resolved) => {
            if let Some(note) = resolved.note() {
                eprintln!("{}", note.dimmed());
            }
            Some(resolved.credentials.name.as_str())
        }
        Selection::DirectToken(_) => None,
    };

    let request = plan_request(&target, inv, &mut *input)?;

    if inv.globals.dry_run {
        let (base_url, _) = endpoint(&selection, settings.api_base_url.as_deref());
        return print_json(&DryRun {
            dry_run: true,
            profile,
            base_url,
            request: &request,
        });
    }

    if target.verb.is_destructive() && !inv.globals.yes {
        let subject = format!(
            "{} {} {}",
            target.verb.name(),
            target.resource.prefix(),
            inv.args().last().cloned().unwrap_or_default()
        );
        if inv.globals.no_input || !io::stdin().is_terminal() {
            return Err(ShoplineError::Usage(format!(
                "refusing to {} without confirmation (pass --yes)",
                subject
            )));
        }
        if !confirm(&format!("Really {}?", subject), input)? {
            eprintln!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let client = HttpClient::for_selection(&selection, settings.api_base_url.as_deref())?;
    let response = client.send(&request)?;
    println!("{}", render(&response, &inv.output, &target.resource.prefix())?);
    Ok(())
}
