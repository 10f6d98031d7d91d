//! CLI argument parsing module
//!
//! This module handles command-line argument parsing and application entry point.

use crate::codec::InterchangeFormat;
use crate::config::{Config, OutputConfig, JAR_ENV};
use crate::error::{CookieKitError, Result};
use crate::exit_code::exit_code_for_error;
use crate::jar::SqliteJar;
use crate::output::{render_groups, stats_line, OutputWriter};
use crate::query::{unix_now, CookieFilter};
use crate::reconcile::CookieManager;
use crate::record::{CookieDraft, CookieRecord, SameSite};
use crate::surface::{
    delete_cookie_prompt, delete_domain_prompt, read_uploaded_text, AssumeYes, Confirm,
    TerminalConfirm, DELETE_ALL_PROMPT,
};
use crate::utils::{FileUtils, StringUtils};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

/// Main entry point for the CLI application
pub fn run() {
    let matches = create_app().get_matches();
    crate::logging::init(matches.get_flag("verbose"));

    if let Err(e) = run_with_args(&matches) {
        eprintln!("cookiekit: error: {}", e);
        std::process::exit(exit_code_for_error(&e));
    }
}

/// Run cookiekit with parsed command line arguments
fn run_with_args(matches: &ArgMatches) -> Result<()> {
    let config = build_config_from_args(matches)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CookieKitError::Config(format!("Failed to create async runtime: {}", e)))?;

    rt.block_on(async {
        let jar = SqliteJar::open(&config.jar_path)?;
        let output = OutputWriter::new(config.output.clone());
        let confirm: Box<dyn Confirm> = if config.assume_yes {
            Box::new(AssumeYes)
        } else {
            Box::new(TerminalConfirm)
        };
        output.write_verbose(&format!("Using cookie jar {:?}", config.jar_path))?;

        match matches.subcommand() {
            Some(("list", sub)) => list(jar, sub, &output).await,
            Some(("export", sub)) => export(jar, sub, &output).await,
            Some(("import", sub)) => import(jar, sub, &output).await,
            Some(("edit", sub)) => edit(jar, sub, &output).await,
            Some(("delete", sub)) => delete(jar, sub, confirm.as_ref(), &output).await,
            Some(("delete-domain", sub)) => {
                delete_domain(jar, sub, confirm.as_ref(), &output).await
            }
            Some(("clear", _)) => clear(jar, confirm.as_ref(), &output).await,
            _ => Err(CookieKitError::Config("No command given".to_string())),
        }
    })
}

/// Create the CLI application structure
fn create_app() -> Command {
    Command::new("cookiekit")
        .version(crate::VERSION)
        .about("Inspect, edit, import and export browser cookies")
        .subcommand_required(true)
        .arg(Arg::new("jar")
            .long("jar")
            .value_name("FILE")
            .env(JAR_ENV)
            .global(true)
            .help("Cookie jar database"))
        .arg(Arg::new("yes")
            .short('y')
            .long("yes")
            .global(true)
            .help("Do not ask before deleting")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .global(true)
            .help("Verbose output")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("silent")
            .short('s')
            .long("silent")
            .global(true)
            .help("Silent mode")
            .action(ArgAction::SetTrue))
        .subcommand(Command::new("list")
            .about("List cookies grouped by domain")
            .arg(domain_arg())
            .args(filter_args()))
        .subcommand(Command::new("export")
            .about("Export cookies as JSON or Netscape text")
            .arg(Arg::new("format")
                .short('f')
                .long("format")
                .value_name("json|netscape")
                .default_value("json")
                .help("Interchange format"))
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write export to file"))
            .arg(domain_arg())
            .args(filter_args()))
        .subcommand(Command::new("import")
            .about("Import cookies from a JSON or Netscape file")
            .arg(Arg::new("file")
                .required(true)
                .value_name("FILE")
                .help("File to import"))
            .arg(Arg::new("format")
                .short('f')
                .long("format")
                .value_name("json|netscape")
                .help("Interchange format (default: from file name)")))
        .subcommand(Command::new("edit")
            .about("Change a cookie's value, SameSite or expiration")
            .args(address_args())
            .arg(Arg::new("value")
                .long("value")
                .value_name("VALUE")
                .allow_hyphen_values(true)
                .help("New value"))
            .arg(Arg::new("same-site")
                .long("same-site")
                .value_name("unspecified|lax|strict|no_restriction")
                .help("New SameSite policy"))
            .arg(Arg::new("expires")
                .long("expires")
                .value_name("SECONDS|+N[smhd]")
                .allow_hyphen_values(true)
                .conflicts_with("session")
                .help("New expiration"))
            .arg(Arg::new("session")
                .long("session")
                .help("Make the cookie session-scoped")
                .action(ArgAction::SetTrue)))
        .subcommand(Command::new("delete")
            .about("Delete one cookie")
            .args(address_args()))
        .subcommand(Command::new("delete-domain")
            .about("Delete every cookie stored for a domain")
            .arg(Arg::new("domain")
                .required(true)
                .value_name("DOMAIN")
                .help("Exact domain, including any leading dot")))
        .subcommand(Command::new("clear")
            .about("Delete all cookies"))
}

fn domain_arg() -> Arg {
    Arg::new("domain")
        .short('d')
        .long("domain")
        .value_name("DOMAIN")
        .help("Only cookies stored for this exact domain")
}

fn filter_args() -> Vec<Arg> {
    vec![
        Arg::new("filter")
            .long("filter")
            .value_name("TEXT")
            .help("Match name, domain or value (case-insensitive)"),
        Arg::new("secure")
            .long("secure")
            .help("Only secure cookies")
            .action(ArgAction::SetTrue),
        Arg::new("http-only")
            .long("http-only")
            .help("Only HttpOnly cookies")
            .action(ArgAction::SetTrue),
        Arg::new("session-only")
            .long("session-only")
            .help("Only session cookies")
            .action(ArgAction::SetTrue),
        Arg::new("expired")
            .long("expired")
            .help("Only expired cookies")
            .action(ArgAction::SetTrue),
    ]
}

fn address_args() -> Vec<Arg> {
    vec![
        Arg::new("name")
            .long("name")
            .required(true)
            .value_name("NAME")
            .help("Cookie name"),
        Arg::new("domain")
            .short('d')
            .long("domain")
            .required(true)
            .value_name("DOMAIN")
            .help("Cookie domain, including any leading dot"),
        Arg::new("path")
            .long("path")
            .value_name("PATH")
            .default_value("/")
            .help("Cookie path"),
        Arg::new("partition-key")
            .long("partition-key")
            .value_name("JSON")
            .help("Partition key as JSON, when the address exists in several partitions"),
    ]
}

/// Build configuration from command line arguments
fn build_config_from_args(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::default();

    if let Some(jar) = matches.get_one::<String>("jar") {
        config.jar_path = FileUtils::expand_path(jar)?;
    }
    config.assume_yes = matches.get_flag("yes");

    config.output = OutputConfig {
        file: None,
        verbose: matches.get_flag("verbose"),
        silent: matches.get_flag("silent"),
    };
    if let Some(("export", sub)) = matches.subcommand() {
        if let Some(output_file) = sub.get_one::<String>("output") {
            config.output.file = Some(FileUtils::expand_path(output_file)?);
        }
    }

    Ok(config)
}

fn filter_from_args(matches: &ArgMatches) -> CookieFilter {
    CookieFilter {
        text: matches.get_one::<String>("filter").cloned(),
        secure_only: matches.get_flag("secure"),
        http_only: matches.get_flag("http-only"),
        session_only: matches.get_flag("session-only"),
        expired_only: matches.get_flag("expired"),
    }
}

fn format_from_arg(value: Option<&String>) -> Result<Option<InterchangeFormat>> {
    value.map(|format| format.parse()).transpose()
}

async fn load(jar: SqliteJar, matches: &ArgMatches) -> Result<CookieManager<SqliteJar>> {
    let mut manager = match matches.get_one::<String>("domain") {
        Some(domain) => CookieManager::for_domain(jar, domain.clone()),
        None => CookieManager::new(jar),
    };
    manager.reload().await?;
    Ok(manager)
}

/// Look up the record addressed by `--name`, `--domain`, `--path` and
/// `--partition-key`.
fn find_addressed(manager: &CookieManager<SqliteJar>, matches: &ArgMatches) -> Result<CookieRecord> {
    let name = required(matches, "name")?;
    let domain = required(matches, "domain")?;
    let path = required(matches, "path")?;
    let not_found = || CookieKitError::CookieNotFound(format!("{} on {}{}", name, domain, path));
    let session = manager.session();

    if let Some(raw) = matches.get_one::<String>("partition-key") {
        let partition_key: Value = serde_json::from_str(raw).map_err(|e| {
            CookieKitError::Config(format!("Invalid partition key '{}': {}", raw, e))
        })?;
        return session
            .find(name, domain, path, Some(&partition_key))
            .cloned()
            .ok_or_else(not_found);
    }

    match session.find_all(name, domain, path).as_slice() {
        [] => Err(not_found()),
        [record] => Ok((*record).clone()),
        candidates => Err(CookieKitError::Config(format!(
            "Cookie {} on {}{} exists in {} partitions; choose one with --partition-key",
            name,
            domain,
            path,
            candidates.len()
        ))),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| CookieKitError::Config(format!("Missing --{}", id)))
}

async fn list(jar: SqliteJar, matches: &ArgMatches, output: &OutputWriter) -> Result<()> {
    let manager = load(jar, matches).await?;
    let filter = filter_from_args(matches);
    let now = unix_now();
    let session = manager.session();

    output.write(&render_groups(&session.groups(&filter, now), now))?;
    output.notify(&stats_line(&session.stats(&filter, now)))
}

async fn export(jar: SqliteJar, matches: &ArgMatches, output: &OutputWriter) -> Result<()> {
    let format = format_from_arg(matches.get_one::<String>("format"))?
        .unwrap_or(InterchangeFormat::Json);
    let manager = load(jar, matches).await?;
    let payload = manager.export_text(&filter_from_args(matches), format, unix_now())?;

    output.offer_download(&payload)?;
    output.notify(&payload.to_string())
}

async fn import(jar: SqliteJar, matches: &ArgMatches, output: &OutputWriter) -> Result<()> {
    let path = FileUtils::expand_path(required(matches, "file")?)?;
    let format = format_from_arg(matches.get_one::<String>("format"))?
        .unwrap_or_else(|| InterchangeFormat::from_path(&path));
    output.write_verbose(&format!("Importing {:?} as {}", path, format))?;

    let text = read_uploaded_text(&path)?;
    let mut manager = CookieManager::new(jar);
    let report = manager.import_text(&text, format).await?;

    output.notify(&report.to_string())
}

async fn edit(jar: SqliteJar, matches: &ArgMatches, output: &OutputWriter) -> Result<()> {
    let mut manager = CookieManager::new(jar);
    manager.reload().await?;
    let original = find_addressed(&manager, matches)?;

    let mut draft = CookieDraft::from_record(&original);
    if let Some(value) = matches.get_one::<String>("value") {
        draft.value = value.clone();
    }
    if let Some(same_site) = matches.get_one::<String>("same-site") {
        draft.same_site = same_site.parse::<SameSite>().map_err(|_| {
            CookieKitError::Config(format!("Unknown SameSite policy: {}", same_site))
        })?;
    }
    if matches.get_flag("session") {
        draft.expiration_date = None;
    } else if let Some(expires) = matches.get_one::<String>("expires") {
        draft.expiration_date = Some(StringUtils::parse_expiration(expires, unix_now())?);
    }

    if draft.is_unchanged(&original) {
        return output.notify("Nothing to change");
    }

    manager.apply_edit(&original, &draft).await?;
    output.notify("Cookie updated successfully!")
}

async fn delete(
    jar: SqliteJar,
    matches: &ArgMatches,
    confirm: &dyn Confirm,
    output: &OutputWriter,
) -> Result<()> {
    let mut manager = CookieManager::new(jar);
    manager.reload().await?;
    let record = find_addressed(&manager, matches)?;

    if !confirm.confirm(&delete_cookie_prompt(&record)) {
        return output.notify("Cancelled");
    }
    manager.apply_delete(&record).await?;
    output.notify("Cookie deleted successfully!")
}

async fn delete_domain(
    jar: SqliteJar,
    matches: &ArgMatches,
    confirm: &dyn Confirm,
    output: &OutputWriter,
) -> Result<()> {
    let domain = required(matches, "domain")?;
    let mut manager = CookieManager::new(jar);
    manager.reload().await?;

    if !confirm.confirm(&delete_domain_prompt(domain)) {
        return output.notify("Cancelled");
    }
    let report = manager.delete_domain(domain).await?;
    output.notify(&format!("{} from {}", report, domain))
}

async fn clear(jar: SqliteJar, confirm: &dyn Confirm, output: &OutputWriter) -> Result<()> {
    let mut manager = CookieManager::new(jar);
    manager.reload().await?;

    if !confirm.confirm(DELETE_ALL_PROMPT) {
        return output.notify("Cancelled");
    }
    let report = manager.delete_all().await?;
    output.notify(&report.to_string())
}

#[cfg(test)]
mod tests {
    use super::{create_app, filter_from_args};

    #[test]
    fn app_definition_is_consistent() {
        create_app().debug_assert();
    }

    #[test]
    fn filter_flags_map_to_predicates() {
        let matches = create_app()
            .try_get_matches_from([
                "cookiekit",
                "list",
                "--filter",
                "sid",
                "--secure",
                "--expired",
            ])
            .expect("parse");
        let (_, sub) = matches.subcommand().expect("subcommand");
        let filter = filter_from_args(sub);
        assert_eq!(filter.text.as_deref(), Some("sid"));
        assert!(filter.secure_only);
        assert!(filter.expired_only);
        assert!(!filter.http_only);
        assert!(!filter.session_only);
    }

    #[test]
    fn expires_conflicts_with_session() {
        let result = create_app().try_get_matches_from([
            "cookiekit",
            "edit",
            "--name",
            "sid",
            "--domain",
            "example.com",
            "--expires",
            "+1d",
            "--session",
        ]);
        assert!(result.is_err());
    }
}
