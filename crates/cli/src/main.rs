use anyhow::{bail, Context};
use chords_api_client::{ApiClient, HttpBackend};
use chords_core::config::{data_dir_from_env_value, simulated_latency_from_env_value};
use chords_core::constants::TOKEN_KEY;
use chords_core::screens::{
    visit_reason_options, LoginField, RecordTab, TabContent, NO_RESULTS_MESSAGE,
};
use chords_core::{
    resolve, AuditFilter, AuditLogStore, AuthMethod, AuthStore, CoreConfig, DoctorAccessBackend,
    DoctorWorkflow, EmergencyAccess, FileStore, KeyValueStore, PortalLogin, PortalLoginOutcome,
    RouteDecision, SimulatedBackend, ToggleOutcome, UserRole, VisitReason,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chords")]
#[command(about = "CHORDS doctor access CLI")]
struct Cli {
    /// Use a running CHORDS API instead of the built-in simulation
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the portal with a test account
    Login {
        username: String,
        password: String,
        /// Code from the second sign-in step
        #[arg(long)]
        mfa_code: String,
        #[arg(long, default_value = "patient")]
        role: UserRole,
    },
    /// Sign out of the portal
    Logout,
    /// Show the signed-in role
    Whoami,
    /// Show where a portal path leads for the signed-in user
    Route { path: String },
    /// List the reasons a doctor can give for accessing a record
    Reasons {
        #[arg(long)]
        json: bool,
    },
    /// Walk through the doctor access flow for one patient
    Doctor(DoctorArgs),
    /// Show or change the emergency access setting
    Emergency {
        #[command(subcommand)]
        action: EmergencyAction,
    },
    /// List who opened patient records, newest first
    Audit {
        /// Match doctor, patient, action or visit reason
        #[arg(long, default_value = "")]
        query: String,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum EmergencyAction {
    Status,
    /// Flip the setting. Switching it on needs `--code`
    Toggle {
        /// Verification code sent to your registered phone number
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Args)]
struct DoctorArgs {
    /// Health card number, digital health ID or part of a name
    query: String,
    #[arg(long, default_value = "dr.smith")]
    username: String,
    #[arg(long, default_value = "test1234")]
    password: String,
    #[arg(long, default_value = "MD123456")]
    license_number: String,
    #[arg(long, default_value = "Ontario")]
    province: String,
    /// Patient ID to open when the search matches more than one patient
    #[arg(long)]
    patient: Option<String>,
    #[arg(long, default_value = "consultation")]
    reason: VisitReason,
    #[arg(long, default_value = "biometric")]
    method: AuthMethod,
    /// One-time code to verify with `--method otp`
    #[arg(long)]
    otp: Option<String>,
    #[arg(long, default_value = "health_records")]
    tab: RecordTab,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chords_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = resolve_config(cli.api_base_url)?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::from_config(&cfg));

    match cli.command {
        Some(Commands::Login {
            username,
            password,
            mfa_code,
            role,
        }) => {
            let mut store = AuthStore::init(storage)?;
            let mut form = PortalLogin::new(role);
            form.username = username;
            form.password = password;
            if form.submit(&mut store)? == PortalLoginOutcome::MfaRequired {
                form.mfa_code = mfa_code;
                form.submit(&mut store)?;
            }
            println!("Signed in as {role}.");
        }
        Some(Commands::Logout) => {
            AuthStore::init(storage)?.logout()?;
            println!("Signed out.");
        }
        Some(Commands::Whoami) => match AuthStore::init(storage)?.role() {
            Some(role) => println!("{role}"),
            None => println!("Not signed in."),
        },
        Some(Commands::Route { path }) => {
            let store = AuthStore::init(storage)?;
            match resolve(&path, &store.state()) {
                RouteDecision::Render(route) => println!("render {route}"),
                RouteDecision::Redirect(route) => println!("redirect {route}"),
                RouteDecision::NotFound => println!("not found"),
            }
        }
        Some(Commands::Reasons { json }) => {
            let options = visit_reason_options();
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                for option in options {
                    println!(
                        "{:<16} {} - {}",
                        option.value.as_str(),
                        option.label,
                        option.description
                    );
                }
            }
        }
        Some(Commands::Doctor(args)) => {
            let cfg = match cfg.api_token() {
                Some(_) => cfg,
                None => {
                    let token = storage.get(TOKEN_KEY)?;
                    cfg.with_api_token(token)
                }
            };
            let audit = AuditLogStore::new(Arc::clone(&storage));
            run_doctor(&cfg, args, &audit).await?;
        }
        Some(Commands::Emergency { action }) => {
            require_sign_in(&storage)?;
            let mut access = EmergencyAccess::new(storage);
            let status = match action {
                EmergencyAction::Status => access.status()?,
                EmergencyAction::Toggle { code } => match access.toggle()? {
                    ToggleOutcome::Disabled(status) => status,
                    ToggleOutcome::ConfirmationRequired => match code {
                        Some(code) => access.confirm(&code)?,
                        None => {
                            access.cancel_confirmation();
                            bail!(
                                "enter the verification code sent to your registered phone \
                                 number with --code"
                            );
                        }
                    },
                },
            };
            println!("{}", status.message);
        }
        Some(Commands::Audit {
            query,
            from,
            to,
            json,
        }) => {
            require_sign_in(&storage)?;
            let filter = AuditFilter { q: query, from, to };
            let entries = AuditLogStore::new(storage).query(&filter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No access recorded.");
            } else {
                for entry in entries {
                    println!(
                        "{}  {:<12} patient {:<6} {:<18} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.doctor_id,
                        entry.patient_id,
                        entry.visit_reason.label(),
                        entry.accessed_data.join(", ")
                    );
                }
            }
        }
        None => {
            println!("No command given. Run `chords --help` for usage.");
        }
    }

    Ok(())
}

fn require_sign_in(storage: &Arc<dyn KeyValueStore>) -> anyhow::Result<()> {
    if !AuthStore::init(Arc::clone(storage))?.is_authenticated() {
        bail!("Not signed in. Run `chords login` first.");
    }
    Ok(())
}

fn resolve_config(api_base_url: Option<String>) -> anyhow::Result<CoreConfig> {
    let data_dir = data_dir_from_env_value(std::env::var("CHORDS_DATA_DIR").ok());
    let latency =
        simulated_latency_from_env_value(std::env::var("CHORDS_SIMULATED_LATENCY_MS").ok())?;
    let api_base_url = api_base_url.or_else(|| std::env::var("CHORDS_API_BASE_URL").ok());

    Ok(CoreConfig::new(data_dir, latency)?
        .with_api_base_url(api_base_url)
        .with_api_token(std::env::var("API_KEY").ok()))
}

async fn run_doctor(
    cfg: &CoreConfig,
    args: DoctorArgs,
    audit: &AuditLogStore,
) -> anyhow::Result<()> {
    let backend: Arc<dyn DoctorAccessBackend> = match cfg.api_base_url() {
        Some(url) => {
            tracing::info!(%url, "using HTTP backend");
            Arc::new(HttpBackend::new(ApiClient::from_config(cfg)?))
        }
        None => Arc::new(SimulatedBackend::from_config(cfg)),
    };
    let mut workflow = DoctorWorkflow::with_system_clock(backend);

    workflow.set_login_field(LoginField::Username, args.username);
    workflow.set_login_field(LoginField::Password, args.password);
    workflow.set_login_field(LoginField::LicenseNumber, args.license_number);
    workflow.set_login_field(LoginField::Province, args.province);
    workflow.submit_login().await.context("doctor sign-in failed")?;

    let results = workflow
        .search_patients(&args.query)
        .await
        .context("patient search failed")?;
    let patient_id = match (args.patient, results.as_slice()) {
        (Some(id), _) => id,
        (None, [only]) => only.id.clone(),
        (None, []) => bail!(workflow
            .search_state()
            .empty_message()
            .unwrap_or(NO_RESULTS_MESSAGE)),
        (None, many) => {
            let ids: Vec<String> = many
                .iter()
                .map(|p| format!("{} ({})", p.id, p.name))
                .collect();
            bail!(
                "several patients match, pick one with --patient: {}",
                ids.join(", ")
            );
        }
    };
    workflow.select_patient(&patient_id)?;
    workflow.select_reason(args.reason)?;
    workflow.confirm_reason()?;

    let authenticated = match args.method {
        AuthMethod::Biometric => workflow.authenticate_biometric().await,
        AuthMethod::Otp => {
            let code = args.otp.context("--otp is required with --method otp")?;
            workflow.send_otp().await?;
            workflow.set_otp(code);
            workflow.verify_otp().await
        }
    };
    authenticated.context("patient authentication failed")?;
    audit.append(workflow.access_log())?;
    workflow.select_tab(args.tab)?;

    if args.json {
        let output = serde_json::json!({
            "session": workflow.view(),
            "tab": args.tab,
            "records": workflow.record_view().records(),
            "accessLog": workflow.access_log(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let view = workflow.view();
    if let Some(patient) = &view.patient {
        println!(
            "{} | {} | born {} | {}",
            patient.name, patient.health_card_number, patient.date_of_birth, patient.home_province
        );
    }
    if let Some(banner) = &view.banner {
        println!("{}", banner.message);
    }
    println!("-- {} --", args.tab.label());
    match workflow.record_view().content() {
        TabContent::Records(records) => {
            for record in records {
                println!(
                    "{}  {:<30} {} ({}) [{}]",
                    record.date,
                    record.title,
                    record.provider.name,
                    record.provider.organization,
                    record.category
                );
            }
        }
        TabContent::Placeholder(text) => println!("{text}"),
    }

    workflow.end_session()?;
    Ok(())
}
