//! `precheck`: command-line access to the CRDC PreCheck compliance API.
//!
//! Each subcommand maps to one resource operation and prints its result as
//! JSON. The session credential persists in the state directory between runs,
//! so `precheck login` authenticates every later invocation.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::json;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use precheck_client::ClientSettings;
use precheck_client::domain::{
    ComplianceApi, CsvFile, Dispatcher, DistrictId, EvidencePacketCreate, ExceptionCreate,
    ExceptionMemoCreate, ExceptionUpdate, SessionController, SsoLoginRequest, StudentCsvMapping,
    TokenStore,
};
use precheck_client::outbound::http::ReqwestTransport;
use precheck_client::outbound::token_storage::FileTokenPersistence;

/// `precheck` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "precheck",
    about = "Query and operate the CRDC PreCheck compliance API",
    version
)]
struct CliArgs {
    /// District to scope requests to. Defaults to the first listed district.
    #[arg(long, global = true, value_name = "id")]
    district: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List districts.
    Districts,
    /// List schools in the district.
    Schools,
    /// List rule definitions.
    RuleVersions,
    /// List rule runs.
    RuleRuns,
    /// Start a new rule run.
    TriggerRun,
    /// List rule results, optionally for one run.
    RuleResults {
        /// Only results produced by this run.
        #[arg(long, value_name = "id")]
        run_id: Option<String>,
    },
    /// Queue a PowerSchool sync.
    Sync,
    /// Upload a student CSV.
    ImportCsv(ImportCsvArgs),
    /// List exceptions.
    Exceptions,
    /// Open an exception against a rule result.
    CreateException {
        /// Rule result to waive.
        #[arg(long, value_name = "id")]
        rule_result_id: String,
        /// Justification text.
        #[arg(long)]
        rationale: Option<String>,
        /// Resolution deadline (YYYY-MM-DD).
        #[arg(long, value_name = "date")]
        due_date: Option<NaiveDate>,
    },
    /// Update fields of an exception.
    UpdateException(UpdateExceptionArgs),
    /// List memos attached to an exception.
    Memos {
        /// Exception identifier.
        exception_id: String,
    },
    /// Attach a memo to an exception.
    AddMemo {
        /// Exception identifier.
        exception_id: String,
        /// Memo title.
        #[arg(long)]
        title: String,
        /// Markdown body.
        #[arg(long)]
        body: String,
    },
    /// Bundle exceptions into an evidence packet.
    CreatePacket {
        /// Packet name.
        #[arg(long)]
        name: String,
        /// Packet description.
        #[arg(long)]
        description: Option<String>,
        /// Exception to include; repeat for several.
        #[arg(long = "exception-id", value_name = "id", required = true)]
        exception_ids: Vec<String>,
    },
    /// Show readiness scores.
    Readiness,
    /// Show connector health.
    AdminHealth,
    /// Download the exceptions CSV export.
    Export {
        /// Destination file.
        #[arg(long, value_name = "path")]
        output: PathBuf,
    },
    /// Log in through the simulated identity provider.
    Login(LoginArgs),
    /// Forget the stored credential.
    Logout,
    /// Show the account behind the stored credential.
    Whoami,
    /// Check that the API is up.
    Live,
}

#[derive(Debug, Args)]
struct ImportCsvArgs {
    /// CSV file to upload.
    #[arg(long, value_name = "path")]
    file: PathBuf,
    /// Column holding the SIS id.
    #[arg(long, value_name = "column")]
    sis_id: String,
    /// Column holding the first name.
    #[arg(long, value_name = "column")]
    first_name: String,
    /// Column holding the last name.
    #[arg(long, value_name = "column")]
    last_name: String,
    /// Column holding the grade level.
    #[arg(long, value_name = "column")]
    grade_level: String,
    /// Column holding the school name.
    #[arg(long, value_name = "column")]
    school_name: String,
    /// Column holding the enrollment status.
    #[arg(long, value_name = "column")]
    enrollment_status: Option<String>,
    /// Column holding the ELL flag.
    #[arg(long, value_name = "column")]
    ell_status: Option<String>,
    /// Column holding the IDEA flag.
    #[arg(long, value_name = "column")]
    idea_flag: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateExceptionArgs {
    /// Exception identifier.
    exception_id: String,
    /// New workflow status.
    #[arg(long)]
    status: Option<String>,
    /// New owner.
    #[arg(long, value_name = "user-id")]
    owner: Option<String>,
    /// New justification.
    #[arg(long)]
    rationale: Option<String>,
    /// New deadline (YYYY-MM-DD).
    #[arg(long, value_name = "date")]
    due_date: Option<NaiveDate>,
    /// Approve the exception.
    #[arg(long)]
    approve: bool,
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// Identity provider.
    #[arg(long, default_value = "google")]
    provider: String,
    /// Provider subject.
    #[arg(long)]
    subject: String,
    /// Account email.
    #[arg(long)]
    email: String,
    /// Display name.
    #[arg(long)]
    display_name: String,
}

struct Client {
    api: ComplianceApi<ReqwestTransport>,
    controller: SessionController<ReqwestTransport>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = ClientSettings::load_from_iter([OsString::from("precheck")])
        .map_err(|error| eyre!("load client settings: {error}"))?;
    let client = connect(&settings)?;
    let district = args.district.as_deref();

    match args.command {
        Command::Districts => emit(&client.api.list_districts().await?),
        Command::Schools => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.list_schools(&district).await?)
        }
        Command::RuleVersions => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.list_rule_versions(&district).await?)
        }
        Command::RuleRuns => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.list_rule_runs(&district).await?)
        }
        Command::TriggerRun => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.trigger_rule_run(&district).await?)
        }
        Command::RuleResults { run_id } => {
            let district = resolve_district(&client, district).await?;
            emit(
                &client
                    .api
                    .list_rule_results(&district, run_id.as_deref())
                    .await?,
            )
        }
        Command::Sync => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.trigger_powerschool_sync(&district).await?)
        }
        Command::ImportCsv(import) => {
            let district = resolve_district(&client, district).await?;
            let (file, mapping) = read_import(import)?;
            emit(
                &client
                    .api
                    .upload_student_csv(&district, file, &mapping)
                    .await?,
            )
        }
        Command::Exceptions => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.list_exceptions(&district).await?)
        }
        Command::CreateException {
            rule_result_id,
            rationale,
            due_date,
        } => {
            let district = resolve_district(&client, district).await?;
            let body = ExceptionCreate {
                rule_result_id,
                rationale,
                due_date,
            };
            emit(&client.api.create_exception(&district, &body).await?)
        }
        Command::UpdateException(update) => {
            let district = resolve_district(&client, district).await?;
            let (exception_id, update) = build_update(update)?;
            emit(
                &client
                    .api
                    .update_exception(&district, &exception_id, &update)
                    .await?,
            )
        }
        Command::Memos { exception_id } => {
            let district = resolve_district(&client, district).await?;
            emit(
                &client
                    .api
                    .list_exception_memos(&district, &exception_id)
                    .await?,
            )
        }
        Command::AddMemo {
            exception_id,
            title,
            body,
        } => {
            let district = resolve_district(&client, district).await?;
            let memo = ExceptionMemoCreate::by_user(title, body);
            emit(
                &client
                    .api
                    .create_exception_memo(&district, &exception_id, &memo)
                    .await?,
            )
        }
        Command::CreatePacket {
            name,
            description,
            exception_ids,
        } => {
            let district = resolve_district(&client, district).await?;
            let packet = EvidencePacketCreate {
                name,
                description,
                exception_ids,
            };
            emit(&client.api.create_evidence_packet(&district, &packet).await?)
        }
        Command::Readiness => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.read_readiness(&district).await?)
        }
        Command::AdminHealth => {
            let district = resolve_district(&client, district).await?;
            emit(&client.api.read_admin_health(&district).await?)
        }
        Command::Export { output } => {
            let district = resolve_district(&client, district).await?;
            let csv = client.api.download_exceptions_export(&district).await?;
            write_export(&output, &csv)?;
            info!(path = %output.display(), bytes = csv.len(), "export written");
            emit(&json!({ "path": output, "bytes": csv.len() }))
        }
        Command::Login(login) => {
            let district = resolve_district(&client, district).await?;
            let request = SsoLoginRequest {
                provider: login.provider,
                subject: login.subject,
                email: login.email,
                display_name: login.display_name,
            };
            let auth = client.controller.login(&district, &request).await?;
            emit(&auth.user)
        }
        Command::Logout => {
            client.controller.logout()?;
            emit(&json!({ "status": "signed_out" }))
        }
        Command::Whoami => {
            let district = resolve_district(&client, district).await?;
            match client.controller.restore(&district).await? {
                Some(auth) => emit(&auth.user),
                None => Err(eyre!("not logged in")),
            }
        }
        Command::Live => emit(&client.api.liveness().await?),
    }
}

fn connect(settings: &ClientSettings) -> Result<Client> {
    let base_url = settings.api_url().wrap_err("invalid PRECHECK_API_URL")?;
    let storage = Arc::new(FileTokenPersistence::new(settings.state_dir()));
    let session = Arc::new(TokenStore::initialize(storage, settings.api_token()));
    let transport = Arc::new(ReqwestTransport::new().wrap_err("build HTTP client")?);
    let api = ComplianceApi::new(Dispatcher::new(transport, base_url, session));
    let controller = SessionController::new(api.clone());
    Ok(Client { api, controller })
}

/// Use the explicit district, or the first one the API lists.
async fn resolve_district(client: &Client, explicit: Option<&str>) -> Result<DistrictId> {
    if let Some(raw) = explicit {
        return DistrictId::new(raw).wrap_err("invalid --district");
    }
    let districts = client.api.list_districts().await?;
    let first = districts
        .into_iter()
        .next()
        .ok_or_else(|| eyre!("no districts available; pass --district"))?;
    info!(district = %first.id, name = %first.name, "using first listed district");
    DistrictId::new(first.id).wrap_err("server returned an invalid district id")
}

fn read_import(args: ImportCsvArgs) -> Result<(CsvFile, StudentCsvMapping)> {
    let (dir, file_name) = open_parent(&args.file)?;
    let content = dir
        .read(&file_name)
        .wrap_err_with(|| format!("read {}", args.file.display()))?;
    let mapping = StudentCsvMapping {
        sis_id: args.sis_id,
        first_name: args.first_name,
        last_name: args.last_name,
        grade_level: args.grade_level,
        school_name: args.school_name,
        enrollment_status: args.enrollment_status,
        ell_status: args.ell_status,
        idea_flag: args.idea_flag,
    };
    let file = CsvFile::new(file_name.to_string_lossy().into_owned(), content);
    Ok((file, mapping))
}

fn build_update(args: UpdateExceptionArgs) -> Result<(String, ExceptionUpdate)> {
    let mut update = ExceptionUpdate::default();
    if let Some(status) = args.status {
        update = update.status(status);
    }
    if let Some(owner) = args.owner {
        update = update.owner_user_id(owner);
    }
    if let Some(rationale) = args.rationale {
        update = update.rationale(rationale);
    }
    if let Some(due_date) = args.due_date {
        update = update.due_date(due_date);
    }
    if args.approve {
        update = update.approved(true);
    }
    if update.is_empty() {
        return Err(eyre!("nothing to update; pass at least one field"));
    }
    Ok((args.exception_id, update))
}

fn write_export(path: &Path, contents: &[u8]) -> Result<()> {
    let (dir, file_name) = open_parent(path)?;
    dir.write(&file_name, contents)
        .wrap_err_with(|| format!("write {}", path.display()))
}

fn open_parent(path: &Path) -> Result<(Dir, PathBuf)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("{} does not name a file", path.display()))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open {}", parent.display()))?;
    Ok((dir, PathBuf::from(file_name)))
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("render output")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").wrap_err("write output")
}
