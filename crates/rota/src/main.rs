//! Rota: weekly doctor-coverage schedules from the command line
//!
//! Each subcommand maps onto one backend action:
//! - `departments`, `schedules`: public views, no login
//! - `submit`, `previous`: department employees
//! - `users`, `review`, `summary`, `alert` and friends: admins
//! - `call`: a raw action with a JSON payload

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use rota_dashboard::{
    DashboardApi, DashboardError, NewUser, ReviewFilter, ScheduleAction, UserUpdate, week,
};
use rota_rpc::{ClientConfig, RetryPolicy, RpcClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    week::parse_date(s).map_err(|e| format!("invalid date '{}', expected YYYY-MM-DD: {}", s, e))
}

#[derive(Parser)]
#[command(name = "rota")]
#[command(about = "Weekly doctor-coverage schedules", long_about = None)]
struct Cli {
    /// Backend endpoint URL
    #[arg(long, env = "ROTA_ENDPOINT")]
    endpoint: String,

    /// Retries after a connection failure or server error
    #[arg(long, env = "ROTA_MAX_RETRIES", default_value = "3")]
    max_retries: u32,

    /// Delay before the first retry in milliseconds; doubles on each retry
    #[arg(long, env = "ROTA_INITIAL_DELAY_MS", default_value = "1000")]
    initial_delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Login {
    /// Username to log in with. The password is read from ROTA_PASSWORD or prompted for.
    #[arg(long, env = "ROTA_USERNAME")]
    username: String,
}

// The week containing `--date`, moved by `--weeks`
#[derive(Args)]
struct WeekArgs {
    /// Any date in the week (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,

    /// Weeks to move from that week, e.g. -1 for the previous week
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    weeks: i64,
}

impl WeekArgs {
    fn resolve(&self) -> Result<NaiveDate> {
        let start = self
            .date
            .map(week::current_week_start)
            .unwrap_or_else(week::this_week_start);
        week::shift_weeks(start, self.weeks)
            .ok_or_else(|| miette!("week offset {} is out of range", self.weeks))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List departments
    Departments,

    /// Show published schedules for a department
    Schedules {
        /// Department name
        department: String,
    },

    /// Submit the doctors on duty for a week
    Submit {
        #[command(flatten)]
        login: Login,

        /// Week start; must be a Sunday (defaults to the current week)
        #[arg(long, value_parser = parse_date_arg)]
        week: Option<NaiveDate>,

        /// Doctors on Sunday, comma-separated
        #[arg(long, value_delimiter = ',')]
        sunday: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        monday: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        tuesday: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        wednesday: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        thursday: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        friday: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        saturday: Vec<String>,
    },

    /// Show schedules previously submitted for your department
    Previous {
        #[command(flatten)]
        login: Login,
    },

    /// List user accounts (admin)
    Users {
        #[command(flatten)]
        login: Login,
    },

    /// Create a user account (admin)
    AddUser {
        #[command(flatten)]
        login: Login,

        /// Name of the new user
        name: String,

        /// Password for the new user
        #[arg(long)]
        new_password: String,

        /// Department of the new user
        #[arg(long)]
        department: String,

        /// Telegram chat id for reminders
        #[arg(long, default_value = "")]
        telegram_id: String,
    },

    /// Change a user account (admin). Omitted fields keep their current value.
    UpdateUser {
        #[command(flatten)]
        login: Login,

        /// Current name of the user
        name: String,

        /// New name
        #[arg(long)]
        rename: Option<String>,

        /// New password
        #[arg(long)]
        new_password: Option<String>,

        /// New department
        #[arg(long)]
        department: Option<String>,

        /// New Telegram chat id
        #[arg(long)]
        telegram_id: Option<String>,
    },

    /// Delete a user account (admin)
    DeleteUser {
        #[command(flatten)]
        login: Login,

        /// Name of the user
        name: String,
    },

    /// Count schedules per review state (admin)
    Counts {
        #[command(flatten)]
        login: Login,
    },

    /// List schedules in a review state (admin)
    Review {
        #[command(flatten)]
        login: Login,

        /// modified, pending, approved, rejected or all
        #[arg(long, default_value_t = ReviewFilter::default())]
        status: ReviewFilter,
    },

    /// Approve a submitted schedule (admin)
    Approve {
        #[command(flatten)]
        login: Login,

        request_id: String,
    },

    /// Reject a submitted schedule (admin)
    Reject {
        #[command(flatten)]
        login: Login,

        request_id: String,
    },

    /// Delete a submitted schedule (admin)
    DeleteSchedule {
        #[command(flatten)]
        login: Login,

        request_id: String,
    },

    /// Show which departments submitted a week (admin)
    Summary {
        #[command(flatten)]
        login: Login,

        #[command(flatten)]
        week: WeekArgs,
    },

    /// Remind a department that its schedule is missing (admin)
    Alert {
        #[command(flatten)]
        login: Login,

        /// Department to remind
        department: String,

        #[command(flatten)]
        week: WeekArgs,
    },

    /// Call a backend action directly and print the response
    Call {
        /// Action name, e.g. getInitialData
        action: String,

        /// JSON payload
        #[arg(long, default_value = "{}")]
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only results
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "rota=info,rota_rpc=info,rota_dashboard=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let retry = RetryPolicy::new(cli.max_retries, Duration::from_millis(cli.initial_delay_ms));
    let config = ClientConfig::new(&cli.endpoint).with_retry(retry);
    let rpc = RpcClient::new(&config).map_err(|e| miette!("failed to create client: {}", e))?;
    let api = DashboardApi::new(rpc);

    tracing::debug!(endpoint = %cli.endpoint, ?retry, "client configured");

    match cli.command {
        Commands::Departments => {
            let departments = api.initial_data().await.map_err(report)?;
            for department in departments {
                println!("{}", department);
            }
        }

        Commands::Schedules { department } => {
            let schedules = api.public_schedules(&department).await.map_err(report)?;
            println!("{}", render::schedules(&schedules));
        }

        Commands::Submit {
            login,
            week: requested_week,
            sunday,
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
        } => {
            authenticate(&api, &login).await?;
            let week_start = requested_week.unwrap_or_else(week::this_week_start);

            if api.schedule_exists(week_start).await.map_err(report)? {
                return Err(miette!(
                    "a schedule for the week of {} was already submitted",
                    week::format_date(week_start)
                ));
            }

            let days = [sunday, monday, tuesday, wednesday, thursday, friday, saturday];
            let message = api.submit_schedule(week_start, days).await.map_err(report)?;
            println!("{}", message);
        }

        Commands::Previous { login } => {
            authenticate(&api, &login).await?;
            let schedules = api.previous_schedules().await.map_err(report)?;
            println!("{}", render::schedules(&schedules));
        }

        Commands::Users { login } => {
            authenticate(&api, &login).await?;
            let users = api.users().await.map_err(report)?;
            println!("{}", render::users(&users));
        }

        Commands::AddUser {
            login,
            name,
            new_password,
            department,
            telegram_id,
        } => {
            authenticate(&api, &login).await?;
            let user = NewUser {
                name,
                password: new_password,
                department,
                telegram_id,
            };
            println!("{}", api.add_user(&user).await.map_err(report)?);
        }

        Commands::UpdateUser {
            login,
            name,
            rename,
            new_password,
            department,
            telegram_id,
        } => {
            authenticate(&api, &login).await?;

            let users = api.users().await.map_err(report)?;
            let current = users
                .into_iter()
                .find(|u| u.name == name)
                .ok_or_else(|| miette!("no user named '{}'", name))?;

            let update = UserUpdate {
                new_name: rename.unwrap_or_else(|| name.clone()),
                original_name: name,
                new_password: new_password.unwrap_or_default(),
                new_department: department.or(current.department).unwrap_or_default(),
                new_telegram_id: telegram_id.or(current.telegram_id).unwrap_or_default(),
            };
            println!("{}", api.update_user(&update).await.map_err(report)?);
        }

        Commands::DeleteUser { login, name } => {
            authenticate(&api, &login).await?;
            println!("{}", api.delete_user(&name).await.map_err(report)?);
        }

        Commands::Counts { login } => {
            authenticate(&api, &login).await?;
            let counts = api.schedule_counts().await.map_err(report)?;
            println!("{}", render::counts(&counts));
        }

        Commands::Review { login, status } => {
            authenticate(&api, &login).await?;
            let schedules = api.pending_schedules(status).await.map_err(report)?;
            println!("{}", render::schedules(&schedules));
        }

        Commands::Approve { login, request_id } => {
            review(&api, &login, &request_id, ScheduleAction::Approve).await?
        }

        Commands::Reject { login, request_id } => {
            review(&api, &login, &request_id, ScheduleAction::Reject).await?
        }

        Commands::DeleteSchedule { login, request_id } => {
            review(&api, &login, &request_id, ScheduleAction::Delete).await?
        }

        Commands::Summary { login, week: which } => {
            authenticate(&api, &login).await?;
            let week_start = which.resolve()?;
            let summary = api.weekly_summary(week_start).await.map_err(report)?;
            println!("{}", render::summary(week_start, &summary));
        }

        Commands::Alert {
            login,
            department,
            week: which,
        } => {
            authenticate(&api, &login).await?;
            let week_start = which.resolve()?;
            let outcome = api
                .send_alert(&department, week_start)
                .await
                .map_err(report)?;
            if outcome.sent {
                println!("{}", outcome.message);
            } else {
                tracing::warn!(department = %department, "alert not sent");
                println!("not sent: {}", outcome.message);
            }
        }

        Commands::Call { action, payload } => {
            let payload: serde_json::Value = serde_json::from_str(&payload)
                .into_diagnostic()
                .map_err(|e| e.wrap_err("payload is not valid JSON"))?;
            let resp = api
                .rpc()
                .call(&action, &payload)
                .await
                .map_err(|e| miette!("{}", e.user_message()))?;
            let value = resp.into_body();
            let body = serde_json::to_string_pretty(&value).into_diagnostic()?;
            println!("{}", body);
        }
    }

    Ok(())
}

fn report(e: DashboardError) -> miette::Report {
    miette!("{}", e.user_message())
}

/// Get the password from the environment or an interactive prompt.
fn get_password() -> Result<String> {
    if let Ok(password) = std::env::var("ROTA_PASSWORD") {
        return Ok(password);
    }

    eprint!("Password: ");
    rpassword::read_password().map_err(|e| miette!("failed to read password: {}", e))
}

async fn authenticate(api: &DashboardApi, login: &Login) -> Result<()> {
    let password = get_password()?;
    let session = api
        .login(&login.username, &password)
        .await
        .map_err(|e| miette!("login failed: {}", e.user_message()))?;
    tracing::debug!(username = %session.username, role = ?session.role, "authenticated");
    Ok(())
}

async fn review(
    api: &DashboardApi,
    login: &Login,
    request_id: &str,
    action: ScheduleAction,
) -> Result<()> {
    authenticate(api, login).await?;
    let message = api
        .schedule_action(request_id, action)
        .await
        .map_err(report)?;
    println!("{}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use test_case::test_case;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_week_args_normalize_to_sunday() {
        let week = WeekArgs {
            date: NaiveDate::from_ymd_opt(2024, 5, 8),
            weeks: -1,
        };
        assert_eq!(week.resolve().ok(), NaiveDate::from_ymd_opt(2024, 4, 28));
    }

    #[test_case("2024-05-05", true ; "iso date")]
    #[test_case("05/05/2024", false ; "slashes")]
    #[test_case("2024-02-30", false ; "impossible day")]
    fn test_parse_date_arg(input: &str, ok: bool) {
        assert_eq!(parse_date_arg(input).is_ok(), ok);
    }

    #[test]
    fn test_submit_days_split_on_commas() {
        let cli = Cli::try_parse_from([
            "rota",
            "--endpoint",
            "http://localhost",
            "submit",
            "--username",
            "amal",
            "--week",
            "2024-05-05",
            "--sunday",
            "Dr. Salma,Dr. Karim",
        ])
        .unwrap();

        match cli.command {
            Commands::Submit {
                sunday,
                monday,
                week,
                ..
            } => {
                assert_eq!(sunday, vec!["Dr. Salma", "Dr. Karim"]);
                assert!(monday.is_empty());
                assert_eq!(week, NaiveDate::from_ymd_opt(2024, 5, 5));
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_review_status_parses() {
        let cli = Cli::try_parse_from([
            "rota",
            "--endpoint",
            "http://localhost",
            "review",
            "--username",
            "huda",
            "--status",
            "approved",
        ])
        .unwrap();

        match cli.command {
            Commands::Review { status, .. } => assert_eq!(status, ReviewFilter::Approved),
            _ => panic!("expected review"),
        }
    }
}
