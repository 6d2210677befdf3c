use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};

use taskdesk::api::http::HttpBackend;
use taskdesk::api::{Backend, Scope};
use taskdesk::config::AppConfig;
use taskdesk::model::work_item::WorkItem;
use taskdesk::model::{DateField, ItemKind};
use taskdesk::report::{self, ReportOptions};
use taskdesk::session::{AccountKind, Session, SessionStore};
use taskdesk::{Bucket, FilterMode};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Login {
        kind: AccountKind,
        user_id: String,
        password: String,
    },
    Logout,
    Whoami,
    Report(ListArgs),
    Summary {
        kinds: Vec<ItemKind>,
        args: ListArgs,
    },
    Help,
}

/// Options shared by `tasks`, `tickets` and `summary`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListArgs {
    pub kind: Option<ItemKind>,
    pub range: Option<FilterMode>,
    pub day: Option<NaiveDate>,
    pub field: Option<DateField>,
    pub category: Option<Bucket>,
    pub scope: Option<String>,
    pub json: bool,
}

impl ListArgs {
    fn options(&self, kind: ItemKind) -> ReportOptions {
        // A bare --day means that day.
        let range = self
            .range
            .or(self.day.map(|_| FilterMode::SpecificDay));
        ReportOptions {
            field: self.field.unwrap_or(kind.default_field()),
            range,
            day: self.day,
            category: self.category,
        }
    }
}

/// Parse arguments (without the program name) into a command.
///
/// Supported forms:
///   taskdesk login staff jdoe hunter2
///   taskdesk tasks --range thisWeek --category overdue
///   taskdesk tickets --day 2024-05-01 --scope group --json
///   taskdesk summary tickets --range thisMonth
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match first.as_str() {
        "login" => {
            let [kind, user_id, password] = rest else {
                bail!("Usage: taskdesk login <staff|tenant> <userId> <password>");
            };
            Ok(Command::Login {
                kind: kind.parse()?,
                user_id: user_id.clone(),
                password: password.clone(),
            })
        }
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),
        "tasks" | "tickets" => {
            let mut list = parse_list_args(rest)?;
            list.kind = Some(if first == "tasks" {
                ItemKind::Task
            } else {
                ItemKind::Ticket
            });
            Ok(Command::Report(list))
        }
        "summary" => {
            let (kinds, rest) = match rest.split_first() {
                Some((word, tail)) if !word.starts_with('-') => {
                    let kinds = match word.as_str() {
                        "tasks" => vec![ItemKind::Task],
                        "tickets" => vec![ItemKind::Ticket],
                        "all" => vec![ItemKind::Task, ItemKind::Ticket],
                        other => bail!("Unknown summary target '{other}' (expected tasks, tickets or all)"),
                    };
                    (kinds, tail)
                }
                _ => (vec![ItemKind::Task, ItemKind::Ticket], rest),
            };
            let args = parse_list_args(rest)?;
            if args.category.is_some() {
                bail!("--category is not supported by summary");
            }
            Ok(Command::Summary { kinds, args })
        }
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command '{other}'. Run `taskdesk help` for usage."),
    }
}

fn parse_list_args(args: &[String]) -> Result<ListArgs> {
    let mut list = ListArgs::default();
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--json" {
            list.json = true;
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .with_context(|| format!("Missing value for {flag}"))?;
        match flag {
            "-r" | "--range" => list.range = Some(value.parse()?),
            "-d" | "--day" => list.day = Some(report::parse_day(value)?),
            "-f" | "--field" => list.field = Some(value.parse()?),
            "-c" | "--category" => list.category = Some(value.parse()?),
            "-s" | "--scope" => list.scope = Some(value.clone()),
            _ => bail!("Unknown option '{flag}'"),
        }
        i += 2;
    }

    Ok(list)
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let store = SessionStore::new();
    match command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Login {
            kind,
            user_id,
            password,
        } => {
            let backend = HttpBackend::new(&config.backend)?;
            let session = backend.login(kind, &user_id, &password).await?;
            store.save(&session)?;
            tracing::info!(user = %session.user.id, %kind, "session stored");
            println!("Logged in as {} ({kind})", session.display_name());
            Ok(())
        }
        Command::Logout => {
            if store.clear()? {
                println!("Logged out");
            } else {
                println!("No active session");
            }
            Ok(())
        }
        Command::Whoami => {
            match store.load()? {
                Some(session) => print_session(&session),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::Report(args) => {
            let session = store.require()?;
            let backend = HttpBackend::new(&config.backend)?;
            handle_report(&backend, &session, &args).await
        }
        Command::Summary { kinds, args } => {
            let session = store.require()?;
            let backend = HttpBackend::new(&config.backend)?;
            handle_summary(&backend, &session, &kinds, &args, config.report.range).await
        }
    }
}

fn print_session(session: &Session) {
    println!("{} ({})", session.display_name(), session.kind);
    if let Some(role) = &session.role {
        println!("  role:  {role}");
    }
    if let Some(group) = &session.user.group {
        println!("  group: {group}");
    }
    println!("  admin: {}", session.user.is_admin);
    println!("  scope: {}", session.default_scope());
}

fn resolve_scope(session: &Session, kind: ItemKind, args: &ListArgs) -> Result<Scope> {
    let scope = match &args.scope {
        Some(keyword) => session.scope_for(keyword)?,
        None => session.default_scope(),
    };
    // Tasks have no creator listing; fall back to the user's own tasks.
    if kind == ItemKind::Task {
        if let Scope::CreatedBy(id) = scope {
            return Ok(Scope::User(id));
        }
    }
    Ok(scope)
}

async fn handle_report(backend: &dyn Backend, session: &Session, args: &ListArgs) -> Result<()> {
    let kind = args.kind.context("No item kind given")?;
    let scope = resolve_scope(session, kind, args)?;
    let items = backend.fetch(kind, &scope).await?;

    let now = Local::now();
    let opts = args.options(kind);
    let report = report::build_report(kind, &items, &opts, &now)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_report(&report, &now));
    }
    Ok(())
}

async fn handle_summary(
    backend: &dyn Backend,
    session: &Session,
    kinds: &[ItemKind],
    args: &ListArgs,
    default_range: FilterMode,
) -> Result<()> {
    let (tasks, tickets) = match kinds {
        [ItemKind::Task] => (fetch_for(backend, session, ItemKind::Task, args).await?, Vec::new()),
        [ItemKind::Ticket] => (Vec::new(), fetch_for(backend, session, ItemKind::Ticket, args).await?),
        _ => futures::try_join!(
            fetch_for(backend, session, ItemKind::Task, args),
            fetch_for(backend, session, ItemKind::Ticket, args),
        )?,
    };

    let now = Local::now();
    let mode = args
        .range
        .or(args.day.map(|_| FilterMode::SpecificDay))
        .unwrap_or(default_range);
    // The summary sheet is always keyed on creation date unless told otherwise.
    let field = args.field.unwrap_or(DateField::Created);

    let mut summaries = Vec::new();
    for kind in kinds {
        let items = match kind {
            ItemKind::Task => &tasks,
            ItemKind::Ticket => &tickets,
        };
        summaries.push(report::build_summary(*kind, items, field, mode, args.day, &now)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        let rendered: Vec<String> = summaries
            .iter()
            .map(|s| report::render_summary(s, &now))
            .collect();
        print!("{}", rendered.join("\n"));
    }
    Ok(())
}

async fn fetch_for(
    backend: &dyn Backend,
    session: &Session,
    kind: ItemKind,
    args: &ListArgs,
) -> Result<Vec<WorkItem>> {
    let scope = resolve_scope(session, kind, args)?;
    backend.fetch(kind, &scope).await
}

pub fn print_help() {
    println!("taskdesk — task and ticket reports from the facility backend\n");
    println!("USAGE:");
    println!("  taskdesk login <staff|tenant> <userId> <password>");
    println!("  taskdesk logout");
    println!("  taskdesk whoami");
    println!("  taskdesk tasks [options]           Counts per status, optionally date-filtered");
    println!("  taskdesk tickets [options]");
    println!("  taskdesk summary [tasks|tickets|all] [options]");
    println!();
    println!("OPTIONS:");
    println!("  -r, --range <mode>      today, tomorrow, thisWeek, thisMonth, thisYear, specificDay");
    println!("  -d, --day <YYYY-MM-DD>  Day for specificDay (implies it when --range is omitted)");
    println!("  -f, --field <field>     due or created (default: due for tasks, created for tickets)");
    println!("  -c, --category <name>   List pending, in_progress, completed or overdue items");
    println!("  -s, --scope <scope>     all, mine, group or created (default: from your account)");
    println!("      --json              Print JSON instead of text");
    println!();
    println!("ENVIRONMENT:");
    println!("  TASKDESK_API_URL        Backend base URL (overrides ~/.taskdesk/config.toml)");
    println!("  RUST_LOG                Log filter, e.g. taskdesk=debug");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_is_help() {
        assert_eq!(parse_args(&args(&[])).unwrap(), Command::Help);
    }

    #[test]
    fn parse_login() {
        let cmd = parse_args(&args(&["login", "tenant", "flat12", "pw"])).unwrap();
        assert_eq!(
            cmd,
            Command::Login {
                kind: AccountKind::Tenant,
                user_id: "flat12".into(),
                password: "pw".into(),
            }
        );
    }

    #[test]
    fn parse_login_needs_three_values() {
        let err = parse_args(&args(&["login", "staff", "jdoe"])).unwrap_err();
        assert!(err.to_string().contains("Usage"));
        assert!(parse_args(&args(&["login", "owner", "a", "b"])).is_err());
    }

    #[test]
    fn parse_tasks_with_options() {
        let cmd = parse_args(&args(&[
            "tasks",
            "--range",
            "this-week",
            "-c",
            "overdue",
            "--json",
        ]))
        .unwrap();
        let Command::Report(list) = cmd else {
            panic!("expected report command");
        };
        assert_eq!(list.kind, Some(ItemKind::Task));
        assert_eq!(list.range, Some(FilterMode::ThisWeek));
        assert_eq!(list.category, Some(Bucket::Overdue));
        assert!(list.json);
    }

    #[test]
    fn bare_day_implies_specific_day() {
        let Command::Report(list) =
            parse_args(&args(&["tickets", "--day", "2024-05-01"])).unwrap()
        else {
            panic!("expected report command");
        };
        let opts = list.options(ItemKind::Ticket);
        assert_eq!(opts.range, Some(FilterMode::SpecificDay));
        assert_eq!(opts.field, DateField::Created);
        assert_eq!(opts.day, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn specific_day_without_day_is_kept_for_the_classifier() {
        let Command::Report(list) =
            parse_args(&args(&["tasks", "--range", "specificDay"])).unwrap()
        else {
            panic!("expected report command");
        };
        let opts = list.options(ItemKind::Task);
        assert_eq!(opts.range, Some(FilterMode::SpecificDay));
        assert_eq!(opts.day, None);
    }

    #[test]
    fn parse_errors() {
        assert!(parse_args(&args(&["tasks", "--range"]))
            .unwrap_err()
            .to_string()
            .contains("Missing value"));
        assert!(parse_args(&args(&["tasks", "--range", "fortnight"])).is_err());
        assert!(parse_args(&args(&["tasks", "--day", "01/05/2024"])).is_err());
        assert!(parse_args(&args(&["tasks", "--verbose", "x"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn parse_summary_targets() {
        let cmd = parse_args(&args(&["summary"])).unwrap();
        assert_eq!(
            cmd,
            Command::Summary {
                kinds: vec![ItemKind::Task, ItemKind::Ticket],
                args: ListArgs::default(),
            }
        );
        let Command::Summary { kinds, args: list } =
            parse_args(&args(&["summary", "tickets", "-r", "thisYear"])).unwrap()
        else {
            panic!("expected summary command");
        };
        assert_eq!(kinds, vec![ItemKind::Ticket]);
        assert_eq!(list.range, Some(FilterMode::ThisYear));
        assert!(parse_args(&args(&["summary", "groups"])).is_err());
        assert!(parse_args(&args(&["summary", "-c", "pending"])).is_err());
    }
}
