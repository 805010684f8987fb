use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::{json, Value};
use std::{path::PathBuf, sync::Arc};

mod cli_style;

use cli_style::{
    get_styles, print_empty_list, print_error, print_key_value, print_section_footer,
    print_section_header, print_success, print_warning, TableBuilder,
};
use workforce_server::agent::tools::{format_brl, month_name};
use workforce_server::{DispatchRequest, DispatchResponse, Dispatcher, SqliteWorkforceStore};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_json(s: &str) -> Result<Value> {
    serde_json::from_str(s).with_context(|| format!("Not valid JSON: {}", s))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the SQLite database file. Created if missing.
    #[clap(value_parser = parse_path, default_value = "workforce.db")]
    pub path: PathBuf,
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Sends a raw dispatch request and prints the response envelope.
    /// Example: dispatch get employee --params '{"id": 1}'
    Dispatch {
        action: String,
        entity: String,
        #[clap(long, value_parser = parse_json)]
        params: Option<Value>,
        #[clap(long, value_parser = parse_json)]
        data: Option<Value>,
    },

    /// Shows all employees.
    Employees,

    /// Shows the monthly records of an employee, newest first.
    Records { employee_id: i64 },

    /// Prints the entity schema with current counts.
    Schema,

    /// Shows the path of the current database.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Unwraps a successful envelope, turning failures into an error message.
fn envelope_data(response: DispatchResponse) -> Result<Value, String> {
    if response.success {
        Ok(response.data.unwrap_or(Value::Null))
    } else {
        Err(response.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}

fn text(value: &Value, key: &str) -> String {
    match &value[key] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn money(value: &Value, key: &str) -> String {
    format_brl(value[key].as_f64().unwrap_or(0.0))
}

fn show_employees(dispatcher: &Dispatcher) -> CommandExecutionResult {
    let employees = match envelope_data(dispatcher.dispatch(&DispatchRequest::new("list", "employee"))) {
        Ok(data) => data,
        Err(err) => return CommandExecutionResult::Error(err),
    };
    let employees = employees.as_array().cloned().unwrap_or_default();

    print_section_header("Employees");
    if employees.is_empty() {
        print_empty_list("No employees yet");
    } else {
        let mut table = TableBuilder::new(&["ID", "Name", "Email", "Weekend", "Holiday", "Active"]);
        for employee in &employees {
            table.add_row(vec![
                text(employee, "id"),
                text(employee, "name"),
                text(employee, "email"),
                money(employee, "weekendRate"),
                money(employee, "holidayRate"),
                text(employee, "isActive"),
            ]);
        }
        table.print();
    }
    print_section_footer();
    CommandExecutionResult::Ok
}

fn show_records(dispatcher: &Dispatcher, employee_id: i64) -> CommandExecutionResult {
    let lookup = DispatchRequest::new("get", "employee").with_params(json!({ "id": employee_id }));
    let employee = match envelope_data(dispatcher.dispatch(&lookup)) {
        Ok(data) => data,
        Err(err) => return CommandExecutionResult::Error(err),
    };
    let request = DispatchRequest::new("getByEmployee", "monthlyWorkRecord")
        .with_params(json!({ "employeeId": employee_id }));
    let records = match envelope_data(dispatcher.dispatch(&request)) {
        Ok(data) => data,
        Err(err) => return CommandExecutionResult::Error(err),
    };
    let records = records.as_array().cloned().unwrap_or_default();

    print_section_header(&format!("Records of {}", text(&employee, "name")));
    print_key_value("Weekend rate", &money(&employee, "weekendRate"));
    print_key_value("Holiday rate", &money(&employee, "holidayRate"));
    println!();
    if records.is_empty() {
        print_empty_list("No monthly records");
    } else {
        let mut table = TableBuilder::new(&["ID", "Period", "Weekends", "Holidays", "Total"]);
        for record in &records {
            let month = record["month"].as_u64().unwrap_or(0) as u32;
            table.add_row(vec![
                text(record, "id"),
                format!("{} {}", month_name(month), text(record, "year")),
                text(record, "weekendsWorked"),
                text(record, "holidaysWorked"),
                money(record, "totalAmount"),
            ]);
        }
        table.print();
    }
    print_section_footer();
    CommandExecutionResult::Ok
}

fn execute_command(line: String, dispatcher: &Dispatcher, db_path: &str) -> CommandExecutionResult {
    if line.trim().is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match cli.command {
                InnerCommand::Dispatch {
                    action,
                    entity,
                    params,
                    data,
                } => {
                    let request = DispatchRequest {
                        action: Some(action),
                        entity: Some(entity),
                        params,
                        data,
                    };
                    let response = dispatcher.dispatch(&request);
                    if response.success {
                        print_success("Request succeeded");
                    } else if response.data.is_some() {
                        print_warning(response.error.as_deref().unwrap_or_default());
                    } else {
                        print_error(response.error.as_deref().unwrap_or_default());
                    }
                    match serde_json::to_value(&response) {
                        Ok(value) => println!("{}", pretty(&value)),
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    }
                }
                InnerCommand::Employees => return show_employees(dispatcher),
                InnerCommand::Records { employee_id } => {
                    return show_records(dispatcher, employee_id)
                }
                InnerCommand::Schema => match dispatcher.schema() {
                    Ok(schema) => println!("{}", pretty(&schema)),
                    Err(err) => return CommandExecutionResult::Error(err.to_string()),
                },
                InnerCommand::Where => print_key_value("Database", db_path),
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct MyHelper {
    commands_names: Vec<String>,
}

impl MyHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        MyHelper { commands_names }
    }
}

impl Completer for MyHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for MyHelper {}
impl Validator for MyHelper {}
impl Helper for MyHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let store = SqliteWorkforceStore::new(&cli_args.path)?;
    let dispatcher = Dispatcher::new(Arc::new(store));
    let db_path = cli_args.path.display().to_string();

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<MyHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(MyHelper::new()));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &dispatcher, &db_path) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => print_error(&err),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
