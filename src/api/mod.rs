use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;

pub mod input;
pub mod report;

use crate::core::{
    BudgetSolveConfig, BudgetSolveResult, Debt, MonthRecord, PayoffError, PayoffPlan, Strategy,
    order, simulate, simulate_with_schedule, solve_budget,
};
use input::{InputError, Prompter, check_budget, parse_debts, validate_debt};
use report::{DEFAULT_REPORT_PATH, echo_report, render_report, write_report};

const USAGE_TEXT: &str = "debtplan HTTP API

POST /api/plan     JSON payoff plan
POST /api/report   plain-text payoff report

Body: {\"debts\": [{\"name\": \"Visa\", \"balance\": 2500, \"annualRate\": 22.9, \"minPayment\": 75}],
       \"monthlyBudget\": 400, \"strategy\": \"avalanche\", \"includeSchedule\": false, \"targetMonths\": 24}
";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStrategy {
    Snowball,
    Avalanche,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(
        alias = "Snowball",
        alias = "smallest-balance",
        alias = "smallestBalance"
    )]
    Snowball,
    #[serde(alias = "Avalanche", alias = "highest-rate", alias = "highestRate")]
    Avalanche,
}

impl From<ApiStrategy> for CliStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Snowball => CliStrategy::Snowball,
            ApiStrategy::Avalanche => CliStrategy::Avalanche,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ResponseStrategy {
    Snowball,
    Avalanche,
}

impl From<Strategy> for ResponseStrategy {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::Snowball => ResponseStrategy::Snowball,
            Strategy::Avalanche => ResponseStrategy::Avalanche,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "debtplan",
    about = "Debt payoff planner (snowball or avalanche, with monthly surplus cascading)"
)]
pub struct Cli {
    #[arg(long, global = true, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a payoff plan, write it to a report file and print it.
    Plan(PlanArgs),
    /// Serve the planner over HTTP.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(
        long,
        help = "Delimited text file with one `name,balance,rate,minimum` debt per line; prompts when omitted"
    )]
    debts: Option<PathBuf>,
    #[arg(
        long,
        help = "Total monthly amount available for debt payments; prompts when omitted"
    )]
    budget: Option<f64>,
    #[arg(long, value_enum, help = "Payoff order; prompts when omitted")]
    strategy: Option<CliStrategy>,
    #[arg(long, default_value_t = ',', help = "Field delimiter for --debts")]
    delimiter: char,
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    output: PathBuf,
    #[arg(long, help = "Append the month-by-month balances to the report")]
    schedule: bool,
    #[arg(
        long,
        help = "Also solve for the monthly budget that clears every debt within this many months"
    )]
    target_months: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Payoff(#[from] PayoffError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Validated inputs for one planning run.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub debts: Vec<Debt>,
    pub monthly_budget: f64,
    pub strategy: Strategy,
    pub include_schedule: bool,
    pub target_months: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub strategy: Strategy,
    pub plan: PayoffPlan,
    pub schedule: Option<Vec<MonthRecord>>,
    pub budget_goal: Option<BudgetSolveResult>,
}

impl PlanOutcome {
    pub fn render(&self) -> String {
        render_report(
            &self.plan,
            self.strategy,
            self.schedule.as_deref(),
            self.budget_goal.as_ref(),
        )
    }
}

/// Orders the debts, runs the payoff simulation and, when asked, the budget solver.
pub fn build_plan(settings: &PlanSettings) -> Result<PlanOutcome, PayoffError> {
    let ordered = order(&settings.debts, settings.strategy);
    let (plan, schedule) = if settings.include_schedule {
        let (plan, schedule) = simulate_with_schedule(&ordered, settings.monthly_budget)?;
        (plan, Some(schedule))
    } else {
        (simulate(&ordered, settings.monthly_budget)?, None)
    };
    let budget_goal = settings
        .target_months
        .map(|months| solve_budget(&ordered, BudgetSolveConfig::for_debts(&ordered, months)))
        .transpose()?;

    info!(
        "{} debts retired in {} months using {:?}",
        plan.debts.len(),
        plan.completion_month,
        settings.strategy
    );
    Ok(PlanOutcome {
        strategy: settings.strategy,
        plan,
        schedule,
        budget_goal,
    })
}

fn gather_settings<R: BufRead, W: Write>(
    args: &PlanArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<PlanSettings, AppError> {
    let debts = match &args.debts {
        Some(path) => parse_debts(&fs::read_to_string(path)?, args.delimiter)?,
        None => prompter.read_debts()?,
    };
    let budget = match args.budget {
        Some(budget) => budget,
        None => prompter.read_budget()?,
    };
    let monthly_budget = check_budget(&debts, budget)?;
    let strategy = match args.strategy {
        Some(strategy) => strategy.into(),
        None => prompter.read_strategy()?,
    };

    Ok(PlanSettings {
        debts,
        monthly_budget,
        strategy,
        include_schedule: args.schedule,
        target_months: args.target_months,
    })
}

/// Runs the command-line workflow: gather inputs (prompting for anything
/// not given as a flag), plan, write the report file, and echo it.
pub fn run_plan<R: BufRead, W: Write>(
    args: &PlanArgs,
    mut input: R,
    mut output: W,
) -> Result<PathBuf, AppError> {
    let settings = {
        let mut prompter = Prompter::new(&mut input, &mut output);
        gather_settings(args, &mut prompter)?
    };
    let outcome = build_plan(&settings).inspect_err(|e| warn!("planning failed: {e}"))?;

    write_report(&args.output, &outcome.render())?;
    echo_report(&args.output, &mut output)?;
    Ok(args.output.clone())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtPayload {
    name: String,
    balance: f64,
    #[serde(alias = "rate", alias = "interestRate")]
    annual_rate: f64,
    #[serde(default)]
    min_payment: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    debts: Vec<DebtPayload>,
    monthly_budget: Option<f64>,
    strategy: Option<ApiStrategy>,
    include_schedule: Option<bool>,
    target_months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    strategy: ResponseStrategy,
    monthly_budget: f64,
    completion_month: u32,
    total_interest: f64,
    total_paid: f64,
    debts: Vec<Debt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<MonthRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget_goal: Option<BudgetSolveResult>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn settings_from_payload(payload: PlanPayload) -> Result<PlanSettings, InputError> {
    let debts: Vec<Debt> = payload
        .debts
        .into_iter()
        .map(|d| Debt::new(d.name.trim(), d.balance, d.annual_rate, d.min_payment))
        .collect();
    for (idx, debt) in debts.iter().enumerate() {
        validate_debt(idx + 1, debt)?;
    }

    let budget = payload
        .monthly_budget
        .ok_or(InputError::Missing("monthlyBudget"))?;
    let monthly_budget = check_budget(&debts, budget)?;
    let strategy: CliStrategy = payload.strategy.unwrap_or(ApiStrategy::Snowball).into();

    Ok(PlanSettings {
        debts,
        monthly_budget,
        strategy: strategy.into(),
        include_schedule: payload.include_schedule.unwrap_or(false),
        target_months: payload.target_months,
    })
}

#[cfg(test)]
fn settings_from_json(json: &str) -> Result<PlanSettings, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    settings_from_payload(payload).map_err(|e| e.to_string())
}

fn build_plan_response(outcome: PlanOutcome) -> PlanResponse {
    PlanResponse {
        strategy: outcome.strategy.into(),
        monthly_budget: outcome.plan.monthly_budget,
        completion_month: outcome.plan.completion_month,
        total_interest: outcome.plan.total_interest,
        total_paid: outcome.plan.total_paid,
        debts: outcome.plan.debts,
        schedule: outcome.schedule,
        budget_goal: outcome.budget_goal,
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(usage_handler))
        .route("/api/plan", post(plan_handler))
        .route("/api/report", post(report_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("debtplan HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

async fn usage_handler() -> Response {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        USAGE_TEXT,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    match plan_from_request(payload) {
        Ok(outcome) => json_response(StatusCode::OK, build_plan_response(outcome)),
        Err(response) => response,
    }
}

async fn report_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    match plan_from_request(payload) {
        Ok(outcome) => with_cache_control((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            outcome.render(),
        )),
        Err(response) => response,
    }
}

fn plan_from_request(
    payload: Result<Json<PlanPayload>, JsonRejection>,
) -> Result<PlanOutcome, Response> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("rejected plan payload: {rejection}");
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid API JSON payload: {}", rejection.body_text()),
        )
    })?;
    let settings = settings_from_payload(payload)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;
    build_plan(&settings).map_err(|e| error_response(payoff_error_status(&e), &e.to_string()))
}

fn payoff_error_status(err: &PayoffError) -> StatusCode {
    match err {
        PayoffError::UnsustainableDebt { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PayoffError::InvalidSolverConfig(_) => StatusCode::BAD_REQUEST,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};
    use std::io::{Cursor, Read};

    fn plan_args(output: PathBuf) -> PlanArgs {
        PlanArgs {
            debts: None,
            budget: None,
            strategy: None,
            delimiter: ',',
            output,
            schedule: false,
            target_months: None,
        }
    }

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("debtplan-{label}-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn cli_parses_plan_flags() {
        let cli = Cli::try_parse_from([
            "debtplan",
            "--log-level",
            "debug",
            "plan",
            "--debts",
            "debts.csv",
            "--budget",
            "450",
            "--strategy",
            "avalanche",
            "--schedule",
            "--target-months",
            "24",
        ])
        .expect("flags should parse");

        assert_eq!(cli.log_level, LevelFilter::Debug);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan subcommand");
        };
        assert_eq!(args.debts, Some(PathBuf::from("debts.csv")));
        assert_eq!(args.budget, Some(450.0));
        assert_eq!(args.strategy, Some(CliStrategy::Avalanche));
        assert_eq!(args.delimiter, ',');
        assert_eq!(args.output, PathBuf::from(DEFAULT_REPORT_PATH));
        assert!(args.schedule);
        assert_eq!(args.target_months, Some(24));
    }

    #[test]
    fn cli_parses_serve_with_default_port() {
        let cli = Cli::try_parse_from(["debtplan", "serve"]).expect("serve should parse");
        assert_eq!(cli.log_level, LevelFilter::Info);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(args.port, 8080);
    }

    #[test]
    fn cli_rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["debtplan", "plan", "--strategy", "random"]).is_err());
    }

    #[test]
    fn run_plan_interactive_session_writes_and_echoes_report() {
        let dir = temp_dir("interactive");
        let output_path = dir.join("Debt Payoff.txt");
        let script = "A\n500\n0\n25\nB\n1000\n18\n30\n\n100\n1\n";

        let mut console = Vec::new();
        let written = run_plan(
            &plan_args(output_path.clone()),
            Cursor::new(script.as_bytes()),
            &mut console,
        )
        .expect("plan should succeed");
        assert_eq!(written, output_path);

        let report = fs::read_to_string(&output_path).expect("report written");
        let console = String::from_utf8(console).expect("utf8");
        assert!(console.contains("Debt payoff methods:"));
        assert!(console.ends_with(&report));

        let a_row = report
            .lines()
            .find(|l| l.starts_with("A "))
            .expect("row for A");
        assert!(a_row.trim_end().ends_with('8'));

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn run_plan_reads_debt_file_without_prompting() {
        let dir = temp_dir("file");
        let debts_path = dir.join("debts.txt");
        fs::write(&debts_path, "loan;1200;0;100\n").expect("debts file");
        let mut args = plan_args(dir.join("out.txt"));
        args.debts = Some(debts_path);
        args.delimiter = ';';
        args.budget = Some(100.0);
        args.strategy = Some(CliStrategy::Snowball);
        args.schedule = true;

        let mut console = Vec::new();
        run_plan(&args, Cursor::new(&b""[..]), &mut console).expect("plan should succeed");

        let console = String::from_utf8(console).expect("utf8");
        assert!(!console.contains("Enter"));
        assert!(console.contains("debt free in about 12 months"));
        assert!(console.contains("Remaining balance at the end of each month:"));

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn run_plan_stops_on_insufficient_budget() {
        let dir = temp_dir("insufficient");
        let output_path = dir.join("out.txt");
        let script = "A\n500\n0\n25\n\n10\n";

        let err = run_plan(
            &plan_args(output_path.clone()),
            Cursor::new(script.as_bytes()),
            Vec::new(),
        )
        .expect_err("budget below minimums");
        assert!(matches!(
            err,
            AppError::Input(InputError::InsufficientBudget { .. })
        ));
        assert!(!output_path.exists());

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn run_plan_reports_unsustainable_debt() {
        let dir = temp_dir("unsustainable");
        let mut args = plan_args(dir.join("out.txt"));
        args.budget = Some(10.0);
        args.strategy = Some(CliStrategy::Avalanche);

        let err = run_plan(
            &args,
            Cursor::new(&b"payday\n1000\n24\n10\n\n"[..]),
            Vec::new(),
        )
        .expect_err("must hit runaway guard");
        assert!(matches!(
            err,
            AppError::Payoff(PayoffError::UnsustainableDebt { months: 601 })
        ));
        assert!(err.to_string().contains("50 years"));

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn settings_from_json_parses_web_keys() {
        let json = r#"{
          "debts": [
            {"name": "Visa", "balance": 2500, "annualRate": 22.9, "minPayment": 75},
            {"name": "Car", "balance": 9000, "rate": 6.5, "minPayment": 250}
          ],
          "monthlyBudget": 600,
          "strategy": "highest-rate",
          "includeSchedule": true,
          "targetMonths": 36
        }"#;
        let settings = settings_from_json(json).expect("json should parse");

        assert_eq!(settings.debts.len(), 2);
        assert_eq!(settings.debts[1], Debt::new("Car", 9_000.0, 6.5, 250.0));
        assert_eq!(settings.monthly_budget, 600.0);
        assert_eq!(settings.strategy, Strategy::Avalanche);
        assert!(settings.include_schedule);
        assert_eq!(settings.target_months, Some(36));
    }

    #[test]
    fn settings_from_json_defaults_and_rejections() {
        let settings = settings_from_json(
            r#"{"debts": [{"name": "A", "balance": 10, "annualRate": 0}], "monthlyBudget": 5}"#,
        )
        .expect("minimal payload");
        assert_eq!(settings.strategy, Strategy::Snowball);
        assert_eq!(settings.debts[0].min_payment, 0.0);
        assert!(!settings.include_schedule);

        let err = settings_from_json(r#"{"debts": []}"#).expect_err("budget required");
        assert!(err.contains("monthlyBudget"));

        let err = settings_from_json(
            r#"{"debts": [{"name": "A", "balance": -1, "annualRate": 0}], "monthlyBudget": 5}"#,
        )
        .expect_err("negative balance");
        assert!(err.contains("entry 1"));

        let err = settings_from_json(
            r#"{"debts": [{"name": "A", "balance": 100, "annualRate": 0, "minPayment": 50}], "monthlyBudget": 20}"#,
        )
        .expect_err("insufficient budget");
        assert!(err.contains("minimum payments"));

        let err = settings_from_json(r#"{"monthlyBudget": 5, "strategy": "random"}"#)
            .expect_err("unknown strategy");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn plan_response_serialization_contains_expected_fields() {
        let settings = settings_from_json(
            r#"{
              "debts": [
                {"name": "A", "balance": 500, "annualRate": 0, "minPayment": 25},
                {"name": "B", "balance": 1000, "annualRate": 18, "minPayment": 30}
              ],
              "monthlyBudget": 100,
              "includeSchedule": true,
              "targetMonths": 12
            }"#,
        )
        .expect("valid payload");
        let outcome = build_plan(&settings).expect("plan");
        let completion = outcome.plan.completion_month;
        let json = serde_json::to_string(&build_plan_response(outcome)).expect("serialize");

        assert!(json.contains("\"strategy\":\"snowball\""));
        assert!(json.contains(&format!("\"completionMonth\":{completion}")));
        assert!(json.contains("\"payoffMonth\":8"));
        assert!(json.contains("\"annualRate\""));
        assert!(json.contains("\"minPayment\""));
        assert!(json.contains("\"endBalance\""));
        assert!(json.contains("\"budgetGoal\""));
        assert!(json.contains("\"solvedBudget\""));
    }

    #[test]
    fn plan_errors_map_to_http_statuses() {
        let unsustainable = settings_from_json(
            r#"{"debts": [{"name": "P", "balance": 1000, "annualRate": 24, "minPayment": 10}], "monthlyBudget": 10}"#,
        )
        .expect("valid payload");
        let err = build_plan(&unsustainable).expect_err("runaway");
        assert_eq!(payoff_error_status(&err), StatusCode::UNPROCESSABLE_ENTITY);

        let response = plan_from_request(Ok(Json(PlanPayload::default())))
            .expect_err("missing budget");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let mut bad_target = unsustainable.clone();
        bad_target.monthly_budget = 100.0;
        bad_target.target_months = Some(0);
        let err = build_plan(&bad_target).expect_err("invalid solver target");
        assert_eq!(payoff_error_status(&err), StatusCode::BAD_REQUEST);
    }

    fn post_request(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn extract_payload(path: &str, body: &str) -> Result<Json<PlanPayload>, JsonRejection> {
        Json::<PlanPayload>::from_request(post_request(path, body), &()).await
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    fn assert_no_store(response: &Response) {
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn malformed_payloads_are_bad_requests_not_unsustainable() {
        let bodies = [
            r#"{"debts": [{"name": "A", "annualRate": 5}], "monthlyBudget": 50}"#,
            r#"{"debts": [], "monthlyBudget": 50, "strategy": "random"}"#,
            r#"{"debts": ["#,
        ];
        for body in bodies {
            let response = plan_handler(extract_payload("/api/plan", body).await).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_no_store(&response);
            let text = body_text(response).await;
            assert!(text.contains("\"error\":\"Invalid API JSON payload"), "{text}");
        }

        let unsustainable = r#"{"debts": [{"name": "P", "balance": 1000, "annualRate": 24, "minPayment": 10}], "monthlyBudget": 10}"#;
        let response = plan_handler(extract_payload("/api/plan", unsustainable).await).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_no_store(&response);
        assert!(body_text(response).await.contains("50 years"));
    }

    #[tokio::test]
    async fn report_rejections_use_the_json_error_body() {
        let response = report_handler(extract_payload("/api/report", "not json").await).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_no_store(&response);
    }

    #[tokio::test]
    async fn valid_payload_answers_plan_and_report() {
        let body = r#"{"debts": [{"name": "loan", "balance": 1200, "annualRate": 0, "minPayment": 100}], "monthlyBudget": 100}"#;

        let response = plan_handler(extract_payload("/api/plan", body).await).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        assert!(body_text(response).await.contains("\"completionMonth\":12"));

        let response = report_handler(extract_payload("/api/report", body).await).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/plain; charset=utf-8"))
        );
        assert!(body_text(response).await.contains("debt free in about 12 months"));
    }

    fn raw_http(addr: SocketAddr, request: &str) -> String {
        let mut stream = std::net::TcpStream::connect(addr).expect("connect");
        stream.write_all(request.as_bytes()).expect("send");
        let mut response = String::new();
        stream.read_to_string(&mut response).expect("read");
        response.to_ascii_lowercase()
    }

    async fn send(addr: SocketAddr, request: String) -> String {
        tokio::task::spawn_blocking(move || raw_http(addr, &request))
            .await
            .expect("join")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn router_wires_routes_and_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, router()).await });

        let get = |path: &str| {
            format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        };
        let usage = send(addr, get("/")).await;
        assert!(usage.starts_with("http/1.1 200"), "{usage}");
        assert!(usage.contains("post /api/plan"));
        assert!(usage.contains("cache-control: no-store"));

        let missing = send(addr, get("/nowhere")).await;
        assert!(missing.starts_with("http/1.1 404"), "{missing}");
        assert!(missing.contains("\"error\":\"not found\""));

        let body = r#"{"debts": [{"name": "A"}], "monthlyBudget": 50}"#;
        let bad = send(
            addr,
            format!(
                "POST /api/plan HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            ),
        )
        .await;
        assert!(bad.starts_with("http/1.1 400"), "{bad}");
        assert!(bad.contains("cache-control: no-store"));
    }
}
