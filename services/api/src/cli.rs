use crate::demo::{
    run_demo, run_grade_report, run_grade_simulation, run_schedule_check, run_schedule_report,
    DemoArgs, GradeReportArgs, GradeSimulationArgs, ScheduleCheckArgs, ScheduleReportArgs,
};
use crate::server;
use campus_progress::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Campus Progress Engine",
    about = "Grade projections and weekly schedule insights for the student portal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute grade standing and projections for one course
    Grades {
        #[command(subcommand)]
        command: GradesCommand,
    },
    /// Inspect a weekly class schedule
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Walk through grading and scheduling with a sample student
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum GradesCommand {
    /// Current grade, completion and target cards
    Report(GradeReportArgs),
    /// Re-run the grade with hypothetical scores for pending evaluations
    Simulate(GradeSimulationArgs),
}

#[derive(Subcommand, Debug)]
enum ScheduleCommand {
    /// Next class, weekly load and internal conflicts
    Report(ScheduleReportArgs),
    /// Check whether a proposed class block overlaps the schedule
    Check(ScheduleCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Grades {
            command: GradesCommand::Report(args),
        } => run_grade_report(args),
        Command::Grades {
            command: GradesCommand::Simulate(args),
        } => run_grade_simulation(args),
        Command::Schedule {
            command: ScheduleCommand::Report(args),
        } => run_schedule_report(args),
        Command::Schedule {
            command: ScheduleCommand::Check(args),
        } => run_schedule_check(args),
        Command::Demo(args) => run_demo(args),
    }
}
