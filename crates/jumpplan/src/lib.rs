use std::path::PathBuf;

use jumpplan_engine::PlannerConfig;

mod runner;

pub use runner::{execute, RunStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub dir: Option<PathBuf>,
    pub level: Option<PathBuf>,
    pub capture: Option<PathBuf>,
    pub goal_x: Option<f32>,
    pub planner: PlannerConfig,
    pub print: bool,
    /// Replay this schedule file instead of planning a new one.
    pub replay: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Help,
    Run(RunOptions),
}

pub fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--dir" => {
                options.dir = Some(PathBuf::from(flag_value(args, index, "--dir")?));
                index += 2;
            }
            "--level" => {
                options.level = Some(PathBuf::from(flag_value(args, index, "--level")?));
                index += 2;
            }
            "--capture" => {
                options.capture = Some(PathBuf::from(flag_value(args, index, "--capture")?));
                index += 2;
            }
            "--replay" => {
                options.replay = Some(PathBuf::from(flag_value(args, index, "--replay")?));
                index += 2;
            }
            "--goal-x" => {
                let value = flag_value(args, index, "--goal-x")?;
                let goal_x = value
                    .parse::<f32>()
                    .ok()
                    .filter(|goal_x| goal_x.is_finite())
                    .ok_or_else(|| format!("invalid --goal-x value '{value}' (expected f32)"))?;
                options.goal_x = Some(goal_x);
                index += 2;
            }
            "--lookahead" => {
                let value = flag_value(args, index, "--lookahead")?;
                options.planner.lookahead_frames = value
                    .parse::<u32>()
                    .ok()
                    .filter(|frames| *frames > 0)
                    .ok_or_else(|| {
                        format!("invalid --lookahead value '{value}' (expected u32 > 0)")
                    })?;
                index += 2;
            }
            "--max-delay" => {
                let value = flag_value(args, index, "--max-delay")?;
                options.planner.max_delay_frames = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --max-delay value '{value}' (expected u32)"))?;
                index += 2;
            }
            "--max-frames" => {
                let value = flag_value(args, index, "--max-frames")?;
                options.planner.max_frames = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --max-frames value '{value}' (expected u32)"))?;
                index += 2;
            }
            "--print" => {
                options.print = true;
                index += 1;
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(CliCommand::Run(options))
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub fn usage_text() -> String {
    [
        "jumpplan - deterministic jump schedule planner",
        "",
        "Usage:",
        "  jumpplan [--dir <path>] [--level <path>] [--capture <path>] [--goal-x <f32>]",
        "           [--lookahead <u32>] [--max-delay <u32>] [--max-frames <u32>] [--print]",
        "  jumpplan [--dir <path>] [--level <path>] [--capture <path>] [--goal-x <f32>]",
        "           [--max-frames <u32>] --replay <macro file>",
        "",
        "Run directory:",
        "  --dir, else $JUMPPLAN_DIR, else the current directory.",
        "  Reads capture.json then level.txt; writes macro.txt and pathfinder_report.json.",
        "",
        "Defaults:",
        "  --goal-x     far edge of the last platform",
        "  --lookahead  36",
        "  --max-delay  8",
        "  --max-frames 18000",
        "",
        "Exit status: 0 on success, 1 on usage or I/O errors, 2 when no plan was found.",
    ]
    .join("\n")
}
