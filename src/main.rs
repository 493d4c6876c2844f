#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

use clap::{App, Arg, SubCommand};
use dotenv::dotenv;
use pose_editor::batch;
use pose_editor::config::Config;
use pose_editor::layout::{self, DEFAULT_ITERATIONS, DEFAULT_SEED};
use pose_editor::problem::{read_problem_from_file, read_solution_from_file, Solution};
use std::error::Error;
use std::path::PathBuf;

fn problem_arg() -> Arg<'static, 'static> {
    Arg::with_name("problem")
        .short("p")
        .long("problem")
        .value_name("FILE")
        .required(true)
        .takes_value(true)
}

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = App::new("ICFP2021 Pose Editor")
        .subcommand(
            SubCommand::with_name("score")
                .about("Prints dislike, globalist and edge validity of saved solutions")
                .arg(problem_arg())
                .arg(
                    Arg::with_name("solution")
                        .short("s")
                        .long("solution")
                        .value_name("FILE")
                        .required(true)
                        .multiple(true)
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("relayout")
                .about("Prints a force-directed layout of the figure as a solution")
                .arg(problem_arg())
                .arg(
                    Arg::with_name("solution")
                        .short("s")
                        .long("solution")
                        .value_name("FILE")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("iterations")
                        .short("i")
                        .long("iterations")
                        .value_name("N")
                        .takes_value(true),
                )
                .arg(Arg::with_name("seed").long("seed").value_name("N").takes_value(true)),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("score") {
        let problem = read_problem_from_file(matches.value_of("problem").unwrap_or_default())?;
        let paths: Vec<PathBuf> = matches
            .values_of("solution")
            .map(|v| v.map(PathBuf::from).collect())
            .unwrap_or_default();
        for (path, report) in batch::score_files(&problem, &paths) {
            match report {
                Ok(report) => println!("{}: {}", path.display(), report),
                Err(e) => println!("{}: error: {}", path.display(), e),
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("relayout") {
        let problem = read_problem_from_file(matches.value_of("problem").unwrap_or_default())?;
        let start = match matches.value_of("solution") {
            Some(path) => read_solution_from_file(path)?.vertices,
            None => problem.figure.vertices.clone(),
        };
        let iterations = match matches.value_of("iterations") {
            Some(n) => n.parse()?,
            None => DEFAULT_ITERATIONS,
        };
        let seed = match matches.value_of("seed") {
            Some(n) => n.parse()?,
            None => DEFAULT_SEED,
        };
        let vertices = layout::relayout(&problem.figure, &start, iterations, seed)
            .into_iter()
            .map(|p| p.round())
            .collect();
        let solution = Solution {
            problem_id: None,
            vertices,
        };
        println!("{}", serde_json::to_string(&solution)?);
    } else {
        let app = pose_editor::PoseEditorApp::new(Config::from_env());
        let native_options = eframe::NativeOptions::default();
        eframe::run_native(Box::new(app), native_options);
    }
    Ok(())
}
