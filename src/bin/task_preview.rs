use std::env;
use std::path::Path;

use m3u8dl_task_builder::core::models::{StreamInfo, TaskRequest};
use m3u8dl_task_builder::parsers::m3u8_parser::load_stream_choices;
use m3u8dl_task_builder::utils::logging::{filter_for_level, init_tracing_with};
use m3u8dl_task_builder::{AppConfig, TaskBuildReport, TaskOptionBuilder};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: task_preview <url-or-txt> [file-name] [master-playlist stream-index]");
        std::process::exit(1);
    }

    let config = AppConfig::load_or_default();
    init_tracing_with(&filter_for_level(&config.advanced.log_level));

    let input = args[1].clone();
    let file_name = args.get(2).cloned().unwrap_or_default();

    let stream = match args.get(3) {
        Some(playlist) => {
            let index = args
                .get(4)
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(0);
            match select_stream(Path::new(playlist), index) {
                Ok(stream) => stream,
                Err(error) => {
                    eprintln!("Error: {error:#}");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let builder = TaskOptionBuilder::new(config.locator_support());
    let request = TaskRequest::new(input, file_name).with_stream(stream);

    match builder.build_tasks(&request, &config.builder_config()) {
        Ok(report) => {
            if !config.downloader_available() {
                eprintln!("Warning: Please choose N_m3u8DL-RE binary file in setting interface");
            }
            print_report(&report, config.downloader_program());
        }
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn select_stream(playlist: &Path, index: usize) -> anyhow::Result<Option<StreamInfo>> {
    let choices = load_stream_choices(playlist)?;

    println!("Streams:");
    for (i, label) in choices.labels().iter().enumerate() {
        let marker = if i == index { "*" } else { " " };
        println!(" {marker} [{i}] {label}");
    }

    Ok(choices.selected_stream(index).cloned())
}

fn print_report(report: &TaskBuildReport, program: &str) {
    println!("Mode: {:?}", report.mode);
    if let Some(stats) = &report.stats {
        println!("Encoding: {}", stats.detected_encoding);
        println!(
            "Lines: {} total, {} parsed, {} skipped",
            stats.total_lines, stats.parsed_lines, stats.skipped_lines
        );
    }

    for skipped in &report.skipped {
        println!("Skipped: {skipped}");
    }

    if report.is_empty() {
        println!("No available tasks found, please check the format of txt");
        return;
    }

    println!("Tasks:");
    for task in &report.tasks {
        println!("  {}", task.display_command(program));
    }
}
