use std::collections::HashMap;

use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::probe::headers::parse_header_directives;
use crate::runner::{Options, Runner, TargetSource};
use crate::utils;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(format!("pokehttp={level}"))
    };
    // stdout carries results only
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push('\n');
        out.push_str(&long_about.to_string());
        out.push('\n');
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS] < targets\n\n", cmd.get_name()));

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();
    for arg in cmd.get_arguments().filter(|a| !a.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = *section_idx.entry(heading.clone()).or_insert_with(|| {
            sections.push((heading, Vec::new()));
            sections.len() - 1
        });
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");
        for arg in args {
            let mut flags: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                flags.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                flags.push(format!("--{long}"));
            }
            for alias in arg.get_visible_aliases().unwrap_or_default() {
                flags.push(format!("--{alias}"));
            }
            let mut line = flags.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                let optional = arg.get_num_args().map(|r| r.min_values() == 0).unwrap_or(false);
                if optional {
                    line.push_str(&format!(" [<{value_name}>]"));
                } else {
                    line.push_str(&format!(" <{value_name}>"));
                }
            }
            out.push_str(&format!("  {line}\n"));
            if let Some(help) = arg.get_help() {
                out.push_str(&format!("          {}\n", help.to_string().trim()));
            }
        }
        out.push('\n');
    }
    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    workers: Option<usize>,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let targets = match args.input_file.or(cfg.input_file) {
        Some(path) => TargetSource::FilePath(config::expand_tilde_string(&path)),
        None => TargetSource::Stdin,
    };

    let ports_raw = args
        .ports
        .or(cfg.ports)
        .unwrap_or_else(|| utils::DEFAULT_PORTS.to_string());
    let ports = utils::parse_ports_csv(&ports_raw)
        .map_err(|e| format!("invalid --ports '{ports_raw}': {e}"))?;
    debug!(ports = ?ports, "port set");

    let concurrency = args
        .concurrency
        .or(cfg.concurrency)
        .unwrap_or_else(utils::default_concurrency);
    let timeout_seconds = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(utils::DEFAULT_TIMEOUT_SECONDS);
    let workers = args.workers.or(cfg.workers);
    if workers == Some(0) {
        return Err("invalid workers, expected positive integer".to_string());
    }

    let insecure = args.insecure.or(cfg.insecure).unwrap_or(true);
    let follow_redirects = args
        .follow_redirects
        .or(cfg.follow_redirects)
        .unwrap_or(true);
    let user_agent = args
        .user_agent
        .or(cfg.user_agent)
        .unwrap_or_else(|| utils::DEFAULT_USER_AGENT.to_string());

    let raw_headers = if args.header.is_empty() {
        cfg.headers.unwrap_or_default()
    } else {
        args.header
    };
    let headers = parse_header_directives(&raw_headers);

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));

    Ok(RunConfig {
        options: Options {
            targets,
            concurrency,
            timeout_seconds,
            ports,
            insecure,
            follow_redirects,
            user_agent,
            headers,
            output,
        },
        workers,
    })
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                print!("{}", CliArgs::command().render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    let runner = Runner::new(run.options).map_err(|e| e.to_string())?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = run.workers {
        builder.worker_threads(workers);
    }
    let rt = builder
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(runner.run()).map_err(|e| e.to_string())?;
    Ok(())
}
