use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use sio_formats::BuiltinFilters;
use sio_io::FileIoContext;
use sio_shift::GlobalShiftManager;
use sio_types::{Entity, LoadParameters, SaveParameters, ShiftHandlingMode};
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::*;
use crate::config::SioConfig;
use crate::prompt::TerminalPrompt;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = SioConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    match cli.command {
        Command::Formats => cmd_formats(&config),
        Command::Load(args) => cmd_load(&config, args),
        Command::Convert(args) => cmd_convert(&config, args),
    }
}

fn build_context(config: &SioConfig, mode: ShiftHandlingMode) -> FileIoContext {
    let shift = if mode.is_interactive() {
        GlobalShiftManager::with_prompt(config.shift.clone(), Box::new(TerminalPrompt))
    } else {
        GlobalShiftManager::with_policy(config.shift.clone())
    };
    let io = FileIoContext::new();
    io.register_plugin(&BuiltinFilters::new(Arc::new(shift)));
    io
}

fn cmd_formats(config: &SioConfig) -> anyhow::Result<()> {
    let io = build_context(config, config.shift_handling_mode);
    for handler in io.handlers() {
        let caps = match (handler.import_supported(), handler.export_supported()) {
            (true, true) => "load/save",
            (true, false) => "load",
            (false, true) => "save",
            (false, false) => "-",
        };
        println!("{} ({}, default .{})", handler.name().bold(), caps.cyan(), handler.default_extension());
        for filter in handler.file_filters(true) {
            println!("  {} {}", "in: ".dimmed(), filter);
        }
        for filter in handler.file_filters(false) {
            println!("  {} {}", "out:".dimmed(), filter);
        }
    }
    Ok(())
}

fn cmd_load(config: &SioConfig, args: LoadArgs) -> anyhow::Result<()> {
    let mode = args.shift_mode.unwrap_or(config.shift_handling_mode);
    let io = build_context(config, mode);
    let files = collect_inputs(&args.paths, &io);
    if files.is_empty() {
        bail!("no loadable file found");
    }
    debug!(files = files.len(), shift_mode = %mode, "collected input files");

    io.reset_session_counter();
    let mut params = LoadParameters::with_shift_storage(mode);
    let mut failed = 0;
    for path in &files {
        let outcome = io.load_from_file_with_filter(path, &mut params, &args.filter);
        match outcome.entity {
            Some(root) => print_tree(&root),
            None if outcome.code.is_success() => {
                println!("{} {} (nothing to show)", "-".dimmed(), path.display())
            }
            None => {
                failed += 1;
                println!("{} {}: {}", "✗".red().bold(), path.display(), outcome.code);
            }
        }
    }

    if let Some(shift) = params.active_shift() {
        println!("Global shift for this session: {}", shift.to_string().cyan());
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed to load", files.len());
    }
    Ok(())
}

fn cmd_convert(config: &SioConfig, args: ConvertArgs) -> anyhow::Result<()> {
    let mode = args.shift_mode.unwrap_or(config.shift_handling_mode);
    let io = build_context(config, mode);

    io.reset_session_counter();
    let mut params = LoadParameters::with_shift_storage(mode);
    let outcome = io.load_from_file_with_filter(&args.input, &mut params, &args.input_filter);
    let code = outcome.code;
    let Some(root) = outcome.into_entity() else {
        if code.is_success() {
            bail!("{} contains nothing to convert", args.input.display());
        }
        bail!("cannot load {}: {code}", args.input.display());
    };

    let filter = match args.output_filter {
        Some(filter) => filter,
        None => output_filter_for(&io, &args.output)?,
    };
    debug!(output = %args.output.display(), filter = %filter, "saving converted file");
    let code = io.save_to_file_with_filter(Some(&root), &args.output, &SaveParameters::default(), &filter);
    if !code.is_success() {
        bail!("cannot save {}: {code}", args.output.display());
    }

    println!(
        "{} Converted {} → {} ({} points)",
        "✓".green().bold(),
        args.input.display(),
        args.output.display().to_string().bold(),
        root.point_count()
    );
    Ok(())
}

/// Expand directories into the files a registered handler can load.
/// Explicit file paths are kept as given.
fn collect_inputs(paths: &[PathBuf], io: &FileIoContext) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        files.extend(
            WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .map(walkdir::DirEntry::into_path)
                .filter(|file| {
                    file.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| io.find_best_for_extension(ext).is_some())
                }),
        );
    }
    files
}

/// Save filter of the first handler able to write `output`'s extension.
fn output_filter_for(io: &FileIoContext, output: &Path) -> anyhow::Result<String> {
    let Some(ext) = output.extension().and_then(|ext| ext.to_str()) else {
        bail!("{} has no extension; pass --output-filter", output.display());
    };
    let upper = ext.to_ascii_uppercase();
    io.handlers()
        .iter()
        .filter(|h| h.export_supported() && h.can_load_extension(&upper))
        .find_map(|h| h.file_filters(false).into_iter().next())
        .with_context(|| format!("no format can write .{ext} files"))
}

fn print_tree(root: &Entity) {
    println!("{} {}", "✓".green().bold(), root.name().bold());
    for child in root.children() {
        let detail = match child.as_point_cloud() {
            Some(cloud) if cloud.is_shifted() => {
                format!("{} points, shift {}", cloud.len(), cloud.global_shift)
            }
            Some(cloud) => format!("{} points", cloud.len()),
            None => format!("{} children", child.child_count()),
        };
        println!("  {} {}", child.name().yellow(), detail.dimmed());
    }
}
