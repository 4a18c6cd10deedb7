//! Grammars of launcher-based tools (wrapper, legacy and direct runtime).

use std::path::Path;

use crate::error::AdapterError;
use crate::negotiate::tool_dir;
use crate::types::{Capabilities, InvocationMode, InvocationRequest};

use super::Draft;

/// Option tables for the launcher-based grammars.
#[derive(Debug, Clone)]
pub struct UltimateGrammar {
    /// Option that disables the wrapper even when a property file is given.
    pub no_wrapper_option: &'static str,
    /// Options the legacy wrapper rejects.
    pub legacy_forbidden: &'static [&'static str],
    /// Option the legacy wrapper always receives.
    pub legacy_output_flag: &'static str,
    /// Options whose presence selects direct mode.
    pub toolchain_options: &'static [&'static str],
    /// Options that must go to the runtime instead of the tool.
    pub runtime_options: &'static [&'static str],
    pub stack_flag: &'static str,
    pub data_dir_name: &'static str,
    /// Generation that understands the `-ultimatedata` split.
    pub data_dir_generation: u32,
}

pub(super) fn build(
    grammar: &UltimateGrammar,
    executable: &Path,
    caps: &Capabilities,
    request: &InvocationRequest,
) -> Result<Draft, AdapterError> {
    let mut options = request.options.clone();
    let mut property_file = request.property_file.clone();
    if options.iter().any(|o| o == grammar.no_wrapper_option) {
        options.retain(|o| o != grammar.no_wrapper_option);
        property_file = None;
    }

    let exe = executable.display().to_string();

    if caps.legacy {
        let property = property_file.ok_or_else(|| {
            AdapterError::UnsupportedInvocation(format!(
                "release {} can only run with a property file",
                caps.version
            ))
        })?;
        options.retain(|o| !grammar.legacy_forbidden.iter().any(|f| f == o));

        let mut argv = vec![exe, property];
        argv.extend(options.iter().cloned());
        argv.push(grammar.legacy_output_flag.to_owned());
        argv.extend(request.inputs.iter().cloned());

        return Ok(Draft {
            argv,
            working_dir: None,
            mode: InvocationMode::Legacy,
            options,
            uses_property_file: true,
            structured_output: false,
        });
    }

    if let Some(property) = property_file {
        let mut argv = vec![exe, "--spec".to_owned(), property];
        if !request.inputs.is_empty() {
            argv.push("--file".to_owned());
            argv.extend(request.inputs.iter().cloned());
        }
        argv.extend(options.iter().cloned());

        return Ok(Draft {
            argv,
            working_dir: None,
            mode: InvocationMode::PropertyFile,
            options,
            uses_property_file: true,
            structured_output: false,
        });
    }

    if options
        .iter()
        .any(|o| grammar.toolchain_options.iter().any(|t| t == o))
    {
        return direct(grammar, executable, caps, request, options);
    }

    Err(AdapterError::UnsupportedInvocation(format!(
        "need a property file or a toolchain option; options={:?} limits={:?}",
        request.options, request.limits
    )))
}

fn direct(
    grammar: &UltimateGrammar,
    executable: &Path,
    caps: &Capabilities,
    request: &InvocationRequest,
    mut options: Vec<String>,
) -> Result<Draft, AdapterError> {
    let runtime = caps
        .runtime
        .as_ref()
        .ok_or_else(|| AdapterError::RuntimeNotFound {
            candidates: Vec::new(),
            marker: String::new(),
        })?;
    let launcher = caps
        .launcher
        .as_ref()
        .ok_or_else(|| AdapterError::LauncherNotFound {
            dir: tool_dir(executable).to_path_buf(),
            candidates: Vec::new(),
        })?;

    let mut argv = vec![runtime.display().to_string()];

    for flag in grammar.runtime_options {
        if options.iter().any(|o| o == flag) {
            options.retain(|o| o != flag);
            argv.push((*flag).to_owned());
        }
    }

    if let Some(bytes) = request.limits.memory_bytes().filter(|b| *b > 0) {
        argv.push(format!("-Xmx{bytes}"));
    }
    argv.push(grammar.stack_flag.to_owned());
    argv.push("-jar".to_owned());
    argv.push(launcher.display().to_string());

    argv.extend(data_dir_args(grammar, executable, caps, &options)?);
    argv.extend(options.iter().cloned());

    if !request.inputs.is_empty() {
        argv.push("-i".to_owned());
        argv.extend(request.inputs.iter().cloned());
    }

    Ok(Draft {
        argv,
        working_dir: None,
        mode: InvocationMode::Direct,
        options,
        uses_property_file: false,
        structured_output: false,
    })
}

fn data_dir_args(
    grammar: &UltimateGrammar,
    executable: &Path,
    caps: &Capabilities,
    options: &[String],
) -> Result<Vec<String>, AdapterError> {
    let has = |flag: &str| options.iter().any(|o| o == flag);
    let data_dir = tool_dir(executable)
        .join(grammar.data_dir_name)
        .display()
        .to_string();

    if !caps.requires_data_dir {
        if has("-data") {
            return Ok(Vec::new());
        }
        return Ok(vec!["-data".to_owned(), data_dir]);
    }

    if has("-data") {
        return Ok(Vec::new());
    }
    if caps.generation < grammar.data_dir_generation {
        return Err(AdapterError::UnsupportedInvocation(format!(
            "version {} needs -ultimatedata, which API {} does not support",
            caps.version, caps.generation
        )));
    }

    let mut args = vec!["-data".to_owned(), "@noDefault".to_owned()];
    if !has("-ultimatedata") {
        args.push("-ultimatedata".to_owned());
        args.push(data_dir);
    }
    Ok(args)
}
